use image::{GrayImage, Luma};
use ink_kit_common::{BrushState, Viewport, ViewportPoint};
use tracing::debug;

/// User-painted suppression mask, aligned to the segmentation mask.
///
/// 0 means untouched and 255 fully erased. Strokes are unions of capsules
/// between consecutive points, so joins and caps are round and fast
/// pointer motion leaves no gaps.
#[derive(Debug, Clone)]
pub struct ErasureCanvas {
    buffer: GrayImage,
    viewport: Viewport,
    brush: BrushState,
    last: Option<(f32, f32)>,
}

impl ErasureCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buffer: GrayImage::new(width, height),
            viewport: Viewport::identity(width, height),
            brush: BrushState::default(),
            last: None,
        }
    }

    /// Reallocate at new dimensions. The canvas comes back blank and the
    /// viewport is reset to map one-to-one onto the buffer.
    pub fn resize(&mut self, width: u32, height: u32) {
        debug!(width, height, "Resizing erasure canvas");
        self.buffer = GrayImage::new(width, height);
        self.viewport = Viewport::identity(width, height);
        self.last = None;
    }

    pub fn buffer(&self) -> &GrayImage {
        &self.buffer
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    pub fn brush(&self) -> BrushState {
        self.brush
    }

    pub fn set_brush(&mut self, brush: BrushState) {
        self.brush = brush;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Set the on-screen rectangle strokes are reported in
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn is_stroking(&self) -> bool {
        self.last.is_some()
    }

    /// True when nothing is erased anywhere
    pub fn is_blank(&self) -> bool {
        self.buffer.as_raw().iter().all(|&v| v == 0)
    }

    /// Erasure amount at a buffer pixel in `[0, 1]`; 0 outside the buffer
    pub fn value_at(&self, x: u32, y: u32) -> f32 {
        self.buffer
            .get_pixel_checked(x, y)
            .map(|p| p.0[0] as f32 / 255.0)
            .unwrap_or(0.0)
    }

    fn to_buffer(&self, point: ViewportPoint) -> Option<(f32, f32)> {
        let (x, y) = self.viewport.to_buffer(point, self.buffer.width(), self.buffer.height());
        (x.is_finite() && y.is_finite()).then_some((x, y))
    }

    /// Start a stroke with a round dab at `point`
    pub fn begin_stroke(&mut self, point: ViewportPoint) {
        let Some(at) = self.to_buffer(point) else {
            return;
        };
        paint_capsule(&mut self.buffer, at, at, self.brush.radius * 0.5);
        self.last = Some(at);
    }

    /// Continue the stroke to `point`. Ignored when no stroke is active.
    pub fn extend_stroke(&mut self, point: ViewportPoint) {
        let (Some(from), Some(to)) = (self.last, self.to_buffer(point)) else {
            return;
        };
        paint_capsule(&mut self.buffer, from, to, self.brush.radius * 0.5);
        self.last = Some(to);
    }

    pub fn end_stroke(&mut self) {
        self.last = None;
    }

    /// Reset every pixel to untouched and drop any active stroke
    pub fn clear(&mut self) {
        let (width, height) = self.buffer.dimensions();
        self.buffer = GrayImage::new(width, height);
        self.last = None;
    }
}

impl Default for ErasureCanvas {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Distance from `p` to the segment `a..b`
#[inline]
fn segment_distance(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let (apx, apy) = (p.0 - a.0, p.1 - a.1);
    let len2 = abx * abx + aby * aby;
    let t = if len2 > 0.0 { ((apx * abx + apy * aby) / len2).clamp(0.0, 1.0) } else { 0.0 };
    let (dx, dy) = (apx - abx * t, apy - aby * t);
    (dx * dx + dy * dy).sqrt()
}

/// Paint a capsule of `radius` around `a..b` with a one-pixel soft rim,
/// keeping the maximum of old and new coverage.
fn paint_capsule(buffer: &mut GrayImage, a: (f32, f32), b: (f32, f32), radius: f32) {
    let (w, h) = buffer.dimensions();
    if w == 0 || h == 0 || radius <= 0.0 {
        return;
    }
    let reach = radius + 1.0;
    let x0 = (a.0.min(b.0) - reach).floor().max(0.0) as u32;
    let y0 = (a.1.min(b.1) - reach).floor().max(0.0) as u32;
    let x1 = (a.0.max(b.0) + reach).ceil().min(w as f32) as u32;
    let y1 = (a.1.max(b.1) + reach).ceil().min(h as f32) as u32;

    for y in y0..y1 {
        for x in x0..x1 {
            let d = segment_distance((x as f32 + 0.5, y as f32 + 0.5), a, b);
            let coverage = (radius - d + 0.5).clamp(0.0, 1.0);
            if coverage <= 0.0 {
                continue;
            }
            let value = (coverage * 255.0).round() as u8;
            let pixel = buffer.get_pixel_mut(x, y);
            if value > pixel.0[0] {
                *pixel = Luma([value]);
            }
        }
    }
}
