use image::{GrayImage, Rgb, RgbImage, RgbaImage};
use ink_kit_common::Uv;
use rayon::prelude::*;

use crate::{
    geometry::overlay_coordinate,
    params::{RenderMode, RenderParams},
    sampler::{Rgba32, pixel_center_uv, sample_bilinear, sample_red},
    shading::{
        RELIEF_STEP, Vec3, blend_ink, classify_ink, cylinder_shadow, edge_fade, erase_suppression,
        grain, light_vector, lighting, lit_ink, luminance, mix3, relief_normal, specular,
    },
};

/// Mask values above this count as skin
pub const MASK_THRESHOLD: f32 = 0.1;

const DEBUG_TINT: Vec3 = [0.0, 1.0, 0.0];

/// The rasters one frame reads.
///
/// Each is addressed in [`Uv`] space, so their resolutions are independent.
#[derive(Debug, Clone, Copy)]
pub struct FrameInputs<'a> {
    pub photo: &'a RgbImage,
    pub mask: &'a GrayImage,
    pub tattoo: Option<&'a RgbaImage>,
    pub erasure: Option<&'a GrayImage>,
}

impl<'a> FrameInputs<'a> {
    pub fn new(photo: &'a RgbImage, mask: &'a GrayImage) -> Self {
        Self {
            photo,
            mask,
            tattoo: None,
            erasure: None,
        }
    }

    pub fn with_tattoo(mut self, tattoo: &'a RgbaImage) -> Self {
        self.tattoo = Some(tattoo);
        self
    }

    pub fn with_erasure(mut self, erasure: &'a GrayImage) -> Self {
        self.erasure = Some(erasure);
        self
    }
}

/// Per-pixel breakdown of the ink contribution, before the final mix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InkSample {
    /// Shaded ink color, already darkened by the cylinder shadow
    pub color: Vec3,
    /// `opacity × overlay alpha × edge fade × erase suppression`
    pub alpha: f32,
    pub is_color: f32,
    pub overlay: Uv,
}

#[inline]
fn rgb(sample: Rgba32) -> Vec3 {
    [sample[0], sample[1], sample[2]]
}

/// Ink at a frame coordinate, or `None` where no ink can land (off the
/// skin mask, off the overlay or without an overlay).
pub fn ink_at(inputs: &FrameInputs<'_>, params: &RenderParams, uv: Uv, base: Vec3) -> Option<InkSample> {
    let tattoo = inputs.tattoo?;
    let transform = &params.transform;
    let style = &params.style;

    let overlay = overlay_coordinate(uv, transform);
    if !overlay.in_unit_square() {
        return None;
    }

    let raw = sample_bilinear(tattoo, overlay);
    let ink = rgb(raw);
    let is_color = classify_ink(ink);

    let skin_luma = luminance(base);
    let d_u = luminance(rgb(sample_bilinear(inputs.photo, uv + Uv::new(RELIEF_STEP, 0.0)))) - skin_luma;
    let d_v = luminance(rgb(sample_bilinear(inputs.photo, uv + Uv::new(0.0, RELIEF_STEP)))) - skin_luma;
    let normal = relief_normal(d_u, d_v);
    let light = light_vector(params.lighting.direction());
    let spec = specular(normal, light, style.skin_detail);
    let shade = lighting(normal, light, style.skin_detail, is_color);

    let lit = lit_ink(ink, style.ink_tint.0, grain(overlay, style.grain), shade, spec);
    let blended = blend_ink(base, lit, is_color, spec);

    let erase = inputs.erasure.map(|e| sample_red(e, uv)).unwrap_or(0.0);
    let alpha = style.opacity * raw[3] * edge_fade(overlay) * erase_suppression(erase);

    let shadow = cylinder_shadow(overlay.x, transform.cylindrical_warp);
    Some(InkSample {
        color: blended.map(|c| c * shadow),
        alpha,
        is_color,
        overlay,
    })
}

/// Shade one frame coordinate. Output is straight-alpha RGBA in `[0, 1]`
/// before quantization; color channels may leave that range.
pub fn shade_pixel(inputs: &FrameInputs<'_>, params: &RenderParams, uv: Uv) -> Rgba32 {
    let base = rgb(sample_bilinear(inputs.photo, uv));
    let on_skin = sample_red(inputs.mask, uv) > MASK_THRESHOLD;

    match params.mode {
        RenderMode::MaskDebug => {
            if on_skin {
                let c = mix3(base, DEBUG_TINT, 0.5);
                [c[0], c[1], c[2], 1.0]
            } else {
                let grey = luminance(base) * 0.5;
                [grey, grey, grey, 1.0]
            }
        }
        RenderMode::Composite => {
            if !on_skin {
                return [base[0], base[1], base[2], 1.0];
            }
            match ink_at(inputs, params, uv, base) {
                Some(ink) => {
                    let c = mix3(base, ink.color, ink.alpha);
                    [c[0], c[1], c[2], 1.0]
                }
                None => [base[0], base[1], base[2], 1.0],
            }
        }
        RenderMode::TattooOnly => {
            if !on_skin {
                return [0.0; 4];
            }
            match ink_at(inputs, params, uv, base) {
                Some(ink) => [ink.color[0], ink.color[1], ink.color[2], ink.alpha],
                None => [0.0; 4],
            }
        }
    }
}

#[inline]
fn quantize(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Render a full frame at the photograph's resolution
pub fn render(inputs: &FrameInputs<'_>, params: &RenderParams) -> RgbaImage {
    let mut frame = RgbaImage::new(inputs.photo.width(), inputs.photo.height());
    render_into(inputs, params, &mut frame);
    frame
}

/// Render into an existing buffer, resizing it only if the photograph's
/// dimensions changed.
pub fn render_into(inputs: &FrameInputs<'_>, params: &RenderParams, frame: &mut RgbaImage) {
    let (width, height) = inputs.photo.dimensions();
    if frame.dimensions() != (width, height) {
        *frame = RgbaImage::new(width, height);
    }
    if width == 0 || height == 0 {
        return;
    }

    let row_bytes = width as usize * 4;
    let buf: &mut [u8] = frame;
    buf.par_chunks_mut(row_bytes).enumerate().for_each(|(y, row)| {
        for x in 0..width {
            let uv = pixel_center_uv(x, y as u32, width, height);
            let px = shade_pixel(inputs, params, uv);
            let i = x as usize * 4;
            for c in 0..4 {
                row[i + c] = quantize(px[c]);
            }
        }
    });
}

/// Flatten a rendered frame onto an opaque photograph-sized image, as used
/// for export. Transparent regions take the background color.
pub fn flatten(frame: &RgbaImage, background: Rgb<u8>) -> RgbImage {
    RgbImage::from_fn(frame.width(), frame.height(), |x, y| {
        let p = frame.get_pixel(x, y).0;
        let a = p[3] as f32 / 255.0;
        let blend = |c: u8, b: u8| (c as f32 * a + b as f32 * (1.0 - a)).round() as u8;
        Rgb([blend(p[0], background.0[0]), blend(p[1], background.0[1]), blend(p[2], background.0[2])])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgba};
    use ink_kit_common::{StylePreset, Transform};

    fn create_test_photo() -> RgbImage {
        RgbImage::from_pixel(64, 48, Rgb([200, 160, 140]))
    }

    fn create_test_tattoo() -> RgbaImage {
        RgbaImage::from_pixel(32, 32, Rgba([10, 10, 10, 255]))
    }

    fn full_mask() -> GrayImage {
        GrayImage::from_pixel(16, 12, Luma([255]))
    }

    fn params() -> RenderParams {
        RenderParams {
            transform: Transform { cylindrical_warp: 0.0, ..Transform::default() },
            style: StylePreset::Fresh.profile(),
            ..RenderParams::default()
        }
    }

    #[test]
    fn test_off_skin_pixels_are_untouched() {
        let photo = create_test_photo();
        let mask = GrayImage::new(16, 12);
        let tattoo = create_test_tattoo();
        let inputs = FrameInputs::new(&photo, &mask).with_tattoo(&tattoo);

        let frame = render(&inputs, &params());
        assert_eq!(frame.dimensions(), (64, 48));
        assert!(frame.pixels().all(|p| p.0 == [200, 160, 140, 255]));
    }

    #[test]
    fn test_black_ink_darkens_center() {
        let photo = create_test_photo();
        let mask = full_mask();
        let tattoo = create_test_tattoo();
        let inputs = FrameInputs::new(&photo, &mask).with_tattoo(&tattoo);

        let center = shade_pixel(&inputs, &params(), Uv::CENTER);
        assert!(center[0] < 0.2, "center {center:?}");
        assert_eq!(center[3], 1.0);

        let ink = ink_at(&inputs, &params(), Uv::CENTER, [0.78, 0.63, 0.55]).unwrap();
        assert!(ink.alpha > 0.9);
        assert_eq!(ink.is_color, 0.0);

        // far corner lies outside a 0.3-scale overlay
        let corner = shade_pixel(&inputs, &params(), Uv::new(0.02, 0.02));
        assert!((corner[0] - 200.0 / 255.0).abs() < 1e-4);
    }

    #[test]
    fn test_erased_pixels_show_photo() {
        let photo = create_test_photo();
        let mask = full_mask();
        let tattoo = create_test_tattoo();
        let erasure = GrayImage::from_pixel(16, 12, Luma([255]));
        let inputs = FrameInputs::new(&photo, &mask).with_tattoo(&tattoo).with_erasure(&erasure);

        let ink = ink_at(&inputs, &params(), Uv::CENTER, [0.78, 0.63, 0.55]).unwrap();
        assert_eq!(ink.alpha, 0.0);
        let frame = render(&inputs, &params());
        assert!(frame.pixels().all(|p| p.0 == [200, 160, 140, 255]));
    }

    #[test]
    fn test_tattoo_only_mode() {
        let photo = create_test_photo();
        let mask = full_mask();
        let tattoo = create_test_tattoo();
        let inputs = FrameInputs::new(&photo, &mask).with_tattoo(&tattoo);
        let params = params().with_mode(RenderMode::TattooOnly);

        let center = shade_pixel(&inputs, &params, Uv::CENTER);
        assert!(center[3] > 0.9);
        assert_eq!(shade_pixel(&inputs, &params, Uv::new(0.02, 0.02)), [0.0; 4]);
    }

    #[test]
    fn test_tattoo_only_mode_is_transparent_off_skin() {
        let photo = create_test_photo();
        let mask = GrayImage::new(16, 12);
        let tattoo = create_test_tattoo();
        let inputs = FrameInputs::new(&photo, &mask).with_tattoo(&tattoo);
        let params = params().with_mode(RenderMode::TattooOnly);

        // overlay covers the center, but there is no skin under it
        assert_eq!(shade_pixel(&inputs, &params, Uv::CENTER), [0.0; 4]);
        let frame = render(&inputs, &params);
        assert!(frame.pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn test_mask_debug_mode() {
        let photo = create_test_photo();
        let mut mask = GrayImage::new(2, 1);
        mask.put_pixel(1, 0, Luma([255]));
        let inputs = FrameInputs::new(&photo, &mask);
        let params = params().with_mode(RenderMode::MaskDebug);

        let right = shade_pixel(&inputs, &params, Uv::new(0.9, 0.5));
        assert!(right[1] > right[0]);
        let left = shade_pixel(&inputs, &params, Uv::new(0.1, 0.5));
        assert_eq!(left[0], left[1]);
        assert!(left[0] < 0.5);
    }

    #[test]
    fn test_without_tattoo_renders_photo() {
        let photo = create_test_photo();
        let mask = full_mask();
        let frame = render(&FrameInputs::new(&photo, &mask), &params());
        assert!(frame.pixels().all(|p| p.0 == [200, 160, 140, 255]));
    }

    #[test]
    fn test_hostile_parameters_do_not_panic() {
        let photo = create_test_photo();
        let mask = full_mask();
        let tattoo = create_test_tattoo();
        let inputs = FrameInputs::new(&photo, &mask).with_tattoo(&tattoo);
        let mut params = params();
        params.transform = Transform {
            position: Uv::new(f32::NAN, 7.0),
            scale: 0.0,
            rotation: f32::INFINITY,
            cylindrical_warp: 5.0,
        };
        params.style.grain = 1e9;
        let _ = render(&inputs, &params);

        let empty = RgbImage::new(0, 0);
        assert_eq!(render(&FrameInputs::new(&empty, &mask), &params).dimensions(), (0, 0));
    }

    #[test]
    fn test_render_into_reuses_buffer() {
        let photo = create_test_photo();
        let mask = full_mask();
        let mut frame = RgbaImage::new(1, 1);
        render_into(&FrameInputs::new(&photo, &mask), &params(), &mut frame);
        assert_eq!(frame.dimensions(), (64, 48));
    }

    #[test]
    fn test_flatten() {
        let frame = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 0]));
        let flat = flatten(&frame, Rgb([255, 255, 255]));
        assert!(flat.pixels().all(|p| p.0 == [255, 255, 255]));
    }
}
