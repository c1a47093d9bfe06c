use image::{ImageBuffer, Pixel};
use ink_kit_common::Uv;

/// Normalized RGBA, each channel in `[0, 1]`
pub type Rgba32 = [f32; 4];

#[inline]
fn texel<P>(img: &ImageBuffer<P, Vec<u8>>, x: i64, y: i64) -> Rgba32
where
    P: Pixel<Subpixel = u8>,
{
    let cx = x.clamp(0, img.width() as i64 - 1) as u32;
    let cy = y.clamp(0, img.height() as i64 - 1) as u32;
    let p = img.get_pixel(cx, cy).to_rgba();
    [
        p[0] as f32 / 255.0,
        p[1] as f32 / 255.0,
        p[2] as f32 / 255.0,
        p[3] as f32 / 255.0,
    ]
}

/// Continuous texel coordinates for a [`Uv`] on a `width x height` raster.
///
/// Texel centers sit at half-integers, and `v` is flipped so that `v = 1`
/// is the top row.
#[inline]
pub fn uv_to_texel(uv: Uv, width: u32, height: u32) -> (f32, f32) {
    (uv.x * width as f32 - 0.5, (1.0 - uv.y) * height as f32 - 0.5)
}

/// [`Uv`] of the center of pixel `(x, y)`
#[inline]
pub fn pixel_center_uv(x: u32, y: u32, width: u32, height: u32) -> Uv {
    Uv::new(
        (x as f32 + 0.5) / width.max(1) as f32,
        1.0 - (y as f32 + 0.5) / height.max(1) as f32,
    )
}

/// Bilinear sample with clamp-to-edge addressing.
///
/// Any 8-bit pixel layout is widened to RGBA first, so a grayscale mask
/// reads back its value in the red channel. Empty rasters and non-finite
/// coordinates sample as transparent black.
pub fn sample_bilinear<P>(img: &ImageBuffer<P, Vec<u8>>, uv: Uv) -> Rgba32
where
    P: Pixel<Subpixel = u8>,
{
    if img.width() == 0 || img.height() == 0 || !uv.x.is_finite() || !uv.y.is_finite() {
        return [0.0; 4];
    }
    let (fx, fy) = uv_to_texel(uv, img.width(), img.height());
    let x0 = fx.floor();
    let y0 = fy.floor();
    let dx = fx - x0;
    let dy = fy - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let p00 = texel(img, x0, y0);
    let p10 = texel(img, x0 + 1, y0);
    let p01 = texel(img, x0, y0 + 1);
    let p11 = texel(img, x0 + 1, y0 + 1);

    let mut out = [0.0f32; 4];
    for c in 0..4 {
        out[c] = p00[c] * (1.0 - dx) * (1.0 - dy)
            + p10[c] * dx * (1.0 - dy)
            + p01[c] * (1.0 - dx) * dy
            + p11[c] * dx * dy;
    }
    out
}

/// Red channel of a bilinear sample; the value masks are read through
#[inline]
pub fn sample_red<P>(img: &ImageBuffer<P, Vec<u8>>, uv: Uv) -> f32
where
    P: Pixel<Subpixel = u8>,
{
    sample_bilinear(img, uv)[0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba, RgbaImage};

    #[test]
    fn test_pixel_centers_sample_exactly() {
        let mut img = RgbaImage::new(4, 2);
        img.put_pixel(3, 0, Rgba([255, 0, 0, 255]));
        // top-right pixel is at high v
        let uv = pixel_center_uv(3, 0, 4, 2);
        assert!(uv.y > 0.5);
        let s = sample_bilinear(&img, uv);
        assert!((s[0] - 1.0).abs() < 1e-4);
        assert!((s[3] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_clamp_to_edge() {
        let mut mask = GrayImage::new(2, 2);
        mask.put_pixel(0, 1, Luma([255]));
        // bottom-left corner and beyond
        assert!((sample_red(&mask, Uv::new(-3.0, -3.0)) - 1.0).abs() < 1e-6);
        assert_eq!(sample_red(&mask, Uv::new(5.0, 5.0)), 0.0);
    }

    #[test]
    fn test_bilinear_midpoint() {
        let mut mask = GrayImage::new(2, 1);
        mask.put_pixel(1, 0, Luma([255]));
        let mid = sample_red(&mask, Uv::new(0.5, 0.5));
        assert!((mid - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_degenerate_inputs() {
        let empty = GrayImage::new(0, 0);
        assert_eq!(sample_bilinear(&empty, Uv::CENTER), [0.0; 4]);
        let img = GrayImage::from_pixel(2, 2, Luma([255]));
        assert_eq!(sample_bilinear(&img, Uv::new(f32::NAN, 0.5)), [0.0; 4]);
    }
}
