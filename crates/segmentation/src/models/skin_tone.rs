use image::{ImageBuffer, Luma, RgbImage};
use crate::{
    error::{Result, SegmentationError},
    traits::SegmentationModel,
    types::ConfidenceMap,
};

/// Chroma-space skin classifier.
///
/// Scores each pixel by a Gaussian around a skin cluster in the YCbCr
/// plane, attenuated in deep shadow where chroma is unreliable. Needs no
/// weights, which makes it the default model.
#[derive(Debug, Clone)]
pub struct SkinToneModel {
    pub cb_center: f32,
    pub cr_center: f32,
    pub cb_sigma: f32,
    pub cr_sigma: f32,
    /// Luma below which confidence fades linearly to zero
    pub shadow_luma: f32,
    /// Peak confidence a photograph must reach to count as containing a body
    pub min_peak: f32,
}

impl Default for SkinToneModel {
    fn default() -> Self {
        Self {
            cb_center: 102.0,
            cr_center: 153.0,
            cb_sigma: 14.0,
            cr_sigma: 12.0,
            shadow_luma: 40.0,
            min_peak: 0.2,
        }
    }
}

impl SkinToneModel {
    /// Confidence for a single 8-bit RGB pixel
    pub fn score(&self, rgb: [u8; 3]) -> f32 {
        let [r, g, b] = rgb.map(f32::from);
        let y = 0.299 * r + 0.587 * g + 0.114 * b;
        let cb = 128.0 - 0.168_736 * r - 0.331_264 * g + 0.5 * b;
        let cr = 128.0 + 0.5 * r - 0.418_688 * g - 0.081_312 * b;

        let dcb = (cb - self.cb_center) / self.cb_sigma.max(f32::EPSILON);
        let dcr = (cr - self.cr_center) / self.cr_sigma.max(f32::EPSILON);
        let chroma = (-0.5 * (dcb * dcb + dcr * dcr)).exp();

        let shade = if self.shadow_luma > 0.0 {
            (y / self.shadow_luma).clamp(0.0, 1.0)
        } else {
            1.0
        };
        (chroma * shade).clamp(0.0, 1.0)
    }
}

impl SegmentationModel for SkinToneModel {
    fn name(&self) -> &str {
        "skin-tone"
    }

    fn infer(&self, image: &RgbImage) -> Result<ConfidenceMap> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(SegmentationError::EmptyImage);
        }

        let map: ConfidenceMap =
            ImageBuffer::from_fn(width, height, |x, y| Luma([self.score(image.get_pixel(x, y).0)]));

        let peak = map.as_raw().iter().copied().fold(0.0f32, f32::max);
        if peak < self.min_peak {
            return Err(SegmentationError::NoBodyDetected);
        }
        Ok(map)
    }
}
