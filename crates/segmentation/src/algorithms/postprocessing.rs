use image::{
    GrayImage, ImageBuffer,
    imageops::{self, FilterType},
};
use imageproc::distance_transform::Norm;
use crate::{
    error::{Result, SegmentationError},
    traits::{MaskBinarizer, MaskPostProcessor},
    types::ConfidenceMap,
};

/// Confidence at or above which a pixel counts as body
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.2;

/// Fixed-threshold binarization: `>= threshold` is 255, everything else
/// (including NaN) is 0.
#[derive(Debug, Clone)]
pub struct ThresholdBinarizer {
    pub threshold: f32,
}

impl Default for ThresholdBinarizer {
    fn default() -> Self {
        Self { threshold: DEFAULT_CONFIDENCE_THRESHOLD }
    }
}

impl MaskBinarizer for ThresholdBinarizer {
    fn binarize(&self, confidence: &ConfidenceMap) -> Result<GrayImage> {
        let (width, height) = confidence.dimensions();
        if width == 0 || height == 0 {
            return Err(SegmentationError::EmptyImage);
        }
        let pixels = confidence
            .as_raw()
            .iter()
            .map(|&c| if c >= self.threshold { 255u8 } else { 0u8 })
            .collect();
        ImageBuffer::from_raw(width, height, pixels)
            .ok_or_else(|| SegmentationError::Inference("confidence buffer size mismatch".into()))
    }
}

/// Morphological closing to fill pinholes in the mask
#[derive(Debug, Clone)]
pub struct MorphologicalClose {
    pub radius: u8,
}

impl Default for MorphologicalClose {
    fn default() -> Self {
        Self { radius: 2 }
    }
}

impl MaskPostProcessor for MorphologicalClose {
    fn process(&self, mask: &GrayImage) -> Result<GrayImage> {
        if self.radius == 0 {
            return Ok(mask.clone());
        }
        Ok(imageproc::morphology::close(mask, Norm::LInf, self.radius))
    }
}

/// Nearest-neighbour resample of a confidence map
pub fn resample_confidence(map: &ConfidenceMap, width: u32, height: u32) -> Result<ConfidenceMap> {
    let (src_w, src_h) = map.dimensions();
    if src_w == 0 || src_h == 0 {
        return Err(SegmentationError::EmptyImage);
    }
    Ok(imageops::resize(map, width, height, FilterType::Nearest))
}
