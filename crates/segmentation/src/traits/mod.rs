use image::{GrayImage, RgbImage};
use crate::{error::Result, types::ConfidenceMap};

/// A swappable body/skin segmentation model.
///
/// Implementations return a confidence map whose values are in `[0, 1]`.
/// The map does not need to match the input's dimensions; the pipeline
/// resamples it onto the working resolution.
pub trait SegmentationModel: Send + Sync {
    /// Short identifier used in logs and mask provenance
    fn name(&self) -> &str;

    /// Acquire weights or other resources. Called before every inference,
    /// so implementations should cache what they load.
    fn load(&self) -> Result<()> {
        Ok(())
    }

    /// Compute per-pixel body confidence for the photograph
    fn infer(&self, image: &RgbImage) -> Result<ConfidenceMap>;
}

/// Trait for photograph preparation before inference (e.g., downscaling)
pub trait ImagePreprocessor: Send + Sync {
    fn preprocess(&self, image: &RgbImage) -> Result<RgbImage>;
}

/// Trait for turning a confidence map into a binary mask
pub trait MaskBinarizer: Send + Sync {
    fn binarize(&self, confidence: &ConfidenceMap) -> Result<GrayImage>;
}

/// Trait for binary mask clean-up steps
pub trait MaskPostProcessor: Send + Sync {
    fn process(&self, mask: &GrayImage) -> Result<GrayImage>;
}
