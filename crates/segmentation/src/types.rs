use image::{GrayImage, ImageBuffer, Luma};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

/// Per-pixel body confidence in `[0, 1]`, as produced by a model
pub type ConfidenceMap = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Where a mask came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaskSource {
    /// Binarized model output
    Model { model: String },
    /// All-white substitute after the model failed; the reason is kept for status display
    Fallback { reason: String },
}

/// Binary skin/body mask aligned to the (possibly downscaled) photograph.
///
/// Pixels are either 0 (background) or 255 (eligible skin).
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationMask {
    pub image: GrayImage,
    pub source: MaskSource,
}

impl SegmentationMask {
    /// An all-white mask: the whole frame is eligible surface.
    pub fn full_frame(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self {
            image: GrayImage::from_pixel(width.max(1), height.max(1), Luma([255u8])),
            source: MaskSource::Fallback { reason: reason.into() },
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.source, MaskSource::Fallback { .. })
    }

    /// Fraction of pixels marked as skin
    pub fn coverage(&self) -> f32 {
        let total = self.image.as_raw().len();
        if total == 0 {
            return 0.0;
        }
        let positive = self.image.as_raw().iter().filter(|&&v| v > 0).count();
        positive as f32 / total as f32
    }
}

/// Discrete stages reported while a mask is being computed
#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize,
    Display, EnumIter, IntoStaticStr,
    PartialEq, Eq, PartialOrd, Ord
)]
#[strum(serialize_all = "snake_case")]
pub enum SegmentationStage {
    Initializing,
    LoadingModel,
    Processing,
    Complete,
}

impl SegmentationStage {
    pub fn percent(&self) -> u8 {
        match self {
            Self::Initializing => 0,
            Self::LoadingModel => 10,
            Self::Processing => 40,
            Self::Complete => 100,
        }
    }

    pub fn default_status(&self) -> &'static str {
        match self {
            Self::Initializing => "Initializing...",
            Self::LoadingModel => "Loading model...",
            Self::Processing => "Processing...",
            Self::Complete => "Ready",
        }
    }
}

/// Observable progress of one segmentation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationProgress {
    pub stage: SegmentationStage,
    pub percent: u8,
    pub status: String,
}

impl SegmentationProgress {
    pub fn new(stage: SegmentationStage) -> Self {
        Self::with_status(stage, stage.default_status())
    }

    pub fn with_status(stage: SegmentationStage, status: impl Into<String>) -> Self {
        Self {
            stage,
            percent: stage.percent(),
            status: status.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.stage == SegmentationStage::Complete
    }
}

impl Default for SegmentationProgress {
    fn default() -> Self {
        Self::new(SegmentationStage::Initializing)
    }
}
