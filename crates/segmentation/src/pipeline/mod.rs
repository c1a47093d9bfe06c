pub mod builder;

use image::RgbImage;
use tracing::{debug, info, warn};
use crate::{
    algorithms::{LongestSideDownscaler, resample_confidence},
    error::{Result, SegmentationError},
    traits::{ImagePreprocessor, MaskBinarizer, MaskPostProcessor, SegmentationModel},
    types::{MaskSource, SegmentationMask, SegmentationProgress, SegmentationStage},
};

/// Photograph to binary mask: downscale, infer, binarize, clean up.
///
/// [`Pipeline::run`] never fails. Any model error degrades to an all-white
/// mask so the rest of the editor keeps working.
pub struct Pipeline {
    downscaler: LongestSideDownscaler,
    model: Box<dyn SegmentationModel>,
    binarizer: Box<dyn MaskBinarizer>,
    postprocessors: Vec<Box<dyn MaskPostProcessor>>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    pub fn new(
        downscaler: LongestSideDownscaler,
        model: Box<dyn SegmentationModel>,
        binarizer: Box<dyn MaskBinarizer>,
        postprocessors: Vec<Box<dyn MaskPostProcessor>>,
    ) -> Self {
        Self {
            downscaler,
            model,
            binarizer,
            postprocessors,
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Working dimensions a photograph of this size is segmented at
    pub fn working_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        self.downscaler.target_dimensions(width, height)
    }

    /// Segment a photograph, reporting each stage through `on_progress`.
    ///
    /// The last reported stage is always [`SegmentationStage::Complete`].
    pub fn run(
        &self,
        photo: &RgbImage,
        on_progress: &mut dyn FnMut(SegmentationProgress),
    ) -> SegmentationMask {
        on_progress(SegmentationProgress::new(SegmentationStage::Initializing));

        match self.try_run(photo, on_progress) {
            Ok(mask) => {
                info!(
                    model = self.model.name(),
                    width = mask.width(),
                    height = mask.height(),
                    coverage = mask.coverage(),
                    "Segmentation complete"
                );
                on_progress(SegmentationProgress::new(SegmentationStage::Complete));
                mask
            }
            Err(err) => {
                warn!(model = self.model.name(), error = %err, "Segmentation failed, using full-frame mask");
                let (w, h) = self.working_dimensions(photo.width(), photo.height());
                on_progress(SegmentationProgress::with_status(
                    SegmentationStage::Complete,
                    "Body not detected, using full frame",
                ));
                SegmentationMask::full_frame(w, h, err.to_string())
            }
        }
    }

    /// Same as [`Pipeline::run`] but surfaces the model error instead of
    /// substituting the full-frame mask
    pub fn try_run(
        &self,
        photo: &RgbImage,
        on_progress: &mut dyn FnMut(SegmentationProgress),
    ) -> Result<SegmentationMask> {
        if photo.width() == 0 || photo.height() == 0 {
            return Err(SegmentationError::EmptyImage);
        }

        on_progress(SegmentationProgress::new(SegmentationStage::LoadingModel));
        self.model.load()?;

        on_progress(SegmentationProgress::new(SegmentationStage::Processing));
        let working = self.downscaler.preprocess(photo)?;
        debug!(
            from = ?photo.dimensions(),
            to = ?working.dimensions(),
            "Prepared photograph for inference"
        );

        let confidence = self.model.infer(&working)?;
        let confidence = resample_confidence(&confidence, working.width(), working.height())?;

        let mut mask = self.binarizer.binarize(&confidence)?;
        for postprocessor in &self.postprocessors {
            mask = postprocessor.process(&mask)?;
        }

        Ok(SegmentationMask {
            image: mask,
            source: MaskSource::Model { model: self.model.name().to_string() },
        })
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        format!(
            "Pipeline: model '{}', max side {}, {} postprocessors",
            self.model.name(),
            self.downscaler.max_side,
            self.postprocessors.len()
        )
    }
}
