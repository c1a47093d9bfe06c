use crate::{
    algorithms::{LongestSideDownscaler, MorphologicalClose, ThresholdBinarizer},
    models::SkinToneModel,
    pipeline::Pipeline,
    traits::{MaskBinarizer, MaskPostProcessor, SegmentationModel},
};

/// Builder for creating segmentation pipelines with a fluent API
pub struct PipelineBuilder {
    downscaler: LongestSideDownscaler,
    model: Option<Box<dyn SegmentationModel>>,
    binarizer: Option<Box<dyn MaskBinarizer>>,
    postprocessors: Vec<Box<dyn MaskPostProcessor>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            downscaler: LongestSideDownscaler::default(),
            model: None,
            binarizer: None,
            postprocessors: Vec::new(),
        }
    }

    /// Set the segmentation model (replaces any existing one)
    pub fn with_model<M>(mut self, model: M) -> Self
    where
        M: SegmentationModel + 'static,
    {
        self.model = Some(Box::new(model));
        self
    }

    pub fn with_boxed_model(mut self, model: Box<dyn SegmentationModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Longest side the model sees
    pub fn with_max_side(mut self, max_side: u32) -> Self {
        self.downscaler = LongestSideDownscaler::new(max_side);
        self
    }

    /// Use a [`ThresholdBinarizer`] at the given confidence
    pub fn with_threshold(self, threshold: f32) -> Self {
        self.set_binarizer(ThresholdBinarizer { threshold })
    }

    pub fn set_binarizer<B>(mut self, binarizer: B) -> Self
    where
        B: MaskBinarizer + 'static,
    {
        self.binarizer = Some(Box::new(binarizer));
        self
    }

    pub fn add_postprocessor<P>(mut self, postprocessor: P) -> Self
    where
        P: MaskPostProcessor + 'static,
    {
        self.postprocessors.push(Box::new(postprocessor));
        self
    }

    /// Add a morphological close; a zero radius adds nothing
    pub fn with_closing(self, radius: u8) -> Self {
        if radius == 0 {
            return self;
        }
        self.add_postprocessor(MorphologicalClose { radius })
    }

    /// Build the pipeline with default components if not specified
    pub fn build(self) -> Pipeline {
        let model = self.model.unwrap_or_else(|| Box::new(SkinToneModel::default()));
        let binarizer = self.binarizer.unwrap_or_else(|| Box::new(ThresholdBinarizer::default()));

        Pipeline::new(self.downscaler, model, binarizer, self.postprocessors)
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
