use std::{path::PathBuf, sync::OnceLock};

use image::{GrayImage, ImageBuffer, Luma, RgbImage};
use tracing::debug;
use crate::{
    error::{Result, SegmentationError},
    traits::SegmentationModel,
    types::ConfidenceMap,
};

/// A model backed by a precomputed grayscale confidence image, where 255
/// is full confidence.
///
/// Useful for masks produced by an external segmenter. File-backed maps
/// are read on the first [`SegmentationModel::load`] and cached.
#[derive(Debug)]
pub struct ConfidenceMapModel {
    path: Option<PathBuf>,
    map: OnceLock<GrayImage>,
}

impl ConfidenceMapModel {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            map: OnceLock::new(),
        }
    }

    pub fn from_image(map: GrayImage) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(map);
        Self { path: None, map: cell }
    }

    fn model_load_error(&self, reason: impl Into<String>) -> SegmentationError {
        SegmentationError::ModelLoad {
            model: self.name().to_string(),
            reason: reason.into(),
        }
    }
}

impl SegmentationModel for ConfidenceMapModel {
    fn name(&self) -> &str {
        "confidence-map"
    }

    fn load(&self) -> Result<()> {
        if self.map.get().is_some() {
            return Ok(());
        }
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| self.model_load_error("no confidence map source"))?;
        let map = image::open(path)
            .map_err(|e| self.model_load_error(format!("{}: {e}", path.display())))?
            .to_luma8();
        debug!(path = %path.display(), dimensions = ?map.dimensions(), "Loaded confidence map");
        let _ = self.map.set(map);
        Ok(())
    }

    fn infer(&self, image: &RgbImage) -> Result<ConfidenceMap> {
        if image.width() == 0 || image.height() == 0 {
            return Err(SegmentationError::EmptyImage);
        }
        let map = self
            .map
            .get()
            .ok_or_else(|| self.model_load_error("model not loaded"))?;
        if map.width() == 0 || map.height() == 0 {
            return Err(SegmentationError::Inference("confidence map is empty".into()));
        }
        Ok(ImageBuffer::from_fn(map.width(), map.height(), |x, y| {
            Luma([map.get_pixel(x, y).0[0] as f32 / 255.0])
        }))
    }
}
