use std::{path::Path, sync::Arc};

use image::{DynamicImage, RgbImage, RgbaImage};
use segmentation::SegmentationMask;
use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};
use tracing::{info, warn};

use crate::error::{Result, StudioError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Display, IntoStaticStr, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum AssetKind {
    Photograph,
    Tattoo,
}

/// Current photograph, overlay and mask.
///
/// Swaps are atomic: a failed decode leaves the previous asset in place.
/// Replacing the photograph drops the mask computed for the old one.
#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    photo: Option<Arc<RgbImage>>,
    tattoo: Option<Arc<RgbaImage>>,
    mask: Option<SegmentationMask>,
}

fn decode(kind: AssetKind, bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| {
        warn!(%kind, error = %e, "Rejected undecodable asset");
        StudioError::AssetDecode { kind, reason: e.to_string() }
    })
}

fn non_empty(kind: AssetKind, image: DynamicImage) -> Result<DynamicImage> {
    if image.width() == 0 || image.height() == 0 {
        return Err(StudioError::AssetDecode { kind, reason: "image has no pixels".into() });
    }
    Ok(image)
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn photo(&self) -> Option<&Arc<RgbImage>> {
        self.photo.as_ref()
    }

    pub fn tattoo(&self) -> Option<&Arc<RgbaImage>> {
        self.tattoo.as_ref()
    }

    pub fn mask(&self) -> Option<&SegmentationMask> {
        self.mask.as_ref()
    }

    /// Install a photograph and invalidate its mask
    pub fn set_photo(&mut self, photo: RgbImage) -> Result<Arc<RgbImage>> {
        let photo = non_empty(AssetKind::Photograph, DynamicImage::ImageRgb8(photo))?.into_rgb8();
        info!(width = photo.width(), height = photo.height(), "Photograph loaded");
        let photo = Arc::new(photo);
        self.photo = Some(Arc::clone(&photo));
        self.mask = None;
        Ok(photo)
    }

    /// Decode any supported container into the photograph
    pub fn set_photo_bytes(&mut self, bytes: &[u8]) -> Result<Arc<RgbImage>> {
        let image = non_empty(AssetKind::Photograph, decode(AssetKind::Photograph, bytes)?)?;
        self.set_photo(image.into_rgb8())
    }

    pub fn set_tattoo(&mut self, tattoo: RgbaImage) -> Result<Arc<RgbaImage>> {
        let tattoo = non_empty(AssetKind::Tattoo, DynamicImage::ImageRgba8(tattoo))?.into_rgba8();
        info!(width = tattoo.width(), height = tattoo.height(), "Tattoo loaded");
        let tattoo = Arc::new(tattoo);
        self.tattoo = Some(Arc::clone(&tattoo));
        Ok(tattoo)
    }

    /// Decode an overlay; images without alpha become fully opaque
    pub fn set_tattoo_bytes(&mut self, bytes: &[u8]) -> Result<Arc<RgbaImage>> {
        let image = non_empty(AssetKind::Tattoo, decode(AssetKind::Tattoo, bytes)?)?;
        self.set_tattoo(image.into_rgba8())
    }

    pub fn set_mask(&mut self, mask: SegmentationMask) {
        self.mask = Some(mask);
    }

    /// Read an asset file; I/O errors are reported as decode failures
    pub fn read_asset(kind: AssetKind, path: impl AsRef<Path>) -> Result<Vec<u8>> {
        let path = path.as_ref();
        std::fs::read(path).map_err(|e| StudioError::AssetDecode {
            kind,
            reason: format!("{}: {e}", path.display()),
        })
    }
}
