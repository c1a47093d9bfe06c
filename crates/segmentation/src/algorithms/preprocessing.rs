use image::{RgbImage, imageops::{self, FilterType}};
use crate::{error::{Result, SegmentationError}, traits::ImagePreprocessor};

/// Largest side, in pixels, handed to a segmentation model
pub const MAX_INFERENCE_SIDE: u32 = 1024;

/// Uniformly downscales so that the longest side is at most `max_side`.
///
/// Images already within bounds are passed through untouched. Target
/// dimensions are floored, never below one pixel.
#[derive(Debug, Clone)]
pub struct LongestSideDownscaler {
    pub max_side: u32,
    pub filter: FilterType,
}

impl LongestSideDownscaler {
    pub fn new(max_side: u32) -> Self {
        Self {
            max_side: max_side.max(1),
            ..Self::default()
        }
    }

    /// Working dimensions for an image of the given size
    pub fn target_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        let longest = width.max(height);
        if longest == 0 {
            return (0, 0);
        }
        if longest <= self.max_side {
            return (width, height);
        }
        let shrink = |side: u32| ((side as u64 * self.max_side as u64 / longest as u64) as u32).max(1);
        (shrink(width), shrink(height))
    }
}

impl Default for LongestSideDownscaler {
    fn default() -> Self {
        Self {
            max_side: MAX_INFERENCE_SIDE,
            filter: FilterType::Triangle,
        }
    }
}

impl ImagePreprocessor for LongestSideDownscaler {
    fn preprocess(&self, image: &RgbImage) -> Result<RgbImage> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(SegmentationError::EmptyImage);
        }
        let (w, h) = self.target_dimensions(width, height);
        if (w, h) == (width, height) {
            return Ok(image.clone());
        }
        Ok(imageops::resize(image, w, h, self.filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_dimensions_floor_longest_side() {
        let downscaler = LongestSideDownscaler::default();
        assert_eq!(downscaler.target_dimensions(4000, 3000), (1024, 768));
        assert_eq!(downscaler.target_dimensions(3000, 4001), (767, 1024));
        assert_eq!(downscaler.target_dimensions(800, 600), (800, 600));
        assert_eq!(downscaler.target_dimensions(5000, 2), (1024, 1));
    }

    #[test]
    fn test_small_image_passes_through() {
        let image = RgbImage::from_pixel(10, 20, image::Rgb([1, 2, 3]));
        let out = LongestSideDownscaler::default().preprocess(&image).unwrap();
        assert_eq!(out, image);
    }

    #[test]
    fn test_large_image_is_downscaled() {
        let image = RgbImage::new(2048, 512);
        let out = LongestSideDownscaler::default().preprocess(&image).unwrap();
        assert_eq!(out.dimensions(), (1024, 256));
    }

    #[test]
    fn test_empty_image_is_rejected() {
        let image = RgbImage::new(0, 0);
        assert!(matches!(
            LongestSideDownscaler::default().preprocess(&image),
            Err(SegmentationError::EmptyImage)
        ));
    }
}
