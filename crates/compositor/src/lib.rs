//! # Compositor
//!
//! Per-pixel tattoo compositing. A frame is a pure function of the
//! photograph, its skin mask, the overlay, the erasure buffer and a
//! [`RenderParams`]; nothing is cached between frames.
//!
//! Per pixel the engine:
//!
//! 1. leaves non-skin pixels untouched,
//! 2. maps the frame coordinate into overlay space ([`geometry`]),
//! 3. shades the overlay sample against the photograph's relief and the
//!    light direction ([`shading`]),
//! 4. fades it at the overlay border and wherever it has been erased.
//!
//! Rows are shaded in parallel with rayon.
//!
//! ```rust
//! use compositor::{FrameInputs, RenderParams, render};
//! use image::{GrayImage, Luma, RgbImage, RgbaImage, Rgb, Rgba};
//!
//! let photo = RgbImage::from_pixel(64, 64, Rgb([210, 170, 150]));
//! let mask = GrayImage::from_pixel(32, 32, Luma([255]));
//! let tattoo = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 255]));
//!
//! let inputs = FrameInputs::new(&photo, &mask).with_tattoo(&tattoo);
//! let frame = render(&inputs, &RenderParams::default());
//! assert_eq!(frame.dimensions(), (64, 64));
//! ```

pub mod engine;
pub mod geometry;
pub mod params;
pub mod sampler;
pub mod shading;

pub use engine::{FrameInputs, InkSample, flatten, ink_at, render, render_into, shade_pixel};
pub use params::{RenderMode, RenderParams};

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};
    use ink_kit_common::{LightingState, StylePreset, Transform, Uv};

    fn create_test_photo() -> RgbImage {
        // horizontal luminance ramp so the relief term is non-trivial
        RgbImage::from_fn(80, 60, |x, _| {
            let v = 120 + (x as u8 % 40) * 2;
            Rgb([v, v - 30, v - 50])
        })
    }

    fn create_test_tattoo() -> RgbaImage {
        RgbaImage::from_fn(40, 40, |x, y| {
            if (x / 10 + y / 10) % 2 == 0 {
                Rgba([220, 30, 40, 255])
            } else {
                Rgba([15, 15, 15, 200])
            }
        })
    }

    #[test]
    fn test_overlay_center_is_inked_for_every_style() {
        let photo = create_test_photo();
        let mask = GrayImage::from_pixel(40, 30, Luma([255]));
        let tattoo = create_test_tattoo();
        let inputs = FrameInputs::new(&photo, &mask).with_tattoo(&tattoo);

        for preset in [StylePreset::Fresh, StylePreset::Healed, StylePreset::Aged, StylePreset::Blackwork] {
            for angle in [0.0, 90.0, 215.0] {
                let params = RenderParams {
                    style: preset.profile(),
                    lighting: LightingState::new(angle),
                    ..RenderParams::default()
                };
                let ink = ink_at(&inputs, &params, Uv::CENTER, [0.6, 0.5, 0.4]).unwrap();
                assert!(ink.alpha > 0.0, "{preset} at {angle}");
                assert!(ink.color.iter().all(|c| c.is_finite()));
            }
        }
    }

    #[test]
    fn test_moved_overlay_follows_position() {
        let photo = create_test_photo();
        let mask = GrayImage::from_pixel(40, 30, Luma([255]));
        let tattoo = create_test_tattoo();
        let inputs = FrameInputs::new(&photo, &mask).with_tattoo(&tattoo);
        let params = RenderParams {
            transform: Transform {
                position: Uv::new(0.8, 0.25),
                ..Transform::default()
            },
            ..RenderParams::default()
        };

        assert!(ink_at(&inputs, &params, Uv::new(0.8, 0.25), [0.5; 3]).is_some());
        assert!(ink_at(&inputs, &params, Uv::CENTER, [0.5; 3]).is_none());
    }

    #[test]
    fn test_frames_are_deterministic() {
        let photo = create_test_photo();
        let mask = GrayImage::from_pixel(40, 30, Luma([255]));
        let tattoo = create_test_tattoo();
        let inputs = FrameInputs::new(&photo, &mask).with_tattoo(&tattoo);
        let params = RenderParams {
            style: StylePreset::Aged.profile(),
            ..RenderParams::default()
        };
        assert_eq!(render(&inputs, &params), render(&inputs, &params));
    }

    #[test]
    fn test_resolution_independent_inputs() {
        let photo = create_test_photo();
        let small_mask = GrayImage::from_pixel(3, 2, Luma([255]));
        let big_mask = GrayImage::from_pixel(400, 300, Luma([255]));
        let tattoo = create_test_tattoo();
        let params = RenderParams::default();

        let a = render(&FrameInputs::new(&photo, &small_mask).with_tattoo(&tattoo), &params);
        let b = render(&FrameInputs::new(&photo, &big_mask).with_tattoo(&tattoo), &params);
        assert_eq!(a, b);
    }
}
