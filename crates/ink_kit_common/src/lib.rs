//! # Ink Kit Common - Shared Types and Utilities
//!
//! Value types shared by the segmentation, compositing and studio crates:
//! normalized coordinates, the overlay transform, style presets, lighting and
//! brush state.
//!
//! ## Example
//!
//! ```rust
//! use ink_kit_common::{LightingState, StylePreset, Transform, Uv};
//!
//! let transform = Transform::default();
//! assert_eq!(transform.position, Uv::CENTER);
//!
//! let style = StylePreset::Healed.profile();
//! assert!(style.opacity < 1.0);
//!
//! let light = LightingState::new(90.0);
//! assert!((light.direction().x - 1.0).abs() < 1e-6);
//! ```

pub mod style;

use std::ops::{Add, Div, Mul, Sub};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use style::{InkTint, StylePreset, StyleProfile};

/// A point in normalized texture space.
///
/// Origin is the bottom-left corner, `x` grows to the right and `y` grows
/// upwards; the unit square covers any raster regardless of its resolution.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Uv {
    pub x: f32,
    pub y: f32,
}

impl Uv {
    pub const CENTER: Uv = Uv { x: 0.5, y: 0.5 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Uv) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs())
    }

    pub fn max_element(self) -> f32 {
        self.x.max(self.y)
    }

    /// Rotate about `pivot` by `-angle` radians.
    ///
    /// This is the inverse of the overlay's on-screen rotation, which is what
    /// a per-pixel lookup needs.
    pub fn rotate_inverse_about(self, pivot: Uv, angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let d = self - pivot;
        Uv::new(c * d.x + s * d.y, -s * d.x + c * d.y) + pivot
    }

    /// True when both components lie in `[0, 1]`.
    pub fn in_unit_square(self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }

    /// Box clamp into the unit square, axis by axis.
    pub fn clamp_unit(self) -> Self {
        Self::new(self.x.clamp(0.0, 1.0), self.y.clamp(0.0, 1.0))
    }
}

impl Add for Uv {
    type Output = Uv;
    fn add(self, rhs: Uv) -> Uv {
        Uv::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Uv {
    type Output = Uv;
    fn sub(self, rhs: Uv) -> Uv {
        Uv::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Sub<f32> for Uv {
    type Output = Uv;
    fn sub(self, rhs: f32) -> Uv {
        Uv::new(self.x - rhs, self.y - rhs)
    }
}

impl Mul<f32> for Uv {
    type Output = Uv;
    fn mul(self, rhs: f32) -> Uv {
        Uv::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Uv {
    type Output = Uv;
    fn div(self, rhs: f32) -> Uv {
        Uv::new(self.x / rhs, self.y / rhs)
    }
}

/// A pointer position in displayed-element pixels (y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ViewportPoint {
    pub x: f32,
    pub y: f32,
}

impl ViewportPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Bounding rectangle of the element that displays the composite
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Viewport {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }

    /// A viewport whose element pixels coincide with buffer pixels.
    pub fn identity(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f32, height as f32)
    }

    /// Map an element-space point into a buffer of `buffer_width x buffer_height`.
    ///
    /// Degenerate (zero-sized) elements map everything to the origin.
    pub fn to_buffer(&self, point: ViewportPoint, buffer_width: u32, buffer_height: u32) -> (f32, f32) {
        if self.width <= 0.0 || self.height <= 0.0 {
            return (0.0, 0.0);
        }
        (
            (point.x - self.left) * (buffer_width as f32 / self.width),
            (point.y - self.top) * (buffer_height as f32 / self.height),
        )
    }
}

/// Placement of the overlay on the photograph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Transform {
    /// Overlay center in [`Uv`] space, each axis in `[0, 1]`
    pub position: Uv,
    /// Overlay size relative to the frame, in `[MIN_SCALE, MAX_SCALE]`
    pub scale: f32,
    /// Rotation in radians, unbounded
    pub rotation: f32,
    /// 0 = flat decal, 1 = full cylindrical wrap
    pub cylindrical_warp: f32,
}

impl Transform {
    pub const DEFAULT_SCALE: f32 = 0.3;
    pub const DEFAULT_WARP: f32 = 0.3;
    pub const MIN_SCALE: f32 = 0.05;
    pub const MAX_SCALE: f32 = 2.0;

    /// Center, default scale, no rotation. The wrap intensity is kept because
    /// it describes the limb rather than the overlay placement.
    pub fn reset(&mut self) {
        self.position = Uv::CENTER;
        self.scale = Self::DEFAULT_SCALE;
        self.rotation = 0.0;
    }

    pub fn with_warp(mut self, cylindrical_warp: f32) -> Self {
        self.cylindrical_warp = cylindrical_warp.clamp(0.0, 1.0);
        self
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Uv::CENTER,
            scale: Self::DEFAULT_SCALE,
            rotation: 0.0,
            cylindrical_warp: Self::DEFAULT_WARP,
        }
    }
}

/// Direction the light falls from, as a dial angle in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct LightingState {
    #[schemars(range(min = 0.0, max = 360.0))]
    pub angle_degrees: f32,
}

impl LightingState {
    /// Create a lighting state; the angle is wrapped into `[0, 360)`.
    pub fn new(angle_degrees: f32) -> Self {
        let wrapped = if angle_degrees.is_finite() {
            angle_degrees.rem_euclid(360.0)
        } else {
            0.0
        };
        Self { angle_degrees: wrapped }
    }

    /// Unit 2D light direction in [`Uv`] space; 0° points up the frame.
    pub fn direction(&self) -> Uv {
        let (s, c) = self.angle_degrees.to_radians().sin_cos();
        Uv::new(s, c)
    }
}

/// Width of the erasure brush, in erasure-buffer pixels.
///
/// Discs of this diameter are stamped along every stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BrushState {
    #[schemars(range(min = 10.0, max = 100.0))]
    pub radius: f32,
}

impl BrushState {
    pub const MIN: f32 = 10.0;
    pub const MAX: f32 = 100.0;
    pub const DEFAULT: f32 = 40.0;

    pub fn new(radius: f32) -> Self {
        let radius = if radius.is_finite() { radius } else { Self::DEFAULT };
        Self { radius: radius.clamp(Self::MIN, Self::MAX) }
    }
}

impl Default for BrushState {
    fn default() -> Self {
        Self { radius: Self::DEFAULT }
    }
}

/// Small helpers shared by the binaries
pub mod utils {
    /// Check if a file extension indicates a raster image we can decode
    pub fn is_image_file(filename: &str) -> bool {
        get_file_extension(filename)
            .map(|ext| matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "webp" | "bmp" | "tif" | "tiff" | "gif"))
            .unwrap_or(false)
    }

    /// Get file extension from filename
    pub fn get_file_extension(filename: &str) -> Option<String> {
        std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }
}
