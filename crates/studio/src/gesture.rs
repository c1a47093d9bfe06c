//! Pointer gestures and the pure reducer that turns them into transforms.

use ink_kit_common::{Transform, Uv};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};
use tracing::trace;

/// Position change per pointer pixel
pub const DRAG_SENSITIVITY: f32 = 0.0015;
/// Pinch distance, in pixels, that corresponds to scale 1
pub const PINCH_REFERENCE_DISTANCE: f32 = 50.0;
/// Scale change per wheel unit
pub const WHEEL_SCALE_STEP: f32 = 0.001;
/// Rotation change, in radians, per wheel unit with the modifier held
pub const WHEEL_ROTATION_STEP: f32 = 0.01;
pub const WHEEL_MIN_SCALE: f32 = 0.05;
pub const WHEEL_MAX_SCALE: f32 = 1.5;
/// Bounds of the direct scale control
pub const SLIDER_MIN_SCALE: f32 = 0.1;
pub const SLIDER_MAX_SCALE: f32 = 1.5;

/// Which kind of pointer input the editor currently accepts
#[derive(
    Debug, Clone, Copy, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq, Hash
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InteractionMode {
    /// Gestures move, scale and rotate the overlay
    #[default]
    Transform,
    /// Pointer strokes paint the erasure mask; transform gestures are locked
    Erase,
}

/// A single pointer gesture event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
pub enum Gesture {
    /// Pointer movement in element pixels (y grows downwards)
    Drag { dx: f32, dy: f32 },
    /// Absolute two-finger distance in pixels and angle in radians
    Pinch { distance: f32, angle: f32 },
    /// Wheel delta; `modifier` is true while ctrl/cmd is held
    Wheel { delta_y: f32, modifier: bool },
}

/// Apply one gesture to a transform.
///
/// Non-finite input leaves the transform unchanged, as does any gesture
/// while erasing. A pinch outside the scale bounds still applies its angle.
pub fn reduce(prior: Transform, gesture: &Gesture, mode: InteractionMode) -> Transform {
    if mode != InteractionMode::Transform {
        trace!(?gesture, "Transform gestures are locked while erasing");
        return prior;
    }

    let mut next = prior;
    match *gesture {
        Gesture::Drag { dx, dy } => {
            if !(dx.is_finite() && dy.is_finite()) {
                return prior;
            }
            next.position = Uv::new(
                prior.position.x + dx * DRAG_SENSITIVITY,
                prior.position.y - dy * DRAG_SENSITIVITY,
            )
            .clamp_unit();
        }
        Gesture::Pinch { distance, angle } => {
            if !(distance.is_finite() && angle.is_finite()) {
                return prior;
            }
            let scale = distance / PINCH_REFERENCE_DISTANCE;
            if scale > Transform::MIN_SCALE && scale < Transform::MAX_SCALE {
                next.scale = scale;
            }
            next.rotation = angle;
        }
        Gesture::Wheel { delta_y, modifier } => {
            if !delta_y.is_finite() {
                return prior;
            }
            if modifier {
                next.rotation = prior.rotation + delta_y * WHEEL_ROTATION_STEP;
            } else {
                next.scale = (prior.scale - delta_y * WHEEL_SCALE_STEP)
                    .clamp(WHEEL_MIN_SCALE, WHEEL_MAX_SCALE);
            }
        }
    }
    next
}

/// Owns the overlay transform and the interaction mode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformController {
    transform: Transform,
    mode: InteractionMode,
}

impl TransformController {
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            mode: InteractionMode::default(),
        }
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: InteractionMode) {
        self.mode = mode;
    }

    /// Apply a gesture; returns whether the transform changed
    pub fn apply(&mut self, gesture: &Gesture) -> bool {
        let next = reduce(self.transform, gesture, self.mode);
        let changed = next != self.transform;
        self.transform = next;
        changed
    }

    /// Direct scale control, clamped to the slider range
    pub fn set_scale(&mut self, scale: f32) {
        if scale.is_finite() {
            self.transform.scale = scale.clamp(SLIDER_MIN_SCALE, SLIDER_MAX_SCALE);
        }
    }

    pub fn set_cylindrical_warp(&mut self, warp: f32) {
        if warp.is_finite() {
            self.transform.cylindrical_warp = warp.clamp(0.0, 1.0);
        }
    }

    pub fn reset(&mut self) {
        self.transform.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform_at(x: f32, y: f32) -> Transform {
        Transform { position: Uv::new(x, y), ..Transform::default() }
    }

    #[test]
    fn test_drag_moves_with_sensitivity() {
        let next = reduce(Transform::default(), &Gesture::Drag { dx: 100.0, dy: 100.0 }, InteractionMode::Transform);
        assert!((next.position.x - 0.65).abs() < 1e-6);
        // pointer y grows downwards, uv y grows upwards
        assert!((next.position.y - 0.35).abs() < 1e-6);
    }

    #[test]
    fn test_drag_box_clamp_per_axis() {
        let next = reduce(transform_at(0.1, 0.5), &Gesture::Drag { dx: -1000.0, dy: 10.0 }, InteractionMode::Transform);
        assert_eq!(next.position.x, 0.0);
        assert!((next.position.y - 0.485).abs() < 1e-6);

        let next = reduce(transform_at(0.9, 0.9), &Gesture::Drag { dx: 1000.0, dy: -1000.0 }, InteractionMode::Transform);
        assert_eq!(next.position, Uv::new(1.0, 1.0));
    }

    #[test]
    fn test_pinch_is_absolute() {
        let pinch = Gesture::Pinch { distance: 75.0, angle: 0.4 };
        let once = reduce(Transform::default(), &pinch, InteractionMode::Transform);
        let twice = reduce(once, &pinch, InteractionMode::Transform);
        assert_eq!(once.scale, 1.5);
        assert_eq!(once.rotation, 0.4);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_pinch_out_of_range_keeps_scale_but_rotates() {
        let prior = Transform { scale: 0.7, rotation: 0.2, ..Transform::default() };
        for distance in [0.0, 2.5, 100.0, 400.0] {
            let next = reduce(prior, &Gesture::Pinch { distance, angle: 1.0 }, InteractionMode::Transform);
            assert_eq!(next.scale, 0.7, "distance {distance}");
            assert_eq!(next.rotation, 1.0, "distance {distance}");
            assert_eq!(next.position, prior.position);
        }
    }

    #[test]
    fn test_non_finite_pinch_is_ignored() {
        let prior = Transform { scale: 0.7, rotation: 0.2, ..Transform::default() };
        for (distance, angle) in [(f32::NAN, 1.0), (60.0, f32::INFINITY)] {
            let next = reduce(prior, &Gesture::Pinch { distance, angle }, InteractionMode::Transform);
            assert_eq!(next, prior);
        }
    }

    #[test]
    fn test_wheel_scale_is_clamped() {
        let prior = Transform { scale: 1.45, ..Transform::default() };
        let next = reduce(prior, &Gesture::Wheel { delta_y: -200.0, modifier: false }, InteractionMode::Transform);
        assert_eq!(next.scale, 1.5);

        let next = reduce(prior, &Gesture::Wheel { delta_y: 5000.0, modifier: false }, InteractionMode::Transform);
        assert_eq!(next.scale, 0.05);
    }

    #[test]
    fn test_wheel_with_modifier_rotates_unbounded() {
        let mut transform = Transform::default();
        for _ in 0..1000 {
            transform = reduce(transform, &Gesture::Wheel { delta_y: 100.0, modifier: true }, InteractionMode::Transform);
        }
        assert!((transform.rotation - 1000.0).abs() < 1e-2);
        assert_eq!(transform.scale, Transform::DEFAULT_SCALE);
    }

    #[test]
    fn test_gestures_locked_while_erasing() {
        let prior = Transform::default();
        for gesture in [
            Gesture::Drag { dx: 50.0, dy: 50.0 },
            Gesture::Pinch { distance: 60.0, angle: 1.0 },
            Gesture::Wheel { delta_y: 10.0, modifier: false },
        ] {
            assert_eq!(reduce(prior, &gesture, InteractionMode::Erase), prior);
        }
    }

    #[test]
    fn test_controller_setters() {
        let mut controller = TransformController::default();
        controller.set_scale(3.0);
        assert_eq!(controller.transform().scale, 1.5);
        controller.set_scale(0.01);
        assert_eq!(controller.transform().scale, 0.1);
        controller.set_cylindrical_warp(-1.0);
        assert_eq!(controller.transform().cylindrical_warp, 0.0);

        assert!(controller.apply(&Gesture::Drag { dx: 10.0, dy: 0.0 }));
        controller.set_mode(InteractionMode::Erase);
        assert!(!controller.apply(&Gesture::Drag { dx: 10.0, dy: 0.0 }));

        controller.reset();
        assert_eq!(controller.transform().position, Uv::CENTER);
        assert_eq!(controller.transform().cylindrical_warp, 0.0);
    }

    #[test]
    fn test_gesture_serde_shape() {
        let json = serde_json::to_string(&Gesture::Wheel { delta_y: 3.0, modifier: true }).unwrap();
        assert_eq!(json, r#"{"type":"wheel","params":{"delta_y":3.0,"modifier":true}}"#);
    }
}
