//! Mapping between frame coordinates and overlay coordinates.
//!
//! Frame to overlay is translate, inverse-rotate about the frame center,
//! cylindrical unwarp of the horizontal axis, then divide by scale about
//! the center. [`project`] runs the chain backwards.

use std::f32::consts::FRAC_PI_2;

use ink_kit_common::{Transform, Uv};

/// Chord offsets are clamped to this before `asin`
pub const ASIN_LIMIT: f32 = 0.99;

/// Smallest scale divided by
pub const SCALE_FLOOR: f32 = 1e-3;

const INVERT_ITERATIONS: usize = 64;

/// Translate by `-(position - 0.5)` then rotate by `-rotation` about the center.
#[inline]
pub fn inverse_reproject(uv: Uv, transform: &Transform) -> Uv {
    (uv - (transform.position - 0.5)).rotate_inverse_about(Uv::CENTER, transform.rotation)
}

/// Blend a chord offset `x` in `[-1, 1]` with its arc-length position on a
/// unit cylinder: `mix(x, asin(x) / (π/2), warp)`.
#[inline]
pub fn unwarp_offset(x: f32, warp: f32) -> f32 {
    let cylinder = x.clamp(-ASIN_LIMIT, ASIN_LIMIT).asin() / FRAC_PI_2;
    x + (cylinder - x) * warp
}

/// Inverse of [`unwarp_offset`], found by bisection.
///
/// The unwarp is monotonic, so this is exact up to float precision when
/// `warp < 1`. At full warp the unwarp saturates past the `asin` clamp and
/// the result is the nearest offset inside the clamp.
pub fn warp_offset(target: f32, warp: f32) -> f32 {
    if warp == 0.0 || !target.is_finite() || !warp.is_finite() {
        return target;
    }
    let flat = (1.0 - warp).max(SCALE_FLOOR);
    let bound = ((target.abs() + 1.0) / flat).max(1.0);
    let (mut lo, mut hi) = (-bound, bound);
    for _ in 0..INVERT_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        if unwarp_offset(mid, warp) < target {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

/// Apply the cylindrical unwarp to the horizontal axis
#[inline]
pub fn cylindrical_unwarp(uv: Uv, warp: f32) -> Uv {
    let x = (uv.x - 0.5) * 2.0;
    Uv::new(unwarp_offset(x, warp) * 0.5 + 0.5, uv.y)
}

/// Forward cylindrical warp; undoes [`cylindrical_unwarp`]
pub fn cylindrical_warp(uv: Uv, warp: f32) -> Uv {
    let x = (uv.x - 0.5) * 2.0;
    Uv::new(warp_offset(x, warp) * 0.5 + 0.5, uv.y)
}

/// Scale guarded against zero, negative and non-finite values
#[inline]
pub fn guarded_scale(scale: f32) -> f32 {
    if scale.is_finite() { scale.max(SCALE_FLOOR) } else { SCALE_FLOOR }
}

/// Frame coordinate to overlay coordinate. Results outside the unit
/// square are off the overlay.
#[inline]
pub fn overlay_coordinate(uv: Uv, transform: &Transform) -> Uv {
    let local = inverse_reproject(uv, transform);
    let unwarped = cylindrical_unwarp(local, transform.cylindrical_warp);
    (unwarped - 0.5) / guarded_scale(transform.scale) + Uv::CENTER
}

/// Overlay coordinate to the frame coordinate it is drawn at.
pub fn project(overlay: Uv, transform: &Transform) -> Uv {
    let unscaled = (overlay - 0.5) * guarded_scale(transform.scale) + Uv::CENTER;
    let warped = cylindrical_warp(unscaled, transform.cylindrical_warp);
    warped.rotate_inverse_about(Uv::CENTER, -transform.rotation) + (transform.position - 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Uv, b: Uv, tol: f32) -> bool {
        (a.x - b.x).abs() <= tol && (a.y - b.y).abs() <= tol
    }

    #[test]
    fn test_flat_round_trip_for_all_scales() {
        for i in 0..=39 {
            let scale = 0.05 + i as f32 * (2.0 - 0.05) / 39.0;
            let transform = Transform {
                position: Uv::new(0.4, 0.65),
                scale,
                rotation: 0.7,
                cylindrical_warp: 0.0,
            };
            for &(x, y) in &[(0.1, 0.2), (0.5, 0.5), (0.93, 0.07), (0.33, 0.8)] {
                let frame = Uv::new(x, y);
                let back = project(overlay_coordinate(frame, &transform), &transform);
                assert!(close(back, frame, 1e-4), "scale {scale}: {frame:?} -> {back:?}");
            }
        }
    }

    #[test]
    fn test_center_is_invariant_under_full_wrap() {
        assert_eq!(unwarp_offset(0.0, 1.0), 0.0);
        assert_eq!(warp_offset(0.0, 1.0), 0.0);
        assert_eq!(cylindrical_unwarp(Uv::CENTER, 1.0), Uv::CENTER);
    }

    #[test]
    fn test_partial_wrap_round_trip() {
        for &warp in &[0.3, 0.6, 0.95] {
            for i in -9..=9 {
                let x = i as f32 / 10.0;
                let there = unwarp_offset(x, warp);
                assert!((warp_offset(there, warp) - x).abs() < 1e-4, "warp {warp} x {x}");
            }
        }
    }

    #[test]
    fn test_unwarp_is_monotonic_and_clamped() {
        let mut prev = f32::NEG_INFINITY;
        for i in -150..=150 {
            let x = i as f32 / 100.0;
            let y = unwarp_offset(x, 0.5);
            assert!(y.is_finite());
            assert!(y >= prev);
            prev = y;
        }
        assert!(unwarp_offset(5.0, 1.0).is_finite());
    }

    #[test]
    fn test_default_transform_maps_center_to_center() {
        let transform = Transform::default();
        assert!(close(overlay_coordinate(Uv::CENTER, &transform), Uv::CENTER, 1e-6));
        assert!(close(project(Uv::CENTER, &transform), Uv::CENTER, 1e-6));
    }

    #[test]
    fn test_scale_floor() {
        let transform = Transform { scale: 0.0, ..Transform::default() };
        assert!(overlay_coordinate(Uv::new(0.6, 0.5), &transform).x.is_finite());
        assert_eq!(guarded_scale(f32::NAN), SCALE_FLOOR);
        assert_eq!(guarded_scale(-1.0), SCALE_FLOOR);
    }

    #[test]
    fn test_translation_moves_overlay() {
        let transform = Transform {
            position: Uv::new(0.8, 0.2),
            scale: 1.0,
            rotation: 0.0,
            cylindrical_warp: 0.0,
        };
        assert!(close(overlay_coordinate(Uv::new(0.8, 0.2), &transform), Uv::CENTER, 1e-6));
    }
}
