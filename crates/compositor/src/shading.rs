//! The optical model that makes ink read as part of the skin.

use ink_kit_common::Uv;

pub type Vec3 = [f32; 3];

/// Rec. 601 luma weights
pub const LUMA_WEIGHTS: Vec3 = [0.299, 0.587, 0.114];
/// Finite-difference step for the relief estimate, in [`Uv`] units
pub const RELIEF_STEP: f32 = 0.002;
/// Gain applied to the luminance gradient before normalizing
pub const RELIEF_GAIN: f32 = 10.0;
pub const RELIEF_Z: f32 = 0.8;
pub const LIGHT_ELEVATION: f32 = 0.5;
pub const SPECULAR_EXPONENT: f32 = 12.0;
pub const SPECULAR_STRENGTH: f32 = 0.3;
/// Frequency multiplier for the grain hash
pub const GRAIN_FREQUENCY: f32 = 50.0;
pub const COLOR_BLEND_BASE: f32 = 0.9;

#[inline]
pub fn dot3(a: Vec3, b: Vec3) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn normalize3(v: Vec3) -> Vec3 {
    let len = dot3(v, v).sqrt();
    if len <= f32::EPSILON || !len.is_finite() {
        return [0.0, 0.0, 1.0];
    }
    [v[0] / len, v[1] / len, v[2] / len]
}

#[inline]
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn mix3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    [mix(a[0], b[0], t), mix(a[1], b[1], t), mix(a[2], b[2], t)]
}

/// Hermite step. `edge0 > edge1` gives a falling edge.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let span = edge1 - edge0;
    if span == 0.0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / span).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[inline]
pub fn luminance(rgb: Vec3) -> f32 {
    dot3(rgb, LUMA_WEIGHTS)
}

/// How "colored" a sample of ink is, in `[0, 1]`.
///
/// Saturation (distance from its own grey) and brightness both push towards
/// colored; dark unsaturated ink scores 0.
#[inline]
pub fn classify_ink(rgb: Vec3) -> f32 {
    let luma = luminance(rgb);
    let chroma = [rgb[0] - luma, rgb[1] - luma, rgb[2] - luma];
    let saturation = dot3(chroma, chroma).sqrt();
    (smoothstep(0.1, 0.3, saturation) + smoothstep(0.6, 0.9, luma)).clamp(0.0, 1.0)
}

/// Surface normal from photograph luminance differences along `+u` and `+v`
#[inline]
pub fn relief_normal(d_u: f32, d_v: f32) -> Vec3 {
    normalize3([d_u * RELIEF_GAIN, d_v * RELIEF_GAIN, RELIEF_Z])
}

/// Light vector for a 2D direction, lifted towards the viewer
#[inline]
pub fn light_vector(direction: Uv) -> Vec3 {
    normalize3([direction.x, direction.y, LIGHT_ELEVATION])
}

/// Narrow highlight seen straight on, weaker for textured styles
#[inline]
pub fn specular(normal: Vec3, light: Vec3, skin_detail: f32) -> f32 {
    // reflect(-L, N)
    let incident = [-light[0], -light[1], -light[2]];
    let d = dot3(normal, incident);
    let reflected_z = incident[2] - 2.0 * d * normal[2];
    reflected_z.max(0.0).powf(SPECULAR_EXPONENT) * (1.0 - skin_detail) * SPECULAR_STRENGTH
}

/// Multiplier for the ink color from the photograph's own shading.
///
/// Monochrome ink lets through three times as much of the skin shading as
/// colored ink does.
#[inline]
pub fn lighting(normal: Vec3, light: Vec3, skin_detail: f32, is_color: f32) -> f32 {
    let diffuse = dot3(normal, light);
    let integration = mix(skin_detail * 1.5, skin_detail * 0.5, is_color);
    mix(1.0, diffuse, integration)
}

/// Deterministic hash in `[0, 1)` keyed on a coordinate
#[inline]
pub fn grain_hash(co: Uv) -> f32 {
    let v = (co.dot(Uv::new(12.9898, 78.233))).sin() * 43758.547;
    let f = v - v.floor();
    if f < 1.0 { f } else { 0.0 }
}

/// Zero-mean grain for an overlay coordinate
#[inline]
pub fn grain(overlay: Uv, amount: f32) -> f32 {
    (grain_hash(overlay * GRAIN_FREQUENCY) - 0.5) * amount
}

/// Tint, grain, then light the ink
#[inline]
pub fn lit_ink(ink: Vec3, tint: Vec3, noise: f32, lighting: f32, specular: f32) -> Vec3 {
    let mut out = [0.0; 3];
    for c in 0..3 {
        out[c] = (ink[c] * tint[c] + noise) * lighting + specular;
    }
    out
}

/// Mix of a multiply blend (dark ink) and a cover blend (colored ink).
///
/// The cover weight is `0.9 + specular` and is left unclamped, so strong
/// highlights push slightly past the ink color.
#[inline]
pub fn blend_ink(base: Vec3, lit: Vec3, is_color: f32, specular: f32) -> Vec3 {
    let multiply = [base[0] * lit[0], base[1] * lit[1], base[2] * lit[2]];
    let cover = mix3(base, lit, COLOR_BLEND_BASE + specular);
    mix3(multiply, cover, is_color)
}

/// 1 where nothing is erased, 0 where the brush has painted
#[inline]
pub fn erase_suppression(erase: f32) -> f32 {
    1.0 - smoothstep(0.1, 0.3, erase)
}

/// Darkening towards the lateral edges of a wrapped overlay
#[inline]
pub fn cylinder_shadow(overlay_u: f32, warp: f32) -> f32 {
    let depth = ((overlay_u - 0.5).abs() * 2.0).powi(3);
    1.0 - depth * warp * 0.5
}

/// Soft fade over the outer tenth of the overlay square
#[inline]
pub fn edge_fade(overlay: Uv) -> f32 {
    let dist = ((overlay - 0.5) * 2.0).abs().max_element();
    smoothstep(1.0, 0.9, dist)
}
