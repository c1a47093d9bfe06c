use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

/// Multiplicative ink color, each channel in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InkTint(pub [f32; 3]);

impl InkTint {
    pub const NEUTRAL: InkTint = InkTint([1.0, 1.0, 1.0]);

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self([r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0])
    }

    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.0.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// Finish parameters that approximate how healed or fresh the ink looks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StyleProfile {
    pub name: String,
    pub label: String,
    /// Global ink opacity
    pub opacity: f32,
    /// How strongly the photograph's own relief shows through the ink
    pub skin_detail: f32,
    /// Amplitude of the per-coordinate ink grain
    pub grain: f32,
    pub ink_tint: InkTint,
}

/// The built-in style presets
#[derive(
    Debug, Clone, Copy, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq, Hash
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StylePreset {
    /// Saturated, freshly inked look
    #[default]
    Fresh,
    /// Settled ink with visible skin texture
    Healed,
    /// Old, faded and grainy
    Aged,
    /// Dense black work
    Blackwork,
}

impl StylePreset {
    /// Get a list of all preset names
    pub fn names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Fresh => "Vibrant",
            Self::Healed => "Realistic",
            Self::Aged => "Faded",
            Self::Blackwork => "Blackwork",
        }
    }

    pub fn profile(&self) -> StyleProfile {
        let (opacity, skin_detail, grain, ink_tint) = match self {
            Self::Fresh => (0.98, 0.10, 0.03, InkTint::NEUTRAL),
            Self::Healed => (0.92, 0.35, 0.06, InkTint::from_rgb8(0xf0, 0xf0, 0xf0)),
            Self::Aged => (0.80, 0.55, 0.12, InkTint::from_rgb8(0xe0, 0xe0, 0xe0)),
            Self::Blackwork => (0.92, 0.30, 0.08, InkTint::from_rgb8(0x1a, 0x1a, 0x1a)),
        };
        StyleProfile {
            name: self.to_string(),
            label: self.label().to_string(),
            opacity,
            skin_detail,
            grain,
            ink_tint,
        }
    }
}

impl Default for StyleProfile {
    fn default() -> Self {
        StylePreset::default().profile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_preset_values() {
        let healed = StylePreset::Healed.profile();
        assert_eq!(healed.opacity, 0.92);
        assert_eq!(healed.skin_detail, 0.35);
        assert_eq!(healed.ink_tint.to_hex(), "#f0f0f0");

        let blackwork = StylePreset::Blackwork.profile();
        assert_eq!(blackwork.ink_tint.to_hex(), "#1a1a1a");
        assert_eq!(StyleProfile::default().name, "fresh");
    }

    #[test]
    fn test_preset_names_round_trip_through_strum() {
        assert_eq!(StylePreset::names(), &["fresh", "healed", "aged", "blackwork"]);
        for preset in StylePreset::iter() {
            assert_eq!(StylePreset::from_str(preset.into()).unwrap(), preset);
        }
        assert!(StylePreset::from_str("neon").is_err());
    }

    #[test]
    fn test_hex_formatting() {
        assert_eq!(InkTint::NEUTRAL.to_hex(), "#ffffff");
        assert_eq!(InkTint::from_rgb8(0x1a, 0x1a, 0x1a).to_hex(), "#1a1a1a");
        assert_eq!(InkTint([2.0, -1.0, 0.5]).to_hex(), "#ff0080");
    }
}
