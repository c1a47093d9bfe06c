use ink_kit_common::{LightingState, StyleProfile, Transform};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

/// What a frame shows
#[derive(
    Debug, Clone, Copy, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq, Hash
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RenderMode {
    /// Ink blended over the photograph
    #[default]
    Composite,
    /// Shaded ink with its final alpha; transparent wherever no ink lands
    TattooOnly,
    /// Mask inspection: green over skin, dimmed grey elsewhere
    MaskDebug,
}

/// Everything besides the rasters that a frame depends on
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct RenderParams {
    pub transform: Transform,
    pub style: StyleProfile,
    pub lighting: LightingState,
    pub mode: RenderMode,
}

impl RenderParams {
    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }
}
