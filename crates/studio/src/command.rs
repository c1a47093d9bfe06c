use compositor::RenderMode;
use ink_kit_common::{StylePreset, Viewport};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr, VariantNames};

use crate::gesture::{Gesture, InteractionMode};

/// One step of the control surface, as replayed from a job file
#[derive(
    Debug, Clone,
    Serialize, Deserialize, JsonSchema,
    Display, VariantNames, IntoStaticStr,
    PartialEq
)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EditorCommand {
    /// Feed a pointer gesture to the transform controller
    Gesture(Gesture),

    /// Switch between transforming and erasing
    SetMode { mode: InteractionMode },

    SetStyle { style: StylePreset },

    SetLightAngle {
        #[schemars(range(min = 0.0, max = 360.0))]
        degrees: f32,
    },

    SetCylindricalWarp {
        #[schemars(range(min = 0.0, max = 1.0))]
        warp: f32,
    },

    SetScale {
        #[schemars(range(min = 0.1, max = 1.5))]
        scale: f32,
    },

    SetBrushRadius {
        #[schemars(range(min = 10.0, max = 100.0))]
        radius: f32,
    },

    /// Rectangle that stroke points are reported in
    SetViewport(Viewport),

    BeginStroke { x: f32, y: f32 },

    ExtendStroke { x: f32, y: f32 },

    EndStroke,

    ClearErasure,

    SetRenderMode { mode: RenderMode },

    ResetTransform,
}

impl EditorCommand {
    /// Get the JSON schema for all commands
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(EditorCommand)
    }

    /// Get a list of all available command names
    pub fn command_names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }

    /// Get a description of the command
    pub fn description(&self) -> &'static str {
        match self {
            Self::Gesture(_) => "Apply a drag, pinch or wheel gesture to the overlay",
            Self::SetMode { .. } => "Switch between transform and erase interaction",
            Self::SetStyle { .. } => "Select an ink style preset",
            Self::SetLightAngle { .. } => "Set the light direction in degrees",
            Self::SetCylindricalWarp { .. } => "Set how strongly the overlay wraps around the limb",
            Self::SetScale { .. } => "Set the overlay scale directly",
            Self::SetBrushRadius { .. } => "Set the eraser brush width",
            Self::SetViewport(_) => "Set the display rectangle stroke points are given in",
            Self::BeginStroke { .. } => "Start an eraser stroke",
            Self::ExtendStroke { .. } => "Continue the current eraser stroke",
            Self::EndStroke => "Finish the current eraser stroke",
            Self::ClearErasure => "Remove all erasure",
            Self::SetRenderMode { .. } => "Choose composite, tattoo-only or mask debug output",
            Self::ResetTransform => "Center the overlay at default scale and no rotation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_names() {
        let names = EditorCommand::command_names();
        assert!(names.contains(&"gesture"));
        assert!(names.contains(&"clear_erasure"));
        assert_eq!(names.len(), 14);
    }

    #[test]
    fn test_commands_parse_from_json() {
        let script = r#"[
            {"type": "gesture", "params": {"type": "drag", "params": {"dx": 10.0, "dy": -4.0}}},
            {"type": "set_style", "params": {"style": "blackwork"}},
            {"type": "set_mode", "params": {"mode": "erase"}},
            {"type": "begin_stroke", "params": {"x": 5.0, "y": 6.0}},
            {"type": "end_stroke"},
            {"type": "set_render_mode", "params": {"mode": "tattoo_only"}}
        ]"#;
        let commands: Vec<EditorCommand> = serde_json::from_str(script).unwrap();
        assert_eq!(commands[0], EditorCommand::Gesture(Gesture::Drag { dx: 10.0, dy: -4.0 }));
        assert_eq!(commands[1], EditorCommand::SetStyle { style: StylePreset::Blackwork });
        assert_eq!(commands[4], EditorCommand::EndStroke);
        assert_eq!(commands[5], EditorCommand::SetRenderMode { mode: RenderMode::TattooOnly });
        assert_eq!(commands[2].to_string(), "set_mode");
    }

    #[test]
    fn test_schema_mentions_every_command() {
        let schema = serde_json::to_string(&EditorCommand::schema()).unwrap();
        for name in EditorCommand::command_names() {
            assert!(schema.contains(name), "{name} missing from schema");
        }
    }
}
