use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

use crate::gesture::InteractionMode;

/// Control panel tabs
#[derive(
    Debug, Clone, Copy, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq, Hash
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EditorTab {
    #[default]
    Styles,
    Adjust,
    Eraser,
}

/// Presentation state of the editor shell. Nothing in here affects a
/// rendered pixel except through the interaction mode and debug flag.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ViewState {
    pub tab: EditorTab,
    pub debug: bool,
}

impl ViewState {
    pub fn interaction_mode(&self) -> InteractionMode {
        match self.tab {
            EditorTab::Eraser => InteractionMode::Erase,
            EditorTab::Styles | EditorTab::Adjust => InteractionMode::Transform,
        }
    }

    pub fn set_tab(&mut self, tab: EditorTab) {
        self.tab = tab;
    }

    /// Switch into or out of erasing. Leaving the eraser lands on the adjust tab.
    pub fn set_mode(&mut self, mode: InteractionMode) {
        match mode {
            InteractionMode::Erase => self.tab = EditorTab::Eraser,
            InteractionMode::Transform if self.tab == EditorTab::Eraser => self.tab = EditorTab::Adjust,
            InteractionMode::Transform => {}
        }
    }

    pub fn toggle_debug(&mut self) -> bool {
        self.debug = !self.debug;
        self.debug
    }
}
