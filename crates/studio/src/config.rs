use std::{fs, path::{Path, PathBuf}};

use ink_kit_common::{BrushState, StylePreset, Transform};
use schemars::JsonSchema;
use segmentation::{DEFAULT_CONFIDENCE_THRESHOLD, MAX_INFERENCE_SIDE, PipelineBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StudioError};

/// Segmentation pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Longest side of the image handed to the model
    #[schemars(range(min = 1))]
    pub max_side: u32,
    /// Confidence at or above which a pixel counts as skin
    #[schemars(range(min = 0.0, max = 1.0))]
    pub threshold: f32,
    /// Radius of an optional morphological close applied to the mask
    pub close_radius: Option<u8>,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            max_side: MAX_INFERENCE_SIDE,
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            close_radius: None,
        }
    }
}

impl SegmentationConfig {
    /// Pipeline builder with these settings; the caller picks the model
    pub fn pipeline_builder(&self) -> PipelineBuilder {
        let builder = PipelineBuilder::new()
            .with_max_side(self.max_side)
            .with_threshold(self.threshold);
        match self.close_radius {
            Some(radius) => builder.with_closing(radius),
            None => builder,
        }
    }
}

/// Where and how composites are written
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// JPEG quality, 1-100
    #[schemars(range(min = 1, max = 100))]
    pub quality: u8,
    pub directory: PathBuf,
    pub file_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            quality: 95,
            directory: PathBuf::from("."),
            file_prefix: "ink_pro".to_string(),
        }
    }
}

/// Initial state and settings for an editing session
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    pub segmentation: SegmentationConfig,
    pub style: StylePreset,
    #[schemars(range(min = 0.0, max = 1.0))]
    pub cylindrical_warp: f32,
    /// Light dial angle in degrees
    pub light_angle: f32,
    #[schemars(range(min = 10.0, max = 100.0))]
    pub brush_radius: f32,
    pub export: ExportConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            segmentation: SegmentationConfig::default(),
            style: StylePreset::default(),
            cylindrical_warp: Transform::DEFAULT_WARP,
            light_angle: 0.0,
            brush_radius: BrushState::DEFAULT,
            export: ExportConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Get the JSON schema for the configuration
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(SessionConfig)
    }

    /// Reject values that cannot be clamped into something meaningful
    pub fn validate(&self) -> Result<()> {
        if self.segmentation.max_side == 0 {
            return Err(StudioError::Config("segmentation.max_side must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.segmentation.threshold) {
            return Err(StudioError::Config(format!(
                "segmentation.threshold {} is outside [0, 1]",
                self.segmentation.threshold
            )));
        }
        if !(1..=100).contains(&self.export.quality) {
            return Err(StudioError::Config(format!(
                "export.quality {} is outside [1, 100]",
                self.export.quality
            )));
        }
        for (name, value) in [
            ("cylindrical_warp", self.cylindrical_warp),
            ("light_angle", self.light_angle),
            ("brush_radius", self.brush_radius),
        ] {
            if !value.is_finite() {
                return Err(StudioError::Config(format!("{name} must be a finite number")));
            }
        }
        if self.export.file_prefix.trim().is_empty() {
            return Err(StudioError::Config("export.file_prefix is empty".into()));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: SessionConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        let config: SessionConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&fs::read_to_string(path)?),
            Some("json") => Self::from_json(&fs::read_to_string(path)?),
            _ => Err(StudioError::UnsupportedConfigFormat(path.to_path_buf())),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
