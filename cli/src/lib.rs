use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use studio::{EditorCommand, SessionConfig};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InkCliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    Studio(#[from] studio::StudioError),
    #[error("Missing 'photo' field")]
    MissingPhoto,
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// A scripted preview: the assets, the session settings and the edits to
/// replay before the composite is exported.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct InkJob {
    pub photo: PathBuf,
    pub tattoo: Option<PathBuf>,
    /// Precomputed confidence map to segment with instead of the skin-tone model
    #[serde(default)]
    pub confidence_map: Option<PathBuf>,
    /// Overrides `config.export.directory`
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub config: SessionConfig,
    #[serde(default)]
    pub commands: Vec<EditorCommand>,
}

impl InkJob {
    pub fn new(photo: impl Into<PathBuf>) -> Self {
        Self {
            photo: photo.into(),
            tattoo: None,
            confidence_map: None,
            output_dir: None,
            config: SessionConfig::default(),
            commands: Vec::new(),
        }
    }

    /// Get the JSON schema for job files
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(InkJob)
    }

    /// Session settings with the output directory override applied
    pub fn session_config(&self) -> SessionConfig {
        let mut config = self.config.clone();
        if let Some(dir) = &self.output_dir {
            config.export.directory = dir.clone();
        }
        config
    }

    fn validate(self) -> Result<Self, InkCliError> {
        if self.photo.as_os_str().is_empty() {
            return Err(InkCliError::MissingPhoto);
        }
        self.config.validate()?;
        Ok(self)
    }

    /// Load a job from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, InkCliError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, InkCliError> {
        let job: InkJob = toml::from_str(content)?;
        job.validate()
    }

    /// Load a job from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, InkCliError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, InkCliError> {
        let job: InkJob = serde_json::from_str(content)?;
        job.validate()
    }

    /// Auto-detect file format and load the job
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, InkCliError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(InkCliError::UnsupportedFileFormat),
        }
    }

    pub fn to_toml(&self) -> Result<String, InkCliError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    pub fn to_json(&self) -> Result<String, InkCliError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), InkCliError> {
        let path_ref = path.as_ref();
        let content = match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => self.to_toml()?,
            Some("json") => self.to_json()?,
            _ => return Err(InkCliError::UnsupportedFileFormat),
        };
        fs::write(path_ref, content)?;
        Ok(())
    }
}
