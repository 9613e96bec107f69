// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application settings.
//!
//! Settings are read from an optional YAML file. Missing keys fall back to
//! their defaults.

use crate::error::ConfigError;
use crate::io::{CodecOptions, Format};
use crate::models::group::{default_palette, parse_color};
use crate::models::project::DEFAULT_COMMENT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming a settings file.
pub const CONFIG_ENV: &str = "LPTRANS_CONFIG";

/// User settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Format used when a path has no `.txt` or `.json` extension
    pub default_format: Format,
    /// Comment given to new projects
    pub default_comment: String,
    /// Colors for new groups and for groups read from LP files
    pub group_colors: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_format: Format::default(),
            default_comment: DEFAULT_COMMENT.to_string(),
            group_colors: default_palette(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_yaml(&yaml)?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Parse and check settings.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let mut settings: Settings = serde_yaml::from_str(yaml)?;
        if settings.group_colors.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        settings.group_colors = settings
            .group_colors
            .iter()
            .map(|c| parse_color(c))
            .collect::<Result<_, _>>()?;
        Ok(settings)
    }

    /// Load from an explicit path, else from `LPTRANS_CONFIG`, else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Format for a path: by extension, else the configured default.
    pub fn format_for(&self, path: &Path) -> Format {
        Format::from_path(path).unwrap_or(self.default_format)
    }

    pub fn codec_options(&self) -> CodecOptions {
        CodecOptions {
            palette: self.group_colors.clone(),
            ..CodecOptions::default()
        }
    }
}
