// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Translation groups.
//!
//! A group is a named, colored bucket that labels belong to. Labels refer to
//! a group by its position in the project's group list.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};

/// Palette used for groups whose color is not stored (LP files) and for
/// newly created groups.
pub const DEFAULT_COLORS: [&str; 9] = [
    "FF0000", "0000FF", "008000", "1E90FF", "FFD700", "FF00FF", "A0522D", "FF4500", "9400D3",
];

/// A named, colored translation group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    name: String,
    #[serde(rename = "colorHex")]
    color: String,
}

/// Group as read from a file, before validation.
#[derive(Debug, Deserialize)]
pub(crate) struct RawGroup {
    name: String,
    #[serde(rename = "colorHex")]
    color: String,
}

impl TryFrom<RawGroup> for Group {
    type Error = ModelError;

    fn try_from(raw: RawGroup) -> Result<Self, Self::Error> {
        Group::new(raw.name, raw.color)
    }
}

impl Group {
    /// Create a group, checking the name and color.
    ///
    /// A leading `#` on the color is stripped.
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Result<Self, ModelError> {
        let name = name.into();
        check_name(&name)?;
        let color = parse_color(&color.into())?;
        Ok(Self { name, color })
    }

    /// Create a group colored from the palette by its position in the list.
    pub fn with_palette(
        name: impl Into<String>,
        group_id: usize,
        palette: &[String],
    ) -> Result<Self, ModelError> {
        let color = palette_color(palette, group_id);
        Self::new(name, color)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hex RGB color without a leading `#`.
    pub fn color(&self) -> &str {
        &self.color
    }

    pub(crate) fn set_name(&mut self, name: String) -> Result<(), ModelError> {
        check_name(&name)?;
        self.name = name;
        Ok(())
    }

    pub(crate) fn set_color(&mut self, color: &str) -> Result<(), ModelError> {
        self.color = parse_color(color)?;
        Ok(())
    }
}

/// Replace spaces with underscores, the way group names are typed in.
pub fn normalize_group_name(name: &str) -> String {
    name.trim().replace(' ', "_")
}

/// The default palette as owned strings.
pub fn default_palette() -> Vec<String> {
    DEFAULT_COLORS.iter().map(|c| c.to_string()).collect()
}

/// Color for the n-th group, cycling through the palette.
pub fn palette_color(palette: &[String], group_id: usize) -> &str {
    if palette.is_empty() {
        DEFAULT_COLORS[group_id % DEFAULT_COLORS.len()]
    } else {
        &palette[group_id % palette.len()]
    }
}

fn check_name(name: &str) -> Result<(), ModelError> {
    if name.is_empty() {
        return Err(ModelError::EmptyGroupName);
    }
    if name.contains(' ') {
        return Err(ModelError::GroupNameHasSpace(name.to_string()));
    }
    Ok(())
}

/// Validate a 6-digit hex color, stripping a leading `#`.
pub fn parse_color(color: &str) -> Result<String, ModelError> {
    let hex = color.strip_prefix('#').unwrap_or(color);
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(hex.to_string())
    } else {
        Err(ModelError::InvalidColor(color.to_string()))
    }
}
