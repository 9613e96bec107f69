// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for translation files.
//!
//! Two formats are supported: the legacy line-oriented LabelPlus text
//! format ([`lp`]) and the JSON format ([`meo`]). [`encode`] and
//! [`decode`] dispatch on [`Format`]; [`serialization`] adds the file
//! handling on top.

pub mod lp;
pub mod meo;
pub mod serialization;

use crate::error::{DecodeError, ExportError};
use crate::models::group::default_palette;
use crate::models::ProjectFile;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// UTF-8 byte-order mark.
pub const BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Persisted translation file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// LabelPlus plain text (`.txt`)
    Lp,
    /// Meo JSON (`.json`)
    #[default]
    Meo,
}

impl Format {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        if extension.eq_ignore_ascii_case("txt") {
            Some(Format::Lp)
        } else if extension.eq_ignore_ascii_case("json") {
            Some(Format::Meo)
        } else {
            None
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Format::Lp => "txt",
            Format::Meo => "json",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Lp => write!(f, "LP"),
            Format::Meo => write!(f, "Meo"),
        }
    }
}

/// Canonical picture ordering used when writing LP files.
pub type PictureOrder = fn(&ProjectFile) -> Vec<String>;

/// Settings the codecs take from the surrounding application.
#[derive(Debug, Clone)]
pub struct CodecOptions {
    /// Colors for groups read from LP files, which do not store them
    pub palette: Vec<String>,
    /// Order of picture blocks in LP files
    pub picture_order: PictureOrder,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            palette: default_palette(),
            picture_order: ProjectFile::sorted_picture_names,
        }
    }
}

/// Encode a project with default options.
pub fn encode(format: Format, project: &ProjectFile) -> Result<Vec<u8>, ExportError> {
    encode_with(format, project, &CodecOptions::default())
}

pub fn encode_with(
    format: Format,
    project: &ProjectFile,
    options: &CodecOptions,
) -> Result<Vec<u8>, ExportError> {
    match format {
        Format::Lp => {
            let order = (options.picture_order)(project);
            Ok(lp::encode(project, &order)?)
        }
        Format::Meo => Ok(meo::encode(project)?),
    }
}

/// Decode a project with default options.
pub fn decode(format: Format, bytes: &[u8]) -> Result<ProjectFile, DecodeError> {
    decode_with(format, bytes, &CodecOptions::default())
}

/// Decode a project. A leading byte-order mark is ignored.
pub fn decode_with(
    format: Format,
    bytes: &[u8],
    options: &CodecOptions,
) -> Result<ProjectFile, DecodeError> {
    let bytes = strip_bom(bytes);
    match format {
        Format::Lp => lp::decode(bytes, &options.palette),
        Format::Meo => meo::decode(bytes),
    }
}

pub fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(&BOM[..]).unwrap_or(bytes)
}
