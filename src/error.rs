// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for the translation-file model, codecs and façade.
//!
//! Validation, decode and I/O failures are kept as separate types so that
//! callers can give different guidance for each.

use std::path::PathBuf;
use thiserror::Error;

/// Violation of a data model invariant.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("group name must not be empty")]
    EmptyGroupName,

    #[error("group name {0:?} contains spaces")]
    GroupNameHasSpace(String),

    #[error("group color {0:?} is not a 6-digit hex RGB value")]
    InvalidColor(String),

    #[error("group name {0:?} is already in use")]
    GroupNameRepeated(String),

    #[error("group id {id} is out of bounds (group count {count})")]
    GroupIdOutOfBounds { id: usize, count: usize },

    #[error("group {0:?} not found")]
    GroupNotFound(String),

    #[error("group {id} is still referenced by labels")]
    GroupInUse { id: usize },

    #[error("picture {0:?} not found")]
    PictureNotFound(String),

    #[error("picture {0:?} already exists")]
    PictureExists(String),

    #[error("label index must be positive")]
    LabelIndexNotPositive,

    #[error("label index {index} repeated in picture {picture:?}")]
    LabelIndexRepeated { picture: String, index: u32 },

    #[error("label {index} not found in picture {picture:?}")]
    LabelNotFound { picture: String, index: u32 },

    #[error("coordinate ({x}, {y}) is outside [0, 1]")]
    CoordinateOutOfRange { x: f64, y: f64 },
}

/// A project that cannot be represented in the requested format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("too many groups for LP format: {count} (at most {max})")]
    TooManyGroups { count: usize, max: usize },

    #[error("group name {0:?} cannot be written as an LP group line")]
    GroupNameNotRepresentable(String),

    #[error("picture name {0:?} cannot be written as an LP picture header")]
    PictureNameNotRepresentable(String),

    #[error("comment contains a line that reads as an LP picture header")]
    CommentNotRepresentable,

    #[error("text of label {index} in picture {picture:?} contains a line that reads as an LP header")]
    LabelTextNotRepresentable { picture: String, index: u32 },
}

/// Failure to turn bytes back into a project.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("input is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("line 1: missing version line")]
    MissingVersion,

    #[error("line {line}: malformed version {content:?}")]
    MalformedVersion { line: usize, content: String },

    #[error("line {line}: missing separator")]
    MissingSeparator { line: usize },

    #[error("line {line}: malformed label header {content:?}")]
    MalformedLabel { line: usize, content: String },

    #[error("line {line}: expected 3 label properties, found {found}")]
    PropertyArity { line: usize, found: usize },

    #[error("line {line}: invalid {field} value {value:?}")]
    InvalidProperty {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: group {group} is outside [1, {count}]")]
    GroupOutOfRange { line: usize, group: u32, count: usize },

    #[error("line {line}: unexpected content {content:?}")]
    UnexpectedContent { line: usize, content: String },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("line {line}: {source}")]
    Content {
        line: usize,
        #[source]
        source: ModelError,
    },

    #[error("invalid content: {0}")]
    Invalid(#[from] ModelError),
}

/// Outcome of a failed export.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("JSON serialization error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no target path given and the project has no associated file")]
    NoTargetPath,
}

/// Outcome of a failed import.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("failed to decode: {0}")]
    Decode(#[from] DecodeError),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Invalid settings file content.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("group color palette must not be empty")]
    EmptyPalette,

    #[error(transparent)]
    Model(#[from] ModelError),
}
