// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! lptrans - translation files for image annotation projects
//!
//! Reads and writes the LabelPlus plain-text format and the Meo JSON
//! format, and provides the editing session that owns a live project.

pub mod app;
pub mod config;
pub mod error;
pub mod io;
pub mod models;
pub mod util;

pub use app::{LogReporter, Reporter, Session};
pub use config::Settings;
pub use error::{DecodeError, ExportError, ImportError, ModelError, ValidationError};
pub use io::serialization::{export, import};
pub use io::{decode, encode, Format};
pub use models::{Group, ProjectFile, TranslationLabel, Version};
