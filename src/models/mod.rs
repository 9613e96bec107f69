// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model for translation projects.

pub mod group;
pub mod label;
pub mod project;

pub use group::Group;
pub use label::TranslationLabel;
pub use project::{ProjectFile, Version};
