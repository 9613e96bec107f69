// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Meo JSON format.
//!
//! The whole project is written as pretty-printed JSON with the fields
//! `version`, `comment`, `groupList` and `transMap`. Pictures in `transMap`
//! are written in ascending name order so that saving the same content
//! always produces the same bytes.

use crate::error::DecodeError;
use crate::models::project::RawProjectFile;
use crate::models::ProjectFile;

/// Encode a project as pretty-printed JSON.
///
/// Sorting happens on a copy; `project` keeps its own picture order.
pub fn encode(project: &ProjectFile) -> Result<Vec<u8>, serde_json::Error> {
    let sorted = project.with_sorted_pictures();
    serde_json::to_vec_pretty(&sorted)
}

/// Decode JSON text, checking every group and label.
pub fn decode(bytes: &[u8]) -> Result<ProjectFile, DecodeError> {
    let raw: RawProjectFile = serde_json::from_slice(bytes)?;
    let project = ProjectFile::try_from(raw)?;
    log::debug!(
        "Decoded Meo file: {} groups, {} pictures, {} labels",
        project.group_count(),
        project.picture_count(),
        project.label_count()
    );
    Ok(project)
}
