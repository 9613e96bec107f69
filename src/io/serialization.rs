// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project file export and import.
//!
//! Export snapshots the project, encodes the whole file in memory and only
//! then touches the disk, writing to a sibling temporary file that is
//! renamed over the target. Import reads the whole file, drops a leading
//! BOM and returns either a complete project or an error.

use super::{decode_with, encode_with, CodecOptions, Format};
use crate::error::{ExportError, ImportError};
use crate::models::ProjectFile;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Pick the explicit path if given, else the project's associated path.
pub fn resolve_target(explicit: Option<&Path>, associated: Option<&Path>) -> Result<PathBuf, ExportError> {
    explicit
        .or(associated)
        .map(Path::to_path_buf)
        .ok_or(ExportError::NoTargetPath)
}

/// Export project data with default codec options.
pub fn export(project: &ProjectFile, path: &Path, format: Format) -> Result<(), ExportError> {
    export_with(project, path, format, &CodecOptions::default())
}

/// Export project data.
pub fn export_with(
    project: &ProjectFile,
    path: &Path,
    format: Format,
    options: &CodecOptions,
) -> Result<(), ExportError> {
    let snapshot = project.snapshot();
    let bytes = match encode_with(format, &snapshot, options) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Not writing {}: {}", path.display(), e);
            return Err(e);
        }
    };

    write_replacing(path, &bytes).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!(
        "Exported {} file {} ({} pictures, {} labels)",
        format,
        path.display(),
        snapshot.picture_count(),
        snapshot.label_count()
    );
    Ok(())
}

/// Import project data with default codec options.
pub fn import(path: &Path, format: Format) -> Result<ProjectFile, ImportError> {
    import_with(path, format, &CodecOptions::default())
}

/// Import project data.
pub fn import_with(path: &Path, format: Format, options: &CodecOptions) -> Result<ProjectFile, ImportError> {
    let bytes = std::fs::read(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let project = decode_with(format, &bytes, options)?;

    log::info!(
        "Imported {} file {} ({} groups, {} pictures, {} labels)",
        format,
        path.display(),
        project.group_count(),
        project.picture_count(),
        project.label_count()
    );
    Ok(project)
}

/// Write through a uniquely named temporary sibling so a failed write never
/// leaves the target truncated and concurrent writes never share a file.
fn write_replacing(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    // The temporary file is removed on drop if persisting fails.
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
