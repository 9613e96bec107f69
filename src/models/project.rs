// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project state management.
//!
//! A `ProjectFile` holds the version, comment, ordered group list and the
//! per-picture label lists of one translation project. Every mutation goes
//! through methods that keep the invariants intact: group names are unique,
//! label indices are unique within a picture and every label refers to an
//! existing group.

use super::group::{Group, RawGroup};
use super::label::{check_position, TranslationLabel};
use crate::error::ModelError;
use crate::util::sort::sort_natural;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Comment given to new projects.
pub const DEFAULT_COMMENT: &str = "Default Comment\nYou can edit me";

/// File format version, stored as `[major, minor]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::new(1, 0)
    }
}

impl From<[u32; 2]> for Version {
    fn from([major, minor]: [u32; 2]) -> Self {
        Self { major, minor }
    }
}

impl From<Version> for [u32; 2] {
    fn from(version: Version) -> Self {
        [version.major, version.minor]
    }
}

/// Complete translation project data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectFile {
    version: Version,
    comment: String,
    #[serde(rename = "groupList")]
    groups: Vec<Group>,
    #[serde(rename = "transMap")]
    pictures: IndexMap<String, Vec<TranslationLabel>>,
}

/// Project as read from a file, before validation.
#[derive(Debug, Deserialize)]
pub(crate) struct RawProjectFile {
    version: Version,
    #[serde(default)]
    comment: String,
    #[serde(rename = "groupList")]
    groups: Vec<RawGroup>,
    #[serde(rename = "transMap", default)]
    pictures: IndexMap<String, Vec<TranslationLabel>>,
}

impl TryFrom<RawProjectFile> for ProjectFile {
    type Error = ModelError;

    fn try_from(raw: RawProjectFile) -> Result<Self, Self::Error> {
        let mut project = ProjectFile::with_version(raw.version, raw.comment);
        for group in raw.groups {
            project.add_group(Group::try_from(group)?)?;
        }
        for (picture, labels) in raw.pictures {
            project.add_picture(&picture)?;
            for label in labels {
                project.add_label(&picture, label)?;
            }
        }
        Ok(project)
    }
}

impl Default for ProjectFile {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectFile {
    /// Create an empty project with the default version and comment.
    pub fn new() -> Self {
        Self::with_version(Version::default(), DEFAULT_COMMENT)
    }

    /// Create an empty project with the given version and comment.
    pub fn with_version(version: Version, comment: impl Into<String>) -> Self {
        Self {
            version,
            comment: comment.into(),
            groups: Vec::new(),
            pictures: IndexMap::new(),
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    /// Independent deep copy, taken before serialization so that later edits
    /// to the live project cannot leak into the bytes being written.
    pub fn snapshot(&self) -> ProjectFile {
        self.clone()
    }

    /// Copy with pictures re-keyed in ascending string order.
    ///
    /// Label order inside each picture is untouched.
    pub fn with_sorted_pictures(&self) -> ProjectFile {
        let mut copy = self.snapshot();
        copy.pictures.sort_keys();
        copy
    }

    // ----- Groups ----- //

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.groups.iter().map(Group::name).collect()
    }

    pub fn group(&self, group_id: usize) -> Result<&Group, ModelError> {
        self.groups.get(group_id).ok_or(ModelError::GroupIdOutOfBounds {
            id: group_id,
            count: self.groups.len(),
        })
    }

    pub fn group_id_by_name(&self, name: &str) -> Result<usize, ModelError> {
        self.groups
            .iter()
            .position(|g| g.name() == name)
            .ok_or_else(|| ModelError::GroupNotFound(name.to_string()))
    }

    /// Append a group and return its id.
    pub fn add_group(&mut self, group: Group) -> Result<usize, ModelError> {
        if self.groups.iter().any(|g| g.name() == group.name()) {
            return Err(ModelError::GroupNameRepeated(group.name().to_string()));
        }
        self.groups.push(group);
        Ok(self.groups.len() - 1)
    }

    pub fn rename_group(&mut self, group_id: usize, name: &str) -> Result<(), ModelError> {
        self.group(group_id)?;
        if self
            .groups
            .iter()
            .enumerate()
            .any(|(id, g)| id != group_id && g.name() == name)
        {
            return Err(ModelError::GroupNameRepeated(name.to_string()));
        }
        self.groups[group_id].set_name(name.to_string())
    }

    pub fn recolor_group(&mut self, group_id: usize, color: &str) -> Result<(), ModelError> {
        self.group(group_id)?;
        self.groups[group_id].set_color(color)
    }

    /// Whether no label in any picture refers to the group.
    pub fn is_group_unused(&self, group_id: usize) -> bool {
        self.labels_iter().all(|label| label.group_id != group_id)
    }

    /// Remove an unused group.
    ///
    /// Labels of later groups are renumbered so they keep pointing at the
    /// same group.
    pub fn remove_group(&mut self, group_id: usize) -> Result<Group, ModelError> {
        self.group(group_id)?;
        if !self.is_group_unused(group_id) {
            return Err(ModelError::GroupInUse { id: group_id });
        }
        let removed = self.groups.remove(group_id);
        for label in self.pictures.values_mut().flatten() {
            if label.group_id > group_id {
                label.group_id -= 1;
            }
        }
        Ok(removed)
    }

    // ----- Pictures ----- //

    pub fn picture_count(&self) -> usize {
        self.pictures.len()
    }

    /// Picture names in the order they were added.
    pub fn picture_names(&self) -> Vec<&str> {
        self.pictures.keys().map(String::as_str).collect()
    }

    /// Picture names in natural order (`2.png` before `10.png`).
    pub fn sorted_picture_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.pictures.keys().cloned().collect();
        sort_natural(&mut names);
        names
    }

    /// Pictures with their labels, in the order they were added.
    pub fn pictures(&self) -> impl Iterator<Item = (&str, &[TranslationLabel])> {
        self.pictures
            .iter()
            .map(|(name, labels)| (name.as_str(), labels.as_slice()))
    }

    pub fn has_picture(&self, picture: &str) -> bool {
        self.pictures.contains_key(picture)
    }

    pub fn add_picture(&mut self, picture: &str) -> Result<(), ModelError> {
        if self.pictures.contains_key(picture) {
            return Err(ModelError::PictureExists(picture.to_string()));
        }
        self.pictures.insert(picture.to_string(), Vec::new());
        Ok(())
    }

    /// Remove a picture together with its labels.
    pub fn remove_picture(&mut self, picture: &str) -> Result<Vec<TranslationLabel>, ModelError> {
        self.pictures
            .shift_remove(picture)
            .ok_or_else(|| ModelError::PictureNotFound(picture.to_string()))
    }

    // ----- Labels ----- //

    /// Labels of a picture in stored order.
    pub fn labels(&self, picture: &str) -> Result<&[TranslationLabel], ModelError> {
        self.pictures
            .get(picture)
            .map(Vec::as_slice)
            .ok_or_else(|| ModelError::PictureNotFound(picture.to_string()))
    }

    pub fn label_count(&self) -> usize {
        self.pictures.values().map(Vec::len).sum()
    }

    pub fn label(&self, picture: &str, index: u32) -> Result<&TranslationLabel, ModelError> {
        self.labels(picture)?
            .iter()
            .find(|l| l.index == index)
            .ok_or_else(|| ModelError::LabelNotFound {
                picture: picture.to_string(),
                index,
            })
    }

    /// Append a label to a picture.
    pub fn add_label(&mut self, picture: &str, label: TranslationLabel) -> Result<(), ModelError> {
        label.check()?;
        self.group(label.group_id)?;
        let list = self
            .pictures
            .get_mut(picture)
            .ok_or_else(|| ModelError::PictureNotFound(picture.to_string()))?;
        if list.iter().any(|l| l.index == label.index) {
            return Err(ModelError::LabelIndexRepeated {
                picture: picture.to_string(),
                index: label.index,
            });
        }
        list.push(label);
        Ok(())
    }

    pub fn remove_label(&mut self, picture: &str, index: u32) -> Result<TranslationLabel, ModelError> {
        let list = self
            .pictures
            .get_mut(picture)
            .ok_or_else(|| ModelError::PictureNotFound(picture.to_string()))?;
        let pos = list
            .iter()
            .position(|l| l.index == index)
            .ok_or_else(|| ModelError::LabelNotFound {
                picture: picture.to_string(),
                index,
            })?;
        Ok(list.remove(pos))
    }

    pub fn move_label(&mut self, picture: &str, index: u32, x: f64, y: f64) -> Result<(), ModelError> {
        check_position(x, y)?;
        let label = self.label_mut(picture, index)?;
        label.x = x;
        label.y = y;
        Ok(())
    }

    pub fn set_label_text(
        &mut self,
        picture: &str,
        index: u32,
        text: impl Into<String>,
    ) -> Result<(), ModelError> {
        self.label_mut(picture, index)?.text = text.into();
        Ok(())
    }

    pub fn set_label_group(&mut self, picture: &str, index: u32, group_id: usize) -> Result<(), ModelError> {
        self.group(group_id)?;
        self.label_mut(picture, index)?.group_id = group_id;
        Ok(())
    }

    fn label_mut(&mut self, picture: &str, index: u32) -> Result<&mut TranslationLabel, ModelError> {
        self.pictures
            .get_mut(picture)
            .ok_or_else(|| ModelError::PictureNotFound(picture.to_string()))?
            .iter_mut()
            .find(|l| l.index == index)
            .ok_or_else(|| ModelError::LabelNotFound {
                picture: picture.to_string(),
                index,
            })
    }

    fn labels_iter(&self) -> impl Iterator<Item = &TranslationLabel> {
        self.pictures.values().flatten()
    }
}
