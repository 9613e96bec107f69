// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Translation label data structures.
//!
//! A label is a piece of translated text anchored at a normalized position
//! (0.0 to 1.0) on one picture and tagged with a group.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};

/// A positioned, group-tagged piece of text on one picture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationLabel {
    pub index: u32,
    pub x: f64,
    pub y: f64,
    pub group_id: usize,
    pub text: String,
}

impl TranslationLabel {
    /// Create a new label.
    pub fn new(index: u32, x: f64, y: f64, group_id: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            x,
            y,
            group_id,
            text: text.into(),
        }
    }

    /// Check the parts of the label that do not depend on its project.
    pub fn check(&self) -> Result<(), ModelError> {
        if self.index == 0 {
            return Err(ModelError::LabelIndexNotPositive);
        }
        check_position(self.x, self.y)
    }
}

/// Check that a position lies within the picture.
pub fn check_position(x: f64, y: f64) -> Result<(), ModelError> {
    if (0.0..=1.0).contains(&x) && (0.0..=1.0).contains(&y) {
        Ok(())
    } else {
        Err(ModelError::CoordinateOutOfRange { x, y })
    }
}
