//! Composite row keys for joined collections.
//!
//! An `hda` row pairs a history with one of its datasets, so its id is the
//! two parent ids joined by [`SEPARATOR`]. This module is the only place
//! that builds or splits those ids.
//!
//! Ids that themselves contain the separator cannot be split unambiguously;
//! [`decode`] rejects anything that does not split into exactly two parts.

use crate::error::{GripperError, Result};

pub const SEPARATOR: char = ':';

/// Join a parent and child id into a composite key.
pub fn encode(parent_id: &str, child_id: &str) -> String {
    format!("{}{}{}", parent_id, SEPARATOR, child_id)
}

/// Split a composite key back into `(parent_id, child_id)`.
pub fn decode(composite: &str) -> Result<(&str, &str)> {
    let mut parts = composite.split(SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(parent), Some(child), None) => Ok((parent, child)),
        _ => Err(GripperError::MalformedKey(composite.to_string())),
    }
}
