//! Shelf label value type.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Shelf identifier: a short uppercase label (e.g. `"A"`).
///
/// Labels are the sole identity of a shelf; two shelves never share one.
/// Parsing normalizes case so that free-text advisory answers like `"b"`
/// compare equal to the shelf `"B"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShelfLabel(String);

impl ShelfLabel {
    /// Maximum label length accepted by `parse`.
    const MAX_LEN: usize = 8;

    /// Parse and normalize a label: trimmed, uppercased, non-empty,
    /// alphanumeric, at most 8 characters.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("shelf label cannot be empty"));
        }
        if trimmed.chars().count() > Self::MAX_LEN {
            return Err(DomainError::validation("shelf label too long"));
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::validation(
                "shelf label must be alphanumeric",
            ));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ShelfLabel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
