// SPDX-FileCopyrightText: 2026 InkCaliber contributors
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Document, PayloadError};
use crate::model::{Fingerprint, FingerprintBuilder};

/// A rich-text note. The content is the editor library's JSON document tree
/// and is persisted verbatim; the title is the storage-side file name and is
/// therefore *not* part of the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteDocument {
    pub content: Value,
    #[serde(skip)]
    pub title: String,
}

impl NoteDocument {
    pub fn new(title: impl Into<String>, content: Value) -> Self {
        Self {
            content,
            title: title.into(),
        }
    }

    /// Reapplies the storage-side name after a load; see
    /// [`Document::from_payload`].
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

impl Document for NoteDocument {
    /// Covers the title (a rename is a persistence-worthy change) and the
    /// full structural hash of the content tree. The tree is hashed in
    /// place, object keys sorted, so reserialization and field ordering
    /// never produce a spurious change.
    fn fingerprint(&self) -> Fingerprint {
        let mut builder = FingerprintBuilder::new();
        builder
            .str_field("title", &self.title)
            .json_field("content", &self.content);
        builder.finish()
    }

    fn to_payload(&self) -> Result<String, PayloadError> {
        Ok(serde_json::to_string(&self.content)?)
    }

    fn from_payload(payload: &str) -> Result<Self, PayloadError> {
        Ok(Self {
            content: serde_json::from_str(payload)?,
            title: String::new(),
        })
    }

    fn empty() -> Self {
        Self {
            content: Value::Null,
            title: String::new(),
        }
    }

    fn requested_name(&self) -> Option<&str> {
        Some(&self.title)
    }

    fn adopt_slot_name(&mut self, name: &str) {
        self.title = name.to_owned();
    }
}
