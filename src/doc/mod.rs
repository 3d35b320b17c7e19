// SPDX-FileCopyrightText: 2026 InkCaliber contributors
// SPDX-License-Identifier: MIT

//! Concrete document payloads for the three editors.
//!
//! The save controller is generic over [`Document`]; the editors own the
//! in-memory document and hand the controller a reference on every edit.
//! Payload interiors (scene element bodies, rich-text trees, chat message
//! text) are opaque to this crate; only identity/version-bearing fields
//! participate in fingerprints.

use std::fmt;

use crate::model::Fingerprint;

pub mod chat;
pub mod note;
pub mod scene;

pub use chat::{ChatDocument, ChatMessage, ChatRole};
pub use note::NoteDocument;
pub use scene::{SceneDocument, SceneElement};

/// An editor document that can be autosaved.
pub trait Document: Clone {
    /// Digest of the persistence-relevant fields. Must be deterministic,
    /// side-effect-free, and cheap relative to full serialization.
    fn fingerprint(&self) -> Fingerprint;

    /// Serialized form written to the backing slot.
    fn to_payload(&self) -> Result<String, PayloadError>;

    /// Parses a previously written payload. The storage-side name (title)
    /// is not part of the payload for title-named documents; the loader
    /// reapplies it via [`adopt_slot_name`](Self::adopt_slot_name).
    fn from_payload(payload: &str) -> Result<Self, PayloadError>
    where
        Self: Sized;

    /// The document a fresh or failed-to-load editor starts from.
    fn empty() -> Self
    where
        Self: Sized;

    /// The user-visible name backing slot resolution, for document kinds
    /// the user names directly. The drawing canvas returns `None`; its
    /// sessions are named by folder.
    fn requested_name(&self) -> Option<&str> {
        None
    }

    /// Applies the slot name after a load, for document kinds whose name
    /// lives in the file name rather than the payload. Default: no-op.
    fn adopt_slot_name(&mut self, name: &str) {
        let _ = name;
    }
}

#[derive(Debug)]
pub enum PayloadError {
    Json { source: serde_json::Error },
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json { source } => write!(f, "document payload json error: {source}"),
        }
    }
}

impl std::error::Error for PayloadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json { source } => Some(source),
        }
    }
}

impl From<serde_json::Error> for PayloadError {
    fn from(source: serde_json::Error) -> Self {
        Self::Json { source }
    }
}
