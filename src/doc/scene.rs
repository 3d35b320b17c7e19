// SPDX-FileCopyrightText: 2026 InkCaliber contributors
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Document, PayloadError};
use crate::model::{Fingerprint, FingerprintBuilder};

/// One element of the drawing canvas scene graph.
///
/// The whiteboard library bumps `version` and rerolls `version_nonce` on
/// every mutation of an element, which is exactly the change signal the
/// autosave fingerprint needs. Everything else about an element (geometry,
/// styling, bound text) rides along in `body` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneElement {
    pub id: String,
    #[serde(default)]
    pub version: u64,
    #[serde(rename = "versionNonce", default)]
    pub version_nonce: u64,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl SceneElement {
    pub fn new(id: impl Into<String>, version: u64, version_nonce: u64) -> Self {
        Self {
            id: id.into(),
            version,
            version_nonce,
            body: Map::new(),
        }
    }
}

/// The drawing canvas document, in the whiteboard library's `.excalidraw`
/// serialization shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(rename = "type", default = "scene_doc_type")]
    pub doc_type: String,
    #[serde(default = "scene_doc_version")]
    pub version: u64,
    #[serde(default)]
    pub elements: Vec<SceneElement>,
    #[serde(rename = "appState", default)]
    pub app_state: Value,
    #[serde(default)]
    pub files: Value,
}

fn scene_doc_type() -> String {
    "excalidraw".to_owned()
}

fn scene_doc_version() -> u64 {
    2
}

impl Document for SceneDocument {
    /// Covers `(id, version, version_nonce)` per element in document order.
    /// Element order is persistence-worthy (z-order edits reorder the
    /// list); element bodies and `app_state` are not (theme and viewport
    /// changes must not trigger writes).
    fn fingerprint(&self) -> Fingerprint {
        let mut builder = FingerprintBuilder::new();
        builder.u64_field("elements", self.elements.len() as u64);
        for element in &self.elements {
            builder
                .str_field("id", &element.id)
                .u64_field("v", element.version)
                .u64_field("n", element.version_nonce);
        }
        builder.finish()
    }

    fn to_payload(&self) -> Result<String, PayloadError> {
        Ok(serde_json::to_string(self)?)
    }

    fn from_payload(payload: &str) -> Result<Self, PayloadError> {
        Ok(serde_json::from_str(payload)?)
    }

    fn empty() -> Self {
        Self {
            doc_type: scene_doc_type(),
            version: scene_doc_version(),
            elements: Vec::new(),
            app_state: Value::Null,
            files: Value::Null,
        }
    }
}
