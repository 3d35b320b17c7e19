// SPDX-FileCopyrightText: 2026 InkCaliber contributors
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use super::{Document, PayloadError};
use crate::model::{Fingerprint, FingerprintBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(default)]
    pub timestamp: String,
}

/// A chat transcript. The hosted-AI plumbing that appends assistant turns
/// lives outside this crate; from the autosave core's point of view a chat
/// is just a titled message list with a system-prompt selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatDocument {
    pub title: String,
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl ChatDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::empty()
        }
    }

    pub fn push_message(&mut self, role: ChatRole, content: impl Into<String>) {
        self.messages.push(ChatMessage {
            role,
            content: content.into(),
            timestamp: String::new(),
        });
    }
}

impl Document for ChatDocument {
    /// Covers title, prompt selection, and the role/content of every
    /// message. Per-message timestamps and `created_at`/`updated_at` are
    /// derived bookkeeping and excluded, so rewriting timestamps alone
    /// never schedules a write.
    fn fingerprint(&self) -> Fingerprint {
        let mut builder = FingerprintBuilder::new();
        builder
            .str_field("title", &self.title)
            .str_field("prompt", &self.system_prompt)
            .u64_field("messages", self.messages.len() as u64);
        for message in &self.messages {
            builder
                .str_field("role", message.role.as_str())
                .str_field("content", &message.content);
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
            title: String::new(),
            system_prompt: "default".to_owned(),
            messages: Vec::new(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn requested_name(&self) -> Option<&str> {
        Some(&self.title)
    }

    fn adopt_slot_name(&mut self, name: &str) {
        self.title = name.to_owned();
    }
}
