// SPDX-FileCopyrightText: 2026 InkCaliber contributors
// SPDX-License-Identifier: MIT

//! Persistence for document slots on disk.
//!
//! The store module is the save controller's only external boundary. The
//! [`SlotStore`] trait is the persistence collaborator contract; the
//! filesystem implementation [`FsSlotStore`] writes the on-disk layout the
//! desktop shell uses (directory per document type, one file per document,
//! one file per branch for canvas sessions).

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::model::SlotId;

pub mod fs_slots;

pub use fs_slots::{FsSlotStore, SlotLayout, WriteDurability};

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    /// Rename target is already occupied. Distinguished from `Io` because
    /// the controller maps it to a recoverable `NameCollision`.
    AlreadyExists {
        path: PathBuf,
    },
    SymlinkRefused {
        path: PathBuf,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::AlreadyExists { path } => write!(f, "slot already exists at {path:?}"),
            Self::SymlinkRefused { path } => {
                write!(f, "refusing to write through symlink at {path:?}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::AlreadyExists { .. } => None,
            Self::SymlinkRefused { .. } => None,
        }
    }
}

/// The persistence collaborator consumed by the save controller.
///
/// At most one operation per session is in flight at a time by construction
/// (the controller awaits each call inline), so implementations need no
/// internal synchronization for the single-writer case.
#[allow(async_fn_in_trait)]
pub trait SlotStore {
    /// Reads a slot's payload. `Ok(None)` means the slot does not exist,
    /// which is an ordinary outcome for fresh sessions, not an error.
    async fn read_document(&self, slot: &SlotId) -> Result<Option<String>, StoreError>;

    /// Writes a slot's payload, creating the slot if needed. Must be atomic:
    /// a reader never observes a partially written payload.
    async fn write_document(&self, slot: &SlotId, payload: &str) -> Result<(), StoreError>;

    /// Atomically renames a slot. Fails with [`StoreError::AlreadyExists`]
    /// when the target is occupied, leaving both slots untouched.
    async fn rename_slot(&self, old: &SlotId, new: &SlotId) -> Result<(), StoreError>;

    /// Whether a slot is currently occupied. Backs the rename collision
    /// check.
    async fn slot_exists(&self, slot: &SlotId) -> Result<bool, StoreError>;
}
