// SPDX-FileCopyrightText: 2026 InkCaliber contributors
// SPDX-License-Identifier: MIT

use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::{SlotStore, StoreError};
use crate::model::{BranchId, SlotId};

const TRASH_DIR: &str = ".trash";

/// How slots map onto files below the store root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotLayout {
    /// `root/<slot>.<ext>`: notes and chat transcripts.
    FlatFiles { ext: String },
    /// `root/<slot>/<branch>.<ext>`: canvas sessions, where the slot is the
    /// session folder and each branch is a file inside it.
    BranchDirs { branch: BranchId, ext: String },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Slower, best-effort durability.
    ///
    /// Attempts to flush written file contents and rename operations to
    /// stable storage where possible. Exact guarantees are
    /// platform/filesystem-dependent.
    Durable,
}

/// Filesystem-backed slot store rooted at one document-type directory.
#[derive(Debug, Clone)]
pub struct FsSlotStore {
    root: PathBuf,
    layout: SlotLayout,
    durability: WriteDurability,
}

impl FsSlotStore {
    pub fn flat(root: impl Into<PathBuf>, ext: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            layout: SlotLayout::FlatFiles { ext: ext.into() },
            durability: WriteDurability::default(),
        }
    }

    pub fn branched(
        root: impl Into<PathBuf>,
        branch: BranchId,
        ext: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            layout: SlotLayout::BranchDirs {
                branch,
                ext: ext.into(),
            },
            durability: WriteDurability::default(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    /// Same store aimed at a different branch of the same sessions. Only
    /// meaningful for the branched layout; a no-op clone otherwise.
    pub fn with_branch(mut self, branch: BranchId) -> Self {
        if let SlotLayout::BranchDirs { branch: current, .. } = &mut self.layout {
            *current = branch;
        }
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> &SlotLayout {
        &self.layout
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    /// The file backing a slot's payload under the current layout.
    pub fn document_path(&self, slot: &SlotId) -> PathBuf {
        match &self.layout {
            SlotLayout::FlatFiles { ext } => {
                self.root.join(format!("{}.{ext}", slot.as_str()))
            }
            SlotLayout::BranchDirs { branch, ext } => self
                .root
                .join(slot.as_str())
                .join(format!("{}.{ext}", branch.as_str())),
        }
    }

    /// The path renamed/trashed when a slot's identity changes: the file in
    /// the flat layout, the whole session folder in the branched one.
    fn slot_root_path(&self, slot: &SlotId) -> PathBuf {
        match &self.layout {
            SlotLayout::FlatFiles { ext } => {
                self.root.join(format!("{}.{ext}", slot.as_str()))
            }
            SlotLayout::BranchDirs { .. } => self.root.join(slot.as_str()),
        }
    }

    /// Enumerates the occupied slots, sorted by name.
    pub async fn list_slots(&self) -> Result<Vec<SlotId>, StoreError> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.root.clone(),
                    source,
                });
            }
        };

        let mut slots = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|source| StoreError::Io {
            path: self.root.clone(),
            source,
        })? {
            let Some(name) = entry.file_name().to_str().map(ToOwned::to_owned) else {
                continue;
            };

            let stem = match &self.layout {
                SlotLayout::FlatFiles { ext } => {
                    match name.strip_suffix(&format!(".{ext}")) {
                        Some(stem) => stem.to_owned(),
                        None => continue,
                    }
                }
                SlotLayout::BranchDirs { .. } => {
                    let is_dir = entry
                        .file_type()
                        .await
                        .map(|ft| ft.is_dir())
                        .unwrap_or(false);
                    if !is_dir {
                        continue;
                    }
                    name
                }
            };

            // Trash, temp files, and anything else a SlotId would reject is
            // invisible to the library pages.
            if let Ok(slot) = SlotId::new(stem) {
                slots.push(slot);
            }
        }

        slots.sort();
        Ok(slots)
    }

    /// Enumerates the branches of a canvas session, sorted by name. Empty
    /// for the flat layout, which has no branch concept.
    pub async fn list_branches(&self, slot: &SlotId) -> Result<Vec<BranchId>, StoreError> {
        let SlotLayout::BranchDirs { ext, .. } = &self.layout else {
            return Ok(Vec::new());
        };

        let session_dir = self.root.join(slot.as_str());
        let mut entries = match fs::read_dir(&session_dir).await {
            Ok(entries) => entries,
            Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: session_dir,
                    source,
                });
            }
        };

        let suffix = format!(".{ext}");
        let mut branches = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|source| StoreError::Io {
            path: session_dir.clone(),
            source,
        })? {
            let Some(name) = entry.file_name().to_str().map(ToOwned::to_owned) else {
                continue;
            };
            let Some(stem) = name.strip_suffix(&suffix) else {
                continue;
            };
            if let Ok(branch) = BranchId::new(stem) {
                branches.push(branch);
            }
        }

        branches.sort();
        Ok(branches)
    }

    /// Deletes one branch file of a canvas session. The session folder and
    /// its other branches stay in place; callers guard the main branch. A
    /// no-op for the flat layout, which has no branch concept.
    pub async fn remove_branch(&self, slot: &SlotId, branch: &BranchId) -> Result<(), StoreError> {
        let SlotLayout::BranchDirs { ext, .. } = &self.layout else {
            return Ok(());
        };

        let path = self
            .root
            .join(slot.as_str())
            .join(format!("{}.{ext}", branch.as_str()));
        fs::remove_file(&path)
            .await
            .map_err(|source| StoreError::Io { path, source })
    }

    /// Moves a slot into the store's `.trash/` directory instead of deleting
    /// it, the way the library pages do. A trashed name that is already
    /// taken gets a numeric suffix.
    pub async fn remove_slot(&self, slot: &SlotId) -> Result<(), StoreError> {
        let from = self.slot_root_path(slot);
        let trash_dir = self.root.join(TRASH_DIR);
        fs::create_dir_all(&trash_dir)
            .await
            .map_err(|source| StoreError::Io {
                path: trash_dir.clone(),
                source,
            })?;

        let file_name = from
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| slot.as_str().to_owned());

        let mut target = trash_dir.join(&file_name);
        let mut attempt = 1_u32;
        while path_occupied(&target).await? {
            target = trash_dir.join(format!("{file_name}.{attempt}"));
            attempt += 1;
        }

        fs::rename(&from, &target)
            .await
            .map_err(|source| StoreError::Io { path: from, source })
    }

    /// Allocates the next free `"<prefix> <n>"` slot name, scanning the
    /// existing slots for the highest taken number. Gaps are not reused, so
    /// restoring a trashed "Untitled 2" can never collide with a new one.
    pub async fn allocate_untitled(&self, prefix: &SlotId) -> Result<SlotId, StoreError> {
        let mut highest = 0_u64;
        for slot in self.list_slots().await? {
            let Some(rest) = slot.as_str().strip_prefix(prefix.as_str()) else {
                continue;
            };
            if let Ok(n) = rest.trim_start().parse::<u64>() {
                highest = highest.max(n);
            }
        }

        let name = format!("{prefix} {}", highest + 1);
        Ok(SlotId::new(name).expect("a validated prefix plus a number is a valid slot"))
    }

    async fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<(), StoreError> {
        match fs::symlink_metadata(path).await {
            Ok(md) if md.file_type().is_symlink() => {
                return Err(StoreError::SymlinkRefused {
                    path: path.to_path_buf(),
                });
            }
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }

        let Some(parent) = path.parent() else {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source: io::Error::other("path has no parent"),
            });
        };
        fs::create_dir_all(parent)
            .await
            .map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;

        let Some(file_name) = path.file_name() else {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source: io::Error::other("path has no file name"),
            });
        };

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let tmp_path = parent.join(format!(
            ".inkcaliber.tmp.{}.{}",
            file_name.to_string_lossy(),
            nanos
        ));

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
            .await
            .map_err(|source| StoreError::Io {
                path: tmp_path.clone(),
                source,
            })?;

        if let Err(source) = write_and_flush(&mut file, contents, self.durability).await {
            drop(file);
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io {
                path: tmp_path,
                source,
            });
        }
        drop(file);

        if let Err(source) = fs::rename(&tmp_path, path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }

        if self.durability == WriteDurability::Durable {
            #[cfg(unix)]
            {
                let dir = std::fs::File::open(parent).map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
                dir.sync_all().map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        Ok(())
    }
}

async fn write_and_flush(
    file: &mut fs::File,
    contents: &[u8],
    durability: WriteDurability,
) -> io::Result<()> {
    file.write_all(contents).await?;
    file.flush().await?;
    if durability == WriteDurability::Durable {
        file.sync_all().await?;
    }
    Ok(())
}

async fn path_occupied(path: &Path) -> Result<bool, StoreError> {
    match fs::symlink_metadata(path).await {
        Ok(_) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

impl SlotStore for FsSlotStore {
    async fn read_document(&self, slot: &SlotId) -> Result<Option<String>, StoreError> {
        let path = self.document_path(slot);
        match fs::read_to_string(&path).await {
            Ok(payload) => Ok(Some(payload)),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    async fn write_document(&self, slot: &SlotId, payload: &str) -> Result<(), StoreError> {
        let path = self.document_path(slot);
        self.write_atomic(&path, payload.as_bytes()).await
    }

    async fn rename_slot(&self, old: &SlotId, new: &SlotId) -> Result<(), StoreError> {
        let from = self.slot_root_path(old);
        let to = self.slot_root_path(new);

        // `fs::rename` replaces existing files on Unix; the occupancy check
        // is what gives rename its abort-on-collision contract. A race with
        // an external writer is out of scope (single writer per store root).
        if path_occupied(&to).await? {
            return Err(StoreError::AlreadyExists { path: to });
        }

        fs::rename(&from, &to)
            .await
            .map_err(|source| StoreError::Io { path: from, source })
    }

    async fn slot_exists(&self, slot: &SlotId) -> Result<bool, StoreError> {
        path_occupied(&self.slot_root_path(slot)).await
    }
}
