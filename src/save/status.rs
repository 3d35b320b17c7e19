// SPDX-FileCopyrightText: 2026 InkCaliber contributors
// SPDX-License-Identifier: MIT

use std::fmt;

use tokio::sync::watch;

/// Sync status surfaced to the owning UI component.
///
/// Transitions are driven solely by the save controller; the UI only reads.
/// `Unsaved` doubles as the "dirty, write scheduled" state while the
/// debounce window is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Loading,
    Saved,
    Unsaved,
    Syncing,
    Error,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Loading => "loading",
            Self::Saved => "saved",
            Self::Unsaved => "unsaved",
            Self::Syncing => "syncing",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// Watch-channel wrapper the controller publishes through.
///
/// Every transition is published, even when a write starts and finishes
/// well inside the debounce delay; the brief pass through `syncing` is part
/// of the contract and must reach subscribers.
#[derive(Debug)]
pub struct StatusSignal {
    tx: watch::Sender<SyncState>,
}

impl StatusSignal {
    pub fn new(initial: SyncState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.tx.subscribe()
    }

    pub fn get(&self) -> SyncState {
        *self.tx.borrow()
    }

    pub(crate) fn set(&self, state: SyncState) {
        // send_replace notifies watchers even if the value is unchanged.
        self.tx.send_replace(state);
    }
}
