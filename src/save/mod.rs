// SPDX-FileCopyrightText: 2026 InkCaliber contributors
// SPDX-License-Identifier: MIT

//! The debounce-save pipeline.
//!
//! [`SaveController`] ties the pieces together: the editor reports edits,
//! [`DebounceGate`](debounce::DebounceGate) decides by fingerprint whether a
//! write is warranted and when, a [`SlotNaming`](naming::SlotNaming) policy
//! resolves where it goes, and [`SyncState`] tells the UI what is
//! happening. Saves are strictly coalescing: at most one pending write per
//! session, always carrying the newest observed state.

pub mod controller;
pub mod debounce;
pub mod naming;
pub mod status;

pub use controller::{FlushOutcome, Loaded, SaveController, SaveError, SessionEvent};
pub use naming::{sanitize_title, NamePlan, SessionDirNaming, SlotBinding, SlotNaming, TitledNaming};
pub use status::{StatusSignal, SyncState};
