// SPDX-FileCopyrightText: 2026 InkCaliber contributors
// SPDX-License-Identifier: MIT

use tokio::time::{Duration, Instant};

use crate::model::Fingerprint;

/// What [`DebounceGate::observe`] decided about an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Redundant token; any running timer keeps its original deadline.
    Ignored,
    /// New pending token; the delay timer was (re)armed from now.
    Armed,
    /// The edit undid the document back to the last-saved state while a
    /// write was pending; the pending write was cancelled.
    Disarmed,
}

/// Decision core of the debounce scheduler.
///
/// Tracks the last successfully persisted fingerprint, the pending one, and
/// the deadline after which the pending write is due. At most one pending
/// write exists; a new qualifying edit replaces it (coalescing, not
/// queuing). The gate holds no timer task of its own; the owner sleeps on
/// [`deadline`](Self::deadline), so dropping it cancels everything.
#[derive(Debug)]
pub struct DebounceGate {
    delay: Duration,
    last_saved: Option<Fingerprint>,
    pending: Option<Fingerprint>,
    deadline: Option<Instant>,
}

impl DebounceGate {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_saved: None,
            pending: None,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn pending(&self) -> Option<Fingerprint> {
        self.pending
    }

    pub fn last_saved(&self) -> Option<Fingerprint> {
        self.last_saved
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Feeds one edit's fingerprint through the gate.
    pub fn observe(&mut self, token: Fingerprint) -> GateDecision {
        if self.pending == Some(token) {
            return GateDecision::Ignored;
        }

        if self.last_saved == Some(token) {
            if self.pending.is_some() {
                self.pending = None;
                self.deadline = None;
                return GateDecision::Disarmed;
            }
            return GateDecision::Ignored;
        }

        self.pending = Some(token);
        self.deadline = Some(Instant::now() + self.delay);
        GateDecision::Armed
    }

    /// The pending token if its deadline has passed.
    pub fn due_token(&self, now: Instant) -> Option<Fingerprint> {
        let deadline = self.deadline?;
        if now >= deadline {
            self.pending
        } else {
            None
        }
    }

    /// Stops the timer without dropping the pending token. Used when a
    /// flush begins (the write is now in flight) and when a save is
    /// deferred pending a usable name.
    pub fn clear_deadline(&mut self) {
        self.deadline = None;
    }

    /// Records a successful write of `token`.
    pub fn mark_saved(&mut self, token: Fingerprint) {
        self.last_saved = Some(token);
        if self.pending == Some(token) {
            self.pending = None;
            self.deadline = None;
        }
    }

    /// Records a failed write. The pending token is dropped so the next
    /// qualifying edit re-arms even if it reproduces the same state;
    /// that edit is the retry path.
    pub fn mark_write_failed(&mut self) {
        self.pending = None;
        self.deadline = None;
    }

    /// Seeds the gate from a freshly loaded document, so the first
    /// no-op change notification from the editor does not schedule a write.
    pub fn mark_loaded(&mut self, token: Fingerprint) {
        self.last_saved = Some(token);
        self.pending = None;
        self.deadline = None;
    }
}
