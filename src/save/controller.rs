// SPDX-FileCopyrightText: 2026 InkCaliber contributors
// SPDX-License-Identifier: MIT

use std::fmt;

use tokio::sync::{mpsc, watch};
use tokio::time::{Duration, Instant};

use super::debounce::{DebounceGate, GateDecision};
use super::naming::{NamePlan, SlotBinding, SlotNaming};
use super::status::{StatusSignal, SyncState};
use crate::doc::{Document, PayloadError};
use crate::model::{Fingerprint, SlotId};
use crate::store::{SlotStore, StoreError};

/// Storage-identity changes the host must mirror into its externally
/// visible identifier (the URL query parameter in the desktop shell).
/// Emitted exactly once per successful bind or rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SlotBound(SlotId),
    SlotRenamed { from: SlotId, to: SlotId },
}

#[derive(Debug)]
pub enum SaveError {
    Store(StoreError),
    Payload(PayloadError),
    /// The rename target is occupied. The original slot and the in-memory
    /// edits are untouched; the user must pick another name before the next
    /// save attempt can succeed.
    NameCollision { requested: SlotId },
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(source) => write!(f, "save failed: {source}"),
            Self::Payload(source) => write!(f, "save failed: {source}"),
            Self::NameCollision { requested } => {
                write!(f, "a document named {requested:?} already exists")
            }
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(source) => Some(source),
            Self::Payload(source) => Some(source),
            Self::NameCollision { .. } => None,
        }
    }
}

impl From<StoreError> for SaveError {
    fn from(source: StoreError) -> Self {
        Self::Store(source)
    }
}

impl From<PayloadError> for SaveError {
    fn from(source: PayloadError) -> Self {
        Self::Payload(source)
    }
}

/// What a flush attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing pending (or the deadline has not passed yet).
    NotDue,
    /// A write was pending but the naming policy has no usable name for it
    /// yet; the edit stays in memory and status stays `Unsaved`.
    Deferred,
    /// The pending state was written to the slot.
    Saved,
}

/// Result of [`SaveController::load`]. A failed load is recoverable: the
/// editor starts from the empty document and keeps the slot binding, so the
/// next save overwrites the unreadable payload.
#[derive(Debug)]
pub struct Loaded<D> {
    pub document: D,
    pub error: Option<SaveError>,
}

/// The fingerprinted debounce-save controller.
///
/// One instance per open editor session, exclusively owned by the UI
/// component that created it. The component calls
/// [`record_edit`](Self::record_edit) on every change notification and
/// drives the timer by awaiting [`debounce_elapsed`](Self::debounce_elapsed)
/// then calling [`flush_due`](Self::flush_due); everything else (naming,
/// collision checks, status, identity events) happens inside.
///
/// Dropping the controller cancels any pending write: no timer task is
/// spawned and no state escapes, so nothing can fire after teardown.
#[derive(Debug)]
pub struct SaveController<D, S, N> {
    store: S,
    naming: N,
    gate: DebounceGate,
    binding: SlotBinding,
    status: StatusSignal,
    snapshot: Option<D>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: Option<mpsc::UnboundedReceiver<SessionEvent>>,
}

impl<D, S, N> SaveController<D, S, N>
where
    D: Document,
    S: SlotStore,
    N: SlotNaming,
{
    pub fn new(store: S, naming: N, delay: Duration) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            store,
            naming,
            gate: DebounceGate::new(delay),
            binding: SlotBinding::Unbound,
            status: StatusSignal::new(SyncState::Saved),
            snapshot: None,
            events_tx,
            events_rx: Some(events_rx),
        }
    }

    /// Read-only view of the sync status for the UI indicator.
    pub fn status(&self) -> watch::Receiver<SyncState> {
        self.status.subscribe()
    }

    pub fn sync_state(&self) -> SyncState {
        self.status.get()
    }

    /// The slot this session is bound to, once first persisted.
    pub fn slot(&self) -> Option<&SlotId> {
        self.binding.slot()
    }

    /// Hands the session-identity event stream to the host. Yields `None`
    /// after the first call; there is exactly one consumer.
    pub fn take_session_events(&mut self) -> Option<mpsc::UnboundedReceiver<SessionEvent>> {
        self.events_rx.take()
    }

    /// Loads the session's document, resolving exactly once (no readiness
    /// polling). `None` starts a fresh unbound session with the empty
    /// document immediately.
    pub async fn load(&mut self, slot: Option<SlotId>) -> Loaded<D> {
        let Some(slot) = slot else {
            self.binding = SlotBinding::Unbound;
            return Loaded {
                document: D::empty(),
                error: None,
            };
        };

        self.status.set(SyncState::Loading);
        self.binding = SlotBinding::Bound(slot.clone());

        let payload = match self.store.read_document(&slot).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                // Fresh slot (resumed URL pointing at a not-yet-written
                // file): start empty, first flush creates it.
                self.status.set(SyncState::Saved);
                let mut document = D::empty();
                document.adopt_slot_name(slot.as_str());
                self.gate.mark_loaded(document.fingerprint());
                return Loaded {
                    document,
                    error: None,
                };
            }
            Err(source) => {
                self.status.set(SyncState::Error);
                let mut document = D::empty();
                document.adopt_slot_name(slot.as_str());
                return Loaded {
                    document,
                    error: Some(source.into()),
                };
            }
        };

        match D::from_payload(&payload) {
            Ok(mut document) => {
                document.adopt_slot_name(slot.as_str());
                self.gate.mark_loaded(document.fingerprint());
                self.status.set(SyncState::Saved);
                Loaded {
                    document,
                    error: None,
                }
            }
            Err(source) => {
                self.status.set(SyncState::Error);
                let mut document = D::empty();
                document.adopt_slot_name(slot.as_str());
                Loaded {
                    document,
                    error: Some(source.into()),
                }
            }
        }
    }

    /// The `triggerEdit` entry point: feed every change notification from
    /// the editor through here. Cheap: computes a fingerprint and
    /// possibly snapshots the document; never touches storage.
    pub fn record_edit(&mut self, document: &D) {
        let token = document.fingerprint();
        match self.gate.observe(token) {
            GateDecision::Armed => {
                self.snapshot = Some(document.clone());
                self.status.set(SyncState::Unsaved);
            }
            GateDecision::Disarmed => {
                self.snapshot = None;
                self.status.set(SyncState::Saved);
            }
            GateDecision::Ignored => {}
        }
    }

    /// Resolves when the pending write's debounce deadline passes. Pends
    /// forever while nothing is scheduled, so it is safe to park in a
    /// `select!` arm alongside the editor's input sources.
    pub async fn debounce_elapsed(&self) {
        match self.gate.deadline() {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    }

    /// Writes the pending state if its deadline has passed.
    pub async fn flush_due(&mut self) -> Result<FlushOutcome, SaveError> {
        let Some(token) = self.gate.due_token(Instant::now()) else {
            return Ok(FlushOutcome::NotDue);
        };
        self.gate.clear_deadline();
        self.flush_pending(token).await
    }

    /// Writes the pending state immediately, ignoring the deadline. For
    /// hosts that want durability on close; the core itself never calls it.
    pub async fn flush_now(&mut self) -> Result<FlushOutcome, SaveError> {
        let Some(token) = self.gate.pending() else {
            return Ok(FlushOutcome::NotDue);
        };
        self.gate.clear_deadline();
        self.flush_pending(token).await
    }

    async fn flush_pending(&mut self, token: Fingerprint) -> Result<FlushOutcome, SaveError> {
        let document = self
            .snapshot
            .clone()
            .expect("a pending token always has a document snapshot");

        self.status.set(SyncState::Syncing);

        let plan = self.naming.plan(&self.binding, document.requested_name());
        let slot = match plan {
            NamePlan::Defer => {
                self.status.set(SyncState::Unsaved);
                return Ok(FlushOutcome::Deferred);
            }
            NamePlan::Keep(slot) | NamePlan::Create(slot) => slot,
            NamePlan::Rename { from, to } => {
                match self.store.slot_exists(&to).await {
                    Ok(true) => {
                        self.fail_cycle();
                        return Err(SaveError::NameCollision { requested: to });
                    }
                    Ok(false) => {}
                    Err(source) => {
                        self.fail_cycle();
                        return Err(source.into());
                    }
                }

                match self.store.rename_slot(&from, &to).await {
                    Ok(()) => {}
                    Err(StoreError::AlreadyExists { .. }) => {
                        self.fail_cycle();
                        return Err(SaveError::NameCollision { requested: to });
                    }
                    Err(source) => {
                        self.fail_cycle();
                        return Err(source.into());
                    }
                }

                self.binding = SlotBinding::Bound(to.clone());
                let _ = self.events_tx.send(SessionEvent::SlotRenamed {
                    from,
                    to: to.clone(),
                });
                to
            }
        };

        let payload = match document.to_payload() {
            Ok(payload) => payload,
            Err(source) => {
                self.fail_cycle();
                return Err(source.into());
            }
        };

        match self.store.write_document(&slot, &payload).await {
            Ok(()) => {
                let newly_bound = self.binding == SlotBinding::Unbound;
                self.binding = SlotBinding::Bound(slot.clone());
                if newly_bound {
                    let _ = self.events_tx.send(SessionEvent::SlotBound(slot));
                }
                self.gate.mark_saved(token);
                self.snapshot = None;
                self.status.set(SyncState::Saved);
                Ok(FlushOutcome::Saved)
            }
            Err(source) => {
                self.fail_cycle();
                Err(source.into())
            }
        }
    }

    /// A failed cycle drops the pending write so the next qualifying edit
    /// retries through the normal debounce path, and surfaces `Error` until
    /// then. Slot binding is left untouched.
    fn fail_cycle(&mut self) {
        self.gate.mark_write_failed();
        self.snapshot = None;
        self.status.set(SyncState::Error);
    }
}
