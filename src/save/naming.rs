// SPDX-FileCopyrightText: 2026 InkCaliber contributors
// SPDX-License-Identifier: MIT

use std::time::{SystemTime, UNIX_EPOCH};

use crate::model::{ids::IdError, SlotId};

/// Where a session currently lives on storage.
///
/// `Unbound -> Bound(slot)` on first successful persist;
/// `Bound(slot) -> Bound(slot')` on successful rename. The binding is only
/// advanced by the controller after the store call succeeds, so a collision
/// or write failure leaves it where it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotBinding {
    Unbound,
    Bound(SlotId),
}

impl SlotBinding {
    pub fn slot(&self) -> Option<&SlotId> {
        match self {
            Self::Unbound => None,
            Self::Bound(slot) => Some(slot),
        }
    }
}

/// Pure output of a naming policy, executed by the controller against the
/// store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamePlan {
    /// No usable name yet (untitled note/chat); keep the edit in memory and
    /// try again on a later save cycle.
    Defer,
    /// Write to the slot the session is already bound to.
    Keep(SlotId),
    /// First persist of a new session; bind to this slot on success.
    Create(SlotId),
    /// The user renamed the document; move the backing store first, then
    /// write. The controller aborts with a name collision if `to` is
    /// occupied.
    Rename { from: SlotId, to: SlotId },
}

/// Decides the on-disk identity for a document at each save. Policies may
/// carry state (a minted-but-not-yet-bound slot), so planning takes `&mut`.
pub trait SlotNaming {
    fn plan(&mut self, binding: &SlotBinding, requested_name: Option<&str>) -> NamePlan;
}

/// Canvas sessions: named by a synthesized session folder, never renamed
/// through the editor. The branch label lives in the store layout, not in
/// the slot.
///
/// The folder name is minted once per session and cached, so a save that
/// fails before the binding advances retries into the same slot instead of
/// minting a fresh timestamp.
#[derive(Debug, Clone, Default)]
pub struct SessionDirNaming {
    minted: Option<SlotId>,
}

impl SessionDirNaming {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotNaming for SessionDirNaming {
    fn plan(&mut self, binding: &SlotBinding, _requested_name: Option<&str>) -> NamePlan {
        match binding {
            SlotBinding::Bound(slot) => NamePlan::Keep(slot.clone()),
            SlotBinding::Unbound => {
                let slot = self.minted.get_or_insert_with(synthesize_session_slot);
                NamePlan::Create(slot.clone())
            }
        }
    }
}

/// Notes and chats: the document title is the file name. An empty title
/// defers persistence (the original editors never save an unnamed
/// document); a changed title renames the backing file.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitledNaming;

impl TitledNaming {
    pub fn new() -> Self {
        Self
    }
}

impl SlotNaming for TitledNaming {
    fn plan(&mut self, binding: &SlotBinding, requested_name: Option<&str>) -> NamePlan {
        let requested = requested_name.and_then(sanitize_title);

        match (binding, requested) {
            (SlotBinding::Unbound, None) => NamePlan::Defer,
            (SlotBinding::Unbound, Some(slot)) => NamePlan::Create(slot),
            // Title cleared while bound: hold edits until a name is back.
            (SlotBinding::Bound(_), None) => NamePlan::Defer,
            (SlotBinding::Bound(current), Some(slot)) => {
                if &slot == current {
                    NamePlan::Keep(slot)
                } else {
                    NamePlan::Rename {
                        from: current.clone(),
                        to: slot,
                    }
                }
            }
        }
    }
}

/// Maps a user-typed title onto a filesystem-safe slot, or `None` when
/// nothing usable remains. Offending characters become `_` rather than
/// being dropped so distinct titles stay distinct.
pub fn sanitize_title(raw: &str) -> Option<SlotId> {
    let replaced: String = raw
        .trim()
        .chars()
        .map(|ch| {
            let reserved = matches!(ch, '/' | '\\' | '<' | '>' | ':' | '"' | '|' | '?' | '*');
            if reserved || ch <= '\u{1f}' || ch == '\u{7f}' {
                '_'
            } else {
                ch
            }
        })
        .collect();

    let name = replaced
        .trim_start_matches('.')
        .trim_end_matches([' ', '.'])
        .trim();
    if name.is_empty() {
        return None;
    }

    match SlotId::new(name) {
        Ok(slot) => Some(slot),
        // "CON" is a perfectly reasonable note title; park it behind an
        // underscore instead of refusing the save.
        Err(IdError::WindowsDeviceName) => SlotId::new(format!("_{name}")).ok(),
        Err(_) => None,
    }
}

/// Timestamp-based identity for a canvas session's folder, minted on first
/// persist.
fn synthesize_session_slot() -> SlotId {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    SlotId::new(format!("session-{millis}")).expect("synthesized session slot is a valid id")
}

#[cfg(test)]
mod tests {
    use super::{
        sanitize_title, NamePlan, SessionDirNaming, SlotBinding, SlotNaming, TitledNaming,
    };
    use crate::model::SlotId;

    fn slot(name: &str) -> SlotId {
        SlotId::new(name).unwrap()
    }

    #[test]
    fn session_naming_mints_timestamped_slot_once() {
        let mut naming = SessionDirNaming::new();

        let plan = naming.plan(&SlotBinding::Unbound, None);
        let NamePlan::Create(minted) = plan else {
            panic!("expected create, got {plan:?}");
        };
        assert!(minted.as_str().starts_with("session-"));

        let plan = naming.plan(&SlotBinding::Bound(minted.clone()), None);
        assert_eq!(plan, NamePlan::Keep(minted));
    }

    #[test]
    fn session_naming_reuses_the_minted_slot_while_unbound() {
        let mut naming = SessionDirNaming::new();

        // A first save that fails leaves the binding Unbound; the next
        // attempt must target the same folder, not a fresh timestamp.
        let first = naming.plan(&SlotBinding::Unbound, None);
        let second = naming.plan(&SlotBinding::Unbound, None);
        assert_eq!(first, second);
    }

    #[test]
    fn titled_naming_defers_without_a_title() {
        let mut naming = TitledNaming::new();
        assert_eq!(naming.plan(&SlotBinding::Unbound, None), NamePlan::Defer);
        assert_eq!(naming.plan(&SlotBinding::Unbound, Some("   ")), NamePlan::Defer);
        assert_eq!(
            naming.plan(&SlotBinding::Bound(slot("Draft")), Some("")),
            NamePlan::Defer
        );
    }

    #[test]
    fn titled_naming_creates_then_keeps_then_renames() {
        let mut naming = TitledNaming::new();

        assert_eq!(
            naming.plan(&SlotBinding::Unbound, Some("Draft")),
            NamePlan::Create(slot("Draft"))
        );
        assert_eq!(
            naming.plan(&SlotBinding::Bound(slot("Draft")), Some("Draft")),
            NamePlan::Keep(slot("Draft"))
        );
        assert_eq!(
            naming.plan(&SlotBinding::Bound(slot("Draft")), Some("Final")),
            NamePlan::Rename {
                from: slot("Draft"),
                to: slot("Final"),
            }
        );
    }

    #[test]
    fn sanitize_replaces_reserved_characters() {
        assert_eq!(sanitize_title("a/b:c?"), Some(slot("a_b_c_")));
        assert_eq!(sanitize_title("  Meeting Notes  "), Some(slot("Meeting Notes")));
    }

    #[test]
    fn sanitize_defuses_windows_hazards() {
        assert_eq!(sanitize_title("CON"), Some(slot("_CON")));
        assert_eq!(sanitize_title("ending dot..."), Some(slot("ending dot")));
        assert_eq!(sanitize_title("...hidden"), Some(slot("hidden")));
    }

    #[test]
    fn sanitize_rejects_unusable_titles() {
        assert_eq!(sanitize_title(""), None);
        assert_eq!(sanitize_title("   "), None);
        assert_eq!(sanitize_title(". . ."), None);
    }
}
