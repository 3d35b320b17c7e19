// SPDX-FileCopyrightText: 2026 InkCaliber contributors
// SPDX-License-Identifier: MIT

use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

/// A durable storage identity used across the save and store surfaces.
///
/// This is intentionally std-only and does not enforce any particular naming
/// scheme; it only enforces that the id is a single *filesystem-safe* path
/// segment, because ids become file stems (`<slot>.json`) or directory names
/// (`<slot>/<branch>.excalidraw`) under a store root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        validate_id_segment(&value)?;
        Ok(Self {
            value,
            _marker: PhantomData,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> AsRef<str> for Id<T> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<T> Borrow<str> for Id<T> {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl<T> FromStr for Id<T> {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

impl<T> TryFrom<String> for Id<T> {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    Empty,
    PathSeparator,
    LeadingDot,
    TrailingDotOrSpace,
    ReservedCharacter(char),
    WindowsDeviceName,
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("id must not be empty"),
            Self::PathSeparator => f.write_str("id must not contain '/' or '\\'"),
            Self::LeadingDot => f.write_str("id must not start with '.'"),
            Self::TrailingDotOrSpace => f.write_str("id must not end with '.' or ' '"),
            Self::ReservedCharacter(ch) => {
                write!(f, "id must not contain reserved character {ch:?}")
            }
            Self::WindowsDeviceName => f.write_str("id must not be a Windows device name"),
        }
    }
}

impl std::error::Error for IdError {}

/// Accepts exactly the names that are safe as a file stem on every platform
/// the desktop shell ships to. Dotfiles are rejected so slots can never
/// collide with the store's own `.trash/` directory or temp files.
fn validate_id_segment(value: &str) -> Result<(), IdError> {
    if value.is_empty() {
        return Err(IdError::Empty);
    }
    if value.starts_with('.') {
        return Err(IdError::LeadingDot);
    }
    if value.ends_with('.') || value.ends_with(' ') {
        return Err(IdError::TrailingDotOrSpace);
    }

    for ch in value.chars() {
        if matches!(ch, '/' | '\\') {
            return Err(IdError::PathSeparator);
        }
        if matches!(ch, '<' | '>' | ':' | '"' | '|' | '?' | '*') {
            return Err(IdError::ReservedCharacter(ch));
        }
        if ch <= '\u{1f}' || ch == '\u{7f}' {
            return Err(IdError::ReservedCharacter(ch));
        }
    }

    let base = value.split('.').next().unwrap_or(value);
    if is_windows_device_name(base) {
        return Err(IdError::WindowsDeviceName);
    }

    Ok(())
}

fn is_windows_device_name(base: &str) -> bool {
    let base = base.to_ascii_uppercase();
    match base.as_str() {
        "CON" | "PRN" | "AUX" | "NUL" => true,
        _ => {
            if let Some(num) = base.strip_prefix("COM") {
                matches!(num, "1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9")
            } else if let Some(num) = base.strip_prefix("LPT") {
                matches!(num, "1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9")
            } else {
                false
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SlotIdTag {}
pub type SlotId = Id<SlotIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BranchIdTag {}
pub type BranchId = Id<BranchIdTag>;

#[cfg(test)]
mod tests {
    use super::{Id, IdError};

    #[test]
    fn id_rejects_empty() {
        let result: Result<Id<()>, _> = Id::new("");
        assert_eq!(result, Err(IdError::Empty));
    }

    #[test]
    fn id_rejects_path_separators() {
        let result: Result<Id<()>, _> = Id::new("a/b");
        assert_eq!(result, Err(IdError::PathSeparator));

        let result: Result<Id<()>, _> = Id::new("a\\b");
        assert_eq!(result, Err(IdError::PathSeparator));
    }

    #[test]
    fn id_rejects_dotfiles_and_traversal() {
        let result: Result<Id<()>, _> = Id::new(".trash");
        assert_eq!(result, Err(IdError::LeadingDot));

        let result: Result<Id<()>, _> = Id::new("..");
        assert_eq!(result, Err(IdError::LeadingDot));
    }

    #[test]
    fn id_rejects_windows_hazards() {
        let result: Result<Id<()>, _> = Id::new("draft.");
        assert_eq!(result, Err(IdError::TrailingDotOrSpace));

        let result: Result<Id<()>, _> = Id::new("CON");
        assert_eq!(result, Err(IdError::WindowsDeviceName));

        let result: Result<Id<()>, _> = Id::new("com1.json");
        assert_eq!(result, Err(IdError::WindowsDeviceName));

        let result: Result<Id<()>, _> = Id::new("a:b");
        assert_eq!(result, Err(IdError::ReservedCharacter(':')));
    }

    #[test]
    fn id_accepts_ordinary_titles() {
        let id: Id<()> = Id::new("Meeting Notes 2026-02").unwrap();
        assert_eq!(id.as_str(), "Meeting Notes 2026-02");
    }
}
