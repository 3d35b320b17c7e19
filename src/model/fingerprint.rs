// SPDX-FileCopyrightText: 2026 InkCaliber contributors
// SPDX-License-Identifier: MIT

use std::fmt;

use serde_json::Value;

/// A cheap digest of the persistence-relevant fields of a document.
///
/// Equality means "no persistence-worthy change occurred"; the save
/// controller skips scheduling a write when the fingerprint of an edited
/// document matches the pending or last-saved one. Cosmetic and derived
/// fields (viewport state, timestamps, element bodies) must never feed into
/// a fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

// Tag bytes keep adjacent fields from aliasing each other (`"ab", "c"` vs
// `"a", "bc"`) and distinguish an absent optional field from an empty one.
const TAG_FIELD: u8 = 0x1f;
const TAG_END: u8 = 0x1e;
const TAG_NONE: u8 = 0x00;
const TAG_SOME: u8 = 0x01;
const TAG_NULL: u8 = 0x02;
const TAG_BOOL: u8 = 0x03;
const TAG_NUMBER: u8 = 0x04;
const TAG_STRING: u8 = 0x05;
const TAG_ARRAY: u8 = 0x06;
const TAG_OBJECT: u8 = 0x07;

/// Streaming FNV-1a builder. Infallible by design: a fingerprint function
/// must not have a failure mode, so every writer accepts plain values and
/// missing optionals contribute a stable placeholder tag.
#[derive(Debug, Clone)]
pub struct FingerprintBuilder {
    hash: u64,
}

impl FingerprintBuilder {
    pub fn new() -> Self {
        Self { hash: FNV_OFFSET }
    }

    pub fn finish(self) -> Fingerprint {
        Fingerprint(self.hash)
    }

    pub fn str_field(&mut self, name: &str, value: &str) -> &mut Self {
        self.write_name(name);
        self.write_bytes(value.as_bytes());
        self.write_byte(TAG_END);
        self
    }

    pub fn u64_field(&mut self, name: &str, value: u64) -> &mut Self {
        self.write_name(name);
        self.write_bytes(&value.to_le_bytes());
        self.write_byte(TAG_END);
        self
    }

    pub fn i64_field(&mut self, name: &str, value: i64) -> &mut Self {
        self.write_name(name);
        self.write_bytes(&value.to_le_bytes());
        self.write_byte(TAG_END);
        self
    }

    pub fn opt_str_field(&mut self, name: &str, value: Option<&str>) -> &mut Self {
        self.write_name(name);
        match value {
            None => self.write_byte(TAG_NONE),
            Some(value) => {
                self.write_byte(TAG_SOME);
                self.write_bytes(value.as_bytes());
            }
        }
        self.write_byte(TAG_END);
        self
    }

    /// Hashes a JSON value structurally without serializing it back to text.
    /// Object entries are visited in `serde_json`'s map order, which is key-
    /// sorted, so the digest is invariant to field ordering in the source
    /// document.
    pub fn json_field(&mut self, name: &str, value: &Value) -> &mut Self {
        self.write_name(name);
        self.write_json(value);
        self.write_byte(TAG_END);
        self
    }

    fn write_json(&mut self, value: &Value) {
        match value {
            Value::Null => self.write_byte(TAG_NULL),
            Value::Bool(b) => {
                self.write_byte(TAG_BOOL);
                self.write_byte(u8::from(*b));
            }
            Value::Number(n) => {
                self.write_byte(TAG_NUMBER);
                // serde_json renders numbers canonically for a given value,
                // so the textual form is a stable key.
                self.write_bytes(n.to_string().as_bytes());
                self.write_byte(TAG_END);
            }
            Value::String(s) => {
                self.write_byte(TAG_STRING);
                self.write_bytes(s.as_bytes());
                self.write_byte(TAG_END);
            }
            Value::Array(items) => {
                self.write_byte(TAG_ARRAY);
                self.write_bytes(&(items.len() as u64).to_le_bytes());
                for item in items {
                    self.write_json(item);
                }
            }
            Value::Object(map) => {
                self.write_byte(TAG_OBJECT);
                self.write_bytes(&(map.len() as u64).to_le_bytes());
                for (key, item) in map {
                    self.write_bytes(key.as_bytes());
                    self.write_byte(TAG_FIELD);
                    self.write_json(item);
                }
            }
        }
    }

    fn write_name(&mut self, name: &str) {
        self.write_bytes(name.as_bytes());
        self.write_byte(TAG_FIELD);
    }

    fn write_byte(&mut self, byte: u8) {
        self.hash ^= u64::from(byte);
        self.hash = self.hash.wrapping_mul(FNV_PRIME);
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.write_byte(byte);
        }
    }
}

impl Default for FingerprintBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::FingerprintBuilder;

    fn digest(build: impl FnOnce(&mut FingerprintBuilder)) -> super::Fingerprint {
        let mut builder = FingerprintBuilder::new();
        build(&mut builder);
        builder.finish()
    }

    #[test]
    fn same_fields_same_fingerprint() {
        let a = digest(|b| {
            b.str_field("title", "Draft").u64_field("rev", 3);
        });
        let b = digest(|b| {
            b.str_field("title", "Draft").u64_field("rev", 3);
        });
        assert_eq!(a, b);
    }

    #[test]
    fn adjacent_fields_do_not_alias() {
        let a = digest(|b| {
            b.str_field("t", "ab").str_field("u", "c");
        });
        let b = digest(|b| {
            b.str_field("t", "a").str_field("u", "bc");
        });
        assert_ne!(a, b);
    }

    #[test]
    fn none_differs_from_empty_string() {
        let a = digest(|b| {
            b.opt_str_field("prompt", None);
        });
        let b = digest(|b| {
            b.opt_str_field("prompt", Some(""));
        });
        assert_ne!(a, b);
    }

    #[test]
    fn json_object_key_order_is_irrelevant() {
        // serde_json without preserve_order sorts map keys, so two
        // differently-ordered source documents parse to equal values; the
        // digest must agree with that.
        let a = digest(|b| {
            b.json_field("content", &json!({"type": "doc", "attrs": {"x": 1, "y": 2}}));
        });
        let b = digest(|b| {
            b.json_field("content", &json!({"attrs": {"y": 2, "x": 1}, "type": "doc"}));
        });
        assert_eq!(a, b);
    }

    #[test]
    fn json_value_changes_change_fingerprint() {
        let a = digest(|b| {
            b.json_field("content", &json!({"text": "hello"}));
        });
        let b = digest(|b| {
            b.json_field("content", &json!({"text": "hello!"}));
        });
        assert_ne!(a, b);
    }
}
