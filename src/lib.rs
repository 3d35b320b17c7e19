// SPDX-FileCopyrightText: 2026 InkCaliber contributors
// SPDX-License-Identifier: MIT

//! InkCaliber: fingerprinted debounce-save core for document sessions.
//!
//! One [`save::SaveController`] per open editor (canvas scene, rich-text
//! note, chat thread) turns a stream of edit notifications into the fewest
//! possible disk writes: edits are fingerprinted, coalesced behind a
//! debounce window, and written atomically to a named slot, with document
//! naming and rename collisions resolved on the way.

pub mod doc;
pub mod model;
pub mod save;
pub mod store;

#[cfg(test)]
mod tests {
    #[test]
    fn sanity() {
        assert_eq!(2 + 2, 4);
    }
}
