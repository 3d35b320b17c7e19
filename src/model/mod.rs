// SPDX-FileCopyrightText: 2026 InkCaliber contributors
// SPDX-License-Identifier: MIT

//! Identifier newtypes and the change-detection fingerprint.

pub mod fingerprint;
pub mod ids;

pub use fingerprint::{Fingerprint, FingerprintBuilder};
pub use ids::{BranchId, Id, IdError, SlotId};
