// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Object identifiers addressing nodes independent of tree position.
//!
//! The storage layer addresses every node by a fixed-width id packed from a
//! 64-bit domain. Packing is little-endian and keeps only the low 32 bits;
//! the truncation is part of the contract and callers allocating ids must
//! stay within the 32-bit range if they need ids to survive a round trip.

/// Width in bytes of the packed object identifier.
pub const OBJECT_ID_LEN: usize = 4;

/// Fixed-width node address, stable for the node's lifetime.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    /// Packs the low 32 bits of `value` little-endian; high bits are discarded.
    #[must_use]
    pub fn from_u64_truncate(value: u64) -> Self {
        let bytes = value.to_le_bytes();
        Self([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Rebuilds an id from its packed byte form.
    #[must_use]
    pub fn from_bytes(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Canonical packed byte representation of this id.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; OBJECT_ID_LEN] {
        &self.0
    }

    /// Numeric value of the id within the 32-bit range.
    #[must_use]
    pub fn value(&self) -> u32 {
        u32::from_le_bytes(self.0)
    }

    /// Widens the id back into the 64-bit addressing domain.
    #[must_use]
    pub fn to_u64(&self) -> u64 {
        u64::from(self.value())
    }
}
