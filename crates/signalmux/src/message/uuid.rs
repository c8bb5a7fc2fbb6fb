// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The message identifier: a 16-byte value with a canonical hex-dash display
//! form. Unlike `hdds`'s RTPS `GUID` (dot-separated, 12+4 split) this is a
//! flat 16-byte id formatted per RFC 4122's 8-4-4-4-12 layout.

use std::fmt;

/// 16-byte message identifier, or empty prior to assignment.
///
/// # Invariants
/// `bytes()` is either exactly 16 bytes or empty; there is no other valid
/// length. [`MessageUuid::new`] enforces this at construction.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct MessageUuid(Vec<u8>);

impl MessageUuid {
    /// Construct from raw bytes. Fails if `bytes` is neither empty nor
    /// exactly 16 bytes long.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, InvalidUuidLength> {
        let bytes = bytes.into();
        if bytes.is_empty() || bytes.len() == 16 {
            Ok(Self(bytes))
        } else {
            Err(InvalidUuidLength(bytes.len()))
        }
    }

    /// The empty uuid, used for messages under construction.
    #[must_use]
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Canonical `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx` form, or the empty
    /// string if this uuid is not exactly 16 bytes.
    #[must_use]
    pub fn to_canonical_string(&self) -> String {
        if self.0.len() != 16 {
            return String::new();
        }
        let b = &self.0;
        format!(
            "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7], b[8], b[9], b[10], b[11], b[12], b[13], b[14], b[15]
        )
    }
}

impl fmt::Debug for MessageUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageUuid({})", self.to_canonical_string())
    }
}

/// Returned by [`MessageUuid::new`] when given a length other than 0 or 16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("uuid must be empty or exactly 16 bytes, got {0}")]
pub struct InvalidUuidLength(pub usize);
