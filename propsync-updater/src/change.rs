//! Write decisions.
//!
//! Redundant saves pollute revision history, so every write is gated here.

use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 of an attachment payload.
///
/// Compared by value: two digests of equal content are equal no matter
/// which buffers they were computed from.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    pub fn of(content: &[u8]) -> Self {
        Self(Sha256::digest(content).into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", self.to_hex())
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// `true` when the property did not exist or holds a different value.
pub fn property_needs_write(old: Option<&serde_json::Value>, new: &serde_json::Value) -> bool {
    match old {
        None => true,
        Some(old) => old != new,
    }
}

/// `true` when there is no existing attachment or its content digest differs.
pub fn attachment_needs_write(existing: Option<&[u8]>, candidate: &[u8]) -> bool {
    let candidate = ContentDigest::of(candidate);
    match existing {
        None => true,
        Some(existing) => ContentDigest::of(existing) != candidate,
    }
}
