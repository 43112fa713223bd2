//! Canonical serialization for page fingerprints.
//!
//! A fingerprint identifies the rendered content of a page, independent of
//! when it was generated. It is served as the page's `ETag`, so two
//! regenerations that compose the same document yield the same tag.
//!
//! ## Determinism Guarantees
//!
//! - Stable field order: Struct fields serialize in declaration order
//! - Stable Vec order: Sections serialize in document order
//! - No HashMap in hashed data

use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

use crate::types::{PageMeta, Section};

/// Serialize a value to canonical JSON bytes for hashing.
///
/// Values that cannot be serialized hash as the empty byte string.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).unwrap_or_default()
}

/// Compute canonical hash of a serializable value.
pub fn canonical_hash<T: Serialize>(value: &T) -> u64 {
    xxh64(&to_canonical_bytes(value), 0)
}

/// Compute canonical hash and return as hex string.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> String {
    format!("{:016x}", canonical_hash(value))
}

/// Fingerprint of a composed page.
pub fn page_fingerprint(meta: &PageMeta, sections: &[Section]) -> String {
    canonical_hash_hex(&(meta, sections))
}
