//! Canonical serialization for deterministic fingerprints.
//!
//! Route graphs and back stacks are fingerprinted so a UI layer (or the
//! service API) can cheaply tell whether two snapshots describe the same
//! configuration.
//!
//! ## Determinism Guarantees
//!
//! - Struct fields serialize in declaration order
//! - Maps hashed here must be `BTreeMap`, never `HashMap`
//! - Sequences serialize in index order

use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

/// Serialize a value to canonical JSON bytes for hashing.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).expect("Canonical serialization failed")
}

/// Compute canonical hash of a serializable value.
pub fn canonical_hash<T: Serialize>(value: &T) -> u64 {
    xxh64(&to_canonical_bytes(value), 0)
}

/// Compute canonical hash and return as hex string.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> String {
    format!("{:016x}", canonical_hash(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_determinism() {
        let stack = vec![("home", 1u64), ("profile", 2u64)];
        assert_eq!(canonical_hash(&stack), canonical_hash(&stack));
    }

    #[test]
    fn test_order_sensitive() {
        let a = vec!["home", "profile"];
        let b = vec!["profile", "home"];
        assert_ne!(canonical_hash_hex(&a), canonical_hash_hex(&b));
    }

    #[test]
    fn test_btreemap_insertion_order_irrelevant() {
        let mut m1 = BTreeMap::new();
        m1.insert("b", 2);
        m1.insert("a", 1);
        let mut m2 = BTreeMap::new();
        m2.insert("a", 1);
        m2.insert("b", 2);
        assert_eq!(canonical_hash_hex(&m1), canonical_hash_hex(&m2));
        assert_eq!(canonical_hash_hex(&m1).len(), 16);
    }
}
