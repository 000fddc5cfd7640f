//! Hashing of keys for data distribution.
//!
//! Records are routed between workers by a `u64` hash of their partitioning key. All keyed
//! exchanges in this crate go through `Hashable`, so the same key always reaches the same worker
//! regardless of which operator is doing the routing.

use std::hash::{Hash, Hasher};

/// Types with a `hashed` method, producing a `u64` used to pick a worker.
pub trait Hashable {
    /// A hash of the associated value.
    fn hashed(&self) -> u64;
}

impl<T: Hash + ?Sized> Hashable for T {
    fn hashed(&self) -> u64 {
        let mut h: ::fnv::FnvHasher = Default::default();
        self.hash(&mut h);
        h.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Hashable;

    #[test]
    fn equal_keys_hash_equally() {
        assert_eq!(17u32.hashed(), 17u32.hashed());
        assert_eq!("vertex".hashed(), String::from("vertex").hashed());
        assert_ne!(1u64.hashed(), 2u64.hashed());
    }
}
