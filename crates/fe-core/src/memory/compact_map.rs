//! Hash containers used throughout the crate.
//!
//! With the `fast-hash` feature (default) these are hashbrown tables with the
//! Fx hasher: lower CPU overhead on the short keys a front end deals in. Without
//! it they fall back to the std containers. Nothing observable depends on which
//! backend is compiled in.

use std::hash::Hash;

#[cfg(feature = "fast-hash")]
mod backend {
    use rustc_hash::FxHasher;
    use std::hash::BuildHasherDefault;

    pub type FastBuildHasher = BuildHasherDefault<FxHasher>;
    pub type FastMap<K, V> = hashbrown::HashMap<K, V, FastBuildHasher>;
    pub type FastSet<T> = hashbrown::HashSet<T, FastBuildHasher>;
}

#[cfg(not(feature = "fast-hash"))]
mod backend {
    pub type FastBuildHasher = std::collections::hash_map::RandomState;
    pub type FastMap<K, V> = std::collections::HashMap<K, V, FastBuildHasher>;
    pub type FastSet<T> = std::collections::HashSet<T, FastBuildHasher>;
}

pub use backend::{FastBuildHasher, FastMap, FastSet};

pub fn fast_map_with_capacity<K, V>(capacity: usize) -> FastMap<K, V> {
    FastMap::with_capacity_and_hasher(capacity, FastBuildHasher::default())
}

pub fn fast_set_with_capacity<T>(capacity: usize) -> FastSet<T> {
    FastSet::with_capacity_and_hasher(capacity, FastBuildHasher::default())
}

/// Insert-unless-present for sets of small `Copy` handles, returning the
/// element that ends up in the set.
pub trait GetOrInsert<T> {
    fn get_or_insert_copy(&mut self, value: T) -> T;
}

#[cfg(feature = "fast-hash")]
impl<T: Copy + Hash + Eq> GetOrInsert<T> for FastSet<T> {
    #[inline]
    fn get_or_insert_copy(&mut self, value: T) -> T {
        *self.get_or_insert(value)
    }
}

#[cfg(not(feature = "fast-hash"))]
impl<T: Copy + Hash + Eq> GetOrInsert<T> for FastSet<T> {
    #[inline]
    fn get_or_insert_copy(&mut self, value: T) -> T {
        if let Some(existing) = self.get(&value) {
            return *existing;
        }
        self.insert(value);
        value
    }
}
