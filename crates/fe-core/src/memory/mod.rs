//! Memory subsystem: paged bump arena, hash containers and usage tracking.
//!
//! Components:
//! - `arena`: page-based bump allocator with LIFO rollback
//! - `compact_map`: hash map/set aliases, hashbrown + Fx hasher or std
//! - `debug`: memory tracker to record usage by category

pub mod arena;
pub mod compact_map;
pub mod debug;

pub use arena::*;
pub use compact_map::*;
pub use debug::*;
