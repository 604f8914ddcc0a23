//! Memory plumbing for hand-written compiler front ends.
//!
//! - [`Arena`]: paged bump allocator with cheap LIFO rollback
//! - [`Sym`] / [`SymPool`]: one-word interned strings, short ones stored inline
//! - [`FeConfig`]: TOML-backed tuning knobs

pub mod config;
pub mod error;
pub mod memory;
pub mod sym;

pub use config::{ArenaConfig, FeConfig, LoggingConfig, PoolConfig};
pub use error::{ConfigError, FeError, MemoryError, Result};
pub use memory::{Arena, ArenaState, MemoryCategory, MEMORY_TRACKER};
pub use sym::{PoolStats, Sym, SymMap, SymMapExt, SymPool, SymSet, INLINE_CAPACITY};
