use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Categories for attributing memory usage and allocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryCategory {
    /// Raw page buffers owned by an [`Arena`](super::Arena).
    ArenaPages,
    /// Long-string records committed by a [`SymPool`](crate::sym::SymPool).
    SymRecords,
    Other,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
    /// Allocations made so far; never decreases.
    pub items: u64,
    /// Bytes currently live.
    pub bytes: u64,
    /// Highest `bytes` seen.
    pub peak_bytes: u64,
}

/// Process-wide counters. Only touched on page creation/drop and on novel
/// symbol records, never on the bump fast path. Every update takes the lock
/// once.
#[derive(Debug, Default)]
pub struct MemoryTracker {
    inner: Mutex<HashMap<MemoryCategory, CategoryStats>>,
}

impl MemoryTracker {
    /// Account for `items` new allocations totalling `bytes`.
    pub fn record_alloc(&self, category: MemoryCategory, items: u64, bytes: usize) {
        let mut counters = self.inner.lock();
        let stats = counters.entry(category).or_default();
        stats.items = stats.items.saturating_add(items);
        stats.bytes = stats.bytes.saturating_add(bytes as u64);
        stats.peak_bytes = stats.peak_bytes.max(stats.bytes);
    }

    /// Give back `bytes` earlier reported through [`MemoryTracker::record_alloc`].
    pub fn record_release(&self, category: MemoryCategory, bytes: usize) {
        if bytes == 0 {
            return;
        }
        let mut counters = self.inner.lock();
        let stats = counters.entry(category).or_default();
        stats.bytes = stats.bytes.saturating_sub(bytes as u64);
    }

    pub fn get(&self, category: MemoryCategory) -> CategoryStats {
        self.inner.lock().get(&category).copied().unwrap_or_default()
    }

    pub fn snapshot(&self) -> HashMap<MemoryCategory, CategoryStats> {
        self.inner.lock().clone()
    }
}

pub static MEMORY_TRACKER: Lazy<MemoryTracker> = Lazy::new(MemoryTracker::default);
