use serde::Serialize;
use std::borrow::Borrow;
use std::cell::RefCell;
use std::ffi::CStr;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::ptr::{self, NonNull};

use tracing::trace;

use super::Sym;
use crate::config::PoolConfig;
use crate::memory::compact_map::{fast_set_with_capacity, FastMap, FastSet, GetOrInsert};
use crate::memory::debug::{MemoryCategory, MEMORY_TRACKER};
use crate::memory::Arena;

/// Header of a long string inside the pool's arena; the content bytes and a
/// NUL follow it directly.
///
/// The top bit of `len` is set when the content is not UTF-8. No allocation
/// exceeds `isize::MAX` bytes, so a real length never reaches that bit.
#[repr(C)]
pub(super) struct StrRecord {
    len: usize,
}

impl StrRecord {
    const HEADER: usize = mem::size_of::<StrRecord>();
    /// Word alignment keeps bit 0 of every record address clear for the inline tag.
    const ALIGN: usize = mem::align_of::<usize>();
    const NOT_UTF8: usize = 1 << (usize::BITS - 1);

    #[inline]
    fn size_for(len: usize) -> usize {
        Self::HEADER + len + 1
    }

    /// # Safety
    /// `dst` must be valid for `size_for(bytes.len())` bytes and `ALIGN` aligned.
    unsafe fn write(dst: NonNull<u8>, bytes: &[u8], utf8: bool) -> NonNull<StrRecord> {
        let record = dst.cast::<StrRecord>();
        let flag = if utf8 { 0 } else { Self::NOT_UTF8 };
        record.as_ptr().write(StrRecord { len: bytes.len() | flag });
        let data = dst.as_ptr().add(Self::HEADER);
        ptr::copy_nonoverlapping(bytes.as_ptr(), data, bytes.len());
        data.add(bytes.len()).write(0);
        record
    }

    /// # Safety
    /// `record` must point at a record written by `StrRecord::write` that
    /// outlives `'a`.
    #[inline]
    pub(super) unsafe fn len(record: *const StrRecord) -> usize {
        (*record).len & !Self::NOT_UTF8
    }

    /// # Safety
    /// See [`StrRecord::len`].
    #[inline]
    pub(super) unsafe fn is_utf8(record: *const StrRecord) -> bool {
        (*record).len & Self::NOT_UTF8 == 0
    }

    /// # Safety
    /// See [`StrRecord::len`].
    #[inline]
    pub(super) unsafe fn bytes<'a>(record: *const StrRecord) -> &'a [u8] {
        let data = record.cast::<u8>().add(Self::HEADER);
        std::slice::from_raw_parts(data, Self::len(record))
    }

    /// # Safety
    /// See [`StrRecord::len`].
    #[inline]
    pub(super) unsafe fn bytes_with_nul<'a>(record: *const StrRecord) -> &'a [u8] {
        let data = record.cast::<u8>().add(Self::HEADER);
        std::slice::from_raw_parts(data, Self::len(record) + 1)
    }
}

/// Set element: a record pointer that hashes and compares by content.
#[derive(Clone, Copy)]
struct RecordRef(NonNull<StrRecord>);

impl RecordRef {
    #[inline]
    fn bytes(&self) -> &[u8] {
        // SAFETY: only records living in the owning pool's arena enter the set.
        unsafe { StrRecord::bytes(self.0.as_ptr()) }
    }
}

impl PartialEq for RecordRef {
    fn eq(&self, other: &Self) -> bool {
        self.bytes() == other.bytes()
    }
}

impl Eq for RecordRef {}

impl Hash for RecordRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes().hash(state);
    }
}

// Lets the set be probed with plain `&[u8]` keys.
impl Borrow<[u8]> for RecordRef {
    fn borrow(&self) -> &[u8] {
        self.bytes()
    }
}

struct PoolInner {
    arena: Arena,
    records: FastSet<RecordRef>,
    // sum of `StrRecord::size_for` over `records`, as reported to MEMORY_TRACKER
    record_bytes: usize,
}

impl Drop for PoolInner {
    fn drop(&mut self) {
        MEMORY_TRACKER.record_release(MemoryCategory::SymRecords, self.record_bytes);
    }
}

/// Hash set of long strings; every handle it issues borrows it.
///
/// ```
/// # use fe_core::sym::SymPool;
/// let pool = SymPool::new();
/// let a = pool.sym("long_identifier");
/// let b = pool.sym(String::from("long_identifier"));
/// assert_eq!(a, b);            // one word compare
/// assert_eq!(pool.len(), 1);   // one record
/// assert!(pool.sym("tiny").is_inline());
/// ```
///
/// The pool deliberately is not `Sync`: interning mutates it through a
/// `RefCell`. Use one pool per thread.
pub struct SymPool {
    inner: RefCell<PoolInner>,
}

// SAFETY: records only point into the pool's own arena, which moves with it.
unsafe impl Send for SymPool {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Distinct long strings held
    pub records: usize,
    pub pages: usize,
    pub committed_bytes: usize,
    pub capacity_bytes: usize,
}

impl Default for SymPool {
    fn default() -> Self {
        Self::new()
    }
}

impl SymPool {
    pub fn new() -> Self {
        Self::with_config(&PoolConfig::default())
    }

    pub fn with_config(config: &PoolConfig) -> Self {
        Self {
            inner: RefCell::new(PoolInner {
                arena: Arena::from_config(&config.arena()),
                records: fast_set_with_capacity(config.initial_capacity),
                record_bytes: 0,
            }),
        }
    }

    /// Intern `s`.
    pub fn sym(&self, s: impl AsRef<str>) -> Sym<'_> {
        self.intern(s.as_ref().as_bytes(), true)
    }

    /// Intern raw bytes. Identity is byte equality, whether or not the bytes
    /// are UTF-8; see [`Sym::to_str`].
    pub fn sym_bytes(&self, bytes: &[u8]) -> Sym<'_> {
        self.intern(bytes, std::str::from_utf8(bytes).is_ok())
    }

    fn intern(&self, bytes: &[u8], utf8: bool) -> Sym<'_> {
        if let Some(sym) = Sym::inline_bytes(bytes) {
            trace!(len = bytes.len(), "sym: inline");
            return sym;
        }

        let mut inner = self.inner.borrow_mut();
        let PoolInner {
            arena,
            records,
            record_bytes,
        } = &mut *inner;

        let state = arena.state();
        let size = StrRecord::size_for(bytes.len());
        let raw = arena.allocate(size, StrRecord::ALIGN);
        // SAFETY: `raw` is fresh, `size` bytes long and word aligned.
        let fresh = RecordRef(unsafe { StrRecord::write(raw, bytes, utf8) });

        let kept = records.get_or_insert_copy(fresh);
        if kept.0 == fresh.0 {
            trace!(len = bytes.len(), utf8, "sym: new record");
            *record_bytes += size;
            MEMORY_TRACKER.record_alloc(MemoryCategory::SymRecords, 1, size);
        } else {
            arena.deallocate(state);
        }
        Sym::from_record(kept.0)
    }

    /// Same as [`SymPool::sym`]; the string is copied and dropped.
    pub fn sym_string(&self, s: String) -> Sym<'_> {
        self.sym(s.as_str())
    }

    /// Intern a C string's bytes, without the terminator. `None` and `""`
    /// both give [`Sym::EMPTY`].
    pub fn sym_cstr(&self, s: Option<&CStr>) -> Sym<'_> {
        match s {
            None => Sym::EMPTY,
            Some(c) => self.sym_bytes(c.to_bytes()),
        }
    }

    /// The handle for `s` if it is inline or already interned; never allocates.
    pub fn lookup(&self, s: &str) -> Option<Sym<'_>> {
        self.lookup_bytes(s.as_bytes())
    }

    pub fn lookup_bytes(&self, bytes: &[u8]) -> Option<Sym<'_>> {
        if let Some(sym) = Sym::inline_bytes(bytes) {
            return Some(sym);
        }
        let inner = self.inner.borrow();
        inner.records.get(bytes).map(|record| Sym::from_record(record.0))
    }

    /// Number of long strings held.
    pub fn len(&self) -> usize {
        self.inner.borrow().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> PoolStats {
        let inner = self.inner.borrow();
        PoolStats {
            records: inner.records.len(),
            pages: inner.arena.page_count(),
            committed_bytes: inner.arena.committed_bytes(),
            capacity_bytes: inner.arena.capacity_bytes(),
        }
    }
}

impl fmt::Debug for SymPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats();
        f.debug_struct("SymPool")
            .field("records", &stats.records)
            .field("pages", &stats.pages)
            .field("committed_bytes", &stats.committed_bytes)
            .finish()
    }
}

/// Map keyed by symbols, on the crate's hash backend.
pub type SymMap<'p, V> = FastMap<Sym<'p>, V>;
pub type SymSet<'p> = FastSet<Sym<'p>>;

/// Probe a [`SymMap`] with text instead of a handle.
pub trait SymMapExt<'p, V> {
    fn get_str(&self, pool: &'p SymPool, key: &str) -> Option<&V>;
}

impl<'p, V> SymMapExt<'p, V> for SymMap<'p, V> {
    fn get_str(&self, pool: &'p SymPool, key: &str) -> Option<&V> {
        pool.lookup(key).and_then(|sym| self.get(&sym))
    }
}
