use std::alloc::{self, Layout};
use std::mem;
use std::ptr::{self, NonNull};

use tracing::{debug, trace};

use crate::config::ArenaConfig;
use crate::error::MemoryError;
use crate::memory::debug::{MemoryCategory, MEMORY_TRACKER};

/// 1 MiB.
pub const DEFAULT_PAGE_SIZE: usize = 1024 * 1024;
/// Every page is at least this aligned, whatever the triggering request asked for.
pub const DEFAULT_PAGE_ALIGN: usize = 16;

/// One owned, fixed-capacity buffer inside an [`Arena`].
#[derive(Debug)]
pub struct Page {
    start: NonNull<u8>,
    layout: Layout,
}

// SAFETY: a page exclusively owns its buffer and hands out no references itself.
unsafe impl Send for Page {}

impl Page {
    fn new(size: usize, align: usize) -> Result<Self, MemoryError> {
        let layout = Layout::from_size_align(size, align)
            .map_err(|_| MemoryError::CapacityOverflow { size, align })?;
        debug_assert!(layout.size() > 0);
        // SAFETY: layout has a non-zero size.
        let raw = unsafe { alloc::alloc(layout) };
        let start = NonNull::new(raw).ok_or(MemoryError::AllocFailed { size, align })?;
        MEMORY_TRACKER.record_alloc(MemoryCategory::ArenaPages, 1, size);
        Ok(Self { start, layout })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.layout.size()
    }

    #[inline]
    pub fn align(&self) -> usize {
        self.layout.align()
    }

    #[inline]
    pub fn start(&self) -> NonNull<u8> {
        self.start
    }

    /// Does `addr` point into this page (one-past-the-end included)?
    pub fn contains(&self, addr: usize) -> bool {
        let base = self.start.as_ptr().addr();
        addr >= base && addr <= base + self.capacity()
    }
}

impl Drop for Page {
    fn drop(&mut self) {
        // SAFETY: allocated in `Page::new` with exactly this layout.
        unsafe { alloc::dealloc(self.start.as_ptr(), self.layout) };
        MEMORY_TRACKER.record_release(MemoryCategory::ArenaPages, self.layout.size());
    }
}

/// Snapshot of how much an [`Arena`] has committed, see [`Arena::deallocate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaState {
    pages: usize,
    cursor: usize,
}

/// Bump allocator over a growing list of pages.
///
/// Memory is carved out of the last page by advancing a cursor. When a request
/// does not fit, a fresh page of `max(page_size, num_bytes)` bytes is appended
/// and the old remainder is abandoned. Nothing is freed until the arena drops,
/// except for the LIFO escape hatch:
///
/// ```
/// # use fe_core::memory::Arena;
/// let mut arena = Arena::with_page_size(4096);
/// let state = arena.state();
/// let first = arena.allocate(24, 8);
/// assert!(arena.deallocate(state)); // changed our mind
/// assert_eq!(arena.allocate(24, 8), first);
/// ```
///
/// Rolling back is only honoured while no new page was created since the
/// snapshot; otherwise it is a silent no-op and the bytes stay wasted.
#[derive(Debug)]
pub struct Arena {
    pages: Vec<Page>,
    page_size: usize,
    page_align: usize,
    cursor: usize,
    // bytes consumed in every page but the last one
    retired: usize,
    capacity: usize,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            pages: Vec::new(),
            page_size: page_size.max(1),
            page_align: DEFAULT_PAGE_ALIGN,
            cursor: 0,
            retired: 0,
            capacity: 0,
        }
    }

    pub fn from_config(config: &ArenaConfig) -> Self {
        let mut arena = Self::with_page_size(config.page_size);
        if config.page_align.is_power_of_two() {
            arena.page_align = config.page_align;
        }
        arena
    }

    /// Get `num_bytes` of uninitialized memory aligned to `align`.
    ///
    /// # Panics
    /// If `align` is not a power of two. Running out of memory aborts through
    /// [`std::alloc::handle_alloc_error`].
    pub fn allocate(&mut self, num_bytes: usize, align: usize) -> NonNull<u8> {
        match self.try_allocate(num_bytes, align) {
            Ok(ptr) => ptr,
            Err(MemoryError::AllocFailed { size, align }) => {
                // SAFETY: `Page::new` only reports AllocFailed for a layout it already validated.
                alloc::handle_alloc_error(unsafe { Layout::from_size_align_unchecked(size, align) })
            }
            Err(err) => panic!("arena allocation of {num_bytes} bytes failed: {err}"),
        }
    }

    /// Fallible version of [`Arena::allocate`].
    pub fn try_allocate(&mut self, num_bytes: usize, align: usize) -> Result<NonNull<u8>, MemoryError> {
        if !align.is_power_of_two() {
            return Err(MemoryError::InvalidAlignment(align));
        }

        if let Some(page) = self.pages.last() {
            let offset = self.cursor + padding(page.start, self.cursor, align);
            if let Some(end) = offset.checked_add(num_bytes) {
                if end <= page.capacity() {
                    self.cursor = end;
                    // SAFETY: offset <= end <= capacity, so we stay inside (or one past) the page.
                    return Ok(unsafe { page.start.add(offset) });
                }
            }
        }

        self.grow(num_bytes, align)
    }

    fn grow(&mut self, num_bytes: usize, align: usize) -> Result<NonNull<u8>, MemoryError> {
        let size = self.page_size.max(num_bytes).max(1);
        let page_align = align.max(self.page_align);
        let page = Page::new(size, page_align)?;
        debug!(
            page = self.pages.len(),
            size,
            align = page_align,
            abandoned = self.pages.last().map_or(0, |p| p.capacity() - self.cursor),
            "arena: new page"
        );

        let start = page.start;
        self.retired += self.cursor;
        self.capacity += size;
        self.pages.push(page);
        self.cursor = num_bytes;
        Ok(start)
    }

    /// Pad the cursor so the next allocation in the current page starts at an
    /// `align` boundary.
    pub fn align(&mut self, align: usize) -> &mut Self {
        debug_assert!(align.is_power_of_two());
        if let Some(page) = self.pages.last() {
            let padded = self.cursor + padding(page.start, self.cursor, align);
            self.cursor = padded.min(page.capacity());
        }
        self
    }

    /// Room for `count` values of `T`, each slot `max(size_of, align_of)` wide.
    pub fn allocate_array<T>(&mut self, count: usize) -> NonNull<T> {
        let stride = mem::size_of::<T>().max(mem::align_of::<T>());
        let num_bytes = count
            .checked_mul(stride)
            .unwrap_or_else(|| panic!("arena: array of {count} elements overflows usize"));
        self.allocate(num_bytes, mem::align_of::<T>()).cast()
    }

    /// Move `value` into the arena. Its destructor will never run.
    pub fn alloc<T>(&mut self, value: T) -> &mut T {
        let ptr = self.allocate_array::<T>(1);
        // SAFETY: fresh, aligned, exclusively ours until the arena drops.
        unsafe {
            ptr.as_ptr().write(value);
            &mut *ptr.as_ptr()
        }
    }

    pub fn alloc_slice_copy<T: Copy>(&mut self, src: &[T]) -> &mut [T] {
        let dst = self.allocate_array::<T>(src.len());
        // SAFETY: dst has room for src.len() elements and cannot overlap src.
        unsafe {
            ptr::copy_nonoverlapping(src.as_ptr(), dst.as_ptr(), src.len());
            std::slice::from_raw_parts_mut(dst.as_ptr(), src.len())
        }
    }

    pub fn alloc_str(&mut self, s: &str) -> &mut str {
        let bytes = self.alloc_slice_copy(s.as_bytes());
        // SAFETY: copied verbatim from a str.
        unsafe { std::str::from_utf8_unchecked_mut(bytes) }
    }

    /// Record the current fill level.
    #[inline]
    pub fn state(&self) -> ArenaState {
        ArenaState {
            pages: self.pages.len(),
            cursor: self.cursor,
        }
    }

    /// Go back to `state`.
    ///
    /// Only takes effect if no page was created since `state` was taken; then
    /// everything allocated after the snapshot is up for reuse. Otherwise this is
    /// a no-op. Returns whether the cursor moved back.
    ///
    /// Only use this on memory nobody has observed yet, typically right after a
    /// single provisional allocation.
    pub fn deallocate(&mut self, state: ArenaState) -> bool {
        if state.pages != self.pages.len() {
            trace!(
                snapshot_pages = state.pages,
                pages = self.pages.len(),
                "arena: rollback across page boundary ignored"
            );
            return false;
        }
        debug_assert!(state.cursor <= self.cursor, "arena: rollback into the future");
        trace!(from = self.cursor, to = state.cursor, "arena: rollback");
        self.cursor = state.cursor;
        true
    }

    /// Give back the last `num_bytes` of the current page.
    pub fn deallocate_bytes(&mut self, num_bytes: usize) {
        debug_assert!(num_bytes <= self.cursor, "arena: deallocating past the start of the page");
        self.cursor = self.cursor.saturating_sub(num_bytes);
    }

    #[inline]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    #[inline]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Write offset inside the current page.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Bytes handed out so far, alignment padding included.
    #[inline]
    pub fn committed_bytes(&self) -> usize {
        self.retired + self.cursor
    }

    /// Total size of all pages.
    #[inline]
    pub fn capacity_bytes(&self) -> usize {
        self.capacity
    }
}

/// Bytes needed to lift `start + cursor` to a multiple of `align`.
#[inline]
fn padding(start: NonNull<u8>, cursor: usize, align: usize) -> usize {
    start.as_ptr().addr().wrapping_add(cursor).wrapping_neg() & (align - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr<T>(ptr: NonNull<T>) -> usize {
        ptr.as_ptr().addr()
    }

    #[test]
    fn starts_without_pages() {
        let arena = Arena::new();
        assert_eq!(arena.page_count(), 0);
        assert_eq!(arena.committed_bytes(), 0);
        assert_eq!(arena.capacity_bytes(), 0);
    }

    #[test]
    fn every_allocation_is_aligned() {
        let mut arena = Arena::with_page_size(256);
        let requests = [(1, 1), (3, 2), (7, 8), (1, 64), (5, 4), (250, 16), (9, 128), (0, 32), (13, 1)];
        for _ in 0..20 {
            for &(n, a) in &requests {
                let ptr = arena.allocate(n, a);
                assert_eq!(addr(ptr) % a, 0, "allocate({n}, {a})");
                let page = arena.pages().last().unwrap();
                assert!(page.contains(addr(ptr)));
                assert!(page.contains(addr(ptr) + n));
            }
        }
        assert!(arena.page_count() > 1);
    }

    #[test]
    fn large_alignment_on_a_small_aligned_page() {
        let mut arena = Arena::with_page_size(4096);
        arena.allocate(3, 1);
        let ptr = arena.allocate(8, 256);
        assert_eq!(addr(ptr) % 256, 0);
    }

    #[test]
    fn rollback_returns_the_same_address() {
        let mut arena = Arena::with_page_size(1024);
        arena.allocate(10, 1);
        let state = arena.state();
        let first = arena.allocate(32, 8);
        assert!(arena.deallocate(state));
        assert_eq!(arena.state(), state);
        let second = arena.allocate(32, 8);
        assert_eq!(first, second);
    }

    #[test]
    fn rollback_across_pages_is_a_noop() {
        let mut arena = Arena::with_page_size(64);
        arena.allocate(60, 1);
        let state = arena.state();
        arena.allocate(16, 1); // does not fit, forces a second page
        assert_eq!(arena.page_count(), 2);
        let cursor = arena.cursor();

        assert!(!arena.deallocate(state));
        assert_eq!(arena.cursor(), cursor);
        assert_eq!(arena.page_count(), 2);
    }

    #[test]
    fn relative_deallocate_within_page() {
        let mut arena = Arena::with_page_size(128);
        let a = arena.allocate(16, 1);
        arena.deallocate_bytes(16);
        let b = arena.allocate(16, 1);
        assert_eq!(a, b);
    }

    #[test]
    fn oversized_request_gets_its_own_page() {
        let mut arena = Arena::with_page_size(64);
        arena.allocate(8, 8);
        arena.allocate(1000, 8);
        assert_eq!(arena.page_count(), 2);
        assert_eq!(arena.pages()[1].capacity(), 1000);
        assert_eq!(arena.cursor(), 1000);
        arena.allocate(1, 1);
        assert_eq!(arena.page_count(), 3);
        assert_eq!(arena.pages()[2].capacity(), 64);
    }

    #[test]
    fn committed_bytes_include_padding_and_retired_pages() {
        let mut arena = Arena::with_page_size(32);
        arena.allocate(30, 1);
        arena.allocate(10, 1);
        assert_eq!(arena.committed_bytes(), 40);
        assert_eq!(arena.capacity_bytes(), 64);

        let mut arena = Arena::with_page_size(64);
        arena.allocate(1, 1);
        arena.allocate(8, 8);
        assert_eq!(arena.committed_bytes(), 16);
    }

    #[test]
    fn typed_allocations() {
        let mut arena = Arena::with_page_size(512);
        let words = arena.allocate_array::<u64>(4);
        assert_eq!(addr(words) % mem::align_of::<u64>(), 0);
        for i in 0..4 {
            unsafe { words.as_ptr().add(i).write(i as u64 * 3) };
        }

        let answer = arena.alloc(42u32);
        *answer += 1;
        assert_eq!(*answer, 43);

        let slice = arena.alloc_slice_copy(&[1u16, 2, 3]);
        assert_eq!(slice, &[1, 2, 3]);

        let s = arena.alloc_str("hello");
        s.make_ascii_uppercase();
        assert_eq!(s, "HELLO");

        assert_eq!(unsafe { *words.as_ptr().add(3) }, 9);
    }

    #[test]
    fn align_pads_cursor() {
        let mut arena = Arena::with_page_size(128);
        arena.allocate(3, 1);
        arena.align(16);
        let start = addr(arena.pages()[0].start());
        assert_eq!((start + arena.cursor()) % 16, 0);
    }

    #[test]
    fn try_allocate_rejects_bad_alignment() {
        let mut arena = Arena::new();
        assert_eq!(arena.try_allocate(8, 3), Err(MemoryError::InvalidAlignment(3)));
        assert_eq!(arena.page_count(), 0);
    }

    #[test]
    fn try_allocate_reports_overflow() {
        let mut arena = Arena::new();
        let err = arena.try_allocate(usize::MAX - 8, 16).unwrap_err();
        assert!(matches!(err, MemoryError::CapacityOverflow { .. }));
    }

    #[test]
    fn take_leaves_an_empty_arena() {
        let mut arena = Arena::with_page_size(64);
        arena.allocate(8, 8);
        let moved = std::mem::take(&mut arena);
        assert_eq!(moved.page_count(), 1);
        assert_eq!(arena.page_count(), 0);
        assert_eq!(arena.cursor(), 0);
    }

    #[test]
    fn from_config_uses_page_settings() {
        let config = ArenaConfig {
            page_size: 100,
            page_align: 64,
        };
        let mut arena = Arena::from_config(&config);
        arena.allocate(1, 1);
        assert_eq!(arena.pages()[0].capacity(), 100);
        assert_eq!(arena.pages()[0].align(), 64);
    }
}
