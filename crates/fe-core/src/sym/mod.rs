//! Interned strings.
//!
//! A [`Sym`] is one machine word. Short strings live inside the word itself,
//! longer ones in a [`SymPool`] that guarantees one record per distinct content.
//! Either way, equal content means equal bits, so `==` and hashing never look
//! at the characters.

mod pool;
pub mod repr;

pub use pool::{PoolStats, SymMap, SymMapExt, SymPool, SymSet};
pub use repr::INLINE_CAPACITY;

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::ffi::CStr;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::Index;
use std::ptr::{self, NonNull};

use pool::StrRecord;
use repr::{Endian, Kind};

/// Handle to an interned string; pass it around by value.
///
/// The empty string is the all-zero word and needs no pool, as do strings of
/// up to [`INLINE_CAPACITY`] bytes. Longer strings point into the `SymPool`
/// that issued them, which is what `'p` borrows.
///
/// `Eq` and `Hash` work on the raw word. Ordering compares content. Comparing
/// handles from two different pools is meaningless.
#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct Sym<'p> {
    bits: usize,
    _pool: PhantomData<&'p SymPool>,
}

impl<'p> Sym<'p> {
    pub const EMPTY: Self = Self::from_bits(0);

    #[inline]
    const fn from_bits(bits: usize) -> Self {
        Self {
            bits,
            _pool: PhantomData,
        }
    }

    /// Build a handle without any pool if `s` is short enough.
    #[inline]
    pub fn inline(s: &str) -> Option<Self> {
        Self::inline_bytes(s.as_bytes())
    }

    #[inline]
    pub fn inline_bytes(bytes: &[u8]) -> Option<Self> {
        repr::fits_inline(bytes.len()).then(|| Self::from_bits(repr::pack(bytes, Endian::NATIVE)))
    }

    #[inline]
    fn from_record(record: NonNull<StrRecord>) -> Self {
        Self::from_bits(record.as_ptr().expose_provenance())
    }

    #[inline]
    fn record(&self) -> *const StrRecord {
        debug_assert_eq!(repr::kind(self.bits), Kind::Boxed);
        ptr::with_exposed_provenance(self.bits)
    }

    /// The raw word.
    #[inline]
    pub fn to_bits(self) -> usize {
        self.bits
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    #[inline]
    pub fn is_inline(&self) -> bool {
        repr::kind(self.bits) == Kind::Inline
    }

    #[inline]
    pub fn is_boxed(&self) -> bool {
        repr::kind(self.bits) == Kind::Boxed
    }

    pub fn len(&self) -> usize {
        match repr::kind(self.bits) {
            Kind::Empty => 0,
            Kind::Inline => repr::inline_len(self.bits),
            // SAFETY: boxed handles point at a live record of the pool `'p` borrows.
            Kind::Boxed => unsafe { StrRecord::len(self.record()) },
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match repr::kind(self.bits) {
            Kind::Empty => &[],
            // SAFETY: the content sits inside `self.bits`, see `repr`.
            Kind::Inline => unsafe { self.inline_slice(repr::inline_len(self.bits)) },
            // SAFETY: boxed handles point at a live record of the pool `'p` borrows.
            Kind::Boxed => unsafe { StrRecord::bytes(self.record()) },
        }
    }

    /// # Safety
    /// `self` must be inline and `n <= WORD - content_offset`.
    #[inline]
    unsafe fn inline_slice(&self, n: usize) -> &[u8] {
        let base = ptr::from_ref(&self.bits).cast::<u8>();
        std::slice::from_raw_parts(base.add(Endian::NATIVE.content_offset()), n)
    }

    /// The content as text, or `None` if it was interned from bytes that are
    /// not UTF-8.
    pub fn to_str(&self) -> Option<&str> {
        match repr::kind(self.bits) {
            Kind::Empty => Some(""),
            // at most INLINE_CAPACITY bytes to check
            Kind::Inline => std::str::from_utf8(self.as_bytes()).ok(),
            Kind::Boxed => {
                let record = self.record();
                // SAFETY: boxed handles point at a live record of the pool `'p` borrows,
                // and the record's flag says whether its bytes were valid UTF-8.
                unsafe {
                    StrRecord::is_utf8(record).then(|| std::str::from_utf8_unchecked(StrRecord::bytes(record)))
                }
            }
        }
    }

    #[inline]
    pub fn is_utf8(&self) -> bool {
        self.to_str().is_some()
    }

    /// O(1) view of the content.
    ///
    /// A handle built from non-UTF-8 bytes views only its leading valid part;
    /// use [`Sym::as_bytes`] for the exact content.
    #[inline]
    pub fn as_str(&self) -> &str {
        match self.to_str() {
            Some(s) => s,
            None => self.as_bytes().utf8_chunks().next().map_or("", |chunk| chunk.valid()),
        }
    }

    #[inline]
    pub fn view(&self) -> &str {
        self.as_str()
    }

    /// Content as a C string. Both representations keep a NUL after the
    /// content; a NUL inside the content ends the C string early.
    pub fn as_c_str(&self) -> &CStr {
        let with_nul = match repr::kind(self.bits) {
            Kind::Empty => return c"",
            // SAFETY: inline content is followed by at least one zero byte within the word.
            Kind::Inline => unsafe { self.inline_slice(repr::inline_len(self.bits) + 1) },
            // SAFETY: boxed handles point at a live record of the pool `'p` borrows.
            Kind::Boxed => unsafe { StrRecord::bytes_with_nul(self.record()) },
        };
        CStr::from_bytes_until_nul(with_nul).unwrap_or(c"")
    }

    pub fn chars(&self) -> std::str::Chars<'_> {
        self.as_str().chars()
    }

    pub fn bytes(&self) -> std::iter::Copied<std::slice::Iter<'_, u8>> {
        self.as_bytes().iter().copied()
    }

    pub fn front(&self) -> Option<char> {
        self.chars().next()
    }

    pub fn back(&self) -> Option<char> {
        self.chars().next_back()
    }

    /// Compare against a single character by looking at the first one only.
    ///
    /// Empty sorts before everything. A one-character symbol equal to `c`
    /// compares equal, a longer one starting with `c` compares greater.
    pub fn cmp_char(&self, c: char) -> Ordering {
        let mut chars = self.chars();
        match chars.next() {
            None => Ordering::Less,
            Some(first) => match first.cmp(&c) {
                Ordering::Equal if chars.next().is_some() => Ordering::Greater,
                ord => ord,
            },
        }
    }
}

impl Default for Sym<'_> {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl PartialEq for Sym<'_> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl Eq for Sym<'_> {}

impl Hash for Sym<'_> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.bits);
    }
}

impl PartialOrd for Sym<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Sym<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.bits == other.bits {
            return Ordering::Equal;
        }
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl PartialEq<char> for Sym<'_> {
    fn eq(&self, c: &char) -> bool {
        self.cmp_char(*c) == Ordering::Equal
    }
}

impl PartialOrd<char> for Sym<'_> {
    fn partial_cmp(&self, c: &char) -> Option<Ordering> {
        Some(self.cmp_char(*c))
    }
}

impl PartialEq<str> for Sym<'_> {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for Sym<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Index<usize> for Sym<'_> {
    type Output = u8;

    fn index(&self, i: usize) -> &u8 {
        &self.as_bytes()[i]
    }
}

impl AsRef<str> for Sym<'_> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Invalid UTF-8 prints as U+FFFD.
impl fmt::Display for Sym<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_str() {
            Some(s) => f.write_str(s),
            None => f.write_str(&String::from_utf8_lossy(self.as_bytes())),
        }
    }
}

impl fmt::Debug for Sym<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_str() {
            Some(s) => f.debug_tuple("Sym").field(&s).finish(),
            None => write!(f, "Sym(b\"{}\")", self.as_bytes().escape_ascii()),
        }
    }
}

/// Text content serializes as a string, anything else as bytes.
impl Serialize for Sym<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.to_str() {
            Some(s) => serializer.serialize_str(s),
            None => serializer.serialize_bytes(self.as_bytes()),
        }
    }
}
