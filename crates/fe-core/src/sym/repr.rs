//! Bit layout of a [`Sym`](super::Sym) word.
//!
//! ```text
//!   empty   0x0000_0000_0000_0000
//!   boxed   address of a StrRecord, word aligned, so bit 0 == 0
//!   inline  low-order byte = (len << 1) | 1, content in the following bytes
//!
//!   inline, little endian (memory order):
//!   ┌─────┬────┬────┬────┬────┬────┬────┬────┐
//!   │ tag │ c0 │ c1 │ .. │ cN │ 00 │ 00 │ 00 │
//!   └─────┴────┴────┴────┴────┴────┴────┴────┘
//!   inline, big endian (memory order):
//!   ┌────┬────┬────┬────┬────┬────┬────┬─────┐
//!   │ c0 │ c1 │ .. │ cN │ 00 │ 00 │ 00 │ tag │
//!   └────┴────┴────┴────┴────┴────┴────┴─────┘
//! ```
//!
//! In both byte orders the tag lives in the numerically lowest byte and the
//! content is contiguous in memory, so a view can point straight into the word.
//! At most `WORD - 2` content bytes fit; the byte after the content is always
//! zero and doubles as NUL terminator.

use std::mem;

pub const WORD: usize = mem::size_of::<usize>();

/// Longest string stored inside the handle itself.
pub const INLINE_CAPACITY: usize = WORD - 2;

const TAG_MASK: usize = 0xff;
const INLINE_BIT: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    pub const NATIVE: Endian = if cfg!(target_endian = "little") {
        Endian::Little
    } else {
        Endian::Big
    };

    /// Index of the first content byte in the word's memory image.
    #[inline]
    pub const fn content_offset(self) -> usize {
        match self {
            Endian::Little => 1,
            Endian::Big => 0,
        }
    }

    #[inline]
    pub const fn tag_offset(self) -> usize {
        match self {
            Endian::Little => 0,
            Endian::Big => WORD - 1,
        }
    }

    #[inline]
    fn from_image(self, image: [u8; WORD]) -> usize {
        match self {
            Endian::Little => usize::from_le_bytes(image),
            Endian::Big => usize::from_be_bytes(image),
        }
    }

    #[inline]
    fn to_image(self, word: usize) -> [u8; WORD] {
        match self {
            Endian::Little => word.to_le_bytes(),
            Endian::Big => word.to_be_bytes(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Empty,
    Inline,
    Boxed,
}

#[inline]
pub const fn kind(word: usize) -> Kind {
    if word == 0 {
        Kind::Empty
    } else if word & INLINE_BIT != 0 {
        Kind::Inline
    } else {
        Kind::Boxed
    }
}

/// Length stored in an inline word's tag.
#[inline]
pub const fn inline_len(word: usize) -> usize {
    (word & TAG_MASK) >> 1
}

#[inline]
pub const fn fits_inline(len: usize) -> bool {
    len <= INLINE_CAPACITY
}

/// Pack `bytes` into a word laid out for `endian`.
///
/// An empty slice packs to `0`. Panics if `bytes` does not fit.
pub fn pack(bytes: &[u8], endian: Endian) -> usize {
    assert!(fits_inline(bytes.len()), "{} bytes do not fit inline", bytes.len());
    if bytes.is_empty() {
        return 0;
    }
    let mut image = [0u8; WORD];
    image[endian.tag_offset()] = ((bytes.len() << 1) | INLINE_BIT) as u8;
    let off = endian.content_offset();
    image[off..off + bytes.len()].copy_from_slice(bytes);
    endian.from_image(image)
}

/// Content of an inline word laid out for `endian`.
pub fn unpack(word: usize, endian: Endian) -> Vec<u8> {
    debug_assert_eq!(kind(word), Kind::Inline);
    let image = endian.to_image(word);
    let off = endian.content_offset();
    image[off..off + inline_len(word)].to_vec()
}
