//! UTF-8 decoding for byte streams and ASCII-only character classes.
//!
//! The classification helpers deliberately only look at ASCII: a lexer built
//! with them behaves the same regardless of locale or Unicode tables.

use std::io::{self, Write};

/// Longest UTF-8 sequence.
pub const MAX: usize = 4;
/// [Byte order mark](https://en.wikipedia.org/wiki/Byte_order_mark#UTF-8)
pub const BOM: char = '\u{feff}';
/// Stands in for a malformed sequence.
pub const NULL: char = '\0';

/// Sequence length announced by a lead byte, 0 if `b` cannot start one.
pub const fn num_bytes(b: u8) -> usize {
    if b & 0b1000_0000 == 0b0000_0000 {
        1
    } else if b & 0b1110_0000 == 0b1100_0000 {
        2
    } else if b & 0b1111_0000 == 0b1110_0000 {
        3
    } else if b & 0b1111_1000 == 0b1111_0000 {
        4
    } else {
        0
    }
}

/// Decode the next character from `bytes`.
///
/// `None` at end of input; [`NULL`] if the sequence is malformed, in which
/// case the offending bytes are consumed.
pub fn decode(bytes: &mut impl Iterator<Item = u8>) -> Option<char> {
    let lead = bytes.next()?;
    let n = num_bytes(lead);
    match n {
        0 => return Some(NULL),
        1 => return Some(char::from(lead)),
        _ => {}
    }

    let mut code = u32::from(lead) & (0b0001_1111 >> (n - 2));
    for _ in 1..n {
        match bytes.next() {
            Some(b) if b & 0b1100_0000 == 0b1000_0000 => code = (code << 6) | u32::from(b & 0b0011_1111),
            _ => return Some(NULL),
        }
    }
    // surrogates and anything beyond U+10FFFF
    Some(char::from_u32(code).unwrap_or(NULL))
}

/// Write `c` as UTF-8.
pub fn encode(out: &mut impl Write, c: char) -> io::Result<()> {
    let mut buf = [0u8; MAX];
    out.write_all(c.encode_utf8(&mut buf).as_bytes())
}

pub fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic()
}

pub fn is_alnum(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

pub fn is_xdigit(c: char) -> bool {
    c.is_ascii_hexdigit()
}

pub fn is_odigit(c: char) -> bool {
    is_range('0', '7')(c)
}

pub fn is_bdigit(c: char) -> bool {
    is_range('0', '1')(c)
}

/// Space, tab, newline, vertical tab, form feed, carriage return.
pub fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r')
}

pub fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t')
}

pub fn is_lower(c: char) -> bool {
    c.is_ascii_lowercase()
}

pub fn is_upper(c: char) -> bool {
    c.is_ascii_uppercase()
}

pub fn is_punct(c: char) -> bool {
    c.is_ascii_punctuation()
}

pub fn is_cntrl(c: char) -> bool {
    c.is_ascii_control()
}

pub fn is_graph(c: char) -> bool {
    c.is_ascii_graphic()
}

pub fn is_print(c: char) -> bool {
    c == ' ' || c.is_ascii_graphic()
}

pub fn is_ascii(c: char) -> bool {
    c.is_ascii()
}

/// ASCII lower case; everything else is returned as is.
pub fn to_lower(c: char) -> char {
    c.to_ascii_lowercase()
}

pub fn to_upper(c: char) -> char {
    c.to_ascii_uppercase()
}

/// Predicate for `begin..=finis`.
pub fn is_range(begin: char, finis: char) -> impl Fn(char) -> bool {
    move |c| (begin..=finis).contains(&c)
}

/// Predicate matching any of `set`.
pub fn any(set: &[char]) -> impl Fn(char) -> bool + '_ {
    move |c| set.contains(&c)
}
