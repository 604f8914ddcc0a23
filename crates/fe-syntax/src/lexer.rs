use std::io::{self, Read};
use std::path::Path;

use tracing::warn;

use crate::loc::{Loc, Pos};
use crate::ring::Ring;
use crate::utf8;

/// What [`Lexer::accept_with`] does with an accepted character.
///
/// `Lower`/`Upper` normalise identifiers for case-insensitive languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Append {
    /// Drop it.
    Off,
    /// Append it to the token text as is.
    #[default]
    On,
    /// Append [`utf8::to_lower`] of it.
    Lower,
    /// Append [`utf8::to_upper`] of it.
    Upper,
}

/// Byte source feeding the decoder. A read error ends the input.
struct Input<R> {
    bytes: io::Bytes<R>,
    offset: u64,
    failed: bool,
}

impl<R: Read> Input<R> {
    fn new(reader: R) -> Self {
        Self {
            bytes: reader.bytes(),
            offset: 0,
            failed: false,
        }
    }

    fn next_char(&mut self) -> Option<char> {
        let start = self.offset;
        let c = utf8::decode(&mut *self)?;
        if c == utf8::NULL && !self.failed {
            warn!(offset = start, "lexer: malformed UTF-8 sequence");
        }
        Some(c)
    }
}

impl<R: Read> Iterator for Input<R> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.failed {
            return None;
        }
        match self.bytes.next()? {
            Ok(b) => {
                self.offset += 1;
                Some(b)
            }
            Err(err) => {
                warn!(offset = self.offset, error = %err, "lexer: read failed, treating as end of input");
                self.failed = true;
                None
            }
        }
    }
}

/// Character-level state shared by every lexer: `K` characters of lookahead,
/// the position of the first of them, and the token being assembled.
///
/// `None` in the lookahead stands for end of input.
///
/// The reader is consumed byte by byte, so pass something buffered.
pub struct Scanner<'a, R: Read, const K: usize> {
    input: Input<R>,
    ahead: Ring<Option<char>, K>,
    /// Location of the token in `text`
    pub loc: Loc<'a>,
    /// Position of `ahead(0)`
    pub peek: Pos,
    pub text: String,
}

impl<'a, R: Read, const K: usize> Scanner<'a, R, K> {
    pub fn new(reader: R, path: Option<&'a Path>) -> Self {
        let mut input = Input::new(reader);
        let mut ahead = Ring::default();
        for i in 0..K {
            ahead[i] = input.next_char();
        }
        let mut scanner = Self {
            input,
            ahead,
            loc: Loc::at(path, Pos::default()),
            peek: Pos::new(1, 1),
            text: String::new(),
        };
        if scanner.ahead(0) == Some(utf8::BOM) {
            scanner.advance();
            scanner.peek = Pos::new(1, 1);
        }
        scanner
    }

    /// Lookahead character `i`; `None` once the input is exhausted.
    #[inline]
    pub fn ahead(&self, i: usize) -> Option<char> {
        self.ahead[i]
    }

    /// Begin a new token at the peek position.
    pub fn start(&mut self) {
        self.loc.begin = self.peek;
        self.text.clear();
    }

    /// Shift one character out of the lookahead and return it.
    ///
    /// The token's `finis` moves to the consumed character. A line break puts
    /// the next character in column 1 of the following row; end of input and a
    /// BOM do not move the peek position.
    pub fn advance(&mut self) -> Option<char> {
        self.loc.finis = self.peek;
        let next = self.input.next_char();
        let res = self.ahead.put(next);
        match *self.ahead.front() {
            Some('\n') => {
                self.peek.row = self.peek.row.saturating_add(1);
                self.peek.col = 0;
            }
            None | Some(utf8::BOM) => {}
            Some(_) => self.peek.col = self.peek.col.saturating_add(1),
        }
        res
    }
}

/// Building blocks of a hand-written lexer.
///
/// Implementors only expose their [`Scanner`]; `next` may be overridden to
/// post-process every character, all `accept*` methods go through it.
///
/// ```
/// use fe_syntax::lexer::{Lexer, Scanner};
/// use fe_syntax::utf8;
///
/// let mut s: Scanner<'_, &[u8], 1> = Scanner::new("ab1 x".as_bytes(), None);
/// s.start();
/// assert!(s.accept_if(utf8::is_alpha));
/// while s.accept_if(utf8::is_alnum) {}
/// assert_eq!(s.text, "ab1");
/// assert_eq!(s.loc.to_string(), "<unknown file>:1:1-3");
/// ```
pub trait Lexer<'a, R: Read, const K: usize> {
    fn scanner(&self) -> &Scanner<'a, R, K>;
    fn scanner_mut(&mut self) -> &mut Scanner<'a, R, K>;

    fn ahead(&self, i: usize) -> Option<char> {
        self.scanner().ahead(i)
    }

    fn start(&mut self) {
        self.scanner_mut().start()
    }

    fn next(&mut self) -> Option<char> {
        self.scanner_mut().advance()
    }

    /// Location of the token assembled so far.
    fn loc(&self) -> Loc<'a> {
        self.scanner().loc
    }

    fn text<'b>(&'b self) -> &'b str
    where
        'a: 'b,
        R: 'b,
    {
        &self.scanner().text
    }

    /// If `pred` holds for the next character, consume it and deal with it
    /// according to `append`.
    fn accept_with(&mut self, pred: impl FnOnce(char) -> bool, append: Append) -> bool {
        match self.ahead(0) {
            Some(c) if pred(c) => {
                if let Some(c) = self.next() {
                    let c = match append {
                        Append::Off => return true,
                        Append::On => c,
                        Append::Lower => utf8::to_lower(c),
                        Append::Upper => utf8::to_upper(c),
                    };
                    self.scanner_mut().text.push(c);
                }
                true
            }
            _ => false,
        }
    }

    fn accept_if(&mut self, pred: impl FnOnce(char) -> bool) -> bool {
        self.accept_with(pred, Append::On)
    }

    fn accept(&mut self, c: char) -> bool {
        self.accept_with(|d| d == c, Append::On)
    }

    /// Consume end of input. Can be accepted any number of times.
    fn accept_eof(&mut self) -> bool {
        if self.ahead(0).is_some() {
            return false;
        }
        self.next();
        true
    }
}

impl<'a, R: Read, const K: usize> Lexer<'a, R, K> for Scanner<'a, R, K> {
    fn scanner(&self) -> &Scanner<'a, R, K> {
        self
    }

    fn scanner_mut(&mut self) -> &mut Scanner<'a, R, K> {
        self
    }
}
