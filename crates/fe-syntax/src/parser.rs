use std::path::Path;

use crate::loc::{Loc, Pos};
use crate::ring::Ring;

/// What a [`Parser`] needs to know about the tokens it shifts.
///
/// `Default` must yield a "no token" value; it fills the lookahead before
/// [`Parser::init`].
pub trait Token<'a>: Clone + Default {
    type Tag: Copy + Eq;

    fn tag(&self) -> Self::Tag;
    fn loc(&self) -> Loc<'a>;
}

/// Lookahead of `K` tokens plus the location of the last one consumed.
#[derive(Debug, Clone)]
pub struct ParserState<'a, T, const K: usize> {
    ahead: Ring<T, K>,
    prev: Loc<'a>,
}

impl<'a, T: Default, const K: usize> Default for ParserState<'a, T, K> {
    fn default() -> Self {
        Self {
            ahead: Ring::default(),
            prev: Loc::default(),
        }
    }
}

impl<'a, T, const K: usize> ParserState<'a, T, K> {
    /// Location of the token shifted last.
    pub fn prev(&self) -> Loc<'a> {
        self.prev
    }
}

/// Remembers where a construct began; see [`Parser::tracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tracker {
    begin: Pos,
}

impl Tracker {
    /// From the tracked start to the end of the token shifted last.
    pub fn loc<'a, T, const K: usize>(&self, state: &ParserState<'a, T, K>) -> Loc<'a> {
        Loc::new(state.prev.path, self.begin, state.prev.finis)
    }
}

/// Skeleton of a recursive descent parser with `K` tokens of lookahead.
///
/// Implementors provide the state, a way to pull the next token from their
/// lexer, and a syntax error hook. `accept` and `expect` signal failure with
/// `None`:
///
/// ```ignore
/// let track = self.tracker();
/// self.expect(Tag::ParenL, "call")?;
/// let args = self.parse_args();
/// self.expect(Tag::ParenR, "call")?;
/// let loc = track.loc(self.state());
/// ```
pub trait Parser<'a, const K: usize> {
    type Tok: Token<'a>;

    fn state(&self) -> &ParserState<'a, Self::Tok, K>;
    fn state_mut(&mut self) -> &mut ParserState<'a, Self::Tok, K>;

    /// Pull the next token from the lexer.
    fn lex_next(&mut self) -> Self::Tok;

    /// Report that `expected` was missing while parsing `ctxt`.
    fn syntax_err(&mut self, expected: <Self::Tok as Token<'a>>::Tag, ctxt: &str);

    /// Fill the lookahead; call once before parsing.
    fn init(&mut self, path: Option<&'a Path>) {
        self.state_mut().ahead.reset();
        for i in 0..K {
            let tok = self.lex_next();
            self.state_mut().ahead[i] = tok;
        }
        self.state_mut().prev = Loc::at(path, Pos::new(1, 1));
    }

    fn ahead<'b>(&'b self, i: usize) -> &'b Self::Tok
    where
        'a: 'b,
    {
        &self.state().ahead[i]
    }

    /// Shift a token.
    fn lex(&mut self) -> Self::Tok {
        let next = self.lex_next();
        let state = self.state_mut();
        let result = state.ahead.put(next);
        state.prev = result.loc();
        result
    }

    /// Shift the next token if it is a `tag`.
    fn accept(&mut self, tag: <Self::Tok as Token<'a>>::Tag) -> Option<Self::Tok> {
        if self.ahead(0).tag() != tag {
            return None;
        }
        Some(self.lex())
    }

    /// Like [`Parser::accept`], but report a syntax error on mismatch.
    fn expect(&mut self, tag: <Self::Tok as Token<'a>>::Tag, ctxt: &str) -> Option<Self::Tok> {
        if self.ahead(0).tag() == tag {
            return Some(self.lex());
        }
        self.syntax_err(tag, ctxt);
        None
    }

    /// Shift the next token, which the caller already knows to be a `tag`.
    fn eat(&mut self, tag: <Self::Tok as Token<'a>>::Tag) -> Self::Tok {
        debug_assert!(self.ahead(0).tag() == tag, "internal parser error");
        self.lex()
    }

    fn tracker(&self) -> Tracker {
        Tracker {
            begin: self.ahead(0).loc().begin,
        }
    }
}
