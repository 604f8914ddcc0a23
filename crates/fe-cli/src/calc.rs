//! Lexer for a small expression language:
//!
//! ```text
//! let twice = λ x (x + x);
//! return twice 21;
//! ```

use serde::Serialize;
use std::fmt;
use std::io::{Read, Write};
use std::path::Path;

use fe_core::memory::compact_map::fast_map_with_capacity;
use fe_core::{Sym, SymMap};
use fe_syntax::utf8;
use fe_syntax::{Driver, Lexer, Loc, Scanner, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    #[default]
    Nil,
    // keywords
    Let,
    Return,
    // misc
    Id,
    Lit,
    // delimiters and terminals
    ParenL,
    ParenR,
    Semicolon,
    Lambda,
    Eof,
    // operators
    Add,
    Sub,
    Mul,
    Div,
    Assign,
}

impl Tag {
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Nil => "<nil>",
            Tag::Let => "let",
            Tag::Return => "return",
            Tag::Id => "<identifier>",
            Tag::Lit => "<literal>",
            Tag::ParenL => "(",
            Tag::ParenR => ")",
            Tag::Semicolon => ";",
            Tag::Lambda => "λ",
            Tag::Eof => "<end of file>",
            Tag::Add => "+",
            Tag::Sub => "-",
            Tag::Mul => "*",
            Tag::Div => "/",
            Tag::Assign => "=",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Tok<'a, 's> {
    pub loc: Loc<'a>,
    pub tag: Tag,
    /// Identifier name, if `tag` is `Id`
    pub sym: Sym<'s>,
    /// Value, if `tag` is `Lit`
    pub lit: u64,
}

impl<'a, 's> Tok<'a, 's> {
    fn new(loc: Loc<'a>, tag: Tag) -> Self {
        Self {
            loc,
            tag,
            ..Self::default()
        }
    }
}

impl<'a> Token<'a> for Tok<'a, '_> {
    type Tag = Tag;

    fn tag(&self) -> Tag {
        self.tag
    }

    fn loc(&self) -> Loc<'a> {
        self.loc
    }
}

impl fmt::Display for Tok<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag {
            Tag::Id => write!(f, "{}", self.sym),
            Tag::Lit => write!(f, "{}", self.lit),
            tag => f.write_str(tag.as_str()),
        }
    }
}

/// One line of `fe lex --format json`.
#[derive(Debug, Serialize)]
pub struct TokenRecord {
    pub loc: String,
    pub tag: Tag,
    pub text: String,
}

impl From<&Tok<'_, '_>> for TokenRecord {
    fn from(tok: &Tok<'_, '_>) -> Self {
        Self {
            loc: tok.loc.to_string(),
            tag: tok.tag,
            text: tok.to_string(),
        }
    }
}

pub struct CalcLexer<'a, 's, R: Read, W: Write> {
    scanner: Scanner<'a, R, 1>,
    driver: &'s Driver<W>,
    keywords: SymMap<'s, Tag>,
}

impl<'a, 's, R: Read, W: Write> Lexer<'a, R, 1> for CalcLexer<'a, 's, R, W> {
    fn scanner(&self) -> &Scanner<'a, R, 1> {
        &self.scanner
    }

    fn scanner_mut(&mut self) -> &mut Scanner<'a, R, 1> {
        &mut self.scanner
    }
}

impl<'a, 's, R: Read, W: Write> CalcLexer<'a, 's, R, W> {
    pub fn new(driver: &'s Driver<W>, reader: R, path: Option<&'a Path>) -> Self {
        let mut keywords = fast_map_with_capacity(2);
        keywords.insert(driver.sym("let"), Tag::Let);
        keywords.insert(driver.sym("return"), Tag::Return);
        Self {
            scanner: Scanner::new(reader, path),
            driver,
            keywords,
        }
    }

    pub fn lex(&mut self) -> Tok<'a, 's> {
        loop {
            self.start();

            if self.accept(utf8::NULL) {
                self.driver.err(self.loc(), format_args!("invalid UTF-8 sequence"));
                continue;
            }
            if self.accept_eof() {
                return Tok::new(self.loc(), Tag::Eof);
            }
            if self.accept_if(utf8::is_space) {
                continue;
            }

            for (c, tag) in [
                ('(', Tag::ParenL),
                (')', Tag::ParenR),
                ('+', Tag::Add),
                ('-', Tag::Sub),
                ('*', Tag::Mul),
                ('/', Tag::Div),
                ('=', Tag::Assign),
                (';', Tag::Semicolon),
                ('λ', Tag::Lambda),
            ] {
                if self.accept(c) {
                    return Tok::new(self.loc(), tag);
                }
            }

            if self.accept_if(|c| c == '_' || utf8::is_alpha(c)) {
                while self.accept_if(|c| c == '_' || c == '.' || utf8::is_alnum(c)) {}
                let sym = self.driver.sym(self.text());
                let tag = self.keywords.get(&sym).copied().unwrap_or(Tag::Id);
                return Tok {
                    sym,
                    ..Tok::new(self.loc(), tag)
                };
            }

            if self.accept_if(utf8::is_digit) {
                while self.accept_if(utf8::is_digit) {}
                let lit = self.text().parse().unwrap_or_else(|_| {
                    self.driver
                        .err(self.loc(), format_args!("literal `{}` does not fit in 64 bits", self.text()));
                    u64::MAX
                });
                return Tok {
                    lit,
                    ..Tok::new(self.loc(), Tag::Lit)
                };
            }

            if let Some(c) = self.next() {
                self.driver
                    .err(self.loc(), format_args!("invalid input character: '{}'", c.escape_debug()));
            }
        }
    }
}

/// Lex everything up to and including end of file.
pub fn tokenize<'a, 's, R: Read, W: Write>(
    driver: &'s Driver<W>,
    reader: R,
    path: Option<&'a Path>,
) -> Vec<Tok<'a, 's>> {
    let mut lexer = CalcLexer::new(driver, reader, path);
    let mut toks = Vec::new();
    loop {
        let tok = lexer.lex();
        toks.push(tok);
        if tok.tag == Tag::Eof {
            return toks;
        }
    }
}
