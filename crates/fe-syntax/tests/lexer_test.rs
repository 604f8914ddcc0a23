use fe_syntax::utf8;
use fe_syntax::{Driver, Lexer, Loc, Parser, ParserState, Pos, Scanner, Sym, Token};
use std::fmt;
use std::io::{self, Read};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Tag {
    #[default]
    Nil,
    Id,
    Lambda,
    Eof,
}

#[derive(Debug, Clone, Copy, Default)]
struct Tok<'s> {
    loc: Loc<'static>,
    tag: Tag,
    sym: Sym<'s>,
}

impl<'s> Token<'static> for Tok<'s> {
    type Tag = Tag;

    fn tag(&self) -> Tag {
        self.tag
    }

    fn loc(&self) -> Loc<'static> {
        self.loc
    }
}

impl fmt::Display for Tok<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag {
            Tag::Id => write!(f, "{}", self.sym),
            Tag::Lambda => f.write_str("λ"),
            Tag::Eof => f.write_str("<end of file>"),
            Tag::Nil => f.write_str("<nil>"),
        }
    }
}

struct IdLexer<'s, R: Read, const K: usize> {
    scanner: Scanner<'static, R, K>,
    driver: &'s Driver<io::Sink>,
}

impl<'s, R: Read, const K: usize> Lexer<'static, R, K> for IdLexer<'s, R, K> {
    fn scanner(&self) -> &Scanner<'static, R, K> {
        &self.scanner
    }

    fn scanner_mut(&mut self) -> &mut Scanner<'static, R, K> {
        &mut self.scanner
    }
}

impl<'s, R: Read, const K: usize> IdLexer<'s, R, K> {
    fn new(driver: &'s Driver<io::Sink>, reader: R) -> Self {
        Self {
            scanner: Scanner::new(reader, None),
            driver,
        }
    }

    fn lex(&mut self) -> Tok<'s> {
        loop {
            self.start();
            let tok = |tag| Some((tag, Sym::EMPTY));

            let found = if self.accept(utf8::NULL) {
                None
            } else if self.accept_eof() {
                tok(Tag::Eof)
            } else if self.accept_if(utf8::is_space) {
                None
            } else if self.accept('λ') {
                tok(Tag::Lambda)
            } else if self.accept_if(|c| c == '_' || utf8::is_alpha(c)) {
                while self.accept_if(|c| c == '_' || c == '.' || utf8::is_alnum(c)) {}
                Some((Tag::Id, self.driver.sym(self.text())))
            } else {
                self.next();
                None
            };

            if let Some((tag, sym)) = found {
                return Tok {
                    loc: self.loc(),
                    tag,
                    sym,
                };
            }
        }
    }
}

fn loc(begin: (u16, u16), finis: (u16, u16)) -> Loc<'static> {
    Loc::span(Pos::new(begin.0, begin.1), Pos::new(finis.0, finis.1))
}

fn check_lexer<const K: usize>() {
    let driver = Driver::with_sink(io::sink());
    let input = " test  abc    def if  \nwhile λ foo   ";
    let mut lexer: IdLexer<'_, &[u8], K> = IdLexer::new(&driver, input.as_bytes());

    let toks: Vec<Tok<'_>> = (0..9).map(|_| lexer.lex()).collect();
    let printed: String = toks.iter().map(ToString::to_string).collect();
    assert_eq!(printed, "testabcdefifwhileλfoo<end of file><end of file>", "K = {K}");

    let expected = [
        loc((1, 2), (1, 5)),
        loc((1, 8), (1, 10)),
        loc((1, 15), (1, 17)),
        loc((1, 19), (1, 20)),
        loc((2, 1), (2, 5)),
        loc((2, 7), (2, 7)),
        loc((2, 9), (2, 11)),
        loc((2, 14), (2, 14)),
        loc((2, 14), (2, 14)),
    ];
    for (i, (tok, want)) in toks.iter().zip(expected).enumerate() {
        assert_eq!(tok.loc(), want, "token {i} with K = {K}");
    }
}

#[test]
fn test_lexer_k1() {
    check_lexer::<1>();
}

#[test]
fn test_lexer_k2() {
    check_lexer::<2>();
}

#[test]
fn test_lexer_k3() {
    check_lexer::<3>();
}

#[test]
fn test_identifiers_are_interned() {
    let driver = Driver::with_sink(io::sink());
    let mut lexer: IdLexer<'_, &[u8], 1> = IdLexer::new(&driver, "some_identifier x some_identifier".as_bytes());
    let a = lexer.lex();
    let b = lexer.lex();
    let c = lexer.lex();
    assert_eq!(a.sym, c.sym);
    assert!(b.sym.is_inline());
    assert_eq!(driver.pool().len(), 1);
}

#[test]
fn test_bom_and_malformed_bytes() {
    let driver = Driver::with_sink(io::sink());
    let mut bytes = "\u{feff}ab".as_bytes().to_vec();
    bytes.push(0xff);
    bytes.extend_from_slice(b" cd");

    let mut lexer: IdLexer<'_, &[u8], 2> = IdLexer::new(&driver, &bytes[..]);
    let ab = lexer.lex();
    let cd = lexer.lex();
    assert_eq!(ab.to_string(), "ab");
    assert_eq!(ab.loc(), loc((1, 1), (1, 2)));
    assert_eq!(cd.to_string(), "cd");
    assert_eq!(cd.loc(), loc((1, 5), (1, 6)));
    assert_eq!(lexer.lex().tag, Tag::Eof);
}

struct Ids<'s> {
    lexer: IdLexer<'s, &'static [u8], 1>,
    state: ParserState<'static, Tok<'s>, 1>,
    missing: Vec<Tag>,
}

impl<'s> Parser<'static, 1> for Ids<'s> {
    type Tok = Tok<'s>;

    fn state(&self) -> &ParserState<'static, Tok<'s>, 1> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ParserState<'static, Tok<'s>, 1> {
        &mut self.state
    }

    fn lex_next(&mut self) -> Tok<'s> {
        self.lexer.lex()
    }

    fn syntax_err(&mut self, expected: Tag, _ctxt: &str) {
        self.missing.push(expected);
    }
}

#[test]
fn test_parser_over_lexer() {
    let driver = Driver::with_sink(io::sink());
    let mut parser = Ids {
        lexer: IdLexer::new(&driver, "λ x y\nz".as_bytes()),
        state: ParserState::default(),
        missing: Vec::new(),
    };
    parser.init(None);

    let track = parser.tracker();
    assert!(parser.accept(Tag::Lambda).is_some());
    let mut names = Vec::new();
    while let Some(tok) = parser.accept(Tag::Id) {
        names.push(tok.sym.to_string());
    }
    assert!(parser.expect(Tag::Lambda, "abstraction").is_none());
    assert_eq!(parser.missing, [Tag::Lambda]);
    assert_eq!(names, ["x", "y", "z"]);
    assert_eq!(track.loc(parser.state()), loc((1, 1), (2, 1)));
    assert_eq!(parser.eat(Tag::Eof).tag, Tag::Eof);
}

#[test]
fn test_locations_serialize() {
    let value = serde_json::to_value(loc((1, 2), (3, 4))).unwrap();
    assert_eq!(value["path"], serde_json::Value::Null);
    assert_eq!(value["begin"]["col"], 2);
    assert_eq!(value["finis"]["row"], 3);
}
