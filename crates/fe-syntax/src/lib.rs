//! Reusable pieces of a hand-written compiler front end: source locations,
//! a UTF-8 lexer skeleton, a recursive descent parser skeleton and a driver
//! for diagnostics, all on top of `fe-core`'s symbol pool.

pub mod driver;
pub mod fmt;
pub mod lexer;
pub mod loc;
pub mod parser;
pub mod ring;
pub mod utf8;

pub use driver::{Driver, Severity};
pub use fmt::Tab;
pub use lexer::{Append, Lexer, Scanner};
pub use loc::{Loc, Pos};
pub use parser::{Parser, ParserState, Token, Tracker};
pub use ring::Ring;

pub use fe_core::{Sym, SymPool};
