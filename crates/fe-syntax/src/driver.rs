use colored::Colorize;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::io::{self, IsTerminal, Write};

use fe_core::{PoolConfig, Sym, SymPool};
use tracing::warn;

use crate::loc::Loc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Note,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The state every phase of a front end needs: the symbol pool and the
/// diagnostic sink.
///
/// Everything works through `&self`, so lexers, parsers and semantic passes
/// can share one driver.
///
/// ```
/// use fe_syntax::{Driver, Loc, Pos};
///
/// let driver = Driver::with_sink(Vec::new());
/// let id = driver.sym("main");
/// driver.err(Loc::from(Pos::new(3, 1)), format_args!("`{id}` defined twice"));
/// assert_eq!(driver.num_errors(), 1);
/// let out = String::from_utf8(driver.into_sink()).unwrap();
/// assert_eq!(out, "<unknown file>:3:1: error: `main` defined twice\n");
/// ```
pub struct Driver<W: Write = io::Stderr> {
    pool: SymPool,
    sink: RefCell<W>,
    color: bool,
    num_errors: Cell<u32>,
    num_warnings: Cell<u32>,
}

impl Driver<io::Stderr> {
    /// Diagnostics go to stderr, coloured if it is a terminal.
    pub fn new() -> Self {
        let color = io::stderr().is_terminal();
        let mut driver = Self::with_sink(io::stderr());
        driver.color = color;
        driver
    }
}

impl Default for Driver<io::Stderr> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Driver<W> {
    pub fn with_sink(sink: W) -> Self {
        Self::with_pool_config(&PoolConfig::default(), sink)
    }

    pub fn with_pool_config(config: &PoolConfig, sink: W) -> Self {
        Self {
            pool: SymPool::with_config(config),
            sink: RefCell::new(sink),
            color: false,
            num_errors: Cell::new(0),
            num_warnings: Cell::new(0),
        }
    }

    /// Force ANSI colours on or off.
    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    #[inline]
    pub fn sym(&self, s: &str) -> Sym<'_> {
        self.pool.sym(s)
    }

    pub fn pool(&self) -> &SymPool {
        &self.pool
    }

    pub fn note(&self, loc: Loc<'_>, args: fmt::Arguments<'_>) {
        self.emit(loc, Severity::Note, args);
    }

    pub fn warn(&self, loc: Loc<'_>, args: fmt::Arguments<'_>) {
        self.num_warnings.set(self.num_warnings.get() + 1);
        self.emit(loc, Severity::Warning, args);
    }

    pub fn err(&self, loc: Loc<'_>, args: fmt::Arguments<'_>) {
        self.num_errors.set(self.num_errors.get() + 1);
        self.emit(loc, Severity::Error, args);
    }

    pub fn num_errors(&self) -> u32 {
        self.num_errors.get()
    }

    pub fn num_warnings(&self) -> u32 {
        self.num_warnings.get()
    }

    pub fn into_sink(self) -> W {
        self.sink.into_inner()
    }

    fn emit(&self, loc: Loc<'_>, severity: Severity, args: fmt::Arguments<'_>) {
        let mut sink = self.sink.borrow_mut();
        let res = if self.color {
            let label = match severity {
                Severity::Note => severity.as_str().cyan(),
                Severity::Warning => severity.as_str().yellow(),
                Severity::Error => severity.as_str().red(),
            };
            writeln!(sink, "{}: {}: {}", loc, label.bold(), args)
        } else {
            writeln!(sink, "{loc}: {severity}: {args}")
        };
        if let Err(err) = res {
            warn!(error = %err, "driver: failed to write diagnostic");
        }
    }
}

impl<W: Write> fmt::Debug for Driver<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("pool", &self.pool)
            .field("num_errors", &self.num_errors.get())
            .field("num_warnings", &self.num_warnings.get())
            .finish()
    }
}
