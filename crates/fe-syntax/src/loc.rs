use serde::Serialize;
use std::fmt;
use std::ops::Add;
use std::path::Path;

/// Row/column in a source file, both 1-based; pass around by value.
///
/// Row 0 marks an invalid position. Column 0 is used for the line break that
/// ends the previous row.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Pos {
    pub row: u16,
    pub col: u16,
}

impl Pos {
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }

    /// Whole-row position.
    pub const fn at_row(row: u16) -> Self {
        Self { row, col: 0 }
    }

    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.row != 0
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.row, self.col) {
            (0, _) => f.write_str("<unknown position>"),
            (row, 0) => write!(f, "{row}"),
            (row, col) => write!(f, "{row}:{col}"),
        }
    }
}

/// Span in a file from `begin` to `finis`, both inclusive.
///
/// `path` is only borrowed; whoever owns the path must outlive the locations
/// pointing at it. Two locations are equal only if they share the very same
/// path object.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct Loc<'a> {
    pub path: Option<&'a Path>,
    pub begin: Pos,
    /// Last character inside the span, not one past it.
    pub finis: Pos,
}

impl<'a> Loc<'a> {
    pub const fn new(path: Option<&'a Path>, begin: Pos, finis: Pos) -> Self {
        Self { path, begin, finis }
    }

    pub const fn at(path: Option<&'a Path>, pos: Pos) -> Self {
        Self::new(path, pos, pos)
    }

    /// Span without a file.
    pub const fn span(begin: Pos, finis: Pos) -> Self {
        Self::new(None, begin, finis)
    }

    pub const fn anew_begin(&self) -> Self {
        Self::new(self.path, self.begin, self.begin)
    }

    pub const fn anew_finis(&self) -> Self {
        Self::new(self.path, self.finis, self.finis)
    }

    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.begin.is_valid()
    }
}

impl From<Pos> for Loc<'_> {
    fn from(pos: Pos) -> Self {
        Loc::at(None, pos)
    }
}

/// From the start of `self` to the end of `rhs`, in `self`'s file.
impl<'a> Add for Loc<'a> {
    type Output = Loc<'a>;

    fn add(self, rhs: Loc<'a>) -> Loc<'a> {
        Loc::new(self.path, self.begin, rhs.finis)
    }
}

impl PartialEq for Loc<'_> {
    fn eq(&self, other: &Self) -> bool {
        let same_path = match (self.path, other.path) {
            (None, None) => true,
            (Some(a), Some(b)) => std::ptr::eq(a, b),
            _ => false,
        };
        self.begin == other.begin && self.finis == other.finis && same_path
    }
}

impl Eq for Loc<'_> {}

impl fmt::Display for Loc<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return f.write_str("<unknown location>");
        }
        match self.path {
            Some(path) => write!(f, "{}:{}", path.display(), self.begin)?,
            None => write!(f, "<unknown file>:{}", self.begin)?,
        }
        if self.begin != self.finis {
            if self.begin.row != self.finis.row {
                write!(f, "-{}", self.finis)?;
            } else {
                write!(f, "-{}", self.finis.col)?;
            }
        }
        Ok(())
    }
}
