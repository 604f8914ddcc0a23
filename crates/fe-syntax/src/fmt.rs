use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Indentation level for pretty printers. Displays as `tab` repeated `level`
/// times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tab<'t> {
    tab: &'t str,
    level: usize,
}

impl Default for Tab<'_> {
    fn default() -> Self {
        Self::new("\t", 0)
    }
}

impl<'t> Tab<'t> {
    pub const fn new(tab: &'t str, level: usize) -> Self {
        Self { tab, level }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn tab(&self) -> &'t str {
        self.tab
    }

    pub fn set_level(&mut self, level: usize) -> &mut Self {
        self.level = level;
        self
    }

    pub fn set_tab(&mut self, tab: &'t str) -> &mut Self {
        self.tab = tab;
        self
    }

    pub fn indent(&mut self) -> &mut Self {
        self.level += 1;
        self
    }

    pub fn dedent(&mut self) -> &mut Self {
        debug_assert!(self.level > 0, "dedent below level 0");
        self.level = self.level.saturating_sub(1);
        self
    }
}

impl<'t> Add<usize> for Tab<'t> {
    type Output = Tab<'t>;

    fn add(self, n: usize) -> Tab<'t> {
        Tab::new(self.tab, self.level + n)
    }
}

impl<'t> Sub<usize> for Tab<'t> {
    type Output = Tab<'t>;

    fn sub(self, n: usize) -> Tab<'t> {
        debug_assert!(self.level >= n, "dedent below level 0");
        Tab::new(self.tab, self.level.saturating_sub(n))
    }
}

impl AddAssign<usize> for Tab<'_> {
    fn add_assign(&mut self, n: usize) {
        self.level += n;
    }
}

impl SubAssign<usize> for Tab<'_> {
    fn sub_assign(&mut self, n: usize) {
        debug_assert!(self.level >= n, "dedent below level 0");
        self.level = self.level.saturating_sub(n);
    }
}

impl fmt::Display for Tab<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.level {
            f.write_str(self.tab)?;
        }
        Ok(())
    }
}
