//! Deterministic alias allocation for one conversion

use std::collections::HashSet;

/// Allocates derived-table aliases (`t0`, `t1`), correlation aliases
/// (`$cor0`), and unnest column names (`col_0`) from monotonic counters.
///
/// Candidates that collide (case-insensitively) with a name reserved up
/// front, such as a scanned table name, are skipped.
#[derive(Debug, Default)]
pub struct AliasAllocator {
    table: usize,
    correlation: usize,
    column: usize,
    reserved: HashSet<String>,
}

impl AliasAllocator {
    /// Create an allocator that never hands out any of `reserved`
    pub fn new<'a>(reserved: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            reserved: reserved.into_iter().map(str::to_lowercase).collect(),
            ..Self::default()
        }
    }

    /// Next derived-table alias
    pub fn next_table(&mut self) -> String {
        Self::next(&self.reserved, &mut self.table, "t")
    }

    /// Next correlation alias
    pub fn next_correlation(&mut self) -> String {
        Self::next(&self.reserved, &mut self.correlation, "$cor")
    }

    /// Next unnest output column name
    pub fn next_column(&mut self) -> String {
        Self::next(&self.reserved, &mut self.column, "col_")
    }

    fn next(reserved: &HashSet<String>, counter: &mut usize, prefix: &str) -> String {
        loop {
            let candidate = format!("{prefix}{counter}");
            *counter += 1;
            if !reserved.contains(&candidate) {
                return candidate;
            }
        }
    }
}
