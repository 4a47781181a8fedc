//! Identifier quoting policy for Presto output
//!
//! | Identifier | Rendering |
//! |---|---|
//! | matches `[a-z_][a-z0-9_]*`, not reserved | bare |
//! | upper case, other characters, or reserved | `"quoted"`, case preserved |
//! | allocated alias (`t0`, `$cor0`, `col_0`) | always `"quoted"` |
//! | column of a derived relation | always `"quoted"` |
//! | synthetic select alias (`$f0`, `EXPR$0`) in a projection | upper-cased, `"quoted"` |

use std::collections::HashSet;

/// Presto reserved words, plus keywords the validation grammar treats as
/// reserved in identifier position.
const RESERVED_WORDS: &[&str] = &[
    "ALTER",
    "AND",
    "ARRAY",
    "AS",
    "BETWEEN",
    "BY",
    "CASE",
    "CAST",
    "CONSTRAINT",
    "CREATE",
    "CROSS",
    "CUBE",
    "CURRENT_DATE",
    "CURRENT_TIME",
    "CURRENT_TIMESTAMP",
    "CURRENT_USER",
    "DATE",
    "DEALLOCATE",
    "DELETE",
    "DESCRIBE",
    "DISTINCT",
    "DROP",
    "ELSE",
    "END",
    "ESCAPE",
    "EXCEPT",
    "EXECUTE",
    "EXISTS",
    "EXTRACT",
    "FALSE",
    "FETCH",
    "FOR",
    "FROM",
    "FULL",
    "GROUP",
    "GROUPING",
    "HAVING",
    "IN",
    "INNER",
    "INSERT",
    "INTERSECT",
    "INTERVAL",
    "INTO",
    "IS",
    "JOIN",
    "LATERAL",
    "LEFT",
    "LIKE",
    "LIMIT",
    "LOCALTIME",
    "LOCALTIMESTAMP",
    "MAP",
    "NATURAL",
    "NORMALIZE",
    "NOT",
    "NULL",
    "OFFSET",
    "ON",
    "OR",
    "ORDER",
    "OUTER",
    "PREPARE",
    "RECURSIVE",
    "RIGHT",
    "ROLLUP",
    "ROW",
    "SELECT",
    "TABLE",
    "THEN",
    "TIME",
    "TIMESTAMP",
    "TRUE",
    "UESCAPE",
    "UNION",
    "UNNEST",
    "USING",
    "VALUES",
    "WHEN",
    "WHERE",
    "WITH",
];

/// Single decision point for identifier quoting and casing
#[derive(Debug, Clone)]
pub struct IdentifierPolicy {
    reserved: HashSet<&'static str>,
}

impl Default for IdentifierPolicy {
    fn default() -> Self {
        Self::presto()
    }
}

impl IdentifierPolicy {
    /// Policy for the Presto grammar
    pub fn presto() -> Self {
        Self {
            reserved: RESERVED_WORDS.iter().copied().collect(),
        }
    }

    /// Whether a user-declared name must be quoted
    pub fn needs_quotes(&self, name: &str) -> bool {
        let mut chars = name.chars();
        let Some(first) = chars.next() else {
            return true;
        };
        if !(first.is_ascii_lowercase() || first == '_') {
            return true;
        }
        if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') {
            return true;
        }
        self.reserved.contains(name.to_ascii_uppercase().as_str())
    }

    /// Render a user-declared name, quoting only when needed
    pub fn ident(&self, name: &str) -> String {
        if self.needs_quotes(name) {
            self.quoted(name)
        } else {
            name.to_string()
        }
    }

    /// Render a name always quoted
    pub fn quoted(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Render a possibly qualified table name
    pub fn table(&self, path: &[String]) -> String {
        path.iter()
            .map(|segment| self.ident(segment))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Whether a declared name was generated by the planner rather than a user
    pub fn is_synthetic(name: &str) -> bool {
        name.starts_with('$') || name.starts_with("EXPR$")
    }

    /// Raw alias a projection emits for a declared output name
    pub fn projection_alias(name: &str) -> String {
        if Self::is_synthetic(name) {
            name.to_uppercase()
        } else {
            name.to_string()
        }
    }
}
