//! Parse check for generated SQL

use sqlparser::ast::Statement;
use sqlparser::dialect::{Dialect, GenericDialect};
use sqlparser::parser::Parser;

use crate::error::{ConvertError, ConvertResult};

/// Grammar used to confirm that generated text is a single parseable query
pub trait SqlSyntax: Send + Sync {
    /// sqlparser dialect the check parses with
    fn parser_dialect(&self) -> &dyn Dialect;

    /// Parse text into statements, mapping failures to `InvalidOutput`
    fn parse(&self, sql: &str) -> ConvertResult<Vec<Statement>> {
        Parser::parse_sql(self.parser_dialect(), sql).map_err(|e| {
            let msg = e.to_string();
            let (line, column) = error_location(&msg);
            ConvertError::InvalidOutput {
                message: msg,
                line,
                column,
                sql: sql.to_string(),
            }
        })
    }

    /// Check that `sql` is exactly one query statement
    fn check_query(&self, sql: &str) -> ConvertResult<()> {
        let statements = self.parse(sql)?;
        match statements.as_slice() {
            [Statement::Query(_)] => Ok(()),
            other => Err(ConvertError::InvalidOutput {
                message: format!("expected a single query, found {} statement(s)", other.len()),
                line: 0,
                column: 0,
                sql: sql.to_string(),
            }),
        }
    }

    /// Grammar name used in log lines
    fn name(&self) -> &'static str;
}

/// `(line, column)` of a sqlparser error, or `(0, 0)` when the message
/// carries no "Line: N, Column: M" suffix. `ParserError` has no structured
/// location.
fn error_location(msg: &str) -> (usize, usize) {
    match (number_after(msg, "Line: "), number_after(msg, "Column: ")) {
        (Some(line), Some(column)) => (line, column),
        _ => (0, 0),
    }
}

fn number_after(msg: &str, label: &str) -> Option<usize> {
    let rest = &msg[msg.find(label)? + label.len()..];
    let digits = rest
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, c)| &rest[..i + c.len_utf8()])?;
    digits.parse().ok()
}

/// Presto query grammar.
///
/// sqlparser ships no Presto dialect; the generic dialect accepts the
/// constructs the converter emits (`ARRAY[...]`, `UNNEST ... WITH
/// ORDINALITY`, `LATERAL`, `FETCH NEXT ... ROWS ONLY`).
pub struct PrestoSyntax {
    dialect: GenericDialect,
}

impl PrestoSyntax {
    pub fn new() -> Self {
        Self {
            dialect: GenericDialect {},
        }
    }
}

impl Default for PrestoSyntax {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlSyntax for PrestoSyntax {
    fn parser_dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    fn name(&self) -> &'static str {
        "presto"
    }
}
