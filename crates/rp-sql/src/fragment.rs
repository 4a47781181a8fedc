//! Partially built query for one plan subtree
//!
//! A fragment is either a SELECT under construction, with its clauses kept
//! separate so a parent operator can merge into it, or a finished set
//! operation. Alongside the text it records the row shape: for each output
//! column, how a parent refers to that column from the same query scope.

use rp_plan::SetOpKind;

use crate::dialect::precedence;
use crate::ident::IdentifierPolicy;

/// Rendered expression text with its binding strength
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub sql: String,
    pub precedence: u8,
}

impl Rendered {
    pub fn new(sql: impl Into<String>, precedence: u8) -> Self {
        Self {
            sql: sql.into(),
            precedence,
        }
    }

    /// Text that never needs parentheses
    pub fn atom(sql: impl Into<String>) -> Self {
        Self::new(sql, precedence::ATOM)
    }

    /// Text, parenthesized when it binds looser than `min`
    pub fn at_least(&self, min: u8) -> String {
        if self.precedence < min {
            format!("({})", self.sql)
        } else {
            self.sql.clone()
        }
    }

    /// `self AND other`
    pub fn and(self, other: Rendered) -> Rendered {
        Rendered::new(
            format!(
                "{} AND {}",
                self.at_least(precedence::AND),
                other.at_least(precedence::AND)
            ),
            precedence::AND,
        )
    }
}

/// How a parent refers to one output column of a fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnExpr {
    /// Column of a relation in the FROM clause
    Column {
        /// Rendered relation qualifier; None when the column can only be
        /// referenced unqualified
        qualifier: Option<String>,
        name: String,
        /// Always quote (columns of derived relations and allocated names)
        quoted: bool,
    },
    /// Expression text valid in the fragment's SELECT scope. `aggregate`
    /// marks an aggregate call, evaluated once per group.
    Computed {
        rendered: Rendered,
        constant: bool,
        aggregate: bool,
    },
}

impl ColumnExpr {
    pub fn render(&self, policy: &IdentifierPolicy, qualify: bool) -> Rendered {
        match self {
            ColumnExpr::Column {
                qualifier,
                name,
                quoted,
            } => {
                let ident = if *quoted {
                    policy.quoted(name)
                } else {
                    policy.ident(name)
                };
                match qualifier {
                    Some(q) if qualify => Rendered::atom(format!("{q}.{ident}")),
                    _ => Rendered::atom(ident),
                }
            }
            ColumnExpr::Computed { rendered, .. } => rendered.clone(),
        }
    }

    /// Can be substituted into a parent without changing evaluation
    pub fn is_trivial(&self) -> bool {
        match self {
            ColumnExpr::Column { .. } => true,
            ColumnExpr::Computed { constant, .. } => *constant,
        }
    }

    /// A group key, an aggregate call, or a constant
    pub fn is_group_output(&self) -> bool {
        match self {
            ColumnExpr::Column { .. } => true,
            ColumnExpr::Computed {
                constant,
                aggregate,
                ..
            } => *constant || *aggregate,
        }
    }
}

/// One output column: its declared name and how to reference it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBinding {
    pub name: String,
    pub expr: ColumnExpr,
}

impl ColumnBinding {
    pub fn new(name: impl Into<String>, expr: ColumnExpr) -> Self {
        Self {
            name: name.into(),
            expr,
        }
    }
}

/// `expr AS alias` in a select list; the alias is kept raw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectItem {
    pub sql: String,
    pub alias: String,
}

/// Clauses of a SELECT under construction
#[derive(Debug, Clone, Default)]
pub struct SelectParts {
    /// None renders as `*` or as the row shape
    pub select: Option<Vec<SelectItem>>,
    pub from: String,
    /// Complete join clauses, in order
    pub joins: Vec<String>,
    pub where_clause: Option<Rendered>,
    /// Some(empty) marks a whole-relation aggregate
    pub group_by: Option<Vec<String>>,
    pub having: Option<Rendered>,
    pub order_by: Vec<String>,
    pub offset: Option<u64>,
    pub fetch: Option<u64>,
}

impl SelectParts {
    pub fn has_ordering(&self) -> bool {
        !self.order_by.is_empty() || self.offset.is_some() || self.fetch.is_some()
    }

    pub fn is_aggregate(&self) -> bool {
        self.group_by.is_some()
    }

    /// Only FROM and joins are populated
    pub fn is_plain(&self) -> bool {
        self.select.is_none()
            && self.where_clause.is_none()
            && self.group_by.is_none()
            && self.having.is_none()
            && !self.has_ordering()
    }
}

#[derive(Debug, Clone)]
pub enum FragmentBody {
    Select(SelectParts),
    SetOp {
        sql: String,
        op: SetOpKind,
        /// Column names the first branch exposes
        exposed: Vec<String>,
    },
}

/// Where a plain fragment's single relation came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Unaliased table reference; `qualifier` is its rendered last segment
    Table { sql: String, qualifier: String },
    Unnest,
    /// Any already-aliased relation
    Aliased,
    /// Join or set operation
    Compound,
}

#[derive(Debug, Clone)]
pub struct SqlFragment {
    pub body: FragmentBody,
    pub columns: Vec<ColumnBinding>,
    pub source: Source,
}

impl SqlFragment {
    /// Fragment reading a single relation
    pub fn relation(from: String, columns: Vec<ColumnBinding>, source: Source) -> Self {
        Self {
            body: FragmentBody::Select(SelectParts {
                from,
                ..SelectParts::default()
            }),
            columns,
            source,
        }
    }

    /// Finished set operation
    pub fn set_op(sql: String, op: SetOpKind, exposed: Vec<String>) -> Self {
        let columns = exposed
            .iter()
            .map(|name| {
                ColumnBinding::new(
                    name.clone(),
                    ColumnExpr::Column {
                        qualifier: None,
                        name: name.clone(),
                        quoted: true,
                    },
                )
            })
            .collect();
        Self {
            body: FragmentBody::SetOp { sql, op, exposed },
            columns,
            source: Source::Compound,
        }
    }

    pub fn parts(&self) -> Option<&SelectParts> {
        match &self.body {
            FragmentBody::Select(parts) => Some(parts),
            FragmentBody::SetOp { .. } => None,
        }
    }

    pub fn parts_mut(&mut self) -> Option<&mut SelectParts> {
        match &mut self.body {
            FragmentBody::Select(parts) => Some(parts),
            FragmentBody::SetOp { .. } => None,
        }
    }

    /// Qualified column references are needed once joins are present
    pub fn qualify(&self) -> bool {
        self.parts().is_some_and(|p| !p.joins.is_empty())
    }

    pub fn has_ordering(&self) -> bool {
        self.parts().is_some_and(SelectParts::has_ordering)
    }

    /// Every output column can be substituted into a parent clause
    pub fn is_trivial(&self) -> bool {
        self.columns.iter().all(|c| c.expr.is_trivial())
    }

    /// Every output column reads a group key, an aggregate call, or a
    /// constant; none repeats a row-level computation when substituted
    pub fn is_group_output(&self) -> bool {
        self.columns.iter().all(|c| c.expr.is_group_output())
    }

    /// FROM plus joins only; more joins can be appended
    pub fn is_join_base(&self) -> bool {
        self.parts().is_some_and(SelectParts::is_plain)
    }

    /// A lone relation with no clauses
    pub fn is_single_relation(&self) -> bool {
        self.parts()
            .is_some_and(|p| p.is_plain() && p.joins.is_empty())
    }

    pub fn render_column(&self, index: usize, policy: &IdentifierPolicy) -> Option<Rendered> {
        self.columns
            .get(index)
            .map(|c| c.expr.render(policy, self.qualify()))
    }

    /// Column names this fragment exposes when used as a derived table
    pub fn exposed_names(&self) -> Vec<String> {
        match &self.body {
            FragmentBody::SetOp { exposed, .. } => exposed.clone(),
            FragmentBody::Select(SelectParts {
                select: Some(items),
                ..
            }) => items.iter().map(|i| i.alias.clone()).collect(),
            FragmentBody::Select(_) => self.columns.iter().map(|c| c.name.clone()).collect(),
        }
    }

    fn star_covers_columns(&self, parts: &SelectParts) -> bool {
        parts.joins.is_empty()
            && self.columns.iter().all(|c| {
                matches!(&c.expr, ColumnExpr::Column { name, .. } if *name == c.name)
            })
    }

    /// Render the complete query text
    pub fn to_sql(&self, policy: &IdentifierPolicy) -> String {
        let parts = match &self.body {
            FragmentBody::SetOp { sql, .. } => return sql.clone(),
            FragmentBody::Select(parts) => parts,
        };

        let select_list = match &parts.select {
            Some(items) => items
                .iter()
                .map(|item| format!("{} AS {}", item.sql, policy.ident(&item.alias)))
                .collect::<Vec<_>>()
                .join(", "),
            None if self.star_covers_columns(parts) => "*".to_string(),
            None => {
                let qualify = !parts.joins.is_empty();
                self.columns
                    .iter()
                    .map(|c| {
                        format!(
                            "{} AS {}",
                            c.expr.render(policy, qualify).sql,
                            policy.ident(&c.name)
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        };

        let mut lines = vec![format!("SELECT {select_list}"), format!("FROM {}", parts.from)];
        lines.extend(parts.joins.iter().cloned());
        if let Some(predicate) = &parts.where_clause {
            lines.push(format!("WHERE {}", predicate.sql));
        }
        if let Some(keys) = parts.group_by.as_ref().filter(|k| !k.is_empty()) {
            lines.push(format!("GROUP BY {}", keys.join(", ")));
        }
        if let Some(predicate) = &parts.having {
            lines.push(format!("HAVING {}", predicate.sql));
        }
        if !parts.order_by.is_empty() {
            lines.push(format!("ORDER BY {}", parts.order_by.join(", ")));
        }
        if let Some(offset) = parts.offset {
            lines.push(format!("OFFSET {offset} ROWS"));
        }
        if let Some(fetch) = parts.fetch {
            lines.push(format!("FETCH NEXT {fetch} ROWS ONLY"));
        }
        lines.join("\n")
    }

    /// Turn this fragment into `(<query>) AS <alias>` read by a fresh,
    /// plain fragment. `alias` is already rendered.
    pub fn into_derived(self, alias: &str, policy: &IdentifierPolicy) -> SqlFragment {
        let exposed = self.exposed_names();
        let from = format!("({}) AS {alias}", self.to_sql(policy));
        let columns = self
            .columns
            .into_iter()
            .zip(exposed)
            .map(|(binding, name)| {
                ColumnBinding::new(
                    binding.name,
                    ColumnExpr::Column {
                        qualifier: Some(alias.to_string()),
                        name,
                        quoted: true,
                    },
                )
            })
            .collect();
        SqlFragment::relation(from, columns, Source::Aliased)
    }
}

#[cfg(test)]
#[path = "fragment_test.rs"]
mod tests;
