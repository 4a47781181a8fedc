//! Relational operators: the nodes of the plan tree

use crate::expr::{CorrelationId, LiteralValue, ScalarExpr};
use crate::row_type::{RowField, RowType};
use crate::types::SqlType;
use serde::{Deserialize, Serialize};

/// Join type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinType {
    /// Inner join
    Inner,
    /// Left outer join
    Left,
    /// Right outer join
    Right,
    /// Full outer join
    Full,
    /// Cross join (cartesian product)
    Cross,
}

impl std::fmt::Display for JoinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinType::Inner => write!(f, "INNER"),
            JoinType::Left => write!(f, "LEFT"),
            JoinType::Right => write!(f, "RIGHT"),
            JoinType::Full => write!(f, "FULL"),
            JoinType::Cross => write!(f, "CROSS"),
        }
    }
}

/// Set operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetOpKind {
    /// UNION
    Union,
    /// INTERSECT
    Intersect,
    /// EXCEPT
    Except,
}

impl std::fmt::Display for SetOpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetOpKind::Union => write!(f, "UNION"),
            SetOpKind::Intersect => write!(f, "INTERSECT"),
            SetOpKind::Except => write!(f, "EXCEPT"),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// ASC
    #[default]
    Asc,
    /// DESC
    Desc,
}

/// Explicit null placement for a sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullOrdering {
    /// NULLS FIRST
    First,
    /// NULLS LAST
    Last,
}

/// Sort key for ORDER BY
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// Input column to sort by
    pub index: usize,
    /// Ascending or descending
    #[serde(default)]
    pub direction: Direction,
    /// Explicit null placement; dialect default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nulls: Option<NullOrdering>,
}

impl SortKey {
    /// Ascending key
    pub fn asc(index: usize) -> Self {
        Self {
            index,
            direction: Direction::Asc,
            nulls: None,
        }
    }

    /// Descending key
    pub fn desc(index: usize) -> Self {
        Self {
            index,
            direction: Direction::Desc,
            nulls: None,
        }
    }
}

/// One projected expression and its output name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectItem {
    /// Projected expression over the input row
    pub expr: ScalarExpr,
    /// Declared output name
    pub name: String,
}

/// An aggregate function call of an Aggregate node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateCall {
    /// Aggregate function name (`SUM`, `MIN`, `COUNT`, ...)
    pub function: String,
    /// Input column indices passed as operands; empty for `COUNT(*)`
    #[serde(default)]
    pub operands: Vec<usize>,
    /// DISTINCT aggregate
    #[serde(default)]
    pub distinct: bool,
    /// Declared output name
    pub name: String,
    /// Result type
    #[serde(rename = "type")]
    pub ty: SqlType,
}

impl AggregateCall {
    /// Non-distinct aggregate call
    pub fn new(
        function: impl Into<String>,
        operands: Vec<usize>,
        name: impl Into<String>,
        ty: SqlType,
    ) -> Self {
        Self {
            function: function.into(),
            operands,
            distinct: false,
            name: name.into(),
            ty,
        }
    }
}

/// Relational operator, one node of the plan tree.
///
/// Each variant carries a `row_type` that describes its output columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RelNode {
    /// Table scan
    TableScan {
        /// Qualified table name, one entry per path segment
        table: Vec<String>,
        /// The table's declared columns
        row_type: RowType,
    },

    /// Column projection (SELECT list)
    Project {
        /// Input relation
        input: Box<RelNode>,
        /// Projected expressions with output names
        items: Vec<ProjectItem>,
        /// Output row type
        row_type: RowType,
    },

    /// Row filter (WHERE / HAVING)
    Filter {
        /// Input relation
        input: Box<RelNode>,
        /// Boolean predicate over the input row
        condition: ScalarExpr,
        /// Output row type (same as input)
        row_type: RowType,
    },

    /// Grouping with aggregate calls
    Aggregate {
        /// Input relation
        input: Box<RelNode>,
        /// Input column indices to group by; empty for a whole-relation aggregate
        group_keys: Vec<usize>,
        /// Aggregate calls, output after the group keys
        calls: Vec<AggregateCall>,
        /// Output row type
        row_type: RowType,
    },

    /// Join of two relations
    Join {
        /// Left input
        left: Box<RelNode>,
        /// Right input
        right: Box<RelNode>,
        /// Join type
        join_type: JoinType,
        /// Join condition over the concatenated row; None means TRUE
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<ScalarExpr>,
        /// Output row type
        row_type: RowType,
    },

    /// Correlated join: the right input may reference the left row
    /// through `correlation`
    Correlate {
        /// Left (producing) input
        left: Box<RelNode>,
        /// Right input, evaluated per left row
        right: Box<RelNode>,
        /// Correlation id visible to the right input only
        correlation: CorrelationId,
        /// Inner or Left
        join_type: JoinType,
        /// Output row type
        row_type: RowType,
    },

    /// Ordering with optional OFFSET / FETCH
    Sort {
        /// Input relation
        input: Box<RelNode>,
        /// Sort keys; may be empty when only offset/fetch apply
        #[serde(default)]
        keys: Vec<SortKey>,
        /// Rows to skip
        #[serde(default, skip_serializing_if = "Option::is_none")]
        offset: Option<u64>,
        /// Maximum rows to return
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fetch: Option<u64>,
        /// Output row type (same as input)
        row_type: RowType,
    },

    /// UNION / INTERSECT / EXCEPT over two or more inputs
    SetOp {
        /// Operator kind
        op: SetOpKind,
        /// Keep duplicates (UNION ALL etc.)
        #[serde(default)]
        all: bool,
        /// Inputs with identical row shape
        inputs: Vec<RelNode>,
        /// Output row type
        row_type: RowType,
    },

    /// Expansion of array/map values into rows
    Unnest {
        /// Array or map valued expressions
        exprs: Vec<ScalarExpr>,
        /// Append a 1-based ordinality column
        #[serde(default)]
        with_ordinality: bool,
        /// Output row type
        row_type: RowType,
    },

    /// Inline rows
    Values {
        /// Literal tuples, each as wide as the row type
        tuples: Vec<Vec<LiteralValue>>,
        /// Output row type
        row_type: RowType,
    },
}

impl RelNode {
    /// Output row type of this operator
    pub fn row_type(&self) -> &RowType {
        match self {
            RelNode::TableScan { row_type, .. } => row_type,
            RelNode::Project { row_type, .. } => row_type,
            RelNode::Filter { row_type, .. } => row_type,
            RelNode::Aggregate { row_type, .. } => row_type,
            RelNode::Join { row_type, .. } => row_type,
            RelNode::Correlate { row_type, .. } => row_type,
            RelNode::Sort { row_type, .. } => row_type,
            RelNode::SetOp { row_type, .. } => row_type,
            RelNode::Unnest { row_type, .. } => row_type,
            RelNode::Values { row_type, .. } => row_type,
        }
    }

    /// Operator kind name for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            RelNode::TableScan { .. } => "TableScan",
            RelNode::Project { .. } => "Project",
            RelNode::Filter { .. } => "Filter",
            RelNode::Aggregate { .. } => "Aggregate",
            RelNode::Join { .. } => "Join",
            RelNode::Correlate { .. } => "Correlate",
            RelNode::Sort { .. } => "Sort",
            RelNode::SetOp { .. } => "SetOp",
            RelNode::Unnest { .. } => "Unnest",
            RelNode::Values { .. } => "Values",
        }
    }

    /// Child nodes in order
    pub fn inputs(&self) -> Vec<&RelNode> {
        match self {
            RelNode::TableScan { .. } | RelNode::Unnest { .. } | RelNode::Values { .. } => {
                Vec::new()
            }
            RelNode::Project { input, .. }
            | RelNode::Filter { input, .. }
            | RelNode::Aggregate { input, .. }
            | RelNode::Sort { input, .. } => vec![input.as_ref()],
            RelNode::Join { left, right, .. } | RelNode::Correlate { left, right, .. } => {
                vec![left.as_ref(), right.as_ref()]
            }
            RelNode::SetOp { inputs, .. } => inputs.iter().collect(),
        }
    }

    /// Height of the tree rooted here (a leaf has depth 1). Walks with an
    /// explicit stack, so arbitrarily deep plans can be measured.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((node, level)) = pending.pop() {
            deepest = deepest.max(level);
            pending.extend(node.inputs().into_iter().map(|input| (input, level + 1)));
        }
        deepest
    }

    /// Last path segment of every table scanned below this node, in
    /// pre-order. Walks with an explicit stack like `depth`.
    pub fn scanned_tables(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            if let RelNode::TableScan { table, .. } = node {
                if let Some(last) = table.last() {
                    out.push(last.as_str());
                }
            }
            pending.extend(node.inputs().into_iter().rev());
        }
        out
    }

    // ── builders ─────────────────────────────────────────────────────

    /// Scan of a (possibly qualified, dot-separated) table
    pub fn scan(table: &str, row_type: RowType) -> Self {
        RelNode::TableScan {
            table: table.split('.').map(str::to_string).collect(),
            row_type,
        }
    }

    /// Projection; the row type is derived from the item names and types
    pub fn project<S: Into<String>>(
        input: RelNode,
        items: impl IntoIterator<Item = (ScalarExpr, S)>,
    ) -> Self {
        let items: Vec<ProjectItem> = items
            .into_iter()
            .map(|(expr, name)| ProjectItem {
                expr,
                name: name.into(),
            })
            .collect();
        let row_type = RowType::new(
            items
                .iter()
                .map(|item| RowField::new(item.name.clone(), item.expr.ty().clone()))
                .collect(),
        );
        RelNode::Project {
            input: Box::new(input),
            items,
            row_type,
        }
    }

    /// Filter; keeps the input row type
    pub fn filter(input: RelNode, condition: ScalarExpr) -> Self {
        let row_type = input.row_type().clone();
        RelNode::Filter {
            input: Box::new(input),
            condition,
            row_type,
        }
    }

    /// Aggregate; the row type is the group keys followed by the calls
    pub fn aggregate(input: RelNode, group_keys: Vec<usize>, calls: Vec<AggregateCall>) -> Self {
        let input_row = input.row_type();
        let mut fields: Vec<RowField> = group_keys
            .iter()
            .filter_map(|&k| input_row.field(k).cloned())
            .collect();
        fields.extend(
            calls
                .iter()
                .map(|call| RowField::new(call.name.clone(), call.ty.clone())),
        );
        RelNode::Aggregate {
            input: Box::new(input),
            group_keys,
            calls,
            row_type: RowType::new(fields),
        }
    }

    /// Join; the row type concatenates both sides, renaming collisions
    pub fn join(
        left: RelNode,
        right: RelNode,
        join_type: JoinType,
        condition: Option<ScalarExpr>,
    ) -> Self {
        let row_type = RowType::join_of(left.row_type(), right.row_type());
        RelNode::Join {
            left: Box::new(left),
            right: Box::new(right),
            join_type,
            condition,
            row_type,
        }
    }

    /// Correlate; the row type concatenates both sides, renaming collisions
    pub fn correlate(
        left: RelNode,
        right: RelNode,
        correlation: impl Into<String>,
        join_type: JoinType,
    ) -> Self {
        let row_type = RowType::join_of(left.row_type(), right.row_type());
        RelNode::Correlate {
            left: Box::new(left),
            right: Box::new(right),
            correlation: CorrelationId::new(correlation),
            join_type,
            row_type,
        }
    }

    /// Sort with optional offset/fetch; keeps the input row type
    pub fn sort(
        input: RelNode,
        keys: Vec<SortKey>,
        offset: Option<u64>,
        fetch: Option<u64>,
    ) -> Self {
        let row_type = input.row_type().clone();
        RelNode::Sort {
            input: Box::new(input),
            keys,
            offset,
            fetch,
            row_type,
        }
    }

    /// Set operation; the row type is taken from the first input
    pub fn set_op(op: SetOpKind, all: bool, inputs: Vec<RelNode>) -> Self {
        let row_type = inputs
            .first()
            .map(|first| first.row_type().clone())
            .unwrap_or_default();
        RelNode::SetOp {
            op,
            all,
            inputs,
            row_type,
        }
    }

    /// Unnest with an explicit output row type
    pub fn unnest(exprs: Vec<ScalarExpr>, with_ordinality: bool, row_type: RowType) -> Self {
        RelNode::Unnest {
            exprs,
            with_ordinality,
            row_type,
        }
    }

    /// Inline values
    pub fn values(tuples: Vec<Vec<LiteralValue>>, row_type: RowType) -> Self {
        RelNode::Values { tuples, row_type }
    }
}

#[cfg(test)]
#[path = "rel_test.rs"]
mod tests;
