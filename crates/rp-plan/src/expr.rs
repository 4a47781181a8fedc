//! Typed scalar expression tree attached to relational nodes

use crate::types::SqlType;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Identifier of a correlation variable introduced by a Correlate node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(pub String);

impl CorrelationId {
    /// Create a correlation id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralValue {
    /// NULL of the literal's declared type
    Null,
    /// TRUE / FALSE
    Boolean(bool),
    /// Exact integer
    Integer(i64),
    /// Exact decimal, kept as its source text so scale survives (`32.00`)
    Decimal(String),
    /// Approximate numeric
    Double(f64),
    /// Character string
    String(String),
    /// Binary string
    Binary(Vec<u8>),
    /// DATE
    Date(NaiveDate),
    /// TIME
    Time(NaiveTime),
    /// TIMESTAMP
    Timestamp(NaiveDateTime),
    /// ARRAY[...] of literals
    Array(Vec<LiteralValue>),
    /// ROW(...) of literals
    Row(Vec<LiteralValue>),
    /// MAP of key/value literal pairs
    Map(Vec<(LiteralValue, LiteralValue)>),
    /// Keyword operand (time unit, trim flag)
    Symbol(String),
}

impl LiteralValue {
    /// Short name of the value kind, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            LiteralValue::Null => "null",
            LiteralValue::Boolean(_) => "boolean",
            LiteralValue::Integer(_) => "integer",
            LiteralValue::Decimal(_) => "decimal",
            LiteralValue::Double(_) => "double",
            LiteralValue::String(_) => "string",
            LiteralValue::Binary(_) => "binary",
            LiteralValue::Date(_) => "date",
            LiteralValue::Time(_) => "time",
            LiteralValue::Timestamp(_) => "timestamp",
            LiteralValue::Array(_) => "array",
            LiteralValue::Row(_) => "row",
            LiteralValue::Map(_) => "map",
            LiteralValue::Symbol(_) => "symbol",
        }
    }
}

/// Typed scalar expression; every node carries its resolved type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalarExpr {
    /// Literal value
    Literal {
        /// The literal value
        value: LiteralValue,
        /// Declared type of the literal
        #[serde(rename = "type")]
        ty: SqlType,
    },

    /// Reference to a column of the input row, by position
    FieldRef {
        /// Input-relative column index
        index: usize,
        /// Type of the referenced column
        #[serde(rename = "type")]
        ty: SqlType,
    },

    /// Reference to a field of a row produced by an enclosing Correlate
    CorrelVariableRef {
        /// Correlation id introduced by the enclosing Correlate
        correl: CorrelationId,
        /// Field name in the correlated row
        field: String,
        /// Type of the referenced field
        #[serde(rename = "type")]
        ty: SqlType,
    },

    /// Operator or function call
    Call {
        /// Operator identity (function or operator name, e.g. `SUBSTRING`, `+`)
        op: String,
        /// Ordered operands
        operands: Vec<ScalarExpr>,
        /// Return type of the call (the target type for CAST)
        #[serde(rename = "type")]
        ty: SqlType,
    },
}

impl ScalarExpr {
    /// Literal of the given value and type
    pub fn literal(value: LiteralValue, ty: SqlType) -> Self {
        ScalarExpr::Literal { value, ty }
    }

    /// Integer literal
    pub fn int(v: i64) -> Self {
        ScalarExpr::Literal {
            value: LiteralValue::Integer(v),
            ty: SqlType::integer(),
        }
    }

    /// Boolean literal
    pub fn boolean(v: bool) -> Self {
        ScalarExpr::Literal {
            value: LiteralValue::Boolean(v),
            ty: SqlType::Boolean,
        }
    }

    /// String literal
    pub fn string(v: impl Into<String>) -> Self {
        ScalarExpr::Literal {
            value: LiteralValue::String(v.into()),
            ty: SqlType::varchar(),
        }
    }

    /// Decimal literal from its text; scale is taken from the digits after the point
    pub fn decimal(text: impl Into<String>) -> Self {
        let text = text.into();
        let scale = text.split_once('.').map_or(0, |(_, frac)| frac.len()) as u16;
        let digits = text.chars().filter(|c| c.is_ascii_digit()).count() as u16;
        ScalarExpr::Literal {
            value: LiteralValue::Decimal(text),
            ty: SqlType::decimal(digits.max(1), scale),
        }
    }

    /// Input field reference
    pub fn field(index: usize, ty: SqlType) -> Self {
        ScalarExpr::FieldRef { index, ty }
    }

    /// Correlated field reference
    pub fn correl(correl: impl Into<String>, field: impl Into<String>, ty: SqlType) -> Self {
        ScalarExpr::CorrelVariableRef {
            correl: CorrelationId::new(correl),
            field: field.into(),
            ty,
        }
    }

    /// Call with an explicit return type
    pub fn call(op: impl Into<String>, operands: Vec<ScalarExpr>, ty: SqlType) -> Self {
        ScalarExpr::Call {
            op: op.into(),
            operands,
            ty,
        }
    }

    /// Boolean-valued call (comparisons, logical operators, null tests)
    pub fn predicate(op: impl Into<String>, operands: Vec<ScalarExpr>) -> Self {
        Self::call(op, operands, SqlType::Boolean)
    }

    /// Resolved type of this expression
    pub fn ty(&self) -> &SqlType {
        match self {
            ScalarExpr::Literal { ty, .. } => ty,
            ScalarExpr::FieldRef { ty, .. } => ty,
            ScalarExpr::CorrelVariableRef { ty, .. } => ty,
            ScalarExpr::Call { ty, .. } => ty,
        }
    }
}

impl std::fmt::Display for ScalarExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarExpr::Literal { value, .. } => match value {
                LiteralValue::Null => write!(f, "null"),
                LiteralValue::Boolean(b) => write!(f, "{b}"),
                LiteralValue::Integer(i) => write!(f, "{i}"),
                LiteralValue::Decimal(d) => write!(f, "{d}"),
                LiteralValue::Double(d) => write!(f, "{d}E0"),
                LiteralValue::String(s) => write!(f, "'{s}'"),
                LiteralValue::Symbol(s) => write!(f, "{s}"),
                other => write!(f, "<{} literal>", other.kind_name()),
            },
            ScalarExpr::FieldRef { index, .. } => write!(f, "${index}"),
            ScalarExpr::CorrelVariableRef { correl, field, .. } => write!(f, "{correl}.{field}"),
            ScalarExpr::Call { op, operands, .. } => {
                write!(f, "{op}(")?;
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{operand}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_literal_keeps_scale() {
        let lit = ScalarExpr::decimal("32.00");
        assert_eq!(*lit.ty(), SqlType::decimal(4, 2));
        assert_eq!(lit.to_string(), "32.00");
    }

    #[test]
    fn test_display_for_error_messages() {
        let e = ScalarExpr::call(
            "SUBSTRING",
            vec![ScalarExpr::field(0, SqlType::varchar()), ScalarExpr::int(2)],
            SqlType::varchar(),
        );
        assert_eq!(e.to_string(), "SUBSTRING($0, 2)");
    }

    #[test]
    fn test_json_shape() {
        let e = ScalarExpr::field(2, SqlType::integer());
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "field_ref", "index": 2, "type": "INTEGER"})
        );
    }
}
