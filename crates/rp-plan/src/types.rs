//! Core type system for the plan model

use serde::{Deserialize, Serialize};

/// Valid bit widths for integer types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IntBitWidth {
    /// 8-bit (TINYINT)
    I8,
    /// 16-bit (SMALLINT)
    I16,
    /// 32-bit (INTEGER)
    I32,
    /// 64-bit (BIGINT)
    I64,
}

impl IntBitWidth {
    const ALL: [IntBitWidth; 4] = [Self::I8, Self::I16, Self::I32, Self::I64];

    /// Presto keyword for an integer of this width
    pub fn keyword(self) -> &'static str {
        match self {
            Self::I8 => "TINYINT",
            Self::I16 => "SMALLINT",
            Self::I32 => "INTEGER",
            Self::I64 => "BIGINT",
        }
    }
}

/// Valid bit widths for floating-point types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FloatBitWidth {
    /// 32-bit (REAL)
    F32,
    /// 64-bit (DOUBLE)
    F64,
}

impl FloatBitWidth {
    /// Presto keyword for a float of this width
    pub fn keyword(self) -> &'static str {
        match self {
            Self::F32 => "REAL",
            Self::F64 => "DOUBLE",
        }
    }
}

/// SQL data types carried by plan row types and expressions.
///
/// Serialized as the Presto type string (`"DECIMAL(10, 2)"`, `"ARRAY(INTEGER)"`)
/// so JSON plans stay readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SqlType {
    /// BOOLEAN
    Boolean,
    /// TINYINT(8), SMALLINT(16), INTEGER(32), BIGINT(64)
    Integer { bits: IntBitWidth },
    /// REAL(32), DOUBLE(64)
    Float { bits: FloatBitWidth },
    /// Exact numeric with optional precision and scale
    Decimal {
        precision: Option<u16>,
        scale: Option<u16>,
    },
    /// VARCHAR with optional max length
    String { max_length: Option<u32> },
    /// CHAR(n)
    Char { length: u32 },
    /// VARBINARY
    Binary,
    /// DATE
    Date,
    /// TIME
    Time,
    /// TIMESTAMP
    Timestamp,
    /// INTERVAL DAY TO SECOND
    Interval,
    /// JSON
    Json,
    /// UUID
    Uuid,
    /// ARRAY(T)
    Array(Box<SqlType>),
    /// ROW(name T, ...)
    Row(Vec<(String, SqlType)>),
    /// MAP(K, V)
    Map {
        key: Box<SqlType>,
        value: Box<SqlType>,
    },
    /// Keyword operand such as a time unit (`YEAR` in EXTRACT)
    Symbol,
    /// Type could not be determined; carries the raw type text
    Unknown(String),
}

impl SqlType {
    /// Shorthand for INTEGER
    pub fn integer() -> Self {
        SqlType::Integer {
            bits: IntBitWidth::I32,
        }
    }

    /// Shorthand for BIGINT
    pub fn bigint() -> Self {
        SqlType::Integer {
            bits: IntBitWidth::I64,
        }
    }

    /// Shorthand for DOUBLE
    pub fn double() -> Self {
        SqlType::Float {
            bits: FloatBitWidth::F64,
        }
    }

    /// Shorthand for unbounded VARCHAR
    pub fn varchar() -> Self {
        SqlType::String { max_length: None }
    }

    /// Shorthand for DECIMAL(p, s)
    pub fn decimal(precision: u16, scale: u16) -> Self {
        SqlType::Decimal {
            precision: Some(precision),
            scale: Some(scale),
        }
    }

    /// Returns true if this is BOOLEAN
    pub fn is_boolean(&self) -> bool {
        matches!(self, SqlType::Boolean)
    }

    /// Returns true if this type is unknown
    pub fn is_unknown(&self) -> bool {
        matches!(self, SqlType::Unknown(_))
    }

    /// Element type of an ARRAY, if this is one
    pub fn element_type(&self) -> Option<&SqlType> {
        match self {
            SqlType::Array(inner) => Some(inner),
            _ => None,
        }
    }

    /// Presto spelling of this type, as used in CAST targets
    pub fn presto_name(&self) -> String {
        match self {
            SqlType::Boolean => "BOOLEAN".into(),
            SqlType::Integer { bits } => bits.keyword().into(),
            SqlType::Float { bits } => bits.keyword().into(),
            SqlType::Decimal {
                precision: Some(p),
                scale: Some(s),
            } => format!("DECIMAL({p}, {s})"),
            SqlType::Decimal {
                precision: Some(p), ..
            } => format!("DECIMAL({p})"),
            SqlType::Decimal { .. } => "DECIMAL".into(),
            SqlType::String {
                max_length: Some(n),
            } => format!("VARCHAR({n})"),
            SqlType::String { .. } => "VARCHAR".into(),
            SqlType::Char { length } => format!("CHAR({length})"),
            SqlType::Binary => "VARBINARY".into(),
            SqlType::Date => "DATE".into(),
            SqlType::Time => "TIME".into(),
            SqlType::Timestamp => "TIMESTAMP".into(),
            SqlType::Interval => "INTERVAL DAY TO SECOND".into(),
            SqlType::Json => "JSON".into(),
            SqlType::Uuid => "UUID".into(),
            SqlType::Array(inner) => format!("ARRAY({})", inner.presto_name()),
            SqlType::Row(fields) => {
                let field_strs: Vec<String> = fields
                    .iter()
                    .map(|(name, ty)| format!("{} {}", name, ty.presto_name()))
                    .collect();
                format!("ROW({})", field_strs.join(", "))
            }
            SqlType::Map { key, value } => {
                format!("MAP({}, {})", key.presto_name(), value.presto_name())
            }
            SqlType::Symbol => "SYMBOL".into(),
            SqlType::Unknown(raw) => raw.clone(),
        }
    }
}

impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.presto_name())
    }
}

impl From<String> for SqlType {
    fn from(s: String) -> Self {
        parse_sql_type(&s)
    }
}

impl From<SqlType> for String {
    fn from(ty: SqlType) -> Self {
        ty.presto_name()
    }
}

/// Parse a Presto type string.
///
/// Takes everything `presto_name` produces plus a few aliases seen in
/// hand-written plans (`INT`, `TEXT`, `INTEGER[]`). Text that is not a
/// known type becomes `SqlType::Unknown` carrying the trimmed original.
pub fn parse_sql_type(s: &str) -> SqlType {
    let text = s.trim();
    parse_type(text).unwrap_or_else(|| SqlType::Unknown(text.to_string()))
}

fn parse_type(text: &str) -> Option<SqlType> {
    if let Some(element) = text.strip_suffix("[]") {
        return Some(SqlType::Array(Box::new(parse_sql_type(element))));
    }
    match split_call(text) {
        Some((base, params)) => parse_parameterized(&base.to_uppercase(), params),
        None => {
            let words: Vec<&str> = text.split_whitespace().collect();
            parse_keyword(&words.join(" ").to_uppercase())
        }
    }
}

fn parse_keyword(keyword: &str) -> Option<SqlType> {
    if let Some(bits) = IntBitWidth::ALL.into_iter().find(|b| b.keyword() == keyword) {
        return Some(SqlType::Integer { bits });
    }
    let ty = match keyword {
        "INT" => SqlType::integer(),
        "REAL" | "FLOAT" => SqlType::Float {
            bits: FloatBitWidth::F32,
        },
        "DOUBLE" | "DOUBLE PRECISION" => SqlType::double(),
        "BOOLEAN" | "BOOL" => SqlType::Boolean,
        "DECIMAL" | "NUMERIC" => SqlType::Decimal {
            precision: None,
            scale: None,
        },
        "VARCHAR" | "TEXT" | "STRING" => SqlType::varchar(),
        "VARBINARY" | "BINARY" => SqlType::Binary,
        "DATE" => SqlType::Date,
        "TIME" => SqlType::Time,
        "TIMESTAMP" => SqlType::Timestamp,
        "INTERVAL DAY TO SECOND" | "INTERVAL" => SqlType::Interval,
        "JSON" => SqlType::Json,
        "UUID" => SqlType::Uuid,
        "SYMBOL" => SqlType::Symbol,
        _ => return None,
    };
    Some(ty)
}

/// `BASE(params)` split at the first parenthesis. The matching close must
/// end the text.
fn split_call(text: &str) -> Option<(&str, &str)> {
    let open = text.find('(')?;
    let params = text[open + 1..].strip_suffix(')')?;
    Some((text[..open].trim(), params))
}

fn parse_parameterized(base: &str, params: &str) -> Option<SqlType> {
    let args: Vec<&str> = split_args(params).into_iter().map(str::trim).collect();
    let ty = match (base, args.as_slice()) {
        ("ARRAY", [element]) => SqlType::Array(Box::new(parse_sql_type(element))),
        ("MAP", [key, value]) => SqlType::Map {
            key: Box::new(parse_sql_type(key)),
            value: Box::new(parse_sql_type(value)),
        },
        ("ROW", fields) => {
            let fields = fields
                .iter()
                .map(|field| {
                    let (name, ty) = field.split_once(char::is_whitespace)?;
                    Some((name.to_string(), parse_sql_type(ty)))
                })
                .collect::<Option<Vec<_>>>()?;
            SqlType::Row(fields)
        }
        ("VARCHAR", [length]) => SqlType::String {
            max_length: Some(length.parse().ok()?),
        },
        ("CHAR", [length]) => SqlType::Char {
            length: length.parse().ok()?,
        },
        ("DECIMAL" | "NUMERIC", [precision]) => SqlType::Decimal {
            precision: Some(precision.parse().ok()?),
            scale: None,
        },
        ("DECIMAL" | "NUMERIC", [precision, scale]) => SqlType::Decimal {
            precision: Some(precision.parse().ok()?),
            scale: Some(scale.parse().ok()?),
        },
        _ => return None,
    };
    Some(ty)
}

/// Split on commas that are not nested inside parentheses
fn split_args(params: &str) -> Vec<&str> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut from = 0;
    for (at, c) in params.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                args.push(&params[from..at]);
                from = at + 1;
            }
            _ => {}
        }
    }
    args.push(&params[from..]);
    args
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
