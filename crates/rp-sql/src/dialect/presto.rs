//! Presto operator table

use std::sync::OnceLock;

use super::operators::precedence::*;
use super::operators::{Arity, OperatorTable, Piece, RenderRule, Template};

use Piece::{Arg, Text};

/// Evaluate a rule at compile time so its slices are `'static`
macro_rules! rule {
    ($rule:expr) => {{
        const RULE: RenderRule = $rule;
        RULE
    }};
}

/// Left-associative binary operator
macro_rules! infix {
    ($op:literal, $prec:expr) => {
        rule!(RenderRule::Template(Template {
            pieces: &[Arg(0, $prec), Text($op), Arg(1, $prec + 1)],
            precedence: $prec,
        }))
    };
}

/// Non-associative comparison
macro_rules! comparison {
    ($op:literal) => {
        rule!(RenderRule::Template(Template {
            pieces: &[Arg(0, COMPARISON + 1), Text($op), Arg(1, COMPARISON + 1)],
            precedence: COMPARISON,
        }))
    };
}

/// Postfix test such as `IS NULL`
macro_rules! postfix {
    ($op:literal) => {
        rule!(RenderRule::Template(Template {
            pieces: &[Arg(0, COMPARISON + 1), Text($op)],
            precedence: COMPARISON,
        }))
    };
}

const RANDOM: Template = Template {
    pieces: &[Text("RANDOM()")],
    precedence: ATOM,
};

const RANDOM_BOUND_FIRST: Template = Template {
    pieces: &[Text("RANDOM("), Arg(0, 0), Text(")")],
    precedence: ATOM,
};

const RANDOM_BOUND_SECOND: Template = Template {
    pieces: &[Text("RANDOM("), Arg(1, 0), Text(")")],
    precedence: ATOM,
};

const TRUNCATE_WHOLE: Template = Template {
    pieces: &[Text("TRUNCATE("), Arg(0, 0), Text(")")],
    precedence: ATOM,
};

// TRUNCATE(x, n) has no Presto counterpart; shift, truncate, shift back.
const TRUNCATE_TO_SCALE: Template = Template {
    pieces: &[
        Text("TRUNCATE("),
        Arg(0, MULTIPLICATIVE),
        Text(" * POWER(10, "),
        Arg(1, 0),
        Text(")) / POWER(10, "),
        Arg(1, 0),
        Text(")"),
    ],
    precedence: MULTIPLICATIVE,
};

const LIKE: Template = Template {
    pieces: &[Arg(0, CONCAT), Text(" LIKE "), Arg(1, CONCAT)],
    precedence: COMPARISON,
};

const LIKE_ESCAPE: Template = Template {
    pieces: &[
        Arg(0, CONCAT),
        Text(" LIKE "),
        Arg(1, CONCAT),
        Text(" ESCAPE "),
        Arg(2, CONCAT),
    ],
    precedence: COMPARISON,
};

const NOT_LIKE: Template = Template {
    pieces: &[Arg(0, CONCAT), Text(" NOT LIKE "), Arg(1, CONCAT)],
    precedence: COMPARISON,
};

const NOT_LIKE_ESCAPE: Template = Template {
    pieces: &[
        Arg(0, CONCAT),
        Text(" NOT LIKE "),
        Arg(1, CONCAT),
        Text(" ESCAPE "),
        Arg(2, CONCAT),
    ],
    precedence: COMPARISON,
};

/// Functions whose name and argument order are identical in Presto
const PASS_THROUGH: &[&str] = &[
    // scalar
    "ABS",
    "ACOS",
    "ASIN",
    "ATAN",
    "ATAN2",
    "CARDINALITY",
    "CBRT",
    "CEIL",
    "COALESCE",
    "CONCAT",
    "CONTAINS",
    "COS",
    "DATE_ADD",
    "DATE_DIFF",
    "DATE_FORMAT",
    "DATE_TRUNC",
    "DAY",
    "DEGREES",
    "ELEMENT_AT",
    "EXP",
    "FLOOR",
    "FROM_UNIXTIME",
    "GREATEST",
    "HOUR",
    "IF",
    "JSON_EXTRACT",
    "JSON_EXTRACT_SCALAR",
    "LEAST",
    "LENGTH",
    "LN",
    "LOG10",
    "LOG2",
    "LOWER",
    "LPAD",
    "LTRIM",
    "MINUTE",
    "MOD",
    "MONTH",
    "NULLIF",
    "POWER",
    "RADIANS",
    "REGEXP_EXTRACT",
    "REGEXP_LIKE",
    "REGEXP_REPLACE",
    "REPLACE",
    "REVERSE",
    "ROUND",
    "RPAD",
    "RTRIM",
    "SECOND",
    "SIGN",
    "SIN",
    "SPLIT",
    "SQRT",
    "STRPOS",
    "TAN",
    "TO_UNIXTIME",
    "TRIM",
    "UPPER",
    "YEAR",
    // aggregate
    "APPROX_DISTINCT",
    "ARBITRARY",
    "ARRAY_AGG",
    "AVG",
    "BOOL_AND",
    "BOOL_OR",
    "COUNT",
    "COUNT_IF",
    "MAX",
    "MIN",
    "STDDEV",
    "STDDEV_POP",
    "STDDEV_SAMP",
    "SUM",
    "VAR_POP",
    "VAR_SAMP",
    "VARIANCE",
];

/// The shared, read-only Presto operator table
pub fn presto_operators() -> &'static OperatorTable {
    static TABLE: OnceLock<OperatorTable> = OnceLock::new();
    TABLE.get_or_init(build)
}

fn build() -> OperatorTable {
    OperatorTable::new()
        // arithmetic
        .with("+", Arity::Exact(2), infix!(" + ", ADDITIVE))
        .with("-", Arity::Exact(2), infix!(" - ", ADDITIVE))
        .with(
            "-",
            Arity::Exact(1),
            rule!(RenderRule::Template(Template {
                pieces: &[Text("-"), Arg(0, ATOM)],
                precedence: UNARY,
            })),
        )
        .with("*", Arity::Exact(2), infix!(" * ", MULTIPLICATIVE))
        .with("/", Arity::Exact(2), infix!(" / ", MULTIPLICATIVE))
        .with("%", Arity::Exact(2), infix!(" % ", MULTIPLICATIVE))
        .with("||", Arity::Exact(2), infix!(" || ", CONCAT))
        // comparison
        .with("=", Arity::Exact(2), comparison!(" = "))
        .with("<>", Arity::Exact(2), comparison!(" <> "))
        .with("!=", Arity::Exact(2), comparison!(" <> "))
        .with("<", Arity::Exact(2), comparison!(" < "))
        .with("<=", Arity::Exact(2), comparison!(" <= "))
        .with(">", Arity::Exact(2), comparison!(" > "))
        .with(">=", Arity::Exact(2), comparison!(" >= "))
        .with("IS DISTINCT FROM", Arity::Exact(2), comparison!(" IS DISTINCT FROM "))
        .with(
            "IS NOT DISTINCT FROM",
            Arity::Exact(2),
            comparison!(" IS NOT DISTINCT FROM "),
        )
        .with(
            "BETWEEN",
            Arity::Exact(3),
            rule!(RenderRule::Template(Template {
                pieces: &[
                    Arg(0, COMPARISON + 1),
                    Text(" BETWEEN "),
                    Arg(1, COMPARISON + 1),
                    Text(" AND "),
                    Arg(2, COMPARISON + 1),
                ],
                precedence: COMPARISON,
            })),
        )
        .with(
            "LIKE",
            Arity::Range(2, 3),
            rule!(RenderRule::ArityDispatch(&[(2, LIKE), (3, LIKE_ESCAPE)])),
        )
        .with(
            "NOT LIKE",
            Arity::Range(2, 3),
            rule!(RenderRule::ArityDispatch(&[(2, NOT_LIKE), (3, NOT_LIKE_ESCAPE)])),
        )
        .with("IS NULL", Arity::Exact(1), postfix!(" IS NULL"))
        .with("IS NOT NULL", Arity::Exact(1), postfix!(" IS NOT NULL"))
        .with("IS TRUE", Arity::Exact(1), postfix!(" IS TRUE"))
        .with("IS NOT TRUE", Arity::Exact(1), postfix!(" IS NOT TRUE"))
        .with("IS FALSE", Arity::Exact(1), postfix!(" IS FALSE"))
        .with("IS NOT FALSE", Arity::Exact(1), postfix!(" IS NOT FALSE"))
        // logical
        .with(
            "AND",
            Arity::AtLeast(2),
            RenderRule::VariadicInfix {
                keyword: "AND",
                precedence: AND,
            },
        )
        .with(
            "OR",
            Arity::AtLeast(2),
            RenderRule::VariadicInfix {
                keyword: "OR",
                precedence: OR,
            },
        )
        .with(
            "NOT",
            Arity::Exact(1),
            rule!(RenderRule::Template(Template {
                pieces: &[Text("NOT "), Arg(0, NOT)],
                precedence: NOT,
            })),
        )
        // special forms
        .with("CAST", Arity::Exact(1), RenderRule::Cast)
        .with("CASE", Arity::AtLeast(2), RenderRule::Case)
        .with(
            "ARRAY",
            Arity::AtLeast(0),
            RenderRule::Bracketed { prefix: "ARRAY" },
        )
        .with(
            "ARRAY_VALUE_CONSTRUCTOR",
            Arity::AtLeast(0),
            RenderRule::Bracketed { prefix: "ARRAY" },
        )
        .with("MAP", Arity::AtLeast(0), RenderRule::MapConstructor)
        .with(
            "MAP_VALUE_CONSTRUCTOR",
            Arity::AtLeast(0),
            RenderRule::MapConstructor,
        )
        .with("ROW", Arity::AtLeast(1), RenderRule::Rename("ROW"))
        .with(
            "ITEM",
            Arity::Exact(2),
            rule!(RenderRule::Template(Template {
                pieces: &[Arg(0, ATOM), Text("["), Arg(1, 0), Text("]")],
                precedence: ATOM,
            })),
        )
        .with(
            "EXTRACT",
            Arity::Exact(2),
            rule!(RenderRule::Template(Template {
                pieces: &[Text("EXTRACT("), Arg(0, 0), Text(" FROM "), Arg(1, 0), Text(")")],
                precedence: ATOM,
            })),
        )
        .with(
            "CURRENT_DATE",
            Arity::Exact(0),
            rule!(RenderRule::Template(Template {
                pieces: &[Text("CURRENT_DATE")],
                precedence: ATOM,
            })),
        )
        .with(
            "CURRENT_TIMESTAMP",
            Arity::Exact(0),
            rule!(RenderRule::Template(Template {
                pieces: &[Text("CURRENT_TIMESTAMP")],
                precedence: ATOM,
            })),
        )
        // functions that differ from Presto
        .with(
            "RAND",
            Arity::Range(0, 1),
            rule!(RenderRule::ArityDispatch(&[(0, RANDOM), (1, RANDOM)])),
        )
        .with(
            "RAND_INTEGER",
            Arity::Range(1, 2),
            rule!(RenderRule::ArityDispatch(&[(1, RANDOM_BOUND_FIRST), (2, RANDOM_BOUND_SECOND)])),
        )
        .with(
            "TRUNCATE",
            Arity::Range(1, 2),
            rule!(RenderRule::ArityDispatch(&[(1, TRUNCATE_WHOLE), (2, TRUNCATE_TO_SCALE)])),
        )
        .with("SUBSTRING", Arity::Range(2, 3), RenderRule::Rename("SUBSTR"))
        .with("CHARACTER_LENGTH", Arity::Exact(1), RenderRule::Rename("LENGTH"))
        .with("CHAR_LENGTH", Arity::Exact(1), RenderRule::Rename("LENGTH"))
        .with("CEILING", Arity::Exact(1), RenderRule::Rename("CEIL"))
        .with(
            "POSITION",
            Arity::Exact(2),
            rule!(RenderRule::Template(Template {
                pieces: &[Text("STRPOS("), Arg(1, 0), Text(", "), Arg(0, 0), Text(")")],
                precedence: ATOM,
            })),
        )
        .with_pass_through(PASS_THROUGH)
}
