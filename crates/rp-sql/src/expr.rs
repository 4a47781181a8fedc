//! Scalar expression rendering
//!
//! Produces Presto text for a typed expression tree against the row shape
//! of the fragment it is evaluated over. Parenthesization is driven by the
//! precedence of each rendered operand, so `5 + 2 * 10 / 4` stays flat and
//! `(a + b) * c` keeps its parentheses.

use rp_plan::{AggregateCall, LiteralValue, ScalarExpr, SqlType};

use crate::dialect::{precedence, Lookup, OperatorTable, Piece, RenderRule, Template};
use crate::error::{ConvertError, ConvertResult};
use crate::fragment::{ColumnBinding, Rendered};
use crate::ident::IdentifierPolicy;
use crate::scope::ScopeStack;

/// Input row an expression is evaluated against
#[derive(Debug, Clone, Copy)]
pub struct RowShape<'a> {
    pub columns: &'a [ColumnBinding],
    pub qualify: bool,
}

impl<'a> RowShape<'a> {
    pub fn new(columns: &'a [ColumnBinding], qualify: bool) -> Self {
        Self { columns, qualify }
    }

    /// Shape with no input columns
    pub fn empty() -> Self {
        Self {
            columns: &[],
            qualify: false,
        }
    }
}

pub struct ExprRenderer<'a> {
    operators: &'a OperatorTable,
    policy: &'a IdentifierPolicy,
    scopes: &'a ScopeStack,
    node: &'static str,
}

impl<'a> ExprRenderer<'a> {
    pub fn new(
        operators: &'a OperatorTable,
        policy: &'a IdentifierPolicy,
        scopes: &'a ScopeStack,
        node: &'static str,
    ) -> Self {
        Self {
            operators,
            policy,
            scopes,
            node,
        }
    }

    pub fn render(&self, expr: &ScalarExpr, shape: &RowShape<'_>) -> ConvertResult<Rendered> {
        match expr {
            ScalarExpr::Literal { value, ty } => self.literal(value, ty),
            ScalarExpr::FieldRef { index, .. } => shape
                .columns
                .get(*index)
                .map(|c| c.expr.render(self.policy, shape.qualify))
                .ok_or_else(|| {
                    ConvertError::structural(
                        self.node,
                        format!(
                            "field reference ${index} out of range for a row of {} column(s)",
                            shape.columns.len()
                        ),
                    )
                }),
            ScalarExpr::CorrelVariableRef { correl, field, .. } => {
                let (alias, column) = self.scopes.resolve(correl, field, self.node)?;
                Ok(Rendered::atom(format!(
                    "{alias}.{}",
                    self.policy.quoted(column)
                )))
            }
            ScalarExpr::Call { op, operands, ty } => {
                let args = operands
                    .iter()
                    .map(|operand| self.render(operand, shape))
                    .collect::<ConvertResult<Vec<_>>>()?;
                self.call(op, args, ty)
            }
        }
    }

    /// Render a boolean condition. Any other declared type, including an
    /// unrecognized one, is a type mismatch.
    pub fn render_predicate(
        &self,
        expr: &ScalarExpr,
        shape: &RowShape<'_>,
    ) -> ConvertResult<Rendered> {
        let ty = expr.ty();
        if !ty.is_boolean() {
            return Err(ConvertError::TypeMismatch {
                node: self.node.to_string(),
                expected: "BOOLEAN".to_string(),
                found: ty.presto_name(),
                expr: expr.to_string(),
            });
        }
        self.render(expr, shape)
    }

    /// Render an aggregate call over already-rendered operands
    pub fn aggregate(&self, call: &AggregateCall, args: Vec<Rendered>) -> ConvertResult<Rendered> {
        let name = call.function.as_str();
        if args.is_empty() && name.eq_ignore_ascii_case("COUNT") {
            if call.distinct {
                return Err(ConvertError::structural(
                    self.node,
                    "COUNT(DISTINCT) needs at least one operand",
                ));
            }
            return Ok(Rendered::atom("COUNT(*)"));
        }
        let distinct = if call.distinct { "DISTINCT " } else { "" };
        match self.operators.lookup(name, args.len()) {
            Lookup::PassThrough => Ok(function_call(&name.to_uppercase(), distinct, &args)),
            Lookup::Rule(RenderRule::Rename(target)) => Ok(function_call(target, distinct, &args)),
            Lookup::Rule(rule) if !call.distinct => self.apply(rule, name, args, &call.ty),
            Lookup::Rule(_) => Err(ConvertError::unsupported(
                self.node,
                format!("DISTINCT {name}"),
            )),
            Lookup::ArityMismatch(arities) => Err(self.arity_error(name, args.len(), &arities)),
            Lookup::Unknown => Err(ConvertError::unsupported(
                self.node,
                format!("aggregate function {name}"),
            )),
        }
    }

    fn call(&self, op: &str, args: Vec<Rendered>, ty: &SqlType) -> ConvertResult<Rendered> {
        match self.operators.lookup(op, args.len()) {
            Lookup::Rule(rule) => self.apply(rule, op, args, ty),
            Lookup::PassThrough => Ok(function_call(&op.to_uppercase(), "", &args)),
            Lookup::ArityMismatch(arities) => Err(self.arity_error(op, args.len(), &arities)),
            Lookup::Unknown => Err(ConvertError::unsupported(
                self.node,
                format!("operator {op} with {} operand(s)", args.len()),
            )),
        }
    }

    fn arity_error(&self, op: &str, n: usize, arities: &[crate::dialect::Arity]) -> ConvertError {
        ConvertError::structural(
            self.node,
            format!(
                "{op} called with {n} operand(s), expected {}",
                arities
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" or ")
            ),
        )
    }

    fn apply(
        &self,
        rule: &RenderRule,
        op: &str,
        args: Vec<Rendered>,
        ty: &SqlType,
    ) -> ConvertResult<Rendered> {
        match rule {
            RenderRule::Rename(target) => Ok(function_call(target, "", &args)),
            RenderRule::Template(template) => self.fill(template, op, &args),
            RenderRule::ArityDispatch(arms) => {
                let template = arms
                    .iter()
                    .find(|(n, _)| *n == args.len())
                    .map(|(_, t)| t)
                    .ok_or_else(|| {
                        ConvertError::structural(
                            self.node,
                            format!("no {op} rewrite for {} operand(s)", args.len()),
                        )
                    })?;
                self.fill(template, op, &args)
            }
            RenderRule::VariadicInfix {
                keyword,
                precedence: p,
            } => Ok(Rendered::new(
                args.iter()
                    .map(|a| a.at_least(*p))
                    .collect::<Vec<_>>()
                    .join(&format!(" {keyword} ")),
                *p,
            )),
            RenderRule::Bracketed { prefix } => Ok(Rendered::atom(format!(
                "{prefix}[{}]",
                join_args(&args)
            ))),
            RenderRule::Cast => {
                if ty.is_unknown() {
                    return Err(ConvertError::unsupported(
                        self.node,
                        format!("CAST to unrecognized type {}", ty.presto_name()),
                    ));
                }
                let operand = args.first().ok_or_else(|| {
                    ConvertError::structural(self.node, format!("{op} without an operand"))
                })?;
                Ok(Rendered::atom(format!(
                    "CAST({} AS {})",
                    operand.sql,
                    ty.presto_name()
                )))
            }
            RenderRule::Case => {
                let mut sql = String::from("CASE");
                let mut pairs = args.chunks_exact(2);
                for pair in pairs.by_ref() {
                    sql.push_str(&format!(" WHEN {} THEN {}", pair[0].sql, pair[1].sql));
                }
                if let [otherwise] = pairs.remainder() {
                    sql.push_str(&format!(" ELSE {}", otherwise.sql));
                }
                sql.push_str(" END");
                Ok(Rendered::atom(sql))
            }
            RenderRule::MapConstructor => {
                if args.len() % 2 != 0 {
                    return Err(ConvertError::structural(
                        self.node,
                        format!("{op} needs key/value pairs, got {} operand(s)", args.len()),
                    ));
                }
                if args.is_empty() {
                    return Ok(Rendered::atom("MAP()"));
                }
                let keys: Vec<Rendered> = args.iter().step_by(2).cloned().collect();
                let values: Vec<Rendered> = args.iter().skip(1).step_by(2).cloned().collect();
                Ok(Rendered::atom(format!(
                    "MAP(ARRAY[{}], ARRAY[{}])",
                    join_args(&keys),
                    join_args(&values)
                )))
            }
        }
    }

    fn fill(&self, template: &Template, op: &str, args: &[Rendered]) -> ConvertResult<Rendered> {
        let mut sql = String::new();
        for piece in template.pieces {
            match piece {
                Piece::Text(text) => sql.push_str(text),
                Piece::Arg(i, min) => {
                    let arg = args.get(*i).ok_or_else(|| {
                        ConvertError::structural(
                            self.node,
                            format!("{op} rewrite refers to missing operand {i}"),
                        )
                    })?;
                    sql.push_str(&arg.at_least(*min));
                }
            }
        }
        Ok(Rendered::new(sql, template.precedence))
    }

    /// Render a literal of the given declared type
    pub fn literal(&self, value: &LiteralValue, ty: &SqlType) -> ConvertResult<Rendered> {
        let unknown = SqlType::Unknown(String::new());
        match value {
            LiteralValue::Null => Ok(Rendered::atom("NULL")),
            LiteralValue::Boolean(true) => Ok(Rendered::atom("TRUE")),
            LiteralValue::Boolean(false) => Ok(Rendered::atom("FALSE")),
            LiteralValue::Integer(i) => Ok(signed(i.to_string())),
            LiteralValue::Decimal(text) => {
                if !is_decimal_text(text) {
                    return Err(ConvertError::unsupported(
                        self.node,
                        format!("malformed decimal literal '{text}'"),
                    ));
                }
                Ok(signed(text.clone()))
            }
            LiteralValue::Double(d) => {
                if !d.is_finite() {
                    return Err(ConvertError::unsupported(
                        self.node,
                        format!("non-finite double literal {d}"),
                    ));
                }
                Ok(signed(format!("{d:E}")))
            }
            LiteralValue::String(s) => Ok(Rendered::atom(quote_string(s))),
            LiteralValue::Binary(bytes) => Ok(Rendered::atom(format!(
                "X'{}'",
                bytes.iter().map(|b| format!("{b:02X}")).collect::<String>()
            ))),
            LiteralValue::Date(d) => Ok(Rendered::atom(format!("DATE '{}'", d.format("%Y-%m-%d")))),
            LiteralValue::Time(t) => Ok(Rendered::atom(format!(
                "TIME '{}'",
                t.format("%H:%M:%S%.f")
            ))),
            LiteralValue::Timestamp(ts) => Ok(Rendered::atom(format!(
                "TIMESTAMP '{}'",
                ts.format("%Y-%m-%d %H:%M:%S%.f")
            ))),
            LiteralValue::Array(items) => {
                let element = ty.element_type().unwrap_or(&unknown);
                let rendered = items
                    .iter()
                    .map(|item| self.literal(item, element))
                    .collect::<ConvertResult<Vec<_>>>()?;
                Ok(Rendered::atom(format!("ARRAY[{}]", join_args(&rendered))))
            }
            LiteralValue::Row(items) => {
                let rendered = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        let field_ty = match ty {
                            SqlType::Row(fields) => fields.get(i).map(|(_, t)| t),
                            _ => None,
                        };
                        self.literal(item, field_ty.unwrap_or(&unknown))
                    })
                    .collect::<ConvertResult<Vec<_>>>()?;
                Ok(Rendered::atom(format!("ROW({})", join_args(&rendered))))
            }
            LiteralValue::Map(entries) => {
                let (key_ty, value_ty) = match ty {
                    SqlType::Map { key, value } => (key.as_ref(), value.as_ref()),
                    _ => (&unknown, &unknown),
                };
                let mut keys = Vec::with_capacity(entries.len());
                let mut values = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    keys.push(self.literal(k, key_ty)?);
                    values.push(self.literal(v, value_ty)?);
                }
                Ok(Rendered::atom(format!(
                    "MAP(ARRAY[{}], ARRAY[{}])",
                    join_args(&keys),
                    join_args(&values)
                )))
            }
            LiteralValue::Symbol(symbol) => {
                if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphabetic() || c == '_')
                {
                    return Err(ConvertError::unsupported(
                        self.node,
                        format!("symbol literal '{symbol}'"),
                    ));
                }
                Ok(Rendered::atom(symbol.to_uppercase()))
            }
        }
    }
}

fn function_call(name: &str, modifier: &str, args: &[Rendered]) -> Rendered {
    Rendered::atom(format!("{name}({modifier}{})", join_args(args)))
}

fn join_args(args: &[Rendered]) -> String {
    args.iter()
        .map(|a| a.sql.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Numeric text; negative values bind like unary minus
fn signed(text: String) -> Rendered {
    if text.starts_with('-') {
        Rendered::new(text, precedence::UNARY)
    } else {
        Rendered::atom(text)
    }
}

fn is_decimal_text(text: &str) -> bool {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let (whole, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    !(whole.is_empty() && frac.is_empty())
        && whole.chars().all(|c| c.is_ascii_digit())
        && frac.chars().all(|c| c.is_ascii_digit())
}

/// Single-quoted string literal with embedded quotes doubled
pub fn quote_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

#[cfg(test)]
#[path = "expr_test.rs"]
mod tests;
