use rp_plan::{RowType, ScalarExpr, SqlType};

use super::ConversionContext;
use crate::error::{ConvertError, ConvertResult};
use crate::expr::RowShape;
use crate::fragment::{ColumnBinding, ColumnExpr, SqlFragment, Source};

/// Columns an unnested value expands into; None for anything that is not
/// an ARRAY or MAP
fn expanded_width(ty: &SqlType) -> Option<usize> {
    match ty {
        SqlType::Array(element) => match element.as_ref() {
            SqlType::Row(fields) => Some(fields.len()),
            _ => Some(1),
        },
        SqlType::Map { .. } => Some(2),
        _ => None,
    }
}

/// `UNNEST(e, ...) [WITH ORDINALITY] AS "tN" ("col_0", ...)`
pub(crate) fn handle_unnest(
    ctx: &mut ConversionContext,
    exprs: &[ScalarExpr],
    with_ordinality: bool,
    row_type: &RowType,
) -> ConvertResult<SqlFragment> {
    if exprs.is_empty() {
        return Err(ConvertError::structural("Unnest", "no expressions to unnest"));
    }

    let renderer = ctx.renderer("Unnest");
    let mut rendered = Vec::with_capacity(exprs.len());
    let mut width = usize::from(with_ordinality);
    for expr in exprs {
        let Some(columns) = expanded_width(expr.ty()) else {
            return Err(ConvertError::TypeMismatch {
                node: "Unnest".to_string(),
                expected: "ARRAY or MAP".to_string(),
                found: expr.ty().presto_name(),
                expr: expr.to_string(),
            });
        };
        width += columns;
        rendered.push(renderer.render(expr, &RowShape::empty())?.sql);
    }
    if width != row_type.len() {
        return Err(ConvertError::structural(
            "Unnest",
            format!(
                "unnested values produce {width} column(s) but {} are declared",
                row_type.len()
            ),
        ));
    }

    let alias = ctx.policy.quoted(&ctx.aliases.next_table());
    let names: Vec<String> = row_type
        .fields
        .iter()
        .map(|_| ctx.aliases.next_column())
        .collect();
    let from = format!(
        "UNNEST({}){} AS {alias} ({})",
        rendered.join(", "),
        if with_ordinality { " WITH ORDINALITY" } else { "" },
        names
            .iter()
            .map(|n| ctx.policy.quoted(n))
            .collect::<Vec<_>>()
            .join(", ")
    );
    let columns = row_type
        .fields
        .iter()
        .zip(names)
        .map(|(field, name)| {
            ColumnBinding::new(
                field.name.clone(),
                ColumnExpr::Column {
                    qualifier: Some(alias.clone()),
                    name,
                    quoted: true,
                },
            )
        })
        .collect();
    Ok(SqlFragment::relation(from, columns, Source::Unnest))
}
