use rp_plan::{LiteralValue, RowType};

use super::ConversionContext;
use crate::error::{ConvertError, ConvertResult};
use crate::fragment::{ColumnBinding, ColumnExpr, Rendered, SqlFragment, Source};

pub(crate) fn handle_table_scan(
    ctx: &mut ConversionContext,
    table: &[String],
    row_type: &RowType,
) -> ConvertResult<SqlFragment> {
    let Some(last) = table.last() else {
        return Err(ConvertError::structural("TableScan", "empty table name"));
    };
    let sql = ctx.policy.table(table);
    let qualifier = ctx.policy.ident(last);
    let columns = row_type
        .fields
        .iter()
        .map(|field| {
            ColumnBinding::new(
                field.name.clone(),
                ColumnExpr::Column {
                    qualifier: Some(qualifier.clone()),
                    name: field.name.clone(),
                    quoted: false,
                },
            )
        })
        .collect();
    Ok(SqlFragment::relation(
        sql.clone(),
        columns,
        Source::Table { sql, qualifier },
    ))
}

/// `(VALUES (..), (..)) AS "tN" (a, b)`. An empty tuple list becomes one
/// typed NULL row filtered out by `WHERE FALSE`.
pub(crate) fn handle_values(
    ctx: &mut ConversionContext,
    tuples: &[Vec<LiteralValue>],
    row_type: &RowType,
) -> ConvertResult<SqlFragment> {
    if row_type.is_empty() {
        return Err(ConvertError::structural("Values", "no columns declared"));
    }

    let renderer = ctx.renderer("Values");
    let rows = if tuples.is_empty() {
        let nulls = row_type
            .fields
            .iter()
            .map(|field| {
                if field.ty.is_unknown() {
                    "NULL".to_string()
                } else {
                    format!("CAST(NULL AS {})", field.ty.presto_name())
                }
            })
            .collect::<Vec<_>>();
        vec![format!("({})", nulls.join(", "))]
    } else {
        tuples
            .iter()
            .enumerate()
            .map(|(i, tuple)| {
                if tuple.len() != row_type.len() {
                    return Err(ConvertError::structural(
                        "Values",
                        format!(
                            "row {i} has {} value(s) but {} column(s) are declared",
                            tuple.len(),
                            row_type.len()
                        ),
                    ));
                }
                let values = tuple
                    .iter()
                    .zip(&row_type.fields)
                    .map(|(value, field)| renderer.literal(value, &field.ty).map(|r| r.sql))
                    .collect::<ConvertResult<Vec<_>>>()?;
                Ok(format!("({})", values.join(", ")))
            })
            .collect::<ConvertResult<Vec<_>>>()?
    };

    let alias = ctx.policy.quoted(&ctx.aliases.next_table());
    let column_list = row_type
        .fields
        .iter()
        .map(|f| ctx.policy.ident(&f.name))
        .collect::<Vec<_>>()
        .join(", ");
    let from = format!("(VALUES {}) AS {alias} ({column_list})", rows.join(", "));
    let columns = row_type
        .fields
        .iter()
        .map(|field| {
            ColumnBinding::new(
                field.name.clone(),
                ColumnExpr::Column {
                    qualifier: Some(alias.clone()),
                    name: field.name.clone(),
                    quoted: false,
                },
            )
        })
        .collect();

    let mut fragment = SqlFragment::relation(from, columns, Source::Aliased);
    if tuples.is_empty() {
        if let Some(parts) = fragment.parts_mut() {
            parts.where_clause = Some(Rendered::atom("FALSE"));
        }
    }
    Ok(fragment)
}
