use rp_plan::{AggregateCall, RelNode, RowType};

use super::ConversionContext;
use crate::error::{ConvertError, ConvertResult};
use crate::fragment::{ColumnBinding, ColumnExpr, SelectItem, SqlFragment};

/// Grouping merges into a child that has not grouped, ordered, or computed
/// row-level expressions. Constant group keys would read as ordinals, so a
/// child exposing one as a key is wrapped instead.
fn accepts_aggregate(fragment: &SqlFragment, group_keys: &[usize]) -> bool {
    let Some(parts) = fragment.parts() else {
        return false;
    };
    if parts.has_ordering() || parts.is_aggregate() || parts.having.is_some() {
        return false;
    }
    if parts.select.is_none() {
        return true;
    }
    fragment.is_trivial()
        && group_keys.iter().all(|&k| {
            fragment
                .columns
                .get(k)
                .is_some_and(|c| matches!(c.expr, ColumnExpr::Column { .. }))
        })
}

pub(crate) fn handle_aggregate(
    ctx: &mut ConversionContext,
    input: &RelNode,
    group_keys: &[usize],
    calls: &[AggregateCall],
    row_type: &RowType,
) -> ConvertResult<SqlFragment> {
    if group_keys.is_empty() && calls.is_empty() {
        return Err(ConvertError::structural(
            "Aggregate",
            "neither group keys nor aggregate calls",
        ));
    }
    if group_keys.len() + calls.len() != row_type.len() {
        return Err(ConvertError::structural(
            "Aggregate",
            format!(
                "{} key(s) and {} call(s) but {} declared column(s)",
                group_keys.len(),
                calls.len(),
                row_type.len()
            ),
        ));
    }

    let mut fragment = ctx.convert(input)?;
    if !accepts_aggregate(&fragment, group_keys) {
        fragment = ctx.wrap(fragment);
    }

    let input_column = |index: usize| {
        fragment
            .render_column(index, ctx.policy)
            .ok_or_else(|| {
                ConvertError::structural(
                    "Aggregate",
                    format!(
                        "input column ${index} out of range for a row of {} column(s)",
                        fragment.columns.len()
                    ),
                )
            })
    };

    let mut select = Vec::with_capacity(row_type.len());
    let mut group_by = Vec::with_capacity(group_keys.len());
    let mut columns = Vec::with_capacity(row_type.len());
    let mut names = row_type.fields.iter().map(|f| f.name.clone());

    for &key in group_keys {
        let rendered = input_column(key)?;
        let name = names.next().unwrap_or_default();
        group_by.push(rendered.sql.clone());
        select.push(SelectItem {
            sql: rendered.sql,
            alias: name.clone(),
        });
        columns.push(ColumnBinding::new(name, fragment.columns[key].expr.clone()));
    }

    let renderer = ctx.renderer("Aggregate");
    for call in calls {
        let args = call
            .operands
            .iter()
            .map(|&i| input_column(i))
            .collect::<ConvertResult<Vec<_>>>()?;
        let rendered = renderer.aggregate(call, args)?;
        let name = names.next().unwrap_or_default();
        select.push(SelectItem {
            sql: rendered.sql.clone(),
            alias: name.clone(),
        });
        columns.push(ColumnBinding::new(
            name,
            ColumnExpr::Computed {
                rendered,
                constant: false,
                aggregate: true,
            },
        ));
    }

    if let Some(parts) = fragment.parts_mut() {
        parts.select = Some(select);
        parts.group_by = Some(group_by);
    }
    fragment.columns = columns;
    Ok(fragment)
}
