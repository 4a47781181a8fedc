use rp_plan::{ProjectItem, RelNode, RowType, ScalarExpr};

use super::ConversionContext;
use crate::error::{ConvertError, ConvertResult};
use crate::expr::RowShape;
use crate::fragment::{ColumnBinding, ColumnExpr, SelectItem, SqlFragment};
use crate::ident::IdentifierPolicy;

/// A projection or filter merges into the child's SELECT unless the child
/// already orders or limits its rows, or exposes computed columns that
/// must be evaluated once before a parent reads them. Over an aggregate,
/// group keys and aggregate calls may be repeated freely.
fn merges_into(fragment: &SqlFragment) -> bool {
    fragment.parts().is_some_and(|parts| {
        !parts.has_ordering()
            && (parts.select.is_none()
                || fragment.is_trivial()
                || (parts.is_aggregate() && fragment.is_group_output()))
    })
}

pub(crate) fn handle_project(
    ctx: &mut ConversionContext,
    input: &RelNode,
    items: &[ProjectItem],
    row_type: &RowType,
) -> ConvertResult<SqlFragment> {
    if items.is_empty() {
        return Err(ConvertError::structural("Project", "no output columns"));
    }
    if items.len() != row_type.len() {
        return Err(ConvertError::structural(
            "Project",
            format!(
                "{} item(s) but {} declared column(s)",
                items.len(),
                row_type.len()
            ),
        ));
    }

    let mut fragment = ctx.convert(input)?;
    if !merges_into(&fragment) {
        fragment = ctx.wrap(fragment);
    }

    let shape = RowShape::new(&fragment.columns, fragment.qualify());
    let renderer = ctx.renderer("Project");
    let mut select = Vec::with_capacity(items.len());
    let mut columns = Vec::with_capacity(items.len());
    for (item, field) in items.iter().zip(&row_type.fields) {
        let rendered = renderer.render(&item.expr, &shape)?;
        let expr = match &item.expr {
            ScalarExpr::FieldRef { index, .. } => fragment.columns[*index].expr.clone(),
            ScalarExpr::Literal { .. } => ColumnExpr::Computed {
                rendered: rendered.clone(),
                constant: true,
                aggregate: false,
            },
            _ => ColumnExpr::Computed {
                rendered: rendered.clone(),
                constant: false,
                aggregate: false,
            },
        };
        select.push(SelectItem {
            sql: rendered.sql,
            alias: IdentifierPolicy::projection_alias(&field.name),
        });
        columns.push(ColumnBinding::new(field.name.clone(), expr));
    }

    if let Some(parts) = fragment.parts_mut() {
        parts.select = Some(select);
    }
    fragment.columns = columns;
    Ok(fragment)
}

/// WHERE over plain and trivially projected input, HAVING over an
/// aggregate, otherwise a filter over a derived table.
pub(crate) fn handle_filter(
    ctx: &mut ConversionContext,
    input: &RelNode,
    condition: &ScalarExpr,
) -> ConvertResult<SqlFragment> {
    let mut fragment = ctx.convert(input)?;
    if !merges_into(&fragment) {
        fragment = ctx.wrap(fragment);
    }

    let predicate = ctx.renderer("Filter").render_predicate(
        condition,
        &RowShape::new(&fragment.columns, fragment.qualify()),
    )?;
    if let Some(parts) = fragment.parts_mut() {
        let slot = if parts.is_aggregate() {
            &mut parts.having
        } else {
            &mut parts.where_clause
        };
        *slot = Some(match slot.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
    }
    Ok(fragment)
}
