use rp_plan::{CorrelationId, JoinType, LiteralValue, RelNode, ScalarExpr};

use super::ConversionContext;
use crate::error::{ConvertError, ConvertResult};
use crate::expr::RowShape;
use crate::fragment::{ColumnBinding, ColumnExpr, SqlFragment, Source};
use crate::scope::CorrelationFrame;

fn qualifier_key(qualifier: &str) -> String {
    qualifier.trim_matches('"').to_lowercase()
}

fn qualifiers(fragment: &SqlFragment) -> Vec<String> {
    fragment
        .columns
        .iter()
        .filter_map(|c| match &c.expr {
            ColumnExpr::Column {
                qualifier: Some(q), ..
            } => Some(qualifier_key(q)),
            _ => None,
        })
        .collect()
}

/// Left input of a join: anything beyond FROM plus joins is wrapped
fn join_base(ctx: &mut ConversionContext, fragment: SqlFragment) -> SqlFragment {
    if fragment.is_join_base() {
        fragment
    } else {
        ctx.wrap(fragment)
    }
}

/// Right input of a join as a single relation: a table (aliased when its
/// qualifier is already taken on the left), an already aliased relation, or
/// a derived table.
fn join_operand(
    ctx: &mut ConversionContext,
    fragment: SqlFragment,
    base: &SqlFragment,
) -> (String, Vec<ColumnBinding>) {
    if !fragment.is_single_relation() {
        return into_relation(ctx.wrap(fragment));
    }
    let collides = matches!(
        &fragment.source,
        Source::Table { qualifier, .. } if qualifiers(base).contains(&qualifier_key(qualifier))
    );
    if collides {
        let alias = ctx.aliases.next_table();
        into_relation(ctx.alias_as(fragment, &alias))
    } else {
        into_relation(fragment)
    }
}

fn into_relation(fragment: SqlFragment) -> (String, Vec<ColumnBinding>) {
    let from = fragment.parts().map(|p| p.from.clone()).unwrap_or_default();
    (from, fragment.columns)
}

fn append_join(
    mut base: SqlFragment,
    clause: String,
    right_columns: Vec<ColumnBinding>,
) -> SqlFragment {
    if let Some(parts) = base.parts_mut() {
        parts.joins.push(clause);
    }
    base.columns.extend(right_columns);
    base.source = Source::Compound;
    base
}

/// Inner join against a key-only aggregate: the shape an IN subquery is
/// decorrelated into
fn is_semi_join_shape(join_type: JoinType, right: &RelNode) -> bool {
    join_type == JoinType::Inner
        && matches!(
            right,
            RelNode::Aggregate { group_keys, calls, .. } if !group_keys.is_empty() && calls.is_empty()
        )
}

fn is_true(condition: &ScalarExpr) -> bool {
    matches!(
        condition,
        ScalarExpr::Literal {
            value: LiteralValue::Boolean(true),
            ..
        }
    )
}

pub(crate) fn handle_join(
    ctx: &mut ConversionContext,
    left: &RelNode,
    right: &RelNode,
    join_type: JoinType,
    condition: Option<&ScalarExpr>,
) -> ConvertResult<SqlFragment> {
    let left_fragment = ctx.convert(left)?;
    let right_fragment = ctx.convert(right)?;
    let base = join_base(ctx, left_fragment);
    let (relation, right_columns) = join_operand(ctx, right_fragment, &base);

    let predicate = match condition {
        Some(condition) if !is_true(condition) => {
            let mut shape_columns = base.columns.clone();
            if is_semi_join_shape(join_type, right) {
                // Group-key columns of the aggregated side are referenced
                // upper-cased.
                shape_columns.extend(right_columns.iter().map(|binding| match &binding.expr {
                    ColumnExpr::Column { qualifier, name, .. } => ColumnBinding::new(
                        binding.name.clone(),
                        ColumnExpr::Column {
                            qualifier: qualifier.clone(),
                            name: name.to_uppercase(),
                            quoted: true,
                        },
                    ),
                    ColumnExpr::Computed { .. } => binding.clone(),
                }));
            } else {
                shape_columns.extend(right_columns.iter().cloned());
            }
            Some(
                ctx.renderer("Join")
                    .render_predicate(condition, &RowShape::new(&shape_columns, true))?,
            )
        }
        _ => None,
    };

    let clause = match (join_type, predicate) {
        (JoinType::Cross, None) => format!("CROSS JOIN {relation}"),
        (JoinType::Cross, Some(p)) => format!("INNER JOIN {relation} ON {}", p.sql),
        (kind, Some(p)) => format!("{kind} JOIN {relation} ON {}", p.sql),
        (kind, None) => format!("{kind} JOIN {relation} ON TRUE"),
    };
    Ok(append_join(base, clause, right_columns))
}

/// Correlated join. The left row is exposed under a `$corN` alias while the
/// right side is translated; the right side joins laterally.
pub(crate) fn handle_correlate(
    ctx: &mut ConversionContext,
    left: &RelNode,
    right: &RelNode,
    correlation: &CorrelationId,
    join_type: JoinType,
) -> ConvertResult<SqlFragment> {
    if !matches!(join_type, JoinType::Inner | JoinType::Left) {
        return Err(ConvertError::unsupported(
            "Correlate",
            format!("{join_type} correlated join"),
        ));
    }

    let left_fragment = ctx.convert(left)?;
    let alias = ctx.aliases.next_correlation();
    let base = ctx.alias_as(left_fragment, &alias);

    let frame = CorrelationFrame {
        id: correlation.clone(),
        alias: ctx.policy.quoted(&alias),
        fields: left
            .row_type()
            .fields
            .iter()
            .zip(&base.columns)
            .map(|(field, binding)| {
                let exposed = match &binding.expr {
                    ColumnExpr::Column { name, .. } => name.clone(),
                    ColumnExpr::Computed { .. } => binding.name.clone(),
                };
                (field.name.clone(), exposed)
            })
            .collect(),
    };

    let right_fragment = {
        let mut scoped = ctx.enter_scope(frame);
        scoped.convert(right)?
    };

    let (relation, right_columns) = if right_fragment.is_single_relation() {
        join_operand(ctx, right_fragment, &base)
    } else {
        let (from, columns) = into_relation(ctx.wrap(right_fragment));
        (format!("LATERAL {from}"), columns)
    };

    let clause = match join_type {
        JoinType::Left => format!("LEFT JOIN {relation} ON TRUE"),
        _ => format!("CROSS JOIN {relation}"),
    };
    Ok(append_join(base, clause, right_columns))
}
