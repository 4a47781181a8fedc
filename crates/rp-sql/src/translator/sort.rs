use rp_plan::{Direction, NullOrdering, RelNode, SortKey};

use super::ConversionContext;
use crate::error::{ConvertError, ConvertResult};
use crate::fragment::SqlFragment;

/// ORDER BY / OFFSET / FETCH. Keys over an explicit select list refer to
/// the output aliases, so a renamed column cannot be confused with an
/// input column of the same name.
pub(crate) fn handle_sort(
    ctx: &mut ConversionContext,
    input: &RelNode,
    keys: &[SortKey],
    offset: Option<u64>,
    fetch: Option<u64>,
) -> ConvertResult<SqlFragment> {
    let mut fragment = ctx.convert(input)?;
    if keys.is_empty() && offset.is_none() && fetch.is_none() {
        return Ok(fragment);
    }
    if fragment.parts().is_none() || fragment.has_ordering() {
        fragment = ctx.wrap(fragment);
    }

    let mut order_by = Vec::with_capacity(keys.len());
    for key in keys {
        let Some(binding) = fragment.columns.get(key.index) else {
            return Err(ConvertError::structural(
                "Sort",
                format!(
                    "sort key ${} out of range for a row of {} column(s)",
                    key.index,
                    fragment.columns.len()
                ),
            ));
        };
        let output = fragment
            .parts()
            .and_then(|p| p.select.as_ref())
            .and_then(|items| items.get(key.index));
        let mut text = match output {
            Some(item) => ctx.policy.ident(&item.alias),
            None => binding.expr.render(ctx.policy, fragment.qualify()).sql,
        };
        if key.direction == Direction::Desc {
            text.push_str(" DESC");
        }
        match key.nulls {
            Some(NullOrdering::First) => text.push_str(" NULLS FIRST"),
            Some(NullOrdering::Last) => text.push_str(" NULLS LAST"),
            None => {}
        }
        order_by.push(text);
    }

    if let Some(parts) = fragment.parts_mut() {
        parts.order_by = order_by;
        parts.offset = offset;
        parts.fetch = fetch;
    }
    Ok(fragment)
}
