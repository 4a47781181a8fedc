use rp_plan::{RelNode, RowType, SetOpKind};

use super::ConversionContext;
use crate::error::{ConvertError, ConvertResult};
use crate::fragment::{FragmentBody, SqlFragment};

/// `left\nUNION [ALL]\nright ...`. A branch is parenthesized when it is a
/// set operation that is not leftmost or uses a different operator, or
/// when it carries ORDER BY / OFFSET / FETCH.
pub(crate) fn handle_set_op(
    ctx: &mut ConversionContext,
    op: SetOpKind,
    all: bool,
    inputs: &[RelNode],
    row_type: &RowType,
) -> ConvertResult<SqlFragment> {
    let node = "SetOp";
    if inputs.len() < 2 {
        return Err(ConvertError::structural(
            node,
            format!("{op} needs at least two inputs, got {}", inputs.len()),
        ));
    }

    let mut branches = Vec::with_capacity(inputs.len());
    let mut exposed = Vec::new();
    for (i, input) in inputs.iter().enumerate() {
        let fragment = ctx.convert(input)?;
        if fragment.columns.len() != row_type.len() {
            return Err(ConvertError::structural(
                node,
                format!(
                    "input {i} has {} column(s) but {op} declares {}",
                    fragment.columns.len(),
                    row_type.len()
                ),
            ));
        }
        if i == 0 {
            exposed = fragment.exposed_names();
        }
        let parenthesize = match &fragment.body {
            FragmentBody::SetOp { op: child, .. } => i > 0 || *child != op,
            FragmentBody::Select(parts) => parts.has_ordering(),
        };
        let sql = fragment.to_sql(ctx.policy);
        branches.push(if parenthesize { format!("({sql})") } else { sql });
    }

    let keyword = if all {
        format!("{op} ALL")
    } else {
        op.to_string()
    };
    log::trace!("Combining {} branches with {keyword}", branches.len());
    Ok(SqlFragment::set_op(
        branches.join(&format!("\n{keyword}\n")),
        op,
        exposed,
    ))
}
