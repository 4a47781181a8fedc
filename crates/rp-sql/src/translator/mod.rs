//! Per-operator translation of plan nodes into SQL fragments

use std::ops::{Deref, DerefMut};

use rp_plan::RelNode;

use crate::alias::AliasAllocator;
use crate::dialect::OperatorTable;
use crate::error::{ConvertError, ConvertResult};
use crate::expr::ExprRenderer;
use crate::fragment::{ColumnExpr, SqlFragment, Source};
use crate::ident::IdentifierPolicy;
use crate::scope::{CorrelationFrame, ScopeStack};

pub(crate) mod aggregate;
pub(crate) mod join;
pub(crate) mod projection;
pub(crate) mod scan;
pub(crate) mod set_ops;
pub(crate) mod sort;
pub(crate) mod unnest;

/// State for one conversion call; never shared between calls
pub(crate) struct ConversionContext<'a> {
    pub(crate) operators: &'a OperatorTable,
    pub(crate) policy: &'a IdentifierPolicy,
    pub(crate) aliases: AliasAllocator,
    pub(crate) scopes: ScopeStack,
    depth: usize,
    max_depth: usize,
}

impl<'a> ConversionContext<'a> {
    pub(crate) fn new(
        operators: &'a OperatorTable,
        policy: &'a IdentifierPolicy,
        plan: &RelNode,
        max_depth: usize,
    ) -> Self {
        Self {
            operators,
            policy,
            aliases: AliasAllocator::new(plan.scanned_tables()),
            scopes: ScopeStack::default(),
            depth: 0,
            max_depth,
        }
    }

    /// Translate a subtree. The result has exactly one column binding per
    /// field of the node's row type, named after it.
    pub(crate) fn convert(&mut self, node: &RelNode) -> ConvertResult<SqlFragment> {
        if self.depth >= self.max_depth {
            return Err(ConvertError::structural(
                node.kind_name(),
                format!("plan nested deeper than {} levels", self.max_depth),
            ));
        }
        self.depth += 1;
        log::trace!("Translating {} at depth {}", node.kind_name(), self.depth);

        let result = match node {
            RelNode::TableScan { table, row_type } => scan::handle_table_scan(self, table, row_type),
            RelNode::Values { tuples, row_type } => scan::handle_values(self, tuples, row_type),
            RelNode::Project {
                input,
                items,
                row_type,
            } => projection::handle_project(self, input, items, row_type),
            RelNode::Filter {
                input, condition, ..
            } => projection::handle_filter(self, input, condition),
            RelNode::Aggregate {
                input,
                group_keys,
                calls,
                row_type,
            } => aggregate::handle_aggregate(self, input, group_keys, calls, row_type),
            RelNode::Join {
                left,
                right,
                join_type,
                condition,
                ..
            } => join::handle_join(self, left, right, *join_type, condition.as_ref()),
            RelNode::Correlate {
                left,
                right,
                correlation,
                join_type,
                ..
            } => join::handle_correlate(self, left, right, correlation, *join_type),
            RelNode::Sort {
                input,
                keys,
                offset,
                fetch,
                ..
            } => sort::handle_sort(self, input, keys, *offset, *fetch),
            RelNode::SetOp {
                op,
                all,
                inputs,
                row_type,
            } => set_ops::handle_set_op(self, *op, *all, inputs, row_type),
            RelNode::Unnest {
                exprs,
                with_ordinality,
                row_type,
            } => unnest::handle_unnest(self, exprs, *with_ordinality, row_type),
        };
        self.depth -= 1;

        let mut fragment = result?;
        let row_type = node.row_type();
        if fragment.columns.len() != row_type.len() {
            return Err(ConvertError::structural(
                node.kind_name(),
                format!(
                    "row type declares {} column(s) but the operator produces {}",
                    row_type.len(),
                    fragment.columns.len()
                ),
            ));
        }
        for (binding, field) in fragment.columns.iter_mut().zip(&row_type.fields) {
            binding.name.clone_from(&field.name);
        }
        Ok(fragment)
    }

    pub(crate) fn renderer(&self, node: &'static str) -> ExprRenderer<'_> {
        ExprRenderer::new(self.operators, self.policy, &self.scopes, node)
    }

    /// Wrap a fragment as a derived table under a fresh alias
    pub(crate) fn wrap(&mut self, fragment: SqlFragment) -> SqlFragment {
        let alias = self.aliases.next_table();
        self.wrap_as(fragment, &alias)
    }

    pub(crate) fn wrap_as(&self, fragment: SqlFragment, alias: &str) -> SqlFragment {
        log::trace!("Wrapping fragment as derived table {alias}");
        fragment.into_derived(&self.policy.quoted(alias), self.policy)
    }

    /// Give a plain single-table fragment an explicit alias, or wrap
    /// anything else under that alias
    pub(crate) fn alias_as(&self, fragment: SqlFragment, alias: &str) -> SqlFragment {
        match (&fragment.source, fragment.is_single_relation()) {
            (Source::Table { sql, .. }, true) => {
                let rendered = self.policy.quoted(alias);
                let from = format!("{sql} AS {rendered}");
                let columns = fragment
                    .columns
                    .into_iter()
                    .map(|mut binding| {
                        if let ColumnExpr::Column { qualifier, .. } = &mut binding.expr {
                            *qualifier = Some(rendered.clone());
                        }
                        binding
                    })
                    .collect();
                SqlFragment::relation(from, columns, Source::Aliased)
            }
            _ => self.wrap_as(fragment, alias),
        }
    }

    /// Push a correlation frame for the lifetime of the returned guard
    pub(crate) fn enter_scope(&mut self, frame: CorrelationFrame) -> ScopeGuard<'_, 'a> {
        self.scopes.push(frame);
        ScopeGuard { context: self }
    }
}

/// Pops the correlation frame it was created with when dropped, on both
/// the success and the error path.
pub(crate) struct ScopeGuard<'g, 'a> {
    context: &'g mut ConversionContext<'a>,
}

impl<'a> Deref for ScopeGuard<'_, 'a> {
    type Target = ConversionContext<'a>;

    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl DerefMut for ScopeGuard<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.context
    }
}

impl Drop for ScopeGuard<'_, '_> {
    fn drop(&mut self) {
        self.context.scopes.pop();
    }
}
