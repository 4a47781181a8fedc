//! Entry point: relational plan in, Presto query text out

use rp_plan::RelNode;

use crate::config::ConverterConfig;
use crate::dialect::{presto_operators, OperatorTable, PrestoSyntax, SqlSyntax};
use crate::error::ConvertResult;
use crate::ident::IdentifierPolicy;
use crate::translator::ConversionContext;

/// Converts relational plans into Presto SQL.
///
/// Holds only read-only configuration; each call builds its own alias
/// counters and scope stack, so one converter can serve many threads.
pub struct RelToPrestoConverter {
    config: ConverterConfig,
    operators: &'static OperatorTable,
    policy: IdentifierPolicy,
    syntax: PrestoSyntax,
}

impl Default for RelToPrestoConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl RelToPrestoConverter {
    /// Converter with default configuration
    pub fn new() -> Self {
        Self::with_config(ConverterConfig::default())
    }

    pub fn with_config(config: ConverterConfig) -> Self {
        Self {
            config,
            operators: presto_operators(),
            policy: IdentifierPolicy::presto(),
            syntax: PrestoSyntax::new(),
        }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn operators(&self) -> &OperatorTable {
        self.operators
    }

    /// Convert a plan into a single Presto query.
    ///
    /// The same plan always yields the same text. When `validate_output`
    /// is set, the text is also parsed before it is returned.
    pub fn convert(&self, plan: &RelNode) -> ConvertResult<String> {
        let sql = self.render(plan)?;
        if self.config.validate_output {
            self.syntax.check_query(&sql)?;
        }
        Ok(sql)
    }

    /// Convert a plan and always parse the result
    pub fn convert_and_validate(&self, plan: &RelNode) -> ConvertResult<String> {
        let sql = self.render(plan)?;
        self.syntax.check_query(&sql)?;
        Ok(sql)
    }

    fn render(&self, plan: &RelNode) -> ConvertResult<String> {
        log::debug!(
            "Converting {} plan to {}",
            plan.kind_name(),
            self.syntax.name()
        );
        let mut context =
            ConversionContext::new(self.operators, &self.policy, plan, self.config.max_depth);
        let fragment = context.convert(plan)?;
        let sql = fragment.to_sql(&self.policy);
        log::debug!("Generated SQL:\n{sql}");
        Ok(sql)
    }
}

#[cfg(test)]
#[path = "converter_test.rs"]
mod tests;
