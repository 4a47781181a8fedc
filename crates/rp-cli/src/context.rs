//! Shared command context: configured converter and verbosity

use anyhow::{Context as _, Result};
use rp_sql::{ConverterConfig, RelToPrestoConverter};
use std::path::Path;

use crate::cli::GlobalArgs;

/// Converter built from the global options
pub(crate) struct Context {
    pub converter: RelToPrestoConverter,
    verbose: bool,
}

impl Context {
    /// Load the optional config file and build the converter
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let config = match &global.config {
            Some(path) => ConverterConfig::load(Path::new(path))
                .with_context(|| format!("Failed to load config from {path}"))?,
            None => ConverterConfig::default(),
        };
        let context = Self {
            converter: RelToPrestoConverter::with_config(config),
            verbose: global.verbose,
        };
        context.verbose(&format!(
            "Converter config: max_depth={}, validate_output={}",
            context.converter.config().max_depth,
            context.converter.config().validate_output
        ));
        Ok(context)
    }

    /// Print verbose output if enabled
    pub fn verbose(&self, msg: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", msg);
        }
    }
}
