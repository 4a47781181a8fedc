//! Functions command implementation: list the operator table

use anyhow::{Context as _, Result};

use crate::cli::{FunctionsArgs, GlobalArgs, OutputFormat};
use crate::context::Context;

/// Execute the functions command
pub fn execute(args: &FunctionsArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = Context::load(global)?;
    let (entries, pass_through) = ctx.converter.operators().entries();
    ctx.verbose(&format!(
        "{} rewrite rules, {} pass-through functions",
        entries.len(),
        pass_through.len()
    ));

    match args.output {
        OutputFormat::Json => {
            let rules: Vec<serde_json::Value> = entries
                .iter()
                .map(|entry| {
                    serde_json::json!({
                        "name": entry.name,
                        "arity": entry.arity.to_string(),
                        "renders_as": entry.rule.describe(),
                    })
                })
                .collect();
            let doc = serde_json::json!({
                "rules": rules,
                "pass_through": pass_through,
            });
            let text =
                serde_json::to_string_pretty(&doc).context("Failed to serialize operator table")?;
            println!("{text}");
        }
        OutputFormat::Text => {
            let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
            println!("Rewrite rules:");
            for entry in &entries {
                println!(
                    "  {:<width$}  [{}]  {}",
                    entry.name,
                    entry.arity,
                    entry.rule.describe()
                );
            }
            println!();
            println!("Pass-through functions ({}):", pass_through.len());
            for chunk in pass_through.chunks(8) {
                println!("  {}", chunk.join(", "));
            }
        }
    }
    Ok(())
}
