//! Check command implementation

use anyhow::{Context as _, Result};
use rp_sql::{PrestoSyntax, SqlSyntax};
use std::fs;

use crate::cli::{CheckArgs, GlobalArgs};
use crate::context::Context;

/// Execute the check command
pub fn execute(args: &CheckArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = Context::load(global)?;
    let sql = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file))?;

    let syntax = PrestoSyntax::new();
    ctx.verbose(&format!("Checking {} with the {} grammar", args.file, syntax.name()));
    syntax
        .check_query(sql.trim())
        .with_context(|| format!("{} is not a valid query", args.file))?;

    println!("{}: ok", args.file);
    Ok(())
}
