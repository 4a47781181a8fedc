//! Convert command implementation

use anyhow::{Context as _, Result};
use rp_plan::load_plan;
use std::fs;
use std::path::Path;

use crate::cli::{ConvertArgs, GlobalArgs};
use crate::context::Context;

/// Execute the convert command
pub fn execute(args: &ConvertArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = Context::load(global)?;

    let plan = load_plan(Path::new(&args.plan))
        .with_context(|| format!("Failed to load plan from {}", args.plan))?;
    ctx.verbose(&format!(
        "Loaded {} plan with {} levels from {}",
        plan.kind_name(),
        plan.depth(),
        args.plan
    ));

    let sql = if args.check {
        ctx.converter.convert_and_validate(&plan)
    } else {
        ctx.converter.convert(&plan)
    }
    .with_context(|| format!("Failed to convert {}", args.plan))?;

    match &args.output {
        Some(path) => {
            fs::write(path, format!("{sql}\n"))
                .with_context(|| format!("Failed to write SQL to {path}"))?;
            ctx.verbose(&format!("Wrote {} bytes to {path}", sql.len() + 1));
        }
        None => println!("{sql}"),
    }
    Ok(())
}
