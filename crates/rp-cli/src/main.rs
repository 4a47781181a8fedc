//! rel2presto CLI - convert relational plans to Presto SQL

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod context;

use cli::Cli;
use commands::{check, convert, functions};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        cli::Commands::Convert(args) => convert::execute(args, &cli.global),
        cli::Commands::Check(args) => check::execute(args, &cli.global),
        cli::Commands::Functions(args) => functions::execute(args, &cli.global),
    }
}
