//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// rel2presto - render relational plans as Presto SQL
#[derive(Parser, Debug)]
#[command(name = "rp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Converter config file (YAML)
    #[arg(short, long, global = true, env = "RP_CONFIG")]
    pub config: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a JSON plan file to Presto SQL
    Convert(ConvertArgs),

    /// Check that a SQL file parses as a single query
    Check(CheckArgs),

    /// List the operators and functions the converter can render
    Functions(FunctionsArgs),
}

/// Arguments for the convert command
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Plan file (JSON)
    pub plan: String,

    /// Parse the generated SQL before printing it
    #[arg(long)]
    pub check: bool,

    /// Write the SQL to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// SQL file to check
    pub file: String,
}

/// Arguments for the functions command
#[derive(Args, Debug)]
pub struct FunctionsArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
