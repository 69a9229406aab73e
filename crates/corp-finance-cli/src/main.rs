mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::captable::{BreakpointsArgs, ValidateArgs};

/// Cap-table waterfall breakpoint analysis with decimal precision
#[derive(Parser)]
#[command(
    name = "cfa",
    version,
    about = "Cap-table waterfall breakpoint analysis",
    long_about = "A CLI for computing capitalization-table waterfall breakpoints \
                  with decimal precision: liquidation preferences, pro-rata \
                  participation, option exercise, voluntary conversion, and \
                  participation caps."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the full set of waterfall breakpoints for a cap-table snapshot
    Breakpoints(BreakpointsArgs),
    /// Validate a cap-table snapshot's structure without computing breakpoints
    Validate(ValidateArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Breakpoints(args) => commands::captable::run_breakpoints(args),
        Commands::Validate(args) => commands::captable::run_validate(args),
        Commands::Version => {
            println!("cfa {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
