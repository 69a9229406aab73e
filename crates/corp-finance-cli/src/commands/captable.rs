use clap::Args;
use corp_finance_core::captable::{validators, CapTableSnapshot};

use crate::input::{file, stdin};

#[derive(Args)]
pub struct BreakpointsArgs {
    /// Path to a JSON cap-table snapshot file. If omitted, reads from stdin.
    pub input: Option<String>,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Path to a JSON cap-table snapshot file. If omitted, reads from stdin.
    pub input: Option<String>,
}

fn load_snapshot(input: &Option<String>) -> Result<CapTableSnapshot, Box<dyn std::error::Error>> {
    if let Some(path) = input {
        return file::read_json(path);
    }
    match stdin::read_stdin()? {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Err("no input provided: pass --input <file.json> or pipe a snapshot on stdin".into()),
    }
}

pub fn run_breakpoints(args: BreakpointsArgs) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let snapshot = load_snapshot(&args.input)?;
    let output = corp_finance_core::captable::analyze(&snapshot);
    Ok(serde_json::to_value(output)?)
}

pub fn run_validate(args: ValidateArgs) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let snapshot = load_snapshot(&args.input)?;
    let report = validators::validate_cap_table(&snapshot);
    Ok(serde_json::to_value(report)?)
}
