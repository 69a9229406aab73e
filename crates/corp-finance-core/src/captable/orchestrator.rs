//! Component 4.10: Orchestrator.
//!
//! The single public entry point: `validate -> sequence -> finalize ->
//! validate -> validate -> emit`. Never panics and never propagates an
//! error out of the function signature — a malformed snapshot or an
//! internal solver failure is packaged into the result's `success` flag and
//! diagnostic reports instead, so a caller driving many snapshots never
//! needs a catch-all around this call.

use std::collections::BTreeMap;

use serde::Serialize;
use std::time::Instant;

use super::audit::{AuditLog, ValidationReport};
use super::model::{BreakpointType, CapTableSnapshot, RangeBasedBreakpoint};
use super::{finalizer, sequencer, validators};
use crate::types::{with_metadata, ComputationOutput};

#[derive(Debug, Clone, Serialize)]
pub struct BreakpointAnalysis {
    pub success: bool,
    pub breakpoints: Vec<RangeBasedBreakpoint>,
    /// Ordered human-readable trace of each analyzer's contribution, e.g.
    /// `"Liquidation Preference Analysis: 2 breakpoints"`.
    pub execution_order: Vec<String>,
    /// Breakpoint count per type, keyed by [`BreakpointType::label`].
    pub breakdown: BTreeMap<String, usize>,
    pub cap_table_report: ValidationReport,
    pub breakpoint_report: ValidationReport,
    pub consistency_report: ValidationReport,
    pub audit_log: AuditLog,
}

/// Build the execution-order trace and per-type breakdown from the final
/// breakpoint sequence, in fixed analyzer order regardless of how the
/// breakpoints were finally sorted by `priority_order`.
fn summarize(breakpoints: &[RangeBasedBreakpoint]) -> (Vec<String>, BTreeMap<String, usize>) {
    let mut breakdown = BTreeMap::new();
    let mut execution_order = Vec::new();
    for bp_type in BreakpointType::all() {
        let count = breakpoints.iter().filter(|b| b.breakpoint_type == bp_type).count();
        breakdown.insert(bp_type.label().to_string(), count);
        execution_order.push(format!("{} Analysis: {} breakpoint(s)", bp_type.label(), count));
    }
    (execution_order, breakdown)
}

pub type OrchestrationResult = ComputationOutput<BreakpointAnalysis>;

pub fn analyze(snapshot: &CapTableSnapshot) -> OrchestrationResult {
    let start = Instant::now();
    let mut audit = AuditLog::new();
    let assumptions = serde_json::json!({ "snapshot_id": snapshot.id, "snapshot_date": snapshot.snapshot_date });

    let cap_table_report = validators::validate_cap_table(snapshot);
    if cap_table_report.has_errors() {
        audit.error("orchestrator", "snapshot failed structural validation; aborting before sequencing");
        return package(
            false,
            Vec::new(),
            cap_table_report,
            ValidationReport::new(),
            ValidationReport::new(),
            audit,
            start,
            &assumptions,
        );
    }

    let sequenced = match sequencer::sequence(snapshot, &mut audit) {
        Ok(bps) => bps,
        Err(err) => {
            audit.error("orchestrator", format!("sequencing failed: {}", err));
            return package(
                false,
                Vec::new(),
                cap_table_report,
                ValidationReport::new(),
                ValidationReport::new(),
                audit,
                start,
                &assumptions,
            );
        }
    };

    let finalized = match finalizer::finalize(sequenced, &mut audit) {
        Ok(bps) => bps,
        Err(err) => {
            audit.error("orchestrator", format!("finalization failed: {}", err));
            return package(
                false,
                Vec::new(),
                cap_table_report,
                ValidationReport::new(),
                ValidationReport::new(),
                audit,
                start,
                &assumptions,
            );
        }
    };

    let breakpoint_report = validators::validate_breakpoints(&finalized);
    let consistency_report = validators::validate_consistency(snapshot, &finalized);
    let success = !breakpoint_report.has_errors() && !consistency_report.has_errors();

    if !success {
        audit.error("orchestrator", "post-finalization validation reported one or more errors");
    }

    package(success, finalized, cap_table_report, breakpoint_report, consistency_report, audit, start, &assumptions)
}

#[allow(clippy::too_many_arguments)]
fn package(
    success: bool,
    breakpoints: Vec<RangeBasedBreakpoint>,
    cap_table_report: ValidationReport,
    breakpoint_report: ValidationReport,
    consistency_report: ValidationReport,
    audit_log: AuditLog,
    start: Instant,
    assumptions: &serde_json::Value,
) -> OrchestrationResult {
    let warnings = audit_log.warnings();
    let (execution_order, breakdown) = summarize(&breakpoints);
    let analysis = BreakpointAnalysis {
        success,
        breakpoints,
        execution_order,
        breakdown,
        cap_table_report,
        breakpoint_report,
        consistency_report,
        audit_log,
    };
    with_metadata(
        "captable-waterfall-v1",
        assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        analysis,
    )
}
