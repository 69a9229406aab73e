//! Component 4.4: Option-Exercise Analyzer.
//!
//! Each distinct strike above the fold threshold is its own circular
//! dependency: the exit value at which the option pool is in the money
//! depends on the per-share value common receives, which itself depends on
//! how many shares (including already-exercised pools) are sharing the pool.
//! Solved via [`solver::solve_for_cumulative_rvps`] seeded analytically and
//! confirmed with Newton-Raphson; divergence is logged and the candidate
//! breakpoint is skipped rather than failing the whole analysis.

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::captable::audit::AuditLog;
use crate::captable::constants::OPTION_FOLD_THRESHOLD;
use crate::captable::model::{
    BreakpointType, CapTableSnapshot, ParticipationStatus, RangeBasedBreakpoint, SecurityType,
};
use crate::captable::solver::{solve_for_cumulative_rvps, PoolSegment};
use crate::CorpFinanceResult;

use super::placeholder_participant;

pub fn analyze(
    snapshot: &CapTableSnapshot,
    pro_rata_from: Decimal,
    pro_rata_pool: Decimal,
    pro_rata_id: &str,
    audit: &mut AuditLog,
) -> CorpFinanceResult<Vec<RangeBasedBreakpoint>> {
    let mut by_strike: BTreeMap<Decimal, (Decimal, Vec<String>)> = BTreeMap::new();
    for option in &snapshot.options {
        if option.strike_price <= OPTION_FOLD_THRESHOLD {
            continue;
        }
        let entry = by_strike.entry(option.strike_price).or_insert((Decimal::ZERO, Vec::new()));
        entry.0 += option.options;
        entry.1.push(option.pool_name.clone());
    }

    let mut breakpoints = Vec::new();
    let mut segments = vec![PoolSegment { start: pro_rata_from, pool: pro_rata_pool }];
    let mut previous_id = pro_rata_id.to_string();

    for (strike, (shares, pool_names)) in by_strike {
        match solve_for_cumulative_rvps(&segments, strike, "option_exercise") {
            Ok(solved) => {
                let id = format!("option-exercise-{}", strike);
                let mut participant = placeholder_participant(
                    pool_names.join("+"),
                    SecurityType::OptionPool,
                    shares,
                    ParticipationStatus::Exercised,
                );
                participant.rvps_at_breakpoint = strike;

                audit.info(
                    "option_exercise",
                    format!(
                        "strike {} exercises at exit value {} after {} iteration(s) via {}",
                        strike, solved.exit_value, solved.iterations, solved.method
                    ),
                );

                breakpoints.push(RangeBasedBreakpoint {
                    id: id.clone(),
                    breakpoint_type: BreakpointType::OptionExercise,
                    order: 0,
                    range_from: solved.exit_value,
                    range_to: None,
                    is_open_ended: true,
                    total_participating_shares: shares,
                    section_rvps: Decimal::ZERO,
                    participants: vec![participant],
                    dependencies: vec![previous_id.clone()],
                    affected_securities: pool_names,
                    priority_order: 2000 + (strike * Decimal::from(100)).round_dp(0).to_i64().unwrap_or(0),
                    explanation: format!(
                        "Options struck at {} are in the money once common's cumulative per-share proceeds reach the strike.",
                        strike
                    ),
                    mathematical_derivation: format!(
                        "solve cumulative_rvps(v) = {} over the pro-rata pool (growing with each earlier exercise); converged at v = {} in {} iteration(s) via {}",
                        strike, solved.exit_value, solved.iterations, solved.method
                    ),
                    metadata: serde_json::json!({
                        "strike": strike,
                        "iterations": solved.iterations,
                        "method": solved.method,
                    }),
                });

                segments.push(PoolSegment { start: solved.exit_value, pool: segments.last().unwrap().pool + shares });
                previous_id = id;
            }
            Err(err) => {
                audit.warn(
                    "option_exercise",
                    format!("strike {} did not converge, omitting breakpoint: {}", strike, err),
                );
            }
        }
    }

    Ok(breakpoints)
}
