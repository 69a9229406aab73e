//! Component 4.6: Participation-Cap Analyzer.
//!
//! A participating-with-cap series behaves like ordinary participating
//! preferred until its cumulative proceeds (its own LP plus its pro-rata
//! share) reach `cap_multiple * LP`, at which point it stops participating
//! and its shares leave the pool for every later exit value. Solved with the
//! same segment-based solver as option exercise, over a pool that already
//! reflects every earlier option exercise and voluntary conversion; multiple
//! capped series are processed in a fixed (name) order, each removing its
//! own shares from the pool before the next is solved, so their interaction
//! is deterministic.

use rust_decimal::Decimal;

use crate::captable::audit::AuditLog;
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
    growth_points: &[(Decimal, Decimal)],
    prior_id: &str,
    audit: &mut AuditLog,
) -> CorpFinanceResult<Vec<RangeBasedBreakpoint>> {
    let mut segments = vec![PoolSegment { start: pro_rata_from, pool: pro_rata_pool }];
    for &(v, added) in growth_points {
        let pool = segments.last().unwrap().pool + added;
        segments.push(PoolSegment { start: v, pool });
    }

    let mut capped: Vec<usize> = snapshot
        .preferred
        .iter()
        .enumerate()
        .filter(|(_, s)| s.preference_type.cap_multiple().is_some())
        .map(|(i, _)| i)
        .collect();
    capped.sort_by(|&a, &b| snapshot.preferred[a].name.cmp(&snapshot.preferred[b].name));

    let mut breakpoints = Vec::new();
    let mut previous_id = prior_id.to_string();

    for index in capped {
        let series = &snapshot.preferred[index];
        let cap_multiple = series.preference_type.cap_multiple().unwrap();
        let series_lp = series.total_lp();
        let cap_amount = cap_multiple * series_lp;
        let as_converted = series.as_converted_shares();

        let target_prorata_dollars = cap_amount - series_lp;
        if target_prorata_dollars <= Decimal::ZERO || as_converted.is_zero() {
            audit.warn(
                "participation_cap",
                format!("series '{}' cap is already satisfied by its own LP, skipping", series.name),
            );
            continue;
        }
        let required_cum_rvps = target_prorata_dollars / as_converted;

        match solve_for_cumulative_rvps(&segments, required_cum_rvps, "participation_cap") {
            Ok(solved) => {
                let id = format!("cap-{}", series.name);
                let mut participant = placeholder_participant(
                    series.name.clone(),
                    SecurityType::PreferredSeries,
                    as_converted,
                    ParticipationStatus::Capped,
                );
                participant.cumulative_value = cap_amount;

                audit.info(
                    "participation_cap",
                    format!(
                        "series '{}' hits its {}x cap ({}) at exit value {} after {} iteration(s) via {}",
                        series.name, cap_multiple, cap_amount, solved.exit_value, solved.iterations, solved.method
                    ),
                );

                breakpoints.push(RangeBasedBreakpoint {
                    id: id.clone(),
                    breakpoint_type: BreakpointType::ParticipationCap,
                    order: 0,
                    range_from: solved.exit_value,
                    range_to: None,
                    is_open_ended: true,
                    total_participating_shares: as_converted,
                    section_rvps: Decimal::ZERO,
                    participants: vec![participant],
                    dependencies: vec![previous_id.clone()],
                    affected_securities: vec![series.name.clone()],
                    priority_order: 4000 + index as i64,
                    explanation: format!(
                        "Series '{}' stops participating once its total proceeds reach {}x its liquidation preference.",
                        series.name, cap_multiple
                    ),
                    mathematical_derivation: format!(
                        "solve LP + shares * cumulative_rvps(v) = cap_multiple * LP for v; LP = {}, cap = {}, converged at v = {} in {} iteration(s) via {}",
                        series_lp, cap_amount, solved.exit_value, solved.iterations, solved.method
                    ),
                    metadata: serde_json::json!({
                        "cap_multiple": cap_multiple,
                        "cap_amount": cap_amount,
                        "iterations": solved.iterations,
                        "method": solved.method,
                    }),
                });

                let pool_after = segments.last().unwrap().pool - as_converted;
                segments.push(PoolSegment { start: solved.exit_value, pool: pool_after });
                previous_id = id;
            }
            Err(err) => {
                audit.warn(
                    "participation_cap",
                    format!("series '{}' cap did not converge, omitting breakpoint: {}", series.name, err),
                );
            }
        }
    }

    Ok(breakpoints)
}
