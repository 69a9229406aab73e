//! Component 4.7: Analysis Sequencer.
//!
//! Runs the five analyzers in the fixed order liquidation-preference,
//! pro-rata, option-exercise, voluntary-conversion, participation-cap —
//! each building on the ranges the previous ones produced — then sorts the
//! union by `priority_order`, breaking ties by `range_from`, ready for the
//! finalizer to connect into a contiguous timeline.

use rust_decimal::Decimal;

use super::analyzers::{liquidation_preference, option_exercise, participation_cap, pro_rata, voluntary_conversion};
use super::audit::AuditLog;
use super::model::{CapTableSnapshot, RangeBasedBreakpoint};
use crate::CorpFinanceResult;

pub fn sequence(snapshot: &CapTableSnapshot, audit: &mut AuditLog) -> CorpFinanceResult<Vec<RangeBasedBreakpoint>> {
    let lp_breakpoints = liquidation_preference::analyze(snapshot, audit)?;
    let total_lp: Decimal = snapshot.preferred.iter().map(|s| s.total_lp()).sum();
    let lp_last_id = lp_breakpoints.last().map(|b| b.id.clone());

    let pro_rata_bp = pro_rata::analyze(snapshot, total_lp, lp_last_id.as_deref(), audit)?;
    let pro_rata_from = pro_rata_bp.range_from;
    let pro_rata_pool = pro_rata_bp.total_participating_shares;
    let pro_rata_id = pro_rata_bp.id.clone();

    let option_bps = option_exercise::analyze(snapshot, pro_rata_from, pro_rata_pool, &pro_rata_id, audit)?;

    let running_pool_before_conversions =
        pro_rata_pool + option_bps.iter().map(|b| b.total_participating_shares).sum::<Decimal>();
    let conversion_prior_id = option_bps.last().map(|b| b.id.clone()).unwrap_or_else(|| pro_rata_id.clone());
    let conversion_bps = voluntary_conversion::analyze(
        snapshot,
        total_lp,
        running_pool_before_conversions,
        &conversion_prior_id,
        audit,
    )?;

    let mut growth_points: Vec<(Decimal, Decimal)> = option_bps
        .iter()
        .map(|b| (b.range_from, b.total_participating_shares))
        .chain(conversion_bps.iter().map(|b| (b.range_from, b.total_participating_shares)))
        .collect();
    growth_points.sort_by(|a, b| a.0.cmp(&b.0));

    let cap_prior_id = conversion_bps.last().map(|b| b.id.clone()).unwrap_or(conversion_prior_id);
    let cap_bps = participation_cap::analyze(snapshot, pro_rata_from, pro_rata_pool, &growth_points, &cap_prior_id, audit)?;

    let mut all = Vec::with_capacity(lp_breakpoints.len() + 1 + option_bps.len() + conversion_bps.len() + cap_bps.len());
    all.extend(lp_breakpoints);
    all.push(pro_rata_bp);
    all.extend(option_bps);
    all.extend(conversion_bps);
    all.extend(cap_bps);

    all.sort_by(|a, b| a.priority_order.cmp(&b.priority_order).then_with(|| a.range_from.cmp(&b.range_from)));

    audit.info("sequencer", format!("sequenced {} breakpoints", all.len()));

    Ok(all)
}
