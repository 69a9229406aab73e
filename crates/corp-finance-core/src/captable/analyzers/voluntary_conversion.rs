//! Component 4.5: Voluntary-Conversion Analyzer.
//!
//! Non-participating series convert to common in ascending class-RVPS order
//! (the series that gives up the least per-share preference converts
//! first). Each conversion waives that series' own liquidation preference
//! from the remaining stack and adds its as-converted shares to the pool
//! used by every later conversion's indifference calculation.
//!
//! Per the indifference condition `SeriesLP_k = P_k * (V - RemainingLP_k)`,
//! solving for V gives `V = RemainingLP_k + SeriesLP_k / P_k` where
//! `RemainingLP_k` is the total preferred LP still unclaimed *after* this
//! series also waives its own — i.e. `TotalLP - waived-by-earlier-
//! conversions - this series' own LP`. `P_k` is computed against the running
//! pool, including every option pool already resolved by the time
//! conversions run (the spec's own note that excluding not-yet-exercised
//! options would be more precise but is "typically moot" is taken literally
//! here rather than re-derived into a timeline-aware segment model).

use rust_decimal::Decimal;

use crate::captable::audit::AuditLog;
use crate::captable::model::{
    BreakpointType, CapTableSnapshot, ParticipationStatus, RangeBasedBreakpoint, SecurityType,
};
use crate::captable::rvps::conversion_order;
use crate::{CorpFinanceError, CorpFinanceResult};

use super::placeholder_participant;

pub fn analyze(
    snapshot: &CapTableSnapshot,
    total_lp: Decimal,
    running_pool_before_conversions: Decimal,
    prior_id: &str,
    audit: &mut AuditLog,
) -> CorpFinanceResult<Vec<RangeBasedBreakpoint>> {
    let order = conversion_order(snapshot)?;
    let mut breakpoints = Vec::new();
    let mut running_pool = running_pool_before_conversions;
    let mut waived_so_far = Decimal::ZERO;
    let mut previous_id = prior_id.to_string();

    for (step, candidate) in order.iter().enumerate() {
        let series = &snapshot.preferred[candidate.series_index];
        let series_lp = series.total_lp();
        let as_converted = series.as_converted_shares();

        let remaining_lp = total_lp - waived_so_far - series_lp;
        let pool_including_self = running_pool + as_converted;
        if pool_including_self.is_zero() {
            return Err(CorpFinanceError::InternalInvariant {
                component: "voluntary_conversion".to_string(),
                detail: format!("series '{}' has zero as-converted shares and an empty pool", series.name),
            });
        }
        let p_k = as_converted / pool_including_self;
        let exit_value = remaining_lp + series_lp / p_k;

        let id = format!("conversion-{}", series.name);
        let mut participant = placeholder_participant(
            series.name.clone(),
            SecurityType::PreferredSeries,
            as_converted,
            ParticipationStatus::Converted,
        );
        participant.rvps_at_breakpoint = candidate.class_rvps;

        audit.info(
            "voluntary_conversion",
            format!(
                "series '{}' converts at exit value {} (step {}, P_k = {}, remaining LP = {})",
                series.name, exit_value, step + 1, p_k, remaining_lp
            ),
        );

        breakpoints.push(RangeBasedBreakpoint {
            id: id.clone(),
            breakpoint_type: BreakpointType::VoluntaryConversion,
            order: 0,
            range_from: exit_value,
            range_to: None,
            is_open_ended: true,
            total_participating_shares: as_converted,
            section_rvps: Decimal::ZERO,
            participants: vec![participant],
            dependencies: vec![previous_id.clone()],
            affected_securities: vec![series.name.clone()],
            priority_order: 3000 + step as i64,
            explanation: format!(
                "Series '{}' is indifferent between its liquidation preference and converting to common once per-share proceeds reach this exit value.",
                series.name
            ),
            mathematical_derivation: format!(
                "V = RemainingLP + SeriesLP / P_k = {} + {} / {} = {}",
                remaining_lp, series_lp, p_k, exit_value
            ),
            metadata: serde_json::json!({
                "conversion_step": step + 1,
                "p_k": p_k,
                "remaining_lp": remaining_lp,
            }),
        });

        running_pool += as_converted;
        waived_so_far += series_lp;
        previous_id = id;
    }

    Ok(breakpoints)
}
