//! Component 4.8: Range-Finalization Processor.
//!
//! Connects the sequenced ranges into a contiguous timeline, and recomputes
//! every pro-rata-style range's participants from a running pool that is
//! deep-copied at each step — never a shared reference — so mutating one
//! range's participant list can never retroactively corrupt an earlier
//! range's already-finalized figures (the exact class of bug the spec warns
//! against carrying over from the original implementation).
//!
//! Liquidation-preference ranges are one-off payouts with a fixed share
//! basis and need no running-pool bookkeeping; every other range type shares
//! a single evolving pool of as-converted shares, joined by option pools and
//! converting series and left by capped-out series.

use std::collections::HashMap;

use rust_decimal::Decimal;

use super::audit::AuditLog;
use super::model::{BreakpointType, BreakpointParticipant, RangeBasedBreakpoint};
use crate::CorpFinanceResult;

pub fn finalize(mut breakpoints: Vec<RangeBasedBreakpoint>, audit: &mut AuditLog) -> CorpFinanceResult<Vec<RangeBasedBreakpoint>> {
    let len = breakpoints.len();

    for i in 0..len {
        let next_from = breakpoints.get(i + 1).map(|b| b.range_from);
        let bp = &mut breakpoints[i];
        bp.order = (i + 1) as u32;
        bp.is_open_ended = next_from.is_none();
        bp.range_to = next_from;
    }

    let mut active: Vec<BreakpointParticipant> = Vec::new();
    let mut cumulative: HashMap<String, (Decimal, Decimal)> = HashMap::new();

    for bp in breakpoints.iter_mut() {
        match bp.breakpoint_type {
            BreakpointType::LiquidationPreference => {
                // Fixed, one-off payout; the analyzer already computed the
                // final figures on the raw-share basis. Nothing to merge,
                // but every later stage that re-admits this security (as a
                // participating-as-converted series joining pro-rata, or a
                // non-participating series converting) must add to this
                // LP value rather than starting its cumulative tracker back
                // at zero, so seed the ledger from it here.
                for participant in &bp.participants {
                    cumulative.insert(
                        participant.security_name.clone(),
                        (participant.cumulative_rvps, participant.cumulative_value),
                    );
                }
            }
            BreakpointType::ParticipationCap => {
                let mut frozen = None;
                if let Some(capped_name) = bp.affected_securities.first().cloned() {
                    if let Some(pos) = active.iter().position(|p| p.security_name == capped_name) {
                        let mut outgoing = active.remove(pos);
                        outgoing.status = super::model::ParticipationStatus::Capped;
                        outgoing.participation_percentage = Decimal::ZERO;
                        frozen = Some(outgoing);
                    }
                }
                recompute_section(bp, &mut active, &mut cumulative);
                if let Some(outgoing) = frozen {
                    bp.participants.push(outgoing);
                }
            }
            BreakpointType::ProRataDistribution => {
                active = bp.participants.clone();
                recompute_section(bp, &mut active, &mut cumulative);
            }
            BreakpointType::OptionExercise | BreakpointType::VoluntaryConversion => {
                active.extend(bp.participants.iter().cloned());
                recompute_section(bp, &mut active, &mut cumulative);
            }
        }
    }

    audit.info("finalizer", format!("connected {} ranges into a contiguous timeline", breakpoints.len()));

    Ok(breakpoints)
}

fn recompute_section(
    bp: &mut RangeBasedBreakpoint,
    active: &mut Vec<BreakpointParticipant>,
    cumulative: &mut HashMap<String, (Decimal, Decimal)>,
) {
    let total_pool: Decimal = active.iter().map(|p| p.participating_shares).sum();
    let width = bp.range_to.map(|to| to - bp.range_from);

    let per_share = match width {
        Some(w) if !total_pool.is_zero() => w / total_pool,
        _ => Decimal::ZERO,
    };

    for participant in active.iter_mut() {
        participant.participation_percentage = if total_pool.is_zero() {
            Decimal::ZERO
        } else {
            participant.participating_shares / total_pool
        };
        participant.rvps_at_breakpoint = per_share;
        participant.section_value = participant.participating_shares * per_share;

        let (prev_rvps, prev_value) = cumulative.get(&participant.security_name).copied().unwrap_or_default();
        participant.cumulative_rvps = prev_rvps + per_share;
        participant.cumulative_value = prev_value + participant.section_value;
        cumulative.insert(participant.security_name.clone(), (participant.cumulative_rvps, participant.cumulative_value));
    }

    bp.total_participating_shares = total_pool;
    bp.section_rvps = per_share;
    bp.participants = active.clone();
}
