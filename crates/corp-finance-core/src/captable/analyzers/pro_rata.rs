//! Component 4.3: Pro-Rata Analyzer.
//!
//! Produces the single, initially open-ended range in which proceeds are
//! shared pro-rata by common, as-converted participating preferred, and any
//! option pool whose strike is at or below the fold threshold (treated as
//! already exercised). Non-participating preferred does not appear here —
//! it only joins once it converts (component 4.5).

use rust_decimal::Decimal;

use crate::captable::audit::AuditLog;
use crate::captable::constants::OPTION_FOLD_THRESHOLD;
use crate::captable::model::{
    BreakpointType, CapTableSnapshot, ParticipationStatus, PreferenceType, RangeBasedBreakpoint, SecurityType,
};
use crate::CorpFinanceResult;

use super::placeholder_participant;

pub const PRO_RATA_ID: &str = "pro-rata";

pub fn analyze(
    snapshot: &CapTableSnapshot,
    total_lp: Decimal,
    lp_breakpoint_id: Option<&str>,
    audit: &mut AuditLog,
) -> CorpFinanceResult<RangeBasedBreakpoint> {
    let mut participants = Vec::new();
    let mut affected = Vec::new();

    participants.push(placeholder_participant(
        "Common",
        SecurityType::Common,
        snapshot.common.shares,
        ParticipationStatus::Active,
    ));
    affected.push("Common".to_string());

    for option in &snapshot.options {
        if option.strike_price <= OPTION_FOLD_THRESHOLD {
            audit.info(
                "pro_rata",
                format!(
                    "option pool '{}' has strike {} <= fold threshold, folded into pro-rata base",
                    option.pool_name, option.strike_price
                ),
            );
            participants.push(placeholder_participant(
                option.pool_name.clone(),
                SecurityType::OptionPool,
                option.options,
                ParticipationStatus::Exercised,
            ));
            affected.push(option.pool_name.clone());
        }
    }

    for series in &snapshot.preferred {
        if series.preference_type.is_participating() {
            participants.push(placeholder_participant(
                series.name.clone(),
                SecurityType::PreferredSeries,
                series.as_converted_shares(),
                ParticipationStatus::Active,
            ));
            affected.push(series.name.clone());
        }
    }

    let total_participating_shares: Decimal = participants.iter().map(|p| p.participating_shares).sum();

    audit.info(
        "pro_rata",
        format!("pro-rata pool opens at {} with {} participating shares", total_lp, total_participating_shares),
    );

    Ok(RangeBasedBreakpoint {
        id: PRO_RATA_ID.to_string(),
        breakpoint_type: BreakpointType::ProRataDistribution,
        order: 0,
        range_from: total_lp,
        range_to: None,
        is_open_ended: true,
        total_participating_shares,
        section_rvps: Decimal::ZERO,
        participants,
        dependencies: lp_breakpoint_id.map(|s| s.to_string()).into_iter().collect(),
        affected_securities: affected,
        priority_order: 1000,
        explanation: "Common, as-converted participating preferred, and already-exercised options share proceeds pro-rata above total liquidation preference.".to_string(),
        mathematical_derivation: format!(
            "range_from = total LP across all preferred = {}; pool = common + folded options + participating-as-converted shares = {}",
            total_lp, total_participating_shares
        ),
        metadata: serde_json::json!({}),
    })
}
