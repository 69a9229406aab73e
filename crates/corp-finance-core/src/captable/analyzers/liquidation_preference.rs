//! Component 4.2: Liquidation-Preference Analyzer.
//!
//! Groups preferred series by seniority rank and produces one closed range
//! per distinct rank with positive aggregate LP, most senior first,
//! consuming proceeds from `$0` up to the cumulative LP paid out.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::captable::model::{
    BreakpointType, CapTableSnapshot, ParticipationStatus, RangeBasedBreakpoint, SecurityType,
};
use crate::captable::audit::AuditLog;
use crate::CorpFinanceResult;

use super::placeholder_participant;

pub fn analyze(snapshot: &CapTableSnapshot, audit: &mut AuditLog) -> CorpFinanceResult<Vec<RangeBasedBreakpoint>> {
    let mut by_rank: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (index, series) in snapshot.preferred.iter().enumerate() {
        if series.total_lp() > Decimal::ZERO {
            by_rank.entry(series.seniority_rank).or_default().push(index);
        }
    }

    let mut breakpoints = Vec::new();
    let mut cumulative = Decimal::ZERO;
    let mut previous_id: Option<String> = None;

    for (rank, indices) in by_rank {
        let rank_lp: Decimal = indices.iter().map(|&i| snapshot.preferred[i].total_lp()).sum();
        let range_from = cumulative;
        let range_to = cumulative + rank_lp;

        let mut participants = Vec::with_capacity(indices.len());
        let mut affected = Vec::with_capacity(indices.len());
        for &i in &indices {
            let series = &snapshot.preferred[i];
            let mut participant = placeholder_participant(
                series.name.clone(),
                SecurityType::PreferredSeries,
                series.shares,
                ParticipationStatus::Active,
            );
            participant.participation_percentage = series.total_lp() / rank_lp;
            participant.rvps_at_breakpoint = series.price_per_share * series.liquidation_multiple;
            participant.cumulative_rvps = participant.rvps_at_breakpoint;
            participant.section_value = series.total_lp();
            participant.cumulative_value = series.total_lp();
            affected.push(series.name.clone());
            participants.push(participant);
        }

        let id = format!("lp-rank-{}", rank);
        let names: Vec<String> = affected.clone();
        let explanation = format!(
            "Seniority rank {} receives its liquidation preference ({} total) before any junior series or common.",
            rank, rank_lp
        );
        let derivation = format!(
            "range_from = {} (cumulative LP of more senior ranks), range_to = range_from + sum(shares * price_per_share * liquidation_multiple) over {:?} = {}",
            range_from, names, range_to
        );

        audit.info("liquidation_preference", format!("rank {} consumes [{}, {}]", rank, range_from, range_to));

        breakpoints.push(RangeBasedBreakpoint {
            id: id.clone(),
            breakpoint_type: BreakpointType::LiquidationPreference,
            order: 0,
            range_from,
            range_to: Some(range_to),
            is_open_ended: false,
            total_participating_shares: indices.iter().map(|&i| snapshot.preferred[i].shares).sum(),
            section_rvps: if indices.len() == 1 {
                participants[0].rvps_at_breakpoint
            } else {
                rank_lp / indices.iter().map(|&i| snapshot.preferred[i].shares).sum::<Decimal>()
            },
            participants,
            dependencies: previous_id.clone().into_iter().collect(),
            affected_securities: affected,
            priority_order: 100 + rank as i64,
            explanation,
            mathematical_derivation: derivation,
            metadata: serde_json::json!({ "seniority_rank": rank }),
        });

        previous_id = Some(id);
        cumulative = range_to;
    }

    Ok(breakpoints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captable::model::{CommonStock, PreferenceType, PreferredShareClass};
    use rust_decimal_macros::dec;

    #[test]
    fn two_ranks_are_contiguous_and_senior_first() {
        let snapshot = CapTableSnapshot {
            id: "t".into(),
            snapshot_date: chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            common: CommonStock { shares: dec!(1) },
            preferred: vec![
                PreferredShareClass {
                    name: "B".into(),
                    shares: dec!(500_000),
                    price_per_share: dec!(10),
                    liquidation_multiple: dec!(1),
                    seniority_rank: 0,
                    preference_type: PreferenceType::NonParticipating,
                    conversion_ratio: dec!(1),
                },
                PreferredShareClass {
                    name: "A".into(),
                    shares: dec!(1_000_000),
                    price_per_share: dec!(2),
                    liquidation_multiple: dec!(1),
                    seniority_rank: 1,
                    preference_type: PreferenceType::Participating,
                    conversion_ratio: dec!(1),
                },
            ],
            options: vec![],
        };

        let mut audit = AuditLog::new();
        let bps = analyze(&snapshot, &mut audit).unwrap();
        assert_eq!(bps.len(), 2);
        assert_eq!(bps[0].range_from, dec!(0));
        assert_eq!(bps[0].range_to, Some(dec!(5_000_000)));
        assert_eq!(bps[1].range_from, dec!(5_000_000));
        assert_eq!(bps[1].range_to, Some(dec!(7_000_000)));
    }
}
