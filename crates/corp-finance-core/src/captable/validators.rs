//! Component 4.9: Validators.
//!
//! Three independent passes, each returning a [`ValidationReport`] instead of
//! a `Result` — validation failures are data, not control flow, so the
//! orchestrator can always finish and hand the caller a complete diagnostic
//! picture even when the input or the computed breakpoints are unsound.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;

use super::audit::{TestResult, ValidationReport};
use super::constants::PARTICIPATION_PERCENTAGE_TOLERANCE;
use super::model::{BreakpointType, CapTableSnapshot, PreferenceType, RangeBasedBreakpoint};
use super::rvps::conversion_order;

/// Pre-analysis structural checks on the raw snapshot.
pub fn validate_cap_table(snapshot: &CapTableSnapshot) -> ValidationReport {
    let mut report = ValidationReport::new();

    if snapshot.common.shares <= Decimal::ZERO {
        report.push(TestResult::error("common_shares_positive", "common shares outstanding must be positive"));
    }

    let mut seen_names = HashSet::new();
    for series in &snapshot.preferred {
        if !seen_names.insert(series.name.clone()) {
            report.push(TestResult::error("unique_series_name", format!("duplicate preferred series name '{}'", series.name)));
        }
        if series.shares <= Decimal::ZERO {
            report.push(TestResult::error("series_shares_positive", format!("series '{}' shares outstanding must be positive", series.name)));
        }
        if series.price_per_share < Decimal::ZERO {
            report.push(TestResult::error("series_price_non_negative", format!("series '{}' price per share must not be negative", series.name)));
        }
        if series.liquidation_multiple <= Decimal::ZERO {
            report.push(TestResult::error("series_liquidation_multiple_positive", format!("series '{}' liquidation multiple must be positive", series.name)));
        }
        if series.conversion_ratio <= Decimal::ZERO {
            report.push(TestResult::error("series_conversion_ratio_positive", format!("series '{}' conversion ratio must be positive", series.name)));
        }
        if let PreferenceType::ParticipatingWithCap { cap_multiple } = series.preference_type {
            if cap_multiple <= Decimal::ONE {
                report.push(TestResult::error(
                    "participation_cap_multiple_above_one",
                    format!("series '{}' participation cap multiple must exceed 1x", series.name),
                ));
            }
        }
    }

    if !snapshot.preferred.is_empty() {
        let mut distinct_ranks: Vec<u32> = snapshot.preferred.iter().map(|s| s.seniority_rank).collect::<HashSet<_>>().into_iter().collect();
        distinct_ranks.sort_unstable();
        let contiguous = distinct_ranks.iter().enumerate().all(|(i, &rank)| rank == i as u32);
        if !contiguous {
            report.push(TestResult::error(
                "seniority_rank_contiguous",
                format!("seniority ranks must form a contiguous 0..N sequence (ties allowed), found {:?}", distinct_ranks),
            ));
        }
    }

    for option in &snapshot.options {
        if option.options <= Decimal::ZERO {
            report.push(TestResult::error("option_count_positive", format!("option pool '{}' must have positive option count", option.pool_name)));
        }
        if option.strike_price < Decimal::ZERO {
            report.push(TestResult::error("option_strike_non_negative", format!("option pool '{}' strike price must not be negative", option.pool_name)));
        }
        if option.vested > option.options {
            report.push(TestResult::error("option_vested_le_issued", format!("option pool '{}' vested exceeds issued", option.pool_name)));
        }
        if option.vested < Decimal::ZERO {
            report.push(TestResult::error("option_vested_non_negative", format!("option pool '{}' vested must not be negative", option.pool_name)));
        }
    }

    if report.results.is_empty() {
        report.push(TestResult::ok("cap_table_structure", "snapshot passed all structural checks"));
    }

    report
}

/// Post-finalization structural checks on the breakpoint sequence itself.
pub fn validate_breakpoints(breakpoints: &[RangeBasedBreakpoint]) -> ValidationReport {
    let mut report = ValidationReport::new();

    if breakpoints.is_empty() {
        report.push(TestResult::error("breakpoints_non_empty", "no breakpoints were produced"));
        return report;
    }

    let open_ended_count = breakpoints.iter().filter(|b| b.is_open_ended).count();
    if open_ended_count != 1 {
        report.push(TestResult::error(
            "exactly_one_open_ended",
            format!("expected exactly one open-ended breakpoint, found {}", open_ended_count),
        ));
    }
    if !breakpoints.last().map(|b| b.is_open_ended).unwrap_or(false) {
        report.push(TestResult::error("open_ended_is_last", "the open-ended breakpoint must be the last in sequence"));
    }

    for window in breakpoints.windows(2) {
        let (a, b) = (&window[0], &window[1]);
        if b.range_from < a.range_from {
            report.push(TestResult::error("monotonic_range_from", format!("range_from regresses between order {} and {}", a.order, b.order)));
        }
        match a.range_to {
            Some(range_to) if range_to != b.range_from => {
                report.push(TestResult::error(
                    "contiguous_ranges",
                    format!("gap or overlap between breakpoint order {} (ends {}) and order {} (starts {})", a.order, range_to, b.order, b.range_from),
                ));
            }
            None => {
                report.push(TestResult::error("contiguous_ranges", format!("breakpoint order {} is open-ended but is not last", a.order)));
            }
            _ => {}
        }
    }

    for bp in breakpoints {
        if bp.breakpoint_type == BreakpointType::LiquidationPreference {
            continue;
        }
        let sum: Decimal = bp.participants.iter().map(|p| p.participation_percentage).sum();
        if !bp.participants.is_empty() && (sum - Decimal::ONE).abs() > PARTICIPATION_PERCENTAGE_TOLERANCE {
            report.push(TestResult::warning(
                "participation_percentage_sums_to_one",
                format!("breakpoint order {} participation percentages sum to {} (expected ~1)", bp.order, sum),
            ));
        }
    }

    for (index, bp) in breakpoints.iter().enumerate() {
        if bp.order != (index + 1) as u32 {
            report.push(TestResult::error("sequential_order", format!("breakpoint at position {} has order {}", index, bp.order)));
        }
    }

    if report.results.is_empty() {
        report.push(TestResult::ok("breakpoint_structure", "breakpoint sequence passed all structural checks"));
    }

    report
}

/// Cross-breakpoint consistency checks against the original snapshot.
pub fn validate_consistency(snapshot: &CapTableSnapshot, breakpoints: &[RangeBasedBreakpoint]) -> ValidationReport {
    let mut report = ValidationReport::new();

    let total_lp: Decimal = snapshot.preferred.iter().map(|s| s.total_lp()).sum();
    if let Some(pro_rata) = breakpoints.iter().find(|b| b.breakpoint_type == BreakpointType::ProRataDistribution) {
        if pro_rata.range_from != total_lp {
            report.push(TestResult::error(
                "pro_rata_starts_at_total_lp",
                format!("pro-rata range starts at {} but total LP is {}", pro_rata.range_from, total_lp),
            ));
        }
    } else {
        report.push(TestResult::error("pro_rata_present", "no pro-rata distribution breakpoint was produced"));
    }

    let distinct_ranks: HashSet<u32> = snapshot
        .preferred
        .iter()
        .filter(|s| s.total_lp() > Decimal::ZERO)
        .map(|s| s.seniority_rank)
        .collect();
    let lp_count = breakpoints.iter().filter(|b| b.breakpoint_type == BreakpointType::LiquidationPreference).count();
    if lp_count != distinct_ranks.len() {
        report.push(TestResult::error(
            "lp_breakpoint_count",
            format!("expected {} liquidation-preference breakpoints (one per seniority rank with positive LP), found {}", distinct_ranks.len(), lp_count),
        ));
    }

    let conversion_count = breakpoints.iter().filter(|b| b.breakpoint_type == BreakpointType::VoluntaryConversion).count();
    let expected_conversions = conversion_order(snapshot).map(|c| c.len()).unwrap_or(0);
    if conversion_count != expected_conversions {
        report.push(TestResult::error(
            "voluntary_conversion_count",
            format!("expected {} voluntary-conversion breakpoints, found {}", expected_conversions, conversion_count),
        ));
    }

    let mut last_cumulative: HashMap<String, Decimal> = HashMap::new();
    for bp in breakpoints {
        for participant in &bp.participants {
            let prev = last_cumulative.entry(participant.security_name.clone()).or_insert(Decimal::ZERO);
            if participant.cumulative_rvps < *prev {
                report.push(TestResult::error(
                    "monotonic_cumulative_rvps",
                    format!("'{}' cumulative RVPS decreased at breakpoint order {}", participant.security_name, bp.order),
                ));
            }
            *prev = participant.cumulative_rvps;
        }
    }

    if report.results.is_empty() {
        report.push(TestResult::ok("breakpoint_consistency", "breakpoints are consistent with the snapshot"));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captable::model::{CommonStock, PreferredShareClass};
    use rust_decimal_macros::dec;

    fn snapshot_with_ranks(ranks: &[u32]) -> CapTableSnapshot {
        CapTableSnapshot {
            id: "t".into(),
            snapshot_date: chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            common: CommonStock { shares: dec!(1) },
            preferred: ranks
                .iter()
                .enumerate()
                .map(|(i, &rank)| PreferredShareClass {
                    name: format!("series-{}", i),
                    shares: dec!(1),
                    price_per_share: dec!(1),
                    liquidation_multiple: dec!(1),
                    seniority_rank: rank,
                    preference_type: PreferenceType::NonParticipating,
                    conversion_ratio: dec!(1),
                })
                .collect(),
            options: vec![],
        }
    }

    #[test]
    fn rejects_non_contiguous_seniority_ranks() {
        let report = validate_cap_table(&snapshot_with_ranks(&[0, 2]));
        assert!(report.has_errors());
        assert!(report.results.iter().any(|r| r.check == "seniority_rank_contiguous"));
    }

    #[test]
    fn accepts_contiguous_ranks_with_pari_passu_ties() {
        let report = validate_cap_table(&snapshot_with_ranks(&[0, 0, 1, 2]));
        assert!(!report.results.iter().any(|r| r.check == "seniority_rank_contiguous"));
    }
}
