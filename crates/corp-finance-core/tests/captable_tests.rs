use corp_finance_core::captable::{
    analyze, analyzers::option_exercise, audit::AuditLog, BreakpointType, CapTableSnapshot, CommonStock,
    OptionGrant, ParticipationStatus, PreferenceType, PreferredShareClass,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date() -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
}

fn preferred(
    name: &str,
    shares: Decimal,
    price: Decimal,
    mult: Decimal,
    rank: u32,
    preference_type: PreferenceType,
    conversion_ratio: Decimal,
) -> PreferredShareClass {
    PreferredShareClass {
        name: name.to_string(),
        shares,
        price_per_share: price,
        liquidation_multiple: mult,
        seniority_rank: rank,
        preference_type,
        conversion_ratio,
    }
}

/// Scenario A: single non-participating series, simple conversion.
#[test]
fn scenario_a_simple_non_participating_conversion() {
    let snapshot = CapTableSnapshot {
        id: "scenario-a".into(),
        snapshot_date: date(),
        common: CommonStock { shares: dec!(10_000_000) },
        preferred: vec![preferred(
            "Series A",
            dec!(2_000_000),
            dec!(5),
            dec!(1),
            0,
            PreferenceType::NonParticipating,
            dec!(1),
        )],
        options: vec![],
    };

    let output = analyze(&snapshot);
    let analysis = &output.result;
    assert!(analysis.success, "{:?}", analysis.breakpoint_report);

    let bps = &analysis.breakpoints;
    assert_eq!(bps.len(), 3);

    assert_eq!(bps[0].breakpoint_type, BreakpointType::LiquidationPreference);
    assert_eq!(bps[0].range_from, dec!(0));
    assert_eq!(bps[0].range_to, Some(dec!(10_000_000)));
    assert_eq!(bps[0].participants[0].participation_percentage, dec!(1));
    assert_eq!(bps[0].participants[0].rvps_at_breakpoint, dec!(5));

    assert_eq!(bps[1].breakpoint_type, BreakpointType::ProRataDistribution);
    assert_eq!(bps[1].range_from, dec!(10_000_000));
    assert_eq!(bps[1].range_to, Some(dec!(60_000_000)));

    assert_eq!(bps[2].breakpoint_type, BreakpointType::VoluntaryConversion);
    assert_eq!(bps[2].range_from, dec!(60_000_000));
    assert!(bps[2].is_open_ended);

    let common = bps[2].participants.iter().find(|p| p.security_name == "Common").unwrap();
    let series_a = bps[2].participants.iter().find(|p| p.security_name == "Series A").unwrap();
    assert_eq!(common.participation_percentage, dec!(10_000_000) / dec!(12_000_000));
    assert_eq!(series_a.participation_percentage, dec!(2_000_000) / dec!(12_000_000));
    assert_eq!(series_a.status, ParticipationStatus::Converted);

    // At its own indifference point, converting must be worth exactly what
    // holding the liquidation preference was worth — the cumulative value
    // carried into the (open-ended) conversion breakpoint is the $10,000,000
    // it would have received at its liquidation preference, not zero.
    assert_eq!(series_a.cumulative_value, dec!(10_000_000));
    assert_eq!(series_a.cumulative_rvps, dec!(5));
}

/// Scenario B: one participating senior series, one non-participating junior
/// series that converts.
///
/// The indifference value below follows the spec's own formula
/// `V = RemainingLP_k + SeriesLP_k / P_k` with `RemainingLP_k` computed as
/// total preferred LP minus LP waived by earlier conversions minus this
/// series' own LP (the formulation validated exactly against Scenario A,
/// where it alone reproduces the spec's stated 60,000,000). Applying that
/// same formula here gives 67,000,000, not the 70,000,000 quoted in the
/// narrative scenario text — which would require using SeriesLP_k in place
/// of RemainingLP_k, inconsistent with how Scenario A's own number is
/// derived. The internally consistent value is asserted here.
#[test]
fn scenario_b_participating_senior_and_converting_junior() {
    let snapshot = CapTableSnapshot {
        id: "scenario-b".into(),
        snapshot_date: date(),
        common: CommonStock { shares: dec!(5_000_000) },
        preferred: vec![
            preferred("Series A", dec!(1_000_000), dec!(2), dec!(1), 1, PreferenceType::Participating, dec!(1)),
            preferred("Series B", dec!(500_000), dec!(10), dec!(1), 0, PreferenceType::NonParticipating, dec!(1)),
        ],
        options: vec![],
    };

    let output = analyze(&snapshot);
    let analysis = &output.result;
    assert!(analysis.success, "{:?}", analysis.breakpoint_report);

    let pro_rata = analysis
        .breakpoints
        .iter()
        .find(|b| b.breakpoint_type == BreakpointType::ProRataDistribution)
        .unwrap();
    assert_eq!(pro_rata.range_from, dec!(7_000_000));
    assert_eq!(pro_rata.total_participating_shares, dec!(6_000_000));

    let conversion = analysis
        .breakpoints
        .iter()
        .find(|b| b.breakpoint_type == BreakpointType::VoluntaryConversion)
        .unwrap();
    assert_eq!(conversion.range_from, dec!(67_000_000));
    assert_eq!(conversion.affected_securities, vec!["Series B".to_string()]);

    // Series A is participating: it collects its own LP first ($2,000,000
    // total across the LP breakpoint), then keeps accruing pro-rata dollars
    // on top of that once the pro-rata range opens. Its cumulative value at
    // the pro-rata breakpoint must be the sum of both, not just the
    // pro-rata-only share.
    let series_a_pro_rata = pro_rata.participants.iter().find(|p| p.security_name == "Series A").unwrap();
    assert_eq!(series_a_pro_rata.cumulative_value, dec!(12_000_000));
    assert_eq!(series_a_pro_rata.cumulative_rvps, dec!(12));
}

/// Scenario C: one non-participating series, one folded option pool (strike
/// at the fold threshold) and one option pool above it.
#[test]
fn scenario_c_option_exercise_and_folding() {
    let snapshot = CapTableSnapshot {
        id: "scenario-c".into(),
        snapshot_date: date(),
        common: CommonStock { shares: dec!(10_000_000) },
        preferred: vec![preferred(
            "Series A",
            dec!(2_000_000),
            dec!(1),
            dec!(1),
            0,
            PreferenceType::NonParticipating,
            dec!(1),
        )],
        options: vec![
            OptionGrant {
                pool_name: "pool-1".into(),
                options: dec!(1_000_000),
                strike_price: dec!(0.005),
                vested: dec!(1_000_000),
            },
            OptionGrant {
                pool_name: "pool-2".into(),
                options: dec!(500_000),
                strike_price: dec!(1.25),
                vested: dec!(500_000),
            },
        ],
    };

    let output = analyze(&snapshot);
    let analysis = &output.result;
    assert!(analysis.success, "{:?}", analysis.breakpoint_report);

    let by_type = |t: BreakpointType| analysis.breakpoints.iter().filter(|b| b.breakpoint_type == t).count();
    assert_eq!(by_type(BreakpointType::LiquidationPreference), 1);
    assert_eq!(by_type(BreakpointType::ProRataDistribution), 1);
    assert_eq!(by_type(BreakpointType::OptionExercise), 1);
    assert_eq!(by_type(BreakpointType::VoluntaryConversion), 1);

    let pro_rata = analysis
        .breakpoints
        .iter()
        .find(|b| b.breakpoint_type == BreakpointType::ProRataDistribution)
        .unwrap();
    // Common (10,000,000) + folded pool-1 (1,000,000), pool-2 excluded (not folded).
    assert_eq!(pro_rata.total_participating_shares, dec!(11_000_000));

    let option_bp = analysis
        .breakpoints
        .iter()
        .find(|b| b.breakpoint_type == BreakpointType::OptionExercise)
        .unwrap();
    assert_eq!(option_bp.range_from, dec!(15_750_000));
}

/// Scenario D: a divergent option-exercise candidate is skipped rather than
/// failing the whole analysis. An empty participating pool can't occur via
/// the full pipeline (common shares must be positive), so divergence is
/// exercised directly at the analyzer boundary instead.
#[test]
fn scenario_d_solver_divergence_is_non_fatal() {
    let snapshot = CapTableSnapshot {
        id: "scenario-d".into(),
        snapshot_date: date(),
        common: CommonStock { shares: dec!(1) },
        preferred: vec![],
        options: vec![OptionGrant {
            pool_name: "pool-1".into(),
            options: dec!(100),
            strike_price: dec!(5),
            vested: dec!(100),
        }],
    };

    let mut audit = AuditLog::new();
    // Force a zero-pool base directly rather than through the pro-rata
    // analyzer, to exercise the non-fatal skip path deterministically.
    let result = option_exercise::analyze(&snapshot, Decimal::ZERO, Decimal::ZERO, "pro-rata", &mut audit);
    let breakpoints = result.expect("analyzer itself must not error out");
    assert!(breakpoints.is_empty());
    assert!(audit.warnings().iter().any(|w| w.contains("did not converge")));
}

/// Scenario E: participating-with-cap series.
#[test]
fn scenario_e_participation_cap() {
    let snapshot = CapTableSnapshot {
        id: "scenario-e".into(),
        snapshot_date: date(),
        common: CommonStock { shares: dec!(8_000_000) },
        preferred: vec![preferred(
            "Series A",
            dec!(2_000_000),
            dec!(1),
            dec!(1),
            0,
            PreferenceType::ParticipatingWithCap { cap_multiple: dec!(3) },
            dec!(1),
        )],
        options: vec![],
    };

    let output = analyze(&snapshot);
    let analysis = &output.result;
    assert!(analysis.success, "{:?}", analysis.breakpoint_report);

    let cap_bp = analysis
        .breakpoints
        .iter()
        .find(|b| b.breakpoint_type == BreakpointType::ParticipationCap)
        .unwrap();
    assert_eq!(cap_bp.range_from, dec!(22_000_000));

    let last = analysis.breakpoints.last().unwrap();
    assert!(last.is_open_ended);
    // Series A has left the pool; only Common remains.
    assert_eq!(last.participants.iter().filter(|p| p.status == ParticipationStatus::Active).count(), 1);
}

/// Scenario F: breakpoint computation does not depend on the order preferred
/// series are listed in.
#[test]
fn scenario_f_determinism_under_permutation() {
    let make = |reversed: bool| {
        let mut preferred = vec![
            preferred("Series A", dec!(1_000_000), dec!(2), dec!(1), 1, PreferenceType::Participating, dec!(1)),
            preferred("Series B", dec!(500_000), dec!(10), dec!(1), 0, PreferenceType::NonParticipating, dec!(1)),
        ];
        if reversed {
            preferred.reverse();
        }
        CapTableSnapshot {
            id: "scenario-f".into(),
            snapshot_date: date(),
            common: CommonStock { shares: dec!(5_000_000) },
            preferred,
            options: vec![],
        }
    };

    let forward = analyze(&make(false));
    let reversed = analyze(&make(true));

    assert_eq!(forward.result.breakpoints.len(), reversed.result.breakpoints.len());
    for (a, b) in forward.result.breakpoints.iter().zip(reversed.result.breakpoints.iter()) {
        assert_eq!(a.breakpoint_type, b.breakpoint_type);
        assert_eq!(a.range_from, b.range_from);
        assert_eq!(a.range_to, b.range_to);
    }
}

/// Round-trip serialization: a snapshot survives a JSON encode/decode cycle
/// and analyzes identically.
#[test]
fn snapshot_round_trips_through_json() {
    let snapshot = CapTableSnapshot {
        id: "round-trip".into(),
        snapshot_date: date(),
        common: CommonStock { shares: dec!(10_000_000) },
        preferred: vec![preferred(
            "Series A",
            dec!(2_000_000),
            dec!(5),
            dec!(1),
            0,
            PreferenceType::NonParticipating,
            dec!(1),
        )],
        options: vec![],
    };

    let json = serde_json::to_string(&snapshot).unwrap();
    let restored: CapTableSnapshot = serde_json::from_str(&json).unwrap();

    let original_result = analyze(&snapshot);
    let restored_result = analyze(&restored);
    assert_eq!(original_result.result.breakpoints.len(), restored_result.result.breakpoints.len());
}

/// Invariant: every breakpoint after the first connects exactly to the
/// previous one's end, and exactly one breakpoint is open-ended.
#[test]
fn breakpoints_are_contiguous_with_single_open_end() {
    let snapshot = CapTableSnapshot {
        id: "contiguity".into(),
        snapshot_date: date(),
        common: CommonStock { shares: dec!(8_000_000) },
        preferred: vec![preferred(
            "Series A",
            dec!(2_000_000),
            dec!(1),
            dec!(1),
            0,
            PreferenceType::ParticipatingWithCap { cap_multiple: dec!(3) },
            dec!(1),
        )],
        options: vec![],
    };

    let output = analyze(&snapshot);
    let bps = &output.result.breakpoints;

    let open_ended: Vec<_> = bps.iter().filter(|b| b.is_open_ended).collect();
    assert_eq!(open_ended.len(), 1);
    assert!(bps.last().unwrap().is_open_ended);

    for window in bps.windows(2) {
        assert_eq!(window[0].range_to, Some(window[1].range_from));
    }
}
