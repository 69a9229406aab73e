//! Per-class RVPS calculation and voluntary-conversion ordering (component 4.1).

use rust_decimal::Decimal;

use crate::{CorpFinanceError, CorpFinanceResult};

use super::model::{CapTableSnapshot, PreferenceType};

/// A non-participating series, ordered by the point at which it becomes
/// indifferent between keeping its preference and converting to common.
#[derive(Debug, Clone)]
pub struct ConversionCandidate {
    pub series_index: usize,
    pub name: String,
    pub class_rvps: Decimal,
    pub seniority_rank: u32,
}

/// Series convert in ascending order of class RVPS (the series that gives up
/// the least per share converts first), ties broken by more junior rank
/// first (lower liquidation priority has less to lose by converting), then
/// by name for full determinism.
pub fn conversion_order(snapshot: &CapTableSnapshot) -> CorpFinanceResult<Vec<ConversionCandidate>> {
    let mut candidates = Vec::new();

    for (index, series) in snapshot.preferred.iter().enumerate() {
        if !matches!(series.preference_type, PreferenceType::NonParticipating) {
            continue;
        }
        let class_rvps = series.class_rvps().map_err(|_| CorpFinanceError::MalformedCapTable(format!(
            "series '{}' has zero convertible (as-converted) shares",
            series.name
        )))?;
        candidates.push(ConversionCandidate {
            series_index: index,
            name: series.name.clone(),
            class_rvps,
            seniority_rank: series.seniority_rank,
        });
    }

    candidates.sort_by(|a, b| {
        a.class_rvps
            .cmp(&b.class_rvps)
            .then_with(|| b.seniority_rank.cmp(&a.seniority_rank))
            .then_with(|| a.name.cmp(&b.name))
    });

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captable::model::{CommonStock, PreferredShareClass};
    use rust_decimal_macros::dec;

    fn snapshot_with(preferred: Vec<PreferredShareClass>) -> CapTableSnapshot {
        CapTableSnapshot {
            id: "t".into(),
            snapshot_date: chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            common: CommonStock { shares: dec!(1) },
            preferred,
            options: vec![],
        }
    }

    #[test]
    fn orders_by_ascending_class_rvps() {
        let snapshot = snapshot_with(vec![
            PreferredShareClass {
                name: "B".into(),
                shares: dec!(1),
                price_per_share: dec!(10),
                liquidation_multiple: dec!(1),
                seniority_rank: 0,
                preference_type: PreferenceType::NonParticipating,
                conversion_ratio: dec!(1),
            },
            PreferredShareClass {
                name: "A".into(),
                shares: dec!(1),
                price_per_share: dec!(5),
                liquidation_multiple: dec!(1),
                seniority_rank: 1,
                preference_type: PreferenceType::NonParticipating,
                conversion_ratio: dec!(1),
            },
        ]);

        let order = conversion_order(&snapshot).unwrap();
        assert_eq!(order[0].name, "A");
        assert_eq!(order[1].name, "B");
    }

    #[test]
    fn conversion_ratio_is_divided_into_class_rvps() {
        // Both series have identical price * liquidation_multiple (10), so a
        // class RVPS that ignored conversion_ratio would treat them as tied.
        // Series "Double" converts 1-for-2, halving its class RVPS to 5 and
        // putting it ahead of "Single", whose class RVPS stays at 10.
        let snapshot = snapshot_with(vec![
            PreferredShareClass {
                name: "Single".into(),
                shares: dec!(1),
                price_per_share: dec!(10),
                liquidation_multiple: dec!(1),
                seniority_rank: 0,
                preference_type: PreferenceType::NonParticipating,
                conversion_ratio: dec!(1),
            },
            PreferredShareClass {
                name: "Double".into(),
                shares: dec!(1),
                price_per_share: dec!(10),
                liquidation_multiple: dec!(1),
                seniority_rank: 1,
                preference_type: PreferenceType::NonParticipating,
                conversion_ratio: dec!(2),
            },
        ]);

        let order = conversion_order(&snapshot).unwrap();
        assert_eq!(order[0].name, "Double");
        assert_eq!(order[0].class_rvps, dec!(5));
        assert_eq!(order[1].name, "Single");
        assert_eq!(order[1].class_rvps, dec!(10));
    }

    #[test]
    fn excludes_participating_series() {
        let snapshot = snapshot_with(vec![PreferredShareClass {
            name: "A".into(),
            shares: dec!(1),
            price_per_share: dec!(5),
            liquidation_multiple: dec!(1),
            seniority_rank: 0,
            preference_type: PreferenceType::Participating,
            conversion_ratio: dec!(1),
        }]);

        assert!(conversion_order(&snapshot).unwrap().is_empty());
    }
}
