//! Cap-table data model: snapshot inputs and breakpoint outputs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CorpFinanceError, CorpFinanceResult};

/// How a preferred series participates in proceeds above its own liquidation
/// preference.
///
/// The cap is folded into the `ParticipatingWithCap` variant rather than kept
/// as a sibling `Option<Decimal>` field so "a cap is present iff the type is
/// capped" holds at the type level instead of needing a runtime check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PreferenceType {
    NonParticipating,
    Participating,
    ParticipatingWithCap {
        /// Multiple of the series' own liquidation preference at which its
        /// participation is capped (e.g. `3` for "3x"). Must be > 1.
        cap_multiple: Decimal,
    },
}

impl PreferenceType {
    pub fn is_participating(&self) -> bool {
        !matches!(self, PreferenceType::NonParticipating)
    }

    pub fn cap_multiple(&self) -> Option<Decimal> {
        match self {
            PreferenceType::ParticipatingWithCap { cap_multiple } => Some(*cap_multiple),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferredShareClass {
    pub name: String,
    pub shares: Decimal,
    pub price_per_share: Decimal,
    #[serde(default = "default_one")]
    pub liquidation_multiple: Decimal,
    pub seniority_rank: u32,
    pub preference_type: PreferenceType,
    #[serde(default = "default_one")]
    pub conversion_ratio: Decimal,
}

fn default_one() -> Decimal {
    Decimal::ONE
}

impl PreferredShareClass {
    /// Total liquidation preference owed to this series: shares * issue
    /// price * liquidation multiple.
    pub fn total_lp(&self) -> Decimal {
        self.shares * self.price_per_share * self.liquidation_multiple
    }

    /// Shares this series converts into, as common-equivalent.
    pub fn as_converted_shares(&self) -> Decimal {
        self.shares * self.conversion_ratio
    }

    /// Class RVPS: total LP divided by as-converted shares. Determines
    /// voluntary-conversion ordering (component 4.1) — the series with the
    /// lowest opportunity cost of giving up its LP, per as-converted share,
    /// converts first.
    pub fn class_rvps(&self) -> CorpFinanceResult<Decimal> {
        let as_converted = self.as_converted_shares();
        if as_converted.is_zero() {
            return Err(CorpFinanceError::DivisionByZero {
                context: format!("class_rvps for series '{}'", self.name),
            });
        }
        Ok(self.total_lp() / as_converted)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommonStock {
    pub shares: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionGrant {
    pub pool_name: String,
    pub options: Decimal,
    pub strike_price: Decimal,
    pub vested: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapTableSnapshot {
    pub id: String,
    pub snapshot_date: chrono::NaiveDate,
    pub common: CommonStock,
    pub preferred: Vec<PreferredShareClass>,
    #[serde(default)]
    pub options: Vec<OptionGrant>,
}

/// What kind of security is represented by one segment of a proceeds range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityType {
    Common,
    PreferredSeries,
    OptionPool,
}

/// The five points in the waterfall at which the distribution function
/// changes form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakpointType {
    LiquidationPreference,
    ProRataDistribution,
    OptionExercise,
    VoluntaryConversion,
    ParticipationCap,
}

impl BreakpointType {
    /// Human-readable label used in the orchestrator's execution-order
    /// trace and breakdown counts, e.g. `"Liquidation Preference"`.
    pub fn label(&self) -> &'static str {
        match self {
            BreakpointType::LiquidationPreference => "Liquidation Preference",
            BreakpointType::ProRataDistribution => "Pro-Rata Distribution",
            BreakpointType::OptionExercise => "Option Exercise",
            BreakpointType::VoluntaryConversion => "Voluntary Conversion",
            BreakpointType::ParticipationCap => "Participation Cap",
        }
    }

    /// All variants, in the fixed analysis order (component 4.7).
    pub fn all() -> [BreakpointType; 5] {
        [
            BreakpointType::LiquidationPreference,
            BreakpointType::ProRataDistribution,
            BreakpointType::OptionExercise,
            BreakpointType::VoluntaryConversion,
            BreakpointType::ParticipationCap,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipationStatus {
    Active,
    Capped,
    Converted,
    Exercised,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakpointParticipant {
    pub security_name: String,
    pub security_type: SecurityType,
    pub participating_shares: Decimal,
    pub participation_percentage: Decimal,
    pub rvps_at_breakpoint: Decimal,
    pub cumulative_rvps: Decimal,
    pub section_value: Decimal,
    pub cumulative_value: Decimal,
    pub status: ParticipationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeBasedBreakpoint {
    /// Stable identifier used for `dependencies` cross-references.
    pub id: String,
    pub breakpoint_type: BreakpointType,
    /// 1-based position in the finalized, contiguous sequence. Set by the
    /// finalizer; `0` before finalization.
    pub order: u32,
    pub range_from: Decimal,
    pub range_to: Option<Decimal>,
    pub is_open_ended: bool,
    pub participants: Vec<BreakpointParticipant>,
    pub total_participating_shares: Decimal,
    pub section_rvps: Decimal,
    pub dependencies: Vec<String>,
    pub affected_securities: Vec<String>,
    pub priority_order: i64,
    pub explanation: String,
    pub mathematical_derivation: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl RangeBasedBreakpoint {
    pub fn range_to_or_infinite(&self) -> Decimal {
        self.range_to.unwrap_or(Decimal::MAX)
    }
}
