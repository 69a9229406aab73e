//! The five waterfall analyzers (spec components 4.2-4.6).
//!
//! Each analyzer is a pure function from (snapshot, breakpoints computed so
//! far) to zero or more new `RangeBasedBreakpoint`s. None of them populate
//! final per-segment RVPS/percentage/value figures across the whole
//! cap table — that's the finalizer's job (component 4.8). What an analyzer
//! emits here is the *shape* of its range (from, to, participants present)
//! and enough metadata to explain itself; `participation_percentage` on a
//! participant is a don't-care placeholder of `1` until finalization runs,
//! per the snapshot's own open question about that value's pre-finalization
//! meaning.

pub mod liquidation_preference;
pub mod option_exercise;
pub mod participation_cap;
pub mod pro_rata;
pub mod voluntary_conversion;

use rust_decimal::Decimal;

use super::model::{BreakpointParticipant, ParticipationStatus, SecurityType};

pub(crate) fn placeholder_participant(
    security_name: impl Into<String>,
    security_type: SecurityType,
    participating_shares: Decimal,
    status: ParticipationStatus,
) -> BreakpointParticipant {
    BreakpointParticipant {
        security_name: security_name.into(),
        security_type,
        participating_shares,
        participation_percentage: Decimal::ONE,
        rvps_at_breakpoint: Decimal::ZERO,
        cumulative_rvps: Decimal::ZERO,
        section_value: Decimal::ZERO,
        cumulative_value: Decimal::ZERO,
        status,
    }
}
