//! Capitalization-table waterfall breakpoint analysis.
//!
//! Given a [`CapTableSnapshot`], [`analyze`] computes the ordered,
//! contiguous, non-overlapping set of exit-value ranges over which the
//! proceeds-distribution function changes form — accounting for liquidation
//! preferences, pro-rata participation, option exercise under circular
//! dependency, sequential voluntary conversion, and participation caps.

pub mod analyzers;
pub mod audit;
pub mod constants;
pub mod finalizer;
pub mod model;
pub mod orchestrator;
pub mod rvps;
pub mod sequencer;
pub mod solver;
pub mod validators;

pub use model::*;
pub use orchestrator::{analyze, BreakpointAnalysis, OrchestrationResult};
