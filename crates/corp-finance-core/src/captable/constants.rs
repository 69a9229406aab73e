//! Named tolerances, codified per the distilled spec's instruction to turn
//! implicit fudge factors into constants rather than magic numbers scattered
//! through the analyzers.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Below this, a participation-percentage sum is considered to equal 1.
pub const PARTICIPATION_PERCENTAGE_TOLERANCE: Decimal = dec!(0.0001);

/// Below this, the option-exercise / participation-cap solvers consider a
/// candidate exit value converged.
pub const SOLVER_VALUE_TOLERANCE: Decimal = dec!(0.000001);

/// Hard cap on solver iterations before a `ConvergenceFailure` is raised.
pub const MAX_SOLVER_ITERATIONS: u32 = 100;

/// Option grants with a strike at or below this are treated as already
/// exercised and folded directly into common stock rather than modeled as a
/// separate option-exercise breakpoint.
pub const OPTION_FOLD_THRESHOLD: Decimal = dec!(0.01);
