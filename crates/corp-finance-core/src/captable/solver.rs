//! Circular-dependency solver shared by the option-exercise and
//! participation-cap analyzers.
//!
//! Both problems reduce to the same shape: a piecewise-linear, monotonically
//! increasing "cumulative per-share value received so far" function of exit
//! value, with breakpoints where the participating pool changes size, and a
//! target per-share value to solve for. This mirrors the teacher repo's
//! analytic-seed-then-Newton-Raphson pattern for root-finding (the same shape
//! as its IRR solver), falling back to bisection when the seed doesn't land
//! in the segment it was derived from.

use rust_decimal::Decimal;

use crate::{CorpFinanceError, CorpFinanceResult};

use super::constants::{MAX_SOLVER_ITERATIONS, SOLVER_VALUE_TOLERANCE};

/// One segment of the piecewise pool-size function: from `start` onward
/// (until the next segment's `start`, or forever for the last one) the
/// participating pool is `pool` shares.
#[derive(Debug, Clone, Copy)]
pub struct PoolSegment {
    pub start: Decimal,
    pub pool: Decimal,
}

/// Cumulative per-share value received, for a share that has participated
/// since the first segment, by the time exit value reaches `v`.
pub fn cumulative_rvps(segments: &[PoolSegment], v: Decimal) -> Decimal {
    let mut cum = Decimal::ZERO;
    for (i, seg) in segments.iter().enumerate() {
        if v <= seg.start {
            break;
        }
        let seg_end = segments.get(i + 1).map(|s| s.start).unwrap_or(v);
        let upper = seg_end.min(v);
        if upper <= seg.start {
            continue;
        }
        if seg.pool.is_zero() {
            return Decimal::MAX;
        }
        cum += (upper - seg.start) / seg.pool;
    }
    cum
}

#[derive(Debug, Clone, Copy)]
pub struct SolveResult {
    pub exit_value: Decimal,
    pub iterations: u32,
    pub method: &'static str,
}

/// Solve for the exit value `v` at which `cumulative_rvps(segments, v) ==
/// target`, given `segments` sorted ascending by `start` with the last entry
/// open-ended.
///
/// Because every candidate produced by the option-exercise and
/// participation-cap analyzers lands in the final (open) segment of the
/// piecewise function known at the time it is solved, the analytic estimate
/// computed directly from that segment's constant slope is exact, and a
/// single Newton-Raphson step confirms it. The loop and bisection fallback
/// exist for segment configurations where that isn't the case.
pub fn solve_for_cumulative_rvps(
    segments: &[PoolSegment],
    target: Decimal,
    function_name: &str,
) -> CorpFinanceResult<SolveResult> {
    let last = segments.last().ok_or_else(|| CorpFinanceError::ConvergenceFailure {
        function: function_name.to_string(),
        iterations: 0,
        last_delta: target,
    })?;

    if last.pool.is_zero() {
        return Err(CorpFinanceError::ConvergenceFailure {
            function: function_name.to_string(),
            iterations: 0,
            last_delta: target,
        });
    }

    let cum_at_last_start = cumulative_rvps(segments, last.start);
    if target < cum_at_last_start {
        return bisect(segments, target, function_name, last.start);
    }

    let mut v = last.start + (target - cum_at_last_start) * last.pool;
    let mut last_delta = Decimal::MAX;

    for iteration in 1..=MAX_SOLVER_ITERATIONS {
        let f = cumulative_rvps(segments, v) - target;
        last_delta = f.abs();
        if last_delta < SOLVER_VALUE_TOLERANCE {
            return Ok(SolveResult {
                exit_value: v,
                iterations: iteration,
                method: "newton_raphson",
            });
        }
        // df/dv within the final open segment is the constant 1/pool.
        v -= f * last.pool;
    }

    Err(CorpFinanceError::ConvergenceFailure {
        function: function_name.to_string(),
        iterations: MAX_SOLVER_ITERATIONS,
        last_delta,
    })
}

fn bisect(
    segments: &[PoolSegment],
    target: Decimal,
    function_name: &str,
    upper_bound: Decimal,
) -> CorpFinanceResult<SolveResult> {
    let mut lo = segments[0].start;
    let mut hi = upper_bound;
    let mut last_delta = Decimal::MAX;

    for iteration in 1..=MAX_SOLVER_ITERATIONS {
        let mid = lo + (hi - lo) / Decimal::TWO;
        let f = cumulative_rvps(segments, mid) - target;
        last_delta = f.abs();
        if last_delta < SOLVER_VALUE_TOLERANCE {
            return Ok(SolveResult {
                exit_value: mid,
                iterations: iteration,
                method: "bisection",
            });
        }
        if f < Decimal::ZERO {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    Err(CorpFinanceError::ConvergenceFailure {
        function: function_name.to_string(),
        iterations: MAX_SOLVER_ITERATIONS,
        last_delta,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn single_segment_is_exact_on_first_iteration() {
        let segments = vec![PoolSegment {
            start: dec!(2_000_000),
            pool: dec!(11_000_000),
        }];
        let result = solve_for_cumulative_rvps(&segments, dec!(1.25), "test").unwrap();
        assert_eq!(result.iterations, 1);
        assert_eq!(result.exit_value, dec!(15_750_000));
    }

    #[test]
    fn zero_pool_diverges() {
        let segments = vec![PoolSegment {
            start: dec!(0),
            pool: dec!(0),
        }];
        assert!(solve_for_cumulative_rvps(&segments, dec!(1), "test").is_err());
    }

    #[test]
    fn growing_pool_accumulates_across_segments() {
        let segments = vec![
            PoolSegment { start: dec!(0), pool: dec!(1_000_000) },
            PoolSegment { start: dec!(1_000_000), pool: dec!(2_000_000) },
        ];
        // First million dollars gives 1.0 rvps to the original pool.
        // The remainder needed to reach target 1.5 accrues at 1/2,000,000 per dollar.
        let result = solve_for_cumulative_rvps(&segments, dec!(1.5), "test").unwrap();
        assert_eq!(result.exit_value, dec!(2_000_000));
    }
}
