//! Funding-rate spread estimator.
//!
//! Pure arithmetic over two normalized snapshots; no I/O, no error paths.

use crate::models::MarketSnapshot;
use serde::Serialize;

/// Spreads closer to zero than this are treated as no opportunity.
pub const MIN_SPREAD: f64 = 1e-6;

/// Recommended position direction across the two venues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Venue A pays the higher rate: collect the spread short A, long B.
    ShortALongB,
    /// Venue B pays the higher rate: the reverse.
    LongAShortB,
    /// Rates are identical within tolerance.
    None,
}

/// Everything the report needs, computed once.
#[derive(Debug, Clone, Serialize)]
pub struct SpreadEstimate {
    pub funding_a: f64,
    pub funding_b: f64,
    pub funding_diff: f64,
    pub avg_mid: Option<f64>,
    pub position_usd: f64,
    pub profit_estimate: f64,
    pub direction: Direction,
}

/// Combine two venue snapshots and a position notional into an estimate.
///
/// `avg_mid` is the mean of whichever mids are present; absent (never zero)
/// when neither venue produced a price.
pub fn estimate(a: &MarketSnapshot, b: &MarketSnapshot, position_usd: f64) -> SpreadEstimate {
    let funding_diff = a.funding_rate - b.funding_rate;

    let avg_mid = match (a.mid_price, b.mid_price) {
        (Some(x), Some(y)) => Some((x + y) / 2.0),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    };

    let direction = if funding_diff.abs() < MIN_SPREAD {
        Direction::None
    } else if funding_diff > 0.0 {
        Direction::ShortALongB
    } else {
        Direction::LongAShortB
    };

    SpreadEstimate {
        funding_a: a.funding_rate,
        funding_b: b.funding_rate,
        funding_diff,
        avg_mid,
        position_usd,
        profit_estimate: position_usd * funding_diff,
        direction,
    }
}
