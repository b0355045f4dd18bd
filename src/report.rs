//! Text rendering of a spread estimate. Presentation only; all numbers come
//! precomputed from the estimator.

use crate::spread::{Direction, SpreadEstimate};
use std::fmt::Write;

/// Render the stdout report. The percentage line is the raw per-period diff
/// scaled by 100 for display, nothing more.
pub fn render(est: &SpreadEstimate) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Hyperliquid funding: {:.6}", est.funding_a);
    let _ = writeln!(out, "Lighter funding:     {:.6}", est.funding_b);
    let _ = writeln!(
        out,
        "Funding rate diff:   {:.6} ({:.4}%)",
        est.funding_diff,
        est.funding_diff * 100.0
    );
    match est.avg_mid {
        Some(mid) => {
            let _ = writeln!(out, "Avg mid price:       {mid:.2}");
        }
        None => {
            let _ = writeln!(out, "Avg mid price:       unavailable");
        }
    }
    let _ = writeln!(out, "Position size (USD): {:.2}", est.position_usd);
    let _ = writeln!(out);

    match est.direction {
        Direction::None => {
            let _ = writeln!(out, "No arbitrage opportunity: funding rates are identical.");
        }
        direction => {
            let side = match direction {
                Direction::ShortALongB => "Short Hyperliquid / Long Lighter",
                Direction::LongAShortB => "Long Hyperliquid / Short Lighter",
                Direction::None => unreachable!(),
            };
            let _ = writeln!(
                out,
                "Arbitrage: {side}, expected funding profit = {:.2}$ per funding period",
                est.profit_estimate
            );
        }
    }

    out
}
