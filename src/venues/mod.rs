//! Venue adapters: normalize heterogeneous venue payloads into `MarketSnapshot`.
//!
//! Venues rename and restructure fields across API versions, so every logical
//! attribute is resolved through an ordered chain of candidate field names.
//! A candidate that is present but of the wrong shape counts as absent and the
//! chain moves on; only a fully exhausted chain for a *required* attribute
//! fails the call.

pub mod hyperliquid;
pub mod lighter;

pub use hyperliquid::HyperliquidVenue;
pub use lighter::LighterVenue;

use crate::models::MarketSnapshot;
use crate::transport::FetchError;
use async_trait::async_trait;
use serde_json::Value;

/// Candidate field names for the market symbol on a per-market object.
pub const SYMBOL_KEYS: &[&str] = &["symbol", "market", "name", "pair", "coin", "asset"];

/// Candidate field names for the funding rate.
pub const FUNDING_KEYS: &[&str] = &["fundingRate", "funding_rate", "funding"];

/// Candidate field names for a directly-provided mid price.
pub const MID_KEYS: &[&str] = &["midPx", "mid_price", "mid"];

/// Candidate field names for a mark price, tried after the mid chain.
pub const MARK_KEYS: &[&str] = &["markPx", "mark_price", "markPrice", "mark"];

/// A venue's public market-data surface, reduced to one operation.
#[async_trait]
pub trait Venue: Send + Sync {
    /// Stable lowercase venue name, used in diagnostics and errors.
    fn name(&self) -> &'static str;

    /// Fetch and normalize the current snapshot for `market`.
    ///
    /// The symbol is case-insensitive; adapters uppercase it before matching.
    /// A missing price degrades to `mid_price: None`; a missing symbol or
    /// funding rate fails the whole call.
    async fn fetch_snapshot(&self, market: &str) -> Result<MarketSnapshot, FetchError>;
}

/// Coerce a JSON value to a finite float. Venues serialize numbers both as
/// JSON numbers and as decimal strings.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

/// First candidate key on `obj` whose value coerces to a finite float.
pub fn first_f64(obj: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| obj.get(k).and_then(coerce_f64))
}

/// First candidate key on `obj` with a non-empty string value.
pub fn first_str<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|k| obj.get(k).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
}

/// Whether a per-market object identifies itself as `symbol` under any of the
/// known symbol keys. `symbol` must already be uppercased.
pub fn matches_symbol(entry: &Value, symbol: &str) -> bool {
    first_str(entry, SYMBOL_KEYS).is_some_and(|s| s.eq_ignore_ascii_case(symbol))
}

/// Price of a single book level. Accepts `[px, sz]` pairs and
/// `{"px": ...}` / `{"price": ...}` objects.
pub fn level_price(level: &Value) -> Option<f64> {
    if let Some(arr) = level.as_array() {
        return arr.first().and_then(coerce_f64);
    }
    first_f64(level, &["px", "price"])
}

/// Mid price from two sides of a book: mean of best bid and best ask.
/// Empty or malformed sides yield `None`, never a panic.
pub fn mid_from_sides(bids: &Value, asks: &Value) -> Option<f64> {
    let best_bid = bids.as_array().and_then(|b| b.first()).and_then(level_price)?;
    let best_ask = asks.as_array().and_then(|a| a.first()).and_then(level_price)?;
    Some((best_bid + best_ask) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerce_accepts_numbers_and_numeric_strings() {
        assert_eq!(coerce_f64(&json!(0.0001)), Some(0.0001));
        assert_eq!(coerce_f64(&json!("0.0001")), Some(0.0001));
        assert_eq!(coerce_f64(&json!(" 42.5 ")), Some(42.5));
        assert_eq!(coerce_f64(&json!("not a number")), None);
        assert_eq!(coerce_f64(&json!(null)), None);
        assert_eq!(coerce_f64(&json!([1.0])), None);
        assert_eq!(coerce_f64(&json!("NaN")), None);
    }

    #[test]
    fn first_f64_respects_candidate_order() {
        let obj = json!({"funding_rate": "0.002", "fundingRate": 0.001});
        assert_eq!(first_f64(&obj, FUNDING_KEYS), Some(0.001));
    }

    #[test]
    fn first_f64_skips_uncoercible_candidates() {
        let obj = json!({"fundingRate": "n/a", "funding": "0.0003"});
        assert_eq!(first_f64(&obj, FUNDING_KEYS), Some(0.0003));
    }

    #[test]
    fn matches_symbol_is_case_insensitive_and_probes_aliases() {
        assert!(matches_symbol(&json!({"coin": "eth"}), "ETH"));
        assert!(matches_symbol(&json!({"market": "BTC"}), "BTC"));
        assert!(!matches_symbol(&json!({"symbol": "SOL"}), "ETH"));
        assert!(!matches_symbol(&json!({"volume": 12.0}), "ETH"));
    }

    #[test]
    fn level_price_handles_pair_and_object_shapes() {
        assert_eq!(level_price(&json!(["1850.5", "3.2"])), Some(1850.5));
        assert_eq!(level_price(&json!({"px": "1850.5", "sz": "3.2"})), Some(1850.5));
        assert_eq!(level_price(&json!({"price": 1850.5})), Some(1850.5));
        assert_eq!(level_price(&json!([])), None);
        assert_eq!(level_price(&json!({"sz": "3.2"})), None);
    }

    #[test]
    fn mid_from_sides_requires_both_sides() {
        let bids = json!([["100.0", "1"]]);
        let asks = json!([["102.0", "1"]]);
        assert_eq!(mid_from_sides(&bids, &asks), Some(101.0));
        assert_eq!(mid_from_sides(&bids, &json!([])), None);
        assert_eq!(mid_from_sides(&json!(null), &asks), None);
    }
}
