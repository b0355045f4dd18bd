//! Lighter-style adapter.
//!
//! Lighter serves public market data over plain REST GET endpoints. The bulk
//! funding endpoint has shipped in several shapes over time: a flat list of
//! per-market objects, a map keyed by symbol, or either of those nested under
//! a wrapper key. The adapter probes each shape instead of pinning one.

use super::{coerce_f64, first_f64, matches_symbol, mid_from_sides, Venue, FUNDING_KEYS};
use crate::models::MarketSnapshot;
use crate::transport::{FetchError, JsonTransport};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

const VENUE: &str = "lighter";

/// Wrapper keys the funding payload may be nested under.
const NESTING_KEYS: &[&str] = &["data", "rates", "markets"];

pub struct LighterVenue<T> {
    base_url: String,
    transport: Arc<T>,
}

impl<T: JsonTransport> LighterVenue<T> {
    pub fn new(base_url: String, transport: Arc<T>) -> Self {
        Self {
            base_url,
            transport,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get(&self, url: &str) -> Result<Value, FetchError> {
        self.transport
            .get_json(url)
            .await
            .map_err(|e| FetchError::transport(VENUE, e))
    }

    /// Funding rate for `symbol` out of the bulk funding payload.
    fn funding_from_payload(payload: &Value, symbol: &str) -> Result<f64, FetchError> {
        let rates = unwrap_nesting(payload);

        // Flat list of per-market objects.
        if let Some(list) = rates.as_array() {
            let entry = list
                .iter()
                .find(|entry| matches_symbol(entry, symbol))
                .ok_or_else(|| FetchError::symbol_not_found(VENUE, symbol))?;
            return first_f64(entry, FUNDING_KEYS)
                .ok_or_else(|| FetchError::malformed(VENUE, "fundingRate"));
        }

        // Map keyed by symbol. The value is either a bare rate or a per-market
        // object; a single per-symbol response object is covered here too.
        if let Some(map) = rates.as_object() {
            if let Some(value) = lookup_key(map, symbol) {
                return extract_rate(value)
                    .ok_or_else(|| FetchError::malformed(VENUE, "fundingRate"));
            }
            // Per-symbol response: the object itself is the entry.
            if let Some(rate) = first_f64(rates, FUNDING_KEYS) {
                return Ok(rate);
            }
            return Err(FetchError::symbol_not_found(VENUE, symbol));
        }

        Err(FetchError::malformed(VENUE, "fundingRate"))
    }

    /// Best-effort mid from the order-book endpoint. The response is either a
    /// single book object or a list of per-symbol books to scan.
    async fn book_mid(&self, symbol: &str) -> Option<f64> {
        let url = self.url(&format!("/orderbook?symbol={symbol}"));
        let payload = match self.get(&url).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(venue = VENUE, symbol, error = %e, "order book fetch failed, price unavailable");
                return None;
            }
        };

        let book = locate_book(&payload, symbol);
        let mid = book.and_then(|b| match (b.get("bids"), b.get("asks")) {
            (Some(bids), Some(asks)) => mid_from_sides(bids, asks),
            _ => None,
        });

        if mid.is_none() {
            warn!(venue = VENUE, symbol, "order book payload yielded no mid price");
        }
        mid
    }
}

/// Follow at most one wrapper key down into the payload.
fn unwrap_nesting(payload: &Value) -> &Value {
    NESTING_KEYS
        .iter()
        .find_map(|k| payload.get(k))
        .unwrap_or(payload)
}

/// Case-insensitive lookup in a symbol-keyed map.
fn lookup_key<'a>(
    map: &'a serde_json::Map<String, Value>,
    symbol: &str,
) -> Option<&'a Value> {
    map.get(symbol)
        .or_else(|| map.iter().find(|(k, _)| k.eq_ignore_ascii_case(symbol)).map(|(_, v)| v))
}

/// Rate from a map entry: a bare number/string, or a per-market object.
fn extract_rate(value: &Value) -> Option<f64> {
    coerce_f64(value).or_else(|| first_f64(value, FUNDING_KEYS))
}

/// The requested symbol's book out of a book payload: the payload itself, an
/// entry of a top-level list, or the same nested under a wrapper key.
fn locate_book<'a>(payload: &'a Value, symbol: &str) -> Option<&'a Value> {
    let inner = unwrap_nesting(payload);
    if let Some(list) = inner.as_array() {
        // Prefer the book tagged with the symbol; a single-book list without
        // symbol tags is accepted as-is.
        return list
            .iter()
            .find(|book| matches_symbol(book, symbol))
            .or_else(|| if list.len() == 1 { list.first() } else { None });
    }
    Some(inner)
}

#[async_trait]
impl<T: JsonTransport> Venue for LighterVenue<T> {
    fn name(&self) -> &'static str {
        VENUE
    }

    async fn fetch_snapshot(&self, market: &str) -> Result<MarketSnapshot, FetchError> {
        let symbol = market.trim().to_ascii_uppercase();

        let url = self.url("/funding-rates");
        let payload = self.get(&url).await?;
        let funding_rate = Self::funding_from_payload(&payload, &symbol)?;
        debug!(venue = VENUE, symbol = %symbol, funding_rate, "resolved funding rate");

        let mid = self.book_mid(&symbol).await;

        Ok(MarketSnapshot::new(funding_rate).with_mid(mid))
    }
}
