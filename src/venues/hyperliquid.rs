//! Hyperliquid-style adapter.
//!
//! Hyperliquid exposes a single `info` endpoint that accepts a JSON body with
//! a `type` discriminator. The bulk `metaAndAssetCtxs` query returns metadata
//! and pricing for every listed market in one round trip; older deployments
//! only answer the per-symbol `funding` and `l2Book` queries, so those remain
//! as a fallback when the bulk payload does not cover the requested market.

use super::{
    first_f64, matches_symbol, mid_from_sides, Venue, FUNDING_KEYS, MARK_KEYS, MID_KEYS,
};
use crate::models::MarketSnapshot;
use crate::transport::{FetchError, JsonTransport};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

const VENUE: &str = "hyperliquid";

pub struct HyperliquidVenue<T> {
    info_url: String,
    transport: Arc<T>,
}

impl<T: JsonTransport> HyperliquidVenue<T> {
    pub fn new(info_url: String, transport: Arc<T>) -> Self {
        Self {
            info_url,
            transport,
        }
    }

    async fn post(&self, body: Value) -> Result<Value, FetchError> {
        self.transport
            .post_json(&self.info_url, &body)
            .await
            .map_err(|e| FetchError::transport(VENUE, e))
    }

    /// Bulk query: `[{"universe": [{name, ...}]}, [ctx, ...]]` with positional
    /// correspondence between universe entries and asset contexts.
    ///
    /// `Ok(None)` means the payload did not cover the symbol (unrecognized
    /// shape included); the caller falls back to the legacy queries.
    async fn fetch_bulk(&self, symbol: &str) -> Result<Option<MarketSnapshot>, FetchError> {
        let payload = self.post(json!({"type": "metaAndAssetCtxs"})).await?;

        let universe = payload
            .get(0)
            .and_then(|meta| meta.get("universe"))
            .and_then(Value::as_array);
        let ctxs = payload.get(1).and_then(Value::as_array);

        let (Some(universe), Some(ctxs)) = (universe, ctxs) else {
            debug!(venue = VENUE, "bulk payload has unexpected shape, will try legacy queries");
            return Ok(None);
        };

        let Some(idx) = universe.iter().position(|asset| matches_symbol(asset, symbol)) else {
            return Ok(None);
        };
        let Some(ctx) = ctxs.get(idx) else {
            return Ok(None);
        };

        let Some(funding_rate) = first_f64(ctx, FUNDING_KEYS) else {
            // The market is listed but its context carries no usable rate.
            return Err(FetchError::malformed(VENUE, "fundingRate"));
        };

        let mid = first_f64(ctx, MID_KEYS).or_else(|| first_f64(ctx, MARK_KEYS));
        if mid.is_none() {
            warn!(venue = VENUE, symbol, "no mid or mark price in asset context");
        }

        Ok(Some(MarketSnapshot::new(funding_rate).with_mid(mid)))
    }

    /// Legacy per-symbol funding query. The rate may sit at the top level or
    /// nested under a `funding` object.
    async fn fetch_legacy(&self, symbol: &str) -> Result<MarketSnapshot, FetchError> {
        debug!(venue = VENUE, symbol, "falling back to legacy funding query");

        let payload = self.post(json!({"type": "funding", "coin": symbol})).await?;

        let funding_rate = first_f64(&payload, FUNDING_KEYS)
            .or_else(|| {
                payload
                    .get("funding")
                    .and_then(|nested| first_f64(nested, FUNDING_KEYS))
            })
            .ok_or_else(|| FetchError::symbol_not_found(VENUE, symbol))?;

        let mid = self.legacy_mid(symbol).await;

        Ok(MarketSnapshot::new(funding_rate).with_mid(mid))
    }

    /// Best-effort mid from the legacy order-book query. Price is advisory, so
    /// every failure here degrades to `None`.
    async fn legacy_mid(&self, symbol: &str) -> Option<f64> {
        let payload = match self.post(json!({"type": "l2Book", "coin": symbol})).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(venue = VENUE, symbol, error = %e, "order book fetch failed, price unavailable");
                return None;
            }
        };

        // Levels come either as {"levels": {"bids": [...], "asks": [...]}} or
        // as {"levels": [bids, asks]}.
        let levels = payload.get("levels").unwrap_or(&payload);
        let bids = levels.get("bids").or_else(|| levels.get(0));
        let asks = levels.get("asks").or_else(|| levels.get(1));

        let mid = match (bids, asks) {
            (Some(bids), Some(asks)) => mid_from_sides(bids, asks),
            _ => None,
        };

        if mid.is_none() {
            warn!(venue = VENUE, symbol, "order book payload yielded no mid price");
        }
        mid
    }
}

#[async_trait]
impl<T: JsonTransport> Venue for HyperliquidVenue<T> {
    fn name(&self) -> &'static str {
        VENUE
    }

    async fn fetch_snapshot(&self, market: &str) -> Result<MarketSnapshot, FetchError> {
        let symbol = market.trim().to_ascii_uppercase();

        if let Some(snapshot) = self.fetch_bulk(&symbol).await? {
            return Ok(snapshot);
        }
        self.fetch_legacy(&symbol).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportFailure;
    use serde_json::json;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    /// Scripted transport keyed by the `type` discriminator of the request body.
    struct Scripted {
        responses: HashMap<&'static str, Value>,
        seen: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(responses: Vec<(&'static str, Value)>) -> Arc<Self> {
            Arc::new(Self {
                responses: responses.into_iter().collect(),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl JsonTransport for Scripted {
        async fn get_json(&self, url: &str) -> Result<Value, TransportFailure> {
            Err(TransportFailure(format!("unexpected GET {url}")))
        }

        async fn post_json(&self, _url: &str, body: &Value) -> Result<Value, TransportFailure> {
            let kind = body
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            self.seen.lock().await.push(kind.to_string());
            self.responses
                .get(kind)
                .cloned()
                .ok_or_else(|| TransportFailure(format!("no scripted response for {kind}")))
        }
    }

    fn bulk_payload() -> Value {
        json!([
            {"universe": [{"name": "BTC"}, {"name": "ETH"}]},
            [
                {"funding": "0.00001", "markPx": "97000.0", "midPx": "97001.0"},
                {"funding": "0.0002", "markPx": "1851.0", "midPx": "1850.0"}
            ]
        ])
    }

    #[tokio::test]
    async fn bulk_query_resolves_funding_and_mid() {
        let transport = Scripted::new(vec![("metaAndAssetCtxs", bulk_payload())]);
        let venue = HyperliquidVenue::new("http://test/info".into(), transport.clone());

        let snap = venue.fetch_snapshot("ETH").await.unwrap();
        assert_eq!(snap.funding_rate, 0.0002);
        assert_eq!(snap.mid_price, Some(1850.0));

        // One round trip, no legacy fallback.
        assert_eq!(*transport.seen.lock().await, vec!["metaAndAssetCtxs"]);
    }

    #[tokio::test]
    async fn symbol_lookup_is_case_insensitive() {
        let transport = Scripted::new(vec![("metaAndAssetCtxs", bulk_payload())]);
        let venue = HyperliquidVenue::new("http://test/info".into(), transport);

        let lower = venue.fetch_snapshot("eth").await.unwrap();
        let upper = venue.fetch_snapshot("ETH").await.unwrap();
        assert_eq!(lower, upper);
    }

    #[tokio::test]
    async fn mark_price_substitutes_for_missing_mid() {
        let payload = json!([
            {"universe": [{"name": "ETH"}]},
            [{"funding": "0.0002", "markPx": "1851.0"}]
        ]);
        let transport = Scripted::new(vec![("metaAndAssetCtxs", payload)]);
        let venue = HyperliquidVenue::new("http://test/info".into(), transport);

        let snap = venue.fetch_snapshot("ETH").await.unwrap();
        assert_eq!(snap.mid_price, Some(1851.0));
    }

    #[tokio::test]
    async fn missing_price_still_yields_snapshot() {
        let payload = json!([
            {"universe": [{"name": "ETH"}]},
            [{"funding": "0.0002"}]
        ]);
        let transport = Scripted::new(vec![("metaAndAssetCtxs", payload)]);
        let venue = HyperliquidVenue::new("http://test/info".into(), transport);

        let snap = venue.fetch_snapshot("ETH").await.unwrap();
        assert_eq!(snap.funding_rate, 0.0002);
        assert!(snap.mid_price.is_none());
    }

    #[tokio::test]
    async fn unparseable_funding_is_malformed_payload() {
        let payload = json!([
            {"universe": [{"name": "ETH"}]},
            [{"funding": "not-a-rate"}]
        ]);
        let transport = Scripted::new(vec![("metaAndAssetCtxs", payload)]);
        let venue = HyperliquidVenue::new("http://test/info".into(), transport);

        let err = venue.fetch_snapshot("ETH").await.unwrap_err();
        assert!(matches!(err, FetchError::MalformedPayload { .. }));
    }

    #[tokio::test]
    async fn falls_back_to_legacy_queries_when_bulk_misses_symbol() {
        let transport = Scripted::new(vec![
            ("metaAndAssetCtxs", json!([{"universe": [{"name": "BTC"}]}, [{"funding": "0.0"}]])),
            ("funding", json!({"funding": {"fundingRate": "0.00013"}})),
            (
                "l2Book",
                json!({"levels": {"bids": [["1800.0", "2"]], "asks": [["1802.0", "1"]]}}),
            ),
        ]);
        let venue = HyperliquidVenue::new("http://test/info".into(), transport);

        let snap = venue.fetch_snapshot("ETH").await.unwrap();
        assert_eq!(snap.funding_rate, 0.00013);
        assert_eq!(snap.mid_price, Some(1801.0));
    }

    #[tokio::test]
    async fn legacy_book_with_positional_levels() {
        let transport = Scripted::new(vec![
            ("metaAndAssetCtxs", json!({"unexpected": "shape"})),
            ("funding", json!({"fundingRate": "0.0001"})),
            (
                "l2Book",
                json!({"levels": [[{"px": "100.0", "sz": "1"}], [{"px": "104.0", "sz": "1"}]]}),
            ),
        ]);
        let venue = HyperliquidVenue::new("http://test/info".into(), transport);

        let snap = venue.fetch_snapshot("ETH").await.unwrap();
        assert_eq!(snap.mid_price, Some(102.0));
    }

    #[tokio::test]
    async fn unknown_symbol_everywhere_is_symbol_not_found() {
        let transport = Scripted::new(vec![
            ("metaAndAssetCtxs", json!([{"universe": []}, []])),
            ("funding", json!({"error": "unknown coin"})),
        ]);
        let venue = HyperliquidVenue::new("http://test/info".into(), transport);

        let err = venue.fetch_snapshot("NOPE").await.unwrap_err();
        assert!(matches!(err, FetchError::SymbolNotFound { .. }));
    }

    #[tokio::test]
    async fn transport_failure_is_terminal() {
        let transport = Scripted::new(vec![]);
        let venue = HyperliquidVenue::new("http://test/info".into(), transport.clone());

        let err = venue.fetch_snapshot("ETH").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));

        // Exactly one attempt, never retried.
        assert_eq!(transport.seen.lock().await.len(), 1);
    }
}
