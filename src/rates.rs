//! Currency rate cache and converter
//!
//! Holds a single snapshot of Fixer-style exchange rates pivoted on EUR.
//! Reads go through an `ArcSwapOption` so conversions keep seeing the old
//! snapshot while a refresh is in flight; a successful refresh swaps in a
//! wholly new snapshot. Refreshes are serialized by a tokio mutex and
//! re-check freshness after acquiring it, so concurrent callers coalesce
//! into at most one external fetch per staleness window.

use crate::config::RatesConfig;
use crate::error::AppError;
use crate::pricing::round2;
use arc_swap::ArcSwapOption;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// A fully populated snapshot of pivot-relative exchange rates.
///
/// Either the cache has no snapshot at all or it has one of these; a failed
/// or partial fetch never replaces an existing snapshot.
#[derive(Debug, Clone)]
pub struct RateSnapshot {
    /// Pivot currency the rates are expressed in (EUR for Fixer).
    pub base: String,
    pub rates: HashMap<String, f64>,
    pub fetched_at: Instant,
}

impl RateSnapshot {
    /// Rate for a currency code relative to the pivot. The pivot's own rate
    /// is 1.0 even when the source omits it from the mapping.
    pub fn rate_for(&self, code: &str) -> Option<f64> {
        self.rates
            .get(code)
            .copied()
            .or_else(|| (code == self.base).then_some(1.0))
    }

    fn is_fresh(&self, staleness: Duration) -> bool {
        self.fetched_at.elapsed() < staleness
    }
}

/// Wire format of the Fixer latest-rates endpoint.
#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    success: bool,
    base: Option<String>,
    rates: Option<HashMap<String, f64>>,
    error: Option<LatestRatesError>,
}

#[derive(Debug, Deserialize)]
struct LatestRatesError {
    #[serde(rename = "type")]
    error_type: Option<String>,
    info: Option<String>,
}

pub struct RateCache {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    staleness: Duration,
    timeout: Duration,
    snapshot: ArcSwapOption<RateSnapshot>,
    refresh_lock: Mutex<()>,
}

impl RateCache {
    pub fn new(client: reqwest::Client, config: &RatesConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            staleness: Duration::from_secs(config.staleness_seconds),
            timeout: Duration::from_secs(config.timeout_seconds),
            snapshot: ArcSwapOption::const_empty(),
            refresh_lock: Mutex::new(()),
        }
    }

    /// The snapshot conversions currently read from, if any.
    pub fn current(&self) -> Option<Arc<RateSnapshot>> {
        self.snapshot.load_full()
    }

    /// Refresh the snapshot if it is missing or older than the staleness
    /// window. No-ops when fresh. At most one fetch is in flight at a time;
    /// callers that lose the race re-check and reuse the winner's snapshot.
    pub async fn ensure_fresh(&self) -> Result<(), AppError> {
        if self.has_fresh_snapshot() {
            return Ok(());
        }

        let _guard = self.refresh_lock.lock().await;
        if self.has_fresh_snapshot() {
            // Another caller refreshed while we waited for the lock.
            return Ok(());
        }

        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(AppError::MissingCredential)?;

        let url = format!("{}/latest", self.base_url);
        tracing::debug!(url = %url, "Fetching exchange rates");

        let response = self
            .client
            .get(&url)
            .query(&[("access_key", api_key)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AppError::RateSource(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::RateSource(format!(
                "rate source returned HTTP {}",
                response.status()
            )));
        }

        let body: LatestRatesResponse = response
            .json()
            .await
            .map_err(|e| AppError::RateSource(format!("invalid response body: {}", e)))?;

        if !body.success {
            let message = body
                .error
                .and_then(|e| e.info.or(e.error_type))
                .unwrap_or_else(|| "currency API failed".to_string());
            return Err(AppError::RateSource(message));
        }

        let rates = body
            .rates
            .filter(|r| !r.is_empty())
            .ok_or_else(|| AppError::RateSource("response contained no rates".to_string()))?;

        let snapshot = RateSnapshot {
            base: body.base.unwrap_or_else(|| "EUR".to_string()),
            rates,
            fetched_at: Instant::now(),
        };

        tracing::info!(
            base = %snapshot.base,
            currencies = snapshot.rates.len(),
            "Exchange rate snapshot refreshed"
        );
        self.snapshot.store(Some(Arc::new(snapshot)));

        Ok(())
    }

    /// Convert `amount` between two currencies through the pivot.
    ///
    /// The identity case short-circuits before the cache is consulted, so
    /// USD->USD works with no credential and an empty cache.
    pub async fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, AppError> {
        let from = from.trim().to_uppercase();
        let to = to.trim().to_uppercase();

        if from == to {
            return Ok(round2(amount));
        }

        self.ensure_fresh().await?;

        let snapshot = self
            .snapshot
            .load_full()
            .ok_or_else(|| AppError::RateSource("no rate snapshot available".to_string()))?;

        let rate_from = snapshot
            .rate_for(&from)
            .ok_or(AppError::UnknownCurrency(from))?;
        let rate_to = snapshot
            .rate_for(&to)
            .ok_or(AppError::UnknownCurrency(to))?;

        let amount_in_pivot = amount / rate_from;
        Ok(round2(amount_in_pivot * rate_to))
    }

    fn has_fresh_snapshot(&self) -> bool {
        self.snapshot
            .load()
            .as_ref()
            .is_some_and(|s| s.is_fresh(self.staleness))
    }
}
