use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use wiretronic_models::{RateTable, TARGET_CURRENCY};
use wiretronic_utils::{FxConfig, WiretronicResult};

use super::sources::{ExchangeRateHostSource, OpenErApiSource};

/// A remote exchange-rate table.
#[async_trait]
pub trait RateSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self) -> WiretronicResult<RateTable>;
}

/// Anything that can price a currency in SEK.
///
/// Implementations never fail: an unknown or unavailable rate is `None`.
#[async_trait]
pub trait SekRates: Send + Sync {
    async fn rate_to_sek(&self, currency: &str) -> Option<f64>;
}

/// Cached rate table with stale-if-error refresh.
///
/// Readers take an `Arc` snapshot of the table. Refreshes are serialized
/// and re-check freshness once they hold the lock, so concurrent misses
/// share one round of source requests.
pub struct RateProvider {
    sources: Vec<Arc<dyn RateSource>>,
    ttl: Duration,
    cache: RwLock<Option<Arc<RateTable>>>,
    refresh: Mutex<()>,
}

impl RateProvider {
    /// `sources` are tried in order on every refresh.
    pub fn new(sources: Vec<Arc<dyn RateSource>>, ttl: Duration) -> Self {
        Self {
            sources,
            ttl,
            cache: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    pub fn from_config(config: &FxConfig) -> WiretronicResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()?;

        let sources: Vec<Arc<dyn RateSource>> = vec![
            Arc::new(ExchangeRateHostSource::new(client.clone(), config.primary_url.clone())),
            Arc::new(OpenErApiSource::new(client, config.fallback_url.clone())),
        ];

        Ok(Self::new(sources, Duration::hours(config.cache_ttl_hours)))
    }

    /// The current table, refreshing it when missing or expired. Falls back
    /// to the last cached table when every source fails.
    pub async fn current_table(&self) -> Option<Arc<RateTable>> {
        if let Some(table) = self.fresh_snapshot().await {
            return Some(table);
        }

        let _guard = self.refresh.lock().await;
        if let Some(table) = self.fresh_snapshot().await {
            debug!("Rate table refreshed by a concurrent caller");
            return Some(table);
        }

        for source in &self.sources {
            match source.fetch().await {
                Ok(mut table) if table.has_target_rate() => {
                    table.fetched_at = Utc::now();
                    let table = Arc::new(table);
                    *self.cache.write().await = Some(Arc::clone(&table));
                    info!(
                        source = source.name(),
                        base = %table.base,
                        currencies = table.rates.len(),
                        "Exchange rates refreshed"
                    );
                    return Some(table);
                }
                Ok(_) => warn!(source = source.name(), "Rate table has no SEK rate"),
                Err(e) => warn!(source = source.name(), error = %e, "Rate source failed"),
            }
        }

        let stale = self.cache.read().await.clone();
        match &stale {
            Some(table) => warn!(fetched_at = %table.fetched_at, "Serving stale exchange rates"),
            None => warn!("No exchange rates available"),
        }
        stale
    }

    async fn fresh_snapshot(&self) -> Option<Arc<RateTable>> {
        let now = Utc::now();
        self.cache
            .read()
            .await
            .as_ref()
            .filter(|table| table.is_fresh(self.ttl, now))
            .cloned()
    }
}

#[async_trait]
impl SekRates for RateProvider {
    async fn rate_to_sek(&self, currency: &str) -> Option<f64> {
        let code = currency.trim().to_uppercase();
        if code == TARGET_CURRENCY {
            return Some(1.0);
        }

        let table = self.current_table().await?;
        table.rate_to_sek(&code)
    }
}
