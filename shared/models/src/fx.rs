//! Exchange-rate table model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Currency every price is converted into.
pub const TARGET_CURRENCY: &str = "SEK";

/// Rates quoted against `base`: one unit of `base` buys `rates[code]` of
/// `code`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RateTable {
    pub base: String,
    pub rates: HashMap<String, f64>,
    pub fetched_at: DateTime<Utc>,
}

impl RateTable {
    pub fn new(base: impl Into<String>, rates: HashMap<String, f64>) -> Self {
        Self {
            base: base.into().trim().to_uppercase(),
            rates: rates
                .into_iter()
                .map(|(code, rate)| (code.trim().to_uppercase(), rate))
                .collect(),
            fetched_at: Utc::now(),
        }
    }

    /// A table is only worth caching when it can price into SEK.
    pub fn has_target_rate(&self) -> bool {
        self.rate(TARGET_CURRENCY).is_some()
    }

    pub fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.fetched_at < ttl
    }

    fn rate(&self, code: &str) -> Option<f64> {
        self.rates
            .get(code)
            .copied()
            .filter(|rate| rate.is_finite() && *rate > 0.0)
    }

    /// SEK per one unit of `currency`, crossing through the base currency.
    ///
    /// `currency` must already be upper-cased. A blank currency is never
    /// priced, and a table without a base only crosses through `rates`.
    pub fn rate_to_sek(&self, currency: &str) -> Option<f64> {
        if currency.is_empty() {
            return None;
        }
        let sek = self.rate(TARGET_CURRENCY)?;
        if !self.base.is_empty() && self.base == currency {
            return Some(sek);
        }
        let from = self.rate(currency)?;
        Some(sek / from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eur_table() -> RateTable {
        RateTable::new(
            "eur",
            HashMap::from([
                ("SEK".to_string(), 11.5),
                ("usd".to_string(), 1.15),
                ("GBP".to_string(), 0.0),
            ]),
        )
    }

    #[test]
    fn test_base_currency_returns_sek_rate() {
        assert_eq!(eur_table().rate_to_sek("EUR"), Some(11.5));
    }

    #[test]
    fn test_cross_rate_through_base() {
        let rate = eur_table().rate_to_sek("USD").unwrap();
        assert!((rate - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_or_zero_rate_is_none() {
        let table = eur_table();
        assert_eq!(table.rate_to_sek("GBP"), None);
        assert_eq!(table.rate_to_sek("NOK"), None);

        let without_sek = RateTable::new("EUR", HashMap::from([("USD".to_string(), 1.1)]));
        assert!(!without_sek.has_target_rate());
        assert_eq!(without_sek.rate_to_sek("EUR"), None);
    }

    #[test]
    fn test_blank_currency_is_never_priced() {
        let baseless = RateTable::new("", HashMap::from([("SEK".to_string(), 11.0)]));
        assert!(baseless.has_target_rate());
        assert_eq!(baseless.rate_to_sek(""), None);
        assert_eq!(baseless.rate_to_sek("SEK"), Some(1.0));
        assert_eq!(eur_table().rate_to_sek(""), None);
    }

    #[test]
    fn test_freshness_window() {
        let mut table = eur_table();
        let now = Utc::now();
        table.fetched_at = now - Duration::hours(11);
        assert!(table.is_fresh(Duration::hours(12), now));
        table.fetched_at = now - Duration::hours(13);
        assert!(!table.is_fresh(Duration::hours(12), now));
    }
}
