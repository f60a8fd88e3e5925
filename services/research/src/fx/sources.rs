//! Exchange-rate HTTP sources.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;

use wiretronic_models::RateTable;
use wiretronic_utils::{WiretronicError, WiretronicResult};

use super::provider::RateSource;

/// exchangerate.host `latest` endpoint.
pub struct ExchangeRateHostSource {
    client: Client,
    url: String,
}

impl ExchangeRateHostSource {
    pub fn new(client: Client, url: String) -> Self {
        Self { client, url }
    }
}

#[derive(Debug, Deserialize)]
struct ExchangeRateHostBody {
    #[serde(default)]
    base: Option<String>,
    #[serde(default)]
    rates: HashMap<String, f64>,
}

impl ExchangeRateHostBody {
    /// A missing base leaves only cross rates usable.
    fn into_table(self) -> RateTable {
        RateTable::new(self.base.unwrap_or_default(), self.rates)
    }
}

#[async_trait]
impl RateSource for ExchangeRateHostSource {
    fn name(&self) -> &str {
        "exchangerate.host"
    }

    async fn fetch(&self) -> WiretronicResult<RateTable> {
        let body: ExchangeRateHostBody = get_json(&self.client, &self.url, self.name()).await?;
        Ok(body.into_table())
    }
}

/// open.er-api.com `v6/latest` endpoint.
pub struct OpenErApiSource {
    client: Client,
    url: String,
}

impl OpenErApiSource {
    pub fn new(client: Client, url: String) -> Self {
        Self { client, url }
    }
}

#[derive(Debug, Deserialize)]
struct OpenErApiBody {
    #[serde(default)]
    base_code: Option<String>,
    #[serde(default)]
    rates: HashMap<String, f64>,
}

impl OpenErApiBody {
    fn into_table(self, source_name: &str) -> WiretronicResult<RateTable> {
        let base = self
            .base_code
            .filter(|code| !code.trim().is_empty())
            .ok_or_else(|| WiretronicError::exchange_rate(source_name, "response has no base_code"))?;
        Ok(RateTable::new(base, self.rates))
    }
}

#[async_trait]
impl RateSource for OpenErApiSource {
    fn name(&self) -> &str {
        "open.er-api.com"
    }

    async fn fetch(&self) -> WiretronicResult<RateTable> {
        let body: OpenErApiBody = get_json(&self.client, &self.url, self.name()).await?;
        body.into_table(self.name())
    }
}

async fn get_json<T: DeserializeOwned>(client: &Client, url: &str, source_name: &str) -> WiretronicResult<T> {
    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| WiretronicError::exchange_rate(source_name, e.to_string()))?;

    if !response.status().is_success() {
        return Err(WiretronicError::exchange_rate(
            source_name,
            format!("HTTP {}", response.status().as_u16()),
        ));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| WiretronicError::exchange_rate(source_name, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_exchangerate_host_body() {
        let body: ExchangeRateHostBody = serde_json::from_value(json!({
            "base": "EUR",
            "date": "2026-10-18",
            "rates": {"SEK": 11.2, "USD": 1.08, "GBP": 0.86}
        }))
        .unwrap();

        let table = body.into_table();
        assert_eq!(table.base, "EUR");
        assert!(table.has_target_rate());
        assert_eq!(table.rate_to_sek("EUR"), Some(11.2));
    }

    #[test]
    fn test_exchangerate_host_error_body_has_no_sek() {
        let body: ExchangeRateHostBody = serde_json::from_value(json!({
            "success": false,
            "error": {"code": 101, "type": "missing_access_key"}
        }))
        .unwrap();

        assert!(!body.into_table().has_target_rate());
    }

    #[test]
    fn test_open_er_api_body() {
        let body: OpenErApiBody = serde_json::from_value(json!({
            "result": "success",
            "base_code": "EUR",
            "rates": {"EUR": 1, "SEK": 11.4, "NOK": 11.7}
        }))
        .unwrap();

        let table = body.into_table("open.er-api.com").unwrap();
        assert_eq!(table.base, "EUR");
        assert_eq!(table.rate_to_sek("EUR"), Some(11.4));
    }

    #[test]
    fn test_open_er_api_requires_base() {
        let body: OpenErApiBody = serde_json::from_value(json!({"rates": {"SEK": 11.4}})).unwrap();
        let error = body.into_table("open.er-api.com").unwrap_err();
        assert_eq!(error.error_code(), "EXCHANGE_RATE_ERROR");
    }
}
