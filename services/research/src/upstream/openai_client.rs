//! OpenAI Responses API client
//!
//! Runs one web-search research call per item with a strict JSON schema so
//! the model answers with structured vendor offers.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use wiretronic_models::ReasoningEffort;
use wiretronic_utils::{OpenAiConfig, WiretronicError, WiretronicResult};

use super::prompt::INSTRUCTIONS;
use super::PartSearch;

/// Fixed-delay retry for transient upstream failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Extra attempts after the first one.
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Run `attempt` until it succeeds, fails with a non-retryable error or
    /// the retries are used up. The closure receives the attempt number.
    pub async fn run<T, F, Fut>(&self, mut attempt: F) -> WiretronicResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = WiretronicResult<T>>,
    {
        let mut attempt_number = 0;
        loop {
            match attempt(attempt_number).await {
                Err(e) if e.is_retryable() && attempt_number < self.max_retries => {
                    warn!(
                        attempt = attempt_number + 1,
                        backoff_ms = self.backoff.as_millis() as u64,
                        error = %e,
                        "Upstream call failed, retrying"
                    );
                    tokio::time::sleep(self.backoff).await;
                    attempt_number += 1;
                }
                result => return result,
            }
        }
    }
}

pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    model: String,
    vendor_domains: Vec<String>,
    retry: RetryPolicy,
}

impl OpenAiClient {
    pub fn from_config(config: &OpenAiConfig) -> WiretronicResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/responses", config.api_url.trim_end_matches('/')),
            model: config.model.clone(),
            vendor_domains: config.vendor_domains.clone(),
            retry: RetryPolicy {
                max_retries: config.max_retries,
                backoff: Duration::from_millis(config.retry_backoff_ms),
            },
        })
    }

    fn request_body(&self, prompt: &str, effort: ReasoningEffort) -> Value {
        json!({
            "model": self.model,
            "reasoning": {"effort": effort.as_str()},
            "tools": [{
                "type": "web_search",
                "filters": {"allowed_domains": self.vendor_domains}
            }],
            "tool_choice": "auto",
            "include": ["web_search_call.action.sources"],
            "text": {
                "format": {
                    "type": "json_schema",
                    "name": "part_research",
                    "strict": true,
                    "schema": research_schema()
                }
            },
            "instructions": INSTRUCTIONS,
            "input": prompt
        })
    }

    async fn send_once(&self, body: &Value, api_key: &str) -> WiretronicResult<Value> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(WiretronicError::upstream(status.as_u16(), error_text));
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl PartSearch for OpenAiClient {
    async fn search(&self, prompt: &str, effort: ReasoningEffort, api_key: &str) -> WiretronicResult<Value> {
        let body = self.request_body(prompt, effort);
        debug!(model = %self.model, effort = %effort, "Sending research request");

        self.retry.run(|_| self.send_once(&body, api_key)).await
    }
}

/// JSON schema the model must answer with.
fn research_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "partNumber": {"type": "string"},
            "quantity": {"type": ["number", "null"]},
            "vendors": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": {
                        "vendor": {"type": "string"},
                        "price": {"type": "number"},
                        "currency": {"type": "string"},
                        "leadTime": {"type": "string"},
                        "stock": {"type": "string"},
                        "link": {"type": "string"},
                        "moq": {"type": ["number", "null"]},
                        "priceBreaks": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "additionalProperties": false,
                                "properties": {
                                    "qty": {"type": "number"},
                                    "price": {"type": "number"},
                                    "currency": {"type": "string"}
                                },
                                "required": ["qty", "price", "currency"]
                            }
                        }
                    },
                    "required": ["vendor", "price", "currency", "leadTime", "stock", "link", "moq", "priceBreaks"]
                }
            },
            "notes": {"type": "array", "items": {"type": "string"}}
        },
        "required": ["partNumber", "quantity", "vendors", "notes"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use wiretronic_utils::AppConfig;

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            backoff: Duration::from_millis(1),
        }
    }

    async fn run_with(policy: RetryPolicy, errors: Vec<WiretronicError>) -> (WiretronicResult<u32>, u32) {
        let calls = AtomicU32::new(0);
        let result = policy
            .run(|attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                let outcome = match errors.get(attempt as usize) {
                    Some(error) => Err(error.clone()),
                    None => Ok(attempt),
                };
                async move { outcome }
            })
            .await;
        (result, calls.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn test_retries_once_on_server_error() {
        let (result, calls) = run_with(policy(1), vec![WiretronicError::upstream(503, "busy")]).await;
        assert_eq!(result, Ok(1));
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn test_retries_rate_limit_and_transport() {
        let (result, _) = run_with(policy(1), vec![WiretronicError::upstream(429, "slow down")]).await;
        assert!(result.is_ok());

        let (result, _) = run_with(policy(1), vec![WiretronicError::transport("connection reset")]).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_no_retry_on_client_error() {
        let (result, calls) = run_with(policy(1), vec![WiretronicError::upstream(400, "bad request")]).await;
        assert_eq!(result, Err(WiretronicError::upstream(400, "bad request")));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let errors = vec![
            WiretronicError::upstream(500, "first"),
            WiretronicError::upstream(502, "second"),
            WiretronicError::upstream(503, "third"),
        ];
        let (result, calls) = run_with(policy(1), errors).await;
        assert_eq!(result, Err(WiretronicError::upstream(502, "second")));
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn test_zero_retries_means_single_attempt() {
        let (result, calls) = run_with(policy(0), vec![WiretronicError::upstream(500, "down")]).await;
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_request_body() {
        let mut config = AppConfig::default().openai;
        config.api_url = "https://api.openai.com/v1/".to_string();
        let client = OpenAiClient::from_config(&config).unwrap();
        assert_eq!(client.endpoint, "https://api.openai.com/v1/responses");

        let body = client.request_body("Artikelnummer: PN-1", ReasoningEffort::High);
        assert_eq!(body["model"], "gpt-5");
        assert_eq!(body["reasoning"]["effort"], "high");
        assert_eq!(body["tools"][0]["type"], "web_search");
        assert_eq!(body["tools"][0]["filters"]["allowed_domains"].as_array().unwrap().len(), 11);
        assert_eq!(body["text"]["format"]["name"], "part_research");
        assert_eq!(body["text"]["format"]["strict"], true);
        assert_eq!(body["include"][0], "web_search_call.action.sources");
        assert_eq!(body["input"], "Artikelnummer: PN-1");
        assert_eq!(
            body["text"]["format"]["schema"]["required"],
            json!(["partNumber", "quantity", "vendors", "notes"])
        );
    }
}
