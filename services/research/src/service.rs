//! Research Service
//!
//! Runs the per-item research pipeline (prompt, upstream search, decode,
//! SEK pricing, notes, best offer) and fans batches out concurrently.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

use wiretronic_models::{ResearchPayload, ResearchResult};
use wiretronic_utils::{WiretronicError, WiretronicResult};

use crate::fx::SekRates;
use crate::metrics::ResearchMetrics;
use crate::pricing::{derive_notes, normalize_offers, pick_best, sanitize_notes};
use crate::upstream::{build_prompt, decode_response, PartSearch};

pub struct ResearchService {
    search: Arc<dyn PartSearch>,
    rates: Arc<dyn SekRates>,
    item_timeout: Duration,
    metrics: Arc<ResearchMetrics>,
}

impl ResearchService {
    pub fn new(
        search: Arc<dyn PartSearch>,
        rates: Arc<dyn SekRates>,
        item_timeout: Duration,
        metrics: Arc<ResearchMetrics>,
    ) -> Self {
        Self {
            search,
            rates,
            item_timeout,
            metrics,
        }
    }

    /// Research one item within the per-item timeout.
    pub async fn research_item(&self, payload: &ResearchPayload, api_key: &str) -> WiretronicResult<ResearchResult> {
        let started = Instant::now();

        let outcome = match tokio::time::timeout(self.item_timeout, self.research(payload, api_key)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(WiretronicError::timeout(self.item_timeout.as_secs())),
        };

        self.metrics
            .record_item(outcome.is_ok(), started.elapsed().as_secs_f64());
        outcome
    }

    async fn research(&self, payload: &ResearchPayload, api_key: &str) -> WiretronicResult<ResearchResult> {
        let prompt = build_prompt(payload);
        let envelope = self
            .search
            .search(&prompt, payload.reasoning_effort, api_key)
            .await?;
        let decoded = decode_response(&envelope)?;

        // Pricing follows the requested quantity; the echoed one is reported only.
        let vendors = normalize_offers(decoded.offers, payload.quantity, self.rates.as_ref()).await;
        let mut notes = sanitize_notes(decoded.notes);
        notes.extend(derive_notes(&vendors, payload.quantity));
        let best = pick_best(&vendors, payload.price_mode).cloned();

        info!(
            part_number = %payload.part_number,
            vendors = vendors.len(),
            sources = decoded.sources.len(),
            "Item researched"
        );

        Ok(ResearchResult {
            part_number: decoded
                .part_number
                .unwrap_or_else(|| payload.part_number.clone()),
            quantity: decoded.quantity.or(payload.quantity),
            best,
            vendors,
            notes,
            sources: decoded.sources,
            errors: Vec::new(),
            usage: decoded.usage,
        })
    }

    /// Research every item concurrently. Results line up with `payloads`;
    /// a failed item becomes an error-only result.
    pub async fn run_batch(&self, payloads: &[ResearchPayload], api_key: &str) -> Vec<ResearchResult> {
        self.run_batch_until(payloads, api_key, None).await
    }

    /// Like [`run_batch`](Self::run_batch), but items still unsettled at
    /// the ceiling's deadline are cancelled and reported as timed out.
    async fn run_batch_until(
        &self,
        payloads: &[ResearchPayload],
        api_key: &str,
        ceiling: Option<&Ceiling>,
    ) -> Vec<ResearchResult> {
        let outcomes = join_all(payloads.iter().map(|payload| async move {
            match ceiling {
                Some(ceiling) => {
                    let item = self.research_item(payload, api_key);
                    tokio::time::timeout_at(ceiling.deadline, item)
                        .await
                        .unwrap_or_else(|_| Err(ceiling.error()))
                }
                None => self.research_item(payload, api_key).await,
            }
        }))
        .await;

        payloads
            .iter()
            .zip(outcomes)
            .map(|(payload, outcome)| match outcome {
                Ok(result) => result,
                Err(e) => {
                    warn!(part_number = %payload.part_number, error = %e, "Research failed");
                    ResearchResult::failed(payload, e.to_string())
                }
            })
            .collect()
    }

    /// [`run_batch`](Self::run_batch) over consecutive groups of at most
    /// `chunk_size` items, all sharing one `ceiling` measured from the call.
    ///
    /// Items that finish before the ceiling keep their results. Items that
    /// have not, including whole chunks that never started, are reported as
    /// timed out in their own slot.
    pub async fn run_chunked(
        &self,
        payloads: &[ResearchPayload],
        api_key: &str,
        chunk_size: usize,
        ceiling: Duration,
    ) -> Vec<ResearchResult> {
        let ceiling = Ceiling::new(ceiling);
        let mut results = Vec::with_capacity(payloads.len());

        for chunk in payloads.chunks(chunk_size.max(1)) {
            if ceiling.expired() {
                warn!(items = chunk.len(), seconds = ceiling.limit.as_secs(), "Request ceiling reached before chunk started");
                results.extend(
                    chunk
                        .iter()
                        .map(|payload| ResearchResult::failed(payload, ceiling.error().to_string())),
                );
                continue;
            }
            results.extend(self.run_batch_until(chunk, api_key, Some(&ceiling)).await);
        }
        results
    }
}

struct Ceiling {
    limit: Duration,
    deadline: Instant,
}

impl Ceiling {
    fn new(limit: Duration) -> Self {
        Self {
            limit,
            deadline: Instant::now() + limit,
        }
    }

    fn expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    fn error(&self) -> WiretronicError {
        WiretronicError::timeout(self.limit.as_secs())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use wiretronic_models::ReasoningEffort;
    use wiretronic_utils::{WiretronicError, WiretronicResult};

    use crate::upstream::PartSearch;

    /// Canned upstream keyed by the part number found in the prompt.
    #[derive(Default)]
    pub struct FakeSearch {
        pub bodies: HashMap<String, Value>,
        pub failures: HashMap<String, WiretronicError>,
        pub delay: Option<Duration>,
        pub in_flight: AtomicUsize,
        pub peak_in_flight: AtomicUsize,
    }

    impl FakeSearch {
        pub fn with_body(mut self, part_number: &str, body: Value) -> Self {
            self.bodies.insert(part_number.to_string(), body);
            self
        }

        pub fn with_failure(mut self, part_number: &str, error: WiretronicError) -> Self {
            self.failures.insert(part_number.to_string(), error);
            self
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    pub fn envelope(body: &Value) -> Value {
        json!({
            "output": [{
                "type": "message",
                "content": [{"type": "output_text", "text": body.to_string()}]
            }]
        })
    }

    /// Structured body with one SEK offer at `price` per unit.
    pub fn single_offer(part_number: &str, vendor: &str, price: f64) -> Value {
        json!({
            "partNumber": part_number,
            "quantity": null,
            "vendors": [{
                "vendor": vendor,
                "price": price,
                "currency": "SEK",
                "leadTime": "2 dagar",
                "stock": "100",
                "link": "https://se.farnell.com/p",
                "moq": null,
                "priceBreaks": []
            }],
            "notes": []
        })
    }

    #[async_trait]
    impl PartSearch for FakeSearch {
        async fn search(&self, prompt: &str, _effort: ReasoningEffort, _api_key: &str) -> WiretronicResult<Value> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let part_number = prompt
                .lines()
                .find_map(|line| line.strip_prefix("Artikelnummer: "))
                .unwrap_or_default();

            if let Some(error) = self.failures.get(part_number) {
                return Err(error.clone());
            }
            match self.bodies.get(part_number) {
                Some(body) => Ok(envelope(body)),
                None => Ok(envelope(&json!({"partNumber": part_number, "quantity": null, "vendors": [], "notes": []}))),
            }
        }
    }
}
