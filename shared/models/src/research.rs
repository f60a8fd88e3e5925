//! Research request and result models.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::item::{quantity_from_json, ParsedItem, PriceMode, ReasoningEffort, ResearchPayload};
use crate::offer::VendorOfferWithComputed;

/// Token and tool usage reported by the upstream model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cached_input_tokens: u64,
    pub total_tokens: u64,
    pub web_search_calls: u64,
}

/// Outcome for one requested part number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResearchResult {
    pub part_number: String,
    pub quantity: Option<u32>,
    pub best: Option<VendorOfferWithComputed>,
    pub vendors: Vec<VendorOfferWithComputed>,
    pub notes: Vec<String>,
    pub sources: Vec<String>,
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageStats>,
}

impl ResearchResult {
    /// Error-only result used when an item could not be researched.
    pub fn failed(payload: &ResearchPayload, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "Unknown error".to_string()
        } else {
            message
        };

        Self {
            part_number: payload.part_number.clone(),
            quantity: payload.quantity,
            best: None,
            vendors: Vec::new(),
            notes: Vec::new(),
            sources: Vec::new(),
            errors: vec![message],
            usage: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Body of `POST /api/v1/research`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResearchRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "No items to process"))]
    pub items: Vec<ResearchItemRequest>,
    #[serde(default)]
    pub api_key: Option<String>,
}

/// One requested item as sent by the client. Fields are loosely typed and
/// normalized by [`ResearchItemRequest::into_payload`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResearchItemRequest {
    pub part_number: Option<String>,
    pub quantity: Option<Value>,
    pub prompt_template: Option<String>,
    pub reasoning_effort: Option<Value>,
    pub price_mode: Option<Value>,
}

impl ResearchItemRequest {
    pub fn into_payload(self, default_prompt: &str) -> ResearchPayload {
        ResearchPayload {
            part_number: self.part_number.unwrap_or_default().trim().to_string(),
            quantity: self.quantity.as_ref().and_then(quantity_from_json),
            prompt_template: prompt_or_default(self.prompt_template, default_prompt),
            reasoning_effort: ReasoningEffort::normalize(
                self.reasoning_effort.as_ref().and_then(Value::as_str),
            ),
            price_mode: PriceMode::normalize(self.price_mode.as_ref().and_then(Value::as_str)),
        }
    }
}

/// Body of `POST /api/v1/research/text`: free-text order lines plus the
/// settings applied to every line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextResearchRequest {
    pub text: String,
    pub api_key: Option<String>,
    pub prompt_template: Option<String>,
    pub reasoning_effort: Option<Value>,
    pub price_mode: Option<Value>,
}

impl TextResearchRequest {
    pub fn payloads(&self, items: Vec<ParsedItem>, default_prompt: &str) -> Vec<ResearchPayload> {
        let prompt_template = prompt_or_default(self.prompt_template.clone(), default_prompt);
        let reasoning_effort =
            ReasoningEffort::normalize(self.reasoning_effort.as_ref().and_then(Value::as_str));
        let price_mode = PriceMode::normalize(self.price_mode.as_ref().and_then(Value::as_str));

        items
            .into_iter()
            .map(|item| ResearchPayload {
                part_number: item.part_number,
                quantity: item.quantity,
                prompt_template: prompt_template.clone(),
                reasoning_effort,
                price_mode,
            })
            .collect()
    }
}

/// Body of `POST /api/v1/parse`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ParseRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResponse {
    pub items: Vec<ParsedItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchResponse {
    pub results: Vec<ResearchResult>,
}

fn prompt_or_default(template: Option<String>, default_prompt: &str) -> String {
    match template {
        Some(template) if !template.trim().is_empty() => template,
        _ => default_prompt.to_string(),
    }
}
