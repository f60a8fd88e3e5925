//! Response Decoder
//!
//! Pulls the structured research body, cited sources and token usage out of
//! an upstream response envelope.

use serde::Deserialize;
use serde_json::Value;

use wiretronic_models::{lenient_text, quantity_from_json, RawVendorOffer, UsageStats, VendorOffer};
use wiretronic_utils::{WiretronicError, WiretronicResult};

/// Decoded content of one research call.
#[derive(Debug, Clone, Default)]
pub struct DecodedResearch {
    /// Part number echoed by the model, if non-blank.
    pub part_number: Option<String>,
    pub quantity: Option<u32>,
    /// Validated offers in upstream order.
    pub offers: Vec<VendorOffer>,
    /// Notes as written by the model, not yet sanitized.
    pub notes: Vec<String>,
    pub sources: Vec<String>,
    pub usage: Option<UsageStats>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StructuredBody {
    part_number: Option<Value>,
    quantity: Option<Value>,
    vendors: Option<Value>,
    notes: Option<Value>,
}

fn array_items(value: &Option<Value>) -> impl Iterator<Item = &Value> {
    value.as_ref().and_then(Value::as_array).into_iter().flatten()
}

pub fn decode_response(envelope: &Value) -> WiretronicResult<DecodedResearch> {
    if !envelope.is_object() {
        return Err(WiretronicError::malformed_response("response is not an object"));
    }

    let text = output_text(envelope)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| WiretronicError::malformed_response("empty response"))?;

    let body: StructuredBody = serde_json::from_str(text)?;

    let offers = array_items(&body.vendors)
        .filter_map(|vendor| serde_json::from_value::<RawVendorOffer>(vendor.clone()).ok())
        .filter_map(VendorOffer::from_raw)
        .collect();

    Ok(DecodedResearch {
        part_number: body
            .part_number
            .as_ref()
            .and_then(lenient_text)
            .map(|pn| pn.trim().to_string())
            .filter(|pn| !pn.is_empty()),
        quantity: body.quantity.as_ref().and_then(quantity_from_json),
        offers,
        notes: array_items(&body.notes)
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        sources: extract_sources(envelope),
        usage: extract_usage(envelope),
    })
}

fn output_items(envelope: &Value) -> impl Iterator<Item = &Value> {
    envelope
        .get("output")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn has_type(item: &Value, kind: &str) -> bool {
    item.get("type").and_then(Value::as_str) == Some(kind)
}

/// `output_text` of the first message item.
fn output_text(envelope: &Value) -> Option<&str> {
    let message = output_items(envelope).find(|item| has_type(item, "message"))?;
    message
        .get("content")?
        .as_array()?
        .iter()
        .find(|part| has_type(part, "output_text"))?
        .get("text")?
        .as_str()
}

/// Source URLs cited by web-search calls, first occurrence kept.
fn extract_sources(envelope: &Value) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();

    let urls = output_items(envelope)
        .filter(|item| has_type(item, "web_search_call"))
        .filter_map(|item| item.pointer("/action/sources").and_then(Value::as_array))
        .flatten()
        .filter_map(|source| source.get("url").and_then(Value::as_str))
        .filter(|url| !url.is_empty());

    for url in urls {
        if !sources.iter().any(|seen| seen == url) {
            sources.push(url.to_string());
        }
    }
    sources
}

fn extract_usage(envelope: &Value) -> Option<UsageStats> {
    let usage = envelope.get("usage").filter(|usage| usage.is_object())?;

    let input_tokens = token_count(usage.get("input_tokens")).unwrap_or(0);
    let output_tokens = token_count(usage.get("output_tokens")).unwrap_or(0);
    let cached_input_tokens = token_count(usage.get("cached_input_tokens"))
        .or_else(|| token_count(usage.pointer("/input_tokens_details/cached_tokens")))
        .unwrap_or(0);
    let total_tokens = token_count(usage.get("total_tokens"))
        .unwrap_or_else(|| input_tokens.saturating_add(output_tokens));
    let web_search_calls = output_items(envelope)
        .filter(|item| has_type(item, "web_search_call"))
        .count() as u64;

    Some(UsageStats {
        input_tokens,
        output_tokens,
        cached_input_tokens,
        total_tokens,
        web_search_calls,
    })
}

fn token_count(value: Option<&Value>) -> Option<u64> {
    let value = value?;
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|n| n.is_finite() && *n >= 0.0)
            .map(|n| n as u64)
    })
}
