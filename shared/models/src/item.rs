//! Work item models for the Wiretronic research pipeline.
//!
//! A request line becomes a [`ParsedItem`], which is turned into a
//! [`ResearchPayload`] once the caller's prompt and pricing preferences
//! are attached.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One order line parsed from free text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParsedItem {
    pub part_number: String,
    pub quantity: Option<u32>,
    pub raw: String,
}

/// How the best offer is judged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum PriceMode {
    Unit,
    #[default]
    Total,
}

impl PriceMode {
    /// Maps caller input to a price mode, falling back to the default for
    /// anything unrecognized.
    pub fn normalize(input: Option<&str>) -> Self {
        match input {
            Some("unit") => Self::Unit,
            Some("total") => Self::Total,
            _ => Self::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Total => "total",
        }
    }
}

impl fmt::Display for PriceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasoning effort requested from the upstream model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Minimal,
    Low,
    #[default]
    Medium,
    High,
}

impl ReasoningEffort {
    pub fn normalize(input: Option<&str>) -> Self {
        match input {
            Some("minimal") => Self::Minimal,
            Some("low") => Self::Low,
            Some("medium") => Self::Medium,
            Some("high") => Self::High,
            _ => Self::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for ReasoningEffort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized unit of work for the batch orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResearchPayload {
    pub part_number: String,
    pub quantity: Option<u32>,
    pub prompt_template: String,
    pub reasoning_effort: ReasoningEffort,
    pub price_mode: PriceMode,
}

/// Converts a loosely typed numeric quantity into a positive whole number.
///
/// Fractions are truncated; non-finite values and anything below one map
/// to `None`.
pub fn quantity_from_f64(value: f64) -> Option<u32> {
    if !value.is_finite() || value < 1.0 {
        return None;
    }
    Some(value.trunc().min(u32::MAX as f64) as u32)
}

/// Same as [`quantity_from_f64`] for an arbitrary JSON value. Strings and
/// other non-numbers yield `None`.
pub fn quantity_from_json(value: &serde_json::Value) -> Option<u32> {
    value.as_f64().and_then(quantity_from_f64)
}
