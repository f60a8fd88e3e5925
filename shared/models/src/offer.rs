//! Vendor offer models.
//!
//! Offers arrive from the upstream model as loosely typed JSON
//! ([`RawVendorOffer`]) and are validated into [`VendorOffer`] before any
//! pricing happens. Pricing output is a [`VendorOfferWithComputed`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::item::quantity_from_f64;

/// A quantity threshold at and above which `price` applies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreak {
    pub qty: u32,
    pub price: f64,
    pub currency: String,
}

/// A validated vendor quote in the vendor's own currency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VendorOffer {
    pub vendor: String,
    pub price: f64,
    pub currency: String,
    pub lead_time: String,
    pub stock: String,
    pub link: String,
    pub moq: Option<u32>,
    pub price_breaks: Vec<PriceBreak>,
}

/// Prices must be finite and strictly positive to take part in ranking.
pub fn is_usable_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

impl VendorOffer {
    /// Validates an upstream offer. Offers without a vendor name are
    /// rejected; everything else is coerced into a usable shape.
    pub fn from_raw(raw: RawVendorOffer) -> Option<Self> {
        let vendor = text_field(&raw.vendor).trim().to_string();
        if vendor.is_empty() {
            return None;
        }

        let price_breaks = raw
            .price_breaks
            .as_ref()
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|tier| serde_json::from_value::<RawPriceBreak>(tier.clone()).ok())
            .filter_map(|tier| {
                let qty = tier.qty.as_ref().and_then(lenient_number).and_then(quantity_from_f64)?;
                let price = tier.price.as_ref().and_then(lenient_number)?;
                Some(PriceBreak {
                    qty,
                    price,
                    currency: text_field(&tier.currency).trim().to_string(),
                })
            })
            .collect();

        Some(Self {
            vendor,
            price: raw.price.as_ref().and_then(lenient_number).unwrap_or(0.0),
            currency: text_field(&raw.currency).trim().to_string(),
            lead_time: text_field(&raw.lead_time),
            stock: text_field(&raw.stock),
            link: text_field(&raw.link),
            moq: raw
                .moq
                .as_ref()
                .and_then(lenient_number)
                .filter(|moq| moq.is_finite() && *moq >= 0.0)
                .map(|moq| moq.trunc().min(u32::MAX as f64) as u32),
            price_breaks,
        })
    }

    pub fn has_usable_price(&self) -> bool {
        is_usable_price(self.price)
    }

    /// Usable price tiers in ascending quantity order.
    ///
    /// Tiers with an unusable price are skipped and repeated quantities
    /// keep the first listed tier. The sort is stable.
    pub fn tiers(&self) -> Vec<&PriceBreak> {
        let mut tiers: Vec<&PriceBreak> = self
            .price_breaks
            .iter()
            .filter(|tier| tier.qty >= 1 && is_usable_price(tier.price))
            .collect();
        tiers.sort_by_key(|tier| tier.qty);
        tiers.dedup_by_key(|tier| tier.qty);
        tiers
    }
}

/// An offer with its SEK-denominated prices.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VendorOfferWithComputed {
    #[serde(flatten)]
    pub offer: VendorOffer,
    pub price_sek: Option<f64>,
    pub total_sek: Option<f64>,
    pub effective_unit_sek: Option<f64>,
    pub effective_total_sek: Option<f64>,
    pub lead_time_days: Option<u32>,
}

/// Offer as emitted by the upstream model. Every field is optional and
/// loosely typed; a mistyped field is coerced or dropped, never fatal.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawVendorOffer {
    pub vendor: Option<Value>,
    pub price: Option<Value>,
    pub currency: Option<Value>,
    pub lead_time: Option<Value>,
    pub stock: Option<Value>,
    pub link: Option<Value>,
    pub moq: Option<Value>,
    pub price_breaks: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPriceBreak {
    pub qty: Option<Value>,
    pub price: Option<Value>,
    pub currency: Option<Value>,
}

/// Reads a number that may have been emitted as a JSON string, accepting a
/// decimal comma.
fn lenient_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    }
}

/// Reads a scalar as text. Numbers and booleans keep their JSON spelling;
/// arrays, objects and null have no text.
pub fn lenient_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn text_field(value: &Option<Value>) -> String {
    value.as_ref().and_then(lenient_text).unwrap_or_default()
}
