//! # Wiretronic Domain Models
//!
//! Data structures shared by the Wiretronic part price research service.
//!
//! ## Key Models
//!
//! - **ParsedItem** / **ResearchPayload**: an order line and the work item built from it
//! - **VendorOffer**: a validated vendor quote with optional price breaks
//! - **VendorOfferWithComputed**: an offer priced in SEK for the requested quantity
//! - **RateTable**: exchange rates quoted against a base currency
//! - **ResearchResult**: the per-part outcome returned to clients
//!
//! Wire-facing types serialize with camelCase field names.

pub mod fx;
pub mod item;
pub mod offer;
pub mod research;

#[cfg(test)]
pub mod property_tests;

pub use fx::{RateTable, TARGET_CURRENCY};
pub use item::{
    quantity_from_f64, quantity_from_json, ParsedItem, PriceMode, ReasoningEffort, ResearchPayload,
};
pub use offer::{
    is_usable_price, lenient_text, PriceBreak, RawPriceBreak, RawVendorOffer, VendorOffer,
    VendorOfferWithComputed,
};
pub use research::{
    ParseRequest, ParseResponse, ResearchItemRequest, ResearchRequest, ResearchResponse,
    ResearchResult, TextResearchRequest, UsageStats,
};
