//! Offer Pricing
//!
//! Converts validated vendor offers into SEK, applies price-break tiers for
//! the requested quantity, derives advisory notes and picks the best offer.

pub mod normalizer;
pub mod notes;
pub mod selector;

pub use normalizer::normalize_offers;
pub use notes::{derive_notes, sanitize_notes};
pub use selector::pick_best;
