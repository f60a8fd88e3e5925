//! Currency Rate Provider
//!
//! Converts vendor currencies into SEK using a cached exchange-rate table
//! refreshed from a primary source with a fallback.

pub mod provider;
pub mod sources;

pub use provider::{RateProvider, SekRates};
