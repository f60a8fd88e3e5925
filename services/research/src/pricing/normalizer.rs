//! Offer Normalizer
//!
//! Prices each offer in SEK for the requested quantity and orders the
//! offers by effective unit price.

use regex::Regex;
use std::sync::OnceLock;

use wiretronic_models::{PriceMode, VendorOffer, VendorOfferWithComputed};

use super::selector::price_metric;
use crate::fx::SekRates;

/// Normalize `offers` for `quantity`, cheapest effective unit price first.
///
/// Offers that cannot be priced in SEK sort last. The sort is stable, so
/// equally priced offers keep their upstream order.
pub async fn normalize_offers<R>(
    offers: Vec<VendorOffer>,
    quantity: Option<u32>,
    rates: &R,
) -> Vec<VendorOfferWithComputed>
where
    R: SekRates + ?Sized,
{
    let mut normalized = Vec::with_capacity(offers.len());
    for offer in offers {
        let rate = rates.rate_to_sek(&offer.currency).await;
        normalized.push(price_offer(offer, quantity, rate));
    }

    normalized.sort_by(|a, b| {
        price_metric(a, PriceMode::Unit).total_cmp(&price_metric(b, PriceMode::Unit))
    });
    normalized
}

/// Derive the SEK fields of one offer given its resolved SEK rate.
pub fn price_offer(offer: VendorOffer, quantity: Option<u32>, rate: Option<f64>) -> VendorOfferWithComputed {
    let quantity = quantity.filter(|qty| *qty > 0);
    let rate = rate.filter(|rate| rate.is_finite() && *rate > 0.0);

    let price_sek = match rate {
        Some(rate) if offer.has_usable_price() => Some(offer.price * rate),
        _ => None,
    };
    let total_sek = match (quantity, price_sek) {
        (Some(qty), Some(price)) => Some(price * f64::from(qty)),
        _ => price_sek,
    };

    let (effective_unit_sek, effective_total_sek) = match effective_price(&offer, quantity, rate) {
        Some((unit, total)) => (Some(unit), Some(total)),
        None => (price_sek, total_sek),
    };

    let lead_time_days = estimate_lead_time_days(&offer.lead_time);

    VendorOfferWithComputed {
        offer,
        price_sek,
        total_sek,
        effective_unit_sek,
        effective_total_sek,
        lead_time_days,
    }
}

/// Unit and total SEK price from the tier that applies to `quantity`.
///
/// Uses the highest tier at or below the quantity, or the lowest tier when
/// the quantity is under every threshold.
fn effective_price(offer: &VendorOffer, quantity: Option<u32>, rate: Option<f64>) -> Option<(f64, f64)> {
    let quantity = quantity?;
    let rate = rate?;

    let tiers = offer.tiers();
    let chosen = tiers
        .iter()
        .rev()
        .find(|tier| tier.qty <= quantity)
        .or_else(|| tiers.first())?;

    let unit = chosen.price * rate;
    Some((unit, unit * f64::from(quantity)))
}

fn lead_time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)([0-9]+)\s*(day|days|dag|dagar|week|weeks|vecka|veckor)")
            .expect("lead time pattern is a valid regex")
    })
}

/// Days from free-text lead times such as `3 dagar` or `2-4 weeks`.
///
/// The first count followed by a day or week unit wins; weeks are seven
/// days.
pub fn estimate_lead_time_days(lead_time: &str) -> Option<u32> {
    let captures = lead_time_pattern().captures(lead_time)?;
    let value: u32 = captures.get(1)?.as_str().parse().ok()?;
    let unit = captures.get(2)?.as_str().to_lowercase();

    if unit.starts_with("week") || unit.starts_with("veck") {
        value.checked_mul(7)
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::testing::{offer, FixedRates, LADDER};
    use proptest::prelude::*;

    #[tokio::test]
    async fn test_tier_selection() {
        let rates = FixedRates::new(&[]);
        let offers = vec![offer("Farnell", 10.0, "SEK", &LADDER)];

        let normalized = normalize_offers(offers, Some(12), &rates).await;
        assert_eq!(normalized[0].effective_unit_sek, Some(8.0));
        assert_eq!(normalized[0].effective_total_sek, Some(96.0));
        assert_eq!(normalized[0].price_sek, Some(10.0));
        assert_eq!(normalized[0].total_sek, Some(120.0));
    }

    #[tokio::test]
    async fn test_tier_fallback_below_second_threshold() {
        let rates = FixedRates::new(&[]);
        let normalized = normalize_offers(vec![offer("Farnell", 10.0, "SEK", &LADDER)], Some(5), &rates).await;
        assert_eq!(normalized[0].effective_unit_sek, Some(10.0));
        assert_eq!(normalized[0].effective_total_sek, Some(50.0));
    }

    #[test]
    fn test_quantity_below_every_tier_uses_lowest_tier() {
        let priced = price_offer(offer("TTI", 9.0, "SEK", &[(10, 7.0), (100, 5.0)]), Some(3), Some(1.0));
        assert_eq!(priced.effective_unit_sek, Some(7.0));
        assert_eq!(priced.effective_total_sek, Some(21.0));
    }

    #[test]
    fn test_currency_conversion() {
        let priced = price_offer(offer("Mouser", 2.0, "EUR", &[(1, 2.0), (25, 1.5)]), Some(30), Some(11.0));
        assert_eq!(priced.price_sek, Some(22.0));
        assert_eq!(priced.total_sek, Some(660.0));
        assert_eq!(priced.effective_unit_sek, Some(16.5));
        assert_eq!(priced.effective_total_sek, Some(495.0));
    }

    #[test]
    fn test_unknown_quantity_mirrors_flat_price() {
        let priced = price_offer(offer("RS", 4.0, "SEK", &LADDER), None, Some(1.0));
        assert_eq!(priced.price_sek, Some(4.0));
        assert_eq!(priced.total_sek, Some(4.0));
        assert_eq!(priced.effective_unit_sek, Some(4.0));
        assert_eq!(priced.effective_total_sek, Some(4.0));
    }

    #[test]
    fn test_unresolved_rate_leaves_offer_unpriced() {
        let priced = price_offer(offer("Arrow", 4.0, "XYZ", &LADDER), Some(12), None);
        assert_eq!(priced.price_sek, None);
        assert_eq!(priced.total_sek, None);
        assert_eq!(priced.effective_unit_sek, None);
        assert_eq!(priced.effective_total_sek, None);
    }

    #[test]
    fn test_invalid_flat_price_is_unpriced() {
        for price in [0.0, -3.0, f64::NAN] {
            let priced = price_offer(offer("Nexelec", price, "SEK", &[]), Some(2), Some(1.0));
            assert_eq!(priced.price_sek, None);
            assert_eq!(priced.effective_unit_sek, None);
        }
    }

    #[tokio::test]
    async fn test_sorted_by_effective_unit_price_with_unpriced_last() {
        let rates = FixedRates::new(&[("EUR", 11.0)]);
        let offers = vec![
            offer("Unpriced", 1.0, "XYZ", &[]),
            offer("Expensive", 30.0, "SEK", &[]),
            offer("TierWinner", 40.0, "SEK", &[(1, 40.0), (10, 5.0)]),
            offer("Euro", 2.0, "EUR", &[]),
        ];

        let normalized = normalize_offers(offers, Some(10), &rates).await;
        let order: Vec<&str> = normalized.iter().map(|o| o.offer.vendor.as_str()).collect();
        assert_eq!(order, vec!["TierWinner", "Euro", "Expensive", "Unpriced"]);
    }

    #[tokio::test]
    async fn test_equal_prices_keep_upstream_order() {
        let rates = FixedRates::new(&[]);
        let offers = vec![
            offer("First", 5.0, "SEK", &[]),
            offer("Cheaper", 4.0, "SEK", &[]),
            offer("Second", 5.0, "SEK", &[]),
            offer("Third", 5.0, "SEK", &[]),
        ];

        let normalized = normalize_offers(offers, Some(1), &rates).await;
        let order: Vec<&str> = normalized.iter().map(|o| o.offer.vendor.as_str()).collect();
        assert_eq!(order, vec!["Cheaper", "First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_normalization_is_deterministic() {
        let rates = FixedRates::new(&[("EUR", 11.37), ("USD", 10.41)]);
        let offers = vec![
            offer("A", 1.23, "EUR", &LADDER),
            offer("B", 0.99, "USD", &[(5, 0.9), (1, 0.99)]),
            offer("C", 12.0, "SEK", &[]),
        ];

        let first = normalize_offers(offers.clone(), Some(7), &rates).await;
        let second = normalize_offers(offers, Some(7), &rates).await;
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_lead_time_estimation() {
        assert_eq!(estimate_lead_time_days("3 dagar"), Some(3));
        assert_eq!(estimate_lead_time_days("1 day"), Some(1));
        assert_eq!(estimate_lead_time_days("2 weeks"), Some(14));
        assert_eq!(estimate_lead_time_days("Ca 4 veckor"), Some(28));
        assert_eq!(estimate_lead_time_days("1 VECKA"), Some(7));
        assert_eq!(estimate_lead_time_days("2-3 Weeks"), Some(21));
        assert_eq!(estimate_lead_time_days("In stock"), None);
        assert_eq!(estimate_lead_time_days(""), None);
    }

    proptest! {
        #[test]
        fn prop_effective_total_is_unit_times_quantity(
            quantity in 1u32..1000,
            rate in 0.5f64..20.0,
            base in 1.0f64..100.0,
        ) {
            let priced = price_offer(
                offer("P", base, "EUR", &[(1, base), (10, base * 0.9), (100, base * 0.8)]),
                Some(quantity),
                Some(rate),
            );
            let unit = priced.effective_unit_sek.unwrap();
            let total = priced.effective_total_sek.unwrap();
            prop_assert!((unit * f64::from(quantity) - total).abs() < 1e-9 * total.max(1.0));
            prop_assert!(unit <= priced.price_sek.unwrap() + 1e-9);
        }
    }
}
