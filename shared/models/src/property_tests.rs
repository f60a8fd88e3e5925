//! Property-based tests for the Wiretronic domain models.
//!
//! These cover the guarantees pricing code relies on: tier ordering,
//! input coercion and rate-table arithmetic.

use proptest::prelude::*;
use serde_json::json;
use std::collections::HashMap;

use crate::{quantity_from_f64, PriceBreak, RateTable, RawVendorOffer, VendorOffer};

prop_compose! {
    fn arb_price_break()(
        qty in 0u32..500,
        price in prop_oneof![
            -10.0f64..0.0,
            0.01f64..1000.0,
            Just(0.0),
            Just(f64::NAN),
            Just(f64::INFINITY),
        ],
    ) -> PriceBreak {
        PriceBreak { qty, price, currency: "SEK".to_string() }
    }
}

prop_compose! {
    fn arb_offer()(
        vendor in "[A-Za-z]{1,12}",
        price in 0.0f64..1000.0,
        price_breaks in prop::collection::vec(arb_price_break(), 0..8),
    ) -> VendorOffer {
        VendorOffer {
            vendor,
            price,
            currency: "SEK".to_string(),
            lead_time: String::new(),
            stock: String::new(),
            link: String::new(),
            moq: None,
            price_breaks,
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Usable tiers are strictly ascending and carry usable prices.
    #[test]
    fn prop_tiers_strictly_ascending(offer in arb_offer()) {
        let tiers = offer.tiers();
        for pair in tiers.windows(2) {
            prop_assert!(pair[0].qty < pair[1].qty);
        }
        for tier in &tiers {
            prop_assert!(tier.qty >= 1);
            prop_assert!(tier.price.is_finite() && tier.price > 0.0);
        }
    }

    /// Any upstream vendor object with a name survives validation and
    /// never yields a tier below quantity one.
    #[test]
    fn prop_named_raw_offers_validate(
        vendor in "[A-Za-z][A-Za-z ]{0,20}",
        price in -100.0f64..100.0,
        qty in -5.0f64..100.0,
    ) {
        let raw: RawVendorOffer = serde_json::from_value(json!({
            "vendor": vendor,
            "price": price,
            "priceBreaks": [{"qty": qty, "price": price, "currency": "EUR"}]
        })).unwrap();

        let offer = VendorOffer::from_raw(raw).unwrap();
        prop_assert_eq!(offer.vendor.as_str(), vendor.trim());
        prop_assert!(offer.price_breaks.iter().all(|tier| tier.qty >= 1));
        prop_assert_eq!(offer.price_breaks.len(), usize::from(quantity_from_f64(qty).is_some()));
    }

    /// Cross rates through the base agree with direct division.
    #[test]
    fn prop_cross_rate_consistent(sek in 0.1f64..50.0, usd in 0.1f64..5.0) {
        let table = RateTable::new(
            "EUR",
            HashMap::from([("SEK".to_string(), sek), ("USD".to_string(), usd)]),
        );

        let rate = table.rate_to_sek("USD").unwrap();
        prop_assert!((rate * usd - sek).abs() < 1e-9);
        prop_assert_eq!(table.rate_to_sek("EUR"), Some(sek));
    }
}
