use wiretronic_models::{PriceMode, VendorOfferWithComputed};

/// Comparison value for `mode`; unpriced offers rank last.
pub fn price_metric(offer: &VendorOfferWithComputed, mode: PriceMode) -> f64 {
    let metric = match mode {
        PriceMode::Total => offer.effective_total_sek.or(offer.total_sek),
        PriceMode::Unit => offer.effective_unit_sek.or(offer.price_sek),
    };
    metric.unwrap_or(f64::INFINITY)
}

/// Cheapest offer under `mode`. The earliest offer wins ties, including a
/// field where nothing is priced.
pub fn pick_best(offers: &[VendorOfferWithComputed], mode: PriceMode) -> Option<&VendorOfferWithComputed> {
    let mut offers = offers.iter();
    let mut best = offers.next()?;
    let mut best_metric = price_metric(best, mode);

    for offer in offers {
        let metric = price_metric(offer, mode);
        if metric < best_metric {
            best = offer;
            best_metric = metric;
        }
    }

    Some(best)
}
