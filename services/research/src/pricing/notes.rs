//! Advisory notes attached to a research result.

use wiretronic_models::VendorOfferWithComputed;

/// Upper bound on upstream notes kept per result.
pub const MAX_NOTES: usize = 6;

/// Upstream notes longer than this are truncated.
pub const MAX_NOTE_CHARS: usize = 400;

/// Notes pointing out a higher tier whose total undercuts the requested
/// quantity's total.
///
/// Emits at most one note per offer and nothing when the quantity is unknown.
pub fn derive_notes(offers: &[VendorOfferWithComputed], quantity: Option<u32>) -> Vec<String> {
    let quantity = match quantity.filter(|qty| *qty > 0) {
        Some(qty) => qty,
        None => return Vec::new(),
    };

    offers
        .iter()
        .filter_map(|offer| tier_note(offer, quantity))
        .collect()
}

fn tier_note(offer: &VendorOfferWithComputed, quantity: u32) -> Option<String> {
    offer.effective_unit_sek?;

    let tiers = offer.offer.tiers();
    let current = tiers.iter().rev().find(|tier| tier.qty <= quantity)?;
    let next = tiers.iter().find(|tier| tier.qty > quantity)?;

    let rate = offer.price_sek? / offer.offer.price;
    if !rate.is_finite() || rate <= 0.0 {
        return None;
    }

    let current_total = current.price * rate * f64::from(quantity);
    let next_total = next.price * rate * f64::from(next.qty);
    if next_total >= current_total {
        return None;
    }

    Some(format!(
        "{}: Prissteg vid {} st ger lägre total ({} SEK) än {} st ({} SEK).",
        offer.offer.vendor,
        next.qty,
        whole_sek(next_total),
        quantity,
        whole_sek(current_total)
    ))
}

/// Rounds half away from zero.
fn whole_sek(amount: f64) -> i64 {
    amount.round() as i64
}

/// Clean up notes returned by the research service.
///
/// Trims, drops blanks and bare URLs, truncates long notes and keeps the
/// first [`MAX_NOTES`].
pub fn sanitize_notes(notes: Vec<String>) -> Vec<String> {
    notes
        .into_iter()
        .map(|note| note.trim().to_string())
        .filter(|note| !note.is_empty())
        .filter(|note| !is_url(note))
        .map(truncate_note)
        .take(MAX_NOTES)
        .collect()
}

fn is_url(note: &str) -> bool {
    let lower = note
        .get(..8)
        .unwrap_or(note)
        .to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn truncate_note(note: String) -> String {
    if note.chars().count() <= MAX_NOTE_CHARS {
        return note;
    }
    let mut truncated: String = note.chars().take(MAX_NOTE_CHARS - 3).collect();
    truncated.push_str("...");
    truncated
}
