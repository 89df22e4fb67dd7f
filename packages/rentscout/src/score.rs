//! Deterministic scoring and ranking.
//!
//! Pure functions over enriched listings; every weight and breakpoint comes
//! from the preset so the two historical pipeline variants stay expressible.

use crate::config::PipelinePreset;
use crate::types::listing::{EnrichedListing, RankedListing};

/// Downward parabola centered on the target price; zero at the target,
/// symmetric, increasingly negative as the rent drifts either way.
pub fn price_score(price: f64, preset: &PipelinePreset) -> f64 {
    -preset.price_weight * ((preset.price_target - price).abs() / 300.0).powi(2)
}

/// Piecewise commute score.
///
/// Up to 400 seconds the score interpolates linearly from 250 down to 200;
/// past that it decays linearly, crossing zero at the commute cap and going
/// negative beyond it.
pub fn distance_score(duration_secs: f64, preset: &PipelinePreset) -> f64 {
    if duration_secs <= 400.0 {
        200.0 + (400.0 - duration_secs) / 8.0
    } else {
        100.0 * (preset.commute_cap_secs - duration_secs) / preset.commute_cap_secs
    }
}

/// Composite desirability score for one enriched listing.
pub fn score(listing: &EnrichedListing, preset: &PipelinePreset) -> f64 {
    let qualitative = 25.0
        * f64::from(
            listing.safety_rating
                + listing.gym_rating
                + listing.restaurants_rating
                + listing.outdoors_rating,
        );

    price_score(listing.price, preset)
        + f64::from(listing.ber_rating)
        + distance_score(listing.public_travel_time, preset)
        + qualitative
}

/// Rank listings by score, descending.
///
/// The sort is stable, so ties keep their input order and reports stay
/// reproducible run to run.
pub fn rank(listings: &[EnrichedListing], preset: &PipelinePreset) -> Vec<RankedListing> {
    let mut ranked: Vec<RankedListing> = listings
        .iter()
        .map(|listing| RankedListing {
            name: listing.name.clone(),
            score: score(listing, preset),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}
