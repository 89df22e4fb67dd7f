//! Structured-output types for the rating capability.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Four qualitative scores in [0, 100], produced once per listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRating {
    /// Crime rate, safety of the area.
    pub safety_rating: i32,
    /// How close nearby gyms are.
    pub gym_rating: i32,
    /// Restaurants and cafes.
    pub restaurants_rating: i32,
    /// Parks, green spaces, outdoor access.
    pub outdoors_rating: i32,
}

/// Outcome of one rating call.
///
/// A refusal is a distinct outcome, not an error: callers must handle both
/// branches, and the enricher drops refused listings entirely rather than
/// producing a partial record.
#[derive(Debug, Clone, PartialEq)]
pub enum RatingOutcome {
    Rated(PropertyRating),
    Refused,
}

/// Extended single-call report for one property URL.
///
/// Combines price, BER, and travel-time context with amenity flags. Used by
/// the one-off `inspect` command rather than the batch pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyReport {
    pub price: i32,
    pub ber_rating: i32,
    /// Approximate travel time from the property to work, in seconds.
    pub travel_time: i32,
    pub safety_rating: i32,
    pub restaurants_rating: i32,
    pub outdoors_rating: i32,
    pub has_gym: bool,
    pub has_washer: bool,
    pub has_dryer: bool,
    pub has_dishwasher: bool,
    pub is_pet_friendly: bool,
}

/// Outcome of one report call.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    Reported(PropertyReport),
    Refused,
}
