//! Listing records as they move through the pipeline: scraped, filtered,
//! enriched, ranked.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A longitude/latitude pair, GeoJSON order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coords {
    pub lng: f64,
    pub lat: f64,
}

/// Travel durations in seconds keyed by listing identifier.
///
/// One entry per listing that passed the commute filter. Insertion order is
/// preserved so the cache artifact stays diffable between runs.
pub type TravelTimeIndex = IndexMap<String, f64>;

/// A listing exactly as scraped from the search payload.
///
/// Field names mirror the site's embedded JSON (camelCase on disk). Every
/// field is optional at parse time; the admission rule and the enricher
/// enforce presence where it matters. Immutable once fetched; owned by the
/// cache store between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawListing {
    pub seo_friendly_path: Option<String>,
    pub property_type: Option<String>,
    pub num_bedrooms: Option<String>,
    pub price: Option<String>,
    pub ber: Option<Ber>,
    pub point: Option<Point>,
}

/// Building-energy-rating block, e.g. `{"rating": "B2"}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Ber {
    pub rating: Option<String>,
}

/// GeoJSON-style point: `coordinates` is `[lng, lat]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Point {
    pub coordinates: Vec<f64>,
}

impl Point {
    pub fn coords(&self) -> Option<Coords> {
        match self.coordinates.as_slice() {
            [lng, lat, ..] => Some(Coords {
                lng: *lng,
                lat: *lat,
            }),
            _ => None,
        }
    }
}

impl RawListing {
    /// Site-relative path, the unique key across all artifacts.
    pub fn id(&self) -> Option<&str> {
        self.seo_friendly_path.as_deref()
    }

    pub fn coords(&self) -> Option<Coords> {
        self.point.as_ref().and_then(Point::coords)
    }

    pub fn ber_rating(&self) -> Option<&str> {
        self.ber.as_ref().and_then(|b| b.rating.as_deref())
    }
}

/// The pipeline's terminal, queryable record. Never mutated after creation.
///
/// Serialized camelCase so the output artifact keeps its historical shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedListing {
    /// Listing identifier (the site-relative path).
    pub name: String,
    /// Numeric monthly rent, digits stripped from the price string.
    pub price: f64,
    /// Derived BER score, −40..100.
    pub ber_rating: i32,
    /// Drive time to work in seconds.
    pub public_travel_time: f64,
    pub safety_rating: i32,
    pub gym_rating: i32,
    pub restaurants_rating: i32,
    pub outdoors_rating: i32,
}

/// One line of the final report; exists only for the sorted output.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedListing {
    pub name: String,
    pub score: f64,
}
