//! Testing utilities including mock implementations.
//!
//! These make it possible to exercise the fetch, enrich, and ranking stages
//! without real network or AI calls.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{FetchError, FetchResult, RatingError, RouteError, RouteResult};
use crate::payload::PayloadAnchor;
use crate::traits::{pages::PageSource, rater::Rater, router::Router};
use crate::types::listing::Coords;
use crate::types::rating::{PropertyRating, RatingOutcome};

/// A mock page source serving canned HTML by exact URL.
///
/// Unknown URLs fail the way a 404 from the real source would, and every
/// request is recorded for assertions.
#[derive(Default)]
pub struct MockPageSource {
    pages: HashMap<String, String>,
    requests: Arc<RwLock<Vec<String>>>,
}

impl MockPageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a canned response for a URL.
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// Every URL requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.read().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for MockPageSource {
    async fn get_html(&self, url: &str) -> FetchResult<String> {
        self.requests.write().unwrap().push(url.to_string());
        match self.pages.get(url) {
            Some(html) => Ok(html.clone()),
            None => Err(FetchError::Http(Box::new(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no canned page for {url}"),
            )))),
        }
    }
}

/// A mock router returning configured durations.
///
/// Durations can be keyed per start coordinate, with an optional fallback for
/// everything else. With neither configured, every call fails with
/// [`RouteError::NoRoute`].
#[derive(Default)]
pub struct MockRouter {
    durations: HashMap<String, f64>,
    default: Option<f64>,
    calls: Arc<RwLock<usize>>,
}

fn coords_key(coords: Coords) -> String {
    format!("{:.6},{:.6}", coords.lng, coords.lat)
}

impl MockRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Duration returned for any start point without its own entry.
    pub fn with_default(mut self, duration_secs: f64) -> Self {
        self.default = Some(duration_secs);
        self
    }

    /// Duration returned for one specific start point.
    pub fn with_duration(mut self, start: Coords, duration_secs: f64) -> Self {
        self.durations.insert(coords_key(start), duration_secs);
        self
    }

    /// Number of resolve calls made so far.
    pub fn calls(&self) -> usize {
        *self.calls.read().unwrap()
    }
}

#[async_trait]
impl Router for MockRouter {
    async fn resolve(&self, start: Coords, _end: Coords) -> RouteResult<f64> {
        *self.calls.write().unwrap() += 1;
        self.durations
            .get(&coords_key(start))
            .copied()
            .or(self.default)
            .ok_or(RouteError::NoRoute)
    }
}

enum MockRaterBehavior {
    Rate(PropertyRating),
    Refuse,
    Fail,
}

/// A mock rater with a fixed response, recording every rated location.
pub struct MockRater {
    behavior: MockRaterBehavior,
    calls: Arc<RwLock<Vec<Coords>>>,
}

impl MockRater {
    /// Rate every location with the given four scores.
    pub fn rating(safety: i32, gym: i32, restaurants: i32, outdoors: i32) -> Self {
        Self {
            behavior: MockRaterBehavior::Rate(PropertyRating {
                safety_rating: safety,
                gym_rating: gym,
                restaurants_rating: restaurants,
                outdoors_rating: outdoors,
            }),
            calls: Arc::default(),
        }
    }

    /// Refuse every rating request.
    pub fn refusing() -> Self {
        Self {
            behavior: MockRaterBehavior::Refuse,
            calls: Arc::default(),
        }
    }

    /// Fail every rating request with a network error.
    pub fn failing() -> Self {
        Self {
            behavior: MockRaterBehavior::Fail,
            calls: Arc::default(),
        }
    }

    /// Locations rated so far, in order.
    pub fn calls(&self) -> Vec<Coords> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl Rater for MockRater {
    async fn rate(&self, location: Coords) -> Result<RatingOutcome, RatingError> {
        self.calls.write().unwrap().push(location);
        match &self.behavior {
            MockRaterBehavior::Rate(rating) => Ok(RatingOutcome::Rated(rating.clone())),
            MockRaterBehavior::Refuse => Ok(RatingOutcome::Refused),
            MockRaterBehavior::Fail => {
                Err(RatingError::Network("mock network failure".to_string()))
            }
        }
    }
}

/// Build a search-results page embedding the given listing objects in the
/// payload script tag, shaped the way the live site nests them.
pub fn search_page_html(listings: &[Value]) -> String {
    let wrapped: Vec<Value> = listings
        .iter()
        .map(|listing| json!({ "listing": listing }))
        .collect();
    let payload = json!({
        "props": {
            "pageProps": {
                "listings": wrapped,
            }
        }
    });

    let anchor = PayloadAnchor::default();
    format!(
        "<html><body><div>results</div>{}{}{}</body></html>",
        anchor.open, payload, anchor.close
    )
}
