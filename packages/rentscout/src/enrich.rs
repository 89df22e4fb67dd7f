//! Per-listing enrichment: cached raw listings plus travel times in,
//! enriched records out.

use tracing::{info, warn};

use crate::error::Result;
use crate::stores::files::FileStore;
use crate::traits::rater::Rater;
use crate::types::listing::{EnrichedListing, RawListing, TravelTimeIndex};
use crate::types::rating::RatingOutcome;

/// Derive the BER score from the rating code, −40..100.
///
/// The letter sets the base (A 80, B 50, C 20, D −10, E −30; F and G are −40
/// with the digit ignored) and the digit adjusts it (+20 for 1, +10 for 2).
/// Missing or empty ratings score 0.
pub fn ber_score(rating: &str) -> i32 {
    let mut chars = rating.chars();
    let Some(letter) = chars.next() else { return 0 };

    let mut score = match letter {
        'F' | 'G' => return -40,
        'A' => 80,
        'B' => 50,
        'C' => 20,
        'D' => -10,
        'E' => -30,
        _ => 0,
    };

    if let Some(digit) = chars.next() {
        score += match digit {
            '1' => 20,
            '2' => 10,
            _ => 0,
        };
    }

    score
}

/// Strip everything that is not a digit and parse the remainder.
pub fn parse_price(price: &str) -> Option<f64> {
    let digits: String = price.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Consumes the fetch-stage cache, rates each candidate, and persists the
/// enriched output artifact.
pub struct DetailExtractor<'a, A> {
    rater: &'a A,
}

impl<'a, A: Rater> DetailExtractor<'a, A> {
    pub fn new(rater: &'a A) -> Self {
        Self { rater }
    }

    /// Enrich every cached listing for `city` and overwrite the output
    /// artifact with the full collection.
    ///
    /// Listings are dropped, never partially enriched: a missing travel-time
    /// entry, a missing required field, a rating failure, or a refusal each
    /// skip the listing and the run continues.
    pub async fn enrich(&self, store: &FileStore, city: &str) -> Result<Vec<EnrichedListing>> {
        let (listings, travel_times) = store.load(city)?;

        let mut enriched = Vec::new();
        for listing in &listings {
            if let Some(record) = self.enrich_one(listing, &travel_times).await {
                enriched.push(record);
            }
        }

        store.save_enriched(city, &enriched)?;
        info!(city = %city, enriched = enriched.len(), "enrichment complete");
        Ok(enriched)
    }

    async fn enrich_one(
        &self,
        listing: &RawListing,
        travel_times: &TravelTimeIndex,
    ) -> Option<EnrichedListing> {
        let Some(id) = listing.id() else {
            warn!("cached listing without identifier, skipped");
            return None;
        };

        // Cached before its travel time was known, or resolution failed then.
        let Some(&travel_time) = travel_times.get(id) else {
            warn!(listing = %id, "no travel time on record, skipped");
            return None;
        };

        let (Some(price), Some(ber), Some(coords)) = (
            listing.price.as_deref(),
            listing.ber_rating(),
            listing.coords(),
        ) else {
            warn!(listing = %id, "missing price, BER rating, or point, skipped");
            return None;
        };

        let Some(price) = parse_price(price) else {
            warn!(listing = %id, "unparseable price, skipped");
            return None;
        };

        info!(listing = %id, travel_secs = travel_time, "rating listing");

        let outcome = match self.rater.rate(coords).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(listing = %id, error = %e, "rating call failed, listing dropped");
                return None;
            }
        };

        let rating = match outcome {
            RatingOutcome::Rated(rating) => rating,
            RatingOutcome::Refused => {
                info!(listing = %id, "rating refused, listing dropped");
                return None;
            }
        };

        Some(EnrichedListing {
            name: id.to_string(),
            price,
            ber_rating: ber_score(ber),
            public_travel_time: travel_time,
            safety_rating: rating.safety_rating,
            gym_rating: rating.gym_rating,
            restaurants_rating: rating.restaurants_rating,
            outdoors_rating: rating.outdoors_rating,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRater;
    use crate::types::listing::{Ber, Point};

    #[test]
    fn ber_score_matches_the_table() {
        assert_eq!(ber_score("A1"), 100);
        assert_eq!(ber_score("A2"), 90);
        assert_eq!(ber_score("B1"), 70);
        assert_eq!(ber_score("B2"), 60);
        assert_eq!(ber_score("B3"), 50);
        assert_eq!(ber_score("C"), 20);
        assert_eq!(ber_score("C3"), 20);
        assert_eq!(ber_score("D1"), 10);
        assert_eq!(ber_score("E2"), -20);
        assert_eq!(ber_score("F9"), -40);
        assert_eq!(ber_score("G1"), -40);
        assert_eq!(ber_score(""), 0);
    }

    #[test]
    fn unknown_letter_keeps_base_zero_but_applies_the_digit() {
        assert_eq!(ber_score("Z1"), 20);
        assert_eq!(ber_score("Z"), 0);
    }

    #[test]
    fn parse_price_strips_currency_noise() {
        assert_eq!(parse_price("€2,100 per month"), Some(2100.0));
        assert_eq!(parse_price("1400"), Some(1400.0));
        assert_eq!(parse_price("POA"), None);
        assert_eq!(parse_price(""), None);
    }

    fn listing(path: &str) -> RawListing {
        RawListing {
            seo_friendly_path: Some(path.to_string()),
            property_type: Some("Apartment".to_string()),
            num_bedrooms: Some("1 Bed".to_string()),
            price: Some("€2,100 per month".to_string()),
            ber: Some(Ber {
                rating: Some("B1".to_string()),
            }),
            point: Some(Point {
                coordinates: vec![-6.26, 53.35],
            }),
        }
    }

    fn store_with(
        listings: &[RawListing],
        travel_times: &TravelTimeIndex,
    ) -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("cache"), dir.path().join("output"));
        store.save("testville", listings, travel_times).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn enriches_a_complete_listing() {
        let mut travel_times = TravelTimeIndex::new();
        travel_times.insert("/p1".to_string(), 400.0);
        let (_dir, store) = store_with(&[listing("/p1")], &travel_times);

        let rater = MockRater::rating(50, 50, 50, 50);
        let extractor = DetailExtractor::new(&rater);
        let enriched = extractor.enrich(&store, "testville").await.unwrap();

        assert_eq!(enriched.len(), 1);
        let record = &enriched[0];
        assert_eq!(record.name, "/p1");
        assert_eq!(record.price, 2100.0);
        assert_eq!(record.ber_rating, 70);
        assert_eq!(record.public_travel_time, 400.0);
        assert_eq!(record.safety_rating, 50);

        // The output artifact holds the same collection.
        assert_eq!(store.load_enriched("testville").unwrap(), enriched);
    }

    #[tokio::test]
    async fn listing_without_travel_time_is_skipped() {
        let mut travel_times = TravelTimeIndex::new();
        travel_times.insert("/p1".to_string(), 400.0);
        let (_dir, store) = store_with(&[listing("/p1"), listing("/orphan")], &travel_times);

        let rater = MockRater::rating(50, 50, 50, 50);
        let extractor = DetailExtractor::new(&rater);
        let enriched = extractor.enrich(&store, "testville").await.unwrap();

        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].name, "/p1");
        // The orphan never cost a rating call.
        assert_eq!(rater.calls().len(), 1);
    }

    #[tokio::test]
    async fn missing_required_fields_skip_the_listing() {
        let mut no_price = listing("/no-price");
        no_price.price = None;
        let mut no_ber = listing("/no-ber");
        no_ber.ber = None;
        let mut no_point = listing("/no-point");
        no_point.point = None;
        let mut bad_price = listing("/bad-price");
        bad_price.price = Some("price on application".to_string());

        let mut travel_times = TravelTimeIndex::new();
        for id in ["/no-price", "/no-ber", "/no-point", "/bad-price"] {
            travel_times.insert(id.to_string(), 300.0);
        }
        let (_dir, store) = store_with(&[no_price, no_ber, no_point, bad_price], &travel_times);

        let rater = MockRater::rating(50, 50, 50, 50);
        let extractor = DetailExtractor::new(&rater);
        let enriched = extractor.enrich(&store, "testville").await.unwrap();

        assert!(enriched.is_empty());
        assert!(rater.calls().is_empty());
    }

    #[tokio::test]
    async fn refusal_drops_the_listing_entirely() {
        let mut travel_times = TravelTimeIndex::new();
        travel_times.insert("/p1".to_string(), 400.0);
        let (_dir, store) = store_with(&[listing("/p1")], &travel_times);

        let rater = MockRater::refusing();
        let extractor = DetailExtractor::new(&rater);
        let enriched = extractor.enrich(&store, "testville").await.unwrap();

        assert!(enriched.is_empty());
        assert!(store.load_enriched("testville").unwrap().is_empty());
    }

    #[tokio::test]
    async fn rating_failure_drops_the_listing_and_continues() {
        let mut travel_times = TravelTimeIndex::new();
        travel_times.insert("/p1".to_string(), 400.0);
        let (_dir, store) = store_with(&[listing("/p1")], &travel_times);

        let rater = MockRater::failing();
        let extractor = DetailExtractor::new(&rater);
        let enriched = extractor.enrich(&store, "testville").await.unwrap();

        assert!(enriched.is_empty());
    }
}
