//! Search-result acquisition and the admission filter.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::PipelinePreset;
use crate::error::{FetchError, FetchResult, PayloadError};
use crate::payload::{extract_embedded_json, page_listings, PayloadAnchor};
use crate::traits::pages::PageSource;
use crate::traits::router::Router;
use crate::types::listing::{Coords, RawListing, TravelTimeIndex};

const PAGE_SIZE: usize = 20;
const DEFAULT_BASE_URL: &str = "https://www.daft.ie";

/// Fetches qualifying listings for a city, one search page at a time.
///
/// Admission happens before any enrichment cost is spent: the type/bedroom
/// rule first, then the commute check against the routing service. Multi-unit
/// developments are resolved to an individual unit via a secondary fetch of
/// the listing's own page, running the same rule over the units.
pub struct ListingFetcher<'a, P, R> {
    pages: &'a P,
    router: &'a R,
    preset: &'a PipelinePreset,
    work: Coords,
    base_url: String,
    anchor: PayloadAnchor,
}

impl<'a, P: PageSource, R: Router> ListingFetcher<'a, P, R> {
    pub fn new(pages: &'a P, router: &'a R, preset: &'a PipelinePreset, work: Coords) -> Self {
        Self {
            pages,
            router,
            preset,
            work,
            base_url: DEFAULT_BASE_URL.to_string(),
            anchor: PayloadAnchor::default(),
        }
    }

    /// Point the fetcher at a different host (tests, mirrors).
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.base_url = base.into();
        self
    }

    /// Use a different payload anchor.
    pub fn with_anchor(mut self, anchor: PayloadAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Fetch and filter every search page for `city`.
    ///
    /// Pagination continues while the last page came back full and the page
    /// index is under the preset's cap. A page-1 failure aborts the whole
    /// invocation with an error, so callers never mistake it for an assembled
    /// (empty) result set; a later page failing is logged and skipped without
    /// stopping pagination.
    pub async fn fetch(&self, city: &str) -> FetchResult<(Vec<RawListing>, TravelTimeIndex)> {
        let mut accepted = Vec::new();
        let mut travel_times = TravelTimeIndex::new();

        for page in 1..=self.preset.page_limit {
            let batch = match self.fetch_page(city, page).await {
                Ok(batch) => batch,
                Err(e) => {
                    warn!(city = %city, page, error = %e, "search page failed");
                    if page == 1 {
                        return Err(e);
                    }
                    continue;
                }
            };

            let batch_len = batch.len();
            debug!(city = %city, page, listings = batch_len, "search page fetched");

            for listing in batch {
                if let Some((admitted, duration)) = self.admit(listing).await {
                    if let Some(id) = admitted.id() {
                        travel_times.insert(id.to_string(), duration);
                    }
                    accepted.push(admitted);
                }
            }

            // A short page means the result set is exhausted.
            if batch_len < PAGE_SIZE {
                break;
            }
        }

        info!(city = %city, accepted = accepted.len(), "fetch complete");
        Ok((accepted, travel_times))
    }

    async fn fetch_page(&self, city: &str, page: u32) -> FetchResult<Vec<RawListing>> {
        let url = self.search_url(city, page)?;
        let html = self.pages.get_html(url.as_str()).await?;
        let payload = extract_embedded_json(&html, &self.anchor)?;
        Ok(parse_listings(&payload)?)
    }

    fn search_url(&self, city: &str, page: u32) -> FetchResult<Url> {
        let base = format!("{}/property-for-rent/{}", self.base_url, city);
        let offset = (page - 1) * PAGE_SIZE as u32;

        Url::parse_with_params(
            &base,
            &[
                ("rentalPrice_from", self.preset.rental_price_min.to_string()),
                ("rentalPrice_to", self.preset.rental_price_max.to_string()),
                ("sort", "publishDateDesc".to_string()),
                ("pageSize", PAGE_SIZE.to_string()),
                ("from", offset.to_string()),
            ],
        )
        .map_err(|_| FetchError::InvalidUrl { url: base })
    }

    /// Apply the admission rule to one scraped listing.
    ///
    /// Returns the admitted listing and its commute duration in seconds, or
    /// `None` when any part of the rule rejects it.
    async fn admit(&self, listing: RawListing) -> Option<(RawListing, f64)> {
        let id = listing.id()?.to_string();

        let property_type = match listing.property_type.as_deref() {
            Some(t) if !t.eq_ignore_ascii_case("studio") => t.to_string(),
            _ => return None,
        };

        if property_type == "Apartment" {
            match listing.num_bedrooms.as_deref() {
                Some(beds) if beds.eq_ignore_ascii_case("1 bed") => {}
                _ => return None,
            }
            let duration = self.commute_check(&listing).await?;
            return Some((listing, duration));
        }

        if property_type != "Apartments" {
            return None;
        }

        // Multi-unit development: the search entry has no unit of its own, so
        // resolve via the listing's page and run the same rule on its units.
        self.resolve_unit(&id).await
    }

    async fn resolve_unit(&self, path: &str) -> Option<(RawListing, f64)> {
        let url = format!("{}{}", self.base_url, path);

        let html = match self.pages.get_html(&url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(listing = %path, error = %e, "unit page fetch failed");
                return None;
            }
        };

        let units = match extract_embedded_json(&html, &self.anchor)
            .and_then(|payload| parse_listings(&payload))
        {
            Ok(units) => units,
            Err(e) => {
                warn!(listing = %path, error = %e, "unit payload unusable");
                return None;
            }
        };

        for unit in units {
            if let Some(admitted) = self.admit_boxed(unit).await {
                return Some(admitted);
            }
        }

        debug!(listing = %path, "no qualifying unit");
        None
    }

    // admit() and resolve_unit() are mutually recursive; boxing breaks the
    // infinite future type.
    fn admit_boxed(
        &self,
        listing: RawListing,
    ) -> Pin<Box<dyn Future<Output = Option<(RawListing, f64)>> + Send + '_>> {
        Box::pin(self.admit(listing))
    }

    /// The commute filter: resolve drive time to work and compare against the
    /// admission threshold. Resolution failure and over-threshold results are
    /// treated identically.
    async fn commute_check(&self, listing: &RawListing) -> Option<f64> {
        let origin = listing.coords()?;
        let id = listing.id().unwrap_or_default();

        let duration = match self.router.resolve(origin, self.work).await {
            Ok(duration) => duration,
            Err(e) => {
                warn!(listing = %id, error = %e, "could not resolve travel time");
                return None;
            }
        };

        if duration > self.preset.commute_threshold_secs() {
            info!(listing = %id, duration_secs = duration, "over the commute threshold, excluded");
            return None;
        }

        Some(duration)
    }
}

/// Deserialize each `listing` object; entries that do not look like listings
/// are dropped rather than failing the page.
fn parse_listings(payload: &Value) -> Result<Vec<RawListing>, PayloadError> {
    Ok(page_listings(payload)?
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{search_page_html, MockPageSource, MockRouter};

    const WORK: Coords = Coords {
        lng: -6.25,
        lat: 53.34,
    };

    fn listing(path: &str, property_type: &str, beds: Option<&str>) -> Value {
        let mut value = serde_json::json!({
            "seoFriendlyPath": path,
            "propertyType": property_type,
            "price": "€2,000 per month",
            "ber": { "rating": "B2" },
            "point": { "coordinates": [-6.26, 53.35] },
        });
        if let Some(beds) = beds {
            value["numBedrooms"] = Value::String(beds.to_string());
        }
        value
    }

    fn page_url(city: &str, page: u32) -> String {
        format!(
            "https://www.daft.ie/property-for-rent/{city}?rentalPrice_from=1400&rentalPrice_to=2800&sort=publishDateDesc&pageSize=20&from={}",
            (page - 1) * 20
        )
    }

    #[tokio::test]
    async fn one_bed_apartment_is_admitted_with_travel_time() {
        let pages = MockPageSource::new().with_page(
            page_url("testville", 1),
            search_page_html(&[listing("/p1", "Apartment", Some("1 Bed"))]),
        );
        let router = MockRouter::new().with_default(900.0);
        let preset = PipelinePreset::wide_net();

        let fetcher = ListingFetcher::new(&pages, &router, &preset, WORK);
        let (accepted, travel_times) = fetcher.fetch("testville").await.unwrap();

        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].id(), Some("/p1"));
        assert_eq!(travel_times.get("/p1"), Some(&900.0));
    }

    #[tokio::test]
    async fn studio_is_rejected_regardless_of_other_fields() {
        let pages = MockPageSource::new().with_page(
            page_url("testville", 1),
            search_page_html(&[
                listing("/studio", "Studio", Some("1 Bed")),
                listing("/studio-lower", "studio", Some("1 Bed")),
            ]),
        );
        let router = MockRouter::new().with_default(60.0);
        let preset = PipelinePreset::wide_net();

        let fetcher = ListingFetcher::new(&pages, &router, &preset, WORK);
        let (accepted, travel_times) = fetcher.fetch("testville").await.unwrap();

        assert!(accepted.is_empty());
        assert!(travel_times.is_empty());
        // Rejected before any routing cost was spent.
        assert_eq!(router.calls(), 0);
    }

    #[tokio::test]
    async fn two_bed_apartment_is_rejected() {
        let pages = MockPageSource::new().with_page(
            page_url("testville", 1),
            search_page_html(&[listing("/p2", "Apartment", Some("2 Bed"))]),
        );
        let router = MockRouter::new().with_default(60.0);
        let preset = PipelinePreset::wide_net();

        let fetcher = ListingFetcher::new(&pages, &router, &preset, WORK);
        let (accepted, _) = fetcher.fetch("testville").await.unwrap();

        assert!(accepted.is_empty());
        assert_eq!(router.calls(), 0);
    }

    #[tokio::test]
    async fn missing_type_or_bedrooms_is_rejected() {
        let mut no_type = listing("/no-type", "House", None);
        no_type.as_object_mut().unwrap().remove("propertyType");

        let pages = MockPageSource::new().with_page(
            page_url("testville", 1),
            search_page_html(&[no_type, listing("/no-beds", "Apartment", None)]),
        );
        let router = MockRouter::new().with_default(60.0);
        let preset = PipelinePreset::wide_net();

        let fetcher = ListingFetcher::new(&pages, &router, &preset, WORK);
        let (accepted, _) = fetcher.fetch("testville").await.unwrap();

        assert!(accepted.is_empty());
    }

    #[tokio::test]
    async fn over_threshold_listing_is_excluded_from_both_collections() {
        let pages = MockPageSource::new().with_page(
            page_url("testville", 1),
            search_page_html(&[listing("/far-away", "Apartment", Some("1 Bed"))]),
        );
        // wide_net threshold is 2400s.
        let router = MockRouter::new().with_default(2401.0);
        let preset = PipelinePreset::wide_net();

        let fetcher = ListingFetcher::new(&pages, &router, &preset, WORK);
        let (accepted, travel_times) = fetcher.fetch("testville").await.unwrap();

        assert!(accepted.is_empty());
        assert!(travel_times.is_empty());
        assert_eq!(router.calls(), 1);
    }

    #[tokio::test]
    async fn routing_failure_rejects_like_over_threshold() {
        let pages = MockPageSource::new().with_page(
            page_url("testville", 1),
            search_page_html(&[listing("/unroutable", "Apartment", Some("1 Bed"))]),
        );
        // No default duration: every resolution fails with NoRoute.
        let router = MockRouter::new();
        let preset = PipelinePreset::wide_net();

        let fetcher = ListingFetcher::new(&pages, &router, &preset, WORK);
        let (accepted, travel_times) = fetcher.fetch("testville").await.unwrap();

        assert!(accepted.is_empty());
        assert!(travel_times.is_empty());
    }

    #[tokio::test]
    async fn multi_unit_development_resolves_to_a_qualifying_unit() {
        let development = listing("/dev", "Apartments", None);
        let pages = MockPageSource::new()
            .with_page(
                page_url("testville", 1),
                search_page_html(&[development]),
            )
            .with_page(
                "https://www.daft.ie/dev",
                search_page_html(&[
                    listing("/dev/unit-2bed", "Apartment", Some("2 Bed")),
                    listing("/dev/unit-1bed", "Apartment", Some("1 Bed")),
                ]),
            );
        let router = MockRouter::new().with_default(1000.0);
        let preset = PipelinePreset::wide_net();

        let fetcher = ListingFetcher::new(&pages, &router, &preset, WORK);
        let (accepted, travel_times) = fetcher.fetch("testville").await.unwrap();

        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].id(), Some("/dev/unit-1bed"));
        assert_eq!(travel_times.get("/dev/unit-1bed"), Some(&1000.0));
    }

    #[tokio::test]
    async fn multi_unit_with_no_qualifying_units_is_rejected() {
        let pages = MockPageSource::new()
            .with_page(
                page_url("testville", 1),
                search_page_html(&[listing("/dev", "Apartments", None)]),
            )
            .with_page(
                "https://www.daft.ie/dev",
                search_page_html(&[listing("/dev/unit", "Apartment", Some("3 Bed"))]),
            );
        let router = MockRouter::new().with_default(60.0);
        let preset = PipelinePreset::wide_net();

        let fetcher = ListingFetcher::new(&pages, &router, &preset, WORK);
        let (accepted, _) = fetcher.fetch("testville").await.unwrap();

        assert!(accepted.is_empty());
    }

    #[tokio::test]
    async fn failed_secondary_fetch_rejects_only_that_listing() {
        let pages = MockPageSource::new().with_page(
            page_url("testville", 1),
            search_page_html(&[
                listing("/dev-dead-link", "Apartments", None),
                listing("/p1", "Apartment", Some("1 Bed")),
            ]),
        );
        let router = MockRouter::new().with_default(300.0);
        let preset = PipelinePreset::wide_net();

        let fetcher = ListingFetcher::new(&pages, &router, &preset, WORK);
        let (accepted, _) = fetcher.fetch("testville").await.unwrap();

        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].id(), Some("/p1"));
    }

    #[tokio::test]
    async fn first_page_failure_aborts_the_fetch() {
        let pages = MockPageSource::new();
        let router = MockRouter::new().with_default(60.0);
        let preset = PipelinePreset::wide_net();

        let fetcher = ListingFetcher::new(&pages, &router, &preset, WORK);
        let err = fetcher.fetch("testville").await.unwrap_err();

        assert!(matches!(err, FetchError::Http(_)));
    }

    #[tokio::test]
    async fn first_page_without_payload_aborts_the_fetch() {
        let pages = MockPageSource::new()
            .with_page(page_url("testville", 1), "<html>no data script</html>");
        let router = MockRouter::new().with_default(60.0);
        let preset = PipelinePreset::wide_net();

        let fetcher = ListingFetcher::new(&pages, &router, &preset, WORK);
        let err = fetcher.fetch("testville").await.unwrap_err();

        assert!(matches!(err, FetchError::Payload(_)));
    }

    #[tokio::test]
    async fn pagination_continues_while_pages_are_full() {
        let full_page: Vec<Value> = (0..20)
            .map(|i| listing(&format!("/page1-{i}"), "Apartment", Some("1 Bed")))
            .collect();
        let short_page = vec![listing("/page2-0", "Apartment", Some("1 Bed"))];

        let pages = MockPageSource::new()
            .with_page(page_url("testville", 1), search_page_html(&full_page))
            .with_page(page_url("testville", 2), search_page_html(&short_page));
        let router = MockRouter::new().with_default(100.0);
        let preset = PipelinePreset::wide_net();

        let fetcher = ListingFetcher::new(&pages, &router, &preset, WORK);
        let (accepted, _) = fetcher.fetch("testville").await.unwrap();

        assert_eq!(accepted.len(), 21);
        // Page 2 was short, so page 3 was never requested.
        assert_eq!(pages.requests().len(), 2);
    }

    #[tokio::test]
    async fn pagination_stops_at_the_page_cap() {
        let full_page: Vec<Value> = (0..20)
            .map(|i| listing(&format!("/x-{i}"), "House", None))
            .collect();

        let mut pages = MockPageSource::new();
        for page in 1..=10 {
            pages = pages.with_page(page_url("testville", page), search_page_html(&full_page));
        }
        let router = MockRouter::new().with_default(100.0);
        let preset = PipelinePreset::wide_net();

        let fetcher = ListingFetcher::new(&pages, &router, &preset, WORK);
        let _ = fetcher.fetch("testville").await.unwrap();

        // wide_net caps at 10 pages even though every page came back full.
        assert_eq!(pages.requests().len(), 10);
    }

    #[tokio::test]
    async fn later_page_failure_is_skipped_without_stopping() {
        let full_page: Vec<Value> = (0..20)
            .map(|i| listing(&format!("/a-{i}"), "House", None))
            .collect();
        let short_page = vec![listing("/b-0", "Apartment", Some("1 Bed"))];

        // Page 2 is missing entirely; page 3 still gets fetched.
        let pages = MockPageSource::new()
            .with_page(page_url("testville", 1), search_page_html(&full_page))
            .with_page(page_url("testville", 3), search_page_html(&short_page));
        let router = MockRouter::new().with_default(100.0);
        let preset = PipelinePreset::wide_net();

        let fetcher = ListingFetcher::new(&pages, &router, &preset, WORK);
        let (accepted, _) = fetcher.fetch("testville").await.unwrap();

        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].id(), Some("/b-0"));
    }
}
