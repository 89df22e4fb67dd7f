//! Rental Listing Discovery and Ranking Library
//!
//! Discovers rental listings from a paginated search site, filters them by
//! commute time, enriches the survivors with AI neighbourhood ratings, and
//! produces a deterministic ranked report. Each stage checkpoints to flat
//! JSON files so expensive upstream calls are only paid once per city.
//!
//! # Usage
//!
//! ```rust,ignore
//! use rentscout::{FileStore, Pipeline, PipelinePreset, RunMode};
//! use rentscout::routing::{OrsRouter, RateLimitedRouter};
//! use rentscout::traits::pages::HttpPageSource;
//! use rentscout::ai::openai::OpenAiRater;
//! use rentscout::types::listing::Coords;
//!
//! let config = rentscout::ScoutConfig::from_env()?;
//! let pages = HttpPageSource::new();
//! let router = RateLimitedRouter::new(
//!     OrsRouter::new(config.openrouteservice_api_key),
//!     30,
//! );
//! let rater = OpenAiRater::new(config.openai_api_key);
//! let store = FileStore::new(config.cache_dir, config.output_dir);
//!
//! let pipeline = Pipeline::new(
//!     &pages, &router, &rater, &store,
//!     PipelinePreset::wide_net(), config.work,
//! );
//! let ranked = pipeline.run("dublin-city", RunMode::Full).await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Seams for pages, routing, and rating (HTTP in production)
//! - [`types`] - Listing and rating data types
//! - [`fetcher`] - Paginated discovery with admission filtering
//! - [`enrich`] - AI rating plus BER and price derivation
//! - [`score`] - Deterministic scoring and ranking
//! - [`pipeline`] - Stage orchestration with checkpoint reuse
//! - [`stores`] - Flat-file JSON persistence
//! - [`testing`] - Mock implementations for testing

pub mod ai;
pub mod config;
pub mod enrich;
pub mod error;
pub mod fetcher;
pub mod payload;
pub mod pipeline;
pub mod routing;
pub mod score;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use config::{PipelinePreset, ScoutConfig};
pub use error::{
    ConfigError, FetchError, PayloadError, RatingError, RouteError, ScoutError, StoreError,
};
pub use traits::{pages::PageSource, rater::Rater, router::Router};
pub use types::{
    listing::{Coords, EnrichedListing, RankedListing, RawListing, TravelTimeIndex},
    rating::{PropertyRating, PropertyReport, RatingOutcome, ReportOutcome},
};

pub use ai::openai::OpenAiRater;
pub use enrich::{ber_score, parse_price, DetailExtractor};
pub use fetcher::ListingFetcher;
pub use payload::{extract_embedded_json, PayloadAnchor};
pub use pipeline::{Pipeline, RunMode};
pub use routing::{OrsRouter, RateLimitedRouter};
pub use score::{distance_score, price_score, rank, score};
pub use stores::files::FileStore;
pub use traits::pages::HttpPageSource;
