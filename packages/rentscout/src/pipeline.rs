//! End-to-end orchestration of the three stages: fetch, enrich, rank.
//!
//! Each stage checkpoints to the [`FileStore`], so a run can resume from
//! whichever artifact already exists instead of repaying the upstream API
//! calls.

use tracing::info;

use crate::config::PipelinePreset;
use crate::enrich::DetailExtractor;
use crate::error::Result;
use crate::fetcher::ListingFetcher;
use crate::score;
use crate::stores::files::FileStore;
use crate::traits::pages::PageSource;
use crate::traits::rater::Rater;
use crate::traits::router::Router;
use crate::types::listing::{Coords, RankedListing};

/// Which checkpoints to trust on this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Run every stage from scratch.
    Full,
    /// Reuse the cached fetch artifacts, re-run enrichment and ranking.
    SkipFetch,
    /// Reuse the enriched output as-is and only re-rank.
    SkipAll,
}

/// Wires the stage components together over shared borrows, mirroring how
/// the individual stages are injected in their own tests.
pub struct Pipeline<'a, P, R, A> {
    pages: &'a P,
    router: &'a R,
    rater: &'a A,
    store: &'a FileStore,
    preset: PipelinePreset,
    work: Coords,
}

impl<'a, P, R, A> Pipeline<'a, P, R, A>
where
    P: PageSource,
    R: Router,
    A: Rater,
{
    pub fn new(
        pages: &'a P,
        router: &'a R,
        rater: &'a A,
        store: &'a FileStore,
        preset: PipelinePreset,
        work: Coords,
    ) -> Self {
        Self {
            pages,
            router,
            rater,
            store,
            preset,
            work,
        }
    }

    /// Run the pipeline for one city and return its ranked report.
    ///
    /// A failed fetch aborts the run before the save, so an existing
    /// checkpoint is never overwritten with an aborted invocation's nothing.
    pub async fn run(&self, city: &str, mode: RunMode) -> Result<Vec<RankedListing>> {
        if mode == RunMode::Full {
            let fetcher = ListingFetcher::new(self.pages, self.router, &self.preset, self.work);
            let (listings, travel_times) = fetcher.fetch(city).await?;
            self.store.save(city, &listings, &travel_times)?;
        } else {
            info!(city = %city, "reusing cached fetch artifacts");
        }

        if mode != RunMode::SkipAll {
            let extractor = DetailExtractor::new(self.rater);
            extractor.enrich(self.store, city).await?;
        } else {
            info!(city = %city, "reusing enriched output");
        }

        let enriched = self.store.load_enriched(city)?;
        let ranked = score::rank(&enriched, &self.preset);
        info!(city = %city, ranked = ranked.len(), "pipeline complete");
        Ok(ranked)
    }
}
