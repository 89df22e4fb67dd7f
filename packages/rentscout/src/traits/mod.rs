//! Trait seams for the pipeline's external collaborators.
//!
//! Each external capability — the scraped site, the routing service, the
//! rating model — sits behind a small trait so tests can run against mocks
//! without network access.

pub mod pages;
pub mod rater;
pub mod router;
