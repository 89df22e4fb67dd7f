//! Travel-time resolver seam.

use async_trait::async_trait;

use crate::error::RouteResult;
use crate::types::listing::Coords;

/// Resolves a drive-time duration, in seconds, between two points.
///
/// There are no retries anywhere in the pipeline: a failed call is terminal
/// for that listing in that run, and the fetcher treats every error the same
/// as an over-threshold result.
#[async_trait]
pub trait Router: Send + Sync {
    async fn resolve(&self, start: Coords, end: Coords) -> RouteResult<f64>;
}
