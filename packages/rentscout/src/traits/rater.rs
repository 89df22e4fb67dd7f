//! Rating capability seam.

use async_trait::async_trait;

use crate::error::RatingError;
use crate::types::listing::Coords;
use crate::types::rating::RatingOutcome;

/// Produces qualitative ratings for a location, or a refusal.
///
/// Refusal and malformed-schema failures are both terminal per call; there is
/// no retry or fallback model.
#[async_trait]
pub trait Rater: Send + Sync {
    async fn rate(&self, location: Coords) -> Result<RatingOutcome, RatingError>;
}
