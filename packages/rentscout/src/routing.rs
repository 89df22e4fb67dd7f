//! openrouteservice-backed travel-time resolution.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::{RouteError, RouteResult};
use crate::traits::router::Router;
use crate::types::listing::Coords;

const DIRECTIONS_BASE: &str = "https://api.openrouteservice.org/v2/directions";

type DirectRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Travel-time resolver over the openrouteservice directions API.
///
/// Mode is fixed to the drive-time profile.
pub struct OrsRouter {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    profile: String,
}

impl OrsRouter {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: DIRECTIONS_BASE.to_string(),
            profile: "driving-car".to_string(),
        }
    }

    /// Set a custom base URL (for proxies or self-hosted instances).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl Router for OrsRouter {
    async fn resolve(&self, start: Coords, end: Coords) -> RouteResult<f64> {
        let url = format!(
            "{}/{}?api_key={}&start={},{}&end={},{}",
            self.base_url,
            self.profile,
            self.api_key.expose_secret(),
            start.lng,
            start.lat,
            end.lng,
            end.lat,
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RouteError::Http(Box::new(e)))?;

        let body = response
            .text()
            .await
            .map_err(|e| RouteError::Http(Box::new(e)))?;

        let duration = parse_duration(&serde_json::from_str::<serde_json::Value>(&body)?)?;
        debug!(duration_secs = duration, "route resolved");
        Ok(duration)
    }
}

/// Read the route duration from a directions response.
///
/// Absence of `features` is how the service signals an unresolvable route.
fn parse_duration(body: &serde_json::Value) -> RouteResult<f64> {
    body.pointer("/features/0/properties/summary/duration")
        .and_then(serde_json::Value::as_f64)
        .ok_or(RouteError::NoRoute)
}

/// A router wrapper that enforces a minimum spacing between calls.
///
/// The routing service's quota (≈30 calls/minute) is a hard external
/// constraint, not a performance knob: a permit must be acquired before every
/// call, no matter how long the previous call took, and the spacing applies
/// globally rather than per caller.
pub struct RateLimitedRouter<R> {
    inner: R,
    limiter: Arc<DirectRateLimiter>,
}

impl<R: Router> RateLimitedRouter<R> {
    /// Wrap `inner`, allowing one call per `60 / calls_per_minute` seconds
    /// with no burst.
    pub fn new(inner: R, calls_per_minute: u32) -> Self {
        let period = Duration::from_secs_f64(60.0 / f64::from(calls_per_minute.max(1)));
        let quota = Quota::with_period(period).expect("rate-limit period must be non-zero");
        Self {
            inner,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }
}

#[async_trait]
impl<R: Router> Router for RateLimitedRouter<R> {
    async fn resolve(&self, start: Coords, end: Coords) -> RouteResult<f64> {
        self.limiter.until_ready().await;
        self.inner.resolve(start, end).await
    }
}
