//! Acquiring the user's location.
//!
//! The platform location provider is modelled as an async attempt
//! function so hosts can plug in whatever positioning they have (GPS,
//! browser bridge, IP lookup). [`acquire_location`] wraps an attempt
//! with the fixed retry policy: one automatic retry after a timeout,
//! anything else is fatal.

use crate::coord::Coord;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// How long to wait before the single retry after a timeout.
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Positioning accuracy preference passed to the location provider.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Accuracy {
    Low,
    High,
}

/// Configuration handed to the location provider on every attempt.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocateOptions {
    pub accuracy: Accuracy,
    /// A cached fix no older than this may be returned instead of a
    /// fresh one.
    pub max_cache_age: Duration,
    /// How long the provider may take before reporting a timeout.
    pub timeout: Duration,
}

impl Default for LocateOptions {
    fn default() -> Self {
        Self {
            accuracy: Accuracy::Low,
            max_cache_age: Duration::from_secs(6 * 60),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Errors that can occur while acquiring a location.
#[derive(Debug, Error)]
pub enum LocateError {
    /// The provider did not respond within its timeout. Recovered once
    /// by [`acquire_location`]; fatal on the second occurrence.
    #[error("The location provider timed out")]
    Timeout,
    #[error("Permission to read the location was denied")]
    PermissionDenied,
    #[error("The position is currently unavailable")]
    PositionUnavailable,
    /// A provider-specific failure.
    #[error("Location provider error: {0}")]
    Provider(String),
    /// An error originating in the underlying HTTP client, for
    /// providers that locate over the network.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Run one location `attempt`, retrying exactly once (after a one
/// second pause) if the first attempt times out.
///
/// Any non-timeout error, or a second timeout, is returned to the
/// caller unchanged. There is deliberately no backoff schedule and no
/// third attempt.
pub async fn acquire_location<F, Fut>(
    options: LocateOptions,
    mut attempt: F,
) -> Result<Coord, LocateError>
where
    F: FnMut(LocateOptions) -> Fut,
    Fut: Future<Output = Result<Coord, LocateError>>,
{
    debug!("trying to get location");
    match attempt(options).await {
        Ok(coord) => Ok(coord),
        Err(LocateError::Timeout) => {
            warn!("location attempt timed out, retrying once");
            tokio::time::sleep(RETRY_DELAY).await;
            attempt(options).await
        }
        Err(err) => Err(err),
    }
}

/// A location provider backed by an IP-geolocation HTTP endpoint that
/// returns JSON with `lat`/`lon` fields.
#[derive(Clone, Debug)]
pub struct IpLocationProvider {
    client: reqwest::Client,
    endpoint: url::Url,
}

#[derive(Deserialize)]
struct IpLocationBody {
    lat: f64,
    lon: f64,
}

impl IpLocationProvider {
    pub fn new(endpoint: url::Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Issue one positioning request, honoring `options.timeout`.
    pub async fn locate(
        &self,
        options: LocateOptions,
    ) -> Result<Coord, LocateError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .timeout(options.timeout)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    LocateError::Timeout
                } else {
                    LocateError::Http(err)
                }
            })?;

        let response = response.error_for_status()?;
        let body: IpLocationBody = response
            .json()
            .await
            .map_err(|err| LocateError::Provider(err.to_string()))?;

        Ok(Coord::new(body.lat, body.lon))
    }
}
