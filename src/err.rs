use crate::geolocate::LocateError;
use thiserror::Error;

/// Encapsulates the errors that can occur in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// An error which originated from the underlying HTTP library.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// An error which occurred while parsing a URL.
    #[error("Could not parse a URL: {0}")]
    UrlParse(#[from] url::ParseError),
    /// The given URL cannot be used as an Overpass interpreter
    /// endpoint.
    #[error("URL is not usable as an Overpass endpoint: {0}")]
    UrlFormat(String),
    /// The Overpass server responded with something other than the
    /// expected element list.
    #[error("Unexpected Overpass response: {msg}")]
    UnexpectedResponse { msg: String },
    /// The search radius grew past its maximum without finding enough
    /// tagged entities.
    #[error(
        "No results within {max_radius_m} m (search stopped at {radius_m} m)"
    )]
    SearchExhausted { radius_m: u32, max_radius_m: u32 },
    /// An error which occurred while acquiring the user's location.
    #[error("Could not acquire a location: {0}")]
    Locate(#[from] LocateError),
}

impl Error {
    /// Return true if this error indicates the search radius was
    /// exhausted without enough results.
    pub fn is_search_exhausted(&self) -> bool {
        matches!(self, Self::SearchExhausted { .. })
    }
}

pub(crate) type Result<T> = std::result::Result<T, Error>;
