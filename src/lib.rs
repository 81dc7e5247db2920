//! # Overview
//! This crate finds hospitals near the user. It acquires a location
//! (with a fixed single retry on timeout), queries the OpenStreetMap
//! Overpass API with an expanding search radius until enough hospitals
//! are found, ranks them by great-circle distance, and plots them as
//! markers with `key: value` popups on a host-provided map surface.
//!
//! The crate renders nothing itself: the host binds the [`MapSurface`]
//! and [`StatusSink`] traits to its mapping widget and status UI.
//!
//! # Usage
//! ```rust,no_run
//! use mednearby::{
//!     IpLocationProvider, LocateOptions, OverpassClient, SearchParams,
//! };
//! use url::Url;
//!
//! # async fn run() {
//! let client = OverpassClient::new(
//!     Url::parse(mednearby::DEFAULT_INTERPRETER_URL).unwrap(),
//!     None,
//! )
//! .unwrap();
//!
//! let provider = IpLocationProvider::new(
//!     Url::parse("http://ip-api.com/json/").unwrap(),
//! );
//! let origin = mednearby::acquire_location(LocateOptions::default(), |opts| {
//!     provider.locate(opts)
//! })
//! .await
//! .unwrap();
//!
//! let hospitals = client
//!     .find_nearby(origin, SearchParams::default())
//!     .await
//!     .unwrap();
//! for hospital in &hospitals {
//!     println!("{:.2} km  {:?}", hospital.distance_km, hospital.tags.get("name"));
//! }
//! # }
//! ```

mod coord;
mod element;
mod err;
pub mod geolocate;
mod map;
mod search;
mod session;
mod status;

pub use coord::Coord;
pub use element::{OverpassResponse, Partitioned, RawElement};
pub use err::Error;
pub use geolocate::{
    acquire_location, Accuracy, IpLocationProvider, LocateError,
    LocateOptions,
};
pub use map::{
    popup_text, Icon, MapSurface, MapView, Marker, MarkerId,
    MarkerRegistry, Pixel, PlotLocation,
};
pub use search::{Hospital, SearchParams};
pub use session::Session;
pub use status::{LogStatus, StatusSink};

use err::Result;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// The main public Overpass interpreter endpoint.
pub const DEFAULT_INTERPRETER_URL: &str =
    "https://overpass-api.de/api/interpreter";

/// A client for querying an Overpass interpreter endpoint.
#[derive(Clone, Debug)]
pub struct OverpassClient {
    client: reqwest::Client,
    interpreter_url: Url,
}

impl OverpassClient {
    /// Create a new `OverpassClient` for the given interpreter
    /// endpoint, optionally with an overall request timeout.
    ///
    /// # Example
    /// ```rust,no_run
    /// use mednearby::OverpassClient;
    /// use url::Url;
    /// let url = Url::parse(mednearby::DEFAULT_INTERPRETER_URL).unwrap();
    /// let client = OverpassClient::new(url, None).unwrap();
    /// ```
    pub fn new(
        interpreter_url: Url,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        if interpreter_url.cannot_be_a_base() {
            let msg = "the interpreter URL must be a valid base URL";
            return Err(Error::UrlFormat(msg.to_owned()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            interpreter_url,
        })
    }

    /// Create a client, passing in an existing `reqwest::Client`. If
    /// creating multiple clients, the same `reqwest::Client` should be
    /// shared between them.
    pub fn new_with_client(
        interpreter_url: Url,
        reqwest_client: reqwest::Client,
    ) -> Result<Self> {
        if interpreter_url.cannot_be_a_base() {
            let msg = "the interpreter URL must be a valid base URL";
            return Err(Error::UrlFormat(msg.to_owned()));
        }

        Ok(Self {
            client: reqwest_client,
            interpreter_url,
        })
    }

    /// Return the interpreter URL being used by this client.
    pub fn interpreter_url(&self) -> &Url {
        &self.interpreter_url
    }

    /// Issue one Overpass query for hospital-tagged entities within
    /// `radius_m` metres of `origin`.
    pub async fn query_radius(
        &self,
        origin: Coord,
        radius_m: u32,
    ) -> Result<OverpassResponse> {
        let url = self.query_url(origin, radius_m);
        debug!(%url, "sending Overpass query");

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?;

        let json: serde_json::Value = response.json().await?;
        serde_json::from_value(json)
            .map_err(|err| Error::UnexpectedResponse {
                msg: err.to_string(),
            })
    }

    /// Find up to `params.count` hospitals near `origin`, sorted
    /// ascending by distance, growing the search radius by
    /// `params.increment_m` until enough are found.
    ///
    /// Returns [`Error::SearchExhausted`] if the radius grows past
    /// `params.max_radius_m` first.
    pub async fn find_nearby(
        &self,
        origin: Coord,
        params: SearchParams,
    ) -> Result<Vec<Hospital>> {
        search::search_loop(origin, params, |radius_m| {
            self.query_radius(origin, radius_m)
        })
        .await
    }

    /// The GET URL for one radius query, with the Overpass QL payload
    /// embedded in the `data` query parameter.
    fn query_url(&self, origin: Coord, radius_m: u32) -> Url {
        let mut url = self.interpreter_url.clone();
        url.query_pairs_mut()
            .append_pair("data", &hospital_query(origin, radius_m));
        url
    }
}

/// Build the Overpass QL payload requesting hospital-tagged nodes,
/// ways and relations within `radius_m` metres of `origin`, followed
/// by the supporting nodes the ways and relations reference.
fn hospital_query(origin: Coord, radius_m: u32) -> String {
    let around = format!("around:{},{},{}", radius_m, origin.lat(), origin.lng());
    format!(
        "[out:json];\
         (node[\"amenity\"=\"hospital\"]({around});\
         way[\"amenity\"=\"hospital\"]({around});\
         relation[\"amenity\"=\"hospital\"]({around}););\
         out;>;out skel qt;",
        around = around,
    )
}

#[cfg(test)]
mod test {
    use super::{hospital_query, OverpassClient};
    use crate::coord::Coord;
    use crate::err::Error;
    use url::Url;

    #[test]
    fn query_requests_all_three_element_kinds() {
        let query = hospital_query(Coord::new(51.5074, -0.1278), 2000);

        assert!(query.starts_with("[out:json];"));
        assert!(query
            .contains("node[\"amenity\"=\"hospital\"](around:2000,51.5074,-0.1278)"));
        assert!(query
            .contains("way[\"amenity\"=\"hospital\"](around:2000,51.5074,-0.1278)"));
        assert!(query.contains(
            "relation[\"amenity\"=\"hospital\"](around:2000,51.5074,-0.1278)"
        ));
        // Supporting nodes are recursed and emitted as skeletons.
        assert!(query.ends_with("out;>;out skel qt;"));
    }

    #[test]
    fn query_url_embeds_payload_as_data_parameter() {
        let url = Url::parse("https://overpass.example.com/api/interpreter")
            .unwrap();
        let client = OverpassClient::new(url, None).unwrap();

        let query_url = client.query_url(Coord::new(1.0, 2.0), 500);
        let (key, payload) = query_url.query_pairs().next().unwrap();
        assert_eq!(&*key, "data");
        assert!(payload.contains("around:500,1,2"));
    }

    #[test]
    fn rejects_non_base_url() {
        let url = Url::parse("mailto:someone@example.com").unwrap();
        let result = OverpassClient::new(url, None);
        assert!(matches!(result, Err(Error::UrlFormat(_))));
    }
}
