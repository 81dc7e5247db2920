//! The radius-expanding nearest-hospital search.
//!
//! The search issues one Overpass query per pass, growing the radius by a
//! fixed increment until enough tagged entities are found or the maximum
//! radius is exceeded. The expansion is a bounded loop with a single
//! loop-top guard, so exhaustion is always reported as
//! [`Error::SearchExhausted`](crate::Error::SearchExhausted) rather than
//! silently dropped.

use crate::coord::Coord;
use crate::element::{OverpassResponse, Partitioned};
use crate::err::{Error, Result};
use std::collections::BTreeMap;
use std::future::Future;
use tracing::debug;

/// Parameters controlling one radius-expanding search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchParams {
    /// Radius of the first query, in metres.
    pub start_radius_m: u32,
    /// The search fails once the radius grows past this, in metres.
    pub max_radius_m: u32,
    /// How much the radius grows between passes, in metres.
    pub increment_m: u32,
    /// How many hospitals to return.
    pub count: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            start_radius_m: 2_000,
            max_radius_m: 20_000,
            increment_m: 2_000,
            count: 10,
        }
    }
}

/// A tagged hospital entity with its resolved coordinate and its
/// distance from the search origin.
#[derive(Clone, Debug, PartialEq)]
pub struct Hospital {
    pub id: i64,
    pub coord: Coord,
    pub distance_km: f64,
    pub tags: BTreeMap<String, String>,
}

/// Run the radius-expanding search, calling `fetch` once per pass with
/// the radius to query.
///
/// Returns at most `params.count` hospitals, sorted ascending by
/// distance from `origin` (ties broken by element id). If the radius
/// exceeds `params.max_radius_m` before enough tagged entities are
/// found, no further fetch is issued and `Error::SearchExhausted` is
/// returned.
pub(crate) async fn search_loop<F, Fut>(
    origin: Coord,
    params: SearchParams,
    mut fetch: F,
) -> Result<Vec<Hospital>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<OverpassResponse>>,
{
    let mut radius_m = params.start_radius_m;

    loop {
        if radius_m > params.max_radius_m {
            return Err(Error::SearchExhausted {
                radius_m,
                max_radius_m: params.max_radius_m,
            });
        }

        debug!(radius_m, "querying for hospitals");
        let response = fetch(radius_m).await?;
        let partitioned = Partitioned::from_response(response);

        if partitioned.tagged.len() >= params.count {
            return Ok(resolve_and_rank(origin, &partitioned, params.count));
        }

        debug!(
            found = partitioned.tagged.len(),
            wanted = params.count,
            "not enough results, growing radius"
        );
        radius_m += params.increment_m;
    }
}

/// Resolve coordinates, compute distances from `origin`, sort ascending
/// by distance and truncate to `count`.
fn resolve_and_rank(
    origin: Coord,
    partitioned: &Partitioned,
    count: usize,
) -> Vec<Hospital> {
    let mut hospitals: Vec<Hospital> = partitioned
        .tagged
        .iter()
        .filter_map(|element| {
            let coord = partitioned.resolve_coord(element)?;
            Some(Hospital {
                id: element.id,
                coord,
                distance_km: origin.distance_km(coord),
                tags: element.tags.clone(),
            })
        })
        .collect();

    hospitals.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .expect("haversine distances are always finite")
            .then_with(|| a.id.cmp(&b.id))
    });
    hospitals.truncate(count);
    hospitals
}

#[cfg(test)]
mod test {
    use super::{search_loop, SearchParams};
    use crate::coord::Coord;
    use crate::element::OverpassResponse;
    use crate::err::Error;
    use serde_json::json;
    use std::cell::RefCell;

    fn origin() -> Coord {
        Coord::new(51.5074, -0.1278)
    }

    fn params(count: usize) -> SearchParams {
        SearchParams {
            start_radius_m: 1_000,
            max_radius_m: 3_000,
            increment_m: 1_000,
            count,
        }
    }

    fn hospital_node(id: i64, lat: f64, lon: f64) -> serde_json::Value {
        json!({
            "type": "node",
            "id": id,
            "lat": lat,
            "lon": lon,
            "tags": {"amenity": "hospital", "name": format!("Hospital {}", id)}
        })
    }

    fn response(elements: Vec<serde_json::Value>) -> OverpassResponse {
        serde_json::from_value(json!({ "elements": elements })).unwrap()
    }

    #[tokio::test]
    async fn exact_count_returns_sorted_without_growth() {
        let radii = RefCell::new(Vec::new());

        // The farther hospital appears first in the response.
        let hospitals = search_loop(origin(), params(2), |radius| {
            radii.borrow_mut().push(radius);
            async move {
                Ok(response(vec![
                    hospital_node(2, 51.6000, -0.1278),
                    hospital_node(1, 51.5100, -0.1278),
                ]))
            }
        })
        .await
        .unwrap();

        assert_eq!(*radii.borrow(), vec![1_000]);
        assert_eq!(hospitals.len(), 2);
        assert_eq!(hospitals[0].id, 1);
        assert_eq!(hospitals[1].id, 2);
        assert!(hospitals[0].distance_km < hospitals[1].distance_km);
    }

    #[tokio::test]
    async fn short_response_grows_radius_by_increment() {
        let radii = RefCell::new(Vec::new());

        let hospitals = search_loop(origin(), params(2), |radius| {
            radii.borrow_mut().push(radius);
            async move {
                if radius == 1_000 {
                    Ok(response(vec![hospital_node(1, 51.5100, -0.1278)]))
                } else {
                    Ok(response(vec![
                        hospital_node(1, 51.5100, -0.1278),
                        hospital_node(2, 51.5200, -0.1278),
                    ]))
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(*radii.borrow(), vec![1_000, 2_000]);
        assert_eq!(hospitals.len(), 2);
    }

    #[tokio::test]
    async fn radius_past_max_fails_without_fetching() {
        let fetches = RefCell::new(0u32);

        let params = SearchParams {
            start_radius_m: 4_000,
            max_radius_m: 3_000,
            increment_m: 1_000,
            count: 1,
        };
        let result = search_loop(origin(), params, |_| {
            *fetches.borrow_mut() += 1;
            async { Ok(response(vec![])) }
        })
        .await;

        assert_eq!(*fetches.borrow(), 0);
        match result {
            Err(Error::SearchExhausted {
                radius_m,
                max_radius_m,
            }) => {
                assert_eq!(radius_m, 4_000);
                assert_eq!(max_radius_m, 3_000);
            }
            other => panic!("expected SearchExhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_area_exhausts_after_every_radius() {
        let radii = RefCell::new(Vec::new());

        let result = search_loop(origin(), params(1), |radius| {
            radii.borrow_mut().push(radius);
            async { Ok(response(vec![])) }
        })
        .await;

        assert_eq!(*radii.borrow(), vec![1_000, 2_000, 3_000]);
        assert!(matches!(result, Err(Error::SearchExhausted { .. })));
    }

    #[tokio::test]
    async fn way_resolves_to_first_referenced_node() {
        let way_response = response(vec![
            json!({"type": "node", "id": 100, "lat": 51.5080, "lon": -0.1278}),
            json!({
                "type": "way",
                "id": 7,
                "nodes": [100],
                "tags": {"amenity": "hospital", "name": "Way Hospital"}
            }),
        ]);

        let hospitals = search_loop(origin(), params(1), move |_| {
            let response = way_response.clone();
            async move { Ok(response) }
        })
        .await
        .unwrap();

        assert_eq!(hospitals.len(), 1);
        assert_eq!(hospitals[0].coord.lat(), 51.5080);
    }

    #[tokio::test]
    async fn truncates_to_count() {
        let hospitals = search_loop(origin(), params(1), |_| async {
            Ok(response(vec![
                hospital_node(1, 51.5100, -0.1278),
                hospital_node(2, 51.5200, -0.1278),
                hospital_node(3, 51.5300, -0.1278),
            ]))
        })
        .await
        .unwrap();

        assert_eq!(hospitals.len(), 1);
        assert_eq!(hospitals[0].id, 1);
    }

    #[tokio::test]
    async fn fetch_error_propagates() {
        let result = search_loop(origin(), params(1), |_| async {
            Err(Error::UnexpectedResponse {
                msg: "not JSON".to_owned(),
            })
        })
        .await;

        assert!(matches!(result, Err(Error::UnexpectedResponse { .. })));
    }
}
