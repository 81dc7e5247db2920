//! Typed model for the element list returned by the Overpass
//! interpreter. Each element is either a tagged entity (a node, way or
//! relation carrying descriptive key/value attributes) or an untagged
//! supporting node that exists only to supply coordinates.

use crate::coord::Coord;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// The body of an Overpass JSON response.
#[derive(Clone, Debug, Deserialize)]
pub struct OverpassResponse {
    /// Elements in server response order.
    #[serde(default)]
    pub elements: Vec<RawElement>,
}

/// A single element from an Overpass response.
#[derive(Clone, Debug, Deserialize)]
pub struct RawElement {
    /// `"node"`, `"way"` or `"relation"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub id: i64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Ids of the supporting nodes referenced by a way or relation.
    #[serde(default)]
    pub nodes: Vec<i64>,
    /// Descriptive attributes. Empty for supporting nodes.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl RawElement {
    /// Return true if this element carries descriptive attributes.
    pub fn is_tagged(&self) -> bool {
        !self.tags.is_empty()
    }

    /// Return this element's own coordinate, if it has one.
    pub fn coord(&self) -> Option<Coord> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(Coord::new(lat, lon)),
            _ => None,
        }
    }
}

/// An Overpass response split into tagged entities (in response order)
/// and an id lookup of the untagged supporting nodes.
#[derive(Clone, Debug, Default)]
pub struct Partitioned {
    pub tagged: Vec<RawElement>,
    pub node_coords: HashMap<i64, Coord>,
}

impl Partitioned {
    /// Split a response into tagged entities and supporting-node
    /// coordinates, preserving response order for the tagged entities.
    pub fn from_response(response: OverpassResponse) -> Self {
        let mut tagged = Vec::new();
        let mut node_coords = HashMap::new();

        for element in response.elements {
            if element.is_tagged() {
                tagged.push(element);
            } else if let Some(coord) = element.coord() {
                node_coords.insert(element.id, coord);
            }
        }

        Self {
            tagged,
            node_coords,
        }
    }

    /// Resolve a tagged entity's coordinate: the coordinate of the first
    /// referenced supporting node present in this response, falling back
    /// to the entity's own coordinate. Returns `None` for an entity with
    /// neither, which the caller should drop.
    pub fn resolve_coord(&self, element: &RawElement) -> Option<Coord> {
        let referenced = element
            .nodes
            .iter()
            .find_map(|id| self.node_coords.get(id).copied());

        let resolved = referenced.or_else(|| element.coord());
        if resolved.is_none() {
            warn!(
                kind = %element.kind,
                id = element.id,
                "element has no resolvable coordinate, dropping"
            );
        }
        resolved
    }
}
