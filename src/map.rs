//! Plotting markers and dispatching pointer interactions.
//!
//! The crate does not render anything itself; the host binds a
//! [`MapSurface`] to whatever mapping widget it uses. Markers live in a
//! [`MarkerRegistry`] arena and pointer events are resolved through a
//! single map-wide hit-test rather than one handler per marker.

use crate::coord::Coord;
use std::collections::BTreeMap;

/// A position on the map surface, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pixel {
    pub x: f64,
    pub y: f64,
}

/// The icon style used for a marker.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Icon {
    /// The user's own location.
    Origin,
    Hospital,
}

/// Identifies a marker within a [`MarkerRegistry`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct MarkerId(pub usize);

/// A plotted point and the attributes shown when it is hovered or
/// clicked.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub coord: Coord,
    pub icon: Icon,
    pub tags: BTreeMap<String, String>,
}

/// Arena of plotted markers, indexed by [`MarkerId`].
#[derive(Clone, Debug, Default)]
pub struct MarkerRegistry {
    markers: Vec<Marker>,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, marker: Marker) -> MarkerId {
        let id = MarkerId(self.markers.len());
        self.markers.push(marker);
        id
    }

    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// The rendering target the host binds to a real mapping widget.
pub trait MapSurface {
    fn set_center(&mut self, center: Coord);
    fn set_zoom(&mut self, zoom: u8);
    /// Add a marker layer for `id` at `coord`.
    fn add_marker(&mut self, id: MarkerId, coord: Coord, icon: Icon);
    /// Return the marker under the given pixel, if any.
    fn hit_test(&self, pixel: Pixel) -> Option<MarkerId>;
    /// Show the transient hover popup near `pixel`.
    fn show_hover_popup(&mut self, pixel: Pixel, text: &str);
    fn clear_hover_popup(&mut self);
    /// Render text into the persistent side panel.
    fn show_panel(&mut self, text: &str);
}

/// A map surface plus the registry of markers plotted on it.
#[derive(Debug)]
pub struct MapView<S: MapSurface> {
    surface: S,
    registry: MarkerRegistry,
}

/// One location to plot: a coordinate and its descriptive attributes.
#[derive(Clone, Debug)]
pub struct PlotLocation {
    pub coord: Coord,
    pub tags: BTreeMap<String, String>,
}

impl<S: MapSurface> MapView<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            registry: MarkerRegistry::new(),
        }
    }

    /// Center the map on `center` at the given zoom level.
    pub fn center_on(&mut self, center: Coord, zoom: u8) {
        self.surface.set_center(center);
        self.surface.set_zoom(zoom);
    }

    /// Plot one marker per location. The origin marker gets a distinct
    /// icon; every marker keeps its tags for later display.
    pub fn plot(&mut self, locations: &[PlotLocation], is_origin: bool) {
        let icon = if is_origin {
            Icon::Origin
        } else {
            Icon::Hospital
        };

        for location in locations {
            let id = self.registry.insert(Marker {
                coord: location.coord,
                icon,
                tags: location.tags.clone(),
            });
            self.surface.add_marker(id, location.coord, icon);
        }
    }

    /// Pointer-move handler: show the hover popup for a tagged marker
    /// under the cursor, otherwise clear it.
    pub fn on_pointer_move(&mut self, pixel: Pixel) {
        match self.tagged_marker_at(pixel) {
            Some(text) => self.surface.show_hover_popup(pixel, &text),
            None => self.surface.clear_hover_popup(),
        }
    }

    /// Click handler: render a tagged marker's attributes into the
    /// persistent side panel.
    pub fn on_click(&mut self, pixel: Pixel) {
        if let Some(text) = self.tagged_marker_at(pixel) {
            self.surface.show_panel(&text);
        }
    }

    pub fn registry(&self) -> &MarkerRegistry {
        &self.registry
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    fn tagged_marker_at(&self, pixel: Pixel) -> Option<String> {
        let marker = self
            .surface
            .hit_test(pixel)
            .and_then(|id| self.registry.get(id))?;
        if marker.tags.is_empty() {
            None
        } else {
            Some(popup_text(&marker.tags))
        }
    }
}

/// Format tags as one `key: value` line each.
pub fn popup_text(tags: &BTreeMap<String, String>) -> String {
    let lines: Vec<String> = tags
        .iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect();
    lines.join("\n")
}
