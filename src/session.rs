//! One end-to-end locate-and-plot flow.

use crate::coord::Coord;
use crate::err::Result;
use crate::geolocate::{acquire_location, LocateError, LocateOptions};
use crate::map::{MapSurface, MapView, PlotLocation};
use crate::search::Hospital;
use crate::status::StatusSink;
use std::collections::BTreeMap;
use std::future::Future;
use tracing::debug;

/// Zoom level used once the map is centered on the user.
const CENTERED_ZOOM: u8 = 13;

/// Holds everything one locate-and-plot flow needs: the map view, the
/// status surface and the location options. Only one flow can be in
/// flight at a time, since [`Session::run`] borrows the session
/// mutably for its whole duration.
#[derive(Debug)]
pub struct Session<S: MapSurface, T: StatusSink> {
    view: MapView<S>,
    status: T,
    options: LocateOptions,
}

impl<S: MapSurface, T: StatusSink> Session<S, T> {
    pub fn new(surface: S, status: T, options: LocateOptions) -> Self {
        Self {
            view: MapView::new(surface),
            status,
            options,
        }
    }

    /// Acquire a location, center the map on it, find nearby hospitals
    /// and plot them.
    ///
    /// `attempt` is one platform positioning attempt (retried once on
    /// timeout); `find` performs the hospital search from the acquired
    /// origin — typically `|origin| client.find_nearby(origin, params)`.
    ///
    /// A location failure, an exhausted search and a network or decode
    /// failure are all surfaced through the status sink's alert *and*
    /// returned as the error, so no failure path is silent.
    pub async fn run<L, LFut, F, FFut>(
        &mut self,
        attempt: L,
        find: F,
    ) -> Result<Vec<Hospital>>
    where
        L: FnMut(LocateOptions) -> LFut,
        LFut: Future<Output = std::result::Result<Coord, LocateError>>,
        F: FnOnce(Coord) -> FFut,
        FFut: Future<Output = Result<Vec<Hospital>>>,
    {
        self.status.loading(true);
        let outcome = self.run_inner(attempt, find).await;
        self.status.loading(false);

        if let Err(err) = &outcome {
            self.status.alert(&err.to_string());
        }
        outcome
    }

    async fn run_inner<L, LFut, F, FFut>(
        &mut self,
        attempt: L,
        find: F,
    ) -> Result<Vec<Hospital>>
    where
        L: FnMut(LocateOptions) -> LFut,
        LFut: Future<Output = std::result::Result<Coord, LocateError>>,
        F: FnOnce(Coord) -> FFut,
        FFut: Future<Output = Result<Vec<Hospital>>>,
    {
        self.status.progress("finding location…");
        let origin = acquire_location(self.options, attempt).await?;
        debug!(%origin, "location acquired");
        self.view.center_on(origin, CENTERED_ZOOM);

        self.status.progress("finding hospitals…");
        let hospitals = find(origin).await?;

        self.status.progress("plotting hospitals…");
        self.view.plot(
            &[PlotLocation {
                coord: origin,
                tags: BTreeMap::new(),
            }],
            true,
        );
        let locations: Vec<PlotLocation> = hospitals
            .iter()
            .map(|hospital| PlotLocation {
                coord: hospital.coord,
                tags: hospital.tags.clone(),
            })
            .collect();
        self.view.plot(&locations, false);

        self.status.progress("Done!");
        Ok(hospitals)
    }

    /// The map view, for wiring pointer handlers after a run.
    pub fn view_mut(&mut self) -> &mut MapView<S> {
        &mut self.view
    }

    pub fn view(&self) -> &MapView<S> {
        &self.view
    }
}
