/// Mean Earth radius in kilometres, used by the haversine formula.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A geographical coordinate, in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coord {
    lat: f64,
    lng: f64,
}

impl Coord {
    /// Create a new `Coord`.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Return the latitude component of this `Coord`.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Return the longitude component of this `Coord`.
    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Return the great-circle distance between this coordinate and
    /// `other`, in kilometres.
    ///
    /// Uses the haversine formula. The intermediate term is clamped to
    /// `[0, 1]` so floating-point overshoot cannot push `sqrt` out of its
    /// domain for near-antipodal or near-identical points.
    ///
    /// # Example
    /// ```rust
    /// use mednearby::Coord;
    /// let new_york = Coord::new(40.7128, -74.0060);
    /// let london = Coord::new(51.5074, -0.1278);
    /// let km = new_york.distance_km(london);
    /// assert!((km - 5570.0).abs() < 10.0);
    /// ```
    pub fn distance_km(&self, other: Coord) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos()
                * other.lat.to_radians().cos()
                * (d_lng / 2.0).sin().powi(2);
        let a = a.max(0.0).min(1.0);

        2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.lat(), self.lng())
    }
}

#[cfg(test)]
mod test {
    use super::Coord;

    #[test]
    fn distance_to_self_is_zero() {
        let coord = Coord::new(40.7128, -74.0060);
        assert_eq!(coord.distance_km(coord), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Coord::new(40.7128, -74.0060);
        let b = Coord::new(51.5074, -0.1278);
        assert_eq!(a.distance_km(b), b.distance_km(a));
    }

    #[test]
    fn new_york_to_london() {
        let new_york = Coord::new(40.7128, -74.0060);
        let london = Coord::new(51.5074, -0.1278);
        let km = new_york.distance_km(london);
        assert!((km - 5570.0).abs() < 10.0, "got {} km", km);
    }

    #[test]
    fn near_antipodal_is_finite() {
        let a = Coord::new(0.0, 0.0);
        let b = Coord::new(0.0, 180.0);
        let km = a.distance_km(b);
        assert!(km.is_finite());
        // Half the Earth's circumference, give or take.
        assert!((km - 20015.0).abs() < 5.0, "got {} km", km);
    }

    #[test]
    fn tiny_separation_is_finite_and_small() {
        let a = Coord::new(40.0, -74.0);
        let b = Coord::new(40.0000001, -74.0000001);
        let km = a.distance_km(b);
        assert!(km.is_finite());
        assert!(km < 0.001);
    }

    #[test]
    fn display() {
        let coord = Coord::new(-36.8485, 174.7633);
        assert_eq!(coord.to_string(), "-36.8485, 174.7633");
    }
}
