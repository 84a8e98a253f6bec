use geo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Valid latitude range in degrees.
pub const LATITUDE_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;

/// Valid longitude range in degrees.
pub const LONGITUDE_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

/// A geographic coordinate as a `(latitude, longitude)` pair in degrees.
///
/// Construction does not validate; use [`Coordinate::is_valid`] or the
/// validation helpers of the main crate before searching. This mirrors
/// `geo::Point::new`, which accepts any pair of floats.
///
/// # Examples
///
/// ```
/// use revgeo_types::coordinate::Coordinate;
/// use geo::Point;
///
/// let london = Coordinate::new(51.5074, -0.1278);
/// let point: Point = london.into();
/// assert_eq!(point.x(), -0.1278);
/// assert_eq!(point.y(), 51.5074);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    /// Create a coordinate from latitude and longitude in degrees.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Both components are finite.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// Finite and inside the latitude/longitude ranges.
    pub fn is_valid(&self) -> bool {
        self.is_finite()
            && LATITUDE_RANGE.contains(&self.lat)
            && LONGITUDE_RANGE.contains(&self.lon)
    }

    /// The coordinate as a 2-D point in `[lat, lon]` order, as stored in the index.
    pub fn as_array(&self) -> [f64; 2] {
        [self.lat, self.lon]
    }

    /// Squared planar distance in degree space.
    ///
    /// Latitude and longitude are treated as flat Cartesian axes, so the
    /// result under-weights longitude differences away from the equator.
    ///
    /// ```
    /// use revgeo_types::coordinate::Coordinate;
    ///
    /// let a = Coordinate::new(0.0, 0.0);
    /// let b = Coordinate::new(3.0, 4.0);
    /// assert_eq!(a.planar_distance_sq(&b), 25.0);
    /// ```
    #[inline]
    pub fn planar_distance_sq(&self, other: &Coordinate) -> f64 {
        let dlat = self.lat - other.lat;
        let dlon = self.lon - other.lon;
        dlat * dlat + dlon * dlon
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self::new(lat, lon)
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lat, lon]: [f64; 2]) -> Self {
        Self::new(lat, lon)
    }
}

impl From<Point<f64>> for Coordinate {
    fn from(point: Point<f64>) -> Self {
        Self::new(point.y(), point.x())
    }
}

impl From<Coordinate> for Point<f64> {
    fn from(coord: Coordinate) -> Self {
        Point::new(coord.lon, coord.lat)
    }
}
