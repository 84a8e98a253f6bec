//! Validation for geographic coordinates.

use crate::Coordinate;
use crate::error::{GeocodeError, Result};
use revgeo_types::coordinate::{LATITUDE_RANGE, LONGITUDE_RANGE};

/// Reason a coordinate is unusable, or `None` if it is valid.
///
/// Latitude: [-90.0, 90.0], Longitude: [-180.0, 180.0]
pub fn coordinate_problem(coord: &Coordinate) -> Option<String> {
    let (lat, lon) = (coord.lat(), coord.lon());

    if !lat.is_finite() {
        return Some(format!("Latitude must be finite, got: {}", lat));
    }

    if !lon.is_finite() {
        return Some(format!("Longitude must be finite, got: {}", lon));
    }

    if !LATITUDE_RANGE.contains(&lat) {
        return Some(format!("Latitude out of range [-90.0, 90.0]: {}", lat));
    }

    if !LONGITUDE_RANGE.contains(&lon) {
        return Some(format!("Longitude out of range [-180.0, 180.0]: {}", lon));
    }

    None
}

/// Validates a single caller-supplied coordinate.
///
/// # Examples
///
/// ```
/// use revgeo::Coordinate;
/// use revgeo::compute::validation::validate_coordinate;
///
/// assert!(validate_coordinate(&Coordinate::new(-33.86785, 151.20732)).is_ok());
///
/// // Latitude and longitude swapped
/// assert!(validate_coordinate(&Coordinate::new(151.20732, -33.86785)).is_err());
/// ```
pub fn validate_coordinate(coord: &Coordinate) -> Result<()> {
    match coordinate_problem(coord) {
        Some(reason) => Err(GeocodeError::InvalidInput(reason)),
        None => Ok(()),
    }
}

/// Validates every coordinate of a query batch.
///
/// Fails on the first offending element with `InvalidCoordinate` carrying its
/// position in `batch`.
///
/// # Examples
///
/// ```
/// use revgeo::{Coordinate, GeocodeError};
/// use revgeo::compute::validation::validate_batch;
///
/// let batch = vec![
///     Coordinate::new(51.5, -0.12),
///     Coordinate::new(f64::NAN, 2.35),
/// ];
///
/// match validate_batch(&batch) {
///     Err(GeocodeError::InvalidCoordinate { position, .. }) => assert_eq!(position, 1),
///     other => panic!("unexpected: {:?}", other),
/// }
/// ```
pub fn validate_batch(batch: &[Coordinate]) -> Result<()> {
    for (position, coord) in batch.iter().enumerate() {
        if let Some(reason) = coordinate_problem(coord) {
            log::warn!(
                "Rejecting query batch: coordinate {} at position {} is invalid",
                coord,
                position
            );
            return Err(GeocodeError::InvalidCoordinate { position, reason });
        }
    }
    Ok(())
}
