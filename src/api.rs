//! Public lookup API.
//!
//! `lookup_one` and `lookup_many` accept loosely shaped input (tuples,
//! arrays, slices, `geo` points, JSON values, `"lat,lon"` text), check its
//! shape before any index work, and route the query through a registry.
//!
//! ```rust
//! use revgeo::{Config, Coordinate, Place, Registry};
//! use revgeo::store::MemorySource;
//!
//! let registry = Registry::with_source(
//!     Config::default(),
//!     MemorySource::new(vec![
//!         Place::new(Coordinate::new(-33.86785, 151.20732)).with_attribute("name", Some("Sydney")),
//!         Place::new(Coordinate::new(51.5074, -0.1278)).with_attribute("name", Some("London")),
//!     ]),
//! );
//!
//! let place = registry.lookup_one((-33.86, 151.20), None, None)?;
//! assert_eq!(place.get("name"), Some("Sydney"));
//!
//! let places = registry.lookup_many(vec![(-33.86, 151.20), (51.50, -0.12)], None, None)?;
//! assert_eq!(places.len(), 2);
//!
//! assert!(registry.lookup_one("not-a-coord", None, None).is_err());
//! # Ok::<(), revgeo::GeocodeError>(())
//! ```

use crate::compute::validation::validate_coordinate;
use crate::error::{GeocodeError, Result};
use crate::registry::Registry;
use crate::{Coordinate, ExecutionMode, Place, PrecisionTier};
use serde_json::Value;
use std::sync::Arc;

/// Input that should denote exactly one coordinate.
///
/// Conversion checks shape only (two numeric components); range checks
/// happen later.
pub trait IntoCoordinate {
    fn into_coordinate(self) -> Result<Coordinate>;
}

/// Input that denotes one coordinate or an ordered batch of them.
///
/// A single coordinate becomes a one-element batch. Empty batches are
/// rejected.
pub trait IntoBatch {
    fn into_batch(self) -> Result<Vec<Coordinate>>;
}

impl IntoCoordinate for Coordinate {
    fn into_coordinate(self) -> Result<Coordinate> {
        Ok(self)
    }
}

impl IntoCoordinate for (f64, f64) {
    fn into_coordinate(self) -> Result<Coordinate> {
        Ok(Coordinate::from(self))
    }
}

impl IntoCoordinate for [f64; 2] {
    fn into_coordinate(self) -> Result<Coordinate> {
        Ok(Coordinate::from(self))
    }
}

impl IntoCoordinate for geo::Point<f64> {
    fn into_coordinate(self) -> Result<Coordinate> {
        Ok(Coordinate::from(self))
    }
}

impl IntoCoordinate for &[f64] {
    fn into_coordinate(self) -> Result<Coordinate> {
        match *self {
            [lat, lon] => Ok(Coordinate::new(lat, lon)),
            [_] => Err(GeocodeError::InvalidInput(
                "Coordinate is missing its longitude".to_string(),
            )),
            _ => Err(GeocodeError::InvalidInput(format!(
                "Expecting a (latitude, longitude) pair, got {} values",
                self.len()
            ))),
        }
    }
}

/// `"lat,lon"` text, e.g. `"51.5074, -0.1278"`.
impl IntoCoordinate for &str {
    fn into_coordinate(self) -> Result<Coordinate> {
        let invalid = || {
            GeocodeError::InvalidInput(format!(
                "Expecting a \"latitude,longitude\" pair, got '{}'",
                self
            ))
        };

        let (lat, lon) = self.split_once(',').ok_or_else(invalid)?;
        let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
        let lon: f64 = lon.trim().parse().map_err(|_| invalid())?;
        Ok(Coordinate::new(lat, lon))
    }
}

/// `[lat, lon]`, `{"latitude": .., "longitude": ..}` or `"lat,lon"`.
impl IntoCoordinate for &Value {
    fn into_coordinate(self) -> Result<Coordinate> {
        match self {
            Value::Array(items) => {
                let numbers = items
                    .iter()
                    .map(|v| {
                        v.as_f64().ok_or_else(|| {
                            GeocodeError::InvalidInput(format!(
                                "Coordinate components must be numbers, got {}",
                                v
                            ))
                        })
                    })
                    .collect::<Result<Vec<f64>>>()?;
                numbers.as_slice().into_coordinate()
            }
            Value::Object(map) => {
                let field = |name: &str| {
                    map.get(name).and_then(Value::as_f64).ok_or_else(|| {
                        GeocodeError::InvalidInput(format!("Missing numeric '{}' field", name))
                    })
                };
                Ok(Coordinate::new(field("latitude")?, field("longitude")?))
            }
            Value::String(s) => s.as_str().into_coordinate(),
            other => Err(GeocodeError::InvalidInput(format!(
                "Expecting a coordinate, got {}",
                other
            ))),
        }
    }
}

impl IntoBatch for Coordinate {
    fn into_batch(self) -> Result<Vec<Coordinate>> {
        Ok(vec![self])
    }
}

impl IntoBatch for (f64, f64) {
    fn into_batch(self) -> Result<Vec<Coordinate>> {
        Ok(vec![self.into()])
    }
}

impl IntoBatch for [f64; 2] {
    fn into_batch(self) -> Result<Vec<Coordinate>> {
        Ok(vec![self.into()])
    }
}

impl<T: IntoCoordinate> IntoBatch for Vec<T> {
    fn into_batch(self) -> Result<Vec<Coordinate>> {
        collect_batch(self)
    }
}

impl<T: IntoCoordinate + Clone> IntoBatch for &[T] {
    fn into_batch(self) -> Result<Vec<Coordinate>> {
        collect_batch(self.iter().cloned())
    }
}

/// A single coordinate, or an array whose first element is itself
/// coordinate-shaped (array, object or `"lat,lon"` string).
impl IntoBatch for &Value {
    fn into_batch(self) -> Result<Vec<Coordinate>> {
        match self {
            Value::Array(items) => match items.first() {
                None => Err(empty_batch()),
                Some(Value::Array(_)) | Some(Value::Object(_)) | Some(Value::String(_)) => {
                    collect_batch(items.iter())
                }
                Some(Value::Number(_)) => Ok(vec![self.into_coordinate()?]),
                Some(other) => Err(GeocodeError::InvalidInput(format!(
                    "Expecting a coordinate or a list of coordinates, first element is {}",
                    other
                ))),
            },
            _ => Ok(vec![self.into_coordinate()?]),
        }
    }
}

fn collect_batch<I>(items: I) -> Result<Vec<Coordinate>>
where
    I: IntoIterator,
    I::Item: IntoCoordinate,
{
    let batch = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            item.into_coordinate().map_err(|e| match e {
                GeocodeError::InvalidInput(msg) => {
                    GeocodeError::InvalidInput(format!("Element {}: {}", i, msg))
                }
                other => other,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if batch.is_empty() {
        return Err(empty_batch());
    }
    Ok(batch)
}

fn empty_batch() -> GeocodeError {
    GeocodeError::InvalidInput("Expecting at least one coordinate".to_string())
}

impl Registry {
    /// Nearest place to one coordinate.
    ///
    /// `mode` and `tier` fall back to the registry configuration's defaults.
    /// Malformed or out-of-range input fails with `InvalidInput` before the
    /// registry entry is touched.
    pub fn lookup_one<C: IntoCoordinate>(
        &self,
        coordinate: C,
        mode: Option<ExecutionMode>,
        tier: Option<PrecisionTier>,
    ) -> Result<Arc<Place>> {
        let coordinate = coordinate.into_coordinate()?;
        validate_coordinate(&coordinate)?;

        let geocoder = self.get_or_create(
            mode.unwrap_or(self.config().default_mode),
            tier.unwrap_or(self.config().default_tier),
        )?;
        geocoder.nearest(coordinate)
    }

    /// Nearest place for each coordinate, in input order.
    ///
    /// Shape errors fail with `InvalidInput` up front; a non-finite or
    /// out-of-range coordinate fails the whole batch with
    /// `InvalidCoordinate` naming its position.
    pub fn lookup_many<B: IntoBatch>(
        &self,
        coordinates: B,
        mode: Option<ExecutionMode>,
        tier: Option<PrecisionTier>,
    ) -> Result<Vec<Arc<Place>>> {
        let batch = coordinates.into_batch()?;

        let geocoder = self.get_or_create(
            mode.unwrap_or(self.config().default_mode),
            tier.unwrap_or(self.config().default_tier),
        )?;
        geocoder.query(&batch)
    }
}

/// [`Registry::lookup_one`] against the global registry.
pub fn lookup_one<C: IntoCoordinate>(
    coordinate: C,
    mode: Option<ExecutionMode>,
    tier: Option<PrecisionTier>,
) -> Result<Arc<Place>> {
    // Shape errors are reported even when no dataset is available.
    let coordinate = coordinate.into_coordinate()?;
    validate_coordinate(&coordinate)?;
    Registry::global()?.lookup_one(coordinate, mode, tier)
}

/// [`Registry::lookup_many`] against the global registry.
pub fn lookup_many<B: IntoBatch>(
    coordinates: B,
    mode: Option<ExecutionMode>,
    tier: Option<PrecisionTier>,
) -> Result<Vec<Arc<Place>>> {
    let batch = coordinates.into_batch()?;
    Registry::global()?.lookup_many(batch, mode, tier)
}
