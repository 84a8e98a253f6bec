//! Reference store and the sources it is loaded from.
//!
//! A [`ReferenceSource`] is the seam to whatever produced the reference data
//! (an ETL job, a bundled file, a test fixture). The store it yields is an
//! ordered, immutable list of places: position `i` in the store is point `i`
//! of the spatial index built over it, so nothing may reorder or filter the
//! store once the index exists.

use crate::config::{Config, DatasetFormat, dataset_file};
use crate::error::{GeocodeError, Result};
use crate::{Coordinate, Place, PrecisionTier};
use revgeo_types::place::Attributes;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Field names read as the coordinate of a JSON row.
pub const LATITUDE_FIELD: &str = "latitude";
pub const LONGITUDE_FIELD: &str = "longitude";

/// Supplies the ordered reference places for a precision tier.
///
/// Loading is expected to be slow (disk, decompression) and happens once per
/// registry entry. Implementations must return places in a stable order and
/// fail with `DatasetLoad` when the data is unavailable.
///
/// Closures `Fn(PrecisionTier) -> Result<Vec<Place>>` are sources too.
pub trait ReferenceSource: Send + Sync {
    fn load(&self, tier: PrecisionTier) -> Result<Vec<Place>>;

    /// Human-readable origin, for logs.
    fn describe(&self) -> String {
        "custom source".to_string()
    }
}

impl<F> ReferenceSource for F
where
    F: Fn(PrecisionTier) -> Result<Vec<Place>> + Send + Sync,
{
    fn load(&self, tier: PrecisionTier) -> Result<Vec<Place>> {
        self(tier)
    }
}

/// Ordered, immutable sequence of reference places.
#[derive(Debug, Clone)]
pub struct ReferenceStore {
    places: Vec<Arc<Place>>,
}

impl ReferenceStore {
    /// Wrap `places`, keeping only the attributes in `allow` when given.
    pub fn new(places: Vec<Place>, allow: Option<&[String]>) -> Self {
        let places = places
            .into_iter()
            .map(|mut place| {
                if let Some(allow) = allow {
                    place.retain_attributes(allow);
                }
                Arc::new(place)
            })
            .collect();
        Self { places }
    }

    /// Load from `source`, applying the allow-list.
    pub fn load(
        source: &dyn ReferenceSource,
        tier: PrecisionTier,
        allow: Option<&[String]>,
    ) -> Result<Self> {
        let start = Instant::now();
        let places = source.load(tier)?;
        let store = Self::new(places, allow);

        log::info!(
            "Loaded {} reference places ({} tier) from {} in {:?}",
            store.len(),
            tier,
            source.describe(),
            start.elapsed()
        );

        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Place>> {
        self.places.get(index)
    }

    /// Coordinates in store order, as fed to the spatial index.
    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.places.iter().map(|p| p.coordinate()).collect()
    }

    /// Map index positions back to places, preserving order.
    pub fn resolve(&self, indices: &[usize]) -> Result<Vec<Arc<Place>>> {
        indices
            .iter()
            .map(|&i| {
                self.places.get(i).cloned().ok_or_else(|| {
                    GeocodeError::WorkerFailure(format!(
                        "Index position {} outside reference store of {} places",
                        i,
                        self.places.len()
                    ))
                })
            })
            .collect()
    }
}

/// In-memory source, mostly for embedding small datasets and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    fallback: Option<Vec<Place>>,
    tiers: HashMap<PrecisionTier, Vec<Place>>,
}

impl MemorySource {
    /// Serve `places` for every tier.
    pub fn new(places: Vec<Place>) -> Self {
        Self {
            fallback: Some(places),
            tiers: HashMap::new(),
        }
    }

    /// Serve `places` for `tier` only.
    pub fn with_tier(mut self, tier: PrecisionTier, places: Vec<Place>) -> Self {
        self.tiers.insert(tier, places);
        self
    }
}

impl ReferenceSource for MemorySource {
    fn load(&self, tier: PrecisionTier) -> Result<Vec<Place>> {
        self.tiers
            .get(&tier)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| GeocodeError::DatasetLoad {
                path: None,
                reason: format!("No in-memory places for the {} tier", tier),
            })
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Reads `<dir>/places_<tier>.<ext>` from disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    dir: PathBuf,
    format: DatasetFormat,
}

impl FileSource {
    pub fn new<P: Into<PathBuf>>(dir: P, format: DatasetFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.data_dir.clone(), config.format)
    }

    pub fn path_for(&self, tier: PrecisionTier) -> PathBuf {
        dataset_file(&self.dir, tier, self.format)
    }
}

impl ReferenceSource for FileSource {
    fn load(&self, tier: PrecisionTier) -> Result<Vec<Place>> {
        let path = self.path_for(tier);
        let text = std::fs::read_to_string(&path)
            .map_err(|e| GeocodeError::dataset_load(&path, e))?;

        match self.format {
            DatasetFormat::JsonRows => parse_json_rows(&text, &path),
            #[cfg(feature = "geojson")]
            DatasetFormat::GeoJson => parse_geojson(&text, &path),
        }
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.dir.display(), self.format.extension())
    }
}

/// Parse a JSON array of row objects into places.
///
/// Every field of a row becomes an attribute; rows without a usable
/// `latitude`/`longitude` pair are skipped.
pub fn parse_json_rows(text: &str, path: &Path) -> Result<Vec<Place>> {
    let rows: Vec<Map<String, Value>> =
        serde_json::from_str(text).map_err(|e| GeocodeError::dataset_load(path, e))?;

    let mut skipped = 0usize;
    let mut places = Vec::with_capacity(rows.len());

    for (row_idx, row) in rows.into_iter().enumerate() {
        let coord = match (
            row.get(LATITUDE_FIELD).and_then(value_as_f64),
            row.get(LONGITUDE_FIELD).and_then(value_as_f64),
        ) {
            (Some(lat), Some(lon)) => Coordinate::new(lat, lon),
            _ => {
                log::debug!("Row {} of {} has no usable coordinate", row_idx, path.display());
                skipped += 1;
                continue;
            }
        };

        if !coord.is_valid() {
            log::debug!("Row {} of {} has invalid coordinate {}", row_idx, path.display(), coord);
            skipped += 1;
            continue;
        }

        places.push(Place::from_parts(coord, attributes_from_map(row)));
    }

    if skipped > 0 {
        log::warn!(
            "Skipped {} rows without a valid coordinate in {}",
            skipped,
            path.display()
        );
    }

    Ok(places)
}

/// Parse a GeoJSON `FeatureCollection` of points into places.
///
/// Feature properties become attributes; non-point features are skipped.
#[cfg(feature = "geojson")]
pub fn parse_geojson(text: &str, path: &Path) -> Result<Vec<Place>> {
    use geojson::GeoJson;

    let geojson: GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| GeocodeError::dataset_load(path, e))?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => {
            return Err(GeocodeError::dataset_load(
                path,
                "Expected a GeoJSON FeatureCollection",
            ));
        }
    };

    let mut skipped = 0usize;
    let mut places = Vec::with_capacity(collection.features.len());

    for feature in collection.features {
        let coord = match feature.geometry.as_ref().map(|g| &g.value) {
            Some(geojson::Value::Point(pos)) if pos.len() >= 2 => Coordinate::new(pos[1], pos[0]),
            _ => {
                skipped += 1;
                continue;
            }
        };

        if !coord.is_valid() {
            skipped += 1;
            continue;
        }

        let attributes = feature.properties.map(attributes_from_map).unwrap_or_default();
        places.push(Place::from_parts(coord, attributes));
    }

    if skipped > 0 {
        log::warn!(
            "Skipped {} features without a valid point geometry in {}",
            skipped,
            path.display()
        );
    }

    Ok(places)
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn attributes_from_map(map: Map<String, Value>) -> Attributes {
    map.into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::Null => None,
                Value::String(s) => Some(s),
                other => Some(other.to_string()),
            };
            (key, value)
        })
        .collect()
}
