//! Offline reverse geocoder: nearest known place for any coordinate.
//!
//! ## Features
//! - **Exact nearest neighbor**: a balanced k-d tree over the reference places
//! - **Two execution modes**: sequential, or sharded over a fixed worker pool
//! - **Build once**: each `(mode, tier)` dataset is loaded and indexed on first
//!   use and shared for the rest of the process
//! - **Precision tiers**: coarse, medium and fine reference datasets
//!
//! ## Distance
//! Nearness is squared Euclidean distance over raw `(latitude, longitude)`
//! degrees. This is not a geodesic distance: away from the equator a degree of
//! longitude counts as much as a degree of latitude.
//!
//! ```rust
//! use revgeo::{Config, Coordinate, ExecutionMode, Place, Registry};
//! use revgeo::store::MemorySource;
//!
//! let registry = Registry::with_source(
//!     Config::default().with_workers(2),
//!     MemorySource::new(vec![
//!         Place::new(Coordinate::new(-33.86785, 151.20732)).with_attribute("name", Some("Sydney")),
//!         Place::new(Coordinate::new(51.5074, -0.1278)).with_attribute("name", Some("London")),
//!     ]),
//! );
//!
//! let places = registry.lookup_many(
//!     vec![(-33.86, 151.20), (51.50, -0.12)],
//!     Some(ExecutionMode::Parallel),
//!     None,
//! )?;
//! assert_eq!(places[0].get("name"), Some("Sydney"));
//! assert_eq!(places[1].get("name"), Some("London"));
//! # Ok::<(), revgeo::GeocodeError>(())
//! ```

pub mod api;
pub mod builder;
pub mod compute;
pub mod config;
pub mod engine;
pub mod error;
pub mod geocoder;
pub mod registry;
pub mod store;

pub use api::{IntoBatch, IntoCoordinate, lookup_many, lookup_one};
pub use builder::GeocoderBuilder;
pub use config::{Config, DatasetFormat};
pub use error::{GeocodeError, Result};
pub use geocoder::Geocoder;
pub use registry::Registry;
pub use store::{FileSource, MemorySource, ReferenceSource, ReferenceStore};

pub use revgeo_types::coordinate::Coordinate;
pub use revgeo_types::options::{ExecutionMode, PrecisionTier};
pub use revgeo_types::place::{Attributes, Place};

pub use compute::spatial::{KdTree, NearestNeighbor, Neighbor};
pub use compute::validation;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install a global registry reading datasets as described by `config`.
///
/// Must run before the first `lookup_one`/`lookup_many` call.
pub fn init(config: Config) -> Result<()> {
    config.validate().map_err(GeocodeError::Config)?;
    Registry::install(Registry::new(config))
}

/// Install a global registry loading reference places from `source`.
pub fn init_with_source<S: ReferenceSource + 'static>(config: Config, source: S) -> Result<()> {
    config.validate().map_err(GeocodeError::Config)?;
    Registry::install(Registry::with_source(config, source))
}

/// Common imports
pub mod prelude {

    pub use crate::{Config, GeocodeError, Geocoder, GeocoderBuilder, Registry, Result};

    pub use crate::{Coordinate, ExecutionMode, Place, PrecisionTier};

    pub use crate::{IntoBatch, IntoCoordinate, lookup_many, lookup_one};

    pub use crate::{MemorySource, ReferenceSource};
}
