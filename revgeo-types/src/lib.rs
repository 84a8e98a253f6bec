//! # revgeo-types
//!
//! Plain value types shared by the revgeo reverse geocoder.
//!
//! - **Coordinate**: a `(latitude, longitude)` pair
//! - **Place**: one reference record (attributes plus its coordinate)
//! - **Query options**: `ExecutionMode` and `PrecisionTier`
//!
//! All types are serializable with Serde. `Coordinate` converts to and from
//! the `geo` crate's `Point` (x = longitude, y = latitude).
//!
//! ## Examples
//!
//! ```rust
//! use revgeo_types::coordinate::Coordinate;
//! use revgeo_types::options::{ExecutionMode, PrecisionTier};
//!
//! let sydney = Coordinate::new(-33.86785, 151.20732);
//! assert!(sydney.is_valid());
//! assert_eq!(ExecutionMode::default(), ExecutionMode::Sequential);
//! assert_eq!(PrecisionTier::default(), PrecisionTier::Fine);
//! ```

pub mod coordinate;
pub mod options;
pub mod place;
