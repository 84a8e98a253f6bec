//! Compute layer: coordinate validation and nearest-neighbor search.
//!
//! Nothing in here knows about datasets or records; the index works purely
//! on coordinates and answers with positions.

pub mod spatial;
pub mod validation;
