//! Error types for revgeo.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeocodeError {
    /// Caller input has the wrong shape: not a coordinate, empty batch, etc.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A coordinate in a query batch is non-finite or out of range.
    #[error("Invalid coordinate at position {position}: {reason}")]
    InvalidCoordinate { position: usize, reason: String },

    /// The index was asked to build over zero points.
    #[error("Cannot build a spatial index over an empty dataset")]
    EmptyDataset,

    /// The reference data could not be supplied.
    #[error("Failed to load dataset{}: {reason}", from_path(.path))]
    DatasetLoad {
        path: Option<PathBuf>,
        reason: String,
    },

    /// A parallel worker terminated abnormally.
    #[error("Worker failure: {0}")]
    WorkerFailure(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl GeocodeError {
    pub(crate) fn dataset_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        GeocodeError::DatasetLoad {
            path: Some(path.into()),
            reason: reason.to_string(),
        }
    }

    /// Position of the offending coordinate, for `InvalidCoordinate`.
    pub fn position(&self) -> Option<usize> {
        match self {
            GeocodeError::InvalidCoordinate { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// Shift the reported position by `offset`, for errors raised on a sub-batch.
    pub(crate) fn offset_position(self, offset: usize) -> Self {
        match self {
            GeocodeError::InvalidCoordinate { position, reason } => {
                GeocodeError::InvalidCoordinate {
                    position: position + offset,
                    reason,
                }
            }
            other => other,
        }
    }
}

fn from_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" from {}", p.display()))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, GeocodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_position() {
        let err = GeocodeError::InvalidCoordinate {
            position: 2,
            reason: "Latitude must be finite".into(),
        };
        assert_eq!(err.offset_position(10).position(), Some(12));
        assert_eq!(GeocodeError::EmptyDataset.offset_position(3).position(), None);
    }

    #[test]
    fn test_dataset_load_message() {
        let err = GeocodeError::dataset_load("/tmp/places_fine.json", "No such file");
        assert_eq!(
            err.to_string(),
            "Failed to load dataset from /tmp/places_fine.json: No such file"
        );

        let err = GeocodeError::DatasetLoad {
            path: None,
            reason: "source closed".into(),
        };
        assert_eq!(err.to_string(), "Failed to load dataset: source closed");
    }
}
