//! Geocoder builder for one-off construction outside the registry.
//!
//! Registry entries are built the same way; use this when the caller wants
//! to own the `Geocoder` (custom data, tests, short-lived tools).

use crate::config::Config;
use crate::error::{GeocodeError, Result};
use crate::geocoder::Geocoder;
use crate::store::{FileSource, ReferenceSource, ReferenceStore};
use crate::{ExecutionMode, PrecisionTier};

/// Builder for a [`Geocoder`] with custom source, mode and tier.
pub struct GeocoderBuilder {
    source: Option<Box<dyn ReferenceSource>>,
    config: Config,
    mode: Option<ExecutionMode>,
    tier: Option<PrecisionTier>,
}

impl GeocoderBuilder {
    /// Defaults: files under `Config::default().data_dir`, configured mode and tier.
    pub fn new() -> Self {
        Self {
            source: None,
            config: Config::default(),
            mode: None,
            tier: None,
        }
    }

    /// Load reference places from `source` instead of the configured data directory.
    pub fn source<S: ReferenceSource + 'static>(mut self, source: S) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Set the configuration (data directory, workers, allow-list, defaults).
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn tier(mut self, tier: PrecisionTier) -> Self {
        self.tier = Some(tier);
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.config = self.config.with_workers(workers);
        self
    }

    /// Load the dataset and build the index and engine.
    pub fn build(self) -> Result<Geocoder> {
        self.config.validate().map_err(GeocodeError::Config)?;

        let mode = self.mode.unwrap_or(self.config.default_mode);
        let tier = self.tier.unwrap_or(self.config.default_tier);
        let source: Box<dyn ReferenceSource> = match self.source {
            Some(source) => source,
            None => Box::new(FileSource::from_config(&self.config)),
        };

        let store = ReferenceStore::load(source.as_ref(), tier, self.config.attributes.as_deref())?;
        Geocoder::build(store, tier, mode, self.config.workers)
    }
}

impl Default for GeocoderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
