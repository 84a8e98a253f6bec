//! Configuration for reference data loading and query execution.
//!
//! `Config` decides where datasets live, how they are parsed, which
//! attributes are kept, and how many workers the parallel engine uses.
use crate::error::{GeocodeError, Result};
use crate::{ExecutionMode, PrecisionTier};
use serde::de::Error;
use std::path::{Path, PathBuf};

/// Environment variable overriding [`Config::data_dir`] in [`Config::from_env`].
pub const DATA_DIR_ENV: &str = "REVGEO_DATA_DIR";

/// Environment variable overriding [`Config::workers`] in [`Config::from_env`].
pub const WORKERS_ENV: &str = "REVGEO_WORKERS";

/// On-disk layout of a reference dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DatasetFormat {
    /// A JSON array of row objects with `latitude` and `longitude` fields.
    #[default]
    JsonRows,
    /// A GeoJSON `FeatureCollection` of `Point` features.
    #[cfg(feature = "geojson")]
    #[serde(rename = "geojson", alias = "geo_json")]
    GeoJson,
}

impl DatasetFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            DatasetFormat::JsonRows => "json",
            #[cfg(feature = "geojson")]
            DatasetFormat::GeoJson => "geojson",
        }
    }
}

/// Reverse geocoder configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "Config::default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub format: DatasetFormat,

    /// Worker pool size for the parallel engine
    #[serde(default = "Config::default_workers")]
    pub workers: usize,

    /// Attribute allow-list; `None` keeps every attribute of a row
    #[serde(default)]
    pub attributes: Option<Vec<String>>,

    #[serde(default)]
    pub default_mode: ExecutionMode,

    #[serde(default)]
    pub default_tier: PrecisionTier,
}

impl Config {
    fn default_data_dir() -> PathBuf {
        PathBuf::from("data")
    }

    fn default_workers() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    /// Defaults, with the data directory and worker count taken from the
    /// environment when set.
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }

        if let Ok(raw) = std::env::var(WORKERS_ENV) {
            config.workers = raw.trim().parse().map_err(|_| {
                GeocodeError::Config(format!(
                    "{} must be a positive integer, got '{}'",
                    WORKERS_ENV, raw
                ))
            })?;
        }

        config.validate().map_err(GeocodeError::Config)?;
        Ok(config)
    }

    pub fn with_data_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_format(mut self, format: DatasetFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        assert!(workers > 0, "Worker count must be greater than zero");

        if workers > 256 {
            log::warn!(
                "Worker count of {} is very large; each parallel registry entry owns its own pool",
                workers
            );
        }

        self.workers = workers;
        self
    }

    pub fn with_attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_default_mode(mut self, mode: ExecutionMode) -> Self {
        self.default_mode = mode;
        self
    }

    pub fn with_default_tier(mut self, tier: PrecisionTier) -> Self {
        self.default_tier = tier;
        self
    }

    /// Path of the dataset file for `tier`: `<data_dir>/places_<tier>.<ext>`.
    pub fn dataset_path(&self, tier: PrecisionTier) -> PathBuf {
        dataset_file(&self.data_dir, tier, self.format)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.workers == 0 {
            return Err("Worker count must be greater than zero".to_string());
        }

        if let Some(attributes) = &self.attributes
            && attributes.iter().any(|a| a.trim().is_empty())
        {
            return Err("Attribute allow-list cannot contain empty names".to_string());
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
            format: DatasetFormat::default(),
            workers: Self::default_workers(),
            attributes: None,
            default_mode: ExecutionMode::default(),
            default_tier: PrecisionTier::default(),
        }
    }
}

pub(crate) fn dataset_file(dir: &Path, tier: PrecisionTier, format: DatasetFormat) -> PathBuf {
    dir.join(format!("places_{}.{}", tier.as_str(), format.extension()))
}
