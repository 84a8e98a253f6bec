//! Process-wide registry of built geocoders.
//!
//! One entry per `(ExecutionMode, PrecisionTier)`. An entry is built the
//! first time it is asked for and then lives until the registry is dropped
//! (for the global registry: until process exit).
//!
//! Each entry sits in its own `OnceCell`, so concurrent first requests for
//! the same key run the build once and every caller sees the finished
//! geocoder. After that, lookups are a plain read of the cell with no lock.
//! A failed build leaves the cell empty; the next request tries again.

use crate::config::Config;
use crate::error::{GeocodeError, Result};
use crate::geocoder::Geocoder;
use crate::store::{FileSource, ReferenceSource, ReferenceStore};
use crate::{ExecutionMode, PrecisionTier};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const ENTRY_COUNT: usize = ExecutionMode::ALL.len() * PrecisionTier::ALL.len();

static GLOBAL: OnceCell<Registry> = OnceCell::new();

pub struct Registry {
    config: Config,
    source: Box<dyn ReferenceSource>,
    entries: [OnceCell<Arc<Geocoder>>; ENTRY_COUNT],
    builds: AtomicUsize,
}

impl Registry {
    /// Registry loading tier files from `config.data_dir`.
    pub fn new(config: Config) -> Self {
        let source = FileSource::from_config(&config);
        Self::with_source(config, source)
    }

    /// Registry loading reference places from `source`.
    pub fn with_source<S: ReferenceSource + 'static>(config: Config, source: S) -> Self {
        Self {
            config,
            source: Box::new(source),
            entries: std::array::from_fn(|_| OnceCell::new()),
            builds: AtomicUsize::new(0),
        }
    }

    /// The process-wide registry, created from [`Config::from_env`] on first use
    /// unless one was installed with [`Registry::install`].
    pub fn global() -> Result<&'static Registry> {
        GLOBAL.get_or_try_init(|| Config::from_env().map(Registry::new))
    }

    /// Install `registry` as the process-wide registry.
    ///
    /// Fails if the global registry already exists, including when a lookup
    /// created the default one first.
    pub fn install(registry: Registry) -> Result<()> {
        GLOBAL.set(registry).map_err(|_| {
            GeocodeError::Config("The global registry is already initialised".to_string())
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Return the geocoder for `(mode, tier)`, building it on first request.
    pub fn get_or_create(
        &self,
        mode: ExecutionMode,
        tier: PrecisionTier,
    ) -> Result<Arc<Geocoder>> {
        let cell = &self.entries[slot(mode, tier)];

        if let Some(geocoder) = cell.get() {
            log::debug!("Registry hit for {} / {}", mode, tier);
            return Ok(geocoder.clone());
        }

        cell.get_or_try_init(|| {
            log::debug!("Registry miss for {} / {}, building", mode, tier);
            let geocoder = self.build(mode, tier)?;
            self.builds.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(geocoder))
        })
        .cloned()
    }

    /// Whether the entry for `(mode, tier)` has been built.
    pub fn contains(&self, mode: ExecutionMode, tier: PrecisionTier) -> bool {
        self.entries[slot(mode, tier)].get().is_some()
    }

    /// Number of successful entry builds so far.
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    fn build(&self, mode: ExecutionMode, tier: PrecisionTier) -> Result<Geocoder> {
        let allow = self.config.attributes.as_deref();
        let store = ReferenceStore::load(self.source.as_ref(), tier, allow).inspect_err(|e| {
            log::warn!(
                "Loading {} tier from {} failed: {}",
                tier,
                self.source.describe(),
                e
            )
        })?;
        Geocoder::build(store, tier, mode, self.config.workers)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("source", &self.source.describe())
            .field("builds", &self.build_count())
            .finish()
    }
}

fn slot(mode: ExecutionMode, tier: PrecisionTier) -> usize {
    mode.ordinal() * PrecisionTier::ALL.len() + tier.ordinal()
}
