//! Application state management

use crate::cache::SearchCache;
use crate::corpus::CorpusIndex;
use crate::dataset::verify_file_hash;
use crate::error::Result;
use crate::overrides::CountOverrides;
use crate::search::{SearchEngine, DEFAULT_RESULT_CAP};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;

/// Default response cache capacity (number of distinct queries)
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

#[derive(Debug, Clone)]
pub struct StateConfig {
    pub dataset_path: PathBuf,
    pub dataset_sha256: Option<String>,
    pub result_cap: usize,
    pub cache_capacity: usize,
    pub count_overrides: bool,
}

impl StateConfig {
    pub fn new(dataset_path: PathBuf) -> Self {
        Self {
            dataset_path,
            dataset_sha256: None,
            result_cap: DEFAULT_RESULT_CAP,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            count_overrides: true,
        }
    }
}

/// Everything a request needs, built once at startup and never mutated.
pub struct AppState {
    pub search_engine: Arc<SearchEngine>,
    pub search_cache: Arc<SearchCache>,
    pub dataset_path: PathBuf,
    pub loaded_at: DateTime<Utc>,
}

impl AppState {
    /// Verify and load the dataset, then build the engine and cache.
    ///
    /// Any failure here is a startup fault; no partially loaded state is
    /// ever returned.
    pub fn load(config: &StateConfig) -> Result<Self> {
        if let Some(expected) = &config.dataset_sha256 {
            verify_file_hash(&config.dataset_path, expected)?;
        }

        let corpus = CorpusIndex::load(&config.dataset_path)?;
        Ok(Self::from_corpus(corpus, config))
    }

    pub fn from_corpus(corpus: CorpusIndex, config: &StateConfig) -> Self {
        let overrides = if config.count_overrides {
            CountOverrides::builtin()
        } else {
            CountOverrides::none()
        };

        let search_engine = SearchEngine::new(Arc::new(corpus))
            .with_overrides(overrides)
            .with_result_cap(config.result_cap);

        Self {
            search_engine: Arc::new(search_engine),
            search_cache: Arc::new(SearchCache::new(config.cache_capacity)),
            dataset_path: config.dataset_path.clone(),
            loaded_at: Utc::now(),
        }
    }
}
