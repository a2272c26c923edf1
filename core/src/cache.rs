//! Search response caching with LRU eviction

use crate::error::Result;
use crate::normalize::{normalize, normalize_for_letter_count};
use crate::search::{validate_query, SearchEngine, SearchMode, SearchResponse};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

/// Both folding modes take part: queries that match alike can still differ in
/// abjad value (hamza, dagger alif).
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct SearchKey {
    pub normalized_query: String,
    pub letter_form: String,
    pub mode: SearchMode,
}

impl SearchKey {
    pub fn new(query: &str, mode: SearchMode) -> Self {
        Self {
            normalized_query: normalize(query),
            letter_form: normalize_for_letter_count(query),
            mode,
        }
    }
}

/// Memoizes whole-corpus responses. A capacity of 0 disables caching.
///
/// Responses echo the caller's raw query, so a hit for a different spelling
/// of the same normalized query is re-labelled before it is returned.
pub struct SearchCache {
    cache: Option<Mutex<LruCache<SearchKey, Arc<SearchResponse>>>>,
}

impl SearchCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
        }
    }

    fn lock(&self) -> Option<MutexGuard<'_, LruCache<SearchKey, Arc<SearchResponse>>>> {
        self.cache
            .as_ref()
            .map(|cache| cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
    }

    pub fn get_or_search(
        &self,
        engine: &SearchEngine,
        query: &str,
        mode: SearchMode,
    ) -> Result<Arc<SearchResponse>> {
        let trimmed = validate_query(query)?;
        let key = SearchKey::new(trimmed, mode);

        if let Some(mut cache) = self.lock() {
            if let Some(response) = cache.get(&key) {
                if response.query == trimmed {
                    return Ok(Arc::clone(response));
                }
                let mut relabelled = (**response).clone();
                relabelled.query = trimmed.to_string();
                return Ok(Arc::new(relabelled));
            }
        }

        let response = Arc::new(engine.search_with_mode(trimmed, mode)?);
        if let Some(mut cache) = self.lock() {
            cache.put(key, Arc::clone(&response));
        }
        Ok(response)
    }

    /// `(entries, capacity)`; `(0, 0)` when disabled.
    pub fn stats(&self) -> (usize, usize) {
        self.lock().map_or((0, 0), |cache| (cache.len(), cache.cap().get()))
    }
}
