//! Memoized parsing keyed by formula text.
//!
//! Parsing is a pure function of the text, so both outcomes and syntax
//! errors are cached. The cache is bounded: once full, the least recently
//! used formula is evicted. It is safe to share between threads.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::debug;
use lru::LruCache;

use crate::{error::SyntaxError, outcome::ParseOutcome, parse};

const DEFAULT_CAPACITY: usize = 1024;

type Entry = Result<Arc<ParseOutcome>, SyntaxError>;

#[derive(Debug)]
pub struct FormulaCache {
    entries: Mutex<LruCache<String, Entry>>,
}

impl Default for FormulaCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FormulaCache {
    /// Cache holding up to 1024 formulas.
    pub fn new() -> Self {
        Self::with_capacity(NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        FormulaCache {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn entries(&self) -> MutexGuard<'_, LruCache<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Parse `text`, or return the result of an earlier parse of the same text.
    pub fn parse(&self, text: &str) -> Result<Arc<ParseOutcome>, SyntaxError> {
        if let Some(entry) = self.entries().get(text) {
            debug!("formula cache hit: {:?}", text);
            return entry.clone();
        }

        // Parse without holding the lock
        debug!("formula cache miss: {:?}", text);
        let entry = parse(text).map(Arc::new);

        let mut entries = self.entries();
        // Another thread may have parsed the same text meanwhile; keep the first
        if let Some(existing) = entries.get(text) {
            return existing.clone();
        }
        if let Some((evicted, _)) = entries.push(text.to_string(), entry.clone()) {
            debug!("formula cache evicted: {:?}", evicted);
        }
        entry
    }

    /// Whether `text` is cached, without marking it as recently used.
    pub fn contains(&self, text: &str) -> bool {
        self.entries().contains(text)
    }

    pub fn capacity(&self) -> NonZeroUsize {
        self.entries().cap()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }
}
