use anyhow::Result;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::search::tfidf::{TfidfCorpus, TfidfVectorizer};

/// Process-wide cache of loaded tf-idf artifacts, keyed by directory path.
///
/// Entries are populated lazily on first use and never evicted. Loading
/// happens outside the lock, so concurrent first access to one key may load
/// it more than once; the first insert wins and every caller receives that
/// entry. Failed loads are not cached.
#[derive(Default)]
pub struct ArtifactCache {
    vectorizers: RwLock<HashMap<String, Arc<TfidfVectorizer>>>,
    corpora: RwLock<HashMap<String, Arc<TfidfCorpus>>>,
}

impl ArtifactCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vectorizer(&self, path: &str) -> Result<Arc<TfidfVectorizer>> {
        get_or_load(&self.vectorizers, path, || {
            TfidfVectorizer::load(Path::new(path))
        })
    }

    pub fn corpus(&self, path: &str) -> Result<Arc<TfidfCorpus>> {
        get_or_load(&self.corpora, path, || TfidfCorpus::load(Path::new(path)))
    }

    /// Number of cached artifacts of both kinds.
    pub fn len(&self) -> usize {
        self.vectorizers.read().len() + self.corpora.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn get_or_load<T>(
    map: &RwLock<HashMap<String, Arc<T>>>,
    key: &str,
    load: impl FnOnce() -> Result<T>,
) -> Result<Arc<T>> {
    if let Some(hit) = map.read().get(key) {
        return Ok(Arc::clone(hit));
    }

    let loaded = Arc::new(load()?);
    tracing::info!(key, "artifact cached");

    let mut guard = map.write();
    Ok(Arc::clone(guard.entry(key.to_string()).or_insert(loaded)))
}
