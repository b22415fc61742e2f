use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use walkdir::WalkDir;

use crate::config::TfidfConfig;
use crate::profile::TfidfData;
use crate::search::cache::ArtifactCache;

const VECTORIZER_FILE: &str = "vectorizer_components.json";
const EMBEDDING_BATCH_PREFIX: &str = "tfidf_embeddings_batch_";

/// Nearest-passage lookup for one tfidf profile. Blocking: callers on the
/// async runtime run it through `spawn_blocking`.
pub trait TfidfBackend: Send + Sync {
    fn top_passages(&self, query: &str, data: &TfidfData) -> Result<Vec<String>>;
}

// ─── Vectorizer ──────────────────────────────────────────

#[derive(Deserialize)]
struct VectorizerComponents {
    vocabulary: Vec<String>,
    idf_values: Vec<f32>,
}

/// Fitted TF-IDF vocabulary and idf weights.
#[derive(Debug)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
}

impl TfidfVectorizer {
    pub fn new(vocabulary: Vec<String>, idf: Vec<f32>) -> Result<Self> {
        if vocabulary.len() != idf.len() {
            anyhow::bail!(
                "vocabulary has {} terms but {} idf values",
                vocabulary.len(),
                idf.len()
            );
        }
        let vocabulary = vocabulary
            .into_iter()
            .enumerate()
            .map(|(i, term)| (term, i))
            .collect();
        Ok(Self { vocabulary, idf })
    }

    /// Load `vectorizer_components.json` from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(VECTORIZER_FILE);
        let data = std::fs::read_to_string(&path).with_context(|| {
            format!("Failed to read vectorizer components at {}", path.display())
        })?;
        let components: VectorizerComponents = serde_json::from_str(&data)
            .with_context(|| format!("Malformed vectorizer components at {}", path.display()))?;
        Self::new(components.vocabulary, components.idf_values)
    }

    pub fn dimension(&self) -> usize {
        self.idf.len()
    }

    /// Sparse L2-normalized tf-idf vector as `(term index, weight)` pairs,
    /// sorted by term index. Out-of-vocabulary tokens are ignored.
    pub fn transform(&self, text: &str) -> Vec<(usize, f32)> {
        let mut counts: HashMap<usize, f32> = HashMap::new();
        for token in tokenize(text) {
            if let Some(&idx) = self.vocabulary.get(&token) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut weights: Vec<(usize, f32)> = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx]))
            .collect();
        weights.sort_by_key(|(idx, _)| *idx);

        let norm = weights.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for (_, w) in weights.iter_mut() {
                *w /= norm;
            }
        }
        weights
    }
}

/// Lowercased runs of word characters, at least two characters long.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_lowercase)
}

// ─── Corpus ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Passage {
    text: String,
    embedding: Vec<f32>,
}

/// Passages and their stored dense tf-idf vectors.
#[derive(Debug)]
pub struct TfidfCorpus {
    passages: Vec<Passage>,
    norms: Vec<f32>,
}

impl TfidfCorpus {
    fn from_passages(passages: Vec<Passage>) -> Self {
        let norms = passages
            .iter()
            .map(|p| p.embedding.iter().map(|v| v * v).sum::<f32>().sqrt())
            .collect();
        Self { passages, norms }
    }

    /// Load every `tfidf_embeddings_batch_*.json` in `dir`, in filename order.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut batch_files: Vec<_> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(EMBEDDING_BATCH_PREFIX) && n.ends_with(".json"))
            })
            .collect();

        if batch_files.is_empty() {
            anyhow::bail!("No embedding batch files found in {}", dir.display());
        }
        batch_files.sort();

        let mut passages = Vec::new();
        for path in &batch_files {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read embeddings batch {}", path.display()))?;
            let batch: Vec<Passage> = serde_json::from_str(&data)
                .with_context(|| format!("Malformed embeddings batch {}", path.display()))?;
            passages.extend(batch);
        }
        tracing::debug!(
            dir = %dir.display(),
            batches = batch_files.len(),
            passages = passages.len(),
            "tf-idf corpus loaded"
        );

        Ok(Self::from_passages(passages))
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Cosine similarity against every passage; best first, ties by corpus order.
    pub fn nearest(
        &self,
        query: &[(usize, f32)],
        top_k: usize,
        min_score: f32,
    ) -> Vec<(f32, &str)> {
        let mut scored: Vec<(usize, f32)> = self
            .passages
            .iter()
            .zip(&self.norms)
            .enumerate()
            .filter(|(_, (_, norm))| **norm > 0.0)
            .map(|(i, (passage, norm))| {
                let dot: f32 = query
                    .iter()
                    .filter_map(|(idx, w)| passage.embedding.get(*idx).map(|v| v * w))
                    .sum();
                (i, dot / norm)
            })
            .filter(|(_, score)| *score >= min_score)
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(top_k);

        scored
            .into_iter()
            .map(|(i, score)| (score, self.passages[i].text.as_str()))
            .collect()
    }
}

// ─── Local index ─────────────────────────────────────────

/// Serves tfidf lookups from artifacts on disk, memoized in the shared cache.
pub struct LocalTfidfIndex {
    cache: Arc<ArtifactCache>,
    config: TfidfConfig,
}

impl LocalTfidfIndex {
    pub fn new(cache: Arc<ArtifactCache>, config: TfidfConfig) -> Self {
        Self { cache, config }
    }
}

impl TfidfBackend for LocalTfidfIndex {
    fn top_passages(&self, query: &str, data: &TfidfData) -> Result<Vec<String>> {
        let vectorizer = self.cache.vectorizer(&data.vectorizer_path)?;
        let corpus = self.cache.corpus(&data.embeddings_path)?;

        let query_vector = vectorizer.transform(query);
        let hits = corpus.nearest(&query_vector, self.config.top_k, self.config.min_score);
        tracing::debug!(
            vocabulary = vectorizer.dimension(),
            corpus = corpus.len(),
            hits = hits.len(),
            "tf-idf lookup complete"
        );

        Ok(hits.into_iter().map(|(_, text)| text.to_string()).collect())
    }
}
