use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;

use crate::error::RagError;
use crate::profile::ProfileRecord;

/// Looks up the profile records configured for a corpus. The core only reads
/// them; it never mutates or persists records.
#[async_trait]
pub trait ConfigResolver: Send + Sync {
    /// All records for `corpus_id`, in stored order. An unknown corpus yields
    /// an empty list; the dispatcher decides what that means.
    async fn resolve(&self, corpus_id: &str) -> Result<Vec<ProfileRecord>, RagError>;
}

/// Reads a JSON array of `{name, program, data}` records on every lookup,
/// so edits to the file apply to the next request.
pub struct JsonFileResolver {
    path: PathBuf,
}

impl JsonFileResolver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ConfigResolver for JsonFileResolver {
    async fn resolve(&self, corpus_id: &str) -> Result<Vec<ProfileRecord>, RagError> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %self.path.display(), "profile store not found");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(RagError::configuration(format!(
                    "Failed to read RAG configurations from {}: {e}",
                    self.path.display()
                )))
            }
        };

        let entries: Vec<Value> = serde_json::from_str(&data).map_err(|e| {
            RagError::configuration(format!(
                "Malformed RAG configurations in {}: {e}",
                self.path.display()
            ))
        })?;

        // Only this corpus's entries are typed, so a bad record elsewhere
        // cannot fail the lookup.
        entries
            .into_iter()
            .filter(|entry| entry.get("name").and_then(Value::as_str) == Some(corpus_id))
            .map(|entry| {
                serde_json::from_value::<ProfileRecord>(entry).map_err(|e| {
                    RagError::configuration(format!(
                        "Malformed RAG configuration for database '{corpus_id}': {e}"
                    ))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_store(dir: &tempfile::TempDir, value: serde_json::Value) -> PathBuf {
        let path = dir.path().join("rag_configs.json");
        std::fs::write(&path, value.to_string()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_resolve_filters_by_name_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_store(
            &dir,
            json!([
                {
                    "name": "papers",
                    "program": "distllm",
                    "data": { "dataset_dir": "/d", "faiss_index_path": "/f" }
                },
                { "name": "other", "program": "corpus_search" },
                {
                    "name": "papers",
                    "program": "tfidf",
                    "data": { "embeddings_path": "/e", "vectorizer_path": "/v" }
                }
            ]),
        );

        let records = JsonFileResolver::new(path).resolve("papers").await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].program.as_deref(), Some("distllm"));
        assert_eq!(records[1].program.as_deref(), Some("tfidf"));
    }

    #[tokio::test]
    async fn test_malformed_record_only_fails_its_own_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_store(
            &dir,
            json!([
                { "name": "papers", "program": "corpus_search", "data": {} },
                { "name": "other", "program": "tfidf", "data": null },
                { "name": "broken", "program": 7 }
            ]),
        );
        let resolver = JsonFileResolver::new(path);

        let records = resolver.resolve("papers").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].program.as_deref(), Some("corpus_search"));

        let err = resolver.resolve("other").await.unwrap_err();
        assert!(matches!(err, RagError::Configuration(_)));
        assert!(err.to_string().contains("database 'other'"));
        assert!(resolver.resolve("broken").await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_corpus_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_store(&dir, json!([{ "name": "papers", "program": "tfidf" }]));
        let records = JsonFileResolver::new(path).resolve("missing").await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = JsonFileResolver::new(dir.path().join("nope.json"));
        assert!(resolver.resolve("papers").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rag_configs.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = JsonFileResolver::new(path).resolve("papers").await.unwrap_err();
        assert!(matches!(err, RagError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_record_without_program_still_resolves() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_store(&dir, json!([{ "name": "papers", "data": {} }]));
        let records = JsonFileResolver::new(path).resolve("papers").await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].program.is_none());
    }
}
