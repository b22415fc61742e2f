use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::CorpusSearchConfig;
use crate::error::{RagError, TransportError};

/// Parameters for one multi-strategy corpus search.
#[derive(Debug, Clone, Serialize)]
pub struct CorpusSearchRequest {
    pub corpus: String,
    pub query: String,
    /// `None` means every strategy the corpus supports.
    pub strategies: Option<Vec<String>>,
    pub top_k: usize,
    pub fusion: String,
    pub required_tags: Vec<String>,
    pub excluded_tags: Vec<String>,
}

impl CorpusSearchRequest {
    /// All strategies fused with reciprocal-rank fusion, no tag filtering.
    pub fn rrf(corpus: &str, query: &str, top_k: usize) -> Self {
        Self {
            corpus: corpus.to_string(),
            query: query.to_string(),
            strategies: None,
            top_k,
            fusion: "rrf".to_string(),
            required_tags: Vec::new(),
            excluded_tags: Vec::new(),
        }
    }
}

#[async_trait]
pub trait CorpusSearchBackend: Send + Sync {
    /// Ranked passages, best first.
    async fn search(&self, req: &CorpusSearchRequest) -> Result<Vec<String>, RagError>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SearchReply {
    List(Vec<String>),
    Wrapped { documents: Vec<String> },
}

/// Talks to the corpus search service over `POST {base_url}/search`.
pub struct HttpCorpusSearchClient {
    client: reqwest::Client,
    config: CorpusSearchConfig,
}

impl HttpCorpusSearchClient {
    pub fn new(client: reqwest::Client, config: CorpusSearchConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl CorpusSearchBackend for HttpCorpusSearchClient {
    async fn search(&self, req: &CorpusSearchRequest) -> Result<Vec<String>, RagError> {
        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        let timeout_secs = self.config.timeout_secs;

        let resp = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(timeout_secs))
            .json(req)
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(e, &url, timeout_secs))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Http { status, body }.into());
        }

        let body = resp
            .text()
            .await
            .map_err(|e| TransportError::from_reqwest(e, &url, timeout_secs))?;
        parse_reply(&body)
    }
}

fn parse_reply(body: &str) -> Result<Vec<String>, RagError> {
    match serde_json::from_str::<SearchReply>(body) {
        Ok(SearchReply::List(docs)) | Ok(SearchReply::Wrapped { documents: docs }) => Ok(docs),
        Err(e) => Err(RagError::decode(format!(
            "Failed to parse corpus search response: {e}"
        ))),
    }
}
