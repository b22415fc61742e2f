use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::config::DistllmConfig;
use crate::error::{RagError, TransportError};

/// One distllm chat call: embedding, vector-index search, and generation.
#[derive(Debug, Clone, Serialize)]
pub struct DistllmRequest<'a> {
    pub query: &'a str,
    pub rag_db: &'a str,
    pub dataset_dir: &'a str,
    pub faiss_index_path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_context: Option<&'a str>,
}

/// The distllm collaborator. Returns the raw JSON text of its reply;
/// interpreting it is the adapter's job.
#[async_trait]
pub trait DistllmBackend: Send + Sync {
    async fn chat(&self, req: &DistllmRequest<'_>) -> Result<String, RagError>;
}

/// Talks to a distllm service over `POST {base_url}/chat`.
pub struct HttpDistllmClient {
    client: reqwest::Client,
    config: DistllmConfig,
}

impl HttpDistllmClient {
    pub fn new(client: reqwest::Client, config: DistllmConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl DistllmBackend for HttpDistllmClient {
    async fn chat(&self, req: &DistllmRequest<'_>) -> Result<String, RagError> {
        let url = format!("{}/chat", self.config.base_url.trim_end_matches('/'));
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
        Ok(body)
    }
}
