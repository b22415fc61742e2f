use serde::Deserialize;
use std::sync::Arc;

use crate::error::RagError;
use crate::llm::distllm::{DistllmBackend, DistllmRequest};
use crate::models::{ErrorInfo, QueryContext, RetrievalResult};
use crate::profile::{DistllmData, Program};

#[derive(Deserialize)]
struct DistllmReply {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    system_prompt: Option<String>,
    #[serde(default)]
    documents: Option<Vec<String>>,
}

#[derive(Clone)]
pub struct DistllmAdapter {
    backend: Arc<dyn DistllmBackend>,
}

impl DistllmAdapter {
    pub fn new(backend: Arc<dyn DistllmBackend>) -> Self {
        Self { backend }
    }

    /// Embed, search and generate in one collaborator call. `extra_context` is
    /// appended to the grounding context. Failures are captured in the result.
    pub async fn run(
        &self,
        ctx: &QueryContext,
        data: &DistllmData,
        extra_context: Option<&str>,
    ) -> RetrievalResult {
        tracing::info!(
            corpus_id = %ctx.corpus_id,
            extra_context = extra_context.is_some(),
            "distllm chat"
        );
        match self.call(ctx, data, extra_context).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(corpus_id = %ctx.corpus_id, "distllm failed: {e}");
                RetrievalResult::failed(ErrorInfo::new(
                    e.to_string(),
                    Program::Distllm.failure_message(),
                ))
            }
        }
    }

    async fn call(
        &self,
        ctx: &QueryContext,
        data: &DistllmData,
        extra_context: Option<&str>,
    ) -> Result<RetrievalResult, RagError> {
        let req = DistllmRequest {
            query: &ctx.query,
            rag_db: &ctx.corpus_id,
            dataset_dir: &data.dataset_dir,
            faiss_index_path: &data.faiss_index_path,
            extra_context,
        };

        let raw = self
            .backend
            .chat(&req)
            .await
            .map_err(|e| RagError::backend(Program::Distllm, e.to_string()))?;
        let reply: DistllmReply = serde_json::from_str(&raw).map_err(|e| {
            RagError::backend(Program::Distllm, format!("Malformed distllm reply: {e}"))
        })?;

        Ok(RetrievalResult {
            documents: reply.documents.unwrap_or_default(),
            response: reply.response,
            system_prompt: reply.system_prompt.unwrap_or_default(),
            error: None,
        })
    }
}
