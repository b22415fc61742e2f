use std::sync::Arc;

use crate::adapters::generate;
use crate::error::RagError;
use crate::llm::gateway::{grounding_prompt, GenerationGateway};
use crate::models::{QueryContext, RetrievalResult};
use crate::profile::Program;
use crate::search::corpus::{CorpusSearchBackend, CorpusSearchRequest};

#[derive(Clone)]
pub struct CorpusSearchAdapter {
    backend: Arc<dyn CorpusSearchBackend>,
    gateway: Arc<dyn GenerationGateway>,
}

impl CorpusSearchAdapter {
    pub fn new(backend: Arc<dyn CorpusSearchBackend>, gateway: Arc<dyn GenerationGateway>) -> Self {
        Self { backend, gateway }
    }

    /// RRF search across every strategy, then a grounded completion.
    pub async fn run(&self, ctx: &QueryContext) -> Result<RetrievalResult, RagError> {
        tracing::info!(
            corpus_id = %ctx.corpus_id,
            top_k = ctx.requested_doc_count,
            "corpus search"
        );

        let req = CorpusSearchRequest::rrf(&ctx.corpus_id, &ctx.query, ctx.requested_doc_count);
        let documents = self
            .backend
            .search(&req)
            .await
            .map_err(|e| RagError::backend(Program::CorpusSearch, e.to_string()))?;

        let system_prompt = grounding_prompt(Some(ctx.requested_doc_count), &documents);
        Ok(generate(self.gateway.as_ref(), ctx, documents, system_prompt).await)
    }
}
