use std::sync::Arc;

use crate::adapters::generate;
use crate::error::RagError;
use crate::llm::gateway::{grounding_prompt, GenerationGateway};
use crate::models::{QueryContext, RetrievalResult};
use crate::profile::{Program, TfidfData};
use crate::search::tfidf::TfidfBackend;

#[derive(Clone)]
pub struct TfidfAdapter {
    backend: Arc<dyn TfidfBackend>,
    gateway: Arc<dyn GenerationGateway>,
}

impl TfidfAdapter {
    pub fn new(backend: Arc<dyn TfidfBackend>, gateway: Arc<dyn GenerationGateway>) -> Self {
        Self { backend, gateway }
    }

    /// Top passages for the query, best first. No generation call.
    pub async fn retrieve(
        &self,
        ctx: &QueryContext,
        data: &TfidfData,
    ) -> Result<Vec<String>, RagError> {
        tracing::info!(corpus_id = %ctx.corpus_id, "tf-idf retrieval");

        let backend = Arc::clone(&self.backend);
        let query = ctx.query.clone();
        let data = data.clone();
        tokio::task::spawn_blocking(move || backend.top_passages(&query, &data))
            .await
            .map_err(|e| RagError::backend(Program::Tfidf, format!("tf-idf lookup aborted: {e}")))?
            .map_err(|e| RagError::backend(Program::Tfidf, format!("{e:#}")))
    }

    /// Retrieve, then ground a completion in the retrieved passages.
    pub async fn run(
        &self,
        ctx: &QueryContext,
        data: &TfidfData,
    ) -> Result<RetrievalResult, RagError> {
        let documents = self.retrieve(ctx, data).await?;
        let system_prompt = grounding_prompt(None, &documents);
        Ok(generate(self.gateway.as_ref(), ctx, documents, system_prompt).await)
    }
}
