//! Retrieval adapters: each turns a query plus a validated profile into a
//! [`RetrievalResult`](crate::models::RetrievalResult).

pub mod corpus_search;
pub mod distllm;
pub mod fusion;
pub mod tfidf;

use crate::llm::gateway::GenerationGateway;
use crate::models::{QueryContext, RetrievalResult};

/// Ground a completion in `documents`. A gateway failure is captured in the
/// result next to the documents and prompt, not raised.
async fn generate(
    gateway: &dyn GenerationGateway,
    ctx: &QueryContext,
    documents: Vec<String>,
    system_prompt: String,
) -> RetrievalResult {
    match gateway
        .complete(&ctx.query, &ctx.model_name, &system_prompt)
        .await
    {
        Ok(completion) => RetrievalResult {
            documents,
            response: completion.response,
            system_prompt,
            error: None,
        },
        Err(e) => {
            tracing::warn!(corpus_id = %ctx.corpus_id, "generation failed: {e}");
            RetrievalResult {
                documents,
                response: None,
                system_prompt,
                error: Some(e.to_error_info()),
            }
        }
    }
}
