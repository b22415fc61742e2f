use std::sync::Arc;

use crate::adapters::corpus_search::CorpusSearchAdapter;
use crate::adapters::distllm::DistllmAdapter;
use crate::adapters::fusion::FusionCombiner;
use crate::adapters::tfidf::TfidfAdapter;
use crate::models::{QueryContext, ResponseEnvelope};
use crate::profile::{ProfileRecord, ProfileSet, RetrievalProfile};
use crate::resolver::ConfigResolver;

const DISPATCH_FAILURE: &str = "Failed to process RAG request";
const MULTI_RAG_FAILURE: &str = "Failed to process multi-RAG request";
const MULTI_RAG_PROGRAM: &str = "multi_rag";
const UNKNOWN_PROGRAM: &str = "unknown";

/// Routes a resolved profile list to exactly one adapter, or to the fusion
/// combiner for a tfidf+distllm pair.
#[derive(Clone)]
pub struct Dispatcher {
    tfidf: TfidfAdapter,
    distllm: DistllmAdapter,
    corpus_search: CorpusSearchAdapter,
    fusion: FusionCombiner,
}

impl Dispatcher {
    pub fn new(
        tfidf: TfidfAdapter,
        distllm: DistllmAdapter,
        corpus_search: CorpusSearchAdapter,
    ) -> Self {
        let fusion = FusionCombiner::new(tfidf.clone(), distllm.clone());
        Self {
            tfidf,
            distllm,
            corpus_search,
            fusion,
        }
    }

    /// Never fails: every error is folded into a failure envelope.
    pub async fn route(&self, ctx: &QueryContext, records: &[ProfileRecord]) -> ResponseEnvelope {
        let profiles = match ProfileSet::classify(&ctx.corpus_id, records) {
            Ok(profiles) => profiles,
            Err(e) => {
                let (program, message) = classification_failure(records);
                tracing::warn!(
                    corpus_id = %ctx.corpus_id,
                    program,
                    records = records.len(),
                    "rejected profiles: {e}"
                );
                return ResponseEnvelope::failure(e.to_string(), message, &ctx.corpus_id, program);
            }
        };

        match profiles {
            ProfileSet::Single(profile) => self.route_single(ctx, profile).await,
            ProfileSet::Dual(set) => {
                tracing::info!(
                    corpus_id = %ctx.corpus_id,
                    program = MULTI_RAG_PROGRAM,
                    "dispatching"
                );
                match self.fusion.run(ctx, &set).await {
                    Ok(envelope) => envelope,
                    Err(e) => {
                        tracing::warn!(corpus_id = %ctx.corpus_id, "multi-rag failed: {e}");
                        ResponseEnvelope::failure(
                            e.to_string(),
                            MULTI_RAG_FAILURE,
                            &ctx.corpus_id,
                            MULTI_RAG_PROGRAM,
                        )
                    }
                }
            }
        }
    }

    async fn route_single(
        &self,
        ctx: &QueryContext,
        profile: RetrievalProfile,
    ) -> ResponseEnvelope {
        let program = profile.program();
        tracing::info!(corpus_id = %ctx.corpus_id, program = program.as_str(), "dispatching");

        let outcome = match &profile {
            RetrievalProfile::Tfidf(data) => self.tfidf.run(ctx, data).await,
            RetrievalProfile::Distllm(data) => Ok(self.distllm.run(ctx, data, None).await),
            RetrievalProfile::CorpusSearch => self.corpus_search.run(ctx).await,
        };

        match outcome {
            Ok(result) => {
                if let Some(info) = &result.error {
                    tracing::warn!(
                        corpus_id = %ctx.corpus_id,
                        program = program.as_str(),
                        "adapter reported failure: {}",
                        info.error
                    );
                }
                ResponseEnvelope::from_result(result, &ctx.corpus_id, program.as_str())
            }
            Err(e) => {
                tracing::warn!(
                    corpus_id = %ctx.corpus_id,
                    program = program.as_str(),
                    "adapter failed: {e}"
                );
                ResponseEnvelope::failure(
                    e.to_string(),
                    program.failure_message(),
                    &ctx.corpus_id,
                    program.as_str(),
                )
            }
        }
    }
}

/// Program label and message for a profile list that failed classification.
fn classification_failure(records: &[ProfileRecord]) -> (&str, &'static str) {
    match records {
        [] => (UNKNOWN_PROGRAM, DISPATCH_FAILURE),
        [single] => (
            single.program.as_deref().unwrap_or(UNKNOWN_PROGRAM),
            DISPATCH_FAILURE,
        ),
        _ => (MULTI_RAG_PROGRAM, MULTI_RAG_FAILURE),
    }
}

/// Entry point for one request: resolve the corpus profiles, then dispatch.
pub struct RagService {
    resolver: Arc<dyn ConfigResolver>,
    dispatcher: Dispatcher,
}

impl RagService {
    pub fn new(resolver: Arc<dyn ConfigResolver>, dispatcher: Dispatcher) -> Self {
        Self {
            resolver,
            dispatcher,
        }
    }

    pub async fn handle(&self, ctx: QueryContext) -> ResponseEnvelope {
        let records = match self.resolver.resolve(&ctx.corpus_id).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(corpus_id = %ctx.corpus_id, "profile lookup failed: {e}");
                return ResponseEnvelope::failure(
                    e.to_string(),
                    DISPATCH_FAILURE,
                    &ctx.corpus_id,
                    UNKNOWN_PROGRAM,
                );
            }
        };
        self.dispatcher.route(&ctx, &records).await
    }
}
