use crate::adapters::distllm::DistllmAdapter;
use crate::adapters::tfidf::TfidfAdapter;
use crate::error::RagError;
use crate::models::{QueryContext, ResponseEnvelope};
use crate::profile::{DualProfileSet, Program};

/// Runs the tfidf leg, threads its passages into the distllm leg, and merges
/// both document lists. Either leg failing aborts the request.
#[derive(Clone)]
pub struct FusionCombiner {
    tfidf: TfidfAdapter,
    distllm: DistllmAdapter,
}

impl FusionCombiner {
    pub fn new(tfidf: TfidfAdapter, distllm: DistllmAdapter) -> Self {
        Self { tfidf, distllm }
    }

    pub async fn run(
        &self,
        ctx: &QueryContext,
        profiles: &DualProfileSet,
    ) -> Result<ResponseEnvelope, RagError> {
        // ── Step 1: tfidf leg, retrieval only ────────────────
        let tfidf_documents = self.tfidf.retrieve(ctx, &profiles.tfidf).await?;

        // ── Step 2: distllm leg grounded on the tfidf passages ─
        let extra_context = tfidf_documents.join("\n\n");
        let distllm = self
            .distllm
            .run(ctx, &profiles.distllm, Some(&extra_context))
            .await;
        if let Some(info) = distllm.error {
            return Err(RagError::backend(Program::Distllm, info.error));
        }

        // ── Step 3: distllm documents first, then tfidf ──────
        let mut documents = distllm.documents;
        documents.extend(tfidf_documents);

        tracing::info!(
            corpus_id = %ctx.corpus_id,
            documents = documents.len(),
            "multi-rag combined"
        );
        Ok(ResponseEnvelope::success(
            distllm.response,
            distllm.system_prompt,
            documents,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::llm::distllm::{DistllmBackend, DistllmRequest};
    use crate::llm::gateway::{Completion, GenerationGateway};
    use crate::profile::{DistllmData, TfidfData};
    use crate::search::tfidf::TfidfBackend;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct FixedIndex(Option<Vec<String>>);

    impl TfidfBackend for FixedIndex {
        fn top_passages(&self, _query: &str, _data: &TfidfData) -> anyhow::Result<Vec<String>> {
            self.0.clone().ok_or_else(|| anyhow::anyhow!("corpus not found"))
        }
    }

    struct UnusedGateway;

    #[async_trait]
    impl GenerationGateway for UnusedGateway {
        async fn complete(&self, _: &str, _: &str, _: &str) -> Result<Completion, TransportError> {
            panic!("fusion must not call the generation gateway")
        }
    }

    struct Distllm {
        reply: String,
        calls: Mutex<Vec<Option<String>>>,
    }

    #[async_trait]
    impl DistllmBackend for Distllm {
        async fn chat(&self, req: &DistllmRequest<'_>) -> Result<String, RagError> {
            self.calls.lock().push(req.extra_context.map(str::to_string));
            Ok(self.reply.clone())
        }
    }

    fn ctx() -> QueryContext {
        QueryContext {
            query: "q".into(),
            corpus_id: "papers".into(),
            user_id: "u".into(),
            model_name: "m".into(),
            requested_doc_count: 5,
            session_id: "s".into(),
        }
    }

    fn profiles() -> DualProfileSet {
        DualProfileSet {
            tfidf: TfidfData {
                embeddings_path: "/e".into(),
                vectorizer_path: "/v".into(),
            },
            distllm: DistllmData {
                dataset_dir: "/d".into(),
                faiss_index_path: "/f".into(),
            },
        }
    }

    fn combiner(tfidf: Option<Vec<String>>, distllm: Arc<Distllm>) -> FusionCombiner {
        FusionCombiner::new(
            TfidfAdapter::new(Arc::new(FixedIndex(tfidf)), Arc::new(UnusedGateway)),
            DistllmAdapter::new(distllm),
        )
    }

    #[tokio::test]
    async fn test_distllm_documents_precede_tfidf() {
        let distllm = Arc::new(Distllm {
            reply: r#"{"response":"ok","system_prompt":"sp","documents":["C","D"]}"#.into(),
            calls: Mutex::new(Vec::new()),
        });
        let env = combiner(Some(vec!["A".into(), "B".into()]), distllm.clone())
            .run(&ctx(), &profiles())
            .await
            .unwrap();

        assert_eq!(env.documents, vec!["C", "D", "A", "B"]);
        assert_eq!(env.message.as_deref(), Some("success"));
        assert_eq!(env.response.as_deref(), Some("ok"));
        assert_eq!(env.system_prompt.as_deref(), Some("sp"));
        assert_eq!(distllm.calls.lock().as_slice(), &[Some("A\n\nB".to_string())]);
    }

    #[tokio::test]
    async fn test_tfidf_failure_aborts_before_distllm() {
        let distllm = Arc::new(Distllm {
            reply: "{}".into(),
            calls: Mutex::new(Vec::new()),
        });
        let err = combiner(None, distllm.clone())
            .run(&ctx(), &profiles())
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::Backend { program: Program::Tfidf, .. }));
        assert!(distllm.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_distllm_failure_aborts_request() {
        let distllm = Arc::new(Distllm {
            reply: "garbage".into(),
            calls: Mutex::new(Vec::new()),
        });
        let err = combiner(Some(vec!["A".into()]), distllm)
            .run(&ctx(), &profiles())
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::Backend { program: Program::Distllm, .. }));
    }

    #[tokio::test]
    async fn test_empty_tfidf_passes_empty_context() {
        let distllm = Arc::new(Distllm {
            reply: r#"{"documents":["C"]}"#.into(),
            calls: Mutex::new(Vec::new()),
        });
        let env = combiner(Some(Vec::new()), distllm.clone())
            .run(&ctx(), &profiles())
            .await
            .unwrap();
        assert_eq!(env.documents, vec!["C"]);
        assert_eq!(distllm.calls.lock().as_slice(), &[Some(String::new())]);
    }
}
