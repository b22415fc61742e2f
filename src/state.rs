use std::sync::Arc;

use crate::adapters::corpus_search::CorpusSearchAdapter;
use crate::adapters::distllm::DistllmAdapter;
use crate::adapters::tfidf::TfidfAdapter;
use crate::config::Config;
use crate::dispatch::{Dispatcher, RagService};
use crate::llm::distllm::HttpDistllmClient;
use crate::llm::gateway::{GenerationGateway, HttpGenerationGateway};
use crate::resolver::JsonFileResolver;
use crate::search::cache::ArtifactCache;
use crate::search::corpus::HttpCorpusSearchClient;
use crate::search::tfidf::LocalTfidfIndex;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RagService>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        // Per-request timeouts are set by each client; this is the ceiling.
        let http_client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(
                config
                    .generation
                    .timeout_secs
                    .max(config.distllm.timeout_secs)
                    .max(config.corpus_search.timeout_secs),
            ))
            .build()?;

        let artifacts = Arc::new(ArtifactCache::new());
        let gateway: Arc<dyn GenerationGateway> = Arc::new(HttpGenerationGateway::new(
            http_client.clone(),
            config.generation.clone(),
        ));

        let dispatcher = Dispatcher::new(
            TfidfAdapter::new(
                Arc::new(LocalTfidfIndex::new(artifacts, config.tfidf.clone())),
                gateway.clone(),
            ),
            DistllmAdapter::new(Arc::new(HttpDistllmClient::new(
                http_client.clone(),
                config.distllm.clone(),
            ))),
            CorpusSearchAdapter::new(
                Arc::new(HttpCorpusSearchClient::new(
                    http_client,
                    config.corpus_search.clone(),
                )),
                gateway,
            ),
        );
        let resolver = Arc::new(JsonFileResolver::new(config.profiles_path.clone()));

        Ok(Self {
            service: Arc::new(RagService::new(resolver, dispatcher)),
        })
    }

    /// State around an already assembled service.
    pub fn with_service(service: RagService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
