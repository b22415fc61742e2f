use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address
    pub bind_addr: String,
    /// JSON file holding the retrieval profile records
    pub profiles_path: PathBuf,
    /// Chat-only completion endpoint
    pub generation: GenerationConfig,
    /// distllm chat service
    pub distllm: DistllmConfig,
    /// Multi-strategy corpus search service
    pub corpus_search: CorpusSearchConfig,
    /// Local TF-IDF lookup tuning
    pub tfidf: TfidfConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Base URL; requests go to `{base_url}/chat-only`
    pub base_url: String,
    /// Bearer token sent with every completion request
    pub auth_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:7032/copilot-api/chatbrc".to_string(),
            auth_token: None,
            timeout_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistllmConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for DistllmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:7040".to_string(),
            timeout_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusSearchConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for CorpusSearchConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:7041".to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfConfig {
    /// Passages returned per lookup
    pub top_k: usize,
    /// Hits scoring below this cosine similarity are dropped
    pub min_score: f32,
}

impl Default for TfidfConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            min_score: 0.01,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            profiles_path: PathBuf::from("./rag_configs.json"),
            generation: GenerationConfig::default(),
            distllm: DistllmConfig::default(),
            corpus_search: CorpusSearchConfig::default(),
            tfidf: TfidfConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unparseable numbers keep their default.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = get("RAG_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(path) = get("RAG_PROFILES_PATH") {
            config.profiles_path = PathBuf::from(path);
        }

        if let Some(url) = get("GENERATION_BASE_URL") {
            config.generation.base_url = url;
        }
        if let Some(token) = get("GENERATION_AUTH_TOKEN") {
            config.generation.auth_token = Some(token);
        }
        if let Some(v) = get("GENERATION_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            config.generation.timeout_secs = v;
        }

        if let Some(url) = get("DISTLLM_BASE_URL") {
            config.distllm.base_url = url;
        }
        if let Some(v) = get("DISTLLM_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            config.distllm.timeout_secs = v;
        }

        if let Some(url) = get("CORPUS_SEARCH_BASE_URL") {
            config.corpus_search.base_url = url;
        }
        if let Some(v) = get("CORPUS_SEARCH_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            config.corpus_search.timeout_secs = v;
        }

        if let Some(v) = get("TFIDF_TOP_K").and_then(|v| v.parse().ok()) {
            config.tfidf.top_k = v;
        }
        if let Some(v) = get("TFIDF_MIN_SCORE").and_then(|v| v.parse().ok()) {
            config.tfidf.min_score = v;
        }

        config
    }
}
