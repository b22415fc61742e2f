use serde::{Deserialize, Serialize};

/// Immutable per-request inputs, passed by reference through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryContext {
    pub query: String,
    pub corpus_id: String,
    pub user_id: String,
    pub model_name: String,
    pub requested_doc_count: usize,
    pub session_id: String,
}

impl From<RagRequest> for QueryContext {
    fn from(req: RagRequest) -> Self {
        Self {
            query: req.query,
            corpus_id: req.rag_db,
            user_id: req.user_id.unwrap_or_default(),
            model_name: req.model.unwrap_or_default(),
            requested_doc_count: req.num_docs,
            session_id: req.session_id.unwrap_or_default(),
        }
    }
}

/// `{error, message}` pair describing a captured failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub error: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

/// What a single adapter produced for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetrievalResult {
    /// Retrieved passages, best first.
    pub documents: Vec<String>,
    pub response: Option<String>,
    pub system_prompt: String,
    pub error: Option<ErrorInfo>,
}

impl RetrievalResult {
    pub fn failed(error: ErrorInfo) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }
}

/// The only object returned across the service boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documents: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rag_db: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
}

impl ResponseEnvelope {
    pub fn success(
        response: Option<String>,
        system_prompt: String,
        documents: Vec<String>,
    ) -> Self {
        Self {
            message: Some("success".to_string()),
            response,
            system_prompt: Some(system_prompt),
            documents,
            ..Self::default()
        }
    }

    /// Failure envelope carrying the corpus id and offending program.
    pub fn failure(
        error: impl Into<String>,
        message: impl Into<String>,
        rag_db: &str,
        program: &str,
    ) -> Self {
        Self {
            message: Some(message.into()),
            error: Some(error.into()),
            rag_db: Some(rag_db.to_string()),
            program: Some(program.to_string()),
            ..Self::default()
        }
    }

    /// Pass an adapter result through unchanged. A captured error keeps the
    /// documents and prompt that were produced before it.
    pub fn from_result(result: RetrievalResult, rag_db: &str, program: &str) -> Self {
        match result.error {
            None => Self::success(result.response, result.system_prompt, result.documents),
            Some(info) => Self {
                message: Some(info.message),
                response: result.response,
                system_prompt: (!result.system_prompt.is_empty()).then_some(result.system_prompt),
                documents: result.documents,
                error: Some(info.error),
                rag_db: Some(rag_db.to_string()),
                program: Some(program.to_string()),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// POST /rag request body.
#[derive(Debug, Clone, Deserialize)]
pub struct RagRequest {
    pub query: String,
    pub rag_db: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_num_docs")]
    pub num_docs: usize,
    #[serde(default)]
    pub session_id: Option<String>,
}

fn default_num_docs() -> usize {
    5
}
