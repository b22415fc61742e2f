use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::GenerationConfig;
use crate::error::TransportError;

const GROUNDING_INSTRUCTION: &str = "retrieved from the corpus. Use these documents to answer \
     the user's question if possible, otherwise just answer the question based on your knowledge:";

/// Build the system prompt that grounds a completion in retrieved passages.
/// `count` is named in the header when the caller asked for a specific number.
pub fn grounding_prompt(count: Option<usize>, documents: &[String]) -> String {
    let header = match count {
        Some(n) => format!("Here are the top {n} documents {GROUNDING_INSTRUCTION}"),
        None => format!("Here are the top documents {GROUNDING_INSTRUCTION}"),
    };
    format!("{header}\n\n{}", documents.join("\n\n"))
}

/// Reply from the chat-only endpoint. Only `response` is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Completion {
    #[serde(default)]
    pub response: Option<String>,
}

/// Issues the final grounded completion request.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    async fn complete(
        &self,
        query: &str,
        model: &str,
        system_prompt: &str,
    ) -> Result<Completion, TransportError>;
}

// ─── HTTP client ─────────────────────────────────────────

#[derive(Serialize)]
struct ChatOnlyRequest<'a> {
    model: &'a str,
    query: &'a str,
    system_prompt: &'a str,
    messages: [Message<'a>; 2],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

/// `POST {base_url}/chat-only`, bearer-authenticated, with a fixed timeout.
pub struct HttpGenerationGateway {
    client: reqwest::Client,
    config: GenerationConfig,
}

impl HttpGenerationGateway {
    pub fn new(client: reqwest::Client, config: GenerationConfig) -> Self {
        Self { client, config }
    }

    fn url(&self) -> String {
        format!("{}/chat-only", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl GenerationGateway for HttpGenerationGateway {
    async fn complete(
        &self,
        query: &str,
        model: &str,
        system_prompt: &str,
    ) -> Result<Completion, TransportError> {
        if query.trim().is_empty() || model.trim().is_empty() {
            return Err(TransportError::Request(
                "Both 'query' and 'model' are required parameters".to_string(),
            ));
        }

        let url = self.url();
        let timeout_secs = self.config.timeout_secs;
        let req = ChatOnlyRequest {
            model,
            query,
            system_prompt,
            messages: [
                Message {
                    role: "system",
                    content: system_prompt,
                },
                Message {
                    role: "user",
                    content: query,
                },
            ],
        };

        let mut builder = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(timeout_secs))
            .json(&req);
        if let Some(token) = &self.config.auth_token {
            builder = builder.bearer_auth(token);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(e, &url, timeout_secs))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status, "chat-only endpoint returned an error status");
            return Err(TransportError::Http { status, body });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| TransportError::from_reqwest(e, &url, timeout_secs))?;
        tracing::debug!(bytes = body.len(), "chat-only reply received");
        serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grounding_prompt_without_count() {
        let docs = vec!["doc1".to_string(), "doc2".to_string()];
        let prompt = grounding_prompt(None, &docs);
        assert!(prompt.starts_with("Here are the top documents retrieved from the corpus."));
        assert!(prompt.ends_with("your knowledge:\n\ndoc1\n\ndoc2"));
    }

    #[test]
    fn test_grounding_prompt_with_count() {
        let prompt = grounding_prompt(Some(3), &["only".to_string()]);
        assert!(prompt.starts_with("Here are the top 3 documents retrieved"));
        assert!(prompt.ends_with("\n\nonly"));
    }

    #[test]
    fn test_completion_ignores_extra_fields() {
        let c: Completion =
            serde_json::from_str(r#"{"message":"success","response":"hi","usage":{}}"#).unwrap();
        assert_eq!(c.response.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn test_missing_model_is_rejected_before_sending() {
        let gateway = HttpGenerationGateway::new(
            reqwest::Client::new(),
            GenerationConfig {
                base_url: "http://127.0.0.1:1".into(),
                ..GenerationConfig::default()
            },
        );
        let err = gateway.complete("q", "", "sp").await.unwrap_err();
        assert!(matches!(err, TransportError::Request(_)));
    }
}
