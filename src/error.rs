use thiserror::Error;

use crate::models::ErrorInfo;
use crate::profile::Program;

/// Failures raised while resolving, routing, or running a retrieval request.
#[derive(Debug, Error)]
pub enum RagError {
    /// Missing, empty, or malformed profile set.
    #[error("{0}")]
    Configuration(String),

    /// A single profile named a program outside the known set (or none at all).
    #[error("{}", unknown_program_message(.0.as_deref()))]
    UnknownProgram(Option<String>),

    /// Adapter-internal failure, tagged with the backend that produced it.
    #[error("{message}")]
    Backend { program: Program, message: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A collaborator replied with something we could not parse.
    #[error("{0}")]
    Decode(String),
}

impl RagError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn backend(program: Program, msg: impl Into<String>) -> Self {
        Self::Backend {
            program,
            message: msg.into(),
        }
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

fn unknown_program_message(program: Option<&str>) -> String {
    let allowed = Program::ALL
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    match program {
        Some(p) => format!("Unknown RAG program '{p}'. Available programs: {allowed}"),
        None => format!("RAG program not specified. Available programs: {allowed}"),
    }
}

/// Failures talking to an HTTP collaborator, classified by cause.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} timed out after {timeout_secs} seconds")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("failed to connect to {url}")]
    Connection { url: String },

    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("invalid JSON response: {0}")]
    Decode(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl TransportError {
    /// Classify a reqwest failure. `timeout_secs` is only used for the message.
    pub fn from_reqwest(err: reqwest::Error, url: &str, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
                timeout_secs,
            }
        } else if err.is_connect() {
            Self::Connection {
                url: url.to_string(),
            }
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            Self::Request(err.to_string())
        }
    }

    /// Structured `{error, message}` pair carried back to the caller.
    pub fn to_error_info(&self) -> ErrorInfo {
        match self {
            Self::Timeout { timeout_secs, .. } => ErrorInfo::new(
                "Request timeout",
                format!("The chat request timed out after {timeout_secs} seconds"),
            ),
            Self::Connection { url } => {
                ErrorInfo::new("Connection error", format!("Failed to connect to {url}"))
            }
            Self::Http { status, body } => ErrorInfo::new(format!("HTTP error {status}"), body),
            Self::Decode(_) => ErrorInfo::new(
                "Invalid JSON response",
                "The server returned an invalid JSON response",
            ),
            Self::Request(msg) => ErrorInfo::new("Request failed", msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_program_names_allowed_set() {
        let err = RagError::UnknownProgram(Some("chroma".into()));
        let msg = err.to_string();
        assert!(msg.contains("'chroma'"));
        assert!(msg.contains("distllm"));
        assert!(msg.contains("tfidf"));
        assert!(msg.contains("corpusSearch"));
    }

    #[test]
    fn test_missing_program_message() {
        let err = RagError::UnknownProgram(None);
        assert!(err.to_string().starts_with("RAG program not specified"));
    }

    #[test]
    fn test_configuration_message_is_verbatim() {
        let err = RagError::configuration("No RAG configurations found for database 'x'");
        assert_eq!(err.to_string(), "No RAG configurations found for database 'x'");
    }

    #[test]
    fn test_transport_error_info_mapping() {
        let timeout = TransportError::Timeout {
            url: "http://x".into(),
            timeout_secs: 300,
        };
        assert_eq!(timeout.to_error_info().error, "Request timeout");

        let http = TransportError::Http {
            status: 502,
            body: "bad gateway".into(),
        };
        let info = http.to_error_info();
        assert_eq!(info.error, "HTTP error 502");
        assert_eq!(info.message, "bad gateway");

        let decode = TransportError::Decode("eof".into());
        assert_eq!(decode.to_error_info().error, "Invalid JSON response");
    }
}
