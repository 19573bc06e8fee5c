//! Error taxonomy shared by the explorer core
//!
//! Query failures never escape [`crate::explorer::Explorer::execute`]; they are
//! rendered through `Display` into the response envelope's `error` field.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExplorerError {
    /// Bad input shape, caught before any network call
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The fetch collaborator could not reach the server
    #[error("{0}")]
    Network(String),

    /// Non-2xx response
    #[error("Error: {status} {status_text}. {detail}")]
    Http {
        status: u16,
        status_text: String,
        detail: String,
    },

    /// Any other fetch failure (TLS, malformed request, body read)
    #[error("Request failed: {0}")]
    Transport(String),

    /// 2xx response whose body is not JSON
    #[error("Invalid JSON response: {0}")]
    InvalidResponse(String),

    /// Degraded silently by the resolver, never shown to the user
    #[error("Name suggestion failed: {0}")]
    NameSuggestion(String),

    #[error("{0}")]
    Export(String),
}

impl ExplorerError {
    /// Builds an HTTP error from a non-2xx body, preferring its JSON `message` field
    pub fn from_http_body(status: u16, status_text: impl Into<String>, body: &str) -> Self {
        let detail = match serde_json::from_str::<serde_json::Value>(body) {
            Ok(json) => {
                let message = match json.get("message") {
                    Some(message) if is_truthy(message) => match message {
                        serde_json::Value::String(text) => text.clone(),
                        other => other.to_string(),
                    },
                    _ => json.to_string(),
                };
                format!("Details: {}", message)
            }
            Err(_) => body.to_string(),
        };

        ExplorerError::Http {
            status,
            status_text: status_text.into(),
            detail,
        }
    }

    /// Replaces every occurrence of `secret` in the message with `shown`
    pub fn scrub(self, secret: &str, shown: &str) -> Self {
        if secret.is_empty() {
            return self;
        }
        let clean = |text: String| text.replace(secret, shown);
        match self {
            ExplorerError::Validation(m) => ExplorerError::Validation(clean(m)),
            ExplorerError::Network(m) => ExplorerError::Network(clean(m)),
            ExplorerError::Http { status, status_text, detail } => ExplorerError::Http {
                status,
                status_text,
                detail: clean(detail),
            },
            ExplorerError::Transport(m) => ExplorerError::Transport(clean(m)),
            ExplorerError::InvalidResponse(m) => ExplorerError::InvalidResponse(clean(m)),
            ExplorerError::NameSuggestion(m) => ExplorerError::NameSuggestion(clean(m)),
            ExplorerError::Export(m) => ExplorerError::Export(clean(m)),
        }
    }
}

/// Empty strings, zero, false and null do not count as a message
fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        serde_json::Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
