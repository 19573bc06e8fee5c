//! Gemini-backed name suggester

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::constants::GEMINI_API_BASE;
use crate::error::{ExplorerError, Result};
use crate::naming::resolver::{NameMap, NameSuggester};

pub struct GeminiSuggester {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiSuggester {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        GeminiSuggester {
            client,
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    fn prompt(keys: &[String]) -> String {
        format!(
            "You are an expert in API and data analysis. Given the following list of JSON keys \
             extracted from an API, suggest user-friendly and readable names for each key in English.\n\n\
             Keys: {}\n\n\
             Return a mapping in JSON format: {{\"original_key\": \"suggested_name\"}}.",
            keys.join(",")
        )
    }

    /// The key travels in a header so it never appears in URLs or error text
    fn build_request(&self, keys: &[String]) -> Result<reqwest::Request> {
        let url = format!("{}/{}:generateContent", GEMINI_API_BASE, self.model);
        let payload = json!({
            "contents": [{ "parts": [{ "text": Self::prompt(keys) }] }],
            "generationConfig": { "responseMimeType": "application/json" }
        });

        self.client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .build()
            .map_err(|e| ExplorerError::NameSuggestion(e.without_url().to_string()))
    }
}

#[async_trait]
impl NameSuggester for GeminiSuggester {
    async fn suggest(&self, keys: &[String]) -> Result<NameMap> {
        let request = self.build_request(keys)?;

        tracing::info!(model = %self.model, keys = keys.len(), "Requesting friendly names");
        let resp = self
            .client
            .execute(request)
            .await
            .map_err(|e| ExplorerError::NameSuggestion(e.without_url().to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ExplorerError::NameSuggestion(e.without_url().to_string()))?;
        if !status.is_success() {
            return Err(ExplorerError::NameSuggestion(format!("{} {}", status.as_u16(), body)));
        }

        let reply: Value = serde_json::from_str(&body)
            .map_err(|e| ExplorerError::NameSuggestion(format!("malformed reply: {}", e)))?;
        let text = reply
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(|t| t.as_str())
            .ok_or_else(|| ExplorerError::NameSuggestion("reply has no text part".to_string()))?;

        parse_suggestions(text)
    }
}

/// Parses a model reply: either `{"key": "Name"}` or `[{"key": .., "friendlyName": ..}]`,
/// optionally wrapped in a markdown code fence.
pub fn parse_suggestions(text: &str) -> Result<NameMap> {
    let trimmed = text
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let value: Value = serde_json::from_str(trimmed)
        .map_err(|e| ExplorerError::NameSuggestion(format!("malformed suggestions: {}", e)))?;

    let mut names = NameMap::new();
    match value {
        Value::Object(map) => {
            for (key, name) in map {
                if let Value::String(name) = name {
                    names.insert(key, name);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                let key = item.get("key").and_then(|k| k.as_str());
                let name = item.get("friendlyName").and_then(|n| n.as_str());
                if let (Some(key), Some(name)) = (key, name) {
                    names.insert(key.to_string(), name.to_string());
                }
            }
        }
        other => {
            return Err(ExplorerError::NameSuggestion(format!(
                "unexpected suggestion shape: {}",
                other
            )))
        }
    }
    Ok(names)
}
