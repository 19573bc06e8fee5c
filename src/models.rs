use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::ExplorerError;

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::DELETE => "DELETE",
        }
    }

    /// Only POST and PUT carry the query body
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::POST | HttpMethod::PUT)
    }
}

impl FromStr for HttpMethod {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::GET),
            "POST" => Ok(HttpMethod::POST),
            "PUT" => Ok(HttpMethod::PUT),
            "PATCH" => Ok(HttpMethod::PATCH),
            "DELETE" => Ok(HttpMethod::DELETE),
            _ => Err(ExplorerError::Validation(format!("Unknown HTTP method: {}", s))),
        }
    }
}

/// Kind of API behind a connection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiType {
    #[default]
    Generic,
    WordPress,
}

impl ApiType {
    pub fn as_str(&self) -> &str {
        match self {
            ApiType::Generic => "Generic",
            ApiType::WordPress => "WordPress",
        }
    }
}

/// Authentication attached to a connection
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Auth {
    #[default]
    None,
    Basic {
        username: String,
        password: String,
    },
    Bearer {
        token: String,
    },
    #[serde(rename_all = "camelCase")]
    ApiKey {
        header_name: String,
        value: String,
    },
    #[serde(rename_all = "camelCase")]
    WooCommerce {
        consumer_key: String,
        consumer_secret: String,
    },
}

impl Auth {
    pub fn as_str(&self) -> &str {
        match self {
            Auth::None => "None",
            Auth::Basic { .. } => "Basic",
            Auth::Bearer { .. } => "Bearer",
            Auth::ApiKey { .. } => "API Key",
            Auth::WooCommerce { .. } => "WooCommerce",
        }
    }
}

/// A saved API connection
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub name: String,
    pub base_url: String,
    #[serde(default)]
    pub api_type: ApiType,
    #[serde(default)]
    pub auth: Auth,
}

/// Connection form input, before the store assigns an id
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConnection {
    pub name: String,
    pub base_url: String,
    #[serde(default)]
    pub api_type: ApiType,
    #[serde(default)]
    pub auth: Auth,
}

impl NewConnection {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        NewConnection {
            name: name.into(),
            base_url: base_url.into(),
            api_type: ApiType::Generic,
            auth: Auth::None,
        }
    }

    pub fn with_api_type(mut self, api_type: ApiType) -> Self {
        self.api_type = api_type;
        self
    }

    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }

    pub fn into_connection(self, id: impl Into<String>) -> Connection {
        Connection {
            id: id.into(),
            name: self.name,
            base_url: self.base_url,
            api_type: self.api_type,
            auth: self.auth,
        }
    }
}

/// Ordered key/value pair from the query builder (params and headers)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        KeyValue {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A single query as entered in the query builder
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Raw method text, validated at execution time
    pub method: String,
    /// Path appended to the connection base URL, or a full URL without a connection
    pub path: String,
    pub params: Vec<KeyValue>,
    pub headers: Vec<KeyValue>,
    pub body: Option<String>,
}

impl QueryRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        QueryRequest {
            method: method.into(),
            path: path.into(),
            params: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }
}

impl Default for QueryRequest {
    fn default() -> Self {
        QueryRequest::new("GET", "")
    }
}

/// Result of one query execution
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponseEnvelope {
    pub raw_data: serde_json::Value,
    pub suggested_names: BTreeMap<String, String>,
    pub error: Option<String>,
    pub is_discovery: bool,
    pub namespace: Option<String>,
}

impl ApiResponseEnvelope {
    pub fn failure(error: impl ToString) -> Self {
        ApiResponseEnvelope {
            error: Some(error.to_string()),
            ..Default::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::GET);
        assert_eq!(" Delete ".parse::<HttpMethod>().unwrap(), HttpMethod::DELETE);
        assert!("FETCH".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_body_only_for_post_and_put() {
        assert!(HttpMethod::POST.has_body());
        assert!(HttpMethod::PUT.has_body());
        assert!(!HttpMethod::PATCH.has_body());
        assert!(!HttpMethod::GET.has_body());
    }

    #[test]
    fn test_auth_wire_shape() {
        let auth = Auth::WooCommerce {
            consumer_key: "ck".into(),
            consumer_secret: "cs".into(),
        };
        let json = serde_json::to_value(&auth).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "wooCommerce", "consumerKey": "ck", "consumerSecret": "cs"})
        );

        let parsed: Auth = serde_json::from_value(serde_json::json!({"type": "none"})).unwrap();
        assert_eq!(parsed, Auth::None);
    }
}
