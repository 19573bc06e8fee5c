//! HTTP client wrapper - builds fetch requests from connections and executes them

use async_trait::async_trait;
use base64::Engine;
use reqwest::Url;

use crate::constants::DEFAULT_CONTENT_TYPE;
use crate::error::{ExplorerError, Result};
use crate::models::{Auth, Connection, HttpMethod, KeyValue};

/// A fully composed outbound request
#[derive(Clone, Debug, PartialEq)]
pub struct FetchRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl FetchRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response handed back by the fetcher
#[derive(Clone, Debug, PartialEq)]
pub struct FetchResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl FetchResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outbound HTTP boundary
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse>;
}

/// Composes URL, headers and body for a query.
///
/// Without a connection `path` must already be an absolute URL. Headers start
/// from `Content-Type: application/json`, caller headers replace by name, and
/// connection auth is applied last.
pub fn build_fetch_request(
    connection: Option<&Connection>,
    method: HttpMethod,
    path: &str,
    params: &[KeyValue],
    headers: &[KeyValue],
    body: Option<&str>,
) -> Result<FetchRequest> {
    let raw_url = match connection {
        Some(conn) => format!("{}{}", conn.base_url.trim_end_matches('/'), path),
        None => path.to_string(),
    };
    let mut url = Url::parse(&raw_url)
        .map_err(|e| ExplorerError::Validation(format!("Invalid URL '{}': {}", raw_url, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ExplorerError::Validation(format!(
            "Unsupported URL scheme: {}",
            url.scheme()
        )));
    }

    let mut final_headers: Vec<(String, String)> =
        vec![("Content-Type".to_string(), DEFAULT_CONTENT_TYPE.to_string())];
    for header in headers.iter().filter(|h| !h.key.is_empty()) {
        set_header(&mut final_headers, &header.key, &header.value);
    }

    {
        let mut query = url.query_pairs_mut();
        for param in params.iter().filter(|p| !p.key.is_empty()) {
            query.append_pair(&param.key, &param.value);
        }
    }

    if let Some(conn) = connection {
        apply_auth(&conn.auth, &mut url, &mut final_headers);
    }

    // An empty query string leaves a dangling '?'
    if url.query() == Some("") {
        url.set_query(None);
    }

    let body = body
        .filter(|b| method.has_body() && !b.is_empty())
        .map(str::to_string);

    Ok(FetchRequest {
        url: url.to_string(),
        method,
        headers: final_headers,
        body,
    })
}

/// The URL without its query string, which may carry credentials
pub fn redact_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.to_string()
        }
        Err(_) => url.split('?').next().unwrap_or_default().to_string(),
    }
}

fn set_header(headers: &mut Vec<(String, String)>, key: &str, value: &str) {
    match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
        Some(existing) => *existing = (key.to_string(), value.to_string()),
        None => headers.push((key.to_string(), value.to_string())),
    }
}

/// Applies connection auth. Variants with empty credentials contribute nothing.
pub fn apply_auth(auth: &Auth, url: &mut Url, headers: &mut Vec<(String, String)>) {
    match auth {
        Auth::Basic { username, password } if !username.is_empty() && !password.is_empty() => {
            let credentials = format!("{}:{}", username, password);
            let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
            set_header(headers, "Authorization", &format!("Basic {}", encoded));
        }
        Auth::Bearer { token } if !token.is_empty() => {
            set_header(headers, "Authorization", &format!("Bearer {}", token));
        }
        Auth::ApiKey { header_name, value } if !header_name.is_empty() && !value.is_empty() => {
            set_header(headers, header_name, value);
        }
        Auth::WooCommerce {
            consumer_key,
            consumer_secret,
        } if !consumer_key.is_empty() && !consumer_secret.is_empty() => {
            url.query_pairs_mut()
                .append_pair("consumer_key", consumer_key)
                .append_pair("consumer_secret", consumer_secret);
        }
        _ => {}
    }
}

/// Fetcher backed by a shared reqwest client
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        ReqwestFetcher { client }
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse> {
        let mut req_builder = match request.method {
            HttpMethod::GET => self.client.get(&request.url),
            HttpMethod::POST => self.client.post(&request.url),
            HttpMethod::PUT => self.client.put(&request.url),
            HttpMethod::PATCH => self.client.patch(&request.url),
            HttpMethod::DELETE => self.client.delete(&request.url),
        };

        req_builder = req_builder.header("Cache-Control", "no-store");
        for (key, value) in &request.headers {
            req_builder = req_builder.header(key, value);
        }
        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        let resp = req_builder.send().await.map_err(|e| {
            if e.is_connect() {
                ExplorerError::Network(
                    "Connection failed. Check the URL and your internet connection.".to_string(),
                )
            } else {
                ExplorerError::Transport(e.without_url().to_string())
            }
        })?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ExplorerError::Transport(format!("Error reading body: {}", e.without_url())))?;

        Ok(FetchResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            body,
        })
    }
}

/// Create an HTTP client with default configuration.
/// No timeout is set; reqwest's defaults apply.
pub fn create_client() -> reqwest::Client {
    reqwest::Client::builder()
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
