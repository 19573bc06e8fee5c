//! Query execution orchestrator
//!
//! Validates a [`QueryRequest`], builds and dispatches it through the
//! [`HttpFetcher`], classifies the JSON reply and resolves friendly names for
//! tabular results. Every failure ends up as a string on the returned
//! [`ApiResponseEnvelope`]; nothing is propagated past [`Explorer::execute`].

use std::sync::Arc;

use serde_json::Value;

use crate::constants::NAME_CACHE_PREFIX;
use crate::error::{ExplorerError, Result};
use crate::models::{ApiResponseEnvelope, ApiType, Connection, HttpMethod, KeyValue, QueryRequest};
use crate::naming::{NameResolver, NameSuggester};
use crate::network::client::{build_fetch_request, redact_url, FetchResponse, HttpFetcher};
use crate::reports::{calculate_financial_metrics, FinancialReport, FinancialReportInput, Order};
use crate::schema::{classify, key_union, Classification};

pub struct Explorer {
    fetcher: Arc<dyn HttpFetcher>,
    resolver: NameResolver,
}

impl Explorer {
    pub fn new(fetcher: Arc<dyn HttpFetcher>, suggester: Arc<dyn NameSuggester>) -> Self {
        Explorer {
            fetcher,
            resolver: NameResolver::new(suggester),
        }
    }

    pub fn resolver(&self) -> &NameResolver {
        &self.resolver
    }

    /// Runs one query. Single-shot: no retries, no timeout beyond the fetcher's own.
    pub async fn execute(&self, connection: Option<&Connection>, request: &QueryRequest) -> ApiResponseEnvelope {
        match self.try_execute(connection, request).await {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(error = %e, path = %request.path, "Query failed");
                ApiResponseEnvelope::failure(e)
            }
        }
    }

    async fn try_execute(
        &self,
        connection: Option<&Connection>,
        request: &QueryRequest,
    ) -> Result<ApiResponseEnvelope> {
        let method = validate(request)?;
        let path = request.path.trim();
        let fetch_request = build_fetch_request(
            connection,
            method,
            path,
            &request.params,
            &request.headers,
            request.body.as_deref(),
        )?;

        let secret_url = fetch_request.url.clone();
        let shown_url = redact_url(&secret_url);
        tracing::info!(method = method.as_str(), url = %shown_url, "Executing query");
        let response = self
            .fetcher
            .fetch(fetch_request)
            .await
            .map_err(|e| e.scrub(&secret_url, &shown_url))?;
        tracing::info!(status = response.status, "Query completed");
        let raw = parse_json(response)?;

        match classify(&raw) {
            Classification::Discovery(schema) => Ok(ApiResponseEnvelope {
                raw_data: raw,
                is_discovery: true,
                namespace: schema.namespace,
                ..Default::default()
            }),
            Classification::Tabular(rows) => {
                let keys = key_union(&rows);
                let cache_key = cache_key(connection, path);
                let suggested_names = self.resolver.resolve(&cache_key, &keys).await;
                Ok(ApiResponseEnvelope {
                    raw_data: raw,
                    suggested_names,
                    ..Default::default()
                })
            }
            Classification::Empty | Classification::Scalar(_) => Ok(ApiResponseEnvelope {
                raw_data: raw,
                ..Default::default()
            }),
        }
    }

    /// Fetches `<base>/orders` for the given filter and computes sales metrics.
    /// Only WordPress connections expose the orders endpoint.
    pub async fn financial_report(
        &self,
        connection: &Connection,
        input: &FinancialReportInput,
    ) -> Result<FinancialReport> {
        if connection.api_type != ApiType::WordPress {
            return Err(ExplorerError::Validation(
                "Financial reports are only available for WordPress connections.".to_string(),
            ));
        }
        if input.start_date.is_empty() || input.end_date.is_empty() || input.status.is_empty() {
            return Err(ExplorerError::Validation(
                "startDate, endDate and status are required.".to_string(),
            ));
        }

        let params = [
            KeyValue::new("start_date", &input.start_date),
            KeyValue::new("end_date", &input.end_date),
            KeyValue::new("status", &input.status),
        ];
        let request = build_fetch_request(Some(connection), HttpMethod::GET, "/orders", &params, &[], None)?;

        let secret_url = request.url.clone();
        let shown_url = redact_url(&secret_url);
        tracing::info!(url = %shown_url, "Fetching orders for financial report");
        let response = self
            .fetcher
            .fetch(request)
            .await
            .map_err(|e| e.scrub(&secret_url, &shown_url))?;
        let raw = parse_json(response)?;
        let orders: Vec<Order> =
            serde_json::from_value(raw).map_err(|e| ExplorerError::InvalidResponse(e.to_string()))?;

        Ok(calculate_financial_metrics(&orders))
    }
}

fn validate(request: &QueryRequest) -> Result<HttpMethod> {
    let method = request.method.parse::<HttpMethod>()?;
    if request.path.trim().is_empty() {
        return Err(ExplorerError::Validation("Endpoint path is required.".to_string()));
    }
    Ok(method)
}

fn parse_json(response: FetchResponse) -> Result<Value> {
    if !response.ok() {
        tracing::warn!(status = response.status, "Non-success response");
        return Err(ExplorerError::from_http_body(
            response.status,
            response.status_text,
            &response.body,
        ));
    }
    serde_json::from_str(&response.body).map_err(|e| ExplorerError::InvalidResponse(e.to_string()))
}

/// Endpoint identity used to memoize friendly names
pub fn cache_key(connection: Option<&Connection>, path: &str) -> String {
    match connection {
        Some(conn) => format!("{}{}{}", NAME_CACHE_PREFIX, conn.base_url, path),
        None => format!("{}{}", NAME_CACHE_PREFIX, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Auth, NewConnection};
    use crate::naming::IdentitySuggester;
    use crate::network::client::FetchRequest;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Canned {
        response: Result<FetchResponse>,
        seen: Mutex<Vec<FetchRequest>>,
    }

    impl Canned {
        fn new(response: Result<FetchResponse>) -> Arc<Self> {
            Arc::new(Canned { response, seen: Mutex::new(Vec::new()) })
        }

        fn ok(body: &str) -> Arc<Self> {
            Self::new(Ok(FetchResponse { status: 200, status_text: "OK".into(), body: body.into() }))
        }
    }

    #[async_trait]
    impl HttpFetcher for Canned {
        async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse> {
            self.seen.lock().unwrap().push(request);
            self.response.clone()
        }
    }

    /// Fails the way reqwest does, echoing the full request URL
    struct EchoUrlFailure;

    #[async_trait]
    impl HttpFetcher for EchoUrlFailure {
        async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse> {
            Err(ExplorerError::Transport(format!("error sending request for url ({})", request.url)))
        }
    }

    fn explorer(fetcher: Arc<Canned>) -> Explorer {
        Explorer::new(fetcher, Arc::new(IdentitySuggester))
    }

    fn wordpress() -> Connection {
        NewConnection::new("wp", "http://localhost:10014/wp-json")
            .with_api_type(ApiType::WordPress)
            .with_auth(Auth::Basic { username: "u".into(), password: "p".into() })
            .into_connection("wp-1")
    }

    #[tokio::test]
    async fn test_validation_skips_network() {
        let fetcher = Canned::ok("[]");
        let explorer = explorer(fetcher.clone());

        let envelope = explorer.execute(Some(&wordpress()), &QueryRequest::new("FETCH", "/x")).await;
        assert!(envelope.error.unwrap().contains("Unknown HTTP method"));

        let envelope = explorer.execute(Some(&wordpress()), &QueryRequest::new("GET", "  ")).await;
        assert!(envelope.error.is_some());
        assert!(fetcher.seen.lock().unwrap().is_empty());
        assert!(explorer.resolver().cache().is_empty());
    }

    #[tokio::test]
    async fn test_discovery_skips_names() {
        let fetcher = Canned::ok(r#"{"namespace":"wp/v2","routes":{"/wp/v2/posts":{"methods":["GET","POST"]}}}"#);
        let explorer = explorer(fetcher);

        let envelope = explorer.execute(Some(&wordpress()), &QueryRequest::new("GET", "/")).await;
        assert!(envelope.is_discovery);
        assert_eq!(envelope.namespace.as_deref(), Some("wp/v2"));
        assert!(envelope.suggested_names.is_empty());
        assert!(explorer.resolver().cache().is_empty());
    }

    #[tokio::test]
    async fn test_empty_object_is_not_an_error() {
        let explorer = explorer(Canned::ok("{}"));
        let envelope = explorer.execute(Some(&wordpress()), &QueryRequest::new("GET", "/empty")).await;
        assert_eq!(envelope.error, None);
        assert!(envelope.suggested_names.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_json_body() {
        let explorer = explorer(Canned::ok("<html>"));
        let envelope = explorer.execute(Some(&wordpress()), &QueryRequest::new("GET", "/x")).await;
        assert!(envelope.error.unwrap().starts_with("Invalid JSON response"));
    }

    #[tokio::test]
    async fn test_network_error_message() {
        let fetcher = Canned::new(Err(ExplorerError::Network(
            "Connection failed. Check the URL and your internet connection.".into(),
        )));
        let explorer = explorer(fetcher);
        let envelope = explorer.execute(None, &QueryRequest::new("GET", "https://nowhere.invalid/x")).await;
        assert_eq!(
            envelope.error.as_deref(),
            Some("Connection failed. Check the URL and your internet connection.")
        );
        assert_eq!(envelope.raw_data, Value::Null);
    }

    #[tokio::test]
    async fn test_cache_key_uses_endpoint_identity() {
        let conn = wordpress();
        assert_eq!(cache_key(Some(&conn), "/users"), "ai-suggestions:http://localhost:10014/wp-json/users");
        assert_eq!(cache_key(None, "https://a.example/x"), "ai-suggestions:https://a.example/x");

        let explorer = explorer(Canned::ok(r#"[{"id":1}]"#));
        explorer.execute(Some(&conn), &QueryRequest::new("GET", "/users")).await;
        assert!(explorer
            .resolver()
            .cache()
            .get("ai-suggestions:http://localhost:10014/wp-json/users")
            .is_some());
    }

    #[tokio::test]
    async fn test_financial_report() {
        let fetcher = Canned::ok(
            r#"[{"id":1,"total":"25.00","line_items":[{"product_id":9,"name":"Oil","quantity":2,"total":"25.00"}]}]"#,
        );
        let explorer = explorer(fetcher.clone());
        let input = FinancialReportInput {
            start_date: "2024-01-01".into(),
            end_date: "2024-01-31".into(),
            status: "completed,processing".into(),
        };

        let report = explorer.financial_report(&wordpress(), &input).await.unwrap();
        assert_eq!(report.total_orders, 1);
        assert_eq!(report.top_selling_products[0].name, "Oil");

        let seen = fetcher.seen.lock().unwrap();
        assert_eq!(
            seen[0].url,
            "http://localhost:10014/wp-json/orders?start_date=2024-01-01&end_date=2024-01-31&status=completed%2Cprocessing"
        );
        assert!(seen[0].header("Authorization").unwrap().starts_with("Basic "));
    }

    #[tokio::test]
    async fn test_financial_report_requires_wordpress() {
        let generic = NewConnection::new("api", "https://api.example.com").into_connection("g");
        let input = FinancialReportInput {
            start_date: "2024-01-01".into(),
            end_date: "2024-01-31".into(),
            status: "completed".into(),
        };
        let err = explorer(Canned::ok("[]")).financial_report(&generic, &input).await.unwrap_err();
        assert!(matches!(err, ExplorerError::Validation(_)));
    }

    #[tokio::test]
    async fn test_transport_error_hides_credentials() {
        let woo = NewConnection::new("shop", "https://shop.example/wp-json")
            .with_api_type(ApiType::WordPress)
            .with_auth(Auth::WooCommerce { consumer_key: "ck".into(), consumer_secret: "cs_SECRET".into() })
            .into_connection("woo");
        let explorer = Explorer::new(Arc::new(EchoUrlFailure), Arc::new(IdentitySuggester));

        let envelope = explorer.execute(Some(&woo), &QueryRequest::new("GET", "/orders")).await;
        let error = envelope.error.unwrap();
        assert!(!error.contains("cs_SECRET"), "{}", error);
        assert!(error.contains("https://shop.example/wp-json/orders"), "{}", error);

        let input = FinancialReportInput {
            start_date: "2024-01-01".into(),
            end_date: "2024-01-31".into(),
            status: "completed".into(),
        };
        let err = explorer.financial_report(&woo, &input).await.unwrap_err();
        assert!(!err.to_string().contains("cs_SECRET"));
    }
}
