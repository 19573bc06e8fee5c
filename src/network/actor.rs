//! Network actor - runs queries and reports in the Tokio async runtime

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::explorer::Explorer;
use crate::messages::{NetworkCommand, NetworkResponse};

/// Network actor that processes query and report commands
pub struct NetworkActor {
    explorer: Arc<Explorer>,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<()>,
}

impl NetworkActor {
    pub fn new(explorer: Arc<Explorer>, response_tx: mpsc::UnboundedSender<NetworkResponse>) -> Self {
        NetworkActor {
            explorer,
            response_tx,
            active_requests: JoinSet::new(),
        }
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::ExecuteQuery { id, connection, request }) => {
                            let response_tx = self.response_tx.clone();
                            let explorer = Arc::clone(&self.explorer);

                            // Stale executions are not cancelled; the app drops their responses
                            self.active_requests.spawn(async move {
                                tracing::info!(id, method = %request.method, path = %request.path, "Executing query");
                                let envelope = explorer.execute(connection.as_ref(), &request).await;
                                tracing::info!(id, failed = envelope.is_error(), "Query completed");
                                let _ = response_tx.send(NetworkResponse::Query { id, envelope });
                            });
                        }

                        Some(NetworkCommand::FinancialReport { id, connection, input }) => {
                            let response_tx = self.response_tx.clone();
                            let explorer = Arc::clone(&self.explorer);

                            self.active_requests.spawn(async move {
                                tracing::info!(id, connection = %connection.name, "Generating financial report");
                                let result = explorer
                                    .financial_report(&connection, &input)
                                    .await
                                    .map_err(|e| e.to_string());
                                if let Err(e) = &result {
                                    tracing::warn!(id, error = %e, "Financial report failed");
                                }
                                let _ = response_tx.send(NetworkResponse::Report { id, result });
                            });
                        }

                        Some(NetworkCommand::Shutdown) => {
                            self.active_requests.abort_all();
                            break;
                        }

                        None => break,
                    }
                }

                // Clean up completed tasks
                Some(_result) = self.active_requests.join_next() => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::models::QueryRequest;
    use crate::naming::IdentitySuggester;
    use crate::network::{FetchRequest, FetchResponse, HttpFetcher};
    use async_trait::async_trait;

    struct Fixed;

    #[async_trait]
    impl HttpFetcher for Fixed {
        async fn fetch(&self, _request: FetchRequest) -> Result<FetchResponse> {
            Ok(FetchResponse {
                status: 200,
                status_text: "OK".to_string(),
                body: r#"[{"id": 1}]"#.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_query_response_carries_id() {
        let explorer = Arc::new(Explorer::new(Arc::new(Fixed), Arc::new(IdentitySuggester)));
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (resp_tx, mut resp_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(NetworkActor::new(explorer, resp_tx).run(cmd_rx));

        let request = QueryRequest::new("GET", "https://api.example.com/items");
        cmd_tx
            .send(NetworkCommand::ExecuteQuery { id: 7, connection: None, request })
            .unwrap();

        let response = resp_rx.recv().await.unwrap();
        assert_eq!(response.id(), 7);
        match response {
            NetworkResponse::Query { envelope, .. } => {
                assert!(!envelope.is_error());
                assert_eq!(envelope.suggested_names.get("id").map(String::as_str), Some("id"));
            }
            other => panic!("unexpected response {:?}", other),
        }

        cmd_tx.send(NetworkCommand::Shutdown).unwrap();
        handle.await.unwrap();
    }
}
