//! Command handlers - business logic for processing UI events

use crate::app::AppState;
use crate::export::{self, ExportFormat};
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::models::{ApiResponseEnvelope, KeyValue, NewConnection, QueryRequest};
use crate::reports::{FinancialReport, FinancialReportInput};
use crate::schema::{classify, Classification, ColumnModel, Direction};

impl AppState {
    // ========================
    // Connections
    // ========================

    pub fn list_connections(&mut self) {
        self.status = format!("{} connection(s)", self.store.list().len());
    }

    pub fn add_connection(&mut self, connection: NewConnection) {
        self.status = match self.store.add(connection) {
            Ok(conn) => format!("Connection '{}' saved and selected ({})", conn.name, conn.id),
            Err(e) => format!("Could not save connection: {}", e),
        };
    }

    pub fn use_connection(&mut self, id: String) {
        self.status = match self.store.set_active(Some(id)) {
            Ok(()) => match self.store.active() {
                Some(conn) => format!("Using '{}' ({})", conn.name, conn.base_url),
                None => String::from("No connection selected."),
            },
            Err(e) => e.to_string(),
        };
    }

    pub fn delete_connection(&mut self, id: String) {
        self.status = match self.store.delete(&id) {
            Ok(()) => String::from("Connection deleted."),
            Err(e) => format!("Could not delete connection: {}", e),
        };
    }

    // ========================
    // Query builder
    // ========================

    pub fn set_method(&mut self, method: String) {
        self.query.method = method.to_uppercase();
    }

    pub fn set_path(&mut self, path: String) {
        self.query.path = path;
    }

    pub fn add_param(&mut self, param: KeyValue) {
        self.query.params.push(param);
    }

    pub fn add_header(&mut self, header: KeyValue) {
        self.query.headers.push(header);
    }

    pub fn set_body(&mut self, body: String) {
        self.query.body = if body.is_empty() { None } else { Some(body) };
    }

    pub fn clear_query(&mut self) {
        self.query = QueryRequest::default();
    }

    // ========================
    // Request sending
    // ========================

    /// Tags a new execution with the next request id. Any earlier query
    /// still in flight becomes stale and its response will be dropped.
    /// Reports in flight are unaffected.
    pub fn prepare_query(&mut self) -> Option<NetworkCommand> {
        let id = self.next_id();
        self.pending_query_id = Some(id);
        self.envelope = None;
        self.classification = None;
        self.status = String::from("Running query...");

        Some(NetworkCommand::ExecuteQuery {
            id,
            connection: self.store.active(),
            request: self.query.clone(),
        })
    }

    pub fn prepare_report(&mut self, input: FinancialReportInput) -> Option<NetworkCommand> {
        let Some(connection) = self.store.active() else {
            self.status = String::from("No connection selected.");
            return None;
        };

        let id = self.next_id();
        self.pending_report_id = Some(id);
        self.report = None;
        self.status = String::from("Generating report...");

        Some(NetworkCommand::FinancialReport { id, connection, input })
    }

    /// Apply a network response if it belongs to the latest execution of its kind
    pub fn handle_response(&mut self, response: NetworkResponse) {
        let pending = match &response {
            NetworkResponse::Query { .. } => &mut self.pending_query_id,
            NetworkResponse::Report { .. } => &mut self.pending_report_id,
        };
        if *pending != Some(response.id()) {
            tracing::debug!(id = response.id(), pending = ?*pending, "Discarding stale response");
            return;
        }
        *pending = None;

        match response {
            NetworkResponse::Query { envelope, .. } => self.apply_envelope(envelope),
            NetworkResponse::Report { result, .. } => self.apply_report(result),
        }
    }

    fn apply_envelope(&mut self, envelope: ApiResponseEnvelope) {
        // Columns are replaced wholesale; nothing survives from the previous result
        self.columns = ColumnModel::default();
        self.classification = None;

        if let Some(error) = &envelope.error {
            self.status = error.clone();
            self.envelope = Some(envelope);
            return;
        }

        let classification = classify(&envelope.raw_data);
        self.status = match &classification {
            Classification::Discovery(schema) => format!("Discovered {} route(s)", schema.routes.len()),
            Classification::Tabular(rows) if !rows.is_empty() => {
                self.columns = ColumnModel::derive_from_rows(rows, &envelope.suggested_names);
                format!("{} row(s), {} column(s)", rows.len(), self.columns.len())
            }
            Classification::Scalar(_) => String::from("The response is not tabular."),
            _ => String::from("The query succeeded but returned no data."),
        };

        self.classification = Some(classification);
        self.envelope = Some(envelope);
    }

    fn apply_report(&mut self, result: Result<FinancialReport, String>) {
        match result {
            Ok(report) => {
                self.status = format!("Report over {} order(s)", report.total_orders);
                self.report = Some(report);
            }
            Err(e) => self.status = e,
        }
    }

    // ========================
    // Column manager
    // ========================

    pub fn show_columns(&mut self) {
        self.show_columns = !self.show_columns;
    }

    pub fn toggle_column(&mut self, key: &str) {
        if !self.columns.toggle_visibility(key) {
            self.status = format!("Unknown column: {}", key);
        }
    }

    pub fn set_column_visibility(&mut self, key: &str, visible: bool) {
        if !self.columns.set_visible(key, visible) {
            self.status = format!("Unknown column: {}", key);
        }
    }

    pub fn rename_column(&mut self, key: &str, name: String) {
        if !self.columns.rename(key, name) {
            self.status = format!("Unknown column: {}", key);
        }
    }

    pub fn move_column(&mut self, key: &str, direction: Direction) {
        if self.columns.get(key).is_none() {
            self.status = format!("Unknown column: {}", key);
        } else {
            self.columns.reorder(key, direction);
        }
    }

    // ========================
    // Export
    // ========================

    pub fn export(&mut self, format: &str) {
        let columns = self.columns.visible();
        let rows = match self.classification.as_ref().and_then(|c| c.rows()) {
            Some(rows) if !rows.is_empty() && !columns.is_empty() => rows,
            _ => {
                self.status = String::from("No data to export.");
                return;
            }
        };

        let result = format
            .parse::<ExportFormat>()
            .and_then(|format| export::serialize(&export::project(rows, &columns), &columns, format));

        self.status = match result {
            Ok(file) => match self.export_sink.deliver(&file) {
                Ok(path) => format!("Export complete: {}", path.display()),
                Err(e) => format!("Export failed: {}", e),
            },
            Err(e) => format!("Export failed: {}", e),
        };
    }

    // ========================
    // Help popup
    // ========================

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }
}
