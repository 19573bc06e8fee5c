//! App state - pure data structure with no network I/O

use serde_json::Value;

use crate::export::ExportSink;
use crate::messages::{RenderState, ResultView};
use crate::models::{ApiResponseEnvelope, QueryRequest};
use crate::reports::FinancialReport;
use crate::schema::{Classification, ColumnModel};
use crate::storage::ConnectionStore;

/// Main application state - pure data, no network I/O
pub struct AppState {
    // Connections (persisted by the store)
    pub store: Box<dyn ConnectionStore>,

    // Query builder
    pub query: QueryRequest,

    // Results of the latest applied execution
    pub envelope: Option<ApiResponseEnvelope>,
    pub classification: Option<Classification>,
    pub columns: ColumnModel,
    pub report: Option<FinancialReport>,

    // Request tracking; queries and reports are tracked independently
    pub next_request_id: u64,
    pub pending_query_id: Option<u64>,
    pub pending_report_id: Option<u64>,

    // Export destination
    pub export_sink: Box<dyn ExportSink>,

    // UI state
    pub status: String,
    pub show_columns: bool,
    pub show_help: bool,
}

impl AppState {
    pub fn new(store: Box<dyn ConnectionStore>, export_sink: Box<dyn ExportSink>) -> Self {
        AppState {
            store,
            query: QueryRequest::default(),
            envelope: None,
            classification: None,
            columns: ColumnModel::default(),
            report: None,
            next_request_id: 1,
            pending_query_id: None,
            pending_report_id: None,
            export_sink,
            status: String::from("Type 'help' for commands."),
            show_columns: false,
            show_help: false,
        }
    }

    /// Generate a unique request ID
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    pub fn is_query_loading(&self) -> bool {
        self.pending_query_id.is_some()
    }

    pub fn is_report_loading(&self) -> bool {
        self.pending_report_id.is_some()
    }

    fn result_view(&self) -> ResultView {
        if self.is_query_loading() {
            return ResultView::Loading;
        }
        let Some(envelope) = &self.envelope else {
            return ResultView::Initial;
        };
        if let Some(error) = &envelope.error {
            return ResultView::Error(error.clone());
        }

        match &self.classification {
            None | Some(Classification::Empty) => ResultView::NoData,
            Some(Classification::Discovery(schema)) => ResultView::Discovery(schema.clone()),
            Some(Classification::Scalar(value)) => {
                ResultView::Scalar(serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()))
            }
            Some(Classification::Tabular(rows)) if rows.is_empty() => ResultView::NoData,
            Some(Classification::Tabular(rows)) => {
                let columns = self.columns.visible();
                let rows = rows
                    .iter()
                    .map(|row| columns.iter().map(|c| cell_text(row.get(&c.key))).collect())
                    .collect();
                ResultView::Table { columns, rows }
            }
        }
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        RenderState {
            connections: self.store.list(),
            active_connection_id: self.store.active().map(|c| c.id),
            query: self.query.clone(),
            is_loading: self.is_query_loading(),
            is_report_loading: self.is_report_loading(),
            result: self.result_view(),
            all_columns: self.columns.sorted(),
            show_columns: self.show_columns,
            report: self.report.clone(),
            status: self.status.clone(),
            show_help: self.show_help,
        }
    }
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
