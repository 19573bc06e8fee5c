//! Render state - data structure sent from App layer to UI for rendering

use crate::models::{Connection, QueryRequest};
use crate::reports::FinancialReport;
use crate::schema::{Column, DiscoverySchema};

/// What the results area should show
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResultView {
    /// Nothing has been run yet
    #[default]
    Initial,
    Loading,
    /// An error replaces any data
    Error(String),
    NoData,
    Discovery(DiscoverySchema),
    /// Non-tabular value, pretty-printed
    Scalar(String),
    Table {
        /// Visible columns in display order
        columns: Vec<Column>,
        /// Cell text per row, aligned with `columns`
        rows: Vec<Vec<String>>,
    },
}

/// Complete state needed by the UI to render
#[derive(Debug, Clone, Default)]
pub struct RenderState {
    // Connections
    pub connections: Vec<Connection>,
    pub active_connection_id: Option<String>,

    // Query builder
    pub query: QueryRequest,
    pub is_loading: bool,
    pub is_report_loading: bool,

    // Results
    pub result: ResultView,
    /// Every column, including hidden ones, for the column manager
    pub all_columns: Vec<Column>,
    pub show_columns: bool,
    pub report: Option<FinancialReport>,

    // Status line
    pub status: String,

    // Popups
    pub show_help: bool,
}
