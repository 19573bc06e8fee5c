//! # API Insights
//!
//! An interactive explorer for JSON REST APIs.
//!
//! ## Features
//! - Saved connections with Basic, Bearer, API-key and WooCommerce auth
//! - Query builder: method, path, params, headers, JSON body
//! - Response classification (discovery, tabular, scalar, empty)
//! - Friendly column names from a pluggable suggester, cached per endpoint
//! - Column curation: hide, rename, reorder
//! - JSON and CSV export of the curated view
//! - WooCommerce financial report
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (line REPL)
//! - App Layer (State machine)
//! - Network Layer (Tokio runtime)

pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod explorer;
pub mod export;
pub mod messages;
pub mod models;
pub mod naming;
pub mod network;
pub mod reports;
pub mod schema;
pub mod storage;

// Re-export commonly used types
pub use app::{AppActor, AppState};
pub use config::Settings;
pub use error::{ExplorerError, Result};
pub use explorer::Explorer;
pub use export::{DirectorySink, ExportFile, ExportFormat, ExportSink};
pub use messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
pub use models::{ApiResponseEnvelope, ApiType, Auth, Connection, HttpMethod, KeyValue, NewConnection, QueryRequest};
pub use naming::{NameResolver, NameSuggester};
pub use network::{HttpFetcher, NetworkActor, ReqwestFetcher};
pub use schema::{classify, Classification, Column, ColumnModel};
pub use storage::{ConnectionStore, FileConnectionStore, MemoryConnectionStore};
