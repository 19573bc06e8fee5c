//! Network messages - communication between App and Network layers

use crate::models::{ApiResponseEnvelope, Connection, QueryRequest};
use crate::reports::{FinancialReport, FinancialReportInput};

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    /// Execute a query builder request
    ExecuteQuery {
        id: u64,
        connection: Option<Connection>,
        request: QueryRequest,
    },
    /// Fetch orders and compute the financial report
    FinancialReport {
        id: u64,
        connection: Connection,
        input: FinancialReportInput,
    },
    /// Shutdown the network actor
    Shutdown,
}

/// Responses sent from Network layer to App layer
#[derive(Debug, Clone)]
pub enum NetworkResponse {
    Query {
        id: u64,
        envelope: ApiResponseEnvelope,
    },
    Report {
        id: u64,
        result: Result<FinancialReport, String>,
    },
}

impl NetworkResponse {
    /// Get the request ID from the response
    pub fn id(&self) -> u64 {
        match self {
            NetworkResponse::Query { id, .. } => *id,
            NetworkResponse::Report { id, .. } => *id,
        }
    }
}
