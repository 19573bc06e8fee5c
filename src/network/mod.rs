//! Network layer - query execution against the configured APIs
//!
//! The Network actor receives commands and sends back responses.

pub mod actor;
pub mod client;

pub use actor::NetworkActor;
pub use client::{create_client, FetchRequest, FetchResponse, HttpFetcher, ReqwestFetcher};
