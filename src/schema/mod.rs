//! Schema inference - response classification and the column model

pub mod classify;
pub mod columns;

pub use classify::{classify, key_union, Classification, DiscoveredRoute, DiscoverySchema, Row};
pub use columns::{Column, ColumnModel, Direction};
