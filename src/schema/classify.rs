//! Response classifier - decides what shape a decoded payload has
//!
//! Real-world REST responses are inconsistent about envelopes, so every payload
//! goes through [`classify`] and downstream code only ever sees a clean row
//! sequence, a route listing, or an explicit "nothing to show".

use std::collections::HashSet;

use serde_json::{Map, Value};

/// A JSON object used as one table row
pub type Row = Map<String, Value>;

/// One route of a discovery document
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscoveredRoute {
    pub path: String,
    pub methods: Vec<String>,
}

/// Route listing returned by discovery endpoints (e.g. `/wp-json`)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiscoverySchema {
    pub namespace: Option<String>,
    pub routes: Vec<DiscoveredRoute>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Classification {
    Empty,
    Discovery(DiscoverySchema),
    /// A value with no columns (primitive, or array without objects)
    Scalar(Value),
    Tabular(Vec<Row>),
}

impl Classification {
    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            Classification::Tabular(rows) => Some(rows),
            _ => None,
        }
    }
}

/// Classifies a decoded payload. Rules are checked in order:
/// discovery, empty, `data` unwrap, array, single-object fallback.
pub fn classify(raw: &Value) -> Classification {
    match raw {
        Value::Object(obj) => {
            if let Some(Value::Object(routes)) = obj.get("routes") {
                return Classification::Discovery(parse_discovery(obj, routes));
            }
            if obj.is_empty() {
                return Classification::Empty;
            }
            if let Some(Value::Array(items)) = obj.get("data") {
                return Classification::Tabular(object_rows(items));
            }
            Classification::Tabular(vec![obj.clone()])
        }
        Value::Array(items) => {
            if items.is_empty() {
                return Classification::Empty;
            }
            let rows = object_rows(items);
            if rows.is_empty() {
                Classification::Scalar(raw.clone())
            } else {
                Classification::Tabular(rows)
            }
        }
        other => Classification::Scalar(other.clone()),
    }
}

fn object_rows(items: &[Value]) -> Vec<Row> {
    items
        .iter()
        .filter_map(|item| item.as_object().cloned())
        .collect()
}

fn parse_discovery(doc: &Row, routes: &Row) -> DiscoverySchema {
    let routes = routes
        .iter()
        .map(|(path, route)| {
            let methods = route
                .get("methods")
                .and_then(|m| m.as_array())
                .map(|methods| {
                    methods
                        .iter()
                        .filter_map(|m| m.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default();
            DiscoveredRoute {
                path: path.clone(),
                methods,
            }
        })
        .collect();

    DiscoverySchema {
        namespace: doc
            .get("namespace")
            .and_then(|n| n.as_str())
            .map(str::to_string),
        routes,
    }
}

/// Union of row keys in first-seen order
pub fn key_union(rows: &[Row]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut keys: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if seen.insert(key.as_str()) {
                keys.push(key.clone());
            }
        }
    }
    keys
}
