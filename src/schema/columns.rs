//! Column model - user-curated view over inferred fields

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::schema::classify::{key_union, Row};

/// One table column
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Raw JSON property name
    pub key: String,
    pub friendly_name: String,
    pub visible: bool,
    pub order: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            _ => Err(format!("Unknown direction: {}", s)),
        }
    }
}

/// Ordered set of columns for the active result
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnModel {
    columns: Vec<Column>,
}

impl ColumnModel {
    /// Derives columns from the key union of `rows`, labelled with
    /// `friendly_names` where present and the raw key otherwise.
    pub fn derive_from_rows(rows: &[Row], friendly_names: &BTreeMap<String, String>) -> Self {
        let columns = key_union(rows)
            .into_iter()
            .enumerate()
            .map(|(order, key)| Column {
                friendly_name: friendly_names.get(&key).cloned().unwrap_or_else(|| key.clone()),
                key,
                visible: true,
                order,
            })
            .collect();
        ColumnModel { columns }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn get(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Columns by `order`, ties kept in insertion sequence
    pub fn sorted(&self) -> Vec<Column> {
        let mut sorted = self.columns.clone();
        sorted.sort_by_key(|c| c.order);
        sorted
    }

    pub fn visible(&self) -> Vec<Column> {
        self.sorted().into_iter().filter(|c| c.visible).collect()
    }

    /// Returns false when no column has `key`
    pub fn toggle_visibility(&mut self, key: &str) -> bool {
        match self.columns.iter_mut().find(|c| c.key == key) {
            Some(column) => {
                column.visible = !column.visible;
                true
            }
            None => false,
        }
    }

    /// Sets visibility explicitly; unlike toggling, repeating it is a no-op
    pub fn set_visible(&mut self, key: &str, visible: bool) -> bool {
        match self.columns.iter_mut().find(|c| c.key == key) {
            Some(column) => {
                column.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn rename(&mut self, key: &str, new_name: impl Into<String>) -> bool {
        match self.columns.iter_mut().find(|c| c.key == key) {
            Some(column) => {
                column.friendly_name = new_name.into();
                true
            }
            None => false,
        }
    }

    /// Swaps `key` with its neighbour in `direction`. Returns false at the
    /// boundaries or for an unknown key, leaving the order untouched.
    pub fn reorder(&mut self, key: &str, direction: Direction) -> bool {
        let mut sorted = self.sorted();
        let Some(index) = sorted.iter().position(|c| c.key == key) else {
            return false;
        };
        let swap_index = match direction {
            Direction::Up => match index.checked_sub(1) {
                Some(i) => i,
                None => return false,
            },
            Direction::Down if index + 1 < sorted.len() => index + 1,
            Direction::Down => return false,
        };

        sorted.swap(index, swap_index);
        for (order, column) in sorted.iter_mut().enumerate() {
            column.order = order;
        }
        self.columns = sorted;
        true
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::Value;

    fn arb_rows() -> impl Strategy<Value = Vec<Row>> {
        prop::collection::vec(
            prop::collection::btree_map("[a-f]{1,2}", any::<i64>(), 0..6),
            0..6,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .map(|row| row.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
                .collect()
        })
    }

    proptest! {
        #[test]
        fn derive_without_names_is_identity(rows in arb_rows()) {
            let model = ColumnModel::derive_from_rows(&rows, &BTreeMap::new());
            let sorted = model.sorted();

            let keys: Vec<String> = sorted.iter().map(|c| c.key.clone()).collect();
            prop_assert_eq!(keys, key_union(&rows));
            for (i, column) in sorted.iter().enumerate() {
                prop_assert_eq!(&column.friendly_name, &column.key);
                prop_assert_eq!(column.order, i);
                prop_assert!(column.visible);
            }
        }

        #[test]
        fn reorder_at_boundaries_is_noop(rows in arb_rows()) {
            let mut model = ColumnModel::derive_from_rows(&rows, &BTreeMap::new());
            let before = model.sorted();

            if let (Some(first), Some(last)) = (before.first(), before.last()) {
                prop_assert!(!model.reorder(&first.key, Direction::Up));
                prop_assert!(!model.reorder(&last.key, Direction::Down));
            }
            prop_assert_eq!(model.sorted(), before);
        }

        #[test]
        fn show_and_hide_are_idempotent(rows in arb_rows(), visible in any::<bool>()) {
            let mut model = ColumnModel::derive_from_rows(&rows, &BTreeMap::new());
            let keys = key_union(&rows);
            for key in &keys {
                model.set_visible(key, visible);
                model.set_visible(key, visible);
            }
            prop_assert!(model.sorted().iter().all(|c| c.visible == visible));
        }
    }
}
