use std::collections::HashMap;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::types::SqlValue;

/// One result row: uppercase column labels mapped to values.
///
/// Labels keep the order the columns were declared in. Labels are unique; see
/// [`RowLayout`](crate::results::RowLayout) for how duplicates collapse.
#[derive(Debug, Clone, PartialEq)]
pub struct RowMapping {
    columns: Arc<Vec<String>>,
    values: Vec<SqlValue>,
    // shared by every row of one result
    index: Arc<HashMap<String, usize>>,
}

impl RowMapping {
    pub(crate) fn new(
        columns: Arc<Vec<String>>,
        values: Vec<SqlValue>,
        index: Arc<HashMap<String, usize>>,
    ) -> Self {
        Self {
            columns,
            values,
            index,
        }
    }

    /// Build a standalone row from label/value pairs. Labels are uppercased; a repeated
    /// label overwrites the earlier value.
    #[must_use]
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, SqlValue)>,
        K: AsRef<str>,
    {
        let mut columns = Vec::new();
        let mut values = Vec::new();
        let mut index = HashMap::new();
        for (label, value) in pairs {
            let key = label.as_ref().to_uppercase();
            if let Some(&slot) = index.get(&key) {
                values[slot] = value;
            } else {
                index.insert(key.clone(), columns.len());
                columns.push(key);
                values.push(value);
            }
        }
        Self::new(Arc::new(columns), values, Arc::new(index))
    }

    /// Column labels in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Look up a value by label. Exact match first, then the uppercased label.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&SqlValue> {
        let slot = match self.index.get(label) {
            Some(slot) => Some(*slot),
            None => self.index.get(&label.to_uppercase()).copied(),
        };
        slot.and_then(|idx| self.values.get(idx))
    }

    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(label, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

impl Serialize for RowMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (label, value) in self.iter() {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}
