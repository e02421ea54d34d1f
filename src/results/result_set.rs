use serde::Serialize;

use crate::error::SqlGatewayError;
use crate::types::SqlValue;

use super::row::RowMapping;

/// Rows returned by a query, in cursor order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QueryResult {
    rows: Vec<RowMapping>,
}

impl QueryResult {
    #[must_use]
    pub fn new(rows: Vec<RowMapping>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[RowMapping] {
        &self.rows
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<RowMapping> {
        self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RowMapping> {
        self.rows.iter()
    }

    /// The only value of a one-row, one-column result.
    ///
    /// # Errors
    /// Returns `SqlGatewayError::UnexpectedResult` for any other shape.
    pub fn single_value(&self) -> Result<&SqlValue, SqlGatewayError> {
        let [row] = self.rows.as_slice() else {
            return Err(SqlGatewayError::UnexpectedResult(format!(
                "expected exactly one row, got {}",
                self.rows.len()
            )));
        };
        match row.values() {
            [value] => Ok(value),
            values => Err(SqlGatewayError::UnexpectedResult(format!(
                "expected exactly one column, got {}",
                values.len()
            ))),
        }
    }

    /// Every row's value for `label`, skipping rows without that column.
    #[must_use]
    pub fn column(&self, label: &str) -> Vec<&SqlValue> {
        self.rows.iter().filter_map(|row| row.get(label)).collect()
    }

    /// # Errors
    /// Returns `SqlGatewayError::UnexpectedResult` if serialization fails.
    pub fn to_json(&self) -> Result<String, SqlGatewayError> {
        serde_json::to_string(self).map_err(|e| SqlGatewayError::UnexpectedResult(e.to_string()))
    }
}

impl IntoIterator for QueryResult {
    type Item = RowMapping;
    type IntoIter = std::vec::IntoIter<RowMapping>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a QueryResult {
    type Item = &'a RowMapping;
    type IntoIter = std::slice::Iter<'a, RowMapping>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Number of rows affected by a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateResult {
    rows_affected: u64,
}

impl UpdateResult {
    #[must_use]
    pub fn new(rows_affected: u64) -> Self {
        Self { rows_affected }
    }

    #[must_use]
    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }
}
