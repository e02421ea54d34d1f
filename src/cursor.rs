use crate::error::DriverError;
use crate::types::SqlValue;

/// Forward-only view over the rows produced by a read.
///
/// Column indexes are zero-based. `value` reads from the row most recently reached by
/// `next_row`; drivers convert their native types (large objects, driver-specific numerics)
/// into [`SqlValue`] here so the result mapper never sees them.
pub trait RowCursor {
    fn column_count(&self) -> usize;

    /// # Errors
    /// Returns `DriverError` if `index` is out of range.
    fn column_label(&self, index: usize) -> Result<&str, DriverError>;

    /// Advance to the next row. Returns `false` once the cursor is exhausted.
    ///
    /// # Errors
    /// Returns `DriverError` if the driver fails while fetching.
    fn next_row(&mut self) -> Result<bool, DriverError>;

    /// # Errors
    /// Returns `DriverError` if there is no current row or `index` is out of range.
    fn value(&self, index: usize) -> Result<SqlValue, DriverError>;

    fn close(&mut self) {}
}

/// A cursor over rows that were already fetched into memory.
#[derive(Debug, Clone, Default)]
pub struct BufferedCursor {
    labels: Vec<String>,
    rows: std::collections::VecDeque<Vec<SqlValue>>,
    current: Option<Vec<SqlValue>>,
}

impl BufferedCursor {
    #[must_use]
    pub fn new(labels: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self {
            labels,
            rows: rows.into(),
            current: None,
        }
    }
}

impl RowCursor for BufferedCursor {
    fn column_count(&self) -> usize {
        self.labels.len()
    }

    fn column_label(&self, index: usize) -> Result<&str, DriverError> {
        self.labels
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| DriverError::message(format!("column index {index} out of range")))
    }

    fn next_row(&mut self) -> Result<bool, DriverError> {
        self.current = self.rows.pop_front();
        Ok(self.current.is_some())
    }

    fn value(&self, index: usize) -> Result<SqlValue, DriverError> {
        let row = self
            .current
            .as_ref()
            .ok_or_else(|| DriverError::message("cursor is not positioned on a row"))?;
        row.get(index)
            .cloned()
            .ok_or_else(|| DriverError::message(format!("column index {index} out of range")))
    }

    fn close(&mut self) {
        self.rows.clear();
        self.current = None;
    }
}
