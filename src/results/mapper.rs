use std::collections::HashMap;
use std::sync::Arc;

use crate::cursor::RowCursor;
use crate::error::DriverError;
use crate::types::SqlValue;

use super::result_set::QueryResult;
use super::row::RowMapping;

/// Column layout of a cursor, computed once and shared by every row it maps.
///
/// Labels are uppercased. When two columns collapse onto the same label the key keeps the
/// position of its first occurrence and the value of the last one.
#[derive(Debug, Clone)]
pub struct RowLayout {
    columns: Arc<Vec<String>>,
    index: Arc<HashMap<String, usize>>,
    // cursor column -> slot in `columns`
    slots: Vec<usize>,
}

impl RowLayout {
    /// # Errors
    /// Returns `DriverError` if a column label cannot be read.
    pub fn from_cursor(cursor: &dyn RowCursor) -> Result<Self, DriverError> {
        let mut columns = Vec::with_capacity(cursor.column_count());
        let mut index = HashMap::with_capacity(cursor.column_count());
        let mut slots = Vec::with_capacity(cursor.column_count());

        for position in 0..cursor.column_count() {
            let label = cursor.column_label(position)?.to_uppercase();
            let slot = *index.entry(label.clone()).or_insert_with(|| {
                columns.push(label);
                columns.len() - 1
            });
            slots.push(slot);
        }

        Ok(Self {
            columns: Arc::new(columns),
            index: Arc::new(index),
            slots,
        })
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Map the cursor's current row.
    ///
    /// # Errors
    /// Returns `DriverError` if a value cannot be extracted.
    pub fn map_row(&self, cursor: &dyn RowCursor) -> Result<RowMapping, DriverError> {
        let mut values = vec![SqlValue::Null; self.columns.len()];
        for (position, slot) in self.slots.iter().enumerate() {
            values[*slot] = cursor.value(position)?;
        }
        Ok(RowMapping::new(
            Arc::clone(&self.columns),
            values,
            Arc::clone(&self.index),
        ))
    }
}

/// Map the cursor's current row into a [`RowMapping`].
///
/// # Errors
/// Returns `DriverError` if a label or value cannot be read.
pub fn map_row(cursor: &dyn RowCursor) -> Result<RowMapping, DriverError> {
    RowLayout::from_cursor(cursor)?.map_row(cursor)
}

/// Drain the cursor eagerly into a [`QueryResult`].
///
/// # Errors
/// Returns `DriverError` if fetching or extraction fails; rows mapped so far are dropped.
pub fn map_rows(cursor: &mut dyn RowCursor) -> Result<QueryResult, DriverError> {
    let layout = RowLayout::from_cursor(cursor)?;
    let mut rows = Vec::new();
    while cursor.next_row()? {
        rows.push(layout.map_row(cursor)?);
    }
    Ok(QueryResult::new(rows))
}
