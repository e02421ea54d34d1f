use rusqlite::types::{Value, ValueRef};

use crate::cursor::BufferedCursor;
use crate::types::SqlValue;

/// Convert a gateway value into a rusqlite `Value` for binding.
#[must_use]
pub fn to_sqlite_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Int(i) => Value::Integer(*i),
        SqlValue::Float(f) => Value::Real(*f),
        SqlValue::Text(s) => Value::Text(s.clone()),
        SqlValue::Bool(b) => Value::Integer(i64::from(*b)),
        SqlValue::Timestamp(dt) => Value::Text(dt.format("%F %T%.f").to_string()),
        SqlValue::Null => Value::Null,
        SqlValue::Json(json) => Value::Text(json.to_string()),
        SqlValue::Blob(bytes) => Value::Blob(bytes.clone()),
    }
}

/// Extract a gateway value from a `SQLite` row.
///
/// # Errors
/// Returns `rusqlite::Error` if the column index is invalid.
pub fn from_sqlite_row(row: &rusqlite::Row<'_>, idx: usize) -> Result<SqlValue, rusqlite::Error> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(i) => SqlValue::Int(i),
        ValueRef::Real(f) => SqlValue::Float(f),
        ValueRef::Text(bytes) => SqlValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(b) => SqlValue::Blob(b.to_vec()),
    })
}

/// Run a prepared statement as a read and copy every row into memory.
///
/// rusqlite rows borrow their statement, so reads are materialized before the cursor is
/// handed out.
///
/// # Errors
/// Returns `rusqlite::Error` if execution or extraction fails.
pub fn buffer_rows<P: rusqlite::Params>(
    stmt: &mut rusqlite::Statement<'_>,
    params: P,
) -> Result<BufferedCursor, rusqlite::Error> {
    let labels: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    let width = labels.len();

    let mut rows_iter = stmt.query(params)?;
    let mut rows = Vec::new();
    while let Some(row) = rows_iter.next()? {
        let mut values = Vec::with_capacity(width);
        for idx in 0..width {
            values.push(from_sqlite_row(row, idx)?);
        }
        rows.push(values);
    }

    Ok(BufferedCursor::new(labels, rows))
}
