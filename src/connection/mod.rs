// Connection module - the seam between the gateway and a live driver
//
// - offline: an inert connection that refuses every acquisition
//
// The gateway never owns a connection. It borrows one for the duration of an executor and
// acquires short-lived handles from it, one call at a time.

pub mod offline;

pub use offline::OfflineConnection;

use crate::cursor::RowCursor;
use crate::error::DriverError;
use crate::types::SqlValue;

/// Placeholder character used for parameter markers in rendered SQL.
pub const PLACEHOLDER: char = '?';

/// Anything that must be released exactly once when a call is done with it.
pub trait Resource {
    /// Release driver-side state. Called exactly once per acquired handle.
    fn close(&mut self);
}

/// Plain statement handle: runs arbitrary SQL text, one string at a time.
pub trait StatementHandle: Resource {
    /// Toggle driver escape-sequence processing for subsequent executions.
    fn set_escape_processing(&mut self, enabled: bool);

    /// # Errors
    /// Returns `DriverError` if the driver rejects the statement.
    fn execute(&mut self, sql: &str) -> Result<(), DriverError>;

    /// # Errors
    /// Returns `DriverError` if the driver rejects the statement.
    fn execute_query(&mut self, sql: &str) -> Result<Box<dyn RowCursor + '_>, DriverError>;

    /// # Errors
    /// Returns `DriverError` if the driver rejects the statement.
    fn execute_update(&mut self, sql: &str) -> Result<u64, DriverError>;
}

/// Handle for a prepared or callable statement whose SQL was fixed at acquisition time.
pub trait PreparedHandle: Resource {
    /// Bind `value` to the zero-based parameter `position`.
    ///
    /// # Errors
    /// Returns `DriverError` if the value cannot be converted for the driver.
    fn bind(&mut self, position: usize, value: &SqlValue) -> Result<(), DriverError>;

    /// # Errors
    /// Returns `DriverError` if execution fails.
    fn execute(&mut self) -> Result<(), DriverError>;

    /// # Errors
    /// Returns `DriverError` if execution fails.
    fn execute_query(&mut self) -> Result<Box<dyn RowCursor + '_>, DriverError>;

    /// # Errors
    /// Returns `DriverError` if execution fails.
    fn execute_update(&mut self) -> Result<u64, DriverError>;
}

/// A live (or inert) database connection the gateway can borrow.
pub trait DatabaseConnection {
    /// Identifying address used in error messages and for dialect detection.
    fn url(&self) -> &str;

    /// Whether the connection is inert. Offline connections fail fast without any
    /// resource being acquired.
    fn is_offline(&self) -> bool {
        false
    }

    /// # Errors
    /// Returns `DriverError` if the driver cannot produce a statement handle.
    fn create_statement(&mut self) -> Result<Box<dyn StatementHandle + '_>, DriverError>;

    /// # Errors
    /// Returns `DriverError` if the SQL cannot be prepared.
    fn prepare_statement(&mut self, sql: &str)
    -> Result<Box<dyn PreparedHandle + '_>, DriverError>;

    /// # Errors
    /// Returns `DriverError` if the call cannot be prepared.
    fn prepare_call(&mut self, sql: &str) -> Result<Box<dyn PreparedHandle + '_>, DriverError>;
}
