use crate::connection::{DatabaseConnection, PLACEHOLDER, PreparedHandle, Resource};
use crate::cursor::RowCursor;
use crate::diagnostics::Diagnostics;
use crate::error::DriverError;
use crate::results::{QueryResult, map_rows};
use crate::statement::{Statement, bind_all};
use crate::types::SqlValue;

/// An acquired handle that is released exactly once, on every exit path.
struct Scoped<H: Resource + ?Sized> {
    handle: Box<H>,
    released: bool,
}

impl<H: Resource + ?Sized> Scoped<H> {
    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.handle.close();
        }
    }
}

impl<H: Resource + ?Sized> Drop for Scoped<H> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Run `work` against `handle`, then release it before handing back the outcome.
///
/// The release also happens if `work` panics.
pub(crate) fn scoped<H, R, F>(handle: Box<H>, work: F) -> Result<R, DriverError>
where
    H: Resource + ?Sized,
    F: FnOnce(&mut H) -> Result<R, DriverError>,
{
    let mut guard = Scoped {
        handle,
        released: false,
    };
    let outcome = work(&mut *guard.handle);
    guard.release();
    outcome
}

/// How a single-statement read or write reaches the driver.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Strategy<'s> {
    Plain,
    Prepared(&'s [SqlValue]),
    Callable,
}

impl<'s> Strategy<'s> {
    /// Pick the execution shape for a concrete statement.
    pub(crate) fn for_statement(statement: &'s Statement) -> Self {
        match statement {
            Statement::Prepared(prepared) => Strategy::Prepared(prepared.params()),
            Statement::Callable(_) => Strategy::Callable,
            Statement::Raw(_) | Statement::Change(_) => Strategy::Plain,
        }
    }

    pub(crate) fn query(
        self,
        connection: &mut dyn DatabaseConnection,
        sql: &str,
    ) -> Result<QueryResult, DriverError> {
        match self {
            Strategy::Plain => scoped(connection.create_statement()?, |handle| {
                drain(handle.execute_query(sql)?.as_mut())
            }),
            Strategy::Prepared(params) => scoped(connection.prepare_statement(sql)?, |handle| {
                bind_all(handle, params)?;
                drain(handle.execute_query()?.as_mut())
            }),
            Strategy::Callable => scoped(connection.prepare_call(sql)?, |handle| {
                drain(handle.execute_query()?.as_mut())
            }),
        }
    }

    pub(crate) fn update(
        self,
        connection: &mut dyn DatabaseConnection,
        sql: &str,
    ) -> Result<u64, DriverError> {
        match self {
            Strategy::Plain => scoped(connection.create_statement()?, |handle| {
                handle.execute_update(sql)
            }),
            Strategy::Prepared(params) => scoped(connection.prepare_statement(sql)?, |handle| {
                bind_all(handle, params)?;
                handle.execute_update()
            }),
            Strategy::Callable => scoped(connection.prepare_call(sql)?, |handle| {
                handle.execute_update()
            }),
        }
    }
}

// Cursor is closed before the owning handle is released.
fn drain(cursor: &mut dyn RowCursor) -> Result<QueryResult, DriverError> {
    let outcome = map_rows(cursor);
    cursor.close();
    outcome
}

/// Run each string on one plain statement handle, stopping at the first failure.
pub(crate) fn execute_plain(
    connection: &mut dyn DatabaseConnection,
    sql: &[String],
    diagnostics: &dyn Diagnostics,
) -> Result<(), DriverError> {
    scoped(connection.create_statement()?, |handle| {
        for statement in sql {
            diagnostics.debug(&format!("executing statement: {statement}"));
            if statement.contains(PLACEHOLDER) {
                handle.set_escape_processing(false);
            }
            handle.execute(statement)?;
        }
        Ok(())
    })
}

/// Acquire a callable handle for `sql` and hand it to `action`.
pub(crate) fn call<R, F>(
    connection: &mut dyn DatabaseConnection,
    sql: &str,
    action: F,
) -> Result<R, DriverError>
where
    F: FnOnce(&mut dyn PreparedHandle) -> Result<R, DriverError>,
{
    scoped(connection.prepare_call(sql)?, |handle| action(handle))
}
