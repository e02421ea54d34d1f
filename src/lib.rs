//! Synchronous statement execution gateway.
//!
//! An [`Executor`] borrows a [`DatabaseConnection`], renders [`Statement`]s into SQL for the
//! connection's dialect, runs them through an ordered visitor pipeline, dispatches them in
//! the matching execution shape, and translates driver failures into [`SqlGatewayError`].
//!
//! ```rust
//! use sql_gateway::prelude::*;
//!
//! # fn main() -> Result<(), SqlGatewayError> {
//! let mut conn = SqliteConnection::open_in_memory()?;
//! let mut executor = Executor::new(&mut conn);
//! let rows = executor.query(&Statement::raw("SELECT 1"), &[])?;
//! assert_eq!(rows.rows()[0].get("1"), Some(&SqlValue::Int(1)));
//! # Ok(()) }
//! ```

pub mod change;
pub mod connection;
pub mod cursor;
pub mod diagnostics;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod prelude;
pub mod render;
pub mod results;
pub mod statement;
pub mod translation;
pub mod types;
pub mod visitor;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use change::{Change, SqlChange};
pub use connection::{DatabaseConnection, OfflineConnection, PreparedHandle, StatementHandle};
pub use diagnostics::{Diagnostics, NoopDiagnostics, RecordingDiagnostics, TracingDiagnostics};
pub use dialect::{Dialect, DialectKind};
pub use error::{DriverError, ErrorKind, SqlGatewayError};
pub use executor::{Executor, ExecutorBuilder};
pub use results::{QueryResult, RowMapping, UpdateResult};
pub use statement::{PreparedSql, PreparedStatementFactory, Statement};
pub use types::SqlValue;
pub use visitor::SqlVisitor;

#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteConnection, SqliteOptions, SqliteOptionsBuilder};
