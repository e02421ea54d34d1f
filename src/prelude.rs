//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::change::{Change, SqlChange};
pub use crate::connection::{
    DatabaseConnection, OfflineConnection, PLACEHOLDER, PreparedHandle, Resource, StatementHandle,
};
pub use crate::cursor::{BufferedCursor, RowCursor};
pub use crate::diagnostics::{
    Diagnostics, NoopDiagnostics, RecordingDiagnostics, TracingDiagnostics,
};
pub use crate::dialect::{Dialect, DialectKind};
pub use crate::error::{DriverError, ErrorKind, SqlGatewayError};
pub use crate::executor::{Executor, ExecutorBuilder};
pub use crate::render::{render, render_single};
pub use crate::results::{QueryResult, RowMapping, UpdateResult, map_row, map_rows};
pub use crate::statement::{PreparedSql, PreparedStatementFactory, Statement};
pub use crate::translation::{PlaceholderStyle, SplitOptions, split_statements, translate_placeholders};
pub use crate::types::SqlValue;
pub use crate::visitor::{
    AppendSql, ForDialects, PrependSql, RegexReplaceSql, ReplaceSql, SqlVisitor,
    TranslatePlaceholders,
};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::{SqliteConnection, SqliteOptions, SqliteOptionsBuilder};
