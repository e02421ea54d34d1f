use thiserror::Error;

/// Failure reported by a driver while acquiring or using an execution resource.
///
/// Callers of the [`Executor`](crate::executor::Executor) never see this type directly; it is
/// always wrapped as the source of [`SqlGatewayError::DriverFailure`].
#[derive(Debug, Error)]
pub enum DriverError {
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("connection {0} is offline")]
    Offline(String),

    #[error("Value conversion error: {0}")]
    Conversion(String),

    #[error("{0}")]
    Message(String),
}

impl DriverError {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        DriverError::Message(message.into())
    }
}

/// Discriminant of a [`SqlGatewayError`], for callers that match on the failure class only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MultiStatementNotAllowed,
    ConnectionUnavailable,
    UnsupportedOperation,
    DriverFailure,
    Configuration,
    UnexpectedResult,
}

#[derive(Debug, Error)]
pub enum SqlGatewayError {
    /// A single-statement operation was given a statement that rendered to `count` strings.
    #[error("{operation} requires a statement that renders to exactly one SQL string, got {count}")]
    MultiStatementNotAllowed {
        operation: &'static str,
        count: usize,
    },

    /// The borrowed connection is offline; nothing was acquired.
    #[error("Cannot execute commands against an offline database ({address})")]
    ConnectionUnavailable { address: String },

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Error executing SQL {sql} on {address}: {source}")]
    DriverFailure {
        sql: String,
        address: String,
        #[source]
        source: DriverError,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unexpected result: {0}")]
    UnexpectedResult(String),
}

impl SqlGatewayError {
    /// Wrap a driver failure with the SQL that was attempted and the target address.
    ///
    /// Multiple rendered strings are joined with `"; "`.
    pub fn driver_failure<S: AsRef<str>>(sql: &[S], address: &str, source: DriverError) -> Self {
        let sql = sql
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("; ");
        SqlGatewayError::DriverFailure {
            sql,
            address: address.to_string(),
            source,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            SqlGatewayError::MultiStatementNotAllowed { .. } => ErrorKind::MultiStatementNotAllowed,
            SqlGatewayError::ConnectionUnavailable { .. } => ErrorKind::ConnectionUnavailable,
            SqlGatewayError::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
            SqlGatewayError::DriverFailure { .. } => ErrorKind::DriverFailure,
            SqlGatewayError::Configuration(_) => ErrorKind::Configuration,
            SqlGatewayError::UnexpectedResult(_) => ErrorKind::UnexpectedResult,
        }
    }

    /// The SQL that was attempted, when the failure happened during execution.
    #[must_use]
    pub fn sql(&self) -> Option<&str> {
        match self {
            SqlGatewayError::DriverFailure { sql, .. } => Some(sql),
            _ => None,
        }
    }

    /// Address of the connection the failure relates to, if any.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        match self {
            SqlGatewayError::DriverFailure { address, .. }
            | SqlGatewayError::ConnectionUnavailable { address } => Some(address),
            _ => None,
        }
    }
}
