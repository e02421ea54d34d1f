use crate::dialect::DialectKind;
use crate::error::DriverError;

use super::{DatabaseConnection, PreparedHandle, StatementHandle};

/// An inert connection that only knows which dialect it stands in for.
///
/// Every execution attempted through an [`Executor`](crate::executor::Executor) fails fast
/// with `ConnectionUnavailable`; acquiring a handle directly fails with
/// [`DriverError::Offline`].
#[derive(Debug, Clone)]
pub struct OfflineConnection {
    url: String,
}

impl OfflineConnection {
    /// Build an offline connection for `dialect`, addressed as `offline:<dialect>`.
    #[must_use]
    pub fn new(dialect: DialectKind) -> Self {
        Self {
            url: format!("offline:{}", dialect.name()),
        }
    }

    /// Build from a full `offline:<dialect>[?params]` URL, kept verbatim as the address.
    #[must_use]
    pub fn from_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    #[must_use]
    pub fn dialect(&self) -> DialectKind {
        DialectKind::from_url(&self.url)
    }
}

impl DatabaseConnection for OfflineConnection {
    fn url(&self) -> &str {
        &self.url
    }

    fn is_offline(&self) -> bool {
        true
    }

    fn create_statement(&mut self) -> Result<Box<dyn StatementHandle + '_>, DriverError> {
        Err(DriverError::Offline(self.url.clone()))
    }

    fn prepare_statement(
        &mut self,
        _sql: &str,
    ) -> Result<Box<dyn PreparedHandle + '_>, DriverError> {
        Err(DriverError::Offline(self.url.clone()))
    }

    fn prepare_call(&mut self, _sql: &str) -> Result<Box<dyn PreparedHandle + '_>, DriverError> {
        Err(DriverError::Offline(self.url.clone()))
    }
}
