use std::fmt;

use regex::Regex;

use crate::dialect::Dialect;
use crate::error::SqlGatewayError;
use crate::translation::{PlaceholderStyle, translate_placeholders};

/// One step of the visitor pipeline: a pure rewrite of rendered SQL text.
///
/// Visitors run in list order and each sees only the previous visitor's output.
pub trait SqlVisitor: fmt::Debug + Send + Sync {
    fn modify_sql(&self, sql: &str) -> String;

    /// Whether this visitor runs for `dialect`. Defaults to every dialect.
    fn applies_to(&self, _dialect: &dyn Dialect) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendSql {
    text: String,
}

impl AppendSql {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl SqlVisitor for AppendSql {
    fn modify_sql(&self, sql: &str) -> String {
        format!("{sql}{}", self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrependSql {
    text: String,
}

impl PrependSql {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl SqlVisitor for PrependSql {
    fn modify_sql(&self, sql: &str) -> String {
        format!("{}{sql}", self.text)
    }
}

/// Literal find-and-replace of every occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceSql {
    find: String,
    replace: String,
}

impl ReplaceSql {
    #[must_use]
    pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            replace: replace.into(),
        }
    }
}

impl SqlVisitor for ReplaceSql {
    fn modify_sql(&self, sql: &str) -> String {
        if self.find.is_empty() {
            return sql.to_string();
        }
        sql.replace(&self.find, &self.replace)
    }
}

/// Regex find-and-replace of every match; `$1`-style group references are expanded.
#[derive(Debug, Clone)]
pub struct RegexReplaceSql {
    pattern: Regex,
    replace: String,
}

impl RegexReplaceSql {
    /// # Errors
    /// Returns `SqlGatewayError::Configuration` if `pattern` is not a valid regex.
    pub fn new(pattern: &str, replace: impl Into<String>) -> Result<Self, SqlGatewayError> {
        let pattern = Regex::new(pattern).map_err(|e| {
            SqlGatewayError::Configuration(format!("invalid visitor pattern {pattern:?}: {e}"))
        })?;
        Ok(Self {
            pattern,
            replace: replace.into(),
        })
    }
}

impl SqlVisitor for RegexReplaceSql {
    fn modify_sql(&self, sql: &str) -> String {
        self.pattern
            .replace_all(sql, self.replace.as_str())
            .into_owned()
    }
}

/// Rewrite `$N` / `?N` placeholders to the target style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslatePlaceholders {
    target: PlaceholderStyle,
}

impl TranslatePlaceholders {
    #[must_use]
    pub fn new(target: PlaceholderStyle) -> Self {
        Self { target }
    }
}

impl SqlVisitor for TranslatePlaceholders {
    fn modify_sql(&self, sql: &str) -> String {
        translate_placeholders(sql, self.target).into_owned()
    }
}

/// Restrict a visitor to the dialects named (case-insensitively) in `dialects`.
#[derive(Debug, Clone)]
pub struct ForDialects<V> {
    dialects: Vec<String>,
    inner: V,
}

impl<V: SqlVisitor> ForDialects<V> {
    #[must_use]
    pub fn new<I, S>(dialects: I, inner: V) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dialects: dialects.into_iter().map(Into::into).collect(),
            inner,
        }
    }
}

impl<V: SqlVisitor> SqlVisitor for ForDialects<V> {
    fn modify_sql(&self, sql: &str) -> String {
        self.inner.modify_sql(sql)
    }

    fn applies_to(&self, dialect: &dyn Dialect) -> bool {
        self.dialects
            .iter()
            .any(|name| name.eq_ignore_ascii_case(dialect.name()))
            && self.inner.applies_to(dialect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectKind;

    #[test]
    fn literal_visitors() {
        assert_eq!(AppendSql::new(" LIMIT 1").modify_sql("SELECT 1"), "SELECT 1 LIMIT 1");
        assert_eq!(PrependSql::new("/* x */ ").modify_sql("SELECT 1"), "/* x */ SELECT 1");
        assert_eq!(
            ReplaceSql::new("int", "bigint").modify_sql("a int, b int"),
            "a bigint, b bigint"
        );
        assert_eq!(ReplaceSql::new("", "x").modify_sql("abc"), "abc");
    }

    #[test]
    fn regex_visitor_expands_groups() {
        let visitor = RegexReplaceSql::new(r"VARCHAR\((\d+)\)", "VARCHAR2($1 CHAR)").unwrap();
        assert_eq!(
            visitor.modify_sql("a VARCHAR(10), b VARCHAR(20)"),
            "a VARCHAR2(10 CHAR), b VARCHAR2(20 CHAR)"
        );
    }

    #[test]
    fn invalid_regex_is_configuration_error() {
        let err = RegexReplaceSql::new("(", "x").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn dialect_filter() {
        let visitor = ForDialects::new(["oracle", "Postgres"], AppendSql::new(";"));
        assert!(visitor.applies_to(&DialectKind::Oracle));
        assert!(visitor.applies_to(&DialectKind::Postgres));
        assert!(!visitor.applies_to(&DialectKind::Sqlite));
    }
}
