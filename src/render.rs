use std::borrow::Cow;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::dialect::Dialect;
use crate::error::SqlGatewayError;
use crate::statement::Statement;
use crate::visitor::SqlVisitor;

static DUPLICATE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\s*/\s*$").expect("separator pattern is valid"));

/// Expand changes (recursively) into the concrete statements they stand for.
///
/// Concrete statements resolve to themselves.
///
/// # Errors
/// Returns whatever the change reports while generating its statements.
pub fn resolve(
    statement: &Statement,
    dialect: &dyn Dialect,
) -> Result<Vec<Statement>, SqlGatewayError> {
    match statement {
        Statement::Change(change) => {
            let mut resolved = Vec::new();
            for generated in change.generate_statements(dialect)? {
                resolved.extend(resolve(&generated, dialect)?);
            }
            Ok(resolved)
        }
        concrete => Ok(vec![concrete.clone()]),
    }
}

/// Render `statement` into the final SQL strings for `dialect`.
///
/// Each generated string goes through every applicable visitor in order, then through the
/// dialect's trailing separator fix.
///
/// # Errors
/// Returns `SqlGatewayError` if a change cannot be expanded or the dialect cannot generate SQL.
pub fn render(
    statement: &Statement,
    dialect: &dyn Dialect,
    visitors: &[Arc<dyn SqlVisitor>],
) -> Result<Vec<String>, SqlGatewayError> {
    let mut rendered = Vec::new();
    for concrete in resolve(statement, dialect)? {
        rendered.extend(render_concrete(&concrete, dialect, visitors)?);
    }
    Ok(rendered)
}

/// Render a statement that must produce exactly one SQL string.
///
/// Returns the concrete statement that produced the string alongside it, so callers can
/// pick the matching execution shape.
///
/// # Errors
/// Returns `SqlGatewayError::MultiStatementNotAllowed` when rendering yields zero or several
/// strings, or any error from [`render`].
pub fn render_single(
    statement: &Statement,
    dialect: &dyn Dialect,
    visitors: &[Arc<dyn SqlVisitor>],
    operation: &'static str,
) -> Result<(Statement, String), SqlGatewayError> {
    let mut rendered = Vec::new();
    for concrete in resolve(statement, dialect)? {
        for sql in render_concrete(&concrete, dialect, visitors)? {
            rendered.push((concrete.clone(), sql));
        }
    }

    let count = rendered.len();
    match rendered.pop() {
        Some(single) if count == 1 => Ok(single),
        _ => Err(SqlGatewayError::MultiStatementNotAllowed { operation, count }),
    }
}

fn render_concrete(
    statement: &Statement,
    dialect: &dyn Dialect,
    visitors: &[Arc<dyn SqlVisitor>],
) -> Result<Vec<String>, SqlGatewayError> {
    Ok(dialect
        .generate_sql(statement)?
        .into_iter()
        .map(|sql| {
            let visited = apply_visitors(&sql, dialect, visitors);
            if dialect.requires_separator_fix() {
                strip_duplicate_separator(&visited).into_owned()
            } else {
                visited
            }
        })
        .collect())
}

/// Run the visitor pipeline over one SQL string, skipping visitors not meant for `dialect`.
#[must_use]
pub fn apply_visitors(sql: &str, dialect: &dyn Dialect, visitors: &[Arc<dyn SqlVisitor>]) -> String {
    visitors
        .iter()
        .filter(|visitor| visitor.applies_to(dialect))
        .fold(sql.to_string(), |current, visitor| visitor.modify_sql(&current))
}

/// Remove a duplicated trailing `/` separator (with any surrounding whitespace).
#[must_use]
pub fn strip_duplicate_separator(sql: &str) -> Cow<'_, str> {
    DUPLICATE_SEPARATOR.replace(sql, "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::{Change, SqlChange};
    use crate::dialect::DialectKind;
    use crate::error::ErrorKind;
    use crate::visitor::{AppendSql, ForDialects, ReplaceSql};

    #[test]
    fn visitors_apply_in_order() {
        let pipeline: Vec<Arc<dyn SqlVisitor>> = vec![
            Arc::new(ReplaceSql::new("a", "b")),
            Arc::new(ReplaceSql::new("b", "c")),
            Arc::new(AppendSql::new("!")),
        ];
        let rendered = render(&Statement::raw("a"), &DialectKind::Generic, &pipeline).unwrap();
        assert_eq!(rendered, vec!["c!"]);
    }

    #[test]
    fn inapplicable_visitors_are_skipped() {
        let pipeline: Vec<Arc<dyn SqlVisitor>> =
            vec![Arc::new(ForDialects::new(["oracle"], AppendSql::new(" x")))];
        let sqlite = render(&Statement::raw("a"), &DialectKind::Sqlite, &pipeline).unwrap();
        let oracle = render(&Statement::raw("a"), &DialectKind::Oracle, &pipeline).unwrap();
        assert_eq!(sqlite, vec!["a"]);
        assert_eq!(oracle, vec!["a x"]);
    }

    #[test]
    fn oracle_drops_duplicated_trailing_separator() {
        let statement = Statement::raw("BEGIN NULL; END; // ");
        let oracle = render(&statement, &DialectKind::Oracle, &[]).unwrap();
        let generic = render(&statement, &DialectKind::Generic, &[]).unwrap();
        assert_eq!(oracle, vec!["BEGIN NULL; END; "]);
        assert_eq!(generic, vec!["BEGIN NULL; END; // "]);
    }

    #[test]
    fn separator_fix_handles_whitespace_between_slashes() {
        assert_eq!(strip_duplicate_separator("x\n/\n/\n"), "x\n");
        assert_eq!(strip_duplicate_separator("a / b"), "a / b");
        assert!(matches!(strip_duplicate_separator("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn separator_fix_runs_after_visitors() {
        let pipeline: Vec<Arc<dyn SqlVisitor>> = vec![Arc::new(AppendSql::new("\n//"))];
        let rendered = render(&Statement::raw("x"), &DialectKind::Oracle, &pipeline).unwrap();
        assert_eq!(rendered, vec!["x\n"]);
    }

    #[test]
    fn changes_expand_recursively() {
        #[derive(Debug)]
        struct Nested;
        impl Change for Nested {
            fn generate_statements(
                &self,
                _dialect: &dyn Dialect,
            ) -> Result<Vec<Statement>, SqlGatewayError> {
                Ok(vec![
                    Statement::raw("one"),
                    Statement::change(SqlChange::new("two; three")),
                ])
            }
        }
        let rendered = render(&Statement::change(Nested), &DialectKind::Generic, &[]).unwrap();
        assert_eq!(rendered, vec!["one", "two", "three"]);
    }

    #[test]
    fn render_single_rejects_zero_and_many() {
        let many = Statement::change(SqlChange::new("a; b"));
        let err = render_single(&many, &DialectKind::Generic, &[], "query").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MultiStatementNotAllowed);
        assert!(err.to_string().contains("got 2"));

        let none = Statement::change(SqlChange::new(""));
        let err = render_single(&none, &DialectKind::Generic, &[], "update").unwrap_err();
        assert!(matches!(
            err,
            SqlGatewayError::MultiStatementNotAllowed { operation: "update", count: 0 }
        ));
    }

    #[test]
    fn render_single_keeps_the_concrete_statement() {
        let single = Statement::change(SqlChange::new("select 1;"));
        let (concrete, sql) = render_single(&single, &DialectKind::Generic, &[], "query").unwrap();
        assert_eq!(sql, "select 1");
        assert!(matches!(concrete, Statement::Raw(ref s) if s == "select 1"));
    }
}
