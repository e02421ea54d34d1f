mod common;

use std::sync::Arc;

use common::{Event, PipeSplitDialect, ScriptedConnection};
use sql_gateway::prelude::*;

const URL: &str = "scripted://db";

#[derive(Debug)]
struct CallOnly;

impl Change for CallOnly {
    fn generate_statements(&self, _dialect: &dyn Dialect) -> Result<Vec<Statement>, SqlGatewayError> {
        Ok(vec![Statement::callable("call refresh()")])
    }
}

#[test]
fn execute_fails_fast_and_releases_once() -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = ScriptedConnection::new(URL).fail_on("two");
    let err = Executor::builder(&mut conn)
        .dialect(PipeSplitDialect)
        .build()
        .execute(&Statement::raw("one | two | three"), &[])
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DriverFailure);
    assert_eq!(err.sql(), Some("one; two; three"));
    assert_eq!(err.address(), Some(URL));
    assert_eq!(
        err.to_string(),
        "Error executing SQL one; two; three on scripted://db: scripted failure on two"
    );
    assert_eq!(
        conn.events(),
        vec![
            Event::CreateStatement,
            Event::Execute("one".into()),
            Event::Execute("two".into()),
            Event::Close,
        ]
    );
    Ok(())
}

#[test]
fn execute_runs_every_string_on_one_handle() -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = ScriptedConnection::new(URL);
    Executor::builder(&mut conn)
        .dialect(PipeSplitDialect)
        .build()
        .execute(&Statement::raw("a | b = ? | c"), &[])?;

    assert_eq!(
        conn.events(),
        vec![
            Event::CreateStatement,
            Event::Execute("a".into()),
            Event::EscapeProcessing(false),
            Event::Execute("b = ?".into()),
            Event::Execute("c".into()),
            Event::Close,
        ]
    );
    Ok(())
}

#[test]
fn offline_connection_acquires_nothing() {
    let mut conn = ScriptedConnection::new("offline:oracle").offline();
    let statement = Statement::raw("select 1");
    {
        let mut executor = Executor::new(&mut conn);
        let results = [
            executor.query(&statement, &[]).map(|_| ()),
            executor.update(&statement, &[]).map(|_| ()),
            executor.execute(&statement, &[]),
            executor.execute(&Statement::prepared("insert ?", vec![SqlValue::Int(1)]), &[]),
            executor.execute_callable(&statement, &[], |_| Ok(())),
        ];
        for result in results {
            let err = result.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ConnectionUnavailable);
            assert_eq!(
                err.to_string(),
                "Cannot execute commands against an offline database (offline:oracle)"
            );
        }
    }
    assert!(conn.events().is_empty());
}

#[test]
fn comment_issues_no_sql() {
    let recording = Arc::new(RecordingDiagnostics::new());
    let mut conn = ScriptedConnection::new(URL);
    Executor::builder(&mut conn)
        .diagnostics(recording.clone())
        .build()
        .comment("starting changeset 42");

    assert!(conn.events().is_empty());
    assert_eq!(recording.messages(), vec!["starting changeset 42"]);
}

#[test]
fn update_rejects_callables_without_acquiring() {
    let mut conn = ScriptedConnection::new(URL);
    {
        let mut executor = Executor::new(&mut conn);
        let direct = executor
            .update(&Statement::callable("call refresh()"), &[])
            .unwrap_err();
        assert_eq!(direct.kind(), ErrorKind::UnsupportedOperation);

        let via_change = executor
            .update(&Statement::change(CallOnly), &[])
            .unwrap_err();
        assert_eq!(via_change.kind(), ErrorKind::UnsupportedOperation);
    }
    assert!(conn.events().is_empty());
}

#[test]
fn single_statement_operations_reject_multi_and_empty() {
    let mut conn = ScriptedConnection::new(URL);
    {
        let mut executor = Executor::new(&mut conn);
        let two = Statement::change(SqlChange::new("select 1; select 2"));
        let none = Statement::change(SqlChange::new("  "));

        let err = executor.query(&two, &[]).unwrap_err();
        assert!(matches!(
            err,
            SqlGatewayError::MultiStatementNotAllowed { operation: "query", count: 2 }
        ));
        let err = executor.update(&two, &[]).unwrap_err();
        assert!(matches!(
            err,
            SqlGatewayError::MultiStatementNotAllowed { operation: "update", count: 2 }
        ));
        let err = executor.query(&none, &[]).unwrap_err();
        assert!(matches!(
            err,
            SqlGatewayError::MultiStatementNotAllowed { count: 0, .. }
        ));
        let err = executor.execute_callable(&none, &[], |_| Ok(())).unwrap_err();
        assert!(matches!(
            err,
            SqlGatewayError::MultiStatementNotAllowed { operation: "execute_callable", count: 0 }
        ));
    }
    assert!(conn.events().is_empty());
}

#[test]
fn execute_accepts_multi_statement_changes() -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = ScriptedConnection::new(URL);
    Executor::new(&mut conn).execute(&Statement::change(SqlChange::new("a; b")), &[])?;
    assert_eq!(conn.count(&Event::CreateStatement), 2);
    assert_eq!(conn.count(&Event::Close), 2);
    assert_eq!(conn.count(&Event::Execute("a".into())), 1);
    assert_eq!(conn.count(&Event::Execute("b".into())), 1);
    Ok(())
}

#[test]
fn query_maps_rows_and_closes_cursor_before_handle() -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = ScriptedConnection::new(URL).rows(
        &["id", "Name"],
        vec![
            vec![SqlValue::Int(1), SqlValue::Text("a".into())],
            vec![SqlValue::Int(2), SqlValue::Null],
        ],
    );
    let result = Executor::new(&mut conn).query(&Statement::raw("select id, name from t"), &[])?;

    assert_eq!(result.len(), 2);
    assert_eq!(result.rows()[0].columns(), ["ID", "NAME"]);
    assert_eq!(result.rows()[1].get("NAME"), Some(&SqlValue::Null));
    assert_eq!(
        conn.events(),
        vec![
            Event::CreateStatement,
            Event::Query("select id, name from t".into()),
            Event::CursorClose,
            Event::Close,
        ]
    );
    Ok(())
}

#[test]
fn query_picks_shape_from_statement() -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = ScriptedConnection::new(URL).rows(&["n"], vec![vec![SqlValue::Int(3)]]);
    {
        let mut executor = Executor::new(&mut conn);
        executor.query(
            &Statement::prepared("select ? + ?", vec![SqlValue::Int(1), SqlValue::Int(2)]),
            &[],
        )?;
        executor.query(&Statement::callable("{call counts(?)}"), &[])?;
    }
    assert_eq!(
        conn.events(),
        vec![
            Event::Prepare("select ? + ?".into()),
            Event::Bind(0, SqlValue::Int(1)),
            Event::Bind(1, SqlValue::Int(2)),
            Event::Query("select ? + ?".into()),
            Event::CursorClose,
            Event::Close,
            Event::PrepareCall("{call counts(?)}".into()),
            Event::Query("{call counts(?)}".into()),
            Event::CursorClose,
            Event::Close,
        ]
    );
    Ok(())
}

#[test]
fn query_failure_still_releases() {
    let mut conn = ScriptedConnection::new(URL).fail_on("broken");
    let err = Executor::new(&mut conn)
        .query(&Statement::raw("select broken"), &[])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DriverFailure);
    assert_eq!(err.sql(), Some("select broken"));
    assert!(std::error::Error::source(&err).is_some());
    assert_eq!(conn.count(&Event::Close), 1);
    assert_eq!(conn.count(&Event::CursorClose), 0);
}

#[test]
fn failed_acquisition_has_nothing_to_release() {
    let mut conn = ScriptedConnection::new(URL).fail_acquire();
    let err = Executor::new(&mut conn)
        .execute(&Statement::raw("create table t (id int)"), &[])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DriverFailure);
    assert_eq!(err.address(), Some(URL));
    assert!(conn.events().is_empty());
}

#[test]
fn update_returns_driver_count() -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = ScriptedConnection::new(URL).affected(7);
    let result = Executor::new(&mut conn).update(&Statement::raw("delete from t"), &[])?;
    assert_eq!(result.rows_affected(), 7);
    assert_eq!(
        conn.events(),
        vec![
            Event::CreateStatement,
            Event::Update("delete from t".into()),
            Event::Close,
        ]
    );
    Ok(())
}

#[test]
fn prepared_statements_execute_themselves_without_visitors() -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = ScriptedConnection::new(URL);
    let visitors: Vec<Arc<dyn SqlVisitor>> = vec![Arc::new(AppendSql::new(" -- visited"))];
    Executor::new(&mut conn).execute(
        &Statement::prepared("insert into t values (?)", vec![SqlValue::Bool(true)]),
        &visitors,
    )?;
    assert_eq!(
        conn.events(),
        vec![
            Event::Prepare("insert into t values (?)".into()),
            Event::Bind(0, SqlValue::Bool(true)),
            Event::Execute("insert into t values (?)".into()),
            Event::Close,
        ]
    );
    Ok(())
}

#[test]
fn visitors_run_in_order_on_plain_execution() -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = ScriptedConnection::new(URL);
    let visitors: Vec<Arc<dyn SqlVisitor>> = vec![
        Arc::new(ReplaceSql::new("tbl", "people")),
        Arc::new(PrependSql::new("/* audit */ ")),
        Arc::new(ForDialects::new(["postgres"], AppendSql::new(" CASCADE"))),
    ];
    Executor::builder(&mut conn)
        .dialect(DialectKind::Postgres)
        .build()
        .execute(&Statement::raw("drop table tbl"), &visitors)?;
    assert_eq!(
        conn.count(&Event::Execute("/* audit */ drop table people CASCADE".into())),
        1
    );
    Ok(())
}

#[test]
fn oracle_executes_without_duplicated_separator() -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = ScriptedConnection::new("jdbc:oracle:thin:@db:1521/XE");
    Executor::new(&mut conn).execute(&Statement::raw("BEGIN NULL; END;\n/\n/"), &[])?;
    assert_eq!(conn.count(&Event::Execute("BEGIN NULL; END;\n".into())), 1);
    Ok(())
}

#[test]
fn callable_action_gets_the_handle() -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = ScriptedConnection::new(URL);
    let value = Executor::new(&mut conn).execute_callable(
        &Statement::callable("{call bump(?)}"),
        &[],
        |handle| {
            handle.bind(0, &SqlValue::Int(9))?;
            handle.execute()?;
            Ok("done")
        },
    )?;
    assert_eq!(value, "done");
    assert_eq!(
        conn.events(),
        vec![
            Event::PrepareCall("{call bump(?)}".into()),
            Event::Bind(0, SqlValue::Int(9)),
            Event::Execute("{call bump(?)}".into()),
            Event::Close,
        ]
    );
    Ok(())
}

#[test]
fn callable_action_failure_is_wrapped_after_release() {
    let mut conn = ScriptedConnection::new(URL);
    let err = Executor::new(&mut conn)
        .execute_callable(&Statement::callable("{call bad()}"), &[], |_| {
            Err::<(), _>(DriverError::message("procedure raised"))
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DriverFailure);
    assert_eq!(err.sql(), Some("{call bad()}"));
    assert_eq!(conn.count(&Event::Close), 1);
}

#[test]
fn every_execution_is_traced() -> Result<(), Box<dyn std::error::Error>> {
    let recording = Arc::new(RecordingDiagnostics::new());
    let mut conn = ScriptedConnection::new(URL).rows(&["x"], vec![vec![SqlValue::Int(1)]]);
    {
        let mut executor = Executor::builder(&mut conn)
            .diagnostics(recording.clone())
            .build();
        executor.query(&Statement::raw("select x"), &[])?;
        executor.update(&Statement::raw("update t set x = 1"), &[])?;
        executor.execute(&Statement::raw("vacuum"), &[])?;
        executor.execute(&Statement::prepared("insert ?", vec![SqlValue::Null]), &[])?;
        executor.execute_callable(&Statement::callable("call p()"), &[], |_| Ok(()))?;
    }
    assert_eq!(
        recording.messages(),
        vec![
            "executing query: select x",
            "executing update: update t set x = 1",
            "executing statement: vacuum",
            "executing prepared statement: insert ?",
            "executing callable: call p()",
        ]
    );
    Ok(())
}
