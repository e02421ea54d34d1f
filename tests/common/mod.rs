#![allow(dead_code)]

use std::cell::RefCell;

use sql_gateway::prelude::*;

/// Everything a scripted connection was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    CreateStatement,
    Prepare(String),
    PrepareCall(String),
    EscapeProcessing(bool),
    Execute(String),
    Query(String),
    Update(String),
    Bind(usize, SqlValue),
    CursorClose,
    Close,
}

/// In-memory connection that records every acquire/execute/close and fails on demand.
pub struct ScriptedConnection {
    url: String,
    offline: bool,
    fail_acquire: bool,
    fail_on: Option<String>,
    labels: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
    affected: u64,
    events: RefCell<Vec<Event>>,
}

impl ScriptedConnection {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            offline: false,
            fail_acquire: false,
            fail_on: None,
            labels: Vec::new(),
            rows: Vec::new(),
            affected: 0,
            events: RefCell::new(Vec::new()),
        }
    }

    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    pub fn fail_acquire(mut self) -> Self {
        self.fail_acquire = true;
        self
    }

    /// Any execution whose SQL contains `needle` fails.
    pub fn fail_on(mut self, needle: &str) -> Self {
        self.fail_on = Some(needle.to_string());
        self
    }

    pub fn rows(mut self, labels: &[&str], rows: Vec<Vec<SqlValue>>) -> Self {
        self.labels = labels.iter().map(|l| (*l).to_string()).collect();
        self.rows = rows;
        self
    }

    pub fn affected(mut self, affected: u64) -> Self {
        self.affected = affected;
        self
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn count(&self, event: &Event) -> usize {
        self.events.borrow().iter().filter(|e| *e == event).count()
    }

    fn record(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }

    fn check(&self, sql: &str) -> Result<(), DriverError> {
        match &self.fail_on {
            Some(needle) if sql.contains(needle.as_str()) => {
                Err(DriverError::message(format!("scripted failure on {needle}")))
            }
            _ => Ok(()),
        }
    }

    fn acquire(&self) -> Result<(), DriverError> {
        if self.fail_acquire {
            return Err(DriverError::message("no handles available"));
        }
        Ok(())
    }

    fn cursor(&self) -> ScriptedCursor<'_> {
        ScriptedCursor {
            conn: self,
            inner: BufferedCursor::new(self.labels.clone(), self.rows.clone()),
        }
    }
}

impl DatabaseConnection for ScriptedConnection {
    fn url(&self) -> &str {
        &self.url
    }

    fn is_offline(&self) -> bool {
        self.offline
    }

    fn create_statement(&mut self) -> Result<Box<dyn StatementHandle + '_>, DriverError> {
        self.acquire()?;
        self.record(Event::CreateStatement);
        Ok(Box::new(ScriptedStatement { conn: self }))
    }

    fn prepare_statement(
        &mut self,
        sql: &str,
    ) -> Result<Box<dyn PreparedHandle + '_>, DriverError> {
        self.acquire()?;
        self.record(Event::Prepare(sql.to_string()));
        Ok(Box::new(ScriptedPrepared {
            conn: self,
            sql: sql.to_string(),
        }))
    }

    fn prepare_call(&mut self, sql: &str) -> Result<Box<dyn PreparedHandle + '_>, DriverError> {
        self.acquire()?;
        self.record(Event::PrepareCall(sql.to_string()));
        Ok(Box::new(ScriptedPrepared {
            conn: self,
            sql: sql.to_string(),
        }))
    }
}

struct ScriptedStatement<'c> {
    conn: &'c ScriptedConnection,
}

impl Resource for ScriptedStatement<'_> {
    fn close(&mut self) {
        self.conn.record(Event::Close);
    }
}

impl StatementHandle for ScriptedStatement<'_> {
    fn set_escape_processing(&mut self, enabled: bool) {
        self.conn.record(Event::EscapeProcessing(enabled));
    }

    fn execute(&mut self, sql: &str) -> Result<(), DriverError> {
        self.conn.record(Event::Execute(sql.to_string()));
        self.conn.check(sql)
    }

    fn execute_query(&mut self, sql: &str) -> Result<Box<dyn RowCursor + '_>, DriverError> {
        self.conn.record(Event::Query(sql.to_string()));
        self.conn.check(sql)?;
        Ok(Box::new(self.conn.cursor()))
    }

    fn execute_update(&mut self, sql: &str) -> Result<u64, DriverError> {
        self.conn.record(Event::Update(sql.to_string()));
        self.conn.check(sql)?;
        Ok(self.conn.affected)
    }
}

struct ScriptedPrepared<'c> {
    conn: &'c ScriptedConnection,
    sql: String,
}

impl Resource for ScriptedPrepared<'_> {
    fn close(&mut self) {
        self.conn.record(Event::Close);
    }
}

impl PreparedHandle for ScriptedPrepared<'_> {
    fn bind(&mut self, position: usize, value: &SqlValue) -> Result<(), DriverError> {
        self.conn.record(Event::Bind(position, value.clone()));
        Ok(())
    }

    fn execute(&mut self) -> Result<(), DriverError> {
        self.conn.record(Event::Execute(self.sql.clone()));
        self.conn.check(&self.sql)
    }

    fn execute_query(&mut self) -> Result<Box<dyn RowCursor + '_>, DriverError> {
        self.conn.record(Event::Query(self.sql.clone()));
        self.conn.check(&self.sql)?;
        Ok(Box::new(self.conn.cursor()))
    }

    fn execute_update(&mut self) -> Result<u64, DriverError> {
        self.conn.record(Event::Update(self.sql.clone()));
        self.conn.check(&self.sql)?;
        Ok(self.conn.affected)
    }
}

struct ScriptedCursor<'c> {
    conn: &'c ScriptedConnection,
    inner: BufferedCursor,
}

impl RowCursor for ScriptedCursor<'_> {
    fn column_count(&self) -> usize {
        self.inner.column_count()
    }

    fn column_label(&self, index: usize) -> Result<&str, DriverError> {
        self.inner.column_label(index)
    }

    fn next_row(&mut self) -> Result<bool, DriverError> {
        self.inner.next_row()
    }

    fn value(&self, index: usize) -> Result<SqlValue, DriverError> {
        self.inner.value(index)
    }

    fn close(&mut self) {
        self.inner.close();
        self.conn.record(Event::CursorClose);
    }
}

/// Dialect that turns one statement into several strings, split on `|`.
#[derive(Debug)]
pub struct PipeSplitDialect;

impl Dialect for PipeSplitDialect {
    fn name(&self) -> &str {
        "pipe-split"
    }

    fn generate_sql(&self, statement: &Statement) -> Result<Vec<String>, SqlGatewayError> {
        let sql = statement.sql_text().unwrap_or_default();
        Ok(sql
            .split('|')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect())
    }
}
