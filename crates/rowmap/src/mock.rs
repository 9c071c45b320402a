//! In-memory executor for tests.
//!
//! Expectations are consumed in order. Each one names the statement kind and
//! the exact SQL text, optionally the arguments, and the canned outcome.
//!
//! ```ignore
//! let mock = Arc::new(MockExecutor::new());
//! mock.expect(
//!     Expectation::query("select * from t where id = ? limit 1")
//!         .with_args(args![5])
//!         .returning(Rows::new(["id", "name"], vec![args![5, "foo"]])),
//! );
//! let db = Db::new(Arc::clone(&mock));
//! ```

use crate::client::{ExecResult, Executor, Row, Rows};
use crate::error::{OrmError, OrmResult};
use crate::value::Value;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// Error raised by [`MockExecutor`] itself.
#[derive(Debug, thiserror::Error)]
pub enum MockError {
    #[error("unexpected {kind} statement: {sql}")]
    Unexpected { kind: StatementKind, sql: String },

    #[error("expected {expected} `{expected_sql}`, got {kind} `{sql}`")]
    Mismatch {
        expected: StatementKind,
        expected_sql: String,
        kind: StatementKind,
        sql: String,
    },

    #[error("arguments for `{sql}` differ: expected {expected:?}, got {actual:?}")]
    Args {
        sql: String,
        expected: Vec<Value>,
        actual: Vec<Value>,
    },

    /// Canned failure returned on purpose
    #[error("{0}")]
    Injected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Exec,
    Query,
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatementKind::Exec => f.write_str("exec"),
            StatementKind::Query => f.write_str("query"),
        }
    }
}

#[derive(Debug, Clone)]
enum Outcome {
    Rows(Rows),
    Exec(ExecResult),
    Error(String),
}

/// One expected statement and its canned outcome.
#[derive(Debug, Clone)]
pub struct Expectation {
    kind: StatementKind,
    sql: String,
    args: Option<Vec<Value>>,
    outcome: Outcome,
}

impl Expectation {
    /// Expect a query; returns no rows unless [`returning`](Self::returning) is set.
    pub fn query(sql: impl Into<String>) -> Self {
        Self {
            kind: StatementKind::Query,
            sql: sql.into(),
            args: None,
            outcome: Outcome::Rows(Rows::empty()),
        }
    }

    /// Expect an exec; reports nothing affected unless
    /// [`returning_exec`](Self::returning_exec) is set.
    pub fn exec(sql: impl Into<String>) -> Self {
        Self {
            kind: StatementKind::Exec,
            sql: sql.into(),
            args: None,
            outcome: Outcome::Exec(ExecResult::default()),
        }
    }

    /// Also require these exact arguments.
    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = Some(args);
        self
    }

    pub fn returning(mut self, rows: Rows) -> Self {
        self.outcome = Outcome::Rows(rows);
        self
    }

    pub fn returning_exec(mut self, rows_affected: u64, last_insert_id: Option<i64>) -> Self {
        self.outcome = Outcome::Exec(ExecResult {
            rows_affected,
            last_insert_id,
        });
        self
    }

    /// Fail the statement with a driver error carrying `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.outcome = Outcome::Error(message.into());
        self
    }
}

#[derive(Debug, Default)]
struct State {
    pending: VecDeque<Expectation>,
    log: Vec<(String, Vec<Value>)>,
}

/// An [`Executor`] that replays expectations instead of talking to a database.
#[derive(Debug, Default)]
pub struct MockExecutor {
    state: Mutex<State>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn expect(&self, expectation: Expectation) -> &Self {
        self.lock().pending.push_back(expectation);
        self
    }

    /// Every statement seen so far, with its arguments.
    pub fn statements(&self) -> Vec<(String, Vec<Value>)> {
        self.lock().log.clone()
    }

    /// Fails when expectations remain unconsumed.
    pub fn verify(&self) -> Result<(), String> {
        let state = self.lock();
        if state.pending.is_empty() {
            return Ok(());
        }
        let left: Vec<&str> = state.pending.iter().map(|e| e.sql.as_str()).collect();
        Err(format!("unmet expectations: {left:?}"))
    }

    fn next(&self, kind: StatementKind, sql: &str, args: &[Value]) -> Result<Outcome, MockError> {
        let mut state = self.lock();
        state.log.push((sql.to_string(), args.to_vec()));

        let Some(expected) = state.pending.pop_front() else {
            return Err(MockError::Unexpected {
                kind,
                sql: sql.to_string(),
            });
        };
        if expected.kind != kind || expected.sql != sql {
            return Err(MockError::Mismatch {
                expected: expected.kind,
                expected_sql: expected.sql,
                kind,
                sql: sql.to_string(),
            });
        }
        if let Some(want) = expected.args {
            if want != args {
                return Err(MockError::Args {
                    sql: sql.to_string(),
                    expected: want,
                    actual: args.to_vec(),
                });
            }
        }
        match expected.outcome {
            Outcome::Error(message) => Err(MockError::Injected(message)),
            outcome => Ok(outcome),
        }
    }
}

impl Executor for MockExecutor {
    async fn exec(&self, sql: &str, args: &[Value]) -> OrmResult<ExecResult> {
        match self.next(StatementKind::Exec, sql, args).map_err(OrmError::driver)? {
            Outcome::Exec(result) => Ok(result),
            _ => Ok(ExecResult::default()),
        }
    }

    async fn query(&self, sql: &str, args: &[Value]) -> OrmResult<Rows> {
        match self.next(StatementKind::Query, sql, args).map_err(OrmError::driver)? {
            Outcome::Rows(rows) => Ok(rows),
            _ => Ok(Rows::empty()),
        }
    }

    async fn query_row(&self, sql: &str, args: &[Value]) -> OrmResult<Row> {
        self.query(sql, args)
            .await?
            .into_first()
            .ok_or_else(|| OrmError::not_found("query returned no rows"))
    }
}
