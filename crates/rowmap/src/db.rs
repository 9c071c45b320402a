//! The database handle: an executor, a model registry and configuration.

use crate::bind;
use crate::builder::{
    BuiltQuery, CountQuery, DeleteQuery, InsertQuery, SelectQuery, UpdateQuery,
};
use crate::client::{ExecResult, Executor, Row, Rows};
use crate::config::DbConfig;
use crate::error::OrmResult;
use crate::registry::{Model, Registry};
use crate::schema::Record;
use crate::value::Value;
use std::sync::Arc;

/// Entry point for registration and statement building.
///
/// ```ignore
/// let db = Db::new(client);
/// db.register::<User>()?;
///
/// let mut user = User::default();
/// db.select(&["*"]).and_where("id = ?", args![5]).get(&mut user).await?;
///
/// user.email = "new@example.com".into();
/// db.update(&user)?.exec().await?;
/// ```
///
/// The executor can be a connection, a pooled client, a transaction, or any
/// reference to one; `Db::new(&tx)` runs everything inside `tx`.
#[derive(Debug)]
pub struct Db<E> {
    executor: E,
    registry: Registry,
    config: DbConfig,
}

impl<E> Db<E> {
    pub fn new(executor: E) -> Self {
        Self::with_config(executor, DbConfig::default())
    }

    pub fn with_config(executor: E, config: DbConfig) -> Self {
        Self {
            executor,
            registry: Registry::new(),
            config,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn into_executor(self) -> E {
        self.executor
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// Register a record type. See [`Registry::register`].
    pub fn register<T: Record>(&self) -> OrmResult<Arc<Model>> {
        self.registry.register::<T>()
    }

    // ==================== Statement builders ====================

    /// Start a SELECT; the table is taken from the destination's model.
    pub fn select(&self, fields: &[&str]) -> SelectQuery<'_, E> {
        SelectQuery::new(self, fields)
    }

    /// INSERT `record` into its model's table.
    pub fn insert<'a, T: Record>(&'a self, record: &'a mut T) -> OrmResult<InsertQuery<'a, E, T>> {
        let model = self.registry.model_of::<T>()?;
        Ok(InsertQuery::new(self, model, record))
    }

    /// UPDATE every non-key column of `record`, matched by its primary key.
    pub fn update<T: Record>(&self, record: &T) -> OrmResult<UpdateQuery<'_, E>> {
        let model = self.registry.model_of::<T>()?;
        Ok(UpdateQuery::for_record(self, &model, record))
    }

    /// DELETE `record`, matched by its primary key.
    pub fn delete<T: Record>(&self, record: &T) -> OrmResult<DeleteQuery<'_, E>> {
        let model = self.registry.model_of::<T>()?;
        Ok(DeleteQuery::for_record(self, &model, record))
    }

    /// UPDATE addressed by table name, with caller-supplied SET and WHERE.
    pub fn manual_update(&self, table: &str) -> UpdateQuery<'_, E> {
        UpdateQuery::new(self, table)
    }

    /// DELETE addressed by table name, with caller-supplied WHERE.
    pub fn manual_delete(&self, table: &str) -> DeleteQuery<'_, E> {
        DeleteQuery::new(self, table)
    }

    /// `select count(<expr>) from <table>`.
    pub fn count(&self, table: &str, expr: &str) -> CountQuery<'_, E> {
        CountQuery::new(self, table, expr)
    }

    /// `select count(<expr>)` from `T`'s table.
    pub fn count_of<T: Record>(&self, expr: &str) -> OrmResult<CountQuery<'_, E>> {
        let model = self.registry.model_of::<T>()?;
        Ok(CountQuery::new(self, model.table(), expr))
    }

    fn log(&self, kind: &'static str, sql: &str, args: &[Value]) {
        if self.config.log_sql {
            tracing::debug!(
                target: "rowmap.sql",
                kind,
                param_count = args.len(),
                sql = %self.config.truncate(sql),
            );
        }
    }
}

impl<E: Executor> Db<E> {
    // ==================== Raw SQL ====================

    pub async fn exec(&self, sql: &str, args: &[Value]) -> OrmResult<ExecResult> {
        self.log("exec", sql, args);
        self.executor.exec(sql, args).await
    }

    pub async fn query(&self, sql: &str, args: &[Value]) -> OrmResult<Rows> {
        self.log("query", sql, args);
        self.executor.query(sql, args).await
    }

    pub async fn query_row(&self, sql: &str, args: &[Value]) -> OrmResult<Row> {
        self.log("query_row", sql, args);
        self.executor.query_row(sql, args).await
    }

    /// Run raw SQL and bind every returned row into `dest` by column name.
    pub async fn query_into<T: Record>(
        &self,
        sql: &str,
        args: &[Value],
        dest: &mut Vec<T>,
    ) -> OrmResult<()> {
        let model = self.registry.model_of::<T>()?;
        let rows = self.query(sql, args).await?;
        *dest = bind::bind_rows(&model, rows, None, self.config.default_capacity, |r| r)?;
        Ok(())
    }

    /// Run raw SQL and bind its first row into `dest` by column name.
    pub async fn query_one_into<T: Record>(
        &self,
        sql: &str,
        args: &[Value],
        dest: &mut T,
    ) -> OrmResult<()> {
        let model = self.registry.model_of::<T>()?;
        let row = self.query_row(sql, args).await?;
        bind::bind_row(&model, row, dest)
    }

    pub(crate) async fn run_exec(&self, query: &BuiltQuery) -> OrmResult<ExecResult> {
        self.exec(&query.sql, &query.args).await
    }

    pub(crate) async fn run_insert(
        &self,
        query: &BuiltQuery,
        key_column: &str,
    ) -> OrmResult<ExecResult> {
        self.log("insert", &query.sql, &query.args);
        self.executor
            .insert_returning(&query.sql, &query.args, key_column)
            .await
    }

    pub(crate) async fn run_query(&self, query: &BuiltQuery) -> OrmResult<Rows> {
        self.query(&query.sql, &query.args).await
    }

    pub(crate) async fn run_query_row(&self, query: &BuiltQuery) -> OrmResult<Row> {
        self.query_row(&query.sql, &query.args).await
    }
}
