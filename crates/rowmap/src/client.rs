//! Executor trait for unified database access.
//!
//! The mapper never talks to a driver directly: it renders SQL text with `?`
//! placeholders plus a positional argument list and hands both to an
//! [`Executor`]. Connections, pooled clients and transactions all implement
//! it, so every operation composes inside a transaction unchanged.

use crate::error::{OrmError, OrmResult};
use crate::value::Value;
use std::sync::Arc;

/// Outcome of a statement that returns no rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// Identifier assigned by the database to an inserted row, when the
    /// driver reports one.
    pub last_insert_id: Option<i64>,
}

/// One returned row, with the column names of its result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Value of the first column called `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let index = self.columns.iter().position(|c| c == name)?;
        self.values.get(index)
    }
}

/// A fully read result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Rows {
    columns: Arc<[String]>,
    rows: Vec<Vec<Value>>,
}

impl Rows {
    pub fn new<I, S>(columns: I, rows: Vec<Vec<Value>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows,
        }
    }

    /// A result set with no columns and no rows.
    pub fn empty() -> Self {
        Self::new(Vec::<String>::new(), Vec::new())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The first row, if any.
    pub fn into_first(self) -> Option<Row> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .next()
            .map(|values| Row::new(columns, values))
    }
}

impl IntoIterator for Rows {
    type Item = Row;
    type IntoIter = RowsIter;

    fn into_iter(self) -> RowsIter {
        RowsIter {
            columns: self.columns,
            rows: self.rows.into_iter(),
        }
    }
}

/// Owning iterator over [`Rows`].
#[derive(Debug)]
pub struct RowsIter {
    columns: Arc<[String]>,
    rows: std::vec::IntoIter<Vec<Value>>,
}

impl Iterator for RowsIter {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        let values = self.rows.next()?;
        Some(Row::new(Arc::clone(&self.columns), values))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for RowsIter {}

/// A trait that unifies connections, pooled clients and transactions.
pub trait Executor: Send + Sync {
    /// Execute a statement and report affected rows.
    fn exec(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<ExecResult>> + Send;

    /// Execute a query and return all rows.
    fn query(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<Rows>> + Send;

    /// Execute a query and return the **first** row.
    ///
    /// Semantics:
    /// - 0 rows: returns [`OrmError::NotFound`]
    /// - 1 or more rows: returns the first row
    fn query_row(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<Row>> + Send {
        async move {
            self.query(sql, args)
                .await?
                .into_first()
                .ok_or_else(|| OrmError::not_found("query returned no rows"))
        }
    }

    /// Execute an insert whose `key_column` is assigned by the database,
    /// reporting the assigned identifier in [`ExecResult::last_insert_id`].
    ///
    /// The default runs [`exec`](Self::exec), for drivers that report the
    /// identifier on their own.
    fn insert_returning(
        &self,
        sql: &str,
        args: &[Value],
        _key_column: &str,
    ) -> impl std::future::Future<Output = OrmResult<ExecResult>> + Send {
        self.exec(sql, args)
    }
}

// ===== Reference implementations =====

impl<E: Executor + ?Sized> Executor for &E {
    async fn exec(&self, sql: &str, args: &[Value]) -> OrmResult<ExecResult> {
        (**self).exec(sql, args).await
    }

    async fn query(&self, sql: &str, args: &[Value]) -> OrmResult<Rows> {
        (**self).query(sql, args).await
    }

    async fn query_row(&self, sql: &str, args: &[Value]) -> OrmResult<Row> {
        (**self).query_row(sql, args).await
    }

    async fn insert_returning(
        &self,
        sql: &str,
        args: &[Value],
        key_column: &str,
    ) -> OrmResult<ExecResult> {
        (**self).insert_returning(sql, args, key_column).await
    }
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    async fn exec(&self, sql: &str, args: &[Value]) -> OrmResult<ExecResult> {
        (**self).exec(sql, args).await
    }

    async fn query(&self, sql: &str, args: &[Value]) -> OrmResult<Rows> {
        (**self).query(sql, args).await
    }

    async fn query_row(&self, sql: &str, args: &[Value]) -> OrmResult<Row> {
        (**self).query_row(sql, args).await
    }

    async fn insert_returning(
        &self,
        sql: &str,
        args: &[Value],
        key_column: &str,
    ) -> OrmResult<ExecResult> {
        (**self).insert_returning(sql, args, key_column).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_iterate_with_shared_columns() {
        let rows = Rows::new(
            ["id", "name"],
            vec![
                vec![Value::Int(1), Value::Text("a".into())],
                vec![Value::Int(2), Value::Text("b".into())],
            ],
        );
        assert_eq!(rows.len(), 2);

        let collected: Vec<Row> = rows.into_iter().collect();
        assert_eq!(collected[1].get("name"), Some(&Value::Text("b".into())));
        assert_eq!(collected[0].columns(), ["id", "name"]);
    }

    #[test]
    fn first_row_of_empty_set() {
        assert!(Rows::empty().into_first().is_none());
    }
}
