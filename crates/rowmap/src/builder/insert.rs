use super::render::{Node, render};
use super::traits::{BuiltQuery, SqlBuilder};
use crate::client::{ExecResult, Executor};
use crate::db::Db;
use crate::error::OrmResult;
use crate::registry::Model;
use crate::schema::Record;
use crate::value::Value;
use std::sync::Arc;

/// INSERT statement for one record.
///
/// A primary key column whose value is still zero is left out so the
/// database assigns it; after [`exec`](Self::exec) the assigned identifier is
/// written back into that field.
pub struct InsertQuery<'a, E, T> {
    db: &'a Db<E>,
    model: Arc<Model>,
    record: &'a mut T,
}

impl<'a, E, T: Record> InsertQuery<'a, E, T> {
    pub(crate) fn new(db: &'a Db<E>, model: Arc<Model>, record: &'a mut T) -> Self {
        Self { db, model, record }
    }

    /// Field position and column of the one primary key the database is
    /// expected to fill.
    fn generated_key(&self) -> Option<(usize, String)> {
        let mut omitted = self
            .model
            .primary_columns()
            .filter(|c| self.record.value_at(c.field).is_zero());
        match (omitted.next(), omitted.next()) {
            (Some(c), None) => Some((c.field, c.name.clone())),
            _ => None,
        }
    }
}

impl<E, T: Record> SqlBuilder for InsertQuery<'_, E, T> {
    fn build(&self) -> OrmResult<BuiltQuery> {
        let (columns, values): (Vec<&str>, Vec<Value>) = self
            .model
            .insert_columns(&*self.record)
            .into_iter()
            .map(|(c, v)| (c.name.as_str(), v))
            .unzip();

        Ok(render(vec![Node::Insert {
            table: self.model.table(),
            columns,
            values,
        }]))
    }
}

impl<E: Executor, T: Record> InsertQuery<'_, E, T> {
    /// Run the insert. When exactly one primary key was left to the database,
    /// the executor is asked for it and the value is stored into that field.
    pub async fn exec(self) -> OrmResult<ExecResult> {
        let query = self.build()?;
        let Some((field, column)) = self.generated_key() else {
            return self.db.run_exec(&query).await;
        };

        let result = self.db.run_insert(&query, &column).await?;
        if let Some(id) = result.last_insert_id {
            self.record
                .scan_at(field, Value::Int(id))
                .map_err(|e| e.at_column(&column))?;
        }
        Ok(result)
    }
}
