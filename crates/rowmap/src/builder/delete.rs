use super::render::{Join, Node, render};
use super::traits::{BuiltQuery, SqlBuilder};
use super::where_builder::WhereBuilder;
use crate::client::{ExecResult, Executor};
use crate::db::Db;
use crate::error::OrmResult;
use crate::registry::Model;
use crate::schema::Record;
use crate::value::Value;

/// DELETE statement builder.
///
/// Built from a record (`where` every key column) or addressed by table name.
pub struct DeleteQuery<'a, E> {
    db: &'a Db<E>,
    table: String,
    /// JOIN clauses
    joins: Vec<Join>,
    /// WHERE conditions
    where_builder: WhereBuilder,
}

impl<'a, E> DeleteQuery<'a, E> {
    pub(crate) fn new(db: &'a Db<E>, table: &str) -> Self {
        Self {
            db,
            table: table.to_string(),
            joins: Vec::new(),
            where_builder: WhereBuilder::new(),
        }
    }

    pub(crate) fn for_record<T: Record>(db: &'a Db<E>, model: &Model, record: &T) -> Self {
        model
            .primary_columns()
            .fold(Self::new(db, model.table()), |query, column| {
                query.and_where(
                    &format!("{} = ?", column.name),
                    vec![record.value_at(column.field)],
                )
            })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn join(mut self, text: &str) -> Self {
        self.joins.push(Join::inner(text));
        self
    }

    pub fn left_join(mut self, text: &str) -> Self {
        self.joins.push(Join::left(text));
        self
    }

    pub fn and_where(mut self, condition: &str, args: Vec<Value>) -> Self {
        self.where_builder.and(condition, args);
        self
    }

    pub fn or_where(mut self, condition: &str, args: Vec<Value>) -> Self {
        self.where_builder.or(condition, args);
        self
    }
}

impl<E> SqlBuilder for DeleteQuery<'_, E> {
    fn build(&self) -> OrmResult<BuiltQuery> {
        self.where_builder.validate()?;
        Ok(render(vec![
            Node::DeleteFrom(&self.table),
            Node::Joins(&self.joins),
            Node::Where(&self.where_builder),
        ]))
    }
}

impl<E: Executor> DeleteQuery<'_, E> {
    pub async fn exec(&self) -> OrmResult<ExecResult> {
        let query = self.build()?;
        self.db.run_exec(&query).await
    }
}
