use super::render::{Assignment, Join, Node, render};
use super::traits::{BuiltQuery, SqlBuilder};
use super::where_builder::{WhereBuilder, check_placeholders};
use crate::client::{ExecResult, Executor};
use crate::db::Db;
use crate::error::{OrmError, OrmResult};
use crate::registry::Model;
use crate::schema::Record;
use crate::value::Value;

/// UPDATE statement builder.
///
/// Built either from a record (`set` every non-key column, `where` every key
/// column) or addressed by table name with caller-supplied fragments.
/// Arguments are ordered set-then-where.
pub struct UpdateQuery<'a, E> {
    db: &'a Db<E>,
    table: String,
    /// JOIN clauses, rendered before SET
    joins: Vec<Join>,
    /// SET fragments
    sets: Vec<Assignment>,
    /// WHERE conditions
    where_builder: WhereBuilder,
    /// Build error
    build_error: Option<String>,
}

impl<'a, E> UpdateQuery<'a, E> {
    pub(crate) fn new(db: &'a Db<E>, table: &str) -> Self {
        Self {
            db,
            table: table.to_string(),
            joins: Vec::new(),
            sets: Vec::new(),
            where_builder: WhereBuilder::new(),
            build_error: None,
        }
    }

    pub(crate) fn for_record<T: Record>(db: &'a Db<E>, model: &Model, record: &T) -> Self {
        let mut query = Self::new(db, model.table());
        for column in model.value_columns() {
            query = query.set(
                &format!("{} = ?", column.name),
                vec![record.value_at(column.field)],
            );
        }
        for column in model.primary_columns() {
            query = query.and_where(
                &format!("{} = ?", column.name),
                vec![record.value_at(column.field)],
            );
        }
        query
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

    /// Append a SET fragment such as `val = ?` or `hits = hits + 1`.
    pub fn set(mut self, assignment: &str, args: Vec<Value>) -> Self {
        if let Err(e) = check_placeholders(assignment, args.len()) {
            self.build_error.get_or_insert(e);
        }
        self.sets.push(Assignment {
            text: assignment.to_string(),
            args,
        });
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

    fn validate(&self) -> OrmResult<()> {
        if let Some(e) = &self.build_error {
            return Err(OrmError::validation(e.clone()));
        }
        if self.sets.is_empty() {
            return Err(OrmError::validation(format!(
                "update of {} has nothing to set",
                self.table
            )));
        }
        self.where_builder.validate()
    }
}

impl<E> SqlBuilder for UpdateQuery<'_, E> {
    fn build(&self) -> OrmResult<BuiltQuery> {
        self.validate()?;
        Ok(render(vec![
            Node::Update(&self.table),
            Node::Joins(&self.joins),
            Node::Set(&self.sets),
            Node::Where(&self.where_builder),
        ]))
    }
}

impl<E: Executor> UpdateQuery<'_, E> {
    pub async fn exec(&self) -> OrmResult<ExecResult> {
        let query = self.build()?;
        self.db.run_exec(&query).await
    }
}
