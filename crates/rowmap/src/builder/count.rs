use super::render::{Join, Node, render};
use super::traits::{BuiltQuery, SqlBuilder};
use super::where_builder::WhereBuilder;
use crate::client::Executor;
use crate::db::Db;
use crate::error::{OrmError, OrmResult};
use crate::value::{FromValue, Value};

/// `select count(<expr>) from <table> ...`
pub struct CountQuery<'a, E> {
    db: &'a Db<E>,
    table: String,
    /// Counted expression, `*` by default
    expr: String,
    joins: Vec<Join>,
    where_builder: WhereBuilder,
    group_by: Option<String>,
    having: WhereBuilder,
}

impl<'a, E> CountQuery<'a, E> {
    pub(crate) fn new(db: &'a Db<E>, table: &str, expr: &str) -> Self {
        Self {
            db,
            table: table.to_string(),
            expr: if expr.is_empty() { "*" } else { expr }.to_string(),
            joins: Vec::new(),
            where_builder: WhereBuilder::new(),
            group_by: None,
            having: WhereBuilder::new(),
        }
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

    pub fn group_by(mut self, group: &str) -> Self {
        self.group_by = Some(group.to_string());
        self
    }

    pub fn and_having(mut self, condition: &str, args: Vec<Value>) -> Self {
        self.having.and(condition, args);
        self
    }

    pub fn or_having(mut self, condition: &str, args: Vec<Value>) -> Self {
        self.having.or(condition, args);
        self
    }
}

impl<E> SqlBuilder for CountQuery<'_, E> {
    fn build(&self) -> OrmResult<BuiltQuery> {
        self.where_builder.validate()?;
        self.having.validate()?;
        Ok(render(vec![
            Node::Count(&self.expr),
            Node::From(&self.table),
            Node::Joins(&self.joins),
            Node::Where(&self.where_builder),
            Node::GroupBy(self.group_by.as_deref()),
            Node::Having(&self.having),
        ]))
    }
}

impl<E: Executor> CountQuery<'_, E> {
    /// Run the count. With `group by` this is the count of the first group.
    pub async fn exec(&self) -> OrmResult<i64> {
        let query = self.build()?;
        let row = self.db.run_query_row(&query).await?;
        let value = row
            .into_values()
            .into_iter()
            .next()
            .ok_or_else(|| OrmError::decode("count", "count query returned no columns"))?;
        i64::from_value(value).map_err(|e| e.at_column("count"))
    }
}
