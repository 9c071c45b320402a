use super::render::{Join, Node, render};
use super::traits::BuiltQuery;
use super::where_builder::WhereBuilder;
use crate::bind;
use crate::client::Executor;
use crate::db::Db;
use crate::error::{OrmError, OrmResult};
use crate::registry::Model;
use crate::schema::Record;
use crate::value::Value;

/// SELECT statement builder.
///
/// The target table comes from the destination's model, so a query is only
/// rendered once the record type is known:
///
/// ```ignore
/// let mut user = User::default();
/// db.select(&["*"]).and_where("id = ?", args![5]).get(&mut user).await?;
///
/// let mut users: Vec<Box<User>> = Vec::new();
/// db.select(&["*"])
///     .and_where("active = ?", args![true])
///     .order_by("email asc")
///     .limit(20)
///     .get_all_boxed(&mut users)
///     .await?;
/// ```
pub struct SelectQuery<'a, E> {
    db: &'a Db<E>,
    /// SELECT columns (default ["*"])
    fields: Vec<String>,
    /// JOIN clauses
    joins: Vec<Join>,
    /// WHERE conditions
    where_builder: WhereBuilder,
    /// GROUP BY clause
    group_by: Option<String>,
    /// HAVING conditions
    having: WhereBuilder,
    /// ORDER BY clauses
    order_by: Vec<String>,
    /// LIMIT (0 means none)
    limit: Option<u64>,
    /// OFFSET
    offset: Option<u64>,
}

impl<'a, E> SelectQuery<'a, E> {
    pub(crate) fn new(db: &'a Db<E>, fields: &[&str]) -> Self {
        let fields = if fields.is_empty() {
            vec!["*".to_string()]
        } else {
            fields.iter().map(|f| f.to_string()).collect()
        };
        Self {
            db,
            fields,
            joins: Vec::new(),
            where_builder: WhereBuilder::new(),
            group_by: None,
            having: WhereBuilder::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    // ==================== JOIN ====================

    /// Add ` join <text>`, e.g. `post on post.user_id = user.id`.
    pub fn join(mut self, text: &str) -> Self {
        self.joins.push(Join::inner(text));
        self
    }

    /// Add ` left join <text>`.
    pub fn left_join(mut self, text: &str) -> Self {
        self.joins.push(Join::left(text));
        self
    }

    // ==================== WHERE / HAVING ====================

    /// Append a condition joined with `and`.
    pub fn and_where(mut self, condition: &str, args: Vec<Value>) -> Self {
        self.where_builder.and(condition, args);
        self
    }

    /// Append a condition joined with `or`.
    pub fn or_where(mut self, condition: &str, args: Vec<Value>) -> Self {
        self.where_builder.or(condition, args);
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

    // ==================== Grouping, ordering & pagination ====================

    pub fn group_by(mut self, group: &str) -> Self {
        self.group_by = Some(group.to_string());
        self
    }

    /// Append an ORDER BY item, rendered verbatim (`email asc`).
    pub fn order_by(mut self, order: &str) -> Self {
        self.order_by.push(order.to_string());
        self
    }

    /// Set LIMIT. A limit of 0 clears it.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = (limit > 0).then_some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    // ==================== Rendering ====================

    fn validate(&self) -> OrmResult<()> {
        self.where_builder.validate()?;
        self.having.validate()
    }

    fn required_limit(&self, model: &Model) -> OrmResult<u64> {
        self.limit.ok_or_else(|| {
            tracing::warn!(
                target: "rowmap.sql",
                model = model.name(),
                "rejected multi-row select without a limit"
            );
            OrmError::LimitRequired
        })
    }

    fn render_for(&self, model: &Model, limit: u64) -> OrmResult<BuiltQuery> {
        self.validate()?;

        // a bare `*` is ambiguous once another table is joined
        let qualified;
        let fields: &[String] = if !self.joins.is_empty() && self.fields == ["*"] {
            qualified = model.qualified_columns();
            &qualified
        } else {
            &self.fields
        };

        Ok(render(vec![
            Node::Select(fields),
            Node::From(model.table()),
            Node::Joins(&self.joins),
            Node::Where(&self.where_builder),
            Node::GroupBy(self.group_by.as_deref()),
            Node::Having(&self.having),
            Node::OrderBy(&self.order_by),
            Node::Limit(Some(limit)),
            Node::Offset(self.offset),
        ]))
    }

    /// Render the single-row form (`limit 1`) against `T`'s table.
    pub fn build_one<T: Record>(&self) -> OrmResult<BuiltQuery> {
        let model = self.db.registry().model_of::<T>()?;
        self.render_for(&model, 1)
    }

    /// Render the multi-row form against `T`'s table; requires a limit.
    pub fn build_many<T: Record>(&self) -> OrmResult<BuiltQuery> {
        let model = self.db.registry().model_of::<T>()?;
        let limit = self.required_limit(&model)?;
        self.render_for(&model, limit)
    }
}

impl<E: Executor> SelectQuery<'_, E> {
    /// Fetch one row into `dest`. No row yields [`OrmError::NotFound`].
    pub async fn get<T: Record>(&self, dest: &mut T) -> OrmResult<()> {
        let model = self.db.registry().model_of::<T>()?;
        let query = self.render_for(&model, 1)?;
        let row = self.db.run_query_row(&query).await?;
        bind::bind_row(&model, row, dest)
    }

    /// Fetch up to `limit` rows, replacing the contents of `dest`.
    pub async fn get_all<T: Record>(&self, dest: &mut Vec<T>) -> OrmResult<()> {
        self.fetch_many(dest, |record| record).await
    }

    /// Like [`get_all`](Self::get_all), for a vector of boxed records.
    pub async fn get_all_boxed<T: Record>(&self, dest: &mut Vec<Box<T>>) -> OrmResult<()> {
        self.fetch_many(dest, Box::new).await
    }

    async fn fetch_many<T: Record, S>(&self, dest: &mut Vec<S>, wrap: fn(T) -> S) -> OrmResult<()> {
        let model = self.db.registry().model_of::<T>()?;
        let limit = self.required_limit(&model)?;
        let query = self.render_for(&model, limit)?;
        let rows = self.db.run_query(&query).await?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        *dest = bind::bind_rows(&model, rows, Some(limit), self.db.config().default_capacity, wrap)?;
        Ok(())
    }
}
