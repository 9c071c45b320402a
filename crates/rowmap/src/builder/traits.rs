use crate::error::OrmResult;
use crate::value::Value;

/// Rendered SQL text with its positional arguments, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub args: Vec<Value>,
}

impl BuiltQuery {
    pub fn new(sql: String, args: Vec<Value>) -> Self {
        Self { sql, args }
    }
}

/// Base trait for statement builders whose rendering does not depend on a
/// destination type.
pub trait SqlBuilder {
    /// Render the statement. Rendering twice yields identical output.
    fn build(&self) -> OrmResult<BuiltQuery>;

    /// Debug helper.
    fn to_sql(&self) -> OrmResult<String> {
        self.build().map(|q| q.sql)
    }
}
