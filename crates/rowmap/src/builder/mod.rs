//! Statement builders.
//!
//! One builder per statement kind, all rendered by the same canonical
//! renderer into lower-case SQL with `?` placeholders.
//!
//! ## Design
//!
//! - Caller fragments (conditions, joins, ordering) are emitted verbatim.
//! - Each fragment carries its own arguments; arguments are collected in
//!   clause order while rendering.
//! - A fragment whose `?` count differs from its argument count fails the
//!   build with [`OrmError::Validation`](crate::OrmError::Validation).

mod count;
mod delete;
mod insert;
mod render;
mod select;
mod traits;
mod update;
mod where_builder;

pub use count::CountQuery;
pub use delete::DeleteQuery;
pub use insert::InsertQuery;
pub use render::{Assignment, Join, JoinKind};
pub use select::SelectQuery;
pub use traits::{BuiltQuery, SqlBuilder};
pub use update::UpdateQuery;
pub use where_builder::{Condition, Conjunction, WhereBuilder};

#[cfg(all(test, feature = "derive"))]
mod tests;
