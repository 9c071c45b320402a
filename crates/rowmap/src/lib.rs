//! # rowmap
//!
//! A registry-driven relational mapper.
//!
//! ## Features
//!
//! - **Register once**: a record type's table, columns and primary key are
//!   derived from its descriptor and cached by type identity
//! - **Fluent statements**: select/insert/update/delete/count builders render
//!   deterministic SQL with `?` placeholders and correctly ordered arguments
//! - **Bind by name**: returned columns (bare or `table.column`) are matched to
//!   fields, for single records, `Vec<T>` and `Vec<Box<T>>`
//! - **Nullable adapters**: `Null<T>` bridges SQL `NULL` and JSON `null`
//! - **Relationships**: one-to-many, many-to-one and many-to-many links are
//!   inferred from reference-shaped fields
//! - **Transaction-friendly**: pass a transaction anywhere an [`Executor`] is
//!   expected
//!
//! ## Example
//!
//! ```ignore
//! use rowmap::prelude::*;
//!
//! #[derive(Debug, Default, Model)]
//! struct User {
//!     #[rowmap(primary)]
//!     id: i64,
//!     email: String,
//!     active: bool,
//! }
//!
//! let db = Db::new(client);
//! db.register::<User>()?;
//!
//! let mut user = User::default();
//! db.select(&["*"]).and_where("id = ?", args![5]).get(&mut user).await?;
//!
//! let mut users: Vec<User> = Vec::new();
//! db.select(&["*"])
//!     .and_where("active = ?", args![true])
//!     .order_by("email asc")
//!     .limit(50)
//!     .get_all(&mut users)
//!     .await?;
//! ```

// Lets `#[derive(Model)]` output (which names `::rowmap`) compile inside this crate.
extern crate self as rowmap;

mod bind;
pub mod builder;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod mock;
pub mod null;
pub mod prelude;
pub mod registry;
pub mod relation;
pub mod schema;
pub mod value;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use builder::{
    BuiltQuery, CountQuery, DeleteQuery, InsertQuery, SelectQuery, SqlBuilder, UpdateQuery,
};
pub use client::{ExecResult, Executor, Row, Rows};
pub use config::DbConfig;
pub use db::Db;
pub use error::{OrmError, OrmResult};
pub use null::{
    Null, NullBool, NullBytes, NullFloat32, NullFloat64, NullInt, NullInt32, NullInt64,
    NullString, NullTime, NullUint, NullUint32, NullUint64,
};
pub use registry::{Column, Model, Registry};
pub use relation::{JoinTable, RelationKind, Relationship};
pub use schema::{FieldDef, FieldKind, Record, Schema, Shape};
pub use value::{FromValue, ToValue, Value};

#[cfg(feature = "derive")]
pub use rowmap_derive::Model;
