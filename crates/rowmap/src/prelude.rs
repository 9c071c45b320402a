//! Convenient imports for typical `rowmap` usage.
//!
//! ```ignore
//! use rowmap::prelude::*;
//! ```

pub use crate::{
    Db, DbConfig, ExecResult, Executor, FromValue, Null, OrmError, OrmResult, Record, Rows,
    SqlBuilder, ToValue, Value, args,
};

pub use crate::{
    NullBool, NullBytes, NullFloat32, NullFloat64, NullInt, NullInt32, NullInt64, NullString,
    NullTime, NullUint, NullUint32, NullUint64,
};

pub use crate::Model;
