//! Static record descriptors.
//!
//! A record type describes itself through [`Record::SCHEMA`]: its name, its
//! shape, and one [`FieldDef`] per declared field in declaration order. The
//! registry turns that descriptor into a [`Model`](crate::Model) once.
//!
//! `#[derive(Model)]` writes all of this; a hand-written implementation looks
//! like:
//!
//! ```ignore
//! impl Record for Tag {
//!     const SCHEMA: Schema = Schema::named(
//!         "Tag",
//!         &[FieldDef::scalar("id").primary(), FieldDef::scalar("label")],
//!     );
//!
//!     fn value_at(&self, index: usize) -> Value { ... }
//!     fn scan_at(&mut self, index: usize, value: Value) -> OrmResult<()> { ... }
//! }
//! ```

use crate::error::OrmResult;
use crate::value::Value;

/// How the record type was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `struct T { a: A, b: B }`
    Named,
    /// `struct T(A, B);`
    Tuple,
    /// `struct T;`
    Unit,
}

/// What a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A value stored in a column.
    Scalar,
    /// A single reference to another record (`Option<Box<U>>` / `Box<U>`).
    One(&'static str),
    /// A sequence of references to another record (`Vec<Box<U>>`).
    Many(&'static str),
}

impl FieldKind {
    /// Name of the referenced model, for reference-shaped fields.
    pub fn target(&self) -> Option<&'static str> {
        match self {
            FieldKind::Scalar => None,
            FieldKind::One(t) | FieldKind::Many(t) => Some(t),
        }
    }
}

/// Descriptor of one declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Field identifier as written in the struct
    pub name: &'static str,
    /// Explicit column name, replaces the snake_case default
    pub column: Option<&'static str>,
    /// Part of the primary key
    pub primary: bool,
    /// Kept on the record, never mapped to a column
    pub skip: bool,
    pub kind: FieldKind,
}

impl FieldDef {
    pub const fn scalar(name: &'static str) -> Self {
        Self {
            name,
            column: None,
            primary: false,
            skip: false,
            kind: FieldKind::Scalar,
        }
    }

    pub const fn one(name: &'static str, target: &'static str) -> Self {
        Self {
            kind: FieldKind::One(target),
            ..Self::scalar(name)
        }
    }

    pub const fn many(name: &'static str, target: &'static str) -> Self {
        Self {
            kind: FieldKind::Many(target),
            ..Self::scalar(name)
        }
    }

    pub const fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    pub const fn column(mut self, column: &'static str) -> Self {
        self.column = Some(column);
        self
    }

    pub const fn skip(mut self) -> Self {
        self.skip = true;
        self
    }

    /// Whether this field becomes a column.
    pub fn is_column(&self) -> bool {
        !self.skip && self.kind == FieldKind::Scalar
    }
}

/// Descriptor of a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    /// Type identifier, also the model name
    pub name: &'static str,
    /// Explicit table name, replaces the snake_case default
    pub table: Option<&'static str>,
    pub shape: Shape,
    pub fields: &'static [FieldDef],
}

impl Schema {
    pub const fn named(name: &'static str, fields: &'static [FieldDef]) -> Self {
        Self {
            name,
            table: None,
            shape: Shape::Named,
            fields,
        }
    }

    pub const fn table(mut self, table: &'static str) -> Self {
        self.table = Some(table);
        self
    }
}

/// A record type that can be registered, rendered into statements and bound
/// from rows.
///
/// Field positions are indices into [`Schema::fields`].
pub trait Record: Default + Send + Sync + 'static {
    const SCHEMA: Schema;

    /// Current value of the field at `index` (`Null` for non-column fields).
    fn value_at(&self, index: usize) -> Value;

    /// Store a column value into the field at `index`.
    fn scan_at(&mut self, index: usize, value: Value) -> OrmResult<()>;
}
