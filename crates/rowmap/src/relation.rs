//! Structural relationship inference.
//!
//! Reference-shaped fields (`Option<Box<U>>`, `Vec<Box<U>>`) are paired with
//! the field on `U` that points back. The pairing decides the kind:
//!
//! | field            | back-reference on `U` | kind         |
//! |------------------|-----------------------|--------------|
//! | `Vec<Box<U>>`    | single reference      | one-to-many  |
//! | single reference | `Vec<Box<Self>>`      | many-to-one  |
//! | `Vec<Box<U>>`    | `Vec<Box<Self>>`      | many-to-many |
//!
//! A many-to-many pair is only recognised when neither table carries a
//! `<other table>_id` column. More than one back-reference candidate is an
//! error; a field never pairs with itself.

use crate::error::{OrmError, OrmResult};
use crate::registry::Model;
use crate::schema::{FieldDef, FieldKind};
use heck::ToSnakeCase;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    OneToMany,
    ManyToOne,
    ManyToMany,
}

/// Link table of a many-to-many relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinTable {
    /// Both table names, sorted, joined with `_`
    pub name: String,
    /// Column referencing the source table
    pub source_column: String,
    /// Column referencing the target table
    pub target_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub kind: RelationKind,
    /// Model declaring the field
    pub source: &'static str,
    /// Model the field references
    pub target: &'static str,
    pub field: &'static str,
    /// Foreign key column: on the target for one-to-many, on the source for
    /// many-to-one, on the join table for many-to-many.
    pub join_column: String,
    pub join_table: Option<JoinTable>,
    join: Option<String>,
}

impl Relationship {
    /// Join fragment reaching the target from the source table, ready for
    /// `join(...)`. `None` when a side it needs has a composite key.
    pub fn join_clause(&self) -> Option<&str> {
        self.join.as_deref()
    }
}

pub(crate) fn infer(models: &[Arc<Model>]) -> OrmResult<Vec<Relationship>> {
    let mut out = Vec::new();
    for source in models {
        for (index, field) in source.schema().fields.iter().enumerate() {
            let Some(target_name) = field.kind.target() else {
                continue;
            };
            let Some(target) = models.iter().find(|m| m.name() == target_name) else {
                continue;
            };
            if let Some(rel) = classify(source, index, field, target)? {
                out.push(rel);
            }
        }
    }
    Ok(out)
}

/// Classify one reference-shaped field of `source` against `target`.
pub fn classify(
    source: &Model,
    index: usize,
    field: &FieldDef,
    target: &Model,
) -> OrmResult<Option<Relationship>> {
    let same_model = source.name() == target.name();
    let back_refs: Vec<&FieldDef> = target
        .schema()
        .fields
        .iter()
        .enumerate()
        .filter(|(j, f)| !(same_model && *j == index) && f.kind.target() == Some(source.name()))
        .filter(|(_, f)| match field.kind {
            // a single reference only pairs with a collection
            FieldKind::One(_) => matches!(f.kind, FieldKind::Many(_)),
            _ => true,
        })
        .map(|(_, f)| f)
        .collect();

    let back = match back_refs.as_slice() {
        [] => return Ok(None),
        [one] => *one,
        many => {
            return Err(OrmError::AmbiguousRelationship {
                model: source.name().to_string(),
                field: field.name.to_string(),
                target: target.name().to_string(),
                candidates: many.len(),
            });
        }
    };

    let rel = match (field.kind, back.kind) {
        (FieldKind::Many(_), FieldKind::One(_)) => {
            let join_column = foreign_key(back.name);
            let join = source.single_primary().map(|pk| {
                format!(
                    "{t} on {t}.{fk} = {s}.{pk}",
                    t = target.table(),
                    fk = join_column,
                    s = source.table(),
                    pk = pk.name
                )
            });
            Relationship {
                kind: RelationKind::OneToMany,
                source: source.name(),
                target: target.name(),
                field: field.name,
                join_column,
                join_table: None,
                join,
            }
        }
        (FieldKind::One(_), FieldKind::Many(_)) => {
            let join_column = foreign_key(field.name);
            let join = target.single_primary().map(|pk| {
                format!(
                    "{t} on {t}.{pk} = {s}.{fk}",
                    t = target.table(),
                    pk = pk.name,
                    s = source.table(),
                    fk = join_column
                )
            });
            Relationship {
                kind: RelationKind::ManyToOne,
                source: source.name(),
                target: target.name(),
                field: field.name,
                join_column,
                join_table: None,
                join,
            }
        }
        (FieldKind::Many(_), FieldKind::Many(_)) => {
            // a natural foreign key on either side rules out a link table
            if has_column(source, &format!("{}_id", target.table()))
                || has_column(target, &format!("{}_id", source.table()))
            {
                return Ok(None);
            }
            let mut tables = [source.table(), target.table()];
            tables.sort_unstable();
            let link = JoinTable {
                name: tables.join("_"),
                source_column: format!("{}_id", source.table()),
                target_column: format!("{}_id", target.table()),
            };
            let join = match (source.single_primary(), target.single_primary()) {
                (Some(spk), Some(tpk)) => Some(format!(
                    "{l} on {l}.{lsc} = {s}.{spk} join {t} on {t}.{tpk} = {l}.{ltc}",
                    l = link.name,
                    lsc = link.source_column,
                    s = source.table(),
                    spk = spk.name,
                    t = target.table(),
                    tpk = tpk.name,
                    ltc = link.target_column
                )),
                _ => None,
            };
            Relationship {
                kind: RelationKind::ManyToMany,
                source: source.name(),
                target: target.name(),
                field: field.name,
                join_column: link.target_column.clone(),
                join_table: Some(link),
                join,
            }
        }
        _ => return Ok(None),
    };
    Ok(Some(rel))
}

fn has_column(model: &Model, name: &str) -> bool {
    model.columns().iter().any(|c| c.name == name)
}

fn foreign_key(field_name: &str) -> String {
    format!("{}_id", field_name.to_snake_case())
}
