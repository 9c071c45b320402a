//! Model registry.
//!
//! Each record type is registered once; its [`Schema`] is turned into a
//! [`Model`] (table name, ordered columns, primary key positions) and cached
//! by type identity. Lookups hand out cheap `Arc<Model>` clones.

use crate::error::{OrmError, OrmResult};
use crate::relation::{self, Relationship};
use crate::schema::{FieldDef, Record, Schema, Shape};
use crate::value::Value;
use heck::ToSnakeCase;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// One mapped column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    /// Position of the backing field in [`Schema::fields`]
    pub field: usize,
    pub primary: bool,
}

/// Registered metadata for one record type.
#[derive(Debug, Clone)]
pub struct Model {
    name: &'static str,
    table: String,
    schema: Schema,
    columns: Vec<Column>,
    primary_keys: Vec<usize>,
}

impl Model {
    /// Derive the model from a record descriptor.
    pub fn from_schema(schema: Schema) -> OrmResult<Self> {
        if schema.shape != Shape::Named {
            return Err(OrmError::NotAStruct(schema.name.to_string()));
        }

        let table = match schema.table {
            Some(t) => t.to_string(),
            None => schema.name.to_snake_case(),
        };

        let columns: Vec<Column> = schema
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_column())
            .map(|(i, f)| Column {
                name: column_name(f),
                field: i,
                primary: f.primary,
            })
            .collect();

        let primary_keys: Vec<usize> = columns
            .iter()
            .filter(|c| c.primary)
            .map(|c| c.field)
            .collect();
        if primary_keys.is_empty() {
            return Err(OrmError::NoPrimaryKey(schema.name.to_string()));
        }

        Ok(Self {
            name: schema.name,
            table,
            schema,
            columns,
            primary_keys,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Columns in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Field positions of the primary key, in declaration order.
    pub fn primary_keys(&self) -> &[usize] {
        &self.primary_keys
    }

    pub fn primary_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.primary)
    }

    pub fn value_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.primary)
    }

    /// `table.column` for every column, in declaration order.
    pub fn qualified_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|c| format!("{}.{}", self.table, c.name))
            .collect()
    }

    /// The single primary key column, if the key is not composite.
    pub fn single_primary(&self) -> Option<&Column> {
        let mut keys = self.primary_columns();
        match (keys.next(), keys.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }

    /// Find a column by a bare (`email`) or qualified (`user.email`) name.
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| {
            name == c.name
                || name
                    .strip_suffix(c.name.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }

    /// Columns an insert of `record` writes: every column except a primary key
    /// still holding its zero value.
    pub fn insert_columns<'m, T: Record>(&'m self, record: &T) -> Vec<(&'m Column, Value)> {
        self.columns
            .iter()
            .map(|c| (c, record.value_at(c.field)))
            .filter(|(c, v)| !(c.primary && v.is_zero()))
            .collect()
    }
}

fn column_name(field: &FieldDef) -> String {
    match field.column {
        Some(c) => c.to_string(),
        None => field.name.to_snake_case(),
    }
}

#[derive(Default)]
struct Entries {
    by_type: HashMap<TypeId, Arc<Model>>,
    by_name: HashMap<&'static str, TypeId>,
    /// Set once relationship inference has taken its snapshot
    frozen: bool,
}

impl Entries {
    fn sorted_models(&self) -> Vec<Arc<Model>> {
        let mut models: Vec<Arc<Model>> = self.by_type.values().cloned().collect();
        models.sort_by_key(|m| m.name());
        models
    }
}

/// Registry of models, keyed by record type.
#[derive(Default)]
pub struct Registry {
    entries: RwLock<Entries>,
    relationships: OnceLock<Vec<Relationship>>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("models", &self.read().by_name.keys().collect::<Vec<_>>())
            .field("relationships", &self.relationships.get())
            .finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Register `T`, returning its model.
    pub fn register<T: Record>(&self) -> OrmResult<Arc<Model>> {
        let schema = T::SCHEMA;
        let model = Arc::new(Model::from_schema(schema)?);

        let mut entries = self.write();
        if entries.frozen {
            return Err(OrmError::RegistryFrozen(schema.name.to_string()));
        }
        let type_id = TypeId::of::<T>();
        if entries.by_type.contains_key(&type_id) || entries.by_name.contains_key(schema.name) {
            return Err(OrmError::DuplicateModel(schema.name.to_string()));
        }
        entries.by_type.insert(type_id, Arc::clone(&model));
        entries.by_name.insert(schema.name, type_id);
        drop(entries);

        tracing::debug!(
            target: "rowmap.registry",
            model = model.name(),
            table = model.table(),
            columns = model.columns().len(),
            "registered model"
        );
        Ok(model)
    }

    /// Model of `T`, failing when `T` was never registered.
    pub fn model_of<T: Record>(&self) -> OrmResult<Arc<Model>> {
        self.read()
            .by_type
            .get(&TypeId::of::<T>())
            .cloned()
            .ok_or_else(|| OrmError::UnregisteredModel(T::SCHEMA.name.to_string()))
    }

    pub fn model_by_name(&self, name: &str) -> Option<Arc<Model>> {
        let entries = self.read();
        let type_id = entries.by_name.get(name)?;
        entries.by_type.get(type_id).cloned()
    }

    pub fn contains<T: Record>(&self) -> bool {
        self.read().by_type.contains_key(&TypeId::of::<T>())
    }

    /// All models, ordered by name.
    pub fn models(&self) -> Vec<Arc<Model>> {
        self.read().sorted_models()
    }

    pub fn len(&self) -> usize {
        self.read().by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Relationships between registered models.
    ///
    /// Computed on first call; the registry rejects new models afterwards.
    pub fn relationships(&self) -> OrmResult<&[Relationship]> {
        if let Some(found) = self.relationships.get() {
            return Ok(found.as_slice());
        }
        // freezing and snapshotting share one write lock
        let models = {
            let mut entries = self.write();
            entries.frozen = true;
            entries.sorted_models()
        };
        let inferred = relation::infer(&models)?;
        tracing::debug!(
            target: "rowmap.registry",
            count = inferred.len(),
            "inferred relationships"
        );
        Ok(self.relationships.get_or_init(|| inferred).as_slice())
    }

    /// Relationship declared by `field` on model `model`, if any.
    pub fn relationship(&self, model: &str, field: &str) -> OrmResult<Option<&Relationship>> {
        Ok(self
            .relationships()?
            .iter()
            .find(|r| r.source == model && r.field == field))
    }
}
