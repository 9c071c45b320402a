//! Result binding: returned columns are matched to model fields by name.

use crate::client::{Row, Rows};
use crate::error::{OrmError, OrmResult};
use crate::registry::Model;
use crate::schema::Record;
use crate::value::Value;

/// Field position for every returned column, resolved once per result set.
#[derive(Debug)]
pub(crate) struct ColumnMap<'c> {
    columns: &'c [String],
    fields: Vec<usize>,
}

impl<'c> ColumnMap<'c> {
    pub(crate) fn resolve(model: &Model, columns: &'c [String]) -> OrmResult<Self> {
        let fields = columns
            .iter()
            .map(|name| {
                model
                    .find_column(name)
                    .map(|c| c.field)
                    .ok_or_else(|| OrmError::UnknownColumn {
                        model: model.name().to_string(),
                        column: name.clone(),
                    })
            })
            .collect::<OrmResult<Vec<_>>>()?;
        Ok(Self { columns, fields })
    }

    pub(crate) fn scan<T: Record>(&self, record: &mut T, values: Vec<Value>) -> OrmResult<()> {
        if values.len() != self.fields.len() {
            return Err(OrmError::decode(
                "",
                format!(
                    "row has {} values for {} columns",
                    values.len(),
                    self.fields.len()
                ),
            ));
        }
        for ((field, column), value) in self.fields.iter().zip(self.columns).zip(values) {
            record
                .scan_at(*field, value)
                .map_err(|e| e.at_column(column))?;
        }
        Ok(())
    }
}

/// Scan a single row into `dest`. Fields with no returned column keep their
/// current values.
pub(crate) fn bind_row<T: Record>(model: &Model, row: Row, dest: &mut T) -> OrmResult<()> {
    let columns = row.columns().to_vec();
    let map = ColumnMap::resolve(model, &columns)?;
    map.scan(dest, row.into_values())
}

/// Scan up to `limit` rows into fresh records.
///
/// With a limit the output is allocated for `min(limit, rows)`; without one it
/// starts at `default_capacity` and grows geometrically.
pub(crate) fn bind_rows<T: Record, S>(
    model: &Model,
    rows: Rows,
    limit: Option<usize>,
    default_capacity: usize,
    wrap: fn(T) -> S,
) -> OrmResult<Vec<S>> {
    let columns = rows.columns().to_vec();
    let map = ColumnMap::resolve(model, &columns)?;

    let capacity = match limit {
        Some(n) => n.min(rows.len()),
        None => default_capacity,
    };
    let mut out = Vec::with_capacity(capacity);
    for row in rows.into_iter().take(limit.unwrap_or(usize::MAX)) {
        let mut record = T::default();
        map.scan(&mut record, row.into_values())?;
        out.push(wrap(record));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDef, Schema};

    #[derive(Debug, Default, PartialEq)]
    struct Item {
        id: i64,
        label: String,
    }

    impl Record for Item {
        const SCHEMA: Schema = Schema::named(
            "Item",
            &[FieldDef::scalar("id").primary(), FieldDef::scalar("label")],
        );

        fn value_at(&self, index: usize) -> Value {
            match index {
                0 => Value::Int(self.id),
                1 => Value::Text(self.label.clone()),
                _ => Value::Null,
            }
        }

        fn scan_at(&mut self, index: usize, value: Value) -> OrmResult<()> {
            use crate::value::FromValue;
            match index {
                0 => self.id = i64::from_value(value)?,
                1 => self.label = String::from_value(value)?,
                _ => {}
            }
            Ok(())
        }
    }

    fn model() -> Model {
        Model::from_schema(Item::SCHEMA).unwrap()
    }

    #[test]
    fn binds_columns_in_any_order_and_qualified() {
        let rows = Rows::new(
            ["item.label", "id"],
            vec![vec![Value::Text("a".into()), Value::Int(3)]],
        );
        let row = rows.into_first().unwrap();
        let mut item = Item::default();
        bind_row(&model(), row, &mut item).unwrap();
        assert_eq!(
            item,
            Item {
                id: 3,
                label: "a".into()
            }
        );
    }

    #[test]
    fn partial_columns_leave_other_fields() {
        let row = Rows::new(["label"], vec![vec![Value::Text("b".into())]])
            .into_first()
            .unwrap();
        let mut item = Item {
            id: 9,
            label: String::new(),
        };
        bind_row(&model(), row, &mut item).unwrap();
        assert_eq!(item.id, 9);
        assert_eq!(item.label, "b");
    }

    #[test]
    fn unknown_column_aborts() {
        let rows = Rows::new(["id", "extra"], vec![vec![Value::Int(1), Value::Int(2)]]);
        let err = bind_rows(&model(), rows, Some(10), 8, |i: Item| i).unwrap_err();
        assert!(matches!(err, OrmError::UnknownColumn { ref column, .. } if column == "extra"));
    }

    #[test]
    fn stops_at_the_limit() {
        let rows = Rows::new(
            ["id", "label"],
            (1..=5)
                .map(|i| vec![Value::Int(i), Value::Text(format!("n{i}"))])
                .collect(),
        );
        let out: Vec<Box<Item>> = bind_rows(&model(), rows, Some(2), 8, Box::new).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].id, 2);
    }

    #[test]
    fn decode_errors_name_the_column() {
        let row = Rows::new(["label"], vec![vec![Value::Int(1)]])
            .into_first()
            .unwrap();
        let err = bind_row(&model(), row, &mut Item::default()).unwrap_err();
        assert!(matches!(err, OrmError::Decode { ref column, .. } if column == "label"));
    }
}
