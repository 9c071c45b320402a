//! `Executor` implementations for tokio-postgres (and deadpool-postgres with
//! the `pool` feature).
//!
//! Statements are rendered with `?` placeholders; they are renumbered to
//! `$1, $2, ...` here, skipping quoted literals and identifiers. Postgres does
//! not report generated identifiers for plain inserts; an insert that leaves
//! its key to the database gets a `returning <key>` clause instead, and the
//! returned value fills [`ExecResult::last_insert_id`].

use crate::client::{ExecResult, Executor, Rows};
use crate::error::{OrmError, OrmResult};
use crate::value::{FromValue, Value};
use bytes::BytesMut;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::borrow::Cow;
use std::error::Error;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// Rewrite `?` placeholders to `$n`, leaving quoted text alone.
pub fn number_placeholders(sql: &str) -> Cow<'_, str> {
    if !sql.contains('?') {
        return Cow::Borrowed(sql);
    }

    let mut out = String::with_capacity(sql.len() + 8);
    let mut quote: Option<char> = None;
    let mut n = 0;
    for ch in sql.chars() {
        match (quote, ch) {
            (None, '\'' | '"') => {
                quote = Some(ch);
                out.push(ch);
            }
            (Some(q), c) if c == q => {
                quote = None;
                out.push(ch);
            }
            (None, '?') => {
                n += 1;
                out.push('$');
                out.push_str(&n.to_string());
            }
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Int(v) => match *ty {
                Type::INT2 => i16::try_from(*v)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*v)?.to_sql(ty, out),
                Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                Type::FLOAT8 => (*v as f64).to_sql(ty, out),
                Type::TEXT | Type::VARCHAR => v.to_string().to_sql(ty, out),
                _ => v.to_sql(ty, out),
            },
            Value::UInt(v) => match *ty {
                Type::INT2 => i16::try_from(*v)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*v)?.to_sql(ty, out),
                Type::OID => u32::try_from(*v)?.to_sql(ty, out),
                Type::TEXT | Type::VARCHAR => v.to_string().to_sql(ty, out),
                _ => i64::try_from(*v)?.to_sql(ty, out),
            },
            Value::Float(v) => match *ty {
                Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                _ => v.to_sql(ty, out),
            },
            Value::Bool(v) => v.to_sql(ty, out),
            Value::Text(v) => v.to_sql(ty, out),
            Value::Bytes(v) => v.to_sql(ty, out),
            Value::Time(v) => match *ty {
                Type::TIMESTAMP => v.naive_utc().to_sql(ty, out),
                _ => v.to_sql(ty, out),
            },
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

fn decode_column(row: &tokio_postgres::Row, index: usize) -> OrmResult<Value> {
    let column = &row.columns()[index];
    let decoded = match *column.type_() {
        Type::BOOL => row.try_get::<_, Option<bool>>(index).map(|v| v.map(Value::Bool)),
        Type::INT2 => row
            .try_get::<_, Option<i16>>(index)
            .map(|v| v.map(|n| Value::Int(n.into()))),
        Type::INT4 => row
            .try_get::<_, Option<i32>>(index)
            .map(|v| v.map(|n| Value::Int(n.into()))),
        Type::INT8 => row.try_get::<_, Option<i64>>(index).map(|v| v.map(Value::Int)),
        Type::OID => row
            .try_get::<_, Option<u32>>(index)
            .map(|v| v.map(|n| Value::UInt(n.into()))),
        Type::FLOAT4 => row
            .try_get::<_, Option<f32>>(index)
            .map(|v| v.map(|n| Value::Float(n.into()))),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(index).map(|v| v.map(Value::Float)),
        Type::BYTEA => row.try_get::<_, Option<Vec<u8>>>(index).map(|v| v.map(Value::Bytes)),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(index)
            .map(|v| v.map(Value::Time)),
        Type::TIMESTAMP => row
            .try_get::<_, Option<NaiveDateTime>>(index)
            .map(|v| v.map(|t| Value::Time(t.and_utc()))),
        _ => row.try_get::<_, Option<String>>(index).map(|v| v.map(Value::Text)),
    };
    decoded
        .map(|v| v.unwrap_or(Value::Null))
        .map_err(|e| OrmError::decode(column.name(), e.to_string()))
}

fn convert_rows(rows: Vec<tokio_postgres::Row>) -> OrmResult<Rows> {
    let Some(first) = rows.first() else {
        return Ok(Rows::empty());
    };
    let columns: Vec<String> = first.columns().iter().map(|c| c.name().to_string()).collect();
    let values = rows
        .iter()
        .map(|row| {
            (0..row.len())
                .map(|i| decode_column(row, i))
                .collect::<OrmResult<Vec<Value>>>()
        })
        .collect::<OrmResult<Vec<Vec<Value>>>>()?;
    Ok(Rows::new(columns, values))
}

fn params(args: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    args.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

async fn pg_exec<C>(client: &C, sql: &str, args: &[Value]) -> OrmResult<ExecResult>
where
    C: tokio_postgres::GenericClient + Sync,
{
    let sql = number_placeholders(sql);
    let rows_affected = client.execute(sql.as_ref(), &params(args)).await?;
    Ok(ExecResult {
        rows_affected,
        last_insert_id: None,
    })
}

async fn pg_query<C>(client: &C, sql: &str, args: &[Value]) -> OrmResult<Rows>
where
    C: tokio_postgres::GenericClient + Sync,
{
    let sql = number_placeholders(sql);
    let rows = client.query(sql.as_ref(), &params(args)).await?;
    convert_rows(rows)
}

/// Renumber placeholders and ask for the database-assigned key back.
pub fn returning_sql(sql: &str, key_column: &str) -> String {
    format!("{} returning {key_column}", number_placeholders(sql))
}

async fn pg_insert_returning<C>(
    client: &C,
    sql: &str,
    args: &[Value],
    key_column: &str,
) -> OrmResult<ExecResult>
where
    C: tokio_postgres::GenericClient + Sync,
{
    let sql = returning_sql(sql, key_column);
    let rows = client.query(sql.as_str(), &params(args)).await?;
    // non-integer keys (uuid, text) are inserted but not written back
    let last_insert_id = rows
        .first()
        .and_then(|row| decode_column(row, 0).ok())
        .and_then(|value| i64::from_value(value).ok());
    Ok(ExecResult {
        rows_affected: rows.len() as u64,
        last_insert_id,
    })
}

impl Executor for tokio_postgres::Client {
    async fn exec(&self, sql: &str, args: &[Value]) -> OrmResult<ExecResult> {
        pg_exec(self, sql, args).await
    }

    async fn query(&self, sql: &str, args: &[Value]) -> OrmResult<Rows> {
        pg_query(self, sql, args).await
    }

    async fn insert_returning(
        &self,
        sql: &str,
        args: &[Value],
        key_column: &str,
    ) -> OrmResult<ExecResult> {
        pg_insert_returning(self, sql, args, key_column).await
    }
}

impl Executor for tokio_postgres::Transaction<'_> {
    async fn exec(&self, sql: &str, args: &[Value]) -> OrmResult<ExecResult> {
        pg_exec(self, sql, args).await
    }

    async fn query(&self, sql: &str, args: &[Value]) -> OrmResult<Rows> {
        pg_query(self, sql, args).await
    }

    async fn insert_returning(
        &self,
        sql: &str,
        args: &[Value],
        key_column: &str,
    ) -> OrmResult<ExecResult> {
        pg_insert_returning(self, sql, args, key_column).await
    }
}

// ===== deadpool-postgres support =====

#[cfg(feature = "pool")]
impl Executor for deadpool_postgres::Client {
    async fn exec(&self, sql: &str, args: &[Value]) -> OrmResult<ExecResult> {
        // Delegate to the deref target (tokio_postgres::Client).
        let client: &tokio_postgres::Client = self;
        pg_exec(client, sql, args).await
    }

    async fn query(&self, sql: &str, args: &[Value]) -> OrmResult<Rows> {
        let client: &tokio_postgres::Client = self;
        pg_query(client, sql, args).await
    }

    async fn insert_returning(
        &self,
        sql: &str,
        args: &[Value],
        key_column: &str,
    ) -> OrmResult<ExecResult> {
        let client: &tokio_postgres::Client = self;
        pg_insert_returning(client, sql, args, key_column).await
    }
}
