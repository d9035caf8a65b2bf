//! Conversion between `FieldValue` and database values.

use anyhow::Context as _;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{DbErr, QueryResult, Value};
use uuid::Uuid;

use rollcall_domain::{FieldKind, FieldValue};

use crate::error::StoreError;

/// Bind value for a column of `kind`. Nulls are typed so every backend accepts them.
pub fn to_db_value(kind: FieldKind, value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => match kind {
            FieldKind::Uuid => Option::<Uuid>::None.into(),
            FieldKind::Int => Option::<i32>::None.into(),
            FieldKind::Date => Option::<NaiveDate>::None.into(),
            FieldKind::Timestamp => Option::<DateTime<Utc>>::None.into(),
            FieldKind::Text | FieldKind::Role | FieldKind::Status => {
                Option::<String>::None.into()
            }
        },
        FieldValue::Uuid(v) => (*v).into(),
        FieldValue::Text(v) => v.clone().into(),
        FieldValue::Int(v) => (*v).into(),
        FieldValue::Date(v) => (*v).into(),
        FieldValue::Timestamp(v) => (*v).into(),
        FieldValue::Role(v) => v.as_str().into(),
        FieldValue::Status(v) => v.as_str().into(),
    }
}

/// Read a column of `kind` from a raw result row.
pub fn decode(row: &QueryResult, alias: &str, kind: FieldKind) -> Result<FieldValue, StoreError> {
    let value = match kind {
        FieldKind::Uuid => get::<Uuid>(row, alias)?.into(),
        FieldKind::Text => get::<String>(row, alias)?.into(),
        FieldKind::Int => get::<i32>(row, alias)?.into(),
        FieldKind::Date => get::<NaiveDate>(row, alias)?.into(),
        FieldKind::Timestamp => get::<DateTime<Utc>>(row, alias)?.into(),
        FieldKind::Role => match get::<String>(row, alias)? {
            Some(s) => FieldValue::Role(s.parse().context("decode role")?),
            None => FieldValue::Null,
        },
        FieldKind::Status => match get::<String>(row, alias)? {
            Some(s) => FieldValue::Status(s.parse().context("decode status")?),
            None => FieldValue::Null,
        },
    };
    Ok(value)
}

pub fn get<T>(row: &QueryResult, alias: &str) -> Result<Option<T>, StoreError>
where
    Option<T>: sea_orm::TryGetable,
{
    row.try_get::<Option<T>>("", alias)
        .map_err(|e: DbErr| anyhow::Error::new(e).context(format!("read column {alias}")))
        .map_err(StoreError::Internal)
}
