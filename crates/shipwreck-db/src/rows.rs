//! Conversion of result rows into ordered JSON objects.
//!
//! SQLite values are converted by their runtime storage class, since a
//! column's declared type says little about what a row actually holds.
//! PostgreSQL rows never reach this module as typed values: the query is
//! wrapped in `row_to_json` and the server hands back JSON text.

use serde_json::{Map, Number, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

/// One result row, column name to value, in select-list order.
pub type JsonRow = Map<String, Value>;

pub(crate) fn sqlite_row_to_json(row: &SqliteRow) -> Result<JsonRow, sqlx::Error> {
    let mut object = Map::with_capacity(row.columns().len());

    for (index, column) in row.columns().iter().enumerate() {
        let storage_class = {
            let raw = row.try_get_raw(index)?;
            if raw.is_null() {
                None
            } else {
                Some(raw.type_info().name().to_string())
            }
        };

        let value = match storage_class.as_deref() {
            None | Some("NULL") => Value::Null,
            Some("INTEGER") => Value::from(row.try_get::<i64, _>(index)?),
            Some("REAL") => float_value(row.try_get::<f64, _>(index)?),
            Some("BLOB") => Value::String(hex::encode(row.try_get::<Vec<u8>, _>(index)?)),
            Some(_) => Value::String(row.try_get::<String, _>(index)?),
        };

        object.insert(column.name().to_string(), value);
    }

    Ok(object)
}

/// Parse one `row_to_json(..)::text` cell.
pub(crate) fn json_text_to_row(text: &str) -> Result<JsonRow, serde_json::Error> {
    serde_json::from_str(text)
}

fn float_value(v: f64) -> Value {
    Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}
