use pegged_core::stmt::Value as CoreValue;

use rusqlite::{
    types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef},
    Row,
};

/// A core value adapted to rusqlite's parameter and column interfaces.
///
/// Identifiers and timestamps are stored as text; record hydration parses
/// them back by the column's expected type.
#[derive(Debug)]
pub struct Value(CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl Value {
    /// Converts a SQLite value within a row to a core value.
    pub fn from_sql(row: &Row<'_>, index: usize) -> rusqlite::Result<CoreValue> {
        let value = match row.get_ref(index)? {
            ValueRef::Null => CoreValue::Null,
            ValueRef::Integer(value) => CoreValue::I64(value),
            ValueRef::Real(value) => CoreValue::F64(value),
            ValueRef::Text(value) => {
                CoreValue::String(String::from_utf8_lossy(value).into_owned())
            }
            ValueRef::Blob(value) => CoreValue::Bytes(value.to_vec()),
        };
        Ok(value)
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        use CoreValue::*;

        match &self.0 {
            Bool(true) => Ok(ToSqlOutput::Owned(SqlValue::Integer(1))),
            Bool(false) => Ok(ToSqlOutput::Owned(SqlValue::Integer(0))),
            I64(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v))),
            F64(v) => Ok(ToSqlOutput::Owned(SqlValue::Real(*v))),
            String(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes()))),
            Bytes(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Blob(&v[..]))),
            Uuid(v) => Ok(ToSqlOutput::Owned(SqlValue::Text(v.to_string()))),
            Timestamp(v) => Ok(ToSqlOutput::Owned(SqlValue::Text(v.to_string()))),
            Null => Ok(ToSqlOutput::Owned(SqlValue::Null)),
            List(_) => Err(rusqlite::Error::ToSqlConversionFailure(
                "sequence values must be expanded before binding".into(),
            )),
        }
    }
}
