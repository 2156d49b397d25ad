use crate::{stmt::Value, Error, Result};

use indexmap::IndexMap;

/// The driver's answer to an [`super::Operation`].
#[derive(Debug)]
pub enum Response {
    /// Result rows of a query.
    Rows(Vec<Row>),
    /// Affected-row count of a write.
    Count(u64),
}

impl Response {
    pub fn into_rows(self) -> Result<Vec<Row>> {
        match self {
            Response::Rows(rows) => Ok(rows),
            Response::Count(_) => Err(Error::driver_msg("expected rows, driver returned a count")),
        }
    }

    pub fn count(&self) -> Result<u64> {
        match self {
            Response::Count(count) => Ok(*count),
            Response::Rows(_) => Err(Error::driver_msg("expected a count, driver returned rows")),
        }
    }
}

/// One result row, addressed by column name.
#[derive(Debug, Default)]
pub struct Row {
    values: IndexMap<String, Value>,
}

impl Row {
    pub fn new(values: IndexMap<String, Value>) -> Row {
        Row { values }
    }

    /// The value of a column; unknown columns are a driver contract error.
    pub fn get(&self, column: &str) -> Result<&Value> {
        self.values
            .get(column)
            .ok_or_else(|| Error::driver_msg(format!("row has no column `{column}`")))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Row {
        Row {
            values: iter.into_iter().collect(),
        }
    }
}
