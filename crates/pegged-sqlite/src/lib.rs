//! SQLite driver for the pegged access layer.
//!
//! Implements the engine's [`Connection`] contract over rusqlite. Sequence
//! parameters bound to a single placeholder are expanded into one
//! placeholder per element before execution, and `PRAGMA foreign_keys` is
//! enabled so declared `ON DELETE` behavior fires.

mod value;
pub(crate) use value::Value;

use pegged_core::{
    driver::{Operation, Response, Row, Transaction},
    stmt::Value as CoreValue,
    Error, Result,
};

use rusqlite::Connection as RusqliteConnection;
use std::path::{Path, PathBuf};
use url::Url;

/// SQLite driver configuration: an in-memory database or a file path.
#[derive(Debug)]
pub enum Sqlite {
    File(PathBuf),
    InMemory,
}

impl Sqlite {
    /// Create a new SQLite driver from a `sqlite:` connection URL.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str).map_err(Error::driver)?;

        if url.scheme() != "sqlite" {
            return Err(Error::driver_msg(format!(
                "connection URL does not have a `sqlite` scheme; url={url_str}"
            )));
        }

        if url.path() == ":memory:" {
            Ok(Self::InMemory)
        } else {
            Ok(Self::File(PathBuf::from(url.path())))
        }
    }

    /// Create an in-memory SQLite database.
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    /// Open a SQLite database at the specified file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }

    /// Creates a new connection to the database.
    pub fn connect(&self) -> Result<Connection> {
        let connection = match self {
            Sqlite::File(path) => RusqliteConnection::open(path).map_err(Error::driver)?,
            Sqlite::InMemory => RusqliteConnection::open_in_memory().map_err(Error::driver)?,
        };
        connection
            .pragma_update(None, "foreign_keys", "ON")
            .map_err(Error::driver)?;
        Ok(Connection { connection })
    }
}

/// A live SQLite connection.
#[derive(Debug)]
pub struct Connection {
    connection: RusqliteConnection,
}

impl pegged_core::Connection for Connection {
    fn exec(&mut self, op: Operation) -> Result<Response> {
        match op {
            Operation::Transaction(tx) => {
                let sql = match tx {
                    Transaction::Begin => "BEGIN",
                    Transaction::Commit => "COMMIT",
                    Transaction::Rollback => "ROLLBACK",
                };
                self.connection.execute_batch(sql).map_err(Error::driver)?;
                Ok(Response::Count(0))
            }
            Operation::Sql {
                sql,
                params,
                returns_rows,
            } => {
                let (sql, params) = expand_sequences(&sql, params)?;
                let params: Vec<Value> = params.into_iter().map(Value::from).collect();
                let mut stmt = self.connection.prepare(&sql).map_err(Error::driver)?;

                for (i, param) in params.iter().enumerate() {
                    stmt.raw_bind_parameter(i + 1, param)
                        .map_err(Error::driver)?;
                }

                if returns_rows {
                    let columns: Vec<String> =
                        stmt.column_names().iter().map(|s| s.to_string()).collect();
                    let mut rows = stmt.raw_query();
                    let mut out = Vec::new();
                    while let Some(row) = rows.next().map_err(Error::driver)? {
                        let mut values = Vec::with_capacity(columns.len());
                        for (i, column) in columns.iter().enumerate() {
                            let value = Value::from_sql(row, i).map_err(Error::driver)?;
                            values.push((column.clone(), value));
                        }
                        out.push(values.into_iter().collect::<Row>());
                    }
                    Ok(Response::Rows(out))
                } else {
                    let count = stmt.raw_execute().map_err(Error::driver)?;
                    Ok(Response::Count(count as u64))
                }
            }
        }
    }
}

/// Rewrites `?` placeholders bound to sequence values into one placeholder
/// per element and flattens the parameter list to match.
///
/// The engine never emits `?` inside string literals, so a plain scan over
/// the statement text is sufficient.
fn expand_sequences(sql: &str, params: Vec<CoreValue>) -> Result<(String, Vec<CoreValue>)> {
    if !params.iter().any(CoreValue::is_list) {
        return Ok((sql.to_owned(), params));
    }

    let mut out = String::with_capacity(sql.len());
    let mut flat = Vec::with_capacity(params.len());
    let mut next = params.into_iter();

    for ch in sql.chars() {
        if ch != '?' {
            out.push(ch);
            continue;
        }
        match next.next() {
            Some(CoreValue::List(items)) => {
                if items.is_empty() {
                    // IN over an empty sequence matches nothing
                    out.push_str("SELECT NULL WHERE 0");
                    continue;
                }
                for (i, item) in items.into_iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push('?');
                    flat.push(item);
                }
            }
            Some(value) => {
                out.push('?');
                flat.push(value);
            }
            None => {
                return Err(Error::driver_msg(
                    "statement has more placeholders than parameters",
                ))
            }
        }
    }

    if next.next().is_some() {
        return Err(Error::driver_msg(
            "statement has fewer placeholders than parameters",
        ));
    }

    Ok((out, flat))
}
