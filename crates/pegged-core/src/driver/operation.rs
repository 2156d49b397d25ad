use crate::stmt::Value;

/// A database operation the engine hands to the driver.
#[derive(Debug, Clone)]
pub enum Operation {
    /// A parameterized SQL statement.
    Sql {
        sql: String,
        params: Vec<Value>,
        /// True when the statement produces rows; false for writes, where
        /// the response carries the affected-row count.
        returns_rows: bool,
    },
    /// Transaction control, passed through verbatim.
    Transaction(Transaction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transaction {
    Begin,
    Commit,
    Rollback,
}

impl Operation {
    pub fn query(sql: impl Into<String>, params: Vec<Value>) -> Operation {
        Operation::Sql {
            sql: sql.into(),
            params,
            returns_rows: true,
        }
    }

    pub fn execute(sql: impl Into<String>, params: Vec<Value>) -> Operation {
        Operation::Sql {
            sql: sql.into(),
            params,
            returns_rows: false,
        }
    }
}
