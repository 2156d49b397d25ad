use crate::query::Query;

use pegged_core::{
    driver::{Operation, Response, Transaction},
    stmt::{PredicateBuilder, Value},
    Connection, Error, Result,
};

use std::sync::Mutex;
use std::time::{Duration, Instant};

const DEFAULT_SLOW_THRESHOLD: Duration = Duration::from_millis(200);

/// A database handle: a boxed driver connection plus statement logging.
///
/// The handle is shared; every statement the engine issues goes through
/// [`Db::exec`], which serializes access to the connection, traces the
/// statement, and warns when it runs past the slow-statement threshold.
pub struct Db {
    conn: Mutex<Box<dyn Connection>>,
    slow_threshold: Duration,
    // Serializes interleaved saves on one handle.
    pub(crate) save_lock: Mutex<()>,
}

impl Db {
    pub fn new(conn: impl Connection + 'static) -> Db {
        Db {
            conn: Mutex::new(Box::new(conn)),
            slow_threshold: DEFAULT_SLOW_THRESHOLD,
            save_lock: Mutex::new(()),
        }
    }

    /// Overrides the slow-statement warning threshold.
    pub fn slow_threshold(mut self, threshold: Duration) -> Db {
        self.slow_threshold = threshold;
        self
    }

    /// Starts a query chain with the given predicate builders as the
    /// main-model group. Accepts a single builder or any iterable of them.
    pub fn q(&self, builders: impl IntoIterator<Item = PredicateBuilder>) -> Query<'_> {
        Query::with_builders(self, builders)
    }

    /// Starts an empty query chain.
    pub fn query(&self) -> Query<'_> {
        Query::new(self)
    }

    /// Executes one driver operation, tracing it and timing it.
    pub(crate) fn exec(&self, op: Operation) -> Result<Response> {
        let started = Instant::now();
        let trace = match &op {
            Operation::Sql { sql, params, .. } => {
                tracing::debug!(sql = %sql, params = params.len(), "exec");
                Some(sql.clone())
            }
            Operation::Transaction(tx) => {
                tracing::debug!(?tx, "transaction");
                None
            }
        };

        let result = self
            .conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .exec(op);

        let elapsed = started.elapsed();
        if elapsed >= self.slow_threshold {
            if let Some(sql) = &trace {
                tracing::warn!(sql = %sql, elapsed = ?elapsed, "slow statement");
            }
        }

        result
    }

    pub(crate) fn query_rows(
        &self,
        sql: impl Into<String>,
        params: Vec<Value>,
    ) -> Result<Vec<pegged_core::driver::Row>> {
        self.exec(Operation::query(sql, params))?.into_rows()
    }

    pub(crate) fn execute(&self, sql: impl Into<String>, params: Vec<Value>) -> Result<u64> {
        self.exec(Operation::execute(sql, params))?.count()
    }

    /// Counts via a `SELECT COUNT(*)` statement.
    pub(crate) fn query_count(&self, sql: impl Into<String>, params: Vec<Value>) -> Result<u64> {
        let rows = self.query_rows(sql, params)?;
        let row = rows
            .first()
            .ok_or_else(|| Error::driver_msg("count query returned no rows"))?;
        let value = row
            .columns()
            .next()
            .map(str::to_owned)
            .ok_or_else(|| Error::driver_msg("count query returned no columns"))?;
        Ok(row.get(&value)?.to_i64()? as u64)
    }

    /// Executes a raw statement, for schema setup and ad-hoc maintenance.
    pub fn raw(&self, sql: impl Into<String>) -> Result<()> {
        self.execute(sql, vec![]).map(|_| ())
    }

    /// Runs a raw query, for out-of-band inspection.
    pub fn raw_rows(&self, sql: impl Into<String>) -> Result<Vec<pegged_core::driver::Row>> {
        self.query_rows(sql, vec![])
    }

    /// Begins a transaction on the underlying connection.
    pub fn begin(&self) -> Result<()> {
        self.exec(Operation::Transaction(Transaction::Begin))
            .map(|_| ())
    }

    pub fn commit(&self) -> Result<()> {
        self.exec(Operation::Transaction(Transaction::Commit))
            .map(|_| ())
    }

    pub fn rollback(&self) -> Result<()> {
        self.exec(Operation::Transaction(Transaction::Rollback))
            .map(|_| ())
    }
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("slow_threshold", &self.slow_threshold)
            .finish_non_exhaustive()
    }
}
