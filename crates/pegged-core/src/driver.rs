//! The database handle contract.
//!
//! The engine compiles every terminal into a sequence of parameterized SQL
//! operations and hands them to a [`Connection`]; drivers own statement
//! execution and nothing else. Transactions pass through so a caller can
//! scope multi-step mutations; the engine treats the handle uniformly either
//! way.

pub mod operation;
pub use operation::{Operation, Transaction};

mod response;
pub use response::{Response, Row};

use std::fmt::Debug;

/// A single database connection.
///
/// Drivers must expand a [`crate::stmt::Value::List`] parameter bound to one
/// placeholder into one placeholder per element; the engine always compiles
/// `IN (?)` with the whole sequence bound as a unit.
pub trait Connection: Debug + Send {
    /// Execute a database operation.
    fn exec(&mut self, op: Operation) -> crate::Result<Response>;
}
