//! Core contracts of the pegged access layer: the relation-tag catalog,
//! record metadata descriptors, the predicate algebra and its SQL
//! compilation, the value model, the error taxonomy, and the driver seam.

pub mod driver;
pub use driver::Connection;

mod error;
pub use error::Error;

pub mod record;
pub use record::Record;

pub mod schema;

pub mod stmt;

pub mod tag;

/// A Result type alias that uses the layer's [`Error`] type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

// Re-exported for the `impl_record_base!` expansion and so downstream
// crates share one version of the identifier and timestamp types.
pub use jiff::Timestamp;
pub use uuid::Uuid;
