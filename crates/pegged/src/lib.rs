//! A relational-object access layer for record forests linked by pegging
//! relations.
//!
//! Records declare how their nested fields relate to them (`peg` for
//! cascading ownership, `pegassoc` for a lifetime-independent link,
//! `pegassoc-many2many:<link_table>` for a restricted many-to-many). The
//! layer compiles predicate trees into single SQL statements with the
//! joins those paths require, and walks record instances structurally for
//! create, save, and delete.
//!
//! ```no_run
//! # use pegged::{c, q, Db};
//! # use pegged_core::Result;
//! # fn demo<TopLevel: pegged_core::Record + Default>(db: &Db) -> Result<()> {
//! let found: Vec<TopLevel> = q(db, c("name =", "same").and("age =", 3)).find()?;
//! # Ok(())
//! # }
//! ```

mod db;
pub use db::Db;

mod engine;
pub use engine::Order;

mod query;
pub use query::{q, Query};

pub use pegged_core::{
    record::Base,
    stmt::{c, c_group, Escape, PredicateBuilder},
    Error, Record, Result,
};
