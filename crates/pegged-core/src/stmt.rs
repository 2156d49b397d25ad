//! The predicate algebra: values, field paths, conditions, predicates, and
//! predicate relations, together with their compilation to parameterized SQL
//! fragments.

mod builder;
pub use builder::{c, c_group, PredicateBuilder};

mod cond;
pub use cond::{parse_query, Cond};

mod escape;
pub use escape::Escape;

mod path;
pub use path::Path;

mod predicate;
pub use predicate::{Operand, Predicate};

mod relation;
pub use relation::{Criteria, Logic, PredicateRelation};

mod value;
pub use value::Value;
