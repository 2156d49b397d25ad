use super::{parse_query, Cond, Escape, Path, Value};
use crate::{
    schema::{Descriptor, PathTarget},
    Error, Result,
};

use indexmap::IndexSet;

/// The right-hand side of a predicate: a bound literal or a verbatim SQL
/// fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(Value),
    Escape(Escape),
}

impl From<Escape> for Operand {
    fn from(src: Escape) -> Operand {
        Operand::Escape(src)
    }
}

impl From<Value> for Operand {
    fn from(src: Value) -> Operand {
        Operand::Value(src)
    }
}

macro_rules! impl_operand_from {
    ( $( $ty:ty ),* $(,)? ) => {
        $(
            impl From<$ty> for Operand {
                fn from(src: $ty) -> Operand {
                    Operand::Value(src.into())
                }
            }
        )*
    };
}

impl_operand_from!(
    bool,
    i64,
    i32,
    i16,
    i8,
    u32,
    u16,
    f64,
    String,
    &str,
    uuid::Uuid,
    jiff::Timestamp
);

impl<T> From<Vec<T>> for Operand
where
    T: Into<Value>,
{
    fn from(src: Vec<T>) -> Operand {
        Operand::Value(src.into())
    }
}

impl<T, const N: usize> From<[T; N]> for Operand
where
    T: Into<Value>,
{
    fn from(src: [T; N]) -> Operand {
        Operand::Value(src.into())
    }
}

/// A single comparison of a field path against a literal value.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub path: Path,
    pub cond: Cond,
    pub operand: Operand,
}

impl Predicate {
    /// Builds a predicate from a human query string `<FieldPath> <OP>` and a
    /// value.
    pub fn from_query(query: &str, operand: impl Into<Operand>) -> Result<Predicate> {
        let (field, cond) = parse_query(query)?;
        Ok(Predicate {
            path: Path::parse(field),
            cond,
            operand: operand.into(),
        })
    }

    /// The join anchor this predicate attaches to: its path minus the final
    /// field segment. Empty for a top-level scalar.
    pub fn anchor(&self) -> String {
        self.path.anchor()
    }

    /// Number of path segments.
    pub fn nested_level(&self) -> usize {
        self.path.len()
    }

    /// Collects every proper prefix of the field path into `out`.
    pub fn collect_anchor_prefixes(&self, out: &mut IndexSet<String>) {
        out.extend(self.path.prefixes());
    }

    /// Compiles the predicate against a root record type into a SQL fragment
    /// and its bound values.
    ///
    /// The column alias is `"<table>".<column>` where `<table>` belongs to
    /// the record type reached at the path's parent prefix. Value/condition
    /// mismatches fail here, before any SQL executes.
    pub fn compile(&self, root: &'static Descriptor) -> Result<(String, Vec<Value>)> {
        let (table, column) = match root.resolve(&self.path)? {
            PathTarget::Column { table, column } => (table, column),
            PathTarget::Nested(target) => {
                return Err(Error::predicate_misuse(format!(
                    "path `{}` designates nested record type `{}`, not a column",
                    self.path,
                    target.type_name()
                )))
            }
        };
        let lhs = format!("\"{table}\".{column}");

        if let Operand::Escape(escape) = &self.operand {
            return Ok((format!("{lhs} {} {}", self.cond.sql_op(), escape.fragment), vec![]));
        }
        let Operand::Value(value) = &self.operand else {
            unreachable!()
        };

        match (self.cond, value) {
            (Cond::Eq | Cond::In, Value::List(_)) => {
                Ok((format!("{lhs} IN (?)"), vec![value.clone()]))
            }
            (Cond::In, other) => Err(Error::value_mismatch(format!(
                "IN requires a sequence, got {}",
                other.variant()
            ))),
            (Cond::Between, Value::List(items)) if items.len() == 2 => Ok((
                format!("{lhs} BETWEEN ? AND ?"),
                vec![items[0].clone(), items[1].clone()],
            )),
            (Cond::Between, other) => Err(Error::value_mismatch(format!(
                "BETWEEN requires a two-element sequence, got {}",
                other.variant()
            ))),
            (cond, Value::List(_)) => Err(Error::value_mismatch(format!(
                "{} requires a scalar, got a sequence",
                cond.sql_op()
            ))),
            (cond, scalar) => Ok((
                format!("{lhs} {} ?", cond.sql_op()),
                vec![scalar.clone()],
            )),
        }
    }
}
