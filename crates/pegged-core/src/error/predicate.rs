use super::Error;

/// Error when a predicate cannot be constructed or compiled.
///
/// This covers operator parse failures, value/condition mismatches, mixed
/// anchors within one relation, and dotted paths where only top-level fields
/// are allowed (order-by, update set clauses).
#[derive(Debug)]
pub(super) struct PredicateInvalid {
    message: Box<str>,
}

impl std::error::Error for PredicateInvalid {}

impl core::fmt::Display for PredicateInvalid {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid predicate: {}", self.message)
    }
}

fn predicate(message: String) -> Error {
    Error::from(super::ErrorKind::Predicate(PredicateInvalid {
        message: message.into(),
    }))
}

impl Error {
    /// Creates an operator-parse error for a human predicate string.
    pub fn operator_parse(query: impl AsRef<str>) -> Error {
        predicate(format!(
            "cannot parse an operator out of `{}`",
            query.as_ref()
        ))
    }

    /// Creates a value/condition mismatch error (sequence where a scalar is
    /// required, scalar where a sequence is required, or a `BETWEEN` operand
    /// that is not a two-element sequence).
    pub fn value_mismatch(detail: impl AsRef<str>) -> Error {
        predicate(format!("value does not fit condition: {}", detail.as_ref()))
    }

    /// Creates a mixed-anchor error for a relation whose predicates designate
    /// different join anchors.
    pub fn mixed_anchors(a: impl AsRef<str>, b: impl AsRef<str>) -> Error {
        predicate(format!(
            "predicates in one relation designate different anchors (`{}` vs `{}`)",
            a.as_ref(),
            b.as_ref()
        ))
    }

    /// Creates a dotted-path error for an order-by field.
    pub fn dot_in_order(field: impl AsRef<str>) -> Error {
        predicate(format!(
            "order field `{}` must not use dot notation",
            field.as_ref()
        ))
    }

    /// Creates a dotted-path error for an update scope or set clause.
    pub fn dot_in_update(field: impl AsRef<str>) -> Error {
        predicate(format!(
            "update field `{}` must not use dot notation",
            field.as_ref()
        ))
    }

    /// Creates a generic predicate misuse error.
    pub fn predicate_misuse(detail: impl AsRef<str>) -> Error {
        predicate(detail.as_ref().to_owned())
    }
}
