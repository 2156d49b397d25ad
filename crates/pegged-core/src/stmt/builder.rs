use super::{Criteria, Logic, Operand, Predicate, PredicateRelation};
use crate::Result;

/// Entry point for building a predicate relation:
/// `c("age >", 20).and("name =", "buddy")`.
///
/// One builder covers one logical level, which means one join anchor;
/// predicates for a different anchor go in a separate builder passed
/// alongside.
pub fn c(query: &str, operand: impl Into<Operand>) -> PredicateBuilder {
    PredicateBuilder {
        state: Predicate::from_query(query, operand).map(PredicateRelation::single),
    }
}

/// Wraps an already-built relation as a grouped child, preserving its own
/// parenthesization: `c_group(c("name =", "a").or("name =", "b")).and(...)`.
pub fn c_group(inner: PredicateBuilder) -> PredicateBuilder {
    PredicateBuilder {
        state: inner.state.map(|rel| PredicateRelation {
            criteria: vec![Criteria::Rel(rel)],
            logics: vec![],
        }),
    }
}

/// Builds a [`PredicateRelation`] by chaining `and`/`or`, carrying its first
/// error internally; chained calls after an error are no-ops and the error
/// surfaces when the relation is consumed.
#[derive(Debug, Clone)]
pub struct PredicateBuilder {
    state: Result<PredicateRelation>,
}

impl PredicateBuilder {
    pub fn and(self, query: &str, operand: impl Into<Operand>) -> Self {
        self.append(Logic::And, query, operand)
    }

    pub fn or(self, query: &str, operand: impl Into<Operand>) -> Self {
        self.append(Logic::Or, query, operand)
    }

    pub fn and_group(self, inner: PredicateBuilder) -> Self {
        self.append_group(Logic::And, inner)
    }

    pub fn or_group(self, inner: PredicateBuilder) -> Self {
        self.append_group(Logic::Or, inner)
    }

    fn append(mut self, logic: Logic, query: &str, operand: impl Into<Operand>) -> Self {
        self.state = self.state.and_then(|mut rel| {
            let pred = Predicate::from_query(query, operand)?;
            rel.push(logic, Criteria::Pred(pred));
            Ok(rel)
        });
        self
    }

    fn append_group(mut self, logic: Logic, inner: PredicateBuilder) -> Self {
        self.state = self.state.and_then(|mut rel| {
            rel.push(logic, Criteria::Rel(inner.relation()?));
            Ok(rel)
        });
        self
    }

    /// Consumes the builder, yielding the relation or the first error.
    pub fn relation(self) -> Result<PredicateRelation> {
        self.state
    }
}

impl From<PredicateRelation> for PredicateBuilder {
    fn from(rel: PredicateRelation) -> Self {
        PredicateBuilder { state: Ok(rel) }
    }
}

/// Lets a single builder be passed wherever a group of builders is accepted.
impl IntoIterator for PredicateBuilder {
    type Item = PredicateBuilder;
    type IntoIter = std::iter::Once<PredicateBuilder>;

    fn into_iter(self) -> Self::IntoIter {
        std::iter::once(self)
    }
}
