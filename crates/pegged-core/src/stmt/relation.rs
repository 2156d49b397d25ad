use super::{Predicate, Value};
use crate::{
    schema::{Descriptor, PathTarget},
    stmt::Path,
    Error, Result,
};

use indexmap::IndexSet;

/// Binary logical operator combining adjacent criteria in a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logic {
    And,
    Or,
}

impl Logic {
    pub fn sql_op(self) -> &'static str {
        match self {
            Logic::And => "AND",
            Logic::Or => "OR",
        }
    }
}

/// A leaf predicate or a nested sub-relation.
#[derive(Debug, Clone, PartialEq)]
pub enum Criteria {
    Pred(Predicate),
    Rel(PredicateRelation),
}

/// A tree of predicates: N children joined left-to-right by N-1 logical
/// operators. Parentheses are emitted around every child when there is more
/// than one.
///
/// All predicates inside one relation must designate the same join anchor;
/// predicates for a different anchor belong in a separate relation passed
/// alongside.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateRelation {
    pub criteria: Vec<Criteria>,
    pub logics: Vec<Logic>,
}

impl PredicateRelation {
    pub fn single(pred: Predicate) -> PredicateRelation {
        PredicateRelation {
            criteria: vec![Criteria::Pred(pred)],
            logics: vec![],
        }
    }

    pub fn push(&mut self, logic: Logic, criteria: Criteria) {
        if !self.criteria.is_empty() {
            self.logics.push(logic);
        }
        self.criteria.push(criteria);
    }

    fn for_each_predicate<'a>(&'a self, f: &mut impl FnMut(&'a Predicate)) {
        for criteria in &self.criteria {
            match criteria {
                Criteria::Pred(pred) => f(pred),
                Criteria::Rel(rel) => rel.for_each_predicate(f),
            }
        }
    }

    /// The unique join anchor shared by every predicate at this logical
    /// level. Empty string when every predicate is a top-level scalar.
    /// Mixed anchors are an error.
    pub fn anchor(&self) -> Result<String> {
        let mut anchor: Option<String> = None;
        let mut mixed: Option<Error> = None;
        self.for_each_predicate(&mut |pred| {
            let this = pred.anchor();
            match &anchor {
                None => anchor = Some(this),
                Some(prev) if *prev != this && mixed.is_none() => {
                    mixed = Some(Error::mixed_anchors(prev.clone(), this));
                }
                Some(_) => {}
            }
        });
        if let Some(err) = mixed {
            return Err(err);
        }
        Ok(anchor.unwrap_or_default())
    }

    /// True when the relation's predicates designate a nested anchor.
    pub fn is_nested(&self) -> Result<bool> {
        Ok(!self.anchor()?.is_empty())
    }

    /// The record type reached by following the anchor path from `root`.
    pub fn anchor_target(&self, root: &'static Descriptor) -> Result<&'static Descriptor> {
        let anchor = self.anchor()?;
        if anchor.is_empty() {
            return Ok(root);
        }
        match root.resolve(&Path::parse(&anchor))? {
            PathTarget::Nested(target) => Ok(target),
            PathTarget::Column { table, .. } => Err(Error::predicate_misuse(format!(
                "anchor `{anchor}` resolves to column `{table}`, not a record type"
            ))),
        }
    }

    /// Every proper prefix of every multi-segment field path in the tree,
    /// in first-appearance order. The planner derives the required join
    /// chain from this set.
    pub fn anchor_prefixes(&self) -> IndexSet<String> {
        let mut out = IndexSet::new();
        self.for_each_predicate(&mut |pred| pred.collect_anchor_prefixes(&mut out));
        out
    }

    /// Maximum segment count of any predicate's field path.
    pub fn nested_level(&self) -> usize {
        let mut max = 0;
        self.for_each_predicate(&mut |pred| max = max.max(pred.nested_level()));
        max
    }

    /// Compiles the relation against a root record type.
    ///
    /// A sole child is emitted bare; otherwise every child is wrapped in
    /// parentheses: `(<c1>) <op> (<c2>) …`. Bound values concatenate in
    /// child order. Anchor uniqueness is validated first.
    pub fn compile(&self, root: &'static Descriptor) -> Result<(String, Vec<Value>)> {
        self.anchor()?;
        self.compile_unchecked(root)
    }

    fn compile_unchecked(&self, root: &'static Descriptor) -> Result<(String, Vec<Value>)> {
        if self.criteria.is_empty() {
            return Err(Error::predicate_misuse("relation has no predicates"));
        }

        let mut parts = Vec::with_capacity(self.criteria.len());
        let mut values = Vec::new();
        for criteria in &self.criteria {
            let (sql, vals) = match criteria {
                Criteria::Pred(pred) => pred.compile(root)?,
                Criteria::Rel(rel) => rel.compile_unchecked(root)?,
            };
            parts.push(sql);
            values.extend(vals);
        }

        if parts.len() == 1 {
            return Ok((parts.pop().expect("one part"), values));
        }

        debug_assert_eq!(self.logics.len(), parts.len() - 1);
        let mut sql = String::new();
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                sql.push(' ');
                sql.push_str(self.logics[i - 1].sql_op());
                sql.push(' ');
            }
            sql.push('(');
            sql.push_str(part);
            sql.push(')');
        }
        Ok((sql, values))
    }

    /// True if any predicate in the tree carries a dotted field path.
    pub fn contains_dotted_path(&self) -> bool {
        let mut found = false;
        self.for_each_predicate(&mut |pred| found |= pred.path.is_nested());
        found
    }
}
