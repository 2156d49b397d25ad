//! The relation-tag catalog.
//!
//! Each nested field of a record type carries an annotation string naming how
//! the nested records relate to their parent. The set is closed:
//!
//! - `peg`: the parent exclusively owns the nested record; create, update and
//!   delete cascade.
//! - `pegassoc`: the parent references the nested record by a back-pointer
//!   column but does not own it.
//! - `pegassoc-many2many:<link_table>`: many-to-many via a named link table;
//!   the layer only manages link rows.
//! - `-`: the field is invisible to the engine.
//!
//! Matching is most-specific-first so that `pegassoc-many2many` is not
//! mistaken for `pegassoc`, nor `pegassoc` for `peg`.

use crate::{Error, Result};

/// How a tagged nested field relates to its parent record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationTag {
    /// Exclusive ownership; nested lifetime follows the parent.
    Peg,
    /// Non-owning link; only the back-pointer is managed.
    PegAssoc,
    /// Restricted many-to-many through the named link table.
    PegAssocMany2Many { link_table: String },
    /// Invisible to the engine.
    Ignore,
}

impl RelationTag {
    /// True for the two single-target ownership flavors that carry a
    /// back-pointer on the child.
    pub fn has_backref(&self) -> bool {
        matches!(self, RelationTag::Peg | RelationTag::PegAssoc)
    }
}

const MANY2MANY: &str = "pegassoc-many2many";
const PEGASSOC: &str = "pegassoc";
const PEG: &str = "peg";
const IGNORE: &str = "-";

/// Parses an annotation value into a relation tag, most specific first.
///
/// The many-to-many form requires its link-table parameter
/// (`pegassoc-many2many:<link_table>`); anything else outside the closed set
/// is an ill-formed annotation.
pub fn parse(annotation: &str) -> Result<RelationTag> {
    let annotation = annotation.trim();
    if let Some(rest) = annotation.strip_prefix(MANY2MANY) {
        let link_table = rest
            .strip_prefix(':')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::invalid_annotation(annotation))?;
        return Ok(RelationTag::PegAssocMany2Many {
            link_table: link_table.to_owned(),
        });
    }
    match annotation {
        PEGASSOC => Ok(RelationTag::PegAssoc),
        PEG => Ok(RelationTag::Peg),
        IGNORE => Ok(RelationTag::Ignore),
        _ => Err(Error::invalid_annotation(annotation)),
    }
}

/// Resolves a field's annotation across the two accepted namespaces.
///
/// `qry` is the current namespace; `rel` is the legacy alias kept so schemas
/// can migrate gradually. `qry` wins when both are present. A field with
/// neither namespace is untagged and invisible to the engine.
pub fn resolve(qry: Option<&str>, legacy: Option<&str>) -> Result<Option<RelationTag>> {
    match qry.or(legacy) {
        Some(annotation) => parse(annotation).map(Some),
        None => Ok(None),
    }
}
