use pegged_core::{
    schema::Descriptor,
    stmt::{PredicateRelation, Value},
    Error, Result,
};

use indexmap::IndexSet;
use std::fmt;

/// Sort direction for the root ordering clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        })
    }
}

/// An additional inner-join group: a foreign record type plus the predicate
/// relations that scope it.
pub(crate) struct JoinGroup {
    pub target: &'static Descriptor,
    pub rels: Vec<PredicateRelation>,
}

/// What the select statement projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Projection {
    /// `"<root>".*` with ordering and pagination.
    Rows,
    /// `COUNT(*)`; ordering and pagination do not apply.
    Count,
}

/// The planner inputs for one retrieval or scoped mutation.
pub(crate) struct SelectPlan<'a> {
    pub root: &'static Descriptor,
    pub main: &'a [PredicateRelation],
    pub joins: &'a [JoinGroup],
    pub order: Option<&'a (String, Order)>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl SelectPlan<'_> {
    /// Composes the single SQL statement: join chain discovery, WHERE
    /// placement, ordering, pagination.
    pub fn render(&self, projection: Projection) -> Result<(String, Vec<Value>)> {
        let root_tbl = self.root.table();
        let mut sql = match projection {
            Projection::Rows => format!("SELECT \"{root_tbl}\".* FROM \"{root_tbl}\""),
            Projection::Count => format!("SELECT COUNT(*) FROM \"{root_tbl}\""),
        };
        let mut params = Vec::new();

        // Joins required by nested predicates on the main model.
        render_nested_joins(self.root, self.main, &mut sql, &mut params)?;

        // Foreign join groups: the group's own table joins on its non-nested
        // relations (the FK equality is synthesized at build time), then any
        // nested predicates inside the group join below it.
        for group in self.joins {
            let group_tbl = group.target.table();
            for rel in &group.rels {
                if !rel.is_nested()? {
                    let (s, vals) = rel.compile(group.target)?;
                    sql.push_str(&format!(" INNER JOIN \"{group_tbl}\" ON {s}"));
                    params.extend(vals);
                }
            }
            render_nested_joins(group.target, &group.rels, &mut sql, &mut params)?;
        }

        // One WHERE gathering the non-nested relations of every group.
        let mut wheres = Vec::new();
        for rel in self.main {
            if !rel.is_nested()? {
                wheres.push(rel.compile(self.root)?);
            }
        }
        for group in self.joins {
            for rel in &group.rels {
                if !rel.is_nested()? {
                    wheres.push(rel.compile(group.target)?);
                }
            }
        }
        for (i, (s, vals)) in wheres.into_iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE (" } else { " AND (" });
            sql.push_str(&s);
            sql.push(')');
            params.extend(vals);
        }

        if projection == Projection::Rows {
            self.render_order_and_pagination(&mut sql)?;
        }

        Ok((sql, params))
    }

    fn render_order_and_pagination(&self, sql: &mut String) -> Result<()> {
        let root_tbl = self.root.table();
        match self.order {
            Some((field, order)) => {
                let column = self
                    .root
                    .column_of(field)
                    .ok_or_else(|| Error::unknown_field(self.root.type_name(), field))?;
                sql.push_str(&format!(" ORDER BY \"{root_tbl}\".{column} {order}"));
            }
            None => sql.push_str(&format!(" ORDER BY \"{root_tbl}\".created_at DESC")),
        }

        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => {
                sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}"))
            }
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
            // SQL dialects require a LIMIT before OFFSET; -1 means unbounded.
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
            (None, None) => {}
        }
        Ok(())
    }
}

/// Emits the inner-join chain a group's nested predicates require.
///
/// The required join paths are the union of the group's anchor prefixes,
/// shallowest first so each successive join references a table already
/// present. A join whose path carries an exactly-anchored relation gets the
/// relation's predicate in its `ON` clause; intermediate joins are bare FK
/// equalities. Back-pointer convention: `<parent_table>_id`.
fn render_nested_joins(
    base: &'static Descriptor,
    rels: &[PredicateRelation],
    sql: &mut String,
    params: &mut Vec<Value>,
) -> Result<()> {
    let mut designators = IndexSet::new();
    for rel in rels {
        designators.extend(rel.anchor_prefixes());
    }
    let mut designators: Vec<String> = designators.into_iter().collect();
    designators.sort_by_key(|d| d.matches('.').count());

    for designator in &designators {
        let child_tbl = base.descriptor_at(designator)?.table();
        let parent_tbl = match designator.rsplit_once('.') {
            Some((parent, _)) => base.descriptor_at(parent)?.table(),
            None => base.table(),
        };

        let mut on = format!(
            "INNER JOIN \"{child_tbl}\" ON \"{child_tbl}\".{parent_tbl}_id = \"{parent_tbl}\".id"
        );
        for rel in rels {
            if rel.anchor()? == *designator {
                let (s, vals) = rel.compile(base)?;
                on.push_str(&format!(" AND ({s})"));
                params.extend(vals);
            }
        }
        sql.push(' ');
        sql.push_str(&on);
    }
    Ok(())
}
