use super::load::fetch_by_id;
use super::walk::{collect_pegged, delete_cascade, upsert_rows, PeggedBatches};
use crate::db::Db;

use pegged_core::{
    schema::TaggedField, tag::RelationTag, Error, Record, Result, Timestamp, Uuid,
};

use indexmap::IndexMap;

/// Saves a fully materialized record: reloads the prior version, reconciles
/// every tagged field against it, rewrites the pegged subtree, then upserts
/// the root row.
pub(crate) fn save<T: Record + Default>(db: &Db, record: &mut T) -> Result<()> {
    let id = record.id().ok_or_else(Error::not_found)?;

    let old = fetch_by_id::<T>(db, id)?;
    sync_nested(db, &old, &*record)?;

    let now = Timestamp::now();
    let mut batches = PeggedBatches::new();
    collect_pegged(&mut *record, 0, now, &mut batches)?;

    let mut depths: Vec<usize> = batches.keys().copied().collect();
    depths.sort_unstable();
    for depth in depths {
        for (table, batch) in &batches[&depth] {
            upsert_rows(db, table, &batch.rows)?;
        }
    }

    upsert_rows(db, T::descriptor().table(), &[record.to_row()])
}

/// The diff pass: for each tagged field, compares the prior children with
/// the new ones and reconciles removals, additions, and survivors by
/// relation tag.
///
/// Pegged survivors recurse; pegged removals cascade by hand (the rows were
/// already loaded, so the declared foreign keys are bypassed on purpose to
/// keep the diff explicit). Peg-associated records are never mutated beyond
/// their back-pointer. Many-to-many removals drop the link row only.
fn sync_nested(db: &Db, old: &dyn Record, new: &dyn Record) -> Result<()> {
    let desc = old.desc();
    let parent_tbl = desc.table();

    for tagged in desc.tagged_fields() {
        let old_children: IndexMap<Uuid, &dyn Record> = indexed_by_id(tagged.children(old));
        let new_children: IndexMap<Uuid, &dyn Record> = indexed_by_id(tagged.children(new));
        let child_tbl = tagged.target().table();

        for (id, old_child) in &old_children {
            if new_children.contains_key(id) {
                continue;
            }
            // Removed from the parent since load.
            match tagged.tag() {
                RelationTag::Peg => delete_cascade(db, *old_child)?,
                RelationTag::PegAssoc => {
                    let sql = format!(
                        "UPDATE \"{child_tbl}\" SET {parent_tbl}_id = NULL \
                         WHERE \"{child_tbl}\".id = ?"
                    );
                    db.execute(sql, vec![(*id).into()])?;
                }
                RelationTag::PegAssocMany2Many { link_table } => {
                    let sql = format!(
                        "DELETE FROM \"{link_table}\" \
                         WHERE \"{link_table}\".{child_tbl}_id = ? \
                         AND \"{link_table}\".{parent_tbl}_id = ?"
                    );
                    db.execute(sql, vec![(*id).into(), old.id().into()])?;
                }
                RelationTag::Ignore => {}
            }
        }

        for (id, _) in &new_children {
            if old_children.contains_key(id) {
                continue;
            }
            // Added since load. Pegged additions need no explicit action;
            // the pegged rewrite inserts them.
            if *tagged.tag() == RelationTag::PegAssoc {
                verify_and_point(db, tagged, new, *id)?;
            }
        }

        if *tagged.tag() == RelationTag::Peg {
            for (id, new_child) in &new_children {
                if let Some(old_child) = old_children.get(id) {
                    sync_nested(db, *old_child, *new_child)?;
                }
            }
        }
    }
    Ok(())
}

fn indexed_by_id(children: Vec<&dyn Record>) -> IndexMap<Uuid, &dyn Record> {
    children
        .into_iter()
        .filter_map(|child| child.id().map(|id| (id, child)))
        .collect()
}

/// Asserts the peg-associated target exists, then writes the parent
/// back-pointer onto it. The target's own fields stay untouched.
fn verify_and_point(db: &Db, tagged: &TaggedField, parent: &dyn Record, child_id: Uuid) -> Result<()> {
    let child_tbl = tagged.target().table();
    let parent_tbl = parent.desc().table();

    let sql = format!("SELECT COUNT(*) FROM \"{child_tbl}\" WHERE \"{child_tbl}\".id = ?");
    if db.query_count(sql, vec![child_id.into()])? != 1 {
        return Err(Error::pegassoc_missing(child_tbl));
    }

    let sql =
        format!("UPDATE \"{child_tbl}\" SET {parent_tbl}_id = ? WHERE \"{child_tbl}\".id = ?");
    db.execute(sql, vec![parent.id().into(), child_id.into()])?;
    Ok(())
}
