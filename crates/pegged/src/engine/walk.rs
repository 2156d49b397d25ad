use crate::db::Db;

use pegged_core::{tag::RelationTag, Error, Record, Result, Timestamp, Uuid};

use indexmap::IndexMap;
use pegged_core::stmt::Value;

/// Scalar rows of one table, gathered during a structural walk.
#[derive(Default)]
pub(crate) struct TableBatch {
    pub rows: Vec<Vec<(&'static str, Value)>>,
}

/// Pegged descendants grouped depth -> table -> rows; depth 0 holds the
/// root's direct pegged children.
pub(crate) type PeggedBatches = IndexMap<usize, IndexMap<&'static str, TableBatch>>;

/// Peg-associated first-level children grouped
/// parent id -> child table -> child ids.
pub(crate) type AssocMap = IndexMap<Uuid, IndexMap<&'static str, Vec<Uuid>>>;

/// Mints a missing id and stamps the engine-managed timestamps.
fn stamp(record: &mut dyn Record, now: Timestamp) {
    if record.id().is_none() {
        record.set_id(Uuid::new_v4());
    }
    if record.created_at().is_none() {
        record.set_created_at(now);
    }
    record.set_updated_at(now);
}

/// Walks the `peg`-tagged descendants of `record`, minting missing ids,
/// filling missing back-pointers with the parent id, stamping timestamps,
/// and batching each descendant's scalar row by depth and table.
///
/// The record's own row is not captured; callers insert or upsert the root
/// themselves after the walk.
pub(crate) fn collect_pegged(
    record: &mut dyn Record,
    depth: usize,
    now: Timestamp,
    out: &mut PeggedBatches,
) -> Result<()> {
    stamp(record, now);
    let parent_id = record.id().expect("stamped record has an id");
    let desc = record.desc();

    for tagged in desc.tagged_fields() {
        if *tagged.tag() != RelationTag::Peg {
            continue;
        }
        let backref = tagged
            .backref()
            .expect("peg fields carry a back-pointer");
        let table = tagged.target().table();

        for child in tagged.children_mut(record) {
            if backref.get(child).is_none() {
                backref.set(child, Some(parent_id));
            }
            collect_pegged(child, depth + 1, now, out)?;
            out.entry(depth)
                .or_default()
                .entry(table)
                .or_default()
                .rows
                .push(child.to_row());
        }
    }
    Ok(())
}

/// Recursively gathers the ids of `peg`-tagged descendants, one list per
/// table. Descendants without an id are skipped but still traversed.
pub(crate) fn gather_pegged_ids(
    record: &dyn Record,
    out: &mut IndexMap<&'static str, Vec<Uuid>>,
) {
    for tagged in record.desc().tagged_fields() {
        if *tagged.tag() != RelationTag::Peg {
            continue;
        }
        let table = tagged.target().table();
        for child in tagged.children(record) {
            if let Some(id) = child.id() {
                out.entry(table).or_default().push(id);
            }
            gather_pegged_ids(child, out);
        }
    }
}

/// Asserts that no pegged descendant of any given root carries a primary key
/// that already exists: one `SELECT COUNT(*) ... WHERE id IN (...)` per
/// descendant table, issued before any write.
pub(crate) fn precheck_pegged_ids(db: &Db, roots: &[&dyn Record]) -> Result<()> {
    let mut per_table: IndexMap<&'static str, Vec<Uuid>> = IndexMap::new();
    for root in roots {
        gather_pegged_ids(*root, &mut per_table);
    }

    for (table, ids) in per_table {
        let sql = format!("SELECT COUNT(*) FROM \"{table}\" WHERE \"{table}\".id IN (?)");
        if db.query_count(sql, vec![ids.into()])? != 0 {
            return Err(Error::pegged_id_exists(table));
        }
    }
    Ok(())
}

/// Collects the first-level `pegassoc` children of each root that carry an
/// id, keyed by the root's id and the child table.
pub(crate) fn collect_assoc(roots: &[&dyn Record], out: &mut AssocMap) {
    for root in roots {
        let Some(parent_id) = root.id() else { continue };
        for tagged in root.desc().tagged_fields() {
            if *tagged.tag() != RelationTag::PegAssoc {
                continue;
            }
            let table = tagged.target().table();
            for child in tagged.children(*root) {
                if let Some(id) = child.id() {
                    out.entry(parent_id)
                        .or_default()
                        .entry(table)
                        .or_default()
                        .push(id);
                }
            }
        }
    }
}

/// Deletes every link-table row referencing the record through a
/// `pegassoc-many2many` field. Neither side's rows are touched.
pub(crate) fn remove_links(db: &Db, record: &dyn Record) -> Result<()> {
    let Some(id) = record.id() else { return Ok(()) };
    let table = record.desc().table();

    for tagged in record.desc().tagged_fields() {
        if let RelationTag::PegAssocMany2Many { link_table } = tagged.tag() {
            let sql =
                format!("DELETE FROM \"{link_table}\" WHERE \"{link_table}\".{table}_id = ?");
            db.execute(sql, vec![id.into()])?;
        }
    }
    Ok(())
}

/// Manually cascades the removal of one record: deletes its row, its
/// many-to-many links, and its pegged subtree. Used when a save drops a
/// pegged child; whole-record deletes instead delegate the cascade to the
/// database's declared foreign keys.
pub(crate) fn delete_cascade(db: &Db, record: &dyn Record) -> Result<()> {
    let desc = record.desc();
    let table = desc.table();
    let Some(id) = record.id() else { return Ok(()) };

    db.execute(
        format!("DELETE FROM \"{table}\" WHERE \"{table}\".id = ?"),
        vec![id.into()],
    )?;
    remove_links(db, record)?;

    let mut per_table: IndexMap<&'static str, Vec<Uuid>> = IndexMap::new();
    gather_pegged_ids(record, &mut per_table);
    remove_descendant_links(db, record)?;
    for (child_table, ids) in per_table {
        let sql = format!("DELETE FROM \"{child_table}\" WHERE \"{child_table}\".id IN (?)");
        db.execute(sql, vec![ids.into()])?;
    }
    Ok(())
}

/// Cleans up many-to-many links held by pegged descendants before their rows
/// are deleted.
fn remove_descendant_links(db: &Db, record: &dyn Record) -> Result<()> {
    for tagged in record.desc().tagged_fields() {
        if *tagged.tag() != RelationTag::Peg {
            continue;
        }
        for child in tagged.children(record) {
            remove_links(db, child)?;
            remove_descendant_links(db, child)?;
        }
    }
    Ok(())
}

/// Multi-row insert of one table batch.
pub(crate) fn insert_rows(
    db: &Db,
    table: &str,
    rows: &[Vec<(&'static str, Value)>],
) -> Result<()> {
    write_rows(db, table, rows, false)
}

/// Multi-row upsert-on-primary-key of one table batch. `created_at` is only
/// written on insert.
pub(crate) fn upsert_rows(
    db: &Db,
    table: &str,
    rows: &[Vec<(&'static str, Value)>],
) -> Result<()> {
    write_rows(db, table, rows, true)
}

fn write_rows(
    db: &Db,
    table: &str,
    rows: &[Vec<(&'static str, Value)>],
    upsert: bool,
) -> Result<()> {
    let Some(first) = rows.first() else {
        return Ok(());
    };
    let columns: Vec<&'static str> = first.iter().map(|(column, _)| *column).collect();

    let mut sql = format!("INSERT INTO \"{table}\" (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        sql.push_str(column);
    }
    sql.push_str(") VALUES ");

    let one = format!("({})", vec!["?"; columns.len()].join(","));
    let mut params = Vec::with_capacity(rows.len() * columns.len());
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            sql.push(',');
        }
        sql.push_str(&one);
        for (_, value) in row {
            params.push(value.clone());
        }
    }

    if upsert {
        sql.push_str(" ON CONFLICT (id) DO UPDATE SET ");
        let mut wrote = false;
        for column in &columns {
            if *column == "id" || *column == "created_at" {
                continue;
            }
            if wrote {
                sql.push_str(", ");
            }
            sql.push_str(&format!("{column} = excluded.{column}"));
            wrote = true;
        }
    }

    db.execute(sql, params).map(|_| ())
}
