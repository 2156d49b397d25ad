use super::walk::{
    collect_assoc, collect_pegged, insert_rows, precheck_pegged_ids, AssocMap, PeggedBatches,
};
use crate::db::Db;

use pegged_core::{schema::Descriptor, Error, Record, Result, Timestamp};

/// Creates one or more same-typed roots together with their nested records.
///
/// Order of operations: pegged-id pre-validation, structural collection
/// (minting ids, filling back-pointers), root insert, pegged batches
/// depth-ascending, then peg-associated back-pointer writes with existence
/// checks. Nothing is written if pre-validation fails.
pub(crate) fn create(db: &Db, records: &mut [&mut dyn Record]) -> Result<()> {
    let Some(first) = records.first() else {
        return Ok(());
    };
    let desc = first.desc();

    {
        let roots: Vec<&dyn Record> = records.iter().map(|r| &**r as &dyn Record).collect();
        precheck_pegged_ids(db, &roots)?;
    }

    let now = Timestamp::now();
    let mut batches = PeggedBatches::new();
    let mut root_rows = Vec::with_capacity(records.len());
    for record in records.iter_mut() {
        collect_pegged(&mut **record, 0, now, &mut batches)?;
        root_rows.push(record.to_row());
    }

    let mut assoc = AssocMap::new();
    {
        let roots: Vec<&dyn Record> = records.iter().map(|r| &**r as &dyn Record).collect();
        collect_assoc(&roots, &mut assoc);
    }

    insert_rows(db, desc.table(), &root_rows)?;

    let mut depths: Vec<usize> = batches.keys().copied().collect();
    depths.sort_unstable();
    for depth in depths {
        for (table, batch) in &batches[&depth] {
            insert_rows(db, table, &batch.rows)?;
        }
    }

    link_assoc(db, desc, &assoc)
}

/// Verifies every peg-associated target exists, then writes the parent
/// back-pointer onto the child rows.
pub(crate) fn link_assoc(db: &Db, parent: &'static Descriptor, assoc: &AssocMap) -> Result<()> {
    let parent_tbl = parent.table();

    for (parent_id, tables) in assoc {
        for (child_tbl, ids) in tables {
            let sql = format!("SELECT COUNT(*) FROM \"{child_tbl}\" WHERE \"{child_tbl}\".id IN (?)");
            let count = db.query_count(sql, vec![ids.clone().into()])?;
            if count != ids.len() as u64 {
                return Err(Error::pegassoc_missing(*child_tbl));
            }

            let sql = format!(
                "UPDATE \"{child_tbl}\" SET {parent_tbl}_id = ? WHERE \"{child_tbl}\".id IN (?)"
            );
            db.execute(sql, vec![(*parent_id).into(), ids.clone().into()])?;
        }
    }
    Ok(())
}
