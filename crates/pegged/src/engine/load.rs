use crate::db::Db;

use pegged_core::{
    schema::{Descriptor, TaggedField},
    tag::RelationTag,
    Record, Result, Uuid,
};

use indexmap::IndexMap;

/// Eagerly loads every tagged nested path beneath the given records:
/// children are fetched one table at a time with the back-pointer scoped to
/// the loaded parents, attached through the field's navigator, then
/// recursed into. Many-to-many fields have no back-pointer and are not
/// traversed.
pub(crate) fn preload(
    db: &Db,
    desc: &'static Descriptor,
    records: &mut [&mut dyn Record],
) -> Result<()> {
    let parent_ids: Vec<Uuid> = records.iter().filter_map(|record| record.id()).collect();
    if parent_ids.is_empty() {
        return Ok(());
    }
    let parent_tbl = desc.table();

    for tagged in desc.tagged_fields() {
        let Some(backref) = tagged.backref() else {
            // Many-to-many children come through the link table and are not
            // traversed further.
            if let RelationTag::PegAssocMany2Many { link_table } = tagged.tag() {
                preload_linked(db, desc, tagged, link_table, &parent_ids, records)?;
            }
            continue;
        };
        let child_desc = tagged.target();
        let child_tbl = child_desc.table();

        let sql = format!(
            "SELECT \"{child_tbl}\".* FROM \"{child_tbl}\" \
             WHERE \"{child_tbl}\".{parent_tbl}_id IN (?) \
             ORDER BY \"{child_tbl}\".created_at ASC"
        );
        let rows = db.query_rows(sql, vec![parent_ids.clone().into()])?;

        let mut by_parent: IndexMap<Uuid, Vec<Box<dyn Record>>> = IndexMap::new();
        for row in &rows {
            let mut child = child_desc.new_record();
            child.load_row(row)?;
            if let Some(parent_id) = backref.get(child.as_ref()) {
                by_parent.entry(parent_id).or_default().push(child);
            }
        }

        for record in records.iter_mut() {
            let Some(id) = record.id() else { continue };
            if let Some(children) = by_parent.shift_remove(&id) {
                for child in children {
                    tagged.attach(&mut **record, child);
                }
            }
        }

        // One level-batched recursion over everything just attached.
        let mut attached: Vec<&mut dyn Record> = records
            .iter_mut()
            .flat_map(|record| tagged.children_mut(&mut **record))
            .collect();
        preload(db, child_desc, &mut attached)?;
    }
    Ok(())
}

/// Loads the children of a many-to-many field by walking the link table:
/// one query for the link pairs scoped to the loaded parents, one for the
/// child rows.
fn preload_linked(
    db: &Db,
    desc: &'static Descriptor,
    tagged: &TaggedField,
    link_table: &str,
    parent_ids: &[Uuid],
    records: &mut [&mut dyn Record],
) -> Result<()> {
    let parent_tbl = desc.table();
    let child_desc = tagged.target();
    let child_tbl = child_desc.table();

    let sql = format!(
        "SELECT \"{link_table}\".{parent_tbl}_id, \"{link_table}\".{child_tbl}_id \
         FROM \"{link_table}\" WHERE \"{link_table}\".{parent_tbl}_id IN (?)"
    );
    let links = db.query_rows(sql, vec![parent_ids.to_vec().into()])?;

    let mut pairs: Vec<(Uuid, Uuid)> = Vec::with_capacity(links.len());
    for link in &links {
        let parent_id = link.get(&format!("{parent_tbl}_id"))?.to_uuid()?;
        let child_id = link.get(&format!("{child_tbl}_id"))?.to_uuid()?;
        pairs.push((parent_id, child_id));
    }
    if pairs.is_empty() {
        return Ok(());
    }

    let child_ids: Vec<Uuid> = pairs.iter().map(|(_, child_id)| *child_id).collect();
    let sql = format!("SELECT \"{child_tbl}\".* FROM \"{child_tbl}\" WHERE \"{child_tbl}\".id IN (?)");
    let rows = db.query_rows(sql, vec![child_ids.into()])?;

    let mut row_by_id = IndexMap::new();
    for row in &rows {
        if let Some(id) = row.get("id")?.to_uuid_opt()? {
            row_by_id.insert(id, row);
        }
    }

    for record in records.iter_mut() {
        let Some(id) = record.id() else { continue };
        for (parent_id, child_id) in &pairs {
            if *parent_id != id {
                continue;
            }
            if let Some(row) = row_by_id.get(child_id) {
                let mut child = child_desc.new_record();
                child.load_row(row)?;
                tagged.attach(&mut **record, child);
            }
        }
    }
    Ok(())
}

/// Loads one record by id with full eager loading, or `NotFound`.
pub(crate) fn fetch_by_id<T: Record + Default>(db: &Db, id: Uuid) -> Result<T> {
    let desc = T::descriptor();
    let table = desc.table();
    let sql = format!("SELECT \"{table}\".* FROM \"{table}\" WHERE \"{table}\".id = ?");
    let rows = db.query_rows(sql, vec![id.into()])?;
    let row = rows.first().ok_or_else(pegged_core::Error::not_found)?;

    let mut record = T::default();
    record.load_row(row)?;
    preload(db, desc, &mut [&mut record as &mut dyn Record])?;
    Ok(record)
}
