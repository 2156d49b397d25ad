use super::walk::remove_links;
use crate::db::Db;

use pegged_core::{stmt::PredicateRelation, Error, Record, Result, Uuid};

/// Deletes a record, either scoped by the query's predicate relations or by
/// the record's own id. Pegged descendants are cascaded by the database
/// through the schema's declared `ON DELETE CASCADE`; peg-associated rows
/// survive with their back-pointer NULLed by `ON DELETE SET NULL`. The
/// layer's own duty is the many-to-many link rows, cleaned up in either
/// mode.
pub(crate) fn delete(
    db: &Db,
    record: &dyn Record,
    main: &[PredicateRelation],
) -> Result<()> {
    let desc = record.desc();
    let table = desc.table();

    if main.is_empty() {
        let Some(id) = record.id() else {
            // Without a scope this would silently erase the whole table.
            return Err(Error::unscoped_delete());
        };
        db.execute(
            format!("DELETE FROM \"{table}\" WHERE \"{table}\".id = ?"),
            vec![id.into()],
        )?;
        return remove_links(db, record);
    }

    // Predicate scope. Nested predicates would need joins a DELETE cannot
    // carry, so only top-level relations are valid here.
    let mut where_sql = String::new();
    let mut params = Vec::new();
    for (i, rel) in main.iter().enumerate() {
        if rel.contains_dotted_path() {
            return Err(Error::predicate_misuse(
                "delete scope must not use dot notation",
            ));
        }
        let (sql, vals) = rel.compile(desc)?;
        if i > 0 {
            where_sql.push_str(" AND ");
        }
        where_sql.push('(');
        where_sql.push_str(&sql);
        where_sql.push(')');
        params.extend(vals);
    }

    // The scoped rows' ids are needed for link cleanup before they go.
    let sql = format!("SELECT \"{table}\".id FROM \"{table}\" WHERE {where_sql}");
    let rows = db.query_rows(sql, params.clone())?;
    let mut ids = Vec::with_capacity(rows.len());
    for row in &rows {
        if let Some(id) = row.get("id")?.to_uuid_opt()? {
            ids.push(id);
        }
    }

    db.execute(
        format!("DELETE FROM \"{table}\" WHERE {where_sql}"),
        params,
    )?;

    cleanup_links_by_id(db, record, &ids)
}

/// Deletes a same-typed batch by id.
pub(crate) fn delete_many(db: &Db, records: &[&dyn Record]) -> Result<()> {
    let Some(first) = records.first() else {
        return Ok(());
    };
    let table = first.desc().table();

    let ids: Vec<Uuid> = records.iter().filter_map(|record| record.id()).collect();
    if ids.is_empty() {
        return Err(Error::unscoped_delete());
    }

    db.execute(
        format!("DELETE FROM \"{table}\" WHERE \"{table}\".id IN (?)"),
        vec![ids.clone().into()],
    )?;
    cleanup_links_by_id(db, *first, &ids)
}

/// Removes link-table rows for each deleted id across the type's
/// many-to-many fields.
fn cleanup_links_by_id(db: &Db, record: &dyn Record, ids: &[Uuid]) -> Result<()> {
    use pegged_core::tag::RelationTag;

    let table = record.desc().table();
    for tagged in record.desc().tagged_fields() {
        if let RelationTag::PegAssocMany2Many { link_table } = tagged.tag() {
            let sql = format!(
                "DELETE FROM \"{link_table}\" WHERE \"{link_table}\".{table}_id IN (?)"
            );
            db.execute(sql, vec![ids.to_vec().into()])?;
        }
    }
    Ok(())
}
