use crate::db::Db;

use pegged_core::{
    schema::Descriptor,
    stmt::{Cond, Criteria, Operand, PredicateRelation},
    Error, Result,
};

/// Updates root-table columns in place, scoped by the main-model group.
///
/// The set relation must be flat: every entry an `EQ` predicate on a
/// top-level field with a bound value. The scope is likewise top-level
/// only; an update cannot carry joins.
pub(crate) fn update(
    db: &Db,
    root: &'static Descriptor,
    main: &[PredicateRelation],
    set: &PredicateRelation,
) -> Result<()> {
    let table = root.table();

    let mut set_sql = String::new();
    let mut params = Vec::new();
    for criteria in &set.criteria {
        let Criteria::Pred(pred) = criteria else {
            return Err(Error::predicate_misuse(
                "update set clause must be flat predicates, not nested relations",
            ));
        };
        if pred.path.is_nested() {
            return Err(Error::dot_in_update(pred.path.to_string()));
        }
        if pred.cond != Cond::Eq {
            return Err(Error::predicate_misuse(
                "update set clause conditions must be `=`",
            ));
        }
        let Operand::Value(value) = &pred.operand else {
            return Err(Error::predicate_misuse(
                "update set clause values must be bound, not escaped",
            ));
        };
        let column = root
            .column_of(pred.path.last())
            .ok_or_else(|| Error::unknown_field(root.type_name(), pred.path.last()))?;

        if !set_sql.is_empty() {
            set_sql.push_str(", ");
        }
        set_sql.push_str(&format!("{column} = ?"));
        params.push(value.clone());
    }
    if set_sql.is_empty() {
        return Err(Error::predicate_misuse("update set clause is empty"));
    }

    let mut sql = format!("UPDATE \"{table}\" SET {set_sql}");
    for (i, rel) in main.iter().enumerate() {
        if rel.contains_dotted_path() {
            return Err(Error::dot_in_update(
                "update scope must use top-level fields",
            ));
        }
        let (where_sql, vals) = rel.compile(root)?;
        sql.push_str(if i == 0 { " WHERE (" } else { " AND (" });
        sql.push_str(&where_sql);
        sql.push(')');
        params.extend(vals);
    }

    db.execute(sql, params).map(|_| ())
}
