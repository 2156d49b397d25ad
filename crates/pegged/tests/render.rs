//! Assertions on the emitted SQL of representative plans, without touching
//! the database.

mod common;

use common::*;
use pegged::{c, q, Order};
use pegged_core::{stmt::Value, Uuid};

#[test]
fn bare_select_defaults_to_created_at_desc() {
    let db = db();
    let (sql, params) = db.query().render_select::<TopLevel>().unwrap();
    assert_eq!(
        sql,
        "SELECT \"top_level\".* FROM \"top_level\" \
         ORDER BY \"top_level\".created_at DESC"
    );
    assert!(params.is_empty());
}

#[test]
fn where_gathers_top_level_relations() {
    let db = db();
    let (sql, params) = q(&db, c("name =", "same").and("age =", 3))
        .render_select::<TopLevel>()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT \"top_level\".* FROM \"top_level\" \
         WHERE ((\"top_level\".real_name_column = ?) AND (\"top_level\".age = ?)) \
         ORDER BY \"top_level\".created_at DESC"
    );
    assert_eq!(params.len(), 2);
}

#[test]
fn in_clause_binds_one_sequence_value() {
    let db = db();
    let ids = vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
    let (sql, params) = q(&db, c("id IN", ids.clone()))
        .render_select::<TopLevel>()
        .unwrap();
    assert!(sql.contains("WHERE (\"top_level\".id IN (?))"), "sql: {sql}");
    assert_eq!(params.len(), 1);
    let Value::List(items) = &params[0] else {
        panic!("expected one bound sequence");
    };
    assert_eq!(items.len(), 3);
}

#[test]
fn nested_predicate_discovers_the_join_chain() {
    let db = db();
    let (sql, params) = q(&db, c("embed_dog.dog_toys.toy_name=", "DogToySameName"))
        .render_select::<TopLevel>()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT \"top_level\".* FROM \"top_level\" \
         INNER JOIN \"embed_dog\" ON \"embed_dog\".top_level_id = \"top_level\".id \
         INNER JOIN \"embed_dog_toy\" ON \"embed_dog_toy\".embed_dog_id = \"embed_dog\".id \
         AND (\"embed_dog_toy\".toy_name = ?) \
         ORDER BY \"top_level\".created_at DESC"
    );
    assert_eq!(params.len(), 1);
}

#[test]
fn join_closure_matches_anchor_prefixes() {
    let db = db();
    let (sql, _) = db
        .query()
        .q([c("age =", 7), c("dogs.dog_toys.toy_name =", "ball")])
        .render_select::<TopLevel>()
        .unwrap();

    // Every table reached by an anchor prefix is joined, and nothing else.
    assert!(sql.contains("INNER JOIN \"dog\" ON \"dog\".top_level_id = \"top_level\".id"));
    assert!(sql.contains("INNER JOIN \"dog_toy\" ON \"dog_toy\".dog_id = \"dog\".id"));
    assert!(!sql.contains("\"embed_dog\""));
    assert!(sql.contains("WHERE (\"top_level\".age = ?)"));
}

#[test]
fn inner_join_synthesizes_the_foreign_key_equality() {
    let db = db();
    let (sql, params) = db
        .query()
        .inner_join::<Unnested, TopLevel>(c("name =", "for_r1"))
        .render_select::<TopLevel>()
        .unwrap();
    assert!(
        sql.contains(
            "INNER JOIN \"unnested\" ON (\"unnested\".name = ?) \
             AND (\"unnested\".top_level_id = \"top_level\".id)"
        ),
        "sql: {sql}"
    );
    // The escape fragment binds nothing.
    assert_eq!(params.len(), 2);
}

#[test]
fn order_limit_offset_render_in_sequence() {
    let db = db();
    let (sql, _) = db
        .query()
        .order("age", Order::Asc)
        .limit(2)
        .offset(4)
        .render_select::<TopLevel>()
        .unwrap();
    assert!(sql.ends_with("ORDER BY \"top_level\".age ASC LIMIT 2 OFFSET 4"));
}

#[test]
fn order_maps_field_to_column_override() {
    let db = db();
    let (sql, _) = db
        .query()
        .order("name", Order::Desc)
        .render_select::<TopLevel>()
        .unwrap();
    assert!(sql.ends_with("ORDER BY \"top_level\".real_name_column DESC"));
}

#[test]
fn terminals_reset_builder_state() {
    let db = db();
    let mut query = q(&db, c("age =", 3)).order("age", Order::Asc).limit(2);
    let _ = query.find::<TopLevel>().unwrap();

    // The same handle renders a bare statement afterwards.
    let (sql, params) = query.render_select::<TopLevel>().unwrap();
    assert!(!sql.contains("WHERE"), "sql: {sql}");
    assert!(!sql.contains("LIMIT"), "sql: {sql}");
    assert!(sql.contains("ORDER BY \"top_level\".created_at DESC"));
    assert!(params.is_empty());
}

#[test]
fn failed_terminal_also_resets_builder_state() {
    let db = db();
    let mut query = q(&db, c("bogus =", 3)).limit(9);
    assert!(query.find::<TopLevel>().is_err());

    let (sql, _) = query.render_select::<TopLevel>().unwrap();
    assert!(!sql.contains("LIMIT"), "sql: {sql}");
    assert!(!sql.contains("WHERE"), "sql: {sql}");
}

#[test]
fn chained_calls_after_an_error_are_no_ops() {
    let db = db();
    // The second order would normally override; after the error it no-ops
    // and the first error wins.
    let err = q(&db, c("age !!", 3))
        .order("age", Order::Asc)
        .limit(1)
        .find::<TopLevel>()
        .unwrap_err();
    assert!(err.is_predicate());
}
