use crate::{
    db::query::{Predicate, Query, QueryBuilder, and, eq, near, or, plan},
    error::Error,
    test_support::schema,
    types::{Distance, GeoPoint},
    value::Value,
};
use proptest::prelude::*;

fn center() -> GeoPoint {
    GeoPoint::new(15.0, 37.0)
}

#[test]
fn builder_ands_filters_and_ors_alternatives() {
    let query = QueryBuilder::new("persons")
        .filter(eq("firstname", "arya"))
        .and(eq("lastname", "stark"))
        .or(eq("lastname", "snow"))
        .page(1, 5)
        .build();

    assert_eq!(
        query.predicate,
        Some(Predicate::Or(vec![
            Predicate::And(vec![eq("firstname", "arya"), eq("lastname", "stark")]),
            eq("lastname", "snow"),
        ]))
    );
    assert_eq!(query.page.map(|p| p.offset()), Some(5));
}

#[test]
fn operators_flatten_same_kind_nodes() {
    let p = eq("firstname", "a") & eq("lastname", "b") & eq("lastname", "c");
    assert!(matches!(&p, Predicate::And(children) if children.len() == 3));

    let q = &eq("firstname", "a") | &eq("firstname", "b");
    assert_eq!(q, or([eq("firstname", "a"), eq("firstname", "b")]));
}

#[test]
fn plan_accepts_indexed_fields() {
    let schema = schema();
    let query = Query::filtered(
        "persons",
        and([
            eq("lastname", "stark"),
            near("hometown.location", center(), Distance::kilometers(100.0)),
        ]),
    );

    let plan = plan(&schema, &query).unwrap();
    assert_eq!(plan.model.name, "persons");
    assert_eq!(plan.summary(), "intersection of 2 lookups");
}

#[test]
fn plan_rejects_unindexed_fields() {
    let schema = schema();
    let query = Query::filtered("persons", eq("age", 30));

    let err = plan(&schema, &query).unwrap_err();
    assert!(matches!(err, Error::UnsupportedQuery { .. }), "{err}");
}

#[test]
fn plan_rejects_mismatched_index_kinds() {
    let schema = schema();

    let eq_on_geo = Query::filtered("cities", eq("location", "x"));
    assert!(matches!(
        plan(&schema, &eq_on_geo),
        Err(Error::UnsupportedQuery { .. })
    ));

    let near_on_plain = Query::filtered("cities", near("name", center(), Distance::meters(1.0)));
    assert!(matches!(
        plan(&schema, &near_on_plain),
        Err(Error::UnsupportedQuery { .. })
    ));
}

#[test]
fn plan_rejects_unmatchable_values_and_bad_pages() {
    let schema = schema();

    let null = Query::filtered("persons", eq("firstname", Value::Null));
    assert!(matches!(
        plan(&schema, &null),
        Err(Error::UnsupportedQuery { .. })
    ));

    let empty_page = QueryBuilder::new("persons").page(0, 0).build();
    assert!(matches!(
        plan(&schema, &empty_page),
        Err(Error::UnsupportedQuery { .. })
    ));

    let negative = Query::filtered("cities", near("location", center(), Distance::meters(-1.0)));
    assert!(matches!(
        plan(&schema, &negative),
        Err(Error::UnsupportedQuery { .. })
    ));
}

#[test]
fn plan_rejects_invalid_centers_and_unknown_keyspaces() {
    let schema = schema();

    let bad_center = Query::filtered(
        "cities",
        near("location", GeoPoint::new(0.0, 91.0), Distance::kilometers(1.0)),
    );
    assert!(matches!(
        plan(&schema, &bad_center),
        Err(Error::InvalidGeoCoordinate { .. })
    ));

    assert!(matches!(
        plan(&schema, &Query::all("dragons")),
        Err(Error::UnknownKeyspace(_))
    ));
}

#[test]
fn nested_unindexed_leaf_fails_the_whole_query() {
    let schema = schema();
    let query = Query::filtered(
        "persons",
        or([eq("firstname", "arya"), and([eq("lastname", "stark"), eq("age", 9)])]),
    );

    assert!(plan(&schema, &query).is_err());
}

fn leaf() -> impl Strategy<Value = Predicate> {
    prop_oneof![
        "[a-z]{1,4}".prop_map(|v| eq("firstname", v)),
        "[a-z]{1,4}".prop_map(|v| eq("lastname", v)),
    ]
}

fn tree() -> impl Strategy<Value = Predicate> {
    leaf().prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Predicate::And),
            prop::collection::vec(inner, 0..4).prop_map(Predicate::Or),
        ]
    })
}

proptest! {
    #[test]
    fn trees_over_indexed_fields_always_plan(predicate in tree()) {
        let schema = schema();
        let query = Query::filtered("persons", predicate);

        prop_assert!(plan(&schema, &query).is_ok());
    }

    #[test]
    fn combinators_preserve_leaves(a in tree(), b in tree()) {
        let leaves = a.leaf_count() + b.leaf_count();

        prop_assert_eq!((&a & &b).leaf_count(), leaves);
        prop_assert_eq!((a | b).leaf_count(), leaves);
    }
}
