use crate::{
    db::{
        Db,
        backend::{Backend, MemoryBackend},
        query::{Predicate, Query, QueryBuilder, and, eq, near, or},
        response::PageRequest,
        store::record_key,
    },
    entity::Entity,
    error::Error,
    model::{KeyspaceModel, Schema},
    obs::MetricsRecorder,
    test_support::{CATANIA, PALERMO, city, person, schema},
    types::{Distance, GeoPoint},
    value::Value,
};
use std::sync::Arc;

fn setup() -> (Arc<MemoryBackend>, Db) {
    let backend = Arc::new(MemoryBackend::new());
    let db = Db::new(backend.clone(), schema());

    (backend, db)
}

fn ids(db: &Db, predicate: Predicate) -> Vec<String> {
    db.execute_ids(&Query::filtered("persons", predicate))
        .unwrap()
        .ids
}

// ----------------------------------------------------------------------
// save
// ----------------------------------------------------------------------

#[test]
fn save_assigns_an_id_and_round_trips() {
    let (_, db) = setup();

    let id = db.save(person("arya", "stark")).unwrap();
    let loaded = db.find_by_id("persons", &id).unwrap().unwrap();

    assert_eq!(loaded.id(), Some(id.as_str()));
    assert_eq!(loaded.text("firstname"), Some("arya"));
    assert_eq!(loaded.text("lastname"), Some("stark"));
    assert_eq!(db.count("persons").unwrap(), 1);
}

#[test]
fn save_with_an_existing_id_replaces_the_record() {
    let (_, db) = setup();

    let id = db.save(person("arya", "stark")).unwrap();
    db.save(person("arya", "snow").with_id(id.as_str())).unwrap();

    assert_eq!(db.count("persons").unwrap(), 1);
    assert!(ids(&db, eq("lastname", "stark")).is_empty());
    assert_eq!(ids(&db, eq("lastname", "snow")), vec![id]);
}

#[test]
fn save_rejects_invalid_coordinates_without_writing() {
    let (backend, db) = setup();

    let err = db
        .save(city("nowhere", GeoPoint::new(181.0, 0.0)))
        .unwrap_err();

    assert!(matches!(err, Error::InvalidGeoCoordinate { .. }));
    assert!(backend.is_empty().unwrap());
}

#[test]
fn save_rejects_unknown_keyspaces_and_empty_ids() {
    let (_, db) = setup();

    assert!(matches!(
        db.save(Entity::new("dragons")),
        Err(Error::UnknownKeyspace(_))
    ));
    assert!(matches!(
        db.save(person("a", "b").with_id("")),
        Err(Error::Conversion { .. })
    ));
}

#[test]
fn save_many_is_fail_fast_and_keeps_earlier_saves() {
    let (_, db) = setup();

    let err = db
        .save_many([
            person("jon", "snow"),
            city("bad", GeoPoint::new(0.0, f64::NAN)),
            person("sansa", "stark"),
        ])
        .unwrap_err();

    assert!(matches!(err, Error::InvalidGeoCoordinate { .. }));
    assert_eq!(db.count("persons").unwrap(), 1);
    assert_eq!(db.count("cities").unwrap(), 0);
}

#[test]
fn save_stores_references_as_ids() {
    let (backend, db) = setup();

    let palermo = db.save(city("palermo", PALERMO)).unwrap();
    let saved_city = Entity::new("cities").with_id(palermo.as_str());
    let id = db
        .save(person("arya", "stark").with("city", saved_city))
        .unwrap();

    let raw = crate::db::store::decode_record(
        "persons",
        &id,
        "k",
        &backend.get(&record_key("persons", &id)).unwrap().unwrap(),
    )
    .unwrap();
    assert_eq!(raw.get("city"), Some(&Value::Ref(palermo.clone())));

    let loaded = db.find_by_id("persons", &id).unwrap().unwrap();
    assert_eq!(loaded.entity("city").and_then(|c| c.text("name")), Some("palermo"));
}

// ----------------------------------------------------------------------
// delete
// ----------------------------------------------------------------------

#[test]
fn delete_is_idempotent() {
    let (_, db) = setup();
    let id = db.save(person("arya", "stark")).unwrap();

    assert!(db.delete_by_id("persons", &id).unwrap());
    assert!(!db.delete_by_id("persons", &id).unwrap());
    assert!(!db.delete_by_id("persons", "never-existed").unwrap());
    assert_eq!(db.find_by_id("persons", &id).unwrap(), None);
    assert_eq!(db.count("persons").unwrap(), 0);
}

#[test]
fn delete_all_removes_every_key_of_the_keyspace() {
    let (backend, db) = setup();
    db.save(city("palermo", PALERMO)).unwrap();
    db.save_many([person("arya", "stark"), person("jon", "snow")])
        .unwrap();

    assert_eq!(db.delete_all("persons").unwrap(), 2);

    let keys = backend.keys().unwrap();
    assert!(keys.iter().all(|k| k.starts_with("cities")), "{keys:?}");
    assert_eq!(db.count("persons").unwrap(), 0);
    assert_eq!(db.count("cities").unwrap(), 1);
}

// ----------------------------------------------------------------------
// load
// ----------------------------------------------------------------------

#[test]
fn empty_and_matches_everything_and_empty_or_matches_nothing() {
    let (_, db) = setup();
    db.save_many([person("arya", "stark"), person("jon", "snow")])
        .unwrap();

    assert_eq!(ids(&db, and([])).len(), 2);
    assert!(ids(&db, or([])).is_empty());
    assert_eq!(db.find_all("persons", None).unwrap().total(), 2);
}

#[test]
fn and_or_evaluate_as_set_algebra() {
    let (_, db) = setup();
    let arya = db.save(person("arya", "stark")).unwrap();
    let sansa = db.save(person("sansa", "stark")).unwrap();
    let jon = db.save(person("jon", "snow")).unwrap();

    assert_eq!(
        ids(&db, eq("firstname", "arya") & eq("lastname", "stark")),
        vec![arya.clone()]
    );
    assert_eq!(
        ids(&db, eq("firstname", "arya") | eq("lastname", "snow")),
        vec![arya.clone(), jon]
    );
    // overlapping branches report each id once
    assert_eq!(
        ids(&db, eq("firstname", "arya") | eq("lastname", "stark")),
        vec![arya, sansa]
    );
}

#[test]
fn equality_matches_across_value_types_by_token() {
    let (_, db) = setup();
    let one = db.save(person("arya", "stark").with("firstname", 1)).unwrap();
    db.save(person("jon", "snow").with("firstname", "10")).unwrap();

    // Int(1), Float(1.0) and Text("1") share one index token
    assert_eq!(ids(&db, eq("firstname", "1")), vec![one.clone()]);
    assert_eq!(ids(&db, eq("firstname", 1)), vec![one.clone()]);
    assert_eq!(ids(&db, eq("firstname", 1.0)), vec![one]);
    assert!(ids(&db, eq("firstname", "01")).is_empty());
}

#[test]
fn find_by_ids_preserves_order_and_skips_missing() {
    let (_, db) = setup();
    let a = db.save(person("arya", "stark")).unwrap();
    let b = db.save(person("jon", "snow")).unwrap();

    let found = db
        .find_by_ids("persons", [b.as_str(), "missing", a.as_str()])
        .unwrap();
    let found: Vec<_> = found.iter().filter_map(Entity::id).collect();

    assert_eq!(found, vec![b.as_str(), a.as_str()]);
    assert!(db.exists("persons", &a).unwrap());
    assert!(!db.exists("persons", "missing").unwrap());
}

#[test]
fn indexed_ids_without_a_record_are_skipped_at_fetch() {
    let (backend, db) = setup();
    let a = db.save(person("arya", "stark")).unwrap();
    let b = db.save(person("sansa", "stark")).unwrap();
    backend.delete(&record_key("persons", &a)).unwrap();

    let page = db
        .execute(&Query::filtered("persons", eq("lastname", "stark")))
        .unwrap();

    let found: Vec<_> = page.items().iter().filter_map(Entity::id).collect();
    assert_eq!(found, vec![b.as_str()]);
}

#[test]
fn near_intersects_with_equality() {
    let (_, db) = setup();
    let palermo = db.save(city("palermo", PALERMO)).unwrap();
    db.save(city("catania", CATANIA)).unwrap();

    let query = QueryBuilder::new("cities")
        .filter(eq("name", "palermo"))
        .near("location", GeoPoint::new(15.0, 37.0), Distance::kilometers(200.0))
        .build();

    assert_eq!(db.execute_ids(&query).unwrap().ids, vec![palermo]);

    let query = QueryBuilder::new("cities")
        .filter(eq("name", "palermo"))
        .near("location", GeoPoint::new(15.0, 37.0), Distance::kilometers(100.0))
        .build();
    assert!(db.execute_ids(&query).unwrap().ids.is_empty());
}

#[test]
fn paging_reports_the_pre_page_total() {
    let (_, db) = setup();
    for name in ["a", "b", "c"] {
        db.save(person(name, "stark")).unwrap();
    }

    let query =
        Query::filtered("persons", eq("lastname", "stark")).with_page(PageRequest::new(1, 2));
    let page = db.execute(&query).unwrap();

    assert_eq!(page.number_of_elements(), 1);
    assert_eq!(page.total(), 3);
    assert!(!page.has_next());
}

#[test]
fn metrics_sink_sees_every_lookup() {
    let recorder = Arc::new(MetricsRecorder::new());
    let db = Db::new(Arc::new(MemoryBackend::new()), schema())
        .with_metrics(recorder.clone())
        .debug();

    db.save(city("palermo", PALERMO)).unwrap();
    db.execute(&Query::filtered(
        "cities",
        near("location", PALERMO, Distance::meters(0.0)),
    ))
    .unwrap();
    db.execute(&Query::filtered("cities", eq("name", "palermo")))
        .unwrap();
    db.find_all("cities", None).unwrap();

    let report = recorder.report();
    assert_eq!(report.near_lookups, 1);
    assert_eq!(report.equality_lookups, 1);
    assert_eq!(report.member_lookups, 1);
    assert_eq!(report.index_inserts, 2);
    assert_eq!(report.keyspace("cities").save_calls, 1);
}

// ----------------------------------------------------------------------
// key layout
// ----------------------------------------------------------------------

#[test]
fn index_paths_with_escapes_do_not_alias_entity_ids() {
    let schema = Schema::new([KeyspaceModel::new("cities").geo_index("loc\\")]).unwrap();
    let db = Db::new(Arc::new(MemoryBackend::new()), schema);

    let aliased = db
        .save(Entity::new("cities").with_id("loc:geo").with("name", "x"))
        .unwrap();
    let located = db
        .save(Entity::new("cities").with("loc\\", PALERMO))
        .unwrap();

    let query = Query::filtered(
        "cities",
        near("loc\\", PALERMO, Distance::kilometers(1.0)),
    );
    assert_eq!(db.execute_ids(&query).unwrap().ids, vec![located]);
    assert_eq!(
        db.find_by_id("cities", &aliased)
            .unwrap()
            .and_then(|c| c.text("name").map(str::to_string)),
        Some("x".to_string())
    );
    assert_eq!(db.count("cities").unwrap(), 2);
}

#[test]
fn stored_values_do_not_grow_with_the_keyspace() {
    fn largest_value(backend: &MemoryBackend) -> usize {
        backend
            .scan_prefix("")
            .unwrap()
            .into_iter()
            .map(|(_, value)| value.len())
            .max()
            .unwrap_or(0)
    }

    let (backend, db) = setup();
    db.save_many((0..10).map(|_| city("hub", CATANIA))).unwrap();
    let small = largest_value(&backend);

    db.save_many((0..490).map(|_| city("hub", CATANIA))).unwrap();

    // every entry, member and point is its own key
    assert!(largest_value(&backend) <= small);
    assert_eq!(db.count("cities").unwrap(), 500);
    assert_eq!(
        db.execute_ids(&Query::filtered("cities", eq("name", "hub")))
            .unwrap()
            .total,
        500
    );
    let nearby = near("location", CATANIA, Distance::kilometers(1.0));
    assert_eq!(
        db.execute_ids(&Query::filtered("cities", nearby)).unwrap().total,
        500
    );
}
