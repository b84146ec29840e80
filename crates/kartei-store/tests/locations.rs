use kartei_store::repo::ContactNew;
use kartei_store::Store;

const NOW: i64 = 1_700_000_000;

fn open_store() -> Store {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    store
}

#[test]
fn upsert_keeps_first_seen_casing_and_flag() {
    let store = open_store();

    let first = store
        .locations()
        .upsert(NOW, "Berlin Mitte", false)
        .expect("upsert");
    let second = store
        .locations()
        .upsert(NOW + 10, "BERLIN MITTE", true)
        .expect("upsert again");

    assert_eq!(first.id, second.id);
    assert_eq!(second.name, "Berlin Mitte");
    assert!(!second.admin_only);
}

#[test]
fn upsert_rejects_blank_name() {
    let store = open_store();
    assert!(store.locations().upsert(NOW, "   ", false).is_err());
}

#[test]
fn find_by_name_matches_any_casing() {
    let store = open_store();

    store.locations().upsert(NOW, "Wien", false).expect("upsert");
    let found = store
        .locations()
        .find_by_name(" WIEN ")
        .expect("find")
        .expect("location exists");
    assert_eq!(found.name, "Wien");
}

#[test]
fn list_with_counts_includes_empty_locations() {
    let store = open_store();

    let berlin = store
        .locations()
        .upsert(NOW, "Berlin", false)
        .expect("upsert berlin");
    store.locations().upsert(NOW, "Wien", false).expect("upsert wien");
    store
        .contacts()
        .create(NOW, ContactNew::bare("+491512345678".to_string(), berlin.id))
        .expect("create contact");

    let listed = store
        .locations()
        .list_with_counts()
        .expect("list with counts");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].0.name, "Berlin");
    assert_eq!(listed[0].1, 1);
    assert_eq!(listed[1].0.name, "Wien");
    assert_eq!(listed[1].1, 0);
}
