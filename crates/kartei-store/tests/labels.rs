use kartei_store::repo::ContactNew;
use kartei_store::Store;

const NOW: i64 = 1_700_000_000;

fn open_store() -> Store {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    store
}

#[test]
fn upsert_matches_case_insensitively() {
    let store = open_store();

    let first = store.labels().upsert(NOW, "VIP").expect("upsert");
    let second = store.labels().upsert(NOW + 10, "vip").expect("upsert again");

    assert_eq!(first.id, second.id);
    assert_eq!(second.name, "VIP");
}

#[test]
fn find_by_name_ignores_case_and_whitespace() {
    let store = open_store();

    store.labels().upsert(NOW, "Walk-In").expect("upsert");
    let found = store
        .labels()
        .find_by_name(" walk-in ")
        .expect("find")
        .expect("label exists");
    assert_eq!(found.name, "Walk-In");
}

#[test]
fn link_contact_is_idempotent() {
    let store = open_store();
    let location = store
        .locations()
        .upsert(NOW, "Berlin", false)
        .expect("upsert location");
    let contact = store
        .contacts()
        .create(NOW, ContactNew::bare("+491512345678".to_string(), location.id))
        .expect("create contact");
    let label = store.labels().upsert(NOW, "VIP").expect("upsert label");

    store
        .labels()
        .link_contact(contact.id, label.id)
        .expect("link");
    store
        .labels()
        .link_contact(contact.id, label.id)
        .expect("link again");

    let labels = store
        .labels()
        .list_for_contact(contact.id)
        .expect("list for contact");
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].name, "VIP");
}

#[test]
fn list_with_counts_orders_by_name() {
    let store = open_store();
    let location = store
        .locations()
        .upsert(NOW, "Berlin", false)
        .expect("upsert location");
    let contact = store
        .contacts()
        .create(NOW, ContactNew::bare("+491512345678".to_string(), location.id))
        .expect("create contact");

    let vip = store.labels().upsert(NOW, "VIP").expect("upsert vip");
    store.labels().upsert(NOW, "Anzahlung").expect("upsert anzahlung");
    store.labels().link_contact(contact.id, vip.id).expect("link");

    let listed = store.labels().list_with_counts().expect("list with counts");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].0.name, "Anzahlung");
    assert_eq!(listed[0].1, 0);
    assert_eq!(listed[1].0.name, "VIP");
    assert_eq!(listed[1].1, 1);
}

#[test]
fn deleting_contact_cascades_label_links() {
    let store = open_store();
    let location = store
        .locations()
        .upsert(NOW, "Berlin", false)
        .expect("upsert location");
    let contact = store
        .contacts()
        .create(NOW, ContactNew::bare("+491512345678".to_string(), location.id))
        .expect("create contact");
    let label = store.labels().upsert(NOW, "VIP").expect("upsert label");
    store.labels().link_contact(contact.id, label.id).expect("link");

    store
        .contacts()
        .delete_by_phone("+491512345678")
        .expect("delete contact");

    let listed = store.labels().list_with_counts().expect("list with counts");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].1, 0);
}
