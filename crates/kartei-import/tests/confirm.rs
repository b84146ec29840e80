use kartei_core::domain::FALLBACK_LOCATION_NAME;
use kartei_import::confirm::{confirm, confirm_with_tables, LookupTables};
use kartei_import::row::NormalizedContact;
use kartei_store::Store;

const NOW: i64 = 1_700_000_000;

fn open_store() -> Store {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    store
}

fn contact(phone: &str) -> NormalizedContact {
    NormalizedContact {
        phone: phone.to_string(),
        ..Default::default()
    }
}

#[test]
fn first_import_creates_then_second_updates() {
    let store = open_store();
    let mut row = contact("+491512345678");
    row.first_name = Some("Mara".to_string());
    row.location = Some("Berlin".to_string());

    let first = confirm(&store, NOW, &[row.clone()]).expect("first confirm");
    assert_eq!(first.created, 1);
    assert_eq!(first.updated, 0);
    assert_eq!(first.skipped, 0);
    assert!(first.errors.is_empty());
    assert!(first.reason.is_none());

    let second = confirm(&store, NOW + 5, &[row]).expect("second confirm");
    assert_eq!(second.created, 0);
    assert_eq!(second.updated, 1);
    assert_eq!(store.contacts().count().expect("count"), 1);
}

#[test]
fn blank_location_falls_back_to_admin_only_default() {
    let store = open_store();
    let mut without = contact("+491512345678");
    without.location = None;
    let mut blank = contact("+491601234567");
    blank.location = Some("   ".to_string());

    let summary = confirm(&store, NOW, &[without, blank]).expect("confirm");
    assert_eq!(summary.created, 2);

    let fallback = store
        .locations()
        .find_by_name(FALLBACK_LOCATION_NAME)
        .expect("find fallback")
        .expect("fallback exists");
    assert!(fallback.admin_only);
    assert_eq!(store.locations().list().expect("list locations").len(), 1);
}

#[test]
fn named_location_is_created_without_admin_flag() {
    let store = open_store();
    let mut row = contact("+491512345678");
    row.location = Some("Berlin".to_string());

    confirm(&store, NOW, &[row]).expect("confirm");

    let berlin = store
        .locations()
        .find_by_name("berlin")
        .expect("find location")
        .expect("location exists");
    assert_eq!(berlin.name, "Berlin");
    assert!(!berlin.admin_only);
}

#[test]
fn labels_differing_in_case_share_one_entity() {
    let store = open_store();
    let mut first = contact("+491512345678");
    first.labels = vec!["VIP".to_string()];
    let mut second = contact("+491601234567");
    second.labels = vec!["vip".to_string()];

    let summary = confirm(&store, NOW, &[first, second]).expect("confirm");
    assert_eq!(summary.created, 2);
    assert!(summary.errors.is_empty());

    let labels = store.labels().list_with_counts().expect("label counts");
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].0.name, "VIP");
    assert_eq!(labels[0].1, 2);
}

#[test]
fn relinking_same_label_is_idempotent() {
    let store = open_store();
    let mut row = contact("+491512345678");
    row.labels = vec!["VIP".to_string(), "vip".to_string()];

    confirm(&store, NOW, &[row.clone()]).expect("first confirm");
    confirm(&store, NOW + 5, &[row]).expect("second confirm");

    let stored = store
        .contacts()
        .find_by_phone("+491512345678")
        .expect("find contact")
        .expect("contact exists");
    let linked = store
        .labels()
        .list_for_contact(stored.id)
        .expect("labels for contact");
    assert_eq!(linked.len(), 1);
}

#[test]
fn blocked_location_insert_skips_row_but_not_batch() {
    let store = open_store();
    store
        .connection()
        .execute_batch(
            "CREATE TRIGGER block_hamburg BEFORE INSERT ON locations
             WHEN NEW.name_key = 'hamburg'
             BEGIN SELECT RAISE(ABORT, 'locations locked'); END;",
        )
        .expect("create trigger");

    let mut blocked = contact("+491512345678");
    blocked.location = Some("Hamburg".to_string());
    let mut fine = contact("+491601234567");
    fine.location = Some("Berlin".to_string());

    let summary = confirm(&store, NOW, &[blocked, fine]).expect("confirm");
    assert_eq!(summary.created, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].phone, "+491512345678");
    assert!(summary.errors[0].reason.contains("locations locked"));
    assert!(summary.reason.is_none());

    assert!(store
        .contacts()
        .find_by_phone("+491512345678")
        .expect("find blocked")
        .is_none());
    assert!(store
        .contacts()
        .find_by_phone("+491601234567")
        .expect("find fine")
        .is_some());
}

#[test]
fn label_failure_is_soft() {
    let store = open_store();
    store
        .connection()
        .execute_batch(
            "CREATE TRIGGER block_vip BEFORE INSERT ON labels
             WHEN NEW.name_key = 'vip'
             BEGIN SELECT RAISE(ABORT, 'labels locked'); END;",
        )
        .expect("create trigger");

    let mut row = contact("+491512345678");
    row.labels = vec!["VIP".to_string(), "Stammkunde".to_string()];

    let summary = confirm(&store, NOW, &[row]).expect("confirm");
    assert_eq!(summary.created, 1);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].reason.contains("VIP"));
    assert!(summary.reason.is_none());

    let stored = store
        .contacts()
        .find_by_phone("+491512345678")
        .expect("find contact")
        .expect("contact exists");
    let linked = store
        .labels()
        .list_for_contact(stored.id)
        .expect("labels for contact");
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].name, "Stammkunde");
}

#[test]
fn second_import_keeps_fields_absent_from_payload() {
    let store = open_store();
    let mut first = contact("+491512345678");
    first.first_name = Some("Mara".to_string());
    first.price_total_cents = Some(45_000);
    confirm(&store, NOW, &[first]).expect("first confirm");

    let mut second = contact("+491512345678");
    second.last_name = Some("Klein".to_string());
    confirm(&store, NOW + 5, &[second]).expect("second confirm");

    let stored = store
        .contacts()
        .find_by_phone("+491512345678")
        .expect("find contact")
        .expect("contact exists");
    assert_eq!(stored.first_name.as_deref(), Some("Mara"));
    assert_eq!(stored.last_name.as_deref(), Some("Klein"));
    assert_eq!(stored.price_total_cents, Some(45_000));
    assert_eq!(stored.created_at, NOW);
    assert_eq!(stored.updated_at, NOW + 5);
}

#[test]
fn duplicate_phone_within_one_batch_counts_create_and_update() {
    let store = open_store();
    let mut first = contact("+491512345678");
    first.first_name = Some("Mara".to_string());
    let mut second = contact("+491512345678");
    second.first_name = Some("Marlene".to_string());

    let summary = confirm(&store, NOW, &[first, second]).expect("confirm");
    assert_eq!(summary.created, 1);
    assert_eq!(summary.updated, 1);
    assert_eq!(store.contacts().count().expect("count"), 1);

    let stored = store
        .contacts()
        .find_by_phone("+491512345678")
        .expect("find contact")
        .expect("contact exists");
    assert_eq!(stored.first_name.as_deref(), Some("Marlene"));
}

#[test]
fn empty_batch_reports_nothing_imported() {
    let store = open_store();

    let summary = confirm(&store, NOW, &[]).expect("confirm");
    assert_eq!(summary.created, 0);
    assert_eq!(summary.updated, 0);
    assert_eq!(summary.skipped, 0);
    assert!(summary.errors.is_empty());
    assert_eq!(summary.reason.as_deref(), Some("nothing imported"));
}

#[test]
fn all_rows_failing_surfaces_first_error_as_reason() {
    let store = open_store();
    store
        .connection()
        .execute_batch(
            "CREATE TRIGGER block_all BEFORE INSERT ON locations
             BEGIN SELECT RAISE(ABORT, 'locations locked'); END;",
        )
        .expect("create trigger");

    let mut row = contact("+491512345678");
    row.location = Some("Berlin".to_string());

    let summary = confirm(&store, NOW, &[row]).expect("confirm");
    assert_eq!(summary.created, 0);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.reason, Some(summary.errors[0].reason.clone()));
}

#[test]
fn errors_carry_sheet_row_numbers() {
    let store = open_store();
    store
        .connection()
        .execute_batch(
            "CREATE TRIGGER block_all BEFORE INSERT ON locations
             BEGIN SELECT RAISE(ABORT, 'locations locked'); END;",
        )
        .expect("create trigger");

    let mut positional = contact("+491512345678");
    positional.location = Some("Berlin".to_string());
    let mut from_sheet = contact("+491601234567");
    from_sheet.location = Some("Berlin".to_string());
    from_sheet.source_row = Some(41);

    let summary = confirm(&store, NOW, &[positional, from_sheet]).expect("confirm");
    assert_eq!(summary.errors.len(), 2);
    assert_eq!(summary.errors[0].row, 1);
    assert_eq!(summary.errors[1].row, 41);
}

#[test]
fn chunked_confirm_shares_lookup_tables() {
    let store = open_store();
    let mut tables = LookupTables::load(&store).expect("load tables");

    let mut first = contact("+491512345678");
    first.location = Some("Berlin".to_string());
    first.labels = vec!["VIP".to_string()];
    let mut second = contact("+491601234567");
    second.location = Some("berlin".to_string());
    second.labels = vec!["vip".to_string()];

    let chunk_one = confirm_with_tables(&store, NOW, &mut tables, &[first]);
    let chunk_two = confirm_with_tables(&store, NOW, &mut tables, &[second]);
    assert_eq!(chunk_one.created, 1);
    assert_eq!(chunk_two.created, 1);

    assert_eq!(store.locations().list().expect("locations").len(), 1);
    assert_eq!(store.labels().list().expect("labels").len(), 1);
}
