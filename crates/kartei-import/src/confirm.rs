use crate::error::Result;
use crate::row::NormalizedContact;
use kartei_core::domain::{
    is_fallback_location, label_key, location_key, LabelId, LocationId, FALLBACK_LOCATION_NAME,
};
use kartei_store::error::StoreError;
use kartei_store::repo::ContactNew;
use kartei_store::Store;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

/// Case-insensitive name caches for one import invocation. Loaded from
/// storage up front; chunks of the same invocation share them, separate
/// invocations never do.
pub struct LookupTables {
    locations: HashMap<String, LocationId>,
    labels: HashMap<String, LabelId>,
}

impl LookupTables {
    pub fn load(store: &Store) -> Result<Self> {
        let mut locations = HashMap::new();
        for location in store.locations().list()? {
            locations.insert(location_key(&location.name), location.id);
        }

        let mut labels = HashMap::new();
        for label in store.labels().list()? {
            labels.insert(label_key(&label.name), label.id);
        }

        Ok(Self { locations, labels })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    Created,
    Updated,
}

/// One failed step, tied back to the sheet row and raw phone for
/// traceability.
#[derive(Debug, Clone, Serialize)]
pub struct RowError {
    pub row: u32,
    pub phone: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<RowError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

struct RowSuccess {
    outcome: RowOutcome,
    soft_errors: Vec<String>,
}

/// Writes a batch of normalized contacts.
///
/// Rows are processed strictly in order and fail independently; only the
/// initial lookup-table load can fail the whole call.
pub fn confirm(
    store: &Store,
    now_utc: i64,
    contacts: &[NormalizedContact],
) -> Result<ImportSummary> {
    let mut tables = LookupTables::load(store)?;
    Ok(confirm_with_tables(store, now_utc, &mut tables, contacts))
}

/// Batch loop behind [`confirm`], reusing caller-owned lookup tables so a
/// chunked import keeps one cache across its chunks.
pub fn confirm_with_tables(
    store: &Store,
    now_utc: i64,
    tables: &mut LookupTables,
    contacts: &[NormalizedContact],
) -> ImportSummary {
    let mut summary = ImportSummary {
        created: 0,
        updated: 0,
        skipped: 0,
        errors: Vec::new(),
        reason: None,
    };

    for (index, contact) in contacts.iter().enumerate() {
        let row = contact.source_row.unwrap_or((index + 1) as u32);
        match apply_contact(store, now_utc, tables, contact) {
            Ok(success) => {
                match success.outcome {
                    RowOutcome::Created => summary.created += 1,
                    RowOutcome::Updated => summary.updated += 1,
                }
                for reason in success.soft_errors {
                    debug!(row, phone = %contact.phone, %reason, "label step failed");
                    summary.errors.push(RowError {
                        row,
                        phone: contact.phone.clone(),
                        reason,
                    });
                }
            }
            Err(err) => {
                let reason = err.to_string();
                debug!(row, phone = %contact.phone, %reason, "row skipped");
                summary.skipped += 1;
                summary.errors.push(RowError {
                    row,
                    phone: contact.phone.clone(),
                    reason,
                });
            }
        }
    }

    if summary.created + summary.updated == 0 {
        summary.reason = Some(
            summary
                .errors
                .first()
                .map(|error| error.reason.clone())
                .unwrap_or_else(|| "nothing imported".to_string()),
        );
    }

    info!(
        created = summary.created,
        updated = summary.updated,
        skipped = summary.skipped,
        errors = summary.errors.len(),
        "import batch finished"
    );
    summary
}

/// Processes one row: resolve the location, upsert the contact, link labels.
///
/// An `Err` skips the row entirely. Label trouble after a successful upsert
/// comes back as soft errors instead, since the contact write already
/// counted.
fn apply_contact(
    store: &Store,
    now_utc: i64,
    tables: &mut LookupTables,
    contact: &NormalizedContact,
) -> std::result::Result<RowSuccess, StoreError> {
    let location_name = contact
        .location
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(FALLBACK_LOCATION_NAME);
    let location_id = match tables.locations.get(&location_key(location_name)) {
        Some(id) => *id,
        None => {
            let admin_only = is_fallback_location(location_name);
            let location = store.locations().insert(now_utc, location_name, admin_only)?;
            tables
                .locations
                .insert(location_key(&location.name), location.id);
            location.id
        }
    };

    // Advisory only: the upsert below is what decides the stored state.
    let existing = store.contacts().find_by_phone(&contact.phone)?;

    let input = storage_payload(contact, contact.phone.clone(), location_id);
    store.contacts().upsert_by_phone(now_utc, &input)?;

    let outcome = if existing.is_some() {
        RowOutcome::Updated
    } else {
        RowOutcome::Created
    };

    let mut soft_errors = Vec::new();
    if !contact.labels.is_empty() {
        link_labels(store, now_utc, tables, contact, &mut soft_errors);
    }

    Ok(RowSuccess {
        outcome,
        soft_errors,
    })
}

fn link_labels(
    store: &Store,
    now_utc: i64,
    tables: &mut LookupTables,
    contact: &NormalizedContact,
    soft_errors: &mut Vec<String>,
) {
    let stored = match store.contacts().find_by_phone(&contact.phone) {
        Ok(Some(stored)) => stored,
        Ok(None) => {
            soft_errors.push("contact vanished before label linking".to_string());
            return;
        }
        Err(err) => {
            soft_errors.push(format!("label lookup: {err}"));
            return;
        }
    };

    for raw in &contact.labels {
        let name = raw.trim();
        if name.is_empty() {
            continue;
        }
        let label_id = match tables.labels.get(&label_key(name)) {
            Some(id) => *id,
            None => match store.labels().upsert(now_utc, name) {
                Ok(label) => {
                    tables.labels.insert(label_key(&label.name), label.id);
                    label.id
                }
                Err(err) => {
                    soft_errors.push(format!("label {name:?}: {err}"));
                    continue;
                }
            },
        };
        if let Err(err) = store.labels().link_contact(stored.id, label_id) {
            soft_errors.push(format!("label {name:?}: {err}"));
        }
    }
}

/// Translates a normalized contact into the storage payload. Blank strings
/// are dropped so they never overwrite stored values.
pub fn storage_payload(
    contact: &NormalizedContact,
    phone_e164: String,
    location_id: LocationId,
) -> ContactNew {
    let mut input = ContactNew::bare(phone_e164, location_id);
    input.first_name = non_empty(&contact.first_name);
    input.last_name = non_empty(&contact.last_name);
    input.gender = non_empty(&contact.gender);
    input.email = non_empty(&contact.email);
    input.telegram = non_empty(&contact.telegram);
    input.origin = non_empty(&contact.origin);
    input.tattoo_size = non_empty(&contact.tattoo_size);
    input.artist = non_empty(&contact.artist);
    input.signup_date = non_empty(&contact.signup_date);
    input.consultation_date = non_empty(&contact.consultation_date);
    input.appointment_date = non_empty(&contact.appointment_date);
    input.price_deposit_cents = contact.price_deposit_cents;
    input.price_total_cents = contact.price_total_cents;
    input.last_message_sent_at = non_empty(&contact.last_message_sent_at);
    input.last_message_received_at = non_empty(&contact.last_message_received_at);
    input
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::{ImportSummary, RowError};

    #[test]
    fn summary_omits_reason_when_unset() {
        let summary = ImportSummary {
            created: 1,
            updated: 0,
            skipped: 0,
            errors: Vec::new(),
            reason: None,
        };
        let json = serde_json::to_value(&summary).expect("serialize");
        assert!(json.get("reason").is_none());
        assert_eq!(json["created"], 1);
    }

    #[test]
    fn summary_serializes_errors_with_row_and_phone() {
        let summary = ImportSummary {
            created: 0,
            updated: 0,
            skipped: 1,
            errors: vec![RowError {
                row: 4,
                phone: "+491512345678".to_string(),
                reason: "locations locked".to_string(),
            }],
            reason: Some("locations locked".to_string()),
        };
        let json = serde_json::to_value(&summary).expect("serialize");
        assert_eq!(json["errors"][0]["row"], 4);
        assert_eq!(json["errors"][0]["phone"], "+491512345678");
        assert_eq!(json["reason"], "locations locked");
    }
}
