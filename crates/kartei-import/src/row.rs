use crate::money::parse_cents;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use kartei_core::domain::normalize_phone_with_country;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fixed German column headers of the studio spreadsheet export.
pub mod columns {
    pub const PHONE: &str = "Telefon";
    pub const FIRST_NAME: &str = "Vorname";
    pub const LAST_NAME: &str = "Nachname";
    pub const GENDER: &str = "Geschlecht";
    pub const EMAIL: &str = "E-Mail-Adresse";
    pub const TELEGRAM: &str = "Telegram Account";
    pub const ORIGIN: &str = "Herkunft";
    pub const TATTOO_SIZE: &str = "Formular | Größe Tattoo";
    pub const ARTIST: &str = "Buchung bei Artist";
    pub const SIGNUP_DATE: &str = "Datum Eintragung";
    pub const CONSULTATION_DATE: &str = "Datum Erstgespräch";
    pub const APPOINTMENT_DATE: &str = "Datum Tattoo-Termin";
    pub const PRICE_DEPOSIT: &str = "Preis | Anzahlung";
    pub const PRICE_TOTAL: &str = "Preis | Gesamt";
    pub const LAST_MESSAGE_SENT: &str = "Zuletzt gesendete Nachricht am";
    pub const LAST_MESSAGE_RECEIVED: &str = "Zuletzt empfangene Nachricht am";
    pub const LOCATION: &str = "Standort";
    pub const LABELS: &str = "Labels";
}

/// One spreadsheet line as header-to-cell pairs, discarded after mapping.
pub type RawRow = HashMap<String, String>;

/// Canonical import unit produced by [`map_row`] and consumed by preview and
/// confirm. The phone is already in `+`-digits form; everything else is
/// optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizedContact {
    pub phone: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub telegram: Option<String>,
    pub origin: Option<String>,
    pub tattoo_size: Option<String>,
    pub artist: Option<String>,
    pub signup_date: Option<String>,
    pub consultation_date: Option<String>,
    pub appointment_date: Option<String>,
    pub price_deposit_cents: Option<i64>,
    pub price_total_cents: Option<i64>,
    pub last_message_sent_at: Option<String>,
    pub last_message_received_at: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub source_row: Option<u32>,
}

/// Validation failure tied to one input row. Reported, never retried.
#[derive(Debug, Clone, Serialize)]
pub struct ImportIssue {
    pub row: u32,
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct MappedRow {
    pub contact: Option<NormalizedContact>,
    pub issues: Vec<ImportIssue>,
}

// %y before %Y: the latter reads a two-digit year literally as year 24.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d.%m.%y", "%d.%m.%Y"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

/// Maps one raw spreadsheet row into a [`NormalizedContact`].
///
/// A missing or unusable phone drops the whole row and emits one issue for
/// the phone column. Blank cells become `None`; unparseable dates and prices
/// silently become `None` as well.
pub fn map_row(row: &RawRow, row_number: u32, country_code: &str) -> MappedRow {
    let mut issues = Vec::new();

    let phone = match field(row, columns::PHONE) {
        None => {
            issues.push(ImportIssue {
                row: row_number,
                field: columns::PHONE.to_string(),
                message: "missing phone number".to_string(),
            });
            return MappedRow {
                contact: None,
                issues,
            };
        }
        Some(raw) => match normalize_phone_with_country(&raw, country_code) {
            Some(phone) => phone,
            None => {
                issues.push(ImportIssue {
                    row: row_number,
                    field: columns::PHONE.to_string(),
                    message: format!("unusable phone number: {raw}"),
                });
                return MappedRow {
                    contact: None,
                    issues,
                };
            }
        },
    };

    let contact = NormalizedContact {
        phone,
        first_name: field(row, columns::FIRST_NAME),
        last_name: field(row, columns::LAST_NAME),
        gender: field(row, columns::GENDER),
        email: field(row, columns::EMAIL),
        telegram: field(row, columns::TELEGRAM),
        origin: field(row, columns::ORIGIN),
        tattoo_size: field(row, columns::TATTOO_SIZE),
        artist: field(row, columns::ARTIST),
        signup_date: field(row, columns::SIGNUP_DATE).and_then(|raw| parse_sheet_date(&raw)),
        consultation_date: field(row, columns::CONSULTATION_DATE)
            .and_then(|raw| parse_sheet_date(&raw)),
        appointment_date: field(row, columns::APPOINTMENT_DATE)
            .and_then(|raw| parse_sheet_date(&raw)),
        price_deposit_cents: field(row, columns::PRICE_DEPOSIT).and_then(|raw| parse_cents(&raw)),
        price_total_cents: field(row, columns::PRICE_TOTAL).and_then(|raw| parse_cents(&raw)),
        last_message_sent_at: field(row, columns::LAST_MESSAGE_SENT)
            .and_then(|raw| parse_sheet_datetime(&raw)),
        last_message_received_at: field(row, columns::LAST_MESSAGE_RECEIVED)
            .and_then(|raw| parse_sheet_datetime(&raw)),
        location: field(row, columns::LOCATION),
        labels: field(row, columns::LABELS)
            .map(|raw| split_labels(&raw))
            .unwrap_or_default(),
        source_row: Some(row_number),
    };

    MappedRow {
        contact: Some(contact),
        issues,
    }
}

/// Splits a label cell on commas, trimming each piece and dropping empties.
/// Order is preserved; duplicates are left for the confirm step to collapse.
pub fn split_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses a sheet date cell into `YYYY-MM-DD`, or `None` when unparseable.
pub fn parse_sheet_date(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(parsed.format("%Y-%m-%d").to_string());
        }
    }
    None
}

/// Parses a sheet timestamp cell into RFC 3339 UTC. Date-only cells become
/// midnight; naive timestamps are taken as UTC.
pub fn parse_sheet_datetime(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(
            parsed
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        );
    }
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed.and_utc().to_rfc3339_opts(SecondsFormat::Secs, true));
        }
    }
    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, format) {
            let midnight = parsed.and_hms_opt(0, 0, 0)?;
            return Some(midnight.and_utc().to_rfc3339_opts(SecondsFormat::Secs, true));
        }
    }
    None
}

fn field(row: &RawRow, name: &str) -> Option<String> {
    row.get(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kartei_core::domain::DEFAULT_COUNTRY_CODE;

    fn raw(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn map_row_normalizes_full_row() {
        let row = raw(&[
            (columns::PHONE, "0151 2345678"),
            (columns::FIRST_NAME, "Mara"),
            (columns::LAST_NAME, "Klein"),
            (columns::EMAIL, "mara@example.com"),
            (columns::ARTIST, "Nico"),
            (columns::SIGNUP_DATE, "03.02.2024"),
            (columns::PRICE_DEPOSIT, "150"),
            (columns::PRICE_TOTAL, "1.234,50"),
            (columns::LOCATION, "Berlin"),
            (columns::LABELS, "VIP, Anzahlung"),
        ]);

        let mapped = map_row(&row, 2, DEFAULT_COUNTRY_CODE);
        assert!(mapped.issues.is_empty());
        let contact = mapped.contact.expect("contact mapped");
        assert_eq!(contact.phone, "+491512345678");
        assert_eq!(contact.first_name.as_deref(), Some("Mara"));
        assert_eq!(contact.signup_date.as_deref(), Some("2024-02-03"));
        assert_eq!(contact.price_deposit_cents, Some(15_000));
        assert_eq!(contact.price_total_cents, Some(123_450));
        assert_eq!(contact.location.as_deref(), Some("Berlin"));
        assert_eq!(contact.labels, vec!["VIP", "Anzahlung"]);
        assert_eq!(contact.source_row, Some(2));
    }

    #[test]
    fn map_row_without_phone_yields_single_issue() {
        let row = raw(&[(columns::PHONE, "   "), (columns::FIRST_NAME, "Mara")]);

        let mapped = map_row(&row, 7, DEFAULT_COUNTRY_CODE);
        assert!(mapped.contact.is_none());
        assert_eq!(mapped.issues.len(), 1);
        assert_eq!(mapped.issues[0].row, 7);
        assert_eq!(mapped.issues[0].field, columns::PHONE);
        assert!(mapped.issues[0].message.contains("missing"));
    }

    #[test]
    fn map_row_with_short_phone_reports_raw_value() {
        let row = raw(&[(columns::PHONE, "123")]);

        let mapped = map_row(&row, 3, DEFAULT_COUNTRY_CODE);
        assert!(mapped.contact.is_none());
        assert_eq!(mapped.issues.len(), 1);
        assert!(mapped.issues[0].message.contains("123"));
    }

    #[test]
    fn map_row_treats_blank_cells_as_absent() {
        let row = raw(&[
            (columns::PHONE, "+491512345678"),
            (columns::EMAIL, ""),
            (columns::ARTIST, "  "),
        ]);

        let mapped = map_row(&row, 2, DEFAULT_COUNTRY_CODE);
        let contact = mapped.contact.expect("contact mapped");
        assert!(contact.email.is_none());
        assert!(contact.artist.is_none());
        assert!(contact.labels.is_empty());
    }

    #[test]
    fn map_row_drops_unparseable_dates_silently() {
        let row = raw(&[
            (columns::PHONE, "+491512345678"),
            (columns::SIGNUP_DATE, "sometime soon"),
            (columns::LAST_MESSAGE_SENT, "not a timestamp"),
        ]);

        let mapped = map_row(&row, 2, DEFAULT_COUNTRY_CODE);
        assert!(mapped.issues.is_empty());
        let contact = mapped.contact.expect("contact mapped");
        assert!(contact.signup_date.is_none());
        assert!(contact.last_message_sent_at.is_none());
    }

    #[test]
    fn sparse_json_payload_deserializes_with_defaults() {
        let contact: NormalizedContact =
            serde_json::from_str(r#"{"phone": "+491512345678", "first_name": "Mara"}"#)
                .expect("deserialize");
        assert_eq!(contact.phone, "+491512345678");
        assert_eq!(contact.first_name.as_deref(), Some("Mara"));
        assert!(contact.labels.is_empty());
        assert!(contact.source_row.is_none());
    }

    #[test]
    fn split_labels_trims_and_keeps_order() {
        assert_eq!(
            split_labels(" VIP , Anzahlung ,, vip "),
            vec!["VIP", "Anzahlung", "vip"]
        );
        assert!(split_labels("  ").is_empty());
    }

    #[test]
    fn parse_sheet_date_accepts_known_formats() {
        assert_eq!(parse_sheet_date("2024-02-03").as_deref(), Some("2024-02-03"));
        assert_eq!(parse_sheet_date("03.02.2024").as_deref(), Some("2024-02-03"));
        assert_eq!(parse_sheet_date("03.02.24").as_deref(), Some("2024-02-03"));
        assert_eq!(parse_sheet_date("3rd of Feb"), None);
    }

    #[test]
    fn parse_sheet_datetime_normalizes_to_utc() {
        assert_eq!(
            parse_sheet_datetime("2024-02-03T10:30:00+02:00").as_deref(),
            Some("2024-02-03T08:30:00Z")
        );
        assert_eq!(
            parse_sheet_datetime("03.02.2024 10:30").as_deref(),
            Some("2024-02-03T10:30:00Z")
        );
        assert_eq!(
            parse_sheet_datetime("2024-02-03").as_deref(),
            Some("2024-02-03T00:00:00Z")
        );
        assert_eq!(parse_sheet_datetime("yesterday"), None);
    }
}
