use crate::error::Result;
use crate::row::{map_row, ImportIssue, NormalizedContact, RawRow};

/// Result of mapping a whole spreadsheet: the rows that normalized cleanly,
/// the issues for those that did not, and the total data-row count.
#[derive(Debug, Clone)]
pub struct MappedSheet {
    pub contacts: Vec<NormalizedContact>,
    pub issues: Vec<ImportIssue>,
    pub rows_total: usize,
}

/// Reads a delimited sheet export and maps every data row.
///
/// The first line must carry the German column headers; data rows are
/// numbered from 2 to match what the user sees in their spreadsheet. A
/// malformed file (bad quoting, invalid UTF-8) fails the whole read.
pub fn read_sheet(text: &str, delimiter: u8, country_code: &str) -> Result<MappedSheet> {
    let text = text.trim_start_matches('\u{FEFF}');

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();

    let mut contacts = Vec::new();
    let mut issues = Vec::new();
    let mut rows_total = 0usize;

    for (index, record) in reader.records().enumerate() {
        let record = record?;
        rows_total += 1;
        let row_number = (index + 2) as u32;

        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        let mapped = map_row(&row, row_number, country_code);
        issues.extend(mapped.issues);
        if let Some(contact) = mapped.contact {
            contacts.push(contact);
        }
    }

    Ok(MappedSheet {
        contacts,
        issues,
        rows_total,
    })
}
