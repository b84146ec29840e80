use crate::error::Result;
use kartei_store::Store;
use serde::Serialize;

/// Which of the submitted phones already have a stored contact. Read-only;
/// the answer can go stale before a later confirm (no reservation is taken).
#[derive(Debug, Clone, Serialize)]
pub struct PreviewReport {
    pub existing: Vec<String>,
}

impl PreviewReport {
    pub fn new_count(&self, submitted: usize) -> usize {
        submitted.saturating_sub(self.existing.len())
    }
}

pub fn preview(store: &Store, phones: &[String]) -> Result<PreviewReport> {
    let existing = store.contacts().existing_phones(phones)?;
    Ok(PreviewReport { existing })
}
