use crate::error::Result;
use rusqlite::Connection;
use std::sync::atomic::{AtomicU64, Ordering};

static SCRATCH_SEQ: AtomicU64 = AtomicU64::new(0);

/// Connection-scoped scratch table of phone numbers, dropped when the guard
/// goes out of scope. Lets bulk lookups join instead of building `IN (...)`
/// lists by hand.
pub(crate) struct PhoneScratch<'a> {
    conn: &'a Connection,
    name: String,
}

impl<'a> PhoneScratch<'a> {
    pub(crate) fn with_phones(conn: &'a Connection, phones: &[String]) -> Result<Self> {
        let name = next_name();
        conn.execute_batch(&format!("CREATE TEMP TABLE {name} (phone TEXT PRIMARY KEY);"))?;

        let scratch = Self { conn, name };
        let mut insert = scratch.conn.prepare(&format!(
            "INSERT OR IGNORE INTO {} (phone) VALUES (?1);",
            scratch.name
        ))?;
        for phone in phones {
            insert.execute([phone])?;
        }

        Ok(scratch)
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for PhoneScratch<'_> {
    fn drop(&mut self) {
        let _ = self
            .conn
            .execute(&format!("DROP TABLE IF EXISTS {};", self.name), []);
    }
}

// Scratch tables live in the temp schema, so the sequence only has to be
// unique within this process.
fn next_name() -> String {
    let seq = SCRATCH_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("temp.scratch_phones_{seq}")
}

#[cfg(test)]
mod tests {
    use super::next_name;

    #[test]
    fn scratch_names_do_not_repeat() {
        assert_ne!(next_name(), next_name());
    }
}
