use crate::error::{Result, StoreError};
use kartei_core::domain::{label_key, ContactId, Label, LabelId};
use rusqlite::{params, Connection};
use std::str::FromStr;

pub struct LabelsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> LabelsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// First writer wins: an existing row keeps the casing it was created with.
    pub fn upsert(&self, now_utc: i64, name: &str) -> Result<Label> {
        upsert_inner(self.conn, now_utc, name)
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<Label>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, created_at FROM labels WHERE name_key = ?1;")?;
        let mut rows = stmt.query([label_key(name)])?;
        if let Some(row) = rows.next()? {
            Ok(Some(label_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn list(&self) -> Result<Vec<Label>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, created_at FROM labels ORDER BY name COLLATE NOCASE ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut labels = Vec::new();
        while let Some(row) = rows.next()? {
            labels.push(label_from_row(row)?);
        }
        Ok(labels)
    }

    pub fn list_with_counts(&self) -> Result<Vec<(Label, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT labels.id, labels.name, labels.created_at, COUNT(contact_labels.contact_id) AS cnt
             FROM labels
             LEFT JOIN contact_labels ON labels.id = contact_labels.label_id
             GROUP BY labels.id
             ORDER BY labels.name COLLATE NOCASE ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let label = label_from_row(row)?;
            let count: i64 = row.get(3)?;
            items.push((label, count));
        }
        Ok(items)
    }

    pub fn list_for_contact(&self, contact_id: ContactId) -> Result<Vec<Label>> {
        let mut stmt = self.conn.prepare(
            "SELECT labels.id, labels.name, labels.created_at
             FROM labels
             INNER JOIN contact_labels ON labels.id = contact_labels.label_id
             WHERE contact_labels.contact_id = ?1
             ORDER BY labels.name COLLATE NOCASE ASC;",
        )?;
        let mut rows = stmt.query([contact_id.to_string()])?;
        let mut labels = Vec::new();
        while let Some(row) = rows.next()? {
            labels.push(label_from_row(row)?);
        }
        Ok(labels)
    }

    pub fn link_contact(&self, contact_id: ContactId, label_id: LabelId) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO contact_labels (contact_id, label_id) VALUES (?1, ?2);",
            params![contact_id.to_string(), label_id.to_string()],
        )?;
        Ok(())
    }
}

fn upsert_inner(conn: &Connection, now_utc: i64, name: &str) -> Result<Label> {
    let candidate = Label::new(name, now_utc)?;
    let key = label_key(&candidate.name);

    conn.execute(
        "INSERT INTO labels (id, name, name_key, created_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(name_key) DO NOTHING;",
        params![
            candidate.id.to_string(),
            candidate.name,
            key,
            candidate.created_at,
        ],
    )?;

    let mut stmt = conn.prepare("SELECT id, name, created_at FROM labels WHERE name_key = ?1;")?;
    let mut rows = stmt.query([key])?;
    if let Some(row) = rows.next()? {
        label_from_row(row)
    } else {
        Err(StoreError::Migration(
            "missing label after upsert".to_string(),
        ))
    }
}

fn label_from_row(row: &rusqlite::Row<'_>) -> Result<Label> {
    let id_str: String = row.get(0)?;
    let id = LabelId::from_str(&id_str).map_err(|_| StoreError::InvalidId(id_str.clone()))?;
    Ok(Label {
        id,
        name: row.get(1)?,
        created_at: row.get(2)?,
    })
}
