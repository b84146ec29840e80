use crate::error::{Result, StoreError};
use kartei_core::domain::{location_key, Location, LocationId};
use rusqlite::{params, Connection};
use std::str::FromStr;

pub struct LocationsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> LocationsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Plain insert; a clashing `name_key` surfaces as a constraint error.
    pub fn insert(&self, now_utc: i64, name: &str, admin_only: bool) -> Result<Location> {
        let candidate = Location::new(name, admin_only, now_utc)?;
        self.conn.execute(
            "INSERT INTO locations (id, name, name_key, admin_only, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                candidate.id.to_string(),
                candidate.name,
                location_key(&candidate.name),
                candidate.admin_only,
                candidate.created_at,
                candidate.updated_at,
            ],
        )?;
        Ok(candidate)
    }

    /// First writer wins: an existing row keeps its casing and admin flag.
    pub fn upsert(&self, now_utc: i64, name: &str, admin_only: bool) -> Result<Location> {
        upsert_inner(self.conn, now_utc, name, admin_only)
    }

    pub fn get(&self, id: LocationId) -> Result<Option<Location>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, admin_only, created_at, updated_at
             FROM locations WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(location_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<Location>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, admin_only, created_at, updated_at
             FROM locations WHERE name_key = ?1;",
        )?;
        let mut rows = stmt.query([location_key(name)])?;
        if let Some(row) = rows.next()? {
            Ok(Some(location_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn list(&self) -> Result<Vec<Location>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, admin_only, created_at, updated_at
             FROM locations ORDER BY name COLLATE NOCASE ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut locations = Vec::new();
        while let Some(row) = rows.next()? {
            locations.push(location_from_row(row)?);
        }
        Ok(locations)
    }

    pub fn list_with_counts(&self) -> Result<Vec<(Location, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT locations.id, locations.name, locations.admin_only, locations.created_at, locations.updated_at,
                    COUNT(contacts.id) AS cnt
             FROM locations
             LEFT JOIN contacts ON contacts.location_id = locations.id
             GROUP BY locations.id
             ORDER BY locations.name COLLATE NOCASE ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let location = location_from_row(row)?;
            let count: i64 = row.get(5)?;
            items.push((location, count));
        }
        Ok(items)
    }
}

fn upsert_inner(conn: &Connection, now_utc: i64, name: &str, admin_only: bool) -> Result<Location> {
    let candidate = Location::new(name, admin_only, now_utc)?;
    let key = location_key(&candidate.name);

    conn.execute(
        "INSERT INTO locations (id, name, name_key, admin_only, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(name_key) DO NOTHING;",
        params![
            candidate.id.to_string(),
            candidate.name,
            key,
            candidate.admin_only,
            candidate.created_at,
            candidate.updated_at,
        ],
    )?;

    let mut stmt = conn.prepare(
        "SELECT id, name, admin_only, created_at, updated_at
         FROM locations WHERE name_key = ?1;",
    )?;
    let mut rows = stmt.query([key])?;
    if let Some(row) = rows.next()? {
        location_from_row(row)
    } else {
        Err(StoreError::Migration(
            "missing location after upsert".to_string(),
        ))
    }
}

fn location_from_row(row: &rusqlite::Row<'_>) -> Result<Location> {
    let id_str: String = row.get(0)?;
    let id = LocationId::from_str(&id_str).map_err(|_| StoreError::InvalidId(id_str.clone()))?;
    Ok(Location {
        id,
        name: row.get(1)?,
        admin_only: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}
