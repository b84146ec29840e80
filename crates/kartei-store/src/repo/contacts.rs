use crate::error::{is_unique_violation, Result, StoreError};
use crate::temp_table::PhoneScratch;
use kartei_core::domain::{is_canonical_phone, location_key, Contact, ContactId, LocationId};
use kartei_core::CoreError;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct ContactNew {
    pub phone_e164: String,
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
    pub location_id: LocationId,
}

impl ContactNew {
    pub fn bare(phone_e164: String, location_id: LocationId) -> Self {
        Self {
            phone_e164,
            first_name: None,
            last_name: None,
            gender: None,
            email: None,
            telegram: None,
            origin: None,
            tattoo_size: None,
            artist: None,
            signup_date: None,
            consultation_date: None,
            appointment_date: None,
            price_deposit_cents: None,
            price_total_cents: None,
            last_message_sent_at: None,
            last_message_received_at: None,
            location_id,
        }
    }
}

pub struct ContactsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> ContactsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create(&self, now_utc: i64, input: ContactNew) -> Result<Contact> {
        if self.conn.is_autocommit() {
            let tx = self.conn.unchecked_transaction()?;
            let contact = create_inner(&tx, now_utc, input)?;
            tx.commit()?;
            Ok(contact)
        } else {
            create_inner(self.conn, now_utc, input)
        }
    }

    pub fn get(&self, id: ContactId) -> Result<Option<Contact>> {
        get_inner(self.conn, id)
    }

    pub fn find_by_phone(&self, phone: &str) -> Result<Option<Contact>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, phone_e164, first_name, last_name, gender, email, telegram, origin, tattoo_size, artist, signup_date, consultation_date, appointment_date, price_deposit_cents, price_total_cents, last_message_sent_at, last_message_received_at, location_id, created_at, updated_at
             FROM contacts WHERE phone_e164 = ?1;",
        )?;
        let mut rows = stmt.query([phone])?;
        if let Some(row) = rows.next()? {
            Ok(Some(contact_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// Insert-or-update keyed on the canonical phone. Only populated fields
    /// overwrite stored values; `created_at` is never touched on update.
    pub fn upsert_by_phone(&self, now_utc: i64, input: &ContactNew) -> Result<()> {
        upsert_inner(self.conn, now_utc, input)
    }

    pub fn delete_by_phone(&self, phone: &str) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM contacts WHERE phone_e164 = ?1;", [phone])?;
        if deleted == 0 {
            return Err(StoreError::NotFound(phone.to_string()));
        }
        Ok(())
    }

    pub fn list(&self, limit: Option<usize>) -> Result<Vec<Contact>> {
        let mut sql = String::from(
            "SELECT id, phone_e164, first_name, last_name, gender, email, telegram, origin, tattoo_size, artist, signup_date, consultation_date, appointment_date, price_deposit_cents, price_total_cents, last_message_sent_at, last_message_received_at, location_id, created_at, updated_at
             FROM contacts ORDER BY updated_at DESC, phone_e164 ASC",
        );
        if limit.is_some() {
            sql.push_str(" LIMIT ?1");
        }
        sql.push(';');

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = match limit {
            Some(limit) => stmt.query([limit as i64])?,
            None => stmt.query([])?,
        };
        let mut contacts = Vec::new();
        while let Some(row) = rows.next()? {
            contacts.push(contact_from_row(row)?);
        }
        Ok(contacts)
    }

    pub fn list_by_location(&self, location_name: &str) -> Result<Vec<Contact>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, c.phone_e164, c.first_name, c.last_name, c.gender, c.email, c.telegram, c.origin, c.tattoo_size, c.artist, c.signup_date, c.consultation_date, c.appointment_date, c.price_deposit_cents, c.price_total_cents, c.last_message_sent_at, c.last_message_received_at, c.location_id, c.created_at, c.updated_at
             FROM contacts c
             INNER JOIN locations l ON l.id = c.location_id
             WHERE l.name_key = ?1
             ORDER BY c.updated_at DESC, c.phone_e164 ASC;",
        )?;
        let mut rows = stmt.query([location_key(location_name)])?;
        let mut contacts = Vec::new();
        while let Some(row) = rows.next()? {
            contacts.push(contact_from_row(row)?);
        }
        Ok(contacts)
    }

    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM contacts;", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Returns the subset of `phones` already present, sorted ascending.
    pub fn existing_phones(&self, phones: &[String]) -> Result<Vec<String>> {
        if phones.is_empty() {
            return Ok(Vec::new());
        }

        let scratch = PhoneScratch::with_phones(self.conn, phones)?;
        let sql = format!(
            "SELECT c.phone_e164 FROM contacts c
             INNER JOIN {} t ON t.phone = c.phone_e164
             ORDER BY c.phone_e164 ASC;",
            scratch.name()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut found = Vec::new();
        while let Some(row) = rows.next()? {
            found.push(row.get(0)?);
        }
        Ok(found)
    }
}

fn create_inner(conn: &Connection, now_utc: i64, input: ContactNew) -> Result<Contact> {
    let contact = Contact {
        id: ContactId::new(),
        phone_e164: input.phone_e164,
        first_name: input.first_name,
        last_name: input.last_name,
        gender: input.gender,
        email: input.email,
        telegram: input.telegram,
        origin: input.origin,
        tattoo_size: input.tattoo_size,
        artist: input.artist,
        signup_date: input.signup_date,
        consultation_date: input.consultation_date,
        appointment_date: input.appointment_date,
        price_deposit_cents: input.price_deposit_cents,
        price_total_cents: input.price_total_cents,
        last_message_sent_at: input.last_message_sent_at,
        last_message_received_at: input.last_message_received_at,
        location_id: input.location_id,
        created_at: now_utc,
        updated_at: now_utc,
    };

    contact.validate()?;

    let inserted = conn.execute(
        "INSERT INTO contacts (id, phone_e164, first_name, last_name, gender, email, telegram, origin, tattoo_size, artist, signup_date, consultation_date, appointment_date, price_deposit_cents, price_total_cents, last_message_sent_at, last_message_received_at, location_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20);",
        params![
            contact.id.to_string(),
            contact.phone_e164,
            contact.first_name,
            contact.last_name,
            contact.gender,
            contact.email,
            contact.telegram,
            contact.origin,
            contact.tattoo_size,
            contact.artist,
            contact.signup_date,
            contact.consultation_date,
            contact.appointment_date,
            contact.price_deposit_cents,
            contact.price_total_cents,
            contact.last_message_sent_at,
            contact.last_message_received_at,
            contact.location_id.to_string(),
            contact.created_at,
            contact.updated_at,
        ],
    );

    match inserted {
        Ok(_) => Ok(contact),
        Err(err) if is_unique_violation(&err) => {
            Err(StoreError::DuplicatePhone(contact.phone_e164.clone()))
        }
        Err(err) => Err(err.into()),
    }
}

fn upsert_inner(conn: &Connection, now_utc: i64, input: &ContactNew) -> Result<()> {
    if !is_canonical_phone(&input.phone_e164) {
        return Err(StoreError::Core(CoreError::InvalidPhone(
            input.phone_e164.clone(),
        )));
    }

    let mut columns: Vec<&'static str> = vec!["id", "phone_e164"];
    let mut values: Vec<Value> = vec![
        Value::Text(ContactId::new().to_string()),
        Value::Text(input.phone_e164.clone()),
    ];

    let text_fields: [(&'static str, &Option<String>); 13] = [
        ("first_name", &input.first_name),
        ("last_name", &input.last_name),
        ("gender", &input.gender),
        ("email", &input.email),
        ("telegram", &input.telegram),
        ("origin", &input.origin),
        ("tattoo_size", &input.tattoo_size),
        ("artist", &input.artist),
        ("signup_date", &input.signup_date),
        ("consultation_date", &input.consultation_date),
        ("appointment_date", &input.appointment_date),
        ("last_message_sent_at", &input.last_message_sent_at),
        ("last_message_received_at", &input.last_message_received_at),
    ];
    for (column, value) in text_fields {
        if let Some(value) = value {
            columns.push(column);
            values.push(Value::Text(value.clone()));
        }
    }

    let integer_fields: [(&'static str, Option<i64>); 2] = [
        ("price_deposit_cents", input.price_deposit_cents),
        ("price_total_cents", input.price_total_cents),
    ];
    for (column, value) in integer_fields {
        if let Some(value) = value {
            columns.push(column);
            values.push(Value::Integer(value));
        }
    }

    columns.push("location_id");
    values.push(Value::Text(input.location_id.to_string()));
    columns.push("created_at");
    values.push(Value::Integer(now_utc));
    columns.push("updated_at");
    values.push(Value::Integer(now_utc));

    let placeholders: Vec<String> = (1..=columns.len()).map(|n| format!("?{n}")).collect();
    let assignments: Vec<String> = columns
        .iter()
        .filter(|column| !matches!(**column, "id" | "phone_e164" | "created_at"))
        .map(|column| format!("{column} = excluded.{column}"))
        .collect();

    let sql = format!(
        "INSERT INTO contacts ({}) VALUES ({})
         ON CONFLICT(phone_e164) DO UPDATE SET {};",
        columns.join(", "),
        placeholders.join(", "),
        assignments.join(", ")
    );
    conn.execute(&sql, params_from_iter(values))?;
    Ok(())
}

fn get_inner(conn: &Connection, id: ContactId) -> Result<Option<Contact>> {
    let mut stmt = conn.prepare(
        "SELECT id, phone_e164, first_name, last_name, gender, email, telegram, origin, tattoo_size, artist, signup_date, consultation_date, appointment_date, price_deposit_cents, price_total_cents, last_message_sent_at, last_message_received_at, location_id, created_at, updated_at
         FROM contacts WHERE id = ?1;",
    )?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        Ok(Some(contact_from_row(row)?))
    } else {
        Ok(None)
    }
}

fn contact_from_row(row: &rusqlite::Row<'_>) -> Result<Contact> {
    let id_str: String = row.get(0)?;
    let id = ContactId::from_str(&id_str).map_err(|_| StoreError::InvalidId(id_str.clone()))?;
    let location_str: String = row.get(17)?;
    let location_id = LocationId::from_str(&location_str)
        .map_err(|_| StoreError::InvalidId(location_str.clone()))?;
    Ok(Contact {
        id,
        phone_e164: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        gender: row.get(4)?,
        email: row.get(5)?,
        telegram: row.get(6)?,
        origin: row.get(7)?,
        tattoo_size: row.get(8)?,
        artist: row.get(9)?,
        signup_date: row.get(10)?,
        consultation_date: row.get(11)?,
        appointment_date: row.get(12)?,
        price_deposit_cents: row.get(13)?,
        price_total_cents: row.get(14)?,
        last_message_sent_at: row.get(15)?,
        last_message_received_at: row.get(16)?,
        location_id,
        created_at: row.get(18)?,
        updated_at: row.get(19)?,
    })
}
