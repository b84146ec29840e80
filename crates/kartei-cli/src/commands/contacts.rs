use crate::commands::{print_json, Context};
use crate::error::{invalid_input, not_found};
use crate::util::{format_cents, format_timestamp_datetime, now_utc};
use anyhow::Result;
use clap::Args;
use kartei_core::domain::{
    is_fallback_location, normalize_phone_with_country, Contact, FALLBACK_LOCATION_NAME,
};
use kartei_import::confirm::storage_payload;
use kartei_import::money::parse_cents;
use kartei_import::row::{parse_sheet_date, NormalizedContact};
use serde::Serialize;

#[derive(Debug, Args)]
pub struct AddContactArgs {
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub gender: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub telegram: Option<String>,
    #[arg(long)]
    pub origin: Option<String>,
    #[arg(long)]
    pub tattoo_size: Option<String>,
    #[arg(long)]
    pub artist: Option<String>,
    #[arg(long, value_name = "DATE")]
    pub signup_date: Option<String>,
    #[arg(long, value_name = "DATE")]
    pub consultation_date: Option<String>,
    #[arg(long, value_name = "DATE")]
    pub appointment_date: Option<String>,
    #[arg(long, value_name = "AMOUNT")]
    pub price_deposit: Option<String>,
    #[arg(long, value_name = "AMOUNT")]
    pub price_total: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long, value_name = "LABEL")]
    pub label: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub phone: String,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, conflicts_with = "location")]
    pub limit: Option<usize>,
    #[arg(long)]
    pub location: Option<String>,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub phone: String,
}

#[derive(Debug, Serialize)]
struct ContactDetailDto {
    contact: Contact,
    location: Option<String>,
    labels: Vec<String>,
}

pub fn add_contact(ctx: &Context<'_>, args: AddContactArgs) -> Result<()> {
    let now = now_utc();
    let phone = normalize_phone_with_country(&args.phone, &ctx.config.country_code)
        .ok_or_else(|| invalid_input(format!("unusable phone number: {}", args.phone)))?;

    let normalized = NormalizedContact {
        phone: phone.clone(),
        first_name: args.first_name,
        last_name: args.last_name,
        gender: args.gender,
        email: args.email,
        telegram: args.telegram,
        origin: args.origin,
        tattoo_size: args.tattoo_size,
        artist: args.artist,
        signup_date: parse_date_flag("signup-date", args.signup_date)?,
        consultation_date: parse_date_flag("consultation-date", args.consultation_date)?,
        appointment_date: parse_date_flag("appointment-date", args.appointment_date)?,
        price_deposit_cents: parse_price_flag("price-deposit", args.price_deposit)?,
        price_total_cents: parse_price_flag("price-total", args.price_total)?,
        last_message_sent_at: None,
        last_message_received_at: None,
        location: args.location,
        labels: args.label,
        source_row: None,
    };

    let location_name = normalized
        .location
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(FALLBACK_LOCATION_NAME);
    let location =
        ctx.store
            .locations()
            .upsert(now, location_name, is_fallback_location(location_name))?;

    let contact = ctx
        .store
        .contacts()
        .create(now, storage_payload(&normalized, phone, location.id))?;

    for name in &normalized.labels {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let label = ctx.store.labels().upsert(now, name)?;
        ctx.store.labels().link_contact(contact.id, label.id)?;
    }

    if ctx.json {
        print_json(&contact)?;
    } else {
        println!("created {} {}", contact.phone_e164, contact.display_name());
    }
    Ok(())
}

pub fn show_contact(ctx: &Context<'_>, args: ShowArgs) -> Result<()> {
    let contact = ctx
        .store
        .contacts()
        .find_by_phone(args.phone.trim())?
        .ok_or_else(|| not_found("contact not found"))?;

    let labels: Vec<String> = ctx
        .store
        .labels()
        .list_for_contact(contact.id)?
        .into_iter()
        .map(|label| label.name)
        .collect();
    let location = ctx
        .store
        .locations()
        .get(contact.location_id)?
        .map(|location| location.name);

    let detail = ContactDetailDto {
        contact,
        location,
        labels,
    };

    if ctx.json {
        return print_json(&detail);
    }

    let contact = &detail.contact;
    println!("phone: {}", contact.phone_e164);
    println!("name: {}", contact.display_name());
    if let Some(gender) = contact.gender.as_deref() {
        println!("gender: {}", gender);
    }
    if let Some(email) = contact.email.as_deref() {
        println!("email: {}", email);
    }
    if let Some(telegram) = contact.telegram.as_deref() {
        println!("telegram: {}", telegram);
    }
    if let Some(origin) = contact.origin.as_deref() {
        println!("origin: {}", origin);
    }
    if let Some(size) = contact.tattoo_size.as_deref() {
        println!("tattoo_size: {}", size);
    }
    if let Some(artist) = contact.artist.as_deref() {
        println!("artist: {}", artist);
    }
    if let Some(date) = contact.signup_date.as_deref() {
        println!("signup_date: {}", date);
    }
    if let Some(date) = contact.consultation_date.as_deref() {
        println!("consultation_date: {}", date);
    }
    if let Some(date) = contact.appointment_date.as_deref() {
        println!("appointment_date: {}", date);
    }
    if let Some(cents) = contact.price_deposit_cents {
        println!("price_deposit: {}", format_cents(cents));
    }
    if let Some(cents) = contact.price_total_cents {
        println!("price_total: {}", format_cents(cents));
    }
    if let Some(ts) = contact.last_message_sent_at.as_deref() {
        println!("last_message_sent_at: {}", ts);
    }
    if let Some(ts) = contact.last_message_received_at.as_deref() {
        println!("last_message_received_at: {}", ts);
    }
    if let Some(name) = detail.location.as_deref() {
        println!("location: {}", name);
    }
    println!(
        "created_at: {}",
        format_timestamp_datetime(contact.created_at)
    );
    println!(
        "updated_at: {}",
        format_timestamp_datetime(contact.updated_at)
    );
    if !detail.labels.is_empty() {
        println!("labels: {}", detail.labels.join(", "));
    }
    Ok(())
}

pub fn list_contacts(ctx: &Context<'_>, args: ListArgs) -> Result<()> {
    let contacts = match args.location.as_deref() {
        Some(name) => ctx.store.contacts().list_by_location(name)?,
        None => ctx.store.contacts().list(args.limit)?,
    };

    if ctx.json {
        return print_json(&contacts);
    }

    if contacts.is_empty() {
        println!("no contacts");
        return Ok(());
    }

    for contact in contacts {
        println!("{}  {}", contact.phone_e164, contact.display_name());
    }
    Ok(())
}

pub fn delete_contact(ctx: &Context<'_>, args: DeleteArgs) -> Result<()> {
    let phone = args.phone.trim();
    ctx.store.contacts().delete_by_phone(phone)?;
    if ctx.json {
        print_json(&serde_json::json!({ "phone": phone }))?;
    } else {
        println!("deleted {}", phone);
    }
    Ok(())
}

fn parse_date_flag(flag: &str, value: Option<String>) -> Result<Option<String>> {
    match value {
        Some(raw) => {
            let parsed = parse_sheet_date(&raw).ok_or_else(|| {
                invalid_input(format!(
                    "--{flag}: unreadable date {raw:?}, expected YYYY-MM-DD or DD.MM.YYYY"
                ))
            })?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

fn parse_price_flag(flag: &str, value: Option<String>) -> Result<Option<i64>> {
    match value {
        Some(raw) => {
            let cents = parse_cents(&raw)
                .ok_or_else(|| invalid_input(format!("--{flag}: unreadable amount {raw:?}")))?;
            Ok(Some(cents))
        }
        None => Ok(None),
    }
}
