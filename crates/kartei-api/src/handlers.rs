use crate::error::ApiError;
use crate::state::{with_store, AppState};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use kartei_core::domain::{
    is_fallback_location, normalize_phone_with_country, Contact, FALLBACK_LOCATION_NAME,
};
use kartei_core::time::now_utc;
use kartei_import::confirm::{confirm, storage_payload, ImportSummary};
use kartei_import::preview::{preview, PreviewReport};
use kartei_import::row::NormalizedContact;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub phones: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub contacts: Vec<NormalizedContact>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ContactDetail {
    pub contact: Contact,
    pub labels: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct LabelSummary {
    pub name: String,
    pub contacts: i64,
}

#[derive(Debug, Serialize)]
pub struct LocationSummary {
    pub name: String,
    pub admin_only: bool,
    pub contacts: i64,
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

pub async fn import_preview(
    State(state): State<AppState>,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<PreviewReport>, ApiError> {
    let report = with_store(&state, move |store| {
        preview(store, &request.phones).map_err(ApiError::from)
    })
    .await?;
    Ok(Json(report))
}

pub async fn import_confirm(
    State(state): State<AppState>,
    Json(request): Json<ConfirmRequest>,
) -> Result<Json<ImportSummary>, ApiError> {
    let now = now_utc();
    let summary = with_store(&state, move |store| {
        confirm(store, now, &request.contacts).map_err(ApiError::from)
    })
    .await?;
    Ok(Json(summary))
}

pub async fn contacts_list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Contact>>, ApiError> {
    let contacts = with_store(&state, move |store| {
        store.contacts().list(query.limit).map_err(ApiError::from)
    })
    .await?;
    Ok(Json(contacts))
}

pub async fn contacts_show(
    State(state): State<AppState>,
    Path(phone): Path<String>,
) -> Result<Json<ContactDetail>, ApiError> {
    let detail = with_store(&state, move |store| {
        let contact = store
            .contacts()
            .find_by_phone(&phone)
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::NotFound(phone.clone()))?;
        let labels = store
            .labels()
            .list_for_contact(contact.id)
            .map_err(ApiError::from)?;
        Ok(ContactDetail {
            contact,
            labels: labels.into_iter().map(|label| label.name).collect(),
        })
    })
    .await?;
    Ok(Json(detail))
}

/// Creates one contact from a normalized payload. Unlike the import confirm
/// path this is strict: a known phone answers 409 instead of updating.
pub async fn contacts_create(
    State(state): State<AppState>,
    Json(request): Json<NormalizedContact>,
) -> Result<(StatusCode, Json<Contact>), ApiError> {
    let now = now_utc();
    let country_code = state.country_code.clone();
    let created = with_store(&state, move |store| {
        let phone = normalize_phone_with_country(&request.phone, &country_code).ok_or_else(|| {
            ApiError::BadRequest(format!("unusable phone number: {}", request.phone))
        })?;

        let location_name = request
            .location
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_LOCATION_NAME);
        let location = store
            .locations()
            .upsert(now, location_name, is_fallback_location(location_name))
            .map_err(ApiError::from)?;

        let input = storage_payload(&request, phone, location.id);
        let contact = store.contacts().create(now, input).map_err(ApiError::from)?;

        for raw in &request.labels {
            let name = raw.trim();
            if name.is_empty() {
                continue;
            }
            let label = store.labels().upsert(now, name).map_err(ApiError::from)?;
            store
                .labels()
                .link_contact(contact.id, label.id)
                .map_err(ApiError::from)?;
        }

        Ok(contact)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn labels_list(
    State(state): State<AppState>,
) -> Result<Json<Vec<LabelSummary>>, ApiError> {
    let labels = with_store(&state, move |store| {
        store.labels().list_with_counts().map_err(ApiError::from)
    })
    .await?;
    Ok(Json(
        labels
            .into_iter()
            .map(|(label, contacts)| LabelSummary {
                name: label.name,
                contacts,
            })
            .collect(),
    ))
}

pub async fn locations_list(
    State(state): State<AppState>,
) -> Result<Json<Vec<LocationSummary>>, ApiError> {
    let locations = with_store(&state, move |store| {
        store.locations().list_with_counts().map_err(ApiError::from)
    })
    .await?;
    Ok(Json(
        locations
            .into_iter()
            .map(|(location, contacts)| LocationSummary {
                name: location.name,
                admin_only: location.admin_only,
                contacts,
            })
            .collect(),
    ))
}
