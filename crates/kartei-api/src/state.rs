use crate::error::ApiError;
use kartei_store::Store;
use std::sync::{Arc, Mutex};

/// Shared handler state. The store wraps one SQLite connection, so access is
/// serialized behind a mutex and runs on the blocking pool.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Store>>,
    pub auth_token: Option<String>,
    pub country_code: String,
}

impl AppState {
    pub fn new(store: Store, auth_token: Option<String>, country_code: String) -> Self {
        Self {
            db: Arc::new(Mutex::new(store)),
            auth_token,
            country_code,
        }
    }
}

pub(crate) async fn with_store<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&Store) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let db = Arc::clone(&state.db);
    match tokio::task::spawn_blocking(move || {
        let store = db
            .lock()
            .map_err(|_| ApiError::Internal("store lock poisoned".to_string()))?;
        op(&store)
    })
    .await
    {
        Ok(result) => result,
        Err(err) => Err(ApiError::Internal(format!("blocking task failed: {err}"))),
    }
}
