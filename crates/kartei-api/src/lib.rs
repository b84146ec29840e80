pub mod auth;
pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::http::{header, Method};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Builds the full route table. Everything except `/health` sits behind the
/// bearer-token middleware.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    let protected = Router::new()
        .route("/import/preview", post(handlers::import_preview))
        .route("/import/confirm", post(handlers::import_confirm))
        .route(
            "/contacts",
            get(handlers::contacts_list).post(handlers::contacts_create),
        )
        .route("/contacts/:phone", get(handlers::contacts_show))
        .route("/labels", get(handlers::labels_list))
        .route("/locations", get(handlers::locations_list))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(protected)
        .layer(cors)
        .with_state(state)
}

pub async fn serve(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "api listening");
    axum::serve(listener, app).await
}
