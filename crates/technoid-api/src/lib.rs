pub mod admin;
pub mod contact;
pub mod error;
pub mod health;
pub mod rate_limit;
pub mod security;
pub mod site;
pub mod state;

use std::path::Path;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 100 * 1024;

/// Build the full HTTP surface: JSON API under `/api`, static site for
/// everything else.
///
/// The contact route keys its rate limit on the peer address, so the router
/// must be served with `into_make_service_with_connect_info::<SocketAddr>()`
/// (or given a `MockConnectInfo` layer in tests).
pub fn app(state: AppState, site_dir: &Path) -> Router {
    let contact_route = post(contact::submit).layer(middleware::from_fn_with_state(
        state.clone(),
        rate_limit::limit_by_peer,
    ));

    let api = Router::new()
        .route("/health", get(health::health))
        .route("/contact", contact_route)
        .route("/contacts", get(admin::list_contacts))
        .fallback(api_not_found);

    let router = Router::new()
        .nest("/api", api)
        .fallback_service(site::serve_site(site_dir))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state);

    security::with_security_headers(router)
        .layer(security::cors())
        .layer(TraceLayer::new_for_http())
}

async fn api_not_found() -> ApiError {
    ApiError::NotFound
}
