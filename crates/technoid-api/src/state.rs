use std::sync::Arc;

use technoid_db::Database;

use crate::rate_limit::RateLimiter;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub limiter: RateLimiter,
    /// Shared admin secret for the contact listing. `None` disables the listing.
    pub admin_key: Option<String>,
    pub service_name: String,
}
