//! API endpoints.

mod applications;
mod groups;
mod players;
mod ratings;

use axum::Router;
use serde::Deserialize;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/players", players::router())
        .nest("/groups", groups::router())
        .nest("/groups/applications", applications::router())
        .nest("/ratings", ratings::router())
}

/// Paging parameters shared by list endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

impl PageRequest {
    const MAX_LIMIT: u64 = 100;

    /// Limit clamped to what one page may hold.
    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit.clamp(1, Self::MAX_LIMIT)
    }
}

const fn default_limit() -> u64 {
    20
}
