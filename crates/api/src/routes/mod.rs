pub mod dashboard;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /dashboard                                       latest assembled dashboard
/// /dashboard/plugins/{slug}                        one scored plugin
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/dashboard", dashboard::router())
}
