pub mod catalog;
pub mod health;
pub mod history;
pub mod scheduled_changes;
pub mod settings;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::AppState;

/// All pricing routes, without middleware
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/catalog", get(catalog::get_catalog))
        .route("/api/catalog/refresh", post(catalog::refresh_catalog))
        .route("/api/catalog/prices", put(catalog::set_actual_prices))
        .route(
            "/api/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route(
            "/api/scheduled-changes",
            get(scheduled_changes::list_scheduled_changes)
                .post(scheduled_changes::create_scheduled_change),
        )
        .route(
            "/api/scheduled-changes/apply-due",
            post(scheduled_changes::apply_due_scheduled_changes),
        )
        .route(
            "/api/scheduled-changes/{id}",
            delete(scheduled_changes::cancel_scheduled_change),
        )
        .route(
            "/api/scheduled-changes/{id}/apply",
            post(scheduled_changes::apply_scheduled_change),
        )
        .route("/api/history", get(history::get_history))
        .with_state(state)
}
