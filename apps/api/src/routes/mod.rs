pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis;
use crate::auth;
use crate::documents;
use crate::entries;
use crate::settings;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Entries
        .route(
            "/api/entries",
            get(entries::handlers::list_entries).post(entries::handlers::create_entry),
        )
        .route(
            "/api/entries/previous",
            get(entries::handlers::previous_entry),
        )
        .route(
            "/api/entries/:id",
            get(entries::handlers::get_entry)
                .put(entries::handlers::update_entry)
                .delete(entries::handlers::delete_entry),
        )
        // AI analysis
        .route("/api/analyze", post(analysis::handlers::analyze_day))
        .route(
            "/api/analysis-documents",
            get(documents::handlers::list_documents).post(documents::handlers::save_document),
        )
        .route(
            "/api/analysis-documents/summary",
            post(analysis::handlers::range_summary),
        )
        .route(
            "/api/analysis-documents/:id",
            axum::routing::delete(documents::handlers::delete_document),
        )
        // Settings + auth
        .route(
            "/api/config",
            get(settings::handlers::get_config).post(settings::handlers::save_config),
        )
        .route("/api/auth/verify", post(auth::verify_handler))
        .with_state(state)
}
