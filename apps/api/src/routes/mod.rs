pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::pipeline::handlers::handle_formalize;
use crate::reports::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Formalization pipeline
        .route("/api/formalize", post(handle_formalize))
        // Report store
        .route(
            "/api/reports",
            get(handlers::handle_list_reports)
                .post(handlers::handle_save_report)
                .delete(handlers::handle_delete_all_reports),
        )
        .route("/api/reports/:id", delete(handlers::handle_delete_report))
        .with_state(state)
}
