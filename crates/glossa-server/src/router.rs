use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all Glossa endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .route("/spaces", post(handler::create_space))
        .route(
            "/spaces/:space_id/branches",
            get(handler::list_branches).post(handler::create_branch),
        )
        .route(
            "/branches/:id",
            get(handler::get_branch)
                .patch(handler::rename_branch)
                .delete(handler::delete_branch),
        )
        .route("/branches/:id/default", put(handler::set_default_branch))
        .route("/branches/:id/lineage", get(handler::lineage))
        .route("/branches/:id/keys", get(handler::list_keys))
        .route("/branches/:id/translations", put(handler::set_translation))
        .route("/branches/:id/diff/:target_id", get(handler::diff))
        .route("/branches/:id/merge", post(handler::merge))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
