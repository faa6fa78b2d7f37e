pub mod api;
pub mod health;
pub mod pages;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Site
        .route("/", get(pages::home))
        .route("/templates", get(pages::templates))
        .route("/templates/select", get(pages::select_template))
        .route("/form", get(pages::form).post(pages::submit_form))
        .route("/preview", get(pages::preview))
        .route("/download", get(pages::download))
        // JSON API
        .route("/api/v1/templates", get(api::list_templates))
        .route("/api/v1/templates/:id", get(api::get_template))
        .route("/api/v1/resumes/parse", post(api::parse_resume))
        .route("/api/v1/resumes/render", post(api::render_resume))
        .with_state(state)
}
