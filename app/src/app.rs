use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Response,
    routing::get,
};
use iris::Dataset;
use minijinja::Environment;
use tower_http::trace::TraceLayer;

use crate::error::Result;
use crate::session::SessionStore;
use crate::{api, form, ui};

/// State shared by every request.
///
/// The dataset and templates are read-only after startup; only the session
/// store is written to.
pub struct AppState {
    pub dataset: Dataset,
    pub templates: Environment<'static>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(dataset: Dataset, session_ttl: Duration) -> std::result::Result<Self, minijinja::Error> {
        Ok(Self {
            dataset,
            templates: ui::environment()?,
            sessions: SessionStore::new(session_ttl),
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(form::show).post(form::submit))
        .route("/api/v1", get(api::predict))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found(State(state): State<Arc<AppState>>) -> Result<Response> {
    ui::render_error(&state.templates, StatusCode::NOT_FOUND)
}
