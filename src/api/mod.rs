pub mod rag;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/rag", post(rag::rag))
        .route("/test", get(rag::health))
        .with_state(state)
}
