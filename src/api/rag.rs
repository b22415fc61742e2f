use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::models::{QueryContext, RagRequest, ResponseEnvelope};
use crate::state::AppState;

/// POST /rag - resolve the corpus profiles and run the matching retrieval.
/// Always answers 200; failures travel inside the envelope.
pub async fn rag(
    State(state): State<AppState>,
    body: Result<Json<RagRequest>, JsonRejection>,
) -> Json<ResponseEnvelope> {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!("Rejected /rag body: {}", rejection.body_text());
            return Json(ResponseEnvelope::failure(
                rejection.body_text(),
                "Invalid RAG request",
                "",
                "unknown",
            ));
        }
    };

    let ctx = QueryContext::from(req);
    tracing::info!(
        corpus_id = %ctx.corpus_id,
        user_id = %ctx.user_id,
        session_id = %ctx.session_id,
        num_docs = ctx.requested_doc_count,
        "RAG request"
    );
    Json(state.service.handle(ctx).await)
}

/// GET /test - liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "success" }))
}
