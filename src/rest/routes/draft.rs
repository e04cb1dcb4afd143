// rest/routes/draft.rs — Draft-generation proxy route.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::composer::draft::{self, DraftRequest};
use crate::rest::{error_response, identity::Identity};
use crate::AppContext;

type RouteResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

/// Generate a suggested message. A failure comes back as a draft error for
/// the form to show; the user's own text is never touched.
pub async fn generate_draft(
    State(ctx): State<Arc<AppContext>>,
    _identity: Identity,
    Json(body): Json<DraftRequest>,
) -> RouteResult {
    match draft::generate(&ctx.http, &ctx.config.draft, &body).await {
        Ok(text) => Ok(Json(json!({ "response": text }))),
        Err(e) => Err(error_response(e)),
    }
}
