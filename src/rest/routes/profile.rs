// rest/routes/profile.rs — Athlete profile routes.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::rest::{error_response, identity::Identity};
use crate::storage::ProfileInput;
use crate::AppContext;

type RouteResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

pub async fn get_profile(State(ctx): State<Arc<AppContext>>, identity: Identity) -> RouteResult {
    match ctx.storage.get_profile(&identity.uid).await {
        Ok(Some(profile)) => Ok(Json(json!(profile))),
        // No profile yet is a normal first-run state, not an error.
        Ok(None) => Ok(Json(json!(null))),
        Err(e) => Err(error_response(e)),
    }
}

pub async fn put_profile(
    State(ctx): State<Arc<AppContext>>,
    identity: Identity,
    Json(body): Json<ProfileInput>,
) -> RouteResult {
    match ctx.storage.upsert_profile(&identity.uid, body).await {
        Ok(profile) => Ok(Json(json!(profile))),
        Err(e) => Err(error_response(e)),
    }
}
