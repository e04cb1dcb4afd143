// rest/routes/schools.rs — School CRUD routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::rest::{error_response, identity::Identity};
use crate::storage::SchoolInput;
use crate::AppContext;

type RouteResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

pub async fn list_schools(State(ctx): State<Arc<AppContext>>, identity: Identity) -> RouteResult {
    match ctx.storage.list_schools(&identity.uid).await {
        Ok(schools) => Ok(Json(json!({ "schools": schools }))),
        Err(e) => Err(error_response(e)),
    }
}

pub async fn add_school(
    State(ctx): State<Arc<AppContext>>,
    identity: Identity,
    Json(body): Json<SchoolInput>,
) -> RouteResult {
    if body.name.trim().is_empty() {
        return Err(error_response(crate::error::AppError::validation(
            "name",
            "must not be empty",
        )));
    }
    match ctx.storage.add_school(&identity.uid, body).await {
        Ok(school) => Ok(Json(json!(school))),
        Err(e) => Err(error_response(e)),
    }
}

pub async fn update_school(
    State(ctx): State<Arc<AppContext>>,
    identity: Identity,
    Path(id): Path<String>,
    Json(body): Json<SchoolInput>,
) -> RouteResult {
    match ctx.storage.update_school(&id, &identity.uid, body).await {
        Ok(school) => Ok(Json(json!(school))),
        Err(e) => Err(error_response(e)),
    }
}
