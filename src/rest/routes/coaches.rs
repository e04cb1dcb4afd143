// rest/routes/coaches.rs — Coach CRUD routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::rest::{error_response, identity::Identity};
use crate::storage::CoachInput;
use crate::AppContext;

type RouteResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCoachesQuery {
    pub school_id: Option<String>,
}

pub async fn list_coaches(
    State(ctx): State<Arc<AppContext>>,
    identity: Identity,
    Query(query): Query<ListCoachesQuery>,
) -> RouteResult {
    match ctx
        .storage
        .list_coaches(&identity.uid, query.school_id.as_deref())
        .await
    {
        Ok(coaches) => Ok(Json(json!({ "coaches": coaches }))),
        Err(e) => Err(error_response(e)),
    }
}

pub async fn add_coach(
    State(ctx): State<Arc<AppContext>>,
    identity: Identity,
    Json(body): Json<CoachInput>,
) -> RouteResult {
    if body.name.trim().is_empty() {
        return Err(error_response(crate::error::AppError::validation(
            "name",
            "must not be empty",
        )));
    }
    // The coach must hang off one of the user's schools.
    if let Err(e) = ctx.storage.get_school(&body.school_id, &identity.uid).await {
        return Err(error_response(e));
    }
    match ctx.storage.add_coach(&identity.uid, body).await {
        Ok(coach) => Ok(Json(json!(coach))),
        Err(e) => Err(error_response(e)),
    }
}

pub async fn update_coach(
    State(ctx): State<Arc<AppContext>>,
    identity: Identity,
    Path(id): Path<String>,
    Json(body): Json<CoachInput>,
) -> RouteResult {
    match ctx.storage.update_coach(&id, &identity.uid, body).await {
        Ok(coach) => Ok(Json(json!(coach))),
        Err(e) => Err(error_response(e)),
    }
}

pub async fn delete_coach(
    State(ctx): State<Arc<AppContext>>,
    identity: Identity,
    Path(id): Path<String>,
) -> RouteResult {
    match ctx.storage.delete_coach(&id, &identity.uid).await {
        Ok(()) => Ok(Json(json!({ "deleted": id }))),
        Err(e) => Err(error_response(e)),
    }
}
