// rest/routes/messages.rs — Message mutation routes.
//
// Send and reply follow the dashboard's optimistic pattern: persist, patch
// the cached snapshot immediately, then kick an authoritative re-fetch in
// the background to reconcile.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::composer::{self, SubmitMessage};
use crate::refresh::{self, Scope};
use crate::rest::{error_response, identity::Identity};
use crate::threads::{MessageWithCoach, Thread};
use crate::AppContext;

type RouteResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn spawn_reconcile(ctx: Arc<AppContext>, scope: Scope) {
    tokio::spawn(async move {
        refresh::refresh_scope(&ctx, &scope).await;
    });
}

pub async fn send_message(
    State(ctx): State<Arc<AppContext>>,
    identity: Identity,
    Json(body): Json<SubmitMessage>,
) -> RouteResult {
    let message = composer::submit_message(&ctx.storage, &identity.uid, body)
        .await
        .map_err(error_response)?;

    // Optimistic patch: show the new conversation right away.
    let scope = Scope::new(&identity.uid, &message.school_id);
    if let (Ok(coach), Ok(school)) = (
        ctx.storage.get_coach(&message.coach_id, &identity.uid).await,
        ctx.storage.get_school(&message.school_id, &identity.uid).await,
    ) {
        let thread = Thread {
            root: MessageWithCoach {
                message: message.clone(),
                coach,
                school,
            },
            replies: Vec::new(),
        };
        ctx.thread_cache.patch_new_thread(&scope, thread).await;
    }
    spawn_reconcile(ctx.clone(), scope);

    Ok(Json(json!(message)))
}

#[derive(Deserialize)]
pub struct ReplyRequest {
    pub content: String,
}

pub async fn send_reply(
    State(ctx): State<Arc<AppContext>>,
    identity: Identity,
    Path(parent_id): Path<String>,
    Json(body): Json<ReplyRequest>,
) -> RouteResult {
    let reply = composer::submit_reply(&ctx.storage, &identity.uid, &parent_id, &body.content)
        .await
        .map_err(error_response)?;

    let scope = Scope::new(&identity.uid, &reply.school_id);
    if let (Ok(coach), Ok(school)) = (
        ctx.storage.get_coach(&reply.coach_id, &identity.uid).await,
        ctx.storage.get_school(&reply.school_id, &identity.uid).await,
    ) {
        let enriched = MessageWithCoach {
            message: reply.clone(),
            coach,
            school,
        };
        ctx.thread_cache
            .patch_reply(&scope, &parent_id, enriched)
            .await;
    }
    spawn_reconcile(ctx.clone(), scope);

    Ok(Json(json!(reply)))
}

#[derive(Deserialize)]
pub struct EditRequest {
    pub content: String,
}

pub async fn edit_message(
    State(ctx): State<Arc<AppContext>>,
    identity: Identity,
    Path(id): Path<String>,
    Json(body): Json<EditRequest>,
) -> RouteResult {
    let content = body.content.trim();
    if content.is_empty() {
        return Err(error_response(crate::error::AppError::validation(
            "content",
            "must not be empty",
        )));
    }
    let message = ctx
        .storage
        .update_message_content(&id, &identity.uid, content)
        .await
        .map_err(error_response)?;
    spawn_reconcile(ctx.clone(), Scope::new(&identity.uid, &message.school_id));
    Ok(Json(json!(message)))
}

pub async fn delete_message(
    State(ctx): State<Arc<AppContext>>,
    identity: Identity,
    Path(id): Path<String>,
) -> RouteResult {
    // Look the message up first so the scope is known for reconciliation.
    let message = ctx
        .storage
        .get_message(&id, &identity.uid)
        .await
        .map_err(error_response)?;
    ctx.storage
        .delete_message(&id, &identity.uid)
        .await
        .map_err(error_response)?;
    spawn_reconcile(ctx.clone(), Scope::new(&identity.uid, &message.school_id));
    Ok(Json(json!({ "deleted": id })))
}

pub async fn mark_read(
    State(ctx): State<Arc<AppContext>>,
    identity: Identity,
    Path(id): Path<String>,
) -> RouteResult {
    let message = ctx
        .storage
        .mark_read(&id, &identity.uid)
        .await
        .map_err(error_response)?;
    Ok(Json(json!(message)))
}
