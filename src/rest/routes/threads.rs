// rest/routes/threads.rs — Assembled-thread read path.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::refresh::Scope;
use crate::rest::{error_response, identity::Identity};
use crate::threads;
use crate::AppContext;

type RouteResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadsQuery {
    pub coach_id: Option<String>,
}

/// Fetch and assemble the threads for one school.
///
/// Each request is a fresh fetch: query the flat messages, resolve coaches,
/// assemble, and install the result in the snapshot cache (sequence-tagged,
/// so a slow response can never clobber a newer one). Orphans — messages
/// whose coach is gone or whose parent is unknown — ride along for the
/// client to surface as it sees fit.
pub async fn school_threads(
    State(ctx): State<Arc<AppContext>>,
    identity: Identity,
    Path(school_id): Path<String>,
    Query(query): Query<ThreadsQuery>,
) -> RouteResult {
    let scope = Scope::new(&identity.uid, &school_id);
    let seq = ctx.thread_cache.begin_fetch();

    let school = ctx
        .storage
        .get_school(&school_id, &identity.uid)
        .await
        .map_err(error_response)?;
    let coaches = ctx
        .storage
        .list_coaches(&identity.uid, Some(&school_id))
        .await
        .map_err(error_response)?;
    let messages = ctx
        .storage
        .list_messages(&school_id, &identity.uid, query.coach_id.as_deref())
        .await
        .map_err(error_response)?;

    let unread = ctx
        .storage
        .unread_count(&school_id, &identity.uid)
        .await
        .map_err(error_response)?;

    let lookup: HashMap<_, _> = coaches.into_iter().map(|c| (c.id.clone(), c)).collect();
    let assembled = threads::assemble_threads(messages, &lookup, &school);

    // A coach-filtered view is a narrowed projection; only the full snapshot
    // is cached for the periodic refresh to keep warm.
    if query.coach_id.is_none() {
        ctx.thread_cache
            .apply(scope, seq, assembled.clone())
            .await;
    }

    Ok(Json(json!({
        "threads": assembled.threads,
        "orphans": assembled.orphans,
        "orphanCount": assembled.orphans.len(),
        "unreadCount": unread,
    })))
}

/// Serve the cached snapshot for one school without touching the store.
///
/// The dashboard renders this instantly while a fresh fetch is in flight.
/// 404 until the first fetch (or after logout) — the caller falls back to
/// the full threads endpoint.
pub async fn school_threads_snapshot(
    State(ctx): State<Arc<AppContext>>,
    identity: Identity,
    Path(school_id): Path<String>,
) -> RouteResult {
    let scope = Scope::new(&identity.uid, &school_id);
    let Some(assembled) = ctx.thread_cache.get(&scope).await else {
        return Err(error_response(crate::error::AppError::not_found(
            "snapshot", &school_id,
        )));
    };
    let fetched_at = ctx.thread_cache.fetched_at(&scope).await;

    Ok(Json(json!({
        "threads": assembled.threads,
        "orphans": assembled.orphans,
        "orphanCount": assembled.orphans.len(),
        "fetchedAt": fetched_at,
    })))
}
