// rest/routes/session.rs — Session teardown.

use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::rest::identity::Identity;
use crate::AppContext;

/// Drop every cached thread snapshot for the departing user. The store is
/// untouched; the next login repopulates the cache on first fetch.
pub async fn logout(State(ctx): State<Arc<AppContext>>, identity: Identity) -> Json<Value> {
    ctx.thread_cache.evict_user(&identity.uid).await;
    Json(json!({ "loggedOut": true }))
}
