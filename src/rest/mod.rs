// rest/mod.rs — Public REST API server.
//
// Axum HTTP server for the recruitment dashboard (local only unless bound
// elsewhere). Identity arrives via headers from the authenticating proxy.
//
// Endpoints:
//   GET    /api/v1/health
//   GET    /api/v1/profile
//   PUT    /api/v1/profile
//   GET    /api/v1/schools
//   POST   /api/v1/schools
//   PUT    /api/v1/schools/{id}
//   GET    /api/v1/schools/{id}/threads
//   GET    /api/v1/schools/{id}/threads/snapshot
//   GET    /api/v1/coaches
//   POST   /api/v1/coaches
//   PUT    /api/v1/coaches/{id}
//   DELETE /api/v1/coaches/{id}
//   POST   /api/v1/messages
//   POST   /api/v1/messages/{id}/reply
//   PATCH  /api/v1/messages/{id}
//   DELETE /api/v1/messages/{id}
//   POST   /api/v1/messages/{id}/read
//   POST   /api/v1/draft
//   POST   /api/v1/session/logout

pub mod identity;
pub mod routes;

use anyhow::Result;
use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::error::AppError;
use crate::AppContext;

pub async fn start_rest_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("REST API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        // Health (no identity required)
        .route("/api/v1/health", get(routes::health::health))
        // Athlete profile
        .route(
            "/api/v1/profile",
            get(routes::profile::get_profile).put(routes::profile::put_profile),
        )
        // Schools
        .route(
            "/api/v1/schools",
            get(routes::schools::list_schools).post(routes::schools::add_school),
        )
        .route("/api/v1/schools/{id}", axum::routing::put(routes::schools::update_school))
        .route(
            "/api/v1/schools/{id}/threads",
            get(routes::threads::school_threads),
        )
        .route(
            "/api/v1/schools/{id}/threads/snapshot",
            get(routes::threads::school_threads_snapshot),
        )
        // Coaches
        .route(
            "/api/v1/coaches",
            get(routes::coaches::list_coaches).post(routes::coaches::add_coach),
        )
        .route(
            "/api/v1/coaches/{id}",
            axum::routing::put(routes::coaches::update_coach).delete(routes::coaches::delete_coach),
        )
        // Messages
        .route("/api/v1/messages", post(routes::messages::send_message))
        .route(
            "/api/v1/messages/{id}/reply",
            post(routes::messages::send_reply),
        )
        .route(
            "/api/v1/messages/{id}",
            axum::routing::patch(routes::messages::edit_message)
                .delete(routes::messages::delete_message),
        )
        .route(
            "/api/v1/messages/{id}/read",
            post(routes::messages::mark_read),
        )
        // Draft generation
        .route("/api/v1/draft", post(routes::draft::generate_draft))
        // Session teardown
        .route("/api/v1/session/logout", post(routes::session::logout))
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

/// Map an [`AppError`] to the REST status/body pair used by every route.
pub(crate) fn error_response(err: AppError) -> (StatusCode, Json<Value>) {
    let status = match &err {
        AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        AppError::Authorization => StatusCode::FORBIDDEN,
        AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppError::DraftGeneration(_) => StatusCode::BAD_GATEWAY,
        AppError::Store(_) | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() })))
}
