// rest/identity.rs — Request identity extractor.
//
// Authentication itself is the upstream proxy's job: it verifies the session
// and forwards `{ uid, email }` as headers. The daemon only consumes them
// and scopes every query and mutation by uid.

use axum::{extract::FromRequestParts, http::request::Parts, http::StatusCode, Json};
use serde_json::{json, Value};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// The active session's identity.
#[derive(Debug, Clone)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
}

impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let uid = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        match uid {
            Some(uid) => Ok(Identity {
                uid,
                email: parts
                    .headers
                    .get(USER_EMAIL_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string),
            }),
            None => Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "missing user identity" })),
            )),
        }
    }
}
