// SPDX-License-Identifier: MIT
// Error taxonomy shared by storage, composer, and the REST layer.

/// Application error. Every failure is scoped to the action that triggered
/// it — nothing here is fatal to the daemon process.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// User input failed a local constraint. Nothing was sent to the store.
    #[error("validation failed for `{field}`: {reason}")]
    Validation { field: &'static str, reason: String },

    /// A mutation targeted a record owned by a different user.
    #[error("not authorized to modify this record")]
    Authorization,

    /// A referenced record was missing at read time.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The external text-generation call produced no usable output.
    #[error("draft generation failed: {0}")]
    DraftGeneration(String),

    #[error("storage error: {0}")]
    Store(#[from] sqlx::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        AppError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        AppError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
