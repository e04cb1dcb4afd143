// SPDX-License-Identifier: MIT
// Message composer — validates and persists outgoing messages and replies.

pub mod draft;

use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::model::{Direction, Message, MessageStatus, MessageType};
use crate::storage::{NewMessage, Storage};

/// A new outgoing message as submitted from the dashboard form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitMessage {
    pub school_id: String,
    pub coach_id: String,
    pub content: String,
    #[serde(rename = "type", default = "default_type")]
    pub message_type: MessageType,
}

fn default_type() -> MessageType {
    MessageType::Email
}

/// Validate and persist a new outgoing message.
///
/// Outgoing messages are self-authored, so they are born `read`. Validation
/// failures abort locally; nothing reaches the store.
pub async fn submit_message(
    storage: &Storage,
    user_id: &str,
    submit: SubmitMessage,
) -> Result<Message> {
    let content = submit.content.trim();
    if content.is_empty() {
        return Err(AppError::validation("content", "must not be empty"));
    }
    if submit.coach_id.is_empty() {
        return Err(AppError::validation("coachId", "a coach must be selected"));
    }

    // The selected coach must exist and belong to the target school.
    let coach = storage.get_coach(&submit.coach_id, user_id).await?;
    if coach.school_id != submit.school_id {
        return Err(AppError::validation(
            "coachId",
            "coach does not belong to the selected school",
        ));
    }

    storage
        .create_message(
            user_id,
            NewMessage {
                school_id: submit.school_id,
                coach_id: submit.coach_id,
                content: content.to_string(),
                message_type: submit.message_type,
                direction: Direction::Outgoing,
                status: MessageStatus::Read,
                parent_id: None,
            },
        )
        .await
}

/// Validate and persist a reply to an existing thread root.
///
/// The reply inherits the root's school and coach context. Replying to a
/// reply is rejected — threads are exactly one level deep.
pub async fn submit_reply(
    storage: &Storage,
    user_id: &str,
    parent_id: &str,
    content: &str,
) -> Result<Message> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::validation("content", "must not be empty"));
    }

    let parent = storage.get_message(parent_id, user_id).await?;
    if !parent.is_root() {
        return Err(AppError::validation(
            "parentId",
            "cannot reply to a reply — start from the thread root",
        ));
    }

    storage
        .create_message(
            user_id,
            NewMessage {
                school_id: parent.school_id,
                coach_id: parent.coach_id,
                content: content.to_string(),
                message_type: MessageType::Other,
                direction: Direction::Outgoing,
                status: MessageStatus::Read,
                parent_id: Some(parent.id),
            },
        )
        .await
}
