// SPDX-License-Identifier: MIT
// Thread data model — derived at read time, never persisted.

use serde::{Deserialize, Serialize};

use crate::model::{Coach, Message, School};

// ─── MessageWithCoach ─────────────────────────────────────────────────────────

/// A message enriched with its resolved coach and school, ready for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageWithCoach {
    #[serde(flatten)]
    pub message: Message,
    pub coach: Coach,
    pub school: School,
}

// ─── Thread ───────────────────────────────────────────────────────────────────

/// A root message plus its replies, newest reply first. Recomputed from the
/// flat message set on every read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    #[serde(flatten)]
    pub root: MessageWithCoach,
    pub replies: Vec<MessageWithCoach>,
}

impl Thread {
    pub fn id(&self) -> &str {
        &self.root.message.id
    }
}

// ─── AssembledThreads ─────────────────────────────────────────────────────────

/// Tagged assembly result. `threads` holds every conversation whose coach
/// resolved; `orphans` holds messages that could not be placed — unresolved
/// coach, or a reply whose parent is unknown. Callers decide whether to
/// surface orphans; they are never silently lost.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembledThreads {
    pub threads: Vec<Thread>,
    pub orphans: Vec<Message>,
}

impl AssembledThreads {
    pub fn is_empty(&self) -> bool {
        self.threads.is_empty() && self.orphans.is_empty()
    }
}
