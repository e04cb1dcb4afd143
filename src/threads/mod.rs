// SPDX-License-Identifier: MIT
// Thread assembly — groups flat message records into parent/reply threads.

pub mod model;

use std::collections::HashMap;

use crate::model::{Coach, Message, School};

pub use model::{AssembledThreads, MessageWithCoach, Thread};

/// Convert a flat, unordered set of messages (all for one school and one
/// user — the caller's query guarantees the scope) into display-ready
/// threads.
///
/// Rules:
/// - Messages without a `parent_id` are thread roots; the rest are replies
///   grouped under the root their `parent_id` names.
/// - Each message's coach is looked up in `coaches_by_id`. Messages whose
///   coach is missing are returned in `orphans` instead of disappearing, as
///   are replies whose parent is unknown.
/// - Replies within a thread are ordered by `timestamp` descending; threads
///   are ordered by their root's `timestamp` descending. Both sorts are
///   stable, so timestamp ties keep input order and repeated runs over the
///   same input produce identical output.
///
/// Pure function: no store access, no mutation of the inputs.
pub fn assemble_threads(
    messages: Vec<Message>,
    coaches_by_id: &HashMap<String, Coach>,
    school: &School,
) -> AssembledThreads {
    let mut roots: Vec<Message> = Vec::new();
    let mut replies_by_parent: HashMap<String, Vec<Message>> = HashMap::new();
    // Insertion order of parent ids, so reply iteration stays deterministic.
    let mut known_root_ids: Vec<String> = Vec::new();
    let mut orphans: Vec<Message> = Vec::new();

    for msg in messages {
        match msg.parent_id.clone() {
            None => {
                known_root_ids.push(msg.id.clone());
                roots.push(msg);
            }
            Some(parent) => replies_by_parent.entry(parent).or_default().push(msg),
        }
    }

    let mut threads: Vec<Thread> = Vec::with_capacity(roots.len());
    for root in roots {
        let Some(coach) = coaches_by_id.get(&root.coach_id) else {
            orphans.push(root);
            continue;
        };

        let mut replies: Vec<MessageWithCoach> = Vec::new();
        for reply in replies_by_parent.remove(&root.id).unwrap_or_default() {
            match coaches_by_id.get(&reply.coach_id) {
                Some(reply_coach) => replies.push(MessageWithCoach {
                    message: reply,
                    coach: reply_coach.clone(),
                    school: school.clone(),
                }),
                None => orphans.push(reply),
            }
        }
        replies.sort_by(|a, b| b.message.timestamp.cmp(&a.message.timestamp));

        threads.push(Thread {
            root: MessageWithCoach {
                message: root,
                coach: coach.clone(),
                school: school.clone(),
            },
            replies,
        });
    }

    // Replies whose parent was never seen (or whose parent's root was itself
    // dropped before this run) cannot be placed anywhere.
    for root_id in known_root_ids {
        // Replies under a dropped root were already consumed above only when
        // the root resolved; pull the rest out here.
        if let Some(stranded) = replies_by_parent.remove(&root_id) {
            orphans.extend(stranded);
        }
    }
    let mut leftover: Vec<(String, Vec<Message>)> = replies_by_parent.into_iter().collect();
    leftover.sort_by(|a, b| a.0.cmp(&b.0));
    for (_, stranded) in leftover {
        orphans.extend(stranded);
    }

    threads.sort_by(|a, b| b.root.message.timestamp.cmp(&a.root.message.timestamp));

    AssembledThreads { threads, orphans }
}

/// Prepend `reply` to the thread rooted at `parent_id` (newest reply first,
/// matching the descending sort). Unknown `parent_id` returns the input
/// unchanged — the caller reconciles with a full re-assembly afterwards.
pub fn append_reply(
    mut threads: Vec<Thread>,
    parent_id: &str,
    reply: MessageWithCoach,
) -> Vec<Thread> {
    if let Some(thread) = threads.iter_mut().find(|t| t.id() == parent_id) {
        thread.replies.insert(0, reply);
    }
    threads
}

// ─── Tests ────────────────────────────────────────────────────────────────────
