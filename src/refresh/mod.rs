// SPDX-License-Identifier: MIT
//! Thread snapshot cache and the periodic refresh task.
//!
//! The dashboard works off a single-owner snapshot per `(user, school)`
//! scope, replaced wholesale on each successful fetch. Two rules keep it
//! honest:
//!
//! - Every fetch is tagged with a monotonically increasing sequence number,
//!   and [`ThreadCache::apply`] discards any response older than the last
//!   one applied for that scope. An in-flight fetch that resolves late can
//!   therefore never overwrite newer state.
//! - User actions (send, reply) patch the snapshot optimistically and then
//!   trigger an authoritative re-fetch to reconcile.
//!
//! One polling task owns the periodic refresh for all tracked scopes; it is
//! spawned by the daemon at startup and aborted on shutdown. No ad-hoc
//! timers anywhere else.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::threads::{self, AssembledThreads, MessageWithCoach, Thread};

/// A `(user_id, school_id)` pair — the unit of snapshot ownership.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope {
    pub user_id: String,
    pub school_id: String,
}

impl Scope {
    pub fn new(user_id: impl Into<String>, school_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            school_id: school_id.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    /// Sequence number of the fetch that produced this snapshot.
    applied_seq: u64,
    assembled: AssembledThreads,
    fetched_at: DateTime<Utc>,
}

// ─── ThreadCache ──────────────────────────────────────────────────────────────

/// Snapshot store for assembled threads, keyed by scope.
#[derive(Default)]
pub struct ThreadCache {
    entries: RwLock<HashMap<Scope, Entry>>,
    seq: AtomicU64,
}

impl ThreadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a sequence number for a fetch that is about to start. Call
    /// this before querying the store, then hand the number to [`apply`].
    pub fn begin_fetch(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Install a fetched snapshot. Returns `false` (and changes nothing)
    /// when a newer fetch already landed for this scope — last applied wins,
    /// not last resolved.
    pub async fn apply(&self, scope: Scope, seq: u64, assembled: AssembledThreads) -> bool {
        let mut entries = self.entries.write().await;
        if let Some(existing) = entries.get(&scope) {
            if existing.applied_seq >= seq {
                debug!(
                    school_id = %scope.school_id,
                    stale_seq = seq,
                    applied_seq = existing.applied_seq,
                    "discarding stale fetch response"
                );
                return false;
            }
        }
        entries.insert(
            scope,
            Entry {
                applied_seq: seq,
                assembled,
                fetched_at: Utc::now(),
            },
        );
        true
    }

    /// Current snapshot for a scope, if one has been fetched.
    pub async fn get(&self, scope: &Scope) -> Option<AssembledThreads> {
        self.entries
            .read()
            .await
            .get(scope)
            .map(|e| e.assembled.clone())
    }

    /// Age of the snapshot for a scope.
    pub async fn fetched_at(&self, scope: &Scope) -> Option<DateTime<Utc>> {
        self.entries.read().await.get(scope).map(|e| e.fetched_at)
    }

    /// Optimistically prepend a just-sent message as a new thread. The next
    /// authoritative fetch reconciles.
    pub async fn patch_new_thread(&self, scope: &Scope, thread: Thread) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(scope) {
            entry.assembled.threads.insert(0, thread);
        }
    }

    /// Optimistically attach a just-sent reply to its thread. Unknown parent
    /// ids leave the snapshot untouched; reconciliation is the re-fetch's
    /// job.
    pub async fn patch_reply(&self, scope: &Scope, parent_id: &str, reply: MessageWithCoach) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(scope) {
            let threads = std::mem::take(&mut entry.assembled.threads);
            entry.assembled.threads = threads::append_reply(threads, parent_id, reply);
        }
    }

    /// Drop every snapshot belonging to a user (logout/teardown).
    pub async fn evict_user(&self, user_id: &str) {
        self.entries
            .write()
            .await
            .retain(|scope, _| scope.user_id != user_id);
    }

    /// All scopes with a live snapshot — the refresh task's work list.
    pub async fn scopes(&self) -> Vec<Scope> {
        self.entries.read().await.keys().cloned().collect()
    }
}

// ─── Periodic refresh task ────────────────────────────────────────────────────

/// Fetch messages and coaches for one scope and install the assembled result.
///
/// Errors are logged and swallowed: a failed refresh keeps the previous
/// snapshot, and the next tick (or user action) tries again.
pub async fn refresh_scope(ctx: &crate::AppContext, scope: &Scope) {
    let seq = ctx.thread_cache.begin_fetch();

    let school = match ctx.storage.get_school(&scope.school_id, &scope.user_id).await {
        Ok(school) => school,
        Err(e) => {
            warn!(school_id = %scope.school_id, error = %e, "refresh: school lookup failed");
            return;
        }
    };
    let coaches = match ctx
        .storage
        .list_coaches(&scope.user_id, Some(&scope.school_id))
        .await
    {
        Ok(coaches) => coaches,
        Err(e) => {
            warn!(school_id = %scope.school_id, error = %e, "refresh: coach query failed");
            return;
        }
    };
    let messages = match ctx
        .storage
        .list_messages(&scope.school_id, &scope.user_id, None)
        .await
    {
        Ok(messages) => messages,
        Err(e) => {
            warn!(school_id = %scope.school_id, error = %e, "refresh: message query failed");
            return;
        }
    };

    let lookup = coaches
        .into_iter()
        .map(|c| (c.id.clone(), c))
        .collect::<HashMap<_, _>>();
    let assembled = threads::assemble_threads(messages, &lookup, &school);
    ctx.thread_cache.apply(scope.clone(), seq, assembled).await;
}

/// Spawn the polling task. Every tick re-fetches each tracked scope. The
/// returned handle is aborted on daemon shutdown.
pub fn spawn(ctx: Arc<crate::AppContext>) -> JoinHandle<()> {
    let interval = Duration::from_secs(ctx.config.refresh_interval_secs.max(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick fires immediately; skip it so startup stays quiet.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let scopes = ctx.thread_cache.scopes().await;
            debug!(scopes = scopes.len(), "refreshing thread snapshots");
            for scope in scopes {
                refresh_scope(&ctx, &scope).await;
            }
        }
    })
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(marker: &str) -> AssembledThreads {
        // The orphan list is enough to tell snapshots apart.
        let mut assembled = AssembledThreads::default();
        assembled.orphans.push(crate::model::Message {
            id: marker.into(),
            user_id: "u1".into(),
            school_id: "s1".into(),
            coach_id: "ghost".into(),
            content: String::new(),
            message_type: crate::model::MessageType::Other,
            direction: crate::model::Direction::Incoming,
            status: crate::model::MessageStatus::Unread,
            parent_id: None,
            timestamp: Utc::now(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        assembled
    }

    #[tokio::test]
    async fn sequence_numbers_increase() {
        let cache = ThreadCache::new();
        let a = cache.begin_fetch();
        let b = cache.begin_fetch();
        assert!(b > a);
    }

    #[tokio::test]
    async fn newer_fetch_wins() {
        let cache = ThreadCache::new();
        let scope = Scope::new("u1", "s1");
        let old_seq = cache.begin_fetch();
        let new_seq = cache.begin_fetch();

        assert!(cache.apply(scope.clone(), new_seq, snapshot("new")).await);
        // The older request resolves late — and is discarded.
        assert!(!cache.apply(scope.clone(), old_seq, snapshot("old")).await);

        let current = cache.get(&scope).await.unwrap();
        assert_eq!(current.orphans[0].id, "new");
    }

    #[tokio::test]
    async fn fetched_at_tracks_the_applied_snapshot() {
        let cache = ThreadCache::new();
        let scope = Scope::new("u1", "s1");
        assert!(cache.fetched_at(&scope).await.is_none());

        let before = Utc::now();
        let seq = cache.begin_fetch();
        cache.apply(scope.clone(), seq, snapshot("x")).await;
        let at = cache.fetched_at(&scope).await.unwrap();
        assert!(at >= before);
    }

    #[tokio::test]
    async fn scopes_are_isolated() {
        let cache = ThreadCache::new();
        let s1 = Scope::new("u1", "s1");
        let s2 = Scope::new("u1", "s2");
        let seq1 = cache.begin_fetch();
        let seq2 = cache.begin_fetch();
        assert!(cache.apply(s1.clone(), seq1, snapshot("one")).await);
        assert!(cache.apply(s2.clone(), seq2, snapshot("two")).await);
        assert_eq!(cache.get(&s1).await.unwrap().orphans[0].id, "one");
        assert_eq!(cache.get(&s2).await.unwrap().orphans[0].id, "two");
    }

    #[tokio::test]
    async fn evict_user_drops_only_their_scopes() {
        let cache = ThreadCache::new();
        let mine = Scope::new("u1", "s1");
        let theirs = Scope::new("u2", "s1");
        let a = cache.begin_fetch();
        let b = cache.begin_fetch();
        cache.apply(mine.clone(), a, snapshot("mine")).await;
        cache.apply(theirs.clone(), b, snapshot("theirs")).await;

        cache.evict_user("u1").await;
        assert!(cache.get(&mine).await.is_none());
        assert!(cache.get(&theirs).await.is_some());
    }
}
