// SPDX-License-Identifier: MIT
// SQLite-backed message store — schools, coaches, communications, profile.

use std::path::Path;
use std::str::FromStr;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::model::{
    AthleteProfile, AthleteStats, Coach, Direction, MediaLink, Message, MessageStatus,
    MessageType, School,
};

/// Default timeout for individual SQLite queries. Prevents hung queries from
/// blocking the daemon indefinitely.
const QUERY_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Execute a future with the standard query timeout.
async fn with_timeout<T>(fut: impl std::future::Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(QUERY_TIMEOUT, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Other(anyhow::anyhow!(
            "database query timed out after {}s",
            QUERY_TIMEOUT.as_secs()
        ))),
    }
}

// ─── Lenient column decoding ─────────────────────────────────────────────────

/// Parse an RFC 3339 column. Malformed values fall back to "now" so a bad
/// row degrades its own ordering instead of breaking every read — the same
/// posture the dashboard takes toward missing foreign data.
fn parse_ts(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn parse_json_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn parse_enum<T: FromStr>(raw: &str, fallback: T) -> T {
    raw.parse().unwrap_or(fallback)
}

// ─── Raw DB rows ──────────────────────────────────────────────────────────────

#[derive(sqlx::FromRow)]
struct SchoolRow {
    id: String,
    user_id: String,
    name: String,
    location: String,
    division: String,
    description: String,
    athletic_details: String,
    volleyball_history: String,
    /// JSON array of program names.
    programs: String,
    notes: Option<String>,
    /// JSON array, NULL when untagged.
    tags: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<SchoolRow> for School {
    fn from(r: SchoolRow) -> School {
        School {
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            location: r.location,
            division: r.division,
            description: r.description,
            athletic_details: r.athletic_details,
            volleyball_history: r.volleyball_history,
            programs: parse_json_list(&r.programs),
            notes: r.notes,
            tags: r.tags.as_deref().map(parse_json_list),
            created_at: parse_ts(&r.created_at),
            updated_at: parse_ts(&r.updated_at),
        }
    }
}

#[derive(sqlx::FromRow)]
struct CoachRow {
    id: String,
    user_id: String,
    school_id: String,
    name: String,
    title: String,
    email: String,
    phone: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<CoachRow> for Coach {
    fn from(r: CoachRow) -> Coach {
        Coach {
            id: r.id,
            user_id: r.user_id,
            school_id: r.school_id,
            name: r.name,
            title: r.title,
            email: r.email,
            phone: r.phone,
            created_at: parse_ts(&r.created_at),
            updated_at: parse_ts(&r.updated_at),
        }
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: String,
    user_id: String,
    school_id: String,
    coach_id: String,
    content: String,
    message_type: String,
    direction: String,
    status: String,
    parent_id: Option<String>,
    timestamp: String,
    created_at: String,
    updated_at: String,
}

impl From<MessageRow> for Message {
    fn from(r: MessageRow) -> Message {
        Message {
            id: r.id,
            user_id: r.user_id,
            school_id: r.school_id,
            coach_id: r.coach_id,
            content: r.content,
            message_type: parse_enum(&r.message_type, MessageType::Other),
            direction: parse_enum(&r.direction, Direction::Incoming),
            status: parse_enum(&r.status, MessageStatus::Unread),
            parent_id: r.parent_id,
            timestamp: parse_ts(&r.timestamp),
            created_at: parse_ts(&r.created_at),
            updated_at: parse_ts(&r.updated_at),
        }
    }
}

#[derive(sqlx::FromRow)]
struct AthleteRow {
    id: String,
    user_id: String,
    name: String,
    birthday: String,
    description: String,
    /// JSON array.
    interests: String,
    /// JSON object, see [`AthleteStats`].
    stats: String,
    /// JSON array of {type, url, title}.
    media_links: String,
    avatar_url: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<AthleteRow> for AthleteProfile {
    fn from(r: AthleteRow) -> AthleteProfile {
        AthleteProfile {
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            birthday: parse_ts(&r.birthday),
            description: r.description,
            interests: parse_json_list(&r.interests),
            stats: serde_json::from_str(&r.stats).unwrap_or_default(),
            media_links: serde_json::from_str::<Vec<MediaLink>>(&r.media_links)
                .unwrap_or_default(),
            avatar_url: r.avatar_url,
            created_at: parse_ts(&r.created_at),
            updated_at: parse_ts(&r.updated_at),
        }
    }
}

// ─── Input records ────────────────────────────────────────────────────────────

/// Fields for a new school; ids and timestamps are assigned by the store.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolInput {
    pub name: String,
    pub location: String,
    pub division: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub athletic_details: String,
    #[serde(default)]
    pub volleyball_history: String,
    #[serde(default)]
    pub programs: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachInput {
    pub school_id: String,
    pub name: String,
    pub title: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A message as handed to the store. `timestamp` is always assigned here at
/// write time, mirroring the server-timestamp behavior of the old document
/// store.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub school_id: String,
    pub coach_id: String,
    pub content: String,
    pub message_type: MessageType,
    pub direction: Direction,
    pub status: MessageStatus,
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    pub name: String,
    pub birthday: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub stats: AthleteStats,
    #[serde(default)]
    pub media_links: Vec<MediaLink>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

// ─── Storage ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub async fn new(data_dir: &Path) -> anyhow::Result<Self> {
        Self::new_with_slow_query(data_dir, 0).await
    }

    /// Create storage with slow-query logging enabled.
    ///
    /// `slow_query_ms` is the threshold in milliseconds — queries exceeding
    /// it are logged at WARN level. Set to 0 to disable.
    pub async fn new_with_slow_query(data_dir: &Path, slow_query_ms: u64) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;
        let db_path = data_dir.join("spikescout.db");
        let mut opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))?
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                .create_if_missing(true);

        if slow_query_ms > 0 {
            use sqlx::ConnectOptions as _;
            opts = opts.log_slow_statements(
                log::LevelFilter::Warn,
                std::time::Duration::from_millis(slow_query_ms),
            );
        }

        let pool = SqlitePool::connect_with(opts).await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// Return a clone of the connection pool (cheap — Arc-backed).
    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
        let ddl = [
            "CREATE TABLE IF NOT EXISTS schools (
                 id TEXT PRIMARY KEY,
                 user_id TEXT NOT NULL,
                 name TEXT NOT NULL,
                 location TEXT NOT NULL DEFAULT '',
                 division TEXT NOT NULL DEFAULT '',
                 description TEXT NOT NULL DEFAULT '',
                 athletic_details TEXT NOT NULL DEFAULT '',
                 volleyball_history TEXT NOT NULL DEFAULT '',
                 programs TEXT NOT NULL DEFAULT '[]',
                 notes TEXT,
                 tags TEXT,
                 created_at TEXT NOT NULL,
                 updated_at TEXT NOT NULL
             )",
            "CREATE TABLE IF NOT EXISTS coaches (
                 id TEXT PRIMARY KEY,
                 user_id TEXT NOT NULL,
                 school_id TEXT NOT NULL,
                 name TEXT NOT NULL,
                 title TEXT NOT NULL DEFAULT '',
                 email TEXT NOT NULL DEFAULT '',
                 phone TEXT,
                 created_at TEXT NOT NULL,
                 updated_at TEXT NOT NULL
             )",
            "CREATE TABLE IF NOT EXISTS communications (
                 id TEXT PRIMARY KEY,
                 user_id TEXT NOT NULL,
                 school_id TEXT NOT NULL,
                 coach_id TEXT NOT NULL,
                 content TEXT NOT NULL,
                 message_type TEXT NOT NULL DEFAULT 'other',
                 direction TEXT NOT NULL DEFAULT 'outgoing',
                 status TEXT NOT NULL DEFAULT 'read',
                 parent_id TEXT,
                 timestamp TEXT NOT NULL,
                 created_at TEXT NOT NULL,
                 updated_at TEXT NOT NULL
             )",
            "CREATE TABLE IF NOT EXISTS athletes (
                 id TEXT PRIMARY KEY,
                 user_id TEXT NOT NULL UNIQUE,
                 name TEXT NOT NULL DEFAULT '',
                 birthday TEXT NOT NULL,
                 description TEXT NOT NULL DEFAULT '',
                 interests TEXT NOT NULL DEFAULT '[]',
                 stats TEXT NOT NULL DEFAULT '{}',
                 media_links TEXT NOT NULL DEFAULT '[]',
                 avatar_url TEXT,
                 created_at TEXT NOT NULL,
                 updated_at TEXT NOT NULL
             )",
            "CREATE INDEX IF NOT EXISTS idx_comms_scope
                 ON communications (user_id, school_id)",
            "CREATE INDEX IF NOT EXISTS idx_comms_parent
                 ON communications (parent_id)",
            "CREATE INDEX IF NOT EXISTS idx_coaches_school
                 ON coaches (school_id)",
        ];
        for stmt in ddl {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .context("failed to run schema migration")?;
        }
        Ok(())
    }

    // ─── Schools ──────────────────────────────────────────────────────────────

    pub async fn add_school(&self, user_id: &str, input: SchoolInput) -> Result<School> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO schools
                 (id, user_id, name, location, division, description,
                  athletic_details, volleyball_history, programs, notes, tags,
                  created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.location)
        .bind(&input.division)
        .bind(&input.description)
        .bind(&input.athletic_details)
        .bind(&input.volleyball_history)
        .bind(serde_json::to_string(&input.programs).unwrap_or_else(|_| "[]".into()))
        .bind(&input.notes)
        .bind(
            input
                .tags
                .as_ref()
                .map(|t| serde_json::to_string(t).unwrap_or_else(|_| "[]".into())),
        )
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        self.get_school(&id, user_id).await
    }

    pub async fn get_school(&self, id: &str, user_id: &str) -> Result<School> {
        let row: Option<SchoolRow> =
            sqlx::query_as("SELECT * FROM schools WHERE id = ? AND user_id = ?")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Into::into)
            .ok_or_else(|| AppError::not_found("school", id))
    }

    pub async fn list_schools(&self, user_id: &str) -> Result<Vec<School>> {
        with_timeout(async {
            let rows: Vec<SchoolRow> =
                sqlx::query_as("SELECT * FROM schools WHERE user_id = ? ORDER BY name")
                    .bind(user_id)
                    .fetch_all(&self.pool)
                    .await?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
        .await
    }

    pub async fn update_school(
        &self,
        id: &str,
        user_id: &str,
        input: SchoolInput,
    ) -> Result<School> {
        self.check_owner("schools", id, user_id).await?;
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "UPDATE schools SET
                 name = ?, location = ?, division = ?, description = ?,
                 athletic_details = ?, volleyball_history = ?, programs = ?,
                 notes = ?, tags = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&input.name)
        .bind(&input.location)
        .bind(&input.division)
        .bind(&input.description)
        .bind(&input.athletic_details)
        .bind(&input.volleyball_history)
        .bind(serde_json::to_string(&input.programs).unwrap_or_else(|_| "[]".into()))
        .bind(&input.notes)
        .bind(
            input
                .tags
                .as_ref()
                .map(|t| serde_json::to_string(t).unwrap_or_else(|_| "[]".into())),
        )
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        self.get_school(id, user_id).await
    }

    // ─── Coaches ──────────────────────────────────────────────────────────────

    pub async fn add_coach(&self, user_id: &str, input: CoachInput) -> Result<Coach> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO coaches
                 (id, user_id, school_id, name, title, email, phone, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(&input.school_id)
        .bind(&input.name)
        .bind(&input.title)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        self.get_coach(&id, user_id).await
    }

    pub async fn get_coach(&self, id: &str, user_id: &str) -> Result<Coach> {
        let row: Option<CoachRow> =
            sqlx::query_as("SELECT * FROM coaches WHERE id = ? AND user_id = ?")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Into::into)
            .ok_or_else(|| AppError::not_found("coach", id))
    }

    /// List coaches for a user, optionally restricted to one school.
    /// Ordered by name, matching the dashboard's picker.
    pub async fn list_coaches(&self, user_id: &str, school_id: Option<&str>) -> Result<Vec<Coach>> {
        with_timeout(async {
            let rows: Vec<CoachRow> = match school_id {
                Some(sid) => {
                    sqlx::query_as(
                        "SELECT * FROM coaches WHERE user_id = ? AND school_id = ? ORDER BY name",
                    )
                    .bind(user_id)
                    .bind(sid)
                    .fetch_all(&self.pool)
                    .await?
                }
                None => {
                    sqlx::query_as("SELECT * FROM coaches WHERE user_id = ? ORDER BY name")
                        .bind(user_id)
                        .fetch_all(&self.pool)
                        .await?
                }
            };
            Ok(rows.into_iter().map(Into::into).collect())
        })
        .await
    }

    pub async fn update_coach(&self, id: &str, user_id: &str, input: CoachInput) -> Result<Coach> {
        self.check_owner("coaches", id, user_id).await?;
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "UPDATE coaches SET school_id = ?, name = ?, title = ?, email = ?, phone = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&input.school_id)
        .bind(&input.name)
        .bind(&input.title)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        self.get_coach(id, user_id).await
    }

    pub async fn delete_coach(&self, id: &str, user_id: &str) -> Result<()> {
        self.check_owner("coaches", id, user_id).await?;
        sqlx::query("DELETE FROM coaches WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ─── Communications ───────────────────────────────────────────────────────

    /// Return the flat message set for one `(user, school)` scope, optionally
    /// narrowed to a single coach. Thread grouping happens in
    /// [`crate::threads::assemble_threads`], not here.
    pub async fn list_messages(
        &self,
        school_id: &str,
        user_id: &str,
        coach_id: Option<&str>,
    ) -> Result<Vec<Message>> {
        with_timeout(async {
            let rows: Vec<MessageRow> = match coach_id {
                Some(cid) => {
                    sqlx::query_as(
                        "SELECT * FROM communications
                         WHERE school_id = ? AND user_id = ? AND coach_id = ?
                         ORDER BY created_at",
                    )
                    .bind(school_id)
                    .bind(user_id)
                    .bind(cid)
                    .fetch_all(&self.pool)
                    .await?
                }
                None => {
                    sqlx::query_as(
                        "SELECT * FROM communications
                         WHERE school_id = ? AND user_id = ?
                         ORDER BY created_at",
                    )
                    .bind(school_id)
                    .bind(user_id)
                    .fetch_all(&self.pool)
                    .await?
                }
            };
            Ok(rows.into_iter().map(Into::into).collect())
        })
        .await
    }

    /// Persist a new message. The store assigns the id and the immutable
    /// `timestamp`.
    pub async fn create_message(&self, user_id: &str, new: NewMessage) -> Result<Message> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO communications
                 (id, user_id, school_id, coach_id, content, message_type,
                  direction, status, parent_id, timestamp, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(&new.school_id)
        .bind(&new.coach_id)
        .bind(&new.content)
        .bind(new.message_type.as_str())
        .bind(new.direction.as_str())
        .bind(new.status.as_str())
        .bind(&new.parent_id)
        .bind(&now)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        self.get_message(&id, user_id).await
    }

    pub async fn get_message(&self, id: &str, user_id: &str) -> Result<Message> {
        let row: Option<MessageRow> =
            sqlx::query_as("SELECT * FROM communications WHERE id = ? AND user_id = ?")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Into::into)
            .ok_or_else(|| AppError::not_found("message", id))
    }

    /// Edit message content. The owner check must pass; `timestamp` is left
    /// untouched so the thread keeps its position.
    pub async fn update_message_content(
        &self,
        id: &str,
        user_id: &str,
        content: &str,
    ) -> Result<Message> {
        self.check_owner("communications", id, user_id).await?;
        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE communications SET content = ?, updated_at = ? WHERE id = ?")
            .bind(content)
            .bind(&now)
            .bind(id)
            .execute(&self.pool)
            .await?;
        self.get_message(id, user_id).await
    }

    /// Delete a message. Deleting a root also deletes its replies so no
    /// `parent_id` is left dangling.
    pub async fn delete_message(&self, id: &str, user_id: &str) -> Result<()> {
        self.check_owner("communications", id, user_id).await?;
        sqlx::query("DELETE FROM communications WHERE id = ? OR parent_id = ?")
            .bind(id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn mark_read(&self, id: &str, user_id: &str) -> Result<Message> {
        self.check_owner("communications", id, user_id).await?;
        sqlx::query("UPDATE communications SET status = 'read' WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        self.get_message(id, user_id).await
    }

    /// Count of unread incoming messages for a scope — the sidebar badge.
    pub async fn unread_count(&self, school_id: &str, user_id: &str) -> Result<u64> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM communications
             WHERE school_id = ? AND user_id = ? AND status = 'unread'",
        )
        .bind(school_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0 as u64)
    }

    // ─── Athlete profile ──────────────────────────────────────────────────────

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<AthleteProfile>> {
        let row: Option<AthleteRow> = sqlx::query_as("SELECT * FROM athletes WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// Create-or-replace the athlete profile for `user_id`. `created_at` is
    /// preserved across updates.
    pub async fn upsert_profile(&self, user_id: &str, input: ProfileInput) -> Result<AthleteProfile> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO athletes
                 (id, user_id, name, birthday, description, interests, stats,
                  media_links, avatar_url, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                 name = excluded.name,
                 birthday = excluded.birthday,
                 description = excluded.description,
                 interests = excluded.interests,
                 stats = excluded.stats,
                 media_links = excluded.media_links,
                 avatar_url = excluded.avatar_url,
                 updated_at = excluded.updated_at",
        )
        .bind(user_id)
        .bind(user_id)
        .bind(&input.name)
        .bind(input.birthday.to_rfc3339())
        .bind(&input.description)
        .bind(serde_json::to_string(&input.interests).unwrap_or_else(|_| "[]".into()))
        .bind(serde_json::to_string(&input.stats).unwrap_or_else(|_| "{}".into()))
        .bind(serde_json::to_string(&input.media_links).unwrap_or_else(|_| "[]".into()))
        .bind(&input.avatar_url)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        self.get_profile(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("profile", user_id))
    }

    // ─── One-time migrations ──────────────────────────────────────────────────

    /// Stamp `user_id` onto legacy rows that predate per-user scoping.
    ///
    /// Runs from the `spikescoutd migrate` subcommand only. The steady-state
    /// read path never repairs data.
    pub async fn backfill_owner_ids(&self, user_id: &str) -> Result<u64> {
        let mut total = 0u64;
        for table in ["schools", "coaches", "communications", "athletes"] {
            let res = sqlx::query(&format!(
                "UPDATE {table} SET user_id = ? WHERE user_id IS NULL OR user_id = ''"
            ))
            .bind(user_id)
            .execute(&self.pool)
            .await?;
            total += res.rows_affected();
        }
        Ok(total)
    }

    // ─── Internal ─────────────────────────────────────────────────────────────

    /// Verify that the record exists and belongs to `user_id`.
    ///
    /// Missing record → `NotFound`; wrong owner → `Authorization`. The two
    /// are deliberately distinct: a 404 leaks nothing the list endpoints
    /// would not already reveal for this user's own data.
    async fn check_owner(&self, table: &str, id: &str, user_id: &str) -> Result<()> {
        let row: Option<(String,)> =
            sqlx::query_as(&format!("SELECT user_id FROM {table} WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        match row {
            None => Err(AppError::not_found("record", id)),
            Some((owner,)) if owner != user_id => Err(AppError::Authorization),
            Some(_) => Ok(()),
        }
    }
}
