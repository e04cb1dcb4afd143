//! Integration tests for the SQLite message store: CRUD, ownership checks,
//! and the one-time ownership backfill.

use chrono::Utc;
use spikescout::error::AppError;
use spikescout::model::{Direction, MessageStatus, MessageType};
use spikescout::storage::{CoachInput, NewMessage, ProfileInput, SchoolInput, Storage};
use tempfile::TempDir;

async fn make_storage(dir: &TempDir) -> Storage {
    Storage::new(dir.path()).await.expect("storage should open")
}

fn school_input(name: &str) -> SchoolInput {
    serde_json::from_value(serde_json::json!({
        "name": name,
        "location": "Springfield, OR",
        "division": "D2",
        "programs": ["Biology", "Kinesiology"],
    }))
    .unwrap()
}

fn coach_input(school_id: &str, name: &str) -> CoachInput {
    serde_json::from_value(serde_json::json!({
        "schoolId": school_id,
        "name": name,
        "title": "Assistant Coach",
        "email": "coach@example.edu",
    }))
    .unwrap()
}

fn new_message(school_id: &str, coach_id: &str, parent: Option<&str>) -> NewMessage {
    NewMessage {
        school_id: school_id.into(),
        coach_id: coach_id.into(),
        content: "Hello from the tests".into(),
        message_type: MessageType::Email,
        direction: Direction::Outgoing,
        status: MessageStatus::Read,
        parent_id: parent.map(Into::into),
    }
}

#[tokio::test]
async fn school_crud_round_trip() {
    let dir = TempDir::new().unwrap();
    let storage = make_storage(&dir).await;

    let school = storage
        .add_school("u1", school_input("Bannerline College"))
        .await
        .unwrap();
    assert_eq!(school.user_id, "u1");
    assert_eq!(school.programs, vec!["Biology", "Kinesiology"]);

    let listed = storage.list_schools("u1").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, school.id);

    // Another user sees nothing.
    assert!(storage.list_schools("u2").await.unwrap().is_empty());

    let mut input = school_input("Bannerline College");
    input.division = "D1".into();
    let updated = storage.update_school(&school.id, "u1", input).await.unwrap();
    assert_eq!(updated.division, "D1");
    assert_eq!(updated.created_at, school.created_at);
}

#[tokio::test]
async fn schools_list_is_ordered_by_name() {
    let dir = TempDir::new().unwrap();
    let storage = make_storage(&dir).await;
    for name in ["Zephyr State", "Alder University", "Midland Tech"] {
        storage.add_school("u1", school_input(name)).await.unwrap();
    }
    let names: Vec<String> = storage
        .list_schools("u1")
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["Alder University", "Midland Tech", "Zephyr State"]);
}

#[tokio::test]
async fn update_by_wrong_owner_is_rejected() {
    let dir = TempDir::new().unwrap();
    let storage = make_storage(&dir).await;
    let school = storage
        .add_school("u1", school_input("Bannerline College"))
        .await
        .unwrap();

    let err = storage
        .update_school(&school.id, "intruder", school_input("Hijacked"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Authorization));

    // The record is untouched.
    let unchanged = storage.get_school(&school.id, "u1").await.unwrap();
    assert_eq!(unchanged.name, "Bannerline College");
}

#[tokio::test]
async fn coach_crud_and_school_filter() {
    let dir = TempDir::new().unwrap();
    let storage = make_storage(&dir).await;
    let s1 = storage.add_school("u1", school_input("One")).await.unwrap();
    let s2 = storage.add_school("u1", school_input("Two")).await.unwrap();

    let c1 = storage
        .add_coach("u1", coach_input(&s1.id, "Avery Banks"))
        .await
        .unwrap();
    storage
        .add_coach("u1", coach_input(&s2.id, "Drew Castillo"))
        .await
        .unwrap();

    let all = storage.list_coaches("u1", None).await.unwrap();
    assert_eq!(all.len(), 2);
    let only_s1 = storage.list_coaches("u1", Some(&s1.id)).await.unwrap();
    assert_eq!(only_s1.len(), 1);
    assert_eq!(only_s1[0].id, c1.id);

    storage.delete_coach(&c1.id, "u1").await.unwrap();
    assert!(storage.list_coaches("u1", Some(&s1.id)).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_coach_by_wrong_owner_is_rejected() {
    let dir = TempDir::new().unwrap();
    let storage = make_storage(&dir).await;
    let s1 = storage.add_school("u1", school_input("One")).await.unwrap();
    let coach = storage
        .add_coach("u1", coach_input(&s1.id, "Avery Banks"))
        .await
        .unwrap();

    let err = storage.delete_coach(&coach.id, "u2").await.unwrap_err();
    assert!(matches!(err, AppError::Authorization));
    assert!(storage.get_coach(&coach.id, "u1").await.is_ok());
}

#[tokio::test]
async fn message_create_assigns_id_and_timestamp() {
    let dir = TempDir::new().unwrap();
    let storage = make_storage(&dir).await;

    let before = Utc::now();
    let msg = storage
        .create_message("u1", new_message("s1", "c1", None))
        .await
        .unwrap();
    assert!(!msg.id.is_empty());
    assert!(msg.timestamp >= before);
    assert_eq!(msg.direction, Direction::Outgoing);
    assert!(msg.is_root());
}

#[tokio::test]
async fn edit_preserves_timestamp_and_checks_owner() {
    let dir = TempDir::new().unwrap();
    let storage = make_storage(&dir).await;
    let msg = storage
        .create_message("u1", new_message("s1", "c1", None))
        .await
        .unwrap();

    let err = storage
        .update_message_content(&msg.id, "u2", "rewritten")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Authorization));

    let edited = storage
        .update_message_content(&msg.id, "u1", "rewritten")
        .await
        .unwrap();
    assert_eq!(edited.content, "rewritten");
    // Edits never move a thread: the original timestamp survives.
    assert_eq!(edited.timestamp, msg.timestamp);
}

#[tokio::test]
async fn deleting_a_root_removes_its_replies() {
    let dir = TempDir::new().unwrap();
    let storage = make_storage(&dir).await;
    let root = storage
        .create_message("u1", new_message("s1", "c1", None))
        .await
        .unwrap();
    storage
        .create_message("u1", new_message("s1", "c1", Some(&root.id)))
        .await
        .unwrap();

    storage.delete_message(&root.id, "u1").await.unwrap();
    let remaining = storage.list_messages("s1", "u1", None).await.unwrap();
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn mark_read_flips_status_only() {
    let dir = TempDir::new().unwrap();
    let storage = make_storage(&dir).await;
    let mut new = new_message("s1", "c1", None);
    new.direction = Direction::Incoming;
    new.status = MessageStatus::Unread;
    let msg = storage.create_message("u1", new).await.unwrap();

    assert_eq!(storage.unread_count("s1", "u1").await.unwrap(), 1);
    let read = storage.mark_read(&msg.id, "u1").await.unwrap();
    assert_eq!(read.status, MessageStatus::Read);
    assert_eq!(read.content, msg.content);
    assert_eq!(storage.unread_count("s1", "u1").await.unwrap(), 0);
}

#[tokio::test]
async fn coach_filter_narrows_message_query() {
    let dir = TempDir::new().unwrap();
    let storage = make_storage(&dir).await;
    storage
        .create_message("u1", new_message("s1", "c1", None))
        .await
        .unwrap();
    storage
        .create_message("u1", new_message("s1", "c2", None))
        .await
        .unwrap();

    let all = storage.list_messages("s1", "u1", None).await.unwrap();
    assert_eq!(all.len(), 2);
    let only_c2 = storage.list_messages("s1", "u1", Some("c2")).await.unwrap();
    assert_eq!(only_c2.len(), 1);
    assert_eq!(only_c2[0].coach_id, "c2");
}

#[tokio::test]
async fn missing_record_is_not_found_not_authorization() {
    let dir = TempDir::new().unwrap();
    let storage = make_storage(&dir).await;
    let err = storage.delete_message("ghost", "u1").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound { .. }));
}

#[tokio::test]
async fn profile_upsert_creates_then_updates() {
    let dir = TempDir::new().unwrap();
    let storage = make_storage(&dir).await;

    assert!(storage.get_profile("u1").await.unwrap().is_none());

    let input: ProfileInput = serde_json::from_value(serde_json::json!({
        "name": "Jordan Reyes",
        "birthday": "2008-04-12T00:00:00Z",
        "interests": ["Biology"],
        "stats": { "position": "Setter", "gpa": "3.9" },
    }))
    .unwrap();
    let created = storage.upsert_profile("u1", input).await.unwrap();
    assert_eq!(created.name, "Jordan Reyes");
    assert_eq!(created.stats.position, "Setter");

    let update: ProfileInput = serde_json::from_value(serde_json::json!({
        "name": "Jordan Reyes",
        "birthday": "2008-04-12T00:00:00Z",
        "stats": { "position": "Outside Hitter" },
    }))
    .unwrap();
    let updated = storage.upsert_profile("u1", update).await.unwrap();
    assert_eq!(updated.stats.position, "Outside Hitter");
    assert_eq!(updated.created_at, created.created_at);
}

#[tokio::test]
async fn backfill_stamps_only_unowned_rows() {
    let dir = TempDir::new().unwrap();
    let storage = make_storage(&dir).await;
    storage
        .create_message("u1", new_message("s1", "c1", None))
        .await
        .unwrap();

    // Simulate legacy rows that predate per-user scoping.
    sqlx::query(
        "INSERT INTO communications
             (id, user_id, school_id, coach_id, content, message_type, direction,
              status, parent_id, timestamp, created_at, updated_at)
         VALUES ('legacy1', '', 's1', 'c1', 'old note', 'other', 'outgoing',
                 'read', NULL, '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z',
                 '2024-01-01T00:00:00Z')",
    )
    .execute(&storage.pool())
    .await
    .unwrap();

    let stamped = storage.backfill_owner_ids("u1").await.unwrap();
    assert_eq!(stamped, 1);

    let msgs = storage.list_messages("s1", "u1", None).await.unwrap();
    assert_eq!(msgs.len(), 2);
    // Running again is a no-op.
    assert_eq!(storage.backfill_owner_ids("u1").await.unwrap(), 0);
}
