//! Integration tests for the JSON file store
//!
//! Each test works on its own temporary directory.

use linkup_shared::models::user::{CreateUser, User};
use linkup_shared::store::{JsonStore, StoreError};
use serde_json::{json, Value};
use tempfile::TempDir;

fn create_user(email: &str) -> CreateUser {
    CreateUser {
        email: email.to_string(),
        password: "07032004".to_string(),
        first_name: Some("Test".to_string()),
        last_name: None,
    }
}

async fn read_json(path: &std::path::Path) -> Value {
    let raw = tokio::fs::read_to_string(path).await.unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[tokio::test]
async fn test_open_creates_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");

    let store = JsonStore::open(&path).await.unwrap();
    assert_eq!(store.path(), Some(path.as_path()));

    let on_disk = read_json(&path).await;
    assert_eq!(on_disk["users"], json!([]));
    assert_eq!(on_disk["pendingEmailChanges"], json!([]));
}

#[tokio::test]
async fn test_open_accepts_empty_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");
    tokio::fs::write(&path, "").await.unwrap();

    let store = JsonStore::open(&path).await.unwrap();
    assert_eq!(User::count(&store).await.unwrap(), 0);
}

#[tokio::test]
async fn test_open_rejects_malformed_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");
    tokio::fs::write(&path, "{ not json").await.unwrap();

    let result = JsonStore::open(&path).await;
    assert!(matches!(result, Err(StoreError::Malformed(_))));
}

#[tokio::test]
async fn test_writes_are_persisted_and_foreign_collections_kept() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");
    tokio::fs::write(
        &path,
        json!({
            "users": [],
            "posts": [{ "id": 1, "content": "Hello network" }],
            "jobs": [{ "id": 4, "title": "Rust engineer" }]
        })
        .to_string(),
    )
    .await
    .unwrap();

    let store = JsonStore::open(&path).await.unwrap();
    User::create(&store, create_user("a@mailinator.com")).await.unwrap();

    let on_disk = read_json(&path).await;
    assert_eq!(on_disk["users"][0]["email"], "a@mailinator.com");
    assert_eq!(on_disk["users"][0]["id"], 1);
    assert_eq!(on_disk["posts"][0]["content"], "Hello network");
    assert_eq!(on_disk["jobs"][0]["title"], "Rust engineer");
    assert_eq!(on_disk["nextUserId"], 2);

    // No temporary file left behind
    assert!(!dir.path().join("db.json.tmp").exists());
}

#[tokio::test]
async fn test_reopen_sees_committed_state() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");

    {
        let store = JsonStore::open(&path).await.unwrap();
        User::create(&store, create_user("a@mailinator.com")).await.unwrap();
        User::create(&store, create_user("b@mailinator.com")).await.unwrap();
    }

    let store = JsonStore::open(&path).await.unwrap();
    assert_eq!(User::count(&store).await.unwrap(), 2);

    let third = User::create(&store, create_user("c@mailinator.com")).await.unwrap();
    assert_eq!(third.id.value(), 3);
}

#[tokio::test]
async fn test_failed_operation_does_not_touch_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");

    let store = JsonStore::open(&path).await.unwrap();
    User::create(&store, create_user("a@mailinator.com")).await.unwrap();
    let before = tokio::fs::read_to_string(&path).await.unwrap();

    assert!(User::create(&store, create_user("a@mailinator.com")).await.is_err());

    let after = tokio::fs::read_to_string(&path).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_external_edit_is_picked_up() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");

    let store = JsonStore::open(&path).await.unwrap();
    User::create(&store, create_user("a@mailinator.com")).await.unwrap();

    // Give the filesystem clock a chance to tick so the edit has a new mtime
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    tokio::fs::write(
        &path,
        json!({
            "users": [
                { "id": "10", "email": "seeded@mailinator.com", "password": "seed" }
            ]
        })
        .to_string(),
    )
    .await
    .unwrap();

    let seeded = User::find_by_email(&store, "seeded@mailinator.com").await.unwrap();
    assert_eq!(seeded.map(|user| user.id.value()), Some(10));
    assert!(User::find_by_email(&store, "a@mailinator.com").await.unwrap().is_none());

    // Allocation continues above the seeded id
    let next = User::create(&store, create_user("b@mailinator.com")).await.unwrap();
    assert_eq!(next.id.value(), 11);
}

#[tokio::test]
async fn test_concurrent_registrations_for_same_email() {
    let dir = TempDir::new().unwrap();
    let store = std::sync::Arc::new(JsonStore::open(dir.path().join("db.json")).await.unwrap());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { User::create(&store, create_user("race@mailinator.com")).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(User::count(&store).await.unwrap(), 1);
}
