//! Document Store Operation Tests
//!
//! set/get/update/delete behavior against a provisioned table:
//! - set then get returns the stored payload
//! - get of an absent key is empty, never an error
//! - update is a shallow merge and fails with NotFound on absent keys
//! - delete then get is empty; deleting nothing succeeds

use std::sync::Arc;

use pgkv::engine::{Connection, MemoryConnection, Statement};
use pgkv::schema::SchemaLoader;
use pgkv::{DeleteOptions, DocumentKey, DocumentStore, StoreConfig, StoreError, ValidationMode};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

const SCHEMAS: &str = r#"{
    "users": {
        "fields": {
            "firstName": "string",
            "lastName": "string",
            "age": "integer",
            "nickname": "string?"
        }
    },
    "orders": {
        "fields": { "total": "float" }
    }
}"#;

async fn setup_with(config: StoreConfig) -> (Arc<MemoryConnection>, DocumentStore) {
    let registry = SchemaLoader::from_json_str(SCHEMAS).unwrap();
    let conn = Arc::new(MemoryConnection::new());
    conn.transaction(&Statement::provision("users")).await.unwrap();
    let store = DocumentStore::new(Arc::new(registry), conn.clone(), config);
    (conn, store)
}

async fn setup() -> (Arc<MemoryConnection>, DocumentStore) {
    setup_with(StoreConfig::default()).await
}

fn user(first: &str, age: i64) -> Value {
    json!({ "firstName": first, "lastName": "B", "age": age })
}

// =============================================================================
// Set / Get
// =============================================================================

#[tokio::test]
async fn test_set_then_get_returns_same_data() {
    let (_conn, store) = setup().await;

    for (id, value) in [
        ("u1", user("A", 23)),
        ("u2", json!({ "firstName": "C", "lastName": "D", "age": 0, "nickname": "cd" })),
        ("u3", json!({ "firstName": "", "lastName": "", "age": -5, "extra": [1, 2] })),
    ] {
        store.set(("users", id), value.clone()).await.unwrap();
        let doc = store.get(("users", id)).await.unwrap().unwrap();
        assert_eq!(doc.id, id);
        assert_eq!(doc.data, value);
    }
}

#[tokio::test]
async fn test_get_absent_key_is_empty() {
    let (_conn, store) = setup().await;

    assert!(store.get(("users", "nobody")).await.unwrap().is_none());
    assert_eq!(store.metrics().get_misses, 1);
}

#[tokio::test]
async fn test_get_on_unprovisioned_table_is_empty() {
    let (conn, store) = setup().await;

    assert!(store.get(("orders", "o1")).await.unwrap().is_none());
    // Reads never create tables
    assert!(!conn.has_table("orders"));
}

#[tokio::test]
async fn test_duplicate_set_is_storage_error() {
    let (_conn, store) = setup().await;
    store.set(("users", "u1"), user("A", 1)).await.unwrap();

    let err = store.set(("users", "u1"), user("Z", 2)).await.unwrap_err();
    match err {
        StoreError::Storage(engine) => assert!(engine.is_unique_violation()),
        other => panic!("expected storage error, got {:?}", other),
    }

    // The first write is untouched
    let doc = store.get(("users", "u1")).await.unwrap().unwrap();
    assert_eq!(doc.data["firstName"], "A");
}

// =============================================================================
// Sub-keys
// =============================================================================

#[tokio::test]
async fn test_sub_key_addressing() {
    let (_conn, store) = setup().await;
    store
        .set(("users", "u1", "profile"), user("A", 1))
        .await
        .unwrap();

    let doc = store.get(("users", "u1", "profile")).await.unwrap().unwrap();
    assert_eq!(doc.key.as_deref(), Some("profile"));

    // Lookup by id alone still finds it
    assert!(store.get(("users", "u1")).await.unwrap().is_some());

    // A different sub-key does not
    assert!(store.get(("users", "u1", "other")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_deserialized_key_with_empty_sub_key_finds_document() {
    let (_conn, store) = setup().await;
    store.set(("users", "u1"), user("A", 1)).await.unwrap();

    let key: DocumentKey =
        serde_json::from_value(json!({ "table": "users", "id": "u1", "sub_key": "" })).unwrap();
    assert_eq!(key.sub_key(), None);
    assert!(store.get(key).await.unwrap().is_some());
}

#[tokio::test]
async fn test_empty_id_is_invalid_key() {
    let (conn, store) = setup().await;

    let err = store.set(("users", ""), user("A", 1)).await.unwrap_err();
    assert_eq!(err.code(), "KV_INVALID_KEY");
    assert_eq!(conn.row_count("users"), 0);
}

#[tokio::test]
async fn test_empty_sub_key_means_none() {
    let (_conn, store) = setup().await;
    store.set(("users", "u1", ""), user("A", 1)).await.unwrap();

    let doc = store.get(DocumentKey::new("users", "u1")).await.unwrap().unwrap();
    assert_eq!(doc.key, None);
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn test_update_merges_shallowly() {
    let (_conn, store) = setup().await;
    store.set(("users", "u1"), user("A", 23)).await.unwrap();

    store.update(("users", "u1"), json!({ "age": 24 })).await.unwrap();

    let doc = store.get(("users", "u1")).await.unwrap().unwrap();
    assert_eq!(doc.data, json!({ "firstName": "A", "lastName": "B", "age": 24 }));
}

#[tokio::test]
async fn test_update_moves_last_updated_date_only() {
    let (_conn, store) = setup().await;
    let created = store.set(("users", "u1"), user("A", 1)).await.unwrap();

    let updated = store
        .update(("users", "u1"), json!({ "nickname": "a" }))
        .await
        .unwrap();
    assert_eq!(updated.creation_date, created.creation_date);
    assert!(updated.last_updated_date >= created.last_updated_date);
}

#[tokio::test]
async fn test_update_absent_key_is_not_found() {
    let (_conn, store) = setup().await;

    let err = store
        .update(("users", "ghost"), json!({ "age": 1 }))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "KV_NOT_FOUND");

    // Same outcome before the table exists
    let err = store
        .update(("orders", "o1"), json!({ "total": 1.5 }))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn test_concurrent_disjoint_updates_both_persist() {
    let (_conn, store) = setup().await;
    let store = Arc::new(store);
    store.set(("users", "u1"), user("A", 1)).await.unwrap();

    let first = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.update(("users", "u1"), json!({ "age": 2 })).await })
    };
    let second = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            store
                .update(("users", "u1"), json!({ "nickname": "n" }))
                .await
        })
    };
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    // Merges run as one statement each, so neither delta is lost
    let doc = store.get(("users", "u1")).await.unwrap().unwrap();
    assert_eq!(doc.data["age"], 2);
    assert_eq!(doc.data["nickname"], "n");
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_then_get_is_empty() {
    let (_conn, store) = setup().await;
    store.set(("users", "u1"), user("A", 1)).await.unwrap();

    assert!(store
        .delete(("users", "u1"), DeleteOptions::default())
        .await
        .unwrap());
    assert!(store.get(("users", "u1")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_absent_key_succeeds() {
    let (_conn, store) = setup().await;

    assert!(!store
        .delete(("users", "ghost"), DeleteOptions::soft())
        .await
        .unwrap());
    assert!(!store
        .delete(("orders", "o1"), DeleteOptions::hard())
        .await
        .unwrap());
}

#[tokio::test]
async fn test_soft_delete_keeps_tombstone() {
    let (conn, store) = setup().await;
    store.set(("users", "u1"), user("A", 1)).await.unwrap();

    store
        .delete(("users", "u1"), DeleteOptions::soft())
        .await
        .unwrap();
    assert_eq!(conn.row_count("users"), 1);

    // Tombstones are invisible to update
    let err = store
        .update(("users", "u1"), json!({ "age": 2 }))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "KV_NOT_FOUND");

    // and can be overwritten by a new set
    store.set(("users", "u1"), user("B", 3)).await.unwrap();
    let doc = store.get(("users", "u1")).await.unwrap().unwrap();
    assert_eq!(doc.data, user("B", 3));
    assert_eq!(conn.row_count("users"), 1);
}

#[tokio::test]
async fn test_hard_delete_removes_row() {
    let (conn, store) = setup().await;
    store.set(("users", "u1"), user("A", 1)).await.unwrap();

    store
        .delete(("users", "u1"), DeleteOptions::hard())
        .await
        .unwrap();
    assert_eq!(conn.row_count("users"), 0);
}

// =============================================================================
// Error Taxonomy
// =============================================================================

#[tokio::test]
async fn test_unknown_table_rejected_everywhere() {
    let (_conn, store) = setup().await;

    let errors = [
        store.set(("ghosts", "g1"), json!({})).await.unwrap_err(),
        store.get(("ghosts", "g1")).await.unwrap_err(),
        store.update(("ghosts", "g1"), json!({})).await.unwrap_err(),
        store
            .delete(("ghosts", "g1"), DeleteOptions::default())
            .await
            .unwrap_err(),
    ];

    for err in errors {
        assert_eq!(err.code(), "KV_UNKNOWN_TABLE");
        assert!(!err.is_retryable());
    }
}

#[tokio::test]
async fn test_schema_violation_stores_nothing() {
    let (conn, store) = setup().await;

    let err = store
        .set(("users", "u1"), json!({ "firstName": "A", "lastName": "B", "age": "old" }))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "KV_SCHEMA_VIOLATION");
    assert_eq!(conn.row_count("users"), 0);
}

#[tokio::test]
async fn test_validation_off_accepts_undeclared_shapes() {
    let (_conn, store) = setup_with(StoreConfig::default().with_validation(ValidationMode::Off)).await;

    store
        .set(("users", "u1"), json!({ "age": "not a number" }))
        .await
        .unwrap();
    store
        .update(("users", "u1"), json!({ "firstName": 7 }))
        .await
        .unwrap();

    let doc = store.get(("users", "u1")).await.unwrap().unwrap();
    assert_eq!(doc.data, json!({ "age": "not a number", "firstName": 7 }));
}
