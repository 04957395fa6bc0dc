use super::*;
use serde_json::json;
use tempfile::TempDir;

#[tokio::test]
async fn test_memory_store_round_trip() {
    let store = MemoryStore::new();
    store.set("buddy_api_key", &json!("sk-ant-1")).await.unwrap();

    assert_eq!(store.get("buddy_api_key").await.unwrap(), Some(json!("sk-ant-1")));

    store.remove("buddy_api_key").await.unwrap();
    assert!(store.get("buddy_api_key").await.unwrap().is_none());
}

#[tokio::test]
async fn test_memory_store_remove_missing_key() {
    let store = MemoryStore::new();
    assert!(store.remove("nothing").await.is_ok());
}

#[tokio::test]
async fn test_memory_store_quota() {
    let store = MemoryStore::new().with_max_item_bytes(32);
    store.set("k", &json!("short")).await.unwrap();

    let err = store
        .set("k", &json!("this value is definitely longer than the limit"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::QuotaExceeded { limit: 32, .. }));

    // The previous value survives a rejected write.
    assert_eq!(store.get("k").await.unwrap(), Some(json!("short")));
}

#[tokio::test]
async fn test_file_store_save_and_get() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::new(temp_dir.path()).await.unwrap();

    let settings = json!({"sidebarWidth": 420, "showDebugMessages": true});
    store.set("buddy_settings", &settings).await.unwrap();

    assert_eq!(store.get("buddy_settings").await.unwrap(), Some(settings));
    assert!(temp_dir.path().join("buddy_settings.json").exists());
}

#[tokio::test]
async fn test_file_store_colliding_keys_do_not_alias() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::new(temp_dir.path()).await.unwrap();

    store.set("buddy_conv_a.b", &json!({"id": "a.b"})).await.unwrap();

    assert_eq!(store.get("buddy_conv_a_b").await.unwrap(), None);
    assert_eq!(
        store.get("buddy_conv_a.b").await.unwrap(),
        Some(json!({"id": "a.b"}))
    );
}

#[tokio::test]
async fn test_file_store_persists_across_instances() {
    let temp_dir = TempDir::new().unwrap();
    {
        let store = FileStore::new(temp_dir.path()).await.unwrap();
        store.set("buddy_blacklist", &json!(["*.bank.com"])).await.unwrap();
    }

    let reopened = FileStore::new(temp_dir.path()).await.unwrap();
    assert_eq!(
        reopened.get("buddy_blacklist").await.unwrap(),
        Some(json!(["*.bank.com"]))
    );
}

#[tokio::test]
async fn test_file_store_keys_preserve_original_names() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::new(temp_dir.path()).await.unwrap();

    store.set("buddy_conv_a1", &json!({})).await.unwrap();
    store.set("odd key/with:chars", &json!(1)).await.unwrap();

    let mut keys = store.keys().await.unwrap();
    keys.sort();
    assert_eq!(keys, vec!["buddy_conv_a1".to_string(), "odd key/with:chars".to_string()]);
}

#[tokio::test]
async fn test_file_store_skips_corrupt_files_in_keys() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::new(temp_dir.path()).await.unwrap();
    store.set("good", &json!(true)).await.unwrap();
    std::fs::write(temp_dir.path().join("bad.json"), "{ not json").unwrap();

    assert_eq!(store.keys().await.unwrap(), vec!["good".to_string()]);
}

#[tokio::test]
async fn test_file_store_remove() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::new(temp_dir.path()).await.unwrap();

    store.set("buddy_execution_state", &json!({"requestId": "r1"})).await.unwrap();
    store.remove("buddy_execution_state").await.unwrap();
    store.remove("buddy_execution_state").await.unwrap();

    assert!(store.get("buddy_execution_state").await.unwrap().is_none());
}

#[tokio::test]
async fn test_file_store_quota() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::new(temp_dir.path())
        .await
        .unwrap()
        .with_max_item_bytes(16);

    let result = store.set("buddy_conv_x", &json!({"messages": [1, 2, 3]})).await;
    assert!(matches!(result, Err(StorageError::QuotaExceeded { .. })));
    assert!(store.get("buddy_conv_x").await.unwrap().is_none());
}
