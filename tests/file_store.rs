mod common;

use auction_store::{CodecError, FileStore, Store, StoreError};
use common::*;
use tempfile::TempDir;

fn open(dir: &TempDir) -> FileStore<TestCommand, TestEvent> {
    FileStore::new(
        dir.path().join("commands.json"),
        dir.path().join("events.json"),
        command_codec(),
        event_codec(),
    )
}

#[tokio::test]
async fn test_fresh_store_has_empty_logs() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);

    assert!(store.read_commands().await.unwrap().is_empty());
    assert!(store.read_events().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_end_to_end_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);

    store.write_commands(&[bid(1, 10)]).await.unwrap();
    store.write_events(&[accepted(1, 10)]).await.unwrap();

    assert_eq!(store.read_commands().await.unwrap(), vec![bid(1, 10)]);
    assert_eq!(store.read_events().await.unwrap(), vec![accepted(1, 10)]);

    drop(store);
    let reopened = open(&dir);
    assert_eq!(reopened.read_commands().await.unwrap(), vec![bid(1, 10)]);
    assert_eq!(reopened.read_events().await.unwrap(), vec![accepted(1, 10)]);
}

#[tokio::test]
async fn test_equal_timestamps_keep_write_order() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let commands = vec![bid(5, 1), bid(5, 2), bid(5, 3)];

    store.write_commands(&commands).await.unwrap();
    assert_eq!(store.read_commands().await.unwrap(), commands);
}

#[tokio::test]
async fn test_second_write_replaces_first() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);

    store.write_commands(&[bid(1, 10), bid(2, 20)]).await.unwrap();
    store.write_commands(&[bid(3, 30)]).await.unwrap();

    assert_eq!(store.read_commands().await.unwrap(), vec![bid(3, 30)]);
}

#[tokio::test]
async fn test_append_helpers_read_before_write() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);

    store.append_commands(&[bid(1, 10)]).await.unwrap();
    store.append_commands(&[bid(2, 20)]).await.unwrap();
    store.append_events(&[accepted(1, 10)]).await.unwrap();

    assert_eq!(store.read_commands().await.unwrap(), vec![bid(1, 10), bid(2, 20)]);
    assert_eq!(store.read_events().await.unwrap(), vec![accepted(1, 10)]);
}

#[tokio::test]
async fn test_logs_are_independent_files() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);

    store.write_events(&[accepted(1, 10)]).await.unwrap();

    assert!(store.read_commands().await.unwrap().is_empty());
    assert!(!store.commands_path().exists());
    assert!(store.events_path().exists());
}

#[tokio::test]
async fn test_unregistered_tag_fails_the_whole_read() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    std::fs::write(
        store.events_path(),
        r#"[
            {"$type": "BidAccepted", "at": "2026-09-01T12:01:00Z", "amount": 10},
            {"$type": "BidRejected", "at": "2026-09-01T12:02:00Z", "amount": 5}
        ]"#,
    )
    .unwrap();

    let result = store.read_events().await;
    assert!(matches!(
        result,
        Err(StoreError::Codec(CodecError::UnknownVariant(ref tag))) if tag == "BidRejected"
    ));
}

#[tokio::test]
async fn test_malformed_envelope_fails_the_whole_read() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    std::fs::write(
        store.commands_path(),
        r#"[{"$type": "Bid", "at": "2026-09-01T12:01:00Z", "amount": "ten"}]"#,
    )
    .unwrap();

    let result = store.read_commands().await;
    assert!(matches!(
        result,
        Err(StoreError::Codec(CodecError::MalformedPayload { .. }))
    ));
}

#[tokio::test]
async fn test_failed_encode_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    store.write_commands(&[bid(1, 10)]).await.unwrap();

    let narrow = FileStore::new(
        store.commands_path(),
        store.events_path(),
        auction_store::Codec::<TestCommand>::builder()
            .register(OVERSIZED_TAG, TestCommand::Oversized)
            .unwrap()
            .build(),
        event_codec(),
    );
    let result = narrow.write_commands(&[bid(2, 20)]).await;

    assert!(matches!(
        result,
        Err(StoreError::Codec(CodecError::UnknownVariant(_)))
    ));
    assert_eq!(store.read_commands().await.unwrap(), vec![bid(1, 10)]);
}
