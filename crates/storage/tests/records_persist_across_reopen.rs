use shared::domain::Collection;
use storage::Storage;

#[tokio::test]
async fn records_survive_reopening_the_database_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("materials.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let first_open = Storage::new(&database_url).await.expect("first open");
    let id = first_open
        .insert_record(Collection::Inventory, "철근", "100")
        .await
        .expect("insert");
    first_open.pool().close().await;

    let reopened = Storage::new(&database_url).await.expect("reopen");
    let records = reopened
        .list_records(Collection::Inventory)
        .await
        .expect("list");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, id);
    assert_eq!(records[0].detail, "100");
}
