use super::*;

use client_core::{KeyScheme, RecordKey};

fn parse(argv: &[&str]) -> Args {
    Args::try_parse_from(std::iter::once("desktop").chain(argv.iter().copied())).expect("args")
}

#[test]
fn defaults_to_remote_inventory_listing() {
    let args = parse(&[]);
    assert_eq!(args.collection, Collection::Inventory);
    assert_eq!(args.backend, Backend::Remote);
    assert_eq!(args.server_url, "http://127.0.0.1:8000");
    assert_eq!(args.command, None);
}

#[test]
fn parses_backend_collection_and_edit_overrides() {
    let args = parse(&[
        "--collection",
        "suppliers",
        "--backend",
        "remote-delete-only",
        "edit",
        "3",
        "--name",
        "대한철강",
    ]);
    assert_eq!(args.collection, Collection::Suppliers);
    assert_eq!(args.backend, Backend::RemoteDeleteOnly);
    assert_eq!(
        args.command,
        Some(Command::Edit {
            key: "3".into(),
            name: Some("대한철강".into()),
            detail: None,
        })
    );
}

#[test]
fn rejects_unknown_collection() {
    let parsed = Args::try_parse_from(["desktop", "--collection", "orders"]);
    assert!(parsed.is_err());
}

#[test]
fn explicit_data_dir_wins() {
    let dir = resolve_data_dir(Some(PathBuf::from("/tmp/materials-test"))).expect("dir");
    assert_eq!(dir, PathBuf::from("/tmp/materials-test"));
}

#[test]
fn builds_store_matching_backend() {
    let data = tempfile::tempdir().expect("tempdir");
    let data_dir = data.path().to_str().expect("utf8");

    let keyed = build_store(&parse(&["--backend", "local-keyed", "--data-dir", data_dir]))
        .expect("keyed");
    assert_eq!(keyed.key_scheme(), KeyScheme::Generated);
    assert!(keyed.supports_update());

    let positional = build_store(&parse(&[
        "--collection",
        "suppliers",
        "--backend",
        "local",
        "--data-dir",
        data_dir,
    ]))
    .expect("positional");
    assert_eq!(positional.key_scheme(), KeyScheme::Position);
    assert_eq!(positional.schema().collection, Collection::Suppliers);

    let delete_only = build_store(&parse(&["--backend", "remote-delete-only"])).expect("remote");
    assert!(!delete_only.supports_update());

    assert!(build_store(&parse(&["--server-url", "not a url"])).is_err());
}

#[tokio::test]
async fn add_and_delete_against_local_slot() {
    let data = tempfile::tempdir().expect("tempdir");
    let data_dir = data.path().to_str().expect("utf8");

    let table = Arc::new(TableModel::new());
    let notices = Arc::new(NoticeLog::new());
    run(
        parse(&["--backend", "local", "--data-dir", data_dir, "add", "각재", "10개"]),
        table.clone(),
        notices.clone(),
    )
    .await
    .expect("add");
    assert_eq!(table.len(), 4);
    assert!(data.path().join("inventoryItems.json").exists());

    let table = Arc::new(TableModel::new());
    run(
        parse(&["--backend", "local", "--data-dir", data_dir, "delete", "0"]),
        table.clone(),
        notices.clone(),
    )
    .await
    .expect("delete");
    let rows = table.rows();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].key, RecordKey::Index(0));
    assert_eq!(rows[0].fields.name, "시멘트");
    assert!(notices.is_empty());
}

#[tokio::test]
async fn edit_with_both_overrides_skips_prompts() {
    let data = tempfile::tempdir().expect("tempdir");
    let data_dir = data.path().to_str().expect("utf8");
    let base = ["--backend", "local-keyed", "--data-dir", data_dir];

    let table = Arc::new(TableModel::new());
    run(parse(&base), table.clone(), Arc::new(NoticeLog::new()))
        .await
        .expect("list");
    let first = table.rows()[0].key.to_string();

    let mut argv = base.to_vec();
    argv.extend(["edit", first.as_str(), "--name", "특수철근", "--detail", "80개"]);
    let table = Arc::new(TableModel::new());
    run(parse(&argv), table.clone(), Arc::new(NoticeLog::new()))
        .await
        .expect("edit");

    let rows = table.rows();
    assert_eq!(rows[0].key.to_string(), first);
    assert_eq!(rows[0].fields.name, "특수철근");
    assert_eq!(rows[0].fields.detail, "80개");
}

#[test]
fn table_lists_labels_and_controls() {
    let rows = vec![client_core::TableRow {
        key: RecordKey::Index(0),
        fields: client_core::RecordFields::new("철근", "100개"),
        controls: vec![client_core::RowControl {
            action: client_core::RowAction::Delete,
            key: RecordKey::Index(0),
        }],
    }];
    let text = format_table(InventoryItem::SCHEMA, &rows);
    assert!(text.contains("품목"));
    assert!(text.contains("수량"));
    assert!(text.contains("철근"));
    assert!(text.trim_end().ends_with("delete"));

    assert!(format_table(Supplier::SCHEMA, &[]).contains("(no records)"));
}
