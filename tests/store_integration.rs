use snip_core::domain::Snippet;
use snip_core::store::backup::backup_path;
use snip_core::store::{MAX_BACKUPS, SnippetStore, StoreError, ValidationError, sample_snippets};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const DUPLICATES: &str = "\
version: 1
snippets:
  - id: x
    name: First
    content: one
    tags: [Shell, shell]
  - id: x
    name: Second
    content: two
  - name: No content here
";

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn setup() -> (TempDir, PathBuf) {
    init_logging();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("snippets.yaml");
    (temp_dir, path)
}

fn entry_count(path: &std::path::Path) -> usize {
    fs::read_to_string(path).unwrap().matches("- id: ").count()
}

#[test]
fn missing_file_is_created_with_samples() {
    let (_temp_dir, path) = setup();
    let store = SnippetStore::open(&path);

    assert!(path.exists());
    assert_eq!(store.snapshot().len(), sample_snippets().len());
    assert!(store.snapshot().iter().any(|s| s.id == "flask-run"));
    assert!(store.list_backups().is_empty());
}

#[test]
fn loading_repairs_entries() {
    let (_temp_dir, path) = setup();
    fs::write(&path, DUPLICATES).unwrap();

    let store = SnippetStore::open(&path);
    let snapshot = store.snapshot();
    let ids: Vec<_> = snapshot.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["x", "x-1"]);
    assert_eq!(snapshot[0].tags, vec!["shell"]);

    // Loading alone never rewrites the file.
    assert_eq!(fs::read_to_string(&path).unwrap(), DUPLICATES);
}

#[test]
fn collection_round_trips_through_file() -> Result<(), StoreError> {
    let (_temp_dir, path) = setup();
    let before = {
        let store = SnippetStore::open(&path);
        store.add(
            Snippet::new("Docker prune", "docker system prune -af")
                .with_description("Remove everything unused")
                .with_tags(["Docker", "cleanup"]),
        )?;
        store.snapshot()
    };

    let store = SnippetStore::open(&path);
    assert_eq!(store.snapshot(), before);
    Ok(())
}

#[test]
fn add_derives_and_deduplicates_ids() -> Result<(), StoreError> {
    let (_temp_dir, path) = setup();
    let store = SnippetStore::open(&path);

    let first = store.add(Snippet::new("Docker prune", "docker system prune"))?;
    assert_eq!(first.id, "docker-prune");

    let second = store.add(Snippet::new("Docker prune", "docker image prune"))?;
    assert_eq!(second.id, "docker-prune-1");

    let explicit = store.add(Snippet::new("Other", "x").with_id("git-uncommit"))?;
    assert_eq!(explicit.id, "git-uncommit-1");

    assert_eq!(store.snapshot().len(), sample_snippets().len() + 3);
    Ok(())
}

#[test]
fn add_rejects_missing_fields_without_saving() {
    let (_temp_dir, path) = setup();
    let store = SnippetStore::open(&path);
    let before = fs::read_to_string(&path).unwrap();

    let err = store.add(Snippet::new("Empty", "  ")).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::MissingField { field: "content", .. })
    ));

    assert_eq!(store.snapshot().len(), sample_snippets().len());
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
    assert!(store.list_backups().is_empty());
}

#[test]
fn delete_is_all_or_nothing() -> Result<(), StoreError> {
    let (_temp_dir, path) = setup();
    let store = SnippetStore::open(&path);

    let err = store.delete(&["git-uncommit", "nope"]).unwrap_err();
    match err {
        StoreError::NotFound(missing) => assert_eq!(missing, vec!["nope"]),
        other => panic!("unexpected error: {other}"),
    }
    assert!(store.snapshot().iter().any(|s| s.id == "git-uncommit"));

    store.delete(&["git-uncommit", "flask-run"])?;
    assert_eq!(store.snapshot().len(), sample_snippets().len() - 2);

    let reopened = SnippetStore::open(&path);
    assert!(!reopened.snapshot().iter().any(|s| s.id == "git-uncommit"));
    Ok(())
}

#[test]
fn update_replaces_by_id() -> Result<(), StoreError> {
    let (_temp_dir, path) = setup();
    let store = SnippetStore::open(&path);

    let current = store
        .snapshot()
        .iter()
        .find(|s| s.id == "git-uncommit")
        .cloned()
        .unwrap();
    let updated = store.update(current.with_content("git reset --soft HEAD~2"))?;
    assert_eq!(updated.content, "git reset --soft HEAD~2");

    let snapshot = store.snapshot();
    let stored = snapshot.iter().find(|s| s.id == "git-uncommit").unwrap();
    assert_eq!(stored.content, "git reset --soft HEAD~2");

    let err = store.update(Snippet::new("Ghost", "x").with_id("ghost")).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(ids) if ids == vec!["ghost"]));
    Ok(())
}

#[test]
fn malformed_file_keeps_last_good_collection() {
    let (_temp_dir, path) = setup();
    let store = SnippetStore::open(&path);
    let good = store.snapshot();

    fs::write(&path, "snippets: [unclosed").unwrap();

    assert_eq!(store.load(), good);
    assert!(matches!(store.reload(), Err(StoreError::Parse { .. })));
    assert_eq!(store.snapshot(), good);
}

#[test]
fn reload_of_removed_file_reports_missing() {
    let (_temp_dir, path) = setup();
    let store = SnippetStore::open(&path);
    let good = store.snapshot();

    fs::remove_file(&path).unwrap();
    assert!(matches!(store.reload(), Err(StoreError::Missing(_))));
    assert_eq!(store.snapshot(), good);
}

#[test]
fn failed_write_leaves_memory_unchanged() {
    init_logging();
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();

    let store = SnippetStore::open(blocker.join("snippets.yaml"));
    assert_eq!(store.snapshot().len(), sample_snippets().len());

    let err = store.add(Snippet::new("New", "echo new")).unwrap_err();
    assert!(matches!(err, StoreError::Persistence { .. }));
    assert_eq!(store.snapshot().len(), sample_snippets().len());
}

#[test]
fn backups_rotate_and_keep_five() -> Result<(), StoreError> {
    let (_temp_dir, path) = setup();
    let store = SnippetStore::open(&path);
    let samples = sample_snippets().len();

    for i in 0..6 {
        store.add(Snippet::new(format!("Note {i}"), "text"))?;
    }

    let backups = store.list_backups();
    assert_eq!(backups.len(), usize::from(MAX_BACKUPS));
    let slots: Vec<u8> = backups.iter().map(|b| b.slot).collect();
    assert_eq!(slots, vec![1, 2, 3, 4, 5]);
    assert!(!backup_path(&path, 6).exists());

    // Slot 1 holds the state before the last save, slot 5 the oldest kept.
    assert_eq!(entry_count(&backup_path(&path, 1)), samples + 5);
    assert_eq!(entry_count(&backup_path(&path, 5)), samples + 1);
    assert_eq!(entry_count(&path), samples + 6);
    Ok(())
}

#[test]
fn restore_backup_brings_back_previous_state() -> Result<(), StoreError> {
    let (_temp_dir, path) = setup();
    let store = SnippetStore::open(&path);
    let original = store.snapshot();

    store.add(Snippet::new("Temporary", "echo tmp"))?;
    assert_eq!(store.snapshot().len(), original.len() + 1);

    let restored = store.restore_backup(1)?;
    assert_eq!(restored, original);
    assert_eq!(store.snapshot(), original);
    assert_eq!(entry_count(&path), original.len());

    assert!(matches!(store.restore_backup(0), Err(StoreError::Missing(_))));
    assert!(matches!(store.restore_backup(5), Err(StoreError::Missing(_))));
    Ok(())
}

#[test]
fn unreadable_backup_is_not_restored() -> Result<(), StoreError> {
    let (_temp_dir, path) = setup();
    let store = SnippetStore::open(&path);
    store.add(Snippet::new("Kept", "echo kept"))?;

    fs::write(backup_path(&path, 1), "snippets: [unclosed").unwrap();
    let file_before = fs::read(&path).unwrap();
    let snapshot_before = store.snapshot();

    assert!(matches!(store.restore_backup(1), Err(StoreError::Parse { .. })));
    assert_eq!(fs::read(&path).unwrap(), file_before);
    assert_eq!(store.snapshot(), snapshot_before);
    assert_eq!(store.list_backups().len(), 1);
    assert!(!backup_path(&path, 2).exists());
    Ok(())
}

#[test]
fn all_tags_are_sorted_and_unique() {
    let (_temp_dir, path) = setup();
    let store = SnippetStore::open(&path);

    let tags = store.all_tags();
    assert!(tags.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(tags.iter().filter(|t| *t == "powershell").count(), 1);
    assert!(tags.contains(&"version-control".to_string()));
}

#[test]
fn shut_down_store_refuses_writes() {
    let (_temp_dir, path) = setup();
    let mut store = SnippetStore::open(&path);
    store.shutdown();

    assert!(matches!(
        store.add(Snippet::new("Late", "echo late")),
        Err(StoreError::Closed)
    ));
    assert_eq!(store.snapshot().len(), sample_snippets().len());
    assert_eq!(store.load().len(), sample_snippets().len());
}
