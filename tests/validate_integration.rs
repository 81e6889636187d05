use chrono::NaiveDate;
use snip_core::domain::{SnippetRecord, TagList, derive_id, parse_tags};
use snip_core::store::{ValidationError, validate};

fn record(id: Option<&str>, name: Option<&str>, content: Option<&str>) -> SnippetRecord {
    SnippetRecord {
        id: id.map(str::to_string),
        name: name.map(str::to_string),
        content: content.map(str::to_string),
        ..SnippetRecord::default()
    }
}

fn ids(records: Vec<SnippetRecord>) -> Vec<String> {
    validate(records).snippets.into_iter().map(|s| s.id).collect()
}

#[test]
fn duplicate_ids_get_numeric_suffixes() {
    let validated = validate(vec![
        record(Some("x"), Some("First"), Some("one")),
        record(Some("x"), Some("Second"), Some("two")),
    ]);

    let ids: Vec<_> = validated.snippets.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["x", "x-1"]);
    assert_eq!(validated.snippets[1].name, "Second");
    assert_eq!(
        validated.renames().collect::<Vec<_>>(),
        vec![&ValidationError::DuplicateId {
            original: "x".into(),
            renamed: "x-1".into()
        }]
    );
}

#[test]
fn suffix_skips_ids_already_in_use() {
    assert_eq!(
        ids(vec![
            record(Some("git-1"), Some("a"), Some("a")),
            record(Some("git-1"), Some("b"), Some("b")),
        ]),
        vec!["git-1", "git-1-1"]
    );
    assert_eq!(
        ids(vec![
            record(Some("x"), Some("a"), Some("a")),
            record(Some("x-1"), Some("b"), Some("b")),
            record(Some("x"), Some("c"), Some("c")),
        ]),
        vec!["x", "x-1", "x-2"]
    );
}

#[test]
fn entries_without_name_or_content_are_dropped() {
    let validated = validate(vec![
        record(Some("no-name"), None, Some("echo hi")),
        record(Some("blank-content"), Some("Blank"), Some("   ")),
        record(Some("ok"), Some("Ok"), Some("echo ok")),
    ]);

    assert_eq!(validated.snippets.len(), 1);
    assert_eq!(validated.snippets[0].id, "ok");
    assert_eq!(validated.issues.len(), 2);
    assert!(matches!(
        &validated.issues[0],
        ValidationError::MissingField { field: "name", .. }
    ));
    assert!(matches!(
        &validated.issues[1],
        ValidationError::MissingField { field: "content", .. }
    ));
}

#[test]
fn missing_id_is_derived_from_name() {
    assert_eq!(
        ids(vec![record(None, Some("Undo last commit (keep changes)"), Some("git reset"))]),
        vec!["undo-last-commit-keep-changes"]
    );
    assert_eq!(derive_id("  Docker: prune!  "), "docker-prune");
    assert_eq!(derive_id("ÄÖÜ").len(), 32);
}

#[test]
fn validation_is_idempotent() {
    let first = validate(vec![
        record(Some("x"), Some("First"), Some("one")),
        record(Some("x"), Some("Second"), Some("two")),
        record(None, Some("Third"), Some("three")),
        record(Some("y"), Some(""), Some("dropped")),
    ]);

    let again = validate(first.snippets.iter().map(SnippetRecord::from).collect());
    assert!(again.issues.is_empty());
    assert_eq!(again.snippets, first.snippets);
}

#[test]
fn tags_are_normalized_from_list_or_text() {
    assert_eq!(
        TagList::Text("Git, Version Control,,".into()).normalized(),
        vec!["git", "version-control"]
    );
    assert_eq!(
        TagList::List(vec![" Python ".into(), "python".into(), "".into()]).normalized(),
        vec!["python"]
    );
    assert_eq!(parse_tags(""), Vec::<String>::new());
}

#[test]
fn dates_are_kept_or_defaulted() {
    let mut entry = record(Some("d"), Some("Dated"), Some("x"));
    entry.created = Some("2024-01-15".into());
    entry.modified = Some("not a date".into());

    let snippet = validate(vec![entry]).snippets.remove(0);
    assert_eq!(snippet.created, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    assert_eq!(snippet.modified, chrono::Local::now().date_naive());
}
