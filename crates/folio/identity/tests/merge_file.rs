use folio_identity::{MergeConfigError, MergeTable};
use std::collections::BTreeSet;
use std::io::Write;

fn write_merge_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write merge file");
    file
}

#[test]
fn resolves_merged_author_from_file() {
    let file = write_merge_file(
        "merged-author:\n  to: 100\n  from: [101, 102]\n  include: [103]\n",
    );
    let table = MergeTable::from_path(file.path()).unwrap();

    let related = table.related_ids(101);
    assert_eq!(related.canonical_id, 100);
    assert_eq!(related.other_ids, BTreeSet::from([101, 102, 103]));

    let unrelated = table.related_ids(999);
    assert_eq!(unrelated.canonical_id, 999);
    assert!(unrelated.other_ids.is_empty());

    assert_eq!(table.canonicalize(101), 100);
    assert_eq!(table.canonicalize(999), 999);
    assert!(table.is_canonical(100));
    assert!(!table.is_canonical(102));
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = MergeTable::from_path(dir.path().join("merge.yml")).unwrap_err();
    assert!(matches!(err, MergeConfigError::Read { .. }));
}

#[test]
fn malformed_file_is_rejected() {
    let file = write_merge_file("- 1\n- 2\n");
    assert!(matches!(
        MergeTable::from_path(file.path()),
        Err(MergeConfigError::Malformed(_))
    ));
}

#[test]
fn table_is_shareable_across_threads() {
    let table = std::sync::Arc::new(
        MergeTable::from_yaml_str("a:\n  to: 1\n  from: [2, 3]\n").unwrap(),
    );
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let table = table.clone();
            std::thread::spawn(move || table.canonicalize(3))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 1);
    }
}
