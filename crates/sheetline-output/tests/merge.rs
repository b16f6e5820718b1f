//! Merge engine behavior against an in-memory store and the real file system.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use proptest::prelude::*;
use tempfile::TempDir;

use sheetline_output::{
    MergeError, MergeOptions, MergeStore, merge_json_lines, merge_with_store,
};

#[derive(Default)]
struct MemoryStore {
    files: RefCell<BTreeMap<PathBuf, String>>,
    writes: Cell<usize>,
    fail_on_write: Option<usize>,
    undeletable: BTreeSet<PathBuf>,
}

impl MemoryStore {
    fn with_sources(sources: &[(&str, String)]) -> (Self, Vec<PathBuf>) {
        let store = Self::default();
        let mut paths = Vec::new();
        for (name, contents) in sources {
            let path = PathBuf::from("in").join(name);
            store
                .files
                .borrow_mut()
                .insert(path.clone(), contents.clone());
            paths.push(path);
        }
        (store, paths)
    }

    fn contents(&self, path: &Path) -> Option<String> {
        self.files.borrow().get(path).cloned()
    }
}

impl MergeStore for MemoryStore {
    fn read_source(&self, path: &Path) -> io::Result<String> {
        self.contents(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "missing"))
    }

    fn write_merged(&self, path: &Path, contents: &str) -> io::Result<()> {
        let attempt = self.writes.get() + 1;
        self.writes.set(attempt);
        if self.fail_on_write == Some(attempt) {
            return Err(io::Error::other("injected write fault"));
        }
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn remove_source(&self, path: &Path) -> io::Result<()> {
        if self.undeletable.contains(path) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked"));
        }
        self.files
            .borrow_mut()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "missing"))
    }
}

fn lines(count: usize, tag: &str) -> String {
    (0..count)
        .map(|i| format!(r#"{{"file":"{tag}","row":{i}}}"#))
        .collect::<Vec<_>>()
        .join("\n")
}

fn options(max_bytes: u64) -> MergeOptions {
    MergeOptions::new("out").with_max_bytes(max_bytes)
}

#[test]
fn empty_source_list_is_a_no_op() {
    let store = MemoryStore::default();
    let manifest = merge_with_store(&store, &[], &options(10)).unwrap();
    assert!(manifest.files.is_empty());
    assert_eq!(manifest.total_records, 0);
    assert_eq!(store.writes.get(), 0);
}

#[test]
fn oversized_source_is_written_alone() {
    let small = "x".repeat(10);
    let big = "y".repeat(100);
    let (store, paths) = MemoryStore::with_sources(&[
        ("a.jsonl", small.clone()),
        ("b.jsonl", big.clone()),
        ("c.jsonl", small.clone()),
    ]);

    let manifest = merge_with_store(&store, &paths, &options(50)).unwrap();

    let sizes: Vec<u64> = manifest.files.iter().map(|f| f.bytes).collect();
    assert_eq!(sizes, vec![10, 100, 10]);
    assert_eq!(manifest.files[1].source_count, 1);
    assert_eq!(
        store.contents(&manifest.files[1].path).as_deref(),
        Some(big.as_str())
    );
}

#[test]
fn batches_fill_up_to_the_ceiling() {
    let (store, paths) = MemoryStore::with_sources(&[
        ("a.jsonl", "a".repeat(20)),
        ("b.jsonl", "b".repeat(20)),
        ("c.jsonl", "c".repeat(20)),
    ]);

    // 20 + 1 + 20 = 41 fits, a third source would need 62.
    let manifest = merge_with_store(&store, &paths, &options(41)).unwrap();

    let names: Vec<String> = manifest
        .files
        .iter()
        .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["merged_001.jsonl", "merged_002.jsonl"]);
    assert_eq!(manifest.files[0].bytes, 41);
    assert_eq!(manifest.files[0].source_count, 2);
    assert_eq!(manifest.files[1].source_count, 1);
}

#[test]
fn trailing_newlines_do_not_create_blank_lines() {
    let (store, paths) = MemoryStore::with_sources(&[
        ("a.jsonl", format!("{}\n", lines(2, "a"))),
        ("b.jsonl", String::new()),
        ("c.jsonl", lines(1, "c")),
    ]);

    let manifest = merge_with_store(&store, &paths, &options(1024)).unwrap();

    assert_eq!(manifest.files.len(), 1);
    assert_eq!(manifest.files[0].source_count, 3);
    assert_eq!(manifest.total_records, 3);
    let merged = store.contents(&manifest.files[0].path).unwrap();
    assert_eq!(merged, format!("{}\n{}", lines(2, "a"), lines(1, "c")));
    assert_eq!(manifest.deleted_sources, 3);
}

#[test]
fn oversized_source_keeps_its_bytes() {
    let source = format!("{}\n", lines(1, "a"));
    let (store, paths) = MemoryStore::with_sources(&[("a.jsonl", source.clone())]);

    let manifest = merge_with_store(&store, &paths, &options(10)).unwrap();

    assert_eq!(manifest.files.len(), 1);
    assert_eq!(manifest.files[0].bytes, source.len() as u64);
    assert_eq!(store.contents(&manifest.files[0].path), Some(source));
}

#[test]
fn newline_terminated_sources_join_without_extra_bytes() {
    let first = format!("{}\n", lines(1, "a"));
    let second = lines(1, "b");
    let (store, paths) =
        MemoryStore::with_sources(&[("a.jsonl", first.clone()), ("b.jsonl", second.clone())]);
    let ceiling = (first.len() + second.len()) as u64;

    let manifest = merge_with_store(&store, &paths, &options(ceiling)).unwrap();

    assert_eq!(manifest.files.len(), 1);
    assert_eq!(manifest.files[0].bytes, ceiling);
    assert_eq!(
        store.contents(&manifest.files[0].path),
        Some(format!("{first}{second}"))
    );
}

#[test]
fn failed_flush_deletes_nothing() {
    let (mut store, paths) = MemoryStore::with_sources(&[
        ("a.jsonl", lines(3, "a")),
        ("b.jsonl", lines(3, "b")),
        ("c.jsonl", lines(3, "c")),
    ]);
    store.fail_on_write = Some(2);

    let result = merge_with_store(&store, &paths, &options(1));

    match result {
        Err(MergeError::WriteMerged { path, written, .. }) => {
            assert_eq!(written, 1);
            assert!(path.ends_with("merged_002.jsonl"));
        }
        other => panic!("expected write failure, got {other:?}"),
    }
    for path in &paths {
        assert!(store.contents(path).is_some(), "{} was deleted", path.display());
    }
}

#[test]
fn missing_source_aborts_before_writing() {
    let (store, mut paths) = MemoryStore::with_sources(&[("a.jsonl", lines(1, "a"))]);
    paths.push(PathBuf::from("in/gone.jsonl"));

    let result = merge_with_store(&store, &paths, &options(1024));

    assert!(matches!(result, Err(MergeError::ReadSource { .. })));
    assert_eq!(store.writes.get(), 0);
    assert!(store.contents(&paths[0]).is_some());
}

#[test]
fn refuses_to_overwrite_a_source() {
    let store = MemoryStore::default();
    let source = PathBuf::from("out/merged_001.jsonl");
    store
        .files
        .borrow_mut()
        .insert(source.clone(), lines(2, "m"));

    let result = merge_with_store(&store, &[source.clone()], &options(1024));

    assert!(matches!(result, Err(MergeError::TargetIsSource { .. })));
    assert_eq!(store.contents(&source), Some(lines(2, "m")));
}

#[test]
fn deletion_failures_are_reported_per_file() {
    let (mut store, paths) = MemoryStore::with_sources(&[
        ("a.jsonl", lines(1, "a")),
        ("b.jsonl", lines(1, "b")),
        ("c.jsonl", lines(1, "c")),
    ]);
    store.undeletable.insert(paths[1].clone());

    let manifest = merge_with_store(&store, &paths, &options(1024)).unwrap();

    assert_eq!(manifest.deleted_sources, 2);
    assert_eq!(manifest.deletion_failures.len(), 1);
    assert_eq!(manifest.deletion_failures[0].path, paths[1]);
    assert!(store.contents(&paths[0]).is_none());
    assert!(store.contents(&paths[2]).is_none());
    assert!(store.contents(&manifest.files[0].path).is_some());
}

#[test]
fn refuses_to_overwrite_a_source_spelled_differently() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    fs::create_dir_all(&out).unwrap();
    fs::create_dir_all(dir.path().join("sub")).unwrap();
    let sources = vec![out.join("a.jsonl"), out.join("merged_001.jsonl")];
    fs::write(&sources[0], lines(1, "a")).unwrap();
    fs::write(&sources[1], lines(2, "m")).unwrap();
    let options = MergeOptions::new(dir.path().join("sub").join("..").join("out"));

    let result = merge_json_lines(&sources, &options);

    assert!(matches!(result, Err(MergeError::TargetIsSource { .. })));
    assert_eq!(fs::read_to_string(&sources[0]).unwrap(), lines(1, "a"));
    assert_eq!(fs::read_to_string(&sources[1]).unwrap(), lines(2, "m"));
}

#[test]
fn merges_on_disk() {
    let dir = TempDir::new().unwrap();
    let mut sources = Vec::new();
    for (name, count) in [("a.jsonl", 2), ("b.jsonl", 3), ("c.jsonl", 1)] {
        let path = dir.path().join(name);
        fs::write(&path, lines(count, name)).unwrap();
        sources.push(path);
    }
    let out = dir.path().join("merged");
    let first_two = lines(2, "a.jsonl").len() + 1 + lines(3, "b.jsonl").len();
    let options = MergeOptions::new(&out)
        .with_base_name("orders")
        .with_max_bytes(first_two as u64);

    let manifest = merge_json_lines(&sources, &options).unwrap();

    assert_eq!(manifest.files.len(), 2);
    assert_eq!(manifest.total_records, 6);
    assert_eq!(manifest.deleted_sources, 3);
    assert!(sources.iter().all(|path| !path.exists()));
    let first = fs::read_to_string(out.join("orders_001.jsonl")).unwrap();
    assert_eq!(first.lines().count(), 5);
    let second = fs::read_to_string(out.join("orders_002.jsonl")).unwrap();
    assert_eq!(second, lines(1, "c.jsonl"));
}

fn source_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(
        prop::collection::vec("[a-z0-9]{1,24}".prop_map(|v| format!(r#"{{"v":"{v}"}}"#)), 0..6),
        0..12,
    )
}

proptest! {
    #[test]
    fn merge_conserves_records_and_respects_ceiling(
        sources in source_strategy(),
        max_bytes in 1u64..200,
    ) {
        let named: Vec<(String, String)> = sources
            .iter()
            .enumerate()
            .map(|(i, rows)| (format!("{i:02}.jsonl"), rows.join("\n")))
            .collect();
        let borrowed: Vec<(&str, String)> =
            named.iter().map(|(n, c)| (n.as_str(), c.clone())).collect();
        let (store, paths) = MemoryStore::with_sources(&borrowed);
        let expected_lines: Vec<&String> = sources.iter().flatten().collect();

        let manifest = merge_with_store(&store, &paths, &options(max_bytes)).unwrap();

        prop_assert_eq!(manifest.total_records, expected_lines.len());
        prop_assert_eq!(manifest.deleted_sources, paths.len());

        let mut merged_lines = Vec::new();
        for (index, file) in manifest.files.iter().enumerate() {
            let contents = store.contents(&file.path).unwrap();
            prop_assert_eq!(contents.len() as u64, file.bytes);
            prop_assert_eq!(contents.lines().count(), file.record_count);
            if file.bytes > max_bytes {
                prop_assert!(named.iter().any(|(_, c)| *c == contents));
            }
            if let Some(next) = manifest.files.get(index + 1) {
                prop_assert!(file.bytes + 1 + next.bytes > max_bytes);
            }
            merged_lines.extend(contents.lines().map(str::to_string));
        }
        let expected: Vec<String> = expected_lines.into_iter().cloned().collect();
        prop_assert_eq!(merged_lines, expected);

        let remaining = store.files.borrow();
        prop_assert!(paths.iter().all(|path| !remaining.contains_key(path)));
    }
}
