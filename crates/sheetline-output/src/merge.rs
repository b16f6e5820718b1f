//! Size-capped merging of JSON Lines files.
//!
//! Sources are packed greedily in the order given: a source joins the current
//! batch unless that would push the batch past the ceiling, in which case the
//! batch is written first. A source is never split, so one source larger than
//! the ceiling ends up alone in an oversized merged file.
//!
//! Source bytes are copied unchanged; a `\n` is inserted between two sources
//! only when the earlier one does not already end with a newline.
//!
//! Sources are deleted only after every merged file has been written. A failed
//! write aborts the pass and leaves every source in place.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, info_span, warn};

use crate::error::MergeError;
use crate::jsonl::JSONL_EXTENSION;

/// Default ceiling for one merged file: 99 MiB.
pub const DEFAULT_MAX_MERGED_BYTES: u64 = 99 * 1024 * 1024;

/// File-system access used by the merge engine.
pub trait MergeStore {
    fn read_source(&self, path: &Path) -> io::Result<String>;
    fn write_merged(&self, path: &Path, contents: &str) -> io::Result<()>;
    fn remove_source(&self, path: &Path) -> io::Result<()>;

    /// Resolved form of `path`, equal for two spellings of the same file.
    fn resolve(&self, path: &Path) -> PathBuf {
        path.to_path_buf()
    }
}

/// [`MergeStore`] over the real file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsMergeStore;

impl MergeStore for FsMergeStore {
    fn read_source(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write_merged(&self, path: &Path, contents: &str) -> io::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)
    }

    fn remove_source(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    /// Canonical path; for a file that does not exist yet, its canonical
    /// parent joined with the file name.
    fn resolve(&self, path: &Path) -> PathBuf {
        if let Ok(resolved) = fs::canonicalize(path) {
            return resolved;
        }
        if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            if let Ok(dir) = fs::canonicalize(parent) {
                return dir.join(name);
            }
        }
        std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
    }
}

/// Where and how merged files are written.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    pub output_dir: PathBuf,
    pub base_name: String,
    pub max_bytes: u64,
}

impl MergeOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            base_name: "merged".to_string(),
            max_bytes: DEFAULT_MAX_MERGED_BYTES,
        }
    }

    #[must_use]
    pub fn with_base_name(mut self, base_name: impl Into<String>) -> Self {
        self.base_name = base_name.into();
        self
    }

    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

/// One written merged file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedFile {
    pub path: PathBuf,
    pub bytes: u64,
    pub source_count: usize,
    pub record_count: usize,
}

/// A source that could not be removed after a successful merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Result of a merge pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeManifest {
    pub files: Vec<MergedFile>,
    pub total_records: usize,
    pub deleted_sources: usize,
    pub deletion_failures: Vec<DeletionFailure>,
}

/// `<base>_<NNN>.jsonl`, with a 1-based sequence number.
pub fn merged_file_name(base_name: &str, sequence: usize) -> String {
    format!("{base_name}_{sequence:03}.{JSONL_EXTENSION}")
}

/// Number of non-blank lines.
pub fn count_records(contents: &str) -> usize {
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .count()
}

#[derive(Debug, Default)]
struct Batch {
    contents: String,
    source_count: usize,
    record_count: usize,
}

impl Batch {
    fn is_empty(&self) -> bool {
        self.source_count == 0
    }

    fn bytes(&self) -> u64 {
        self.contents.len() as u64
    }

    /// Separator needed before the next source.
    fn separator(&self) -> &'static str {
        if self.contents.is_empty() || self.contents.ends_with('\n') {
            ""
        } else {
            "\n"
        }
    }

    /// Size of the batch if `chunk` were appended.
    fn bytes_with(&self, chunk: &str) -> u64 {
        (self.contents.len() + self.separator().len() + chunk.len()) as u64
    }

    fn push(&mut self, chunk: &str, record_count: usize) {
        if !chunk.is_empty() {
            let separator = self.separator();
            self.contents.push_str(separator);
            self.contents.push_str(chunk);
        }
        self.source_count += 1;
        self.record_count += record_count;
    }
}

/// Merge `sources` on the real file system.
pub fn merge_json_lines(
    sources: &[PathBuf],
    options: &MergeOptions,
) -> Result<MergeManifest, MergeError> {
    merge_with_store(&FsMergeStore, sources, options)
}

/// Merge `sources` through `store`.
pub fn merge_with_store<S: MergeStore>(
    store: &S,
    sources: &[PathBuf],
    options: &MergeOptions,
) -> Result<MergeManifest, MergeError> {
    let _span = info_span!(
        "merge",
        base_name = %options.base_name,
        sources = sources.len()
    )
    .entered();

    let mut manifest = MergeManifest::default();
    if sources.is_empty() {
        return Ok(manifest);
    }

    let resolved_sources: Vec<PathBuf> = sources.iter().map(|path| store.resolve(path)).collect();
    let mut batch = Batch::default();
    for path in sources {
        let contents = store
            .read_source(path)
            .map_err(|source| MergeError::ReadSource {
                path: path.clone(),
                source,
            })?;
        let len = contents.len() as u64;
        let records = count_records(&contents);

        if len > 0 && !batch.is_empty() && batch.bytes_with(&contents) > options.max_bytes {
            flush(store, options, &resolved_sources, &batch, &mut manifest)?;
            batch = Batch::default();
        }
        if len > options.max_bytes {
            warn!(
                path = %path.display(),
                bytes = len,
                max_bytes = options.max_bytes,
                "source exceeds merge ceiling, writing it alone"
            );
        }
        batch.push(&contents, records);
        manifest.total_records += records;
    }
    if !batch.is_empty() {
        flush(store, options, &resolved_sources, &batch, &mut manifest)?;
    }

    let written: BTreeSet<PathBuf> = manifest
        .files
        .iter()
        .map(|file| store.resolve(&file.path))
        .collect();
    for (path, resolved) in sources.iter().zip(&resolved_sources) {
        if written.contains(resolved) {
            warn!(path = %path.display(), "source is also a merged file, keeping it");
            manifest.deletion_failures.push(DeletionFailure {
                path: path.clone(),
                message: "source is also a merged file".to_string(),
            });
            continue;
        }
        match store.remove_source(path) {
            Ok(()) => manifest.deleted_sources += 1,
            Err(error) => {
                warn!(path = %path.display(), %error, "failed to delete merged source");
                manifest.deletion_failures.push(DeletionFailure {
                    path: path.clone(),
                    message: error.to_string(),
                });
            }
        }
    }

    info!(
        merged_files = manifest.files.len(),
        total_records = manifest.total_records,
        deleted_sources = manifest.deleted_sources,
        "merge complete"
    );
    Ok(manifest)
}

/// Write one batch. A batch made only of empty sources produces no file; its
/// sources are still consumed.
fn flush<S: MergeStore>(
    store: &S,
    options: &MergeOptions,
    resolved_sources: &[PathBuf],
    batch: &Batch,
    manifest: &mut MergeManifest,
) -> Result<(), MergeError> {
    if batch.contents.is_empty() {
        debug!(
            source_count = batch.source_count,
            "skipping batch with no content"
        );
        return Ok(());
    }

    let sequence = manifest.files.len() + 1;
    let path = options
        .output_dir
        .join(merged_file_name(&options.base_name, sequence));
    if resolved_sources.contains(&store.resolve(&path)) {
        return Err(MergeError::TargetIsSource { path });
    }
    store
        .write_merged(&path, &batch.contents)
        .map_err(|source| MergeError::WriteMerged {
            path: path.clone(),
            written: manifest.files.len(),
            source,
        })?;

    debug!(
        path = %path.display(),
        bytes = batch.bytes(),
        source_count = batch.source_count,
        record_count = batch.record_count,
        "flushed merged file"
    );
    manifest.files.push(MergedFile {
        path,
        bytes: batch.bytes(),
        source_count: batch.source_count,
        record_count: batch.record_count,
    });
    Ok(())
}
