//! Moving processed inputs into a completed folder.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info};

use crate::error::RelocateError;

/// Moves a processed source file out of the way.
pub trait Relocator {
    /// Move `path` and return where it ended up.
    fn relocate(&self, path: &Path) -> Result<PathBuf, RelocateError>;
}

/// Moves files into a fixed folder, never overwriting a file already there.
///
/// A name clash appends a local timestamp to the moved file's stem
/// (`orders.xlsx` becomes `orders_20250801_235100.xlsx`).
#[derive(Debug, Clone)]
pub struct CompletedDirRelocator {
    dir: PathBuf,
}

impl CompletedDirRelocator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Relocator for CompletedDirRelocator {
    fn relocate(&self, path: &Path) -> Result<PathBuf, RelocateError> {
        let Some(file_name) = path.file_name() else {
            return Err(RelocateError::InvalidSource {
                path: path.to_path_buf(),
            });
        };
        fs::create_dir_all(&self.dir).map_err(|source| RelocateError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let file_name = Path::new(file_name);
        let mut target = self.dir.join(file_name);
        let stamp = Local::now().naive_local();
        let mut attempt = 0usize;
        loop {
            match move_no_clobber(path, &target) {
                Ok(()) => break,
                Err(error) if error.kind() == io::ErrorKind::AlreadyExists => {
                    debug!(taken = %target.display(), "destination exists, trying another name");
                    target = self
                        .dir
                        .join(timestamped_file_name(file_name, stamp, attempt));
                    attempt += 1;
                }
                Err(source) => {
                    return Err(RelocateError::Move {
                        from: path.to_path_buf(),
                        to: target,
                        source,
                    });
                }
            }
        }
        info!(from = %path.display(), to = %target.display(), "moved completed file");
        Ok(target)
    }
}

/// `name_YYYYMMDD_HHMMSS.ext`, with `_N` appended for `attempt > 0`.
pub fn timestamped_file_name(file_name: &Path, stamp: NaiveDateTime, attempt: usize) -> String {
    let stem = file_name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{stem}_{}", stamp.format("%Y%m%d_%H%M%S"));
    if attempt > 0 {
        name.push_str(&format!("_{attempt}"));
    }
    if let Some(ext) = file_name.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    name
}

/// Move `from` to `to`, failing with `AlreadyExists` instead of replacing `to`.
///
/// A hard link claims the name atomically. Where links are unavailable
/// (another device, unsupported filesystem) the bytes are copied into a
/// file created with `create_new`.
fn move_no_clobber(from: &Path, to: &Path) -> io::Result<()> {
    match fs::hard_link(from, to) {
        Ok(()) => fs::remove_file(from),
        Err(error) if error.kind() == io::ErrorKind::AlreadyExists => Err(error),
        Err(error) => {
            debug!(from = %from.display(), %error, "hard link failed, copying instead");
            let mut source = fs::File::open(from)?;
            let mut target = OpenOptions::new().write(true).create_new(true).open(to)?;
            io::copy(&mut source, &mut target)?;
            target.sync_all()?;
            fs::remove_file(from)
        }
    }
}
