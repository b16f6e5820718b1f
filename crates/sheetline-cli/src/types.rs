use std::path::PathBuf;

use sheetline_cli::pipeline::FolderRun;

/// What a command did, for the summary printout.
#[derive(Debug)]
pub struct RunReport {
    /// File or folder the command was pointed at.
    pub input: PathBuf,
    pub output: PathBuf,
    pub kind: RunKind,
    pub run: FolderRun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    SingleFile,
    Folder,
    Merge,
}

impl RunReport {
    pub fn has_errors(&self) -> bool {
        self.run.has_errors()
    }
}
