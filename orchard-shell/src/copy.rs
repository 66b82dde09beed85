//! [`FileSync`] that copies include-listed paths from the root worktree.
//!
//! Entries are relative to the root worktree. Missing entries are skipped;
//! directories are copied recursively. Existing destination files are
//! overwritten.

use std::fs;
use std::path::Path;

use orchard_core::external::FileSync;
use orchard_core::ExternalError;
use walkdir::WalkDir;

const TOOL: &str = "copy";

#[derive(Debug, Clone, Default)]
pub struct CopyFiles;

impl CopyFiles {
    pub fn new() -> Self {
        Self
    }
}

fn copy_err(path: &Path, err: impl std::fmt::Display) -> ExternalError {
    ExternalError::new(TOOL, "sync", format!("{}: {err}", path.display()))
}

fn copy_file(src: &Path, dst: &Path) -> Result<(), ExternalError> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| copy_err(parent, e))?;
    }
    fs::copy(src, dst).map_err(|e| copy_err(src, e))?;
    Ok(())
}

impl FileSync for CopyFiles {
    fn sync(&self, from: &Path, to: &Path, include: &[String]) -> Result<usize, ExternalError> {
        let mut copied = 0;
        for entry in include {
            let src = from.join(entry);
            let dst = to.join(entry);
            if !src.exists() {
                tracing::debug!(entry = %entry, "copy entry missing in root worktree; skipping");
                continue;
            }
            if src.is_file() {
                copy_file(&src, &dst)?;
                copied += 1;
                continue;
            }
            for item in WalkDir::new(&src).follow_links(false) {
                let item = item.map_err(|e| copy_err(&src, e))?;
                if !item.file_type().is_file() {
                    continue;
                }
                let relative = item
                    .path()
                    .strip_prefix(&src)
                    .map_err(|e| copy_err(item.path(), e))?;
                copy_file(item.path(), &dst.join(relative))?;
                copied += 1;
            }
        }
        Ok(copied)
    }
}
