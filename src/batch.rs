//! Batch Module
//!
//! Instruments every matching file under a directory. Files are transformed
//! in parallel; aggregate counters are atomics read once after the join.
//! A file that fails to read, parse or write is recorded and skipped.

use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::{FileFilter, HostOptions};
use crate::error::{Result, TransformError};
use crate::transform::{TransformResult, Transformer};

const SKIPPED_DIRS: &[&str] = &["node_modules", ".git", "dist", "target"];

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub host: HostOptions,
    /// Write changed files back in place
    pub write: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "status", content = "detail")]
pub enum FileStatus {
    Changed,
    Unchanged,
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOutcome {
    pub path: PathBuf,
    pub status: FileStatus,
    pub elements_tagged: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub files_scanned: usize,
    pub files_changed: usize,
    pub elements_tagged: usize,
    pub files_failed: usize,
    pub files: Vec<FileOutcome>,
}

#[derive(Default)]
struct Counters {
    scanned: AtomicUsize,
    changed: AtomicUsize,
    tagged: AtomicUsize,
    failed: AtomicUsize,
}

pub fn instrument_directory(root: &Path, options: &BatchOptions) -> Result<BatchReport> {
    let filter = options.host.file_filter()?;
    let transformer = Transformer::new(options.host.transform.clone());
    let files = find_source_files(root, &filter);
    debug!("found {} candidate files under {}", files.len(), root.display());

    let counters = Counters::default();
    let mut outcomes: Vec<FileOutcome> = files
        .par_iter()
        .map(|path| instrument_file(path, &transformer, options.write, &counters))
        .collect();
    outcomes.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(BatchReport {
        files_scanned: counters.scanned.load(Ordering::Relaxed),
        files_changed: counters.changed.load(Ordering::Relaxed),
        elements_tagged: counters.tagged.load(Ordering::Relaxed),
        files_failed: counters.failed.load(Ordering::Relaxed),
        files: outcomes,
    })
}

/// Recursively find files the filter accepts, skipping dependency and
/// build output directories.
fn find_source_files(dir: &Path, filter: &FileFilter) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let walker = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| !is_skipped_dir(entry));
    for entry in walker.flatten() {
        let path = entry.path();
        if path.is_file() && filter.should_transform(&path.to_string_lossy()) {
            files.push(path.to_path_buf());
        }
    }

    files
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && SKIPPED_DIRS
            .iter()
            .any(|name| entry.file_name() == std::ffi::OsStr::new(name))
}

fn instrument_file(
    path: &Path,
    transformer: &Transformer,
    write: bool,
    counters: &Counters,
) -> FileOutcome {
    counters.scanned.fetch_add(1, Ordering::Relaxed);

    let (status, elements_tagged) = match process_file(path, transformer, write) {
        Ok(0) => (FileStatus::Unchanged, 0),
        Ok(tagged) => {
            counters.changed.fetch_add(1, Ordering::Relaxed);
            counters.tagged.fetch_add(tagged, Ordering::Relaxed);
            (FileStatus::Changed, tagged)
        }
        Err(e) => {
            warn!("{}", e);
            counters.failed.fetch_add(1, Ordering::Relaxed);
            (FileStatus::Failed(e.to_string()), 0)
        }
    };

    FileOutcome {
        path: path.to_path_buf(),
        status,
        elements_tagged,
    }
}

/// Number of elements tagged; 0 means the file was left alone.
fn process_file(path: &Path, transformer: &Transformer, write: bool) -> Result<usize> {
    let source = fs::read_to_string(path).map_err(|source| TransformError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let id = path.to_string_lossy();
    let output = match transformer.try_transform(&source, &id)? {
        TransformResult::Unchanged => return Ok(0),
        TransformResult::Transformed(output) => output,
    };

    if write {
        fs::write(path, &output.code).map_err(|source| TransformError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(output.elements_tagged)
}
