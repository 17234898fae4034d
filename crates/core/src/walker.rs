use crate::metadata::MetadataProvider;
use crate::processor::{FileProcessor, RenameOutcome, RenamePlan};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalkError {
    #[error("Directory '{}' does not exist.", .0.display())]
    Missing(PathBuf),
    #[error("'{}' is not a directory.", .0.display())]
    NotADirectory(PathBuf),
}

/// Tallies for one run. `skipped` includes `failed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub directories: usize,
}

impl RunSummary {
    pub fn record(&mut self, plan: &RenamePlan) {
        if plan.outcome.is_processed() {
            self.processed += 1;
        } else {
            self.skipped += 1;
        }
        if plan.outcome == RenameOutcome::RenameFailed {
            self.failed += 1;
        }
    }
}

/// Receives progress while a directory is walked.
pub trait WalkObserver {
    fn directory_entered(&mut self, _dir: &Path) {}
    fn file_processed(&mut self, _plan: &RenamePlan) {}
}

impl WalkObserver for () {}

pub fn validate_directory(root: &Path) -> Result<(), WalkError> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(WalkError::NotADirectory(root.to_path_buf())),
        Err(_) => Err(WalkError::Missing(root.to_path_buf())),
    }
}

/// Feeds every entry of `root` (and of its subdirectories when `recursive`)
/// to `processor`. Only a missing or unreadable root is an error; anything
/// that goes wrong for a single entry is logged and counted.
pub fn walk_directory<P, O>(
    root: &Path,
    recursive: bool,
    processor: &mut FileProcessor<P>,
    observer: &mut O,
) -> Result<RunSummary>
where
    P: MetadataProvider,
    O: WalkObserver + ?Sized,
{
    validate_directory(root)?;
    let mut summary = RunSummary::default();

    if recursive {
        walk_recursive(root, processor, observer, &mut summary);
    } else {
        summary.directories += 1;
        for path in list_flat(root)? {
            let plan = processor.process(&path);
            summary.record(&plan);
            observer.file_processed(&plan);
        }
    }

    Ok(summary)
}

fn list_flat(root: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(root)
        .with_context(|| format!("could not read directory: {}", root.display()))?
    {
        match entry {
            Ok(entry) => out.push(entry.path()),
            Err(err) => warn!(dir = %root.display(), error = %err, "skipping unreadable entry"),
        }
    }
    // Names are collected up front so renamed files are never listed again.
    out.sort();
    Ok(out)
}

fn walk_recursive<P, O>(
    root: &Path,
    processor: &mut FileProcessor<P>,
    observer: &mut O,
    summary: &mut RunSummary,
) where
    P: MetadataProvider,
    O: WalkObserver + ?Sized,
{
    // Sorting makes walkdir read each directory completely before yielding
    // from it, so files renamed along the way are not revisited.
    let walker = WalkDir::new(root).sort_by(files_before_directories);
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "skipping unreadable path");
                continue;
            }
        };

        if entry.file_type().is_dir() {
            summary.directories += 1;
            observer.directory_entered(entry.path());
            continue;
        }

        let plan = processor.process(entry.path());
        summary.record(&plan);
        observer.file_processed(&plan);
    }
}

fn files_before_directories(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}
