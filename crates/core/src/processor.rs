use crate::extensions::ExtensionSet;
use crate::matcher::NameMatcher;
use crate::metadata::{capture_time_field, MetadataMap, MetadataProvider};
use crate::resolver::resolve_target;
use crate::timestamp::CaptureTimestamp;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// How often a file is re-resolved when its target is taken between the
/// existence check and the rename.
const MAX_CLAIM_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenameOutcome {
    Renamed,
    WouldRename,
    SkippedAlreadyNamed,
    SkippedNoMetadata,
    SkippedUnparseableDate,
    SkippedNotAFile,
    /// Extension is not in the configured set.
    Ignored,
    RenameFailed,
}

impl RenameOutcome {
    pub fn is_processed(self) -> bool {
        matches!(self, Self::Renamed | Self::WouldRename)
    }
}

/// Decision taken for one candidate file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamePlan {
    pub source: PathBuf,
    pub target: Option<PathBuf>,
    pub outcome: RenameOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl RenamePlan {
    fn skipped(source: &Path, outcome: RenameOutcome, detail: Option<String>) -> Self {
        Self {
            source: source.to_path_buf(),
            target: None,
            outcome,
            detail,
        }
    }

    pub fn source_name(&self) -> String {
        display_name(&self.source)
    }

    pub fn target_name(&self) -> Option<String> {
        self.target.as_deref().map(display_name)
    }
}

#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub prefix: String,
    pub extensions: ExtensionSet,
    pub dry_run: bool,
}

/// Runs the per-file decision sequence and, unless dry-running, performs the rename.
pub struct FileProcessor<P> {
    provider: P,
    matcher: NameMatcher,
    options: ProcessOptions,
    // Names handed out during a dry run, so later files see them as taken.
    reserved: HashSet<PathBuf>,
}

impl<P: MetadataProvider> FileProcessor<P> {
    pub fn new(provider: P, options: ProcessOptions) -> Result<Self> {
        let matcher = NameMatcher::new(&options.prefix)?;
        Ok(Self {
            provider,
            matcher,
            options,
            reserved: HashSet::new(),
        })
    }

    pub fn options(&self) -> &ProcessOptions {
        &self.options
    }

    pub fn process(&mut self, path: &Path) -> RenamePlan {
        let is_file = fs::metadata(path).map(|m| m.is_file()).unwrap_or(false);
        if !is_file {
            debug!(path = %path.display(), "not a regular file");
            return RenamePlan::skipped(path, RenameOutcome::SkippedNotAFile, None);
        }

        let file_name = display_name(path);
        if !self.options.extensions.matches(&file_name) {
            return RenamePlan::skipped(path, RenameOutcome::Ignored, None);
        }

        if self.matcher.matches(&file_name) {
            debug!(file = %file_name, "already follows the naming scheme");
            return RenamePlan::skipped(path, RenameOutcome::SkippedAlreadyNamed, None);
        }

        let fields = match self.provider.read(path) {
            Ok(Some(fields)) => fields,
            Ok(None) => {
                debug!(file = %file_name, "no metadata block");
                return RenamePlan::skipped(path, RenameOutcome::SkippedNoMetadata, None);
            }
            Err(err) => {
                let detail = format!("{err:#}");
                warn!(file = %file_name, error = %detail, "metadata read failed");
                return RenamePlan::skipped(path, RenameOutcome::SkippedNoMetadata, Some(detail));
            }
        };

        let Some((field, raw)) = capture_time_field(&fields) else {
            debug!(file = %file_name, fields = %dump_fields(&fields), "no capture time field");
            return RenamePlan::skipped(path, RenameOutcome::SkippedNoMetadata, None);
        };

        let timestamp = match CaptureTimestamp::parse_exif(raw) {
            Ok(timestamp) => timestamp,
            Err(err) => {
                debug!(file = %file_name, field, raw, "capture time not parseable");
                return RenamePlan::skipped(
                    path,
                    RenameOutcome::SkippedUnparseableDate,
                    Some(err.to_string()),
                );
            }
        };

        let stamp = timestamp.filename_stamp();
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let directory = path.parent().unwrap_or_else(|| Path::new(""));

        if self.options.dry_run {
            let reserved = &self.reserved;
            let target = resolve_target(directory, &self.options.prefix, &stamp, &extension, |p| {
                p != path && (entry_exists(p) || reserved.contains(p))
            });
            if target == path {
                return RenamePlan::skipped(path, RenameOutcome::SkippedAlreadyNamed, None);
            }
            self.reserved.insert(target.clone());
            return RenamePlan {
                source: path.to_path_buf(),
                target: Some(target),
                outcome: RenameOutcome::WouldRename,
                detail: None,
            };
        }

        self.claim_and_rename(path, directory, &stamp, &extension)
    }

    fn claim_and_rename(
        &self,
        source: &Path,
        directory: &Path,
        stamp: &str,
        extension: &str,
    ) -> RenamePlan {
        // The source itself counts as free: a file already holding its
        // own candidate name (e.g. a `_100` counter) stays where it is.
        let resolve = || {
            resolve_target(directory, &self.options.prefix, stamp, extension, |p| {
                p != source && entry_exists(p)
            })
        };
        claim_target(source, resolve, rename_exclusive)
    }
}

/// Resolves a target and claims it with `claim`, resolving afresh whenever
/// the claim reports `AlreadyExists`, at most [`MAX_CLAIM_ATTEMPTS`] times.
fn claim_target<R, C>(source: &Path, mut resolve: R, mut claim: C) -> RenamePlan
where
    R: FnMut() -> PathBuf,
    C: FnMut(&Path, &Path) -> io::Result<()>,
{
    let mut last_target = None;
    for attempt in 1..=MAX_CLAIM_ATTEMPTS {
        let target = resolve();
        if target == source {
            return RenamePlan::skipped(source, RenameOutcome::SkippedAlreadyNamed, None);
        }
        match claim(source, &target) {
            Ok(()) => {
                debug!(from = %source.display(), to = %target.display(), "renamed");
                return RenamePlan {
                    source: source.to_path_buf(),
                    target: Some(target),
                    outcome: RenameOutcome::Renamed,
                    detail: None,
                };
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                debug!(to = %target.display(), attempt, "target claimed concurrently");
                last_target = Some(target);
            }
            Err(err) => {
                warn!(
                    from = %source.display(),
                    to = %target.display(),
                    error = %err,
                    "rename failed"
                );
                return RenamePlan {
                    source: source.to_path_buf(),
                    target: Some(target),
                    outcome: RenameOutcome::RenameFailed,
                    detail: Some(err.to_string()),
                };
            }
        }
    }

    warn!(from = %source.display(), "target name kept being taken, giving up");
    RenamePlan {
        source: source.to_path_buf(),
        target: last_target,
        outcome: RenameOutcome::RenameFailed,
        detail: Some(format!(
            "target name was taken by another process {MAX_CLAIM_ATTEMPTS} times"
        )),
    }
}

/// True if anything, including a dangling symlink, occupies `path`.
fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Moves `from` to `to`, failing with `AlreadyExists` instead of replacing an
/// existing entry.
///
/// A hard link is created first since that refuses to overwrite atomically.
/// Filesystems without hard links fall back to a fresh existence check and a
/// plain rename, which leaves a small window.
///
/// If the process dies between the link and the removal, both names remain.
/// The next run leaves the new name alone but renames the old one again, to a
/// counter, so the file ends up duplicated. That window is accepted.
fn rename_exclusive(from: &Path, to: &Path) -> io::Result<()> {
    match fs::hard_link(from, to) {
        Ok(()) => {
            if let Err(err) = fs::remove_file(from) {
                if let Err(cleanup) = fs::remove_file(to) {
                    warn!(path = %to.display(), error = %cleanup, "could not remove extra link");
                }
                return Err(err);
            }
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Err(err),
        Err(err) => {
            debug!(error = %err, "hard link unavailable, using plain rename");
            if entry_exists(to) {
                return Err(io::Error::from(io::ErrorKind::AlreadyExists));
            }
            fs::rename(from, to)
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn dump_fields(fields: &MetadataMap) -> String {
    serde_json::to_string(fields).unwrap_or_else(|_| format!("{fields:?}"))
}
