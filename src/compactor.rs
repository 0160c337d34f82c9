use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::codec::Codec;
use crate::compact::{Outcome, compact};
use crate::config::CompactorConfig;
use crate::error::{Error, Result};
use crate::index::Indexer;
use crate::lock::LockFactory;
use crate::replace::replace_file;

/// What processing one path did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// Already canonical; nothing written.
    Unchanged,
    /// The sequence was sorted/merged and written back.
    Compacted,
    /// List mode: the file contains duplicates and was recorded for the
    /// run-level report. Nothing written.
    DuplicatesListed,
}

/// Aggregate result of a whole run.
///
/// Per-file failures land here instead of aborting the run — one corrupt
/// file must not stop the rest of the archive from being compacted.
#[derive(Debug, Default)]
pub struct RunReport {
    pub compacted: usize,
    pub unchanged: usize,
    pub failures: Vec<(PathBuf, Error)>,
}

/// Per-path entry point tying the pieces together: external lock around
/// decode + compact + replace, then external re-indexing, with duplicate
/// reporting aggregated across the run.
///
/// Which files to process is the caller's problem (an external scanner);
/// the compactor only consumes a path sequence.
pub struct Compactor<C, L, I> {
    codec: C,
    locks: L,
    indexer: I,
    config: CompactorConfig,
    /// Paths that reported duplicates in list mode, across the current run.
    duplicates: Vec<PathBuf>,
}

impl<C: Codec, L: LockFactory, I: Indexer> Compactor<C, L, I> {
    /// Build a compactor, creating and canonicalizing the archive and
    /// scratch directories so the archive-membership test is repeatable.
    pub fn new(codec: C, locks: L, indexer: I, mut config: CompactorConfig) -> Result<Self> {
        config.archive_dir = canonify_dir_and_make(&config.archive_dir)?;
        config.scratch_dir = canonify_dir_and_make(&config.scratch_dir)?;
        Ok(Compactor {
            codec,
            locks,
            indexer,
            config,
            duplicates: Vec::new(),
        })
    }

    pub fn config(&self) -> &CompactorConfig {
        &self.config
    }

    /// Process every path in order.
    ///
    /// Per-file failures are logged, collected into the report and never
    /// abort the run. If any file reported duplicates in list mode, the
    /// run fails at the very end with the full list of affected paths, so
    /// the operator sees all of them before the failure is surfaced. In
    /// that case the report itself is forfeited; its tallies are emitted
    /// to the log just before the error is returned.
    pub fn run(&mut self, paths: impl IntoIterator<Item = PathBuf>) -> Result<RunReport> {
        self.duplicates.clear();
        let mut report = RunReport::default();
        for path in paths {
            match self.process(&path) {
                Ok(FileOutcome::Compacted) => report.compacted += 1,
                Ok(FileOutcome::Unchanged) => report.unchanged += 1,
                Ok(FileOutcome::DuplicatesListed) => {}
                Err(e) => {
                    error!("{}: {}", path.display(), e);
                    report.failures.push((path, e));
                }
            }
        }
        if !self.duplicates.is_empty() {
            info!(
                "Run finished: {} compacted, {} unchanged, {} failed, duplicates in {} file(s)",
                report.compacted,
                report.unchanged,
                report.failures.len(),
                self.duplicates.len()
            );
            return Err(Error::DuplicatesFound {
                paths: std::mem::take(&mut self.duplicates),
            });
        }
        Ok(report)
    }

    /// Compact a single file, then index it.
    ///
    /// The lock guard spans exactly the decode-compact-replace critical
    /// section and is released on every exit path, including conflicts.
    pub fn process(&mut self, path: &Path) -> Result<FileOutcome> {
        let outcome = {
            let _guard = self.locks.lock(path)?;
            debug!("Compacting {}", path.display());
            self.compact_file(path)?
        };
        if self.config.reindex_after_compact {
            let canonical = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
            if canonical.starts_with(&self.config.archive_dir) {
                // even when unchanged: the file may be part of a larger
                // multi-file indexing pass driven by an external scanner
                self.indexer.reindex(&[path.to_path_buf()])?;
            } else {
                warn!(
                    "Skipping index for file outside archive: {}",
                    path.display()
                );
            }
        }
        Ok(outcome)
    }

    fn compact_file(&mut self, path: &Path) -> Result<FileOutcome> {
        let mut blocks = self.codec.decode(path)?;
        match compact(&mut blocks, &self.config)? {
            Outcome::DuplicatesFound => {
                if self.duplicates.is_empty() {
                    warn!("Found duplicate data; will raise an error when the run completes");
                }
                info!("Duplicates in {}", path.display());
                self.duplicates.push(path.to_path_buf());
                Ok(FileOutcome::DuplicatesListed)
            }
            Outcome::Mutated => {
                replace_file(
                    &self.codec,
                    path,
                    &blocks,
                    &self.config.scratch_dir,
                    self.config.delete_backups_after_success,
                )?;
                Ok(FileOutcome::Compacted)
            }
            Outcome::Unchanged => {
                debug!("File unchanged");
                Ok(FileOutcome::Unchanged)
            }
        }
    }
}

/// Create the directory if missing and expand the path so comparisons
/// against it are repeatable.
fn canonify_dir_and_make(path: &Path) -> Result<PathBuf> {
    fs::create_dir_all(path)?;
    Ok(fs::canonicalize(path)?)
}
