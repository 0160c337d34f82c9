use std::path::PathBuf;

/// Operator-selectable behavior for a compaction run.
///
/// The three leniency flags map onto the conflict taxonomy in
/// [`crate::error::Error`]: `list_only` reports duplicates without touching
/// any file, `allow_mutation` accepts overlap conflicts (later data wins),
/// and `allow_mixed_types` tolerates type-mismatched overlaps without
/// de-duplicating them. Size corruption is never tunable.
#[derive(Debug, Clone)]
pub struct CompactorConfig {
    /// Report files containing duplicate data without mutating anything.
    pub list_only: bool,
    /// Accept overlapping samples that disagree; the later block wins.
    pub allow_mutation: bool,
    /// Tolerate overlapping blocks of different sample types (they are
    /// left un-merged, not combined).
    pub allow_mixed_types: bool,
    /// Hand each processed path to the external indexer afterwards.
    pub reindex_after_compact: bool,
    /// Remove the backup copy once the compacted file is safely written.
    pub delete_backups_after_success: bool,
    /// Root of the managed archive; only paths inside it are re-indexed.
    pub archive_dir: PathBuf,
    /// Scratch directory holding backup copies during file replacement.
    pub scratch_dir: PathBuf,
}

impl Default for CompactorConfig {
    fn default() -> Self {
        CompactorConfig {
            list_only: false,
            allow_mutation: false,
            allow_mixed_types: false,
            reindex_after_compact: true,
            delete_backups_after_success: false,
            archive_dir: PathBuf::from("data"),
            scratch_dir: PathBuf::from("tmp"),
        }
    }
}
