use std::path::PathBuf;

use crate::error::Result;

/// Boundary to the external archive indexer.
///
/// Invoked with each processed path inside the archive root, even when the
/// file was not changed — the file may be part of a larger multi-file
/// indexing pass driven by an external scanner.
pub trait Indexer {
    fn reindex(&self, paths: &[PathBuf]) -> Result<()>;
}
