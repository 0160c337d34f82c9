use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::signature::ChannelKey;
use crate::types::SampleType;

/// Unified error type for the archive compactor.
///
/// The conflict variants carry the channel key of the stream involved so a
/// failure can be traced back to one logical channel in one file. They form
/// a strict hierarchy of tunability: `SizeCorruption` is never suppressible,
/// `TypeConflict` degrades to a no-merge skip under `allow_mixed_types`, and
/// `MutationConflict` degrades to a warning under `allow_mutation`.
#[derive(Debug, Error)]
pub enum Error {
    /// A block's sample count disagrees with the count implied by its
    /// declared time span and rate, or its recorded times place its run
    /// outside the merged buffer. The archive itself is inconsistent.
    #[error("unexpected data size: {n_samples} values for {span}s at {rate}Hz ({key})")]
    SizeCorruption {
        key: ChannelKey,
        span: f64,
        rate: f64,
        n_samples: usize,
    },
    /// Two mergeable blocks hold different sample datatypes.
    #[error("mixed data types: {upper} and {lower} ({key})")]
    TypeConflict {
        key: ChannelKey,
        upper: SampleType,
        lower: SampleType,
    },
    /// An overlap region's previously stored samples differ from the
    /// later block's samples.
    #[error("modified data for {key} during merge")]
    MutationConflict { key: ChannelKey },
    /// Raised at the end of a list-mode run if any file contained
    /// duplicate data. Carries every affected path.
    #[error("duplicate data found in {} file(s)", paths.len())]
    DuplicatesFound { paths: Vec<PathBuf> },
    /// The per-path lock could not be acquired.
    #[error("lock error: {0}")]
    Lock(String),
    /// Opaque failure from the external block codec.
    #[error("codec error: {0}")]
    Codec(String),
    /// Opaque failure from the external indexer.
    #[error("index error: {0}")]
    Index(String),
    /// IO error from disk operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias used throughout the compactor.
pub type Result<T> = std::result::Result<T, Error>;
