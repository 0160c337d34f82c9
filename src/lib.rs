//! # Waveform archive compactor
//!
//! Canonicalizes files in a local archive of fixed-rate sensor waveform
//! data. Each file holds an ordered sequence of blocks — contiguous runs of
//! samples at one rate for one logical channel — and independent ingestion
//! can leave those blocks out of time order, exactly duplicated, or
//! overlapping with conflicting values.
//!
//! ## Core idea
//! A bubble-sort-with-merge pass puts each file's blocks into signature
//! order and merges time-overlapping blocks of the same channel, under a
//! safety contract: previously stored samples are never silently altered.
//! Genuine conflicts (size corruption, mixed types, mutated overlaps) are
//! reported as typed errors, with operator-selectable leniency for the
//! latter two.
//!
//! File discovery, the on-disk block format, per-path locking and archive
//! indexing are external collaborators behind the [`Codec`],
//! [`LockFactory`] and [`Indexer`] traits.

pub mod codec;
pub mod compact;
pub mod compactor;
pub mod config;
pub mod error;
pub mod index;
pub mod lock;
pub mod replace;
pub mod signature;
pub mod types;

// Public re-exports for the top-level API
pub use codec::Codec;
pub use compact::{Outcome, compact};
pub use compactor::{Compactor, FileOutcome, RunReport};
pub use config::CompactorConfig;
pub use error::{Error, Result};
pub use index::Indexer;
pub use lock::LockFactory;
pub use signature::{ChannelKey, Signature};
pub use types::{Block, SampleType, Samples};
