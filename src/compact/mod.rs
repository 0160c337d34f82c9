//! The compaction pass: a bubble sort with merging.
//!
//! Merges change the sequence length, so an off-the-shelf sort does not
//! apply. Instead a cursor walks the sequence once, and after every swap or
//! merge it steps back one position (never below index 1) to re-examine the
//! new adjacency — a single exchange can reveal a new out-of-order or
//! mergeable pair with the now-different predecessor. Per-file block counts
//! are tens, not millions, so the O(n²) worst case is a deliberate
//! simplicity-over-asymptotics choice.

mod merge;

use tracing::debug;

use crate::config::CompactorConfig;
use crate::error::Result;
use crate::signature::Signature;
use crate::types::Block;
use merge::MergeOutcome;

/// Result of one compaction pass over a block sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Already sorted and merge-free; nothing was touched.
    Unchanged,
    /// At least one swap or merge occurred; the caller should persist.
    Mutated,
    /// List mode only: the file contains at least one mergeable pair. The
    /// scan short-circuits on the first hit and nothing is mutated.
    DuplicatesFound,
}

/// Sort a block sequence and merge overlapping same-channel blocks.
///
/// On success the sequence satisfies: every adjacent pair is in signature
/// order and not mergeable. Conflicts abort with the sequence in an
/// intermediate state — callers must not persist it after an error.
pub fn compact(blocks: &mut Vec<Block>, config: &CompactorConfig) -> Result<Outcome> {
    // "lower" = lower index = later in ingestion order, not earlier in time.
    let mut index = 1;
    let mut mutated = false;
    let mut swaps_to_log = 3;
    while index < blocks.len() {
        let lower = Signature::new(&blocks[index]);
        let upper = Signature::new(&blocks[index - 1]);
        if lower.mergeable(&upper) {
            if config.list_only {
                return Ok(Outcome::DuplicatesFound);
            }
            match merge::merge_at(blocks, index, config)? {
                MergeOutcome::Merged => {
                    // follow the merged block upwards unless at the top
                    index = (index - 1).max(1);
                    mutated = true;
                }
                // mixed types left in place: move on, nothing changed
                MergeOutcome::Skipped => index += 1,
            }
        } else if lower < upper {
            if swaps_to_log > 0 {
                debug!("Swapping blocks {} and {}", index - 1, index);
                swaps_to_log -= 1;
                if swaps_to_log == 0 {
                    debug!("Not logging further swaps");
                }
            }
            blocks.swap(index - 1, index);
            // follow the bubbling block upwards unless at the top
            index = (index - 1).max(1);
            mutated = true;
        } else {
            index += 1;
        }
    }
    Ok(if mutated {
        Outcome::Mutated
    } else {
        Outcome::Unchanged
    })
}
