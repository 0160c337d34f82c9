use std::path::Path;

use crate::error::Result;
use crate::types::Block;

/// Boundary to the storage byte format.
///
/// The compactor never interprets file bytes itself; it hands a path to the
/// codec and gets back the file's blocks in their on-disk order, then hands
/// a (possibly shorter) sequence back for re-encoding. Whether the codec
/// re-sorts blocks on write is its own business — the sortedness guarantee
/// of a compaction pass is an invariant of the in-memory sequence, not of
/// the wire layout.
pub trait Codec {
    /// Decode a file into its ordered block sequence.
    fn decode(&self, path: &Path) -> Result<Vec<Block>>;

    /// Encode a block sequence to the given path.
    fn encode(&self, blocks: &[Block], path: &Path) -> Result<()>;
}
