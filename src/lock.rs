use std::path::Path;

use crate::error::Result;

/// Boundary to the external per-path lock.
///
/// The only concurrency contract the compactor relies on: at most one
/// lock-holding operation per file path at a time, process-wide. The
/// returned guard releases on drop, so the lock is held for exactly the
/// "compact one file" critical section on every exit path — normal return,
/// conflict error, or panic unwind.
pub trait LockFactory {
    /// RAII guard; dropping it releases the lock.
    type Guard;

    /// Acquire the exclusive lock for `path`.
    fn lock(&self, path: &Path) -> Result<Self::Guard>;
}
