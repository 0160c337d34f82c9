use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::codec::Codec;
use crate::error::Result;
use crate::signature::Signature;
use crate::types::Block;

/// Append a count until the name is unused.
fn unique_filename(path: PathBuf) -> PathBuf {
    if !path.exists() {
        return path;
    }
    let mut count = 0;
    loop {
        count += 1;
        let candidate = PathBuf::from(format!("{}.{}", path.display(), count));
        if !candidate.exists() {
            return candidate;
        }
    }
}

/// Make sure the directories in the path exist.
fn create_parents(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Move `path` aside, tolerating a scratch directory on another filesystem.
fn move_aside(path: &Path, backup: &Path) -> Result<()> {
    if fs::rename(path, backup).is_err() {
        fs::copy(path, backup)?;
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Replace the file at `path` with the compacted block sequence.
///
/// The original is renamed into `scratch_dir` BEFORE any new bytes are
/// written, so a crash mid-write leaves the data recoverable at the backup
/// path and a gap (no file) at the original path — never a half-written
/// file. A write failure likewise leaves the backup in place; only a fully
/// successful write may remove it, and only under the delete policy.
pub fn replace_file<C: Codec>(
    codec: &C,
    path: &Path,
    blocks: &[Block],
    scratch_dir: &Path,
    delete_backup: bool,
) -> Result<()> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("no file name in path {}", path.display()),
        )
    })?;
    let backup = unique_filename(scratch_dir.join(name));
    debug!("Moving old file to {}", backup.display());
    create_parents(&backup)?;
    move_aside(path, &backup)?;

    info!(
        "Writing compacted ({} blocks) data to {}",
        blocks.len(),
        path.display()
    );
    for block in blocks {
        debug!("{}", Signature::new(block));
    }
    codec.encode(blocks, path)?;

    if delete_backup {
        debug!("Deleting copy at {}", backup.display());
        // ignore failure here; the file may still be held open elsewhere
        let _ = fs::remove_file(&backup);
    }
    Ok(())
}
