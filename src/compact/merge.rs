use tracing::{debug, info, warn};

use crate::config::CompactorConfig;
use crate::error::{Error, Result};
use crate::signature::Signature;
use crate::types::{Block, Samples};

/// What a merge attempt did to the pair at `(index-1, index)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MergeOutcome {
    /// The pair was combined into one block at `index-1`; the block at
    /// `index` was removed from the sequence.
    Merged,
    /// Mixed sample types under `allow_mixed_types`: neither block was
    /// touched. The caller must advance past the pair.
    Skipped,
}

/// Expected sample count for a time span at a rate.
///
/// `span` is last-sample time minus first-sample time, so the count is
/// `span * rate + 1`; the extra 0.5 rounds to nearest, tolerating float
/// accumulation in the recorded times.
fn data_size(span: f64, sample_rate: f64) -> usize {
    (1.5 + span * sample_rate) as usize
}

/// Nearest-integer sample offset of `start_time` from the union start.
fn offset(zero: f64, start_time: f64, sample_rate: f64) -> usize {
    (0.5 + (start_time - zero) * sample_rate) as usize
}

/// Offset and length of a block's samples within a buffer starting at `zero`.
fn locate(zero: f64, sig: &Signature) -> (usize, usize) {
    (
        offset(zero, sig.start_time, sig.key.sample_rate),
        data_size(sig.span(), sig.key.sample_rate),
    )
}

/// Fail with `SizeCorruption` unless the block's sample count matches the
/// count implied by its span and rate. Never suppressible by any flag.
fn assert_size(sig: &Signature) -> Result<()> {
    if data_size(sig.span(), sig.key.sample_rate) != sig.n_samples {
        return Err(Error::SizeCorruption {
            key: sig.key.clone(),
            span: sig.span(),
            rate: sig.key.sample_rate,
            n_samples: sig.n_samples,
        });
    }
    Ok(())
}

/// Copy both inputs into a union buffer, later-ingested (`lower`) last so
/// its samples win in the overlap. Returns the buffer and whether `upper`'s
/// span survived unchanged.
fn splice<T: Copy + Default + PartialEq>(
    upper: &[T],
    lower: &[T],
    upper_off: usize,
    lower_off: usize,
    n_samples: usize,
) -> (Vec<T>, bool) {
    // A mergeable pair covers the whole union interval, so the zero fill
    // never survives into the result.
    let mut merged = vec![T::default(); n_samples];
    merged[upper_off..upper_off + upper.len()].copy_from_slice(upper);
    merged[lower_off..lower_off + lower.len()].copy_from_slice(lower);
    let upper_intact = merged[upper_off..upper_off + upper.len()] == *upper;
    (merged, upper_intact)
}

/// Merge the adjacent mergeable pair at `(index-1, index)`.
///
/// `upper` is the earlier-ingested block at `index-1`, `lower` the
/// later-ingested block at `index`; where their samples overlap, `lower`
/// wins. If that would change samples `upper` already stored, the merge is
/// a data conflict, fatal unless `allow_mutation` is set.
///
/// On `Merged`, the combined block sits at `index-1` and the sequence is
/// one element shorter.
pub(crate) fn merge_at(
    blocks: &mut Vec<Block>,
    index: usize,
    config: &CompactorConfig,
) -> Result<MergeOutcome> {
    let lower = Signature::new(&blocks[index]);
    let upper = Signature::new(&blocks[index - 1]);
    info!("Merging blocks {} and {} ({})", index - 1, index, lower.key);
    debug!(
        "{:.6} - {:.6} / {:.6} - {:.6}",
        upper.start_time, upper.end_time, lower.start_time, lower.end_time
    );

    // Try to avoid harming data: type check first, then verify each input
    // is internally consistent before computing any offsets from it.
    if lower.sample_type != upper.sample_type {
        if config.allow_mixed_types {
            warn!(
                "Mixed data types: {} and {} ({})",
                upper.sample_type, lower.sample_type, lower.key
            );
            return Ok(MergeOutcome::Skipped);
        }
        return Err(Error::TypeConflict {
            key: lower.key,
            upper: upper.sample_type,
            lower: lower.sample_type,
        });
    }
    assert_size(&upper)?;
    assert_size(&lower)?;

    let start_time = lower.start_time.min(upper.start_time);
    let end_time = lower.end_time.max(upper.end_time);
    let n_samples = data_size(end_time - start_time, lower.key.sample_rate);
    let (upper_off, upper_len) = locate(start_time, &upper);
    let (lower_off, lower_len) = locate(start_time, &lower);

    // Each block passed its own size check, but recorded times that sit off
    // the union's sample grid can still place a run past the end of the
    // merged buffer. That is archive corruption, not a reason to panic.
    for (sig, off, len) in [(&upper, upper_off, upper_len), (&lower, lower_off, lower_len)] {
        if off + len > n_samples {
            return Err(Error::SizeCorruption {
                key: sig.key.clone(),
                span: sig.span(),
                rate: sig.key.sample_rate,
                n_samples: sig.n_samples,
            });
        }
    }

    let (samples, upper_intact) = match (&blocks[index - 1].samples, &blocks[index].samples) {
        (Samples::Int32(u), Samples::Int32(l)) => {
            let (m, intact) = splice(u, l, upper_off, lower_off, n_samples);
            (Samples::Int32(m), intact)
        }
        (Samples::Float32(u), Samples::Float32(l)) => {
            let (m, intact) = splice(u, l, upper_off, lower_off, n_samples);
            (Samples::Float32(m), intact)
        }
        (Samples::Float64(u), Samples::Float64(l)) => {
            let (m, intact) = splice(u, l, upper_off, lower_off, n_samples);
            (Samples::Float64(m), intact)
        }
        // Unreachable after the type check above, but keep the error exact.
        _ => {
            return Err(Error::TypeConflict {
                key: lower.key,
                upper: upper.sample_type,
                lower: lower.sample_type,
            });
        }
    };

    if !upper_intact {
        if config.allow_mutation {
            warn!("Modified data for {} during merge", lower.key);
        } else {
            return Err(Error::MutationConflict { key: lower.key });
        }
    }

    let merged = &mut blocks[index - 1];
    merged.start_time = start_time;
    // recorded end time must agree with the union buffer, not the inputs
    merged.end_time = Block::end_for(start_time, lower.key.sample_rate, n_samples);
    merged.samples = samples;
    blocks.remove(index);
    Ok(MergeOutcome::Merged)
}
