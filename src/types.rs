use std::fmt;

/// Datatype tag of a block's sample buffer.
///
/// Two blocks can only be merged when their tags agree; a union buffer is
/// always allocated with the surviving tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SampleType {
    Int32,
    Float32,
    Float64,
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleType::Int32 => write!(f, "i32"),
            SampleType::Float32 => write!(f, "f32"),
            SampleType::Float64 => write!(f, "f64"),
        }
    }
}

/// A typed sample buffer.
///
/// Equality between regions of two buffers is exact value equality — the
/// mutation check during a merge must not tolerate "close enough" floats,
/// since any difference means previously stored data would be silently
/// rewritten.
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    Int32(Vec<i32>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

impl Samples {
    /// Number of samples in the buffer.
    pub fn len(&self) -> usize {
        match self {
            Samples::Int32(v) => v.len(),
            Samples::Float32(v) => v.len(),
            Samples::Float64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Datatype tag of this buffer.
    pub fn sample_type(&self) -> SampleType {
        match self {
            Samples::Int32(_) => SampleType::Int32,
            Samples::Float32(_) => SampleType::Float32,
            Samples::Float64(_) => SampleType::Float64,
        }
    }
}

/// One contiguous run of uniformly-sampled data for a single channel.
///
/// Start and end times come from the decoded file's metadata; the end time
/// is the timestamp of the LAST sample, so two runs that abut without
/// sharing a sample time (e.g. [0..9] and [10..14] at 1Hz) do not touch
/// under the closed-interval overlap test. The recorded times and the
/// buffer length can disagree — that is exactly the corruption the merge
/// operation's size check exists to catch.
///
/// A block is exclusively owned by the in-memory sequence being compacted;
/// the compaction pass mutates the sequence (swap, merge-in-place, removal)
/// and hands it back to the codec for re-encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub network: String,
    pub station: String,
    pub location: String,
    pub channel: String,
    /// Data quality flag (e.g. 'D', 'Q', 'M', 'R').
    pub quality: char,
    /// Sampling frequency in Hz.
    pub sample_rate: f64,
    /// Epoch seconds of the first sample.
    pub start_time: f64,
    /// Epoch seconds of the last sample.
    pub end_time: f64,
    pub samples: Samples,
}

impl Block {
    /// Recorded time span, in seconds (last sample minus first sample).
    pub fn span(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// The end time a run of `n` samples implies: `start + (n-1)/rate`.
    ///
    /// Used wherever a block is built from a sample count rather than
    /// decoded from stored metadata, e.g. the output of a merge.
    pub fn end_for(start_time: f64, sample_rate: f64, n_samples: usize) -> f64 {
        start_time + n_samples.saturating_sub(1) as f64 / sample_rate
    }
}
