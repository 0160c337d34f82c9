use std::cmp::Ordering;
use std::fmt;

use crate::types::{Block, SampleType};

/// Identity of one logical stream: the "SNCLQR" tuple.
///
/// Two blocks belong to the same stream — and are therefore candidates for
/// merging — exactly when their channel keys compare equal, sample rate
/// included.
#[derive(Debug, Clone)]
pub struct ChannelKey {
    pub network: String,
    pub station: String,
    pub location: String,
    pub channel: String,
    pub quality: char,
    pub sample_rate: f64,
}

impl ChannelKey {
    fn cmp_fields(&self, other: &ChannelKey) -> Ordering {
        self.network
            .cmp(&other.network)
            .then_with(|| self.station.cmp(&other.station))
            .then_with(|| self.location.cmp(&other.location))
            .then_with(|| self.channel.cmp(&other.channel))
            .then_with(|| self.quality.cmp(&other.quality))
            .then_with(|| self.sample_rate.total_cmp(&other.sample_rate))
    }
}

impl PartialEq for ChannelKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_fields(other) == Ordering::Equal
    }
}

impl Eq for ChannelKey {}

impl PartialOrd for ChannelKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChannelKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_fields(other)
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}.{} ({}Hz)",
            self.network, self.station, self.location, self.channel, self.quality, self.sample_rate
        )
    }
}

/// Immutable snapshot of one block's identity and time span.
///
/// The compaction pass never compares blocks directly; it extracts a
/// signature per block and works on those. Ordering is the lexicographic
/// tuple (network, station, location, channel, quality, sample_rate,
/// start_time, end_time) — channel-key precedence dominates the time
/// fields, which is why the comparison is spelled out explicitly instead
/// of derived from field order.
#[derive(Debug, Clone)]
pub struct Signature {
    pub key: ChannelKey,
    /// Epoch seconds of the first sample.
    pub start_time: f64,
    /// Epoch seconds of the last sample.
    pub end_time: f64,
    pub sample_type: SampleType,
    pub n_samples: usize,
}

impl Signature {
    /// Snapshot the identity/time fields of a block.
    pub fn new(block: &Block) -> Self {
        Signature {
            key: ChannelKey {
                network: block.network.clone(),
                station: block.station.clone(),
                location: block.location.clone(),
                channel: block.channel.clone(),
                quality: block.quality,
                sample_rate: block.sample_rate,
            },
            start_time: block.start_time,
            end_time: block.end_time,
            sample_type: block.samples.sample_type(),
            n_samples: block.samples.len(),
        }
    }

    /// Time span covered, in seconds.
    pub fn span(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// True iff `self` and `other` are the same stream and their closed
    /// time intervals overlap or touch. Symmetric; false whenever the
    /// channel keys differ, regardless of times.
    pub fn mergeable(&self, other: &Signature) -> bool {
        self.key == other.key
            && self.start_time <= other.end_time
            && other.start_time <= self.end_time
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Signature {}

impl PartialOrd for Signature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Signature {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .cmp(&other.key)
            .then_with(|| self.start_time.total_cmp(&other.start_time))
            .then_with(|| self.end_time.total_cmp(&other.end_time))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}
