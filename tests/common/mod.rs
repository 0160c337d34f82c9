//! Shared test support: block builders, a checksummed flat-file codec, and
//! recording lock/indexer stand-ins for the external collaborators.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use wavebank::{Block, Codec, Error, Indexer, LockFactory, Result, SampleType, Samples};

/// A 1Hz i32 block on the default test channel with consistent times.
pub fn block(station: &str, start: f64, values: Vec<i32>) -> Block {
    block_at(station, "BHZ", 1.0, start, Samples::Int32(values))
}

/// A block whose recorded end time agrees with its sample count.
pub fn block_at(station: &str, channel: &str, rate: f64, start: f64, samples: Samples) -> Block {
    let end_time = Block::end_for(start, rate, samples.len());
    Block {
        network: "XX".into(),
        station: station.into(),
        location: "00".into(),
        channel: channel.into(),
        quality: 'D',
        sample_rate: rate,
        start_time: start,
        end_time,
        samples,
    }
}

// =============================================================================
// SeedCodec: checksummed record-per-block flat file format
// =============================================================================

/// One record per block:
///
/// ```text
/// ┌──────────┬────────┬─────────────────┐
/// │ CRC (4B) │ Len(4B)│ Payload (var)   │
/// └──────────┴────────┴─────────────────┘
/// ```
///
/// CRC covers the payload; a mismatch surfaces as a codec error.
pub struct SeedCodec;

const HEADER_SIZE: usize = 8;

fn put_str(buf: &mut Vec<u8>, s: &str) {
    buf.push(s.len() as u8);
    buf.extend_from_slice(s.as_bytes());
}

fn get_str(data: &[u8], offset: &mut usize) -> Result<String> {
    let len = *data
        .get(*offset)
        .ok_or_else(|| Error::Codec("truncated string length".into()))?
        as usize;
    *offset += 1;
    let bytes = data
        .get(*offset..*offset + len)
        .ok_or_else(|| Error::Codec("truncated string".into()))?;
    *offset += len;
    String::from_utf8(bytes.to_vec()).map_err(|e| Error::Codec(e.to_string()))
}

fn get_f64(data: &[u8], offset: &mut usize) -> Result<f64> {
    let bytes = data
        .get(*offset..*offset + 8)
        .ok_or_else(|| Error::Codec("truncated f64".into()))?;
    *offset += 8;
    Ok(f64::from_le_bytes(bytes.try_into().unwrap()))
}

fn encode_block(block: &Block) -> Vec<u8> {
    let mut payload = Vec::new();
    put_str(&mut payload, &block.network);
    put_str(&mut payload, &block.station);
    put_str(&mut payload, &block.location);
    put_str(&mut payload, &block.channel);
    payload.push(block.quality as u8);
    payload.push(match block.samples.sample_type() {
        SampleType::Int32 => 0,
        SampleType::Float32 => 1,
        SampleType::Float64 => 2,
    });
    payload.extend_from_slice(&block.sample_rate.to_le_bytes());
    payload.extend_from_slice(&block.start_time.to_le_bytes());
    payload.extend_from_slice(&block.end_time.to_le_bytes());
    payload.extend_from_slice(&(block.samples.len() as u32).to_le_bytes());
    match &block.samples {
        Samples::Int32(v) => {
            for x in v {
                payload.extend_from_slice(&x.to_le_bytes());
            }
        }
        Samples::Float32(v) => {
            for x in v {
                payload.extend_from_slice(&x.to_le_bytes());
            }
        }
        Samples::Float64(v) => {
            for x in v {
                payload.extend_from_slice(&x.to_le_bytes());
            }
        }
    }

    let mut record = Vec::with_capacity(HEADER_SIZE + payload.len());
    record.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    record.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    record.extend_from_slice(&payload);
    record
}

fn decode_block(payload: &[u8]) -> Result<Block> {
    let mut offset = 0;
    let network = get_str(payload, &mut offset)?;
    let station = get_str(payload, &mut offset)?;
    let location = get_str(payload, &mut offset)?;
    let channel = get_str(payload, &mut offset)?;
    let quality = *payload
        .get(offset)
        .ok_or_else(|| Error::Codec("truncated quality".into()))? as char;
    offset += 1;
    let type_tag = *payload
        .get(offset)
        .ok_or_else(|| Error::Codec("truncated type tag".into()))?;
    offset += 1;
    let sample_rate = get_f64(payload, &mut offset)?;
    let start_time = get_f64(payload, &mut offset)?;
    let end_time = get_f64(payload, &mut offset)?;
    let n = u32::from_le_bytes(
        payload
            .get(offset..offset + 4)
            .ok_or_else(|| Error::Codec("truncated sample count".into()))?
            .try_into()
            .unwrap(),
    ) as usize;
    offset += 4;

    let width = match type_tag {
        0 | 1 => 4,
        2 => 8,
        t => return Err(Error::Codec(format!("invalid type tag: {t}"))),
    };
    let raw = payload
        .get(offset..offset + n * width)
        .ok_or_else(|| Error::Codec("truncated samples".into()))?;
    let samples = match type_tag {
        0 => Samples::Int32(
            raw.chunks_exact(4)
                .map(|c| i32::from_le_bytes(c.try_into().unwrap()))
                .collect(),
        ),
        1 => Samples::Float32(
            raw.chunks_exact(4)
                .map(|c| f32::from_le_bytes(c.try_into().unwrap()))
                .collect(),
        ),
        _ => Samples::Float64(
            raw.chunks_exact(8)
                .map(|c| f64::from_le_bytes(c.try_into().unwrap()))
                .collect(),
        ),
    };

    Ok(Block {
        network,
        station,
        location,
        channel,
        quality,
        sample_rate,
        start_time,
        end_time,
        samples,
    })
}

impl Codec for SeedCodec {
    fn decode(&self, path: &Path) -> Result<Vec<Block>> {
        let data = fs::read(path)?;
        let mut blocks = Vec::new();
        let mut offset = 0;
        while offset < data.len() {
            let header = data
                .get(offset..offset + HEADER_SIZE)
                .ok_or_else(|| Error::Codec("truncated record header".into()))?;
            let stored_crc = u32::from_le_bytes(header[0..4].try_into().unwrap());
            let len = u32::from_le_bytes(header[4..8].try_into().unwrap()) as usize;
            let payload = data
                .get(offset + HEADER_SIZE..offset + HEADER_SIZE + len)
                .ok_or_else(|| Error::Codec("truncated record".into()))?;
            if crc32fast::hash(payload) != stored_crc {
                return Err(Error::Codec("CRC mismatch".into()));
            }
            blocks.push(decode_block(payload)?);
            offset += HEADER_SIZE + len;
        }
        Ok(blocks)
    }

    fn encode(&self, blocks: &[Block], path: &Path) -> Result<()> {
        let mut data = Vec::new();
        for block in blocks {
            data.extend_from_slice(&encode_block(block));
        }
        fs::write(path, data)?;
        Ok(())
    }
}

/// Write a file of blocks and return its path.
pub fn write_file(dir: &Path, name: &str, blocks: &[Block]) -> PathBuf {
    let path = dir.join(name);
    SeedCodec.encode(blocks, &path).unwrap();
    path
}

// =============================================================================
// Lock factory and indexer stand-ins
// =============================================================================

/// Records every acquire/release so tests can assert pairing and ordering.
#[derive(Clone, Default)]
pub struct TestLockFactory {
    pub events: Arc<Mutex<Vec<String>>>,
    /// Paths for which acquisition fails with a lock error.
    pub fail_for: Arc<Mutex<Vec<PathBuf>>>,
}

impl TestLockFactory {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn fail_for(&self, path: &Path) {
        self.fail_for.lock().unwrap().push(path.to_path_buf());
    }
}

pub struct TestLockGuard {
    events: Arc<Mutex<Vec<String>>>,
    path: PathBuf,
}

impl Drop for TestLockGuard {
    fn drop(&mut self) {
        self.events
            .lock()
            .unwrap()
            .push(format!("release {}", self.path.display()));
    }
}

impl LockFactory for TestLockFactory {
    type Guard = TestLockGuard;

    fn lock(&self, path: &Path) -> Result<TestLockGuard> {
        if self.fail_for.lock().unwrap().iter().any(|p| p == path) {
            return Err(Error::Lock(format!("{} already held", path.display())));
        }
        self.events
            .lock()
            .unwrap()
            .push(format!("acquire {}", path.display()));
        Ok(TestLockGuard {
            events: self.events.clone(),
            path: path.to_path_buf(),
        })
    }
}

/// Records every reindex call.
#[derive(Clone, Default)]
pub struct RecordingIndexer {
    pub calls: Arc<Mutex<Vec<PathBuf>>>,
}

impl RecordingIndexer {
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

impl Indexer for RecordingIndexer {
    fn reindex(&self, paths: &[PathBuf]) -> Result<()> {
        self.calls.lock().unwrap().extend_from_slice(paths);
        Ok(())
    }
}
