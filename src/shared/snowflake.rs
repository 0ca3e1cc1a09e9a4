//! Snowflake ID Generator
//!
//! Twitter-style unique ID generation, plus helpers for carrying IDs over
//! JSON as strings (64-bit integers do not survive JavaScript clients).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Deserializer};

/// Default epoch (2024-01-01T00:00:00.000Z)
pub const DEFAULT_EPOCH: u64 = 1704067200000;

const SEQUENCE_BITS: u64 = 12;
const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;

/// Snowflake ID generator
///
/// The last issued millisecond and sequence are packed into one word and
/// advanced with compare-and-swap, so concurrent callers never share an ID.
/// IDs never go backwards, even if the wall clock does.
pub struct SnowflakeGenerator {
    machine_id: u64,
    node_id: u64,
    epoch: u64,
    /// `timestamp << SEQUENCE_BITS | sequence` of the last issued ID
    state: AtomicU64,
}

impl SnowflakeGenerator {
    /// Create a new snowflake generator
    pub fn new(machine_id: u64, node_id: u64, epoch: u64) -> Self {
        Self {
            machine_id: machine_id & 0x1F, // 5 bits
            node_id: node_id & 0x1F,       // 5 bits
            epoch,
            state: AtomicU64::new(0),
        }
    }

    /// Generate a new snowflake ID
    pub fn generate(&self) -> i64 {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            let last_timestamp = current >> SEQUENCE_BITS;
            let last_sequence = current & SEQUENCE_MASK;
            let now = self.current_timestamp();

            let (timestamp, sequence) = if now > last_timestamp {
                (now, 0)
            } else if last_sequence < SEQUENCE_MASK {
                (last_timestamp, last_sequence + 1)
            } else {
                // Sequence exhausted for this millisecond
                std::hint::spin_loop();
                current = self.state.load(Ordering::Acquire);
                continue;
            };

            let next = (timestamp << SEQUENCE_BITS) | sequence;
            match self
                .state
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return self.compose(timestamp, sequence),
                Err(actual) => current = actual,
            }
        }
    }

    /// Extract the millisecond timestamp embedded in an ID from this generator
    pub fn timestamp_of(&self, snowflake: i64) -> u64 {
        ((snowflake as u64) >> 22) + self.epoch
    }

    fn compose(&self, timestamp: u64, sequence: u64) -> i64 {
        let id = (timestamp.saturating_sub(self.epoch) << 22)
            | (self.machine_id << 17)
            | (self.node_id << 12)
            | sequence;

        id as i64
    }

    fn current_timestamp(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(self.epoch)
    }
}

impl Default for SnowflakeGenerator {
    fn default() -> Self {
        Self::new(1, 0, DEFAULT_EPOCH)
    }
}

/// Parse an ID received over the wire
pub fn parse_id(s: &str) -> Option<i64> {
    s.trim().parse::<i64>().ok()
}

/// Accept an ID given either as a JSON string or a JSON number and keep it
/// as text; parsing into a numeric ID is left to the caller so that a
/// malformed ID can be reported as "not found" instead of a framing error.
pub fn deserialize_id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}
