//! Deployment key material for the Volna card.
//!
//! The key table is a process-wide constant: sectors 0, 8 and 12 carry the
//! data key as key A and have no usable key B (the real key B is unique per
//! card and recovered out-of-band), every other sector uses one shared
//! default key for both slots.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 48-bit MIFARE Classic sector key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MfKey([u8; MfKey::SIZE]);

impl MfKey {
    /// Key length in bytes.
    pub const SIZE: usize = 6;

    /// Build a key from the low 48 bits of `value`, big-endian.
    pub const fn from_u64(value: u64) -> Self {
        let b = value.to_be_bytes();
        Self([b[2], b[3], b[4], b[5], b[6], b[7]])
    }

    pub const fn from_bytes(bytes: [u8; Self::SIZE]) -> Self {
        Self(bytes)
    }

    pub fn to_u64(self) -> u64 {
        let mut value = 0u64;
        for byte in self.0 {
            value = value << 8 | u64::from(byte);
        }
        value
    }

    pub fn as_bytes(&self) -> &[u8; Self::SIZE] {
        &self.0
    }
}

impl fmt::Display for MfKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// The two keys of one sector as known to this deployment.
///
/// `key_b` is `None` where the true key B is card-unique and cannot be part
/// of a static table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorKeyPair {
    pub key_a: MfKey,
    pub key_b: Option<MfKey>,
}

impl SectorKeyPair {
    const fn shared(key: u64) -> Self {
        Self {
            key_a: MfKey::from_u64(key),
            key_b: Some(MfKey::from_u64(key)),
        }
    }

    const fn data_only(key: u64) -> Self {
        Self {
            key_a: MfKey::from_u64(key),
            key_b: None,
        }
    }
}

/// Key A of the data-bearing sectors {0, 8, 12}.
const DATA_KEY: u64 = 0xD37C8F1793F7;

/// Shared default key of all remaining sectors.
const DEFAULT_KEY: u64 = 0x2B787A063D5D;

/// Sectors whose key B is card-unique and absent from the table.
pub const DATA_SECTORS: [u8; 3] = [0, 8, 12];

/// Immutable per-sector key table for one card variant.
#[derive(Debug)]
pub struct KeyTable([SectorKeyPair; KeyTable::SECTORS]);

impl KeyTable {
    /// Number of sectors covered by the table (1K layout).
    pub const SECTORS: usize = 16;

    /// Key pair for `sector`.
    ///
    /// An out-of-range sector is a programming-contract violation and
    /// panics; callers gate on the card variant before indexing.
    pub fn pair(&self, sector: u8) -> &SectorKeyPair {
        &self.0[usize::from(sector)]
    }

    pub fn key_a(&self, sector: u8) -> MfKey {
        self.pair(sector).key_a
    }
}

/// Key table for the Volna 1K card, one entry per sector.
pub static VOLNA_1K_KEYS: KeyTable = KeyTable([
    SectorKeyPair::data_only(DATA_KEY), // sector 0
    SectorKeyPair::shared(DEFAULT_KEY),
    SectorKeyPair::shared(DEFAULT_KEY),
    SectorKeyPair::shared(DEFAULT_KEY),
    SectorKeyPair::shared(DEFAULT_KEY),
    SectorKeyPair::shared(DEFAULT_KEY),
    SectorKeyPair::shared(DEFAULT_KEY),
    SectorKeyPair::shared(DEFAULT_KEY),
    SectorKeyPair::data_only(DATA_KEY), // sector 8
    SectorKeyPair::shared(DEFAULT_KEY),
    SectorKeyPair::shared(DEFAULT_KEY),
    SectorKeyPair::shared(DEFAULT_KEY),
    SectorKeyPair::data_only(DATA_KEY), // sector 12
    SectorKeyPair::shared(DEFAULT_KEY),
    SectorKeyPair::shared(DEFAULT_KEY),
    SectorKeyPair::shared(DEFAULT_KEY),
]);

/// One sector's keys as handed to the transport for a bulk read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySetEntry {
    pub key_a: MfKey,
    pub key_b: Option<MfKey>,
}

/// Per-read key set covering every sector of the detected variant.
///
/// Built fresh for each read attempt and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySet {
    entries: Vec<KeySetEntry>,
}

impl KeySet {
    /// Build a key set for the first `sectors` sectors of `table`.
    pub fn build(table: &KeyTable, sectors: usize) -> Self {
        let entries = (0..sectors)
            .map(|sector| {
                let pair = table.pair(sector as u8);
                KeySetEntry {
                    key_a: pair.key_a,
                    key_b: pair.key_b,
                }
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, sector: u8) -> Option<&KeySetEntry> {
        self.entries.get(usize::from(sector))
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeySetEntry> {
        self.entries.iter()
    }
}
