//! MIFARE Classic geometry and the raw card image.
//!
//! The image is the full per-block byte dump pulled by the read stage,
//! including each sector's trailer exactly as the card reported it. The
//! parse stage borrows it read-only; nothing in this crate mutates an image
//! after the read completes.

use modular_bitfield::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::error::VolnaError;
use crate::keys::MfKey;

/// Size of one card block in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Card capacity variant as reported by the transport's detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum CardVariant {
    #[strum(to_string = "Mini")]
    Mini,
    #[strum(to_string = "1K")]
    Classic1k,
    #[strum(to_string = "4K")]
    Classic4k,
}

impl CardVariant {
    pub fn total_sectors(self) -> usize {
        match self {
            CardVariant::Mini => 5,
            CardVariant::Classic1k => 16,
            CardVariant::Classic4k => 40,
        }
    }

    pub fn total_blocks(self) -> usize {
        match self {
            CardVariant::Mini => 20,
            CardVariant::Classic1k => 64,
            CardVariant::Classic4k => 256,
        }
    }
}

/// First block number of `sector`. Sectors 32..40 of a 4K card hold 16
/// blocks each, all earlier sectors hold 4.
pub fn first_block_of_sector(sector: u8) -> usize {
    let sector = usize::from(sector);
    if sector < 32 {
        sector * 4
    } else {
        32 * 4 + (sector - 32) * 16
    }
}

pub fn blocks_in_sector(sector: u8) -> usize {
    if sector < 32 { 4 } else { 16 }
}

/// Block number of the trailer of `sector`.
pub fn trailer_block_of_sector(sector: u8) -> usize {
    first_block_of_sector(sector) + blocks_in_sector(sector) - 1
}

/// One 16-byte card block.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    FromBytes,
    IntoBytes,
    KnownLayout,
    Immutable,
    Unaligned,
    Serialize,
    Deserialize,
)]
#[repr(transparent)]
pub struct Block(pub [u8; BLOCK_SIZE]);

/// Raw view of a sector trailer: key A, access bits, key B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct SectorTrailer {
    key_a: [u8; MfKey::SIZE],
    access: [u8; 4],
    key_b: [u8; MfKey::SIZE],
}

impl SectorTrailer {
    pub fn new(key_a: MfKey, access: [u8; 4], key_b: MfKey) -> Self {
        Self {
            key_a: *key_a.as_bytes(),
            access,
            key_b: *key_b.as_bytes(),
        }
    }

    /// Key A exactly as stored on the card.
    pub fn key_a(&self) -> MfKey {
        MfKey::from_bytes(self.key_a)
    }

    /// Key B exactly as stored on the card.
    pub fn key_b(&self) -> MfKey {
        MfKey::from_bytes(self.key_b)
    }

    pub fn access_bits(&self) -> AccessBits {
        AccessBits::from_bytes(self.access)
    }

    /// Trailer serialized as one 16-byte block.
    pub fn to_block(&self) -> Block {
        let mut data = [0u8; BLOCK_SIZE];
        data.copy_from_slice(self.as_bytes());
        Block(data)
    }
}

/// Packed access-conditions word of a sector trailer.
///
/// Bytes 6..9 of the trailer store the C1/C2/C3 nibbles together with their
/// bitwise complements; byte 9 is free for application use.
#[bitfield(bytes = 4)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccessBits {
    pub not_c1: B4,
    pub not_c2: B4,
    pub not_c3: B4,
    pub c1: B4,
    pub c2: B4,
    pub c3: B4,
    pub user_byte: u8,
}

impl AccessBits {
    /// True iff every condition nibble matches its stored complement.
    ///
    /// Diagnostic only; a corrupted word makes the card unwritable for a
    /// real reader but does not gate decoding here.
    pub fn is_consistent(&self) -> bool {
        self.c1() == !self.not_c1() & 0x0F
            && self.c2() == !self.not_c2() & 0x0F
            && self.c3() == !self.not_c3() & 0x0F
    }
}

/// Full raw dump of one card: detected variant plus every block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCardImage {
    variant: CardVariant,
    blocks: Vec<Block>,
}

impl RawCardImage {
    /// Zero-filled image sized for `variant`.
    pub fn new(variant: CardVariant) -> Self {
        Self {
            variant,
            blocks: vec![Block([0; BLOCK_SIZE]); variant.total_blocks()],
        }
    }

    /// Image from pre-read blocks; the count must match the variant.
    pub fn from_blocks(variant: CardVariant, blocks: Vec<Block>) -> Result<Self, VolnaError> {
        if blocks.len() != variant.total_blocks() {
            return Err(VolnaError::InsufficientData {
                expected: variant.total_blocks(),
                actual: blocks.len(),
            });
        }
        Ok(Self { variant, blocks })
    }

    pub fn variant(&self) -> CardVariant {
        self.variant
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Result<&Block, VolnaError> {
        self.blocks.get(index).ok_or(VolnaError::BlockOutOfBounds {
            block: index,
            total: self.blocks.len(),
        })
    }

    pub fn block_mut(&mut self, index: usize) -> Result<&mut Block, VolnaError> {
        let total = self.blocks.len();
        self.blocks
            .get_mut(index)
            .ok_or(VolnaError::BlockOutOfBounds { block: index, total })
    }

    /// Block at `offset` within `sector`.
    pub fn sector_block(&self, sector: u8, offset: usize) -> Result<&Block, VolnaError> {
        self.block(first_block_of_sector(sector) + offset)
    }

    /// Trailer of `sector` as stored in the image.
    pub fn trailer(&self, sector: u8) -> Result<&SectorTrailer, VolnaError> {
        let block = self.block(trailer_block_of_sector(sector))?;
        SectorTrailer::ref_from_bytes(&block.0).map_err(|_| VolnaError::InsufficientData {
            expected: BLOCK_SIZE,
            actual: block.0.len(),
        })
    }
}
