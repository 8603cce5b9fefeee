//! Reverse-engineered field layout of the Volna application.
//!
//! Every fixed offset and mask is a named constant so the whole bit layout
//! lives at one boundary. Masks clear reserved high-order bits; the
//! remaining value is passed through without range re-validation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::VolnaError;
use crate::image::{Block, CardVariant, RawCardImage};
use crate::keys::KeyTable;

/// Card format name rendered in the output header tag.
pub const CARD_NAME: &str = "Volna";

/// Sector holding card number and balance.
pub const DATA_SECTOR: u8 = 8;

/// Sector holding the last top-up time.
pub const LAST_CHARGE_SECTOR: u8 = 0;

/// Card number: second block of the data sector, bytes 8..12, big-endian.
pub const CARD_NUMBER_BLOCK_OFFSET: usize = 1;
pub const CARD_NUMBER_BYTE_OFFSET: usize = 8;
/// Top 2 bits are reserved.
pub const CARD_NUMBER_MASK: u32 = 0x3FFF_FFFF;

/// Balance: third block of the data sector, bytes 8..10, big-endian.
pub const BALANCE_BLOCK_OFFSET: usize = 2;
pub const BALANCE_BYTE_OFFSET: usize = 8;
/// Top bit is reserved.
pub const BALANCE_MASK: u16 = 0x7FFF;

/// Last charge: second block of sector 0, bytes 0..2, big-endian.
pub const LAST_CHARGE_BLOCK_OFFSET: usize = 1;
pub const LAST_CHARGE_BYTE_OFFSET: usize = 0;
/// Top 3 bits are reserved.
pub const LAST_CHARGE_MASK: u16 = 0x1FFF;

/// Big-endian u32 at `offset` within a block.
pub fn read_be_u32(block: &Block, offset: usize) -> Result<u32, VolnaError> {
    let bytes = field_bytes(block, offset, 4)?;
    Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Big-endian u16 at `offset` within a block.
pub fn read_be_u16(block: &Block, offset: usize) -> Result<u16, VolnaError> {
    let bytes = field_bytes(block, offset, 2)?;
    Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
}

fn field_bytes(block: &Block, offset: usize, len: usize) -> Result<&[u8], VolnaError> {
    block
        .0
        .get(offset..offset + len)
        .ok_or(VolnaError::InsufficientData {
            expected: offset + len,
            actual: block.0.len(),
        })
}

/// Domain fields decoded from a trusted raw image.
///
/// Only constructed on full success; a failed gate never yields a partially
/// populated record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRecord {
    pub card_number: u32,
    pub balance: u16,
    pub last_charge_hour: u8,
    pub last_charge_minute: u8,
}

impl ParsedRecord {
    /// Decode the domain fields from `image`.
    ///
    /// Gates run strictly in order: variant, then trailer-key authenticity,
    /// then field extraction. The trailer-key comparison against `keys` is
    /// the sole authenticity check on the decoded data.
    pub fn decode(image: &RawCardImage, keys: &KeyTable) -> Result<Self, VolnaError> {
        if image.variant() != CardVariant::Classic1k {
            return Err(VolnaError::UnsupportedVariant(image.variant()));
        }

        let trailer = image.trailer(DATA_SECTOR)?;
        if trailer.key_a() != keys.key_a(DATA_SECTOR) {
            return Err(VolnaError::UntrustedKey {
                sector: DATA_SECTOR,
            });
        }

        let block = image.sector_block(DATA_SECTOR, CARD_NUMBER_BLOCK_OFFSET)?;
        let card_number = read_be_u32(block, CARD_NUMBER_BYTE_OFFSET)? & CARD_NUMBER_MASK;
        if card_number == 0 {
            return Err(VolnaError::MalformedField("card number is zero"));
        }

        let block = image.sector_block(DATA_SECTOR, BALANCE_BLOCK_OFFSET)?;
        let balance = read_be_u16(block, BALANCE_BYTE_OFFSET)? & BALANCE_MASK;

        let block = image.sector_block(LAST_CHARGE_SECTOR, LAST_CHARGE_BLOCK_OFFSET)?;
        let last_charge = read_be_u16(block, LAST_CHARGE_BYTE_OFFSET)? & LAST_CHARGE_MASK;

        // Decimal-packed time: hour*100 + minute, reproduced without
        // calendar-bounds correction.
        Ok(Self {
            card_number,
            balance,
            last_charge_hour: (last_charge / 100) as u8,
            last_charge_minute: (last_charge % 100) as u8,
        })
    }
}

impl fmt::Display for ParsedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{}\nCard number: {}\nBalance: {} RUR\nLast charge at {:02}:{:02}",
            CARD_NAME, self.card_number, self.balance, self.last_charge_hour, self.last_charge_minute
        )
    }
}
