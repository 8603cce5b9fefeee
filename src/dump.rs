//! Offline text dumps of raw card images.
//!
//! The dump format is line-oriented: a `Type:` header naming the capacity
//! variant, then one `Block <n>:` line per block with 16 space-separated
//! hex bytes. Blank lines and `#` comments are ignored. The loader is
//! strict: the parse stage needs a fully-read image, so unread-byte
//! placeholders (`??`) and short dumps are rejected.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::VolnaError;
use crate::image::{BLOCK_SIZE, Block, CardVariant, RawCardImage};

/// Load a dump file into a raw image.
pub fn load(path: &Path) -> Result<RawCardImage, VolnaError> {
    parse(&fs::read_to_string(path)?)
}

/// Write `image` to a dump file.
pub fn save(image: &RawCardImage, path: &Path) -> Result<(), VolnaError> {
    fs::write(path, render(image))?;
    Ok(())
}

/// Parse dump text into a raw image.
pub fn parse(text: &str) -> Result<RawCardImage, VolnaError> {
    let mut lines = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'));

    let header = lines
        .next()
        .ok_or_else(|| VolnaError::InvalidDump("empty dump".to_string()))?;
    let variant = parse_type_line(header)?;

    let mut blocks = Vec::with_capacity(variant.total_blocks());
    for line in lines {
        blocks.push(parse_block_line(line, blocks.len())?);
    }

    RawCardImage::from_blocks(variant, blocks)
}

/// Render `image` as dump text.
pub fn render(image: &RawCardImage) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Type: {}", image.variant());
    for (index, block) in image.blocks().iter().enumerate() {
        let _ = write!(out, "Block {}:", index);
        for byte in block.0 {
            let _ = write!(out, " {:02x}", byte);
        }
        out.push('\n');
    }
    out
}

fn parse_type_line(line: &str) -> Result<CardVariant, VolnaError> {
    let name = line
        .strip_prefix("Type:")
        .ok_or_else(|| VolnaError::InvalidDump(format!("expected Type header, got {:?}", line)))?
        .trim();
    match name {
        "Mini" => Ok(CardVariant::Mini),
        "1K" => Ok(CardVariant::Classic1k),
        "4K" => Ok(CardVariant::Classic4k),
        other => Err(VolnaError::InvalidDump(format!(
            "unknown card type {:?}",
            other
        ))),
    }
}

fn parse_block_line(line: &str, expected_index: usize) -> Result<Block, VolnaError> {
    let rest = line
        .strip_prefix("Block ")
        .ok_or_else(|| VolnaError::InvalidDump(format!("expected Block line, got {:?}", line)))?;
    let (index, bytes) = rest
        .split_once(':')
        .ok_or_else(|| VolnaError::InvalidDump(format!("missing colon in {:?}", line)))?;

    let index: usize = index
        .trim()
        .parse()
        .map_err(|_| VolnaError::InvalidDump(format!("bad block number in {:?}", line)))?;
    if index != expected_index {
        return Err(VolnaError::InvalidDump(format!(
            "expected block {}, got block {}",
            expected_index, index
        )));
    }

    let mut data = [0u8; BLOCK_SIZE];
    let mut count = 0;
    for token in bytes.split_whitespace() {
        if token == "??" {
            return Err(VolnaError::InvalidDump(format!(
                "unread byte in block {}",
                index
            )));
        }
        if count == BLOCK_SIZE {
            return Err(VolnaError::InvalidDump(format!(
                "too many bytes in block {}",
                index
            )));
        }
        let decoded = hex::decode(token)
            .map_err(|_| VolnaError::InvalidDump(format!("bad hex {:?} in block {}", token, index)))?;
        if decoded.len() != 1 {
            return Err(VolnaError::InvalidDump(format!(
                "bad byte {:?} in block {}",
                token, index
            )));
        }
        data[count] = decoded[0];
        count += 1;
    }
    if count != BLOCK_SIZE {
        return Err(VolnaError::InvalidDump(format!(
            "block {} has {} bytes, expected {}",
            index, count, BLOCK_SIZE
        )));
    }

    Ok(Block(data))
}
