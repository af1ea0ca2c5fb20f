//! GLB container reading.
//!
//! Layout: a 12-byte header (`glTF` magic, version, total length) followed by
//! a JSON chunk and an optional BIN chunk, each prefixed by length and type.

use crate::error::{EncoderError, Result};

/// `glTF` as a little-endian u32.
pub const MAGIC: &[u8; 4] = b"glTF";
/// The only container version supported.
pub const VERSION: u32 = 2;
/// Chunk type: JSON.
pub const CHUNK_JSON: u32 = 0x4E4F534A;
/// Chunk type: BIN.
pub const CHUNK_BIN: u32 = 0x004E4942;

const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

/// The two payloads of a GLB container.
#[derive(Debug)]
pub struct GlbChunks<'a> {
    pub json: &'a [u8],
    pub bin: Option<&'a [u8]>,
}

/// Check whether bytes start with the GLB magic.
pub fn is_glb(data: &[u8]) -> bool {
    data.len() >= 4 && &data[0..4] == MAGIC
}

/// Split a GLB container into its JSON and BIN chunks.
pub fn read_glb(data: &[u8]) -> Result<GlbChunks<'_>> {
    if data.len() < HEADER_LEN {
        return Err(EncoderError::Format(format!(
            "GLB too short: {} bytes",
            data.len()
        )));
    }
    if !is_glb(data) {
        return Err(EncoderError::Format(format!(
            "Bad GLB magic: {:02x?}",
            &data[0..4]
        )));
    }

    let version = read_u32(data, 4);
    if version != VERSION {
        return Err(EncoderError::Format(format!(
            "Unsupported GLB version {} (expected {})",
            version, VERSION
        )));
    }

    // Trust the declared length only when it fits the data we have
    let declared = read_u32(data, 8) as usize;
    let end = declared.min(data.len());

    let (json_type, json) = read_chunk(data, HEADER_LEN, end)?
        .ok_or_else(|| EncoderError::Format("GLB has no JSON chunk".to_string()))?;
    if json_type != CHUNK_JSON {
        return Err(EncoderError::Format(format!(
            "First GLB chunk must be JSON, found type {:#010x}",
            json_type
        )));
    }

    let bin_start = HEADER_LEN + CHUNK_HEADER_LEN + json.len();
    let bin = match read_chunk(data, bin_start, end)? {
        Some((CHUNK_BIN, bin)) => Some(bin),
        Some((other, _)) => {
            tracing::warn!("Ignoring GLB chunk of unknown type {:#010x}", other);
            None
        }
        None => None,
    };

    Ok(GlbChunks { json, bin })
}

/// Read the chunk starting at `offset`, or `None` at the end of the container.
fn read_chunk(data: &[u8], offset: usize, end: usize) -> Result<Option<(u32, &[u8])>> {
    if offset + CHUNK_HEADER_LEN > end {
        return Ok(None);
    }
    let length = read_u32(data, offset) as usize;
    let chunk_type = read_u32(data, offset + 4);
    let start = offset + CHUNK_HEADER_LEN;
    let stop = start
        .checked_add(length)
        .filter(|&stop| stop <= end)
        .ok_or_else(|| {
            EncoderError::Format(format!(
                "GLB chunk at byte {} claims {} bytes, past end of file",
                offset, length
            ))
        })?;
    Ok(Some((chunk_type, &data[start..stop])))
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Assemble a GLB container. Used to build fixtures.
#[cfg(test)]
pub(crate) fn write_glb(json: &[u8], bin: Option<&[u8]>) -> Vec<u8> {
    let json_padding = (4 - json.len() % 4) % 4;
    let json_len = json.len() + json_padding;
    let bin_len = bin.map(|b| b.len() + (4 - b.len() % 4) % 4);
    let total = HEADER_LEN + CHUNK_HEADER_LEN + json_len + bin_len.map_or(0, |l| l + CHUNK_HEADER_LEN);

    let mut glb = Vec::with_capacity(total);
    glb.extend_from_slice(MAGIC);
    glb.extend_from_slice(&VERSION.to_le_bytes());
    glb.extend_from_slice(&(total as u32).to_le_bytes());

    glb.extend_from_slice(&(json_len as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    glb.extend_from_slice(json);
    glb.extend(std::iter::repeat(b' ').take(json_padding));

    if let (Some(bin), Some(bin_len)) = (bin, bin_len) {
        glb.extend_from_slice(&(bin_len as u32).to_le_bytes());
        glb.extend_from_slice(&CHUNK_BIN.to_le_bytes());
        glb.extend_from_slice(bin);
        glb.extend(std::iter::repeat(0u8).take(bin_len - bin.len()));
    }

    glb
}
