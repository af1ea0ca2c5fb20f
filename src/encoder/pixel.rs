//! Fixed-point pixel codecs.
//!
//! Every scalar is stored as a 24-bit unsigned value split big-endian across
//! R, G and B. Alpha is opaque except in compressed vertex pixels.

/// Bias centering signed positions in the 24-bit field.
pub const POSITION_BIAS: f64 = 8_388_608.0; // 2^23
/// Position resolution: 1/65536 model unit.
pub const POSITION_UNIT: f64 = 65_536.0;
/// UV resolution: 1/65535.
pub const UV_UNIT: f64 = 65_535.0;

/// Split an encoded value into three bytes, wrapping modulo 2^24.
pub fn split_24(encoded: f64) -> [u8; 3] {
    let e = encoded.floor() as i64;
    [
        e.div_euclid(65_536).rem_euclid(256) as u8,
        e.div_euclid(256).rem_euclid(256) as u8,
        e.rem_euclid(256) as u8,
    ]
}

/// Reassemble the 24-bit value of a pixel's R, G and B channels.
pub fn join_24(pixel: [u8; 4]) -> u32 {
    (pixel[0] as u32) << 16 | (pixel[1] as u32) << 8 | pixel[2] as u32
}

/// Encode one position component.
pub fn encode_position(value: f64, scale: f64, offset: f64) -> [u8; 4] {
    let encoded = POSITION_BIAS + value * POSITION_UNIT * scale + offset * POSITION_UNIT;
    let [r, g, b] = split_24(encoded);
    [r, g, b, 255]
}

/// Decode a position pixel back to model units (scale and offset included).
pub fn decode_position(pixel: [u8; 4]) -> f64 {
    (join_24(pixel) as f64 - POSITION_BIAS) / POSITION_UNIT
}

/// Encode one UV component. Values outside `[0, 1]` wrap.
pub fn encode_uv(value: f64) -> [u8; 4] {
    let [r, g, b] = split_24(value * UV_UNIT);
    [r, g, b, 255]
}

/// Decode a UV pixel.
pub fn decode_uv(pixel: [u8; 4]) -> f64 {
    join_24(pixel) as f64 / UV_UNIT
}

/// Number of distinct indices a 24-bit RGB index can address.
pub const MAX_TABLE_ENTRIES: usize = 1 << 24;

/// Encode a table index as an opaque pixel. Callers keep `index` below
/// [`MAX_TABLE_ENTRIES`].
pub fn encode_index(index: usize) -> [u8; 4] {
    [
        (index >> 16 & 255) as u8,
        (index >> 8 & 255) as u8,
        (index & 255) as u8,
        255,
    ]
}

/// Encode a corner into one pixel: position index in RGB, UV index + 1 in alpha.
///
/// Alpha 0 never occurs for UV indices below 255.
pub fn encode_compressed_vertex(position_index: usize, uv_index: usize) -> [u8; 4] {
    let [r, g, b, _] = encode_index(position_index);
    [r, g, b, ((uv_index % 256 + 1) % 256) as u8]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_zero_is_bias() {
        assert_eq!(encode_position(0.0, 1.0, 0.0), [128, 0, 0, 255]);
    }

    #[test]
    fn test_position_scale_and_offset() {
        // 1.0 * 65536 above the bias
        assert_eq!(encode_position(1.0, 1.0, 0.0), [129, 0, 0, 255]);
        assert_eq!(encode_position(0.5, 2.0, 0.0), [129, 0, 0, 255]);
        assert_eq!(encode_position(0.0, 1.0, -1.0), [127, 0, 0, 255]);
        // 1/256 of a unit lands in the green channel
        assert_eq!(encode_position(1.0 / 256.0, 1.0, 0.0), [128, 1, 0, 255]);
        assert_eq!(encode_position(-1.0 / 65536.0, 1.0, 0.0), [127, 255, 255, 255]);
    }

    #[test]
    fn test_position_decodes() {
        for value in [-3.25, -0.5, 0.0, 0.125, 7.75, 100.0] {
            assert_eq!(decode_position(encode_position(value, 1.0, 0.0)), value);
        }
    }

    #[test]
    fn test_position_out_of_range_wraps() {
        // 2^23 + 128 * 65536 = 2^24 wraps to zero
        assert_eq!(encode_position(128.0, 1.0, 0.0), [0, 0, 0, 255]);
        assert_eq!(encode_position(-129.0, 1.0, 0.0), [255, 0, 0, 255]);
    }

    #[test]
    fn test_uv_encoding() {
        assert_eq!(encode_uv(0.0), [0, 0, 0, 255]);
        assert_eq!(encode_uv(1.0), [0, 255, 255, 255]);
        assert_eq!(decode_uv(encode_uv(1.0)), 1.0);
        assert_eq!(encode_uv(0.5), [0, 127, 255, 255]);
    }

    #[test]
    fn test_index_encoding() {
        assert_eq!(encode_index(0), [0, 0, 0, 255]);
        assert_eq!(encode_index(0x01_02_03), [1, 2, 3, 255]);
        assert_eq!(join_24(encode_index(70_000)), 70_000);
    }

    #[test]
    fn test_compressed_vertex_alpha_offset() {
        assert_eq!(encode_compressed_vertex(5, 0), [0, 0, 5, 1]);
        assert_eq!(encode_compressed_vertex(300, 254), [0, 1, 44, 255]);
        // Index 255 wraps to the reserved zero
        assert_eq!(encode_compressed_vertex(0, 255)[3], 0);
        assert_eq!(encode_compressed_vertex(0, 256)[3], 1);
    }
}
