//! Row layout of the data texture.
//!
//! Top to bottom: header row, face lookup rows, source texture bands,
//! position table, UV table, vertex list. Each section starts on a fresh
//! row and fills rows left to right.

use crate::error::{EncoderError, Result};

/// Largest value of the 16-bit header and lookup fields.
pub const MAX_16_BIT_FIELD: u32 = u16::MAX as u32;

/// Computed section sizes and offsets, in rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Image width (the source texture width).
    pub width: u32,
    /// Source texture height.
    pub texture_height: u32,
    pub face_count: usize,
    pub frame_count: usize,
    pub texture_count: usize,
    pub compressed: bool,
    pub uv_header_height: u32,
    pub texture_rows: u32,
    pub positions_height: u32,
    pub uvs_height: u32,
    pub vertices_height: u32,
    /// Final image height, including power-of-two padding.
    pub height: u32,
}

/// Input counts for [`Layout::compute`].
#[derive(Debug, Clone, Copy)]
pub struct LayoutParams {
    pub width: u32,
    pub texture_height: u32,
    pub texture_count: usize,
    pub face_count: usize,
    pub frame_count: usize,
    pub position_count: usize,
    pub uv_count: usize,
    pub vertex_count: usize,
    pub compressed: bool,
    pub pad_to_power_of_two: bool,
}

impl Layout {
    /// Pixels used per corner in the vertex list.
    pub fn pixels_per_vertex(compressed: bool) -> usize {
        if compressed {
            1
        } else {
            2
        }
    }

    pub fn compute(params: LayoutParams) -> Self {
        let width = params.width.max(1) as usize;
        let rows = |pixels: usize| u32::try_from(pixels.div_ceil(width)).unwrap_or(u32::MAX);

        let uv_header_height = rows(params.face_count);
        let texture_rows = u32::try_from(params.texture_count)
            .unwrap_or(u32::MAX)
            .saturating_mul(params.texture_height);
        let positions_height = rows(params.position_count * 3);
        let uvs_height = rows(params.uv_count * 2);
        let vertices_height =
            rows(params.vertex_count * Self::pixels_per_vertex(params.compressed));

        let used = [uv_header_height, texture_rows, positions_height, uvs_height, vertices_height]
            .into_iter()
            .fold(1u32, u32::saturating_add);
        let height = if params.pad_to_power_of_two {
            used.checked_next_power_of_two().unwrap_or(u32::MAX)
        } else {
            used
        };

        Self {
            width: params.width,
            texture_height: params.texture_height,
            face_count: params.face_count,
            frame_count: params.frame_count,
            texture_count: params.texture_count,
            compressed: params.compressed,
            uv_header_height,
            texture_rows,
            positions_height,
            uvs_height,
            vertices_height,
            height,
        }
    }

    /// Check that every size and offset fits the header field that stores it.
    pub fn check_limits(&self) -> Result<()> {
        let max = MAX_16_BIT_FIELD;
        if self.width > max || self.texture_height > max {
            return Err(EncoderError::TextureSize(format!(
                "texture {}x{} exceeds the {} pixel header limit",
                self.width, self.texture_height, max
            )));
        }
        if self.positions_height > max || self.uvs_height > max {
            return Err(EncoderError::Format(format!(
                "position table ({} rows) or UV table ({} rows) exceeds {} rows",
                self.positions_height, self.uvs_height, max
            )));
        }
        // Face lookup pixels store their own row in 16 bits.
        if self.uv_header_start() as u64 + self.uv_header_height as u64 > max as u64 + 1 {
            return Err(EncoderError::Format(format!(
                "{} faces need {} lookup rows, past row {}",
                self.face_count, self.uv_header_height, max
            )));
        }
        if self.face_count.checked_mul(4).map_or(true, |n| n > u32::MAX as usize) {
            return Err(EncoderError::Format(format!(
                "{} faces exceed the 32-bit vertex counter",
                self.face_count
            )));
        }
        let bytes = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(4))
            .filter(|&n| n <= isize::MAX as usize && self.height < u32::MAX);
        if bytes.is_none() {
            return Err(EncoderError::Format(format!(
                "{}x{} output image is too large",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// First row of the face lookup section.
    pub fn uv_header_start(&self) -> u32 {
        1
    }

    pub fn textures_start(&self) -> u32 {
        self.uv_header_start() + self.uv_header_height
    }

    pub fn positions_start(&self) -> u32 {
        self.textures_start() + self.texture_rows
    }

    pub fn uvs_start(&self) -> u32 {
        self.positions_start() + self.positions_height
    }

    pub fn vertices_start(&self) -> u32 {
        self.uvs_start() + self.uvs_height
    }

    /// Rows holding data, before padding.
    pub fn used_height(&self) -> u32 {
        self.vertices_start() + self.vertices_height
    }

    /// Pixel coordinate of element `index` in a section starting at `start_row`.
    pub fn section_pixel(&self, start_row: u32, index: usize) -> (u32, u32) {
        let width = self.width.max(1) as usize;
        ((index % width) as u32, start_row + (index / width) as u32)
    }

    /// Column and row of face `index`'s lookup pixel.
    pub fn face_lookup_pixel(&self, index: usize) -> (u32, u32) {
        self.section_pixel(self.uv_header_start(), index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> LayoutParams {
        LayoutParams {
            width: 8,
            texture_height: 8,
            texture_count: 1,
            face_count: 12,
            frame_count: 1,
            position_count: 8,
            uv_count: 14,
            vertex_count: 48,
            compressed: true,
            pad_to_power_of_two: false,
        }
    }

    #[test]
    fn test_section_heights() {
        let layout = Layout::compute(params());
        assert_eq!(layout.uv_header_height, 2); // 12 faces / 8
        assert_eq!(layout.texture_rows, 8);
        assert_eq!(layout.positions_height, 3); // 24 pixels
        assert_eq!(layout.uvs_height, 4); // 28 pixels
        assert_eq!(layout.vertices_height, 6); // 48 pixels
        assert_eq!(layout.height, 1 + 2 + 8 + 3 + 4 + 6);
        assert_eq!(layout.used_height(), layout.height);
    }

    #[test]
    fn test_section_offsets() {
        let layout = Layout::compute(params());
        assert_eq!(layout.textures_start(), 3);
        assert_eq!(layout.positions_start(), 11);
        assert_eq!(layout.uvs_start(), 14);
        assert_eq!(layout.vertices_start(), 18);
    }

    #[test]
    fn test_uncompressed_doubles_vertex_rows() {
        let layout = Layout::compute(LayoutParams {
            compressed: false,
            ..params()
        });
        assert_eq!(layout.vertices_height, 12);
    }

    #[test]
    fn test_power_of_two_padding() {
        let layout = Layout::compute(LayoutParams {
            pad_to_power_of_two: true,
            ..params()
        });
        assert_eq!(layout.used_height(), 24);
        assert_eq!(layout.height, 32);
    }

    #[test]
    fn test_face_lookup_pixel() {
        let layout = Layout::compute(params());
        assert_eq!(layout.face_lookup_pixel(0), (0, 1));
        assert_eq!(layout.face_lookup_pixel(9), (1, 2));
    }

    #[test]
    fn test_position_rows_at_header_limit() {
        // 174_760 positions fill exactly 65_535 rows of width 8.
        let at_limit = Layout::compute(LayoutParams {
            position_count: 174_760,
            ..params()
        });
        assert_eq!(at_limit.positions_height, MAX_16_BIT_FIELD);
        assert!(at_limit.check_limits().is_ok());

        let over = Layout::compute(LayoutParams {
            position_count: 174_761,
            ..params()
        });
        assert!(matches!(over.check_limits(), Err(EncoderError::Format(_))));

        let far_over = Layout::compute(LayoutParams {
            position_count: 200_000,
            ..params()
        });
        assert_eq!(far_over.positions_height, 75_000);
        assert!(far_over.check_limits().is_err());
    }

    #[test]
    fn test_lookup_rows_at_header_limit() {
        // Lookup rows 1..=65_535 hold 8 faces each.
        let at_limit = Layout::compute(LayoutParams {
            face_count: 65_535 * 8,
            vertex_count: 0,
            ..params()
        });
        assert!(at_limit.check_limits().is_ok());

        let over = Layout::compute(LayoutParams {
            face_count: 65_535 * 8 + 1,
            vertex_count: 0,
            ..params()
        });
        assert!(over.check_limits().is_err());
    }

    #[test]
    fn test_wide_texture_is_rejected() {
        let layout = Layout::compute(LayoutParams {
            width: 65_536,
            ..params()
        });
        assert!(matches!(layout.check_limits(), Err(EncoderError::TextureSize(_))));
    }
}
