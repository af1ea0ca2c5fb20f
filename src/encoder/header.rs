//! The header row: seven pixels describing the rest of the image.

use super::layout::Layout;
use crate::error::{EncoderError, Result};
use crate::types::{ColorBehavior, ConvertOptions};
use image::RgbaImage;

/// Marker RGB identifying a data texture.
pub const MARKER: [u8; 3] = [12, 34, 56];
/// Marker alpha when vertex compression is on.
pub const ALPHA_COMPRESSED: u8 = 79;
/// Marker alpha when vertex compression is off.
pub const ALPHA_UNCOMPRESSED: u8 = 78;
/// Number of header pixels.
pub const HEADER_PIXELS: usize = 7;

/// Decoded header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub compressed: bool,
    pub texture_width: u32,
    pub texture_height: u32,
    /// Corners per frame (`faces * 4`).
    pub vertex_count: u32,
    pub frame_count: u32,
    pub texture_count: u8,
    pub duration: u32,
    pub auto_play: bool,
    pub easing: u8,
    pub interpolation: u8,
    pub positions_height: u32,
    pub uvs_height: u32,
    pub no_shadow: bool,
    pub auto_rotate: u8,
    pub visibility: u8,
    pub color_behavior: [ColorBehavior; 3],
}

impl Header {
    /// Collect header fields from a layout and the conversion options.
    pub fn new(layout: &Layout, options: &ConvertOptions) -> Self {
        Self {
            compressed: layout.compressed,
            texture_width: layout.width,
            texture_height: layout.texture_height,
            vertex_count: (layout.face_count * 4) as u32,
            frame_count: layout.frame_count as u32,
            texture_count: layout.texture_count as u8,
            duration: options.effective_duration(layout.frame_count),
            auto_play: options.auto_play,
            easing: options.easing,
            interpolation: options.interpolation,
            positions_height: layout.positions_height,
            uvs_height: layout.uvs_height,
            no_shadow: options.no_shadow,
            auto_rotate: options.auto_rotate,
            visibility: options.visibility,
            color_behavior: options.color_behavior,
        }
    }

    /// Packed color behavior value: `cb0 << 6 | cb1 << 3 | cb2`.
    pub fn color_behavior_value(&self) -> u16 {
        ColorBehavior::pack(self.color_behavior)
    }

    /// Encode into the seven header pixels.
    pub fn encode(&self) -> [[u8; 4]; HEADER_PIXELS] {
        let marker_alpha = if self.compressed {
            ALPHA_COMPRESSED
        } else {
            ALPHA_UNCOMPRESSED
        };
        let animation_flags = 128
            | (self.auto_play as u8) << 6
            | (self.easing & 3) << 4
            | (self.interpolation & 3) << 2;
        let color_value = self.color_behavior_value();
        let shader_flags = (self.no_shadow as u8) << 7
            | (self.auto_rotate & 3) << 5
            | (self.visibility & 7) << 2
            | (color_value >> 8) as u8;

        [
            [MARKER[0], MARKER[1], MARKER[2], marker_alpha],
            [
                (self.texture_width / 256) as u8,
                (self.texture_width % 256) as u8,
                (self.texture_height / 256) as u8,
                (self.texture_height % 256) as u8,
            ],
            self.vertex_count.to_be_bytes(),
            [
                (self.frame_count >> 16) as u8,
                (self.frame_count >> 8) as u8,
                self.frame_count as u8,
                self.texture_count,
            ],
            [
                (self.duration >> 16) as u8,
                (self.duration >> 8) as u8,
                self.duration as u8,
                animation_flags,
            ],
            [
                (self.positions_height / 256) as u8,
                (self.positions_height % 256) as u8,
                (self.uvs_height / 256) as u8,
                (self.uvs_height % 256) as u8,
            ],
            [shader_flags, (color_value % 256) as u8, 255, 255],
        ]
    }

    /// Decode the seven header pixels.
    pub fn decode(pixels: &[[u8; 4]; HEADER_PIXELS]) -> Result<Self> {
        let [marker, size, vertices, frames, animation, heights, shader] = *pixels;

        if marker[..3] != MARKER {
            return Err(EncoderError::Format(format!(
                "Not a data texture: header marker is {:?}",
                &marker[..3]
            )));
        }
        let compressed = match marker[3] {
            ALPHA_COMPRESSED => true,
            ALPHA_UNCOMPRESSED => false,
            other => {
                return Err(EncoderError::Format(format!(
                    "Unknown compression marker alpha {}",
                    other
                )))
            }
        };

        let color_value = ((shader[0] & 1) as u16) << 8 | shader[1] as u16;
        let mut color_behavior = [ColorBehavior::Pitch; 3];
        for (slot, shift) in color_behavior.iter_mut().zip([6u16, 3, 0]) {
            let code = ((color_value >> shift) & 7) as u8;
            *slot = ColorBehavior::from_index(code).ok_or_else(|| {
                EncoderError::Format(format!("Unknown color behavior code {}", code))
            })?;
        }

        Ok(Self {
            compressed,
            texture_width: size[0] as u32 * 256 + size[1] as u32,
            texture_height: size[2] as u32 * 256 + size[3] as u32,
            vertex_count: u32::from_be_bytes(vertices),
            frame_count: u32::from_be_bytes([0, frames[0], frames[1], frames[2]]),
            texture_count: frames[3],
            duration: u32::from_be_bytes([0, animation[0], animation[1], animation[2]]),
            auto_play: animation[3] >> 6 & 1 == 1,
            easing: animation[3] >> 4 & 3,
            interpolation: animation[3] >> 2 & 3,
            positions_height: heights[0] as u32 * 256 + heights[1] as u32,
            uvs_height: heights[2] as u32 * 256 + heights[3] as u32,
            no_shadow: shader[0] >> 7 == 1,
            auto_rotate: shader[0] >> 5 & 3,
            visibility: shader[0] >> 2 & 7,
            color_behavior,
        })
    }

    /// Write the header into row 0 of an image.
    pub fn write_to(&self, image: &mut RgbaImage) {
        for (x, pixel) in self.encode().into_iter().enumerate() {
            image.put_pixel(x as u32, 0, image::Rgba(pixel));
        }
    }

    /// Read the header from row 0 of an image.
    pub fn read_from(image: &RgbaImage) -> Result<Self> {
        if image.width() < HEADER_PIXELS as u32 || image.height() == 0 {
            return Err(EncoderError::Format(format!(
                "Image {}x{} is too small to hold a header",
                image.width(),
                image.height()
            )));
        }
        let mut pixels = [[0u8; 4]; HEADER_PIXELS];
        for (x, pixel) in pixels.iter_mut().enumerate() {
            *pixel = image.get_pixel(x as u32, 0).0;
        }
        Self::decode(&pixels)
    }
}
