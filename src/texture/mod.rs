//! Source texture loading and validation.

mod set;

pub use set::{TextureSet, MIN_TEXTURE_SIZE};

use image::RgbaImage;

/// Raw texture data decoded from PNG or JPEG.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    /// Texture width in pixels.
    pub width: u32,
    /// Texture height in pixels.
    pub height: u32,
    /// RGBA8 pixel data (4 bytes per pixel).
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// Create a new texture from RGBA data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a texture filled with one color.
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixels = (0..width * height)
            .flat_map(|_| color.iter().copied())
            .collect();
        Self::new(width, height, pixels)
    }

    /// Get a pixel at (x, y).
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }
}

impl From<RgbaImage> for TextureData {
    fn from(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(width, height, image.into_raw())
    }
}

/// Load a texture from PNG or JPEG bytes.
pub fn load_texture_from_bytes(data: &[u8]) -> Result<TextureData, image::ImageError> {
    let img = image::load_from_memory(data)?;
    Ok(TextureData::from(img.to_rgba8()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageEncoder;

    #[test]
    fn test_get_pixel() {
        let tex = TextureData::new(2, 2, vec![255, 0, 0, 255, 0, 255, 0, 255, 0, 0, 255, 255, 255, 255, 255, 255]);

        assert_eq!(tex.get_pixel(0, 0), [255, 0, 0, 255]); // Red
        assert_eq!(tex.get_pixel(1, 0), [0, 255, 0, 255]); // Green
        assert_eq!(tex.get_pixel(0, 1), [0, 0, 255, 255]); // Blue
        assert_eq!(tex.get_pixel(1, 1), [255, 255, 255, 255]); // White
    }

    #[test]
    fn test_load_png_round_trip() {
        let source = TextureData::solid(8, 4, [10, 20, 30, 255]);
        let mut bytes = Vec::new();
        image::codecs::png::PngEncoder::new(&mut bytes)
            .write_image(&source.pixels, 8, 4, image::ExtendedColorType::Rgba8)
            .unwrap();

        let loaded = load_texture_from_bytes(&bytes).unwrap();
        assert_eq!(loaded, source);
    }

    #[test]
    fn test_load_garbage_fails() {
        assert!(load_texture_from_bytes(b"not an image").is_err());
    }
}
