//! Ordered, size-checked collection of source textures.

use super::TextureData;
use crate::error::{EncoderError, Result};

/// Smallest allowed texture edge. The header row needs seven pixels.
pub const MIN_TEXTURE_SIZE: u32 = 8;

/// Source textures sharing one size, in layer order.
#[derive(Debug, Clone)]
pub struct TextureSet {
    textures: Vec<TextureData>,
    width: u32,
    height: u32,
}

impl TextureSet {
    /// Validate and wrap a list of textures.
    pub fn new(textures: Vec<TextureData>) -> Result<Self> {
        let first = textures.first().ok_or(EncoderError::MissingTexture)?;
        let (width, height) = (first.width, first.height);

        if width < MIN_TEXTURE_SIZE || height < MIN_TEXTURE_SIZE {
            return Err(EncoderError::TextureSize(format!(
                "texture 0 is {}x{}, minimum is {}x{}",
                width, height, MIN_TEXTURE_SIZE, MIN_TEXTURE_SIZE
            )));
        }

        for (index, texture) in textures.iter().enumerate().skip(1) {
            if texture.width != width || texture.height != height {
                return Err(EncoderError::TextureSize(format!(
                    "texture {} is {}x{}, expected {}x{} like texture 0",
                    index, texture.width, texture.height, width, height
                )));
            }
        }

        for (index, texture) in textures.iter().enumerate() {
            let expected = (texture.width * texture.height * 4) as usize;
            if texture.pixels.len() != expected {
                return Err(EncoderError::TextureSize(format!(
                    "texture {} has {} bytes of pixel data, expected {}",
                    index,
                    texture.pixels.len(),
                    expected
                )));
            }
        }

        Ok(Self {
            textures,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextureData> {
        self.textures.iter()
    }
}
