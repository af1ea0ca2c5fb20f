//! Data texture encoder.
//!
//! Lays out an [`IndexedData`] and its source textures into one RGBA image.
//! See [`layout`] for the row order and [`header`] for the header row.

pub mod header;
pub mod layout;
pub mod pixel;

pub use header::Header;
pub use layout::{Layout, LayoutParams};

use crate::error::{EncoderError, Result};
use crate::mesher::IndexedData;
use crate::texture::TextureSet;
use crate::types::{Compression, ConvertOptions};
use image::{ImageEncoder, Rgba, RgbaImage};

/// A fully populated data texture.
#[derive(Debug, Clone)]
pub struct EncodedTexture {
    pub image: RgbaImage,
    pub layout: Layout,
    pub header: Header,
}

impl EncodedTexture {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Encode the image as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let cursor = std::io::Cursor::new(&mut bytes);
        let encoder = image::codecs::png::PngEncoder::new(cursor);

        encoder.write_image(
            self.image.as_raw(),
            self.image.width(),
            self.image.height(),
            image::ExtendedColorType::Rgba8,
        )?;

        Ok(bytes)
    }
}

/// Encode indexed geometry and its textures into a data texture.
pub fn encode_texture(
    data: &IndexedData,
    textures: &TextureSet,
    options: &ConvertOptions,
) -> Result<EncodedTexture> {
    if textures.len() > u8::MAX as usize {
        return Err(EncoderError::TextureSize(format!(
            "{} textures given, at most {} fit the header",
            textures.len(),
            u8::MAX
        )));
    }
    if data.frame_count as u32 > ConvertOptions::MAX_24_BIT {
        return Err(EncoderError::Format(format!(
            "{} frames exceed the 24-bit frame counter",
            data.frame_count
        )));
    }

    for (table, len) in [("position", data.positions.len()), ("UV", data.uvs.len())] {
        if len > pixel::MAX_TABLE_ENTRIES {
            return Err(EncoderError::Format(format!(
                "{} distinct {} entries exceed the 24-bit index range",
                len, table
            )));
        }
    }

    let compressed = options.compression.resolve(data.uvs.len());
    if compressed && data.uvs.len() > Compression::MAX_COMPRESSED_UVS {
        tracing::warn!(
            "Compression forced with {} distinct UVs; indices above {} will alias",
            data.uvs.len(),
            Compression::MAX_COMPRESSED_UVS
        );
    }

    let layout = Layout::compute(LayoutParams {
        width: textures.width(),
        texture_height: textures.height(),
        texture_count: textures.len(),
        face_count: data.face_count,
        frame_count: data.frame_count,
        position_count: data.positions.len(),
        uv_count: data.uvs.len(),
        vertex_count: data.vertices.len(),
        compressed,
        pad_to_power_of_two: options.pad_to_power_of_two,
    });
    layout.check_limits()?;

    tracing::debug!(
        "Data texture layout {}x{} (faces {}, frames {}, positions {}, uvs {}, compressed {})",
        layout.width,
        layout.height,
        layout.face_count,
        layout.frame_count,
        data.positions.len(),
        data.uvs.len(),
        compressed
    );

    let header = Header::new(&layout, options);
    let mut image = RgbaImage::new(layout.width, layout.height);
    header.write_to(&mut image);

    for face in 0..layout.face_count {
        let (col, row) = layout.face_lookup_pixel(face);
        image.put_pixel(
            col,
            row,
            Rgba([(col >> 8) as u8, col as u8, (row >> 8) as u8, row as u8]),
        );
    }

    write_textures(&mut image, &layout, textures, options.flip_uv);

    let mut positions = SectionWriter::new(&mut image, &layout, layout.positions_start());
    for position in &data.positions {
        for (axis, value) in position.iter().enumerate() {
            positions.push(pixel::encode_position(*value, options.scale, options.offset[axis]));
        }
    }

    let mut uvs = SectionWriter::new(&mut image, &layout, layout.uvs_start());
    for uv in &data.uvs {
        uvs.push(pixel::encode_uv(uv[0]));
        uvs.push(pixel::encode_uv(uv[1]));
    }

    let mut vertices = SectionWriter::new(&mut image, &layout, layout.vertices_start());
    for &[position_index, uv_index] in &data.vertices {
        if compressed {
            vertices.push(pixel::encode_compressed_vertex(position_index, uv_index));
        } else {
            vertices.push(pixel::encode_index(position_index));
            vertices.push(pixel::encode_index(uv_index));
        }
    }

    Ok(EncodedTexture {
        image,
        layout,
        header,
    })
}

/// Copy every source texture into its band, flipping vertically unless `flip_uv`.
fn write_textures(image: &mut RgbaImage, layout: &Layout, textures: &TextureSet, flip_uv: bool) {
    let height = textures.height();
    for (band, texture) in textures.iter().enumerate() {
        let top = layout.textures_start() + band as u32 * height;
        for y in 0..height {
            let source_y = if flip_uv { y } else { height - 1 - y };
            for x in 0..textures.width() {
                image.put_pixel(x, top + y, Rgba(texture.get_pixel(x, source_y)));
            }
        }
    }
}

/// Sequential pixel writer for one section.
struct SectionWriter<'a> {
    image: &'a mut RgbaImage,
    layout: &'a Layout,
    start_row: u32,
    next: usize,
}

impl<'a> SectionWriter<'a> {
    fn new(image: &'a mut RgbaImage, layout: &'a Layout, start_row: u32) -> Self {
        Self {
            image,
            layout,
            start_row,
            next: 0,
        }
    }

    fn push(&mut self, pixel: [u8; 4]) {
        let (x, y) = self.layout.section_pixel(self.start_row, self.next);
        self.image.put_pixel(x, y, Rgba(pixel));
        self.next += 1;
    }
}
