//! Conversion pipeline: sources → canonical frames → indexed data → data texture + model.

use crate::encoder::{encode_texture, EncodedTexture};
use crate::error::{EncoderError, Result};
use crate::mesher::{check_frames, index_frames, normalize_gltf, normalize_obj};
use crate::model::{build_model, BlockModel};
use crate::source::{parse_gltf, parse_obj, GltfMesh};
use crate::texture::{load_texture_from_bytes, TextureData, TextureSet};
use crate::types::{ConvertOptions, Mesh};
use std::fmt;
use std::path::Path;

/// Summary of one conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertStats {
    pub face_count: usize,
    /// Corners per frame (`face_count * 4`).
    pub vertex_count: usize,
    pub position_count: usize,
    pub uv_count: usize,
    pub frame_count: usize,
    pub texture_count: usize,
    pub width: u32,
    pub height: u32,
    pub compressed: bool,
}

impl fmt::Display for ConvertStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Faces:      {}", self.face_count)?;
        writeln!(f, "Vertices:   {} per frame", self.vertex_count)?;
        writeln!(f, "Positions:  {}", self.position_count)?;
        writeln!(f, "UVs:        {}", self.uv_count)?;
        writeln!(f, "Frames:     {}", self.frame_count)?;
        writeln!(f, "Textures:   {}", self.texture_count)?;
        writeln!(f, "Output:     {}x{}", self.width, self.height)?;
        write!(
            f,
            "Compressed: {}",
            if self.compressed { "yes" } else { "no" }
        )
    }
}

/// Result of a conversion: the block model, PNG bytes and stats.
#[derive(Debug, Clone)]
pub struct ConvertOutput {
    pub model: BlockModel,
    pub png: Vec<u8>,
    pub stats: ConvertStats,
}

impl ConvertOutput {
    /// Model as pretty JSON.
    pub fn model_json(&self) -> Result<String> {
        Ok(self.model.to_json()?)
    }
}

/// Runs conversions with a fixed set of options.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert canonical frames with their source textures.
    pub fn convert(&self, frames: &[Mesh], textures: Vec<TextureData>) -> Result<ConvertOutput> {
        self.options.validate()?;
        let data = index_frames(frames)?;
        let textures = TextureSet::new(textures)?;
        let encoded = encode_texture(&data, &textures, &self.options)?;
        self.finish(&encoded, data.positions.len(), data.uvs.len())
    }

    /// Convert OBJ documents, one per frame.
    pub fn convert_obj_sources(&self, sources: &[&str], textures: Vec<TextureData>) -> Result<ConvertOutput> {
        self.options.validate()?;
        let frames = sources
            .iter()
            .map(|text| parse_obj(text).map(|obj| normalize_obj(&obj)))
            .collect::<Result<Vec<_>>>()?;
        tracing::info!("Parsed {} OBJ frame(s)", frames.len());
        self.convert(&frames, textures)
    }

    /// Convert glTF/GLB documents, one per frame.
    ///
    /// With no textures given and `use_embedded_textures` set, the images
    /// embedded in the first document are used instead.
    pub fn convert_gltf_sources(
        &self,
        sources: &[&[u8]],
        base_dir: Option<&Path>,
        textures: Vec<TextureData>,
    ) -> Result<ConvertOutput> {
        self.options.validate()?;
        let documents = sources
            .iter()
            .map(|data| parse_gltf(data, base_dir))
            .collect::<Result<Vec<_>>>()?;
        let frames = documents
            .iter()
            .map(normalize_gltf)
            .collect::<Result<Vec<_>>>()?;
        tracing::info!("Parsed {} glTF frame(s)", frames.len());

        // Surface frame mismatches before touching images.
        check_frames(&frames)?;

        let textures = if textures.is_empty() && self.options.use_embedded_textures {
            match documents.first() {
                Some(document) => embedded_textures(document)?,
                None => Vec::new(),
            }
        } else {
            textures
        };

        self.convert(&frames, textures)
    }

    fn finish(&self, encoded: &EncodedTexture, position_count: usize, uv_count: usize) -> Result<ConvertOutput> {
        let layout = &encoded.layout;
        let model = build_model(layout, &self.options.texture_name);
        let png = encoded.to_png()?;

        let stats = ConvertStats {
            face_count: layout.face_count,
            vertex_count: layout.face_count * 4,
            position_count,
            uv_count,
            frame_count: layout.frame_count,
            texture_count: layout.texture_count,
            width: encoded.width(),
            height: encoded.height(),
            compressed: layout.compressed,
        };
        tracing::info!(
            "Encoded {} faces over {} frame(s) into {}x{}",
            stats.face_count,
            stats.frame_count,
            stats.width,
            stats.height
        );

        Ok(ConvertOutput { model, png, stats })
    }
}

/// Decode the images embedded in a glTF document, in image order.
///
/// Images that fail to decode are skipped with a warning.
fn embedded_textures(document: &GltfMesh) -> Result<Vec<TextureData>> {
    let mut textures = Vec::with_capacity(document.images.len());
    for image in &document.images {
        match load_texture_from_bytes(&image.data) {
            Ok(texture) => textures.push(texture),
            Err(e) => tracing::warn!(
                image = image.index,
                mime_type = image.mime_type.as_deref().unwrap_or("unknown"),
                "Skipping embedded image: {}",
                e
            ),
        }
    }
    if textures.is_empty() {
        return Err(EncoderError::MissingTexture);
    }
    tracing::debug!("Using {} embedded texture(s)", textures.len());
    Ok(textures)
}

/// Convert OBJ files (one per frame) with texture files.
pub fn convert_obj_files<P: AsRef<Path>, T: AsRef<Path>>(
    paths: &[P],
    texture_paths: &[T],
    options: &ConvertOptions,
) -> Result<ConvertOutput> {
    let sources = paths
        .iter()
        .map(std::fs::read_to_string)
        .collect::<std::io::Result<Vec<_>>>()?;
    let sources: Vec<&str> = sources.iter().map(String::as_str).collect();
    let textures = load_texture_files(texture_paths)?;
    Converter::new(options.clone()).convert_obj_sources(&sources, textures)
}

/// Convert glTF/GLB files (one per frame) with optional texture files.
///
/// External references resolve against the first file's directory.
pub fn convert_gltf_files<P: AsRef<Path>, T: AsRef<Path>>(
    paths: &[P],
    texture_paths: &[T],
    options: &ConvertOptions,
) -> Result<ConvertOutput> {
    let sources = paths
        .iter()
        .map(std::fs::read)
        .collect::<std::io::Result<Vec<_>>>()?;
    let sources: Vec<&[u8]> = sources.iter().map(Vec::as_slice).collect();
    let base_dir = paths.first().and_then(|p| p.as_ref().parent());
    let textures = load_texture_files(texture_paths)?;
    Converter::new(options.clone()).convert_gltf_sources(&sources, base_dir, textures)
}

fn load_texture_files<T: AsRef<Path>>(paths: &[T]) -> Result<Vec<TextureData>> {
    paths
        .iter()
        .map(|path| -> Result<TextureData> {
            let bytes = std::fs::read(path)?;
            Ok(load_texture_from_bytes(&bytes)?)
        })
        .collect()
}

/// Write `<name>.json` and `<name>.png` into `dir`.
pub fn write_output<P: AsRef<Path>>(dir: P, name: &str, output: &ConvertOutput) -> Result<()> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    std::fs::write(dir.join(format!("{}.json", name)), output.model_json()?)?;
    std::fs::write(dir.join(format!("{}.png", name)), &output.png)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::Header;
    use crate::source::gltf::tests::{encode_base64, quad_buffer, quad_document, quad_glb};
    use crate::types::Compression;
    use image::ImageEncoder;

    const CUBE_OBJ: &str = "\
v -0.5 -0.5 -0.5
v 0.5 -0.5 -0.5
v 0.5 0.5 -0.5
v -0.5 0.5 -0.5
v -0.5 -0.5 0.5
v 0.5 -0.5 0.5
v 0.5 0.5 0.5
v -0.5 0.5 0.5
vt 0 0
vt 1 0
vt 1 1
vt 0 1
f 1/1 2/2 3/3
f 1/1 3/3 4/4
f 5/1 6/2 7/3
f 5/1 7/3 8/4
f 1/1 2/2 6/3
f 1/1 6/3 5/4
f 4/1 3/2 7/3
f 4/1 7/3 8/4
";

    fn texture() -> TextureData {
        TextureData::solid(8, 8, [200, 100, 50, 255])
    }

    fn png_bytes(texture: &TextureData) -> Vec<u8> {
        let mut bytes = Vec::new();
        image::codecs::png::PngEncoder::new(&mut bytes)
            .write_image(&texture.pixels, texture.width, texture.height, image::ExtendedColorType::Rgba8)
            .unwrap();
        bytes
    }

    fn decode(output: &ConvertOutput) -> image::RgbaImage {
        image::load_from_memory(&output.png).unwrap().to_rgba8()
    }

    #[test]
    fn test_cube_obj() {
        let converter = Converter::default();
        let output = converter.convert_obj_sources(&[CUBE_OBJ], vec![texture()]).unwrap();

        assert_eq!(output.stats.face_count, 8);
        assert_eq!(output.stats.vertex_count, 32);
        assert!(output.stats.position_count <= 8);
        assert_eq!(output.stats.uv_count, 4);
        assert_eq!(output.stats.width, 8);
        assert!(output.stats.compressed);
        assert_eq!(output.model.face_count(), 8);

        let image = decode(&output);
        assert_eq!(image.get_pixel(0, 0).0, [12, 34, 56, 79]);
        let header = Header::read_from(&image).unwrap();
        assert_eq!(header.vertex_count, 32);
        assert_eq!(header.frame_count, 1);
        assert_eq!(header.duration, 1);
    }

    #[test]
    fn test_frame_mismatch() {
        let short = CUBE_OBJ.lines().take(CUBE_OBJ.lines().count() - 1).collect::<Vec<_>>().join("\n");

        let err = Converter::default()
            .convert_obj_sources(&[CUBE_OBJ, short.as_str()], vec![texture()])
            .unwrap_err();
        match err {
            EncoderError::FrameMismatch { frame, expected, found } => {
                assert_eq!((frame, expected, found), (1, 8, 7));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_animation_frames() {
        let moved = CUBE_OBJ.replace("v 0.5 0.5 0.5", "v 0.75 0.75 0.75");
        let output = Converter::default()
            .convert_obj_sources(&[CUBE_OBJ, moved.as_str()], vec![texture()])
            .unwrap();

        assert_eq!(output.stats.frame_count, 2);
        assert_eq!(output.stats.vertex_count, 32);
        assert_eq!(output.stats.position_count, 9);
        let header = Header::read_from(&decode(&output)).unwrap();
        assert_eq!(header.frame_count, 2);
        assert_eq!(header.duration, 2);
    }

    #[test]
    fn test_deterministic_output() {
        let converter = Converter::new(ConvertOptions::default().with_compression(Compression::Off));
        let first = converter.convert_obj_sources(&[CUBE_OBJ], vec![texture()]).unwrap();
        let second = converter.convert_obj_sources(&[CUBE_OBJ], vec![texture()]).unwrap();

        assert_eq!(first.png, second.png);
        assert_eq!(first.model_json().unwrap(), second.model_json().unwrap());
        assert_eq!(decode(&first).get_pixel(0, 0).0[3], 78);
    }

    #[test]
    fn test_missing_texture() {
        let err = Converter::default().convert_obj_sources(&[CUBE_OBJ], Vec::new()).unwrap_err();
        assert!(matches!(err, EncoderError::MissingTexture));
    }

    #[test]
    fn test_invalid_options_rejected_first() {
        let options = ConvertOptions {
            easing: 9,
            ..Default::default()
        };
        let err = Converter::new(options).convert_obj_sources(&["garbage"], Vec::new()).unwrap_err();
        assert!(matches!(err, EncoderError::InvalidOption(_)));
    }

    #[test]
    fn test_gltf_with_given_texture() {
        let glb = quad_glb();
        let output = Converter::default()
            .convert_gltf_sources(&[glb.as_slice()], None, vec![texture()])
            .unwrap();
        assert_eq!(output.stats.face_count, 2);
        assert_eq!(output.stats.position_count, 4);
        assert_eq!(output.stats.uv_count, 4);
    }

    #[test]
    fn test_gltf_embedded_texture() {
        let png = png_bytes(&TextureData::solid(16, 8, [1, 2, 3, 255]));
        let buffer_uri = format!("data:application/octet-stream;base64,{}", encode_base64(&quad_buffer()));
        let mut document = quad_document(Some(buffer_uri.as_str()), None);
        document["images"] = serde_json::json!([{ "uri": format!("data:image/png;base64,{}", encode_base64(&png)) }]);
        let bytes = document.to_string().into_bytes();

        let output = Converter::default()
            .convert_gltf_sources(&[bytes.as_slice()], None, Vec::new())
            .unwrap();
        assert_eq!(output.stats.width, 16);
        assert_eq!(output.stats.texture_count, 1);

        let options = ConvertOptions {
            use_embedded_textures: false,
            ..Default::default()
        };
        let err = Converter::new(options)
            .convert_gltf_sources(&[bytes.as_slice()], None, Vec::new())
            .unwrap_err();
        assert!(matches!(err, EncoderError::MissingTexture));
    }

    #[test]
    fn test_undecodable_embedded_image_is_skipped() {
        let png = png_bytes(&TextureData::solid(8, 8, [1, 2, 3, 255]));
        let buffer_uri = format!("data:application/octet-stream;base64,{}", encode_base64(&quad_buffer()));
        let mut document = quad_document(Some(buffer_uri.as_str()), None);
        document["images"] = serde_json::json!([
            { "uri": format!("data:image/webp;base64,{}", encode_base64(b"not an image")) },
            { "uri": format!("data:image/png;base64,{}", encode_base64(&png)) }
        ]);
        let bytes = document.to_string().into_bytes();

        let output = Converter::default()
            .convert_gltf_sources(&[bytes.as_slice()], None, Vec::new())
            .unwrap();
        assert_eq!(output.stats.texture_count, 1);

        document["images"] = serde_json::json!([
            { "uri": format!("data:image/webp;base64,{}", encode_base64(b"not an image")) }
        ]);
        let bytes = document.to_string().into_bytes();
        let err = Converter::default()
            .convert_gltf_sources(&[bytes.as_slice()], None, Vec::new())
            .unwrap_err();
        assert!(matches!(err, EncoderError::MissingTexture));
    }

    #[test]
    fn test_stats_display() {
        let output = Converter::default().convert_obj_sources(&[CUBE_OBJ], vec![texture()]).unwrap();
        let text = output.stats.to_string();
        assert!(text.contains("Faces:      8"));
        assert!(text.contains("Compressed: yes"));
    }

    #[test]
    fn test_write_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = Converter::default().convert_obj_sources(&[CUBE_OBJ], vec![texture()]).unwrap();
        write_output(dir.path(), "cube", &output).unwrap();

        assert!(dir.path().join("cube.json").exists());
        assert_eq!(std::fs::read(dir.path().join("cube.png")).unwrap(), output.png);
    }
}
