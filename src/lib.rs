//! # Mesh Texture Encoder
//!
//! A Rust library for packing animated 3D meshes into data textures.
//!
//! ## Overview
//!
//! This library takes Wavefront OBJ or glTF/GLB meshes (one file per animation
//! frame) plus their source textures, and produces a PNG whose pixels encode
//! the geometry, together with a block model JSON that references it. A shader
//! on the consuming side rebuilds the mesh from the pixels at render time.
//!
//! ## Quick Start
//!
//! ```ignore
//! use mesh_texture_encoder::{convert_obj_files, write_output, ConvertOptions};
//!
//! let options = ConvertOptions::default().with_scale(2.0);
//! let output = convert_obj_files(&["walk_0.obj", "walk_1.obj"], &["skin.png"], &options)?;
//!
//! println!("{}", output.stats);
//! write_output("out", "walker", &output)?;
//! ```
//!
//! ## Library Integration
//!
//! To feed meshes from memory, build [`Mesh`] frames yourself and hand them to
//! a [`Converter`]:
//!
//! ```ignore
//! use mesh_texture_encoder::{Converter, ConvertOptions, Mesh, TextureData};
//!
//! let frames: Vec<Mesh> = /* ... */;
//! let texture = TextureData::solid(16, 16, [255, 255, 255, 255]);
//!
//! let output = Converter::new(ConvertOptions::default()).convert(&frames, vec![texture])?;
//! ```

pub mod convert;
pub mod encoder;
pub mod error;
pub mod mesher;
pub mod model;
pub mod source;
pub mod texture;
pub mod types;

// Re-export main types for convenience
pub use convert::{convert_gltf_files, convert_obj_files, write_output, ConvertOutput, ConvertStats, Converter};
pub use encoder::{encode_texture, EncodedTexture, Header, Layout};
pub use error::{EncoderError, Result};
pub use mesher::{index_frames, normalize_gltf, normalize_obj, IndexedData};
pub use model::{build_model, BlockModel};
pub use source::{parse_gltf, parse_obj, GltfMesh, ObjMesh};
pub use texture::{load_texture_from_bytes, TextureData, TextureSet};
pub use types::{ColorBehavior, Compression, ConvertOptions, Face, FaceVertex, Mesh};

/// Convert in-memory OBJ documents (one per frame) with encoded texture images.
pub fn convert_obj_bytes(sources: &[&str], textures: &[&[u8]], options: &ConvertOptions) -> Result<ConvertOutput> {
    let textures = decode_textures(textures)?;
    Converter::new(options.clone()).convert_obj_sources(sources, textures)
}

/// Convert in-memory glTF/GLB documents (one per frame) with encoded texture images.
///
/// External references cannot be resolved; use [`convert_gltf_files`] for those.
pub fn convert_gltf_bytes(sources: &[&[u8]], textures: &[&[u8]], options: &ConvertOptions) -> Result<ConvertOutput> {
    let textures = decode_textures(textures)?;
    Converter::new(options.clone()).convert_gltf_sources(sources, None, textures)
}

fn decode_textures(textures: &[&[u8]]) -> Result<Vec<TextureData>> {
    textures
        .iter()
        .map(|bytes| load_texture_from_bytes(bytes).map_err(EncoderError::from))
        .collect()
}

#[cfg(feature = "wasm")]
pub mod wasm;
