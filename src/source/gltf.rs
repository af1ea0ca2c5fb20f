//! glTF 2.0 document reading (JSON or GLB).
//!
//! Produces one [`GltfPrimitive`] per `TRIANGLES` primitive, in document order,
//! plus any embedded images that may serve as textures.

use super::accessor::{read_accessor, AccessorData};
use super::data_uri::{decode_data_uri, is_data_uri, media_type};
use super::glb::{is_glb, read_glb};
use crate::error::{EncoderError, Result};
use gltf_json as json;
use json::mesh::{Mode, Semantic};
use json::validation::Checked;
use std::path::Path;

/// Vertex data of one triangle-list primitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GltfPrimitive {
    pub positions: Vec<[f64; 3]>,
    pub normals: Option<Vec<[f64; 3]>>,
    pub uvs: Option<Vec<[f64; 2]>>,
    /// Triangle-list indices; `None` for non-indexed geometry.
    pub indices: Option<Vec<u32>>,
}

/// An image blob found inside (or next to) a glTF document.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedImage {
    pub index: usize,
    pub mime_type: Option<String>,
    pub data: Vec<u8>,
}

/// Parsed glTF data before normalization.
#[derive(Debug, Clone, Default)]
pub struct GltfMesh {
    pub primitives: Vec<GltfPrimitive>,
    pub images: Vec<EmbeddedImage>,
}

impl GltfMesh {
    /// Total vertices across all primitives.
    pub fn vertex_count(&self) -> usize {
        self.primitives.iter().map(|p| p.positions.len()).sum()
    }
}

/// Parse glTF JSON or GLB bytes.
///
/// External `uri` references resolve against `base_dir`. Without one, an
/// external buffer is an error and an external image is skipped.
pub fn parse_gltf(data: &[u8], base_dir: Option<&Path>) -> Result<GltfMesh> {
    let (json_bytes, bin) = if looks_like_json(data) {
        (data, None)
    } else {
        let chunks = read_glb(data)?;
        (chunks.json, chunks.bin)
    };

    let root: json::Root = serde_json::from_slice(json_bytes)
        .map_err(|e| EncoderError::Format(format!("Invalid glTF JSON: {}", e)))?;

    let buffers = load_buffers(&root, bin, base_dir)?;

    let mut primitives = Vec::new();
    for (mesh_index, mesh) in root.meshes.iter().enumerate() {
        for (primitive_index, primitive) in mesh.primitives.iter().enumerate() {
            match primitive.mode {
                Checked::Valid(Mode::Triangles) => {}
                ref other => {
                    tracing::warn!(
                        mesh = mesh_index,
                        primitive = primitive_index,
                        "Skipping primitive with unsupported mode {:?} (only TRIANGLES is supported)",
                        other
                    );
                    continue;
                }
            }

            if let Some(read) = read_primitive(&root, &buffers, primitive, mesh_index, primitive_index)? {
                primitives.push(read);
            }
        }
    }

    let images = load_images(&root, &buffers, base_dir);

    tracing::debug!(
        primitives = primitives.len(),
        images = images.len(),
        "Parsed glTF document"
    );

    Ok(GltfMesh { primitives, images })
}

fn looks_like_json(data: &[u8]) -> bool {
    !is_glb(data)
        && data
            .iter()
            .find(|b| !b.is_ascii_whitespace())
            .is_some_and(|&b| b == b'{')
}

fn read_primitive(
    root: &json::Root,
    buffers: &[Vec<u8>],
    primitive: &json::mesh::Primitive,
    mesh_index: usize,
    primitive_index: usize,
) -> Result<Option<GltfPrimitive>> {
    let attribute = |semantic: Semantic| -> Result<Option<AccessorData>> {
        primitive
            .attributes
            .get(&Checked::Valid(semantic))
            .map(|index| read_accessor(root, buffers, index.value()))
            .transpose()
    };

    let Some(positions) = attribute(Semantic::Positions)? else {
        tracing::warn!(
            mesh = mesh_index,
            primitive = primitive_index,
            "Skipping primitive without POSITION"
        );
        return Ok(None);
    };
    let positions = positions.to_arrays::<3>();

    let normals = attribute(Semantic::Normals)?.map(|n| n.to_arrays::<3>());
    let uvs = attribute(Semantic::TexCoords(0))?.map(|t| t.to_arrays::<2>());
    let indices = primitive
        .indices
        .as_ref()
        .map(|index| read_accessor(root, buffers, index.value()))
        .transpose()?
        .map(|i| i.to_indices());

    Ok(Some(GltfPrimitive {
        positions,
        normals,
        uvs,
        indices,
    }))
}

/// Resolve every buffer to bytes: the GLB BIN chunk, a data URI or a file.
fn load_buffers(root: &json::Root, bin: Option<&[u8]>, base_dir: Option<&Path>) -> Result<Vec<Vec<u8>>> {
    let mut buffers = Vec::with_capacity(root.buffers.len());

    for (index, buffer) in root.buffers.iter().enumerate() {
        let data = match buffer.uri.as_deref() {
            None => bin
                .filter(|_| index == 0)
                .map(<[u8]>::to_vec)
                .ok_or_else(|| {
                    EncoderError::Format(format!("Buffer {} has no uri and no GLB BIN chunk", index))
                })?,
            Some(uri) if is_data_uri(uri) => decode_data_uri(uri)?,
            Some(uri) => {
                let base = base_dir.ok_or_else(|| {
                    EncoderError::Format(format!(
                        "Buffer {} references external file '{}' but no base directory was given",
                        index, uri
                    ))
                })?;
                std::fs::read(base.join(uri))?
            }
        };

        let declared = usize::try_from(buffer.byte_length.0).unwrap_or(usize::MAX);
        if data.len() < declared {
            return Err(EncoderError::Format(format!(
                "Buffer {} holds {} bytes, declared {}",
                index,
                data.len(),
                declared
            )));
        }
        buffers.push(data);
    }

    Ok(buffers)
}

/// Collect image blobs. Unresolvable images are skipped with a warning.
fn load_images(root: &json::Root, buffers: &[Vec<u8>], base_dir: Option<&Path>) -> Vec<EmbeddedImage> {
    let mut images = Vec::new();

    for (index, image) in root.images.iter().enumerate() {
        let declared_mime = image.mime_type.as_ref().map(|m| m.0.clone());

        let resolved = if let Some(view) = image.buffer_view.as_ref() {
            buffer_view_bytes(root, buffers, view.value()).map(|data| (data, declared_mime))
        } else if let Some(uri) = image.uri.as_deref() {
            if is_data_uri(uri) {
                let mime = declared_mime.or_else(|| media_type(uri).map(str::to_string));
                decode_data_uri(uri).map(|data| (data, mime))
            } else if let Some(base) = base_dir {
                std::fs::read(base.join(uri))
                    .map(|data| (data, declared_mime))
                    .map_err(EncoderError::from)
            } else {
                Err(EncoderError::Format(format!(
                    "external image '{}' needs a base directory",
                    uri
                )))
            }
        } else {
            Err(EncoderError::Format("image has neither bufferView nor uri".to_string()))
        };

        match resolved {
            Ok((data, mime_type)) => images.push(EmbeddedImage {
                index,
                mime_type,
                data,
            }),
            Err(e) => tracing::warn!(image = index, "Skipping glTF image: {}", e),
        }
    }

    images
}

fn buffer_view_bytes(root: &json::Root, buffers: &[Vec<u8>], view_index: usize) -> Result<Vec<u8>> {
    let view = root
        .buffer_views
        .get(view_index)
        .ok_or_else(|| EncoderError::Format(format!("buffer view {} does not exist", view_index)))?;
    let buffer = buffers
        .get(view.buffer.value())
        .ok_or_else(|| EncoderError::Format(format!("buffer {} does not exist", view.buffer.value())))?;

    let start = usize::try_from(view.byte_offset.map_or(0, |o| o.0)).ok();
    let length = usize::try_from(view.byte_length.0).ok();
    let range = start.zip(length).and_then(|(start, length)| Some(start..start.checked_add(length)?));
    range
        .and_then(|range| buffer.get(range))
        .map(<[u8]>::to_vec)
        .ok_or_else(|| EncoderError::Format(format!("buffer view {} is out of bounds", view_index)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::source::glb::write_glb;
    use base64::{prelude::BASE64_STANDARD, Engine};

    /// A unit quad as two indexed triangles, with UVs, packed into one buffer.
    pub(crate) fn quad_buffer() -> Vec<u8> {
        let mut bin = Vec::new();
        for v in [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0] {
            bin.extend_from_slice(&v.to_le_bytes());
        }
        for v in [0.0f32, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0] {
            bin.extend_from_slice(&v.to_le_bytes());
        }
        for i in [0u16, 1, 2, 0, 2, 3] {
            bin.extend_from_slice(&i.to_le_bytes());
        }
        bin
    }

    pub(crate) fn quad_document(buffer_uri: Option<&str>, extra_mode: Option<u32>) -> serde_json::Value {
        let mut buffer = serde_json::json!({ "byteLength": 92 });
        if let Some(uri) = buffer_uri {
            buffer["uri"] = serde_json::Value::from(uri);
        }

        let mut primitives = vec![serde_json::json!({
            "attributes": { "POSITION": 0, "TEXCOORD_0": 1 },
            "indices": 2
        })];
        if let Some(mode) = extra_mode {
            primitives.push(serde_json::json!({
                "attributes": { "POSITION": 0 },
                "mode": mode
            }));
        }

        serde_json::json!({
            "asset": { "version": "2.0" },
            "buffers": [buffer],
            "bufferViews": [
                { "buffer": 0, "byteOffset": 0, "byteLength": 48 },
                { "buffer": 0, "byteOffset": 48, "byteLength": 32 },
                { "buffer": 0, "byteOffset": 80, "byteLength": 12 }
            ],
            "accessors": [
                { "bufferView": 0, "componentType": 5126, "count": 4, "type": "VEC3" },
                { "bufferView": 1, "componentType": 5126, "count": 4, "type": "VEC2" },
                { "bufferView": 2, "componentType": 5123, "count": 6, "type": "SCALAR" }
            ],
            "meshes": [{ "primitives": primitives }]
        })
    }

    pub(crate) fn quad_glb() -> Vec<u8> {
        let doc = quad_document(None, None);
        write_glb(doc.to_string().as_bytes(), Some(quad_buffer().as_slice()))
    }

    pub(crate) fn encode_base64(bytes: &[u8]) -> String {
        BASE64_STANDARD.encode(bytes)
    }

    #[test]
    fn test_parse_glb_quad() {
        let mesh = parse_gltf(&quad_glb(), None).unwrap();
        assert_eq!(mesh.primitives.len(), 1);

        let primitive = &mesh.primitives[0];
        assert_eq!(primitive.positions.len(), 4);
        assert_eq!(primitive.positions[2], [1.0, 1.0, 0.0]);
        assert_eq!(primitive.uvs.as_ref().unwrap()[1], [1.0, 0.0]);
        assert_eq!(primitive.indices, Some(vec![0, 1, 2, 0, 2, 3]));
        assert!(primitive.normals.is_none());
    }

    #[test]
    fn test_parse_json_with_data_uri() {
        let uri = format!("data:application/octet-stream;base64,{}", encode_base64(&quad_buffer()));
        let doc = quad_document(Some(uri.as_str()), None);

        let mesh = parse_gltf(doc.to_string().as_bytes(), None).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.primitives[0].indices.as_ref().unwrap().len(), 6);
    }

    #[test]
    fn test_external_buffer_resolves_against_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("quad.bin"), quad_buffer()).unwrap();
        let doc = quad_document(Some("quad.bin"), None);

        let mesh = parse_gltf(doc.to_string().as_bytes(), Some(dir.path())).unwrap();
        assert_eq!(mesh.vertex_count(), 4);

        let err = parse_gltf(doc.to_string().as_bytes(), None).unwrap_err();
        assert!(matches!(err, EncoderError::Format(_)));
    }

    #[test]
    fn test_non_triangle_modes_are_skipped() {
        // Mode 1 = LINES
        let doc = quad_document(None, Some(1));
        let glb = write_glb(doc.to_string().as_bytes(), Some(quad_buffer().as_slice()));

        let mesh = parse_gltf(&glb, None).unwrap();
        assert_eq!(mesh.primitives.len(), 1);
    }

    #[test]
    fn test_embedded_image_from_buffer_view() {
        let mut bin = quad_buffer();
        let image_bytes = [0x89u8, b'P', b'N', b'G'];
        bin.extend_from_slice(&image_bytes);

        let mut doc = quad_document(None, None);
        doc["buffers"][0]["byteLength"] = serde_json::Value::from(96);
        doc["bufferViews"]
            .as_array_mut()
            .unwrap()
            .push(serde_json::json!({ "buffer": 0, "byteOffset": 92, "byteLength": 4 }));
        doc["images"] = serde_json::json!([
            { "bufferView": 3, "mimeType": "image/png" },
            { "uri": "missing.png" }
        ]);
        let glb = write_glb(doc.to_string().as_bytes(), Some(bin.as_slice()));

        let mesh = parse_gltf(&glb, None).unwrap();
        // The external image cannot resolve without a base directory
        assert_eq!(mesh.images.len(), 1);
        assert_eq!(mesh.images[0].data, image_bytes);
        assert_eq!(mesh.images[0].mime_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_image_view_past_address_space_is_skipped() {
        let mut doc = quad_document(None, None);
        doc["bufferViews"].as_array_mut().unwrap().push(serde_json::json!({
            "buffer": 0,
            "byteOffset": 18446744073709551600u64,
            "byteLength": 64
        }));
        doc["images"] = serde_json::json!([{ "bufferView": 3, "mimeType": "image/png" }]);
        let glb = write_glb(doc.to_string().as_bytes(), Some(quad_buffer().as_slice()));

        let mesh = parse_gltf(&glb, None).unwrap();
        assert!(mesh.images.is_empty());
    }

    #[test]
    fn test_invalid_json_is_format_error() {
        let err = parse_gltf(b"{ not json", None).unwrap_err();
        assert!(matches!(err, EncoderError::Format(_)));
    }

    #[test]
    fn test_garbage_is_bad_magic() {
        let err = parse_gltf(b"PK\x03\x04garbage-bytes", None).unwrap_err();
        assert!(err.to_string().contains("magic"));
    }
}
