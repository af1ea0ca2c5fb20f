//! Conversion of parser output into canonical meshes.

use crate::error::{EncoderError, Result};
use crate::source::{GltfMesh, ObjMesh};
use crate::types::{Face, FaceVertex, Mesh};

/// Convert parsed OBJ data into a canonical mesh.
///
/// When the file declares no `vt` lines, a single `(0, 0)` UV is synthesized
/// and every corner without a UV reference points at index 0.
pub fn normalize_obj(obj: &ObjMesh) -> Mesh {
    let mut mesh = Mesh {
        positions: obj.positions.clone(),
        uvs: obj.uvs.clone(),
        faces: Vec::with_capacity(obj.faces.len()),
    };
    if mesh.uvs.is_empty() {
        mesh.add_uv([0.0, 0.0]);
    }

    for face in &obj.faces {
        let vertices = face
            .iter()
            .map(|v| FaceVertex::new(v.position, v.uv.unwrap_or(0)))
            .collect();
        mesh.add_face(Face::new(vertices));
    }

    mesh
}

/// Convert parsed glTF data into a canonical mesh of triangles.
///
/// Primitives are appended in document order. Each glTF vertex becomes one
/// position and one UV at the same index, so a corner's position and UV
/// indices are always equal.
pub fn normalize_gltf(gltf: &GltfMesh) -> Result<Mesh> {
    let mut mesh = Mesh::new();

    for (primitive_index, primitive) in gltf.primitives.iter().enumerate() {
        let base = mesh.positions.len();
        let vertex_count = primitive.positions.len();

        mesh.positions.extend_from_slice(&primitive.positions);
        match &primitive.uvs {
            Some(uvs) if uvs.len() == vertex_count => mesh.uvs.extend_from_slice(uvs),
            Some(uvs) => {
                tracing::warn!(
                    primitive = primitive_index,
                    "TEXCOORD_0 has {} entries for {} vertices; using (0, 0)",
                    uvs.len(),
                    vertex_count
                );
                mesh.uvs.extend(std::iter::repeat([0.0, 0.0]).take(vertex_count));
            }
            None => mesh.uvs.extend(std::iter::repeat([0.0, 0.0]).take(vertex_count)),
        }

        let indices: Vec<usize> = match &primitive.indices {
            Some(indices) => indices.iter().map(|&i| i as usize).collect(),
            None => (0..vertex_count).collect(),
        };
        if indices.len() % 3 != 0 {
            tracing::warn!(
                primitive = primitive_index,
                "Index count {} is not a multiple of 3; ignoring trailing indices",
                indices.len()
            );
        }

        for triangle in indices.chunks_exact(3) {
            let mut corners = [FaceVertex::new(0, 0); 3];
            for (corner, &index) in corners.iter_mut().zip(triangle) {
                if index >= vertex_count {
                    return Err(EncoderError::Format(format!(
                        "Primitive {} index {} is out of range ({} vertices)",
                        primitive_index, index, vertex_count
                    )));
                }
                *corner = FaceVertex::new(base + index, base + index);
            }
            mesh.add_face(Face::triangle(corners[0], corners[1], corners[2]));
        }
    }

    Ok(mesh)
}
