//! Cross-frame vertex deduplication.
//!
//! Every face becomes exactly four corners. Positions and UVs from all frames
//! share one table each, keyed by exact value.

use crate::error::{EncoderError, Result};
use crate::types::Mesh;
use std::collections::HashMap;

/// Deduplicated vertex tables plus the flat per-corner index list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedData {
    /// Distinct positions across all frames.
    pub positions: Vec<[f64; 3]>,
    /// Distinct UVs across all frames.
    pub uvs: Vec<[f64; 2]>,
    /// `[position_index, uv_index]` per corner, frame-major, four per face.
    pub vertices: Vec<[usize; 2]>,
    /// Faces per frame.
    pub face_count: usize,
    /// Number of frames indexed.
    pub frame_count: usize,
}

impl IndexedData {
    /// Corners per frame (`face_count * 4`).
    pub fn vertices_per_frame(&self) -> usize {
        self.face_count * 4
    }

    /// Corners of one frame.
    pub fn frame_vertices(&self, frame: usize) -> &[[usize; 2]] {
        let per_frame = self.vertices_per_frame();
        let start = (frame * per_frame).min(self.vertices.len());
        let end = (start + per_frame).min(self.vertices.len());
        &self.vertices[start..end]
    }
}

/// Array + lookup map holding each distinct value once.
#[derive(Debug, Default)]
struct DedupTable<const N: usize> {
    values: Vec<[f64; N]>,
    lookup: HashMap<[u64; N], usize>,
}

impl<const N: usize> DedupTable<N> {
    fn new() -> Self {
        Self {
            values: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// Return the index of `value`, inserting it if unseen.
    fn insert(&mut self, value: [f64; N]) -> usize {
        let key = value.map(canonical_bits);
        if let Some(&index) = self.lookup.get(&key) {
            return index;
        }
        let index = self.values.len();
        self.values.push(value);
        self.lookup.insert(key, index);
        index
    }
}

/// Bit pattern used as the dedup key. `-0.0` and `0.0` collapse.
fn canonical_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

/// Check that every frame shares frame 0's face count.
pub fn check_frames(frames: &[Mesh]) -> Result<()> {
    let Some(first) = frames.first() else {
        return Err(EncoderError::Format("No animation frames supplied".to_string()));
    };
    let expected = first.face_count();
    for (frame, mesh) in frames.iter().enumerate().skip(1) {
        if mesh.face_count() != expected {
            return Err(EncoderError::FrameMismatch {
                frame,
                expected,
                found: mesh.face_count(),
            });
        }
    }
    Ok(())
}

/// Index one or more frames.
///
/// Triangles are padded to quads by repeating corner 1 as the fourth corner;
/// faces with more than four corners contribute only their first four.
pub fn index_frames(frames: &[Mesh]) -> Result<IndexedData> {
    check_frames(frames)?;
    let face_count = frames[0].face_count();

    let mut positions = DedupTable::<3>::new();
    let mut uvs = DedupTable::<2>::new();
    let mut vertices = Vec::with_capacity(frames.len() * face_count * 4);

    for (frame_index, frame) in frames.iter().enumerate() {
        for (face_index, face) in frame.faces.iter().enumerate() {
            let corners = match face.vertices.len() {
                0..=2 => {
                    return Err(EncoderError::Format(format!(
                        "Frame {} face {} has {} corners (need at least 3)",
                        frame_index,
                        face_index,
                        face.vertices.len()
                    )))
                }
                3 => [face.vertices[0], face.vertices[1], face.vertices[2], face.vertices[1]],
                _ => [face.vertices[0], face.vertices[1], face.vertices[2], face.vertices[3]],
            };

            for corner in corners {
                let (position, uv) = frame.corner(corner);
                vertices.push([positions.insert(position), uvs.insert(uv)]);
            }
        }
    }

    tracing::debug!(
        frames = frames.len(),
        faces = face_count,
        positions = positions.values.len(),
        uvs = uvs.values.len(),
        "Indexed frames"
    );

    Ok(IndexedData {
        positions: positions.values,
        uvs: uvs.values,
        vertices,
        face_count,
        frame_count: frames.len(),
    })
}
