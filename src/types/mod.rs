//! Shared types used throughout the library.

mod options;

pub use options::{ColorBehavior, Compression, ConvertOptions};

/// One corner of a face: indices into a mesh's position and UV tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceVertex {
    pub position_index: usize,
    pub uv_index: usize,
}

impl FaceVertex {
    pub fn new(position_index: usize, uv_index: usize) -> Self {
        Self {
            position_index,
            uv_index,
        }
    }
}

/// A polygon of three or more corners.
///
/// Only the first four corners are encoded; OBJ n-gons are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Face {
    pub vertices: Vec<FaceVertex>,
}

impl Face {
    pub fn new(vertices: Vec<FaceVertex>) -> Self {
        Self { vertices }
    }

    /// Build a triangle from three corners.
    pub fn triangle(a: FaceVertex, b: FaceVertex, c: FaceVertex) -> Self {
        Self {
            vertices: vec![a, b, c],
        }
    }

    /// Number of corners.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Canonical mesh shared by every source format.
///
/// One `Mesh` describes one animation frame. All frames of a conversion must
/// list the same number of faces in the same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions.
    pub positions: Vec<[f64; 3]>,
    /// Texture coordinates.
    pub uvs: Vec<[f64; 2]>,
    /// Faces referencing `positions` and `uvs` by index.
    pub faces: Vec<Face>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a position and return its index.
    pub fn add_position(&mut self, position: [f64; 3]) -> usize {
        self.positions.push(position);
        self.positions.len() - 1
    }

    /// Add a UV and return its index.
    pub fn add_uv(&mut self, uv: [f64; 2]) -> usize {
        self.uvs.push(uv);
        self.uvs.len() - 1
    }

    pub fn add_face(&mut self, face: Face) {
        self.faces.push(face);
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Resolve a corner to its position and UV values.
    ///
    /// Indices past the end of a table resolve to the origin, matching the
    /// permissive handling of malformed OBJ input.
    pub fn corner(&self, vertex: FaceVertex) -> ([f64; 3], [f64; 2]) {
        let position = self
            .positions
            .get(vertex.position_index)
            .copied()
            .unwrap_or([0.0; 3]);
        let uv = self.uvs.get(vertex.uv_index).copied().unwrap_or([0.0; 2]);
        (position, uv)
    }
}
