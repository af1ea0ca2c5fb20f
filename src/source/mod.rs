//! Source format parsers.
//!
//! Each parser produces a format-specific intermediate mesh; the
//! [`mesher`](crate::mesher) module turns those into canonical [`Mesh`](crate::Mesh)es.

pub mod accessor;
pub mod data_uri;
pub mod glb;
pub mod gltf;
pub mod obj;

pub use gltf::{parse_gltf, EmbeddedImage, GltfMesh, GltfPrimitive};
pub use obj::{parse_obj, ObjMesh, ObjVertex};
