//! Mesh normalization and vertex indexing.
//!
//! Parser output is first normalized into canonical [`Mesh`](crate::Mesh)es
//! (one per animation frame), which are then indexed into shared tables.

pub mod indexer;
pub mod normalize;

pub use indexer::{check_frames, index_frames, IndexedData};
pub use normalize::{normalize_gltf, normalize_obj};
