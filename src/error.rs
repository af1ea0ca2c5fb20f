//! Error types for the mesh texture encoder.

use thiserror::Error;

/// Result type alias using EncoderError.
pub type Result<T> = std::result::Result<T, EncoderError>;

/// Main error type for conversion operations.
///
/// Every variant is fatal to a conversion: no partial model or image is produced.
#[derive(Error, Debug)]
pub enum EncoderError {
    /// Source container or document is malformed (bad GLB magic, unsupported
    /// version, truncated chunks, invalid glTF JSON, unresolvable buffers).
    #[error("Format error: {0}")]
    Format(String),

    /// An OBJ directive is missing a required token.
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A glTF accessor uses a component type outside BYTE..FLOAT.
    #[error("Unsupported component type {component_type} in accessor {accessor}")]
    UnsupportedComponentType {
        accessor: usize,
        component_type: String,
    },

    /// Animation frames do not share the face layout of frame 0.
    #[error("Frame {frame} has {found} faces, expected {expected} (frame 0)")]
    FrameMismatch {
        frame: usize,
        expected: usize,
        found: usize,
    },

    /// No texture could be resolved from any source.
    #[error("No textures available: supply texture images or use embedded glTF images")]
    MissingTexture,

    /// Textures are too small or disagree in size.
    #[error("Texture size error: {0}")]
    TextureSize(String),

    /// A conversion option is outside its encodable range.
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// Failed to parse JSON data.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to read or process an image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
