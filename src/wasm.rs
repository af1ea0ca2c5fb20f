//! WASM bindings for mesh-texture-encoder.
//!
//! This module provides JavaScript-friendly APIs for use in the browser.

use crate::{ConvertOptions, ConvertOutput};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the browser console
    console_error_panic_hook::set_once();
}

/// Conversion result holding the model JSON, PNG bytes and stats.
#[wasm_bindgen]
pub struct ConvertResult {
    model_json: String,
    png: Vec<u8>,
    face_count: usize,
    vertex_count: usize,
    frame_count: usize,
    width: u32,
    height: u32,
    compressed: bool,
}

#[wasm_bindgen]
impl ConvertResult {
    /// Get the block model as a JSON string.
    #[wasm_bindgen(getter)]
    pub fn model_json(&self) -> String {
        self.model_json.clone()
    }

    /// Get the PNG bytes.
    #[wasm_bindgen(getter)]
    pub fn png(&self) -> Vec<u8> {
        self.png.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn face_count(&self) -> usize {
        self.face_count
    }

    /// Get the vertex count per frame.
    #[wasm_bindgen(getter)]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    #[wasm_bindgen(getter)]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[wasm_bindgen(getter)]
    pub fn compressed(&self) -> bool {
        self.compressed
    }
}

impl TryFrom<ConvertOutput> for ConvertResult {
    type Error = JsError;

    fn try_from(output: ConvertOutput) -> Result<Self, Self::Error> {
        let model_json = output.model_json().map_err(|e| JsError::new(&e.to_string()))?;
        Ok(ConvertResult {
            model_json,
            png: output.png,
            face_count: output.stats.face_count,
            vertex_count: output.stats.vertex_count,
            frame_count: output.stats.frame_count,
            width: output.stats.width,
            height: output.stats.height,
            compressed: output.stats.compressed,
        })
    }
}

/// Convert OBJ frames to a data texture.
///
/// `frames` is an array of OBJ strings, `textures` an array of `Uint8Array`
/// image files. `options` is an optional JSON string of conversion options.
#[wasm_bindgen]
pub fn convert_obj_bytes(
    frames: js_sys::Array,
    textures: js_sys::Array,
    options: Option<String>,
) -> Result<ConvertResult, JsError> {
    let options = parse_options(options.as_deref())?;

    let mut sources = Vec::with_capacity(frames.length() as usize);
    for frame in frames.iter() {
        let text = frame
            .as_string()
            .ok_or_else(|| JsError::new("OBJ frames must be strings"))?;
        sources.push(text);
    }
    let sources: Vec<&str> = sources.iter().map(String::as_str).collect();
    let textures = byte_arrays(&textures);
    let textures: Vec<&[u8]> = textures.iter().map(Vec::as_slice).collect();

    let output = crate::convert_obj_bytes(&sources, &textures, &options)
        .map_err(|e| JsError::new(&e.to_string()))?;
    output.try_into()
}

/// Convert glTF/GLB frames to a data texture.
///
/// `frames` and `textures` are arrays of `Uint8Array`. With no textures the
/// images embedded in the first frame are used, unless disabled in `options`.
#[wasm_bindgen]
pub fn convert_gltf_bytes(
    frames: js_sys::Array,
    textures: js_sys::Array,
    options: Option<String>,
) -> Result<ConvertResult, JsError> {
    let options = parse_options(options.as_deref())?;

    let sources = byte_arrays(&frames);
    let sources: Vec<&[u8]> = sources.iter().map(Vec::as_slice).collect();
    let textures = byte_arrays(&textures);
    let textures: Vec<&[u8]> = textures.iter().map(Vec::as_slice).collect();

    let output = crate::convert_gltf_bytes(&sources, &textures, &options)
        .map_err(|e| JsError::new(&e.to_string()))?;
    output.try_into()
}

fn parse_options(json: Option<&str>) -> Result<ConvertOptions, JsError> {
    match json {
        Some(json) if !json.trim().is_empty() => {
            ConvertOptions::from_json(json).map_err(|e| JsError::new(&format!("Invalid options: {}", e)))
        }
        _ => Ok(ConvertOptions::default()),
    }
}

fn byte_arrays(array: &js_sys::Array) -> Vec<Vec<u8>> {
    array
        .iter()
        .map(|value| js_sys::Uint8Array::new(&value).to_vec())
        .collect()
}
