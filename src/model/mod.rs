//! Block model emitter.
//!
//! The model is a stack of degenerate single-face elements, one per source
//! face. Each element's UV rectangle points at that face's lookup pixel so the
//! shader can tell the faces apart.

use crate::encoder::Layout;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lower corner of every element.
pub const ELEMENT_FROM: [f64; 3] = [8.0, 0.0, 8.0];
/// Upper corner of every element, a hair above [`ELEMENT_FROM`].
pub const ELEMENT_TO: [f64; 3] = [8.000001, 0.000001, 8.000001];

/// A block model document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockModel {
    pub textures: BTreeMap<String, String>,
    pub elements: Vec<ModelElement>,
    pub display: BTreeMap<String, DisplayTransform>,
}

/// One degenerate cuboid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelElement {
    pub from: [f64; 3],
    pub to: [f64; 3],
    pub faces: BTreeMap<String, ModelFace>,
}

/// A textured, tinted element face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFace {
    /// UV rectangle in 0-16 texture space.
    pub uv: [f64; 4],
    pub texture: String,
    pub tintindex: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayTransform {
    pub rotation: [f64; 3],
    pub translation: [f64; 3],
    pub scale: [f64; 3],
}

impl DisplayTransform {
    /// The standard third-person item transform.
    pub fn third_person() -> Self {
        Self {
            rotation: [75.0, 45.0, 0.0],
            translation: [0.0, 2.5, 0.0],
            scale: [0.375, 0.375, 0.375],
        }
    }
}

impl BlockModel {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn face_count(&self) -> usize {
        self.elements.len()
    }
}

/// UV rectangle of face `index` in an image of the given layout.
pub fn face_uv(layout: &Layout, index: usize) -> [f64; 4] {
    let (col, row) = layout.face_lookup_pixel(index);
    let (col, row) = (col as f64, row as f64);
    let width = layout.width.max(1) as f64;
    let height = layout.height.max(1) as f64;
    [
        (col + 0.1) * 16.0 / width,
        (row + 0.1) * 16.0 / height,
        (col + 0.9) * 16.0 / width,
        (row + 0.9) * 16.0 / height,
    ]
}

/// Build the model for an encoded layout.
pub fn build_model(layout: &Layout, texture_name: &str) -> BlockModel {
    let elements = (0..layout.face_count)
        .map(|index| {
            let face = ModelFace {
                uv: face_uv(layout, index),
                texture: "#0".to_string(),
                tintindex: 0,
            };
            ModelElement {
                from: ELEMENT_FROM,
                to: ELEMENT_TO,
                faces: BTreeMap::from([("north".to_string(), face)]),
            }
        })
        .collect();

    let textures = BTreeMap::from([
        ("0".to_string(), texture_name.to_string()),
        ("particle".to_string(), texture_name.to_string()),
    ]);

    let display = BTreeMap::from([
        ("thirdperson_righthand".to_string(), DisplayTransform::third_person()),
        ("thirdperson_lefthand".to_string(), DisplayTransform::third_person()),
    ]);

    BlockModel {
        textures,
        elements,
        display,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::LayoutParams;

    fn layout(face_count: usize) -> Layout {
        Layout::compute(LayoutParams {
            width: 8,
            texture_height: 8,
            texture_count: 1,
            face_count,
            frame_count: 1,
            position_count: 8,
            uv_count: 8,
            vertex_count: face_count * 4,
            compressed: true,
            pad_to_power_of_two: true,
        })
    }

    #[test]
    fn test_one_element_per_face() {
        let model = build_model(&layout(10), "item/model");
        assert_eq!(model.face_count(), 10);
        for element in &model.elements {
            assert_eq!(element.from, ELEMENT_FROM);
            assert_eq!(element.to, ELEMENT_TO);
            let face = &element.faces["north"];
            assert_eq!(face.texture, "#0");
            assert_eq!(face.tintindex, 0);
        }
        assert_eq!(model.textures["0"], "item/model");
        assert_eq!(model.textures["particle"], "item/model");
        assert_eq!(model.display.len(), 2);
    }

    #[test]
    fn test_face_uv_addresses_lookup_pixel() {
        let layout = layout(10);
        assert_eq!(layout.height, 32);

        // Face 9 sits at column 1, row 2.
        let uv = face_uv(&layout, 9);
        let expected = [1.1 * 2.0, 2.1 * 0.5, 1.9 * 2.0, 2.9 * 0.5];
        for (a, b) in uv.iter().zip(expected) {
            assert!((a - b).abs() < 1e-9, "{:?} vs {:?}", uv, expected);
        }
    }

    #[test]
    fn test_json_shape() {
        let model = build_model(&layout(1), "custom/thing");
        let value: serde_json::Value = serde_json::from_str(&model.to_json().unwrap()).unwrap();

        assert_eq!(value["textures"]["0"], "custom/thing");
        assert_eq!(value["elements"][0]["faces"]["north"]["texture"], "#0");
        assert_eq!(
            value["display"]["thirdperson_righthand"]["scale"],
            serde_json::json!([0.375, 0.375, 0.375])
        );

        let parsed: BlockModel = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.elements.len(), 1);
        assert_eq!(parsed.textures, model.textures);
    }
}
