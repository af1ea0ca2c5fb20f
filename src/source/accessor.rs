//! glTF accessor reading.
//!
//! Accessors are decoded by hand from their buffer views so that every
//! component type, element arity and byte stride is handled explicitly.

use crate::error::{EncoderError, Result};
use gltf_json as json;
use json::accessor::{ComponentType, Type};
use json::validation::Checked;

/// Values read from one accessor, `arity` components per element.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessorData {
    pub arity: usize,
    pub values: Vec<f64>,
}

impl AccessorData {
    /// Number of elements.
    pub fn len(&self) -> usize {
        if self.arity == 0 {
            0
        } else {
            self.values.len() / self.arity
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate elements as slices.
    pub fn elements(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks_exact(self.arity.max(1))
    }

    /// Collect elements into fixed-size arrays, zero-filling missing components.
    pub fn to_arrays<const N: usize>(&self) -> Vec<[f64; N]> {
        self.elements()
            .map(|element| {
                let mut out = [0.0; N];
                for (dst, src) in out.iter_mut().zip(element) {
                    *dst = *src;
                }
                out
            })
            .collect()
    }

    /// Collect scalar elements as indices.
    pub fn to_indices(&self) -> Vec<u32> {
        self.elements().map(|e| e[0] as u32).collect()
    }
}

/// Size in bytes of one component.
pub fn component_size(component_type: ComponentType) -> usize {
    match component_type {
        ComponentType::I8 | ComponentType::U8 => 1,
        ComponentType::I16 | ComponentType::U16 => 2,
        ComponentType::U32 | ComponentType::F32 => 4,
    }
}

/// Number of components per element.
pub fn type_arity(type_: Type) -> usize {
    match type_ {
        Type::Scalar => 1,
        Type::Vec2 => 2,
        Type::Vec3 => 3,
        Type::Vec4 => 4,
        Type::Mat2 => 4,
        Type::Mat3 => 9,
        Type::Mat4 => 16,
    }
}

/// Largest element count accepted for an accessor without a buffer view.
///
/// Matches the 24-bit index range of the encoded vertex tables.
pub const MAX_UNBACKED_ELEMENTS: usize = 1 << 24;

fn byte_count(value: u64, index: usize) -> Result<usize> {
    usize::try_from(value).map_err(|_| overflow(index))
}

fn overflow(index: usize) -> EncoderError {
    EncoderError::Format(format!("Accessor {} byte range overflows", index))
}

/// Read accessor `index` from `root`, using the already-resolved `buffers`.
pub fn read_accessor(root: &json::Root, buffers: &[Vec<u8>], index: usize) -> Result<AccessorData> {
    let accessor = root
        .accessors
        .get(index)
        .ok_or_else(|| EncoderError::Format(format!("Accessor {} does not exist", index)))?;

    let component_type = match &accessor.component_type {
        Checked::Valid(generic) => generic.0,
        Checked::Invalid => {
            return Err(EncoderError::UnsupportedComponentType {
                accessor: index,
                component_type: "unknown".to_string(),
            })
        }
    };
    let arity = match &accessor.type_ {
        Checked::Valid(type_) => type_arity(*type_),
        Checked::Invalid => {
            return Err(EncoderError::Format(format!(
                "Accessor {} has an invalid element type",
                index
            )))
        }
    };

    let count = byte_count(accessor.count.0, index)?;
    if accessor.sparse.is_some() {
        tracing::warn!(accessor = index, "Sparse accessor substitution is not supported; using base values");
    }

    // An accessor without a buffer view is all zeros
    let Some(view_index) = accessor.buffer_view.as_ref().map(|v| v.value()) else {
        if count > MAX_UNBACKED_ELEMENTS {
            return Err(EncoderError::Format(format!(
                "Accessor {} has no buffer view and {} elements (at most {})",
                index, count, MAX_UNBACKED_ELEMENTS
            )));
        }
        return Ok(AccessorData {
            arity,
            values: vec![0.0; count * arity],
        });
    };

    let view = root.buffer_views.get(view_index).ok_or_else(|| {
        EncoderError::Format(format!(
            "Accessor {} references missing buffer view {}",
            index, view_index
        ))
    })?;
    let buffer = buffers.get(view.buffer.value()).ok_or_else(|| {
        EncoderError::Format(format!(
            "Buffer view {} references missing buffer {}",
            view_index,
            view.buffer.value()
        ))
    })?;

    let size = component_size(component_type);
    let element_size = size * arity;
    let stride = view
        .byte_stride
        .as_ref()
        .map(|s| s.0 as usize)
        .filter(|&s| s > 0)
        .unwrap_or(element_size);

    let view_start = byte_count(view.byte_offset.map_or(0, |o| o.0), index)?;
    let view_end = view_start
        .checked_add(byte_count(view.byte_length.0, index)?)
        .ok_or_else(|| overflow(index))?;
    let start = view_start
        .checked_add(byte_count(accessor.byte_offset.map_or(0, |o| o.0), index)?)
        .ok_or_else(|| overflow(index))?;

    if count > 0 {
        let last = (count - 1)
            .checked_mul(stride)
            .and_then(|n| n.checked_add(start))
            .and_then(|n| n.checked_add(element_size))
            .ok_or_else(|| overflow(index))?;
        if last > view_end || view_end > buffer.len() {
            return Err(EncoderError::Format(format!(
                "Accessor {} reads {} bytes past buffer view {} (buffer is {} bytes)",
                index,
                last.saturating_sub(view_end.min(buffer.len())),
                view_index,
                buffer.len()
            )));
        }
    }

    let mut values = Vec::with_capacity(count * arity);
    for i in 0..count {
        let element = start + i * stride;
        for c in 0..arity {
            let offset = element + c * size;
            values.push(read_component(
                &buffer[offset..offset + size],
                component_type,
                accessor.normalized,
            ));
        }
    }

    Ok(AccessorData { arity, values })
}

/// Decode one little-endian component, applying glTF normalization rules.
fn read_component(bytes: &[u8], component_type: ComponentType, normalized: bool) -> f64 {
    match component_type {
        ComponentType::I8 => {
            let v = bytes[0] as i8 as f64;
            if normalized {
                (v / 127.0).max(-1.0)
            } else {
                v
            }
        }
        ComponentType::U8 => {
            let v = bytes[0] as f64;
            if normalized {
                v / 255.0
            } else {
                v
            }
        }
        ComponentType::I16 => {
            let v = i16::from_le_bytes([bytes[0], bytes[1]]) as f64;
            if normalized {
                (v / 32767.0).max(-1.0)
            } else {
                v
            }
        }
        ComponentType::U16 => {
            let v = u16::from_le_bytes([bytes[0], bytes[1]]) as f64;
            if normalized {
                v / 65535.0
            } else {
                v
            }
        }
        ComponentType::U32 => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
        ComponentType::F32 => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
    }
}
