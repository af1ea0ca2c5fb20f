//! Wavefront OBJ parsing.
//!
//! Reads `v`, `vt`, `vn` and `f` directives into an [`ObjMesh`]. Parsing is
//! deliberately permissive: malformed numbers become `0` and faces with fewer
//! than three corners are dropped. Only a directive missing a required token
//! is an error.

use crate::error::{EncoderError, Result};

/// One corner reference from an `f` directive, resolved to 0-based indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjVertex {
    pub position: usize,
    pub uv: Option<usize>,
    pub normal: Option<usize>,
}

/// Parsed OBJ data before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjMesh {
    pub positions: Vec<[f64; 3]>,
    pub uvs: Vec<[f64; 2]>,
    /// Normals are kept for completeness; the encoder does not use them.
    pub normals: Vec<[f64; 3]>,
    pub faces: Vec<Vec<ObjVertex>>,
}

impl ObjMesh {
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

/// Parse OBJ text.
pub fn parse_obj(text: &str) -> Result<ObjMesh> {
    let mut mesh = ObjMesh::default();

    for (line_index, line) in text.lines().enumerate() {
        let line_number = line_index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        let Some(directive) = parts.next() else {
            continue;
        };
        let args: Vec<&str> = parts.collect();

        match directive {
            "v" => {
                let [x, y, z] = read_floats::<3>(&args, 3, line_number, "v")?;
                mesh.positions.push([x, y, z]);
            }
            "vt" => {
                let [u, v] = read_floats::<2>(&args, 1, line_number, "vt")?;
                mesh.uvs.push([u, v]);
            }
            "vn" => {
                let [x, y, z] = read_floats::<3>(&args, 3, line_number, "vn")?;
                mesh.normals.push([x, y, z]);
            }
            "f" => {
                let mut face = Vec::with_capacity(args.len());
                for token in &args {
                    face.push(parse_face_vertex(token, &mesh, line_number)?);
                }
                if face.len() >= 3 {
                    mesh.faces.push(face);
                }
            }
            // Object/group/material/smoothing directives carry nothing we encode
            _ => {}
        }
    }

    Ok(mesh)
}

/// Read up to `N` numeric arguments of a directive, the first `required` of
/// them mandatory. Absent optional values are zero.
fn read_floats<const N: usize>(
    args: &[&str],
    required: usize,
    line: usize,
    directive: &str,
) -> Result<[f64; N]> {
    if args.len() < required {
        return Err(EncoderError::Parse {
            line,
            message: format!(
                "'{}' needs {} values, found {}",
                directive,
                required,
                args.len()
            ),
        });
    }

    let mut values = [0.0; N];
    for (value, token) in values.iter_mut().zip(args) {
        *value = parse_number(token);
    }
    Ok(values)
}

/// Parse a float, coercing anything unparsable (including NaN) to zero.
fn parse_number(token: &str) -> f64 {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Parse a corner token: `v`, `v/vt`, `v/vt/vn` or `v//vn`.
fn parse_face_vertex(token: &str, mesh: &ObjMesh, line: usize) -> Result<ObjVertex> {
    let mut parts = token.split('/');

    let position = match parts.next() {
        Some(p) if !p.is_empty() => resolve_index(p, mesh.positions.len()),
        _ => {
            return Err(EncoderError::Parse {
                line,
                message: format!("face vertex '{}' has no position index", token),
            })
        }
    };

    let uv = parts
        .next()
        .filter(|s| !s.is_empty())
        .map(|s| resolve_index(s, mesh.uvs.len()));

    let normal = parts
        .next()
        .filter(|s| !s.is_empty())
        .map(|s| resolve_index(s, mesh.normals.len()));

    Ok(ObjVertex {
        position,
        uv,
        normal,
    })
}

/// Convert a 1-based (or negative, relative) OBJ index to 0-based.
///
/// Unparsable tokens coerce to `0`, which lands on the first entry.
fn resolve_index(token: &str, current_len: usize) -> usize {
    let raw = token.parse::<i64>().unwrap_or(0);
    if raw > 0 {
        (raw - 1) as usize
    } else if raw < 0 {
        current_len.saturating_sub(raw.unsigned_abs() as usize)
    } else {
        0
    }
}
