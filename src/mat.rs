//! MAT-file Level 5 writer.
//!
//! Implements the subset of the MAT-file format the CND records need:
//! double arrays, char arrays, cell arrays, and struct arrays.  No
//! compression, always the long element form.
//!
//! On-disk layout (little-endian):
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ 128-byte header: 116 text │ 8 subsys │ u16 0x0100 │ "IM"    │
//! ├─────────────────────────────────────────────────────────────┤
//! │ data element:  u32 type │ u32 size │ <size payload> │ pad→8 │
//! │ …one miMATRIX element per top-level variable…               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each `miMATRIX` payload is itself a sequence of data elements: array
//! flags, dimensions, name, then class-specific content (numeric data,
//! UTF-16 chars, nested matrices for cells, or field names + per-element
//! field matrices for structs).
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use ndarray::Array2;

// ── MAT data-element and array-class type codes ──────────────────────────

const MI_INT8: u32 = 1;
const MI_UINT16: u32 = 4;
const MI_INT32: u32 = 5;
const MI_UINT32: u32 = 6;
const MI_DOUBLE: u32 = 9;
const MI_MATRIX: u32 = 14;

const MX_CELL: u32 = 1;
const MX_STRUCT: u32 = 2;
const MX_CHAR: u32 = 4;
const MX_DOUBLE: u32 = 6;

/// Maximum struct field-name length, including the NUL terminator.
const FIELD_NAME_LEN: usize = 32;

// ── Value model ──────────────────────────────────────────────────────────

/// An in-memory MATLAB value.
#[derive(Debug, Clone)]
pub enum MatValue {
    /// Numeric array, `data` in column-major order, `dims = (rows, cols)`.
    Double { dims: (usize, usize), data: Vec<f64> },
    /// `1×n` char row vector (`0×0` when empty).
    Char(String),
    /// `1×n` cell row vector.
    Cell(Vec<MatValue>),
    /// `1×n` struct array; `elements[e][f]` is field `fields[f]` of element `e`.
    Struct { fields: Vec<String>, elements: Vec<Vec<MatValue>> },
}

impl MatValue {
    /// `1×1` double.
    pub fn scalar(v: f64) -> Self {
        MatValue::Double { dims: (1, 1), data: vec![v] }
    }

    /// `1×n` double row vector.
    pub fn row(values: &[f64]) -> Self {
        MatValue::Double { dims: (1, values.len()), data: values.to_vec() }
    }

    /// 2-D double matrix (converted to column-major).
    pub fn matrix(a: &Array2<f64>) -> Self {
        let (r, c) = a.dim();
        let mut data = Vec::with_capacity(r * c);
        for col in 0..c {
            for row in 0..r {
                data.push(a[[row, col]]);
            }
        }
        MatValue::Double { dims: (r, c), data }
    }

    /// `1×1` struct from `(field, value)` pairs.
    pub fn struct_single(fields: Vec<(&str, MatValue)>) -> Self {
        let names = fields.iter().map(|(n, _)| n.to_string()).collect();
        let values = fields.into_iter().map(|(_, v)| v).collect();
        MatValue::Struct { fields: names, elements: vec![values] }
    }
}

// ── Serialization ────────────────────────────────────────────────────────

fn pad8(buf: &mut Vec<u8>) {
    while buf.len() % 8 != 0 {
        buf.push(0);
    }
}

/// Frame a payload as a long-form data element: tag, payload, pad to 8.
fn data_element(mi_type: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + payload.len() + 7);
    out.extend_from_slice(&mi_type.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    pad8(&mut out);
    out
}

fn flags_element(class: u32) -> Vec<u8> {
    let mut payload = Vec::with_capacity(8);
    payload.extend_from_slice(&class.to_le_bytes());
    payload.extend_from_slice(&0u32.to_le_bytes());
    data_element(MI_UINT32, &payload)
}

fn dims_element(rows: usize, cols: usize) -> Vec<u8> {
    let mut payload = Vec::with_capacity(8);
    payload.extend_from_slice(&(rows as i32).to_le_bytes());
    payload.extend_from_slice(&(cols as i32).to_le_bytes());
    data_element(MI_INT32, &payload)
}

fn name_element(name: &str) -> Vec<u8> {
    data_element(MI_INT8, name.as_bytes())
}

/// Serialize one value as a complete `miMATRIX` element.
fn matrix_element(name: &str, value: &MatValue) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    match value {
        MatValue::Double { dims, data } => {
            if dims.0 * dims.1 != data.len() {
                bail!("double dims {dims:?} do not match {} values", data.len());
            }
            body.extend(flags_element(MX_DOUBLE));
            body.extend(dims_element(dims.0, dims.1));
            body.extend(name_element(name));
            let payload: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
            body.extend(data_element(MI_DOUBLE, &payload));
        }
        MatValue::Char(s) => {
            let units: Vec<u16> = s.encode_utf16().collect();
            let dims = if units.is_empty() { (0, 0) } else { (1, units.len()) };
            body.extend(flags_element(MX_CHAR));
            body.extend(dims_element(dims.0, dims.1));
            body.extend(name_element(name));
            let payload: Vec<u8> = units.iter().flat_map(|u| u.to_le_bytes()).collect();
            body.extend(data_element(MI_UINT16, &payload));
        }
        MatValue::Cell(values) => {
            let dims = if values.is_empty() { (0, 0) } else { (1, values.len()) };
            body.extend(flags_element(MX_CELL));
            body.extend(dims_element(dims.0, dims.1));
            body.extend(name_element(name));
            for v in values {
                body.extend(matrix_element("", v)?);
            }
        }
        MatValue::Struct { fields, elements } => {
            for e in elements {
                if e.len() != fields.len() {
                    bail!("struct element has {} values for {} fields", e.len(), fields.len());
                }
            }
            let dims = if elements.is_empty() { (0, 0) } else { (1, elements.len()) };
            body.extend(flags_element(MX_STRUCT));
            body.extend(dims_element(dims.0, dims.1));
            body.extend(name_element(name));
            body.extend(data_element(MI_INT32, &(FIELD_NAME_LEN as i32).to_le_bytes()));
            let mut names = Vec::with_capacity(fields.len() * FIELD_NAME_LEN);
            for f in fields {
                if f.len() >= FIELD_NAME_LEN {
                    bail!("struct field name too long: {f:?}");
                }
                names.extend_from_slice(f.as_bytes());
                names.resize(names.len() + FIELD_NAME_LEN - f.len(), 0);
            }
            body.extend(data_element(MI_INT8, &names));
            // Field values: all fields of element 1, then element 2, …
            for element in elements {
                for v in element {
                    body.extend(matrix_element("", v)?);
                }
            }
        }
    }
    Ok(data_element(MI_MATRIX, &body))
}

/// Write named top-level variables to a MAT-file.
pub fn write_mat(path: &Path, vars: &[(&str, MatValue)]) -> Result<()> {
    let mut header = [0x20u8; 128];
    let text = b"MATLAB 5.0 MAT-file, created by bids2cnd";
    header[..text.len()].copy_from_slice(text);
    header[116..124].fill(0);
    header[124..126].copy_from_slice(&0x0100u16.to_le_bytes());
    header[126..128].copy_from_slice(b"IM");

    let mut f = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    f.write_all(&header)?;
    for (name, value) in vars {
        let element = matrix_element(name, value)
            .with_context(|| format!("serializing variable {name:?}"))?;
        f.write_all(&element)?;
    }
    Ok(())
}
