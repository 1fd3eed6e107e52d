/// Shared helpers: synthetic BIDS dataset builder + minimal MAT reader.
use ndarray::Array2;
use std::fs;
use std::path::Path;

// ── Synthetic BIDS dataset ────────────────────────────────────────────────

/// One run's fixture: data `[C, T]`, events as `(onset_s, kind)` pairs.
#[allow(unused)]
pub struct RunFixture<'a> {
    pub subject: &'a str,
    pub task: &'a str,
    pub run: &'a str,
    pub sfreq: f64,
    /// `(name, BIDS type)` per channel, row order of `data`.
    pub channels: &'a [(&'a str, &'a str)],
    pub data: Array2<f64>,
    pub events: &'a [(f64, &'a str)],
}

/// Write one BrainVision run (header, binary, channels/events sidecars)
/// under `root/sub-X/eeg/`.
#[allow(unused)]
pub fn write_run(root: &Path, fix: &RunFixture<'_>) {
    let dir = root.join(format!("sub-{}", fix.subject)).join("eeg");
    fs::create_dir_all(&dir).unwrap();
    let base = format!("sub-{}_task-{}_run-{}_eeg", fix.subject, fix.task, fix.run);

    let (n_ch, n_t) = fix.data.dim();
    assert_eq!(n_ch, fix.channels.len());

    let mut vhdr = String::from("Brain Vision Data Exchange Header File Version 1.0\n");
    vhdr.push_str("[Common Infos]\n");
    vhdr.push_str(&format!("DataFile={base}.eeg\n"));
    vhdr.push_str("DataFormat=BINARY\nDataOrientation=MULTIPLEXED\n");
    vhdr.push_str(&format!("NumberOfChannels={n_ch}\n"));
    vhdr.push_str(&format!("SamplingInterval={}\n", 1e6 / fix.sfreq));
    vhdr.push_str("[Binary Infos]\nBinaryFormat=IEEE_FLOAT_32\n");
    vhdr.push_str("[Channel Infos]\n");
    for (i, (name, _)) in fix.channels.iter().enumerate() {
        vhdr.push_str(&format!("Ch{}={name},,1,\u{b5}V\n", i + 1));
    }
    fs::write(dir.join(format!("{base}.vhdr")), vhdr).unwrap();

    let mut bytes = Vec::with_capacity(n_ch * n_t * 4);
    for t in 0..n_t {
        for c in 0..n_ch {
            bytes.extend_from_slice(&(fix.data[[c, t]] as f32).to_le_bytes());
        }
    }
    fs::write(dir.join(format!("{base}.eeg")), bytes).unwrap();

    let mut channels = String::from("name\ttype\tunits\n");
    for (name, kind) in fix.channels {
        channels.push_str(&format!("{name}\t{kind}\t\u{b5}V\n"));
    }
    fs::write(
        dir.join(base.replace("_eeg", "_channels.tsv")),
        channels,
    )
    .unwrap();

    let mut events = String::from("onset\tduration\ttrial_type\n");
    for (onset, kind) in fix.events {
        events.push_str(&format!("{onset}\t0.0\t{{'kind': '{kind}'}}\n"));
    }
    fs::write(dir.join(base.replace("_eeg", "_events.tsv")), events).unwrap();
}

/// Write an `electrodes.tsv` for one subject's `eeg/` directory.
#[allow(unused)]
pub fn write_electrodes(root: &Path, subject: &str, rows: &[(&str, f64, f64, f64)]) {
    let dir = root.join(format!("sub-{subject}")).join("eeg");
    fs::create_dir_all(&dir).unwrap();
    let mut text = String::from("name\tx\ty\tz\n");
    for (name, x, y, z) in rows {
        text.push_str(&format!("{name}\t{x}\t{y}\t{z}\n"));
    }
    fs::write(dir.join(format!("sub-{subject}_electrodes.tsv")), text).unwrap();
}

// ── Minimal MAT-file Level 5 reader (structural checks only) ──────────────

#[derive(Debug, Clone)]
#[allow(unused)]
pub enum MatVar {
    Double { dims: (usize, usize), data: Vec<f64> },
    Char(String),
    Cell(Vec<MatVar>),
    Struct { fields: Vec<String>, elements: Vec<Vec<MatVar>> },
}

#[allow(unused)]
impl MatVar {
    /// Field of a 1×1 struct.
    pub fn field(&self, name: &str) -> &MatVar {
        match self {
            MatVar::Struct { fields, elements } => {
                let i = fields
                    .iter()
                    .position(|f| f == name)
                    .unwrap_or_else(|| panic!("no field {name:?} in {fields:?}"));
                &elements[0][i]
            }
            other => panic!("field({name:?}) on non-struct {other:?}"),
        }
    }

    pub fn as_char(&self) -> &str {
        match self {
            MatVar::Char(s) => s,
            other => panic!("expected char, got {other:?}"),
        }
    }

    pub fn as_cell(&self) -> &[MatVar] {
        match self {
            MatVar::Cell(v) => v,
            other => panic!("expected cell, got {other:?}"),
        }
    }

    pub fn as_double(&self) -> (&(usize, usize), &[f64]) {
        match self {
            MatVar::Double { dims, data } => (dims, data),
            other => panic!("expected double, got {other:?}"),
        }
    }
}

#[allow(unused)]
fn tag(bytes: &[u8], pos: usize) -> (u32, usize) {
    let ty = u32::from_le_bytes(bytes[pos..pos + 4].try_into().unwrap());
    let size = u32::from_le_bytes(bytes[pos + 4..pos + 8].try_into().unwrap()) as usize;
    (ty, size)
}

#[allow(unused)]
fn pad8(n: usize) -> usize {
    (n + 7) & !7
}

/// Parse all top-level variables of a MAT-file written by this crate.
#[allow(unused)]
pub fn read_mat(path: &Path) -> Vec<(String, MatVar)> {
    let bytes = fs::read(path).unwrap();
    assert!(bytes.len() >= 128, "file shorter than MAT header");
    assert_eq!(&bytes[126..128], b"IM", "endian indicator");
    assert_eq!(&bytes[124..126], &0x0100u16.to_le_bytes(), "version");

    let mut out = Vec::new();
    let mut pos = 128;
    while pos < bytes.len() {
        let (ty, size) = tag(&bytes, pos);
        assert_eq!(ty, 14, "top-level element is not miMATRIX");
        out.push(parse_matrix(&bytes[pos + 8..pos + 8 + size]));
        pos += 8 + pad8(size);
    }
    out
}

#[allow(unused)]
fn parse_matrix(body: &[u8]) -> (String, MatVar) {
    let mut pos = 0;

    let (ty, size) = tag(body, pos);
    assert_eq!((ty, size), (6, 8), "array flags element");
    let class = u32::from_le_bytes(body[pos + 8..pos + 12].try_into().unwrap()) & 0xff;
    pos += 8 + pad8(size);

    let (ty, size) = tag(body, pos);
    assert_eq!(ty, 5, "dimensions element");
    let n_dims = size / 4;
    let mut dims = Vec::with_capacity(n_dims);
    for d in 0..n_dims {
        let off = pos + 8 + d * 4;
        dims.push(i32::from_le_bytes(body[off..off + 4].try_into().unwrap()) as usize);
    }
    pos += 8 + pad8(size);
    let (rows, cols) = (dims[0], dims[1]);

    let (ty, size) = tag(body, pos);
    assert_eq!(ty, 1, "name element");
    let name = String::from_utf8(body[pos + 8..pos + 8 + size].to_vec()).unwrap();
    pos += 8 + pad8(size);

    let var = match class {
        6 => {
            let (ty, size) = tag(body, pos);
            assert_eq!(ty, 9, "double data element");
            let data: Vec<f64> = body[pos + 8..pos + 8 + size]
                .chunks_exact(8)
                .map(|b| f64::from_le_bytes(b.try_into().unwrap()))
                .collect();
            MatVar::Double { dims: (rows, cols), data }
        }
        4 => {
            let (ty, size) = tag(body, pos);
            assert_eq!(ty, 4, "char data element");
            let units: Vec<u16> = body[pos + 8..pos + 8 + size]
                .chunks_exact(2)
                .map(|b| u16::from_le_bytes(b.try_into().unwrap()))
                .collect();
            MatVar::Char(String::from_utf16(&units).unwrap())
        }
        1 => {
            let mut values = Vec::with_capacity(rows * cols);
            for _ in 0..rows * cols {
                let (ty, size) = tag(body, pos);
                assert_eq!(ty, 14, "cell entry is not miMATRIX");
                values.push(parse_matrix(&body[pos + 8..pos + 8 + size]).1);
                pos += 8 + pad8(size);
            }
            MatVar::Cell(values)
        }
        2 => {
            let (ty, size) = tag(body, pos);
            assert_eq!(ty, 5, "field-name-length element");
            let flen = i32::from_le_bytes(body[pos + 8..pos + 12].try_into().unwrap()) as usize;
            pos += 8 + pad8(size);

            let (ty, size) = tag(body, pos);
            assert_eq!(ty, 1, "field-names element");
            let fields: Vec<String> = body[pos + 8..pos + 8 + size]
                .chunks_exact(flen)
                .map(|chunk| {
                    let end = chunk.iter().position(|&b| b == 0).unwrap_or(flen);
                    String::from_utf8(chunk[..end].to_vec()).unwrap()
                })
                .collect();
            pos += 8 + pad8(size);

            let mut elements = Vec::with_capacity(rows * cols);
            for _ in 0..rows * cols {
                let mut element = Vec::with_capacity(fields.len());
                for _ in 0..fields.len() {
                    let (ty, size) = tag(body, pos);
                    assert_eq!(ty, 14, "struct field is not miMATRIX");
                    element.push(parse_matrix(&body[pos + 8..pos + 8 + size]).1);
                    pos += 8 + pad8(size);
                }
                elements.push(element);
            }
            MatVar::Struct { fields, elements }
        }
        other => panic!("unsupported array class {other}"),
    };
    (name, var)
}
