//! Native BrainVision reader.
//!
//! A BrainVision recording is a triplet of files referenced from the `.vhdr`
//! header:
//!
//! ```text
//! ┌──────────────┐   DataFile   ┌──────────────┐
//! │  name.vhdr   │ ───────────▶ │   name.eeg   │  raw samples
//! │  (INI text)  │  MarkerFile  ├──────────────┤
//! │              │ ───────────▶ │  name.vmrk   │  (unused here; events
//! └──────────────┘              └──────────────┘   come from events.tsv)
//! ```
//!
//! The binary file holds little-endian samples, either `IEEE_FLOAT_32` or
//! `INT_16` scaled by a per-channel resolution, in one of two layouts:
//!
//! ```text
//! MULTIPLEXED   t0: ch0 ch1 … chN | t1: ch0 ch1 … chN | …
//! VECTORIZED    ch0: t0 t1 … tT  | ch1: t0 t1 … tT  | …
//! ```
use std::path::Path;

use anyhow::{bail, Context, Result};
use ndarray::Array2;

/// Sample encoding of the `.eeg` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryFormat {
    Float32,
    Int16,
}

impl BinaryFormat {
    fn item_size(self) -> usize {
        match self {
            BinaryFormat::Float32 => 4,
            BinaryFormat::Int16 => 2,
        }
    }
}

/// Channel-vs-time layout of the `.eeg` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Multiplexed,
    Vectorized,
}

/// Parsed `.vhdr` header.
#[derive(Debug, Clone)]
pub struct VhdrInfo {
    /// Binary data filename, relative to the header's directory.
    pub data_file: String,
    pub n_channels: usize,
    /// Sampling rate in Hz (`1e6 / SamplingInterval[µs]`).
    pub sfreq: f64,
    pub format: BinaryFormat,
    pub orientation: Orientation,
    pub ch_names: Vec<String>,
    /// Per-channel resolution multiplier; 1.0 when unset.
    pub resolutions: Vec<f64>,
}

/// Read and parse a `.vhdr` header file.
pub fn read_vhdr(path: &Path) -> Result<VhdrInfo> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_vhdr(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Parse `.vhdr` INI text.
///
/// Sections appear as `[Section Name]`, entries as `Key=Value`, comments
/// start with `;`.
pub fn parse_vhdr(text: &str) -> Result<VhdrInfo> {
    let mut section = String::new();
    let mut data_file = None;
    let mut n_channels = None;
    let mut sampling_interval = None;
    let mut format = None;
    let mut orientation = Orientation::Multiplexed;
    // (index, name, resolution) triplets from [Channel Infos].
    let mut channels: Vec<(usize, String, f64)> = Vec::new();

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            section = line[1..line.len() - 1].to_ascii_lowercase();
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        match section.as_str() {
            "common infos" => match key {
                "DataFile" => data_file = Some(value.to_string()),
                "NumberOfChannels" => {
                    n_channels = Some(value.parse::<usize>()
                        .with_context(|| format!("NumberOfChannels={value:?}"))?);
                }
                "SamplingInterval" => {
                    sampling_interval = Some(value.parse::<f64>()
                        .with_context(|| format!("SamplingInterval={value:?}"))?);
                }
                "DataOrientation" => {
                    orientation = match value.to_ascii_uppercase().as_str() {
                        "MULTIPLEXED" => Orientation::Multiplexed,
                        "VECTORIZED" => Orientation::Vectorized,
                        other => bail!("unsupported DataOrientation: {other:?}"),
                    };
                }
                "DataFormat" => {
                    if !value.eq_ignore_ascii_case("BINARY") {
                        bail!("unsupported DataFormat: {value:?} (only BINARY)");
                    }
                }
                _ => {}
            },
            "binary infos" => {
                if key == "BinaryFormat" {
                    format = Some(match value.to_ascii_uppercase().as_str() {
                        "IEEE_FLOAT_32" => BinaryFormat::Float32,
                        "INT_16" => BinaryFormat::Int16,
                        other => bail!("unsupported BinaryFormat: {other:?}"),
                    });
                }
            }
            "channel infos" => {
                if let Some(idx) = key.strip_prefix("Ch") {
                    let idx: usize = idx.parse()
                        .with_context(|| format!("channel key {key:?}"))?;
                    // Ch<N>=<name>,<reference>,<resolution>,<unit>
                    let mut fields = value.split(',');
                    let name = fields.next().unwrap_or("").to_string();
                    let _reference = fields.next();
                    let resolution = fields
                        .next()
                        .filter(|s| !s.is_empty())
                        .map(str::parse::<f64>)
                        .transpose()
                        .with_context(|| format!("resolution of {key}"))?
                        .unwrap_or(1.0);
                    channels.push((idx, name, resolution));
                }
            }
            _ => {}
        }
    }

    let data_file = data_file.context("header has no DataFile")?;
    let n_channels = n_channels.context("header has no NumberOfChannels")?;
    let interval = sampling_interval.context("header has no SamplingInterval")?;
    let format = format.context("header has no BinaryFormat")?;
    if interval <= 0.0 {
        bail!("non-positive SamplingInterval: {interval}");
    }
    if channels.len() != n_channels {
        bail!("header lists {} channels, NumberOfChannels={}", channels.len(), n_channels);
    }
    channels.sort_by_key(|&(idx, _, _)| idx);

    Ok(VhdrInfo {
        data_file,
        n_channels,
        sfreq: 1e6 / interval,
        format,
        orientation,
        ch_names: channels.iter().map(|(_, n, _)| n.clone()).collect(),
        resolutions: channels.iter().map(|&(_, _, r)| r).collect(),
    })
}

/// Read the binary `.eeg` file into a `[C, T]` array of resolution-scaled
/// values.
pub fn read_eeg_data(path: &Path, info: &VhdrInfo) -> Result<Array2<f64>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let item = info.format.item_size();
    if bytes.len() % (item * info.n_channels) != 0 {
        bail!(
            "{}: {} bytes is not a whole number of {}-channel samples",
            path.display(),
            bytes.len(),
            info.n_channels
        );
    }
    let n_t = bytes.len() / (item * info.n_channels);

    let value = |flat: usize| -> f64 {
        let off = flat * item;
        match info.format {
            BinaryFormat::Float32 => {
                f32::from_le_bytes(bytes[off..off + 4].try_into().unwrap()) as f64
            }
            BinaryFormat::Int16 => {
                i16::from_le_bytes(bytes[off..off + 2].try_into().unwrap()) as f64
            }
        }
    };

    let mut out = Array2::<f64>::zeros((info.n_channels, n_t));
    for c in 0..info.n_channels {
        let res = info.resolutions[c];
        for t in 0..n_t {
            let flat = match info.orientation {
                Orientation::Multiplexed => t * info.n_channels + c,
                Orientation::Vectorized => c * n_t + t,
            };
            out[[c, t]] = value(flat) * res;
        }
    }
    Ok(out)
}
