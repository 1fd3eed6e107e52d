//! High-level raw-recording access.
//!
//! [`open_raw`] assembles one [`RawBids`] from the BrainVision triplet plus
//! the `channels.tsv` / `electrodes.tsv` / `events.tsv` sidecars.
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use ndarray::Array2;

use super::brainvision::{read_eeg_data, read_vhdr};
use super::channels::{read_channels_tsv, read_electrodes_tsv, BidsChannel};
use super::events::{read_events_tsv, Annotation};
use super::path::BidsPath;

/// A requested subject/session/task/run/suffix combination has no recording
/// on disk.  The driver downcasts to this and skips the combination.
#[derive(Debug)]
pub struct NotFound(pub PathBuf);

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no recording at {}", self.0.display())
    }
}

impl std::error::Error for NotFound {}

/// One raw recording: continuous data plus channel metadata and annotations.
#[derive(Debug)]
pub struct RawBids {
    /// Resolution-scaled samples, shape `[C, T]`.
    pub data: Array2<f64>,
    /// Sampling rate in Hz.
    pub sfreq: f64,
    /// One entry per data row, in recording order.
    pub channels: Vec<BidsChannel>,
    /// Events from `events.tsv`; empty when the sidecar is absent.
    pub annotations: Vec<Annotation>,
}

/// Open the recording at `path` under dataset `root`.
///
/// Fails with a downcastable [`NotFound`] when the `.vhdr` header does not
/// exist.  Channel types default to the datatype when `channels.tsv` is
/// absent; locations default to empty when `electrodes.tsv` is absent.
pub fn open_raw(root: &Path, path: &BidsPath<'_>) -> Result<RawBids> {
    let vhdr = path.header_path(root);
    if !vhdr.exists() {
        return Err(anyhow::Error::new(NotFound(vhdr)));
    }
    let info = read_vhdr(&vhdr)?;
    let dir = vhdr.parent().context("header path has no parent")?;
    let data = read_eeg_data(&dir.join(&info.data_file), &info)?;

    // Channel types: channels.tsv order is authoritative in BIDS but is
    // matched to the header's channel list by name to be safe.
    let mut kinds: Vec<String> = vec![path.datatype.to_ascii_lowercase(); info.n_channels];
    let channels_tsv = path.sidecar_path(root, "channels", "tsv");
    if channels_tsv.exists() {
        let typed = read_channels_tsv(&channels_tsv)?;
        for (name, kind) in &typed {
            if let Some(i) = info.ch_names.iter().position(|n| n == name) {
                kinds[i] = kind.clone();
            }
        }
    }

    let locs = find_electrodes(dir)?
        .map(|p| read_electrodes_tsv(&p))
        .transpose()?
        .unwrap_or_default();

    let channels: Vec<BidsChannel> = info
        .ch_names
        .iter()
        .zip(&kinds)
        .map(|(name, kind)| BidsChannel {
            name: name.clone(),
            kind: kind.clone(),
            loc: locs.get(name).cloned().unwrap_or_default(),
        })
        .collect();

    let events_tsv = path.sidecar_path(root, "events", "tsv");
    let annotations = if events_tsv.exists() {
        read_events_tsv(&events_tsv)?
    } else {
        Vec::new()
    };

    if data.nrows() != channels.len() {
        bail!("{} data rows but {} channels", data.nrows(), channels.len());
    }

    Ok(RawBids { data, sfreq: info.sfreq, channels, annotations })
}

/// Locate the `*_electrodes.tsv` sidecar in the recording's directory.
///
/// Electrode sheets omit the task/run entities, so they are found by scan
/// rather than by basename construction.
fn find_electrodes(dir: &Path) -> Result<Option<PathBuf>> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.ends_with("_electrodes.tsv") {
            return Ok(Some(path));
        }
    }
    Ok(None)
}
