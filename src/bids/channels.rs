//! Channel metadata and grouping.
//!
//! Channel names and types come from the `channels.tsv` sidecar; spatial
//! locations from `electrodes.tsv` when present.  Each channel is assigned to
//! one of three groups that the CND format keeps apart: neural data,
//! stimulus/trigger channels, and auxiliary ("extra") channels.
use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;

use super::tsv::Table;

/// One recorded channel: name, BIDS type (lowercased), spatial location.
///
/// `loc` is empty when the dataset ships no `electrodes.tsv`; all channels of
/// a recording carry location vectors of the same length.
#[derive(Debug, Clone)]
pub struct BidsChannel {
    pub name: String,
    pub kind: String,
    pub loc: Vec<f64>,
}

/// The three CND channel groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelGroup {
    Neural,
    Stimulus,
    Extra,
}

impl BidsChannel {
    /// Group assignment from the channel type, by substring:
    /// `stim`/`trig` → [`ChannelGroup::Stimulus`], `ref`/`misc` →
    /// [`ChannelGroup::Extra`], anything else → [`ChannelGroup::Neural`].
    pub fn group(&self) -> ChannelGroup {
        let k = &self.kind;
        if k.contains("stim") || k.contains("trig") {
            ChannelGroup::Stimulus
        } else if k.contains("ref") || k.contains("misc") {
            ChannelGroup::Extra
        } else {
            ChannelGroup::Neural
        }
    }
}

/// Read `channels.tsv` into `(name, lowercased type)` pairs, in file order.
pub fn read_channels_tsv(path: &Path) -> Result<Vec<(String, String)>> {
    let table = Table::read(path)?;
    let name = table.column("name")?;
    let kind = table.column("type")?;
    let mut out = Vec::with_capacity(table.rows.len());
    for i in 0..table.rows.len() {
        let n = table.cell(i, name).unwrap_or_default().to_string();
        let k = table.cell(i, kind).unwrap_or_default().to_ascii_lowercase();
        out.push((n, k));
    }
    Ok(out)
}

/// Read `electrodes.tsv` into a name → `[x, y, z]` map.
///
/// Missing coordinates (`n/a`) become NaN, preserving "position unknown"
/// through to the output file.
pub fn read_electrodes_tsv(path: &Path) -> Result<HashMap<String, Vec<f64>>> {
    let table = Table::read(path)?;
    let name = table.column("name")?;
    let axes = [table.column("x")?, table.column("y")?, table.column("z")?];
    let mut out = HashMap::with_capacity(table.rows.len());
    for i in 0..table.rows.len() {
        let n = table.cell(i, name).unwrap_or_default().to_string();
        let loc: Vec<f64> = axes
            .iter()
            .map(|&c| {
                table
                    .cell(i, c)
                    .and_then(|v| v.parse::<f64>().ok())
                    .unwrap_or(f64::NAN)
            })
            .collect();
        out.insert(n, loc);
    }
    Ok(out)
}

/// Partition channel indices into (neural, stimulus, extra).
pub fn group_indices(channels: &[BidsChannel]) -> (Vec<usize>, Vec<usize>, Vec<usize>) {
    let mut neural = Vec::new();
    let mut stim = Vec::new();
    let mut extra = Vec::new();
    for (i, ch) in channels.iter().enumerate() {
        match ch.group() {
            ChannelGroup::Neural => neural.push(i),
            ChannelGroup::Stimulus => stim.push(i),
            ChannelGroup::Extra => extra.push(i),
        }
    }
    (neural, stim, extra)
}
