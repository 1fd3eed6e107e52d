//! Event annotations from `events.tsv`.
//!
//! MEG-MASC style datasets store the annotation payload as a Python-dict
//! string in the `trial_type` column:
//!
//! ```text
//! onset   duration   trial_type
//! 0.50    0.20       {'kind': 'word', 'word': 'the'}
//! ```
//!
//! The payload is decoded as JSON after swapping single quotes for double
//! quotes; only the `kind` tag is used downstream.
use std::path::Path;

use anyhow::Result;

use super::tsv::Table;

/// One timestamped event as read from disk.
#[derive(Debug, Clone)]
pub struct Annotation {
    /// Onset in seconds from recording start.
    pub onset: f64,
    /// Duration in seconds (0 for instantaneous markers).
    pub duration: f64,
    /// Raw description payload (Python-dict / JSON string).
    pub description: String,
}

/// An annotation with its description decoded down to the `kind` tag.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEvent {
    pub onset: f64,
    pub kind: String,
}

/// Read `events.tsv`.  The description is taken from `trial_type`, falling
/// back to a `description` column if present; rows with neither are kept
/// with an empty description.
pub fn read_events_tsv(path: &Path) -> Result<Vec<Annotation>> {
    let table = Table::read(path)?;
    let onset = table.column("onset")?;
    let duration = table.column("duration").ok();
    let desc = table
        .column("trial_type")
        .or_else(|_| table.column("description"))
        .ok();

    let mut out = Vec::with_capacity(table.rows.len());
    for i in 0..table.rows.len() {
        let onset = table
            .cell(i, onset)
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(f64::NAN);
        let duration = duration
            .and_then(|c| table.cell(i, c))
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(0.0);
        let description = desc
            .and_then(|c| table.cell(i, c))
            .unwrap_or_default()
            .to_string();
        out.push(Annotation { onset, duration, description });
    }
    Ok(out)
}

/// Decode annotation descriptions into [`DecodedEvent`]s.
///
/// Annotations whose description is not a JSON object with a string `kind`
/// are dropped; they cannot populate any stimulus feature.
pub fn decode_events(annotations: &[Annotation]) -> Vec<DecodedEvent> {
    annotations
        .iter()
        .filter_map(|a| {
            let json = a.description.replace('\'', "\"");
            let value: serde_json::Value = serde_json::from_str(&json).ok()?;
            let kind = value.get("kind")?.as_str()?.to_string();
            Some(DecodedEvent { onset: a.onset, kind })
        })
        .collect()
}
