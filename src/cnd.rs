//! CND neural-record accumulator.
//!
//! A [`CndRecord`] collects every run of one subject: trial data for the
//! neural channel group, per-channel location records, row-vector data for
//! each auxiliary channel, and run/session/suffix label vectors that grow in
//! lockstep with the trial count.
//!
//! The first run initializes the structure (including the `chanlocs`
//! reshape from location vectors into per-channel records); later runs
//! append.  All runs of a subject must share the same channel layout.
use ndarray::{Array2, Axis};

use crate::bids::BidsChannel;
use crate::mat::MatValue;

/// Entity labels of one run; `None` entities contribute no labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunLabels<'a> {
    pub run: Option<&'a str>,
    pub session: Option<&'a str>,
    pub suffix: Option<&'a str>,
}

/// Per-channel location record: channel name plus one `locs<i>` value per
/// component of the source location vector.
#[derive(Debug, Clone)]
pub struct ChanLoc {
    pub name: String,
    pub loc: Vec<f64>,
}

/// One auxiliary channel: description plus one `[1, T]` row per trial.
#[derive(Debug, Clone)]
pub struct ExtChannel {
    pub description: String,
    pub data: Vec<Array2<f64>>,
}

/// Accumulated neural data of one subject.
#[derive(Debug, Clone)]
pub struct CndRecord {
    /// Uppercased datatype, e.g. `EEG`.
    pub data_type: String,
    pub chanlocs: Vec<ChanLoc>,
    /// Sampling rate in Hz.
    pub fs: f64,
    /// One `[T, C]` matrix per trial, across all runs.
    pub data: Vec<Array2<f64>>,
    pub ext_chan: Vec<ExtChannel>,
    pub runs: Vec<String>,
    pub sessions: Vec<String>,
    pub suffixes: Vec<String>,
}

/// Input of one run for the CND builder.
#[derive(Debug)]
pub struct CndRun<'a> {
    /// Neural trials, each `[T, C]`.
    pub trials: Vec<Array2<f64>>,
    /// Extra-channel trials, each `[T, n_ext]` (same trial count).
    pub ext_trials: Vec<Array2<f64>>,
    pub data_type: &'a str,
    pub channels: &'a [BidsChannel],
    pub ext_channels: &'a [BidsChannel],
    pub fs: f64,
    pub labels: RunLabels<'a>,
}

/// Add one run to the accumulator, creating it on first call.
pub fn push_run(acc: &mut Option<CndRecord>, run: CndRun<'_>) {
    let n_new = run.trials.len();
    match acc {
        None => {
            let chanlocs = run
                .channels
                .iter()
                .map(|ch| ChanLoc { name: ch.name.clone(), loc: ch.loc.clone() })
                .collect();
            let ext_chan = run
                .ext_channels
                .iter()
                .enumerate()
                .map(|(a, ch)| ExtChannel {
                    description: ch.name.clone(),
                    data: run.ext_trials.iter().map(|tr| column_as_row(tr, a)).collect(),
                })
                .collect();
            let mut rec = CndRecord {
                data_type: run.data_type.to_ascii_uppercase(),
                chanlocs,
                fs: run.fs,
                data: run.trials,
                ext_chan,
                runs: Vec::new(),
                sessions: Vec::new(),
                suffixes: Vec::new(),
            };
            extend_labels(&mut rec, &run.labels, n_new);
            *acc = Some(rec);
        }
        Some(rec) => {
            rec.data.extend(run.trials);
            for (a, ext) in rec.ext_chan.iter_mut().enumerate() {
                ext.data
                    .extend(run.ext_trials.iter().map(|tr| column_as_row(tr, a)));
            }
            extend_labels(rec, &run.labels, n_new);
        }
    }
}

/// Extract column `a` of a `[T, n]` trial as a `[1, T]` row.
fn column_as_row(trial: &Array2<f64>, a: usize) -> Array2<f64> {
    trial.column(a).insert_axis(Axis(0)).to_owned()
}

fn extend_labels(rec: &mut CndRecord, labels: &RunLabels<'_>, n_new: usize) {
    if let Some(run) = labels.run {
        rec.runs.extend(std::iter::repeat(run.to_string()).take(n_new));
    }
    if let Some(ses) = labels.session {
        rec.sessions.extend(std::iter::repeat(ses.to_string()).take(n_new));
    }
    if let Some(suf) = labels.suffix {
        rec.suffixes.extend(std::iter::repeat(suf.to_string()).take(n_new));
    }
}

impl CndRecord {
    /// Serialize as the `neural` struct of `dataSub<ID>.mat`.
    ///
    /// `chanlocs` is written as a struct array with fields `name` and
    /// `locs1..locsK`; label fields are omitted when the corresponding
    /// entity is absent from the dataset.
    pub fn to_mat(&self) -> MatValue {
        let mut fields = vec![
            ("dataType", MatValue::Char(self.data_type.clone())),
            ("chanlocs", self.chanlocs_mat()),
            ("fs", MatValue::scalar(self.fs)),
            ("data", MatValue::Cell(self.data.iter().map(MatValue::matrix).collect())),
            ("extChan", self.ext_chan_mat()),
        ];
        if !self.runs.is_empty() {
            fields.push(("runs", char_cell(&self.runs)));
        }
        if !self.sessions.is_empty() {
            fields.push(("sessions", char_cell(&self.sessions)));
        }
        if !self.suffixes.is_empty() {
            fields.push(("suffixes", char_cell(&self.suffixes)));
        }
        MatValue::struct_single(fields)
    }

    fn chanlocs_mat(&self) -> MatValue {
        let loc_len = self.chanlocs.first().map_or(0, |c| c.loc.len());
        let mut names = vec!["name".to_string()];
        names.extend((1..=loc_len).map(|i| format!("locs{i}")));
        let elements = self
            .chanlocs
            .iter()
            .map(|ch| {
                let mut vals = vec![MatValue::Char(ch.name.clone())];
                vals.extend(ch.loc.iter().map(|&v| MatValue::scalar(v)));
                vals
            })
            .collect();
        MatValue::Struct { fields: names, elements }
    }

    fn ext_chan_mat(&self) -> MatValue {
        let elements = self
            .ext_chan
            .iter()
            .map(|ext| {
                vec![
                    MatValue::Char(ext.description.clone()),
                    MatValue::Cell(ext.data.iter().map(MatValue::matrix).collect()),
                ]
            })
            .collect();
        MatValue::Struct {
            fields: vec!["description".into(), "data".into()],
            elements,
        }
    }
}

pub(crate) fn char_cell(labels: &[String]) -> MatValue {
    MatValue::Cell(labels.iter().map(|s| MatValue::Char(s.clone())).collect())
}
