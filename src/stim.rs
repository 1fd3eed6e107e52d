//! Stimulus-record accumulator and onset rasterization.
//!
//! A [`StimRecord`] collects one `[T_stim, n_feats]` indicator matrix per
//! trial.  Normally the matrices are rasterized from event annotations; when
//! the recording's stimulus *channels* carry actual signal, the record is
//! built from that channel data instead.
//!
//! `stim_idxs` and `cond_idxs` are fully recomputed from the accumulated
//! trial count on every append.
use ndarray::Array2;

use crate::bids::{decode_events, Annotation, BidsChannel, DecodedEvent};
use crate::cnd::{char_cell, RunLabels};
use crate::mat::MatValue;

/// Accumulated stimulus data of one subject.
#[derive(Debug, Clone)]
pub struct StimRecord {
    /// Single joined feature-set name, e.g. `word + phoneme`.
    pub names: Vec<String>,
    /// Stimulus sampling rate in Hz.
    pub fs: f64,
    /// One `[T, n_feats]` matrix per trial.
    pub data: Vec<Array2<f64>>,
    /// 1-based trial enumeration, recomputed on every append.
    pub stim_idxs: Vec<f64>,
    /// Condition index per trial; single-condition datasets are all 1.
    pub cond_idxs: Vec<f64>,
    pub cond_names: Vec<String>,
    pub runs: Vec<String>,
    pub sessions: Vec<String>,
    pub suffixes: Vec<String>,
}

/// Input of one run for the stimulus builder.
#[derive(Debug)]
pub struct StimRun<'a> {
    /// Neural trial lengths in samples at `fs_data`; trial windows for the
    /// rasterizer and row counts for the output matrices.
    pub trial_lens: &'a [usize],
    /// Data sampling rate in Hz.
    pub fs_data: f64,
    /// Stimulus sampling rate in Hz.
    pub fs_stim: f64,
    pub annotations: &'a [Annotation],
    /// Requested feature names, one output column each.
    pub features: &'a [String],
    /// Stimulus-channel trials, each `[T, n_stim]`.
    pub stim_trials: Vec<Array2<f64>>,
    pub stim_channels: &'a [BidsChannel],
    pub labels: RunLabels<'a>,
}

/// Add one run to the accumulator, creating it on first call.
///
/// When any stimulus-channel sample is nonzero, the record is rebuilt from
/// that run's channel data alone (the channel-data path carries its own
/// feature names and does not mix with rasterized runs).
pub fn push_run(acc: &mut Option<StimRecord>, run: StimRun<'_>) {
    if run.stim_trials.iter().any(|tr| tr.iter().any(|&v| v != 0.0)) {
        *acc = Some(from_channel_data(&run));
        return;
    }

    let events = decode_events(run.annotations);
    let trials = rasterize(&events, run.features, run.trial_lens, run.fs_data, run.fs_stim);
    let n_new = trials.len();

    match acc {
        None => {
            let mut rec = StimRecord {
                names: vec![run.features.join(" + ")],
                fs: run.fs_stim,
                data: trials,
                stim_idxs: Vec::new(),
                cond_idxs: Vec::new(),
                cond_names: vec!["cond 1".into()],
                runs: Vec::new(),
                sessions: Vec::new(),
                suffixes: Vec::new(),
            };
            extend_labels(&mut rec, &run.labels, n_new);
            rec.recompute_idxs();
            *acc = Some(rec);
        }
        Some(rec) => {
            rec.data.extend(trials);
            extend_labels(rec, &run.labels, n_new);
            rec.recompute_idxs();
        }
    }
}

/// Rasterize event onsets into one `[trial_lens[j], n_feats]` indicator
/// matrix per trial.
///
/// An event populates feature column `i` when its `kind` is a substring of
/// `features[i]`.  Its scaled onset `round(onset · fs_stim)` is attributed
/// to the trial whose sample window *strictly* contains it: events landing
/// exactly on a window edge (including sample 0 of the first trial) are
/// dropped.  Window ends advance by `round(trial_len · fs_stim / fs_data)`.
pub fn rasterize(
    events: &[DecodedEvent],
    features: &[String],
    trial_lens: &[usize],
    fs_data: f64,
    fs_stim: f64,
) -> Vec<Array2<f64>> {
    let mut out: Vec<Array2<f64>> = trial_lens
        .iter()
        .map(|&len| Array2::zeros((len, features.len())))
        .collect();

    for (i, feat) in features.iter().enumerate() {
        let idxs: Vec<i64> = events
            .iter()
            .filter(|e| feat.contains(&e.kind))
            .map(|e| (e.onset * fs_stim).round() as i64)
            .collect();

        let mut curr_start = 0i64;
        for (j, &len) in trial_lens.iter().enumerate() {
            let curr_end = curr_start + (len as f64 * fs_stim / fs_data).round() as i64;
            for &idx in &idxs {
                if curr_start < idx && idx < curr_end {
                    let row = (idx - curr_start) as usize;
                    if row < out[j].nrows() {
                        out[j][[row, i]] = 1.0;
                    }
                }
            }
            curr_start = curr_end;
        }
    }
    out
}

/// Build the record directly from stimulus-channel signal.
fn from_channel_data(run: &StimRun<'_>) -> StimRecord {
    let joined = run
        .stim_channels
        .iter()
        .map(|ch| ch.name.as_str())
        .collect::<Vec<_>>()
        .join(" + ");
    let mut rec = StimRecord {
        names: vec![joined],
        fs: run.fs_stim,
        data: run.stim_trials.clone(),
        stim_idxs: Vec::new(),
        cond_idxs: Vec::new(),
        cond_names: vec!["cond 1".into()],
        runs: Vec::new(),
        sessions: Vec::new(),
        suffixes: Vec::new(),
    };
    let n = rec.data.len();
    extend_labels(&mut rec, &run.labels, n);
    rec.recompute_idxs();
    rec
}

fn extend_labels(rec: &mut StimRecord, labels: &RunLabels<'_>, n_new: usize) {
    if let Some(r) = labels.run {
        rec.runs.extend(std::iter::repeat(r.to_string()).take(n_new));
    }
    if let Some(s) = labels.session {
        rec.sessions.extend(std::iter::repeat(s.to_string()).take(n_new));
    }
    if let Some(s) = labels.suffix {
        rec.suffixes.extend(std::iter::repeat(s.to_string()).take(n_new));
    }
}

impl StimRecord {
    fn recompute_idxs(&mut self) {
        let n = self.data.len();
        self.stim_idxs = (1..=n).map(|i| i as f64).collect();
        self.cond_idxs = vec![1.0; n];
    }

    /// Serialize as the `stim` struct of `dataStim<ID>.mat`.
    pub fn to_mat(&self) -> MatValue {
        let mut fields = vec![
            ("names", char_cell(&self.names)),
            ("fs", MatValue::scalar(self.fs)),
            ("data", MatValue::Cell(self.data.iter().map(MatValue::matrix).collect())),
            ("stimIdxs", MatValue::row(&self.stim_idxs)),
            ("condIdxs", MatValue::row(&self.cond_idxs)),
            ("condNames", char_cell(&self.cond_names)),
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
}
