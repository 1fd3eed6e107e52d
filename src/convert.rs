//! Dataset-level conversion driver.
//!
//! Strictly sequential: one subject/session/task/run/suffix combination at a
//! time, accumulating into the two per-subject records and writing
//! `dataSub<ID>.mat` / `dataStim<ID>.mat` under `<output>/dataCND/`.
use std::path::Path;

use anyhow::{bail, Context, Result};
use ndarray::Axis;

use crate::bids::{self, group_indices, open_raw, BidsPath, NotFound};
use crate::cnd::{self, CndRecord, CndRun, RunLabels};
use crate::config::ConvertConfig;
use crate::mat::write_mat;
use crate::stim::{self, StimRecord, StimRun};

/// Counts reported after a conversion.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConvertSummary {
    pub subjects_written: usize,
    pub runs_converted: usize,
}

/// Create the output directory tree: `<out>/dataCND` and `<out>/Stimulus`.
pub fn setup_dirs(output: &Path) -> Result<()> {
    std::fs::create_dir_all(output.join("dataCND"))
        .with_context(|| format!("creating {}", output.join("dataCND").display()))?;
    std::fs::create_dir_all(output.join("Stimulus"))
        .with_context(|| format!("creating {}", output.join("Stimulus").display()))?;
    Ok(())
}

/// Absent entity → a single `None` placeholder so the loops still run once.
fn or_placeholder(values: Vec<String>) -> Vec<Option<String>> {
    if values.is_empty() {
        vec![None]
    } else {
        values.into_iter().map(Some).collect()
    }
}

/// Convert a whole BIDS dataset to CND.
///
/// Missing run combinations are skipped; a failed per-subject write is
/// logged and the subject loop continues (no rollback, no retry).
pub fn convert_dataset(input: &Path, output: &Path, cfg: &ConvertConfig) -> Result<ConvertSummary> {
    setup_dirs(output)?;

    let datatype = match &cfg.data_type {
        Some(dt) => dt.clone(),
        None => bids::datatypes(input)?
            .into_iter()
            .next()
            .unwrap_or_else(|| "eeg".to_string()),
    };

    let subjects = bids::entity_values(input, "subject")?;
    if subjects.is_empty() {
        bail!("no subjects found under {}", input.display());
    }
    let sessions = or_placeholder(bids::entity_values(input, "session")?);
    let tasks = or_placeholder(bids::entity_values(input, "task")?);
    let runs = or_placeholder(bids::entity_values(input, "run")?);
    let suffixes = or_placeholder(bids::entity_values(input, "suffix")?);

    let mut summary = ConvertSummary::default();

    for subject in &subjects {
        let mut a_cnd: Option<CndRecord> = None;
        let mut a_stim: Option<StimRecord> = None;

        for session in &sessions {
            for task in &tasks {
                for run in &runs {
                    for suffix in &suffixes {
                        let path = BidsPath {
                            subject,
                            session: session.as_deref(),
                            task: task.as_deref(),
                            run: run.as_deref(),
                            suffix: suffix.as_deref(),
                            datatype: &datatype,
                        };
                        let raw = match open_raw(input, &path) {
                            Ok(raw) => raw,
                            Err(e) if e.downcast_ref::<NotFound>().is_some() => continue,
                            Err(e) => return Err(e),
                        };
                        convert_run(&raw, &path, &datatype, cfg, &mut a_cnd, &mut a_stim);
                        summary.runs_converted += 1;
                        println!("converted {}", path.basename());
                    }
                }
            }
        }

        let Some(rec) = &a_cnd else {
            continue;
        };
        let sub_file = output.join("dataCND").join(format!("dataSub{subject}.mat"));
        let stim_file = output.join("dataCND").join(format!("dataStim{subject}.mat"));
        let written = write_mat(&sub_file, &[("neural", rec.to_mat())]).and_then(|()| {
            if let Some(s) = &a_stim {
                write_mat(&stim_file, &[("stim", s.to_mat())])?;
            }
            Ok(())
        });
        match written {
            Ok(()) => {
                summary.subjects_written += 1;
                println!("written → {}", sub_file.display());
            }
            Err(e) => eprintln!("sub-{subject}: write failed: {e:#}"),
        }
    }

    Ok(summary)
}

/// Split one recording into channel groups and feed both accumulators.
fn convert_run(
    raw: &bids::RawBids,
    path: &BidsPath<'_>,
    datatype: &str,
    cfg: &ConvertConfig,
    a_cnd: &mut Option<CndRecord>,
    a_stim: &mut Option<StimRecord>,
) {
    let (neural_idx, stim_idx, ext_idx) = group_indices(&raw.channels);
    let pick = |idxs: &[usize]| -> Vec<bids::BidsChannel> {
        idxs.iter().map(|&i| raw.channels[i].clone()).collect()
    };
    let neural_chans = pick(&neural_idx);
    let stim_chans = pick(&stim_idx);
    let ext_chans = pick(&ext_idx);

    // [C, T] → [T, C], one trial per run, columns selected per group.
    let full = raw.data.t();
    let trials = vec![full.select(Axis(1), &neural_idx)];
    let ext_trials = vec![full.select(Axis(1), &ext_idx)];
    let stim_trials = vec![full.select(Axis(1), &stim_idx)];
    let trial_lens: Vec<usize> = trials.iter().map(|t| t.nrows()).collect();

    let labels = RunLabels {
        run: path.run,
        session: path.session,
        suffix: path.suffix,
    };

    cnd::push_run(
        a_cnd,
        CndRun {
            trials,
            ext_trials,
            data_type: datatype,
            channels: &neural_chans,
            ext_channels: &ext_chans,
            fs: raw.sfreq,
            labels,
        },
    );
    stim::push_run(
        a_stim,
        StimRun {
            trial_lens: &trial_lens,
            fs_data: raw.sfreq,
            fs_stim: raw.sfreq,
            annotations: &raw.annotations,
            features: &cfg.stim_features,
            stim_trials,
            stim_channels: &stim_chans,
            labels,
        },
    );
}
