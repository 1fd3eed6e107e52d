//! BIDS path construction.
//!
//! [`BidsPath`] names one subject/session/task/run/suffix combination and
//! knows where its files live: `sub-X/[ses-Y/]<datatype>/<basename>.<ext>`.
use std::path::{Path, PathBuf};

/// One recording slot in the BIDS hierarchy.
///
/// Optional entities that are absent in the dataset stay `None` and are
/// simply omitted from the basename.
#[derive(Debug, Clone)]
pub struct BidsPath<'a> {
    pub subject: &'a str,
    pub session: Option<&'a str>,
    pub task: Option<&'a str>,
    pub run: Option<&'a str>,
    /// Filename suffix; defaults to the datatype when absent, as raw BIDS
    /// recordings are named `…_<datatype>.<ext>`.
    pub suffix: Option<&'a str>,
    pub datatype: &'a str,
}

impl BidsPath<'_> {
    /// Basename without extension, e.g. `sub-01_task-listen_run-02_eeg`.
    pub fn basename(&self) -> String {
        let mut parts = vec![format!("sub-{}", self.subject)];
        if let Some(ses) = self.session {
            parts.push(format!("ses-{ses}"));
        }
        if let Some(task) = self.task {
            parts.push(format!("task-{task}"));
        }
        if let Some(run) = self.run {
            parts.push(format!("run-{run}"));
        }
        parts.push(self.suffix.unwrap_or(self.datatype).to_string());
        parts.join("_")
    }

    /// Directory holding the recording: `root/sub-X/[ses-Y/]<datatype>/`.
    pub fn data_dir(&self, root: &Path) -> PathBuf {
        let mut dir = root.join(format!("sub-{}", self.subject));
        if let Some(ses) = self.session {
            dir = dir.join(format!("ses-{ses}"));
        }
        dir.join(self.datatype)
    }

    /// Path of the raw-recording header (`.vhdr`).
    pub fn header_path(&self, root: &Path) -> PathBuf {
        self.data_dir(root).join(format!("{}.vhdr", self.basename()))
    }

    /// Path of a sidecar sharing all entities, e.g. suffix `"channels"`,
    /// ext `"tsv"` → `…_channels.tsv`.
    pub fn sidecar_path(&self, root: &Path, suffix: &str, ext: &str) -> PathBuf {
        let base = self.basename();
        let stem = match base.rfind('_') {
            Some(i) => &base[..i],
            None => base.as_str(),
        };
        self.data_dir(root).join(format!("{stem}_{suffix}.{ext}"))
    }
}
