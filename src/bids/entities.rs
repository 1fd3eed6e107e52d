//! BIDS entity enumeration.
//!
//! A BIDS filename is a sequence of `key-value` entity tokens joined by
//! underscores, closed by a suffix and extension:
//!
//! ```text
//! sub-01_ses-0_task-listen_run-02_eeg.vhdr
//! └┬───┘ └┬──┘ └┬─────────┘ └┬───┘ └┬┘ └┬─┘
//!  subject session  task      run  suffix extension
//! ```
//!
//! [`entity_values`] walks the dataset and collects every distinct value of
//! one entity; [`datatypes`] collects the datatype directory names
//! (`eeg/`, `meg/`, …) present under subject/session folders.
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Datatype directory names recognised under `sub-*/[ses-*/]`.
pub const DATATYPES: &[&str] = &["eeg", "meg", "ieeg", "nirs"];

/// Raw-recording header extension this crate reads.
pub const RAW_EXTENSION: &str = "vhdr";

/// Top-level directories excluded from entity scans.
fn is_ignored(name: &str) -> bool {
    name.starts_with('.') || matches!(name, "derivatives" | "sourcedata" | "code" | "stimuli")
}

fn walk_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("listing {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_ignored(&name) {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            walk_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

/// Split a BIDS basename into `(entities, suffix)`.
///
/// Only the part before the first `.` is considered.  Tokens without a `-`
/// other than the final one are skipped.
pub fn parse_entities(basename: &str) -> (Vec<(String, String)>, Option<String>) {
    let stem = basename.split('.').next().unwrap_or(basename);
    let tokens: Vec<&str> = stem.split('_').collect();
    let mut entities = Vec::new();
    let mut suffix = None;
    for (i, tok) in tokens.iter().enumerate() {
        match tok.split_once('-') {
            Some((k, v)) if !k.is_empty() && !v.is_empty() => {
                entities.push((k.to_string(), v.to_string()));
            }
            _ => {
                if i == tokens.len() - 1 && !tok.is_empty() {
                    suffix = Some(tok.to_string());
                }
            }
        }
    }
    (entities, suffix)
}

/// Map a long entity name (`"subject"`, `"session"`, …) to its filename key.
fn entity_key(entity: &str) -> Result<&'static str> {
    Ok(match entity {
        "subject" => "sub",
        "session" => "ses",
        "task" => "task",
        "run" => "run",
        other => bail!("unknown BIDS entity: {other:?}"),
    })
}

/// Collect the sorted, deduplicated values of one entity across the dataset.
///
/// `entity` is a long name (`"subject"`, `"session"`, `"task"`, `"run"`) or
/// `"suffix"`.  Suffix values are only taken from raw-recording headers
/// (`.vhdr`), so sidecar suffixes like `channels` or `events` never leak into
/// the run loops.
pub fn entity_values(root: &Path, entity: &str) -> Result<Vec<String>> {
    let mut files = Vec::new();
    walk_files(root, &mut files)?;

    let mut values = BTreeSet::new();
    for path in &files {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.starts_with("sub-") {
            continue;
        }
        let (entities, suffix) = parse_entities(name);
        if entity == "suffix" {
            let is_raw = name.rsplit('.').next() == Some(RAW_EXTENSION);
            if is_raw {
                if let Some(s) = suffix {
                    values.insert(s);
                }
            }
        } else {
            let key = entity_key(entity)?;
            for (k, v) in entities {
                if k == key {
                    values.insert(v);
                }
            }
        }
    }
    Ok(values.into_iter().collect())
}

/// Collect the datatype directory names present in the dataset.
pub fn datatypes(root: &Path) -> Result<Vec<String>> {
    let mut found = BTreeSet::new();
    let subjects = fs::read_dir(root)
        .with_context(|| format!("listing {}", root.display()))?;
    for entry in subjects {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with("sub-") || !entry.path().is_dir() {
            continue;
        }
        scan_datatype_dirs(&entry.path(), &mut found)?;
    }
    Ok(found.into_iter().collect())
}

fn scan_datatype_dirs(dir: &Path, found: &mut BTreeSet<String>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if DATATYPES.contains(&name.as_str()) {
            found.insert(name);
        } else if name.starts_with("ses-") {
            scan_datatype_dirs(&entry.path(), found)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_basename() {
        let (ents, suffix) = parse_entities("sub-01_ses-0_task-listen_run-02_eeg.vhdr");
        assert_eq!(ents, vec![
            ("sub".to_string(), "01".to_string()),
            ("ses".to_string(), "0".to_string()),
            ("task".to_string(), "listen".to_string()),
            ("run".to_string(), "02".to_string()),
        ]);
        assert_eq!(suffix.as_deref(), Some("eeg"));
    }

    #[test]
    fn parse_without_suffix() {
        let (ents, suffix) = parse_entities("sub-01_run-1");
        assert_eq!(ents.len(), 2);
        assert_eq!(suffix, None);
    }

    #[test]
    fn unknown_entity_is_an_error() {
        assert!(entity_key("banana").is_err());
    }
}
