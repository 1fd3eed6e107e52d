//! Minimal TSV parsing for BIDS sidecars.
//!
//! BIDS sidecars are plain tab-separated tables with a mandatory header row
//! and `n/a` for missing values.  No quoting or escaping is defined, so none
//! is implemented.
use std::path::Path;

use anyhow::{bail, Context, Result};

/// A parsed TSV table: header names plus rows of string cells.
#[derive(Debug)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&text)
            .with_context(|| format!("parsing {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());
        let header = match lines.next() {
            Some(h) => h,
            None => bail!("empty TSV"),
        };
        let columns: Vec<String> = header.split('\t').map(|s| s.trim().to_string()).collect();
        let mut rows = Vec::new();
        for (i, line) in lines.enumerate() {
            let cells: Vec<String> = line.split('\t').map(|s| s.trim().to_string()).collect();
            if cells.len() != columns.len() {
                bail!("row {} has {} cells, header has {}", i + 2, cells.len(), columns.len());
            }
            rows.push(cells);
        }
        Ok(Table { columns, rows })
    }

    /// Index of a named column.
    pub fn column(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .with_context(|| format!("missing TSV column {name:?}"))
    }

    /// Cell value, with `n/a` mapped to `None`.
    pub fn cell<'a>(&'a self, row: usize, col: usize) -> Option<&'a str> {
        let v = self.rows[row][col].as_str();
        if v == "n/a" || v.is_empty() {
            None
        } else {
            Some(v)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_rows() {
        let t = Table::parse("name\ttype\nFz\tEEG\nMISC1\tMISC\n").unwrap();
        assert_eq!(t.columns, vec!["name", "type"]);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.cell(1, t.column("type").unwrap()), Some("MISC"));
    }

    #[test]
    fn na_is_none() {
        let t = Table::parse("x\ty\n1\tn/a\n").unwrap();
        assert_eq!(t.cell(0, 1), None);
    }

    #[test]
    fn ragged_row_is_an_error() {
        assert!(Table::parse("a\tb\n1\n").is_err());
    }
}
