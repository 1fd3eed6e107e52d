//! # bids2cnd — BIDS → CND conversion in pure Rust
//!
//! `bids2cnd` converts an EEG/MEG dataset in the standardized BIDS directory
//! layout into CND, the flat MATLAB-compatible container used for
//! stimulus-response analysis.  Every stage is native Rust: no Python, no
//! MATLAB, no C libraries.
//!
//! ## Pipeline overview
//!
//! ```text
//! dataset/ (BIDS)
//!   │
//!   ├─ bids::entity_values()   subjects × sessions × tasks × runs × suffixes
//!   ├─ bids::open_raw()        BrainVision data + channels/electrodes/events
//!   │        │
//!   │        ├─ neural channels ──▶ cnd::push_run()   per-subject CND record
//!   │        ├─ stim channels   ──▶ stim::push_run()  per-subject stim record
//!   │        └─ ref/misc chans  ──▶ extChan rows
//!   │
//!   └─ mat::write_mat()
//!        ├─▶ <out>/dataCND/dataSub<ID>.mat    ("neural" struct)
//!        └─▶ <out>/dataCND/dataStim<ID>.mat   ("stim" struct)
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use std::path::Path;
//! use bids2cnd::{convert_dataset, ConvertConfig};
//!
//! let summary = convert_dataset(
//!     Path::new("MEG-MASC"),
//!     Path::new("DataSetCND"),
//!     &ConvertConfig::default(),
//! ).unwrap();
//! println!("{} subjects written", summary.subjects_written);
//! ```
//!
//! ## Using the builders directly
//!
//! The two record builders are plain functions over [`ndarray`] arrays, so
//! synthetic data can be pushed through them without touching the
//! filesystem:
//!
//! ```
//! use bids2cnd::stim::rasterize;
//! use bids2cnd::bids::DecodedEvent;
//!
//! let events = vec![DecodedEvent { onset: 0.25, kind: "word".into() }];
//! let trials = rasterize(&events, &["word".into()], &[100], 100.0, 100.0);
//! assert_eq!(trials[0][[25, 0]], 1.0);
//! ```
pub mod bids;
pub mod cnd;
pub mod config;
pub mod convert;
pub mod mat;
pub mod stim;

// ── Crate-root re-exports ─────────────────────────────────────────────────
//
// Everything a downstream user is likely to need is available directly as
// `bids2cnd::Foo` without having to know the internal module layout.

// config
pub use config::ConvertConfig;

// bids — entity enumeration, raw reader, sidecars
pub use bids::{
    // high-level
    open_raw, RawBids, NotFound, BidsPath,
    entity_values, datatypes,
    // channels & events
    BidsChannel, ChannelGroup, group_indices,
    Annotation, DecodedEvent, decode_events,
    // BrainVision
    read_vhdr, read_eeg_data, VhdrInfo, BinaryFormat, Orientation,
};

// cnd — neural-record accumulator
pub use cnd::{ChanLoc, CndRecord, CndRun, ExtChannel, RunLabels};

// stim — stimulus-record accumulator
pub use stim::{rasterize, StimRecord, StimRun};

// mat — MAT-file writer
pub use mat::{write_mat, MatValue};

// convert — dataset driver
pub use convert::{convert_dataset, setup_dirs, ConvertSummary};
