//! Native BIDS dataset reader.
//!
//! Implements the subset of the BIDS layout this converter needs, with no
//! Python dependency: entity enumeration, path construction, BrainVision
//! raw data, and the `channels` / `electrodes` / `events` TSV sidecars.
//!
//! # Quick start
//! ```no_run
//! use std::path::Path;
//! use bids2cnd::bids::{entity_values, open_raw, BidsPath};
//!
//! let root = Path::new("dataset");
//! let subjects = entity_values(root, "subject").unwrap();
//! let path = BidsPath {
//!     subject: &subjects[0],
//!     session: None, task: Some("listen"), run: Some("01"),
//!     suffix: None, datatype: "eeg",
//! };
//! let raw = open_raw(root, &path).unwrap();
//! println!("{} channels @ {} Hz", raw.channels.len(), raw.sfreq);
//! ```
pub mod brainvision;
pub mod channels;
pub mod entities;
pub mod events;
pub mod path;
pub mod raw;
pub mod tsv;

// Re-export the most commonly used items.
pub use brainvision::{parse_vhdr, read_eeg_data, read_vhdr, BinaryFormat, Orientation, VhdrInfo};
pub use channels::{group_indices, read_channels_tsv, read_electrodes_tsv, BidsChannel, ChannelGroup};
pub use entities::{datatypes, entity_values, parse_entities, DATATYPES};
pub use events::{decode_events, read_events_tsv, Annotation, DecodedEvent};
pub use path::BidsPath;
pub use raw::{open_raw, NotFound, RawBids};
