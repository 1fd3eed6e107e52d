mod common;

use common::{write_electrodes, write_run, RunFixture};
use ndarray::Array2;

use bids2cnd::bids::{
    datatypes, entity_values, open_raw, read_eeg_data, read_vhdr, BidsPath, ChannelGroup, NotFound,
};

fn fixture<'a>(subject: &'a str, run: &'a str, data: Array2<f64>) -> RunFixture<'a> {
    RunFixture {
        subject,
        task: "listen",
        run,
        sfreq: 100.0,
        channels: &[("Fz", "EEG"), ("Cz", "EEG"), ("STI101", "TRIG"), ("MISC1", "MISC")],
        data,
        events: &[(0.25, "word"), (0.30, "phoneme")],
    }
}

#[test]
fn entities_are_enumerated_sorted_and_deduplicated() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    write_run(root, &fixture("02", "01", Array2::zeros((4, 50))));
    write_run(root, &fixture("01", "01", Array2::zeros((4, 50))));
    write_run(root, &fixture("01", "02", Array2::zeros((4, 50))));

    assert_eq!(entity_values(root, "subject").unwrap(), vec!["01", "02"]);
    assert_eq!(entity_values(root, "run").unwrap(), vec!["01", "02"]);
    assert_eq!(entity_values(root, "task").unwrap(), vec!["listen"]);
    assert_eq!(entity_values(root, "session").unwrap(), Vec::<String>::new());
    // Sidecar suffixes (channels, events) must not leak into the suffix list.
    assert_eq!(entity_values(root, "suffix").unwrap(), vec!["eeg"]);
    assert_eq!(datatypes(root).unwrap(), vec!["eeg"]);
}

#[test]
fn derivatives_are_ignored() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    write_run(root, &fixture("01", "01", Array2::zeros((4, 50))));
    write_run(&root.join("derivatives"), &fixture("99", "01", Array2::zeros((4, 50))));

    assert_eq!(entity_values(root, "subject").unwrap(), vec!["01"]);
}

#[test]
fn open_raw_reads_data_channels_and_events() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    let mut data = Array2::zeros((4, 50));
    data[[0, 10]] = 3.5;
    data[[3, 49]] = -1.0;
    write_run(root, &fixture("01", "01", data));
    write_electrodes(root, "01", &[("Fz", 0.1, 0.2, 0.3), ("Cz", 0.0, 0.0, 0.1)]);

    let path = BidsPath {
        subject: "01",
        session: None,
        task: Some("listen"),
        run: Some("01"),
        suffix: Some("eeg"),
        datatype: "eeg",
    };
    let raw = open_raw(root, &path).unwrap();

    assert_eq!(raw.data.dim(), (4, 50));
    approx::assert_abs_diff_eq!(raw.sfreq, 100.0, epsilon = 1e-9);
    approx::assert_abs_diff_eq!(raw.data[[0, 10]], 3.5, epsilon = 1e-6);
    approx::assert_abs_diff_eq!(raw.data[[3, 49]], -1.0, epsilon = 1e-6);

    assert_eq!(raw.channels.len(), 4);
    assert_eq!(raw.channels[0].group(), ChannelGroup::Neural);
    assert_eq!(raw.channels[2].group(), ChannelGroup::Stimulus);
    assert_eq!(raw.channels[3].group(), ChannelGroup::Extra);
    assert_eq!(raw.channels[0].loc, vec![0.1, 0.2, 0.3]);
    assert!(raw.channels[2].loc.is_empty());

    assert_eq!(raw.annotations.len(), 2);
    approx::assert_abs_diff_eq!(raw.annotations[0].onset, 0.25, epsilon = 1e-12);
    assert!(raw.annotations[0].description.contains("word"));
}

#[test]
fn int16_vectorized_data_is_resolution_scaled() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();

    let vhdr = "\
Brain Vision Data Exchange Header File Version 1.0
[Common Infos]
DataFile=rec.eeg
DataFormat=BINARY
DataOrientation=VECTORIZED
NumberOfChannels=2
SamplingInterval=10000
[Binary Infos]
BinaryFormat=INT_16
[Channel Infos]
Ch1=Fz,,0.5,\u{b5}V
Ch2=Cz,,2,\u{b5}V
";
    std::fs::write(dir.join("rec.vhdr"), vhdr).unwrap();

    // Vectorized: all of Fz, then all of Cz.
    let raw: [i16; 6] = [10, -20, 7, -300, 5, 8];
    let bytes: Vec<u8> = raw.iter().flat_map(|v| v.to_le_bytes()).collect();
    std::fs::write(dir.join("rec.eeg"), bytes).unwrap();

    let info = read_vhdr(&dir.join("rec.vhdr")).unwrap();
    let data = read_eeg_data(&dir.join("rec.eeg"), &info).unwrap();

    assert_eq!(data.dim(), (2, 3));
    // Fz scaled by 0.5.
    approx::assert_abs_diff_eq!(data[[0, 0]], 5.0, epsilon = 1e-12);
    approx::assert_abs_diff_eq!(data[[0, 1]], -10.0, epsilon = 1e-12);
    approx::assert_abs_diff_eq!(data[[0, 2]], 3.5, epsilon = 1e-12);
    // Cz scaled by 2.
    approx::assert_abs_diff_eq!(data[[1, 0]], -600.0, epsilon = 1e-12);
    approx::assert_abs_diff_eq!(data[[1, 2]], 16.0, epsilon = 1e-12);
}

#[test]
fn missing_run_is_a_downcastable_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    write_run(root, &fixture("01", "01", Array2::zeros((4, 50))));

    let path = BidsPath {
        subject: "01",
        session: None,
        task: Some("listen"),
        run: Some("07"),
        suffix: Some("eeg"),
        datatype: "eeg",
    };
    let err = open_raw(root, &path).unwrap_err();
    assert!(err.downcast_ref::<NotFound>().is_some(), "unexpected error: {err:#}");
}
