// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use dfe_engine::config::{RunConfig, SimConfig};
use dfe_engine::report::RunReport;
use dfe_engine::test_helpers::start_test;
use dfe_engine::tracker::build_file_tracker;

#[test]
fn report_survives_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.yaml");

    let run = RunConfig::default().with_num_words(3);
    let mut sim = start_test(file!(), &SimConfig::default());
    sim.run(&run).unwrap();

    let report = RunReport::new(&sim, &run);
    report.write_to_file(&path).unwrap();
    let loaded = RunReport::from_file(&path).unwrap();

    assert_eq!(loaded, report);
    assert_eq!(loaded.tx.len(), 21);
    assert_eq!(loaded.trajectory.len(), 8);
    assert_eq!(loaded.ber, Some(sim.bit_error_rate().unwrap()));
}

#[test]
fn empty_run_has_no_ber() {
    let run = RunConfig::default().with_num_words(0);
    let mut sim = start_test(file!(), &SimConfig::default());
    sim.run(&run).unwrap();

    let report = RunReport::new(&sim, &run);
    assert_eq!(report.ber, None);
    assert!(report.tx.is_empty());
}

#[test]
fn symbols_must_be_bipolar() {
    let yaml = RunReport::new(
        &start_test(file!(), &SimConfig::default()),
        &RunConfig::default(),
    )
    .to_yaml()
    .unwrap()
    .replace("tx: []", "tx: [0]");
    let err = RunReport::from_yaml(&yaml).unwrap_err();
    assert!(format!("{err}").contains("a symbol must be either -1 or 1"));
}

#[test]
fn text_tracker_writes_one_line_per_symbol() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.txt");

    let tracker = build_file_tracker(&path).unwrap();
    let mut sim = start_test(file!(), &SimConfig::default()).with_tracker(tracker);
    sim.run(&RunConfig::default().with_num_words(2)).unwrap();

    let trace = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = trace.lines().collect();
    assert_eq!(lines.len(), 14);
    assert!(lines[0].starts_with("0: tx -1 sample -1.0000 rx -1"));
    assert!(lines[13].starts_with("13: "));
}
