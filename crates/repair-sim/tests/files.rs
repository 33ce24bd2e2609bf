//! Design files, sweep configs and exported results on disk

#![allow(clippy::unwrap_used)]

use repair_sim::{
    catalog, export, run_design, BlockDesign, CsvSink, FaultKind, OutputFormat, ResultRecord,
    SweepConfig,
};
use std::fs;
use std::io::BufWriter;
use tempfile::TempDir;

#[test]
fn load_design_by_extension() {
    let dir = TempDir::new().unwrap();

    let toml_path = dir.path().join("triangle.toml");
    fs::write(&toml_path, "blocks = [[0, 1], [1, 2], [2, 0]]\n").unwrap();
    let design = BlockDesign::load(&toml_path).unwrap();
    assert_eq!(design.name.as_deref(), Some("triangle"));
    assert_eq!(design.len(), 3);

    let json_path = dir.path().join("ignored-stem.json");
    fs::write(
        &json_path,
        r#"{"name": "fano", "blocks": [[0,1,3],[0,2,6],[0,4,5],[1,2,4],[1,5,6],[2,3,5],[3,4,6]]}"#,
    )
    .unwrap();
    let design = BlockDesign::load(&json_path).unwrap();
    assert_eq!(design.name.as_deref(), Some("fano"));
    assert_eq!(design.parameters(), catalog::get("7,7,3,3,1").unwrap().parameters());
}

#[test]
fn load_rejects_missing_and_empty_designs() {
    let dir = TempDir::new().unwrap();
    assert!(BlockDesign::load(dir.path().join("absent.toml")).is_err());

    let empty = dir.path().join("empty.toml");
    fs::write(&empty, "blocks = []\n").unwrap();
    assert!(BlockDesign::load(&empty).unwrap_err().is_configuration());
}

#[test]
fn sweep_config_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sweep.toml");
    fs::write(
        &path,
        r#"
probabilities = [1.0, 0.8, 0.6]
fault_kinds = ["permanent"]
algorithms = ["stored_grouped_participants", "random_participants"]
trials = 12
max_contacts = 500
seed = 77
parallel = false
"#,
    )
    .unwrap();

    let config = SweepConfig::load(&path).unwrap();
    assert_eq!(config.cell_count(), 6);
    assert_eq!(config.fault_kinds, vec![FaultKind::Permanent]);
    assert_eq!(config.max_contacts, 500);
    assert!(!config.parallel);
}

#[test]
fn csv_export_round_trips_through_a_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("7,7,3,3,1-BIBD_results.csv");

    let report = run_design(
        &catalog::get("7,7,3,3,1").unwrap(),
        SweepConfig::default().with_trials(10).with_parallel(false),
    )
    .unwrap();

    let file = fs::File::create(&path).unwrap();
    let mut sink = CsvSink::new(BufWriter::new(file));
    export(&report, &mut sink).unwrap();
    drop(sink);

    let text = fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    let header = lines.next().unwrap();
    assert_eq!(header.split(',').count(), ResultRecord::COLUMNS.len());
    // Design name contains commas, so data rows are quoted.
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), report.cells.len());
    assert!(rows.iter().all(|row| row.starts_with("\"7,7,3,3,1\",")));
}

#[test]
fn boxed_sinks_write_every_format() {
    let report = run_design(
        &catalog::get("9,12,4,3,1").unwrap(),
        SweepConfig::default()
            .with_trials(5)
            .with_probabilities([repair_sim::Probability::ALWAYS]),
    )
    .unwrap();

    for format in [OutputFormat::Table, OutputFormat::Csv, OutputFormat::Json] {
        let mut buffer = Vec::new();
        {
            let mut sink = format.sink(&mut buffer);
            export(&report, sink.as_mut()).unwrap();
        }
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("stored_grouped_participants"), "{format}");
    }
}
