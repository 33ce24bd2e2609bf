//! CLI command handler tests

#![allow(clippy::unwrap_used)]

use repair_cli::commands::designs::{handle_designs_command, DesignsCommand};
use repair_cli::commands::run::{handle_run_command, result_path, RunCommand};
use repair_sim::{catalog, FaultKind, OutputFormat, Probability, RepairAlgorithm};
use std::fs;
use tempfile::TempDir;

fn quick_run() -> RunCommand {
    RunCommand {
        trials: Some(5),
        probabilities: vec![Probability::ALWAYS, Probability::new(0.5).unwrap()],
        sequential: true,
        ..RunCommand::default()
    }
}

#[test]
fn designs_lists_whole_catalogue() {
    let mut out: Vec<u8> = Vec::new();
    handle_designs_command(&DesignsCommand::default(), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    for name in catalog::names() {
        assert!(text.contains(name), "{name} missing");
    }
    assert!(text.contains("(7, 7, 3, 3, 1)"));

    let mut out: Vec<u8> = Vec::new();
    handle_designs_command(&DesignsCommand { json: true }, &mut out).unwrap();
    let lines: Vec<serde_json::Value> = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), catalog::all().len());
    assert_eq!(lines[0]["parameters"]["k"], 3);
}

#[test]
fn flags_override_config_file() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("sweep.toml");
    fs::write(
        &config_path,
        concat!(
            "trials = 40\n",
            "seed = 3\n",
            "fault_kinds = [\"Transient\"]\n",
            "algorithms = [\"random_participants\"]\n",
        ),
    )
    .unwrap();

    let cmd = RunCommand {
        config: Some(config_path),
        seed: Some(11),
        fault_kinds: vec![FaultKind::Permanent],
        ..RunCommand::default()
    };
    let config = cmd.sweep_config().unwrap();
    assert_eq!(config.trials, 40);
    assert_eq!(config.seed, 11);
    assert_eq!(config.fault_kinds, vec![FaultKind::Permanent]);
    assert_eq!(config.algorithms, vec![RepairAlgorithm::RandomWalk]);
    assert!(config.parallel);
}

#[test]
fn invalid_overrides_are_rejected() {
    let cmd = RunCommand {
        trials: Some(0),
        ..RunCommand::default()
    };
    assert!(cmd.sweep_config().is_err());

    let cmd = RunCommand {
        design: Some("8,8,8,8,8".into()),
        ..RunCommand::default()
    };
    let err = cmd.designs().unwrap_err().to_string();
    assert!(err.contains("7,7,3,3,1"), "{err}");
}

#[test]
fn single_design_to_stdout() {
    let cmd = RunCommand {
        design: Some("7,7,3,3,1".into()),
        format: OutputFormat::Csv,
        ..quick_run()
    };
    let mut out: Vec<u8> = Vec::new();
    let written = handle_run_command(&cmd, &mut out).unwrap();
    assert!(written.is_empty());

    let text = String::from_utf8(out).unwrap();
    // Header plus 3 algorithms x 2 fault kinds x 2 probabilities.
    assert_eq!(text.lines().count(), 1 + 12);
}

#[test]
fn all_designs_to_stdout_share_one_csv_header() {
    let cmd = RunCommand {
        format: OutputFormat::Csv,
        algorithms: vec![RepairAlgorithm::StoredGrouping],
        ..quick_run()
    };
    let mut out: Vec<u8> = Vec::new();
    let written = handle_run_command(&cmd, &mut out).unwrap();
    assert!(written.is_empty());

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with("Design,Algorithm"));
    assert_eq!(text.matches("Design,Algorithm").count(), 1);
    // 2 fault kinds x 2 probabilities per design.
    assert_eq!(lines.len(), 1 + catalog::all().len() * 2 * 2);
    for name in catalog::names() {
        let quoted = format!("\"{name}\",");
        assert_eq!(lines.iter().filter(|line| line.starts_with(&quoted)).count(), 4);
    }
}

#[test]
fn all_designs_to_directory() {
    let dir = TempDir::new().unwrap();
    let out_dir = dir.path().join("results");
    let cmd = RunCommand {
        format: OutputFormat::Json,
        output: Some(out_dir.clone()),
        algorithms: vec![RepairAlgorithm::StoredGrouping],
        ..quick_run()
    };

    let mut out: Vec<u8> = Vec::new();
    let written = handle_run_command(&cmd, &mut out).unwrap();
    assert!(out.is_empty());
    assert_eq!(written.len(), catalog::all().len());

    let fano = result_path(&out_dir, "7,7,3,3,1", OutputFormat::Json);
    assert!(written.contains(&fano));
    let text = fs::read_to_string(&fano).unwrap();
    assert_eq!(text.lines().count(), 2 * 2);
    assert!(text.contains("\"Algorithm\":\"stored_grouped_participants\""));
}

#[test]
fn design_file_to_single_output_file() {
    let dir = TempDir::new().unwrap();
    let design_path = dir.path().join("square.toml");
    fs::write(
        &design_path,
        "name = \"square\"\nblocks = [[0, 1], [1, 2], [2, 3], [3, 0]]\n",
    )
    .unwrap();
    let output = dir.path().join("square.txt");

    let cmd = RunCommand {
        design_file: Some(design_path),
        output: Some(output.clone()),
        ..quick_run()
    };
    let written = handle_run_command(&cmd, &mut Vec::<u8>::new()).unwrap();
    assert_eq!(written, vec![output.clone()]);

    let table = fs::read_to_string(&output).unwrap();
    assert!(table.starts_with("algorithm"));
    assert!(table.contains("stored_intersecting_participants"));
}
