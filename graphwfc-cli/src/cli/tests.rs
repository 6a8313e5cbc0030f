//! Unit tests for the CLI commands and argument parsing.

use super::commands::run_command;
use super::{Cli, CliError, Command, RunCommand, render_summary, run_cli};

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use graphwfc_core::GraphWfcError;
use rstest::rstest;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

fn create_file(dir: &TempDir, name: &str, contents: &str) -> io::Result<PathBuf> {
    let path = dir.path().join(name);
    let mut file = File::create(&path)?;
    file.write_all(contents.as_bytes())?;
    Ok(path)
}

fn line_graph_command(dir: &TempDir, out_edges: PathBuf, out_labels: PathBuf) -> io::Result<RunCommand> {
    let edges = create_file(dir, "edges.txt", "0 1\n1 2\n")?;
    let labels = create_file(dir, "labels.txt", "0 1\n1 2\n2 1\n")?;
    Ok(RunCommand {
        edges,
        labels,
        radius: 1,
        size_factor: 1,
        lower_cap: 0.9,
        upper_cap: 1.1,
        expansion_percentile: 0.9,
        expansion_slack: 1.1,
        seed: 7,
        out_edges,
        out_labels,
    })
}

#[rstest]
fn run_command_writes_output_files() -> TestResult {
    let dir = temp_dir();
    let out_edges = dir.path().join("out-edges.txt");
    let out_labels = dir.path().join("out-labels.txt");
    let command = line_graph_command(&dir, out_edges.clone(), out_labels.clone())?;

    let summary = run_command(command)?;

    assert_eq!(summary.training_nodes, 3);
    assert!(summary.output_nodes > 0);
    assert!(out_edges.exists());
    assert!(out_labels.exists());
    Ok(())
}

#[rstest]
fn run_command_rejects_zero_radius() -> TestResult {
    let dir = temp_dir();
    let out_edges = dir.path().join("out-edges.txt");
    let out_labels = dir.path().join("out-labels.txt");
    let mut command = line_graph_command(&dir, out_edges, out_labels)?;
    command.radius = 0;

    let err = match run_command(command) {
        Ok(_) => panic!("zero radius must be rejected"),
        Err(err) => err,
    };
    assert!(matches!(
        err,
        CliError::Core(GraphWfcError::InvalidRadius { got: 0 })
    ));
    Ok(())
}

#[rstest]
fn run_cli_is_deterministic_under_fixed_seed() -> TestResult {
    let dir = temp_dir();
    let out_edges_a = dir.path().join("a-edges.txt");
    let out_labels_a = dir.path().join("a-labels.txt");
    let command_a = line_graph_command(&dir, out_edges_a.clone(), out_labels_a.clone())?;
    let cli_a = Cli {
        command: Command::Run(command_a),
    };
    run_cli(cli_a)?;

    let out_edges_b = dir.path().join("b-edges.txt");
    let out_labels_b = dir.path().join("b-labels.txt");
    let command_b = line_graph_command(&dir, out_edges_b.clone(), out_labels_b.clone())?;
    let cli_b = Cli {
        command: Command::Run(command_b),
    };
    run_cli(cli_b)?;

    assert_eq!(
        std::fs::read_to_string(&out_edges_a)?,
        std::fs::read_to_string(&out_edges_b)?
    );
    assert_eq!(
        std::fs::read_to_string(&out_labels_a)?,
        std::fs::read_to_string(&out_labels_b)?
    );
    Ok(())
}

#[rstest]
fn render_summary_outputs_key_fields() -> TestResult {
    let dir = temp_dir();
    let out_edges = dir.path().join("out-edges.txt");
    let out_labels = dir.path().join("out-labels.txt");
    let command = line_graph_command(&dir, out_edges, out_labels)?;
    let summary = run_command(command)?;

    let mut buffer = Vec::new();
    render_summary(&summary, &mut buffer)?;
    let text = String::from_utf8(buffer)?;
    assert!(text.contains("training nodes: 3"));
    assert!(text.contains("output nodes:"));
    Ok(())
}

#[rstest]
fn clap_rejects_missing_required_edges_argument() {
    let args = ["graphwfc", "run", "--labels", "labels.txt"];
    let result = Cli::try_parse_from(args);
    assert!(result.is_err());
}
