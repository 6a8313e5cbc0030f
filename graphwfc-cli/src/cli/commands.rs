//! Command implementations and argument parsing for the graphwfc CLI.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use graphwfc_core::{GenerationConfigBuilder, GraphWfcError, Generator};
use graphwfc_io::{Exporter, GraphWfcIoError, Reader};
use thiserror::Error;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "graphwfc",
    about = "Synthesize a labeled graph by entropy-guided pattern generation."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Train on an input graph and synthesize a new one from it.
    Run(RunCommand),
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to the training graph's edges file.
    #[arg(long)]
    pub edges: PathBuf,

    /// Path to the training graph's labels file.
    #[arg(long)]
    pub labels: PathBuf,

    /// Ego-network radius used for pattern extraction and compatibility.
    #[arg(long, default_value_t = 1)]
    pub radius: usize,

    /// Output size as a multiple of the training graph's node count.
    #[arg(long = "size-factor", default_value_t = 1)]
    pub size_factor: usize,

    /// Fraction of the target size at which the growth phase may stop.
    #[arg(long = "lower-cap", default_value_t = 0.9)]
    pub lower_cap: f64,

    /// Multiple of the target size the cleanup phase must not exceed.
    #[arg(long = "upper-cap", default_value_t = 1.1)]
    pub upper_cap: f64,

    /// Percentile of the training degree sequence used to derive the
    /// expansion cap.
    #[arg(long = "expansion-percentile", default_value_t = 0.9)]
    pub expansion_percentile: f64,

    /// Slack multiplier applied on top of `expansion_percentile`.
    #[arg(long = "expansion-slack", default_value_t = 1.1)]
    pub expansion_slack: f64,

    /// Seed for the deterministic RNG driving every weighted-sampling
    /// decision.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Path to write the synthesized graph's edges file.
    #[arg(long = "out-edges")]
    pub out_edges: PathBuf,

    /// Path to write the synthesized graph's labels file.
    #[arg(long = "out-labels")]
    pub out_labels: PathBuf,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading the training graph or writing the output graph failed.
    #[error(transparent)]
    Io(#[from] GraphWfcIoError),
    /// Configuration validation or generation failed.
    #[error(transparent)]
    Core(#[from] GraphWfcError),
}

/// Summarises the outcome of executing a `run` command.
#[derive(Debug, Clone)]
pub struct GenerationSummary {
    /// Number of nodes in the training graph.
    pub training_nodes: usize,
    /// Number of cells in the synthesized output graph.
    pub output_nodes: usize,
    /// Number of undirected edges in the synthesized output graph.
    pub output_edges: usize,
    /// Open edge slots left unconnected when generation stopped.
    pub open_stubs_remaining: usize,
    /// Whether every cell in the output graph was collapsed.
    pub all_collapsed: bool,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading, configuration, generation, or export
/// fails.
pub fn run_cli(cli: Cli) -> Result<GenerationSummary, CliError> {
    match cli.command {
        Command::Run(run) => run_command(run),
    }
}

pub(super) fn run_command(command: RunCommand) -> Result<GenerationSummary, CliError> {
    let training_graph = Reader::load(&command.edges, &command.labels)?;
    let training_nodes = training_graph.node_count();

    let config = GenerationConfigBuilder::new()
        .with_radius(command.radius)
        .with_size_factor(command.size_factor)
        .with_lower_cap(command.lower_cap)
        .with_upper_cap(command.upper_cap)
        .with_expansion_percentile(command.expansion_percentile)
        .with_expansion_slack(command.expansion_slack)
        .with_rng_seed(command.seed)
        .build()?;

    let report = Generator::run(&training_graph, config)?;
    let output_edges: usize = report.adjacency().values().map(|neighbors| neighbors.len()).sum::<usize>() / 2;
    let summary = GenerationSummary {
        training_nodes,
        output_nodes: report.cells().len(),
        output_edges,
        open_stubs_remaining: report.open_stubs_remaining(),
        all_collapsed: report.all_collapsed(),
    };

    Exporter::export(report.cells(), report.adjacency(), &command.out_edges, &command.out_labels)?;

    Ok(summary)
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &GenerationSummary, mut writer: impl Write) -> io::Result<()> {
    writeln!(writer, "training nodes: {}", summary.training_nodes)?;
    writeln!(writer, "output nodes: {}", summary.output_nodes)?;
    writeln!(writer, "output edges: {}", summary.output_edges)?;
    writeln!(writer, "open stubs remaining: {}", summary.open_stubs_remaining)?;
    writeln!(writer, "all collapsed: {}", summary.all_collapsed)?;
    Ok(())
}
