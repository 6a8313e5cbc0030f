//! Command-line interface orchestration for the graphwfc synthesis pipeline.
//!
//! The CLI offers a single `run` command that loads a training graph from a
//! pair of edge/label text files, synthesizes a new graph from it, and
//! writes the result to another such pair.

mod commands;

pub use commands::{Cli, CliError, Command, GenerationSummary, RunCommand, render_summary, run_cli};

#[cfg(test)]
mod tests;
