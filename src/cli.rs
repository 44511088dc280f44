//! Command-line interface
//!
//! Argument parsing for the `stowage` binary and the interactive bin-count prompt.

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use clap::Parser;
use thiserror::Error;

use crate::{
    config::SolveConfig,
    problem::{Problem, ProblemError},
};

/// Errors raised while prompting for a bin count.
#[derive(Debug, Error)]
pub enum PromptError {
    /// IO error reading the answer or writing the prompt
    #[error("Failed to prompt for the number of bins: {0}")]
    Io(#[from] io::Error),

    /// Input ended before a valid answer was given
    #[error("Input ended before a valid number of bins was entered")]
    EndOfInput,
}

/// Pack items into bins to maximise their total value.
#[derive(Debug, Parser)]
#[command(name = "stowage", about = "Multiple knapsack packing solver", long_about = None)]
pub struct PackArgs {
    /// Items CSV with `weight,value` columns
    #[arg(long, default_value = "fixtures/items/example.csv")]
    pub items: PathBuf,

    /// Bins CSV with a `capacity` column
    #[arg(long, default_value = "fixtures/bins/example.csv")]
    pub bins: PathBuf,

    /// Number of bins to use; prompted for when neither this nor the configuration sets it
    #[arg(short = 'm', long)]
    pub bins_to_use: Option<usize>,

    /// YAML solve configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Solver time limit in seconds
    #[arg(long)]
    pub time_limit: Option<f64>,

    /// Log filter directive, e.g. `info` or `stowage=debug`
    #[arg(long)]
    pub log_level: Option<String>,

    /// Write the MILP formulation as a Typst document
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

impl PackArgs {
    /// Override configuration values with the flags that were given.
    pub fn apply_to(&self, config: &mut SolveConfig) {
        if let Some(bins_to_use) = self.bins_to_use {
            config.bins_to_use = Some(bins_to_use);
        }

        if let Some(time_limit) = self.time_limit {
            config.time_limit_secs = Some(time_limit);
        }

        if let Some(log_level) = &self.log_level {
            config.log_level = Some(log_level.clone());
        }
    }
}

/// Ask for the number of bins to use until a valid answer is given.
///
/// Non-integer and out-of-range answers are reported on `output` and asked again.
///
/// # Errors
///
/// Returns [`PromptError::EndOfInput`] if `input` ends first, or [`PromptError::Io`] if
/// reading or writing fails.
pub fn prompt_bin_count<R: BufRead, W: Write>(
    problem: &Problem,
    mut input: R,
    mut output: W,
) -> Result<usize, PromptError> {
    let pool = problem.pool_size();
    let mut line = String::new();

    loop {
        write!(output, "Enter the number of bins to use (1 to {pool}): ")?;
        output.flush()?;

        line.clear();

        if input.read_line(&mut line)? == 0 {
            return Err(PromptError::EndOfInput);
        }

        match problem.parse_bin_count(&line) {
            Ok(bins_to_use) => return Ok(bins_to_use),
            Err(ProblemError::BinCountOutOfRange { .. }) => {
                writeln!(output, "Please enter a number between 1 and {pool}.")?;
            }
            Err(_) => {
                writeln!(output, "Invalid input. Please enter a valid integer.")?;
            }
        }
    }
}
