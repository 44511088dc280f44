//! Stowage command-line solver

use std::io;

use anyhow::{Context, anyhow};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stowage::{
    cli::{PackArgs, prompt_bin_count},
    config::SolveConfig,
    datasets::load_problem,
    report::Report,
    solvers::{
        Solver,
        milp::{MilpSolver, renderers::typst::TypstRenderer},
    },
};

fn main() -> anyhow::Result<()> {
    let args = PackArgs::parse();

    let mut config = match &args.config {
        Some(path) => SolveConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => SolveConfig::default(),
    };

    args.apply_to(&mut config);

    init_tracing(config.log_level())?;

    let problem = load_problem(&args.items, &args.bins)?;

    info!(
        items = problem.items().len(),
        pool = problem.pool_size(),
        "loaded problem"
    );

    let bins_to_use = match config.bins_to_use {
        Some(bins_to_use) => bins_to_use,
        None => prompt_bin_count(&problem, io::stdin().lock(), io::stdout())?,
    };

    let instance = problem.instance(bins_to_use)?;
    let solver = MilpSolver::from_config(&config)?;

    let packing = match &args.out {
        Some(path) => {
            let mut renderer = TypstRenderer::new(path.clone());
            let packing = solver.solve_with_observer(&instance, &mut renderer)?;

            renderer
                .write()
                .with_context(|| format!("writing formulation to {}", path.display()))?;

            info!(path = %path.display(), "wrote formulation");

            packing
        }
        None => solver.solve(&instance)?,
    };

    Report::new(instance, &packing).write_to(io::stdout().lock())?;

    Ok(())
}

/// Log to stderr so stdout only carries the report. `RUST_LOG` wins over the configuration.
fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_err) => EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level {log_level:?}"))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow!("failed to initialise logging: {err}"))
}
