//! MILP Solver
//!
//! Runs build → solve → interpret as one blocking call:
//!
//! 1. [`builder::build_formulation`] records the variables, constraints and objective.
//! 2. A [`Backend`] maximises the objective.
//! 3. [`interpret::interpret`] rounds the values and reconstructs the [`Packing`].

use tracing::{debug, info, info_span, warn};

use crate::{
    config::{ConfigError, SolveConfig},
    packing::{BinLoad, Packing},
    problem::Instance,
    solvers::{SolveStatus, Solver, SolverError},
};

pub mod backend;
pub mod builder;
pub mod formulation;
pub mod interpret;
pub mod observer;
pub mod renderers;

pub use backend::{Backend, GoodLpBackend, RawSolution};
pub use observer::{MilpObserver, NoopObserver};

/// Binary threshold for determining truthiness
pub const BINARY_THRESHOLD: f64 = 0.5;

/// Solver using Mixed Integer Linear Programming (MILP)
#[derive(Debug, Clone, Default)]
pub struct MilpSolver<B = GoodLpBackend> {
    backend: B,
}

impl MilpSolver {
    /// Create a solver using the default `good_lp` backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a solver honouring the configured time limit.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTimeLimit`] if the configured limit is not valid.
    pub fn from_config(config: &SolveConfig) -> Result<Self, ConfigError> {
        let backend = match config.time_limit()? {
            Some(limit) => GoodLpBackend::new().with_time_limit(limit),
            None => GoodLpBackend::new(),
        };

        Ok(Self { backend })
    }
}

impl<B: Backend> MilpSolver<B> {
    /// Create a solver using a specific backend.
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    /// The backend used for solving.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Solve an instance, reporting the formulation to an observer as it is built.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stowage::{
    ///     bins::Bin,
    ///     items::Item,
    ///     problem::Problem,
    ///     solvers::{SolveStatus, milp::{MilpSolver, NoopObserver}},
    /// };
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let problem = Problem::new(
    ///     [Item::new(2, 3), Item::new(3, 5), Item::new(4, 6)],
    ///     [Bin::new(5)],
    /// )?;
    ///
    /// let packing = MilpSolver::new().solve_with_observer(&problem.instance(1)?, &mut NoopObserver)?;
    ///
    /// assert_eq!(packing.status(), SolveStatus::Optimal);
    /// assert_eq!(packing.total_value(), 8);
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the model cannot be built or the backend returns
    /// an assignment that breaks a packing invariant.
    pub fn solve_with_observer(
        &self,
        instance: &Instance<'_>,
        observer: &mut dyn MilpObserver,
    ) -> Result<Packing, SolverError> {
        let span = info_span!(
            "solve",
            items = instance.item_count(),
            bins = instance.bin_count(),
            backend = self.backend.name()
        );
        let _guard = span.enter();

        // Return early if there is nothing to pack
        if instance.item_count() == 0 {
            let loads = instance
                .bins()
                .iter()
                .enumerate()
                .map(|(bin_idx, bin)| BinLoad::new(bin_idx, bin.capacity()))
                .collect();

            debug!("no items to pack");

            return Ok(Packing::from_bin_loads(
                SolveStatus::Optimal,
                instance,
                loads,
                0,
            )?);
        }

        let oversized = instance.oversized_items().count();

        if oversized > 0 {
            debug!(oversized, "some items fit no active bin");
        }

        let (formulation, vars) = builder::build_formulation(instance, observer)?;

        debug!(
            variables = formulation.variable_count(),
            constraints = formulation.constraints().len(),
            "built formulation"
        );

        let raw = self.backend.solve(&formulation)?;
        let packing = interpret::interpret(instance, &vars, raw)?;

        match packing.status() {
            SolveStatus::Optimal | SolveStatus::Feasible => info!(
                status = %packing.status(),
                total_value = packing.total_value(),
                total_weight = packing.total_weight(),
                unassigned = packing.unassigned_items().len(),
                "solve finished"
            ),
            SolveStatus::Infeasible | SolveStatus::Unknown => warn!(
                status = %packing.status(),
                detail = packing.detail(),
                "solve finished without an assignment"
            ),
        }

        Ok(packing)
    }
}

impl<B: Backend> Solver for MilpSolver<B> {
    fn solve(&self, instance: &Instance<'_>) -> Result<Packing, SolverError> {
        self.solve_with_observer(instance, &mut NoopObserver)
    }
}
