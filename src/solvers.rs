//! Solvers for bin packing problems

use std::fmt;

use thiserror::Error;

use crate::{
    packing::{Packing, PackingViolation},
    problem::{Instance, ProblemError},
};

pub mod milp;

/// Solver Errors
///
/// These are fatal: a solve that merely fails to find an assignment is reported
/// through [`SolveStatus`] instead.
#[derive(Debug, Error)]
pub enum SolverError {
    /// Weight, value or capacity cannot be represented exactly as a solver coefficient.
    #[error("{value} cannot be represented exactly as a solver coefficient")]
    CoefficientNotRepresentable {
        /// The offending weight, value or capacity
        value: u64,
    },

    /// Wrapped problem error
    #[error(transparent)]
    Problem(#[from] ProblemError),

    /// The reconstructed packing breaks a packing invariant.
    #[error("solver returned an invalid packing: {0}")]
    InvalidPacking(#[from] PackingViolation),

    /// Internal solver invariant was violated (this is a bug).
    #[error("solver invariant violated: {message}")]
    InvariantViolation {
        /// What invariant was violated
        message: &'static str,
    },
}

/// Terminal outcome of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    /// Proven optimal assignment.
    Optimal,

    /// Valid assignment found, optimality not proven.
    Feasible,

    /// No assignment satisfies the constraints.
    Infeasible,

    /// The solver failed before finding any feasible assignment.
    Unknown,
}

impl SolveStatus {
    /// Returns true if the outcome carries a concrete assignment that may be
    /// reported or plotted.
    pub fn has_assignment(self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }

    /// User-facing explanation of the outcome.
    pub fn message(self) -> &'static str {
        match self {
            Self::Optimal => "An optimal packing was found.",
            Self::Feasible => "A feasible but suboptimal packing was found.",
            Self::Infeasible => {
                "The problem is infeasible, no packing exists that satisfies the constraints."
            }
            Self::Unknown => "The problem does not have a feasible or optimal packing.",
        }
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Optimal => "optimal",
            Self::Feasible => "feasible",
            Self::Infeasible => "infeasible",
            Self::Unknown => "unknown",
        };

        f.write_str(name)
    }
}

/// Trait for solving packing problems
pub trait Solver {
    /// Pack the instance's items into its active bins.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the model cannot be built or the result breaks a
    /// packing invariant. Infeasible and failed solves are reported through
    /// [`Packing::status`], not as errors.
    fn solve(&self, instance: &Instance<'_>) -> Result<Packing, SolverError>;
}
