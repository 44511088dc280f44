//! Stowage prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    bins::Bin,
    config::{ConfigError, SolveConfig},
    datasets::{Dataset, DatasetError, load_problem, read_bins, read_items},
    items::Item,
    packing::{BinLayout, BinLoad, ItemSegment, PackedItem, Packing, PackingViolation},
    problem::{Instance, Problem, ProblemError},
    report::{Report, ReportError},
    solvers::{
        SolveStatus, Solver, SolverError,
        milp::{
            Backend, GoodLpBackend, MilpObserver, MilpSolver, NoopObserver,
            renderers::typst::{TypstRenderError, TypstRenderer},
        },
    },
};
