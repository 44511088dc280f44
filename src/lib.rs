//! Stowage
//!
//! Stowage packs weighted, valued items into a chosen number of capacity-limited bins,
//! maximising the total packed value with an exact MILP solver.

pub mod bins;
pub mod cli;
pub mod config;
pub mod datasets;
pub mod items;
pub mod packing;
pub mod prelude;
pub mod problem;
pub mod report;
pub mod solvers;
