//! MILP Observer

use crate::solvers::milp::formulation::{LinearExpr, VarId};

/// Observer trait for capturing the MILP formulation as it's built.
///
/// The builder stays the only implementation of model construction; observers
/// passively record what happens for rendering or analysis purposes.
pub trait MilpObserver {
    /// Called when the assignment variable `x[item_idx, bin_idx]` is created.
    fn on_assignment_variable(&mut self, item_idx: usize, bin_idx: usize, var: VarId);

    /// Called when a term is added to the objective function.
    ///
    /// # Parameters
    ///
    /// - `var`: The decision variable
    /// - `coefficient`: Value gained by setting `var` to 1
    fn on_objective_term(&mut self, _var: VarId, _coefficient: f64) {}

    /// Called when the "at most one bin" constraint of an item is added.
    fn on_single_assignment_constraint(&mut self, item_idx: usize, lhs: &LinearExpr);

    /// Called when the capacity constraint of a bin is added.
    ///
    /// # Parameters
    ///
    /// - `bin_idx`: Index of the active bin
    /// - `lhs`: Weighted sum of the bin's assignment variables
    /// - `capacity`: Right-hand side of the `<=` constraint
    fn on_capacity_constraint(&mut self, bin_idx: usize, lhs: &LinearExpr, capacity: f64);
}

/// No-op observer for unobserved solves.
#[derive(Debug, Default)]
pub struct NoopObserver;

impl MilpObserver for NoopObserver {
    fn on_assignment_variable(&mut self, _: usize, _: usize, _: VarId) {}

    fn on_single_assignment_constraint(&mut self, _: usize, _: &LinearExpr) {}

    fn on_capacity_constraint(&mut self, _: usize, _: &LinearExpr, _: f64) {}
}
