//! MILP Model Builder
//!
//! Translates an [`Instance`] into a [`Formulation`]:
//!
//! - one binary variable `x[i,j]` per item `i` and active bin `j`
//! - `Σ_j x[i,j] <= 1` for every item
//! - `Σ_i weight[i] · x[i,j] <= capacity[j]` for every bin
//! - maximise `Σ_i Σ_j value[i] · x[i,j]`

use crate::{
    problem::Instance,
    solvers::{
        SolverError,
        milp::{
            formulation::{ConstraintKind, Formulation, LinearExpr, VarId, u64_to_f64_exact},
            observer::MilpObserver,
        },
    },
};

/// Assignment variables `x[i,j]` in a dense item-major table.
#[derive(Debug, Clone)]
pub struct AssignmentVars {
    bin_count: usize,
    vars: Vec<VarId>,
}

impl AssignmentVars {
    /// Variable deciding whether `item_idx` goes into `bin_idx`.
    pub fn get(&self, item_idx: usize, bin_idx: usize) -> Option<VarId> {
        if bin_idx >= self.bin_count {
            return None;
        }

        item_idx
            .checked_mul(self.bin_count)
            .and_then(|row| row.checked_add(bin_idx))
            .and_then(|idx| self.vars.get(idx))
            .copied()
    }

    /// Number of items covered by the table.
    pub fn item_count(&self) -> usize {
        self.vars.len().checked_div(self.bin_count).unwrap_or(0)
    }

    /// Number of bins covered by the table.
    pub fn bin_count(&self) -> usize {
        self.bin_count
    }

    /// Total number of assignment variables.
    pub(crate) fn len(&self) -> usize {
        self.vars.len()
    }
}

fn coefficient(value: u64) -> Result<f64, SolverError> {
    // `good_lp` stores coefficients as `f64`. Only integers <= 2^53 are exact in an
    // IEEE-754 mantissa; anything larger would silently change the model.
    u64_to_f64_exact(value).ok_or(SolverError::CoefficientNotRepresentable { value })
}

/// Build the packing formulation for an instance.
///
/// # Errors
///
/// Returns [`SolverError::CoefficientNotRepresentable`] if a weight, value or capacity
/// cannot be represented exactly as a solver coefficient.
pub fn build_formulation<O: MilpObserver + ?Sized>(
    instance: &Instance<'_>,
    observer: &mut O,
) -> Result<(Formulation, AssignmentVars), SolverError> {
    let mut formulation = Formulation::new();
    let bin_count = instance.bin_count();
    let mut vars = Vec::with_capacity(instance.item_count() * bin_count);

    for (item_idx, item) in instance.items().iter().enumerate() {
        let value = coefficient(item.value())?;

        for bin_idx in 0..bin_count {
            let var = formulation.add_binary_variable();
            observer.on_assignment_variable(item_idx, bin_idx, var);

            formulation.add_to_objective(var, value);
            observer.on_objective_term(var, value);

            vars.push(var);
        }
    }

    let vars = AssignmentVars { bin_count, vars };

    // Each item can be in at most one bin.
    for item_idx in 0..instance.item_count() {
        let mut lhs = LinearExpr::default();

        for bin_idx in 0..bin_count {
            lhs.add_term(assignment_var(&vars, item_idx, bin_idx)?, 1.0);
        }

        observer.on_single_assignment_constraint(item_idx, &lhs);
        formulation.add_leq_constraint(ConstraintKind::SingleAssignment { item_idx }, lhs, 1.0);
    }

    // The weight packed in each bin cannot exceed its capacity.
    for (bin_idx, bin) in instance.bins().iter().enumerate() {
        let capacity = coefficient(bin.capacity())?;
        let mut lhs = LinearExpr::default();

        for (item_idx, item) in instance.items().iter().enumerate() {
            lhs.add_term(
                assignment_var(&vars, item_idx, bin_idx)?,
                coefficient(item.weight())?,
            );
        }

        observer.on_capacity_constraint(bin_idx, &lhs, capacity);
        formulation.add_leq_constraint(ConstraintKind::Capacity { bin_idx }, lhs, capacity);
    }

    Ok((formulation, vars))
}

fn assignment_var(
    vars: &AssignmentVars,
    item_idx: usize,
    bin_idx: usize,
) -> Result<VarId, SolverError> {
    vars.get(item_idx, bin_idx)
        .ok_or(SolverError::InvariantViolation {
            message: "assignment variable missing for item/bin pair",
        })
}
