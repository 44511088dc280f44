//! Solution Interpreter
//!
//! Turns raw variable values back into a [`Packing`].

use crate::{
    packing::{BinLoad, Packing},
    problem::Instance,
    solvers::{
        SolverError,
        milp::{BINARY_THRESHOLD, backend::RawSolution, builder::AssignmentVars},
    },
};

/// Reconstruct the packing described by a raw solution.
///
/// Outcomes without an assignment produce an empty packing carrying the backend's
/// diagnostic; their values are never read.
///
/// # Errors
///
/// Returns a [`SolverError`] if a variable has no value or the reconstructed packing
/// breaks a packing invariant.
pub fn interpret(
    instance: &Instance<'_>,
    vars: &AssignmentVars,
    raw: RawSolution,
) -> Result<Packing, SolverError> {
    let status = raw.status();

    if !status.has_assignment() {
        return Ok(Packing::without_assignment(
            status,
            vars.len(),
            raw.into_detail(),
        ));
    }

    let values = raw.values();
    let mut loads = Vec::with_capacity(instance.bin_count());

    for (bin_idx, bin) in instance.bins().iter().enumerate() {
        let mut load = BinLoad::new(bin_idx, bin.capacity());

        for (item_idx, item) in instance.items().iter().enumerate() {
            let var = vars
                .get(item_idx, bin_idx)
                .ok_or(SolverError::InvariantViolation {
                    message: "assignment variable missing for item/bin pair",
                })?;

            let value = values
                .get(var.index())
                .ok_or(SolverError::InvariantViolation {
                    message: "solution is missing a variable value",
                })?;

            // `var` is a binary decision variable; the solver returns floats, so treat values
            // greater than 0.5 as "assigned" to tolerate tiny numerical noise.
            if *value > BINARY_THRESHOLD {
                load.push(item_idx, item)?;
            }
        }

        loads.push(load);
    }

    Ok(Packing::from_bin_loads(
        status,
        instance,
        loads,
        vars.len(),
    )?)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        bins::Bin,
        items::Item,
        packing::PackingViolation,
        problem::Problem,
        solvers::{
            SolveStatus,
            milp::{builder::build_formulation, observer::NoopObserver},
        },
    };

    use super::*;

    fn test_problem() -> Result<Problem, crate::problem::ProblemError> {
        Problem::new(
            [Item::new(2, 3), Item::new(3, 5), Item::new(4, 6)],
            [Bin::new(5), Bin::new(4)],
        )
    }

    /// Dense values with the given `(item, bin)` pairs set to `on` and the rest to `off`.
    fn values(
        vars: &AssignmentVars,
        assigned: &[(usize, usize)],
        on: f64,
        off: f64,
    ) -> Result<Vec<f64>, &'static str> {
        let mut values = vec![off; vars.len()];

        for &(item_idx, bin_idx) in assigned {
            let var = vars.get(item_idx, bin_idx).ok_or("missing variable")?;
            let slot = values.get_mut(var.index()).ok_or("missing slot")?;
            *slot = on;
        }

        Ok(values)
    }

    #[test]
    fn tolerates_values_slightly_off_binary() -> TestResult {
        let problem = test_problem()?;
        let instance = problem.instance(2)?;
        let (_formulation, vars) = build_formulation(&instance, &mut NoopObserver)?;

        let raw = RawSolution::solved(
            true,
            values(&vars, &[(0, 0), (1, 0), (2, 1)], 0.999_999_7, 1e-9)?,
        );

        let packing = interpret(&instance, &vars, raw)?;

        assert_eq!(packing.status(), SolveStatus::Optimal);
        assert_eq!(packing.total_value(), 14);

        let bin_0: Vec<usize> = packing
            .bin(0)
            .map(|load| load.item_indices().collect())
            .unwrap_or_default();

        assert_eq!(bin_0, vec![0, 1]);
        assert_eq!(packing.bin_of(2), Some(1));
        assert!(packing.unassigned_items().is_empty());

        Ok(())
    }

    #[test]
    fn feasible_status_is_preserved() -> TestResult {
        let problem = test_problem()?;
        let instance = problem.instance(2)?;
        let (_formulation, vars) = build_formulation(&instance, &mut NoopObserver)?;

        let raw = RawSolution::solved(false, values(&vars, &[(1, 1)], 1.0, 0.0)?);

        let packing = interpret(&instance, &vars, raw)?;

        assert_eq!(packing.status(), SolveStatus::Feasible);
        assert_eq!(packing.total_value(), 5);
        assert_eq!(packing.unassigned_items(), &[0, 2]);
        assert!(packing.is_plottable());

        Ok(())
    }

    #[test]
    fn outcomes_without_assignment_skip_values() -> TestResult {
        let problem = test_problem()?;
        let instance = problem.instance(2)?;
        let (_formulation, vars) = build_formulation(&instance, &mut NoopObserver)?;

        let infeasible = interpret(&instance, &vars, RawSolution::infeasible())?;
        let unknown = interpret(&instance, &vars, RawSolution::failed("out of memory"))?;

        assert_eq!(infeasible.status(), SolveStatus::Infeasible);
        assert!(!infeasible.is_plottable());
        assert!(infeasible.bins().is_empty());

        assert_eq!(unknown.status(), SolveStatus::Unknown);
        assert_eq!(unknown.detail(), Some("out of memory"));
        assert_eq!(unknown.variable_count(), 6);

        Ok(())
    }

    #[test]
    fn double_assignment_is_rejected() -> TestResult {
        let problem = test_problem()?;
        let instance = problem.instance(2)?;
        let (_formulation, vars) = build_formulation(&instance, &mut NoopObserver)?;

        let raw = RawSolution::solved(true, values(&vars, &[(0, 0), (0, 1)], 1.0, 0.0)?);

        let result = interpret(&instance, &vars, raw);

        assert!(matches!(
            result,
            Err(SolverError::InvalidPacking(
                PackingViolation::ItemAssignedTwice { item_idx: 0 }
            ))
        ));

        Ok(())
    }

    #[test]
    fn over_capacity_assignment_is_rejected() -> TestResult {
        let problem = test_problem()?;
        let instance = problem.instance(2)?;
        let (_formulation, vars) = build_formulation(&instance, &mut NoopObserver)?;

        let raw = RawSolution::solved(true, values(&vars, &[(0, 1), (1, 1)], 1.0, 0.0)?);

        let result = interpret(&instance, &vars, raw);

        assert!(matches!(
            result,
            Err(SolverError::InvalidPacking(
                PackingViolation::CapacityExceeded { bin_idx: 1, .. }
            ))
        ));

        Ok(())
    }

    #[test]
    fn truncated_values_are_an_invariant_violation() -> TestResult {
        let problem = test_problem()?;
        let instance = problem.instance(2)?;
        let (_formulation, vars) = build_formulation(&instance, &mut NoopObserver)?;

        let raw = RawSolution::solved(true, vec![0.0; 2]);

        let result = interpret(&instance, &vars, raw);

        assert!(matches!(
            result,
            Err(SolverError::InvariantViolation { .. })
        ));

        Ok(())
    }
}
