//! MILP Backends
//!
//! A [`Backend`] takes a [`Formulation`] and returns the values of its variables together
//! with the outcome. [`GoodLpBackend`] delegates to `good_lp`, using HiGHS when the
//! `solver-highs` feature is enabled (the default) and the pure Rust microlp solver
//! otherwise. microlp has no branching heuristics and is only practical for small or
//! asymmetric instances.

use std::time::Duration;

use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolutionStatus, SolverModel,
    Variable, variable,
};
use tracing::{debug, warn};

#[cfg(feature = "solver-highs")]
use good_lp::solvers::highs::highs as default_solver;
#[cfg(all(not(feature = "solver-highs"), feature = "solver-microlp"))]
use good_lp::solvers::microlp::microlp as default_solver;

use crate::solvers::{
    SolveStatus, SolverError,
    milp::formulation::{Formulation, LinearConstraint, LinearExpr},
};

/// Raw outcome of a backend solve.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSolution {
    status: SolveStatus,
    values: Vec<f64>,
    detail: Option<String>,
}

impl RawSolution {
    /// A solve that produced variable values.
    ///
    /// `proven_optimal` selects between [`SolveStatus::Optimal`] and [`SolveStatus::Feasible`].
    pub fn solved(proven_optimal: bool, values: Vec<f64>) -> Self {
        let status = if proven_optimal {
            SolveStatus::Optimal
        } else {
            SolveStatus::Feasible
        };

        Self {
            status,
            values,
            detail: None,
        }
    }

    /// A solve that proved no assignment exists.
    pub fn infeasible() -> Self {
        Self {
            status: SolveStatus::Infeasible,
            values: Vec::new(),
            detail: None,
        }
    }

    /// A solve that failed before finding any feasible point.
    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            status: SolveStatus::Unknown,
            values: Vec::new(),
            detail: Some(detail.into()),
        }
    }

    /// Outcome of the solve
    pub fn status(&self) -> SolveStatus {
        self.status
    }

    /// Dense variable values, indexed by [`VarId::index`](super::formulation::VarId::index).
    /// Empty unless the status has an assignment.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Diagnostic for failed solves
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub(crate) fn into_detail(self) -> Option<String> {
        self.detail
    }
}

/// Exact integer-programming backend.
pub trait Backend {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Maximise the formulation's objective subject to its constraints.
    ///
    /// Library failures are returned as [`RawSolution::failed`], not as errors.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::InvariantViolation`] if the formulation is internally
    /// inconsistent.
    fn solve(&self, formulation: &Formulation) -> Result<RawSolution, SolverError>;
}

/// Backend built on `good_lp`.
#[derive(Debug, Clone, Default)]
pub struct GoodLpBackend {
    time_limit: Option<Duration>,
}

impl GoodLpBackend {
    /// Create a backend without a time limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the search after `limit`; the best point found so far is reported as feasible.
    ///
    /// Only the HiGHS backend supports a limit; microlp logs and ignores it.
    #[must_use]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Configured time limit
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }
}

impl Backend for GoodLpBackend {
    fn name(&self) -> &'static str {
        if cfg!(feature = "solver-highs") {
            "highs"
        } else {
            "microlp"
        }
    }

    fn solve(&self, formulation: &Formulation) -> Result<RawSolution, SolverError> {
        let mut pb = ProblemVariables::new();

        let vars: Vec<Variable> = (0..formulation.variable_count())
            .map(|_| pb.add(variable().binary()))
            .collect();

        let objective = to_expression(formulation.objective(), &vars)?;

        let model = pb.maximise(objective).using(default_solver);
        let model = configure(model, self.time_limit)?;
        let model = apply_recorded_constraints(model, formulation.constraints(), &vars)?;

        let solution = match model.solve() {
            Ok(solution) => solution,
            Err(ResolutionError::Infeasible) => {
                debug!(backend = self.name(), "backend proved infeasibility");

                return Ok(RawSolution::infeasible());
            }
            Err(err) => {
                warn!(backend = self.name(), error = %err, "backend failed");

                return Ok(RawSolution::failed(err.to_string()));
            }
        };

        let proven_optimal = matches!(solution.status(), SolutionStatus::Optimal);
        let values = vars.iter().map(|&var| solution.value(var)).collect();

        Ok(RawSolution::solved(proven_optimal, values))
    }
}

fn to_expression(expr: &LinearExpr, vars: &[Variable]) -> Result<Expression, SolverError> {
    let mut out = Expression::default();

    for &(var, coefficient) in expr.terms() {
        let var = vars
            .get(var.index())
            .ok_or(SolverError::InvariantViolation {
                message: "expression refers to a variable outside the formulation",
            })?;

        out += *var * coefficient;
    }

    Ok(out)
}

fn apply_recorded_constraints<S: SolverModel>(
    mut model: S,
    constraints: &[LinearConstraint],
    vars: &[Variable],
) -> Result<S, SolverError> {
    for constraint in constraints {
        let lhs = to_expression(&constraint.lhs, vars)?;

        model = model.with(lhs.leq(constraint.rhs));
    }

    Ok(model)
}

/// Closes the relative MIP gap so that only a proven optimum reports as optimal, then
/// applies the time limit.
#[cfg(feature = "solver-highs")]
fn configure<M>(model: M, limit: Option<Duration>) -> Result<M, SolverError>
where
    M: good_lp::solvers::WithMipGap + good_lp::solvers::WithTimeLimit,
{
    let model = model
        .with_mip_gap(0.0)
        .map_err(|_err| SolverError::InvariantViolation {
            message: "backend rejected a zero MIP gap",
        })?;

    Ok(match limit {
        Some(limit) => model.with_time_limit(limit.as_secs_f64()),
        None => model,
    })
}

#[cfg(not(feature = "solver-highs"))]
#[expect(
    clippy::unnecessary_wraps,
    reason = "mirrors the HiGHS variant, which can fail"
)]
fn configure<M>(model: M, limit: Option<Duration>) -> Result<M, SolverError> {
    if let Some(limit) = limit {
        warn!(?limit, "time limit ignored: the microlp backend does not support one");
    }

    Ok(model)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::solvers::milp::formulation::ConstraintKind;

    use super::*;

    fn expr(terms: &[(crate::solvers::milp::formulation::VarId, f64)]) -> LinearExpr {
        let mut expr = LinearExpr::default();

        for &(var, coefficient) in terms {
            expr.add_term(var, coefficient);
        }

        expr
    }

    #[test]
    fn solves_small_knapsack_to_optimality() -> TestResult {
        let mut formulation = Formulation::new();
        let a = formulation.add_binary_variable();
        let b = formulation.add_binary_variable();
        let c = formulation.add_binary_variable();

        formulation.add_to_objective(a, 3.0);
        formulation.add_to_objective(b, 5.0);
        formulation.add_to_objective(c, 6.0);
        formulation.add_leq_constraint(
            ConstraintKind::Capacity { bin_idx: 0 },
            expr(&[(a, 2.0), (b, 3.0), (c, 4.0)]),
            5.0,
        );

        let raw = GoodLpBackend::new().solve(&formulation)?;

        assert_eq!(raw.status(), SolveStatus::Optimal);

        let objective = formulation
            .objective()
            .eval(raw.values())
            .ok_or("missing values")?;

        assert!((objective - 8.0).abs() < 1e-6);
        assert!(
            formulation
                .constraints()
                .iter()
                .all(|c| c.is_satisfied_by(raw.values(), 1e-6))
        );

        Ok(())
    }

    #[test]
    fn zero_right_hand_side_forces_variable_off() -> TestResult {
        let mut formulation = Formulation::new();
        let a = formulation.add_binary_variable();
        let b = formulation.add_binary_variable();

        formulation.add_to_objective(a, 1.0);
        formulation.add_to_objective(b, 1.0);
        formulation.add_leq_constraint(
            ConstraintKind::Capacity { bin_idx: 0 },
            expr(&[(a, 1.0)]),
            0.0,
        );

        let raw = GoodLpBackend::new().solve(&formulation)?;

        assert_eq!(raw.status(), SolveStatus::Optimal);

        let [a_value, b_value] = raw.values() else {
            return Err("expected two values".into());
        };

        assert!(a_value.abs() < 1e-6);
        assert!((b_value - 1.0).abs() < 1e-6);

        Ok(())
    }

    #[test]
    fn negative_capacity_is_infeasible() -> TestResult {
        let mut formulation = Formulation::new();
        let a = formulation.add_binary_variable();

        formulation.add_to_objective(a, 1.0);
        formulation.add_leq_constraint(
            ConstraintKind::Capacity { bin_idx: 0 },
            expr(&[(a, 1.0)]),
            -1.0,
        );

        let raw = GoodLpBackend::new().solve(&formulation)?;

        assert_eq!(raw.status(), SolveStatus::Infeasible);
        assert!(raw.values().is_empty());

        Ok(())
    }

    #[cfg(feature = "solver-highs")]
    #[test]
    fn highs_is_the_default_backend() {
        assert_eq!(GoodLpBackend::new().name(), "highs");
    }

    #[cfg(feature = "solver-highs")]
    #[test]
    fn identical_bins_are_proven_optimal() -> TestResult {
        // Pairs fill all four bins exactly; the 9 is left over
        let weights = [5.0, 5.0, 7.0, 3.0, 6.0, 4.0, 9.0, 8.0, 2.0];
        let mut formulation = Formulation::new();
        let mut capacity_lhs = vec![LinearExpr::default(); 4];

        for (item_idx, &weight) in weights.iter().enumerate() {
            let mut single = LinearExpr::default();

            for lhs in &mut capacity_lhs {
                let var = formulation.add_binary_variable();

                formulation.add_to_objective(var, weight);
                single.add_term(var, 1.0);
                lhs.add_term(var, weight);
            }

            formulation.add_leq_constraint(ConstraintKind::SingleAssignment { item_idx }, single, 1.0);
        }

        for (bin_idx, lhs) in capacity_lhs.into_iter().enumerate() {
            formulation.add_leq_constraint(ConstraintKind::Capacity { bin_idx }, lhs, 10.0);
        }

        let raw = GoodLpBackend::new().solve(&formulation)?;

        assert_eq!(raw.status(), SolveStatus::Optimal);

        let objective = formulation
            .objective()
            .eval(raw.values())
            .ok_or("missing values")?;

        assert!((objective - 40.0).abs() < 1e-6);

        Ok(())
    }

    #[test]
    fn foreign_variables_are_an_invariant_violation() {
        let mut other = Formulation::new();
        other.add_binary_variable();
        let foreign = other.add_binary_variable();

        let mut formulation = Formulation::new();
        formulation.add_binary_variable();
        formulation.add_to_objective(foreign, 1.0);

        let result = GoodLpBackend::new().solve(&formulation);

        assert!(matches!(
            result,
            Err(SolverError::InvariantViolation { .. })
        ));
    }

    #[test]
    fn raw_solution_constructors_set_status() {
        assert_eq!(
            RawSolution::solved(true, vec![1.0]).status(),
            SolveStatus::Optimal
        );
        assert_eq!(
            RawSolution::solved(false, vec![1.0]).status(),
            SolveStatus::Feasible
        );

        let failed = RawSolution::failed("boom");

        assert_eq!(failed.status(), SolveStatus::Unknown);
        assert_eq!(failed.detail(), Some("boom"));
        assert!(failed.values().is_empty());
    }

    #[test]
    fn time_limit_is_recorded() {
        let backend = GoodLpBackend::new().with_time_limit(Duration::from_secs(3));

        assert_eq!(backend.time_limit(), Some(Duration::from_secs(3)));
    }
}
