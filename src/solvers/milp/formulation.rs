//! MILP Formulation
//!
//! A backend-neutral record of a maximisation problem over binary variables: the
//! variables, the objective and every `lhs <= rhs` constraint. Backends translate it
//! into their own model types.

use std::fmt;

use num_traits::ToPrimitive;
use smallvec::SmallVec;

/// Opaque handle to a binary decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(usize);

impl VarId {
    /// Dense index of the variable within its formulation.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Linear expression `Σ coefficient · variable`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: SmallVec<[(VarId, f64); 8]>,
}

impl LinearExpr {
    /// Add `coefficient · var` to the expression.
    pub fn add_term(&mut self, var: VarId, coefficient: f64) {
        self.terms.push((var, coefficient));
    }

    /// Terms in insertion order.
    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    /// Evaluate the expression against dense variable values.
    ///
    /// Returns `None` if a variable has no value.
    pub fn eval(&self, values: &[f64]) -> Option<f64> {
        self.terms.iter().try_fold(0.0, |acc, &(var, coefficient)| {
            values
                .get(var.index())
                .map(|value| acc + coefficient * value)
        })
    }
}

/// What a constraint expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// Item is placed in at most one bin.
    SingleAssignment {
        /// Item index
        item_idx: usize,
    },

    /// Bin weight stays within capacity.
    Capacity {
        /// Bin index
        bin_idx: usize,
    },
}

/// Recorded linear constraint `lhs <= rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    /// What the constraint expresses
    pub kind: ConstraintKind,

    /// Left-hand side expression
    pub lhs: LinearExpr,

    /// Right-hand side scalar
    pub rhs: f64,
}

impl LinearConstraint {
    /// Returns true if the values satisfy the constraint within `tolerance`.
    pub fn is_satisfied_by(&self, values: &[f64], tolerance: f64) -> bool {
        let Some(lhs) = self.lhs.eval(values) else {
            return false;
        };

        lhs <= self.rhs + tolerance
    }
}

/// Maximisation problem over binary variables.
#[derive(Debug, Clone, Default)]
pub struct Formulation {
    variable_count: usize,
    objective: LinearExpr,
    constraints: Vec<LinearConstraint>,
}

impl Formulation {
    /// Create an empty formulation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binary decision variable.
    pub fn add_binary_variable(&mut self) -> VarId {
        let var = VarId(self.variable_count);
        self.variable_count += 1;

        var
    }

    /// Add a term to the objective function (maximised).
    pub fn add_to_objective(&mut self, var: VarId, coefficient: f64) {
        self.objective.add_term(var, coefficient);
    }

    /// Record the constraint `lhs <= rhs`.
    pub fn add_leq_constraint(&mut self, kind: ConstraintKind, lhs: LinearExpr, rhs: f64) {
        self.constraints.push(LinearConstraint { kind, lhs, rhs });
    }

    /// Number of binary variables.
    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    /// Objective expression.
    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    /// Recorded constraints, in insertion order.
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }
}

/// Convert a `u64` to an `f64` if it can be represented exactly.
pub fn u64_to_f64_exact(v: u64) -> Option<f64> {
    let f = v.to_f64()?;

    (f.to_u64() == Some(v)).then_some(f)
}
