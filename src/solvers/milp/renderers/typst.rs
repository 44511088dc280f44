//! MILP Typst Renderer
//!
//! This module provides a renderer that captures the packing formulation and outputs
//! it as a Typst mathematical document.
//!
//! # Example
//!
//! ```rust,no_run
//! use stowage::{
//!     datasets::Dataset,
//!     solvers::milp::{MilpSolver, renderers::typst::TypstRenderer},
//! };
//! use std::path::PathBuf;
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let problem = Dataset::from_set("example")?.problem()?;
//! # let instance = problem.instance(3)?;
//!
//! let mut renderer = TypstRenderer::new(PathBuf::from("formulation.typ"));
//!
//! let _packing = MilpSolver::new().solve_with_observer(&instance, &mut renderer)?;
//!
//! renderer.write()?;
//! # Ok(())
//! # }
//! ```

use std::{fs::File, io::Write, path::PathBuf};

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::solvers::milp::{
    formulation::{LinearExpr, VarId},
    observer::MilpObserver,
};

/// Errors that can occur during Typst rendering.
#[derive(Debug, thiserror::Error)]
pub enum TypstRenderError {
    /// Failed to write to the output file.
    #[error("Failed to write to output file: {0}")]
    IoError(#[from] std::io::Error),
}

/// Captured formulation data.
#[derive(Debug, Clone, Default)]
pub struct CapturedFormulation {
    /// Assignment variables: `var` -> (`item_idx`, `bin_idx`)
    pub assignment_vars: FxHashMap<VarId, (usize, usize)>,

    /// Objective terms: (`var`, coefficient) in insertion order
    pub objective_terms: SmallVec<[(VarId, f64); 20]>,

    /// Single-assignment constraints: (`item_idx`, lhs)
    pub single_assignment_constraints: Vec<(usize, LinearExpr)>,

    /// Capacity constraints: (`bin_idx`, lhs, capacity)
    pub capacity_constraints: Vec<(usize, LinearExpr, f64)>,
}

/// Typst renderer that implements [`MilpObserver`].
#[derive(Debug, Clone)]
pub struct TypstRenderer {
    formulation: CapturedFormulation,
    output_path: PathBuf,
}

impl TypstRenderer {
    /// Create a new Typst renderer.
    pub fn new(output_path: PathBuf) -> Self {
        Self {
            formulation: CapturedFormulation::default(),
            output_path,
        }
    }

    /// The captured formulation.
    pub fn formulation(&self) -> &CapturedFormulation {
        &self.formulation
    }

    /// Get the output path.
    pub fn output_path(&self) -> &PathBuf {
        &self.output_path
    }

    /// Render the captured formulation to Typst syntax.
    pub fn render(&self) -> String {
        let mut output = String::new();

        output.push_str("= MILP Formulation for Multiple Knapsack Packing\n\n");

        output.push_str("== Decision Variables\n\n");
        self.render_variables(&mut output);

        output.push_str("\n== Objective Function\n\n");
        self.render_objective(&mut output);

        output.push_str("\n== Constraints\n\n");
        self.render_constraints(&mut output);

        output
    }

    /// Write the rendered formulation to the output file.
    ///
    /// # Errors
    ///
    /// Returns [`TypstRenderError::IoError`] if the file cannot be created or written.
    pub fn write(&self) -> Result<(), TypstRenderError> {
        let content = self.render();
        let mut file = File::create(&self.output_path)?;

        file.write_all(content.as_bytes())?;

        Ok(())
    }

    fn var_label(&self, var: VarId) -> String {
        match self.formulation.assignment_vars.get(&var) {
            Some((item_idx, bin_idx)) => format!("x_({item_idx},{bin_idx})"),
            None => format!("x_{}", var.index()),
        }
    }

    fn render_number(value: f64) -> String {
        if (value - value.round()).abs() < 1e-9 {
            format!("{value:.0}")
        } else {
            format!("{value}")
        }
    }

    /// Render an expression to Typst math notation, skipping zero terms.
    fn render_expression(&self, terms: &[(VarId, f64)], separator: &str) -> String {
        let rendered: Vec<String> = terms
            .iter()
            .filter(|(_, coeff)| coeff.abs() >= f64::EPSILON)
            .map(|&(var, coeff)| {
                if (coeff - 1.0).abs() < f64::EPSILON {
                    self.var_label(var)
                } else {
                    format!("{}{separator}{}", Self::render_number(coeff), self.var_label(var))
                }
            })
            .collect();

        if rendered.is_empty() {
            String::from("0")
        } else {
            rendered.join(" + ")
        }
    }

    fn render_variables(&self, output: &mut String) {
        output.push_str("All decision variables are binary.\n\n");

        let mut vars: Vec<_> = self.formulation.assignment_vars.iter().collect();

        vars.sort_by_key(|(_, pair)| **pair);

        for (var, (item_idx, bin_idx)) in vars {
            output.push_str("- $");
            output.push_str(&self.var_label(*var));
            output.push_str("$: item ");
            output.push_str(&item_idx.to_string());
            output.push_str(" is packed in bin ");
            output.push_str(&bin_idx.to_string());
            output.push('\n');
        }
    }

    fn render_objective(&self, output: &mut String) {
        output.push_str("$ \"maximize\" quad ");
        output.push_str(&self.render_expression(&self.formulation.objective_terms, " dot "));
        output.push_str(" $\n");
    }

    fn render_constraints(&self, output: &mut String) {
        output.push_str("=== Single Assignment Constraints\n\n");
        output.push_str("Each item can be in at most one bin:\n\n");

        for (item_idx, lhs) in &self.formulation.single_assignment_constraints {
            output.push_str("$ ");
            output.push_str(&self.render_expression(lhs.terms(), " "));
            output.push_str(" <= 1 $ (item ");
            output.push_str(&item_idx.to_string());
            output.push_str(")\n\n");
        }

        output.push_str("=== Capacity Constraints\n\n");
        output.push_str("The weight packed in each bin cannot exceed its capacity:\n\n");

        for (bin_idx, lhs, capacity) in &self.formulation.capacity_constraints {
            output.push_str("$ ");
            output.push_str(&self.render_expression(lhs.terms(), " "));
            output.push_str(" <= ");
            output.push_str(&Self::render_number(*capacity));
            output.push_str(" $ (bin ");
            output.push_str(&bin_idx.to_string());
            output.push_str(")\n\n");
        }
    }
}

impl MilpObserver for TypstRenderer {
    fn on_assignment_variable(&mut self, item_idx: usize, bin_idx: usize, var: VarId) {
        self.formulation
            .assignment_vars
            .insert(var, (item_idx, bin_idx));
    }

    fn on_objective_term(&mut self, var: VarId, coefficient: f64) {
        self.formulation.objective_terms.push((var, coefficient));
    }

    fn on_single_assignment_constraint(&mut self, item_idx: usize, lhs: &LinearExpr) {
        self.formulation
            .single_assignment_constraints
            .push((item_idx, lhs.clone()));
    }

    fn on_capacity_constraint(&mut self, bin_idx: usize, lhs: &LinearExpr, capacity: f64) {
        self.formulation
            .capacity_constraints
            .push((bin_idx, lhs.clone(), capacity));
    }
}
