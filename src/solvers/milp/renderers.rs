//! Formulation renderers

pub mod typst;
