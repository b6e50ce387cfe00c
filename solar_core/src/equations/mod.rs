//! # Sizing Equations
//!
//! Every formula behind a sized kit, kept in one registry so the quotation
//! appendix and `EQUATIONS.md` are generated from the same source.
//!
//! The arithmetic itself lives in [`crate::calculations`]; this module only
//! describes it.

pub mod registry;

pub use registry::{
    generate_appendix_typst, generate_equations_markdown, EquationCategory, EquationMetadata,
    SizingEquation, Variable, ALL_EQUATIONS,
};
