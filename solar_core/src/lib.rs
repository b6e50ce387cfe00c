//! # solar_core - Solar Kit Sizing Engine
//!
//! `solar_core` sizes an off-grid or hybrid solar kit from a load, picks an
//! inverter configuration from a catalog, and turns the result into a priced
//! quotation that renders to PDF. All inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions over explicit inputs and reference data
//! - **Full precision**: Results are never rounded; formatting is the caller's job
//! - **Rich Errors**: Every invalid field is reported, not just the first
//! - **Auditable**: Every formula is listed in the equation registry
//!
//! ## Quick Start
//!
//! ```rust
//! use solar_core::calculations::{design_system, SizingInputs};
//! use solar_core::catalog::ReferenceCatalog;
//!
//! let catalog = ReferenceCatalog::builtin().unwrap();
//! let design = design_system(&SizingInputs::with_load(1000.0), catalog).unwrap();
//!
//! assert_eq!(design.sizing.battery_bank_kwh, 10.0);
//! assert_eq!(design.inverter.inverter.ac_output_kw, 3.0);
//!
//! let json = serde_json::to_string_pretty(&design).unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - Sizing engine and inverter selector
//! - [`catalog`] - Reference equipment, emission factor and appliance table
//! - [`loads`] - Appliance load list and label-text device estimation
//! - [`quotation`] - Priced quotation built from a design
//! - [`pdf`] - Typst rendering of quotations
//! - [`equations`] - Formula registry for the methodology appendix
//! - [`config`] - TOML configuration
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod catalog;
pub mod config;
pub mod equations;
pub mod errors;
pub mod loads;
pub mod pdf;
pub mod quotation;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{design_system, SizingInputs, SizingResult, SystemDesign};
pub use catalog::ReferenceCatalog;
pub use config::AppConfig;
pub use errors::{CalcError, CalcResult, FieldError};
pub use quotation::{ClientInfo, CompanyProfile, Quotation};
