//! # Sizing Calculations
//!
//! The calculation engine. Each step follows the pattern:
//!
//! - `*Inputs` - Input parameters (JSON-serializable)
//! - `*Result` / `*Selection` - Outputs at full precision (JSON-serializable)
//! - a pure function returning `CalcResult<_>`
//!
//! ## Available Calculations
//!
//! - [`sizing`] - Battery bank, solar array, panel count and bus voltage
//! - [`inverter`] - Inverter model and unit count for a required capacity
//! - [`design_system`] - Both of the above in one call
//!
//! ## Example
//!
//! ```rust
//! use solar_core::calculations::{design_system, SizingInputs};
//! use solar_core::catalog::ReferenceCatalog;
//!
//! let catalog = ReferenceCatalog::builtin().unwrap();
//! let design = design_system(&SizingInputs::with_load(2400.0), catalog).unwrap();
//!
//! assert!(!design.is_degraded());
//! assert!(design.inverter.total_capacity_kw >= design.sizing.required_inverter_capacity_kw);
//! ```

pub mod inverter;
pub mod sizing;

use serde::{Deserialize, Serialize};

use crate::catalog::ReferenceCatalog;
use crate::errors::CalcResult;

// Re-export commonly used types
pub use inverter::{select_inverter, InverterSelection, SelectionStrategy};
pub use sizing::{compute_sizing, SizingInputs, SizingResult, SystemVoltage};

/// Sized kit plus the inverter configuration that carries it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemDesign {
    pub sizing: SizingResult,
    pub inverter: InverterSelection,
}

impl SystemDesign {
    /// True when the inverter set may be under-provisioned
    pub fn is_degraded(&self) -> bool {
        self.inverter.is_degraded()
    }
}

/// Size the kit and select its inverter in one pass.
///
/// # Errors
///
/// `CalcError::Validation` for invalid inputs, `CalcError::EmptyCatalog`
/// when no inverter in the catalog is usable.
pub fn design_system(inputs: &SizingInputs, catalog: &ReferenceCatalog) -> CalcResult<SystemDesign> {
    let sizing = compute_sizing(inputs, &catalog.panel)?;
    let inverter = select_inverter(sizing.required_inverter_capacity_kw, &catalog.inverters)?;

    if inverter.is_degraded() {
        tracing::warn!(
            required_kw = sizing.required_inverter_capacity_kw,
            shortfall_kw = inverter.shortfall_kw(),
            "system design flagged for engineering review"
        );
    }

    Ok(SystemDesign { sizing, inverter })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_design_uses_required_capacity() {
        let catalog = ReferenceCatalog::builtin().unwrap();
        let design = design_system(&SizingInputs::with_load(1000.0), catalog).unwrap();

        // 1.25 kW required -> smallest single unit at or above is 3 kW
        assert!((design.inverter.required_kw - 1.25).abs() < 1e-9);
        assert_eq!(design.inverter.count, 1);
        assert_eq!(design.inverter.inverter.ac_output_kw, 3.0);
        assert!(!design.is_degraded());
    }

    #[test]
    fn test_design_flags_extreme_load() {
        let catalog = ReferenceCatalog::builtin().unwrap();
        // 800 kW / 0.8 = 1000 kW required, beyond 5 × 100 kW
        let design = design_system(&SizingInputs::with_load(800_000.0), catalog).unwrap();
        assert!(design.is_degraded());
        assert_eq!(design.inverter.count, 5);
        assert_eq!(design.inverter.inverter.ac_output_kw, 100.0);
    }

    #[test]
    fn test_design_rejects_invalid_inputs_before_selection() {
        let mut catalog = ReferenceCatalog::builtin().unwrap().clone();
        catalog.inverters.clear();
        let err = design_system(&SizingInputs::with_load(-1.0), &catalog).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");

        let err = design_system(&SizingInputs::with_load(1000.0), &catalog).unwrap_err();
        assert_eq!(err.error_code(), "EMPTY_CATALOG");
    }
}
