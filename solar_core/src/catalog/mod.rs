//! # Reference Catalog
//!
//! Static equipment and environment data used by sizing and quotation:
//! the inverter catalog, the reference panel and battery, the grid emission
//! factor and a table of typical appliance wattages.
//!
//! The built-in data ships inside the crate as TOML and is parsed once on
//! first use. A replacement catalog can be loaded from a config file (see
//! [`crate::config`]).
//!
//! ## Example
//!
//! ```rust
//! use solar_core::catalog::ReferenceCatalog;
//!
//! let catalog = ReferenceCatalog::builtin().unwrap();
//! assert_eq!(catalog.panel.wattage_w, 600.0);
//! assert_eq!(catalog.typical_wattage("Fan"), Some(75.0));
//! ```

pub mod inverters;

pub use inverters::{largest_usable, InverterSpec};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult, FieldError};

const BUILTIN_TOML: &str = include_str!("../../data/catalog.toml");

static BUILTIN: Lazy<CalcResult<ReferenceCatalog>> =
    Lazy::new(|| ReferenceCatalog::from_toml_str(BUILTIN_TOML, "built-in catalog"));

// ============================================================================
// Equipment
// ============================================================================

/// Reference solar module used to count panels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PanelSpec {
    pub brand: String,
    pub model: String,
    /// Nameplate rating per module (W)
    pub wattage_w: f64,
    /// Performance warranty (years)
    pub warranty_years: u32,
    /// Unit price (NGN). Unpriced panels are quoted after site survey.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl PanelSpec {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }
}

/// Reference battery used for the bank line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatterySpec {
    pub brand: String,
    pub model: String,
    /// Price per kWh of bank capacity (NGN)
    pub price_per_kwh: f64,
    /// Usable fraction of nameplate capacity, for reference only
    pub depth_of_discharge: f64,
}

impl BatterySpec {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }
}

/// Site-independent environmental constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentFactors {
    /// Grid emission factor (kg CO2 per kWh displaced)
    pub emission_factor_kg_per_kwh: f64,
}

/// Typical running wattage of a household appliance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApplianceRating {
    /// Lower-case appliance name as it appears on labels ("washing machine")
    pub name: String,
    pub wattage_w: f64,
}

// ============================================================================
// Catalog
// ============================================================================

/// All reference data consumed by sizing, selection and quotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceCatalog {
    pub panel: PanelSpec,
    pub battery: BatterySpec,
    pub environment: EnvironmentFactors,
    /// Inverter catalog in listing order
    pub inverters: Vec<InverterSpec>,
    /// Appliance table in match-priority order
    #[serde(default)]
    pub appliances: Vec<ApplianceRating>,
}

impl ReferenceCatalog {
    /// The catalog compiled into the crate.
    pub fn builtin() -> CalcResult<&'static ReferenceCatalog> {
        BUILTIN.as_ref().map_err(Clone::clone)
    }

    /// Parse a catalog document.
    ///
    /// `source_name` is only used to label errors.
    pub fn from_toml_str(text: &str, source_name: &str) -> CalcResult<Self> {
        let catalog: ReferenceCatalog =
            toml::from_str(text).map_err(|e| CalcError::config_error(source_name, e.to_string()))?;
        tracing::debug!(
            source = source_name,
            inverters = catalog.inverters.len(),
            appliances = catalog.appliances.len(),
            "parsed reference catalog"
        );
        Ok(catalog)
    }

    /// Look up an inverter by model name (case-insensitive, surrounding
    /// whitespace ignored)
    pub fn inverter_by_model(&self, model: &str) -> Option<&InverterSpec> {
        let wanted = model.trim();
        self.inverters
            .iter()
            .find(|inv| inv.model.trim().eq_ignore_ascii_case(wanted))
    }

    /// Typical wattage for an appliance name (case-insensitive)
    pub fn typical_wattage(&self, name: &str) -> Option<f64> {
        let wanted = name.trim().to_lowercase();
        self.appliances
            .iter()
            .find(|a| a.name == wanted)
            .map(|a| a.wattage_w)
    }

    /// Check the reference data, reporting every problem found.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if !(self.panel.wattage_w.is_finite() && self.panel.wattage_w > 0.0) {
            errors.push(FieldError::new(
                "panel.wattage_w",
                self.panel.wattage_w.to_string(),
                "Panel wattage must be a positive number",
            ));
        }
        if let Some(price) = self.panel.price {
            if !(price >= 0.0) {
                errors.push(FieldError::new(
                    "panel.price",
                    price.to_string(),
                    "Price cannot be negative",
                ));
            }
        }
        if !(self.battery.price_per_kwh >= 0.0) {
            errors.push(FieldError::new(
                "battery.price_per_kwh",
                self.battery.price_per_kwh.to_string(),
                "Price cannot be negative",
            ));
        }
        if !(self.environment.emission_factor_kg_per_kwh >= 0.0) {
            errors.push(FieldError::new(
                "environment.emission_factor_kg_per_kwh",
                self.environment.emission_factor_kg_per_kwh.to_string(),
                "Emission factor cannot be negative",
            ));
        }

        if self.inverters.is_empty() {
            errors.push(FieldError::new("inverters", "[]", "At least one inverter is required"));
        }
        for (i, inv) in self.inverters.iter().enumerate() {
            if !inv.is_usable() {
                errors.push(FieldError::new(
                    format!("inverters[{}].ac_output_kw", i),
                    inv.ac_output_kw.to_string(),
                    "Rated output must be a positive number",
                ));
            }
            if !(inv.price >= 0.0) {
                errors.push(FieldError::new(
                    format!("inverters[{}].price", i),
                    inv.price.to_string(),
                    "Price cannot be negative",
                ));
            }
        }

        for (i, appliance) in self.appliances.iter().enumerate() {
            if appliance.name.trim().is_empty() {
                errors.push(FieldError::new(
                    format!("appliances[{}].name", i),
                    "\"\"",
                    "Appliance name cannot be empty",
                ));
            }
            if !(appliance.wattage_w.is_finite() && appliance.wattage_w > 0.0) {
                errors.push(FieldError::new(
                    format!("appliances[{}].wattage_w", i),
                    appliance.wattage_w.to_string(),
                    "Wattage must be a positive number",
                ));
            }
        }

        errors
    }
}
