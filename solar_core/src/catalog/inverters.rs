//! # Inverter Catalog Entries
//!
//! Rated data for the hybrid and grid-tied inverters the business stocks.
//! Entries are read-only reference data; the selector never mutates them.

use serde::{Deserialize, Serialize};


/// One inverter model as listed in the reference catalog.
///
/// ## JSON Example
///
/// ```json
/// {
///   "brand": "DEYE",
///   "model": "SUN-8K-SG01LP1-EU",
///   "ac_output_kw": 8.0,
///   "dc_input_voltage": 48.0,
///   "ac_input_current_a": 50.0,
///   "dc_input_current_a": 190.0,
///   "charge_controller_amps": 52.0,
///   "charge_controller_voltage": 500.0,
///   "efficiency_percent": 97.0,
///   "price": 950000.0,
///   "warranty_years": 5
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InverterSpec {
    pub brand: String,
    pub model: String,

    /// Rated continuous AC output (kW)
    pub ac_output_kw: f64,

    /// Battery bus voltage (V). `None` for grid-tied units with no battery bus.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dc_input_voltage: Option<f64>,

    /// AC input current (A)
    pub ac_input_current_a: f64,

    /// DC input current (A)
    pub dc_input_current_a: f64,

    /// Charge controller current (A). `None` where the rating is MPPT-managed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge_controller_amps: Option<f64>,

    /// Maximum PV input voltage of the charge controller (V)
    pub charge_controller_voltage: f64,

    /// Peak conversion efficiency (%)
    pub efficiency_percent: f64,

    /// Unit price (NGN)
    pub price: f64,

    pub warranty_years: u32,
}

impl InverterSpec {
    /// Whether the entry can take part in selection.
    ///
    /// Entries with a non-finite or non-positive rating are skipped by the
    /// selector instead of poisoning the search.
    pub fn is_usable(&self) -> bool {
        self.ac_output_kw.is_finite() && self.ac_output_kw > 0.0
    }

    /// "BRAND MODEL" for reports
    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }

    /// Short description of the DC side, e.g. "48 V battery bus" or "grid-tied"
    pub fn dc_bus_label(&self) -> String {
        match self.dc_input_voltage {
            Some(v) => format!("{} V battery bus", v),
            None => "grid-tied, no battery bus".to_string(),
        }
    }
}

/// Highest-rated usable inverter. On a tie the later listing wins.
pub fn largest_usable<'a, I>(inverters: I) -> Option<&'a InverterSpec>
where
    I: IntoIterator<Item = &'a InverterSpec>,
{
    inverters
        .into_iter()
        .filter(|inv| inv.is_usable())
        .fold(None, |best: Option<&InverterSpec>, inv| match best {
            Some(b) if b.ac_output_kw > inv.ac_output_kw => Some(b),
            _ => Some(inv),
        })
}
