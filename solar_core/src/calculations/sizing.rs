//! # Solar Kit Sizing
//!
//! Turns a load profile and a handful of design parameters into a battery
//! bank, a solar array, a panel count and a system voltage class.
//!
//! ## Method
//!
//! 1. Load is converted to kW and inflated by the system loss factor.
//! 2. The battery bank carries the selected share of that load for the
//!    backup window.
//! 3. The array must carry the live load and refill the bank within the
//!    peak-sun window.
//! 4. The bank size picks the DC bus voltage.
//!
//! No rounding happens here. Every intermediate value is kept at full
//! precision so downstream consumers can derive secondary metrics.
//!
//! ## Example
//!
//! ```rust
//! use solar_core::calculations::sizing::{compute_sizing, SizingInputs, SystemVoltage};
//! use solar_core::catalog::ReferenceCatalog;
//!
//! let catalog = ReferenceCatalog::builtin().unwrap();
//! let inputs = SizingInputs::with_load(1000.0);
//!
//! let result = compute_sizing(&inputs, &catalog.panel).unwrap();
//! assert!((result.battery_bank_kwh - 10.0).abs() < 1e-9);
//! assert_eq!(result.system_voltage, SystemVoltage::V48);
//! assert_eq!(result.panel_count, 6);
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::PanelSpec;
use crate::errors::{CalcError, CalcResult, FieldError};
use crate::units::{Hours, KilowattHours, Kilowatts, Watts};

/// Default backup window (h)
pub const DEFAULT_BACKUP_HOURS: f64 = 8.0;
/// Default insolation (peak sun hours per day)
pub const DEFAULT_PEAK_SUN_HOURS: f64 = 5.0;
/// Default panel derating factor
pub const DEFAULT_PANEL_DERATING: f64 = 1.3;
/// Default system loss factor (fraction of energy delivered)
pub const DEFAULT_SYSTEM_LOSS: f64 = 0.8;
/// Default share of the load carried on battery (%)
pub const DEFAULT_LOAD_PERCENT: u32 = 100;

/// Selectable load percentage range (inclusive)
pub const LOAD_PERCENT_RANGE: std::ops::RangeInclusive<u32> = 10..=100;

/// Float noise allowance when counting panels, so an array that is an exact
/// multiple of the panel rating does not gain a spurious extra module.
const PANEL_COUNT_TOLERANCE: f64 = 1e-9;

// ============================================================================
// Inputs
// ============================================================================

/// Sizing parameters supplied by the form layer.
///
/// ## JSON Example
///
/// ```json
/// {
///   "load_watts": 1000.0,
///   "backup_hours": 8.0,
///   "peak_sun_hours": 5.0,
///   "panel_derating_factor": 1.3,
///   "system_loss_factor": 0.8,
///   "selected_load_percent": 100
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizingInputs {
    /// Total simultaneous load (W)
    pub load_watts: f64,

    /// Hours of autonomy per day
    pub backup_hours: f64,

    /// Insolation (equivalent full-sun hours per day)
    pub peak_sun_hours: f64,

    /// Panel derating factor.
    ///
    /// Validated and carried through to the result, but not applied in the
    /// array size.
    pub panel_derating_factor: f64,

    /// Fraction of energy that survives conversion and wiring, in (0, 1]
    pub system_loss_factor: f64,

    /// Share of the load carried on battery during backup (%), 10 to 100
    pub selected_load_percent: u32,
}

impl SizingInputs {
    /// Inputs for the given load with every other parameter at its default.
    pub fn with_load(load_watts: f64) -> Self {
        SizingInputs {
            load_watts,
            backup_hours: DEFAULT_BACKUP_HOURS,
            peak_sun_hours: DEFAULT_PEAK_SUN_HOURS,
            panel_derating_factor: DEFAULT_PANEL_DERATING,
            system_loss_factor: DEFAULT_SYSTEM_LOSS,
            selected_load_percent: DEFAULT_LOAD_PERCENT,
        }
    }

    /// Every field that violates its domain. Empty when the inputs are valid.
    pub fn field_errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        let positive = [
            ("load_watts", self.load_watts, "Load must be a positive number of watts"),
            ("backup_hours", self.backup_hours, "Backup hours must be a positive number"),
            ("peak_sun_hours", self.peak_sun_hours, "Peak sun hours must be a positive number"),
            (
                "panel_derating_factor",
                self.panel_derating_factor,
                "Panel derating factor must be a positive number",
            ),
        ];
        for (field, value, reason) in positive {
            if !is_positive(value) {
                errors.push(FieldError::new(field, value.to_string(), reason));
            }
        }

        if !(is_positive(self.system_loss_factor) && self.system_loss_factor <= 1.0) {
            errors.push(FieldError::new(
                "system_loss_factor",
                self.system_loss_factor.to_string(),
                "System loss factor must be greater than 0 and at most 1",
            ));
        }

        if !LOAD_PERCENT_RANGE.contains(&self.selected_load_percent) {
            errors.push(FieldError::new(
                "selected_load_percent",
                self.selected_load_percent.to_string(),
                "Selected load must be between 10% and 100%",
            ));
        }

        errors
    }

    /// Validate all six fields, reporting every failure at once.
    pub fn validate(&self) -> CalcResult<()> {
        let errors = self.field_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(CalcError::validation(errors))
        }
    }

    /// Fraction of load carried on battery (0.1 to 1.0)
    pub fn load_fraction(&self) -> f64 {
        self.selected_load_percent as f64 / 100.0
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

// ============================================================================
// System Voltage
// ============================================================================

/// DC bus voltage class chosen from the battery bank size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SystemVoltage {
    #[serde(rename = "12V")]
    V12,
    #[serde(rename = "24V")]
    V24,
    #[serde(rename = "48V")]
    V48,
    #[serde(rename = "96V")]
    V96,
}

/// Ascending upper bounds (kWh, inclusive). First match wins; anything
/// larger is 96 V.
const VOLTAGE_BANDS: [(f64, SystemVoltage); 4] = [
    (2.0, SystemVoltage::V12),
    (5.0, SystemVoltage::V24),
    (100.0, SystemVoltage::V48),
    (250.0, SystemVoltage::V48),
];

impl SystemVoltage {
    /// Pick the voltage class for a battery bank.
    ///
    /// Every band includes its upper bound, so exactly 5.0 kWh is 24 V.
    pub fn from_battery_kwh(battery_bank_kwh: f64) -> Self {
        VOLTAGE_BANDS
            .iter()
            .find(|(limit, _)| battery_bank_kwh <= *limit)
            .map(|(_, class)| *class)
            .unwrap_or(SystemVoltage::V96)
    }

    /// Nominal bus voltage (V)
    pub fn volts(self) -> u32 {
        match self {
            SystemVoltage::V12 => 12,
            SystemVoltage::V24 => 24,
            SystemVoltage::V48 => 48,
            SystemVoltage::V96 => 96,
        }
    }
}

impl std::fmt::Display for SystemVoltage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} V", self.volts())
    }
}

// ============================================================================
// Result
// ============================================================================

/// Sizing output at full precision.
///
/// ## JSON Example
///
/// ```json
/// {
///   "total_energy_kw": 1.0,
///   "energy_with_losses_kw": 1.25,
///   "battery_bank_kwh": 10.0,
///   "system_voltage": "48V",
///   "panel_for_load_kw": 1.25,
///   "panel_for_battery_kw": 2.0,
///   "solar_array_kw": 3.25,
///   "daily_energy_gen_kwh": 16.25,
///   "panel_wattage_w": 600.0,
///   "panel_count": 6,
///   "required_inverter_capacity_kw": 1.25,
///   "inputs": { "load_watts": 1000.0, "...": "..." }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingResult {
    // === Load ===
    /// Load in kW before losses
    pub total_energy_kw: f64,

    /// Load inflated by the system loss factor (kW)
    pub energy_with_losses_kw: f64,

    // === Storage ===
    /// Battery bank energy (kWh)
    pub battery_bank_kwh: f64,

    /// DC bus voltage class
    pub system_voltage: SystemVoltage,

    // === Generation ===
    /// Array share that sustains the live load (kW)
    pub panel_for_load_kw: f64,

    /// Array share that refills the bank within one sun-day (kW)
    pub panel_for_battery_kw: f64,

    /// Total array capacity (kW)
    pub solar_array_kw: f64,

    /// Expected daily yield (kWh)
    pub daily_energy_gen_kwh: f64,

    /// Reference panel rating used for the count (W)
    pub panel_wattage_w: f64,

    /// Number of reference panels
    pub panel_count: u64,

    // === Conversion ===
    /// Continuous AC capacity the inverter selection must cover (kW)
    pub required_inverter_capacity_kw: f64,

    /// Inputs that produced this result
    pub inputs: SizingInputs,
}

impl SizingResult {
    /// Backup time at the selected load share (h).
    ///
    /// Matches the figure printed on quotations: bank hours at full effective
    /// load, scaled by the load percentage over ten.
    pub fn backup_hours_at_load(&self) -> f64 {
        (self.battery_bank_kwh / self.energy_with_losses_kw) * self.inputs.selected_load_percent as f64 / 10.0
    }

    /// CO2 displaced by one day of generation (kg), for the given emission factor
    pub fn co2_saved_kg(&self, emission_factor_kg_per_kwh: f64) -> f64 {
        self.daily_energy_gen_kwh * emission_factor_kg_per_kwh
    }

    /// Installed panel capacity (kW), at least `solar_array_kw`
    pub fn installed_array_kw(&self) -> f64 {
        self.panel_count as f64 * self.panel_wattage_w / 1000.0
    }
}

// ============================================================================
// Calculation
// ============================================================================

/// Size a solar kit.
///
/// `panel` supplies the reference module rating used for the panel count.
///
/// # Errors
///
/// Returns `CalcError::Validation` listing every invalid input (and the
/// panel rating, if that is unusable). No partial result is produced.
pub fn compute_sizing(inputs: &SizingInputs, panel: &PanelSpec) -> CalcResult<SizingResult> {
    let mut errors = inputs.field_errors();
    if !is_positive(panel.wattage_w) {
        errors.push(FieldError::new(
            "panel_wattage_w",
            panel.wattage_w.to_string(),
            "Reference panel wattage must be a positive number",
        ));
    }
    if !errors.is_empty() {
        tracing::debug!(count = errors.len(), "sizing inputs rejected");
        return Err(CalcError::validation(errors));
    }

    // Load
    let total_energy: Kilowatts = Watts(inputs.load_watts).into();
    let energy_with_losses = total_energy / inputs.system_loss_factor;

    // Storage
    let battery_bank: KilowattHours = energy_with_losses * inputs.load_fraction() * Hours(inputs.backup_hours);
    let system_voltage = SystemVoltage::from_battery_kwh(battery_bank.value());

    // Generation
    let sun_window = Hours(inputs.peak_sun_hours);
    let panel_for_load = energy_with_losses;
    let panel_for_battery = battery_bank / sun_window;
    let solar_array = panel_for_battery + panel_for_load;
    let daily_energy_gen = battery_bank + panel_for_load * sun_window;

    let solar_array_w: Watts = solar_array.into();
    let panels = ((solar_array_w.value() / panel.wattage_w) - PANEL_COUNT_TOLERANCE)
        .ceil()
        .max(1.0);
    // Counts past u64 would saturate in the cast
    if !(panels < u64::MAX as f64) {
        tracing::debug!(panels, "panel count out of range");
        return Err(CalcError::validation(vec![FieldError::new(
            "load_watts",
            inputs.load_watts.to_string(),
            "Load too large: panel count exceeds the supported range",
        )]));
    }
    let panel_count = panels as u64;

    let result = SizingResult {
        total_energy_kw: total_energy.value(),
        energy_with_losses_kw: energy_with_losses.value(),
        battery_bank_kwh: battery_bank.value(),
        system_voltage,
        panel_for_load_kw: panel_for_load.value(),
        panel_for_battery_kw: panel_for_battery.value(),
        solar_array_kw: solar_array.value(),
        daily_energy_gen_kwh: daily_energy_gen.value(),
        panel_wattage_w: panel.wattage_w,
        panel_count,
        required_inverter_capacity_kw: energy_with_losses.value(),
        inputs: *inputs,
    };

    tracing::debug!(
        load_w = inputs.load_watts,
        battery_kwh = result.battery_bank_kwh,
        array_kw = result.solar_array_kw,
        panels = result.panel_count,
        voltage = result.system_voltage.volts(),
        "sized solar kit"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn panel() -> PanelSpec {
        PanelSpec {
            brand: "Jinko Solar".to_string(),
            model: "Cheetah HC".to_string(),
            wattage_w: 600.0,
            warranty_years: 25,
            price: None,
        }
    }

    #[test]
    fn test_reference_kit() {
        // 1 kW load, 8 h backup, 5 PSH, 80% delivery, full load on battery
        let result = compute_sizing(&SizingInputs::with_load(1000.0), &panel()).unwrap();

        assert!((result.total_energy_kw - 1.0).abs() < EPS);
        assert!((result.energy_with_losses_kw - 1.25).abs() < EPS);
        assert!((result.battery_bank_kwh - 10.0).abs() < EPS);
        assert_eq!(result.system_voltage, SystemVoltage::V48);
        assert!((result.panel_for_battery_kw - 2.0).abs() < EPS);
        assert!((result.solar_array_kw - 3.25).abs() < EPS);
        assert!((result.daily_energy_gen_kwh - 16.25).abs() < EPS);
        // 3250 W / 600 W = 5.42 -> 6 panels
        assert_eq!(result.panel_count, 6);
        assert!((result.required_inverter_capacity_kw - 1.25).abs() < EPS);
    }

    #[test]
    fn test_half_load_lands_on_24v_boundary() {
        let inputs = SizingInputs {
            selected_load_percent: 50,
            ..SizingInputs::with_load(1000.0)
        };
        let result = compute_sizing(&inputs, &panel()).unwrap();

        assert!((result.battery_bank_kwh - 5.0).abs() < EPS);
        assert_eq!(result.system_voltage, SystemVoltage::V24);
    }

    #[test]
    fn test_voltage_band_edges() {
        assert_eq!(SystemVoltage::from_battery_kwh(0.0), SystemVoltage::V12);
        assert_eq!(SystemVoltage::from_battery_kwh(2.0), SystemVoltage::V12);
        assert_eq!(SystemVoltage::from_battery_kwh(2.0001), SystemVoltage::V24);
        assert_eq!(SystemVoltage::from_battery_kwh(5.0), SystemVoltage::V24);
        assert_eq!(SystemVoltage::from_battery_kwh(5.0001), SystemVoltage::V48);
        assert_eq!(SystemVoltage::from_battery_kwh(100.0), SystemVoltage::V48);
        assert_eq!(SystemVoltage::from_battery_kwh(250.0), SystemVoltage::V48);
        assert_eq!(SystemVoltage::from_battery_kwh(250.0001), SystemVoltage::V96);
        assert_eq!(SystemVoltage::from_battery_kwh(1.0e6), SystemVoltage::V96);
    }

    #[test]
    fn test_voltage_classes_are_monotonic() {
        let mut previous = SystemVoltage::V12;
        let mut kwh = 0.0;
        while kwh <= 400.0 {
            let class = SystemVoltage::from_battery_kwh(kwh);
            assert!(class >= previous, "class dropped at {} kWh", kwh);
            previous = class;
            kwh += 0.25;
        }
        assert_eq!(previous, SystemVoltage::V96);
    }

    #[test]
    fn test_negative_load_rejected() {
        let err = compute_sizing(&SizingInputs::with_load(-5.0), &panel()).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
        assert_eq!(err.failed_fields(), vec!["load_watts"]);
    }

    #[test]
    fn test_every_invalid_field_reported() {
        let inputs = SizingInputs {
            load_watts: f64::NAN,
            backup_hours: 0.0,
            peak_sun_hours: -1.0,
            panel_derating_factor: f64::INFINITY,
            system_loss_factor: 1.2,
            selected_load_percent: 5,
        };
        let err = compute_sizing(&inputs, &panel()).unwrap_err();
        assert_eq!(
            err.failed_fields(),
            vec![
                "load_watts",
                "backup_hours",
                "peak_sun_hours",
                "panel_derating_factor",
                "system_loss_factor",
                "selected_load_percent",
            ]
        );
    }

    #[test]
    fn test_load_percent_bounds_inclusive() {
        for pct in [10, 100] {
            let inputs = SizingInputs {
                selected_load_percent: pct,
                ..SizingInputs::with_load(500.0)
            };
            assert!(inputs.validate().is_ok(), "{}% should be accepted", pct);
        }
        for pct in [0, 9, 101] {
            let inputs = SizingInputs {
                selected_load_percent: pct,
                ..SizingInputs::with_load(500.0)
            };
            assert!(inputs.validate().is_err(), "{}% should be rejected", pct);
        }
    }

    #[test]
    fn test_system_loss_of_one_accepted() {
        let inputs = SizingInputs {
            system_loss_factor: 1.0,
            ..SizingInputs::with_load(2000.0)
        };
        let result = compute_sizing(&inputs, &panel()).unwrap();
        assert!((result.energy_with_losses_kw - 2.0).abs() < EPS);
    }

    #[test]
    fn test_bad_panel_rating_rejected() {
        let mut p = panel();
        p.wattage_w = 0.0;
        let err = compute_sizing(&SizingInputs::with_load(1000.0), &p).unwrap_err();
        assert_eq!(err.failed_fields(), vec!["panel_wattage_w"]);
    }

    #[test]
    fn test_exact_multiple_does_not_add_panel() {
        // 480 W / 0.8 = 0.6 kW; bank 0.6 * 5 h = 3.0 kWh; array 0.6 + 0.6 = 1.2 kW
        let inputs = SizingInputs {
            backup_hours: 5.0,
            ..SizingInputs::with_load(480.0)
        };
        let result = compute_sizing(&inputs, &panel()).unwrap();
        assert!((result.solar_array_kw - 1.2).abs() < EPS);
        assert_eq!(result.panel_count, 2);
    }

    #[test]
    fn test_derating_factor_does_not_change_array() {
        let base = compute_sizing(&SizingInputs::with_load(1500.0), &panel()).unwrap();
        let derated = compute_sizing(
            &SizingInputs {
                panel_derating_factor: 2.0,
                ..SizingInputs::with_load(1500.0)
            },
            &panel(),
        )
        .unwrap();
        assert_eq!(base.solar_array_kw, derated.solar_array_kw);
        assert_eq!(base.panel_count, derated.panel_count);
    }

    #[test]
    fn test_secondary_metrics() {
        let result = compute_sizing(&SizingInputs::with_load(1000.0), &panel()).unwrap();
        // (10 / 1.25) * 100 / 10 = 80
        assert!((result.backup_hours_at_load() - 80.0).abs() < EPS);
        // 16.25 * 0.42 = 6.825
        assert!((result.co2_saved_kg(0.42) - 6.825).abs() < EPS);
        assert!((result.installed_array_kw() - 3.6).abs() < EPS);
    }

    #[test]
    fn test_large_load_panel_count_is_exact() {
        let result = compute_sizing(&SizingInputs::with_load(1e12), &panel()).unwrap();
        // 3.25e9 kW array over 600 W panels
        assert_eq!(result.panel_count, 5_416_666_667);
        assert!(result.panel_count > u32::MAX as u64);
    }

    #[test]
    fn test_unrepresentable_panel_count_rejected() {
        let err = compute_sizing(&SizingInputs::with_load(1e300), &panel()).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
        assert_eq!(err.failed_fields(), vec!["load_watts"]);
    }

    #[test]
    fn test_idempotent() {
        let inputs = SizingInputs {
            load_watts: 3725.5,
            backup_hours: 6.5,
            peak_sun_hours: 4.2,
            panel_derating_factor: 1.3,
            system_loss_factor: 0.85,
            selected_load_percent: 70,
        };
        let a = compute_sizing(&inputs, &panel()).unwrap();
        let b = compute_sizing(&inputs, &panel()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.battery_bank_kwh.to_bits(), b.battery_bank_kwh.to_bits());
    }
}
