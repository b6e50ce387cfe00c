//! End-to-end sizing and selection checks against the built-in catalog.

use solar_core::calculations::{
    compute_sizing, design_system, select_inverter, SelectionStrategy, SizingInputs, SystemVoltage,
};
use solar_core::catalog::{InverterSpec, ReferenceCatalog};
use solar_core::CalcError;

const TOL: f64 = 1e-9;

fn unit(model: &str, kw: f64) -> InverterSpec {
    InverterSpec {
        brand: "TEST".to_string(),
        model: model.to_string(),
        ac_output_kw: kw,
        dc_input_voltage: Some(48.0),
        ac_input_current_a: 40.0,
        dc_input_current_a: 100.0,
        charge_controller_amps: Some(80.0),
        charge_controller_voltage: 450.0,
        efficiency_percent: 95.0,
        price: kw * 100_000.0,
        warranty_years: 2,
    }
}

fn builtin() -> &'static ReferenceCatalog {
    ReferenceCatalog::builtin().unwrap()
}

#[test]
fn test_one_kilowatt_home() {
    let result = compute_sizing(&SizingInputs::with_load(1000.0), &builtin().panel).unwrap();

    assert!((result.total_energy_kw - 1.0).abs() < TOL);
    assert!((result.energy_with_losses_kw - 1.25).abs() < TOL);
    assert!((result.battery_bank_kwh - 10.0).abs() < TOL);
    assert_eq!(result.system_voltage, SystemVoltage::V48);
    assert!((result.panel_for_battery_kw - 2.0).abs() < TOL);
    assert!((result.solar_array_kw - 3.25).abs() < TOL);
    assert!((result.daily_energy_gen_kwh - 16.25).abs() < TOL);
    assert_eq!(result.panel_count, 6);
}

#[test]
fn test_half_load_lands_on_voltage_boundary() {
    let inputs = SizingInputs {
        selected_load_percent: 50,
        ..SizingInputs::with_load(1000.0)
    };
    let result = compute_sizing(&inputs, &builtin().panel).unwrap();

    assert!((result.battery_bank_kwh - 5.0).abs() < TOL);
    assert_eq!(result.system_voltage, SystemVoltage::V24);
}

#[test]
fn test_seven_kilowatts_needs_parallel_units() {
    let catalog = vec![unit("ONE", 1.0), unit("THREE", 3.0), unit("FIVE", 5.0), unit("SIX", 6.0)];
    let selection = select_inverter(7.0, &catalog).unwrap();

    assert_eq!(selection.strategy, SelectionStrategy::MultiUnit);
    assert_eq!(selection.inverter.model, "THREE");
    assert_eq!(selection.count, 3);
    assert!((selection.total_capacity_kw - 9.0).abs() < TOL);
}

#[test]
fn test_absurd_load_falls_back_to_five_largest() {
    let selection = select_inverter(1000.0, &builtin().inverters).unwrap();

    assert!(selection.is_degraded());
    assert_eq!(selection.strategy, SelectionStrategy::BestEffort);
    assert_eq!(selection.count, 5);
    assert_eq!(selection.inverter.ac_output_kw, 100.0);
    assert!(selection.total_capacity_kw < selection.required_kw);
}

#[test]
fn test_negative_load_is_rejected() {
    let err = design_system(&SizingInputs::with_load(-5.0), builtin()).unwrap_err();

    assert_eq!(err.error_code(), "VALIDATION_FAILED");
    assert_eq!(err.failed_fields(), vec!["load_watts"]);
    assert!(matches!(err, CalcError::Validation { .. }));
}

#[test]
fn test_every_bad_field_is_reported() {
    let inputs = SizingInputs {
        load_watts: f64::NAN,
        backup_hours: 0.0,
        peak_sun_hours: -1.0,
        panel_derating_factor: 1.3,
        system_loss_factor: 1.5,
        selected_load_percent: 5,
    };
    let err = compute_sizing(&inputs, &builtin().panel).unwrap_err();
    let fields = err.failed_fields();

    for field in ["load_watts", "backup_hours", "peak_sun_hours", "system_loss_factor", "selected_load_percent"] {
        assert!(fields.contains(&field), "{} not reported in {:?}", field, fields);
    }
}

// ============================================================================
// Properties over deterministic input grids
// ============================================================================

fn input_grid() -> Vec<SizingInputs> {
    let mut grid = Vec::new();
    for load in [1.0, 75.0, 480.0, 1000.0, 2499.5, 12_000.0, 250_000.0] {
        for backup in [0.5, 4.0, 8.0, 24.0] {
            for sun in [2.5, 5.0, 7.0] {
                for loss in [0.5, 0.8, 1.0] {
                    for percent in [10, 35, 50, 100] {
                        grid.push(SizingInputs {
                            load_watts: load,
                            backup_hours: backup,
                            peak_sun_hours: sun,
                            panel_derating_factor: 1.3,
                            system_loss_factor: loss,
                            selected_load_percent: percent,
                        });
                    }
                }
            }
        }
    }
    grid
}

#[test]
fn test_outputs_are_non_negative_and_cover_battery() {
    let panel = &builtin().panel;
    for inputs in input_grid() {
        let r = compute_sizing(&inputs, panel).unwrap();
        assert!(r.battery_bank_kwh >= 0.0);
        assert!(r.solar_array_kw >= 0.0);
        assert!(r.daily_energy_gen_kwh >= r.battery_bank_kwh, "{:?}", inputs);
    }
}

#[test]
fn test_panel_count_covers_array_within_one_panel() {
    let panel = &builtin().panel;
    for inputs in input_grid() {
        let r = compute_sizing(&inputs, panel).unwrap();
        let installed_w = r.panel_count as f64 * r.panel_wattage_w;
        let needed_w = r.solar_array_kw * 1000.0;

        assert!(r.panel_count >= 1);
        assert!(installed_w + 1e-6 >= needed_w, "{:?}", inputs);
        assert!(installed_w - needed_w < r.panel_wattage_w + 1e-6, "{:?}", inputs);
    }
}

#[test]
fn test_sizing_is_deterministic() {
    let panel = &builtin().panel;
    for inputs in input_grid() {
        let first = compute_sizing(&inputs, panel).unwrap();
        let second = compute_sizing(&inputs, panel).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}

#[test]
fn test_voltage_classes_are_monotonic() {
    let mut previous = SystemVoltage::from_battery_kwh(0.0);
    for step in 0..=1600 {
        let kwh = step as f64 * 0.25;
        let class = SystemVoltage::from_battery_kwh(kwh);
        assert!(class >= previous, "voltage dropped at {} kWh", kwh);
        previous = class;
    }
    assert_eq!(SystemVoltage::from_battery_kwh(2.0), SystemVoltage::V12);
    assert_eq!(SystemVoltage::from_battery_kwh(250.0), SystemVoltage::V48);
    assert_eq!(SystemVoltage::from_battery_kwh(250.01), SystemVoltage::V96);
}

#[test]
fn test_single_unit_whenever_one_suffices() {
    let inverters = &builtin().inverters;
    for step in 1..2000 {
        let required = step as f64 * 0.05;
        let selection = select_inverter(required, inverters).unwrap();
        assert_eq!(selection.count, 1, "required {} kW", required);
        assert!(selection.total_capacity_kw >= required);
    }
}

#[test]
fn test_non_fallback_selection_never_under_provisions() {
    let catalog = vec![unit("ONE", 1.0), unit("THREE", 3.0), unit("FIVE", 5.0), unit("SIX", 6.0)];
    for step in 1..=400 {
        let required = step as f64 * 0.1;
        let selection = select_inverter(required, &catalog).unwrap();
        if selection.is_degraded() {
            assert!(required > 30.0);
        } else {
            assert!(selection.total_capacity_kw >= required, "required {} kW", required);
            assert!((1..=5).contains(&selection.count));
        }
    }
}
