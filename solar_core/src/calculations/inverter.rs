//! # Inverter Selection
//!
//! Picks the inverter model and unit count that covers a required continuous
//! AC capacity.
//!
//! ## Policy
//!
//! 1. **Single unit**: the smallest unit rated at or above the requirement.
//! 2. **Parallel units**: 2 to 5 identical units. The smallest total
//!    capacity wins; a tie goes to fewer units, then to the lower-rated
//!    (earlier listed) entry.
//! 3. **Best effort**: five of the largest unit, flagged as possibly
//!    under-provisioned so the quotation can be reviewed by an engineer.
//!
//! Entries with a non-positive or non-finite rating are skipped.
//!
//! ## Example
//!
//! ```rust
//! use solar_core::calculations::inverter::{select_inverter, SelectionStrategy};
//! use solar_core::catalog::ReferenceCatalog;
//!
//! let catalog = ReferenceCatalog::builtin().unwrap();
//! let selection = select_inverter(4.2, &catalog.inverters).unwrap();
//!
//! assert_eq!(selection.count, 1);
//! assert_eq!(selection.inverter.ac_output_kw, 5.0);
//! assert_eq!(selection.strategy, SelectionStrategy::SingleUnit);
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::{largest_usable, InverterSpec};
use crate::errors::{CalcError, CalcResult};

/// Fewest units considered for a parallel set
pub const MIN_PARALLEL_UNITS: u32 = 2;
/// Most units considered for a parallel set, and the best-effort count
pub const MAX_PARALLEL_UNITS: u32 = 5;

/// How the selection was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionStrategy {
    /// One unit covers the requirement
    SingleUnit,
    /// 2 to 5 identical units in parallel cover the requirement
    MultiUnit,
    /// Nothing covers the requirement; five of the largest unit are proposed
    BestEffort,
}

/// Chosen inverter model and unit count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InverterSelection {
    /// Catalog entry used for every unit
    pub inverter: InverterSpec,

    /// Number of identical units
    pub count: u32,

    /// count × rated output (kW)
    pub total_capacity_kw: f64,

    /// Capacity the selection had to cover (kW)
    pub required_kw: f64,

    pub strategy: SelectionStrategy,
}

impl InverterSelection {
    fn new(inverter: &InverterSpec, count: u32, required_kw: f64, strategy: SelectionStrategy) -> Self {
        InverterSelection {
            inverter: inverter.clone(),
            count,
            total_capacity_kw: count as f64 * inverter.ac_output_kw,
            required_kw,
            strategy,
        }
    }

    /// True when the selection may not cover the requirement
    pub fn is_degraded(&self) -> bool {
        self.strategy == SelectionStrategy::BestEffort
    }

    /// Uncovered capacity (kW), zero when the selection covers the requirement
    pub fn shortfall_kw(&self) -> f64 {
        (self.required_kw - self.total_capacity_kw).max(0.0)
    }

    /// Price of all units (NGN)
    pub fn total_price(&self) -> f64 {
        self.count as f64 * self.inverter.price
    }

    /// e.g. "2 × DEYE SUN-6K-SG04LP3-EU (12 kW total)"
    pub fn summary(&self) -> String {
        format!(
            "{} × {} ({} kW total)",
            self.count,
            self.inverter.display_name(),
            self.total_capacity_kw
        )
    }
}

/// Select the inverter configuration for `required_kw`.
///
/// # Errors
///
/// `CalcError::EmptyCatalog` when the catalog has no usable entry. An
/// under-provisioned fallback is not an error; check
/// [`InverterSelection::is_degraded`].
pub fn select_inverter(required_kw: f64, catalog: &[InverterSpec]) -> CalcResult<InverterSelection> {
    let mut usable: Vec<&InverterSpec> = catalog
        .iter()
        .filter(|inv| {
            if !inv.is_usable() {
                tracing::warn!(
                    model = %inv.display_name(),
                    rated_kw = inv.ac_output_kw,
                    "skipping inverter with unusable rating"
                );
            }
            inv.is_usable()
        })
        .collect();

    // Stable: equal ratings keep catalog order
    usable.sort_by(|a, b| a.ac_output_kw.total_cmp(&b.ac_output_kw));

    let Some(largest) = largest_usable(usable.iter().copied()) else {
        return Err(CalcError::empty_catalog("inverters"));
    };

    // 1. Single unit
    if let Some(single) = usable.iter().find(|inv| inv.ac_output_kw >= required_kw) {
        let selection = InverterSelection::new(single, 1, required_kw, SelectionStrategy::SingleUnit);
        tracing::debug!(required_kw, selection = %selection.summary(), "single inverter selected");
        return Ok(selection);
    }

    // 2. Parallel units
    let mut best: Option<(&InverterSpec, u32, f64)> = None;
    for inv in usable.iter().copied() {
        let Some(count) = parallel_count(required_kw, inv.ac_output_kw) else {
            continue;
        };
        let total = count as f64 * inv.ac_output_kw;
        let better = match best {
            None => true,
            Some((_, best_count, best_total)) => total < best_total || (total == best_total && count < best_count),
        };
        if better {
            best = Some((inv, count, total));
        }
    }
    if let Some((inv, count, _)) = best {
        let selection = InverterSelection::new(inv, count, required_kw, SelectionStrategy::MultiUnit);
        tracing::debug!(required_kw, selection = %selection.summary(), "parallel inverters selected");
        return Ok(selection);
    }

    // 3. Best effort
    let selection = InverterSelection::new(largest, MAX_PARALLEL_UNITS, required_kw, SelectionStrategy::BestEffort);
    tracing::warn!(
        required_kw,
        provided_kw = selection.total_capacity_kw,
        selection = %selection.summary(),
        "no inverter combination covers the load; proposing best-effort set"
    );
    Ok(selection)
}

/// Units of `rated_kw` needed to cover `required_kw`, if that is a valid
/// parallel count.
fn parallel_count(required_kw: f64, rated_kw: f64) -> Option<u32> {
    let mut count = (required_kw / rated_kw).ceil();
    if !count.is_finite() {
        return None;
    }
    // Guard against ceil landing one ulp short
    if count * rated_kw < required_kw {
        count += 1.0;
    }
    if count < MIN_PARALLEL_UNITS as f64 || count > MAX_PARALLEL_UNITS as f64 {
        return None;
    }
    Some(count as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(model: &str, kw: f64) -> InverterSpec {
        InverterSpec {
            brand: "TEST".to_string(),
            model: model.to_string(),
            ac_output_kw: kw,
            dc_input_voltage: Some(48.0),
            ac_input_current_a: 40.0,
            dc_input_current_a: 120.0,
            charge_controller_amps: Some(60.0),
            charge_controller_voltage: 500.0,
            efficiency_percent: 97.0,
            price: kw * 100_000.0,
            warranty_years: 5,
        }
    }

    fn catalog(ratings: &[f64]) -> Vec<InverterSpec> {
        ratings
            .iter()
            .map(|kw| unit(&format!("{}K", kw), *kw))
            .collect()
    }

    #[test]
    fn test_smallest_single_unit_wins() {
        let cat = catalog(&[12.0, 3.0, 6.0, 5.0, 1.0]);
        let sel = select_inverter(4.2, &cat).unwrap();
        assert_eq!(sel.strategy, SelectionStrategy::SingleUnit);
        assert_eq!(sel.count, 1);
        assert_eq!(sel.inverter.ac_output_kw, 5.0);
    }

    #[test]
    fn test_exact_rating_is_enough() {
        let cat = catalog(&[3.0, 5.0]);
        let sel = select_inverter(5.0, &cat).unwrap();
        assert_eq!(sel.count, 1);
        assert_eq!(sel.inverter.ac_output_kw, 5.0);
    }

    #[test]
    fn test_parallel_minimises_total_capacity() {
        // 7 kW: 2×6=12, 2×5=10, 3×3=9, 5×1 too small -> 3×3
        let cat = catalog(&[1.0, 3.0, 5.0, 6.0]);
        let sel = select_inverter(7.0, &cat).unwrap();
        assert_eq!(sel.strategy, SelectionStrategy::MultiUnit);
        assert_eq!(sel.inverter.ac_output_kw, 3.0);
        assert_eq!(sel.count, 3);
        assert!((sel.total_capacity_kw - 9.0).abs() < 1e-9);
        assert!(sel.total_capacity_kw >= 7.0);
    }

    #[test]
    fn test_parallel_tie_prefers_fewer_units() {
        // 11 kW: 2×6=12 and 3×4=12 tie on capacity -> 2×6
        let cat = catalog(&[4.0, 6.0]);
        let sel = select_inverter(11.0, &cat).unwrap();
        assert_eq!(sel.count, 2);
        assert_eq!(sel.inverter.ac_output_kw, 6.0);
    }

    #[test]
    fn test_parallel_full_tie_keeps_catalog_order() {
        let mut cat = catalog(&[4.0, 4.0]);
        cat[0].model = "FIRST".to_string();
        cat[1].model = "SECOND".to_string();
        let sel = select_inverter(7.0, &cat).unwrap();
        assert_eq!(sel.count, 2);
        assert_eq!(sel.inverter.model, "FIRST");
    }

    #[test]
    fn test_best_effort_when_demand_is_extreme() {
        let cat = catalog(&[5.0, 100.0, 20.0]);
        let sel = select_inverter(1000.0, &cat).unwrap();
        assert_eq!(sel.strategy, SelectionStrategy::BestEffort);
        assert!(sel.is_degraded());
        assert_eq!(sel.count, 5);
        assert_eq!(sel.inverter.ac_output_kw, 100.0);
        assert!((sel.shortfall_kw() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_best_effort_uses_later_listed_largest() {
        let catalog = crate::catalog::ReferenceCatalog::builtin().unwrap();
        let sel = select_inverter(1000.0, &catalog.inverters).unwrap();
        assert_eq!(sel.inverter.model, "SUN-100K-G03 Hybrid");
        assert_eq!(sel.count, MAX_PARALLEL_UNITS);
    }

    #[test]
    fn test_best_effort_when_only_tiny_units() {
        // 1 kW units would need 7 in parallel
        let cat = catalog(&[1.0]);
        let sel = select_inverter(6.5, &cat).unwrap();
        assert!(sel.is_degraded());
        assert_eq!(sel.count, 5);
    }

    #[test]
    fn test_invalid_entries_skipped() {
        let cat = catalog(&[0.0, -2.0, f64::NAN, 3.0]);
        let sel = select_inverter(2.5, &cat).unwrap();
        assert_eq!(sel.inverter.ac_output_kw, 3.0);
        assert_eq!(sel.count, 1);
    }

    #[test]
    fn test_empty_catalog_is_error() {
        let err = select_inverter(2.0, &[]).unwrap_err();
        assert_eq!(err.error_code(), "EMPTY_CATALOG");

        let err = select_inverter(2.0, &catalog(&[0.0, -1.0])).unwrap_err();
        assert_eq!(err.error_code(), "EMPTY_CATALOG");
    }

    #[test]
    fn test_single_unit_whenever_largest_covers() {
        let cat = catalog(&[1.0, 3.0, 5.0, 6.0, 12.0, 15.0]);
        let mut required = 0.05;
        while required <= 15.0 {
            let sel = select_inverter(required, &cat).unwrap();
            assert_eq!(sel.count, 1, "required {} kW", required);
            assert!(sel.total_capacity_kw >= required);
            required += 0.05;
        }
    }

    #[test]
    fn test_non_fallback_never_under_provisions() {
        let cat = catalog(&[1.0, 3.0, 3.6, 5.0, 8.0]);
        let mut required = 0.1;
        while required <= 60.0 {
            let sel = select_inverter(required, &cat).unwrap();
            if !sel.is_degraded() {
                assert!(
                    sel.total_capacity_kw >= required,
                    "{} kW covered by only {} kW",
                    required,
                    sel.total_capacity_kw
                );
                assert!((MIN_PARALLEL_UNITS..=MAX_PARALLEL_UNITS).contains(&sel.count) || sel.count == 1);
            }
            required += 0.1;
        }
    }

    #[test]
    fn test_total_price() {
        let cat = catalog(&[4.0, 6.0]);
        let sel = select_inverter(11.0, &cat).unwrap();
        assert!((sel.total_price() - 1_200_000.0).abs() < 1e-6);
    }
}
