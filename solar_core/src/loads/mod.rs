//! # Load List
//!
//! The appliance list a user builds up by scanning rating plates or typing
//! devices in. It is owned by the form layer and only reaches the sizing
//! engine as an extra wattage on [`SizingInputs::load_watts`].
//!
//! # Overview
//!
//! - [`LoadList`] - Appliances grouped by type, with counts
//! - [`ApplianceLoad`] - One grouped entry
//! - [`DeviceEstimator`] / [`LabelTextEstimator`] - Guess a device from label text
//!
//! # Example
//!
//! ```
//! use solar_core::calculations::SizingInputs;
//! use solar_core::loads::{DeviceGuess, LoadList};
//!
//! let mut list = LoadList::new();
//! list.add(DeviceGuess::new("Fan", 75.0)).unwrap();
//! list.add(DeviceGuess::new("fan", 75.0)).unwrap();
//! list.add(DeviceGuess::new("Television", 100.0)).unwrap();
//!
//! assert_eq!(list.len(), 2);
//! assert_eq!(list.total_wattage(), 250.0);
//!
//! let inputs = list.apply_to(&SizingInputs::with_load(1000.0));
//! assert_eq!(inputs.load_watts, 1250.0);
//! ```

pub mod estimator;

pub use estimator::{extract_wattage, DeviceEstimator, DeviceGuess, LabelTextEstimator};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::SizingInputs;
use crate::errors::{CalcError, CalcResult};

/// Appliances of one type, counted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplianceLoad {
    /// Unique identifier for this entry
    pub id: Uuid,

    /// Device type as first entered, e.g. "Refrigerator"
    pub device_type: String,

    /// Wattage of the first unit entered (W)
    pub wattage_w: f64,

    /// Number of units
    pub count: u32,

    /// Sum of every merged unit's own wattage (W)
    pub total_wattage_w: f64,
}

impl ApplianceLoad {
    fn from_guess(guess: DeviceGuess) -> Self {
        ApplianceLoad {
            id: Uuid::new_v4(),
            device_type: guess.device_type,
            wattage_w: guess.wattage_w,
            count: 1,
            total_wattage_w: guess.wattage_w,
        }
    }

    fn merge(&mut self, wattage_w: f64) {
        self.count += 1;
        self.total_wattage_w += wattage_w;
    }

    /// Combined wattage of all units in this entry (W)
    pub fn total_wattage(&self) -> f64 {
        self.total_wattage_w
    }
}

/// Appliance aggregate maintained by the form layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadList {
    entries: Vec<ApplianceLoad>,
}

impl LoadList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a device, merging with an existing entry of the same type
    /// (case-insensitive). A merge increments the count and adds the new
    /// unit's wattage to the entry total, so units of one type may differ.
    ///
    /// Returns the index of the affected entry.
    pub fn add(&mut self, guess: DeviceGuess) -> CalcResult<usize> {
        if !(guess.wattage_w.is_finite() && guess.wattage_w > 0.0) {
            return Err(CalcError::invalid_input(
                "wattage_w",
                guess.wattage_w.to_string(),
                "Device wattage must be a positive number",
            ));
        }
        let device_type = guess.device_type.trim();
        if device_type.is_empty() {
            return Err(CalcError::invalid_input(
                "device_type",
                "\"\"",
                "Device type cannot be empty",
            ));
        }

        if let Some(index) = self
            .entries
            .iter()
            .position(|e| e.device_type.eq_ignore_ascii_case(device_type))
        {
            self.entries[index].merge(guess.wattage_w);
            return Ok(index);
        }

        let guess = DeviceGuess::new(device_type, guess.wattage_w);
        self.entries.push(ApplianceLoad::from_guess(guess));
        Ok(self.entries.len() - 1)
    }

    /// Add a device and return self (builder pattern)
    pub fn with_device(mut self, guess: DeviceGuess) -> CalcResult<Self> {
        self.add(guess)?;
        Ok(self)
    }

    /// Remove a grouped entry
    pub fn remove(&mut self, index: usize) -> CalcResult<ApplianceLoad> {
        if index >= self.entries.len() {
            return Err(CalcError::invalid_input(
                "index",
                index.to_string(),
                format!("Load list has {} entries", self.entries.len()),
            ));
        }
        Ok(self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ApplianceLoad] {
        &self.entries
    }

    /// Sum of every entry's combined wattage (W)
    pub fn total_wattage(&self) -> f64 {
        self.entries.iter().map(ApplianceLoad::total_wattage).sum()
    }

    /// Copy of `inputs` with this list's wattage added to the load.
    pub fn apply_to(&self, inputs: &SizingInputs) -> SizingInputs {
        SizingInputs {
            load_watts: inputs.load_watts + self.total_wattage(),
            ..*inputs
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_by_type() {
        let mut list = LoadList::new();
        assert_eq!(list.add(DeviceGuess::new("Refrigerator", 600.0)).unwrap(), 0);
        assert_eq!(list.add(DeviceGuess::new("Fan", 75.0)).unwrap(), 1);
        assert_eq!(list.add(DeviceGuess::new("REFRIGERATOR", 450.0)).unwrap(), 0);

        assert_eq!(list.len(), 2);
        let fridge = &list.entries()[0];
        assert_eq!(fridge.count, 2);
        assert_eq!(fridge.wattage_w, 600.0);
        assert_eq!(fridge.total_wattage(), 1050.0);
        assert_eq!(list.total_wattage(), 1125.0);
    }

    #[test]
    fn test_merged_units_keep_their_own_wattage() {
        let list = LoadList::new()
            .with_device(DeviceGuess::new("Fridge", 600.0))
            .unwrap()
            .with_device(DeviceGuess::new("fridge", 150.0))
            .unwrap();

        assert_eq!(list.len(), 1);
        assert_eq!(list.entries()[0].count, 2);
        assert_eq!(list.total_wattage(), 750.0);

        let applied = list.apply_to(&SizingInputs::with_load(0.0));
        assert_eq!(applied.load_watts, 750.0);
    }

    #[test]
    fn test_rejects_bad_wattage() {
        let mut list = LoadList::new();
        for w in [0.0, -10.0, f64::NAN] {
            let err = list.add(DeviceGuess::new("Fan", w)).unwrap_err();
            assert_eq!(err.error_code(), "INVALID_INPUT");
        }
        assert!(list.is_empty());
    }

    #[test]
    fn test_rejects_blank_type() {
        let mut list = LoadList::new();
        assert!(list.add(DeviceGuess::new("   ", 100.0)).is_err());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut list = LoadList::new()
            .with_device(DeviceGuess::new("Fan", 75.0))
            .unwrap()
            .with_device(DeviceGuess::new("Laptop", 65.0))
            .unwrap();

        let removed = list.remove(0).unwrap();
        assert_eq!(removed.device_type, "Fan");
        assert_eq!(list.len(), 1);
        assert!(list.remove(5).is_err());

        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.total_wattage(), 0.0);
    }

    #[test]
    fn test_apply_to_is_additive() {
        let list = LoadList::new()
            .with_device(DeviceGuess::new("Kettle", 2200.0))
            .unwrap();
        let base = SizingInputs {
            selected_load_percent: 60,
            ..SizingInputs::with_load(300.0)
        };
        let applied = list.apply_to(&base);
        assert_eq!(applied.load_watts, 2500.0);
        assert_eq!(applied.selected_load_percent, 60);
        assert_eq!(applied.backup_hours, base.backup_hours);
    }
}
