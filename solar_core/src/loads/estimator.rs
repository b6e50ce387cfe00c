//! Device estimation from recognised label text.
//!
//! Camera capture and OCR live outside this crate. What arrives here is the
//! text already read off a rating plate, and the estimator turns it into a
//! best-effort `{device type, wattage}` guess or nothing at all.

use serde::{Deserialize, Serialize};

use crate::catalog::ApplianceRating;

/// Wattages at or above this are treated as misreads
pub const MAX_LABEL_WATTAGE: f64 = 50_000.0;

/// Device type used when no known appliance name appears in the text
pub const UNKNOWN_DEVICE: &str = "Device";

/// A best-effort reading of one appliance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceGuess {
    /// Display name, e.g. "Refrigerator"
    pub device_type: String,
    /// Running wattage (W)
    pub wattage_w: f64,
}

impl DeviceGuess {
    pub fn new(device_type: impl Into<String>, wattage_w: f64) -> Self {
        DeviceGuess {
            device_type: device_type.into(),
            wattage_w,
        }
    }
}

/// Anything that can guess an appliance from some captured input.
///
/// Implementations may fail silently: `None` means "nothing usable", and the
/// load list is left unchanged.
pub trait DeviceEstimator {
    /// What the estimator reads (label text, image bytes, ...)
    type Input: ?Sized;

    fn estimate(&self, input: &Self::Input) -> Option<DeviceGuess>;
}

/// Estimates a device from rating-plate text.
///
/// - Wattage: the first `<digits>[spaces]W[att][s]` figure strictly between
///   0 and 50 000 W.
/// - Type: the first appliance in table order whose name occurs in the text,
///   capitalised; otherwise "Device".
/// - A recognised appliance with no readable wattage falls back to its
///   typical wattage from the table.
///
/// ```rust
/// use solar_core::catalog::ReferenceCatalog;
/// use solar_core::loads::{DeviceEstimator, LabelTextEstimator};
///
/// let catalog = ReferenceCatalog::builtin().unwrap();
/// let estimator = LabelTextEstimator::new(&catalog.appliances);
///
/// let guess = estimator.estimate("Deep freezer REFRIGERATOR 220V~ 150 W").unwrap();
/// assert_eq!(guess.device_type, "Refrigerator");
/// assert_eq!(guess.wattage_w, 150.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LabelTextEstimator<'a> {
    appliances: &'a [ApplianceRating],
}

impl<'a> LabelTextEstimator<'a> {
    pub fn new(appliances: &'a [ApplianceRating]) -> Self {
        LabelTextEstimator { appliances }
    }

    /// First appliance named in the text, in table order
    fn recognise(&self, text: &str) -> Option<&'a ApplianceRating> {
        let lower = text.to_lowercase();
        self.appliances
            .iter()
            .find(|a| !a.name.is_empty() && lower.contains(a.name.as_str()))
    }
}

impl DeviceEstimator for LabelTextEstimator<'_> {
    type Input = str;

    fn estimate(&self, text: &str) -> Option<DeviceGuess> {
        let appliance = self.recognise(text);
        let wattage = extract_wattage(text).or_else(|| appliance.map(|a| a.wattage_w))?;

        let device_type = match appliance {
            Some(a) => capitalize(&a.name),
            None => UNKNOWN_DEVICE.to_string(),
        };

        tracing::debug!(device = %device_type, wattage_w = wattage, "estimated device from label");
        Some(DeviceGuess::new(device_type, wattage))
    }
}

/// First plausible wattage figure in the text.
///
/// A figure is a run of ASCII digits followed by optional whitespace and a
/// `w` or `W` ("1500W", "60 w", "2000 Watts"). Figures outside (0, 50 000)
/// are skipped and the scan continues.
pub fn extract_wattage(text: &str) -> Option<f64> {
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        if !chars[i].is_ascii_digit() {
            i += 1;
            continue;
        }

        let start = i;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        let digits: String = chars[start..i].iter().collect();

        let mut j = i;
        while j < chars.len() && chars[j].is_whitespace() {
            j += 1;
        }
        if j < chars.len() && (chars[j] == 'w' || chars[j] == 'W') {
            if let Ok(value) = digits.parse::<f64>() {
                if value > 0.0 && value < MAX_LABEL_WATTAGE {
                    return Some(value);
                }
            }
        }
    }

    None
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
