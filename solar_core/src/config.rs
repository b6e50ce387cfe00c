//! TOML configuration: company details and reference data overrides.
//!
//! Every section is optional. Sections that are present replace the
//! corresponding built-in data wholesale; absent ones fall back to the
//! built-in catalog and the default company profile.
//!
//! ```toml
//! [company]
//! name = "Sunrise Energy"
//! reference_prefix = "SRE"
//!
//! [battery]
//! brand = "Pylontech"
//! model = "US5000"
//! price_per_kwh = 62000.0
//! depth_of_discharge = 0.9
//!
//! [[inverters]]
//! brand = "DEYE"
//! model = "SUN-8K-SG01LP1-EU"
//! ac_output_kw = 8.0
//! # ...
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::{ApplianceRating, BatterySpec, EnvironmentFactors, InverterSpec, PanelSpec, ReferenceCatalog};
use crate::errors::{CalcError, CalcResult, FieldError};
use crate::quotation::CompanyProfile;

/// Top-level configuration parsed from TOML.
///
/// Load with [`AppConfig::from_toml_file`] or use `AppConfig::default()` for
/// the built-in data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Company details printed on quotations.
    #[serde(default)]
    pub company: CompanyProfile,
    /// Reference panel override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panel: Option<PanelSpec>,
    /// Reference battery override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery: Option<BatterySpec>,
    /// Environmental constants override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<EnvironmentFactors>,
    /// Replacement inverter catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverters: Option<Vec<InverterSpec>>,
    /// Replacement appliance table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appliances: Option<Vec<ApplianceRating>>,
}

impl AppConfig {
    /// Load a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// `FileError` if the file cannot be read, `ConfigError` if the TOML is
    /// invalid or contains unknown fields.
    pub fn from_toml_file(path: &Path) -> CalcResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;
        let config = Self::parse(&content, &path.display().to_string())?;
        tracing::info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> CalcResult<Self> {
        Self::parse(s, "<string>")
    }

    fn parse(s: &str, source_name: &str) -> CalcResult<Self> {
        toml::from_str(s).map_err(|e| CalcError::config_error(source_name, e.to_string()))
    }

    /// Built-in catalog with this configuration's overrides applied.
    pub fn reference_catalog(&self) -> CalcResult<ReferenceCatalog> {
        let builtin = ReferenceCatalog::builtin()?;
        Ok(ReferenceCatalog {
            panel: self.panel.clone().unwrap_or_else(|| builtin.panel.clone()),
            battery: self.battery.clone().unwrap_or_else(|| builtin.battery.clone()),
            environment: self.environment.unwrap_or(builtin.environment),
            inverters: self.inverters.clone().unwrap_or_else(|| builtin.inverters.clone()),
            appliances: self.appliances.clone().unwrap_or_else(|| builtin.appliances.clone()),
        })
    }

    /// Validate configuration values. Returns all problems found.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = match self.reference_catalog() {
            Ok(catalog) => catalog.validate(),
            Err(e) => vec![FieldError::new("catalog", "built-in", e.to_string())],
        };

        if self.company.name.trim().is_empty() {
            errors.push(FieldError::new(
                "company.name",
                "\"\"",
                "Company name cannot be empty",
            ));
        }
        if self.company.reference_prefix.trim().is_empty() {
            errors.push(FieldError::new(
                "company.reference_prefix",
                "\"\"",
                "Quotation reference prefix cannot be empty",
            ));
        }
        if self.company.validity_days == 0 {
            errors.push(FieldError::new(
                "company.validity_days",
                "0",
                "Quotations must be valid for at least one day",
            ));
        }

        errors
    }
}
