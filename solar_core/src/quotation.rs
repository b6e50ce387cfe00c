//! # Quotation
//!
//! The commercial document built around a [`SystemDesign`]: client details,
//! priced line items, performance estimates and the issuing company's terms.
//! Quotations serialize to JSON and render to PDF via [`crate::pdf`].
//!
//! ## Structure
//!
//! ```text
//! Quotation
//! ├── meta: QuotationMetadata (version, reference, issue and expiry dates)
//! ├── client: ClientInfo (name, contact, address)
//! ├── design: SystemDesign (sizing + inverter selection)
//! ├── panel / battery: reference equipment
//! ├── line_items: Vec<LineItem>
//! └── estimates: PerformanceEstimates
//! ```
//!
//! ## Example
//!
//! ```rust
//! use solar_core::calculations::{design_system, SizingInputs};
//! use solar_core::catalog::ReferenceCatalog;
//! use solar_core::quotation::{ClientInfo, CompanyProfile, Quotation};
//!
//! let catalog = ReferenceCatalog::builtin().unwrap();
//! let design = design_system(&SizingInputs::with_load(1000.0), catalog).unwrap();
//! let client = ClientInfo::new("Ada Obi", "+234 800 000 0000", "Garki, Abuja");
//!
//! let quote = Quotation::new(design, client, catalog, &CompanyProfile::default());
//! assert!(quote.meta.reference.starts_with("AER-"));
//! assert!(quote.total_investment() > 0.0);
//! ```

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::SystemDesign;
use crate::catalog::{BatterySpec, PanelSpec, ReferenceCatalog};

/// Current schema version for serialized quotations
pub const SCHEMA_VERSION: &str = "0.1.0";

// ============================================================================
// Company
// ============================================================================

/// One service line shown on the company profile page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceOffering {
    pub title: String,
    pub description: String,
}

impl ServiceOffering {
    fn new(title: &str, description: &str) -> Self {
        ServiceOffering {
            title: title.to_string(),
            description: description.to_string(),
        }
    }
}

/// Account that receives quotation payments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BankDetails {
    pub account_name: String,
    pub account_number: String,
    pub bank_name: String,
    pub branch: String,
}

impl Default for BankDetails {
    fn default() -> Self {
        BankDetails {
            account_name: "A.E RENEWABLE LTD".to_string(),
            account_number: "0123456789".to_string(),
            bank_name: "Example Bank PLC".to_string(),
            branch: "Abuja Branch".to_string(),
        }
    }
}

/// The issuing company: identity, profile text and commercial terms.
///
/// Any field left out of a config file keeps its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompanyProfile {
    pub name: String,
    pub tagline: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub location: String,

    /// Company overview paragraphs
    pub about: Vec<String>,
    /// Mission paragraphs
    pub mission: Vec<String>,
    pub vision: String,
    pub core_values: Vec<String>,
    pub services: Vec<ServiceOffering>,

    /// Terms & conditions, one per bullet
    pub terms: Vec<String>,
    /// Warranty & support, one per bullet
    pub warranty: Vec<String>,

    pub bank: BankDetails,

    /// Prefix of generated quotation references
    pub reference_prefix: String,
    /// Days a quotation stays valid
    pub validity_days: u32,
    /// Currency code used for all prices
    pub currency: String,
}

impl Default for CompanyProfile {
    fn default() -> Self {
        CompanyProfile {
            name: "A.E RENEWABLE LTD".to_string(),
            tagline: "POWERING YOUR FUTURE WITH SUN".to_string(),
            phone: "+234 813 361 5132".to_string(),
            email: "A.Erenewablesolution@gmail.com".to_string(),
            website: "www.aerenewable.com".to_string(),
            location: "Abuja, Nigeria".to_string(),
            about: vec![
                "A.E RENEWABLE LTD is a comprehensive renewable energy and electrical engineering company \
                 in Nigeria, delivering solar installations, smart power systems, electrical works, automation, \
                 and energy-efficient solutions for homes, offices, farms, estates, and industrial facilities."
                    .to_string(),
                "Our certified team provides detailed engineering design, project management, and installation \
                 services, following global standards so every installation is reliable, scalable, and future-proof."
                    .to_string(),
            ],
            mission: vec![
                "We focus on quality, safety, sustainability, and client satisfaction. Our projects feature \
                 optimized layouts, high-quality components, intelligent energy management, and precise \
                 engineering for maximum efficiency and longevity."
                    .to_string(),
                "Deliver clean, reliable, and affordable energy solutions while continuously innovating and \
                 enhancing performance for every client and project."
                    .to_string(),
            ],
            vision: "To become the leading renewable energy brand in Africa, empowering communities, businesses, \
                     and industries with sustainable and uninterrupted power solutions."
                .to_string(),
            core_values: [
                "Innovation and continuous improvement",
                "Professional integrity and transparency",
                "Commitment to safety and quality",
                "Customer satisfaction and partnership",
                "Environmental responsibility",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            services: vec![
                ServiceOffering::new(
                    "Solar Home & Office Systems",
                    "Design and installation of hybrid/off-grid systems with inverters, batteries, solar panels, \
                     and smart monitoring for seamless power supply.",
                ),
                ServiceOffering::new(
                    "Solar Street Lights",
                    "Automated solar streetlights with durable poles, energy-saving LEDs, and night-time \
                     optimization for urban and rural applications.",
                ),
                ServiceOffering::new(
                    "Mini-Grid & Off-Grid Power",
                    "Community electrification, industrial clusters, and farm solutions featuring hybrid \
                     solar-diesel systems and energy management technologies.",
                ),
                ServiceOffering::new(
                    "Electrical Installations",
                    "Professional wiring, breaker panels, load balancing, surge protection, and compliance \
                     with national and international electrical codes.",
                ),
                ServiceOffering::new(
                    "Maintenance & Troubleshooting",
                    "Periodic system checks, diagnostics, battery health monitoring, inverter repairs, panel \
                     cleaning, and optimization services.",
                ),
                ServiceOffering::new(
                    "Smart Home & Industrial Automation",
                    "IoT-based automation, CCTV, access control, energy monitoring, and smart facility \
                     management systems.",
                ),
            ],
            terms: [
                "Payment terms: 70% upfront, 30% on completion.",
                "Delivery timeframe: Max 2 working days after deposit.",
                "Cable sizes & Mounting Structure will be determined during site assessment.",
                "Quotation valid for 30 days from the date of issue.",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            warranty: [
                "Panels: 25-year performance warranty",
                "Inverter: 5-year manufacturer warranty",
                "A.E RENEWABLE LTD: 1-year complimentary maintenance",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            bank: BankDetails::default(),
            reference_prefix: "AER".to_string(),
            validity_days: 30,
            currency: "NGN".to_string(),
        }
    }
}

// ============================================================================
// Quotation
// ============================================================================

/// Who the quotation is for. Collected as entered, never validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub full_name: String,
    pub contact: String,
    pub address: String,
}

impl ClientInfo {
    pub fn new(full_name: impl Into<String>, contact: impl Into<String>, address: impl Into<String>) -> Self {
        ClientInfo {
            full_name: full_name.into(),
            contact: contact.into(),
            address: address.into(),
        }
    }

    /// Name for the salutation ("Client" when none was given)
    pub fn salutation_name(&self) -> &str {
        let name = self.full_name.trim();
        if name.is_empty() {
            "Client"
        } else {
            name
        }
    }
}

/// Quotation header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Reference such as "AER-2026104821"
    pub reference: String,

    /// Date printed on the quotation
    pub issued: NaiveDate,

    /// Last day the offer holds
    pub valid_until: NaiveDate,

    /// Creation timestamp
    pub created: DateTime<Utc>,
}

/// Price of a line item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum LineAmount {
    /// Priced in the quotation currency
    Priced(f64),
    /// Covered by the quotation at no separate charge
    Included,
    /// Priced after the site survey
    SiteSurvey,
}

impl LineAmount {
    pub fn value(&self) -> Option<f64> {
        match self {
            LineAmount::Priced(v) => Some(*v),
            _ => None,
        }
    }
}

/// One row of the system design table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Row heading, e.g. "Solar Panels"
    pub item: String,
    /// Main description (brand or product)
    pub description: String,
    /// Secondary line (model, quantity, scope)
    pub detail: String,
    /// Rating column, e.g. "3.25 kW"
    pub rated: String,
    pub amount: LineAmount,
}

impl LineItem {
    fn new(item: &str, description: impl Into<String>, detail: impl Into<String>, rated: impl Into<String>, amount: LineAmount) -> Self {
        LineItem {
            item: item.to_string(),
            description: description.into(),
            detail: detail.into(),
            rated: rated.into(),
            amount,
        }
    }
}

/// Secondary metrics printed in the "System Analysis" box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceEstimates {
    /// Expected daily yield (kWh)
    pub daily_energy_gen_kwh: f64,
    /// Share of load carried on battery (%)
    pub selected_load_percent: u32,
    /// Backup time at the selected load (h)
    pub backup_hours_at_load: f64,
    /// Emissions avoided (kg), daily yield × emission factor
    pub co2_saved_kg_per_year: f64,
    /// Grid emission factor used (kg CO2/kWh)
    pub emission_factor_kg_per_kwh: f64,
}

impl PerformanceEstimates {
    pub fn from_design(design: &SystemDesign, emission_factor_kg_per_kwh: f64) -> Self {
        PerformanceEstimates {
            daily_energy_gen_kwh: design.sizing.daily_energy_gen_kwh,
            selected_load_percent: design.sizing.inputs.selected_load_percent,
            backup_hours_at_load: design.sizing.backup_hours_at_load(),
            co2_saved_kg_per_year: design.sizing.co2_saved_kg(emission_factor_kg_per_kwh),
            emission_factor_kg_per_kwh,
        }
    }
}

/// A complete commercial quotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
    pub meta: QuotationMetadata,
    pub client: ClientInfo,
    pub design: SystemDesign,
    pub panel: PanelSpec,
    pub battery: BatterySpec,
    pub line_items: Vec<LineItem>,
    pub estimates: PerformanceEstimates,
    /// Currency code for every amount
    pub currency: String,
}

impl Quotation {
    /// Build a quotation issued now with a freshly generated reference.
    pub fn new(design: SystemDesign, client: ClientInfo, catalog: &ReferenceCatalog, company: &CompanyProfile) -> Self {
        let now = Utc::now();
        let reference = generate_reference(&company.reference_prefix, now.date_naive(), Uuid::new_v4());
        Self::issue(design, client, catalog, company, now, reference)
    }

    /// Build a quotation with an explicit timestamp and reference.
    pub fn issue(
        design: SystemDesign,
        client: ClientInfo,
        catalog: &ReferenceCatalog,
        company: &CompanyProfile,
        created: DateTime<Utc>,
        reference: String,
    ) -> Self {
        let issued = created.date_naive();
        let valid_until = issued + Duration::days(i64::from(company.validity_days));
        let line_items = build_line_items(&design, &catalog.panel, &catalog.battery);
        let estimates = PerformanceEstimates::from_design(&design, catalog.environment.emission_factor_kg_per_kwh);

        tracing::info!(
            reference = %reference,
            degraded = design.is_degraded(),
            "quotation issued"
        );

        Quotation {
            meta: QuotationMetadata {
                version: SCHEMA_VERSION.to_string(),
                reference,
                issued,
                valid_until,
                created,
            },
            client,
            design,
            panel: catalog.panel.clone(),
            battery: catalog.battery.clone(),
            line_items,
            estimates,
            currency: company.currency.clone(),
        }
    }

    /// Sum of all priced line items
    pub fn total_investment(&self) -> f64 {
        self.line_items.iter().filter_map(|l| l.amount.value()).sum()
    }

    /// Whether any line item is priced after the site survey
    pub fn has_pending_prices(&self) -> bool {
        self.line_items.iter().any(|l| l.amount == LineAmount::SiteSurvey)
    }

    /// Issues the reader must see before accepting the quotation.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let selection = &self.design.inverter;

        if selection.is_degraded() {
            warnings.push(format!(
                "Inverter capacity is provisional: {} provides {:.2} kW against {:.2} kW required. \
                 Engineering review is needed before installation.",
                selection.summary(),
                selection.total_capacity_kw,
                selection.required_kw
            ));
        }
        if selection.inverter.dc_input_voltage.is_none() {
            warnings.push(format!(
                "{} is a grid-tied unit with no battery bus; the quoted battery bank needs a hybrid inverter.",
                selection.inverter.display_name()
            ));
        }

        warnings
    }
}

/// Reference of the form `<PREFIX>-YYYYMM####`, the digits taken from `seed`.
pub fn generate_reference(prefix: &str, date: NaiveDate, seed: Uuid) -> String {
    format!(
        "{}-{:04}{:02}{:04}",
        prefix.trim(),
        date.year(),
        date.month(),
        seed.as_u128() % 10_000
    )
}

fn build_line_items(design: &SystemDesign, panel: &PanelSpec, battery: &BatterySpec) -> Vec<LineItem> {
    let sizing = &design.sizing;
    let selection = &design.inverter;

    let panel_amount = match panel.price {
        Some(price) => LineAmount::Priced(price * sizing.panel_count as f64),
        None => LineAmount::SiteSurvey,
    };
    let inverter_detail = if selection.count > 1 {
        format!("{} × {}", selection.count, selection.inverter.model)
    } else {
        selection.inverter.model.clone()
    };

    vec![
        LineItem::new(
            "Solar Panels",
            &panel.brand,
            format!("{} ({} units)", panel.model, sizing.panel_count),
            format!("{:.2} kW", sizing.solar_array_kw),
            panel_amount,
        ),
        LineItem::new(
            "Inverter",
            &selection.inverter.brand,
            inverter_detail,
            format!("Up to {} kW", selection.total_capacity_kw),
            LineAmount::Priced(selection.total_price()),
        ),
        LineItem::new(
            "Batteries",
            &battery.brand,
            battery.model.clone(),
            format!("{:.2} kWh", sizing.battery_bank_kwh),
            LineAmount::Priced(battery.price_per_kwh * sizing.battery_bank_kwh),
        ),
        LineItem::new(
            "Mounting",
            "Will be determined",
            "at site survey",
            "Mounting Hardware",
            LineAmount::SiteSurvey,
        ),
        LineItem::new(
            "Cabling",
            "Flex Cables",
            "Professional PV & AC Cables",
            "Full gauge supplied",
            LineAmount::Included,
        ),
        LineItem::new(
            "Protection",
            "Main Switch / Neutral Safety",
            "Voltage Protection",
            "40k MSC / ≤2.2kV VPL",
            LineAmount::Included,
        ),
        LineItem::new(
            "Installation",
            "Professional Install",
            "Testing & Commissioning",
            "Lump Sum",
            LineAmount::Included,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::{design_system, SizingInputs};
    use chrono::TimeZone;

    fn quote_for(load_watts: f64) -> Quotation {
        let catalog = ReferenceCatalog::builtin().unwrap();
        let design = design_system(&SizingInputs::with_load(load_watts), catalog).unwrap();
        let created = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();
        Quotation::issue(
            design,
            ClientInfo::new("Ada Obi", "0800", "Abuja"),
            catalog,
            &CompanyProfile::default(),
            created,
            "AER-2026030042".to_string(),
        )
    }

    #[test]
    fn test_reference_format() {
        let date = NaiveDate::from_ymd_opt(2026, 7, 3).unwrap();
        let reference = generate_reference("AER", date, Uuid::from_u128(1_234_567));
        assert_eq!(reference, "AER-2026074567");

        let reference = generate_reference("SRE", date, Uuid::from_u128(7));
        assert_eq!(reference, "SRE-2026070007");
    }

    #[test]
    fn test_generated_reference_shape() {
        let quote = Quotation::new(
            quote_for(1000.0).design,
            ClientInfo::default(),
            ReferenceCatalog::builtin().unwrap(),
            &CompanyProfile::default(),
        );
        let reference = &quote.meta.reference;
        assert!(reference.starts_with("AER-"));
        assert_eq!(reference.len(), "AER-".len() + 10);
        assert!(reference[4..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_validity_window() {
        let quote = quote_for(1000.0);
        assert_eq!(quote.meta.issued, NaiveDate::from_ymd_opt(2026, 3, 14).unwrap());
        assert_eq!(quote.meta.valid_until, NaiveDate::from_ymd_opt(2026, 4, 13).unwrap());
        assert_eq!(quote.meta.version, SCHEMA_VERSION);
    }

    #[test]
    fn test_line_items_and_total() {
        let quote = quote_for(1000.0);
        assert_eq!(quote.line_items.len(), 7);

        // 1.25 kW required -> FELICITY IVEM3024 at 380 000
        let inverter = &quote.line_items[1];
        assert_eq!(inverter.amount, LineAmount::Priced(380_000.0));

        // 10 kWh × 50 000
        let battery = &quote.line_items[2];
        assert!((battery.amount.value().unwrap() - 500_000.0).abs() < 1e-6);

        // Panels unpriced in the built-in catalog
        assert_eq!(quote.line_items[0].amount, LineAmount::SiteSurvey);
        assert!(quote.has_pending_prices());
        assert!((quote.total_investment() - 880_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_estimates() {
        let quote = quote_for(1000.0);
        assert!((quote.estimates.daily_energy_gen_kwh - 16.25).abs() < 1e-9);
        assert!((quote.estimates.backup_hours_at_load - 80.0).abs() < 1e-9);
        assert!((quote.estimates.co2_saved_kg_per_year - 6.825).abs() < 1e-9);
    }

    #[test]
    fn test_warnings() {
        assert!(quote_for(1000.0).warnings().is_empty());

        // 1000 kW required -> best-effort 5 × 100 kW
        let degraded = quote_for(800_000.0);
        let warnings = degraded.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("provisional"));
    }

    #[test]
    fn test_salutation_defaults_to_client() {
        assert_eq!(ClientInfo::default().salutation_name(), "Client");
        assert_eq!(ClientInfo::new("  Ada ", "", "").salutation_name(), "Ada");
    }

    #[test]
    fn test_serialization_roundtrip() {
        let quote = quote_for(2500.0);
        let json = serde_json::to_string(&quote).unwrap();
        assert!(json.contains("\"reference\":\"AER-2026030042\""));
        let loaded: Quotation = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, quote);
    }
}
