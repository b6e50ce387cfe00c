//! # Equation Registry
//!
//! Every formula the sizing engine and quotation use, with metadata for the
//! methodology appendix and the generated equations reference.
//!
//! ## Usage
//!
//! ```rust
//! use solar_core::equations::registry::SizingEquation;
//!
//! let meta = SizingEquation::BatteryBank.metadata();
//! println!("Formula: {}", meta.formula_plain);
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::SystemDesign;

// ============================================================================
// Equation Categories
// ============================================================================

/// Categories for grouping equations in the appendix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquationCategory {
    /// Load conversion and losses
    Load,
    /// Battery bank and bus voltage
    Storage,
    /// Array sizing and yield
    Generation,
    /// Inverter capacity
    Conversion,
    /// Figures quoted to the client
    Performance,
}

impl EquationCategory {
    /// Display name for the category
    pub fn display_name(&self) -> &'static str {
        match self {
            EquationCategory::Load => "Load",
            EquationCategory::Storage => "Storage",
            EquationCategory::Generation => "Generation",
            EquationCategory::Conversion => "Conversion",
            EquationCategory::Performance => "Performance Estimates",
        }
    }

    /// Sort order for the appendix (lower = earlier)
    pub fn sort_order(&self) -> u8 {
        match self {
            EquationCategory::Load => 1,
            EquationCategory::Storage => 2,
            EquationCategory::Generation => 3,
            EquationCategory::Conversion => 4,
            EquationCategory::Performance => 5,
        }
    }

    pub fn all() -> [EquationCategory; 5] {
        [
            EquationCategory::Load,
            EquationCategory::Storage,
            EquationCategory::Generation,
            EquationCategory::Conversion,
            EquationCategory::Performance,
        ]
    }
}

// ============================================================================
// Variable Definition
// ============================================================================

/// Definition of a variable used in an equation.
#[derive(Debug, Clone)]
pub struct Variable {
    /// Symbol in Typst math notation (e.g. `E_"bat"`)
    pub symbol: &'static str,
    /// Description
    pub description: &'static str,
    /// Units (e.g. "kW", "kWh", "h")
    pub units: &'static str,
}

impl Variable {
    pub const fn new(symbol: &'static str, description: &'static str, units: &'static str) -> Self {
        Self { symbol, description, units }
    }

    /// Symbol without Typst quoting, for Markdown and logs
    pub fn plain_symbol(&self) -> String {
        self.symbol.replace('"', "")
    }
}

// ============================================================================
// Equation Metadata
// ============================================================================

/// Complete metadata for one sizing equation.
#[derive(Debug, Clone)]
pub struct EquationMetadata {
    /// Human-readable name
    pub name: &'static str,
    /// What the equation computes
    pub description: &'static str,
    /// Formula in Typst math notation
    pub formula_typst: &'static str,
    /// Formula in plain text for Markdown
    pub formula_plain: &'static str,
    pub variables: Vec<Variable>,
    pub assumptions: Vec<&'static str>,
    pub category: EquationCategory,
    /// Source module implementing the equation
    pub source_module: &'static str,
    /// Function implementing the equation
    pub source_function: &'static str,
}

// ============================================================================
// Equation Enum
// ============================================================================

/// All equations used to size a kit and quote it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizingEquation {
    /// P_kW = P_W / 1000
    TotalLoad,
    /// P_eff = P_kW / eta_sys
    EffectiveLoad,
    /// E_bat = P_eff × p/100 × t_b
    BatteryBank,
    /// Step function over E_bat
    SystemVoltage,
    /// P_chg = E_bat / H_psh
    ArrayForBattery,
    /// P_pv = P_chg + P_load
    SolarArray,
    /// E_day = E_bat + P_load × H_psh
    DailyGeneration,
    /// N = ceil(P_pv × 1000 / W_panel)
    PanelCount,
    /// P_req = P_eff
    InverterCapacity,
    /// N_inv × P_rated >= P_req
    InverterSelection,
    /// t = (E_bat / P_eff) × p / 10
    BackupTime,
    /// m = E_day × EF
    Co2Saved,
}

impl SizingEquation {
    /// Get the full metadata for this equation
    pub fn metadata(&self) -> EquationMetadata {
        match self {
            SizingEquation::TotalLoad => EquationMetadata {
                name: "Total Load",
                description: "Simultaneous load of all connected appliances, converted to kilowatts.",
                formula_typst: r#"$P_"kW" = P_"W" / 1000$"#,
                formula_plain: "P_kW = P_W / 1000",
                variables: vec![
                    Variable::new(r#"P_"W""#, "Total simultaneous load", "W"),
                    Variable::new(r#"P_"kW""#, "Total load", "kW"),
                ],
                assumptions: vec!["All listed appliances may run at the same time"],
                category: EquationCategory::Load,
                source_module: "calculations/sizing.rs",
                source_function: "compute_sizing",
            },

            SizingEquation::EffectiveLoad => EquationMetadata {
                name: "Effective Load",
                description: "Load inflated for conversion and wiring losses. This is what the system must actually supply.",
                formula_typst: r#"$P_"eff" = P_"kW" / eta_"sys"$"#,
                formula_plain: "P_eff = P_kW / eta_sys",
                variables: vec![
                    Variable::new(r#"P_"eff""#, "Effective load", "kW"),
                    Variable::new(r#"eta_"sys""#, "System loss factor (fraction delivered)", "-"),
                ],
                assumptions: vec!["Losses are a fixed fraction of delivered energy"],
                category: EquationCategory::Load,
                source_module: "calculations/sizing.rs",
                source_function: "compute_sizing",
            },

            SizingEquation::BatteryBank => EquationMetadata {
                name: "Battery Bank Energy",
                description: "Energy stored to carry the selected share of the effective load through the backup window.",
                formula_typst: r#"$E_"bat" = P_"eff" times p / 100 times t_"b"$"#,
                formula_plain: "E_bat = P_eff × (p / 100) × t_b",
                variables: vec![
                    Variable::new(r#"E_"bat""#, "Battery bank energy", "kWh"),
                    Variable::new("p", "Share of load carried on battery", "%"),
                    Variable::new(r#"t_"b""#, "Backup hours", "h"),
                ],
                assumptions: vec!["The remaining share of the load is carried directly by the array in daylight"],
                category: EquationCategory::Storage,
                source_module: "calculations/sizing.rs",
                source_function: "compute_sizing",
            },

            SizingEquation::SystemVoltage => EquationMetadata {
                name: "System Voltage Class",
                description: "DC bus voltage chosen from the battery bank size. Each band includes its upper bound.",
                formula_typst: r#"$V_"bus" = cases(12 "V" & "if" E_"bat" <= 2, 24 "V" & "if" E_"bat" <= 5, 48 "V" & "if" E_"bat" <= 250, 96 "V" & "otherwise")$"#,
                formula_plain: "V_bus = 12 V if E_bat <= 2; 24 V if <= 5; 48 V if <= 250; else 96 V",
                variables: vec![
                    Variable::new(r#"V_"bus""#, "Nominal DC bus voltage", "V"),
                    Variable::new(r#"E_"bat""#, "Battery bank energy", "kWh"),
                ],
                assumptions: vec!["Bands are evaluated in ascending order and the first match wins"],
                category: EquationCategory::Storage,
                source_module: "calculations/sizing.rs",
                source_function: "SystemVoltage::from_battery_kwh",
            },

            SizingEquation::ArrayForBattery => EquationMetadata {
                name: "Array Share for Recharge",
                description: "Array power needed to refill the battery bank within one day of peak sun.",
                formula_typst: r#"$P_"chg" = E_"bat" / H_"psh"$"#,
                formula_plain: "P_chg = E_bat / H_psh",
                variables: vec![
                    Variable::new(r#"P_"chg""#, "Array share for recharge", "kW"),
                    Variable::new(r#"H_"psh""#, "Peak sun hours per day", "h"),
                ],
                assumptions: vec!["Insolation is expressed as equivalent full-sun hours"],
                category: EquationCategory::Generation,
                source_module: "calculations/sizing.rs",
                source_function: "compute_sizing",
            },

            SizingEquation::SolarArray => EquationMetadata {
                name: "Solar Array Capacity",
                description: "Total array capacity: the live effective load plus the recharge share.",
                formula_typst: r#"$P_"pv" = P_"chg" + P_"load", quad P_"load" = P_"eff"$"#,
                formula_plain: "P_pv = P_chg + P_load, where P_load = P_eff",
                variables: vec![
                    Variable::new(r#"P_"pv""#, "Solar array capacity", "kW"),
                    Variable::new(r#"P_"load""#, "Array share carrying the live load", "kW"),
                ],
                assumptions: vec!["Panel derating is recorded but not applied to the array size"],
                category: EquationCategory::Generation,
                source_module: "calculations/sizing.rs",
                source_function: "compute_sizing",
            },

            SizingEquation::DailyGeneration => EquationMetadata {
                name: "Daily Energy Generation",
                description: "Energy the array produces per day: the bank recharge plus the live load over the sun window.",
                formula_typst: r#"$E_"day" = E_"bat" + P_"load" times H_"psh"$"#,
                formula_plain: "E_day = E_bat + P_load × H_psh",
                variables: vec![Variable::new(r#"E_"day""#, "Daily energy generation", "kWh")],
                assumptions: vec!["Always at least the battery bank energy"],
                category: EquationCategory::Generation,
                source_module: "calculations/sizing.rs",
                source_function: "compute_sizing",
            },

            SizingEquation::PanelCount => EquationMetadata {
                name: "Panel Count",
                description: "Whole number of reference panels covering the array capacity.",
                formula_typst: r#"$N_"panel" = ceil(P_"pv" times 1000 / W_"panel")$"#,
                formula_plain: "N_panel = ceil(P_pv × 1000 / W_panel)",
                variables: vec![
                    Variable::new(r#"N_"panel""#, "Number of panels", "-"),
                    Variable::new(r#"W_"panel""#, "Reference panel rating", "W"),
                ],
                assumptions: vec!["Installed capacity never falls short of the array capacity"],
                category: EquationCategory::Generation,
                source_module: "calculations/sizing.rs",
                source_function: "compute_sizing",
            },

            SizingEquation::InverterCapacity => EquationMetadata {
                name: "Required Inverter Capacity",
                description: "Continuous AC capacity the inverter set must cover.",
                formula_typst: r#"$P_"req" = P_"eff"$"#,
                formula_plain: "P_req = P_eff",
                variables: vec![Variable::new(r#"P_"req""#, "Required inverter capacity", "kW")],
                assumptions: vec!["Sized for continuous load, not motor start-up surges"],
                category: EquationCategory::Conversion,
                source_module: "calculations/sizing.rs",
                source_function: "compute_sizing",
            },

            SizingEquation::InverterSelection => EquationMetadata {
                name: "Inverter Selection",
                description: "Smallest single unit that covers the requirement; otherwise 2 to 5 identical units with the least total capacity.",
                formula_typst: r#"$N_"inv" times P_"rated" >= P_"req", quad 1 <= N_"inv" <= 5$"#,
                formula_plain: "N_inv × P_rated >= P_req, 1 <= N_inv <= 5",
                variables: vec![
                    Variable::new(r#"N_"inv""#, "Number of identical inverters", "-"),
                    Variable::new(r#"P_"rated""#, "Rated AC output per unit", "kW"),
                ],
                assumptions: vec![
                    "Ties on total capacity go to fewer units",
                    "When nothing covers the load, five of the largest unit are proposed and flagged",
                ],
                category: EquationCategory::Conversion,
                source_module: "calculations/inverter.rs",
                source_function: "select_inverter",
            },

            SizingEquation::BackupTime => EquationMetadata {
                name: "Backup Time at Selected Load",
                description: "Backup time printed on the quotation for the selected load share.",
                formula_typst: r#"$t_"backup" = E_"bat" / P_"eff" times p / 10$"#,
                formula_plain: "t_backup = (E_bat / P_eff) × p / 10",
                variables: vec![Variable::new(r#"t_"backup""#, "Backup time at the selected load", "h")],
                assumptions: vec![],
                category: EquationCategory::Performance,
                source_module: "calculations/sizing.rs",
                source_function: "SizingResult::backup_hours_at_load",
            },

            SizingEquation::Co2Saved => EquationMetadata {
                name: "CO2 Emissions Avoided",
                description: "Emissions avoided by the daily yield at the grid emission factor.",
                formula_typst: r#"$m_"CO2" = E_"day" times "EF"$"#,
                formula_plain: "m_CO2 = E_day × EF",
                variables: vec![
                    Variable::new(r#"m_"CO2""#, "CO2 avoided", "kg"),
                    Variable::new(r#""EF""#, "Grid emission factor", "kg/kWh"),
                ],
                assumptions: vec!["Every generated kWh displaces one kWh of grid supply"],
                category: EquationCategory::Performance,
                source_module: "calculations/sizing.rs",
                source_function: "SizingResult::co2_saved_kg",
            },
        }
    }

    /// The equation evaluated for a design, e.g. "10.00 kWh".
    pub fn applied_value(&self, design: &SystemDesign, emission_factor_kg_per_kwh: f64) -> String {
        let s = &design.sizing;
        match self {
            SizingEquation::TotalLoad => format!("{:.3} kW", s.total_energy_kw),
            SizingEquation::EffectiveLoad => format!("{:.3} kW", s.energy_with_losses_kw),
            SizingEquation::BatteryBank => format!("{:.2} kWh", s.battery_bank_kwh),
            SizingEquation::SystemVoltage => s.system_voltage.to_string(),
            SizingEquation::ArrayForBattery => format!("{:.3} kW", s.panel_for_battery_kw),
            SizingEquation::SolarArray => format!("{:.3} kW", s.solar_array_kw),
            SizingEquation::DailyGeneration => format!("{:.2} kWh", s.daily_energy_gen_kwh),
            SizingEquation::PanelCount => format!("{} panels of {} W", s.panel_count, s.panel_wattage_w),
            SizingEquation::InverterCapacity => format!("{:.3} kW", s.required_inverter_capacity_kw),
            SizingEquation::InverterSelection => design.inverter.summary(),
            SizingEquation::BackupTime => format!("{:.1} h", s.backup_hours_at_load()),
            SizingEquation::Co2Saved => format!("{:.2} kg", s.co2_saved_kg(emission_factor_kg_per_kwh)),
        }
    }

    /// Get all equations in a given category
    pub fn in_category(category: EquationCategory) -> Vec<SizingEquation> {
        ALL_EQUATIONS
            .iter()
            .filter(|eq| eq.metadata().category == category)
            .copied()
            .collect()
    }

    /// Get all categories in appendix order
    pub fn all_categories() -> Vec<EquationCategory> {
        let mut cats = EquationCategory::all().to_vec();
        cats.sort_by_key(|c| c.sort_order());
        cats
    }
}

/// All equations in the registry, in computation order
pub static ALL_EQUATIONS: &[SizingEquation] = &[
    SizingEquation::TotalLoad,
    SizingEquation::EffectiveLoad,
    SizingEquation::BatteryBank,
    SizingEquation::SystemVoltage,
    SizingEquation::ArrayForBattery,
    SizingEquation::SolarArray,
    SizingEquation::DailyGeneration,
    SizingEquation::PanelCount,
    SizingEquation::InverterCapacity,
    SizingEquation::InverterSelection,
    SizingEquation::BackupTime,
    SizingEquation::Co2Saved,
];

// ============================================================================
// Typst Appendix
// ============================================================================

/// Generate the sizing methodology appendix as Typst markup.
///
/// With a design, each equation also shows the value it produced.
///
/// ```rust
/// use solar_core::equations::registry::generate_appendix_typst;
///
/// let typst = generate_appendix_typst(None, 0.42);
/// assert!(typst.contains("Sizing Methodology"));
/// assert!(typst.contains("Battery Bank Energy"));
/// ```
pub fn generate_appendix_typst(design: Option<&SystemDesign>, emission_factor_kg_per_kwh: f64) -> String {
    let mut output = String::new();

    output.push_str(
        r##"
#pagebreak()

#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 12pt, radius: 4pt)[
    #text(size: 18pt, weight: "bold")[Appendix: Sizing Methodology]
  ]
]

#v(12pt)

#text(size: 10pt)[
  The figures in this quotation follow from the equations below. Values are computed at full
  precision and rounded only for display.
]

#v(16pt)
"##,
    );

    for category in SizingEquation::all_categories() {
        let equations = SizingEquation::in_category(category);
        if equations.is_empty() {
            continue;
        }

        output.push_str(&format!("\n== {}\n\n", category.display_name()));

        for equation in equations {
            let meta = equation.metadata();

            output.push_str(&format!("=== {}\n\n", meta.name));
            output.push_str(&format!("#text(size: 10pt)[{}]\n\n", meta.description));
            output.push_str(&format!("*Formula:* {}\n\n", meta.formula_typst));

            if let Some(design) = design {
                output.push_str(&format!(
                    "*Applied:* {}\n\n",
                    crate::pdf::escape_typst(&equation.applied_value(design, emission_factor_kg_per_kwh))
                ));
            }

            if !meta.variables.is_empty() {
                output.push_str("#table(\n");
                output.push_str("  columns: (auto, 1fr, auto),\n");
                output.push_str("  inset: 5pt,\n");
                output.push_str("  stroke: 0.5pt,\n");
                output.push_str("  table.header([*Symbol*], [*Description*], [*Units*]),\n");
                for var in &meta.variables {
                    output.push_str(&format!(
                        "  [${}$], [{}], [{}],\n",
                        var.symbol,
                        var.description,
                        crate::pdf::escape_typst(var.units)
                    ));
                }
                output.push_str(")\n\n");
            }

            if !meta.assumptions.is_empty() {
                output.push_str("*Assumptions:*\n");
                for assumption in &meta.assumptions {
                    output.push_str(&format!("- {}\n", assumption));
                }
                output.push('\n');
            }

            output.push_str("#v(6pt)\n");
            output.push_str("#line(length: 100%, stroke: 0.25pt + gray)\n");
            output.push_str("#v(6pt)\n\n");
        }
    }

    output
}

// ============================================================================
// Markdown Generation for EQUATIONS.md
// ============================================================================

/// Generate a complete EQUATIONS.md document.
///
/// ```rust
/// use solar_core::equations::registry::generate_equations_markdown;
///
/// let markdown = generate_equations_markdown();
/// assert!(markdown.contains("Solar Sizing Equations Reference"));
/// ```
pub fn generate_equations_markdown() -> String {
    let mut output = String::with_capacity(12_000);

    output.push_str(
        r#"# Solar Sizing Equations Reference

> **Auto-generated from source code. Do not edit manually.**
>
> Regenerate with: `cargo run --bin gen-equations`

This document lists every formula used to size a solar kit and to fill in a quotation.
Values are computed at full precision; rounding is applied only when displayed.

---

"#,
    );

    let categories = SizingEquation::all_categories();

    for category in &categories {
        let equations = SizingEquation::in_category(*category);
        if equations.is_empty() {
            continue;
        }

        output.push_str(&format!("## {}\n\n", category.display_name()));

        for equation in equations {
            let meta = equation.metadata();

            output.push_str(&format!("### {}\n\n", meta.name));
            output.push_str(&format!("{}\n\n", meta.description));
            output.push_str(&format!("**Formula:** `{}`\n\n", meta.formula_plain));

            if !meta.variables.is_empty() {
                output.push_str("**Variables:**\n\n");
                output.push_str("| Symbol | Description | Units |\n");
                output.push_str("|--------|-------------|-------|\n");
                for var in &meta.variables {
                    output.push_str(&format!(
                        "| {} | {} | {} |\n",
                        var.plain_symbol(),
                        var.description,
                        var.units
                    ));
                }
                output.push('\n');
            }

            output.push_str(&format!(
                "**Source:** [`{}`]({})\n\n",
                meta.source_function, meta.source_module
            ));

            if !meta.assumptions.is_empty() {
                output.push_str("**Assumptions:**\n");
                for assumption in &meta.assumptions {
                    output.push_str(&format!("- {}\n", assumption));
                }
                output.push('\n');
            }

            output.push_str("---\n\n");
        }
    }

    output.push_str(&format!(
        "## Statistics\n\n- **Total Equations:** {}\n- **Categories:** {}\n",
        ALL_EQUATIONS.len(),
        categories.len()
    ));

    output
}
