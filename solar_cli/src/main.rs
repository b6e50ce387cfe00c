//! # Solar Kit CLI
//!
//! Size a solar kit, print the inverter catalog, or produce a PDF quotation.
//!
//! ```bash
//! solar_cli size --load-w 1000
//! solar_cli size --load-w 500 --device fan --device "kettle=2200" --json
//! solar_cli quote --load-w 2400 --client-name "Ada Obi" --out quote.pdf
//! RUST_LOG=debug solar_cli inverters
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use solar_core::calculations::sizing::{
    DEFAULT_BACKUP_HOURS, DEFAULT_LOAD_PERCENT, DEFAULT_PANEL_DERATING, DEFAULT_PEAK_SUN_HOURS,
    DEFAULT_SYSTEM_LOSS,
};
use solar_core::calculations::{design_system, SizingInputs, SystemDesign};
use solar_core::catalog::ReferenceCatalog;
use solar_core::config::AppConfig;
use solar_core::equations::generate_equations_markdown;
use solar_core::loads::{DeviceEstimator, DeviceGuess, LabelTextEstimator, LoadList};
use solar_core::pdf::{format_amount, render_quotation_pdf};
use solar_core::quotation::{ClientInfo, LineAmount, Quotation};
use solar_core::{CalcError, CalcResult};

#[derive(Parser)]
#[command(name = "solar_cli")]
#[command(about = "Size solar kits and issue quotations", long_about = None)]
struct Cli {
    /// TOML file with company details and catalog overrides
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of a report
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Size a kit and select its inverter
    Size(SizingArgs),
    /// Size a kit and render a PDF quotation
    Quote(QuoteArgs),
    /// List the inverter catalog
    Inverters,
    /// Print the equation reference as Markdown
    Equations,
}

#[derive(Args)]
struct SizingArgs {
    /// Simultaneous load (W), added to any devices
    #[arg(long, default_value_t = 0.0)]
    load_w: f64,

    /// Hours the battery must carry the load
    #[arg(long, default_value_t = DEFAULT_BACKUP_HOURS)]
    backup_hours: f64,

    /// Equivalent full-sun hours per day
    #[arg(long, default_value_t = DEFAULT_PEAK_SUN_HOURS)]
    peak_sun_hours: f64,

    /// Panel derating factor (recorded, not applied)
    #[arg(long, default_value_t = DEFAULT_PANEL_DERATING)]
    derating: f64,

    /// Fraction of energy delivered after losses (0, 1]
    #[arg(long, default_value_t = DEFAULT_SYSTEM_LOSS)]
    system_loss: f64,

    /// Share of the load carried on battery (10 to 100)
    #[arg(long, default_value_t = DEFAULT_LOAD_PERCENT)]
    load_percent: u32,

    /// Appliance as NAME or NAME=WATTS; repeat for several
    #[arg(long = "device", value_name = "NAME[=WATTS]")]
    devices: Vec<String>,

    /// Text read off a rating plate; repeat for several
    #[arg(long = "label-text", value_name = "TEXT")]
    label_texts: Vec<String>,
}

#[derive(Args)]
struct QuoteArgs {
    #[command(flatten)]
    sizing: SizingArgs,

    #[arg(long, default_value = "")]
    client_name: String,

    #[arg(long, default_value = "")]
    contact: String,

    #[arg(long, default_value = "")]
    address: String,

    /// Where to write the PDF
    #[arg(short, long, default_value = "quotation.pdf")]
    out: PathBuf,

    /// Also write the quotation as JSON
    #[arg(long)]
    json_out: Option<PathBuf>,
}

fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install log subscriber: {}", e);
    }

    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = run(cli) {
        match err.downcast_ref::<CalcError>() {
            Some(calc_err) if json => match serde_json::to_string_pretty(calc_err) {
                Ok(body) => println!("{}", body),
                Err(_) => eprintln!("Error: {:#}", err),
            },
            _ => eprintln!("Error: {:#}", err),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let catalog = config.reference_catalog()?;

    match cli.command {
        Command::Size(args) => {
            let design = size(&args, &catalog)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&design)?);
            } else {
                print_design(&design, &catalog);
            }
        }
        Command::Quote(args) => {
            let design = size(&args.sizing, &catalog)?;
            let client = ClientInfo::new(args.client_name, args.contact, args.address);
            let quote = Quotation::new(design, client, &catalog, &config.company);

            let pdf = render_quotation_pdf(&quote, &config.company)?;
            fs::write(&args.out, pdf).with_context(|| format!("writing {}", args.out.display()))?;

            if let Some(path) = &args.json_out {
                fs::write(path, serde_json::to_string_pretty(&quote)?)
                    .with_context(|| format!("writing {}", path.display()))?;
            }

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&quote)?);
            } else {
                print_quote(&quote, &args.out);
            }
        }
        Command::Inverters => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&catalog.inverters)?);
            } else {
                print_inverters(&catalog);
            }
        }
        Command::Equations => print!("{}", generate_equations_markdown()),
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };

    let config = AppConfig::from_toml_file(path)?;
    let problems = config.validate();
    if !problems.is_empty() {
        for p in &problems {
            tracing::error!(field = %p.field, value = %p.value, "{}", p.reason);
        }
        bail!(CalcError::validation(problems));
    }
    Ok(config)
}

fn size(args: &SizingArgs, catalog: &ReferenceCatalog) -> Result<SystemDesign> {
    let mut loads = LoadList::new();
    for spec in &args.devices {
        loads.add(parse_device(spec, catalog)?)?;
    }

    let estimator = LabelTextEstimator::new(&catalog.appliances);
    for text in &args.label_texts {
        match estimator.estimate(text) {
            Some(guess) => {
                loads.add(guess)?;
            }
            None => tracing::warn!(label = %text, "no device or wattage recognised"),
        }
    }

    let base = SizingInputs {
        load_watts: args.load_w,
        backup_hours: args.backup_hours,
        peak_sun_hours: args.peak_sun_hours,
        panel_derating_factor: args.derating,
        system_loss_factor: args.system_loss,
        selected_load_percent: args.load_percent,
    };
    let inputs = loads.apply_to(&base);
    tracing::debug!(devices = loads.len(), load_watts = inputs.load_watts, "sizing inputs assembled");

    Ok(design_system(&inputs, catalog)?)
}

/// `NAME` takes the typical wattage from the appliance table; `NAME=WATTS` is explicit.
fn parse_device(spec: &str, catalog: &ReferenceCatalog) -> CalcResult<DeviceGuess> {
    let (name, watts) = match spec.split_once('=') {
        Some((name, watts)) => {
            let watts = watts.trim().parse::<f64>().map_err(|_| {
                CalcError::invalid_input("device", spec, "Wattage after '=' must be a number")
            })?;
            (name.trim(), watts)
        }
        None => {
            let name = spec.trim();
            let watts = catalog.typical_wattage(name).ok_or_else(|| {
                CalcError::invalid_input("device", spec, "Unknown appliance; give its wattage as NAME=WATTS")
            })?;
            (name, watts)
        }
    };
    Ok(DeviceGuess::new(name, watts))
}

// ============================================================================
// Reports
// ============================================================================

fn print_design(design: &SystemDesign, catalog: &ReferenceCatalog) {
    let s = &design.sizing;
    let inv = &design.inverter;

    println!("Solar Kit Sizing");
    println!("================");
    println!("Load:                 {:.3} kW ({:.3} kW with losses)", s.total_energy_kw, s.energy_with_losses_kw);
    println!("Battery bank:         {:.2} kWh at {}", s.battery_bank_kwh, s.system_voltage);
    println!("Solar array:          {:.3} kW", s.solar_array_kw);
    println!(
        "Panels:               {} × {} ({:.2} kW installed)",
        s.panel_count,
        catalog.panel.display_name(),
        s.installed_array_kw()
    );
    println!("Daily generation:     {:.2} kWh", s.daily_energy_gen_kwh);
    println!("Inverter required:    {:.3} kW", s.required_inverter_capacity_kw);
    println!("Inverter selected:    {}", inv.summary());
    println!("Backup at {}% load:  {:.1} h", s.inputs.selected_load_percent, s.backup_hours_at_load());
    println!(
        "CO2 avoided:          {:.2} kg",
        s.co2_saved_kg(catalog.environment.emission_factor_kg_per_kwh)
    );

    if design.is_degraded() {
        println!();
        println!(
            "WARNING: inverter set is {:.2} kW short; engineering review required.",
            inv.shortfall_kw()
        );
    }
}

fn print_quote(quote: &Quotation, out: &Path) {
    println!("Quotation {} for {}", quote.meta.reference, quote.client.salutation_name());
    println!("Valid until {}", quote.meta.valid_until);
    println!();
    for line in &quote.line_items {
        let amount = match line.amount {
            LineAmount::Priced(value) => format!("{} {}", quote.currency, format_amount(value)),
            LineAmount::Included => "Included".to_string(),
            LineAmount::SiteSurvey => "Site survey".to_string(),
        };
        println!("  {:<14} {:<40} {:>20}", line.item, line.detail, amount);
    }
    println!();
    println!("Total investment: {} {}", quote.currency, format_amount(quote.total_investment()));
    for warning in quote.warnings() {
        println!("WARNING: {}", warning);
    }
    println!();
    println!("PDF written to {}", out.display());
}

fn print_inverters(catalog: &ReferenceCatalog) {
    println!("{:<12} {:<26} {:>8} {:>14}  {}", "Brand", "Model", "kW", "Price", "DC bus");
    for inv in &catalog.inverters {
        println!(
            "{:<12} {:<26} {:>8} {:>14}  {}",
            inv.brand,
            inv.model,
            inv.ac_output_kw,
            format_amount(inv.price),
            inv.dc_bus_label()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_device_forms() {
        let catalog = ReferenceCatalog::builtin().unwrap();

        let fan = parse_device("fan", catalog).unwrap();
        assert_eq!(fan.device_type, "fan");
        assert_eq!(Some(fan.wattage_w), catalog.typical_wattage("fan"));

        let kettle = parse_device(" Kettle = 2200 ", catalog).unwrap();
        assert_eq!(kettle, DeviceGuess::new("Kettle", 2200.0));

        assert!(parse_device("flux capacitor", catalog).is_err());
        assert!(parse_device("fan=lots", catalog).is_err());
    }

    #[test]
    fn test_cli_parses_repeated_devices() {
        let cli = Cli::try_parse_from([
            "solar_cli",
            "size",
            "--load-w",
            "500",
            "--device",
            "fan",
            "--device",
            "kettle=2200",
            "--label-text",
            "LED TELEVISION 100W",
        ])
        .unwrap();

        let Command::Size(args) = cli.command else {
            panic!("expected size command");
        };
        assert_eq!(args.devices.len(), 2);
        assert_eq!(args.load_percent, DEFAULT_LOAD_PERCENT);

        let catalog = ReferenceCatalog::builtin().unwrap();
        let design = size(&args, catalog).unwrap();
        let fan = catalog.typical_wattage("fan").unwrap();
        assert!((design.sizing.inputs.load_watts - (500.0 + fan + 2200.0 + 100.0)).abs() < 1e-9);
    }

    #[test]
    fn test_zero_load_is_rejected() {
        let cli = Cli::try_parse_from(["solar_cli", "size"]).unwrap();
        let Command::Size(args) = cli.command else {
            panic!("expected size command");
        };
        let err = size(&args, ReferenceCatalog::builtin().unwrap()).unwrap_err();
        let calc_err = err.downcast_ref::<CalcError>().unwrap();
        assert_eq!(calc_err.failed_fields(), vec!["load_watts"]);
    }
}
