//! # ElecCable CLI
//!
//! Terminal front end for the conductor sizing engine.
//!
//! ```text
//! cable size --phase three --current 32 --length 50 --installation E --max-drop 3
//! cable size --input feeder.json --format json
//! cable size --current 63 --length 120 --pdf note.pdf --project "Workshop"
//! cable tables
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use cable_core::calculations::calculate;
use cable_core::circuit::{CircuitSpecification, ConductorMaterial, PhaseType};
use cable_core::errors::CalcError;
use cable_core::pdf::render_report_pdf;
use cable_core::reference_data::ReferenceData;
use cable_core::report::{assemble, ReportBundle, ReportMeta};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod output;

/// ElecCable - low-voltage cable sizing (NF C 15-100)
#[derive(Parser, Debug)]
#[command(name = "cable")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Reference tables file (TOML); the built-in NF C 15-100 tables otherwise
    #[arg(long, global = true)]
    tables: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Size a conductor for one circuit
    Size(SizeArgs),

    /// List installation methods, temperatures and standard sections
    Tables,
}

#[derive(Args, Debug)]
struct SizeArgs {
    /// Circuit specification file (JSON); flags below override its fields
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Circuit label
    #[arg(long)]
    label: Option<String>,

    /// Supply network
    #[arg(long, value_enum)]
    phase: Option<PhaseArg>,

    /// Design current Ib (A)
    #[arg(long)]
    current: Option<f64>,

    /// Cable length (m)
    #[arg(long)]
    length: Option<f64>,

    /// Conductor metal
    #[arg(long, value_enum)]
    material: Option<MaterialArg>,

    /// Installation method code (see `cable tables`)
    #[arg(long)]
    installation: Option<String>,

    /// Ambient temperature (°C, tabulated values only)
    #[arg(long)]
    temperature: Option<i32>,

    /// Maximum voltage drop (%)
    #[arg(long)]
    max_drop: Option<f64>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Write the calculation note to this PDF file
    #[arg(long)]
    pdf: Option<PathBuf>,

    /// Project name for the calculation note
    #[arg(long, default_value = "LV sizing")]
    project: String,

    /// Engineer name for the calculation note
    #[arg(long, default_value = "")]
    engineer: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PhaseArg {
    Single,
    Three,
}

impl From<PhaseArg> for PhaseType {
    fn from(arg: PhaseArg) -> Self {
        match arg {
            PhaseArg::Single => PhaseType::SinglePhase,
            PhaseArg::Three => PhaseType::ThreePhase,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MaterialArg {
    Copper,
    Aluminum,
}

impl From<MaterialArg> for ConductorMaterial {
    fn from(arg: MaterialArg) -> Self {
        match arg {
            MaterialArg::Copper => ConductorMaterial::Copper,
            MaterialArg::Aluminum => ConductorMaterial::Aluminum,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if let Some(calc_error) = e.downcast_ref::<CalcError>() {
                if let Ok(json) = serde_json::to_string_pretty(calc_error) {
                    eprintln!();
                    eprintln!("Error JSON:");
                    eprintln!("{}", json);
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let loaded;
    let data: &ReferenceData = match &cli.tables {
        Some(path) => {
            loaded = ReferenceData::from_file(path)
                .with_context(|| format!("loading reference tables from {}", path.display()))?;
            info!(tables = loaded.name(), path = %path.display(), "reference tables loaded");
            &loaded
        }
        None => ReferenceData::nf_c_15_100(),
    };

    match &cli.command {
        Commands::Size(args) => size(args, data),
        Commands::Tables => {
            output::print_tables(data);
            Ok(())
        }
    }
}

fn size(args: &SizeArgs, data: &ReferenceData) -> Result<()> {
    let spec = build_spec(args)?;
    let sizing = calculate(&spec, data)?;
    let bundle = assemble(&spec, data, &sizing, ReportMeta::new(&args.project, &args.engineer));

    match args.format {
        OutputFormat::Text => output::print_report(&bundle),
        OutputFormat::Json => println!("{}", json_report(&bundle)?),
    }

    if let Some(path) = &args.pdf {
        let export = render_report_pdf(&bundle)?;
        for failure in &export.artifact_failures {
            warn!(artifact = %failure.artifact, reason = %failure.reason, "chart missing from PDF");
        }
        std::fs::write(path, &export.bytes).with_context(|| format!("writing {}", path.display()))?;
        if args.format == OutputFormat::Text {
            println!();
            println!("Calculation note written to {}", path.display());
        }
    }

    Ok(())
}

fn json_report(bundle: &ReportBundle) -> Result<String> {
    serde_json::to_string_pretty(bundle).context("serializing report")
}

/// Start from the input file (or defaults) and apply the flag overrides.
fn build_spec(args: &SizeArgs) -> Result<CircuitSpecification> {
    let mut spec = match &args.input {
        Some(path) => read_spec(path)?,
        None => CircuitSpecification::default(),
    };

    if let Some(label) = &args.label {
        spec.label = label.clone();
    }
    if let Some(phase) = args.phase {
        spec.phase = phase.into();
    }
    if let Some(current) = args.current {
        spec.design_current_a = current;
    }
    if let Some(length) = args.length {
        spec.cable_length_m = length;
    }
    if let Some(material) = args.material {
        spec.material = material.into();
    }
    if let Some(installation) = &args.installation {
        spec.installation_method = installation.clone();
    }
    if let Some(temperature) = args.temperature {
        spec.ambient_temperature_c = temperature;
    }
    if let Some(max_drop) = args.max_drop {
        spec.max_voltage_drop_pct = max_drop;
    }

    Ok(spec)
}

fn read_spec(path: &Path) -> Result<CircuitSpecification> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parsing circuit specification {}", path.display()))
}
