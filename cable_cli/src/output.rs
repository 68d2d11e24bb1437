//! Plain-text rendering of reports and reference tables.

use cable_core::circuit::ConductorMaterial;
use cable_core::reference_data::ReferenceData;
use cable_core::report::{format_section, ReportBundle};

const RULE: &str = "═══════════════════════════════════════════════";

pub fn print_report(bundle: &ReportBundle) {
    println!("{}", RULE);
    println!("  CONDUCTOR SIZING - {}", bundle.reference_tables);
    println!("{}", RULE);
    println!();

    println!("Input:");
    let width = bundle.parameters.iter().map(|p| p.label.chars().count()).max().unwrap_or(0);
    for parameter in &bundle.parameters {
        println!("  {:<width$}  {}", parameter.label, parameter.value, width = width);
    }
    println!();

    println!("Candidate sections:");
    println!("  {:>8}  {:>9}  {:>8}  {}", "S (mm²)", "Iz' (A)", "dU (%)", "Status");
    for line in evaluation_lines(bundle) {
        println!("{}", line);
    }
    println!();

    println!("{}", RULE);
    println!("  RESULT: {}", bundle.headline());
    println!("{}", RULE);

    match &bundle.summary {
        Some(summary) => {
            println!("  Voltage drop:  {:.2} % (limit {} %)", summary.voltage_drop_pct, summary.max_voltage_drop_pct);
            println!(
                "  Ampacity:      {:.1} A for Ib = {} A (margin {:.1} A)",
                summary.derated_ampacity_a, summary.design_current_a, summary.ampacity_margin_a
            );
            println!("  Resistance:    {:.4} Ω", summary.resistance_ohm);
            if let Some(governing) = summary.governing {
                println!("  Governs:       {}", governing.display_name());
            }
        }
        None => {
            let diagnostics = &bundle.diagnostics;
            println!("  Ampacity alone:      {}", min_section(diagnostics.min_section_for_ampacity_mm2));
            println!("  Voltage drop alone:  {}", min_section(diagnostics.min_section_for_voltage_drop_mm2));
            if let Some(hint) = bundle.remediation_hint() {
                println!();
                println!("  {}", hint);
            }
        }
    }
}

pub fn print_tables(data: &ReferenceData) {
    println!("{}", RULE);
    println!("  REFERENCE TABLES - {}", data.name());
    println!("{}", RULE);
    println!();

    println!("Installation methods:");
    for method in data.installation_methods() {
        println!("  {:<4} {:<28} x{}", method.code, method.description, method.factor);
    }
    println!();

    println!("Ambient temperatures:");
    for temperature in data.temperatures() {
        println!("  {:>3} °C   x{}", temperature.celsius, temperature.factor);
    }
    println!();

    println!("Standard sections:");
    for entry in data.ampacity_table() {
        println!("  {:>5} mm²  Iz = {} A", format_section(entry.section_mm2), entry.base_ampacity_a);
    }
    println!();

    println!("Resistivity (Ω·mm²/m):");
    println!("  Copper    {}", data.resistivity(ConductorMaterial::Copper));
    println!("  Aluminum  {}", data.resistivity(ConductorMaterial::Aluminum));
}

/// One line per candidate section, status taken from the evaluation itself.
fn evaluation_lines(bundle: &ReportBundle) -> Vec<String> {
    bundle
        .rows
        .iter()
        .zip(&bundle.evaluations)
        .map(|(row, evaluation)| {
            format!(
                "  {:>8}  {:>9}  {:>8}  {}",
                row.section,
                row.derated_ampacity,
                row.voltage_drop,
                status_icon(evaluation.compliant)
            )
        })
        .collect()
}

fn status_icon(ok: bool) -> &'static str {
    if ok {
        "[OK]"
    } else {
        "[FAIL]"
    }
}

fn min_section(section: Option<f64>) -> String {
    match section {
        Some(s) => format!("{} mm²", format_section(s)),
        None => "none in table".to_string(),
    }
}
