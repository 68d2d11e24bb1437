//! # Report Assembly
//!
//! Packages a finished sizing into a [`ReportBundle`]: the specification, every
//! section evaluation, the selection, a readable parameter list, formatted
//! table rows, and the two chart series. Renderers ([`crate::charts`],
//! [`crate::pdf`], the CLI) work from the bundle alone and never recompute.
//!
//! Numeric fields are copied from the engine output untouched; formatting only
//! happens in the `String` fields.
//!
//! ## Example
//!
//! ```rust
//! use cable_core::calculations::calculate;
//! use cable_core::circuit::{CircuitSpecification, PhaseType};
//! use cable_core::reference_data::ReferenceData;
//! use cable_core::report::{assemble, ReportMeta};
//!
//! let data = ReferenceData::nf_c_15_100();
//! let spec = CircuitSpecification {
//!     phase: PhaseType::ThreePhase,
//!     installation_method: "E".to_string(),
//!     ..CircuitSpecification::default()
//! };
//! let sizing = calculate(&spec, data).unwrap();
//! let bundle = assemble(&spec, data, &sizing, ReportMeta::new("Workshop", "J. Doe"));
//!
//! assert_eq!(bundle.summary.unwrap().section_mm2, 4.0);
//! assert_eq!(bundle.charts.len(), 2);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::{ConductorSizing, ConstraintDiagnostics, GoverningConstraint, SectionEvaluation, SizingResult};
use crate::circuit::CircuitSpecification;
use crate::reference_data::ReferenceData;

/// Shown instead of a result when no standard section qualifies.
pub const NO_SOLUTION_NOTICE: &str = "No standard section satisfies the constraints";

/// Report identification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMeta {
    pub report_id: Uuid,
    /// Project name printed in the header
    pub project: String,
    /// Author printed in the header
    pub engineer: String,
    pub generated_at: DateTime<Utc>,
}

impl ReportMeta {
    pub fn new(project: impl Into<String>, engineer: impl Into<String>) -> Self {
        ReportMeta {
            report_id: Uuid::new_v4(),
            project: project.into(),
            engineer: engineer.into(),
            generated_at: Utc::now(),
        }
    }
}

/// One human-readable input line ("Design current Ib" / "32 A").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterLine {
    pub label: String,
    pub value: String,
}

/// Key figures of the selected section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub section_mm2: f64,
    pub voltage_drop_pct: f64,
    pub max_voltage_drop_pct: f64,
    pub derated_ampacity_a: f64,
    pub design_current_a: f64,
    /// Iz' - Ib (A)
    pub ampacity_margin_a: f64,
    pub resistance_ohm: f64,
    pub governing: Option<GoverningConstraint>,
}

/// Display strings for one evaluation row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRow {
    pub section: String,
    pub derated_ampacity: String,
    pub voltage_drop: String,
    pub status: String,
}

/// Which of the two report charts a series feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    VoltageDrop,
    Ampacity,
}

impl ChartKind {
    /// Both report charts, in document order
    pub const ALL: [ChartKind; 2] = [ChartKind::VoltageDrop, ChartKind::Ampacity];

    /// In-memory file name used when the chart is embedded in a document
    pub fn file_name(&self) -> &'static str {
        match self {
            ChartKind::VoltageDrop => "voltage_drop.svg",
            ChartKind::Ampacity => "ampacity.svg",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
}

/// A line series against section, with a horizontal reference line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series_label: String,
    pub points: Vec<ChartPoint>,
    /// Limit (voltage drop) or requirement (Ib) drawn as a dashed line
    pub threshold: f64,
    pub threshold_label: String,
    /// Selected section, highlighted on the curve
    pub solution: Option<ChartPoint>,
}

/// Everything a renderer needs, computed once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportBundle {
    pub meta: ReportMeta,
    /// Name of the reference table set used
    pub reference_tables: String,
    pub specification: CircuitSpecification,
    pub parameters: Vec<ParameterLine>,
    pub evaluations: Vec<SectionEvaluation>,
    pub rows: Vec<EvaluationRow>,
    pub result: SizingResult,
    pub diagnostics: ConstraintDiagnostics,
    pub summary: Option<ResultSummary>,
    pub charts: Vec<ChartSeries>,
}

impl ReportBundle {
    /// Chart series of the given kind
    pub fn chart(&self, kind: ChartKind) -> Option<&ChartSeries> {
        self.charts.iter().find(|c| c.kind == kind)
    }

    /// Headline sentence for the result section.
    pub fn headline(&self) -> String {
        match &self.summary {
            Some(summary) => format!("Selected section: {} mm²", format_section(summary.section_mm2)),
            None => NO_SOLUTION_NOTICE.to_string(),
        }
    }

    /// Remediation advice when no section qualifies
    pub fn remediation_hint(&self) -> Option<&'static str> {
        match self.result {
            SizingResult::Selected(_) => None,
            SizingResult::NoCompliantSection => Some(self.diagnostics.remediation_hint()),
        }
    }
}

/// Build the report bundle for a completed sizing.
///
/// `data` must be the table set `sizing` was computed with; it is only read
/// for descriptions (installation method text, table set name).
pub fn assemble(
    spec: &CircuitSpecification,
    data: &ReferenceData,
    sizing: &ConductorSizing,
    meta: ReportMeta,
) -> ReportBundle {
    let summary = sizing.result.selected().map(|selected| ResultSummary {
        section_mm2: selected.section_mm2,
        voltage_drop_pct: selected.voltage_drop_pct,
        max_voltage_drop_pct: spec.max_voltage_drop_pct,
        derated_ampacity_a: selected.derated_ampacity_a,
        design_current_a: spec.design_current_a,
        ampacity_margin_a: selected.derated_ampacity_a - spec.design_current_a,
        resistance_ohm: selected.resistance_ohm,
        governing: sizing.diagnostics.governing,
    });

    ReportBundle {
        meta,
        reference_tables: data.name().to_string(),
        specification: spec.clone(),
        parameters: parameter_summary(spec, data),
        evaluations: sizing.evaluations.clone(),
        rows: sizing.evaluations.iter().map(evaluation_row).collect(),
        result: sizing.result,
        diagnostics: sizing.diagnostics,
        summary,
        charts: vec![
            voltage_drop_series(spec, sizing),
            ampacity_series(spec, sizing),
        ],
    }
}

/// Readable echo of the input specification.
pub fn parameter_summary(spec: &CircuitSpecification, data: &ReferenceData) -> Vec<ParameterLine> {
    let installation = match data.installation_method(&spec.installation_method) {
        Some(method) => format!("{} - {}", method.code, method.description),
        None => spec.installation_method.clone(),
    };

    let mut lines = Vec::with_capacity(8);
    if !spec.label.is_empty() {
        lines.push(line("Circuit", spec.label.clone()));
    }
    lines.extend([
        line("Network", spec.phase.display_name().to_string()),
        line("Conductor material", spec.material.display_name().to_string()),
        line("Design current Ib", format!("{} A", spec.design_current_a)),
        line("Cable length", format!("{} m", spec.cable_length_m)),
        line("Installation method", installation),
        line("Ambient temperature", format!("{} °C", spec.ambient_temperature_c)),
        line("Voltage drop limit", format!("{} %", spec.max_voltage_drop_pct)),
    ]);
    lines
}

fn line(label: &str, value: String) -> ParameterLine {
    ParameterLine {
        label: label.to_string(),
        value,
    }
}

fn evaluation_row(evaluation: &SectionEvaluation) -> EvaluationRow {
    EvaluationRow {
        section: format_section(evaluation.section_mm2),
        derated_ampacity: format!("{:.1}", evaluation.derated_ampacity_a),
        voltage_drop: format!("{:.2}", evaluation.voltage_drop_pct),
        status: if evaluation.compliant { "OK" } else { "FAIL" }.to_string(),
    }
}

/// Section for display: "1.5", "4", "240".
pub fn format_section(section_mm2: f64) -> String {
    format!("{}", section_mm2)
}

fn voltage_drop_series(spec: &CircuitSpecification, sizing: &ConductorSizing) -> ChartSeries {
    ChartSeries {
        kind: ChartKind::VoltageDrop,
        title: "Voltage drop vs section".to_string(),
        x_label: "Section (mm²)".to_string(),
        y_label: "dU (%)".to_string(),
        series_label: "Voltage drop (%)".to_string(),
        points: sizing
            .evaluations
            .iter()
            .map(|e| ChartPoint {
                x: e.section_mm2,
                y: e.voltage_drop_pct,
            })
            .collect(),
        threshold: spec.max_voltage_drop_pct,
        threshold_label: format!("Limit {} %", spec.max_voltage_drop_pct),
        solution: sizing.result.selected().map(|e| ChartPoint {
            x: e.section_mm2,
            y: e.voltage_drop_pct,
        }),
    }
}

fn ampacity_series(spec: &CircuitSpecification, sizing: &ConductorSizing) -> ChartSeries {
    ChartSeries {
        kind: ChartKind::Ampacity,
        title: "Current-carrying capacity (Iz) vs section".to_string(),
        x_label: "Section (mm²)".to_string(),
        y_label: "Current (A)".to_string(),
        series_label: "Cable Iz (A)".to_string(),
        points: sizing
            .evaluations
            .iter()
            .map(|e| ChartPoint {
                x: e.section_mm2,
                y: e.derated_ampacity_a,
            })
            .collect(),
        threshold: spec.design_current_a,
        threshold_label: format!("Required Ib {} A", spec.design_current_a),
        solution: sizing.result.selected().map(|e| ChartPoint {
            x: e.section_mm2,
            y: e.derated_ampacity_a,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::calculate;
    use crate::circuit::{ConductorMaterial, PhaseType};

    fn test_spec() -> CircuitSpecification {
        CircuitSpecification {
            label: "Workshop feeder".to_string(),
            phase: PhaseType::ThreePhase,
            design_current_a: 32.0,
            cable_length_m: 50.0,
            material: ConductorMaterial::Copper,
            installation_method: "E".to_string(),
            ambient_temperature_c: 30,
            max_voltage_drop_pct: 3.0,
        }
    }

    fn bundle_for(spec: &CircuitSpecification) -> (ConductorSizing, ReportBundle) {
        let data = ReferenceData::nf_c_15_100();
        let sizing = calculate(spec, data).unwrap();
        let bundle = assemble(spec, data, &sizing, ReportMeta::new("Test Project", "Test Engineer"));
        (sizing, bundle)
    }

    #[test]
    fn test_numbers_copied_verbatim() {
        let (sizing, bundle) = bundle_for(&test_spec());
        assert_eq!(bundle.evaluations, sizing.evaluations);
        assert_eq!(bundle.result, sizing.result);
        assert_eq!(bundle.diagnostics, sizing.diagnostics);
        assert_eq!(bundle.specification, test_spec());

        let du = bundle.chart(ChartKind::VoltageDrop).unwrap();
        for (point, e) in du.points.iter().zip(&sizing.evaluations) {
            assert_eq!(point.x, e.section_mm2);
            assert_eq!(point.y, e.voltage_drop_pct);
        }
    }

    #[test]
    fn test_summary_for_selected_section() {
        let (_, bundle) = bundle_for(&test_spec());
        let summary = bundle.summary.unwrap();
        assert_eq!(summary.section_mm2, 4.0);
        assert!((summary.ampacity_margin_a - 7.0).abs() < 1e-12);
        assert!((summary.resistance_ohm - 0.28125).abs() < 1e-12);
        assert_eq!(bundle.headline(), "Selected section: 4 mm²");
        assert_eq!(bundle.remediation_hint(), None);
    }

    #[test]
    fn test_charts_mark_solution_and_thresholds() {
        let (_, bundle) = bundle_for(&test_spec());

        let du = bundle.chart(ChartKind::VoltageDrop).unwrap();
        assert_eq!(du.threshold, 3.0);
        assert_eq!(du.points.len(), 15);
        assert_eq!(du.solution.unwrap().x, 4.0);

        let iz = bundle.chart(ChartKind::Ampacity).unwrap();
        assert_eq!(iz.threshold, 32.0);
        assert_eq!(iz.solution.unwrap().y, 39.0);
    }

    #[test]
    fn test_no_solution_bundle() {
        let spec = CircuitSpecification {
            design_current_a: 600.0,
            ..test_spec()
        };
        let (_, bundle) = bundle_for(&spec);
        assert!(bundle.summary.is_none());
        assert_eq!(bundle.headline(), NO_SOLUTION_NOTICE);
        assert!(bundle.remediation_hint().is_some());
        assert!(bundle.charts.iter().all(|c| c.solution.is_none()));
        assert!(bundle.rows.iter().all(|r| r.status == "FAIL"));
    }

    #[test]
    fn test_parameter_summary() {
        let lines = parameter_summary(&test_spec(), ReferenceData::nf_c_15_100());
        let find = |label: &str| lines.iter().find(|l| l.label == label).unwrap().value.clone();
        assert_eq!(find("Circuit"), "Workshop feeder");
        assert_eq!(find("Network"), "Three-phase (400 V)");
        assert_eq!(find("Design current Ib"), "32 A");
        assert_eq!(find("Cable length"), "50 m");
        assert_eq!(find("Installation method"), "E - Cable tray / free air");
        assert_eq!(find("Ambient temperature"), "30 °C");
        assert_eq!(find("Voltage drop limit"), "3 %");
    }

    #[test]
    fn test_row_formatting() {
        let (_, bundle) = bundle_for(&test_spec());
        let row = &bundle.rows[1];
        assert_eq!(row.section, "2.5");
        assert_eq!(row.derated_ampacity, "29.0");
        assert_eq!(row.voltage_drop, "3.60");
        assert_eq!(row.status, "FAIL");
        assert_eq!(bundle.rows[2].status, "OK");
    }

    #[test]
    fn test_bundle_serialization() {
        let (_, bundle) = bundle_for(&test_spec());
        let json = serde_json::to_string(&bundle).unwrap();
        let roundtrip: ReportBundle = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.meta.report_id, bundle.meta.report_id);
        assert_eq!(roundtrip.result.section_mm2(), Some(4.0));
    }
}
