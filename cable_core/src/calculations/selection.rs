//! # Section Selection
//!
//! Picks the smallest compliant standard section.
//!
//! Derated ampacity rises and voltage drop falls as the section grows, so each
//! constraint, once met, stays met for every larger section. The compliant
//! sections therefore form an upward-closed tail of the ascending sequence and
//! the first compliant entry in ascending order is the minimum.
//!
//! [`diagnose`] additionally reports the smallest section meeting each
//! constraint on its own. It never changes what [`select`] returns.

use serde::{Deserialize, Serialize};

use super::evaluation::SectionEvaluation;

/// Outcome of the selection.
///
/// `NoCompliantSection` is a regular result, not an error: the caller should
/// present it as an actionable state (relax the limit, change material, ...).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SizingResult {
    /// Smallest standard section satisfying both constraints
    Selected(SectionEvaluation),
    /// No standard section satisfies both constraints
    NoCompliantSection,
}

impl SizingResult {
    /// The selected evaluation, if any
    pub fn selected(&self) -> Option<&SectionEvaluation> {
        match self {
            SizingResult::Selected(evaluation) => Some(evaluation),
            SizingResult::NoCompliantSection => None,
        }
    }

    /// Selected section in mm², if any
    pub fn section_mm2(&self) -> Option<f64> {
        self.selected().map(|e| e.section_mm2)
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, SizingResult::Selected(_))
    }
}

/// Select the first compliant evaluation of an ascending sequence.
///
/// # Example
///
/// ```rust
/// use cable_core::calculations::{evaluate, select};
/// use cable_core::circuit::{CircuitSpecification, PhaseType};
/// use cable_core::reference_data::ReferenceData;
///
/// let spec = CircuitSpecification {
///     phase: PhaseType::ThreePhase,
///     installation_method: "E".to_string(),
///     ..CircuitSpecification::default()
/// };
/// let evaluations = evaluate(&spec, ReferenceData::nf_c_15_100()).unwrap();
/// assert_eq!(select(&evaluations).section_mm2(), Some(4.0));
/// ```
pub fn select(evaluations: &[SectionEvaluation]) -> SizingResult {
    evaluations
        .iter()
        .find(|e| e.compliant)
        .map_or(SizingResult::NoCompliantSection, |e| SizingResult::Selected(*e))
}

/// Which constraint sets the selected section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoverningConstraint {
    /// Current-carrying capacity needs a larger section than voltage drop
    Ampacity,
    /// Voltage drop needs a larger section than current-carrying capacity
    VoltageDrop,
    /// Both constraints are first met at the same section
    Both,
}

impl GoverningConstraint {
    pub fn display_name(&self) -> &'static str {
        match self {
            GoverningConstraint::Ampacity => "Current-carrying capacity",
            GoverningConstraint::VoltageDrop => "Voltage drop",
            GoverningConstraint::Both => "Capacity and voltage drop",
        }
    }
}

/// Per-constraint minimum sections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstraintDiagnostics {
    /// Smallest section whose derated ampacity covers Ib
    pub min_section_for_ampacity_mm2: Option<f64>,
    /// Smallest section within the voltage-drop limit
    pub min_section_for_voltage_drop_mm2: Option<f64>,
    /// Governing constraint when a section is selected
    pub governing: Option<GoverningConstraint>,
}

impl ConstraintDiagnostics {
    /// Advice for the no-solution case, naming the constraint(s) never met.
    pub fn remediation_hint(&self) -> &'static str {
        match (
            self.min_section_for_ampacity_mm2,
            self.min_section_for_voltage_drop_mm2,
        ) {
            (None, None) => {
                "Neither constraint is met by any standard section: reduce the design current or split the circuit."
            }
            (None, Some(_)) => {
                "The design current exceeds the largest derated ampacity: improve installation conditions or split the circuit."
            }
            (Some(_), None) => "Relax the voltage-drop limit, shorten the run, or change material.",
            (Some(_), Some(_)) => "Relax the voltage-drop limit or change material.",
        }
    }
}

/// Report the smallest section meeting each constraint independently.
pub fn diagnose(evaluations: &[SectionEvaluation]) -> ConstraintDiagnostics {
    let ampacity = evaluations.iter().find(|e| e.ampacity_ok).map(|e| e.section_mm2);
    let voltage_drop = evaluations.iter().find(|e| e.voltage_drop_ok).map(|e| e.section_mm2);

    let governing = match (ampacity, voltage_drop) {
        (Some(a), Some(v)) if a > v => Some(GoverningConstraint::Ampacity),
        (Some(a), Some(v)) if v > a => Some(GoverningConstraint::VoltageDrop),
        (Some(_), Some(_)) => Some(GoverningConstraint::Both),
        _ => None,
    };

    ConstraintDiagnostics {
        min_section_for_ampacity_mm2: ampacity,
        min_section_for_voltage_drop_mm2: voltage_drop,
        governing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::evaluate;
    use crate::circuit::{CircuitSpecification, ConductorMaterial, PhaseType};
    use crate::reference_data::ReferenceData;

    fn scenario_a() -> CircuitSpecification {
        CircuitSpecification {
            label: "Scenario A".to_string(),
            phase: PhaseType::ThreePhase,
            design_current_a: 32.0,
            cable_length_m: 50.0,
            material: ConductorMaterial::Copper,
            installation_method: "E".to_string(),
            ambient_temperature_c: 30,
            max_voltage_drop_pct: 3.0,
        }
    }

    fn run(spec: &CircuitSpecification) -> Vec<SectionEvaluation> {
        evaluate(spec, ReferenceData::nf_c_15_100()).unwrap()
    }

    #[test]
    fn test_scenario_a_selects_4mm2() {
        let evaluations = run(&scenario_a());
        let result = select(&evaluations);
        let selected = result.selected().unwrap();
        assert_eq!(selected.section_mm2, 4.0);
        assert!((selected.voltage_drop_pct - 2.25).abs() < 1e-9);

        let diagnostics = diagnose(&evaluations);
        assert_eq!(diagnostics.min_section_for_ampacity_mm2, Some(4.0));
        assert_eq!(diagnostics.min_section_for_voltage_drop_mm2, Some(4.0));
        assert_eq!(diagnostics.governing, Some(GoverningConstraint::Both));
    }

    #[test]
    fn test_scenario_b_ampacity_dominates() {
        let spec = CircuitSpecification {
            max_voltage_drop_pct: 4.0,
            ..scenario_a()
        };
        let evaluations = run(&spec);

        let e25 = evaluations[1];
        assert_eq!(e25.section_mm2, 2.5);
        assert!(e25.voltage_drop_ok);
        assert!(!e25.ampacity_ok);
        assert_eq!(e25.derated_ampacity_a, 29.0);

        assert_eq!(select(&evaluations).section_mm2(), Some(4.0));

        let diagnostics = diagnose(&evaluations);
        assert_eq!(diagnostics.min_section_for_voltage_drop_mm2, Some(2.5));
        assert_eq!(diagnostics.governing, Some(GoverningConstraint::Ampacity));
    }

    #[test]
    fn test_voltage_drop_dominates() {
        // Long run: capacity is met early, drop pushes the section up
        let spec = CircuitSpecification {
            cable_length_m: 300.0,
            ..scenario_a()
        };
        let evaluations = run(&spec);
        let result = select(&evaluations);
        // dU = 0.0225 * 300 / S * 32 / 400 * 100 = 54 / S  -> S ≥ 18 -> 25 mm²
        assert_eq!(result.section_mm2(), Some(25.0));
        assert_eq!(diagnose(&evaluations).governing, Some(GoverningConstraint::VoltageDrop));
    }

    #[test]
    fn test_no_solution() {
        let spec = CircuitSpecification {
            design_current_a: 600.0,
            ..scenario_a()
        };
        let evaluations = run(&spec);
        let result = select(&evaluations);
        assert_eq!(result, SizingResult::NoCompliantSection);
        assert!(!result.is_selected());
        assert_eq!(result.section_mm2(), None);

        let diagnostics = diagnose(&evaluations);
        assert_eq!(diagnostics.min_section_for_ampacity_mm2, None);
        assert!(diagnostics.min_section_for_voltage_drop_mm2.is_some());
        assert_eq!(diagnostics.governing, None);
        assert!(diagnostics.remediation_hint().contains("largest derated ampacity"));
    }

    #[test]
    fn test_empty_sequence() {
        assert_eq!(select(&[]), SizingResult::NoCompliantSection);
        assert!(diagnose(&[]).remediation_hint().starts_with("Neither"));
    }

    #[test]
    fn test_result_serialization() {
        let result = select(&run(&scenario_a()));
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"status\":\"selected\""));
        let roundtrip: SizingResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, roundtrip);

        let none = serde_json::to_string(&SizingResult::NoCompliantSection).unwrap();
        assert_eq!(none, r#"{"status":"no_compliant_section"}"#);
    }
}
