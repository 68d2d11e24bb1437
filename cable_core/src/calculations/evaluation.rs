//! # Section Evaluation
//!
//! Evaluates every standard cross-section against one circuit.
//!
//! For each candidate section S (mm²):
//!
//! ```text
//! R    = ρ × L / S                          (Ω)
//! Iz'  = Iz(S) × K_install × K_temp         (A)
//! dU%  = (b × R × Ib / Un) × 100
//! OK   = Iz' ≥ Ib  AND  dU% ≤ dU_max
//! ```
//!
//! where b = 1 and Un = 400 V for three-phase, b = 2 and Un = 230 V for
//! single-phase. Values are kept at full precision: rounding is left to
//! whoever displays them, so a 3.0000001 % drop fails a 3 % limit.

use serde::{Deserialize, Serialize};

use crate::circuit::CircuitSpecification;
use crate::errors::CalcResult;
use crate::reference_data::{AmpacityEntry, ReferenceData};

/// Evaluation of one candidate cross-section.
///
/// ## JSON Example
///
/// ```json
/// {
///   "section_mm2": 4.0,
///   "base_ampacity_a": 39.0,
///   "derated_ampacity_a": 39.0,
///   "resistance_ohm": 0.28125,
///   "voltage_drop_pct": 2.25,
///   "ampacity_ok": true,
///   "voltage_drop_ok": true,
///   "compliant": true
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionEvaluation {
    /// Standard cross-section (mm²)
    pub section_mm2: f64,

    /// Tabulated ampacity before derating (A)
    pub base_ampacity_a: f64,

    /// Ampacity after installation and temperature derating, Iz' (A)
    pub derated_ampacity_a: f64,

    /// Conductor resistance over the cable length (Ω)
    pub resistance_ohm: f64,

    /// Voltage drop at the design current, percent of Un
    pub voltage_drop_pct: f64,

    /// Iz' ≥ Ib
    pub ampacity_ok: bool,

    /// dU% ≤ limit
    pub voltage_drop_ok: bool,

    /// Both constraints hold
    pub compliant: bool,
}

/// Derating multipliers resolved from the reference tables for one circuit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeratingFactors {
    /// Installation method factor K_install
    pub installation: f64,
    /// Ambient temperature factor K_temp
    pub temperature: f64,
}

impl DeratingFactors {
    /// Look up both factors; fails on the first key missing from the tables.
    pub fn resolve(spec: &CircuitSpecification, data: &ReferenceData) -> CalcResult<Self> {
        Ok(DeratingFactors {
            installation: data.installation_factor(&spec.installation_method)?,
            temperature: data.temperature_factor(spec.ambient_temperature_c)?,
        })
    }
}

/// Evaluate every standard section for `spec`, ascending by section.
///
/// Both derating factors are resolved before any section is evaluated, so an
/// unknown installation method or temperature fails the whole request.
///
/// # Example
///
/// ```rust
/// use cable_core::calculations::evaluate;
/// use cable_core::circuit::{CircuitSpecification, ConductorMaterial, PhaseType};
/// use cable_core::reference_data::ReferenceData;
///
/// let spec = CircuitSpecification {
///     phase: PhaseType::ThreePhase,
///     material: ConductorMaterial::Copper,
///     installation_method: "E".to_string(),
///     ..CircuitSpecification::default()
/// };
///
/// let evaluations = evaluate(&spec, ReferenceData::nf_c_15_100()).unwrap();
/// assert_eq!(evaluations.len(), 15);
/// assert_eq!(evaluations[2].section_mm2, 4.0);
/// ```
pub fn evaluate(spec: &CircuitSpecification, data: &ReferenceData) -> CalcResult<Vec<SectionEvaluation>> {
    let factors = DeratingFactors::resolve(spec, data)?;
    let resistivity = data.resistivity(spec.material);

    Ok(data
        .ampacity_table()
        .iter()
        .map(|entry| evaluate_section(spec, entry, resistivity, factors))
        .collect())
}

fn evaluate_section(
    spec: &CircuitSpecification,
    entry: &AmpacityEntry,
    resistivity: f64,
    factors: DeratingFactors,
) -> SectionEvaluation {
    let resistance_ohm = resistivity * spec.cable_length_m / entry.section_mm2;
    let derated_ampacity_a = entry.base_ampacity_a * factors.installation * factors.temperature;
    let voltage_drop_pct = (spec.phase.phase_factor() * resistance_ohm * spec.design_current_a
        / spec.phase.nominal_voltage_v())
        * 100.0;

    let ampacity_ok = derated_ampacity_a >= spec.design_current_a;
    let voltage_drop_ok = voltage_drop_pct <= spec.max_voltage_drop_pct;

    SectionEvaluation {
        section_mm2: entry.section_mm2,
        base_ampacity_a: entry.base_ampacity_a,
        derated_ampacity_a,
        resistance_ohm,
        voltage_drop_pct,
        ampacity_ok,
        voltage_drop_ok,
        compliant: ampacity_ok && voltage_drop_ok,
    }
}
