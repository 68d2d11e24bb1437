//! # Conductor Sizing Calculations
//!
//! The calculation is split into an input, a result and a pure function:
//!
//! - [`CircuitSpecification`](crate::circuit::CircuitSpecification) - input (JSON-serializable)
//! - [`ConductorSizing`] - result (JSON-serializable)
//! - [`calculate`] - pure function `(&input, &ReferenceData) -> CalcResult<ConductorSizing>`
//!
//! The two stages are also exposed on their own:
//!
//! - [`evaluate`] - one [`SectionEvaluation`] per standard section, ascending
//! - [`select`] - the smallest compliant section, or [`SizingResult::NoCompliantSection`]
//!
//! Nothing here keeps state between calls. `ReferenceData` is only read, so
//! the same tables can be shared by any number of concurrent calculations.

pub mod evaluation;
pub mod selection;

#[cfg(test)]
mod proptest_sizing;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::circuit::CircuitSpecification;
use crate::errors::CalcResult;
use crate::reference_data::ReferenceData;

// Re-export commonly used types
pub use evaluation::{evaluate, DeratingFactors, SectionEvaluation};
pub use selection::{diagnose, select, ConstraintDiagnostics, GoverningConstraint, SizingResult};

/// Full outcome of one sizing request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConductorSizing {
    /// Every candidate section, ascending
    pub evaluations: Vec<SectionEvaluation>,

    /// Smallest compliant section, or none
    pub result: SizingResult,

    /// Smallest section per constraint, and which one governs
    pub diagnostics: ConstraintDiagnostics,
}

impl ConductorSizing {
    /// Check if a standard section was found
    pub fn passes(&self) -> bool {
        self.result.is_selected()
    }
}

/// Size a conductor.
///
/// Validates the numeric inputs, resolves the derating factors (unknown keys
/// are configuration errors), evaluates every standard section and selects
/// the smallest compliant one.
///
/// # Returns
///
/// * `Ok(ConductorSizing)` - including the no-solution case
/// * `Err(CalcError)` - invalid input or unknown table key
///
/// # Example
///
/// ```rust
/// use cable_core::calculations::calculate;
/// use cable_core::circuit::{CircuitSpecification, ConductorMaterial, PhaseType};
/// use cable_core::reference_data::ReferenceData;
///
/// let spec = CircuitSpecification {
///     label: "Feeder".to_string(),
///     phase: PhaseType::ThreePhase,
///     design_current_a: 32.0,
///     cable_length_m: 50.0,
///     material: ConductorMaterial::Copper,
///     installation_method: "E".to_string(),
///     ambient_temperature_c: 30,
///     max_voltage_drop_pct: 3.0,
/// };
///
/// let sizing = calculate(&spec, ReferenceData::nf_c_15_100()).unwrap();
/// assert_eq!(sizing.result.section_mm2(), Some(4.0));
/// ```
pub fn calculate(spec: &CircuitSpecification, data: &ReferenceData) -> CalcResult<ConductorSizing> {
    spec.validate()?;

    let evaluations = evaluate(spec, data)?;
    let result = select(&evaluations);
    let diagnostics = diagnose(&evaluations);

    debug!(
        circuit = %spec.label,
        tables = data.name(),
        candidates = evaluations.len(),
        selected_mm2 = ?result.section_mm2(),
        "conductor sized"
    );

    Ok(ConductorSizing {
        evaluations,
        result,
        diagnostics,
    })
}
