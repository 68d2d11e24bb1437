//! # Circuit Specification
//!
//! The input side of a sizing request: network type, conductor metal, design
//! current, run length, installation conditions, and the voltage-drop limit.
//!
//! A `CircuitSpecification` is a plain value. It is validated once at the
//! input boundary ([`CircuitSpecification::validate`]); the installation method
//! and ambient temperature keys are checked against the reference tables when
//! the engine resolves its derating factors.
//!
//! ## Example
//!
//! ```rust
//! use cable_core::circuit::{CircuitSpecification, ConductorMaterial, PhaseType};
//!
//! let spec = CircuitSpecification {
//!     label: "Workshop feeder".to_string(),
//!     phase: PhaseType::ThreePhase,
//!     design_current_a: 32.0,
//!     cable_length_m: 50.0,
//!     material: ConductorMaterial::Copper,
//!     installation_method: "E".to_string(),
//!     ambient_temperature_c: 30,
//!     max_voltage_drop_pct: 3.0,
//! };
//!
//! assert!(spec.validate().is_ok());
//! assert_eq!(spec.phase.nominal_voltage_v(), 400.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Supply network type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PhaseType {
    /// 230 V phase-neutral circuit
    #[default]
    SinglePhase,
    /// 400 V balanced three-phase circuit
    ThreePhase,
}

impl PhaseType {
    /// Nominal voltage Un in volts
    pub fn nominal_voltage_v(&self) -> f64 {
        match self {
            PhaseType::SinglePhase => 230.0,
            PhaseType::ThreePhase => 400.0,
        }
    }

    /// Voltage-drop coefficient b: the current flows out and back on a
    /// single-phase run, so the loop length is twice the cable length.
    pub fn phase_factor(&self) -> f64 {
        match self {
            PhaseType::SinglePhase => 2.0,
            PhaseType::ThreePhase => 1.0,
        }
    }

    /// Display name for reports
    pub fn display_name(&self) -> &'static str {
        match self {
            PhaseType::SinglePhase => "Single-phase (230 V)",
            PhaseType::ThreePhase => "Three-phase (400 V)",
        }
    }
}

impl std::fmt::Display for PhaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Conductor metal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConductorMaterial {
    #[default]
    Copper,
    Aluminum,
}

impl ConductorMaterial {
    /// All materials, in display order
    pub const ALL: [ConductorMaterial; 2] = [ConductorMaterial::Copper, ConductorMaterial::Aluminum];

    /// Display name for reports
    pub fn display_name(&self) -> &'static str {
        match self {
            ConductorMaterial::Copper => "Copper",
            ConductorMaterial::Aluminum => "Aluminum",
        }
    }
}

impl std::fmt::Display for ConductorMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Input parameters for one conductor sizing request.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "Workshop feeder",
///   "phase": "three_phase",
///   "design_current_a": 32.0,
///   "cable_length_m": 50.0,
///   "material": "copper",
///   "installation_method": "E",
///   "ambient_temperature_c": 30,
///   "max_voltage_drop_pct": 3.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitSpecification {
    /// User label for this circuit (e.g., "Workshop feeder")
    #[serde(default)]
    pub label: String,

    /// Supply network type
    pub phase: PhaseType,

    /// Design current Ib in amperes
    pub design_current_a: f64,

    /// One-way cable length in meters
    pub cable_length_m: f64,

    /// Conductor metal
    pub material: ConductorMaterial,

    /// Installation method key (e.g., "E" for cable tray / free air)
    pub installation_method: String,

    /// Ambient temperature key in °C (must be one of the tabulated values)
    pub ambient_temperature_c: i32,

    /// Maximum admissible voltage drop, percent of nominal voltage
    pub max_voltage_drop_pct: f64,
}

impl Default for CircuitSpecification {
    fn default() -> Self {
        CircuitSpecification {
            label: "Circuit".to_string(),
            phase: PhaseType::default(),
            design_current_a: 32.0,
            cable_length_m: 50.0,
            material: ConductorMaterial::default(),
            installation_method: "C".to_string(),
            ambient_temperature_c: 30,
            max_voltage_drop_pct: 3.0,
        }
    }
}

impl CircuitSpecification {
    /// Validate the numeric inputs.
    ///
    /// Table keys are not checked here; see
    /// [`ReferenceData::installation_factor`](crate::reference_data::ReferenceData::installation_factor).
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("design_current_a", self.design_current_a, "Design current")?;
        require_positive("cable_length_m", self.cable_length_m, "Cable length")?;
        require_positive(
            "max_voltage_drop_pct",
            self.max_voltage_drop_pct,
            "Voltage drop limit",
        )?;
        Ok(())
    }
}

fn require_positive(field: &str, value: f64, what: &str) -> CalcResult<()> {
    if !value.is_finite() {
        return Err(CalcError::invalid_input(
            field,
            value.to_string(),
            format!("{} must be a finite number", what),
        ));
    }
    if value <= 0.0 {
        return Err(CalcError::invalid_input(
            field,
            value.to_string(),
            format!("{} must be positive", what),
        ));
    }
    Ok(())
}
