//! # cable_core - Low-Voltage Conductor Sizing Engine
//!
//! `cable_core` finds the smallest standard conductor cross-section that both
//! carries a circuit's design current (derated for installation method and
//! ambient temperature) and keeps the voltage drop within a limit, using the
//! NF C 15-100 tables. All inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and return results
//! - **Injected tables**: The engine always receives `&ReferenceData`; the
//!   built-in set is just a shared default
//! - **Rich Errors**: Structured error types, not just strings
//! - **No solution is data**: An unsatisfiable circuit yields
//!   `SizingResult::NoCompliantSection`, not an error
//!
//! ## Quick Start
//!
//! ```rust
//! use cable_core::calculations::calculate;
//! use cable_core::circuit::{CircuitSpecification, ConductorMaterial, PhaseType};
//! use cable_core::reference_data::ReferenceData;
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
//! let sizing = calculate(&spec, ReferenceData::nf_c_15_100()).unwrap();
//! assert_eq!(sizing.result.section_mm2(), Some(4.0));
//! ```
//!
//! ## Modules
//!
//! - [`circuit`] - Circuit specification (input) and its validation
//! - [`reference_data`] - Ampacity, derating and resistivity tables
//! - [`calculations`] - Section evaluation and selection
//! - [`report`] - Presentation-ready bundle of a finished sizing
//! - [`charts`] - SVG charts from the bundle
//! - [`pdf`] - Typst calculation note from the bundle
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod charts;
pub mod circuit;
pub mod errors;
pub mod pdf;
pub mod reference_data;
pub mod report;

// Re-export commonly used types at crate root for convenience
pub use calculations::{calculate, ConductorSizing, SectionEvaluation, SizingResult};
pub use circuit::{CircuitSpecification, ConductorMaterial, PhaseType};
pub use errors::{CalcError, CalcResult};
pub use reference_data::ReferenceData;
pub use report::{assemble, ReportBundle, ReportMeta};
