//! Property-based tests for the sizing engine.
//!
//! These tests check the monotonicity, selection, determinism and
//! sensitivity properties of `evaluate` / `select` over random circuits
//! drawn against the built-in tables.

use proptest::prelude::*;

use super::evaluation::evaluate;
use super::selection::{diagnose, select, SizingResult};
use crate::circuit::{CircuitSpecification, ConductorMaterial, PhaseType};
use crate::reference_data::ReferenceData;

fn phase_strategy() -> impl Strategy<Value = PhaseType> {
    prop_oneof![Just(PhaseType::SinglePhase), Just(PhaseType::ThreePhase)]
}

fn material_strategy() -> impl Strategy<Value = ConductorMaterial> {
    prop_oneof![Just(ConductorMaterial::Copper), Just(ConductorMaterial::Aluminum)]
}

/// Strategy for circuits whose table keys all exist in the built-in tables.
fn spec_strategy() -> impl Strategy<Value = CircuitSpecification> {
    (
        phase_strategy(),
        0.5f64..800.0,
        1.0f64..2000.0,
        material_strategy(),
        prop::sample::select(vec!["B", "C", "E", "F"]),
        prop::sample::select(vec![25, 30, 35, 40, 45, 50]),
        0.5f64..10.0,
    )
        .prop_map(
            |(phase, design_current_a, cable_length_m, material, method, temperature, limit)| {
                CircuitSpecification {
                    label: "prop".to_string(),
                    phase,
                    design_current_a,
                    cable_length_m,
                    material,
                    installation_method: method.to_string(),
                    ambient_temperature_c: temperature,
                    max_voltage_drop_pct: limit,
                }
            },
        )
}

proptest! {
    /// Property: Iz' strictly increases and dU strictly decreases with section.
    #[test]
    fn prop_monotonic_in_section(spec in spec_strategy()) {
        let evaluations = evaluate(&spec, ReferenceData::nf_c_15_100()).unwrap();
        for pair in evaluations.windows(2) {
            prop_assert!(pair[1].section_mm2 > pair[0].section_mm2);
            prop_assert!(pair[1].derated_ampacity_a > pair[0].derated_ampacity_a);
            prop_assert!(pair[1].voltage_drop_pct < pair[0].voltage_drop_pct);
        }
    }

    /// Property: the selection is the first compliant entry and every larger
    /// section is compliant too.
    #[test]
    fn prop_selection_is_minimal(spec in spec_strategy()) {
        let evaluations = evaluate(&spec, ReferenceData::nf_c_15_100()).unwrap();
        match select(&evaluations) {
            SizingResult::Selected(chosen) => {
                prop_assert!(chosen.compliant);
                for e in &evaluations {
                    if e.section_mm2 < chosen.section_mm2 {
                        prop_assert!(!e.compliant);
                    } else {
                        prop_assert!(e.compliant);
                    }
                }
            }
            SizingResult::NoCompliantSection => {
                prop_assert!(evaluations.iter().all(|e| !e.compliant));
            }
        }
    }

    /// Property: the jointly minimal section is the larger of the two
    /// single-constraint minima.
    #[test]
    fn prop_diagnostics_agree_with_selection(spec in spec_strategy()) {
        let evaluations = evaluate(&spec, ReferenceData::nf_c_15_100()).unwrap();
        let diagnostics = diagnose(&evaluations);
        let expected = match (
            diagnostics.min_section_for_ampacity_mm2,
            diagnostics.min_section_for_voltage_drop_mm2,
        ) {
            (Some(a), Some(v)) => Some(a.max(v)),
            _ => None,
        };
        prop_assert_eq!(select(&evaluations).section_mm2(), expected);
    }

    /// Property: identical inputs give identical evaluations and result.
    #[test]
    fn prop_deterministic(spec in spec_strategy()) {
        let data = ReferenceData::nf_c_15_100();
        let first = evaluate(&spec, data).unwrap();
        let second = evaluate(&spec.clone(), data).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(select(&first), select(&second));
    }

    /// Property: aluminum resistance and drop are 1.6x copper's at every section.
    #[test]
    fn prop_material_sensitivity(spec in spec_strategy()) {
        let data = ReferenceData::nf_c_15_100();
        let copper = evaluate(
            &CircuitSpecification { material: ConductorMaterial::Copper, ..spec.clone() },
            data,
        ).unwrap();
        let aluminum = evaluate(
            &CircuitSpecification { material: ConductorMaterial::Aluminum, ..spec },
            data,
        ).unwrap();

        for (cu, al) in copper.iter().zip(&aluminum) {
            prop_assert!((al.resistance_ohm / cu.resistance_ohm - 1.6).abs() < 1e-12);
            prop_assert!((al.voltage_drop_pct / cu.voltage_drop_pct - 1.6).abs() < 1e-12);
            prop_assert_eq!(al.derated_ampacity_a, cu.derated_ampacity_a);
        }
    }

    /// Property: dU is 1·R·Ib/400 three-phase and 2·R·Ib/230 single-phase.
    #[test]
    fn prop_phase_sensitivity(spec in spec_strategy()) {
        let data = ReferenceData::nf_c_15_100();
        let three = evaluate(
            &CircuitSpecification { phase: PhaseType::ThreePhase, ..spec.clone() },
            data,
        ).unwrap();
        let single = evaluate(
            &CircuitSpecification { phase: PhaseType::SinglePhase, ..spec.clone() },
            data,
        ).unwrap();

        for (t, s) in three.iter().zip(&single) {
            prop_assert_eq!(t.resistance_ohm, s.resistance_ohm);
            let r = t.resistance_ohm;
            let expected_three = r * spec.design_current_a / 400.0 * 100.0;
            let expected_single = 2.0 * r * spec.design_current_a / 230.0 * 100.0;
            prop_assert!((t.voltage_drop_pct - expected_three).abs() <= 1e-9 * expected_three);
            prop_assert!((s.voltage_drop_pct - expected_single).abs() <= 1e-9 * expected_single);
        }
    }
}
