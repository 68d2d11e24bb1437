//! # Reference Data
//!
//! The lookup tables the sizing rule is evaluated against:
//!
//! | Table                 | Key                   | Value                       |
//! |-----------------------|-----------------------|-----------------------------|
//! | Ampacity              | Standard section mm²  | Base ampacity Iz (A)        |
//! | Installation factor   | Method code           | Derating multiplier         |
//! | Temperature factor    | Ambient °C            | Derating multiplier         |
//! | Resistivity           | Conductor material    | ρ (Ω·mm²/m)                 |
//!
//! The ampacity table keys are the only candidate sections the engine ever
//! considers, in ascending order.
//!
//! A [`ReferenceData`] cannot be modified once built: fields are private and
//! only read accessors are exposed. The built-in NF C 15-100 tables are
//! initialised once per process ([`ReferenceData::nf_c_15_100`]); alternative
//! tables can be loaded from TOML and are validated on load.
//!
//! ## TOML format
//!
//! ```toml
//! name = "Site tables"
//!
//! [resistivity]
//! copper = 0.0225
//! aluminum = 0.036
//!
//! [[ampacity]]
//! section_mm2 = 1.5
//! base_ampacity_a = 20.0
//!
//! [[installation_methods]]
//! code = "E"
//! description = "Cable tray / free air"
//! factor = 1.0
//!
//! [[temperatures]]
//! celsius = 30
//! factor = 1.0
//! ```

use std::collections::HashSet;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::circuit::ConductorMaterial;
use crate::errors::{CalcError, CalcResult};

/// Upper bound accepted for a derating factor (cold ambient can exceed 1.0 slightly).
pub const MAX_DERATING_FACTOR: f64 = 1.2;

const AMPACITY_TABLE: &str = "ampacity";
const INSTALLATION_TABLE: &str = "installation factor";
const TEMPERATURE_TABLE: &str = "temperature factor";
const RESISTIVITY_TABLE: &str = "resistivity";

/// One row of the ampacity table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmpacityEntry {
    /// Standard conductor cross-section (mm²)
    pub section_mm2: f64,
    /// Tabulated current-carrying capacity before derating (A)
    pub base_ampacity_a: f64,
}

/// One installation method and its derating factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallationMethodEntry {
    /// Method code used as the lookup key (e.g., "E")
    pub code: String,
    /// Human-readable description
    pub description: String,
    /// Derating multiplier, 0 < factor ≤ 1
    pub factor: f64,
}

/// One ambient temperature and its derating factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureEntry {
    /// Ambient temperature (°C)
    pub celsius: i32,
    /// Derating multiplier (1.0 at the 30 °C reference)
    pub factor: f64,
}

/// Conductor resistivity constants (Ω·mm²/m) at operating temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resistivity {
    pub copper: f64,
    pub aluminum: f64,
}

impl Resistivity {
    /// Resistivity of the given material
    pub fn of(&self, material: ConductorMaterial) -> f64 {
        match material {
            ConductorMaterial::Copper => self.copper,
            ConductorMaterial::Aluminum => self.aluminum,
        }
    }
}

/// Raw, unvalidated table set as read from a file.
///
/// Turn it into usable reference data with [`ReferenceData::from_tables`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTables {
    pub name: String,
    pub resistivity: Resistivity,
    pub ampacity: Vec<AmpacityEntry>,
    pub installation_methods: Vec<InstallationMethodEntry>,
    pub temperatures: Vec<TemperatureEntry>,
}

/// Validated, read-only reference tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceData {
    name: String,
    resistivity: Resistivity,
    ampacity: Vec<AmpacityEntry>,
    installation_methods: Vec<InstallationMethodEntry>,
    temperatures: Vec<TemperatureEntry>,
}

static NF_C_15_100: Lazy<ReferenceData> = Lazy::new(|| ReferenceData::from_trusted(nf_c_15_100_tables()));

impl ReferenceData {
    /// The built-in NF C 15-100 tables, shared by the whole process.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cable_core::reference_data::ReferenceData;
    ///
    /// let data = ReferenceData::nf_c_15_100();
    /// assert_eq!(data.sections().next(), Some(1.5));
    /// assert_eq!(data.installation_factor("C").unwrap(), 0.8);
    /// ```
    pub fn nf_c_15_100() -> &'static ReferenceData {
        &NF_C_15_100
    }

    /// Validate a raw table set.
    pub fn from_tables(tables: ReferenceTables) -> CalcResult<Self> {
        validate_tables(&tables)?;
        Ok(Self::from_trusted(tables))
    }

    /// Parse and validate a TOML table set.
    pub fn from_toml_str(source: &str) -> CalcResult<Self> {
        let tables: ReferenceTables = toml::from_str(source).map_err(|e| CalcError::SerializationError {
            reason: format!("reference tables: {}", e),
        })?;
        Self::from_tables(tables)
    }

    /// Load and validate a TOML table set from disk.
    pub fn from_file(path: impl AsRef<Path>) -> CalcResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;
        Self::from_toml_str(&source)
    }

    fn from_trusted(tables: ReferenceTables) -> Self {
        ReferenceData {
            name: tables.name,
            resistivity: tables.resistivity,
            ampacity: tables.ampacity,
            installation_methods: tables.installation_methods,
            temperatures: tables.temperatures,
        }
    }

    /// Name of the table set (e.g., "NF C 15-100")
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ampacity rows, ascending by section
    pub fn ampacity_table(&self) -> &[AmpacityEntry] {
        &self.ampacity
    }

    /// Candidate sections, ascending
    pub fn sections(&self) -> impl Iterator<Item = f64> + '_ {
        self.ampacity.iter().map(|e| e.section_mm2)
    }

    pub fn installation_methods(&self) -> &[InstallationMethodEntry] {
        &self.installation_methods
    }

    pub fn temperatures(&self) -> &[TemperatureEntry] {
        &self.temperatures
    }

    /// Resistivity constant for a conductor material (Ω·mm²/m)
    pub fn resistivity(&self, material: ConductorMaterial) -> f64 {
        self.resistivity.of(material)
    }

    /// Derating factor for an installation method.
    ///
    /// An unknown code is a configuration error, never defaulted.
    pub fn installation_factor(&self, code: &str) -> CalcResult<f64> {
        self.installation_method(code)
            .map(|m| m.factor)
            .ok_or_else(|| CalcError::configuration_error("installation_method", INSTALLATION_TABLE, code))
    }

    /// Full table row for an installation method, if present
    pub fn installation_method(&self, code: &str) -> Option<&InstallationMethodEntry> {
        self.installation_methods.iter().find(|m| m.code == code)
    }

    /// Derating factor for an ambient temperature.
    ///
    /// Temperatures are discrete keys: 32 °C is not interpolated between 30 and 35.
    pub fn temperature_factor(&self, celsius: i32) -> CalcResult<f64> {
        self.temperatures
            .iter()
            .find(|t| t.celsius == celsius)
            .map(|t| t.factor)
            .ok_or_else(|| {
                CalcError::configuration_error("ambient_temperature_c", TEMPERATURE_TABLE, celsius.to_string())
            })
    }
}

fn validate_tables(tables: &ReferenceTables) -> CalcResult<()> {
    if tables.ampacity.is_empty() {
        return Err(CalcError::invalid_reference_data(AMPACITY_TABLE, "table is empty"));
    }
    for entry in &tables.ampacity {
        if !(entry.section_mm2.is_finite() && entry.section_mm2 > 0.0) {
            return Err(CalcError::invalid_reference_data(
                AMPACITY_TABLE,
                format!("section {} mm² must be positive", entry.section_mm2),
            ));
        }
        if !(entry.base_ampacity_a.is_finite() && entry.base_ampacity_a > 0.0) {
            return Err(CalcError::invalid_reference_data(
                AMPACITY_TABLE,
                format!("ampacity of {} mm² must be positive", entry.section_mm2),
            ));
        }
    }
    for pair in tables.ampacity.windows(2) {
        if pair[1].section_mm2 <= pair[0].section_mm2 {
            return Err(CalcError::invalid_reference_data(
                AMPACITY_TABLE,
                format!(
                    "sections must be strictly ascending ({} mm² follows {} mm²)",
                    pair[1].section_mm2, pair[0].section_mm2
                ),
            ));
        }
        if pair[1].base_ampacity_a <= pair[0].base_ampacity_a {
            return Err(CalcError::invalid_reference_data(
                AMPACITY_TABLE,
                format!(
                    "ampacity must increase with section ({} mm²: {} A, {} mm²: {} A)",
                    pair[0].section_mm2, pair[0].base_ampacity_a, pair[1].section_mm2, pair[1].base_ampacity_a
                ),
            ));
        }
    }

    if tables.installation_methods.is_empty() {
        return Err(CalcError::invalid_reference_data(INSTALLATION_TABLE, "table is empty"));
    }
    let mut codes = HashSet::new();
    for method in &tables.installation_methods {
        if !codes.insert(method.code.as_str()) {
            return Err(CalcError::invalid_reference_data(
                INSTALLATION_TABLE,
                format!("duplicate method '{}'", method.code),
            ));
        }
        check_factor(INSTALLATION_TABLE, &method.code, method.factor, 1.0)?;
    }

    if tables.temperatures.is_empty() {
        return Err(CalcError::invalid_reference_data(TEMPERATURE_TABLE, "table is empty"));
    }
    let mut temperatures = HashSet::new();
    for temperature in &tables.temperatures {
        if !temperatures.insert(temperature.celsius) {
            return Err(CalcError::invalid_reference_data(
                TEMPERATURE_TABLE,
                format!("duplicate temperature {} °C", temperature.celsius),
            ));
        }
        check_factor(
            TEMPERATURE_TABLE,
            &format!("{} °C", temperature.celsius),
            temperature.factor,
            MAX_DERATING_FACTOR,
        )?;
    }

    for material in ConductorMaterial::ALL {
        let rho = tables.resistivity.of(material);
        if !(rho.is_finite() && rho > 0.0) {
            return Err(CalcError::invalid_reference_data(
                RESISTIVITY_TABLE,
                format!("{} resistivity must be positive", material),
            ));
        }
    }

    Ok(())
}

fn check_factor(table: &str, key: &str, factor: f64, max: f64) -> CalcResult<()> {
    if factor.is_finite() && factor > 0.0 && factor <= max {
        Ok(())
    } else {
        Err(CalcError::invalid_reference_data(
            table,
            format!("factor {} for '{}' must be in (0, {}]", factor, key, max),
        ))
    }
}

/// NF C 15-100 tables: multi-core PVC cable, reference ambient 30 °C.
pub fn nf_c_15_100_tables() -> ReferenceTables {
    const AMPACITY: [(f64, f64); 15] = [
        (1.5, 20.0),
        (2.5, 29.0),
        (4.0, 39.0),
        (6.0, 50.0),
        (10.0, 71.0),
        (16.0, 94.0),
        (25.0, 124.0),
        (35.0, 154.0),
        (50.0, 187.0),
        (70.0, 236.0),
        (95.0, 292.0),
        (120.0, 344.0),
        (150.0, 391.0),
        (185.0, 448.0),
        (240.0, 528.0),
    ];
    const INSTALLATION: [(&str, &str, f64); 4] = [
        ("B", "Surface-mounted conduit", 0.9),
        ("C", "Buried", 0.8),
        ("E", "Cable tray / free air", 1.0),
        ("F", "Against masonry", 0.95),
    ];
    const TEMPERATURE: [(i32, f64); 6] = [(25, 1.06), (30, 1.0), (35, 0.94), (40, 0.87), (45, 0.79), (50, 0.71)];

    ReferenceTables {
        name: "NF C 15-100".to_string(),
        resistivity: Resistivity {
            copper: 0.0225,
            aluminum: 0.036,
        },
        ampacity: AMPACITY
            .iter()
            .map(|&(section_mm2, base_ampacity_a)| AmpacityEntry {
                section_mm2,
                base_ampacity_a,
            })
            .collect(),
        installation_methods: INSTALLATION
            .iter()
            .map(|&(code, description, factor)| InstallationMethodEntry {
                code: code.to_string(),
                description: description.to_string(),
                factor,
            })
            .collect(),
        temperatures: TEMPERATURE
            .iter()
            .map(|&(celsius, factor)| TemperatureEntry { celsius, factor })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_are_valid() {
        let validated = ReferenceData::from_tables(nf_c_15_100_tables()).unwrap();
        assert_eq!(&validated, ReferenceData::nf_c_15_100());
    }

    #[test]
    fn test_builtin_lookups() {
        let data = ReferenceData::nf_c_15_100();
        assert_eq!(data.ampacity_table().len(), 15);
        assert_eq!(data.sections().last(), Some(240.0));
        assert_eq!(data.installation_factor("E").unwrap(), 1.0);
        assert_eq!(data.installation_factor("F").unwrap(), 0.95);
        assert_eq!(data.temperature_factor(25).unwrap(), 1.06);
        assert_eq!(data.temperature_factor(50).unwrap(), 0.71);
        assert_eq!(data.resistivity(ConductorMaterial::Copper), 0.0225);
        assert_eq!(data.resistivity(ConductorMaterial::Aluminum), 0.036);
    }

    #[test]
    fn test_unknown_keys_are_configuration_errors() {
        let data = ReferenceData::nf_c_15_100();

        let err = data.installation_factor("Z").unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
        assert_eq!(err.field(), Some("installation_method"));

        // No interpolation between 30 and 35
        let err = data.temperature_factor(32).unwrap_err();
        assert_eq!(err.field(), Some("ambient_temperature_c"));
    }

    #[test]
    fn test_unsorted_sections_rejected() {
        let mut tables = nf_c_15_100_tables();
        tables.ampacity.swap(0, 1);
        let err = ReferenceData::from_tables(tables).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_REFERENCE_DATA");
    }

    #[test]
    fn test_non_increasing_ampacity_rejected() {
        let mut tables = nf_c_15_100_tables();
        tables.ampacity[3].base_ampacity_a = tables.ampacity[2].base_ampacity_a;
        assert!(ReferenceData::from_tables(tables).is_err());
    }

    #[test]
    fn test_out_of_range_factors_rejected() {
        let mut tables = nf_c_15_100_tables();
        tables.installation_methods[0].factor = 1.05;
        assert!(ReferenceData::from_tables(tables).is_err());

        let mut tables = nf_c_15_100_tables();
        tables.temperatures[0].factor = 0.0;
        assert!(ReferenceData::from_tables(tables).is_err());

        // Slightly above 1.0 is fine for temperature
        let mut tables = nf_c_15_100_tables();
        tables.temperatures[0].factor = 1.1;
        assert!(ReferenceData::from_tables(tables).is_ok());
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let mut tables = nf_c_15_100_tables();
        let duplicate = tables.installation_methods[0].clone();
        tables.installation_methods.push(duplicate);
        assert!(ReferenceData::from_tables(tables).is_err());

        let mut tables = nf_c_15_100_tables();
        tables.temperatures.push(TemperatureEntry { celsius: 30, factor: 1.0 });
        assert!(ReferenceData::from_tables(tables).is_err());
    }

    #[test]
    fn test_empty_ampacity_rejected() {
        let mut tables = nf_c_15_100_tables();
        tables.ampacity.clear();
        assert!(ReferenceData::from_tables(tables).is_err());
    }

    #[test]
    fn test_load_from_toml() {
        let source = r#"
            name = "Small set"

            [resistivity]
            copper = 0.0225
            aluminum = 0.036

            [[ampacity]]
            section_mm2 = 1.5
            base_ampacity_a = 20.0

            [[ampacity]]
            section_mm2 = 2.5
            base_ampacity_a = 29.0

            [[installation_methods]]
            code = "E"
            description = "Cable tray / free air"
            factor = 1.0

            [[temperatures]]
            celsius = 30
            factor = 1.0
        "#;
        let data = ReferenceData::from_toml_str(source).unwrap();
        assert_eq!(data.name(), "Small set");
        assert_eq!(data.sections().collect::<Vec<_>>(), vec![1.5, 2.5]);
        assert!(data.installation_factor("C").is_err());
    }

    #[test]
    fn test_malformed_toml_is_serialization_error() {
        let err = ReferenceData::from_toml_str("name = ").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_missing_file() {
        let err = ReferenceData::from_file("/nonexistent/tables.toml").unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }
}
