//! # PDF Generation Module
//!
//! Generates the calculation note for a sizing using Typst.
//!
//! ## Architecture
//!
//! - The Typst template is embedded as a string constant
//! - Data from the [`ReportBundle`] is injected by placeholder replacement
//! - Charts are rendered to SVG and served to Typst as in-memory files, so no
//!   temporary files touch the disk
//! - Output is raw PDF bytes (`Vec<u8>`) plus the list of charts that failed
//!
//! A chart that cannot be rendered is replaced by a notice in the document and
//! recorded in [`PdfExport::artifact_failures`]; the rest of the note is still
//! produced.
//!
//! ## Example
//!
//! ```rust,no_run
//! use cable_core::calculations::calculate;
//! use cable_core::circuit::CircuitSpecification;
//! use cable_core::pdf::render_report_pdf;
//! use cable_core::reference_data::ReferenceData;
//! use cable_core::report::{assemble, ReportMeta};
//!
//! let data = ReferenceData::nf_c_15_100();
//! let spec = CircuitSpecification::default();
//! let sizing = calculate(&spec, data).unwrap();
//! let bundle = assemble(&spec, data, &sizing, ReportMeta::new("Workshop", "J. Doe"));
//!
//! let export = render_report_pdf(&bundle).unwrap();
//! std::fs::write("calculation_note.pdf", export.bytes).unwrap();
//! ```

use std::collections::HashMap;

use chrono::Utc;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::charts;
use crate::errors::{CalcError, CalcResult};
use crate::report::{format_section, ChartKind, ReportBundle, ResultSummary};

/// Directory prefix for chart images inside the Typst world
const CHART_DIR: &str = "charts";

// ============================================================================
// Typst World Implementation
// ============================================================================

/// Fonts bundled with typst-assets, parsed once per process.
static FONTS: Lazy<Vec<Font>> = Lazy::new(|| {
    typst_assets::fonts()
        .flat_map(|font_bytes| Font::iter(Bytes::new(font_bytes.to_vec())))
        .collect()
});

/// A minimal Typst world: one source document plus in-memory image files.
struct PdfWorld {
    /// The main source document
    main: Source,
    /// Font book
    book: LazyHash<FontBook>,
    /// Library (standard functions)
    library: LazyHash<Library>,
    /// Virtual files by rootless path (e.g., "charts/ampacity.svg")
    files: HashMap<String, Bytes>,
}

impl PdfWorld {
    fn new(source: String, files: HashMap<String, Bytes>) -> Self {
        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(FontBook::from_fonts(FONTS.iter())),
            library: LazyHash::new(Library::default()),
            files,
        }
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        let path = id.vpath().as_rootless_path();
        path.to_str()
            .and_then(|p| self.files.get(p))
            .cloned()
            .ok_or_else(|| FileError::NotFound(path.into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        FONTS.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Utc::now();
        Datetime::from_ymd(
            now.format("%Y").to_string().parse().ok()?,
            now.format("%m").to_string().parse().ok()?,
            now.format("%d").to_string().parse().ok()?,
        )
    }
}

// ============================================================================
// Export Outcome
// ============================================================================

/// A report artifact that could not be produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactFailure {
    pub artifact: String,
    pub reason: String,
}

/// PDF bytes plus any charts left out of them.
#[derive(Debug, Clone)]
pub struct PdfExport {
    pub bytes: Vec<u8>,
    pub artifact_failures: Vec<ArtifactFailure>,
}

impl PdfExport {
    /// True when every chart made it into the document
    pub fn is_complete(&self) -> bool {
        self.artifact_failures.is_empty()
    }
}

// ============================================================================
// PDF Template
// ============================================================================

/// Typst template for the calculation note
const NOTE_TEMPLATE: &str = r##"
#set page(
  paper: "a4",
  margin: (top: 0.8in, bottom: 0.9in, left: 0.8in, right: 0.8in),
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, 1fr, 1fr),
      align(left)[#text(size: 8pt, fill: gray)[ElecCable - generated automatically]],
      align(center)[#text(size: 8pt)[Page #counter(page).display()]],
      align(right)[#text(size: 8pt)[{{DATE}}]],
    )
  ]
)

#set text(font: "DejaVu Sans Mono", size: 10pt)

// Title band
#block(width: 100%, fill: rgb("#16213e"), inset: 14pt, radius: 2pt)[
  #align(center)[
    #text(size: 18pt, weight: "bold", fill: white)[ELECTRICAL CALCULATION NOTE]
    #v(2pt)
    #text(size: 9pt, fill: rgb("#c8c8c8"))[Date: {{DATE}} | Project: {{PROJECT}} | Engineer: {{ENGINEER}}]
  ]
]

#v(6pt)
#text(size: 8pt, fill: gray)[Report {{REPORT_ID}} | Reference tables: {{TABLES}}]

#let chapter(title) = block(width: 100%, fill: rgb("#e6e6e6"), inset: 6pt)[
  #text(weight: "bold", fill: rgb("#16213e"))[#title]
]

#v(10pt)
#chapter("1. DESIGN HYPOTHESES")

#table(
  columns: (auto, 1fr),
  stroke: none,
  fill: (_, row) => if calc.odd(row) { rgb("#f5f5f5") } else { none },
  inset: 6pt,
{{PARAMETER_ROWS}}
)

#v(10pt)
#chapter("2. CALCULATION RESULTS")

{{RESULT_BLOCK}}

#v(10pt)
#chapter("3. GRAPHICAL ANALYSIS")

{{CHARTS}}

#pagebreak()
#chapter("4. CANDIDATE SECTIONS")

#table(
  columns: (1fr, 1fr, 1fr, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (right, right, right, center),
  table.header([*Section (mm#super[2])*], [*Iz' (A)*], [*dU (%)*], [*Status*]),
{{EVALUATION_ROWS}}
)

#v(10pt)
#chapter("5. METHOD")

Conductor resistance:
$ R = (rho dot L) / S $
with $rho$ = 0.0225 (copper) or 0.036 (aluminum) $Omega dot "mm"^2 "/m"$, $L$ the cable length and $S$ the section.

Voltage drop:
$ Delta U = (b dot R dot I_b) / U_n dot 100 $
with $b = 1$, $U_n = 400 "V"$ three-phase, and $b = 2$, $U_n = 230 "V"$ single-phase.

Derated current-carrying capacity:
$ I_z' = I_z dot K_"install" dot K_"temp" $

A section is compliant when $I_z' >= I_b$ and $Delta U <=$ the voltage drop limit. The retained section is the smallest compliant standard section.

#v(16pt)
#text(size: 8pt, fill: gray)[This note is a calculation aid and should be checked against the applicable installation standard.]
"##;

// ============================================================================
// PDF Rendering Functions
// ============================================================================

/// Render the calculation note for a report bundle.
///
/// # Returns
///
/// * `Ok(PdfExport)` - PDF bytes, with any chart failures listed
/// * `Err(CalcError)` - if the document itself fails to compile or render
pub fn render_report_pdf(bundle: &ReportBundle) -> CalcResult<PdfExport> {
    let mut files = HashMap::new();
    let mut artifact_failures = Vec::new();
    let mut chart_markup = Vec::new();

    for kind in ChartKind::ALL {
        let rendered = match bundle.chart(kind) {
            Some(series) => charts::render_svg(series),
            None => Err(CalcError::render_failed(kind.file_name(), "chart missing from report bundle")),
        };

        match rendered {
            Ok(svg) => {
                let path = format!("{}/{}", CHART_DIR, kind.file_name());
                chart_markup.push(format!("#align(center)[#image(\"{}\", width: 95%)]\n#v(8pt)", path));
                files.insert(path, Bytes::new(svg.into_bytes()));
            }
            Err(e) => {
                warn!(artifact = kind.file_name(), error = %e, "chart left out of report");
                chart_markup.push(format!(
                    "#block(width: 100%, stroke: 0.5pt + rgb(\"#c80000\"), inset: 8pt)[#text(fill: rgb(\"#c80000\"))[Chart unavailable: {}]]",
                    escape_typst(kind.file_name())
                ));
                artifact_failures.push(ArtifactFailure {
                    artifact: kind.file_name().to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let source = build_source(bundle, &chart_markup.join("\n"));

    // Compile the Typst document
    let world = PdfWorld::new(source, files);
    let warned = typst::compile(&world);

    let document = warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::render_failed("calculation note", format!("Typst compilation failed: {}", error_msgs.join("; ")))
    })?;

    // Render to PDF
    let bytes = typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::render_failed("calculation note", format!("PDF rendering failed: {}", error_msgs.join("; ")))
    })?;

    debug!(
        report_id = %bundle.meta.report_id,
        size = bytes.len(),
        failed_charts = artifact_failures.len(),
        "calculation note rendered"
    );

    Ok(PdfExport {
        bytes,
        artifact_failures,
    })
}

/// Fill the note template. Placeholders are substituted in one pass, so
/// user text containing `{{...}}` is never expanded.
fn build_source(bundle: &ReportBundle, charts: &str) -> String {
    let date = bundle.meta.generated_at.format("%Y-%m-%d").to_string();
    let values = [
        ("DATE", date),
        ("PROJECT", escape_typst(&bundle.meta.project)),
        ("ENGINEER", escape_typst(&bundle.meta.engineer)),
        ("REPORT_ID", bundle.meta.report_id.to_string()),
        ("TABLES", escape_typst(&bundle.reference_tables)),
        ("PARAMETER_ROWS", build_parameter_rows(bundle)),
        ("RESULT_BLOCK", build_result_block(bundle)),
        ("CHARTS", charts.to_string()),
        ("EVALUATION_ROWS", build_evaluation_rows(bundle)),
    ];
    fill_template(NOTE_TEMPLATE, &values)
}

fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = &after[..end];
        match values.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + end + 4]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

/// Escape special Typst characters in user-provided text
fn escape_typst(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '*' | '_' | '#' | '$' | '@' | '<' | '>' | '\\' | '`' | '/' | '[' | ']' | '=' | '-' | '+' | '~' => {
                format!("\\{}", c)
            }
            _ => c.to_string(),
        })
        .collect()
}

fn build_parameter_rows(bundle: &ReportBundle) -> String {
    bundle
        .parameters
        .iter()
        .map(|p| format!("  [{}:], [{}],", escape_typst(&p.label), escape_typst(&p.value)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn build_result_block(bundle: &ReportBundle) -> String {
    match &bundle.summary {
        Some(summary) => build_success_block(summary),
        None => format!(
            r##"#block(width: 100%, fill: rgb("#f8d7da"), stroke: 1pt + rgb("#c80000"), inset: 12pt, radius: 4pt)[
  #text(size: 13pt, weight: "bold", fill: rgb("#c80000"))[NO STANDARD SECTION SATISFIES THE CONSTRAINTS]
  #v(4pt)
  {hint}
]"##,
            hint = escape_typst(bundle.remediation_hint().unwrap_or_default()),
        ),
    }
}

fn build_success_block(summary: &ResultSummary) -> String {
    let governing = summary
        .governing
        .map(|g| g.display_name())
        .unwrap_or("n/a");

    format!(
        r##"#block(width: 100%, fill: rgb("#dcffdc"), stroke: 1pt + rgb("#228b22"), inset: 12pt, radius: 4pt)[
  #align(center)[#text(size: 14pt, weight: "bold")[RETAINED SECTION: {section} mm#super[2]]]
]

#v(6pt)
#table(
  columns: (auto, 1fr),
  stroke: none,
  inset: 5pt,
  [Voltage drop:], [{du} % (max: {du_max} %)],
  [Current-carrying capacity Iz':], [{iz} A (Ib: {ib} A, margin {margin} A)],
  [Conductor resistance:], [{r} Ω],
  [Governing constraint:], [{governing}],
  [Compliance:], [*YES*],
)"##,
        section = format_section(summary.section_mm2),
        du = format!("{:.2}", summary.voltage_drop_pct),
        du_max = summary.max_voltage_drop_pct,
        iz = format!("{:.1}", summary.derated_ampacity_a),
        ib = summary.design_current_a,
        margin = format!("{:.1}", summary.ampacity_margin_a),
        r = format!("{:.3}", summary.resistance_ohm),
        governing = governing,
    )
}

fn build_evaluation_rows(bundle: &ReportBundle) -> String {
    let selected = bundle.result.section_mm2();
    bundle
        .rows
        .iter()
        .zip(&bundle.evaluations)
        .map(|(row, evaluation)| {
            let status = if evaluation.compliant {
                format!("#text(fill: rgb(\"#228b22\"))[{}]", row.status)
            } else {
                format!("#text(fill: rgb(\"#c80000\"))[{}]", row.status)
            };
            let section = if selected == Some(evaluation.section_mm2) {
                format!("*{}*", row.section)
            } else {
                row.section.clone()
            };
            format!(
                "  [{}], [{}], [{}], [{}],",
                section, row.derated_ampacity, row.voltage_drop, status
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
