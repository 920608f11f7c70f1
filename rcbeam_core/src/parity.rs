//! # Parity Harness
//!
//! Compares this engine against expected values recorded by another
//! implementation, over a fixed corpus of check inputs. Comparison is
//! tolerance-bounded: two numbers agree when they differ by no more than the
//! absolute tolerance or the relative tolerance times the larger magnitude.
//!
//! ## Corpus Example
//!
//! ```json
//! {
//!   "schema_version": "0.1.0",
//!   "cases": [
//!     {
//!       "name": "singly-300x500",
//!       "input": { "section": { }, "demand": { }, "span": { }, "layout": { } },
//!       "expected": {
//!         "passed": true,
//!         "governing": "Flexure",
//!         "ratios": { "Flexure": 0.72, "Shear": 0.5 },
//!         "required_tension_mm2": 675.3
//!       }
//!     }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::checks::{CheckDetail, CheckId};
use crate::compliance::ComplianceVerdict;
use crate::config::EngineConfig;
use crate::request::{CheckInput, Versioned};

/// Relative-or-absolute comparison tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    pub relative: f64,
    pub absolute: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance {
            relative: 1e-6,
            absolute: 1e-9,
        }
    }
}

impl Tolerance {
    pub fn relative(relative: f64) -> Self {
        Tolerance {
            relative,
            ..Tolerance::default()
        }
    }

    /// ```rust
    /// use rcbeam_core::parity::Tolerance;
    ///
    /// let tol = Tolerance { relative: 1e-3, absolute: 1e-6 };
    /// assert!(tol.agrees(1000.0, 1000.9));
    /// assert!(!tol.agrees(1000.0, 1001.1));
    /// assert!(tol.agrees(0.0, 5e-7));
    /// ```
    pub fn agrees(&self, a: f64, b: f64) -> bool {
        if a == b {
            return true;
        }
        let diff = (a - b).abs();
        diff <= self.absolute || diff <= self.relative * a.abs().max(b.abs())
    }
}

/// Values another implementation produced for one input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedVerdict {
    pub passed: bool,
    pub governing: CheckId,
    /// Governing ratio per check; checks not listed are not compared
    #[serde(default)]
    pub ratios: BTreeMap<CheckId, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_tension_mm2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stirrup_spacing_mm: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParityCase {
    pub name: String,
    pub input: CheckInput,
    pub expected: ExpectedVerdict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParityCorpus {
    pub schema_version: String,
    pub cases: Vec<ParityCase>,
}

impl Versioned for ParityCorpus {
    fn schema_version(&self) -> &str {
        &self.schema_version
    }
}

/// One disagreement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mismatch {
    pub case: String,
    pub field: String,
    pub expected: String,
    pub actual: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParityReport {
    pub cases: usize,
    pub agreeing: usize,
    pub tolerance: Tolerance,
    pub mismatches: Vec<Mismatch>,
}

impl ParityReport {
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Required tension steel the flexure result reports
pub fn required_tension_mm2(verdict: &ComplianceVerdict) -> Option<f64> {
    match &verdict.result(CheckId::Flexure)?.detail {
        CheckDetail::Flexure(design) => Some(design.required_tension_mm2),
        _ => None,
    }
}

/// Design stirrup spacing the shear result reports
pub fn stirrup_spacing_mm(verdict: &ComplianceVerdict) -> Option<f64> {
    match &verdict.result(CheckId::Shear)?.detail {
        CheckDetail::Shear(design) => design.design_spacing_mm,
        _ => None,
    }
}

struct Collector<'a> {
    case: &'a str,
    tolerance: Tolerance,
    mismatches: Vec<Mismatch>,
}

impl Collector<'_> {
    fn push(&mut self, field: impl Into<String>, expected: impl ToString, actual: impl ToString) {
        self.mismatches.push(Mismatch {
            case: self.case.to_string(),
            field: field.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }

    fn number(&mut self, field: &str, expected: f64, actual: Option<f64>) {
        match actual {
            Some(actual) if self.tolerance.agrees(expected, actual) => {}
            Some(actual) => self.push(field, expected, actual),
            None => self.push(field, expected, "missing"),
        }
    }
}

/// Compare one computed verdict against expected values.
pub fn compare_expected(
    case: &str,
    expected: &ExpectedVerdict,
    actual: &ComplianceVerdict,
    tolerance: Tolerance,
) -> Vec<Mismatch> {
    let mut c = Collector {
        case,
        tolerance,
        mismatches: Vec::new(),
    };
    if expected.passed != actual.passed {
        c.push("passed", expected.passed, actual.passed);
    }
    match actual.governing() {
        Some(g) if g.check == expected.governing => {}
        Some(g) => c.push("governing", expected.governing, g.check),
        None => c.push("governing", expected.governing, "none"),
    }
    for (check, ratio) in &expected.ratios {
        c.number(&format!("ratio.{:?}", check), *ratio, actual.result(*check).map(|r| r.ratio));
    }
    if let Some(area) = expected.required_tension_mm2 {
        c.number("required_tension_mm2", area, required_tension_mm2(actual));
    }
    if let Some(spacing) = expected.stirrup_spacing_mm {
        c.number("stirrup_spacing_mm", spacing, stirrup_spacing_mm(actual));
    }
    c.mismatches
}

/// Diff two verdicts, e.g. from two implementations run on the same input.
pub fn compare_verdicts(
    case: &str,
    a: &ComplianceVerdict,
    b: &ComplianceVerdict,
    tolerance: Tolerance,
) -> Vec<Mismatch> {
    let mut c = Collector {
        case,
        tolerance,
        mismatches: Vec::new(),
    };
    if a.passed != b.passed {
        c.push("passed", a.passed, b.passed);
    }
    let governing = |v: &ComplianceVerdict| v.governing().map(|r| r.check);
    if governing(a) != governing(b) {
        c.push("governing", format!("{:?}", governing(a)), format!("{:?}", governing(b)));
    }
    for check in CheckId::ALL {
        match (a.result(check), b.result(check)) {
            (None, None) => {}
            (Some(ra), rb) => {
                c.number(&format!("ratio.{:?}", check), ra.ratio, rb.map(|r| r.ratio));
                if let Some(rb) = rb {
                    if ra.reason != rb.reason {
                        c.push(format!("reason.{:?}", check), format!("{:?}", ra.reason), format!("{:?}", rb.reason));
                    }
                }
            }
            (None, Some(_)) => c.push(format!("ratio.{:?}", check), "missing", "present"),
        }
    }
    match (required_tension_mm2(a), required_tension_mm2(b)) {
        (Some(x), y) => c.number("required_tension_mm2", x, y),
        (None, Some(y)) => c.push("required_tension_mm2", "missing", y),
        (None, None) => {}
    }
    c.mismatches
}

/// Run every case of a corpus and collect disagreements.
pub fn run_corpus(cases: &[ParityCase], config: &EngineConfig, tolerance: Tolerance) -> ParityReport {
    let mut mismatches = Vec::new();
    let mut agreeing = 0;
    for case in cases {
        let verdict = case.input.run(config);
        let found = compare_expected(&case.name, &case.expected, &verdict, tolerance);
        if found.is_empty() {
            agreeing += 1;
        } else {
            warn!(case = %case.name, mismatches = found.len(), "parity mismatch");
        }
        mismatches.extend(found);
    }
    info!(cases = cases.len(), agreeing, "parity run finished");
    ParityReport {
        cases: cases.len(),
        agreeing,
        tolerance,
        mismatches,
    }
}
