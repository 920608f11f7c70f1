//! # Compliance Aggregator
//!
//! Runs every checker for one (section, demand, layout) triple in a fixed
//! order and folds the results into a [`ComplianceVerdict`]:
//!
//! 1. Flexure
//! 2. Shear (uses the tension steel actually provided)
//! 3. Deflection (reuses the flexural design)
//! 4. Crack control
//! 5. Ductility, only when ductile detailing is requested
//! 6. Detailing
//!
//! The verdict passes iff every result passes. The governing result is the
//! one with the highest ratio, the earliest in the order above on ties.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "passed": false,
//!   "governing_index": 1,
//!   "ductility_applied": false,
//!   "table_version": "is456-2000/is13920-2016/r1",
//!   "results": [
//!     { "check": "Flexure", "passed": true, "ratio": 0.93, "explanation": "...", "detail": { "type": "Flexure" } },
//!     { "check": "Shear", "passed": false, "ratio": 1.12, "reason": "ShearStressExceedsMaximum", "explanation": "...", "detail": { "type": "Shear" } }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::bar_selection::NoFeasibleLayout;
use crate::checks::{
    demand_ratio, detailing, ductility, flexure, rule_ratio, serviceability, shear, CheckDetail, CheckId,
    CheckResult, FailureReason,
};
use crate::code_tables::{clause, TABLE_SET_VERSION};
use crate::config::EngineConfig;
use crate::loads::LoadDemand;
use crate::reinforcement::ReinforcementLayout;
use crate::section::{BeamSection, BeamSpan};

/// Aggregate outcome of all checks for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceVerdict {
    pub passed: bool,
    /// Index into `results` of the least-margin result
    pub governing_index: usize,
    pub results: Vec<CheckResult>,
    pub ductility_applied: bool,
    pub table_version: String,
}

impl ComplianceVerdict {
    fn from_results(results: Vec<CheckResult>, ductility_applied: bool) -> Self {
        let mut governing_index = 0;
        for (i, result) in results.iter().enumerate() {
            if result.ratio > results[governing_index].ratio {
                governing_index = i;
            }
        }
        ComplianceVerdict {
            passed: results.iter().all(|r| r.passed),
            governing_index,
            results,
            ductility_applied,
            table_version: TABLE_SET_VERSION.to_string(),
        }
    }

    /// Verdict for a section that no catalog layout can reinforce.
    pub fn no_feasible_layout(infeasible: &NoFeasibleLayout, ductility_applied: bool) -> Self {
        // Area alone may fit while spacing rules still rule every layout out
        let ratio = rule_ratio(
            false,
            demand_ratio(infeasible.required_mm2, infeasible.max_achievable_mm2),
        );
        let result = CheckResult {
            check: CheckId::Detailing,
            passed: false,
            ratio,
            reason: Some(FailureReason::NoFeasibleLayout {
                required_mm2: infeasible.required_mm2,
                max_achievable_mm2: infeasible.max_achievable_mm2,
            }),
            explanation: format!(
                "No buildable layout carries {:.0} mm² (largest feasible {:.0} mm², {})",
                infeasible.required_mm2,
                infeasible.max_achievable_mm2,
                clause::MIN_BAR_SPACING
            ),
            detail: CheckDetail::NoLayout {
                required_mm2: infeasible.required_mm2,
                max_achievable_mm2: infeasible.max_achievable_mm2,
            },
        };
        ComplianceVerdict::from_results(vec![result], ductility_applied)
    }

    /// The least-margin result
    pub fn governing(&self) -> Option<&CheckResult> {
        self.results.get(self.governing_index)
    }

    /// Result of one check, if it ran
    pub fn result(&self, check: CheckId) -> Option<&CheckResult> {
        self.results.iter().find(|r| r.check == check)
    }

    /// Failing results, in check order
    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| !r.passed)
    }
}

/// Check a fully specified candidate.
///
/// # Example
///
/// ```rust
/// use rcbeam_core::compliance::check;
/// use rcbeam_core::checks::CheckId;
/// use rcbeam_core::config::EngineConfig;
/// use rcbeam_core::loads::LoadDemand;
/// use rcbeam_core::materials::{BarSize, ConcreteGrade, SteelGrade};
/// use rcbeam_core::reinforcement::{BarGroup, ReinforcementLayout, Stirrups};
/// use rcbeam_core::section::{BeamSection, BeamSpan};
///
/// let section = BeamSection::rectangular(300.0, 500.0, 452.0, 25.0,
///     ConcreteGrade::M20, SteelGrade::Fe415).unwrap();
/// let layout = ReinforcementLayout::new(
///     vec![BarGroup::new(BarSize::D20, 3, 0)],
///     vec![],
///     Stirrups { bar: BarSize::D8, legs: 2, spacing_mm: 150.0 },
/// ).unwrap();
/// let verdict = check(
///     &section,
///     &LoadDemand::new(100.0, 80.0).unwrap(),
///     &BeamSpan::simply_supported(5000.0).unwrap(),
///     &layout,
///     false,
///     &EngineConfig::default(),
/// );
/// assert!(verdict.result(CheckId::Ductility).is_none());
/// assert_eq!(verdict.results.len(), 5);
/// ```
pub fn check(
    section: &BeamSection,
    demand: &LoadDemand,
    span: &BeamSpan,
    layout: &ReinforcementLayout,
    ductility_enabled: bool,
    config: &EngineConfig,
) -> ComplianceVerdict {
    let rules = config.spacing_rules();
    let d_prime = flexure::compression_depth_mm(section, layout, &rules);
    let flexural_design = flexure::design(section, demand.moment_knm(), d_prime);

    let mut results = Vec::with_capacity(CheckId::ALL.len());
    results.push(flexure::assess(flexural_design.clone(), layout, config));
    results.push(shear::check(section, demand, layout, &config.shear));
    results.push(serviceability::check_deflection(section, span, &flexural_design, layout));
    results.push(serviceability::check_crack_control(section, layout, &rules));
    if ductility_enabled {
        results.push(ductility::check(section, layout, &config.ductility));
    }
    results.push(detailing::check(section, layout, config));

    let verdict = ComplianceVerdict::from_results(results, ductility_enabled);
    tracing::trace!(
        passed = verdict.passed,
        governing = ?verdict.governing().map(|r| r.check),
        ratio = verdict.governing().map_or(0.0, |r| r.ratio),
        "compliance verdict"
    );
    verdict
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{BarSize, ConcreteGrade, SteelGrade};
    use crate::reinforcement::{BarGroup, Stirrups};

    fn section(d: f64) -> BeamSection {
        BeamSection::rectangular(300.0, 500.0, d, 25.0, ConcreteGrade::M20, SteelGrade::Fe415).unwrap()
    }

    fn layout(tension: Vec<BarGroup>, spacing_mm: f64) -> ReinforcementLayout {
        ReinforcementLayout::new(
            tension,
            vec![],
            Stirrups {
                bar: BarSize::D8,
                legs: 2,
                spacing_mm,
            },
        )
        .unwrap()
    }

    fn span() -> BeamSpan {
        BeamSpan::simply_supported(5000.0).unwrap()
    }

    #[test]
    fn test_order_without_ductility() {
        let l = layout(vec![BarGroup::new(BarSize::D20, 3, 0)], 150.0);
        let v = check(
            &section(457.0),
            &LoadDemand::new(100.0, 80.0).unwrap(),
            &span(),
            &l,
            false,
            &EngineConfig::default(),
        );
        let order: Vec<CheckId> = v.results.iter().map(|r| r.check).collect();
        assert_eq!(
            order,
            vec![
                CheckId::Flexure,
                CheckId::Shear,
                CheckId::Deflection,
                CheckId::CrackControl,
                CheckId::Detailing
            ]
        );
        assert!(!v.ductility_applied);
    }

    #[test]
    fn test_passing_candidate() {
        // 3D20 = 942 mm² against ~690 mm² required
        let l = layout(vec![BarGroup::new(BarSize::D20, 3, 0)], 150.0);
        let v = check(
            &section(457.0),
            &LoadDemand::new(100.0, 80.0).unwrap(),
            &span(),
            &l,
            false,
            &EngineConfig::default(),
        );
        assert!(v.passed, "{:?}", v.failures().collect::<Vec<_>>());
        let governing = v.governing().unwrap();
        assert!(v.results.iter().all(|r| r.ratio <= governing.ratio));
    }

    #[test]
    fn test_governing_is_highest_ratio() {
        let l = layout(vec![BarGroup::new(BarSize::D12, 2, 0)], 150.0);
        let v = check(
            &section(459.0),
            &LoadDemand::new(150.0, 80.0).unwrap(),
            &span(),
            &l,
            true,
            &EngineConfig::default(),
        );
        assert!(!v.passed);
        let governing = v.governing().unwrap();
        assert_eq!(governing.check, CheckId::Flexure);
        assert!(v.result(CheckId::Ductility).is_some());
    }

    #[test]
    fn test_deterministic() {
        let l = layout(vec![BarGroup::new(BarSize::D16, 4, 0)], 120.0);
        let run = || {
            check(
                &section(458.0),
                &LoadDemand::new(120.0, 150.0).unwrap(),
                &span(),
                &l,
                true,
                &EngineConfig::default(),
            )
        };
        let a = serde_json::to_string(&run()).unwrap();
        let b = serde_json::to_string(&run()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_feasible_layout_verdict() {
        let v = ComplianceVerdict::no_feasible_layout(
            &NoFeasibleLayout {
                required_mm2: 9000.0,
                max_achievable_mm2: 6000.0,
            },
            false,
        );
        assert!(!v.passed);
        assert_eq!(v.results.len(), 1);
        let r = v.governing().unwrap();
        assert_eq!(r.check, CheckId::Detailing);
        assert!((r.ratio - 1.5).abs() < 1e-12);
        assert!(matches!(r.reason, Some(FailureReason::NoFeasibleLayout { .. })));
    }

    #[test]
    fn test_no_feasible_layout_always_fails() {
        let v = ComplianceVerdict::no_feasible_layout(
            &NoFeasibleLayout {
                required_mm2: 150.0,
                max_achievable_mm2: 900.0,
            },
            false,
        );
        assert!(!v.passed);
        assert!(v.governing().unwrap().ratio > 1.0);
    }
}
