//! # Design Checks
//!
//! Each checker is a pure function over validated inputs that returns a
//! [`CheckResult`]. A failing check is a normal outcome, never an error.
//!
//! Every result is assembled from a list of [`Criterion`] values, one per
//! rule the checker evaluates. The result's ratio is the largest criterion
//! ratio; the check passes iff that ratio is ≤ 1.0, and a failing result
//! carries the [`FailureReason`] of the criterion that produced it.
//!
//! ## Available Checks
//!
//! - [`flexure`] - Limiting moment, required tension/compression steel
//! - [`shear`] - Nominal shear stress, τc, stirrup spacing
//! - [`serviceability`] - Span/depth ratio and crack-control bar spacing
//! - [`ductility`] - Ductile detailing limits (optional)
//! - [`detailing`] - Maximum steel, bar spacing, layers, effective depth

pub mod detailing;
pub mod ductility;
pub mod flexure;
pub mod serviceability;
pub mod shear;

use serde::{Deserialize, Serialize};

pub use detailing::DetailingDetail;
pub use ductility::DuctilityDetail;
pub use flexure::{FlexuralDesign, NeutralAxis, ReinforcementMode};
pub use serviceability::{CrackControlDetail, DeflectionDetail};
pub use shear::{ShearDesign, ShearMode};

/// Identifier of a check, in aggregation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CheckId {
    Flexure,
    Shear,
    Deflection,
    CrackControl,
    Ductility,
    Detailing,
}

impl CheckId {
    pub const ALL: [CheckId; 6] = [
        CheckId::Flexure,
        CheckId::Shear,
        CheckId::Deflection,
        CheckId::CrackControl,
        CheckId::Ductility,
        CheckId::Detailing,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            CheckId::Flexure => "Flexure",
            CheckId::Shear => "Shear",
            CheckId::Deflection => "Deflection (span/depth)",
            CheckId::CrackControl => "Crack control",
            CheckId::Ductility => "Ductile detailing",
            CheckId::Detailing => "Detailing",
        }
    }
}

impl std::fmt::Display for CheckId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Machine-readable reason a check failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FailureReason {
    /// Moment exceeds the singly-reinforced limit and no usable compression steel
    MomentExceedsSinglyLimit,
    InsufficientTensionSteel,
    InsufficientCompressionSteel,
    BelowMinimumSteel,
    /// τv > τc,max; no stirrup spacing can fix this
    ShearStressExceedsMaximum,
    StirrupSpacingTooWide,
    /// Required spacing is tighter than can be built; more stirrup steel per set is needed
    StirrupSpacingBelowPracticalMinimum,
    SpanDepthRatioExceeded,
    BarSpacingTooWide,
    ExceedsMaximumSteel,
    BarSpacingTooTight,
    TooFewBarsInLayer,
    TooManyLayers,
    /// Section effective depth is deeper than the bars actually sit
    EffectiveDepthInconsistent,
    DuctileMinimumSteel,
    DuctileMaximumSteel,
    DuctileTooFewBars,
    DuctileStirrupTooSmall,
    DuctileStirrupSpacing,
    /// Bar selection could not produce a buildable layout
    NoFeasibleLayout {
        required_mm2: f64,
        max_achievable_mm2: f64,
    },
}

impl FailureReason {
    pub fn description(&self) -> String {
        match self {
            FailureReason::MomentExceedsSinglyLimit => {
                "Moment exceeds singly-reinforced limit without compression steel".to_string()
            }
            FailureReason::InsufficientTensionSteel => "Insufficient tension steel".to_string(),
            FailureReason::InsufficientCompressionSteel => "Insufficient compression steel".to_string(),
            FailureReason::BelowMinimumSteel => "Tension steel below code minimum".to_string(),
            FailureReason::ShearStressExceedsMaximum => {
                "Shear stress exceeds maximum; section must be enlarged".to_string()
            }
            FailureReason::StirrupSpacingTooWide => "Stirrup spacing too wide".to_string(),
            FailureReason::StirrupSpacingBelowPracticalMinimum => {
                "Required stirrup spacing below practical minimum".to_string()
            }
            FailureReason::SpanDepthRatioExceeded => "Span/depth ratio exceeded".to_string(),
            FailureReason::BarSpacingTooWide => "Bar spacing too wide for crack control".to_string(),
            FailureReason::ExceedsMaximumSteel => "Steel exceeds code maximum".to_string(),
            FailureReason::BarSpacingTooTight => "Bars too close for concrete placement".to_string(),
            FailureReason::TooFewBarsInLayer => "Layer has fewer than two bars".to_string(),
            FailureReason::TooManyLayers => "Too many bar layers".to_string(),
            FailureReason::EffectiveDepthInconsistent => {
                "Effective depth deeper than the bar layout allows".to_string()
            }
            FailureReason::DuctileMinimumSteel => "Below ductile minimum tension steel".to_string(),
            FailureReason::DuctileMaximumSteel => "Above ductile maximum tension steel".to_string(),
            FailureReason::DuctileTooFewBars => "Too few continuous tension bars".to_string(),
            FailureReason::DuctileStirrupTooSmall => "Stirrup diameter below ductile minimum".to_string(),
            FailureReason::DuctileStirrupSpacing => "Stirrup spacing exceeds ductile limit".to_string(),
            FailureReason::NoFeasibleLayout {
                required_mm2,
                max_achievable_mm2,
            } => format!(
                "No feasible bar layout: {:.0} mm² required, at most {:.0} mm² fits",
                required_mm2, max_achievable_mm2
            ),
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// One rule inside a check: demand/capacity (or value/limit) and the reason
/// reported if it governs a failure.
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    pub ratio: f64,
    pub reason: FailureReason,
}

impl Criterion {
    pub fn new(ratio: f64, reason: FailureReason) -> Self {
        Criterion { ratio, reason }
    }
}

/// Check-specific numeric detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CheckDetail {
    Flexure(FlexuralDesign),
    Shear(ShearDesign),
    Deflection(DeflectionDetail),
    CrackControl(CrackControlDetail),
    Ductility(DuctilityDetail),
    Detailing(DetailingDetail),
    /// No layout could be built for the section
    NoLayout {
        required_mm2: f64,
        max_achievable_mm2: f64,
    },
}

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub check: CheckId,
    pub passed: bool,
    /// Governing demand/capacity ratio; ≤ 1.0 passes
    pub ratio: f64,
    /// Set only when the check fails
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
    pub explanation: String,
    pub detail: CheckDetail,
}

impl CheckResult {
    /// Assemble a result from its criteria.
    ///
    /// The governing criterion is the one with the largest ratio (the first
    /// one listed on ties).
    ///
    /// ```rust
    /// use rcbeam_core::checks::{CheckDetail, CheckId, CheckResult, Criterion, FailureReason};
    ///
    /// let result = CheckResult::from_criteria(
    ///     CheckId::Detailing,
    ///     vec![
    ///         Criterion::new(0.4, FailureReason::ExceedsMaximumSteel),
    ///         Criterion::new(1.2, FailureReason::TooManyLayers),
    ///     ],
    ///     "example".to_string(),
    ///     CheckDetail::NoLayout { required_mm2: 0.0, max_achievable_mm2: 0.0 },
    /// );
    /// assert!(!result.passed);
    /// assert_eq!(result.reason, Some(FailureReason::TooManyLayers));
    /// ```
    pub fn from_criteria(
        check: CheckId,
        criteria: Vec<Criterion>,
        explanation: String,
        detail: CheckDetail,
    ) -> Self {
        let mut governing: Option<Criterion> = None;
        for criterion in criteria {
            let replace = match &governing {
                None => true,
                Some(current) => criterion.ratio > current.ratio,
            };
            if replace {
                governing = Some(criterion);
            }
        }
        let ratio = governing.as_ref().map_or(0.0, |c| c.ratio);
        let passed = ratio <= 1.0;
        CheckResult {
            check,
            passed,
            ratio,
            reason: governing.filter(|_| !passed).map(|c| c.reason),
            explanation,
            detail,
        }
    }

    /// Remaining capacity fraction (negative when failing)
    pub fn margin(&self) -> f64 {
        1.0 - self.ratio
    }
}

/// Ratio of a required quantity to a provided one. A positive requirement
/// with nothing provided still yields a finite failing ratio.
pub(crate) fn demand_ratio(required: f64, provided: f64) -> f64 {
    if provided > 0.0 {
        required / provided
    } else if required > 0.0 {
        required.max(1.0) + 1.0
    } else {
        0.0
    }
}

/// Ratio for a rule that is either met or not: 0 when met, so it never
/// governs a passing check; otherwise `severity`, kept above 1.
pub(crate) fn rule_ratio(met: bool, severity: f64) -> f64 {
    if met {
        0.0
    } else if severity > 1.0 {
        severity
    } else {
        1.0 + f64::EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail() -> CheckDetail {
        CheckDetail::NoLayout {
            required_mm2: 0.0,
            max_achievable_mm2: 0.0,
        }
    }

    #[test]
    fn test_passing_result_has_no_reason() {
        let r = CheckResult::from_criteria(
            CheckId::Shear,
            vec![Criterion::new(0.8, FailureReason::StirrupSpacingTooWide)],
            String::new(),
            detail(),
        );
        assert!(r.passed);
        assert!(r.reason.is_none());
        assert!((r.margin() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_rule_ratio() {
        assert_eq!(rule_ratio(true, 1.0), 0.0);
        assert_eq!(rule_ratio(false, 2.0), 2.0);
        assert!(rule_ratio(false, 1.0) > 1.0);
        assert!(rule_ratio(false, 0.5) > 1.0);
    }

    #[test]
    fn test_ratio_exactly_one_passes() {
        let r = CheckResult::from_criteria(
            CheckId::Flexure,
            vec![Criterion::new(1.0, FailureReason::InsufficientTensionSteel)],
            String::new(),
            detail(),
        );
        assert!(r.passed);
    }

    #[test]
    fn test_first_criterion_wins_ties() {
        let r = CheckResult::from_criteria(
            CheckId::Shear,
            vec![
                Criterion::new(1.25, FailureReason::StirrupSpacingBelowPracticalMinimum),
                Criterion::new(1.25, FailureReason::StirrupSpacingTooWide),
            ],
            String::new(),
            detail(),
        );
        assert_eq!(r.reason, Some(FailureReason::StirrupSpacingBelowPracticalMinimum));
    }

    #[test]
    fn test_demand_ratio_without_provision_fails() {
        assert_eq!(demand_ratio(0.0, 0.0), 0.0);
        assert!(demand_ratio(500.0, 0.0) > 1.0);
        assert!(demand_ratio(0.2, 0.0) > 1.0);
        assert_eq!(demand_ratio(300.0, 600.0), 0.5);
    }

    #[test]
    fn test_check_order() {
        let mut sorted = CheckId::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, CheckId::ALL.to_vec());
    }

    #[test]
    fn test_reason_serialization() {
        let reason = FailureReason::NoFeasibleLayout {
            required_mm2: 5000.0,
            max_achievable_mm2: 3200.0,
        };
        let json = serde_json::to_string(&reason).unwrap();
        assert!(json.contains("NoFeasibleLayout"));
        let back: FailureReason = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reason);
    }
}
