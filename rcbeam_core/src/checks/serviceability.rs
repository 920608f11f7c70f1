//! # Serviceability
//!
//! Two independent results: the span/effective-depth ratio (deflection
//! proxy) and crack control by clear spacing of the extreme tension layer.
//!
//! The allowable span/depth ratio is the basic ratio for the support
//! condition scaled by kt, kc and the flanged-section factor. kt is read at
//! the steel service stress fs = 0.58·fy·Ast,req/Ast,prov, so providing more
//! steel than required lowers fs and raises the allowable ratio.

use serde::{Deserialize, Serialize};

use super::{CheckDetail, CheckId, CheckResult, Criterion, FailureReason};
use crate::code_tables::{
    basic_span_depth_ratio, clause, compression_modification_factor, crack_control_max_spacing,
    flange_reduction_factor, tension_modification_factor, SERVICE_STRESS_FACTOR,
};
use crate::checks::flexure::FlexuralDesign;
use crate::reinforcement::{BarSpacingRules, ReinforcementLayout};
use crate::section::{BeamSection, BeamSpan};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeflectionDetail {
    pub span_mm: f64,
    /// Actual L/d
    pub span_depth_ratio: f64,
    pub basic_ratio: f64,
    /// Steel service stress fs used for kt (MPa)
    pub service_stress_mpa: f64,
    /// Required tension steel percentage used for kt
    pub tension_percent: f64,
    /// Provided compression steel percentage used for kc
    pub compression_percent: f64,
    pub kt: f64,
    pub kc: f64,
    pub kf: f64,
    pub allowable_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrackControlDetail {
    /// Clear spacing between bars of the extreme tension layer (mm)
    pub clear_spacing_mm: f64,
    pub max_clear_spacing_mm: f64,
}

/// Span/effective-depth check.
///
/// kt is read at the percentage of *required* tension steel, with the service
/// stress fs = 0.58·fy·Ast,req/Ast,prov. Extra provided steel therefore lowers
/// fs (raising kt) without also moving the pt axis, so adding bars never makes
/// the deflection ratio worse.
pub fn check_deflection(
    section: &BeamSection,
    span: &BeamSpan,
    flexure: &FlexuralDesign,
    layout: &ReinforcementLayout,
) -> CheckResult {
    let d = section.effective_depth_mm();
    let provided = layout.tension_area_mm2();
    let fs = SERVICE_STRESS_FACTOR * section.fy() * flexure.required_tension_mm2 / provided;
    let pt = section.steel_percent(flexure.required_tension_mm2);
    let pc = section.steel_percent(layout.compression_area_mm2());

    let basic = basic_span_depth_ratio(span.support(), span.length_mm());
    let kt = tension_modification_factor(fs, pt);
    let kc = compression_modification_factor(pc);
    let kf = section
        .flange()
        .map_or(1.0, |f| flange_reduction_factor(section.width_mm() / f.width_mm));
    let allowable = basic * kt * kc * kf;
    let actual = span.length_mm() / d;

    let detail = DeflectionDetail {
        span_mm: span.length_mm(),
        span_depth_ratio: actual,
        basic_ratio: basic,
        service_stress_mpa: fs,
        tension_percent: pt,
        compression_percent: pc,
        kt,
        kc,
        kf,
        allowable_ratio: allowable,
    };
    let explanation = format!(
        "L/d = {:.1}, allowable {:.1} = {:.0} ({}) × kt {:.3} × kc {:.3} × kf {:.3} ({})",
        actual,
        allowable,
        basic,
        span.support(),
        kt,
        kc,
        kf,
        clause::SPAN_DEPTH
    );
    CheckResult::from_criteria(
        CheckId::Deflection,
        vec![Criterion::new(actual / allowable, FailureReason::SpanDepthRatioExceeded)],
        explanation,
        CheckDetail::Deflection(detail),
    )
}

/// Maximum clear spacing of the extreme tension layer.
pub fn check_crack_control(
    section: &BeamSection,
    layout: &ReinforcementLayout,
    rules: &BarSpacingRules,
) -> CheckResult {
    let available = section.clear_width_inside_stirrups_mm(layout.stirrups().bar.diameter());
    let clear = layout
        .tension_layers()
        .first()
        .map_or(0.0, |layer| rules.clear_spacing(layer, available));
    let limit = crack_control_max_spacing(section.steel());

    let explanation = format!(
        "Clear spacing of tension bars {:.0} mm, maximum {:.0} mm for {} ({})",
        clear,
        limit,
        section.steel(),
        clause::CRACK_SPACING
    );
    CheckResult::from_criteria(
        CheckId::CrackControl,
        vec![Criterion::new(clear.max(0.0) / limit, FailureReason::BarSpacingTooWide)],
        explanation,
        CheckDetail::CrackControl(CrackControlDetail {
            clear_spacing_mm: clear,
            max_clear_spacing_mm: limit,
        }),
    )
}
