//! # Ductile Detailing
//!
//! Tighter limits applied only when ductile (seismic) detailing is
//! requested. The aggregator omits this result entirely for ordinary
//! designs rather than reporting a trivial pass.

use serde::{Deserialize, Serialize};

use super::{demand_ratio, rule_ratio, CheckDetail, CheckId, CheckResult, Criterion, FailureReason};
use crate::code_tables::clause;
use crate::config::DuctilityConfig;
use crate::reinforcement::ReinforcementLayout;
use crate::section::BeamSection;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuctilityDetail {
    pub min_tension_mm2: f64,
    pub max_tension_mm2: f64,
    pub tension_bars: u32,
    pub stirrup_diameter_mm: f64,
    pub max_stirrup_spacing_mm: f64,
}

/// Minimum tension steel k·√fck/fy·b·d (mm²)
pub fn min_tension_mm2(section: &BeamSection, config: &DuctilityConfig) -> f64 {
    config.min_tension_coefficient * section.fck().sqrt() / section.fy()
        * section.width_mm()
        * section.effective_depth_mm()
}

/// Maximum tension steel (mm²)
pub fn max_tension_mm2(section: &BeamSection, config: &DuctilityConfig) -> f64 {
    config.max_tension_percent / 100.0 * section.width_mm() * section.effective_depth_mm()
}

/// Stirrup spacing limit min(d/4, 8·db,min, 100 mm).
///
/// ```rust
/// use rcbeam_core::checks::ductility::max_stirrup_spacing_mm;
/// use rcbeam_core::config::DuctilityConfig;
///
/// let config = DuctilityConfig::default();
/// assert_eq!(max_stirrup_spacing_mm(450.0, 12.0, &config), 96.0);
/// assert_eq!(max_stirrup_spacing_mm(350.0, 20.0, &config), 87.5);
/// ```
pub fn max_stirrup_spacing_mm(effective_depth_mm: f64, smallest_bar_mm: f64, config: &DuctilityConfig) -> f64 {
    (config.spacing_depth_fraction * effective_depth_mm)
        .min(config.spacing_bar_multiple * smallest_bar_mm)
        .min(config.max_spacing_mm)
}

pub fn check(section: &BeamSection, layout: &ReinforcementLayout, config: &DuctilityConfig) -> CheckResult {
    let ast = layout.tension_area_mm2();
    let stirrups = layout.stirrups();
    let min_ast = min_tension_mm2(section, config);
    let max_ast = max_tension_mm2(section, config);
    let bars = layout.tension_bar_count();
    let s_max = max_stirrup_spacing_mm(
        section.effective_depth_mm(),
        layout.smallest_longitudinal_bar().diameter(),
        config,
    );

    let criteria = vec![
        Criterion::new(min_ast / ast, FailureReason::DuctileMinimumSteel),
        Criterion::new(ast / max_ast, FailureReason::DuctileMaximumSteel),
        Criterion::new(
            rule_ratio(
                bars >= config.min_tension_bars,
                demand_ratio(f64::from(config.min_tension_bars), f64::from(bars)),
            ),
            FailureReason::DuctileTooFewBars,
        ),
        Criterion::new(
            rule_ratio(
                stirrups.bar.diameter() >= config.min_stirrup_diameter_mm,
                config.min_stirrup_diameter_mm / stirrups.bar.diameter(),
            ),
            FailureReason::DuctileStirrupTooSmall,
        ),
        Criterion::new(stirrups.spacing_mm / s_max, FailureReason::DuctileStirrupSpacing),
    ];
    let explanation = format!(
        "Ast {:.0} mm² within [{:.0}, {:.0}] ({}); stirrups {} @ {:.0} mm, limit {:.0} mm ({})",
        ast,
        min_ast,
        max_ast,
        clause::DUCTILE_FLEXURE,
        stirrups.bar,
        stirrups.spacing_mm,
        s_max,
        clause::DUCTILE_SHEAR
    );
    CheckResult::from_criteria(
        CheckId::Ductility,
        criteria,
        explanation,
        CheckDetail::Ductility(DuctilityDetail {
            min_tension_mm2: min_ast,
            max_tension_mm2: max_ast,
            tension_bars: bars,
            stirrup_diameter_mm: stirrups.bar.diameter(),
            max_stirrup_spacing_mm: s_max,
        }),
    )
}
