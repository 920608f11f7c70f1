//! # Shear
//!
//! Runs after bar selection: τc depends on the tension steel actually
//! provided. Three outcomes are distinguished:
//!
//! - `Nominal`: concrete alone carries the shear, stirrups are governed by
//!   the minimum shear reinforcement and spacing ceilings
//! - `Designed`: stirrups carry Vus = Vu − τc·b·d at a computed spacing
//! - `ExceedsMaximum`: τv > τc,max; the section is too small and no stirrup
//!   arrangement can help
//!
//! Required spacing is the smallest of the strength spacing
//! 0.87·fyv·Asv·d/Vus, the minimum-reinforcement spacing 0.87·fyv·Asv/(0.4·b),
//! 0.75·d and 300 mm. The design spacing is the required spacing rounded down
//! to the configured step, never below the practical minimum.

use serde::{Deserialize, Serialize};

use super::{CheckDetail, CheckId, CheckResult, Criterion, FailureReason};
use crate::code_tables::{
    axial_enhancement, clause, design_shear_strength, max_shear_stress, MIN_SHEAR_STRESS_MPA,
    STIRRUP_SPACING_CEILING_MM, STIRRUP_SPACING_DEPTH_FRACTION,
};
use crate::config::ShearConfig;
use crate::loads::LoadDemand;
use crate::materials::BarSize;
use crate::reinforcement::ReinforcementLayout;
use crate::section::BeamSection;
use crate::units::{KiloNewtons, Newtons};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShearMode {
    Nominal,
    Designed,
    ExceedsMaximum,
}

/// Shear design of a section for one shear demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShearDesign {
    pub shear_kn: f64,
    /// τv = Vu/(b·d)
    pub nominal_stress_mpa: f64,
    /// τc from the table, including any axial enhancement
    pub concrete_strength_mpa: f64,
    /// Axial enhancement δ applied to τc
    pub axial_factor: f64,
    pub max_stress_mpa: f64,
    /// Tension steel percentage used for τc
    pub tension_percent: f64,
    pub stirrup_fy_mpa: f64,
    pub stirrup_area_mm2: f64,
    /// Shear carried by stirrups, Vus (0 when nominal)
    pub stirrup_shear_kn: f64,
    /// Unrounded governing spacing; absent when τv > τc,max
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_spacing_mm: Option<f64>,
    /// Rounded, buildable spacing; absent when τv > τc,max
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design_spacing_mm: Option<f64>,
    pub mode: ShearMode,
}

/// Round a spacing down to the configured step, keeping it buildable.
fn round_spacing(required_mm: f64, config: &ShearConfig) -> f64 {
    let rounded = (required_mm / config.spacing_step_mm).floor() * config.spacing_step_mm;
    if required_mm >= config.min_spacing_mm {
        rounded.max(config.min_spacing_mm)
    } else {
        rounded
    }
}

/// Design stirrups for a demand given the tension steel provided.
///
/// ```rust
/// use rcbeam_core::checks::shear::{design, ShearMode};
/// use rcbeam_core::config::ShearConfig;
/// use rcbeam_core::loads::LoadDemand;
/// use rcbeam_core::materials::{BarSize, ConcreteGrade, SteelGrade};
/// use rcbeam_core::section::BeamSection;
///
/// let section = BeamSection::rectangular(300.0, 500.0, 450.0, 25.0,
///     ConcreteGrade::M20, SteelGrade::Fe415).unwrap();
/// let demand = LoadDemand::new(150.0, 180.0).unwrap();
/// let shear = design(&section, &demand, 1963.5, BarSize::D8, 2, &ShearConfig::default());
/// assert_eq!(shear.mode, ShearMode::Designed);
/// assert!(shear.design_spacing_mm.unwrap() <= shear.required_spacing_mm.unwrap());
/// ```
pub fn design(
    section: &BeamSection,
    demand: &LoadDemand,
    provided_tension_mm2: f64,
    stirrup: BarSize,
    legs: u32,
    config: &ShearConfig,
) -> ShearDesign {
    let b = section.width_mm();
    let d = section.effective_depth_mm();
    let vu = demand.shear_n();
    let tau_v = vu / (b * d);
    let pt = section.steel_percent(provided_tension_mm2);
    let delta = axial_enhancement(demand.axial_n(), section.gross_area_mm2(), section.fck());
    let tau_c = design_shear_strength(section.concrete(), pt) * delta;
    let tau_max = max_shear_stress(section.concrete());
    let fyv = section.steel().stirrup_fy_mpa();
    let asv = f64::from(legs) * stirrup.area_mm2();

    let mut result = ShearDesign {
        shear_kn: demand.shear_kn(),
        nominal_stress_mpa: tau_v,
        concrete_strength_mpa: tau_c,
        axial_factor: delta,
        max_stress_mpa: tau_max,
        tension_percent: pt,
        stirrup_fy_mpa: fyv,
        stirrup_area_mm2: asv,
        stirrup_shear_kn: 0.0,
        required_spacing_mm: None,
        design_spacing_mm: None,
        mode: ShearMode::ExceedsMaximum,
    };
    if tau_v > tau_max {
        return result;
    }

    let vus = vu - tau_c * b * d;
    let mut required = (0.87 * fyv * asv / (MIN_SHEAR_STRESS_MPA * b))
        .min(STIRRUP_SPACING_DEPTH_FRACTION * d)
        .min(STIRRUP_SPACING_CEILING_MM);
    if vus > 0.0 {
        required = required.min(0.87 * fyv * asv * d / vus);
        result.mode = ShearMode::Designed;
        result.stirrup_shear_kn = KiloNewtons::from(Newtons(vus)).0;
    } else {
        result.mode = ShearMode::Nominal;
    }
    result.required_spacing_mm = Some(required);
    result.design_spacing_mm = Some(round_spacing(required, config));
    result
}

/// Check provided stirrups against the shear demand.
pub fn check(
    section: &BeamSection,
    demand: &LoadDemand,
    layout: &ReinforcementLayout,
    config: &ShearConfig,
) -> CheckResult {
    let stirrups = layout.stirrups();
    let shear = design(
        section,
        demand,
        layout.tension_area_mm2(),
        stirrups.bar,
        stirrups.legs,
        config,
    );

    let (criteria, explanation) = match shear.required_spacing_mm {
        None => (
            vec![Criterion::new(
                shear.nominal_stress_mpa / shear.max_stress_mpa,
                FailureReason::ShearStressExceedsMaximum,
            )],
            format!(
                "τv = {:.2} MPa exceeds τc,max = {:.2} MPa ({}); enlarge the section",
                shear.nominal_stress_mpa,
                shear.max_stress_mpa,
                clause::TAU_C_MAX
            ),
        ),
        Some(required) => {
            let spacing_clause = match shear.mode {
                ShearMode::Nominal => clause::MIN_SHEAR_REINFORCEMENT,
                _ => clause::SHEAR_REINFORCEMENT,
            };
            (
                vec![
                    Criterion::new(
                        config.min_spacing_mm / required,
                        FailureReason::StirrupSpacingBelowPracticalMinimum,
                    ),
                    Criterion::new(stirrups.spacing_mm / required, FailureReason::StirrupSpacingTooWide),
                ],
                format!(
                    "τv = {:.2} MPa, τc = {:.2} MPa at pt = {:.2}% ({}); stirrups {}-leg {} @ {:.0} mm, required ≤ {:.0} mm ({}, {})",
                    shear.nominal_stress_mpa,
                    shear.concrete_strength_mpa,
                    shear.tension_percent,
                    clause::TAU_C,
                    stirrups.legs,
                    stirrups.bar,
                    stirrups.spacing_mm,
                    required,
                    spacing_clause,
                    clause::MAX_STIRRUP_SPACING
                ),
            )
        }
    };

    CheckResult::from_criteria(CheckId::Shear, criteria, explanation, CheckDetail::Shear(shear))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{ConcreteGrade, SteelGrade};
    use crate::reinforcement::{BarGroup, Stirrups};
    use approx::assert_relative_eq;

    fn section() -> BeamSection {
        BeamSection::rectangular(300.0, 500.0, 450.0, 25.0, ConcreteGrade::M20, SteelGrade::Fe415).unwrap()
    }

    fn layout(spacing_mm: f64) -> ReinforcementLayout {
        ReinforcementLayout::new(
            vec![BarGroup::new(BarSize::D25, 4, 0)],
            vec![],
            Stirrups {
                bar: BarSize::D8,
                legs: 2,
                spacing_mm,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_nominal_shear_uses_ceilings() {
        let demand = LoadDemand::new(100.0, 40.0).unwrap();
        let s = design(&section(), &demand, 1963.5, BarSize::D8, 2, &ShearConfig::default());
        assert_eq!(s.mode, ShearMode::Nominal);
        // min(0.87·415·100.53/120, 337.5, 300)
        assert_relative_eq!(s.required_spacing_mm.unwrap(), 300.0);
        assert_eq!(s.design_spacing_mm, Some(300.0));
    }

    #[test]
    fn test_explanation_cites_spacing_clauses() {
        let nominal = check(&section(), &LoadDemand::new(100.0, 40.0).unwrap(), &layout(300.0), &ShearConfig::default());
        assert!(nominal.explanation.contains(clause::MIN_SHEAR_REINFORCEMENT));
        assert!(nominal.explanation.contains(clause::MAX_STIRRUP_SPACING));

        let designed = check(&section(), &LoadDemand::new(150.0, 180.0).unwrap(), &layout(190.0), &ShearConfig::default());
        assert!(designed.explanation.contains(clause::SHEAR_REINFORCEMENT));
        assert!(!designed.explanation.contains(clause::MIN_SHEAR_REINFORCEMENT));
    }

    #[test]
    fn test_designed_spacing() {
        let demand = LoadDemand::new(150.0, 180.0).unwrap();
        let provided = 4.0 * BarSize::D25.area_mm2();
        let s = design(&section(), &demand, provided, BarSize::D8, 2, &ShearConfig::default());
        assert_eq!(s.mode, ShearMode::Designed);
        assert_relative_eq!(s.nominal_stress_mpa, 180_000.0 / 135_000.0);
        assert_relative_eq!(s.concrete_strength_mpa, 0.710_888, max_relative = 1e-5);
        assert_relative_eq!(s.required_spacing_mm.unwrap(), 194.377, max_relative = 1e-5);
        assert_eq!(s.design_spacing_mm, Some(190.0));
    }

    #[test]
    fn test_axial_compression_enhances_tau_c() {
        let plain = LoadDemand::new(150.0, 180.0).unwrap();
        let axial = plain.with_axial(300.0).unwrap();
        let provided = 1963.5;
        let a = design(&section(), &plain, provided, BarSize::D8, 2, &ShearConfig::default());
        let b = design(&section(), &axial, provided, BarSize::D8, 2, &ShearConfig::default());
        assert_relative_eq!(b.axial_factor, 1.3);
        assert!(b.concrete_strength_mpa > a.concrete_strength_mpa);
        assert!(b.required_spacing_mm.unwrap() > a.required_spacing_mm.unwrap());
    }

    #[test]
    fn test_exceeds_maximum_is_distinct() {
        // τv = 450 kN / (300·450) = 3.33 MPa > 2.8
        let demand = LoadDemand::new(100.0, 450.0).unwrap();
        let r = check(&section(), &demand, &layout(75.0), &ShearConfig::default());
        assert!(!r.passed);
        assert_eq!(r.reason, Some(FailureReason::ShearStressExceedsMaximum));
        assert_relative_eq!(r.ratio, (450_000.0 / 135_000.0) / 2.8);
        match r.detail {
            CheckDetail::Shear(s) => {
                assert_eq!(s.mode, ShearMode::ExceedsMaximum);
                assert!(s.design_spacing_mm.is_none());
            }
            other => panic!("unexpected detail {:?}", other),
        }
    }

    #[test]
    fn test_spacing_below_practical_minimum() {
        // τv = 2.59 MPa, below τc,max but needs ~64 mm spacing with 2-leg 8 mm
        let demand = LoadDemand::new(100.0, 350.0).unwrap();
        let r = check(&section(), &demand, &layout(75.0), &ShearConfig::default());
        assert!(!r.passed);
        assert_eq!(r.reason, Some(FailureReason::StirrupSpacingBelowPracticalMinimum));
    }

    #[test]
    fn test_spacing_too_wide() {
        let demand = LoadDemand::new(150.0, 180.0).unwrap();
        let r = check(&section(), &demand, &layout(250.0), &ShearConfig::default());
        assert!(!r.passed);
        assert_eq!(r.reason, Some(FailureReason::StirrupSpacingTooWide));
        let ok = check(&section(), &demand, &layout(190.0), &ShearConfig::default());
        assert!(ok.passed, "{}", ok.explanation);
    }

    #[test]
    fn test_rounding_respects_practical_minimum() {
        let config = ShearConfig {
            min_spacing_mm: 75.0,
            spacing_step_mm: 10.0,
        };
        assert_eq!(round_spacing(78.0, &config), 75.0);
        assert_eq!(round_spacing(96.0, &config), 90.0);
        assert_eq!(round_spacing(72.0, &config), 70.0);
    }
}
