//! # Flexure
//!
//! Limit-state flexural design with the rectangular-parabolic stress block
//! reduced to its resultant: force 0.36·fck·b·xu acting 0.42·xu below the
//! compression face.
//!
//! ## Neutral axis root
//!
//! For a singly-reinforced rectangle the neutral axis solves
//!
//! ```text
//! 0.1512·fck·b·xu² − 0.36·fck·b·d·xu + Mu = 0
//! ```
//!
//! The smaller root is always taken. The larger root lies beyond d/0.84,
//! outside any section, and would imply an over-reinforced failure. The
//! root is computed as `c/q` with `q = ½(b + √disc)`, which is exact at
//! Mu = 0 and avoids cancellation when Mu is small.
//!
//! ## Boundary
//!
//! Compression steel is introduced only when Mu is *strictly* greater than
//! Mu,lim. A moment exactly equal to the limit is designed singly
//! reinforced with xu = xu,max.
//!
//! ## Flanged sections
//!
//! The neutral axis lies within the flange when Df ≥ xu,max or when Mu does
//! not exceed the capacity of a bf-wide rectangle with xu = Df; the section is
//! then designed as that rectangle. Otherwise the web stress block is combined
//! with a flange force 0.45·fck·(bf − bw)·yf, where yf = Df for Df/d ≤ 0.2 and
//! yf = 0.15·xu + 0.65·Df (not more than Df) for deeper flanges.

use serde::{Deserialize, Serialize};

use super::{demand_ratio, CheckDetail, CheckId, CheckResult, Criterion, FailureReason};
use crate::code_tables::{clause, compression_steel_stress, xu_max_ratio, MIN_TENSION_COEFFICIENT};
use crate::config::EngineConfig;
use crate::loads::LoadDemand;
use crate::reinforcement::{BarSpacingRules, ReinforcementLayout};
use crate::section::BeamSection;
use crate::units::{KiloNewtonMetres, NewtonMillimetres};

/// Stress block force coefficient (×fck·b·xu)
const BLOCK_FORCE: f64 = 0.36;

/// Stress block centroid depth (×xu)
const BLOCK_ARM: f64 = 0.42;

/// Flange stress coefficient (×fck)
const FLANGE_STRESS: f64 = 0.45;

/// Design yield stress coefficient of tension steel (×fy)
const TENSION_STEEL_STRESS: f64 = 0.87;

/// Concrete stress displaced by compression steel (×fck)
const DISPLACED_CONCRETE_STRESS: f64 = 0.446;

/// Nominal allowance from stirrup face to compression bar centre when no
/// compression bars are known yet (mm)
pub const DEFAULT_COMPRESSION_BAR_OFFSET_MM: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReinforcementMode {
    Singly,
    Doubly,
}

/// Where the neutral axis falls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NeutralAxis {
    Rectangular,
    WithinFlange,
    BelowFlange,
}

/// Flexural design of a section for one moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlexuralDesign {
    pub moment_knm: f64,
    /// Singly-reinforced limiting moment Mu,lim
    pub limiting_moment_knm: f64,
    pub xu_max_mm: f64,
    /// Neutral axis depth used (xu,max when doubly reinforced)
    pub neutral_axis_depth_mm: f64,
    pub neutral_axis: NeutralAxis,
    pub mode: ReinforcementMode,
    pub required_tension_mm2: f64,
    /// Zero when singly reinforced
    pub required_compression_mm2: f64,
    /// Depth of the compression steel centroid d' from the compression face
    pub compression_steel_depth_mm: f64,
    /// fsc at d'/d; only meaningful when doubly reinforced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_steel_stress_mpa: Option<f64>,
    pub minimum_tension_mm2: f64,
}

/// Resultant of the concrete compression zone at a trial neutral axis depth.
#[derive(Debug, Clone, Copy)]
struct CompressionZone {
    force_n: f64,
    moment_nmm: f64,
}

/// Solve `a·x² − b·x + c = 0` for its smaller root.
fn smaller_root(a: f64, b: f64, c: f64) -> Option<f64> {
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let q = 0.5 * (b + disc.sqrt());
    if q <= 0.0 {
        return None;
    }
    Some((c / q).max(0.0))
}

/// Effective flange stress depth yf
fn flange_stress_depth(flange_thickness_mm: f64, d: f64, xu: f64) -> f64 {
    if flange_thickness_mm / d <= 0.2 {
        flange_thickness_mm
    } else {
        (0.15 * xu + 0.65 * flange_thickness_mm).min(flange_thickness_mm)
    }
}

fn rectangle_zone(fck: f64, width: f64, d: f64, xu: f64) -> CompressionZone {
    let force_n = BLOCK_FORCE * fck * width * xu;
    CompressionZone {
        force_n,
        moment_nmm: force_n * (d - BLOCK_ARM * xu),
    }
}

fn compression_zone(section: &BeamSection, xu: f64) -> CompressionZone {
    let fck = section.fck();
    let d = section.effective_depth_mm();
    match section.flange() {
        None => rectangle_zone(fck, section.width_mm(), d, xu),
        Some(flange) if xu <= flange.thickness_mm => rectangle_zone(fck, flange.width_mm, d, xu),
        Some(flange) => {
            let web = rectangle_zone(fck, section.width_mm(), d, xu);
            let yf = flange_stress_depth(flange.thickness_mm, d, xu);
            let flange_force = FLANGE_STRESS * fck * (flange.width_mm - section.width_mm()) * yf;
            CompressionZone {
                force_n: web.force_n + flange_force,
                moment_nmm: web.moment_nmm + flange_force * (d - yf / 2.0),
            }
        }
    }
}

fn xu_max_mm(section: &BeamSection) -> f64 {
    xu_max_ratio(section.steel()) * section.effective_depth_mm()
}

fn neutral_axis_class(section: &BeamSection, xu: f64) -> NeutralAxis {
    match section.flange() {
        None => NeutralAxis::Rectangular,
        Some(flange) if xu <= flange.thickness_mm => NeutralAxis::WithinFlange,
        Some(_) => NeutralAxis::BelowFlange,
    }
}

/// Singly-reinforced limiting moment Mu,lim (kN·m).
///
/// ```rust
/// use rcbeam_core::checks::flexure::limiting_moment_knm;
/// use rcbeam_core::materials::{ConcreteGrade, SteelGrade};
/// use rcbeam_core::section::BeamSection;
///
/// let section = BeamSection::rectangular(300.0, 500.0, 450.0, 25.0,
///     ConcreteGrade::M20, SteelGrade::Fe415).unwrap();
/// assert!((limiting_moment_knm(&section) - 167.6).abs() < 0.1);
/// ```
pub fn limiting_moment_knm(section: &BeamSection) -> f64 {
    let zone = compression_zone(section, xu_max_mm(section));
    KiloNewtonMetres::from(NewtonMillimetres(zone.moment_nmm)).0
}

/// Minimum tension steel 0.85·bw·d/fy (mm²)
pub fn minimum_tension_mm2(section: &BeamSection) -> f64 {
    MIN_TENSION_COEFFICIENT * section.width_mm() * section.effective_depth_mm() / section.fy()
}

/// Compression steel depth d' assumed before any compression bars are chosen
pub fn default_compression_depth_mm(section: &BeamSection, stirrup_diameter_mm: f64) -> f64 {
    section.clear_cover_mm() + stirrup_diameter_mm + DEFAULT_COMPRESSION_BAR_OFFSET_MM
}

/// Compression steel depth d' implied by a layout
pub fn compression_depth_mm(section: &BeamSection, layout: &ReinforcementLayout, rules: &BarSpacingRules) -> f64 {
    let stirrup = layout.stirrups().bar.diameter();
    let layers = layout.compression_layers();
    if layers.is_empty() {
        default_compression_depth_mm(section, stirrup)
    } else {
        rules.centroid_depth(&layers, section.clear_cover_mm(), stirrup)
    }
}

/// Neutral axis depth for a moment not exceeding Mu,lim
fn singly_neutral_axis(section: &BeamSection, moment_nmm: f64, xu_max: f64) -> f64 {
    let fck = section.fck();
    let d = section.effective_depth_mm();
    let bw = section.width_mm();
    let rectangle = |width: f64, m: f64| {
        smaller_root(BLOCK_FORCE * BLOCK_ARM * fck * width, BLOCK_FORCE * fck * width * d, m)
    };

    let xu = match section.flange() {
        None => rectangle(bw, moment_nmm),
        Some(flange) => {
            let df = flange.thickness_mm;
            let within = df >= xu_max || moment_nmm <= rectangle_zone(fck, flange.width_mm, d, df).moment_nmm;
            if within {
                rectangle(flange.width_mm, moment_nmm)
            } else {
                let k = FLANGE_STRESS * fck * (flange.width_mm - bw);
                let constant_yf = |m: f64| rectangle(bw, m - k * df * (d - df / 2.0));
                if df / d <= 0.2 {
                    constant_yf(moment_nmm)
                } else {
                    // yf = α·xu + β folded into the web quadratic
                    let (alpha, beta) = (0.15, 0.65 * df);
                    let a = BLOCK_FORCE * BLOCK_ARM * fck * bw + k * alpha * alpha / 2.0;
                    let b = BLOCK_FORCE * fck * bw * d + k * (alpha * d - alpha * beta);
                    let c = moment_nmm - k * (beta * d - beta * beta / 2.0);
                    match smaller_root(a, b, c) {
                        Some(x) if alpha * x + beta <= df => Some(x),
                        _ => constant_yf(moment_nmm),
                    }
                }
            }
        }
    };
    xu.map_or(xu_max, |x| x.min(xu_max))
}

/// Design a section for a factored moment.
///
/// `compression_depth_mm` is d', used only if compression steel is needed.
///
/// # Example
///
/// ```rust
/// use rcbeam_core::checks::flexure::{design, ReinforcementMode};
/// use rcbeam_core::materials::{ConcreteGrade, SteelGrade};
/// use rcbeam_core::section::BeamSection;
///
/// let section = BeamSection::rectangular(300.0, 500.0, 450.0, 25.0,
///     ConcreteGrade::M20, SteelGrade::Fe415).unwrap();
///
/// let singly = design(&section, 100.0, 43.0);
/// assert_eq!(singly.mode, ReinforcementMode::Singly);
///
/// let doubly = design(&section, 220.0, 43.0);
/// assert_eq!(doubly.mode, ReinforcementMode::Doubly);
/// assert!(doubly.required_compression_mm2 > 0.0);
/// ```
pub fn design(section: &BeamSection, moment_knm: f64, compression_depth_mm: f64) -> FlexuralDesign {
    let fck = section.fck();
    let fy = section.fy();
    let d = section.effective_depth_mm();
    let xu_max = xu_max_mm(section);
    let limit_zone = compression_zone(section, xu_max);
    let limiting_moment_knm = KiloNewtonMetres::from(NewtonMillimetres(limit_zone.moment_nmm)).0;
    let moment_nmm = NewtonMillimetres::from(KiloNewtonMetres(moment_knm)).0;
    let steel_stress = TENSION_STEEL_STRESS * fy;

    let (mode, xu, tension, compression, fsc) = if moment_knm > limiting_moment_knm {
        let fsc = compression_steel_stress(section.steel(), compression_depth_mm / d);
        let net_stress = fsc - DISPLACED_CONCRETE_STRESS * fck;
        // Floor keeps the requirement finite for degenerate depths
        let lever = (d - compression_depth_mm).max(1.0);
        let asc = (moment_nmm - limit_zone.moment_nmm) / (net_stress * lever);
        let ast = limit_zone.force_n / steel_stress + asc * net_stress / steel_stress;
        (ReinforcementMode::Doubly, xu_max, ast, asc, Some(fsc))
    } else {
        let xu = singly_neutral_axis(section, moment_nmm, xu_max);
        let ast = compression_zone(section, xu).force_n / steel_stress;
        (ReinforcementMode::Singly, xu, ast, 0.0, None)
    };

    FlexuralDesign {
        moment_knm,
        limiting_moment_knm,
        xu_max_mm: xu_max,
        neutral_axis_depth_mm: xu,
        neutral_axis: neutral_axis_class(section, xu),
        mode,
        required_tension_mm2: tension,
        required_compression_mm2: compression,
        compression_steel_depth_mm: compression_depth_mm,
        compression_steel_stress_mpa: fsc,
        minimum_tension_mm2: minimum_tension_mm2(section),
    }
}

/// Check provided longitudinal steel against the flexural requirement.
pub fn check(
    section: &BeamSection,
    demand: &LoadDemand,
    layout: &ReinforcementLayout,
    config: &EngineConfig,
) -> CheckResult {
    let d_prime = compression_depth_mm(section, layout, &config.spacing_rules());
    assess(design(section, demand.moment_knm(), d_prime), layout, config)
}

/// Compare an existing flexural design with the steel a layout provides.
pub fn assess(flexure: FlexuralDesign, layout: &ReinforcementLayout, config: &EngineConfig) -> CheckResult {
    let ast = layout.tension_area_mm2();
    let asc = layout.compression_area_mm2();

    let doubly = flexure.mode == ReinforcementMode::Doubly;
    let criteria = if doubly && (!config.flexure.allow_doubly_reinforced || asc <= 0.0) {
        vec![Criterion::new(
            flexure.moment_knm / flexure.limiting_moment_knm,
            FailureReason::MomentExceedsSinglyLimit,
        )]
    } else {
        let mut criteria = vec![
            Criterion::new(
                demand_ratio(flexure.required_tension_mm2, ast),
                FailureReason::InsufficientTensionSteel,
            ),
            Criterion::new(
                demand_ratio(flexure.minimum_tension_mm2, ast),
                FailureReason::BelowMinimumSteel,
            ),
        ];
        if doubly {
            criteria.push(Criterion::new(
                demand_ratio(flexure.required_compression_mm2, asc),
                FailureReason::InsufficientCompressionSteel,
            ));
        }
        criteria
    };

    let mut explanation = match flexure.mode {
        ReinforcementMode::Singly => format!(
            "Mu = {:.1} kN·m ≤ Mu,lim = {:.1} kN·m ({}); Ast required {:.0} mm² (min {:.0}, {}), provided {:.0} mm²",
            flexure.moment_knm,
            flexure.limiting_moment_knm,
            clause::XU_MAX,
            flexure.required_tension_mm2,
            flexure.minimum_tension_mm2,
            clause::MIN_TENSION,
            ast
        ),
        ReinforcementMode::Doubly => format!(
            "Mu = {:.1} kN·m > Mu,lim = {:.1} kN·m, doubly reinforced ({}); Ast required {:.0} mm², provided {:.0} mm²; Asc required {:.0} mm², provided {:.0} mm²",
            flexure.moment_knm,
            flexure.limiting_moment_knm,
            clause::COMPRESSION_STEEL,
            flexure.required_tension_mm2,
            ast,
            flexure.required_compression_mm2,
            asc
        ),
    };
    if flexure.neutral_axis != NeutralAxis::Rectangular {
        explanation.push_str(&format!("; flanged section ({})", clause::FLANGED));
    }

    CheckResult::from_criteria(CheckId::Flexure, criteria, explanation, CheckDetail::Flexure(flexure))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{BarSize, ConcreteGrade, SteelGrade};
    use crate::reinforcement::{BarGroup, Stirrups};
    use crate::section::Flange;
    use approx::assert_relative_eq;

    fn section() -> BeamSection {
        BeamSection::rectangular(300.0, 500.0, 450.0, 25.0, ConcreteGrade::M20, SteelGrade::Fe415).unwrap()
    }

    fn stirrups() -> Stirrups {
        Stirrups {
            bar: BarSize::D8,
            legs: 2,
            spacing_mm: 150.0,
        }
    }

    #[test]
    fn test_limiting_moment() {
        // 0.36·20·300·216·(450 − 0.42·216)
        assert_relative_eq!(limiting_moment_knm(&section()), 167.625_676_8, max_relative = 1e-9);
    }

    #[test]
    fn test_singly_reinforced_area() {
        let f = design(&section(), 100.0, 43.0);
        assert_eq!(f.mode, ReinforcementMode::Singly);
        assert_eq!(f.neutral_axis, NeutralAxis::Rectangular);
        assert_relative_eq!(f.neutral_axis_depth_mm, 115.285_315, max_relative = 1e-6);
        assert_relative_eq!(f.required_tension_mm2, 689.700_267, max_relative = 1e-6);
        assert_eq!(f.required_compression_mm2, 0.0);
        assert!(f.compression_steel_stress_mpa.is_none());
    }

    #[test]
    fn test_zero_moment_needs_only_minimum() {
        let f = design(&section(), 0.0, 43.0);
        assert_eq!(f.required_tension_mm2, 0.0);
        assert_relative_eq!(f.minimum_tension_mm2, 0.85 * 300.0 * 450.0 / 415.0);
    }

    #[test]
    fn test_boundary_moment_stays_singly() {
        let s = section();
        let limit = limiting_moment_knm(&s);
        let f = design(&s, limit, 43.0);
        assert_eq!(f.mode, ReinforcementMode::Singly);
        assert_relative_eq!(f.neutral_axis_depth_mm, 216.0, max_relative = 1e-9);

        let above = design(&s, limit + 1e-6, 43.0);
        assert_eq!(above.mode, ReinforcementMode::Doubly);
    }

    #[test]
    fn test_doubly_reinforced_areas() {
        let f = design(&section(), 220.0, 43.0);
        assert_eq!(f.mode, ReinforcementMode::Doubly);
        assert_relative_eq!(f.neutral_axis_depth_mm, 216.0);
        let fsc = f.compression_steel_stress_mpa.unwrap();
        assert_relative_eq!(fsc, 353.177_778, max_relative = 1e-6);
        assert_relative_eq!(f.required_compression_mm2, 373.800_823, max_relative = 1e-6);
        assert_relative_eq!(f.required_tension_mm2, 1648.646_561, max_relative = 1e-6);
    }

    #[test]
    fn test_area_increases_with_moment() {
        let s = section();
        let mut previous = 0.0;
        for m in [20.0, 60.0, 120.0, 160.0, 180.0, 240.0] {
            let ast = design(&s, m, 43.0).required_tension_mm2;
            assert!(ast > previous);
            previous = ast;
        }
    }

    #[test]
    fn test_flanged_neutral_axis_within_flange() {
        let t = section()
            .with_flange(Flange { width_mm: 1200.0, thickness_mm: 120.0 })
            .unwrap();
        let f = design(&t, 150.0, 43.0);
        assert_eq!(f.neutral_axis, NeutralAxis::WithinFlange);
        assert!(f.neutral_axis_depth_mm <= 120.0);
        // Equivalent to a 1200 wide rectangle
        let rect = BeamSection::rectangular(1200.0, 500.0, 450.0, 25.0, ConcreteGrade::M20, SteelGrade::Fe415)
            .unwrap();
        assert_relative_eq!(
            f.required_tension_mm2,
            design(&rect, 150.0, 43.0).required_tension_mm2,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_flanged_neutral_axis_below_flange() {
        // Thin flange: Df/d = 0.156, yf = Df
        let t = section()
            .with_flange(Flange { width_mm: 600.0, thickness_mm: 70.0 })
            .unwrap();
        let limit = limiting_moment_knm(&t);
        assert!(limit > limiting_moment_knm(&section()));
        let f = design(&t, 200.0, 43.0);
        assert_eq!(f.mode, ReinforcementMode::Singly);
        assert_eq!(f.neutral_axis, NeutralAxis::BelowFlange);
        assert!(f.neutral_axis_depth_mm > 70.0);
        // Equilibrium: compression zone moment equals demand
        let zone = compression_zone(&t, f.neutral_axis_depth_mm);
        assert_relative_eq!(zone.moment_nmm, 200.0e6, max_relative = 1e-9);
    }

    #[test]
    fn test_deep_flange_uses_equivalent_depth() {
        // Df/d = 0.222 > 0.2
        let t = section()
            .with_flange(Flange { width_mm: 500.0, thickness_mm: 100.0 })
            .unwrap();
        let f = design(&t, 190.0, 43.0);
        assert_eq!(f.neutral_axis, NeutralAxis::BelowFlange);
        let zone = compression_zone(&t, f.neutral_axis_depth_mm);
        assert_relative_eq!(zone.moment_nmm, 190.0e6, max_relative = 1e-9);
    }

    #[test]
    fn test_check_requires_compression_steel() {
        let demand = LoadDemand::new(220.0, 50.0).unwrap();
        let config = EngineConfig::default();
        let tension_only = ReinforcementLayout::new(
            vec![BarGroup::new(BarSize::D25, 4, 0)],
            vec![],
            stirrups(),
        )
        .unwrap();
        let r = check(&section(), &demand, &tension_only, &config);
        assert!(!r.passed);
        assert_eq!(r.reason, Some(FailureReason::MomentExceedsSinglyLimit));
        assert_relative_eq!(r.ratio, 220.0 / 167.625_676_8, max_relative = 1e-6);
    }

    #[test]
    fn test_check_doubly_disallowed() {
        let demand = LoadDemand::new(220.0, 50.0).unwrap();
        let mut config = EngineConfig::default();
        config.flexure.allow_doubly_reinforced = false;
        let layout = ReinforcementLayout::new(
            vec![BarGroup::new(BarSize::D25, 4, 0)],
            vec![BarGroup::new(BarSize::D20, 2, 0)],
            stirrups(),
        )
        .unwrap();
        let r = check(&section(), &demand, &layout, &config);
        assert_eq!(r.reason, Some(FailureReason::MomentExceedsSinglyLimit));
    }

    #[test]
    fn test_check_passes_with_enough_steel() {
        let demand = LoadDemand::new(100.0, 50.0).unwrap();
        let layout = ReinforcementLayout::new(
            vec![BarGroup::new(BarSize::D16, 4, 0)],
            vec![],
            stirrups(),
        )
        .unwrap();
        let r = check(&section(), &demand, &layout, &EngineConfig::default());
        assert!(r.passed, "{}", r.explanation);
        assert!(r.ratio > 0.8 && r.ratio < 0.9);
    }

    #[test]
    fn test_check_minimum_steel_governs_light_moment() {
        let demand = LoadDemand::new(10.0, 10.0).unwrap();
        let layout = ReinforcementLayout::new(
            vec![BarGroup::new(BarSize::D10, 2, 0)],
            vec![],
            stirrups(),
        )
        .unwrap();
        let r = check(&section(), &demand, &layout, &EngineConfig::default());
        assert!(!r.passed);
        assert_eq!(r.reason, Some(FailureReason::BelowMinimumSteel));
        assert!(r.explanation.contains(clause::MIN_TENSION), "{}", r.explanation);
    }

    #[test]
    fn test_flanged_explanation_cites_flange_clause() {
        let demand = LoadDemand::new(150.0, 50.0).unwrap();
        let layout = ReinforcementLayout::new(
            vec![BarGroup::new(BarSize::D20, 3, 0)],
            vec![],
            stirrups(),
        )
        .unwrap();
        let t = section()
            .with_flange(Flange { width_mm: 1200.0, thickness_mm: 120.0 })
            .unwrap();
        let flanged = check(&t, &demand, &layout, &EngineConfig::default());
        assert!(flanged.explanation.contains(clause::FLANGED), "{}", flanged.explanation);

        let rect = check(&section(), &demand, &layout, &EngineConfig::default());
        assert!(!rect.explanation.contains(clause::FLANGED));
    }
}
