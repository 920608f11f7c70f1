//! # Cost and Weight Model
//!
//! Prices a fully detailed candidate from caller-supplied unit rates. The
//! engine carries no default rates.
//!
//! - Concrete: gross area × span, priced per m³ for the concrete grade
//! - Formwork: (top width + 2 × overall depth) × span, priced per m²
//! - Steel: longitudinal bars over the full span plus stirrups, priced per kg
//!   for the steel grade
//! - Congestion: when total longitudinal steel exceeds a percentage of the
//!   gross web area, steel cost is multiplied to reflect harder fixing
//!
//! Stirrup count is ⌊span/s⌋ + 1. Each stirrup is a closed loop on the
//! centreline inside the cover, plus one extra vertical for each leg beyond
//! two, plus two hooks of 10·ds.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "concrete_rates": { "M20": 6000.0, "M25": 6500.0 },
//!   "steel_rates": { "Fe415": 80.0, "Fe500": 85.0 },
//!   "formwork_rate": 500.0,
//!   "congestion": { "threshold_percent": 2.0, "multiplier": 1.15 },
//!   "carbon": { "concrete_per_m3": 300.0, "steel_per_kg": 1.9 }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_non_negative, CalcError, CalcResult};
use crate::materials::{ConcreteGrade, SteelGrade};
use crate::reinforcement::ReinforcementLayout;
use crate::section::BeamSection;
use crate::units::{CONCRETE_DENSITY_KG_M3, MM2_PER_M2, MM3_PER_M3, STEEL_DENSITY_KG_M3};

/// Hook length per stirrup end (× stirrup diameter)
pub const STIRRUP_HOOK_DIAMETERS: f64 = 10.0;

/// Steel cost multiplier above a reinforcement percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CongestionRule {
    /// Total longitudinal steel as % of bw·D
    pub threshold_percent: f64,
    pub multiplier: f64,
}

/// Embodied-carbon factors (kgCO2e)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarbonFactors {
    pub concrete_per_m3: f64,
    pub steel_per_kg: f64,
}

/// Unit rates supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostProfile {
    /// Cost per m³ of concrete, by grade
    pub concrete_rates: BTreeMap<ConcreteGrade, f64>,
    /// Cost per kg of steel, by grade
    pub steel_rates: BTreeMap<SteelGrade, f64>,
    /// Cost per m² of formwork contact area
    pub formwork_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub congestion: Option<CongestionRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbon: Option<CarbonFactors>,
}

impl CostProfile {
    fn concrete_rate(&self, grade: ConcreteGrade) -> CalcResult<f64> {
        self.concrete_rates
            .get(&grade)
            .copied()
            .ok_or_else(|| CalcError::material_not_found(format!("concrete rate for {}", grade)))
    }

    fn steel_rate(&self, grade: SteelGrade) -> CalcResult<f64> {
        self.steel_rates
            .get(&grade)
            .copied()
            .ok_or_else(|| CalcError::material_not_found(format!("steel rate for {}", grade)))
    }

    /// Check that every rate is usable and that the given grades are priced.
    pub fn validate_for(&self, concretes: &[ConcreteGrade], steels: &[SteelGrade]) -> CalcResult<()> {
        for (grade, rate) in &self.concrete_rates {
            ensure_non_negative(&format!("concrete_rates.{}", grade), *rate)?;
        }
        for (grade, rate) in &self.steel_rates {
            ensure_non_negative(&format!("steel_rates.{}", grade), *rate)?;
        }
        ensure_non_negative("formwork_rate", self.formwork_rate)?;
        if let Some(congestion) = &self.congestion {
            ensure_non_negative("congestion.threshold_percent", congestion.threshold_percent)?;
            ensure_non_negative("congestion.multiplier", congestion.multiplier)?;
        }
        if let Some(carbon) = &self.carbon {
            ensure_non_negative("carbon.concrete_per_m3", carbon.concrete_per_m3)?;
            ensure_non_negative("carbon.steel_per_kg", carbon.steel_per_kg)?;
        }
        for grade in concretes {
            self.concrete_rate(*grade)?;
        }
        for grade in steels {
            self.steel_rate(*grade)?;
        }
        Ok(())
    }
}

/// Priced quantities of one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub concrete_volume_m3: f64,
    pub formwork_area_m2: f64,
    pub longitudinal_steel_kg: f64,
    pub stirrup_count: u32,
    pub stirrup_length_mm: f64,
    pub stirrup_steel_kg: f64,
    pub steel_kg: f64,
    pub concrete_cost: f64,
    pub steel_cost: f64,
    pub formwork_cost: f64,
    pub congestion_applied: bool,
    pub total_cost: f64,
    /// Concrete plus steel mass (kg)
    pub weight_kg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbon_kg: Option<f64>,
}

/// Length of one stirrup including extra legs and hooks (mm)
pub fn stirrup_length_mm(section: &BeamSection, layout: &ReinforcementLayout) -> f64 {
    let stirrups = layout.stirrups();
    let ds = stirrups.bar.diameter();
    let cover = section.clear_cover_mm();
    let w = section.width_mm() - 2.0 * cover - ds;
    let h = section.overall_depth_mm() - 2.0 * cover - ds;
    let extra_legs = f64::from(stirrups.legs.saturating_sub(2));
    2.0 * (w + h) + extra_legs * h + 2.0 * STIRRUP_HOOK_DIAMETERS * ds
}

/// Price a detailed candidate over `span_mm`.
///
/// ```rust
/// use std::collections::BTreeMap;
/// use rcbeam_core::cost::{price, CostProfile};
/// use rcbeam_core::materials::{BarSize, ConcreteGrade, SteelGrade};
/// use rcbeam_core::reinforcement::{BarGroup, ReinforcementLayout, Stirrups};
/// use rcbeam_core::section::BeamSection;
///
/// let section = BeamSection::rectangular(300.0, 500.0, 457.0, 25.0,
///     ConcreteGrade::M20, SteelGrade::Fe415).unwrap();
/// let layout = ReinforcementLayout::new(
///     vec![BarGroup::new(BarSize::D20, 3, 0)],
///     vec![],
///     Stirrups { bar: BarSize::D8, legs: 2, spacing_mm: 150.0 },
/// ).unwrap();
/// let profile = CostProfile {
///     concrete_rates: BTreeMap::from([(ConcreteGrade::M20, 6000.0)]),
///     steel_rates: BTreeMap::from([(SteelGrade::Fe415, 80.0)]),
///     formwork_rate: 500.0,
///     congestion: None,
///     carbon: None,
/// };
/// let cost = price(&section, &layout, 5000.0, &profile).unwrap();
/// assert_eq!(cost.stirrup_count, 34);
/// assert!((cost.concrete_volume_m3 - 0.75).abs() < 1e-12);
/// ```
pub fn price(
    section: &BeamSection,
    layout: &ReinforcementLayout,
    span_mm: f64,
    profile: &CostProfile,
) -> CalcResult<CostBreakdown> {
    let concrete_rate = profile.concrete_rate(section.concrete())?;
    let steel_rate = profile.steel_rate(section.steel())?;

    let concrete_volume_m3 = section.gross_area_mm2() * span_mm / MM3_PER_M3;
    let formwork_area_m2 = (section.top_width_mm() + 2.0 * section.overall_depth_mm()) * span_mm / MM2_PER_M2;

    let longitudinal_area = layout.total_longitudinal_area_mm2();
    let longitudinal_steel_kg = longitudinal_area * span_mm / MM3_PER_M3 * STEEL_DENSITY_KG_M3;

    let stirrups = layout.stirrups();
    let stirrup_count = (span_mm / stirrups.spacing_mm).floor() as u32 + 1;
    let stirrup_length = stirrup_length_mm(section, layout);
    let stirrup_steel_kg =
        f64::from(stirrup_count) * stirrup_length * stirrups.bar.area_mm2() / MM3_PER_M3 * STEEL_DENSITY_KG_M3;
    let steel_kg = longitudinal_steel_kg + stirrup_steel_kg;

    let steel_percent = 100.0 * longitudinal_area / (section.width_mm() * section.overall_depth_mm());
    let congestion = profile
        .congestion
        .filter(|rule| steel_percent > rule.threshold_percent);
    let congestion_applied = congestion.is_some();
    let multiplier = congestion.map_or(1.0, |rule| rule.multiplier);

    let concrete_cost = concrete_volume_m3 * concrete_rate;
    let steel_cost = steel_kg * steel_rate * multiplier;
    let formwork_cost = formwork_area_m2 * profile.formwork_rate;

    Ok(CostBreakdown {
        concrete_volume_m3,
        formwork_area_m2,
        longitudinal_steel_kg,
        stirrup_count,
        stirrup_length_mm: stirrup_length,
        stirrup_steel_kg,
        steel_kg,
        concrete_cost,
        steel_cost,
        formwork_cost,
        congestion_applied,
        total_cost: concrete_cost + steel_cost + formwork_cost,
        weight_kg: concrete_volume_m3 * CONCRETE_DENSITY_KG_M3 + steel_kg,
        carbon_kg: profile
            .carbon
            .map(|c| concrete_volume_m3 * c.concrete_per_m3 + steel_kg * c.steel_per_kg),
    })
}
