//! # Detailing
//!
//! Checks that a layout can actually be built in the section: maximum steel,
//! minimum clear spacing in every layer, at least two bars per layer, the
//! layer count limit, and that the effective depth the other checks used is
//! not deeper than the bars really sit.

use serde::{Deserialize, Serialize};

use super::{demand_ratio, rule_ratio, CheckDetail, CheckId, CheckResult, Criterion, FailureReason};
use crate::code_tables::{clause, MAX_STEEL_FRACTION};
use crate::config::EngineConfig;
use crate::reinforcement::{BarSpacingRules, Layer, ReinforcementLayout};
use crate::section::BeamSection;

/// Minimum bars per layer (one at each stirrup corner)
pub const MIN_BARS_PER_LAYER: u32 = 2;

/// How far the stated effective depth may exceed the one the bars give (mm)
pub const EFFECTIVE_DEPTH_TOLERANCE_MM: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Face {
    Tension,
    Compression,
}

/// Spacing of one layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpacing {
    pub face: Face,
    pub index: u8,
    pub bars: u32,
    pub clear_spacing_mm: f64,
    pub min_clear_spacing_mm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailingDetail {
    /// Limit for each of tension and compression steel
    pub max_steel_mm2: f64,
    pub tension_mm2: f64,
    pub compression_mm2: f64,
    /// Clear width between stirrup legs
    pub available_width_mm: f64,
    pub layers: Vec<LayerSpacing>,
    pub max_layers: u8,
    /// Effective depth implied by the tension bar centroid
    pub layout_effective_depth_mm: f64,
}

/// Effective depth implied by the tension layers of a layout.
pub fn layout_effective_depth_mm(section: &BeamSection, layout: &ReinforcementLayout, rules: &BarSpacingRules) -> f64 {
    let centroid = rules.centroid_depth(
        &layout.tension_layers(),
        section.clear_cover_mm(),
        layout.stirrups().bar.diameter(),
    );
    section.overall_depth_mm() - centroid
}

fn layer_criteria(
    face: Face,
    layers: &[Layer],
    available: f64,
    rules: &BarSpacingRules,
    criteria: &mut Vec<Criterion>,
    spacings: &mut Vec<LayerSpacing>,
) {
    for layer in layers {
        criteria.push(Criterion::new(
            rules.required_width(layer) / available,
            FailureReason::BarSpacingTooTight,
        ));
        let bars = layer.bar_count();
        criteria.push(Criterion::new(
            rule_ratio(
                bars >= MIN_BARS_PER_LAYER,
                demand_ratio(f64::from(MIN_BARS_PER_LAYER), f64::from(bars)),
            ),
            FailureReason::TooFewBarsInLayer,
        ));
        spacings.push(LayerSpacing {
            face,
            index: layer.index,
            bars: layer.bar_count(),
            clear_spacing_mm: rules.clear_spacing(layer, available),
            min_clear_spacing_mm: rules.min_horizontal_clear(layer.largest_diameter()),
        });
    }
}

pub fn check(section: &BeamSection, layout: &ReinforcementLayout, config: &EngineConfig) -> CheckResult {
    let rules = config.spacing_rules();
    let max_steel = MAX_STEEL_FRACTION * section.web_area_mm2();
    let ast = layout.tension_area_mm2();
    let asc = layout.compression_area_mm2();
    // A section narrower than its stirrups still yields a finite, failing ratio
    let available = section
        .clear_width_inside_stirrups_mm(layout.stirrups().bar.diameter())
        .max(1.0);
    let tension_layers = layout.tension_layers();
    let d_layout = layout_effective_depth_mm(section, layout, &rules);

    let mut criteria = vec![
        Criterion::new(ast / max_steel, FailureReason::ExceedsMaximumSteel),
        Criterion::new(asc / max_steel, FailureReason::ExceedsMaximumSteel),
    ];
    let mut spacings = Vec::new();
    layer_criteria(Face::Tension, &tension_layers, available, &rules, &mut criteria, &mut spacings);
    layer_criteria(
        Face::Compression,
        &layout.compression_layers(),
        available,
        &rules,
        &mut criteria,
        &mut spacings,
    );
    let layer_count = tension_layers.len();
    criteria.push(Criterion::new(
        rule_ratio(
            layer_count <= usize::from(config.bars.max_layers),
            demand_ratio(layer_count as f64, f64::from(config.bars.max_layers)),
        ),
        FailureReason::TooManyLayers,
    ));
    let d = section.effective_depth_mm();
    criteria.push(Criterion::new(
        rule_ratio(
            d <= d_layout + EFFECTIVE_DEPTH_TOLERANCE_MM,
            d / d_layout.max(1.0),
        ),
        FailureReason::EffectiveDepthInconsistent,
    ));

    let tightest = spacings
        .iter()
        .map(|s| s.clear_spacing_mm)
        .fold(f64::INFINITY, f64::min);
    let explanation = format!(
        "Ast {:.0} mm², Asc {:.0} mm², limit {:.0} mm² each ({}); {} tension layer(s), tightest clear spacing {:.0} mm ({}); d = {:.0} mm, bars give {:.0} mm",
        ast,
        asc,
        max_steel,
        clause::MAX_STEEL,
        tension_layers.len(),
        tightest,
        clause::MIN_BAR_SPACING,
        section.effective_depth_mm(),
        d_layout
    );

    CheckResult::from_criteria(
        CheckId::Detailing,
        criteria,
        explanation,
        CheckDetail::Detailing(DetailingDetail {
            max_steel_mm2: max_steel,
            tension_mm2: ast,
            compression_mm2: asc,
            available_width_mm: available,
            layers: spacings,
            max_layers: config.bars.max_layers,
            layout_effective_depth_mm: d_layout,
        }),
    )
}
