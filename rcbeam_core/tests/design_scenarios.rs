//! End-to-end scenarios across checks, bar selection and the optimizer.

use std::collections::BTreeMap;

use approx::assert_relative_eq;

use rcbeam_core::bar_selection::BarSelector;
use rcbeam_core::checks::flexure::{self, ReinforcementMode};
use rcbeam_core::checks::shear::{self, ShearMode};
use rcbeam_core::checks::{CheckId, FailureReason};
use rcbeam_core::compliance;
use rcbeam_core::config::EngineConfig;
use rcbeam_core::cost::{self, CarbonFactors, CostProfile};
use rcbeam_core::loads::LoadDemand;
use rcbeam_core::materials::{BarSize, ConcreteGrade, SteelGrade};
use rcbeam_core::optimizer::ranking::dominates;
use rcbeam_core::optimizer::{
    optimize, BudgetKind, Completeness, DesignProblem, Metric, NoCompliantReason, Objective, RangeSpec,
    SearchBounds, SearchBudget, SearchOutcome,
};
use rcbeam_core::reinforcement::{layers_from_groups, BarGroup, ReinforcementLayout, Stirrups};
use rcbeam_core::section::{BeamSection, BeamSpan};

fn section(d: f64) -> BeamSection {
    BeamSection::rectangular(300.0, 500.0, d, 25.0, ConcreteGrade::M20, SteelGrade::Fe415).unwrap()
}

fn stirrups() -> Stirrups {
    Stirrups {
        bar: BarSize::D8,
        legs: 2,
        spacing_mm: 150.0,
    }
}

fn layout(bar: BarSize, count: u32) -> ReinforcementLayout {
    ReinforcementLayout::new(vec![BarGroup::new(bar, count, 0)], vec![], stirrups()).unwrap()
}

fn problem(moment_knm: f64, shear_kn: f64) -> DesignProblem {
    DesignProblem {
        demand: LoadDemand::new(moment_knm, shear_kn).unwrap(),
        span: BeamSpan::simply_supported(5000.0).unwrap(),
        bounds: SearchBounds {
            width: RangeSpec::new(230.0, 330.0, 50.0),
            depth: RangeSpec::new(400.0, 600.0, 50.0),
            concretes: vec![ConcreteGrade::M20, ConcreteGrade::M25],
            steels: vec![SteelGrade::Fe415, SteelGrade::Fe500],
            clear_cover_mm: 25.0,
            flange: None,
        },
        cost: CostProfile {
            concrete_rates: BTreeMap::from([(ConcreteGrade::M20, 6000.0), (ConcreteGrade::M25, 6500.0)]),
            steel_rates: BTreeMap::from([(SteelGrade::Fe415, 80.0), (SteelGrade::Fe500, 84.0)]),
            formwork_rate: 500.0,
            congestion: None,
            carbon: Some(CarbonFactors {
                concrete_per_m3: 300.0,
                steel_per_kg: 1.9,
            }),
        },
        ductility_enabled: false,
        objective: Objective::Ranked { limit: 1000 },
        budget: SearchBudget {
            max_combinations: 1000,
            max_evaluations: None,
            time_limit_ms: None,
        },
        retain_rejected: false,
    }
}

fn candidates(outcome: &SearchOutcome) -> &[rcbeam_core::DesignCandidate] {
    match outcome {
        SearchOutcome::Designed { candidates } => candidates,
        SearchOutcome::NoCompliant { reason } => panic!("no compliant design: {:?}", reason),
    }
}

// ============================================================================
// Worked example: 300×500, d = 450, M20/Fe415
// ============================================================================

#[test]
fn test_doubly_reinforced_design() {
    let design = flexure::design(&section(450.0), 220.0, 43.0);
    assert_eq!(design.mode, ReinforcementMode::Doubly);
    assert_relative_eq!(design.limiting_moment_knm, 167.6256768, max_relative = 1e-9);
    assert_relative_eq!(design.required_tension_mm2, 1648.646561, max_relative = 1e-8);
    assert_relative_eq!(design.required_compression_mm2, 373.800823, max_relative = 1e-8);
    assert_relative_eq!(design.compression_steel_stress_mpa.unwrap(), 353.177778, max_relative = 1e-8);
}

#[test]
fn test_shear_design_for_provided_steel() {
    // 4D25 provided: pt = 1.454 %, τc interpolated to 0.7109 MPa
    let demand = LoadDemand::new(220.0, 180.0).unwrap();
    let provided = 4.0 * BarSize::D25.area_mm2();
    let design = shear::design(&section(450.0), &demand, provided, BarSize::D8, 2, &Default::default());
    assert_eq!(design.mode, ShearMode::Designed);
    assert_relative_eq!(design.nominal_stress_mpa, 1.333333, max_relative = 1e-6);
    assert_relative_eq!(design.concrete_strength_mpa, 0.710888, max_relative = 1e-6);
    assert_relative_eq!(design.stirrup_shear_kn, 84.030092, max_relative = 1e-6);
    assert_relative_eq!(design.required_spacing_mm.unwrap(), 194.377000, max_relative = 1e-6);
    assert_eq!(design.design_spacing_mm, Some(190.0));
}

#[test]
fn test_moment_at_limit_stays_singly() {
    let s = section(450.0);
    let limit = flexure::limiting_moment_knm(&s);
    let at_limit = flexure::design(&s, limit, 43.0);
    assert_eq!(at_limit.mode, ReinforcementMode::Singly);
    assert_eq!(at_limit.required_compression_mm2, 0.0);
    assert_relative_eq!(at_limit.neutral_axis_depth_mm, at_limit.xu_max_mm, max_relative = 1e-6);

    let above = flexure::design(&s, limit * 1.001, 43.0);
    assert_eq!(above.mode, ReinforcementMode::Doubly);
}

#[test]
fn test_shear_above_maximum_fails_without_spacing() {
    // τv = 400e3 / (300·450) = 2.96 MPa > 2.8 MPa for M20
    let demand = LoadDemand::new(100.0, 400.0).unwrap();
    let span = BeamSpan::simply_supported(5000.0).unwrap();
    let verdict = compliance::check(
        &section(457.0),
        &demand,
        &span,
        &layout(BarSize::D20, 3),
        false,
        &EngineConfig::default(),
    );
    let shear = verdict.result(CheckId::Shear).unwrap();
    assert!(!shear.passed);
    assert_eq!(shear.reason, Some(FailureReason::ShearStressExceedsMaximum));
    assert!(rcbeam_core::parity::stirrup_spacing_mm(&verdict).is_none());
    assert!(!verdict.passed);
}

// ============================================================================
// Monotonicity: more tension steel never worsens flexure or serviceability
// ============================================================================

#[test]
fn test_added_steel_never_worsens_margins() {
    let config = EngineConfig::default();
    let demand = LoadDemand::new(100.0, 80.0).unwrap();
    let span = BeamSpan::simply_supported(5000.0).unwrap();
    let s = section(457.0);

    let ratios: Vec<(f64, f64, f64)> = (2..=5)
        .map(|n| {
            let v = compliance::check(&s, &demand, &span, &layout(BarSize::D16, n), false, &config);
            let ratio = |id| v.result(id).unwrap().ratio;
            (ratio(CheckId::Flexure), ratio(CheckId::Deflection), ratio(CheckId::CrackControl))
        })
        .collect();

    for pair in ratios.windows(2) {
        assert!(pair[1].0 <= pair[0].0 + 1e-12, "flexure {:?}", ratios);
        assert!(pair[1].1 <= pair[0].1 + 1e-12, "deflection {:?}", ratios);
        assert!(pair[1].2 <= pair[0].2 + 1e-12, "crack control {:?}", ratios);
    }
}

// ============================================================================
// Bar selection
// ============================================================================

#[test]
fn test_selected_layouts_cover_demand_and_fit() {
    let config = EngineConfig::default();
    let rules = config.spacing_rules();
    let available = section(450.0).clear_width_inside_stirrups_mm(8.0);
    let selector = BarSelector::new(&config.bars.longitudinal, available, config.bars.max_layers, Some(180.0), rules);

    for required in [120.0, 480.0, 905.0, 1648.6, 2600.0, 3900.0] {
        let groups = selector.select(required).unwrap();
        let area: f64 = groups.iter().map(BarGroup::area_mm2).sum();
        assert!(area >= required, "{} mm² for {} mm²", area, required);

        let layers = layers_from_groups(&groups);
        assert!(layers.len() <= usize::from(config.bars.max_layers));
        for layer in &layers {
            assert!(layer.bar_count() >= 2);
            assert!(config.spacing_rules().layer_fits(layer, available));
        }

        let mut diameters: Vec<BarSize> = groups.iter().map(|g| g.bar).collect();
        diameters.sort();
        diameters.dedup();
        assert!(diameters.len() <= 2);
    }
}

#[test]
fn test_selection_beyond_capacity_is_reported() {
    let config = EngineConfig::default();
    let selector = BarSelector::new(&config.bars.longitudinal, 234.0, 2, None, config.spacing_rules());
    let max = selector.max_achievable_mm2();
    let err = selector.select(max + 1.0).unwrap_err();
    assert_eq!(err.required_mm2, max + 1.0);
    assert_relative_eq!(err.max_achievable_mm2, max);
}

// ============================================================================
// Optimizer
// ============================================================================

#[test]
fn test_candidates_replay_through_compliance() {
    let config = EngineConfig::default();
    let p = problem(150.0, 120.0);
    let report = optimize(&p, &config).unwrap();
    assert!(report.is_exhaustive());

    for c in candidates(&report.outcome) {
        let replay = compliance::check(&c.section, &p.demand, &p.span, &c.layout, p.ductility_enabled, &config);
        assert!(replay.passed, "candidate {} fails on replay", c.grid_index);
        assert_eq!(replay, c.verdict);

        let priced = cost::price(&c.section, &c.layout, p.span.length_mm(), &p.cost).unwrap();
        assert_eq!(priced, c.cost);
    }
}

#[test]
fn test_candidates_governed_by_real_margins() {
    let report = optimize(&problem(150.0, 120.0), &EngineConfig::default()).unwrap();
    let found = candidates(&report.outcome);

    for c in found {
        let detailing = c.verdict.result(CheckId::Detailing).unwrap();
        assert!(detailing.ratio < 1.0, "candidate {}: detailing {}", c.grid_index, detailing.ratio);
    }
    let best = report.best().unwrap();
    let governing = best.verdict.governing().unwrap().check;
    assert!(
        matches!(
            governing,
            CheckId::Flexure | CheckId::Shear | CheckId::Deflection | CheckId::CrackControl
        ),
        "cheapest design governed by {:?}",
        governing
    );
}

#[test]
fn test_ductile_search_applies_ductility() {
    let config = EngineConfig::default();
    let mut p = problem(150.0, 120.0);
    p.ductility_enabled = true;
    let report = optimize(&p, &config).unwrap();

    for c in candidates(&report.outcome) {
        assert!(c.verdict.ductility_applied);
        assert!(c.verdict.result(CheckId::Ductility).is_some_and(|r| r.passed));
    }
}

#[test]
fn test_search_is_deterministic() {
    let config = EngineConfig::default();
    let p = problem(150.0, 120.0);
    let first = optimize(&p, &config).unwrap();
    let second = optimize(&p, &config).unwrap();
    assert_eq!(first.outcome, second.outcome);
    assert_eq!(
        serde_json::to_string(&first.outcome).unwrap(),
        serde_json::to_string(&second.outcome).unwrap()
    );
}

#[test]
fn test_best_is_first_ranked() {
    let config = EngineConfig::default();
    let ranked = optimize(&problem(150.0, 120.0), &config).unwrap();

    let mut p = problem(150.0, 120.0);
    p.objective = Objective::Best;
    let best = optimize(&p, &config).unwrap();

    assert_eq!(candidates(&best.outcome).len(), 1);
    assert_eq!(best.best(), ranked.best());
}

#[test]
fn test_pareto_front_is_exactly_non_dominated() {
    let config = EngineConfig::default();
    let metrics = vec![Metric::Cost, Metric::Carbon];
    let all = optimize(&problem(150.0, 120.0), &config).unwrap();
    let all = candidates(&all.outcome);

    let mut p = problem(150.0, 120.0);
    p.objective = Objective::Pareto {
        objectives: metrics.clone(),
        limit: None,
    };
    let report = optimize(&p, &config).unwrap();
    let front = candidates(&report.outcome);
    assert!(!front.is_empty());

    for c in all {
        let on_front = front.iter().any(|f| f.grid_index == c.grid_index);
        let dominated = all.iter().any(|other| dominates(other, c, &metrics));
        assert_eq!(on_front, !dominated, "grid point {}", c.grid_index);
    }
}

#[test]
fn test_overloaded_bounds_report_no_compliant() {
    // τv exceeds τc,max at every grid point; layouts exist but shear fails
    let report = optimize(&problem(50.0, 1000.0), &EngineConfig::default()).unwrap();
    assert!(report.is_exhaustive());
    assert_eq!(report.evaluated, report.grid_size);
    assert_eq!(
        report.outcome,
        SearchOutcome::NoCompliant {
            reason: NoCompliantReason::BoundsTooSmall
        }
    );
}

#[test]
fn test_narrow_bounds_report_no_physical_fit() {
    let mut p = problem(50.0, 20.0);
    p.bounds.width = RangeSpec::fixed(100.0);
    let report = optimize(&p, &EngineConfig::default()).unwrap();
    assert_eq!(
        report.outcome,
        SearchOutcome::NoCompliant {
            reason: NoCompliantReason::NoPhysicalFit
        }
    );
}

#[test]
fn test_exhausted_time_budget_is_not_exhaustive() {
    let mut p = problem(150.0, 120.0);
    p.budget.time_limit_ms = Some(0);
    let report = optimize(&p, &EngineConfig::default()).unwrap();
    assert_eq!(
        report.completeness,
        Completeness::Truncated {
            budget: BudgetKind::Time,
            evaluated: 0,
            grid_size: report.grid_size,
        }
    );
    assert_eq!(
        report.outcome,
        SearchOutcome::NoCompliant {
            reason: NoCompliantReason::NothingEvaluated
        }
    );
}
