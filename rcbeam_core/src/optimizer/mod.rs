//! # Candidate Optimizer
//!
//! Searches a bounded grid of (concrete, steel, width, depth) for the
//! cheapest compliant design. Each grid point is independent:
//!
//! ```text
//! grid point → section → detail_section → compliance::check → cost::price
//! ```
//!
//! Points are evaluated in parallel with rayon and collected back in grid
//! order, so results never depend on thread scheduling (a time budget only
//! decides how many points get evaluated).
//!
//! ## Budgets
//!
//! - `max_combinations` is a hard ceiling: a larger grid is rejected before
//!   any evaluation, as is one above the engine's configured ceiling
//! - `max_evaluations` evaluates only the first N points in grid order
//! - `time_limit_ms` stops starting new points once elapsed
//!
//! Either budget marks the report [`Completeness::Truncated`].
//!
//! ## Outcomes
//!
//! A search with no compliant candidate is not an error. It reports
//! [`NoCompliantReason::NoPhysicalFit`] when no evaluated point could be
//! reinforced at all, [`NoCompliantReason::BoundsTooSmall`] when layouts were
//! built but every one failed a check, and
//! [`NoCompliantReason::NothingEvaluated`] when the budget allowed no
//! evaluation.

pub mod grid;
pub mod ranking;

use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bar_selection::{detail_section, DetailingOutcome};
use crate::checks::{CheckId, FailureReason};
use crate::compliance::{self, ComplianceVerdict};
use crate::config::EngineConfig;
use crate::cost::{self, CostBreakdown, CostProfile};
use crate::errors::{CalcError, CalcResult};
use crate::loads::LoadDemand;
use crate::reinforcement::ReinforcementLayout;
use crate::section::{BeamSection, BeamSpan};

pub use grid::{GridPoint, RangeSpec, SearchBounds};
pub use ranking::Metric;

/// What the caller wants back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Objective {
    /// The single cheapest candidate
    #[default]
    Best,
    /// Cheapest candidates in ranking order
    Ranked { limit: usize },
    /// Non-dominated set over two or more metrics
    Pareto {
        objectives: Vec<Metric>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<usize>,
    },
}

/// Search size and time limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchBudget {
    /// Largest grid the caller accepts
    pub max_combinations: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_evaluations: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_ms: Option<u64>,
}

/// Everything a design search needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignProblem {
    pub demand: LoadDemand,
    pub span: BeamSpan,
    pub bounds: SearchBounds,
    pub cost: CostProfile,
    #[serde(default)]
    pub ductility_enabled: bool,
    #[serde(default)]
    pub objective: Objective,
    pub budget: SearchBudget,
    /// Keep a summary of every non-compliant point
    #[serde(default)]
    pub retain_rejected: bool,
}

/// A compliant, priced design at one grid point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignCandidate {
    pub grid_index: usize,
    pub section: BeamSection,
    pub layout: ReinforcementLayout,
    pub verdict: ComplianceVerdict,
    pub cost: CostBreakdown,
}

/// Diagnostic summary of a non-compliant grid point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedCandidate {
    pub grid_index: usize,
    pub section: BeamSection,
    pub governing: Option<CheckId>,
    pub ratio: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetKind {
    Evaluations,
    Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Completeness {
    Exhaustive,
    Truncated {
        budget: BudgetKind,
        evaluated: u64,
        grid_size: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoCompliantReason {
    /// No evaluated point admits a buildable layout
    NoPhysicalFit,
    /// Layouts were built but all failed a check; widen the bounds
    BoundsTooSmall,
    /// The budget allowed no evaluation
    NothingEvaluated,
}

impl NoCompliantReason {
    pub fn description(&self) -> &'static str {
        match self {
            NoCompliantReason::NoPhysicalFit => "no candidate section can be reinforced within the bar rules",
            NoCompliantReason::BoundsTooSmall => "every buildable candidate failed a check; widen the search bounds",
            NoCompliantReason::NothingEvaluated => "the search budget allowed no evaluation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchOutcome {
    Designed { candidates: Vec<DesignCandidate> },
    NoCompliant { reason: NoCompliantReason },
}

/// Result of a design search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    pub outcome: SearchOutcome,
    pub completeness: Completeness,
    pub grid_size: u64,
    pub evaluated: u64,
    pub compliant: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedCandidate>,
}

impl SearchReport {
    /// Best candidate, when any
    pub fn best(&self) -> Option<&DesignCandidate> {
        match &self.outcome {
            SearchOutcome::Designed { candidates } => candidates.first(),
            SearchOutcome::NoCompliant { .. } => None,
        }
    }

    pub fn is_exhaustive(&self) -> bool {
        self.completeness == Completeness::Exhaustive
    }
}

/// Outcome of one grid point
enum Evaluation {
    Compliant(DesignCandidate),
    Failed(RejectedCandidate),
    NoLayout(RejectedCandidate),
}

impl DesignProblem {
    /// Reject a problem that cannot be searched as posed.
    pub fn validate(&self, config: &EngineConfig) -> CalcResult<()> {
        // Size the grid before anything touches its points
        self.bounds.validate_ranges()?;
        let grid_size = self.bounds.grid_size();
        if grid_size > self.budget.max_combinations {
            return Err(CalcError::search_space_too_large(
                grid_size,
                self.budget.max_combinations,
                "request max_combinations",
            ));
        }
        if grid_size > config.search.max_grid_points {
            return Err(CalcError::search_space_too_large(
                grid_size,
                config.search.max_grid_points,
                "engine configuration",
            ));
        }
        self.bounds.validate(config.bars.stirrup)?;
        self.cost.validate_for(&self.bounds.concretes, &self.bounds.steels)?;

        match &self.objective {
            Objective::Best => {}
            Objective::Ranked { limit } => {
                if *limit == 0 {
                    return Err(CalcError::invalid_input("objective.limit", "0", "Limit must be at least 1"));
                }
            }
            Objective::Pareto { objectives, limit } => {
                let mut distinct = objectives.clone();
                distinct.sort();
                distinct.dedup();
                if distinct.len() < 2 {
                    return Err(CalcError::invalid_input(
                        "objective.objectives",
                        format!("{:?}", objectives),
                        "Pareto search needs at least two distinct objectives",
                    ));
                }
                if distinct.contains(&Metric::Carbon) && self.cost.carbon.is_none() {
                    return Err(CalcError::missing_field("cost.carbon"));
                }
                if *limit == Some(0) {
                    return Err(CalcError::invalid_input("objective.limit", "0", "Limit must be at least 1"));
                }
            }
        }
        Ok(())
    }

    fn evaluate(&self, point: &GridPoint, config: &EngineConfig) -> CalcResult<Evaluation> {
        let base = self.bounds.section_at(point, config.bars.stirrup)?;
        let detailed = match detail_section(&base, &self.demand, self.ductility_enabled, config)? {
            DetailingOutcome::Detailed(detailed) => detailed,
            DetailingOutcome::Infeasible(infeasible) => {
                let verdict = ComplianceVerdict::no_feasible_layout(&infeasible, self.ductility_enabled);
                debug!(index = point.index, "no feasible layout");
                return Ok(Evaluation::NoLayout(rejected(point.index, base, &verdict)));
            }
        };

        let verdict = compliance::check(
            &detailed.section,
            &self.demand,
            &self.span,
            &detailed.layout,
            self.ductility_enabled,
            config,
        );
        debug!(
            index = point.index,
            width_mm = point.width_mm,
            depth_mm = point.depth_mm,
            concrete = %point.concrete,
            steel = %point.steel,
            passed = verdict.passed,
            "evaluated grid point"
        );
        if !verdict.passed {
            return Ok(Evaluation::Failed(rejected(point.index, detailed.section, &verdict)));
        }

        let cost = cost::price(&detailed.section, &detailed.layout, self.span.length_mm(), &self.cost)?;
        Ok(Evaluation::Compliant(DesignCandidate {
            grid_index: point.index,
            section: detailed.section,
            layout: detailed.layout,
            verdict,
            cost,
        }))
    }
}

fn rejected(grid_index: usize, section: BeamSection, verdict: &ComplianceVerdict) -> RejectedCandidate {
    let governing = verdict.governing();
    RejectedCandidate {
        grid_index,
        section,
        governing: governing.map(|r| r.check),
        ratio: governing.map_or(0.0, |r| r.ratio),
        reason: governing.and_then(|r| r.reason.clone()),
    }
}

/// Run a design search.
///
/// Fails only for invalid problems (bad bounds, missing rates, oversized
/// grid); an empty result is reported through [`SearchOutcome::NoCompliant`].
pub fn optimize(problem: &DesignProblem, config: &EngineConfig) -> CalcResult<SearchReport> {
    problem.validate(config)?;

    let grid_size = problem.bounds.grid_size();
    let mut points = problem.bounds.points();
    let mut budget_hit = None;
    if let Some(cap) = problem.budget.max_evaluations {
        if cap < grid_size {
            points.truncate(usize::try_from(cap).unwrap_or(usize::MAX));
            budget_hit = Some(BudgetKind::Evaluations);
        }
    }
    info!(
        grid_size,
        dispatched = points.len(),
        ductility = problem.ductility_enabled,
        "starting design search"
    );

    let started = Instant::now();
    let deadline = problem.budget.time_limit_ms.map(Duration::from_millis);
    let evaluations: Vec<Option<CalcResult<Evaluation>>> = points
        .par_iter()
        .map(|point| {
            if deadline.is_some_and(|limit| started.elapsed() >= limit) {
                return None;
            }
            Some(problem.evaluate(point, config))
        })
        .collect();

    let mut candidates = Vec::new();
    let mut rejected = Vec::new();
    let mut evaluated = 0u64;
    let mut any_layout = false;
    let mut skipped = false;
    for evaluation in evaluations {
        let Some(evaluation) = evaluation else {
            skipped = true;
            continue;
        };
        evaluated += 1;
        match evaluation? {
            Evaluation::Compliant(candidate) => {
                any_layout = true;
                candidates.push(candidate);
            }
            Evaluation::Failed(r) => {
                any_layout = true;
                if problem.retain_rejected {
                    rejected.push(r);
                }
            }
            Evaluation::NoLayout(r) => {
                if problem.retain_rejected {
                    rejected.push(r);
                }
            }
        }
    }
    if skipped {
        budget_hit = Some(BudgetKind::Time);
    }

    let completeness = match budget_hit {
        Some(budget) => Completeness::Truncated {
            budget,
            evaluated,
            grid_size,
        },
        None => Completeness::Exhaustive,
    };
    let compliant = candidates.len() as u64;

    let outcome = if candidates.is_empty() {
        let reason = if evaluated == 0 {
            NoCompliantReason::NothingEvaluated
        } else if any_layout {
            NoCompliantReason::BoundsTooSmall
        } else {
            NoCompliantReason::NoPhysicalFit
        };
        SearchOutcome::NoCompliant { reason }
    } else {
        SearchOutcome::Designed {
            candidates: select(candidates, &problem.objective),
        }
    };

    info!(
        evaluated,
        compliant,
        elapsed_ms = started.elapsed().as_millis() as u64,
        exhaustive = completeness == Completeness::Exhaustive,
        "design search finished"
    );

    Ok(SearchReport {
        outcome,
        completeness,
        grid_size,
        evaluated,
        compliant,
        rejected,
    })
}

fn select(mut candidates: Vec<DesignCandidate>, objective: &Objective) -> Vec<DesignCandidate> {
    match objective {
        Objective::Best => {
            ranking::rank(&mut candidates);
            candidates.truncate(1);
            candidates
        }
        Objective::Ranked { limit } => {
            ranking::rank(&mut candidates);
            candidates.truncate(*limit);
            candidates
        }
        Objective::Pareto { objectives, limit } => {
            let mut front = ranking::pareto_front(&candidates, objectives);
            if let Some(limit) = limit {
                front.truncate(*limit);
            }
            front
        }
    }
}
