//! Candidate ordering and Pareto filtering.
//!
//! Single-objective order: total cost, then weight, then gross section
//! area, then grid index. Every key is compared with `total_cmp`, so the
//! order is total and independent of evaluation order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::DesignCandidate;

/// Quantity a multi-objective search minimises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    Cost,
    Weight,
    Carbon,
}

impl Metric {
    pub fn value(&self, candidate: &DesignCandidate) -> f64 {
        match self {
            Metric::Cost => candidate.cost.total_cost,
            Metric::Weight => candidate.cost.weight_kg,
            Metric::Carbon => candidate.cost.carbon_kg.unwrap_or(f64::INFINITY),
        }
    }
}

/// Ranking order between two candidates.
pub fn compare(a: &DesignCandidate, b: &DesignCandidate) -> Ordering {
    a.cost
        .total_cost
        .total_cmp(&b.cost.total_cost)
        .then_with(|| a.cost.weight_kg.total_cmp(&b.cost.weight_kg))
        .then_with(|| a.section.gross_area_mm2().total_cmp(&b.section.gross_area_mm2()))
        .then_with(|| a.grid_index.cmp(&b.grid_index))
}

pub fn rank(candidates: &mut [DesignCandidate]) {
    candidates.sort_by(compare);
}

/// `a` dominates `b`: no worse on every metric, strictly better on one.
pub fn dominates(a: &DesignCandidate, b: &DesignCandidate, metrics: &[Metric]) -> bool {
    let mut strictly_better = false;
    for metric in metrics {
        let (va, vb) = (metric.value(a), metric.value(b));
        if va > vb {
            return false;
        }
        if va < vb {
            strictly_better = true;
        }
    }
    strictly_better
}

/// Non-dominated candidates, in ranking order.
pub fn pareto_front(candidates: &[DesignCandidate], metrics: &[Metric]) -> Vec<DesignCandidate> {
    let mut front: Vec<DesignCandidate> = candidates
        .iter()
        .filter(|c| !candidates.iter().any(|other| dominates(other, c, metrics)))
        .cloned()
        .collect();
    rank(&mut front);
    front
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::ComplianceVerdict;
    use crate::cost::CostBreakdown;
    use crate::materials::{BarSize, ConcreteGrade, SteelGrade};
    use crate::reinforcement::{BarGroup, ReinforcementLayout, Stirrups};
    use crate::section::BeamSection;

    fn candidate(grid_index: usize, width: f64, cost: f64, weight: f64, carbon: f64) -> DesignCandidate {
        let section =
            BeamSection::rectangular(width, 500.0, 457.0, 25.0, ConcreteGrade::M20, SteelGrade::Fe415).unwrap();
        let layout = ReinforcementLayout::new(
            vec![BarGroup::new(BarSize::D20, 3, 0)],
            vec![],
            Stirrups {
                bar: BarSize::D8,
                legs: 2,
                spacing_mm: 150.0,
            },
        )
        .unwrap();
        DesignCandidate {
            grid_index,
            section,
            layout,
            verdict: ComplianceVerdict {
                passed: true,
                governing_index: 0,
                results: vec![],
                ductility_applied: false,
                table_version: String::new(),
            },
            cost: CostBreakdown {
                concrete_volume_m3: 0.0,
                formwork_area_m2: 0.0,
                longitudinal_steel_kg: 0.0,
                stirrup_count: 0,
                stirrup_length_mm: 0.0,
                stirrup_steel_kg: 0.0,
                steel_kg: 0.0,
                concrete_cost: 0.0,
                steel_cost: 0.0,
                formwork_cost: 0.0,
                congestion_applied: false,
                total_cost: cost,
                weight_kg: weight,
                carbon_kg: Some(carbon),
            },
        }
    }

    #[test]
    fn test_rank_tie_breaks() {
        let mut c = vec![
            candidate(0, 300.0, 100.0, 50.0, 1.0),
            candidate(1, 250.0, 100.0, 50.0, 1.0),
            candidate(2, 300.0, 100.0, 40.0, 1.0),
            candidate(3, 300.0, 90.0, 60.0, 1.0),
            candidate(4, 250.0, 100.0, 50.0, 1.0),
        ];
        rank(&mut c);
        let order: Vec<usize> = c.iter().map(|c| c.grid_index).collect();
        assert_eq!(order, vec![3, 2, 1, 4, 0]);
    }

    #[test]
    fn test_dominance() {
        let metrics = [Metric::Cost, Metric::Weight];
        let a = candidate(0, 300.0, 100.0, 50.0, 1.0);
        let b = candidate(1, 300.0, 110.0, 50.0, 1.0);
        let twin = candidate(2, 300.0, 100.0, 50.0, 1.0);
        assert!(dominates(&a, &b, &metrics));
        assert!(!dominates(&b, &a, &metrics));
        assert!(!dominates(&a, &twin, &metrics));
    }

    #[test]
    fn test_pareto_front() {
        let metrics = [Metric::Cost, Metric::Carbon];
        let all = vec![
            candidate(0, 300.0, 100.0, 0.0, 30.0),
            candidate(1, 300.0, 120.0, 0.0, 20.0),
            candidate(2, 300.0, 130.0, 0.0, 25.0),
            candidate(3, 300.0, 150.0, 0.0, 10.0),
        ];
        let front = pareto_front(&all, &metrics);
        let ids: Vec<usize> = front.iter().map(|c| c.grid_index).collect();
        assert_eq!(ids, vec![0, 1, 3]);
        for kept in &front {
            assert!(all.iter().all(|other| !dominates(other, kept, &metrics)));
        }
    }
}
