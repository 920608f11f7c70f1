//! Search-space bounds and grid enumeration.
//!
//! Grid points are nested concrete grade → steel grade → width → depth, so
//! the index of a point is stable for given bounds. Range values are
//! `min + i·step` up to `max` inclusive, with a 1e-9 mm tolerance at the top.

use serde::{Deserialize, Serialize};

use crate::checks::flexure::DEFAULT_COMPRESSION_BAR_OFFSET_MM;
use crate::errors::{ensure_positive, CalcError, CalcResult};
use crate::materials::{BarSize, ConcreteGrade, SteelGrade};
use crate::section::{BeamSection, Flange};

/// Tolerance when deciding whether the last step reaches `max_mm`
pub const RANGE_TOLERANCE_MM: f64 = 1e-9;

/// Inclusive range of a dimension on a fixed step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeSpec {
    pub min_mm: f64,
    pub max_mm: f64,
    pub step_mm: f64,
}

impl RangeSpec {
    pub fn new(min_mm: f64, max_mm: f64, step_mm: f64) -> Self {
        RangeSpec { min_mm, max_mm, step_mm }
    }

    /// A single value
    pub fn fixed(value_mm: f64) -> Self {
        RangeSpec::new(value_mm, value_mm, 1.0)
    }

    fn validate(&self, field: &str) -> CalcResult<()> {
        ensure_positive(&format!("{}.min_mm", field), self.min_mm)?;
        ensure_positive(&format!("{}.max_mm", field), self.max_mm)?;
        ensure_positive(&format!("{}.step_mm", field), self.step_mm)?;
        if self.max_mm < self.min_mm {
            return Err(CalcError::invalid_input(
                format!("{}.max_mm", field),
                self.max_mm.to_string(),
                format!("Maximum must not be below minimum {}", self.min_mm),
            ));
        }
        Ok(())
    }

    /// Number of values in the range
    pub fn count(&self) -> u64 {
        (((self.max_mm - self.min_mm + RANGE_TOLERANCE_MM) / self.step_mm).floor() as u64).saturating_add(1)
    }

    /// Largest value in the range, without enumerating
    pub fn last(&self) -> f64 {
        self.min_mm + (self.count() - 1) as f64 * self.step_mm
    }

    pub fn values(&self) -> Vec<f64> {
        (0..self.count())
            .map(|i| self.min_mm + i as f64 * self.step_mm)
            .collect()
    }
}

/// Bounds of a design search.
///
/// ## JSON Example
///
/// ```json
/// {
///   "width": { "min_mm": 230.0, "max_mm": 400.0, "step_mm": 25.0 },
///   "depth": { "min_mm": 400.0, "max_mm": 700.0, "step_mm": 50.0 },
///   "concretes": ["M20", "M25"],
///   "steels": ["Fe415", "Fe500"],
///   "clear_cover_mm": 25.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchBounds {
    pub width: RangeSpec,
    pub depth: RangeSpec,
    pub concretes: Vec<ConcreteGrade>,
    pub steels: Vec<SteelGrade>,
    pub clear_cover_mm: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flange: Option<Flange>,
}

/// One point of the search grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub index: usize,
    pub concrete: ConcreteGrade,
    pub steel: SteelGrade,
    pub width_mm: f64,
    pub depth_mm: f64,
}

impl SearchBounds {
    /// Check both ranges are well formed, so [`grid_size`](Self::grid_size) is meaningful.
    pub fn validate_ranges(&self) -> CalcResult<()> {
        self.width.validate("width")?;
        self.depth.validate("depth")
    }

    /// Reject bounds that cannot produce a valid section anywhere on the grid.
    ///
    /// Runs in constant time whatever the grid size.
    pub fn validate(&self, stirrup: BarSize) -> CalcResult<()> {
        self.validate_ranges()?;
        ensure_positive("clear_cover_mm", self.clear_cover_mm)?;
        if self.concretes.is_empty() {
            return Err(CalcError::missing_field("concretes"));
        }
        if self.steels.is_empty() {
            return Err(CalcError::missing_field("steels"));
        }

        let ds = stirrup.diameter();
        if self.width.min_mm <= 2.0 * (self.clear_cover_mm + ds) {
            return Err(CalcError::invalid_input(
                "width.min_mm",
                self.width.min_mm.to_string(),
                format!(
                    "Width must exceed cover and stirrups on both faces ({} mm)",
                    2.0 * (self.clear_cover_mm + ds)
                ),
            ));
        }
        let min_effective = self.depth.min_mm - self.clear_cover_mm - ds - DEFAULT_COMPRESSION_BAR_OFFSET_MM;
        if min_effective <= 0.0 {
            return Err(CalcError::invalid_input(
                "depth.min_mm",
                self.depth.min_mm.to_string(),
                "Depth leaves no effective depth below cover and stirrups",
            ));
        }
        if let Some(flange) = self.flange {
            ensure_positive("flange.thickness_mm", flange.thickness_mm)?;
            let top = self.width.last();
            if flange.width_mm < top {
                return Err(CalcError::invalid_input(
                    "flange.width_mm",
                    flange.width_mm.to_string(),
                    format!("Flange must be at least as wide as the widest web {} mm", top),
                ));
            }
            if flange.thickness_mm >= self.depth.min_mm {
                return Err(CalcError::invalid_input(
                    "flange.thickness_mm",
                    flange.thickness_mm.to_string(),
                    format!("Flange must be thinner than the shallowest depth {} mm", self.depth.min_mm),
                ));
            }
        }
        Ok(())
    }

    /// Number of grid points, computed without enumerating
    pub fn grid_size(&self) -> u64 {
        (self.concretes.len() as u64)
            .saturating_mul(self.steels.len() as u64)
            .saturating_mul(self.width.count())
            .saturating_mul(self.depth.count())
    }

    /// All grid points in index order.
    pub fn points(&self) -> Vec<GridPoint> {
        let widths = self.width.values();
        let depths = self.depth.values();
        let mut points = Vec::new();
        for &concrete in &self.concretes {
            for &steel in &self.steels {
                for &width_mm in &widths {
                    for &depth_mm in &depths {
                        points.push(GridPoint {
                            index: points.len(),
                            concrete,
                            steel,
                            width_mm,
                            depth_mm,
                        });
                    }
                }
            }
        }
        points
    }

    /// Section at a grid point with the initial effective depth
    /// D − cover − stirrup − 10 mm.
    pub fn section_at(&self, point: &GridPoint, stirrup: BarSize) -> CalcResult<BeamSection> {
        let d = point.depth_mm - self.clear_cover_mm - stirrup.diameter() - DEFAULT_COMPRESSION_BAR_OFFSET_MM;
        let section = BeamSection::rectangular(
            point.width_mm,
            point.depth_mm,
            d,
            self.clear_cover_mm,
            point.concrete,
            point.steel,
        )?;
        match self.flange {
            Some(flange) => section.with_flange(flange),
            None => Ok(section),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> SearchBounds {
        SearchBounds {
            width: RangeSpec::new(230.0, 300.0, 25.0),
            depth: RangeSpec::new(400.0, 600.0, 50.0),
            concretes: vec![ConcreteGrade::M20, ConcreteGrade::M25],
            steels: vec![SteelGrade::Fe415],
            clear_cover_mm: 25.0,
            flange: None,
        }
    }

    #[test]
    fn test_range_values() {
        assert_eq!(RangeSpec::new(230.0, 300.0, 25.0).values(), vec![230.0, 255.0, 280.0]);
        assert_eq!(RangeSpec::new(400.0, 600.0, 50.0).count(), 5);
        assert_eq!(RangeSpec::fixed(300.0).values(), vec![300.0]);
        // Floating steps still reach the inclusive top
        assert_eq!(RangeSpec::new(0.1, 0.3, 0.1).count(), 3);
        assert_eq!(RangeSpec::new(230.0, 300.0, 25.0).last(), 280.0);
        assert_eq!(RangeSpec::fixed(300.0).last(), 300.0);
    }

    #[test]
    fn test_huge_flanged_range_validates_without_enumerating() {
        let mut b = bounds();
        b.width = RangeSpec::new(230.0, 1e12, 1.0);
        b.flange = Some(Flange {
            width_mm: 2e12,
            thickness_mm: 120.0,
        });
        assert!(b.validate(BarSize::D8).is_ok());
        assert!(b.grid_size() > 1_000_000_000_000);
    }

    #[test]
    fn test_grid_order() {
        let b = bounds();
        let points = b.points();
        assert_eq!(points.len() as u64, b.grid_size());
        assert_eq!(b.grid_size(), 2 * 3 * 5);
        assert_eq!((points[0].width_mm, points[0].depth_mm), (230.0, 400.0));
        assert_eq!((points[1].width_mm, points[1].depth_mm), (230.0, 450.0));
        assert_eq!(points[15].concrete, ConcreteGrade::M25);
        assert!(points.iter().enumerate().all(|(i, p)| p.index == i));
    }

    #[test]
    fn test_validation() {
        assert!(bounds().validate(BarSize::D8).is_ok());

        let mut narrow = bounds();
        narrow.width = RangeSpec::new(60.0, 300.0, 25.0);
        assert!(narrow.validate(BarSize::D8).is_err());

        let mut shallow = bounds();
        shallow.depth = RangeSpec::new(60.0, 600.0, 50.0);
        assert!(shallow.validate(BarSize::D8).is_err());

        let mut inverted = bounds();
        inverted.depth = RangeSpec::new(600.0, 400.0, 50.0);
        assert!(inverted.validate(BarSize::D8).is_err());

        let mut no_grades = bounds();
        no_grades.steels.clear();
        assert_eq!(no_grades.validate(BarSize::D8).unwrap_err().error_code(), "MISSING_FIELD");
    }

    #[test]
    fn test_flange_must_cover_widest_web() {
        let mut b = bounds();
        b.flange = Some(Flange {
            width_mm: 270.0,
            thickness_mm: 120.0,
        });
        assert!(b.validate(BarSize::D8).is_err());
        b.flange = Some(Flange {
            width_mm: 1000.0,
            thickness_mm: 120.0,
        });
        assert!(b.validate(BarSize::D8).is_ok());
    }

    #[test]
    fn test_section_at_point() {
        let b = bounds();
        let point = b.points()[0];
        let section = b.section_at(&point, BarSize::D8).unwrap();
        assert_eq!(section.effective_depth_mm(), 400.0 - 25.0 - 8.0 - 10.0);
        assert_eq!(section.concrete(), ConcreteGrade::M20);
    }
}
