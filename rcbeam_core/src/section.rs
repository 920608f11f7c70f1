//! # Beam Section Geometry
//!
//! [`BeamSection`] is an immutable, validated value: width, overall depth,
//! effective depth, clear cover, material grades, and an optional compression
//! flange. Impossible geometry is rejected when the value is built (including
//! when it is deserialized), never later inside a checker.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "width_mm": 300.0,
//!   "overall_depth_mm": 500.0,
//!   "effective_depth_mm": 450.0,
//!   "clear_cover_mm": 25.0,
//!   "concrete": "M20",
//!   "steel": "Fe415",
//!   "flange": { "width_mm": 1200.0, "thickness_mm": 120.0 }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::code_tables::SupportCondition;
use crate::errors::{ensure_positive, CalcError, CalcResult};
use crate::materials::{ConcreteGrade, SteelGrade};

/// Effective compression flange of a T- or L-beam
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Flange {
    /// Effective flange width bf (mm)
    pub width_mm: f64,
    /// Flange thickness Df (mm)
    pub thickness_mm: f64,
}

/// Raw, unvalidated section fields as they appear on the wire.
#[derive(Debug, Clone, Deserialize)]
struct BeamSectionFields {
    width_mm: f64,
    overall_depth_mm: f64,
    effective_depth_mm: f64,
    clear_cover_mm: f64,
    concrete: ConcreteGrade,
    steel: SteelGrade,
    #[serde(default)]
    flange: Option<Flange>,
}

/// Validated beam cross-section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BeamSectionFields")]
pub struct BeamSection {
    width_mm: f64,
    overall_depth_mm: f64,
    effective_depth_mm: f64,
    clear_cover_mm: f64,
    concrete: ConcreteGrade,
    steel: SteelGrade,
    #[serde(skip_serializing_if = "Option::is_none")]
    flange: Option<Flange>,
}

impl TryFrom<BeamSectionFields> for BeamSection {
    type Error = CalcError;

    fn try_from(f: BeamSectionFields) -> Result<Self, Self::Error> {
        let section = BeamSection::rectangular(
            f.width_mm,
            f.overall_depth_mm,
            f.effective_depth_mm,
            f.clear_cover_mm,
            f.concrete,
            f.steel,
        )?;
        match f.flange {
            Some(flange) => section.with_flange(flange),
            None => Ok(section),
        }
    }
}

impl BeamSection {
    /// Build a rectangular section.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when any dimension is non-positive or non-finite, or when
    /// the effective depth does not sit strictly inside `overall − cover`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rcbeam_core::section::BeamSection;
    /// use rcbeam_core::materials::{ConcreteGrade, SteelGrade};
    ///
    /// let section = BeamSection::rectangular(300.0, 500.0, 450.0, 25.0,
    ///     ConcreteGrade::M20, SteelGrade::Fe415).unwrap();
    /// assert_eq!(section.effective_depth_mm(), 450.0);
    ///
    /// // Effective depth past the cover line is impossible geometry
    /// assert!(BeamSection::rectangular(300.0, 500.0, 480.0, 25.0,
    ///     ConcreteGrade::M20, SteelGrade::Fe415).is_err());
    /// ```
    pub fn rectangular(
        width_mm: f64,
        overall_depth_mm: f64,
        effective_depth_mm: f64,
        clear_cover_mm: f64,
        concrete: ConcreteGrade,
        steel: SteelGrade,
    ) -> CalcResult<Self> {
        ensure_positive("width_mm", width_mm)?;
        ensure_positive("overall_depth_mm", overall_depth_mm)?;
        ensure_positive("effective_depth_mm", effective_depth_mm)?;
        ensure_positive("clear_cover_mm", clear_cover_mm)?;

        if clear_cover_mm >= overall_depth_mm {
            return Err(CalcError::invalid_input(
                "clear_cover_mm",
                clear_cover_mm.to_string(),
                format!("Cover must be less than overall depth {} mm", overall_depth_mm),
            ));
        }
        if 2.0 * clear_cover_mm >= width_mm {
            return Err(CalcError::invalid_input(
                "clear_cover_mm",
                clear_cover_mm.to_string(),
                format!("Cover on both faces leaves no core in a {} mm wide section", width_mm),
            ));
        }
        if effective_depth_mm >= overall_depth_mm - clear_cover_mm {
            return Err(CalcError::invalid_input(
                "effective_depth_mm",
                effective_depth_mm.to_string(),
                format!(
                    "Effective depth must be less than overall depth minus cover ({} mm)",
                    overall_depth_mm - clear_cover_mm
                ),
            ));
        }

        Ok(BeamSection {
            width_mm,
            overall_depth_mm,
            effective_depth_mm,
            clear_cover_mm,
            concrete,
            steel,
            flange: None,
        })
    }

    /// Add an effective compression flange (T- or L-beam).
    pub fn with_flange(mut self, flange: Flange) -> CalcResult<Self> {
        ensure_positive("flange.width_mm", flange.width_mm)?;
        ensure_positive("flange.thickness_mm", flange.thickness_mm)?;
        if flange.width_mm < self.width_mm {
            return Err(CalcError::invalid_input(
                "flange.width_mm",
                flange.width_mm.to_string(),
                format!("Flange width must be at least the web width {} mm", self.width_mm),
            ));
        }
        if flange.thickness_mm >= self.overall_depth_mm {
            return Err(CalcError::invalid_input(
                "flange.thickness_mm",
                flange.thickness_mm.to_string(),
                format!("Flange thickness must be less than overall depth {} mm", self.overall_depth_mm),
            ));
        }
        self.flange = Some(flange);
        Ok(self)
    }

    /// Same section with a different effective depth (re-validated).
    pub fn with_effective_depth(&self, effective_depth_mm: f64) -> CalcResult<Self> {
        let section = BeamSection::rectangular(
            self.width_mm,
            self.overall_depth_mm,
            effective_depth_mm,
            self.clear_cover_mm,
            self.concrete,
            self.steel,
        )?;
        match self.flange {
            Some(flange) => section.with_flange(flange),
            None => Ok(section),
        }
    }

    /// Web width bw (mm)
    pub fn width_mm(&self) -> f64 {
        self.width_mm
    }

    /// Overall depth D (mm)
    pub fn overall_depth_mm(&self) -> f64 {
        self.overall_depth_mm
    }

    /// Effective depth d (mm)
    pub fn effective_depth_mm(&self) -> f64 {
        self.effective_depth_mm
    }

    /// Clear cover to the stirrups (mm)
    pub fn clear_cover_mm(&self) -> f64 {
        self.clear_cover_mm
    }

    pub fn concrete(&self) -> ConcreteGrade {
        self.concrete
    }

    pub fn steel(&self) -> SteelGrade {
        self.steel
    }

    pub fn flange(&self) -> Option<Flange> {
        self.flange
    }

    /// Characteristic concrete strength fck (MPa)
    pub fn fck(&self) -> f64 {
        self.concrete.fck_mpa()
    }

    /// Characteristic steel yield strength fy (MPa)
    pub fn fy(&self) -> f64 {
        self.steel.fy_mpa()
    }

    /// Width of the compression face (flange width when flanged)
    pub fn top_width_mm(&self) -> f64 {
        self.flange.map_or(self.width_mm, |f| f.width_mm)
    }

    /// Web area bw·D (mm²), the base for maximum steel limits
    pub fn web_area_mm2(&self) -> f64 {
        self.width_mm * self.overall_depth_mm
    }

    /// Gross concrete area including any flange overhang (mm²)
    pub fn gross_area_mm2(&self) -> f64 {
        let overhang = self
            .flange
            .map_or(0.0, |f| (f.width_mm - self.width_mm) * f.thickness_mm);
        self.web_area_mm2() + overhang
    }

    /// Steel percentage of an area relative to bw·d
    pub fn steel_percent(&self, area_mm2: f64) -> f64 {
        100.0 * area_mm2 / (self.width_mm * self.effective_depth_mm)
    }

    /// Clear width between stirrup legs available to longitudinal bars (mm)
    pub fn clear_width_inside_stirrups_mm(&self, stirrup_diameter_mm: f64) -> f64 {
        self.width_mm - 2.0 * (self.clear_cover_mm + stirrup_diameter_mm)
    }
}

/// Raw span fields as they appear on the wire.
#[derive(Debug, Clone, Deserialize)]
struct BeamSpanFields {
    length_mm: f64,
    #[serde(default)]
    support: SupportCondition,
}

/// Effective span and support condition, needed by the serviceability checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BeamSpanFields")]
pub struct BeamSpan {
    length_mm: f64,
    support: SupportCondition,
}

impl TryFrom<BeamSpanFields> for BeamSpan {
    type Error = CalcError;

    fn try_from(f: BeamSpanFields) -> Result<Self, Self::Error> {
        BeamSpan::new(f.length_mm, f.support)
    }
}

impl BeamSpan {
    pub fn new(length_mm: f64, support: SupportCondition) -> CalcResult<Self> {
        ensure_positive("span.length_mm", length_mm)?;
        Ok(BeamSpan { length_mm, support })
    }

    /// Simply supported span
    pub fn simply_supported(length_mm: f64) -> CalcResult<Self> {
        BeamSpan::new(length_mm, SupportCondition::SimplySupported)
    }

    pub fn length_mm(&self) -> f64 {
        self.length_mm
    }

    pub fn support(&self) -> SupportCondition {
        self.support
    }
}
