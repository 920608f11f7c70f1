//! # Engine Configuration
//!
//! Tunable engine behaviour that is not part of a single request: the bar
//! catalog used by bar selection, stirrup defaults, spacing rounding, the
//! doubly-reinforced permission, the grid ceiling, and the ductile detailing
//! constants. Loaded from TOML; every section falls back to its defaults, so an
//! empty file is a valid configuration.
//!
//! ## TOML Example
//!
//! ```toml
//! [bars]
//! longitudinal = [12, 16, 20, 25]
//! stirrup = 8
//! max_layers = 2
//!
//! [shear]
//! min_spacing_mm = 75.0
//! spacing_step_mm = 5.0
//!
//! [search]
//! max_grid_points = 5000
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::code_tables::{DEFAULT_MIN_STIRRUP_SPACING_MM, DEFAULT_STIRRUP_SPACING_STEP_MM};
use crate::errors::{CalcError, CalcResult};
use crate::materials::BarSize;
use crate::reinforcement::BarSpacingRules;

/// Bar catalog and arrangement limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarConfig {
    /// Diameters bar selection may use for longitudinal steel
    pub longitudinal: Vec<BarSize>,
    /// Stirrup diameter used in design mode
    pub stirrup: BarSize,
    /// Stirrup legs used in design mode
    pub stirrup_legs: u32,
    /// Maximum number of tension layers
    pub max_layers: u8,
    /// Nominal maximum aggregate size (mm)
    pub aggregate_size_mm: f64,
}

impl Default for BarConfig {
    fn default() -> Self {
        BarConfig {
            longitudinal: vec![
                BarSize::D10,
                BarSize::D12,
                BarSize::D16,
                BarSize::D20,
                BarSize::D25,
                BarSize::D32,
            ],
            stirrup: BarSize::D8,
            stirrup_legs: 2,
            max_layers: 2,
            aggregate_size_mm: 20.0,
        }
    }
}

/// Stirrup spacing rounding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShearConfig {
    /// Practical minimum stirrup spacing (mm)
    pub min_spacing_mm: f64,
    /// Design spacing is rounded down to a multiple of this step (mm)
    pub spacing_step_mm: f64,
}

impl Default for ShearConfig {
    fn default() -> Self {
        ShearConfig {
            min_spacing_mm: DEFAULT_MIN_STIRRUP_SPACING_MM,
            spacing_step_mm: DEFAULT_STIRRUP_SPACING_STEP_MM,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlexureConfig {
    /// Permit compression steel when the moment exceeds the singly-reinforced limit
    pub allow_doubly_reinforced: bool,
}

impl Default for FlexureConfig {
    fn default() -> Self {
        FlexureConfig {
            allow_doubly_reinforced: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Engine-wide ceiling on design grid size
    pub max_grid_points: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_grid_points: 20_000,
        }
    }
}

/// Ductile detailing constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuctilityConfig {
    /// Minimum tension steel ratio coefficient: ρmin = k·√fck/fy
    pub min_tension_coefficient: f64,
    /// Maximum tension steel percentage of b·d
    pub max_tension_percent: f64,
    /// Minimum continuous tension bars
    pub min_tension_bars: u32,
    /// Minimum stirrup diameter (mm)
    pub min_stirrup_diameter_mm: f64,
    /// Stirrup spacing ≤ this fraction of d
    pub spacing_depth_fraction: f64,
    /// Stirrup spacing ≤ this multiple of the smallest longitudinal bar
    pub spacing_bar_multiple: f64,
    /// Absolute stirrup spacing ceiling (mm)
    pub max_spacing_mm: f64,
}

impl Default for DuctilityConfig {
    fn default() -> Self {
        DuctilityConfig {
            min_tension_coefficient: 0.24,
            max_tension_percent: 2.5,
            min_tension_bars: 2,
            min_stirrup_diameter_mm: 8.0,
            spacing_depth_fraction: 0.25,
            spacing_bar_multiple: 8.0,
            max_spacing_mm: 100.0,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub bars: BarConfig,
    pub shear: ShearConfig,
    pub flexure: FlexureConfig,
    pub search: SearchConfig,
    pub ductility: DuctilityConfig,
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    ///
    /// ```rust
    /// use rcbeam_core::config::EngineConfig;
    ///
    /// let config = EngineConfig::from_toml_str("[bars]\nmax_layers = 3\n").unwrap();
    /// assert_eq!(config.bars.max_layers, 3);
    /// assert_eq!(config.shear.min_spacing_mm, 75.0);
    /// ```
    pub fn from_toml_str(text: &str) -> CalcResult<Self> {
        let config: EngineConfig =
            toml::from_str(text).map_err(|e| CalcError::config_error("toml", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> CalcResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;
        EngineConfig::from_toml_str(&text)
    }

    /// Check cross-field consistency.
    pub fn validate(&self) -> CalcResult<()> {
        if self.bars.longitudinal.is_empty() {
            return Err(CalcError::config_error("bars", "Longitudinal bar catalog is empty"));
        }
        if self.bars.stirrup_legs < 2 {
            return Err(CalcError::config_error("bars", "Stirrups need at least 2 legs"));
        }
        if self.bars.max_layers == 0 {
            return Err(CalcError::config_error("bars", "max_layers must be at least 1"));
        }
        if !(self.bars.aggregate_size_mm.is_finite() && self.bars.aggregate_size_mm > 0.0) {
            return Err(CalcError::config_error("bars", "aggregate_size_mm must be positive"));
        }
        if !(self.shear.spacing_step_mm.is_finite() && self.shear.spacing_step_mm > 0.0) {
            return Err(CalcError::config_error("shear", "spacing_step_mm must be positive"));
        }
        if !(self.shear.min_spacing_mm.is_finite() && self.shear.min_spacing_mm > 0.0) {
            return Err(CalcError::config_error("shear", "min_spacing_mm must be positive"));
        }
        if self.search.max_grid_points == 0 {
            return Err(CalcError::config_error("search", "max_grid_points must be at least 1"));
        }
        let d = &self.ductility;
        let positive = [
            d.min_tension_coefficient,
            d.max_tension_percent,
            d.min_stirrup_diameter_mm,
            d.spacing_depth_fraction,
            d.spacing_bar_multiple,
            d.max_spacing_mm,
        ];
        if positive.iter().any(|v| !(v.is_finite() && *v > 0.0)) {
            return Err(CalcError::config_error("ductility", "All ductility constants must be positive"));
        }
        Ok(())
    }

    /// Bar spacing rules implied by the aggregate size
    pub fn spacing_rules(&self) -> BarSpacingRules {
        BarSpacingRules {
            aggregate_size_mm: self.bars.aggregate_size_mm,
        }
    }

    /// Longitudinal catalog, sorted and deduplicated
    pub fn longitudinal_catalog(&self) -> Vec<BarSize> {
        let mut sizes = self.bars.longitudinal.clone();
        sizes.sort();
        sizes.dedup();
        sizes
    }
}
