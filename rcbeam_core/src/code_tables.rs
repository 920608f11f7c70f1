//! # Design Code Tables
//!
//! Permissible stresses, limiting ratios and modification factors for
//! limit-state design of reinforced concrete beams (IS 456:2000 reference
//! behaviour, IS 13920 for ductile detailing constants).
//!
//! ## Overview
//!
//! Every lookup here is a pure function over a `const` table. Tables that the
//! code publishes as curves or grids are interpolated linearly and clamped at
//! their end points; nothing extrapolates.
//!
//! ```text
//! xu,max/d     = f(steel grade)
//! fsc          = f(steel grade, d'/d)            linear
//! τc           = f(concrete grade, pt)           linear
//! τc,max       = f(concrete grade)
//! (L/d)basic   = f(support) × 10/span (span > 10 m)
//! kt           = f(fs, pt)                       bilinear
//! kc           = f(pc)                           linear
//! kf           = f(bw/bf)                        linear
//! ```
//!
//! ## Versioning
//!
//! [`TABLE_SET_VERSION`] changes whenever any table value changes, and
//! [`TableSet::snapshot`] dumps every table so two independent builds of the
//! engine can diff their data directly.

use serde::{Deserialize, Serialize};

use crate::config::ShearConfig;
use crate::materials::{ConcreteGrade, SteelGrade};

/// Version tag of the table data below
pub const TABLE_SET_VERSION: &str = "is456-2000/is13920-2016/r1";

// ============================================================================
// Code Clause References
// ============================================================================

/// Clause references for checks and tables, used in explanation strings.
pub mod clause {
    /// Limiting depth of neutral axis
    pub const XU_MAX: &str = "IS 456 38.1";
    /// Doubly reinforced sections, compression steel stress
    pub const COMPRESSION_STEEL: &str = "SP 16 Table F";
    /// Flanged beams
    pub const FLANGED: &str = "IS 456 Annex G-2.2";
    /// Minimum tension reinforcement
    pub const MIN_TENSION: &str = "IS 456 26.5.1.1";
    /// Maximum tension/compression reinforcement
    pub const MAX_STEEL: &str = "IS 456 26.5.1.1(b)";
    /// Design shear strength of concrete
    pub const TAU_C: &str = "IS 456 Table 19";
    /// Maximum shear stress
    pub const TAU_C_MAX: &str = "IS 456 Table 20";
    /// Shear reinforcement design
    pub const SHEAR_REINFORCEMENT: &str = "IS 456 40.4";
    /// Minimum shear reinforcement
    pub const MIN_SHEAR_REINFORCEMENT: &str = "IS 456 26.5.1.6";
    /// Maximum stirrup spacing
    pub const MAX_STIRRUP_SPACING: &str = "IS 456 26.5.1.5";
    /// Span/effective depth ratio
    pub const SPAN_DEPTH: &str = "IS 456 23.2.1";
    /// Bar spacing for crack control
    pub const CRACK_SPACING: &str = "IS 456 26.3.3";
    /// Minimum distance between bars
    pub const MIN_BAR_SPACING: &str = "IS 456 26.3.2";
    /// Ductile detailing of flexural members
    pub const DUCTILE_FLEXURE: &str = "IS 13920 6.2";
    /// Ductile detailing, transverse reinforcement
    pub const DUCTILE_SHEAR: &str = "IS 13920 6.3";
}

// ============================================================================
// Interpolation
// ============================================================================

/// Linear interpolation over ascending `xs`, clamped at both ends.
pub fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    let n = xs.len();
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[n - 1] {
        return ys[n - 1];
    }
    // First segment whose right end reaches x
    let i = xs.iter().position(|&xi| xi >= x).unwrap_or(n - 1);
    if xs[i] == x {
        return ys[i];
    }
    let (x0, x1) = (xs[i - 1], xs[i]);
    let (y0, y1) = (ys[i - 1], ys[i]);
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

// ============================================================================
// Flexure Tables
// ============================================================================

/// Limiting neutral axis depth ratio xu,max/d
pub fn xu_max_ratio(steel: SteelGrade) -> f64 {
    match steel {
        SteelGrade::Fe250 => 0.53,
        SteelGrade::Fe415 => 0.48,
        SteelGrade::Fe500 => 0.46,
    }
}

/// d'/d breakpoints for compression steel stress
pub const FSC_DEPTH_RATIOS: [f64; 4] = [0.05, 0.10, 0.15, 0.20];

/// Design stress in compression steel fsc (MPa), rows by steel grade
pub const FSC_TABLE: [[f64; 4]; 3] = [
    [217.0, 217.0, 217.0, 217.0], // Fe250
    [355.0, 353.0, 342.0, 329.0], // Fe415
    [424.0, 412.0, 395.0, 370.0], // Fe500
];

/// Design stress in compression steel at the given d'/d
pub fn compression_steel_stress(steel: SteelGrade, depth_ratio: f64) -> f64 {
    interpolate(&FSC_DEPTH_RATIOS, &FSC_TABLE[steel.table_index()], depth_ratio)
}

/// Minimum tension steel coefficient: As,min = 0.85·b·d/fy
pub const MIN_TENSION_COEFFICIENT: f64 = 0.85;

/// Maximum tension or compression steel as a fraction of gross web area
pub const MAX_STEEL_FRACTION: f64 = 0.04;

// ============================================================================
// Shear Tables
// ============================================================================

/// Tension steel percentage breakpoints for τc
pub const TAU_C_STEEL_PERCENT: [f64; 13] = [
    0.15, 0.25, 0.50, 0.75, 1.00, 1.25, 1.50, 1.75, 2.00, 2.25, 2.50, 2.75, 3.00,
];

/// Design shear strength of concrete τc (MPa), rows by concrete grade
pub const TAU_C_TABLE: [[f64; 13]; 6] = [
    [0.28, 0.35, 0.46, 0.54, 0.60, 0.64, 0.68, 0.71, 0.71, 0.71, 0.71, 0.71, 0.71], // M15
    [0.28, 0.36, 0.48, 0.56, 0.62, 0.67, 0.72, 0.75, 0.79, 0.81, 0.82, 0.82, 0.82], // M20
    [0.29, 0.36, 0.49, 0.57, 0.64, 0.70, 0.74, 0.78, 0.82, 0.85, 0.88, 0.90, 0.92], // M25
    [0.29, 0.37, 0.50, 0.59, 0.66, 0.71, 0.76, 0.80, 0.84, 0.88, 0.91, 0.94, 0.96], // M30
    [0.29, 0.37, 0.50, 0.59, 0.67, 0.73, 0.78, 0.82, 0.86, 0.90, 0.93, 0.96, 0.99], // M35
    [0.30, 0.38, 0.51, 0.60, 0.68, 0.74, 0.79, 0.84, 0.88, 0.92, 0.95, 0.98, 1.01], // M40
];

/// Maximum shear stress τc,max (MPa), by concrete grade
pub const TAU_C_MAX_TABLE: [f64; 6] = [2.5, 2.8, 3.1, 3.5, 3.7, 4.0];

/// Design shear strength of concrete for a tension steel percentage
pub fn design_shear_strength(concrete: ConcreteGrade, steel_percent: f64) -> f64 {
    interpolate(
        &TAU_C_STEEL_PERCENT,
        &TAU_C_TABLE[concrete.table_index()],
        steel_percent,
    )
}

/// Maximum shear stress with shear reinforcement
pub fn max_shear_stress(concrete: ConcreteGrade) -> f64 {
    TAU_C_MAX_TABLE[concrete.table_index()]
}

/// Enhancement of τc for members under axial compression: δ = 1 + 3Pu/(Ag·fck) ≤ 1.5
pub fn axial_enhancement(axial_n: f64, gross_area_mm2: f64, fck: f64) -> f64 {
    if axial_n <= 0.0 {
        return 1.0;
    }
    (1.0 + 3.0 * axial_n / (gross_area_mm2 * fck)).min(1.5)
}

/// Absolute ceiling on stirrup spacing (mm)
pub const STIRRUP_SPACING_CEILING_MM: f64 = 300.0;

/// Stirrup spacing ceiling as a fraction of effective depth
pub const STIRRUP_SPACING_DEPTH_FRACTION: f64 = 0.75;

/// Minimum shear reinforcement stress: Asv/(b·s) ≥ 0.4/(0.87·fyv)
pub const MIN_SHEAR_STRESS_MPA: f64 = 0.4;

/// Default practical minimum stirrup spacing (mm)
pub const DEFAULT_MIN_STIRRUP_SPACING_MM: f64 = 75.0;

/// Default rounding step for design stirrup spacing (mm)
pub const DEFAULT_STIRRUP_SPACING_STEP_MM: f64 = 5.0;

// ============================================================================
// Serviceability Tables
// ============================================================================

/// Support condition governing the basic span/depth ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SupportCondition {
    Cantilever,
    #[default]
    SimplySupported,
    Continuous,
}

impl SupportCondition {
    pub const ALL: [SupportCondition; 3] = [
        SupportCondition::Cantilever,
        SupportCondition::SimplySupported,
        SupportCondition::Continuous,
    ];

    /// Basic span/effective depth ratio for spans up to 10 m
    pub fn basic_span_depth_ratio(&self) -> f64 {
        match self {
            SupportCondition::Cantilever => 7.0,
            SupportCondition::SimplySupported => 20.0,
            SupportCondition::Continuous => 26.0,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SupportCondition::Cantilever => "Cantilever",
            SupportCondition::SimplySupported => "Simply supported",
            SupportCondition::Continuous => "Continuous",
        }
    }
}

impl std::fmt::Display for SupportCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Basic span/depth ratio adjusted for long spans (×10/span beyond 10 m)
pub fn basic_span_depth_ratio(support: SupportCondition, span_mm: f64) -> f64 {
    let basic = support.basic_span_depth_ratio();
    let span_m = span_mm / 1000.0;
    if span_m > 10.0 && support != SupportCondition::Cantilever {
        basic * 10.0 / span_m
    } else {
        basic
    }
}

/// Service stress coefficient: fs = 0.58·fy·Ast,req/Ast,prov
pub const SERVICE_STRESS_FACTOR: f64 = 0.58;

/// Steel service stress breakpoints for kt (MPa)
pub const KT_SERVICE_STRESS: [f64; 6] = [120.0, 145.0, 190.0, 240.0, 290.0, 320.0];

/// Tension steel percentage breakpoints for kt
pub const KT_STEEL_PERCENT: [f64; 12] = [0.2, 0.4, 0.6, 0.8, 1.0, 1.2, 1.4, 1.6, 1.8, 2.0, 2.5, 3.0];

/// Modification factor for tension reinforcement, rows by service stress
pub const KT_TABLE: [[f64; 12]; 6] = [
    [2.000, 2.000, 2.000, 1.815, 1.636, 1.513, 1.423, 1.353, 1.297, 1.251, 1.163, 1.099], // fs = 120
    [2.000, 2.000, 1.808, 1.584, 1.445, 1.349, 1.277, 1.220, 1.174, 1.136, 1.063, 1.010], // fs = 145
    [2.000, 1.700, 1.432, 1.288, 1.195, 1.128, 1.077, 1.037, 1.004, 0.976, 0.921, 0.881], // fs = 190
    [1.783, 1.335, 1.164, 1.067, 1.002, 0.955, 0.918, 0.889, 0.864, 0.843, 0.802, 0.772], // fs = 240
    [1.385, 1.099, 0.980, 0.911, 0.863, 0.828, 0.800, 0.777, 0.759, 0.742, 0.710, 0.686], // fs = 290
    [1.222, 0.993, 0.895, 0.837, 0.797, 0.766, 0.743, 0.723, 0.707, 0.693, 0.665, 0.644], // fs = 320
];

/// Tension modification factor kt at steel stress `fs` and percentage `pt`
pub fn tension_modification_factor(fs_mpa: f64, steel_percent: f64) -> f64 {
    let column: Vec<f64> = KT_TABLE
        .iter()
        .map(|row| interpolate(&KT_STEEL_PERCENT, row, steel_percent))
        .collect();
    interpolate(&KT_SERVICE_STRESS, &column, fs_mpa)
}

/// Compression steel percentage breakpoints for kc
pub const KC_STEEL_PERCENT: [f64; 9] = [0.0, 0.25, 0.5, 0.75, 1.0, 1.5, 2.0, 2.5, 3.0];

/// Modification factor for compression reinforcement
pub const KC_TABLE: [f64; 9] = [1.000, 1.077, 1.143, 1.200, 1.250, 1.333, 1.400, 1.455, 1.500];

/// Compression modification factor kc
pub fn compression_modification_factor(compression_percent: f64) -> f64 {
    interpolate(&KC_STEEL_PERCENT, &KC_TABLE, compression_percent)
}

/// Web/flange width ratio breakpoints for flanged beams
pub const FLANGE_WIDTH_RATIOS: [f64; 2] = [0.3, 1.0];

/// Reduction factor for flanged beams
pub const FLANGE_FACTORS: [f64; 2] = [0.8, 1.0];

/// Reduction factor kf for flanged sections (1.0 for rectangular)
pub fn flange_reduction_factor(web_to_flange_ratio: f64) -> f64 {
    interpolate(&FLANGE_WIDTH_RATIOS, &FLANGE_FACTORS, web_to_flange_ratio)
}

/// Maximum clear spacing of tension bars for crack control (mm)
pub fn crack_control_max_spacing(steel: SteelGrade) -> f64 {
    match steel {
        SteelGrade::Fe250 => 300.0,
        SteelGrade::Fe415 => 180.0,
        SteelGrade::Fe500 => 150.0,
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Serializable dump of every table, for diffing against another build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSet {
    pub version: String,
    pub xu_max_ratio: Vec<(SteelGrade, f64)>,
    pub fsc_depth_ratios: Vec<f64>,
    pub fsc_mpa: Vec<(SteelGrade, Vec<f64>)>,
    pub tau_c_steel_percent: Vec<f64>,
    pub tau_c_mpa: Vec<(ConcreteGrade, Vec<f64>)>,
    pub tau_c_max_mpa: Vec<(ConcreteGrade, f64)>,
    pub basic_span_depth: Vec<(SupportCondition, f64)>,
    pub kt_service_stress_mpa: Vec<f64>,
    pub kt_steel_percent: Vec<f64>,
    pub kt: Vec<Vec<f64>>,
    pub kc_steel_percent: Vec<f64>,
    pub kc: Vec<f64>,
    pub flange_width_ratios: Vec<f64>,
    pub flange_factors: Vec<f64>,
    pub crack_max_spacing_mm: Vec<(SteelGrade, f64)>,
    pub service_stress_factor: f64,
    pub min_tension_coefficient: f64,
    pub max_steel_fraction: f64,
    pub min_shear_stress_mpa: f64,
    pub stirrup_spacing_ceiling_mm: f64,
    pub stirrup_spacing_depth_fraction: f64,
    /// Stirrup spacing rounding in effect (config defaults unless overridden)
    pub min_stirrup_spacing_mm: f64,
    pub stirrup_spacing_step_mm: f64,
}

impl TableSet {
    /// Capture the compiled-in tables
    pub fn snapshot() -> Self {
        TableSet {
            version: TABLE_SET_VERSION.to_string(),
            xu_max_ratio: SteelGrade::ALL.iter().map(|&s| (s, xu_max_ratio(s))).collect(),
            fsc_depth_ratios: FSC_DEPTH_RATIOS.to_vec(),
            fsc_mpa: SteelGrade::ALL
                .iter()
                .map(|&s| (s, FSC_TABLE[s.table_index()].to_vec()))
                .collect(),
            tau_c_steel_percent: TAU_C_STEEL_PERCENT.to_vec(),
            tau_c_mpa: ConcreteGrade::ALL
                .iter()
                .map(|&c| (c, TAU_C_TABLE[c.table_index()].to_vec()))
                .collect(),
            tau_c_max_mpa: ConcreteGrade::ALL.iter().map(|&c| (c, max_shear_stress(c))).collect(),
            basic_span_depth: SupportCondition::ALL
                .iter()
                .map(|&s| (s, s.basic_span_depth_ratio()))
                .collect(),
            kt_service_stress_mpa: KT_SERVICE_STRESS.to_vec(),
            kt_steel_percent: KT_STEEL_PERCENT.to_vec(),
            kt: KT_TABLE.iter().map(|row| row.to_vec()).collect(),
            kc_steel_percent: KC_STEEL_PERCENT.to_vec(),
            kc: KC_TABLE.to_vec(),
            flange_width_ratios: FLANGE_WIDTH_RATIOS.to_vec(),
            flange_factors: FLANGE_FACTORS.to_vec(),
            crack_max_spacing_mm: SteelGrade::ALL
                .iter()
                .map(|&s| (s, crack_control_max_spacing(s)))
                .collect(),
            service_stress_factor: SERVICE_STRESS_FACTOR,
            min_tension_coefficient: MIN_TENSION_COEFFICIENT,
            max_steel_fraction: MAX_STEEL_FRACTION,
            min_shear_stress_mpa: MIN_SHEAR_STRESS_MPA,
            stirrup_spacing_ceiling_mm: STIRRUP_SPACING_CEILING_MM,
            stirrup_spacing_depth_fraction: STIRRUP_SPACING_DEPTH_FRACTION,
            min_stirrup_spacing_mm: DEFAULT_MIN_STIRRUP_SPACING_MM,
            stirrup_spacing_step_mm: DEFAULT_STIRRUP_SPACING_STEP_MM,
        }
    }

    /// Record the stirrup spacing rounding a configured engine actually uses
    pub fn with_shear_config(mut self, shear: &ShearConfig) -> Self {
        self.min_stirrup_spacing_mm = shear.min_spacing_mm;
        self.stirrup_spacing_step_mm = shear.spacing_step_mm;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_clamps() {
        let xs = [1.0, 2.0, 4.0];
        let ys = [10.0, 20.0, 0.0];
        assert_eq!(interpolate(&xs, &ys, 0.0), 10.0);
        assert_eq!(interpolate(&xs, &ys, 9.0), 0.0);
        assert_eq!(interpolate(&xs, &ys, 1.5), 15.0);
        assert_eq!(interpolate(&xs, &ys, 3.0), 10.0);
        assert_eq!(interpolate(&xs, &ys, 2.0), 20.0);
    }

    #[test]
    fn test_tau_c_lookup() {
        // M20 at pt = 1.0 is a table point
        assert_eq!(design_shear_strength(ConcreteGrade::M20, 1.0), 0.62);
        // Halfway between 0.50 (0.48) and 0.75 (0.56)
        assert!((design_shear_strength(ConcreteGrade::M20, 0.625) - 0.52).abs() < 1e-12);
        // Clamped below 0.15 and above 3.0
        assert_eq!(design_shear_strength(ConcreteGrade::M25, 0.05), 0.29);
        assert_eq!(design_shear_strength(ConcreteGrade::M25, 4.0), 0.92);
    }

    #[test]
    fn test_tau_c_rows_non_decreasing() {
        for row in TAU_C_TABLE.iter() {
            assert!(row.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_fsc_interpolation() {
        assert_eq!(compression_steel_stress(SteelGrade::Fe415, 0.10), 353.0);
        assert!((compression_steel_stress(SteelGrade::Fe415, 0.125) - 347.5).abs() < 1e-9);
        assert_eq!(compression_steel_stress(SteelGrade::Fe250, 0.3), 217.0);
    }

    #[test]
    fn test_kt_monotone_in_service_stress() {
        for (j, _) in KT_STEEL_PERCENT.iter().enumerate() {
            let column: Vec<f64> = KT_TABLE.iter().map(|row| row[j]).collect();
            assert!(column.windows(2).all(|w| w[0] >= w[1]));
        }
        let low = tension_modification_factor(150.0, 1.0);
        let high = tension_modification_factor(250.0, 1.0);
        assert!(low > high);
    }

    #[test]
    fn test_kt_table_points() {
        assert_eq!(tension_modification_factor(240.0, 1.0), 1.002);
        assert_eq!(tension_modification_factor(100.0, 0.1), 2.0);
    }

    #[test]
    fn test_kc_and_flange_factors() {
        assert_eq!(compression_modification_factor(0.0), 1.0);
        assert_eq!(compression_modification_factor(5.0), 1.5);
        assert_eq!(flange_reduction_factor(0.2), 0.8);
        assert_eq!(flange_reduction_factor(1.0), 1.0);
        assert!((flange_reduction_factor(0.65) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_long_span_reduction() {
        assert_eq!(basic_span_depth_ratio(SupportCondition::SimplySupported, 5000.0), 20.0);
        assert_eq!(basic_span_depth_ratio(SupportCondition::SimplySupported, 12500.0), 16.0);
        assert_eq!(basic_span_depth_ratio(SupportCondition::Cantilever, 12500.0), 7.0);
    }

    #[test]
    fn test_axial_enhancement_capped() {
        assert_eq!(axial_enhancement(0.0, 1.0e5, 20.0), 1.0);
        assert_eq!(axial_enhancement(1.0e9, 1.0e5, 20.0), 1.5);
    }

    #[test]
    fn test_snapshot_serializes() {
        let snapshot = TableSet::snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let roundtrip: TableSet = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, roundtrip);
        assert_eq!(roundtrip.version, TABLE_SET_VERSION);
    }

    #[test]
    fn test_snapshot_includes_limits() {
        let snapshot = TableSet::snapshot();
        assert_eq!(snapshot.min_tension_coefficient, 0.85);
        assert_eq!(snapshot.max_steel_fraction, 0.04);
        assert_eq!(snapshot.service_stress_factor, 0.58);
        assert_eq!(snapshot.min_shear_stress_mpa, 0.4);
        assert_eq!(snapshot.stirrup_spacing_ceiling_mm, 300.0);
        assert_eq!(snapshot.stirrup_spacing_depth_fraction, 0.75);

        let defaults = ShearConfig::default();
        assert_eq!(snapshot.min_stirrup_spacing_mm, defaults.min_spacing_mm);
        assert_eq!(snapshot.stirrup_spacing_step_mm, defaults.spacing_step_mm);

        let tuned = TableSet::snapshot().with_shear_config(&ShearConfig {
            min_spacing_mm: 100.0,
            spacing_step_mm: 10.0,
        });
        assert_eq!(tuned.min_stirrup_spacing_mm, 100.0);
        assert_eq!(tuned.stirrup_spacing_step_mm, 10.0);
        let json = serde_json::to_string(&tuned).unwrap();
        assert!(json.contains("\"stirrup_spacing_step_mm\":10.0"));
    }
}
