//! # Unit Types
//!
//! Type-safe wrappers for the engine's unit system. The engine works in one
//! fixed system, encoded in field suffixes:
//!
//! - Length: millimetres (`_mm`), spans included
//! - Area: square millimetres (`_mm2`)
//! - Stress: N/mm² (`_mpa`)
//! - Force: kilonewtons (`_kn`)
//! - Moment: kilonewton-metres (`_knm`)
//!
//! Formulas run in N and N·mm; the newtypes below do that conversion in one
//! place. Callers holding metres or other units convert at the boundary with
//! the same types before building a request.
//!
//! ## Example
//!
//! ```rust
//! use rcbeam_core::units::{KiloNewtonMetres, Metres, Millimetres, NewtonMillimetres};
//!
//! let span: Millimetres = Metres(5.0).into();
//! assert_eq!(span.0, 5000.0);
//!
//! let moment: NewtonMillimetres = KiloNewtonMetres(150.0).into();
//! assert_eq!(moment.0, 150.0e6);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

// ============================================================================
// Length Units
// ============================================================================

/// Length in millimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimetres(pub f64);

/// Length in metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metres(pub f64);

impl From<Metres> for Millimetres {
    fn from(m: Metres) -> Self {
        Millimetres(m.0 * 1000.0)
    }
}

impl From<Millimetres> for Metres {
    fn from(mm: Millimetres) -> Self {
        Metres(mm.0 / 1000.0)
    }
}

// ============================================================================
// Force Units
// ============================================================================

/// Force in newtons
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Newtons(pub f64);

/// Force in kilonewtons
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KiloNewtons(pub f64);

impl From<KiloNewtons> for Newtons {
    fn from(kn: KiloNewtons) -> Self {
        Newtons(kn.0 * 1000.0)
    }
}

impl From<Newtons> for KiloNewtons {
    fn from(n: Newtons) -> Self {
        KiloNewtons(n.0 / 1000.0)
    }
}

// ============================================================================
// Moment Units
// ============================================================================

/// Moment in newton-millimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NewtonMillimetres(pub f64);

/// Moment in kilonewton-metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KiloNewtonMetres(pub f64);

impl From<KiloNewtonMetres> for NewtonMillimetres {
    fn from(knm: KiloNewtonMetres) -> Self {
        NewtonMillimetres(knm.0 * 1.0e6)
    }
}

impl From<NewtonMillimetres> for KiloNewtonMetres {
    fn from(nmm: NewtonMillimetres) -> Self {
        KiloNewtonMetres(nmm.0 / 1.0e6)
    }
}

// ============================================================================
// Arithmetic
// ============================================================================

macro_rules! impl_linear_ops {
    ($($t:ident),*) => {
        $(
            impl Add for $t {
                type Output = $t;
                fn add(self, rhs: $t) -> $t {
                    $t(self.0 + rhs.0)
                }
            }

            impl Sub for $t {
                type Output = $t;
                fn sub(self, rhs: $t) -> $t {
                    $t(self.0 - rhs.0)
                }
            }

            impl Mul<f64> for $t {
                type Output = $t;
                fn mul(self, rhs: f64) -> $t {
                    $t(self.0 * rhs)
                }
            }
        )*
    };
}

impl_linear_ops!(Millimetres, Metres, Newtons, KiloNewtons, NewtonMillimetres, KiloNewtonMetres);

// ============================================================================
// Physical constants used by the cost model
// ============================================================================

/// Density of reinforcing steel (kg/m³)
pub const STEEL_DENSITY_KG_M3: f64 = 7850.0;

/// Density of reinforced concrete (kg/m³)
pub const CONCRETE_DENSITY_KG_M3: f64 = 2500.0;

/// Cubic millimetres per cubic metre
pub const MM3_PER_M3: f64 = 1.0e9;

/// Square millimetres per square metre
pub const MM2_PER_M2: f64 = 1.0e6;

/// Cross-sectional area of a round bar (mm²)
pub fn bar_area_mm2(diameter_mm: f64) -> f64 {
    std::f64::consts::PI * diameter_mm * diameter_mm / 4.0
}
