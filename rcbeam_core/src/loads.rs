//! # Factored Load Demand
//!
//! Moments and shears are given, already factored; this engine does no
//! structural analysis. Values are in the engine's fixed units (kN·m, kN)
//! and are rejected at construction when negative or non-finite.

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_non_negative, CalcError, CalcResult};
use crate::units::{KiloNewtonMetres, KiloNewtons, NewtonMillimetres, Newtons};

#[derive(Debug, Clone, Deserialize)]
struct LoadDemandFields {
    moment_knm: f64,
    shear_kn: f64,
    #[serde(default)]
    axial_kn: Option<f64>,
}

/// Factored design actions at the critical section.
///
/// ## JSON Example
///
/// ```json
/// { "moment_knm": 220.0, "shear_kn": 180.0 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LoadDemandFields")]
pub struct LoadDemand {
    moment_knm: f64,
    shear_kn: f64,
    /// Factored axial compression, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    axial_kn: Option<f64>,
}

impl TryFrom<LoadDemandFields> for LoadDemand {
    type Error = CalcError;

    fn try_from(f: LoadDemandFields) -> Result<Self, Self::Error> {
        let demand = LoadDemand::new(f.moment_knm, f.shear_kn)?;
        match f.axial_kn {
            Some(axial) => demand.with_axial(axial),
            None => Ok(demand),
        }
    }
}

impl LoadDemand {
    /// Build a moment/shear demand.
    ///
    /// ```rust
    /// use rcbeam_core::loads::LoadDemand;
    ///
    /// let demand = LoadDemand::new(150.0, 90.0).unwrap();
    /// assert_eq!(demand.moment_nmm(), 150.0e6);
    /// assert!(LoadDemand::new(-1.0, 90.0).is_err());
    /// ```
    pub fn new(moment_knm: f64, shear_kn: f64) -> CalcResult<Self> {
        ensure_non_negative("moment_knm", moment_knm)?;
        ensure_non_negative("shear_kn", shear_kn)?;
        Ok(LoadDemand {
            moment_knm,
            shear_kn,
            axial_kn: None,
        })
    }

    /// Add a factored axial compression (kN).
    pub fn with_axial(mut self, axial_kn: f64) -> CalcResult<Self> {
        ensure_non_negative("axial_kn", axial_kn)?;
        self.axial_kn = Some(axial_kn);
        Ok(self)
    }

    pub fn moment_knm(&self) -> f64 {
        self.moment_knm
    }

    pub fn shear_kn(&self) -> f64 {
        self.shear_kn
    }

    pub fn axial_kn(&self) -> Option<f64> {
        self.axial_kn
    }

    /// Factored moment in N·mm
    pub fn moment_nmm(&self) -> f64 {
        NewtonMillimetres::from(KiloNewtonMetres(self.moment_knm)).0
    }

    /// Factored shear in N
    pub fn shear_n(&self) -> f64 {
        Newtons::from(KiloNewtons(self.shear_kn)).0
    }

    /// Factored axial compression in N (zero when absent)
    pub fn axial_n(&self) -> f64 {
        self.axial_kn.map_or(0.0, |a| Newtons::from(KiloNewtons(a)).0)
    }
}
