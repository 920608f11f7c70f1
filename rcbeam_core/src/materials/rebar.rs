//! Reinforcing Steel
//!
//! Steel grades and the closed catalog of standard bar diameters. A bar size
//! outside the catalog cannot be constructed or deserialized, so every layout
//! the engine sees is buildable from stock bars.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::units::bar_area_mm2;

/// Reinforcing steel grade (characteristic yield strength fy in MPa)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SteelGrade {
    /// Mild steel, fy = 250 MPa
    Fe250,
    /// HYSD bars, fy = 415 MPa
    Fe415,
    /// HYSD bars, fy = 500 MPa
    Fe500,
}

impl SteelGrade {
    /// All steel grades
    pub const ALL: [SteelGrade; 3] = [SteelGrade::Fe250, SteelGrade::Fe415, SteelGrade::Fe500];

    /// Characteristic yield strength fy (MPa)
    pub fn fy_mpa(&self) -> f64 {
        match self {
            SteelGrade::Fe250 => 250.0,
            SteelGrade::Fe415 => 415.0,
            SteelGrade::Fe500 => 500.0,
        }
    }

    /// Design yield strength used for stirrups, capped at 415 MPa
    pub fn stirrup_fy_mpa(&self) -> f64 {
        self.fy_mpa().min(415.0)
    }

    pub(crate) fn table_index(&self) -> usize {
        match self {
            SteelGrade::Fe250 => 0,
            SteelGrade::Fe415 => 1,
            SteelGrade::Fe500 => 2,
        }
    }

    /// Parse from common string representations ("Fe415", "fe 415", "415")
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        let normalized = s.trim().to_uppercase().replace([' ', '-', '_'], "");
        let digits = normalized.strip_prefix("FE").unwrap_or(&normalized);
        match digits {
            "250" => Ok(SteelGrade::Fe250),
            "415" => Ok(SteelGrade::Fe415),
            "500" => Ok(SteelGrade::Fe500),
            _ => Err(CalcError::material_not_found(s)),
        }
    }

    /// Display name
    pub fn display_name(&self) -> &'static str {
        match self {
            SteelGrade::Fe250 => "Fe250",
            SteelGrade::Fe415 => "Fe415",
            SteelGrade::Fe500 => "Fe500",
        }
    }
}

impl std::fmt::Display for SteelGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Standard bar diameter from the stock catalog.
///
/// Serializes as the plain diameter in millimetres (`16`, not `"D16"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum BarSize {
    D6,
    D8,
    D10,
    D12,
    D16,
    D20,
    D25,
    D28,
    D32,
    D36,
    D40,
}

impl BarSize {
    /// Full catalog, smallest first
    pub const ALL: [BarSize; 11] = [
        BarSize::D6,
        BarSize::D8,
        BarSize::D10,
        BarSize::D12,
        BarSize::D16,
        BarSize::D20,
        BarSize::D25,
        BarSize::D28,
        BarSize::D32,
        BarSize::D36,
        BarSize::D40,
    ];

    /// Nominal diameter (mm)
    pub fn diameter_mm(&self) -> u32 {
        match self {
            BarSize::D6 => 6,
            BarSize::D8 => 8,
            BarSize::D10 => 10,
            BarSize::D12 => 12,
            BarSize::D16 => 16,
            BarSize::D20 => 20,
            BarSize::D25 => 25,
            BarSize::D28 => 28,
            BarSize::D32 => 32,
            BarSize::D36 => 36,
            BarSize::D40 => 40,
        }
    }

    /// Nominal diameter as f64 (mm)
    pub fn diameter(&self) -> f64 {
        f64::from(self.diameter_mm())
    }

    /// Cross-sectional area of one bar (mm²)
    pub fn area_mm2(&self) -> f64 {
        bar_area_mm2(self.diameter())
    }

    /// Squared diameter, an exact integer proxy for area (area = π/4 · d²)
    pub fn area_key(&self) -> u64 {
        u64::from(self.diameter_mm()).pow(2)
    }

    /// Look up a catalog size by diameter
    pub fn from_diameter(diameter_mm: u32) -> CalcResult<Self> {
        BarSize::ALL
            .iter()
            .copied()
            .find(|b| b.diameter_mm() == diameter_mm)
            .ok_or_else(|| CalcError::material_not_found(format!("{} mm bar", diameter_mm)))
    }
}

impl TryFrom<u32> for BarSize {
    type Error = CalcError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        BarSize::from_diameter(value)
    }
}

impl From<BarSize> for u32 {
    fn from(size: BarSize) -> u32 {
        size.diameter_mm()
    }
}

impl std::fmt::Display for BarSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}mm", self.diameter_mm())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steel_parse() {
        assert_eq!(SteelGrade::from_str_flexible("fe 415").unwrap(), SteelGrade::Fe415);
        assert_eq!(SteelGrade::from_str_flexible("Fe-500").unwrap(), SteelGrade::Fe500);
        assert!(SteelGrade::from_str_flexible("Fe550").is_err());
    }

    #[test]
    fn test_stirrup_fy_cap() {
        assert_eq!(SteelGrade::Fe500.stirrup_fy_mpa(), 415.0);
        assert_eq!(SteelGrade::Fe250.stirrup_fy_mpa(), 250.0);
    }

    #[test]
    fn test_bar_catalog_serialization() {
        let json = serde_json::to_string(&BarSize::D16).unwrap();
        assert_eq!(json, "16");
        let parsed: BarSize = serde_json::from_str("25").unwrap();
        assert_eq!(parsed, BarSize::D25);
        assert!(serde_json::from_str::<BarSize>("18").is_err());
    }

    #[test]
    fn test_catalog_sorted() {
        assert!(BarSize::ALL.windows(2).all(|w| w[0].diameter_mm() < w[1].diameter_mm()));
        assert!(BarSize::ALL.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_area_key_matches_area() {
        for bar in BarSize::ALL {
            let from_key = std::f64::consts::PI / 4.0 * bar.area_key() as f64;
            assert!((from_key - bar.area_mm2()).abs() < 1e-9);
        }
    }
}
