//! Concrete Grades
//!
//! Characteristic cube strengths for the grades the design tables cover.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Concrete grade (characteristic compressive strength fck in MPa)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConcreteGrade {
    M15,
    M20,
    M25,
    M30,
    M35,
    M40,
}

impl ConcreteGrade {
    /// All concrete grades, weakest first
    pub const ALL: [ConcreteGrade; 6] = [
        ConcreteGrade::M15,
        ConcreteGrade::M20,
        ConcreteGrade::M25,
        ConcreteGrade::M30,
        ConcreteGrade::M35,
        ConcreteGrade::M40,
    ];

    /// Characteristic compressive strength fck (MPa)
    pub fn fck_mpa(&self) -> f64 {
        match self {
            ConcreteGrade::M15 => 15.0,
            ConcreteGrade::M20 => 20.0,
            ConcreteGrade::M25 => 25.0,
            ConcreteGrade::M30 => 30.0,
            ConcreteGrade::M35 => 35.0,
            ConcreteGrade::M40 => 40.0,
        }
    }

    /// Row index into grade-keyed tables
    pub(crate) fn table_index(&self) -> usize {
        match self {
            ConcreteGrade::M15 => 0,
            ConcreteGrade::M20 => 1,
            ConcreteGrade::M25 => 2,
            ConcreteGrade::M30 => 3,
            ConcreteGrade::M35 => 4,
            ConcreteGrade::M40 => 5,
        }
    }

    /// Parse from common string representations ("M25", "m25", "25")
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        let trimmed = s.trim().to_uppercase();
        let digits = trimmed.strip_prefix('M').unwrap_or(&trimmed);
        match digits {
            "15" => Ok(ConcreteGrade::M15),
            "20" => Ok(ConcreteGrade::M20),
            "25" => Ok(ConcreteGrade::M25),
            "30" => Ok(ConcreteGrade::M30),
            "35" => Ok(ConcreteGrade::M35),
            "40" => Ok(ConcreteGrade::M40),
            _ => Err(CalcError::material_not_found(s)),
        }
    }

    /// Display name
    pub fn display_name(&self) -> &'static str {
        match self {
            ConcreteGrade::M15 => "M15",
            ConcreteGrade::M20 => "M20",
            ConcreteGrade::M25 => "M25",
            ConcreteGrade::M30 => "M30",
            ConcreteGrade::M35 => "M35",
            ConcreteGrade::M40 => "M40",
        }
    }
}

impl std::fmt::Display for ConcreteGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fck_ordering() {
        let values: Vec<f64> = ConcreteGrade::ALL.iter().map(|g| g.fck_mpa()).collect();
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_flexible_parse() {
        assert_eq!(ConcreteGrade::from_str_flexible("m25").unwrap(), ConcreteGrade::M25);
        assert_eq!(ConcreteGrade::from_str_flexible(" 30 ").unwrap(), ConcreteGrade::M30);
        assert!(ConcreteGrade::from_str_flexible("M55").is_err());
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&ConcreteGrade::M20).unwrap();
        assert_eq!(json, "\"M20\"");
    }
}
