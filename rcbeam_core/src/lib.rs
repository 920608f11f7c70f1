//! # rcbeam_core - Reinforced Concrete Beam Design Engine
//!
//! `rcbeam_core` checks reinforced-concrete beam sections against limit-state
//! design rules and searches a bounded grid of sections for the cheapest
//! compliant design. All inputs and outputs are JSON-serializable so the
//! engine can sit behind any calling layer.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions over validated inputs
//! - **JSON-First**: All request and result types implement Serialize/Deserialize
//! - **Fail fast**: Impossible geometry is rejected when a value is built
//! - **Non-compliance is data**: A failing check is a verdict, not an error
//!
//! ## Quick Start
//!
//! ```rust
//! use rcbeam_core::compliance;
//! use rcbeam_core::config::EngineConfig;
//! use rcbeam_core::loads::LoadDemand;
//! use rcbeam_core::materials::{BarSize, ConcreteGrade, SteelGrade};
//! use rcbeam_core::reinforcement::{BarGroup, ReinforcementLayout, Stirrups};
//! use rcbeam_core::section::{BeamSection, BeamSpan};
//!
//! let section = BeamSection::rectangular(300.0, 500.0, 457.0, 25.0,
//!     ConcreteGrade::M20, SteelGrade::Fe415).unwrap();
//! let layout = ReinforcementLayout::new(
//!     vec![BarGroup::new(BarSize::D20, 3, 0)],
//!     vec![],
//!     Stirrups { bar: BarSize::D8, legs: 2, spacing_mm: 150.0 },
//! ).unwrap();
//! let verdict = compliance::check(
//!     &section,
//!     &LoadDemand::new(100.0, 80.0).unwrap(),
//!     &BeamSpan::simply_supported(5000.0).unwrap(),
//!     &layout,
//!     false,
//!     &EngineConfig::default(),
//! );
//! assert!(verdict.passed);
//! ```
//!
//! ## Modules
//!
//! - [`section`], [`loads`], [`reinforcement`] - Validated input values
//! - [`materials`], [`code_tables`] - Grades, bar catalog, versioned design tables
//! - [`checks`] - Flexure, shear, serviceability, ductility and detailing checks
//! - [`bar_selection`] - Required area to buildable bar layout
//! - [`compliance`] - Runs all checks into one verdict
//! - [`cost`] - Cost, weight and embodied carbon of a candidate
//! - [`optimizer`] - Parallel grid search and ranking
//! - [`parity`] - Tolerance-bounded comparison against another implementation
//! - [`request`], [`file_io`] - JSON envelopes, run records, atomic saves
//! - [`config`] - TOML engine configuration
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod bar_selection;
pub mod checks;
pub mod code_tables;
pub mod compliance;
pub mod config;
pub mod cost;
pub mod errors;
pub mod file_io;
pub mod loads;
pub mod materials;
pub mod optimizer;
pub mod parity;
pub mod reinforcement;
pub mod request;
pub mod section;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use compliance::ComplianceVerdict;
pub use config::EngineConfig;
pub use errors::{CalcError, CalcResult};
pub use optimizer::{optimize, DesignCandidate, DesignProblem, SearchOutcome, SearchReport};
pub use request::{CheckRequest, DesignRequest, RunRecord};
