//! # Materials
//!
//! Concrete grades, reinforcing steel grades, and the stock bar catalog.
//!
//! ## Example
//!
//! ```rust
//! use rcbeam_core::materials::{BarSize, ConcreteGrade, SteelGrade};
//!
//! let fck = ConcreteGrade::M25.fck_mpa();
//! let fy = SteelGrade::Fe500.fy_mpa();
//! let area = BarSize::D20.area_mm2();
//! assert!(fck < fy && area > 314.0);
//! ```

pub mod concrete;
pub mod rebar;

pub use concrete::ConcreteGrade;
pub use rebar::{BarSize, SteelGrade};
