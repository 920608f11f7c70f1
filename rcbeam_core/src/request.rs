//! # Requests and Run Records
//!
//! JSON envelopes for the two entry points and the record that wraps every
//! result. Envelopes carry a schema version (checked by [`crate::file_io`]
//! when loaded from disk); records carry a run id, timestamp and the engine
//! and table versions that produced them.
//!
//! ## Structure
//!
//! ```text
//! CheckRequest                     DesignRequest
//! ├── schema_version               ├── schema_version
//! ├── label (optional)             ├── label (optional)
//! └── check: CheckInput            └── design: DesignProblem
//!     ├── section                      ├── demand, span, bounds
//!     ├── demand                       ├── cost (CostProfile)
//!     ├── span                         ├── objective, budget
//!     ├── layout                       └── ductility_enabled
//!     └── ductility_enabled
//! ```
//!
//! ## Example
//!
//! ```rust
//! use rcbeam_core::request::CheckRequest;
//!
//! let json = r#"{
//!   "schema_version": "0.1.0",
//!   "check": {
//!     "section": { "width_mm": 300, "overall_depth_mm": 500, "effective_depth_mm": 457,
//!                  "clear_cover_mm": 25, "concrete": "M20", "steel": "Fe415" },
//!     "demand": { "moment_knm": 100, "shear_kn": 80 },
//!     "span": { "length_mm": 5000 },
//!     "layout": {
//!       "tension": [{ "diameter_mm": 20, "count": 3 }],
//!       "stirrups": { "diameter_mm": 8, "legs": 2, "spacing_mm": 150 }
//!     }
//!   }
//! }"#;
//! let request: CheckRequest = serde_json::from_str(json).unwrap();
//! assert!(!request.check.ductility_enabled);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::code_tables::TABLE_SET_VERSION;
use crate::compliance::{self, ComplianceVerdict};
use crate::config::EngineConfig;
use crate::errors::CalcResult;
use crate::loads::LoadDemand;
use crate::optimizer::{self, DesignProblem, SearchReport};
use crate::reinforcement::ReinforcementLayout;
use crate::section::{BeamSection, BeamSpan};

/// Current schema version for request and corpus files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Version of this engine build
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Envelopes that carry a schema version
pub trait Versioned {
    fn schema_version(&self) -> &str;
}

/// A fully specified candidate to check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInput {
    pub section: BeamSection,
    pub demand: LoadDemand,
    pub span: BeamSpan,
    pub layout: ReinforcementLayout,
    #[serde(default)]
    pub ductility_enabled: bool,
}

impl CheckInput {
    pub fn run(&self, config: &EngineConfig) -> ComplianceVerdict {
        compliance::check(
            &self.section,
            &self.demand,
            &self.span,
            &self.layout,
            self.ductility_enabled,
            config,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRequest {
    pub schema_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub check: CheckInput,
}

impl CheckRequest {
    pub fn new(check: CheckInput) -> Self {
        CheckRequest {
            schema_version: SCHEMA_VERSION.to_string(),
            label: None,
            check,
        }
    }

    pub fn run(&self, config: &EngineConfig) -> ComplianceVerdict {
        self.check.run(config)
    }
}

impl Versioned for CheckRequest {
    fn schema_version(&self) -> &str {
        &self.schema_version
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignRequest {
    pub schema_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub design: DesignProblem,
}

impl DesignRequest {
    pub fn new(design: DesignProblem) -> Self {
        DesignRequest {
            schema_version: SCHEMA_VERSION.to_string(),
            label: None,
            design,
        }
    }

    pub fn run(&self, config: &EngineConfig) -> CalcResult<SearchReport> {
        optimizer::optimize(&self.design, config)
    }
}

impl Versioned for DesignRequest {
    fn schema_version(&self) -> &str {
        &self.schema_version
    }
}

/// A result together with where and when it was produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord<T> {
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub engine_version: String,
    pub table_version: String,
    pub schema_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub result: T,
}

impl<T> RunRecord<T> {
    pub fn new(label: Option<String>, result: T) -> Self {
        RunRecord {
            run_id: Uuid::new_v4(),
            created_at: Utc::now(),
            engine_version: ENGINE_VERSION.to_string(),
            table_version: TABLE_SET_VERSION.to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            label,
            result,
        }
    }
}

impl<T> Versioned for RunRecord<T> {
    fn schema_version(&self) -> &str {
        &self.schema_version
    }
}
