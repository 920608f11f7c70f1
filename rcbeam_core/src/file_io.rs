//! # File I/O Module
//!
//! Loads request and corpus files and saves run records:
//! - **Atomic saves**: write to `.tmp`, fsync, rename over the target so an
//!   interrupted write never leaves a truncated record
//! - **Version validation**: every loaded envelope's `schema_version` must be
//!   compatible with [`SCHEMA_VERSION`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use rcbeam_core::config::EngineConfig;
//! use rcbeam_core::file_io::{load_check_request, save_record};
//! use rcbeam_core::request::RunRecord;
//! use std::path::Path;
//!
//! let request = load_check_request(Path::new("beam.json"))?;
//! let verdict = request.run(&EngineConfig::default());
//! save_record(&RunRecord::new(request.label.clone(), verdict), Path::new("beam.verdict.json"))?;
//! # Ok::<(), rcbeam_core::errors::CalcError>(())
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use semver::Version;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{CalcError, CalcResult};
use crate::parity::ParityCorpus;
use crate::request::{CheckRequest, DesignRequest, Versioned, SCHEMA_VERSION};

/// Load a versioned JSON envelope.
///
/// # Returns
///
/// * `Err(CalcError::FileError)` - I/O error
/// * `Err(CalcError::SerializationError)` - Invalid JSON or invalid values
/// * `Err(CalcError::VersionMismatch)` - Incompatible schema version
pub fn load_versioned<T: DeserializeOwned + Versioned>(path: &Path) -> CalcResult<T> {
    let contents = fs::read_to_string(path)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;

    let value: T = serde_json::from_str(&contents)
        .map_err(|e| CalcError::serialization(format!("Invalid JSON in {}: {}", path.display(), e)))?;

    validate_version(value.schema_version())?;
    Ok(value)
}

pub fn load_check_request(path: &Path) -> CalcResult<CheckRequest> {
    load_versioned(path)
}

pub fn load_design_request(path: &Path) -> CalcResult<DesignRequest> {
    load_versioned(path)
}

pub fn load_parity_corpus(path: &Path) -> CalcResult<ParityCorpus> {
    load_versioned(path)
}

/// Temp file written next to `path` before the rename
fn temp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// Save any serializable value as pretty JSON with atomic write semantics.
///
/// The save process:
/// 1. Serialize to JSON
/// 2. Write to a temporary file (`<path>.tmp`)
/// 3. Sync to disk (fsync)
/// 4. Rename over `path` (atomic on most filesystems)
pub fn save_record<T: Serialize>(record: &T, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(record).map_err(|e| CalcError::serialization(e.to_string()))?;

    let tmp_path = temp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

/// Check a file's schema version against [`SCHEMA_VERSION`].
///
/// Major versions must match. While the schema is 0.x, a file with a newer
/// minor version than this build is rejected.
pub fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };
    let file = Version::parse(file_version).map_err(|_| mismatch())?;
    let current = Version::parse(SCHEMA_VERSION).map_err(|e| CalcError::Internal {
        message: format!("schema version constant: {}", e),
    })?;

    if file.major != current.major {
        return Err(mismatch());
    }
    if current.major == 0 && file.minor > current.minor {
        return Err(mismatch());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RunRecord;
    use std::env::temp_dir;

    fn temp_file(name: &str) -> PathBuf {
        temp_dir().join(format!("rcbeam_test_{}_{}.json", name, std::process::id()))
    }

    const REQUEST: &str = r#"{
        "schema_version": "0.1.0",
        "label": "B1",
        "check": {
            "section": { "width_mm": 300, "overall_depth_mm": 500, "effective_depth_mm": 457,
                         "clear_cover_mm": 25, "concrete": "M20", "steel": "Fe415" },
            "demand": { "moment_knm": 100, "shear_kn": 80 },
            "span": { "length_mm": 5000 },
            "layout": {
                "tension": [{ "diameter_mm": 20, "count": 3 }],
                "stirrups": { "diameter_mm": 8, "legs": 2, "spacing_mm": 150 }
            }
        }
    }"#;

    #[test]
    fn test_temp_path() {
        assert_eq!(temp_path_for(Path::new("/out/run.json")), Path::new("/out/run.json.tmp"));
    }

    #[test]
    fn test_load_check_request() {
        let path = temp_file("load");
        fs::write(&path, REQUEST).unwrap();
        let request = load_check_request(&path).unwrap();
        assert_eq!(request.label.as_deref(), Some("B1"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_newer_schema_rejected() {
        let path = temp_file("newer");
        fs::write(&path, REQUEST.replace("0.1.0", "0.2.0")).unwrap();
        let err = load_check_request(&path).unwrap_err();
        assert_eq!(err.error_code(), "VERSION_MISMATCH");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file() {
        let err = load_check_request(Path::new("/nonexistent/rcbeam.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_atomic_save_creates_no_tmp_file() {
        let path = temp_file("atomic");
        let record = RunRecord::new(None, vec![1.0, 2.0]);
        save_record(&record, &path).unwrap();

        assert!(!temp_path_for(&path).exists());
        let back: RunRecord<Vec<f64>> = load_versioned(&path).unwrap();
        assert_eq!(back.run_id, record.run_id);
        assert_eq!(back.result, vec![1.0, 2.0]);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.0").is_ok());
        assert!(validate_version("0.1.5").is_ok());
        assert!(validate_version("0.0.9").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("0.1").is_err());
    }
}
