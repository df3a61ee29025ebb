//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the payroll
//! configuration from a YAML file.

use std::fs;
use std::path::Path;

use crate::calculation::{AttendancePolicy, TaxBracketTable};
use crate::error::{EngineError, EngineResult};

use super::types::{PayrollConfig, PayrollConfigFile};

/// The file name looked up inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "payroll.yaml";

/// Loads and provides access to the payroll configuration.
///
/// # Directory Structure
///
/// ```text
/// config/
/// └── payroll.yaml   # Tax brackets and attendance policy
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config").unwrap();
/// println!("{} tax brackets", loader.tax_brackets().brackets().len());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `payroll.yaml` is missing (`ConfigNotFound`)
    /// - the file contains invalid YAML or misses a required field
    ///   (`ConfigParseError`)
    /// - the bracket table is malformed (`InvalidTaxConfiguration`)
    /// - `attendance.standard_hours` is not in `(0, 24]` (`Validation`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let file_path = path.as_ref().join(CONFIG_FILE_NAME);
        let raw = Self::load_yaml::<PayrollConfigFile>(&file_path)?;
        let config = raw.validate()?;

        tracing::info!(
            path = %file_path.display(),
            brackets = config.tax_brackets.brackets().len(),
            expected_clock_in = %config.attendance.expected_clock_in,
            standard_hours = %config.attendance.standard_hours,
            "Loaded payroll configuration"
        );

        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> PayrollConfig {
        self.config
    }

    /// The validated tax bracket table.
    pub fn tax_brackets(&self) -> &TaxBracketTable {
        &self.config.tax_brackets
    }

    /// The attendance policy.
    pub fn attendance(&self) -> &AttendancePolicy {
        &self.config.attendance
    }
}
