//! Configuration loading for the Payroll Engine.
//!
//! This module loads the tax bracket table and the attendance policy from
//! `payroll.yaml`. A malformed bracket table is an error, never replaced by
//! the defaults.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config").unwrap().into_config();
//! println!("Standard shift: {}h", config.attendance.standard_hours);
//! ```

mod loader;
mod types;

pub use loader::{CONFIG_FILE_NAME, ConfigLoader};
pub use types::{PayrollConfig, PayrollConfigFile};
