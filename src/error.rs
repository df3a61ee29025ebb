//! Error types for the Payroll Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the calculators, the write path and the report
//! aggregator can produce.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{LeaveStatus, RecordId};

/// The main error type for the Payroll Engine.
///
/// Calculators never catch their own errors; they return one of these
/// variants and the caller decides whether to retry, surface or abort.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::InvalidTaxConfiguration {
///     message: "bracket table is empty".to_string(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "Invalid tax configuration: bracket table is empty"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed or missing input, reported before any store interaction.
    #[error("Invalid value for '{field}': {message}")]
    Validation {
        /// The input field that failed validation.
        field: String,
        /// A description of the problem.
        message: String,
    },

    /// An attendance record already exists for the employee on that date.
    #[error("Attendance already recorded for employee {employee_id} on {date}")]
    DuplicateAttendance {
        /// The employee the record belongs to.
        employee_id: RecordId,
        /// The calendar date of the record.
        date: NaiveDate,
    },

    /// A unique key other than (employee, date) was violated.
    #[error("Duplicate {entity} key: {key}")]
    DuplicateKey {
        /// The kind of entity being written.
        entity: String,
        /// The conflicting key value.
        key: String,
    },

    /// A leave request was mutated outside the `pending` state.
    #[error("Cannot {action} leave request {request_id}: it has already been {status}")]
    InvalidStateTransition {
        /// The leave request identifier.
        request_id: RecordId,
        /// The status the request currently holds.
        status: LeaveStatus,
        /// The attempted action (e.g. "approve").
        action: String,
    },

    /// A date range whose end precedes its start.
    #[error("Invalid date range: end {end} is before start {start}")]
    InvalidRange {
        /// The start of the range.
        start: NaiveDate,
        /// The end of the range.
        end: NaiveDate,
    },

    /// The tax bracket table is malformed.
    #[error("Invalid tax configuration: {message}")]
    InvalidTaxConfiguration {
        /// A description of what is wrong with the table.
        message: String,
    },

    /// The record store could not complete the transaction.
    #[error("Record store unavailable: {message}")]
    StoreUnavailable {
        /// A description of the store failure.
        message: String,
    },

    /// A record referenced by id does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// The kind of entity looked up.
        entity: String,
        /// The identifier that was not found.
        id: RecordId,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A monetary sum left the representable range.
    #[error("Arithmetic overflow while computing {context}")]
    Overflow {
        /// The quantity being computed.
        context: String,
    },

    /// An export sink rejected a table.
    #[error("Export failed: {message}")]
    Export {
        /// A description of the sink failure.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::Validation`] error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`EngineError::NotFound`] error.
    pub fn not_found(entity: impl Into<String>, id: RecordId) -> Self {
        EngineError::NotFound {
            entity: entity.into(),
            id,
        }
    }

    /// Returns true when the caller may retry the operation unchanged.
    ///
    /// Only store failures are transient; every other variant describes
    /// a problem with the input or the configuration.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::StoreUnavailable { .. })
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
