//! Payroll Engine for HR record keeping
//!
//! This crate derives attendance metrics from clock times, tracks leave
//! requests through their approval lifecycle, computes salary records under
//! a progressive tax table, and aggregates all three into monthly payroll
//! reports and dashboard statistics.
//!
//! - [`calculation`]: pure calculators (time windows, attendance, leave, tax, salary)
//! - [`store`]: the transactional record store abstraction and its in-memory implementation
//! - [`engine`]: the validated write path and snapshot-based report entry points
//! - [`report`]: report aggregation, statistics and table export
//! - [`api`]: the HTTP surface

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod report;
pub mod store;
