//! Identifiers assigned by the record store.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned to a persisted record by the record store.
///
/// A record that has not been written yet carries `RecordId::default()`
/// (zero); the store replaces it on insert.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        RecordId(value)
    }
}
