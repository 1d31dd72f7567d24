//! Core types shared by every pipeline stage.

mod error;
mod record;

pub use error::{Error, Result};
pub use record::{
    AccessibilityFinding, AccessibilitySummary, AccessibilityTotals, ErrorObservation,
    NetworkObservation, OutcomeClass, Severity, TestStatus, TestUnitRecord,
};
