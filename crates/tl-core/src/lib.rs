//! Core domain logic for the task log analyzer.
//!
//! This crate contains the fundamental types and logic for:
//! - Event parsing: turning tokenized log rows into START/END events
//! - Reconciliation: pairing START and END events by process ID
//! - Classification: grading completed task durations against thresholds
//!
//! It performs no I/O. Callers tokenize the log themselves and hand the rows
//! over as [`RawRecord`]s.

pub mod classify;
pub mod event;
mod reconcile;
pub mod types;

pub use classify::{Severity, Thresholds, classify, format_duration};
pub use event::{EventKind, MalformedRecord, RawEvent, RawRecord, TIME_FORMAT, UnknownEventKind};
pub use reconcile::{
    CompletedTask, DanglingStart, Diagnostic, OpenTask, OpenTaskTable, Reconciler,
    Reconciliation, reconcile,
};
pub use types::{ProcessId, ValidationError};
