//! START/END reconciliation.
//!
//! Pairs START and END events that share a process ID into completed tasks.
//!
//! # Algorithm Summary
//!
//! 1. Fold records left to right, keeping a table of open tasks keyed by PID
//! 2. A START opens (or silently replaces) the entry for its PID
//! 3. An END closes the entry for its PID, unless it is earlier than the start
//! 4. Whatever is still open at the end of input is reported as dangling
//!
//! Record-level problems never abort the fold. They are collected as
//! [`Diagnostic`]s alongside the results.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use chrono::{Duration, NaiveTime};

use crate::event::{EventKind, MalformedRecord, RawEvent, RawRecord, TIME_FORMAT};
use crate::types::ProcessId;

/// A task that has started and not yet ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTask {
    pub description: String,
    pub start: NaiveTime,
}

/// Open tasks keyed by process ID. At most one entry per PID.
pub type OpenTaskTable = HashMap<ProcessId, OpenTask>;

/// A START matched with its END.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedTask {
    pub description: String,
    pub process_id: ProcessId,
    pub start: NaiveTime,
    pub end: NaiveTime,
    /// `end - start`, never negative.
    pub duration: Duration,
}

/// A START with no END by the end of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingStart {
    pub description: String,
    pub process_id: ProcessId,
    pub start: NaiveTime,
}

/// A non-fatal data-quality observation raised while reconciling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The record was skipped without touching any state.
    MalformedRecord { line: u64, reason: MalformedRecord },

    /// An END arrived for a PID with no open task.
    UnmatchedEnd {
        process_id: ProcessId,
        timestamp: NaiveTime,
    },

    /// An END arrived earlier than its START. The task stays open.
    NegativeDuration {
        process_id: ProcessId,
        start: NaiveTime,
        end: NaiveTime,
    },
}

impl Diagnostic {
    /// Stable machine-readable tag for this diagnostic.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MalformedRecord { .. } => "malformed_record",
            Self::UnmatchedEnd { .. } => "unmatched_end",
            Self::NegativeDuration { .. } => "negative_duration",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedRecord { line, reason } => {
                write!(f, "Skipping line {line}: {reason}")
            }
            Self::UnmatchedEnd {
                process_id,
                timestamp,
            } => write!(
                f,
                "Unmatched END for PID {process_id} at {}",
                timestamp.format(TIME_FORMAT)
            ),
            Self::NegativeDuration {
                process_id,
                start,
                end,
            } => write!(
                f,
                "ERROR - END time earlier than START time for PID {process_id}: {} < {}",
                end.format(TIME_FORMAT),
                start.format(TIME_FORMAT)
            ),
        }
    }
}

/// Output of a reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Completed tasks, in the order their END records appeared.
    pub completed: Vec<CompletedTask>,
    /// Starts that never ended, ordered by start time then PID.
    pub dangling: Vec<DanglingStart>,
    /// Diagnostics, in input order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Incremental reconciler owning its open-task table.
///
/// Each instance is independent, so separate logs can be reconciled
/// concurrently with separate reconcilers.
#[derive(Debug, Default)]
pub struct Reconciler {
    open: OpenTaskTable,
    completed: Vec<CompletedTask>,
    diagnostics: Vec<Diagnostic>,
}

impl Reconciler {
    /// Creates a reconciler with an empty open-task table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the tasks currently open.
    pub const fn open_tasks(&self) -> &OpenTaskTable {
        &self.open
    }

    /// Folds one tokenized record into the reconciliation state.
    pub fn apply(&mut self, record: &RawRecord) {
        match RawEvent::from_record(record) {
            Ok(Some(event)) => self.apply_event(event),
            Ok(None) => {
                tracing::trace!(line = record.line, "ignoring record with unknown event kind");
            }
            Err(reason) => {
                tracing::debug!(line = record.line, %reason, "skipping malformed record");
                self.diagnostics.push(Diagnostic::MalformedRecord {
                    line: record.line,
                    reason,
                });
            }
        }
    }

    /// Folds one parsed event into the reconciliation state.
    pub fn apply_event(&mut self, event: RawEvent) {
        let RawEvent {
            timestamp,
            description,
            kind,
            process_id,
        } = event;

        match kind {
            EventKind::Start => {
                let task = OpenTask {
                    description,
                    start: timestamp,
                };
                // Last START wins; the replaced entry is dropped without a diagnostic.
                if let Some(previous) = self.open.insert(process_id.clone(), task) {
                    tracing::debug!(
                        pid = %process_id,
                        previous_start = %previous.start,
                        "START replaced an open task"
                    );
                }
            }
            EventKind::End => match self.open.entry(process_id) {
                Entry::Vacant(vacant) => {
                    self.diagnostics.push(Diagnostic::UnmatchedEnd {
                        process_id: vacant.into_key(),
                        timestamp,
                    });
                }
                Entry::Occupied(occupied) if timestamp < occupied.get().start => {
                    self.diagnostics.push(Diagnostic::NegativeDuration {
                        start: occupied.get().start,
                        end: timestamp,
                        process_id: occupied.key().clone(),
                    });
                }
                Entry::Occupied(occupied) => {
                    let (process_id, open) = occupied.remove_entry();
                    self.completed.push(CompletedTask {
                        description: open.description,
                        duration: timestamp - open.start,
                        start: open.start,
                        end: timestamp,
                        process_id,
                    });
                }
            },
        }
    }

    /// Ends the fold, turning every task still open into a dangling start.
    pub fn finish(self) -> Reconciliation {
        let mut dangling: Vec<DanglingStart> = self
            .open
            .into_iter()
            .map(|(process_id, task)| DanglingStart {
                description: task.description,
                process_id,
                start: task.start,
            })
            .collect();
        dangling.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then_with(|| a.process_id.cmp(&b.process_id))
        });

        tracing::debug!(
            completed = self.completed.len(),
            dangling = dangling.len(),
            diagnostics = self.diagnostics.len(),
            "reconciliation finished"
        );

        Reconciliation {
            completed: self.completed,
            dangling,
            diagnostics: self.diagnostics,
        }
    }
}

/// Reconciles a complete sequence of records in one pass.
pub fn reconcile(records: &[RawRecord]) -> Reconciliation {
    let mut reconciler = Reconciler::new();
    for record in records {
        reconciler.apply(record);
    }
    reconciler.finish()
}
