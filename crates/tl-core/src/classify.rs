//! Duration classification for completed tasks.

use std::fmt;

use chrono::Duration;
use serde::Serialize;

use crate::reconcile::CompletedTask;
use crate::types::ValidationError;

/// How a completed task's duration compares to the thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Ok,
    Warning,
    Error,
}

impl Severity {
    /// Uppercase label used in reports.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Duration limits for classification.
///
/// Both comparisons are strict: a task lasting exactly `warning_after` is
/// [`Severity::Ok`] and one lasting exactly `error_after` is
/// [`Severity::Warning`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Durations above this are at least a warning.
    /// Default: 5 minutes.
    pub warning_after: Duration,

    /// Durations above this are an error.
    /// Default: 10 minutes.
    pub error_after: Duration,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warning_after: Duration::minutes(5),
            error_after: Duration::minutes(10),
        }
    }
}

impl Thresholds {
    /// Builds thresholds from whole minutes.
    ///
    /// Returns an error if the warning threshold exceeds the error threshold.
    pub fn from_minutes(warning_minutes: u32, error_minutes: u32) -> Result<Self, ValidationError> {
        if warning_minutes > error_minutes {
            return Err(ValidationError::ThresholdOrder {
                warning_minutes,
                error_minutes,
            });
        }
        Ok(Self {
            warning_after: Duration::minutes(i64::from(warning_minutes)),
            error_after: Duration::minutes(i64::from(error_minutes)),
        })
    }

    /// Classifies a duration.
    pub fn classify(&self, duration: Duration) -> Severity {
        if duration > self.error_after {
            Severity::Error
        } else if duration > self.warning_after {
            Severity::Warning
        } else {
            Severity::Ok
        }
    }
}

/// Classifies a completed task with the default thresholds.
pub fn classify(task: &CompletedTask) -> Severity {
    Thresholds::default().classify(task.duration)
}

/// Formats a duration compactly, e.g. `1h2m3s`, `12m0s` or `45s`.
///
/// Negative durations are prefixed with `-`.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.unsigned_abs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{sign}{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{sign}{minutes}m{seconds}s")
    } else {
        format!("{sign}{seconds}s")
    }
}
