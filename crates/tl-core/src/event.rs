//! Raw log records and the START/END events parsed from them.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ProcessId;

/// Time-of-day format used by the log, 24-hour `HH:MM:SS`.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// One tokenized log row, as handed over by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based line in the source file.
    pub line: u64,
    /// Column values in source order.
    pub fields: Vec<String>,
}

impl RawRecord {
    /// Creates a record from any iterable of column values.
    pub fn new<I, S>(line: u64, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            line,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// Why a record could not be turned into an event.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedRecord {
    /// The row has fewer than the four required columns.
    #[error("expected 4 fields, found {found}")]
    TooFewFields { found: usize },

    /// The timestamp column is not `HH:MM:SS`.
    #[error("invalid time format: {value}")]
    InvalidTimestamp { value: String },
}

/// Lifecycle marker carried in the event column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventKind {
    Start,
    End,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Start => "START",
            Self::End => "END",
        };
        write!(f, "{s}")
    }
}

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "START" => Ok(Self::Start),
            "END" => Ok(Self::End),
            _ => Err(UnknownEventKind(s.to_string())),
        }
    }
}

/// Error type for unrecognized event column values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event kind: {0}")]
pub struct UnknownEventKind(String);

/// A parsed START or END event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub timestamp: NaiveTime,
    pub description: String,
    pub kind: EventKind,
    pub process_id: ProcessId,
}

impl RawEvent {
    /// Parses a tokenized record.
    ///
    /// Checks run in order: column count, timestamp, event kind. Returns
    /// `Ok(None)` for rows whose event column is neither `START` nor `END`;
    /// those are not errors and carry no diagnostic. Surrounding whitespace
    /// is trimmed from every column and columns past the fourth are ignored.
    pub fn from_record(record: &RawRecord) -> Result<Option<Self>, MalformedRecord> {
        let [timestamp, description, kind, process_id, ..] = record.fields.as_slice() else {
            return Err(MalformedRecord::TooFewFields {
                found: record.fields.len(),
            });
        };

        let timestamp = timestamp.trim();
        let timestamp =
            parse_timestamp(timestamp).ok_or_else(|| MalformedRecord::InvalidTimestamp {
                value: timestamp.to_string(),
            })?;

        let Ok(kind) = kind.trim().parse::<EventKind>() else {
            return Ok(None);
        };

        Ok(Some(Self {
            timestamp,
            description: description.trim().to_string(),
            kind,
            process_id: ProcessId::new(process_id.trim()),
        }))
    }
}

/// Parses a strict two-digit `HH:MM:SS` time of day.
///
/// chrono alone accepts single-digit fields and a leap second of `60`;
/// both are rejected here.
fn parse_timestamp(value: &str) -> Option<NaiveTime> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 8
        && bytes.iter().enumerate().all(|(i, b)| match i {
            2 | 5 => *b == b':',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return None;
    }

    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .ok()
        .filter(|t| t.nanosecond() < 1_000_000_000)
}
