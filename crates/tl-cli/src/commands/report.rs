//! Report command for task log analysis.
//!
//! Reads a log, reconciles START/END pairs, and renders the result either as
//! human-readable lines or as JSON (`--json`).

use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use tl_core::{
    CompletedTask, DanglingStart, Diagnostic, ProcessId, Reconciliation, Severity, TIME_FORMAT,
    Thresholds, format_duration, reconcile,
};

use crate::input;

// ========== Text Output ==========

/// Formats a single completed-task line.
///
/// The severity prefix is omitted for [`Severity::Ok`].
pub fn format_task(task: &CompletedTask, severity: Severity) -> String {
    let prefix = match severity {
        Severity::Ok => String::new(),
        other => format!("{other} - "),
    };
    format!(
        "{prefix}{} (PID {}) took {} from {} to {}",
        task.description,
        task.process_id,
        format_duration(task.duration),
        task.start.format(TIME_FORMAT),
        task.end.format(TIME_FORMAT)
    )
}

/// Formats a single incomplete-task line.
pub fn format_dangling(start: &DanglingStart) -> String {
    format!(
        "INCOMPLETE - {} (PID {}) started at {}",
        start.description,
        start.process_id,
        start.start.format(TIME_FORMAT)
    )
}

/// Formats the human-readable report.
///
/// Diagnostics come first, then one line per completed task, then the
/// incomplete-task section if any task never ended.
pub fn format_report(result: &Reconciliation, thresholds: &Thresholds) -> String {
    let mut output = String::new();

    for diagnostic in &result.diagnostics {
        writeln!(output, "{diagnostic}").unwrap();
    }

    for task in &result.completed {
        let severity = thresholds.classify(task.duration);
        writeln!(output, "{}", format_task(task, severity)).unwrap();
    }

    if !result.dangling.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "  Tasks that started but did not end:").unwrap();
        for start in &result.dangling {
            writeln!(output, "{}", format_dangling(start)).unwrap();
        }
    }

    output
}

// ========== JSON Output ==========

/// JSON report structure.
#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub tasks: Vec<JsonTask>,
    pub incomplete: Vec<JsonIncomplete>,
    pub diagnostics: Vec<JsonDiagnostic>,
    pub totals: JsonTotals,
}

#[derive(Debug, Serialize)]
pub struct JsonTask {
    pub description: String,
    pub pid: ProcessId,
    pub start: String,
    pub end: String,
    pub duration_secs: i64,
    pub severity: Severity,
}

#[derive(Debug, Serialize)]
pub struct JsonIncomplete {
    pub description: String,
    pub pid: ProcessId,
    pub start: String,
}

#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Default, Serialize)]
pub struct JsonTotals {
    pub ok: usize,
    pub warning: usize,
    pub error: usize,
    pub incomplete: usize,
    pub diagnostics: usize,
}

/// Formats the report as JSON.
pub fn format_report_json(result: &Reconciliation, thresholds: &Thresholds) -> Result<String> {
    let mut totals = JsonTotals {
        incomplete: result.dangling.len(),
        diagnostics: result.diagnostics.len(),
        ..JsonTotals::default()
    };

    let tasks = result
        .completed
        .iter()
        .map(|task| {
            let severity = thresholds.classify(task.duration);
            match severity {
                Severity::Ok => totals.ok += 1,
                Severity::Warning => totals.warning += 1,
                Severity::Error => totals.error += 1,
            }
            JsonTask {
                description: task.description.clone(),
                pid: task.process_id.clone(),
                start: task.start.format(TIME_FORMAT).to_string(),
                end: task.end.format(TIME_FORMAT).to_string(),
                duration_secs: task.duration.num_seconds(),
                severity,
            }
        })
        .collect();

    let incomplete = result
        .dangling
        .iter()
        .map(|start| JsonIncomplete {
            description: start.description.clone(),
            pid: start.process_id.clone(),
            start: start.start.format(TIME_FORMAT).to_string(),
        })
        .collect();

    let diagnostics = result
        .diagnostics
        .iter()
        .map(|diagnostic: &Diagnostic| JsonDiagnostic {
            kind: diagnostic.kind(),
            message: diagnostic.to_string(),
        })
        .collect();

    let report = JsonReport {
        tasks,
        incomplete,
        diagnostics,
        totals,
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

// ========== Public Interface ==========

/// Runs the report command against the log at `path`.
pub fn run<W: Write>(
    writer: &mut W,
    path: &Path,
    thresholds: &Thresholds,
    json: bool,
) -> Result<()> {
    let records = input::read_records(path)?;
    let result = reconcile(&records);

    if json {
        let output = format_report_json(&result, thresholds)?;
        writeln!(writer, "{output}")?;
    } else {
        write!(writer, "{}", format_report(&result, thresholds))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveTime};
    use insta::assert_snapshot;
    use tl_core::RawRecord;

    fn time(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn make_task(description: &str, pid: &str, start: NaiveTime, end: NaiveTime) -> CompletedTask {
        CompletedTask {
            description: description.to_string(),
            process_id: ProcessId::from(pid),
            start,
            end,
            duration: end - start,
        }
    }

    fn sample_reconciliation() -> Reconciliation {
        let rows = [
            ["09:00:00", "Build", "START", "1"],
            ["09:12:00", "Build", "END", "1"],
            ["09:05:00", "Test", "START", "2"],
            ["10:00:00", "Lint", "START", "3"],
            ["10:06:00", "Lint", "END", "3"],
            ["10:01:00", "Deploy", "START", "4"],
            ["10:03:15", "Deploy", "END", "4"],
            ["10:30:00", "X", "END", "9"],
        ];
        let records: Vec<RawRecord> = rows
            .iter()
            .zip(1..)
            .map(|(row, line)| RawRecord::new(line, *row))
            .collect();
        reconcile(&records)
    }

    #[test]
    fn test_format_task_ok_has_no_prefix() {
        let task = make_task("scheduled task 032", "37980", time(11, 35, 23), time(11, 38, 0));
        assert_eq!(
            format_task(&task, Severity::Ok),
            "scheduled task 032 (PID 37980) took 2m37s from 11:35:23 to 11:38:00"
        );
    }

    #[test]
    fn test_format_task_warning_prefix() {
        let task = make_task("scheduled task test", "12345", time(11, 0, 0), time(11, 6, 0));
        assert_eq!(
            format_task(&task, Severity::Warning),
            "WARNING - scheduled task test (PID 12345) took 6m0s from 11:00:00 to 11:06:00"
        );
    }

    #[test]
    fn test_format_dangling() {
        let start = DanglingStart {
            description: "Test".to_string(),
            process_id: ProcessId::from("2"),
            start: time(9, 5, 0),
        };
        assert_eq!(
            format_dangling(&start),
            "INCOMPLETE - Test (PID 2) started at 09:05:00"
        );
    }

    #[test]
    fn test_report_empty() {
        let output = format_report(&Reconciliation::default(), &Thresholds::default());
        assert!(output.is_empty());
    }

    #[test]
    fn test_report_without_dangling_has_no_section() {
        let result = Reconciliation {
            completed: vec![make_task("Build", "1", time(9, 0, 0), time(9, 1, 0))],
            ..Reconciliation::default()
        };
        let output = format_report(&result, &Thresholds::default());
        assert!(!output.contains("did not end"));
    }

    #[test]
    fn test_report_text_output() {
        let output = format_report(&sample_reconciliation(), &Thresholds::default());
        assert_snapshot!(output, @r"
        Unmatched END for PID 9 at 10:30:00
        ERROR - Build (PID 1) took 12m0s from 09:00:00 to 09:12:00
        WARNING - Lint (PID 3) took 6m0s from 10:00:00 to 10:06:00
        Deploy (PID 4) took 2m15s from 10:01:00 to 10:03:15

          Tasks that started but did not end:
        INCOMPLETE - Test (PID 2) started at 09:05:00
        ");
    }

    #[test]
    fn test_report_respects_custom_thresholds() {
        let thresholds = Thresholds::from_minutes(2, 20).unwrap();
        let output = format_report(&sample_reconciliation(), &thresholds);
        assert!(output.contains("WARNING - Build (PID 1)"));
        assert!(output.contains("WARNING - Deploy (PID 4)"));
    }

    #[test]
    fn test_report_json_output() {
        let output =
            format_report_json(&sample_reconciliation(), &Thresholds::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["tasks"].as_array().unwrap().len(), 3);
        assert_eq!(value["tasks"][0]["pid"], "1");
        assert_eq!(value["tasks"][0]["duration_secs"], 720);
        assert_eq!(value["tasks"][0]["severity"], "ERROR");
        assert_eq!(value["incomplete"][0]["start"], "09:05:00");
        assert_eq!(value["diagnostics"][0]["kind"], "unmatched_end");
        assert_eq!(value["totals"]["ok"], 1);
        assert_eq!(value["totals"]["warning"], 1);
        assert_eq!(value["totals"]["error"], 1);
        assert_eq!(value["totals"]["incomplete"], 1);
        assert_eq!(value["totals"]["diagnostics"], 1);
    }

    #[test]
    fn test_run_writes_report_for_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.log");
        std::fs::write(
            &path,
            "11:00:00,scheduled task long,START,67890\n11:12:00,scheduled task long,END,67890\n",
        )
        .unwrap();

        let mut output = Vec::new();
        run(&mut output, &path, &Thresholds::default(), false).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_eq!(
            output,
            "ERROR - scheduled task long (PID 67890) took 12m0s from 11:00:00 to 11:12:00\n"
        );
    }

    #[test]
    fn test_run_fails_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut output = Vec::new();
        let result = run(
            &mut output,
            &dir.path().join("nope.log"),
            &Thresholds::default(),
            false,
        );
        assert!(result.is_err());
        assert!(output.is_empty());
    }

    #[test]
    fn test_zero_duration_reported_as_ok() {
        let task = make_task("Ping", "7", time(9, 0, 0), time(9, 0, 0));
        assert_eq!(task.duration, Duration::zero());
        assert_eq!(
            format_task(&task, Thresholds::default().classify(task.duration)),
            "Ping (PID 7) took 0s from 09:00:00 to 09:00:00"
        );
    }
}
