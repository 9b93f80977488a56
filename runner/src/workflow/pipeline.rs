//! File pipeline: read a file from disk, run the workflow, build a report.
//!
//! ```text
//! path ──▶ read_file ──▶ baseline checks ──▶ process_workflow ──▶ WorkflowReport
//!          (encoding,    (optional)          (operations)
//!           delimiter)
//! ```
//!
//! Progress goes to a [`RunLog`]; with `RunOptions::quiet` nothing is echoed
//! to stderr but subscribers still see every event.

use std::path::Path;

use super::process_workflow_with_log;
use crate::config::RunOptions;
use crate::error::{RunResult, WorkflowResult};
use crate::logs::{RunEvent, RunLog};
use crate::params::ParamBinding;
use crate::parser::{read_file, WorkflowFile};
use crate::report::WorkflowReport;
use crate::schema::{load_workflow_schema, ValidationFailure, WorkflowSchema};
use crate::validation::baseline_failures;

/// Run the workflow on an in-memory file, with baseline checks when enabled.
///
/// Baseline failures come first, followed by the operations' failures.
pub fn check_workflow_file(
    schema: &WorkflowSchema,
    file: &WorkflowFile,
    binding: &ParamBinding,
    options: &RunOptions,
    log: &RunLog,
) -> RunResult<Vec<ValidationFailure>> {
    let mut failures = Vec::new();

    if options.baseline_checks {
        let baseline = baseline_failures(&file.data);
        log.emit(RunEvent::BaselineChecked {
            failures: baseline.len(),
        });
        failures.extend(baseline);
    }

    failures.extend(process_workflow_with_log(file, binding, schema, log)?);
    Ok(failures)
}

/// Read `path` and check it against an already loaded schema, reporting to `log`.
pub fn run_workflow_file_with_log<P: AsRef<Path>>(
    schema: &WorkflowSchema,
    path: P,
    binding: &ParamBinding,
    options: &RunOptions,
    log: &RunLog,
) -> WorkflowResult<WorkflowReport> {
    let read = read_file(path, options)?;
    let file = read.file;
    log.emit(RunEvent::FileRead {
        file: file.file_name.clone(),
        encoding: read.encoding,
        delimiter: read.delimiter,
        columns: file.data.headers.len(),
        rows: file.data.row_count(),
    });

    let failures = check_workflow_file(schema, &file, binding, options, log)?;
    let report = WorkflowReport::new(&file, failures);

    log.emit(RunEvent::RunFinished {
        file: report.file.clone(),
        passed: report.passed,
        failures: report.failures.len(),
    });

    Ok(report)
}

/// Read `path` and check it against an already loaded schema.
pub fn run_workflow_file_with_schema<P: AsRef<Path>>(
    schema: &WorkflowSchema,
    path: P,
    binding: &ParamBinding,
    options: &RunOptions,
) -> WorkflowResult<WorkflowReport> {
    run_workflow_file_with_log(schema, path, binding, options, &RunLog::global(options))
}

/// Load the schema at `schema_path`, then read and check `path`.
pub fn run_workflow_file<S: AsRef<Path>, P: AsRef<Path>>(
    schema_path: S,
    path: P,
    binding: &ParamBinding,
    options: &RunOptions,
) -> WorkflowResult<WorkflowReport> {
    let log = RunLog::global(options);
    let schema = load_workflow_schema(schema_path)?;
    log.emit(RunEvent::SchemaLoaded {
        operations: schema.operations().len(),
        fieldset_schemas: schema.fieldset_schemas().count(),
    });

    run_workflow_file_with_log(&schema, path, binding, options, &log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RunError, WorkflowError};
    use crate::logs::{LogBroadcaster, LogEntry};
    use crate::params::ParamValue;
    use crate::parser::CsvData;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE_SCHEMA: &str = include_str!("../../fixtures/sample_schema.json");
    const BAD_CSV: &str = include_str!("../../fixtures/bad.csv");

    fn quiet() -> RunOptions {
        RunOptions {
            quiet: true,
            ..RunOptions::default()
        }
    }

    fn subjects() -> ParamBinding {
        ParamBinding::new().with(
            "allowed_subjects",
            ParamValue::list(["Math", "History", "Science"]),
        )
    }

    fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_run_from_disk() {
        let schema = temp_file(".json", SAMPLE_SCHEMA);
        let csv = temp_file(".csv", BAD_CSV);

        let report = run_workflow_file(schema.path(), csv.path(), &subjects(), &quiet()).unwrap();

        assert!(!report.passed);
        assert_eq!(report.row_count, 12);
        assert_eq!(report.file_type.as_deref(), Some("csv"));
        assert_eq!(report.row_level_failures, 1);
        assert_eq!(report.failures[0].row_number, Some(9));
    }

    #[test]
    fn test_semicolon_file_detected() {
        let schema = WorkflowSchema::from_json(SAMPLE_SCHEMA).unwrap();
        let csv = temp_file(".csv", &BAD_CSV.replace(',', ";"));

        let report =
            run_workflow_file_with_schema(&schema, csv.path(), &subjects(), &quiet()).unwrap();
        assert_eq!(report.columns, vec!["studentName", "subject", "grade"]);
        assert_eq!(report.failures.len(), 1);
    }

    #[test]
    fn test_wrong_extension_is_a_failure() {
        let schema = WorkflowSchema::from_json(SAMPLE_SCHEMA).unwrap();
        let csv = temp_file(".txt", &BAD_CSV.replace("Math,E", "Math,A"));

        let report =
            run_workflow_file_with_schema(&schema, csv.path(), &subjects(), &quiet()).unwrap();
        assert_eq!(report.file_level_failures, 1);
        assert!(report.failures[0].message.contains("expected file type `csv`"));
    }

    #[test]
    fn test_configuration_error_propagates() {
        let schema = WorkflowSchema::from_json(SAMPLE_SCHEMA).unwrap();
        let csv = temp_file(".csv", BAD_CSV);

        let err = run_workflow_file_with_schema(&schema, csv.path(), &ParamBinding::new(), &quiet())
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Run(RunError::MissingParameter(_))));
    }

    #[test]
    fn test_baseline_failures_come_first() {
        let schema = WorkflowSchema::from_json(SAMPLE_SCHEMA).unwrap();
        let mut rows: Vec<Vec<&str>> = BAD_CSV
            .lines()
            .skip(1)
            .map(|line| line.split(',').collect())
            .collect();
        rows[0].push("stray");
        let file = WorkflowFile::new(
            "grades.csv",
            CsvData::from_rows(&["studentName", "subject", "grade"], &rows),
        );

        let broadcaster = LogBroadcaster::new();
        let log = RunLog::silent(&broadcaster);
        let failures = check_workflow_file(&schema, &file, &subjects(), &quiet(), &log).unwrap();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].row_number, Some(1));
        assert_eq!(failures[1].row_number, Some(9));

        let without = RunOptions {
            baseline_checks: false,
            ..quiet()
        };
        let failures = check_workflow_file(&schema, &file, &subjects(), &without, &log).unwrap();
        assert_eq!(failures.len(), 1);
    }

    #[test]
    fn test_quiet_run_reports_to_subscribers() {
        let schema = WorkflowSchema::from_json(SAMPLE_SCHEMA).unwrap();
        let csv = temp_file(".csv", BAD_CSV);
        let broadcaster = LogBroadcaster::new();
        let mut rx = broadcaster.subscribe();

        let log = RunLog::new(&broadcaster, &quiet());
        assert!(!log.echoes());
        run_workflow_file_with_log(&schema, csv.path(), &subjects(), &quiet(), &log).unwrap();

        let events: Vec<RunEvent> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|entry: LogEntry| entry.event)
            .collect();

        assert!(matches!(
            &events[0],
            RunEvent::FileRead { columns: 3, rows: 12, delimiter: ',', .. }
        ));
        assert_eq!(events[1], RunEvent::BaselineChecked { failures: 0 });
        // Two events per operation
        assert_eq!(events.len(), 2 + 2 * schema.operations().len() + 1);
        assert!(matches!(
            events.last(),
            Some(RunEvent::RunFinished { passed: false, failures: 1, .. })
        ));
    }

    #[test]
    fn test_global_log_follows_quiet_option() {
        assert!(!RunLog::global(&quiet()).echoes());
        assert!(RunLog::global(&RunOptions::default()).echoes());
    }
}
