use serde::Serialize;

use notelytics_parser::RawExport;

use crate::analysis::Analysis;
use crate::calculator::apply_engagement_metrics;
use crate::columns::normalize_columns;
use crate::error::AnalyzeError;
use crate::report::AggregateReport;
use crate::sanitizer::sanitize_rows;

/// One uploaded file: its name (used for the sheet name) and raw bytes.
#[derive(Debug)]
pub struct FileInput<'a> {
    pub filename: &'a str,
    pub contents: &'a [u8],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Analyzed,
    Skipped,
}

/// Per-file outcome of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub filename: String,
    pub status: FileStatus,
    pub sheet_name: Option<String>,
    pub note_count: Option<usize>,
    pub dropped_rows: Option<usize>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total_files: usize,
    pub analyzed: usize,
    pub skipped: usize,
    pub files: Vec<FileReport>,
}

/// The accumulated report plus the per-file records of a batch run.
#[derive(Debug)]
pub struct BatchOutcome {
    pub report: AggregateReport,
    pub file_reports: Vec<FileReport>,
}

impl BatchOutcome {
    pub fn summary(&self) -> BatchSummary {
        let analyzed = self
            .file_reports
            .iter()
            .filter(|report| report.status == FileStatus::Analyzed)
            .count();
        BatchSummary {
            total_files: self.file_reports.len(),
            analyzed,
            skipped: self.file_reports.len() - analyzed,
            files: self.file_reports.clone(),
        }
    }
}

/// Runs the full per-file pipeline on an already-decoded export: normalize
/// headers, filter and order rows, derive the engagement metrics.
pub fn analyze_export(raw: &RawExport) -> Result<Analysis, AnalyzeError> {
    let normalized = normalize_columns(&raw.df)?;
    let sanitized = sanitize_rows(&normalized)?;
    let df = apply_engagement_metrics(&sanitized.df)?;
    Ok(Analysis::new(
        df,
        sanitized.dropped_rows,
        sanitized.date_range,
    )?)
}

/// Decodes and analyzes one export file.
pub fn analyze_bytes(contents: &[u8]) -> Result<Analysis, AnalyzeError> {
    let raw = notelytics_parser::parse_export(contents)?;
    analyze_export(&raw)
}

/// Processes every input in order. A failing file is recorded and skipped;
/// it never aborts the batch or keeps later files from being analyzed.
pub fn process_batch(inputs: &[FileInput<'_>]) -> BatchOutcome {
    let mut report = AggregateReport::new();
    let mut file_reports = Vec::with_capacity(inputs.len());

    for input in inputs {
        match analyze_bytes(input.contents) {
            Ok(analysis) => {
                let note_count = analysis.note_count();
                let dropped_rows = analysis.dropped_rows;
                let sheet_name = report.insert(input.filename, analysis);
                tracing::info!(
                    "analyzed '{}': {note_count} notes ({dropped_rows} dropped) -> sheet '{sheet_name}'",
                    input.filename
                );
                file_reports.push(FileReport {
                    filename: input.filename.to_string(),
                    status: FileStatus::Analyzed,
                    sheet_name: Some(sheet_name),
                    note_count: Some(note_count),
                    dropped_rows: Some(dropped_rows),
                    error: None,
                });
            }
            Err(err) => {
                tracing::warn!("skipping '{}': {err}", input.filename);
                file_reports.push(FileReport {
                    filename: input.filename.to_string(),
                    status: FileStatus::Skipped,
                    sheet_name: None,
                    note_count: None,
                    dropped_rows: None,
                    error: Some(err.to_string()),
                });
            }
        }
    }

    BatchOutcome {
        report,
        file_reports,
    }
}
