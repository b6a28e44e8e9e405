//! crates/quiz_core/src/export.rs
//!
//! Serializes a quiz into the downloadable JSON and CSV artifacts.

use crate::domain::{QuizSchema, TableRow, DEFAULT_SUBJECT};
use serde::Serialize;

pub const CSV_HEADER: [&str; 4] = ["No.", "MCQ", "Choices", "Correct"];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to serialize the quiz as JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to write the quiz table as CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("The CSV writer produced invalid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
        }
    }
}

/// A ready-to-download file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportArtifact {
    pub file_name: String,
    pub content_type: String,
    pub content: String,
}

/// `{subject}_quiz.{ext}`, with characters that would break a path or a
/// `Content-Disposition` header replaced by `_`. A blank subject falls back to
/// [`DEFAULT_SUBJECT`].
pub fn quiz_file_name(subject: &str, format: ExportFormat) -> String {
    let subject = match subject.trim() {
        "" => DEFAULT_SUBJECT,
        trimmed => trimmed,
    };
    let stem: String = subject
        .chars()
        .map(|c| match c {
            '/' | '\\' | '"' | ':' | '*' | '?' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("{stem}_quiz.{}", format.extension())
}

/// Pretty-printed JSON with the questions in their original order.
pub fn quiz_to_json(quiz: &QuizSchema) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(quiz)?)
}

/// CSV with a `No.,MCQ,Choices,Correct` header, written even when there are no rows.
pub fn rows_to_csv(rows: &[TableRow]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn export(
    subject: &str,
    quiz: &QuizSchema,
    rows: &[TableRow],
    format: ExportFormat,
) -> Result<ExportArtifact, ExportError> {
    let content = match format {
        ExportFormat::Json => quiz_to_json(quiz)?,
        ExportFormat::Csv => rows_to_csv(rows)?,
    };
    Ok(ExportArtifact {
        file_name: quiz_file_name(subject, format),
        content_type: format.content_type().to_string(),
        content,
    })
}
