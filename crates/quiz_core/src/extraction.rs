//! crates/quiz_core/src/extraction.rs
//!
//! Turns an uploaded document into plain text.

use crate::domain::{Document, DocumentFormat, ExtractedText};
use crate::ports::BoxError;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Unsupported file format for '{file_name}'. Only PDF and TXT are supported")]
    UnsupportedFormat { file_name: String },

    #[error("'{file_name}' is not valid UTF-8 text")]
    InvalidUtf8 {
        file_name: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Error reading the PDF file '{file_name}'")]
    ExtractionFailure {
        file_name: String,
        #[source]
        source: BoxError,
    },

    #[error("'{file_name}' contains no extractable text")]
    EmptyDocument { file_name: String },
}

#[derive(Debug, thiserror::Error)]
#[error("the PDF parser panicked: {0}")]
struct ParserPanic(String);

/// Extracts the text of a `.txt` or `.pdf` document.
///
/// PDF pages that yield no text contribute an empty string at their position
/// and are listed in [`ExtractedText::textless_pages`]. A result with no text at
/// all, from either format, is reported as [`ExtractionError::EmptyDocument`].
pub fn extract(document: &Document) -> Result<ExtractedText, ExtractionError> {
    let file_name = document.file_name.clone();
    let extracted = match document.format() {
        Some(DocumentFormat::Text) => {
            let text = String::from_utf8(document.bytes.to_vec()).map_err(|source| {
                ExtractionError::InvalidUtf8 {
                    file_name: file_name.clone(),
                    source,
                }
            })?;
            ExtractedText::new(text, Vec::new())
        }
        Some(DocumentFormat::Pdf) => extract_pdf(&file_name, &document.bytes)?,
        None => return Err(ExtractionError::UnsupportedFormat { file_name }),
    };

    if extracted.as_str().trim().is_empty() {
        return Err(ExtractionError::EmptyDocument { file_name });
    }

    debug!(
        "Extracted {} characters from '{}'",
        extracted.as_str().chars().count(),
        file_name
    );
    Ok(extracted)
}

/// Runs [`extract`] on the blocking thread pool so PDF parsing never stalls the runtime.
pub async fn extract_in_background(document: Document) -> Result<ExtractedText, ExtractionError> {
    let file_name = document.file_name.clone();
    tokio::task::spawn_blocking(move || extract(&document))
        .await
        .map_err(|e| ExtractionError::ExtractionFailure {
            file_name,
            source: Box::new(e),
        })?
}

fn extract_pdf(file_name: &str, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
    let failure = |source: BoxError| ExtractionError::ExtractionFailure {
        file_name: file_name.to_string(),
        source,
    };

    let pages = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }))
    .map_err(|payload| failure(Box::new(ParserPanic(panic_message(payload.as_ref())))))?
    .map_err(|e| failure(e.to_string().into()))?;

    let mut text = String::new();
    let mut textless_pages = Vec::new();
    for (index, page_text) in pages.into_iter().enumerate() {
        if page_text.trim().is_empty() {
            textless_pages.push(index + 1);
        } else {
            text.push_str(&page_text);
        }
    }

    if !textless_pages.is_empty() {
        warn!(
            "'{}': no text extracted from page(s) {:?}",
            file_name, textless_pages
        );
    }

    Ok(ExtractedText::new(text, textless_pages))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
