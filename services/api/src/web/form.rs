//! services/api/src/web/form.rs
//!
//! Reads the quiz upload form out of a multipart request.

use crate::error::HandlerError;
use axum::extract::Multipart;
use quiz_core::domain::{DEFAULT_QUESTION_COUNT, DEFAULT_SUBJECT};
use quiz_core::{
    ApiCredential, Document, ParameterError, PipelineError, QuizSettings, QuizSubmission, Tone,
};

/// The raw form fields, before validation.
#[derive(Default)]
struct RawForm {
    api_key: Option<String>,
    document: Option<Document>,
    question_count: Option<String>,
    subject: Option<String>,
    tone: Option<String>,
}

/// Collects every field, then validates them into a single immutable submission.
///
/// Unknown fields are ignored. A file part with no file name counts as "no file
/// uploaded". A named file with an empty body is kept, and extraction rejects it.
pub async fn read_submission(mut multipart: Multipart) -> Result<QuizSubmission, HandlerError> {
    let mut form = RawForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HandlerError::bad_request(format!("Failed to read multipart data: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().map(str::to_string);
                let data = field.bytes().await.map_err(|e| {
                    HandlerError::bad_request(format!("Failed to read file bytes: {}", e))
                })?;
                if let Some(file_name) = file_name.filter(|n| !n.is_empty()) {
                    form.document = Some(Document::new(file_name, data));
                }
            }
            "api_key" | "question_count" | "subject" | "tone" => {
                let value = field.text().await.map_err(|e| {
                    HandlerError::bad_request(format!("Failed to read field '{}': {}", name, e))
                })?;
                match name.as_str() {
                    "api_key" => form.api_key = Some(value),
                    "question_count" => form.question_count = Some(value),
                    "subject" => form.subject = Some(value),
                    _ => form.tone = Some(value),
                }
            }
            _ => {}
        }
    }

    form.into_submission().map_err(HandlerError::from)
}

impl RawForm {
    fn into_submission(self) -> Result<QuizSubmission, PipelineError> {
        let credential = self.api_key.as_deref().and_then(ApiCredential::new);
        if credential.is_none() || self.document.is_none() {
            return QuizSubmission::new(credential, self.document, QuizSettings::default());
        }

        let question_count = match self.question_count.as_deref().map(str::trim) {
            None | Some("") => i64::from(DEFAULT_QUESTION_COUNT),
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| ParameterError::QuestionCountNotANumber(raw.to_string()))?,
        };
        let tone = match self.tone.as_deref().map(str::trim) {
            None | Some("") => Tone::default(),
            Some(raw) => raw.parse::<Tone>()?,
        };
        let subject = self
            .subject
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SUBJECT.to_string());

        let settings = QuizSettings::new(question_count, subject, tone)?;

        QuizSubmission::new(credential, self.document, settings)
    }
}
