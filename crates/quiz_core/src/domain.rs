//! crates/quiz_core/src/domain.rs
//!
//! Defines the pure, core data structures that flow through a quiz generation run.
//! These structs are independent of the web layer and of any LLM provider.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

pub const MIN_QUESTION_COUNT: u32 = 1;
pub const MAX_QUESTION_COUNT: u32 = 50;
pub const DEFAULT_QUESTION_COUNT: u32 = 5;
pub const DEFAULT_SUBJECT: &str = "General Knowledge";

/// Placeholder rendered for any question field the model left out.
pub const PLACEHOLDER: &str = "N/A";

//=========================================================================================
// Uploaded Documents
//=========================================================================================

/// The formats the text extractor understands, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Text,
}

impl DocumentFormat {
    /// Returns `None` for anything that is not a `.pdf` or `.txt` file.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let lower = file_name.to_ascii_lowercase();
        if lower.ends_with(".pdf") {
            Some(DocumentFormat::Pdf)
        } else if lower.ends_with(".txt") {
            Some(DocumentFormat::Text)
        } else {
            None
        }
    }
}

/// A file uploaded by a user. It is consumed once by extraction and then dropped.
#[derive(Debug, Clone)]
pub struct Document {
    pub file_name: String,
    pub bytes: Bytes,
}

impl Document {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn format(&self) -> Option<DocumentFormat> {
        DocumentFormat::from_file_name(&self.file_name)
    }
}

/// The plain text of a document, plus the 1-based numbers of PDF pages
/// that yielded no text and were substituted with an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    text: String,
    textless_pages: Vec<usize>,
}

impl ExtractedText {
    pub fn new(text: String, textless_pages: Vec<usize>) -> Self {
        Self {
            text,
            textless_pages,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn textless_pages(&self) -> &[usize] {
        &self.textless_pages
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

//=========================================================================================
// Request Parameters
//=========================================================================================

/// The LLM provider credential supplied with a request.
///
/// The value is only reachable through [`ApiCredential::expose`]; `Debug`
/// never prints it, so it cannot leak through error or log output.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredential(String);

impl ApiCredential {
    /// Trims surrounding whitespace; a blank credential counts as missing.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiCredential(****)")
    }
}

/// The tone the generated questions should be written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    #[default]
    Formal,
    Casual,
    Fun,
    Challenging,
}

impl Tone {
    pub const ALL: [Tone; 4] = [Tone::Formal, Tone::Casual, Tone::Fun, Tone::Challenging];

    pub fn label(&self) -> &'static str {
        match self {
            Tone::Formal => "Formal",
            Tone::Casual => "Casual",
            Tone::Fun => "Fun",
            Tone::Challenging => "Challenging",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tone {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Tone::ALL
            .into_iter()
            .find(|tone| tone.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParameterError::UnknownTone(wanted.to_string()))
    }
}

/// Rejections of form values that are present but unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParameterError {
    #[error("question count must be between {} and {}, got {}", MIN_QUESTION_COUNT, MAX_QUESTION_COUNT, .0)]
    QuestionCountOutOfRange(i64),
    #[error("'{0}' is not a whole number of questions")]
    QuestionCountNotANumber(String),
    #[error("unknown tone '{0}', expected one of Formal, Casual, Fun, Challenging")]
    UnknownTone(String),
}

/// The user-chosen knobs of a run, validated before any document is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSettings {
    question_count: u32,
    subject: String,
    tone: Tone,
}

impl QuizSettings {
    pub fn new(question_count: i64, subject: impl Into<String>, tone: Tone) -> Result<Self, ParameterError> {
        let range = i64::from(MIN_QUESTION_COUNT)..=i64::from(MAX_QUESTION_COUNT);
        if !range.contains(&question_count) {
            return Err(ParameterError::QuestionCountOutOfRange(question_count));
        }
        Ok(Self {
            question_count: question_count as u32,
            subject: subject.into(),
            tone,
        })
    }

    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            question_count: DEFAULT_QUESTION_COUNT,
            subject: DEFAULT_SUBJECT.to_string(),
            tone: Tone::default(),
        }
    }
}

/// Everything the quiz prompt is rendered from. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRequestParameters {
    settings: QuizSettings,
    source_text: String,
}

impl QuizRequestParameters {
    pub fn new(settings: QuizSettings, source_text: impl Into<String>) -> Self {
        Self {
            settings,
            source_text: source_text.into(),
        }
    }

    pub fn question_count(&self) -> u32 {
        self.settings.question_count
    }

    pub fn subject(&self) -> &str {
        &self.settings.subject
    }

    pub fn tone(&self) -> Tone {
        self.settings.tone
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }
}

//=========================================================================================
// Recovered Quiz Structure
//=========================================================================================

/// A quiz recovered from a completion: question key to question object, in the
/// order the model wrote them.
///
/// The values are kept as raw JSON. Models routinely omit or mistype fields, and
/// the table view degrades per field instead of rejecting the whole quiz.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizSchema(Map<String, Value>);

impl QuizSchema {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the questions in insertion order.
    pub fn questions(&self) -> impl Iterator<Item = (&str, QuestionRecord)> + '_ {
        self.0
            .iter()
            .map(|(key, value)| (key.as_str(), QuestionRecord::from_value(value)))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for QuizSchema {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A lenient, display-oriented reading of one question object.
///
/// A field is `None` when it is absent or null. `options` is also `None` when the
/// model produced something other than a mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionRecord {
    pub prompt_text: Option<String>,
    pub options: Option<Vec<(String, String)>>,
    pub correct_label: Option<String>,
}

impl QuestionRecord {
    pub fn from_value(value: &Value) -> Self {
        let Some(fields) = value.as_object() else {
            return Self::default();
        };

        let options = fields.get("options").and_then(Value::as_object).map(|options| {
            options
                .iter()
                .map(|(label, text)| {
                    let text = render_scalar(text).unwrap_or_else(|| PLACEHOLDER.to_string());
                    (label.clone(), text)
                })
                .collect()
        });

        Self {
            prompt_text: fields.get("mcq").and_then(render_scalar),
            options,
            correct_label: fields.get("correct").and_then(render_scalar),
        }
    }
}

/// Strings are rendered bare, other JSON values in their compact JSON form.
fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// One row of the quiz table. The serde names double as the CSV header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    #[serde(rename = "No.")]
    pub index: usize,
    #[serde(rename = "MCQ")]
    pub question: String,
    #[serde(rename = "Choices")]
    pub choices: String,
    #[serde(rename = "Correct")]
    pub correct: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn format_follows_extension_case_insensitively() {
        assert_eq!(DocumentFormat::from_file_name("notes.TXT"), Some(DocumentFormat::Text));
        assert_eq!(DocumentFormat::from_file_name("paper.Pdf"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_file_name("slides.pptx"), None);
        assert_eq!(DocumentFormat::from_file_name("pdf"), None);
    }

    #[test]
    fn credential_is_trimmed_and_never_printed() {
        let credential = ApiCredential::new("  secret-key \n").unwrap();
        assert_eq!(credential.expose(), "secret-key");
        assert!(!format!("{:?}", credential).contains("secret"));
        assert!(ApiCredential::new("   ").is_none());
    }

    #[test]
    fn tone_parses_any_case() {
        assert_eq!("casual".parse::<Tone>().unwrap(), Tone::Casual);
        assert_eq!(" CHALLENGING ".parse::<Tone>().unwrap(), Tone::Challenging);
        assert_eq!(
            "Sarcastic".parse::<Tone>(),
            Err(ParameterError::UnknownTone("Sarcastic".to_string()))
        );
    }

    #[test]
    fn question_count_is_bounded() {
        assert!(QuizSettings::new(1, "Math", Tone::Fun).is_ok());
        assert!(QuizSettings::new(50, "Math", Tone::Fun).is_ok());
        assert_eq!(
            QuizSettings::new(0, "Math", Tone::Fun),
            Err(ParameterError::QuestionCountOutOfRange(0))
        );
        assert_eq!(
            QuizSettings::new(51, "Math", Tone::Fun),
            Err(ParameterError::QuestionCountOutOfRange(51))
        );
    }

    #[test]
    fn record_reads_non_string_fields_leniently() {
        let record = QuestionRecord::from_value(&json!({
            "mcq": 42,
            "options": {"A": true, "B": null},
            "correct": null
        }));
        assert_eq!(record.prompt_text.as_deref(), Some("42"));
        assert_eq!(
            record.options,
            Some(vec![
                ("A".to_string(), "true".to_string()),
                ("B".to_string(), PLACEHOLDER.to_string()),
            ])
        );
        assert_eq!(record.correct_label, None);
    }

    #[test]
    fn record_of_non_object_is_empty() {
        assert_eq!(QuestionRecord::from_value(&json!("just text")), QuestionRecord::default());
    }
}
