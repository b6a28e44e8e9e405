//! crates/quiz_core/src/pipeline.rs
//!
//! The two-stage quiz pipeline: extraction, quiz completion, review completion,
//! then recovery and projection of the quiz text.
//!
//! The raw quiz completion is the only value passed from the first stage to
//! the second. The review always runs, whether or not that text later parses.

use crate::domain::{
    ApiCredential, Document, ParameterError, QuizRequestParameters, QuizSchema, QuizSettings,
    TableRow,
};
use crate::extraction::{extract_in_background, ExtractionError};
use crate::ports::{CompletionClientProvider, PortError, QuizCompletionService};
use crate::projection::project;
use crate::prompts::{compose_quiz_prompt, compose_review_prompt};
use crate::recovery::recover_quiz;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

//=========================================================================================
// Errors
//=========================================================================================

/// A form field that must be present before the pipeline may start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    Credential,
    Document,
}

impl MissingField {
    pub fn message(&self) -> &'static str {
        match self {
            MissingField::Credential => "Please enter your LLM API key.",
            MissingField::Document => "Please upload a PDF or TXT file.",
        }
    }
}

/// Which of the two remote calls failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStage {
    Quiz,
    Review,
}

impl fmt::Display for CompletionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionStage::Quiz => f.write_str("quiz"),
            CompletionStage::Review => f.write_str("review"),
        }
    }
}

/// Errors that abort a run. Nothing partial is returned alongside them.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{}", missing_message(.0))]
    MissingInput(Vec<MissingField>),

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ParameterError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Error generating quiz ({stage} call)")]
    GenerationFailure {
        stage: CompletionStage,
        #[source]
        source: PortError,
    },
}

fn missing_message(fields: &[MissingField]) -> String {
    fields
        .iter()
        .map(MissingField::message)
        .collect::<Vec<_>>()
        .join(" ")
}

//=========================================================================================
// Inputs and Outputs
//=========================================================================================

/// Everything a run needs, captured once from the submitted form.
#[derive(Debug, Clone)]
pub struct QuizSubmission {
    credential: ApiCredential,
    document: Document,
    settings: QuizSettings,
}

impl QuizSubmission {
    /// Reports every missing field at once, credential first.
    pub fn new(
        credential: Option<ApiCredential>,
        document: Option<Document>,
        settings: QuizSettings,
    ) -> Result<Self, PipelineError> {
        match (credential, document) {
            (Some(credential), Some(document)) => Ok(Self {
                credential,
                document,
                settings,
            }),
            (credential, document) => {
                let mut missing = Vec::new();
                if credential.is_none() {
                    missing.push(MissingField::Credential);
                }
                if document.is_none() {
                    missing.push(MissingField::Document);
                }
                Err(PipelineError::MissingInput(missing))
            }
        }
    }

    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    UnparsableQuiz,
    EmptyQuiz,
    TextlessPages,
}

/// A soft failure: the run continued with degraded output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizWarning {
    pub kind: WarningKind,
    pub message: String,
}

impl QuizWarning {
    fn unparsable() -> Self {
        Self {
            kind: WarningKind::UnparsableQuiz,
            message: "Quiz output is not valid JSON. No table generated.".to_string(),
        }
    }

    fn empty() -> Self {
        Self {
            kind: WarningKind::EmptyQuiz,
            message: "Could not parse quiz to table.".to_string(),
        }
    }

    fn textless(pages: &[usize]) -> Self {
        let pages = pages
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            kind: WarningKind::TextlessPages,
            message: format!("No text could be extracted from page(s) {pages}."),
        }
    }
}

/// The result of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizOutcome {
    pub raw_quiz: String,
    pub quiz: Option<QuizSchema>,
    pub table: Vec<TableRow>,
    pub review: String,
    pub warnings: Vec<QuizWarning>,
}

impl QuizOutcome {
    /// True when a non-empty table was built and can be exported.
    pub fn has_table(&self) -> bool {
        !self.table.is_empty()
    }
}

//=========================================================================================
// The Pipeline
//=========================================================================================

pub struct QuizPipeline {
    completion: Arc<dyn QuizCompletionService>,
}

impl QuizPipeline {
    pub fn new(completion: Arc<dyn QuizCompletionService>) -> Self {
        Self { completion }
    }

    /// Connects with the submission's credential and runs it.
    pub async fn run_submission(
        provider: &dyn CompletionClientProvider,
        submission: QuizSubmission,
    ) -> Result<QuizOutcome, PipelineError> {
        let QuizSubmission {
            credential,
            document,
            settings,
        } = submission;

        // Extraction failures must surface before a client is ever built.
        let extracted = extract_in_background(document).await?;
        let completion = provider
            .connect(&credential)
            .map_err(|source| PipelineError::GenerationFailure {
                stage: CompletionStage::Quiz,
                source,
            })?;

        let mut warnings = Vec::new();
        if !extracted.textless_pages().is_empty() {
            warnings.push(QuizWarning::textless(extracted.textless_pages()));
        }
        let params = QuizRequestParameters::new(settings, extracted.into_string());

        let mut outcome = Self::new(completion).generate(&params).await?;
        warnings.append(&mut outcome.warnings);
        outcome.warnings = warnings;
        Ok(outcome)
    }

    /// Runs both completion stages for already-extracted text.
    pub async fn generate(&self, params: &QuizRequestParameters) -> Result<QuizOutcome, PipelineError> {
        let raw_quiz = self.quiz_stage(params).await?;
        let review = self.review_stage(params.subject(), &raw_quiz).await?;

        let mut warnings = Vec::new();
        let quiz = recover_quiz(&raw_quiz);
        let table = match &quiz {
            Some(quiz) => project(quiz),
            None => {
                warn!("Quiz completion could not be recovered as JSON");
                warnings.push(QuizWarning::unparsable());
                Vec::new()
            }
        };
        if quiz.is_some() && table.is_empty() {
            warn!("Quiz completion recovered with no questions");
            warnings.push(QuizWarning::empty());
        }

        info!(
            "Quiz run finished: {} of {} requested questions tabulated",
            table.len(),
            params.question_count()
        );

        Ok(QuizOutcome {
            raw_quiz,
            quiz,
            table,
            review,
            warnings,
        })
    }

    async fn quiz_stage(&self, params: &QuizRequestParameters) -> Result<String, PipelineError> {
        let prompt = compose_quiz_prompt(params);
        info!(
            "Requesting {} {} questions on '{}' (prompt: {} chars)",
            params.question_count(),
            params.tone(),
            params.subject(),
            prompt.chars().count()
        );
        self.completion
            .complete_quiz(&prompt)
            .await
            .map_err(|source| PipelineError::GenerationFailure {
                stage: CompletionStage::Quiz,
                source,
            })
    }

    async fn review_stage(&self, subject: &str, raw_quiz: &str) -> Result<String, PipelineError> {
        let prompt = compose_review_prompt(subject, raw_quiz);
        info!("Requesting quiz review (prompt: {} chars)", prompt.chars().count());
        self.completion
            .complete_review(&prompt)
            .await
            .map_err(|source| PipelineError::GenerationFailure {
                stage: CompletionStage::Review,
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Tone;
    use crate::ports::PortResult;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns canned completions and records every prompt it was sent.
    #[derive(Default)]
    struct ScriptedCompletion {
        quiz_reply: Option<String>,
        review_reply: Option<String>,
        quiz_prompts: Mutex<Vec<String>>,
        review_prompts: Mutex<Vec<String>>,
    }

    impl ScriptedCompletion {
        fn replying(quiz: &str, review: &str) -> Arc<Self> {
            Arc::new(Self {
                quiz_reply: Some(quiz.to_string()),
                review_reply: Some(review.to_string()),
                ..Default::default()
            })
        }
    }

    #[async_trait]
    impl QuizCompletionService for ScriptedCompletion {
        async fn complete_quiz(&self, prompt: &str) -> PortResult<String> {
            self.quiz_prompts.lock().unwrap().push(prompt.to_string());
            self.quiz_reply
                .clone()
                .ok_or_else(|| PortError::Unexpected("quota exceeded".to_string()))
        }

        async fn complete_review(&self, prompt: &str) -> PortResult<String> {
            self.review_prompts.lock().unwrap().push(prompt.to_string());
            self.review_reply
                .clone()
                .ok_or_else(|| PortError::Unexpected("network down".to_string()))
        }
    }

    struct FixedProvider(Arc<ScriptedCompletion>);

    impl CompletionClientProvider for FixedProvider {
        fn connect(&self, _credential: &ApiCredential) -> PortResult<Arc<dyn QuizCompletionService>> {
            let client: Arc<dyn QuizCompletionService> = self.0.clone();
            Ok(client)
        }
    }

    const DOCUMENT: &str = "Cells are the basic unit of life.\n\n\
        Mitochondria produce most of the cell's ATP.\n\n\
        Ribosomes assemble proteins from amino acids.\n";

    const QUIZ_JSON: &str = r#"{"q1": {"mcq": "What produces ATP?", "options": {"A": "Mitochondria", "B": "Ribosome"}, "correct": "A"}}"#;

    fn biology_submission(document: Document) -> QuizSubmission {
        let settings = QuizSettings::new(5, "Biology", Tone::Formal).unwrap();
        QuizSubmission::new(ApiCredential::new("key-123"), Some(document), settings).unwrap()
    }

    #[tokio::test]
    async fn end_to_end_prompts_carry_the_right_context() {
        let completion = ScriptedCompletion::replying(QUIZ_JSON, "Well balanced.");
        let provider = FixedProvider(completion.clone());

        let outcome = QuizPipeline::run_submission(
            &provider,
            biology_submission(Document::new("cells.txt", DOCUMENT.as_bytes().to_vec())),
        )
        .await
        .unwrap();

        let quiz_prompts = completion.quiz_prompts.lock().unwrap();
        let review_prompts = completion.review_prompts.lock().unwrap();
        assert_eq!(quiz_prompts.len(), 1);
        assert_eq!(review_prompts.len(), 1);

        let quiz_prompt = &quiz_prompts[0];
        assert!(quiz_prompt.contains(DOCUMENT));
        assert!(quiz_prompt.contains("create 5 multiple choice questions"));
        assert!(quiz_prompt.contains("Biology"));
        assert!(quiz_prompt.contains("Formal"));

        let review_prompt = &review_prompts[0];
        assert!(review_prompt.contains(QUIZ_JSON));
        assert!(review_prompt.contains("Biology"));
        assert!(!review_prompt.contains("Mitochondria produce most"));

        assert_eq!(outcome.review, "Well balanced.");
        assert_eq!(outcome.table.len(), 1);
        assert_eq!(outcome.table[0].choices, "A -> Mitochondria || B -> Ribosome");
        assert!(outcome.warnings.is_empty());
        assert!(outcome.has_table());
    }

    #[tokio::test]
    async fn review_runs_even_when_quiz_is_unparsable() {
        let completion = ScriptedCompletion::replying("I cannot make a quiz from this.", "Nothing to review.");
        let provider = FixedProvider(completion.clone());

        let outcome = QuizPipeline::run_submission(
            &provider,
            biology_submission(Document::new("cells.txt", DOCUMENT.as_bytes().to_vec())),
        )
        .await
        .unwrap();

        let review_prompts = completion.review_prompts.lock().unwrap();
        assert!(review_prompts[0].contains("I cannot make a quiz from this."));
        assert_eq!(outcome.quiz, None);
        assert!(outcome.table.is_empty());
        assert_eq!(outcome.review, "Nothing to review.");
        assert_eq!(outcome.warnings[0].kind, WarningKind::UnparsableQuiz);
    }

    #[tokio::test]
    async fn empty_quiz_is_a_soft_failure() {
        let completion = ScriptedCompletion::replying("Here you go: {}", "Empty.");
        let params = QuizRequestParameters::new(QuizSettings::default(), "text");

        let outcome = QuizPipeline::new(completion).generate(&params).await.unwrap();

        assert_eq!(outcome.quiz, Some(QuizSchema::default()));
        assert!(!outcome.has_table());
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].kind, WarningKind::EmptyQuiz);
    }

    #[tokio::test]
    async fn quiz_call_failure_is_fatal_and_skips_review() {
        let completion = Arc::new(ScriptedCompletion::default());
        let params = QuizRequestParameters::new(QuizSettings::default(), "text");

        let err = QuizPipeline::new(completion.clone())
            .generate(&params)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::GenerationFailure { stage: CompletionStage::Quiz, .. }
        ));
        assert!(completion.review_prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn review_call_failure_is_fatal() {
        let completion = Arc::new(ScriptedCompletion {
            quiz_reply: Some(QUIZ_JSON.to_string()),
            ..Default::default()
        });
        let params = QuizRequestParameters::new(QuizSettings::default(), "text");

        let err = QuizPipeline::new(completion).generate(&params).await.unwrap_err();

        match err {
            PipelineError::GenerationFailure { stage, source } => {
                assert_eq!(stage, CompletionStage::Review);
                assert_eq!(source.to_string(), "An unexpected error occurred: network down");
            }
            other => panic!("expected GenerationFailure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn extraction_failure_stops_before_any_remote_call() {
        let completion = ScriptedCompletion::replying(QUIZ_JSON, "ok");
        let provider = FixedProvider(completion.clone());

        let err = QuizPipeline::run_submission(
            &provider,
            biology_submission(Document::new("deck.pptx", b"slides".to_vec())),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Extraction(ExtractionError::UnsupportedFormat { .. })
        ));
        assert!(completion.quiz_prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn textless_pdf_pages_become_a_warning() {
        let completion = ScriptedCompletion::replying(QUIZ_JSON, "ok");
        let provider = FixedProvider(completion);
        let pdf = crate::extraction::tests::make_test_pdf(&[None, Some("Enzymes speed reactions")]);

        let outcome = QuizPipeline::run_submission(&provider, biology_submission(Document::new("notes.pdf", pdf)))
            .await
            .unwrap();

        assert_eq!(outcome.warnings[0].kind, WarningKind::TextlessPages);
        assert_eq!(outcome.warnings[0].message, "No text could be extracted from page(s) 1.");
    }

    #[test]
    fn every_missing_field_is_reported() {
        let err = QuizSubmission::new(None, None, QuizSettings::default()).unwrap_err();
        match &err {
            PipelineError::MissingInput(fields) => {
                assert_eq!(fields, &[MissingField::Credential, MissingField::Document]);
            }
            other => panic!("expected MissingInput, got {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "Please enter your LLM API key. Please upload a PDF or TXT file."
        );

        let err = QuizSubmission::new(
            ApiCredential::new("key"),
            None,
            QuizSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput(ref f) if f == &[MissingField::Document]));
    }
}
