pub mod domain;
pub mod export;
pub mod extraction;
pub mod pipeline;
pub mod ports;
pub mod projection;
pub mod prompts;
pub mod recovery;

pub use domain::{
    ApiCredential, Document, DocumentFormat, ExtractedText, ParameterError, QuestionRecord,
    QuizRequestParameters, QuizSchema, QuizSettings, TableRow, Tone,
};
pub use export::{ExportArtifact, ExportError, ExportFormat};
pub use extraction::ExtractionError;
pub use pipeline::{
    CompletionStage, MissingField, PipelineError, QuizOutcome, QuizPipeline, QuizSubmission,
    QuizWarning, WarningKind,
};
pub use ports::{CompletionClientProvider, PortError, PortResult, QuizCompletionService};
