//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::{ErrorBody, HandlerError};
use crate::web::{form::read_submission, state::AppState};
use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, Multipart, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use quiz_core::{
    export::{export, ExportArtifact, ExportFormat},
    projection::project,
    QuizOutcome, QuizPipeline, QuizSchema, QuizWarning, TableRow,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        generate_quiz_handler,
        export_json_handler,
        export_csv_handler,
    ),
    components(
        schemas(HealthResponse, GenerateQuizResponse, QuizExports, ExportRequest, ErrorBody)
    ),
    tags(
        (name = "MCQ Generator API", description = "Turns an uploaded document into a reviewed multiple-choice quiz.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
}

/// The downloadable forms of a quiz. Absent when no table could be built.
#[derive(Serialize, ToSchema)]
pub struct QuizExports {
    #[schema(value_type = Option<Object>)]
    json: Option<ExportArtifact>,
    #[schema(value_type = Option<Object>)]
    csv: Option<ExportArtifact>,
}

/// The response payload of a quiz generation run.
#[derive(Serialize, ToSchema)]
pub struct GenerateQuizResponse {
    request_id: Uuid,
    generated_at: DateTime<Utc>,
    subject: String,
    /// The quiz completion exactly as the model returned it.
    raw_quiz: String,
    /// The recovered quiz, or null when the completion held no usable JSON.
    #[schema(value_type = Option<Object>)]
    quiz: Option<QuizSchema>,
    #[schema(value_type = Vec<Object>)]
    table: Vec<TableRow>,
    review: String,
    #[schema(value_type = Vec<Object>)]
    warnings: Vec<QuizWarning>,
    exports: QuizExports,
}

/// A previously generated quiz, sent back for download.
#[derive(Deserialize, ToSchema)]
pub struct ExportRequest {
    subject: String,
    #[schema(value_type = Object)]
    quiz: QuizSchema,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Generate a quiz and its review from an uploaded document.
///
/// Accepts a multipart/form-data request with the fields `api_key`, `file`,
/// `question_count`, `subject` and `tone`.
#[utoipa::path(
    post,
    path = "/quizzes",
    request_body(content_type = "multipart/form-data", description = "The document and quiz settings."),
    responses(
        (status = 200, description = "Quiz generated; see `warnings` for soft failures", body = GenerateQuizResponse),
        (status = 400, description = "Missing or invalid form fields", body = ErrorBody),
        (status = 415, description = "The file is neither PDF nor TXT", body = ErrorBody),
        (status = 422, description = "No text could be extracted from the file", body = ErrorBody),
        (status = 502, description = "The LLM call failed", body = ErrorBody)
    )
)]
pub async fn generate_quiz_handler(
    State(app_state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<GenerateQuizResponse>, HandlerError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("generate_quiz", %request_id);

    async move {
        let multipart = multipart.map_err(|rejection| {
            warn!("Rejected quiz upload: {}", rejection.body_text());
            HandlerError::bad_request(rejection.body_text())
        })?;
        let submission = read_submission(multipart).await?;
        let subject = submission.settings().subject().to_string();
        info!("Quiz submission accepted for subject '{}'", subject);

        let outcome = QuizPipeline::run_submission(app_state.completion_provider.as_ref(), submission)
            .await
            .map_err(|e| {
                error!("Quiz generation failed: {:?}", e);
                HandlerError::from(e)
            })?;

        let exports = build_exports(&subject, &outcome)?;
        let QuizOutcome {
            raw_quiz,
            quiz,
            table,
            review,
            warnings,
        } = outcome;

        Ok::<_, HandlerError>(Json(GenerateQuizResponse {
            request_id,
            generated_at: Utc::now(),
            subject,
            raw_quiz,
            quiz,
            table,
            review,
            warnings,
            exports,
        }))
    }
    .instrument(span)
    .await
}

fn build_exports(subject: &str, outcome: &QuizOutcome) -> Result<QuizExports, HandlerError> {
    match (&outcome.quiz, outcome.has_table()) {
        (Some(quiz), true) => Ok(QuizExports {
            json: Some(export(subject, quiz, &outcome.table, ExportFormat::Json)?),
            csv: Some(export(subject, quiz, &outcome.table, ExportFormat::Csv)?),
        }),
        _ => Ok(QuizExports {
            json: None,
            csv: None,
        }),
    }
}

/// Download a quiz as `{subject}_quiz.json`.
#[utoipa::path(
    post,
    path = "/quizzes/export/json",
    request_body = ExportRequest,
    responses(
        (status = 200, description = "The quiz as a JSON attachment", body = String, content_type = "application/json"),
        (status = 400, description = "The body is not a `{subject, quiz}` object", body = ErrorBody),
        (status = 500, description = "Serialization failed", body = ErrorBody)
    )
)]
pub async fn export_json_handler(
    request: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    download(request, ExportFormat::Json)
}

/// Download a quiz table as `{subject}_quiz.csv`.
#[utoipa::path(
    post,
    path = "/quizzes/export/csv",
    request_body = ExportRequest,
    responses(
        (status = 200, description = "The quiz table as a CSV attachment", body = String, content_type = "text/csv"),
        (status = 400, description = "The body is not a `{subject, quiz}` object", body = ErrorBody),
        (status = 500, description = "Serialization failed", body = ErrorBody)
    )
)]
pub async fn export_csv_handler(
    request: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    download(request, ExportFormat::Csv)
}

fn download(
    request: Result<Json<ExportRequest>, JsonRejection>,
    format: ExportFormat,
) -> Result<impl IntoResponse, HandlerError> {
    let Json(request) = request.map_err(|rejection| {
        warn!("Rejected {} export request: {}", format.extension(), rejection.body_text());
        HandlerError::bad_request(rejection.body_text())
    })?;
    let rows = project(&request.quiz);
    let artifact = export(&request.subject, &request.quiz, &rows, format)?;
    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, artifact.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.content,
    ))
}
