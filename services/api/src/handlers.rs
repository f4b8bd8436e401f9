//! Axum Handlers for the REST API
//!
//! One handler per session transition, plus read-only views. Handlers use
//! `utoipa` doc comments to generate OpenAPI documentation.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use quizdrill_core::{
    session::{AnswerInput, SessionError},
    synthesis::SynthesisError,
    transcription::AudioClip,
};
use std::sync::Arc;
use tracing::error;

use crate::{
    models::{
        ErrorResponse, FeedbackResponse, GenerateQuestionPayload, QuestionResponse, SessionView,
        SubmitAnswerPayload,
    },
    state::AppState,
};

pub enum ApiError {
    BadRequest(String),
    Conflict(String),
    NotFound(String),
    BadGateway(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
            ApiError::Conflict(message) => {
                (StatusCode::CONFLICT, Json(ErrorResponse { message })).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse { message })).into_response()
            }
            ApiError::BadGateway(message) => {
                (StatusCode::BAD_GATEWAY, Json(ErrorResponse { message })).into_response()
            }
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                let message = "An internal server error occurred.".to_string();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse { message }),
                )
                    .into_response()
            }
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Validation(e) => ApiError::BadRequest(e.to_string()),
            SessionError::NoActiveQuestion | SessionError::Stale => {
                ApiError::Conflict(err.to_string())
            }
            SessionError::Completion(e) => ApiError::BadGateway(e.to_string()),
            SessionError::Transcription(e) => ApiError::BadGateway(e.to_string()),
        }
    }
}

impl From<SynthesisError> for ApiError {
    fn from(err: SynthesisError) -> Self {
        ApiError::BadGateway(err.to_string())
    }
}

fn user_id(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("x-user-id header is required".to_string()))
}

/// Picks an audio filename (format hint for transcription) from the
/// request's Content-Type.
fn audio_filename(headers: &HeaderMap) -> String {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if content_type.contains("mpeg") || content_type.contains("mp3") {
        "answer.mp3".to_string()
    } else {
        "answer.wav".to_string()
    }
}

/// Generate a new question (and its reference answer) for a subject.
///
/// Resets the session: any prior question, reference answer, and feedback
/// are discarded on success.
#[utoipa::path(
    post,
    path = "/session/question",
    request_body = GenerateQuestionPayload,
    responses(
        (status = 201, description = "Question generated", body = QuestionResponse),
        (status = 400, description = "Empty subject", body = ErrorResponse),
        (status = 502, description = "Completion service failure", body = ErrorResponse)
    ),
    params(
        ("x-user-id" = String, Header, description = "The user context owning the session")
    )
)]
pub async fn generate_question(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<GenerateQuestionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let user = user_id(&headers)?.to_string();

    let snapshot = state
        .controller
        .generate_question(&user, &payload.subject)
        .await?;

    let question = snapshot
        .question
        .ok_or_else(|| ApiError::InternalServerError(anyhow::anyhow!("question missing after generation")))?;

    Ok((StatusCode::CREATED, Json(QuestionResponse { question })))
}

/// Submit a typed answer for evaluation.
#[utoipa::path(
    post,
    path = "/session/answer",
    request_body = SubmitAnswerPayload,
    responses(
        (status = 200, description = "Answer evaluated", body = FeedbackResponse),
        (status = 409, description = "No question has been generated", body = ErrorResponse),
        (status = 502, description = "Completion service failure", body = ErrorResponse)
    ),
    params(
        ("x-user-id" = String, Header, description = "The user context owning the session")
    )
)]
pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<SubmitAnswerPayload>,
) -> Result<Json<FeedbackResponse>, ApiError> {
    let user = user_id(&headers)?.to_string();

    let snapshot = state
        .controller
        .submit_answer(&user, AnswerInput::Text(payload.answer))
        .await?;

    Ok(Json(FeedbackResponse {
        feedback: snapshot.feedback.clone().unwrap_or_default(),
        reference_answer: snapshot.reference_answer,
    }))
}

/// Submit a recorded answer (raw WAV or MP3 body) for transcription and
/// evaluation.
#[utoipa::path(
    post,
    path = "/session/answer/audio",
    request_body(content = Vec<u8>, content_type = "audio/wav"),
    responses(
        (status = 200, description = "Answer transcribed and evaluated", body = FeedbackResponse),
        (status = 409, description = "No question has been generated", body = ErrorResponse),
        (status = 502, description = "Transcription or completion failure", body = ErrorResponse)
    ),
    params(
        ("x-user-id" = String, Header, description = "The user context owning the session")
    )
)]
pub async fn submit_answer_audio(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<FeedbackResponse>, ApiError> {
    let user = user_id(&headers)?.to_string();
    let clip = AudioClip::new(audio_filename(&headers), body.to_vec());

    let snapshot = state
        .controller
        .submit_answer(&user, AnswerInput::Audio(clip))
        .await?;

    Ok(Json(FeedbackResponse {
        feedback: snapshot.feedback.clone().unwrap_or_default(),
        reference_answer: snapshot.reference_answer,
    }))
}

/// Read the current session. The reference answer appears only once an
/// answer has been evaluated.
#[utoipa::path(
    get,
    path = "/session",
    responses(
        (status = 200, description = "Current session contents", body = SessionView),
        (status = 400, description = "Missing user header", body = ErrorResponse)
    ),
    params(
        ("x-user-id" = String, Header, description = "The user context owning the session")
    )
)]
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SessionView>, ApiError> {
    let user = user_id(&headers)?;
    Ok(Json(SessionView::from(state.controller.snapshot(user))))
}

/// Read the current question as synthesized speech (MP3).
#[utoipa::path(
    get,
    path = "/session/question/audio",
    responses(
        (status = 200, description = "Synthesized question audio", body = Vec<u8>, content_type = "audio/mpeg"),
        (status = 404, description = "No question has been generated", body = ErrorResponse),
        (status = 502, description = "Synthesis service failure", body = ErrorResponse)
    ),
    params(
        ("x-user-id" = String, Header, description = "The user context owning the session")
    )
)]
pub async fn question_audio(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let user = user_id(&headers)?;
    let question = state
        .controller
        .question(user)
        .ok_or_else(|| ApiError::NotFound("no question has been generated".to_string()))?;

    let audio = state.synthesis.synthesize(&question).await?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "audio/mpeg")],
        Bytes::from(audio),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizdrill_core::completion::CompletionError;
    use quizdrill_core::prompt::ValidationError;

    #[test]
    fn session_errors_map_to_expected_statuses() {
        let cases = [
            (
                SessionError::Validation(ValidationError::EmptySubject),
                StatusCode::BAD_REQUEST,
            ),
            (SessionError::NoActiveQuestion, StatusCode::CONFLICT),
            (SessionError::Stale, StatusCode::CONFLICT),
            (
                SessionError::Completion(CompletionError::EmptyResponse),
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, status) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn audio_filename_follows_content_type() {
        let mut headers = HeaderMap::new();
        assert_eq!(audio_filename(&headers), "answer.wav");

        headers.insert(header::CONTENT_TYPE, "audio/mpeg".parse().unwrap());
        assert_eq!(audio_filename(&headers), "answer.mp3");

        headers.insert(header::CONTENT_TYPE, "audio/wav".parse().unwrap());
        assert_eq!(audio_filename(&headers), "answer.wav");
    }

    #[test]
    fn missing_user_header_is_a_bad_request() {
        let headers = HeaderMap::new();
        let err = user_id(&headers).unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
