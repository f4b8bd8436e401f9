//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API, WebSocket endpoint, and OpenAPI documentation.

use crate::{
    handlers,
    models::{
        ErrorResponse, FeedbackResponse, GenerateQuestionPayload, QuestionResponse, SessionView,
        SubmitAnswerPayload,
    },
    state::AppState,
    ws::ws_handler,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::generate_question,
        handlers::submit_answer,
        handlers::submit_answer_audio,
        handlers::get_session,
        handlers::question_audio,
    ),
    components(
        schemas(
            GenerateQuestionPayload,
            SubmitAnswerPayload,
            QuestionResponse,
            FeedbackResponse,
            SessionView,
            ErrorResponse
        )
    ),
    tags(
        (name = "Quizdrill API", description = "Interactive question/answer session driver")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Group all routes that require AppState into their own router.
    let api_router = Router::new()
        .route("/session", get(handlers::get_session))
        .route("/session/question", post(handlers::generate_question))
        .route("/session/question/audio", get(handlers::question_audio))
        .route("/session/answer", post(handlers::submit_answer))
        .route("/session/answer/audio", post(handlers::submit_answer_audio))
        .route("/ws", get(ws_handler))
        // Apply the state ONLY to this group of routes.
        .with_state(app_state);

    // Merge the stateful routes with the stateless Swagger UI routes.
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
