//! API Models
//!
//! Request and response payloads for the REST surface, with `utoipa` schema
//! annotations for the generated OpenAPI documentation.

use quizdrill_core::session::{SessionSnapshot, SessionState};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct GenerateQuestionPayload {
    #[schema(example = "Photosynthesis")]
    pub subject: String,
}

#[derive(Deserialize, ToSchema)]
pub struct SubmitAnswerPayload {
    #[schema(example = "Chlorophyll")]
    pub answer: String,
}

/// Returned after question generation. The reference answer is withheld
/// until an answer has been submitted.
#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct QuestionResponse {
    pub question: String,
}

/// Returned after answer evaluation. Submission reveals the reference answer.
#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct FeedbackResponse {
    pub feedback: String,
    pub reference_answer: Option<String>,
}

/// Read-only view of the current session for the presentation layer.
#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct SessionView {
    #[schema(value_type = String, example = "question_ready")]
    pub state: SessionState,
    pub subject: Option<String>,
    pub question: Option<String>,
    /// Present only once the answer has been evaluated.
    pub reference_answer: Option<String>,
    pub feedback: Option<String>,
}

impl From<SessionSnapshot> for SessionView {
    fn from(snapshot: SessionSnapshot) -> Self {
        // The reference answer is revealed only after submission.
        let reference_answer = match snapshot.state {
            SessionState::Evaluated => snapshot.reference_answer,
            _ => None,
        };
        Self {
            state: snapshot.state,
            subject: snapshot.subject,
            question: snapshot.question,
            reference_answer,
            feedback: snapshot.feedback,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(state: SessionState) -> SessionSnapshot {
        SessionSnapshot {
            state,
            subject: Some("Photosynthesis".to_string()),
            question: Some("What pigment drives photosynthesis?".to_string()),
            reference_answer: Some("Chlorophyll.".to_string()),
            feedback: match state {
                SessionState::Evaluated => Some("Correct.".to_string()),
                _ => None,
            },
        }
    }

    #[test]
    fn test_generate_question_payload_deserialization() {
        let json = r#"{"subject": "Linear Algebra"}"#;
        let payload: GenerateQuestionPayload = serde_json::from_str(json).unwrap();

        assert_eq!(payload.subject, "Linear Algebra");
    }

    #[test]
    fn test_generate_question_payload_missing_field() {
        let result: Result<GenerateQuestionPayload, _> = serde_json::from_str("{}");
        assert!(result.is_err());
    }

    #[test]
    fn test_submit_answer_payload_deserialization() {
        let json = r#"{"answer": "Chlorophyll"}"#;
        let payload: SubmitAnswerPayload = serde_json::from_str(json).unwrap();

        assert_eq!(payload.answer, "Chlorophyll");
    }

    #[test]
    fn test_session_view_withholds_reference_before_evaluation() {
        let view = SessionView::from(snapshot(SessionState::QuestionReady));

        assert_eq!(view.reference_answer, None);
        assert!(view.question.is_some());
        assert_eq!(view.feedback, None);
    }

    #[test]
    fn test_session_view_reveals_reference_after_evaluation() {
        let view = SessionView::from(snapshot(SessionState::Evaluated));

        assert_eq!(view.reference_answer.as_deref(), Some("Chlorophyll."));
        assert_eq!(view.feedback.as_deref(), Some("Correct."));
    }

    #[test]
    fn test_session_view_serialization() {
        let view = SessionView::from(snapshot(SessionState::Evaluated));
        let json = serde_json::to_string(&view).unwrap();

        assert!(json.contains("\"state\":\"evaluated\""));
        assert!(json.contains("Chlorophyll."));
    }

    #[test]
    fn test_error_response_serialization() {
        let error = ErrorResponse {
            message: "no question has been generated for this session".to_string(),
        };

        let json = serde_json::to_string(&error).unwrap();
        assert_eq!(
            json,
            r#"{"message":"no question has been generated for this session"}"#
        );
    }
}
