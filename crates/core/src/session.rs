//! Session State Machine
//!
//! This module holds the core of the system: the per-user `Session`
//! aggregate, the `SessionStore` that owns one session per user context,
//! and the `SessionController` that drives the
//! `Idle -> QuestionReady -> Evaluated` state machine by coordinating the
//! prompt builder with the completion and transcription clients.
//!
//! Concurrency rules:
//! - An async gate serializes transitions, so at most one `generate_question`
//!   or `submit_answer` is in flight per session.
//! - Every transition snapshots the session generation before its external
//!   calls and commits only if the generation still matches, so a result
//!   issued against a since-reset session is discarded instead of applied.

use crate::completion::{CompletionClient, CompletionError};
use crate::prompt::{self, ValidationError};
use crate::transcription::{AudioClip, TranscriptionClient, TranscriptionError};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, info};

/// Fixed feedback returned when the candidate answer trims to empty.
/// Committed without consulting the completion capability.
pub const EMPTY_ANSWER_FEEDBACK: &str =
    "No valid answer was supplied. Please record or type an answer and try again.";

/// The observable lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No question has been generated yet.
    Idle,
    /// A question and its reference answer are stored, awaiting an answer.
    QuestionReady,
    /// The most recent answer has been evaluated.
    Evaluated,
}

/// The learner's answer, arriving over exactly one of two input channels.
#[derive(Debug, Clone)]
pub enum AnswerInput {
    /// Typed directly by the user.
    Text(String),
    /// Recorded audio, to be transcribed before evaluation.
    Audio(AudioClip),
}

/// Errors produced by session transitions.
///
/// `Validation` and `NoActiveQuestion` are rejected before any external
/// call. `Completion` and `Transcription` abort the transition and leave
/// the session in its prior state; the caller may retry the same action.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no question has been generated for this session")]
    NoActiveQuestion,
    #[error("the session was reset while this request was in flight")]
    Stale,
    #[error(transparent)]
    Completion(#[from] CompletionError),
    #[error(transparent)]
    Transcription(#[from] TranscriptionError),
}

/// A read-only copy of a session's current contents.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub subject: Option<String>,
    pub question: Option<String>,
    pub reference_answer: Option<String>,
    pub feedback: Option<String>,
}

#[derive(Debug, Default)]
struct SessionData {
    /// Bumped on every successful reset; stale in-flight results are
    /// discarded when their issued-against generation no longer matches.
    generation: u64,
    subject: Option<String>,
    question: Option<String>,
    reference_answer: Option<String>,
    feedback: Option<String>,
}

impl SessionData {
    fn state(&self) -> SessionState {
        match (&self.reference_answer, &self.feedback) {
            (None, _) => SessionState::Idle,
            (Some(_), None) => SessionState::QuestionReady,
            (Some(_), Some(_)) => SessionState::Evaluated,
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state(),
            subject: self.subject.clone(),
            question: self.question.clone(),
            reference_answer: self.reference_answer.clone(),
            feedback: self.feedback.clone(),
        }
    }
}

/// One logical session per user context.
pub struct Session {
    /// Serializes transitions; held across the external calls of one turn.
    gate: tokio::sync::Mutex<()>,
    data: Mutex<SessionData>,
}

impl Session {
    fn new() -> Self {
        Self {
            gate: tokio::sync::Mutex::new(()),
            data: Mutex::new(SessionData::default()),
        }
    }

    fn lock_data(&self) -> MutexGuard<'_, SessionData> {
        // A poisoned lock only means a writer panicked mid-commit of plain
        // strings; the data is still coherent enough to read or overwrite.
        self.data.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a copy of the session's current contents.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock_data().snapshot()
    }
}

/// Owns one session per user context, created lazily on first use.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Arc<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session for `user_id`, creating an idle one if absent.
    pub fn session(&self, user_id: &str) -> Arc<Session> {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        sessions
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Session::new()))
            .clone()
    }
}

/// Drives the session state machine.
///
/// Orchestrates the prompt builder, completion client, and transcription
/// client in the order the transitions require, and commits results to the
/// session store.
pub struct SessionController {
    completion: Arc<dyn CompletionClient>,
    transcription: Arc<dyn TranscriptionClient>,
    store: SessionStore,
}

impl SessionController {
    pub fn new(
        completion: Arc<dyn CompletionClient>,
        transcription: Arc<dyn TranscriptionClient>,
    ) -> Self {
        Self {
            completion,
            transcription,
            store: SessionStore::new(),
        }
    }

    /// Transition 1/3: `Idle|Evaluated --generate_question--> QuestionReady`.
    ///
    /// Generates a question for `subject`, then a reference answer for that
    /// question (strictly sequential; the second prompt embeds the first
    /// call's output). Both must succeed: on any failure the session is left
    /// exactly as it was before the call. On success the pair is committed
    /// atomically, prior feedback is discarded, and the generation is bumped.
    pub async fn generate_question(
        &self,
        user_id: &str,
        subject: &str,
    ) -> Result<SessionSnapshot, SessionError> {
        // An empty subject never reaches the completion capability.
        let question_prompt = prompt::question_prompt(subject)?;

        let session = self.store.session(user_id);
        let _turn = session.gate.lock().await;
        let issued_against = session.lock_data().generation;

        let question = self.completion.complete(&question_prompt).await?;
        let answer_prompt = prompt::reference_answer_prompt(&question)?;
        let reference_answer = self.completion.complete(&answer_prompt).await?;

        let mut data = session.lock_data();
        if data.generation != issued_against {
            debug!(user_id, "discarding stale question generation result");
            return Err(SessionError::Stale);
        }
        data.generation += 1;
        data.subject = Some(subject.trim().to_string());
        data.question = Some(question);
        data.reference_answer = Some(reference_answer);
        data.feedback = None;
        info!(user_id, generation = data.generation, "question generated");
        Ok(data.snapshot())
    }

    /// Transition 2/4: `QuestionReady|Evaluated --submit_answer--> Evaluated`.
    ///
    /// Rejected outright while `Idle` (no question to answer). Audio input
    /// is transcribed first. A candidate that trims to empty short-circuits
    /// to the sentinel feedback without an evaluation call. Resubmission in
    /// `Evaluated` replaces feedback only.
    pub async fn submit_answer(
        &self,
        user_id: &str,
        input: AnswerInput,
    ) -> Result<SessionSnapshot, SessionError> {
        let session = self.store.session(user_id);
        let _turn = session.gate.lock().await;

        let (issued_against, reference_answer) = {
            let data = session.lock_data();
            let reference = data
                .reference_answer
                .clone()
                .ok_or(SessionError::NoActiveQuestion)?;
            (data.generation, reference)
        };

        let candidate = match input {
            AnswerInput::Text(text) => text,
            AnswerInput::Audio(clip) => self.transcription.transcribe(clip).await?,
        };

        let feedback = if candidate.trim().is_empty() {
            debug!(user_id, "empty candidate answer, committing sentinel feedback");
            EMPTY_ANSWER_FEEDBACK.to_string()
        } else {
            let eval_prompt = prompt::evaluation_prompt(&candidate, &reference_answer)?;
            self.completion.complete(&eval_prompt).await?
        };

        let mut data = session.lock_data();
        if data.generation != issued_against {
            debug!(user_id, "discarding stale evaluation result");
            return Err(SessionError::Stale);
        }
        data.feedback = Some(feedback);
        info!(user_id, "answer evaluated");
        Ok(data.snapshot())
    }

    /// Read-only view for the presentation layer.
    pub fn snapshot(&self, user_id: &str) -> SessionSnapshot {
        self.store.session(user_id).snapshot()
    }

    /// The current question, if one is stored.
    pub fn question(&self, user_id: &str) -> Option<String> {
        self.store.session(user_id).snapshot().question
    }
}
