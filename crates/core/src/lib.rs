//! Quizdrill Core
//!
//! Session state machine and answer-acquisition/evaluation pipeline for the
//! interactive question/answer driver, plus the client traits it
//! orchestrates (completion, transcription, and optional speech synthesis).

pub mod completion;
pub mod prompt;
pub mod session;
pub mod synthesis;
pub mod transcription;
