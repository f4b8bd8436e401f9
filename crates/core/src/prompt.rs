//! Prompt Construction
//!
//! Pure functions that build the three prompts the session controller sends
//! to the completion capability. Each builder rejects empty required input
//! so that a blank subject or answer never reaches the model as a
//! generation trigger.

use thiserror::Error;

/// Rejection of an empty required prompt input.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("subject must not be empty")]
    EmptySubject,
    #[error("question must not be empty")]
    EmptyQuestion,
    #[error("candidate answer must not be empty")]
    EmptyCandidate,
    #[error("reference answer must not be empty")]
    EmptyReference,
}

/// Builds the prompt that asks the model for a short question about `subject`.
pub fn question_prompt(subject: &str) -> Result<String, ValidationError> {
    let subject = subject.trim();
    if subject.is_empty() {
        return Err(ValidationError::EmptySubject);
    }
    Ok(format!(
        "Generate a single short, concise question related to the following subject: {subject}. \
         Respond with the question only."
    ))
}

/// Builds the prompt that asks the model for a concise reference answer to `question`.
pub fn reference_answer_prompt(question: &str) -> Result<String, ValidationError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(ValidationError::EmptyQuestion);
    }
    Ok(format!(
        "Provide a concise, correct answer (1-2 sentences) to the following question:\n\n{question}"
    ))
}

/// Builds the prompt that asks the model to judge `candidate` against `reference`.
pub fn evaluation_prompt(candidate: &str, reference: &str) -> Result<String, ValidationError> {
    let candidate = candidate.trim();
    let reference = reference.trim();
    if candidate.is_empty() {
        return Err(ValidationError::EmptyCandidate);
    }
    if reference.is_empty() {
        return Err(ValidationError::EmptyReference);
    }
    Ok(format!(
        "Evaluate the following answer and indicate whether it is correct or not:\n\n\
         User Answer: {candidate}\n\
         Correct Answer: {reference}\n\n\
         Provide feedback and suggest improvements if the answer is incorrect."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_prompt_embeds_subject() {
        let prompt = question_prompt("Photosynthesis").unwrap();
        assert!(prompt.contains("Photosynthesis"));
    }

    #[test]
    fn question_prompt_rejects_empty_subject() {
        assert_eq!(question_prompt(""), Err(ValidationError::EmptySubject));
        assert_eq!(question_prompt("   "), Err(ValidationError::EmptySubject));
    }

    #[test]
    fn reference_answer_prompt_embeds_question() {
        let prompt = reference_answer_prompt("What is chlorophyll?").unwrap();
        assert!(prompt.contains("What is chlorophyll?"));
        assert!(prompt.contains("1-2 sentences"));
    }

    #[test]
    fn reference_answer_prompt_rejects_empty_question() {
        assert_eq!(
            reference_answer_prompt("  "),
            Err(ValidationError::EmptyQuestion)
        );
    }

    #[test]
    fn evaluation_prompt_embeds_both_answers() {
        let prompt = evaluation_prompt("chlorophyl", "Chlorophyll.").unwrap();
        assert!(prompt.contains("User Answer: chlorophyl"));
        assert!(prompt.contains("Correct Answer: Chlorophyll."));
    }

    #[test]
    fn evaluation_prompt_rejects_empty_inputs() {
        assert_eq!(
            evaluation_prompt("", "Chlorophyll."),
            Err(ValidationError::EmptyCandidate)
        );
        assert_eq!(
            evaluation_prompt("chlorophyl", " "),
            Err(ValidationError::EmptyReference)
        );
    }

    #[test]
    fn builders_trim_their_inputs() {
        let prompt = question_prompt("  Rust  ").unwrap();
        assert!(prompt.contains("subject: Rust."));
    }
}
