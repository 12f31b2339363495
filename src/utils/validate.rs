//! Input validation for research questions, search strings and the backend URL.
//!
//! These checks run before any request is dispatched; a failure means the
//! backend is never contacted.

use thiserror::Error;

/// Minimum question length, counted in characters
pub const MIN_QUESTION_LENGTH: usize = 10;

/// Validation error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Question must be at least 10 characters long")]
    QuestionTooShort,

    // The check is for a `?` anywhere in the question, the wording says "end"
    #[error("Question should end with a question mark")]
    MissingQuestionMark,

    #[error("Search string cannot be empty")]
    EmptySearchString,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Validate a research question before generating an abstract
///
/// Rules are checked in order and the first failure is returned.
pub fn validate_question(question: &str) -> Result<(), ValidationError> {
    if question.chars().count() < MIN_QUESTION_LENGTH {
        return Err(ValidationError::QuestionTooShort);
    }

    if !question.contains('?') {
        return Err(ValidationError::MissingQuestionMark);
    }

    Ok(())
}

/// Reject a search string that is empty or whitespace only
pub fn validate_search_string(search_string: &str) -> Result<(), ValidationError> {
    if search_string.trim().is_empty() {
        return Err(ValidationError::EmptySearchString);
    }
    Ok(())
}

/// Validate the backend base URL
///
/// Returns the URL with any trailing slash removed so endpoint paths can be
/// appended directly.
pub fn validate_url(url: &str) -> Result<String, ValidationError> {
    let url = url.trim();

    if url.is_empty() {
        return Err(ValidationError::InvalidUrl("empty URL".to_string()));
    }

    if url.contains('\0') || url.contains('\n') || url.contains('\r') {
        return Err(ValidationError::InvalidUrl(
            "contains control characters".to_string(),
        ));
    }

    let parsed = url::Url::parse(url).map_err(|e| ValidationError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ValidationError::InvalidUrl(format!(
                "invalid scheme: {}",
                other
            )))
        }
    }

    Ok(url.trim_end_matches('/').to_string())
}
