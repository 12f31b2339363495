//! Utility modules.
//!
//! - [`HttpClient`]: shared reqwest client, optionally with a timeout
//! - [`validate_question`] / [`validate_search_string`]: checks run before a request is sent
//! - [`truncate_with_ellipsis`], [`wrap_text`]: unicode-aware terminal formatting
//!
//! # Validation
//!
//! ```rust
//! use litreview::utils::{validate_question, ValidationError};
//!
//! assert!(validate_question("What is eczema?").is_ok());
//! assert_eq!(
//!     validate_question("What is eczema"),
//!     Err(ValidationError::MissingQuestionMark)
//! );
//! ```

mod display;
mod http;
mod validate;

pub use display::{
    display_width, format_year, is_terminal, paper_table_columns, terminal_info, terminal_width,
    truncate_at_word, truncate_with_ellipsis, wrap_text, Terminal,
};
pub use http::{HttpClient, HttpClientBuilder, DEFAULT_USER_AGENT};
pub use validate::{
    validate_question, validate_search_string, validate_url, ValidationError, MIN_QUESTION_LENGTH,
};
