//! User-visible error slot.

use thiserror::Error;

/// Which control an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Abstract or search-string generation
    Generate,
    /// PubMed result count
    Search,
    /// Finding papers or the bulk download
    Download,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Generate => "generate",
            ErrorKind::Search => "search",
            ErrorKind::Download => "download",
        };
        f.write_str(name)
    }
}

/// The most recent user-visible error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ErrorState {
    pub message: String,
    pub kind: ErrorKind,
}

impl ErrorState {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }
}
