//! JSON export of a review session.

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::AccessUrls;
use crate::session::state::ReviewState;

/// File name written by [`write_export`]
pub const EXPORT_FILE_NAME: &str = "research-results.json";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// One paper in the export: only its title and access URLs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportEntry {
    pub title: String,
    pub urls: AccessUrls,
}

/// The exported document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub question: String,
    pub search_string: String,
    pub result_count: Option<u64>,
    pub pdfs: Vec<ExportEntry>,
}

impl ExportDocument {
    pub fn from_state(state: &ReviewState) -> Self {
        Self {
            question: state.question.clone(),
            search_string: state.search_string.clone(),
            result_count: state.result_count,
            pdfs: state
                .papers
                .iter()
                .map(|paper| ExportEntry {
                    title: paper.title.clone(),
                    urls: paper.access_urls.clone(),
                })
                .collect(),
        }
    }

    /// Two-space indented JSON
    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Write the export for `state` into `dir`, returning the file path
pub fn write_export(state: &ReviewState, dir: &Path) -> Result<PathBuf, ExportError> {
    let json = ExportDocument::from_state(state).to_json()?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(EXPORT_FILE_NAME);
    std::fs::write(&path, json)?;
    Ok(path)
}
