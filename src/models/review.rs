//! Request and response bodies exchanged with the review backend, plus the
//! generated abstract as held by the client.

use serde::{Deserialize, Serialize};

use super::Paper;

/// Body for `/generate-abstract` and `/generate-search-string`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRequest {
    pub question: String,
}

/// Body for `/pubmed-search` and `/download-pdfs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStringRequest {
    pub search_string: String,
}

/// Body for `/bulk-download`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkDownloadRequest {
    pub papers: Vec<Paper>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AbstractResponse {
    #[serde(rename = "abstract")]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchStringResponse {
    pub search_string: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResultCountResponse {
    pub result_count: u64,
}

/// Response of `/download-pdfs`
///
/// The count fields are informational only; the client derives its own
/// counts from `pdfs`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PdfsResponse {
    pub pdfs: Vec<Paper>,

    #[serde(default)]
    pub total_results: Option<u64>,

    #[serde(default)]
    pub available_count: Option<u64>,

    #[serde(default)]
    pub findable_count: Option<u64>,
}

/// Abstract produced by the backend for the current question
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedAbstract {
    /// Raw text, lines separated by `\n`
    pub content: String,

    /// Whether the abstract panel is shown
    pub visible: bool,
}

/// A rendered unit of the generated abstract
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbstractBlock<'a> {
    /// A line that carried `**` markers, with the markers removed
    Heading(String),
    Paragraph(&'a str),
}

impl GeneratedAbstract {
    /// Wrap freshly generated content; new abstracts are always shown
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            visible: true,
        }
    }

    /// Split the content into headings and paragraphs
    ///
    /// Blank lines are skipped. Any line containing `**` becomes a heading.
    pub fn blocks(&self) -> Vec<AbstractBlock<'_>> {
        self.content
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                if line.contains("**") {
                    AbstractBlock::Heading(line.replace("**", "").trim().to_string())
                } else {
                    AbstractBlock::Paragraph(line)
                }
            })
            .collect()
    }
}
