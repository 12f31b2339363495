//! Request orchestration for a review session.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::backend::{Backend, BackendError};
use crate::models::Paper;
use crate::session::archive::{self, ArchiveSummary};
use crate::session::error::{ErrorKind, ErrorState};
use crate::session::export::{self, ExportError};
use crate::session::state::ReviewState;
use crate::utils::{validate_question, validate_search_string};

const ABSTRACT_FAILED: &str = "Failed to generate abstract";
const SEARCH_STRING_FAILED: &str = "Failed to generate search string";
const SEARCH_FAILED: &str = "Failed to search PubMed";
const FIND_FAILED: &str = "Failed to find PDFs";
const BULK_FAILED: &str = "Failed to prepare bulk download";
const SAVE_FAILED: &str = "Failed to save papers.zip";
const NOTHING_AVAILABLE: &str = "No papers available for direct download";

/// Result of a successful bulk download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub path: PathBuf,
    pub papers_sent: usize,
    /// `None` when the saved archive could not be read back
    pub summary: Option<ArchiveSummary>,
}

/// Drives a review session against a [`Backend`]
///
/// Operations take `&mut self`, so at most one request is in flight.
/// Failures are stored in the state's error slot and also returned.
#[derive(Debug)]
pub struct ReviewController {
    backend: Arc<dyn Backend>,
    state: ReviewState,
    output_dir: PathBuf,
}

impl ReviewController {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            state: ReviewState::new(),
            output_dir: PathBuf::from("."),
        }
    }

    /// Directory that receives `papers.zip` and `research-results.json`
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn state(&self) -> &ReviewState {
        &self.state
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn set_question(&mut self, question: impl Into<String>) {
        self.state.set_question(question);
    }

    pub fn edit_search_string(&mut self, search_string: impl Into<String>) {
        self.state.edit_search_string(search_string);
    }

    pub fn next_page(&mut self) -> usize {
        self.state.next_page()
    }

    pub fn prev_page(&mut self) -> usize {
        self.state.prev_page()
    }

    /// Toggle the abstract of the `n`th paper on the current page (1-based)
    ///
    /// Returns the new expanded state, or `None` if there is no such paper.
    pub fn toggle_abstract(&mut self, n: usize) -> Option<bool> {
        let key = self
            .state
            .visible_papers()
            .get(n.checked_sub(1)?)
            .map(|(_, paper)| paper.key())?;
        Some(self.state.toggle_abstract(&key))
    }

    /// Release the busy flag after an in-flight operation was dropped
    ///
    /// Nothing from the abandoned request is applied.
    pub fn interrupt(&mut self) {
        if self.state.busy {
            tracing::debug!(backend = %self.backend.location(), "Request interrupted");
        }
        self.state.finish();
    }

    fn reject(&mut self, kind: ErrorKind, message: impl Into<String>) -> ErrorState {
        let error = ErrorState::new(kind, message);
        self.state.fail(error.clone());
        error
    }

    /// Run one backend call with the busy flag held
    async fn dispatch<T, F, Fut>(
        &mut self,
        kind: ErrorKind,
        failure: &'static str,
        call: F,
    ) -> Result<T, ErrorState>
    where
        F: FnOnce(Arc<dyn Backend>) -> Fut,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        self.state.begin(kind);
        let result = call(Arc::clone(&self.backend)).await;
        self.state.finish();

        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::warn!(
                    backend = %self.backend.location(),
                    category = %kind,
                    error = %err,
                    "{}",
                    failure
                );
                Err(self.reject(kind, failure))
            }
        }
    }

    /// Validate the question and generate an abstract for it
    pub async fn generate_abstract(&mut self) -> Result<(), ErrorState> {
        if let Err(err) = validate_question(&self.state.question) {
            tracing::debug!(reason = %err, "Question rejected");
            return Err(self.reject(ErrorKind::Generate, err.to_string()));
        }

        let question = self.state.question.clone();
        let content = self
            .dispatch(ErrorKind::Generate, ABSTRACT_FAILED, move |backend| async move {
                backend.generate_abstract(&question).await
            })
            .await?;

        self.state.apply_abstract(content);
        Ok(())
    }

    /// Generate a PubMed search string for the current question
    pub async fn generate_search_string(&mut self) -> Result<(), ErrorState> {
        let question = self.state.question.clone();
        let search_string = self
            .dispatch(
                ErrorKind::Generate,
                SEARCH_STRING_FAILED,
                move |backend| async move { backend.generate_search_string(&question).await },
            )
            .await?;

        self.state.apply_search_string(search_string);
        Ok(())
    }

    /// Count PubMed results for the current search string
    pub async fn search_pubmed(&mut self) -> Result<u64, ErrorState> {
        if let Err(err) = validate_search_string(&self.state.search_string) {
            return Err(self.reject(ErrorKind::Search, err.to_string()));
        }

        let search_string = self.state.search_string.clone();
        let count = self
            .dispatch(ErrorKind::Search, SEARCH_FAILED, move |backend| async move {
                backend.pubmed_search(&search_string).await
            })
            .await?;

        self.state.apply_result_count(count);
        Ok(count)
    }

    /// Fetch candidate papers for the current search string
    pub async fn find_pdfs(&mut self) -> Result<usize, ErrorState> {
        let search_string = self.state.search_string.clone();
        let response = self
            .dispatch(ErrorKind::Download, FIND_FAILED, move |backend| async move {
                backend.download_pdfs(&search_string).await
            })
            .await?;

        let found = response.pdfs.len();
        self.state.apply_papers(response.pdfs);
        Ok(found)
    }

    /// Ask the backend to package every available paper and save the archive
    pub async fn bulk_download(&mut self) -> Result<DownloadOutcome, ErrorState> {
        let available: Vec<Paper> = self
            .state
            .available_papers()
            .into_iter()
            .cloned()
            .collect();

        if available.is_empty() {
            return Err(self.reject(ErrorKind::Download, NOTHING_AVAILABLE));
        }

        let papers_sent = available.len();
        let bytes = self
            .dispatch(ErrorKind::Download, BULK_FAILED, move |backend| async move {
                backend.bulk_download(&available).await
            })
            .await?;

        let path = match archive::save_archive(&bytes, &self.output_dir) {
            Ok(path) => path,
            Err(err) => {
                tracing::warn!(error = %err, dir = %self.output_dir.display(), "{}", SAVE_FAILED);
                return Err(self.reject(ErrorKind::Download, SAVE_FAILED));
            }
        };
        tracing::info!(path = %path.display(), bytes = bytes.len(), "Saved bulk download");

        let summary = match archive::inspect_archive(&path) {
            Ok(summary) => Some(summary),
            Err(err) => {
                tracing::warn!(error = %err, path = %path.display(), "Could not read saved archive");
                None
            }
        };

        Ok(DownloadOutcome {
            path,
            papers_sent,
            summary,
        })
    }

    /// Write `research-results.json` for the current session
    pub fn export(&self) -> Result<PathBuf, ExportError> {
        let path = export::write_export(&self.state, &self.output_dir)?;
        tracing::info!(path = %path.display(), papers = self.state.papers.len(), "Exported results");
        Ok(path)
    }

    /// Question to papers in one go, stopping at the first failure
    pub async fn run_pipeline(&mut self, question: impl Into<String>) -> Result<(), ErrorState> {
        self.set_question(question);
        self.generate_abstract().await?;
        self.generate_search_string().await?;
        self.search_pubmed().await?;
        self.find_pdfs().await?;
        Ok(())
    }
}
