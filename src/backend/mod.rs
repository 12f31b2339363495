//! Review backend client.
//!
//! All of the actual work (abstract generation, search-string synthesis,
//! PubMed querying, PDF availability resolution and zip packaging) happens in
//! an external HTTP service. This module defines the [`Backend`] trait the
//! session talks to, and [`HttpBackend`], the implementation that speaks the
//! service's JSON protocol.
//!
//! # Endpoints
//!
//! | Operation | Path | Request | Response |
//! |---|---|---|---|
//! | Generate abstract | `/generate-abstract` | `{question}` | `{abstract}` |
//! | Generate search string | `/generate-search-string` | `{question}` | `{search_string}` |
//! | Search count | `/pubmed-search` | `{search_string}` | `{result_count}` |
//! | Find PDFs | `/download-pdfs` | `{search_string}` | `{pdfs, ...}` |
//! | Bulk download | `/bulk-download` | `{papers}` | zip bytes |
//!
//! Every call is a `POST` with a JSON body. Any non-2xx status is an error and
//! the response body is not inspected.

pub mod mock;

pub use mock::MockBackend;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{
    AbstractResponse, BulkDownloadRequest, Paper, PdfsResponse, QuestionRequest,
    ResultCountResponse, SearchStringRequest, SearchStringResponse,
};
use crate::utils::HttpClient;

/// Default backend location
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";

/// Backend endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    GenerateAbstract,
    GenerateSearchString,
    PubmedSearch,
    DownloadPdfs,
    BulkDownload,
}

impl Endpoint {
    /// URL path of this endpoint, relative to the backend base
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::GenerateAbstract => "/generate-abstract",
            Endpoint::GenerateSearchString => "/generate-search-string",
            Endpoint::PubmedSearch => "/pubmed-search",
            Endpoint::DownloadPdfs => "/download-pdfs",
            Endpoint::BulkDownload => "/bulk-download",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// The Backend trait is the seam between the review session and the service
/// that does the work.
///
/// Each method issues exactly one request and returns the typed payload.
#[async_trait]
pub trait Backend: Send + Sync + std::fmt::Debug {
    /// Human-readable location of this backend, used in logs
    fn location(&self) -> &str;

    /// Generate a structured abstract answering the question
    async fn generate_abstract(&self, question: &str) -> Result<String, BackendError>;

    /// Generate a PubMed search string for the question
    async fn generate_search_string(&self, question: &str) -> Result<String, BackendError>;

    /// Count PubMed results for the search string
    async fn pubmed_search(&self, search_string: &str) -> Result<u64, BackendError>;

    /// Retrieve candidate papers with availability information
    async fn download_pdfs(&self, search_string: &str) -> Result<PdfsResponse, BackendError>;

    /// Package the given papers into a zip archive
    async fn bulk_download(&self, papers: &[Paper]) -> Result<Vec<u8>, BackendError>;
}

/// Errors that can occur when talking to the backend
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Connection, transport or timeout failure
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status
    #[error("{endpoint} returned status {status}")]
    Status {
        endpoint: Endpoint,
        status: reqwest::StatusCode,
    },

    /// The response body did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        BackendError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Parse(format!("JSON: {}", err))
    }
}

/// HTTP implementation of [`Backend`]
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: HttpClient,
    base_url: String,
}

impl HttpBackend {
    /// Create a backend client rooted at `base_url`
    pub fn new(client: HttpClient, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Backend at [`DEFAULT_BACKEND_URL`] with a default client
    pub fn local() -> Result<Self, BackendError> {
        Ok(Self::new(HttpClient::new()?, DEFAULT_BACKEND_URL))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// POST a JSON body and return the raw body of a successful response
    async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: Endpoint,
        body: &B,
    ) -> Result<Vec<u8>, BackendError> {
        tracing::debug!(endpoint = %endpoint, backend = %self.base_url, "Sending backend request");

        let response = self
            .client
            .client()
            .post(self.url(endpoint))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status { endpoint, status });
        }

        let bytes = response.bytes().await?;
        tracing::trace!(endpoint = %endpoint, bytes = bytes.len(), "Backend response received");
        Ok(bytes.to_vec())
    }

    async fn post_json<B, R>(&self, endpoint: Endpoint, body: &B) -> Result<R, BackendError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let bytes = self.post(endpoint, body).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    fn location(&self) -> &str {
        &self.base_url
    }

    async fn generate_abstract(&self, question: &str) -> Result<String, BackendError> {
        let body = QuestionRequest {
            question: question.to_string(),
        };
        let response: AbstractResponse = self.post_json(Endpoint::GenerateAbstract, &body).await?;
        Ok(response.content)
    }

    async fn generate_search_string(&self, question: &str) -> Result<String, BackendError> {
        let body = QuestionRequest {
            question: question.to_string(),
        };
        let response: SearchStringResponse = self
            .post_json(Endpoint::GenerateSearchString, &body)
            .await?;
        Ok(response.search_string)
    }

    async fn pubmed_search(&self, search_string: &str) -> Result<u64, BackendError> {
        let body = SearchStringRequest {
            search_string: search_string.to_string(),
        };
        let response: ResultCountResponse = self.post_json(Endpoint::PubmedSearch, &body).await?;
        Ok(response.result_count)
    }

    async fn download_pdfs(&self, search_string: &str) -> Result<PdfsResponse, BackendError> {
        let body = SearchStringRequest {
            search_string: search_string.to_string(),
        };
        let response: PdfsResponse = self.post_json(Endpoint::DownloadPdfs, &body).await?;

        tracing::debug!(
            papers = response.pdfs.len(),
            total_results = ?response.total_results,
            available_count = ?response.available_count,
            findable_count = ?response.findable_count,
            "Backend returned papers"
        );

        Ok(response)
    }

    async fn bulk_download(&self, papers: &[Paper]) -> Result<Vec<u8>, BackendError> {
        let body = BulkDownloadRequest {
            papers: papers.to_vec(),
        };
        self.post(Endpoint::BulkDownload, &body).await
    }
}
