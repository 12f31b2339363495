//! Mock backend for testing purposes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::backend::{Backend, BackendError, Endpoint};
use crate::models::{Paper, PdfsResponse};

/// Scripted outcome for one endpoint
#[derive(Debug, Clone)]
enum Scripted {
    Text(String),
    Count(u64),
    Papers(Vec<Paper>),
    Archive(Vec<u8>),
    Fail(reqwest::StatusCode),
}

/// A mock backend that returns predefined responses and records every call.
///
/// Endpoints without a scripted response fail with `503 Service Unavailable`.
#[derive(Debug, Default)]
pub struct MockBackend {
    responses: Mutex<HashMap<Endpoint, Scripted>>,
    calls: Mutex<Vec<(Endpoint, String)>>,
    bulk_requests: Mutex<Vec<Vec<Paper>>>,
}

impl MockBackend {
    /// Create a new mock backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self, endpoint: Endpoint, response: Scripted) {
        if let Ok(mut guard) = self.responses.lock() {
            guard.insert(endpoint, response);
        }
    }

    pub fn set_abstract(&self, content: impl Into<String>) {
        self.script(Endpoint::GenerateAbstract, Scripted::Text(content.into()));
    }

    pub fn set_search_string(&self, search_string: impl Into<String>) {
        self.script(
            Endpoint::GenerateSearchString,
            Scripted::Text(search_string.into()),
        );
    }

    pub fn set_result_count(&self, count: u64) {
        self.script(Endpoint::PubmedSearch, Scripted::Count(count));
    }

    pub fn set_papers(&self, papers: Vec<Paper>) {
        self.script(Endpoint::DownloadPdfs, Scripted::Papers(papers));
    }

    pub fn set_archive(&self, bytes: Vec<u8>) {
        self.script(Endpoint::BulkDownload, Scripted::Archive(bytes));
    }

    /// Make an endpoint answer with the given status
    pub fn fail(&self, endpoint: Endpoint, status: u16) {
        let status = reqwest::StatusCode::from_u16(status)
            .unwrap_or(reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        self.script(endpoint, Scripted::Fail(status));
    }

    /// Number of requests made to an endpoint
    pub fn call_count(&self, endpoint: Endpoint) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.iter().filter(|(e, _)| *e == endpoint).count())
            .unwrap_or(0)
    }

    /// Every request so far with its text argument, in order
    pub fn calls(&self) -> Vec<(Endpoint, String)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Paper lists sent to `/bulk-download`
    pub fn bulk_requests(&self) -> Vec<Vec<Paper>> {
        self.bulk_requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn respond(&self, endpoint: Endpoint, argument: &str) -> Result<Scripted, BackendError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((endpoint, argument.to_string()));
        }

        let scripted = self
            .responses
            .lock()
            .ok()
            .and_then(|guard| guard.get(&endpoint).cloned());

        match scripted {
            Some(Scripted::Fail(status)) => Err(BackendError::Status { endpoint, status }),
            Some(other) => Ok(other),
            None => Err(BackendError::Status {
                endpoint,
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            }),
        }
    }

    fn mismatch(endpoint: Endpoint) -> BackendError {
        BackendError::Parse(format!("mock scripted the wrong payload for {}", endpoint))
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn location(&self) -> &str {
        "mock"
    }

    async fn generate_abstract(&self, question: &str) -> Result<String, BackendError> {
        match self.respond(Endpoint::GenerateAbstract, question)? {
            Scripted::Text(text) => Ok(text),
            _ => Err(Self::mismatch(Endpoint::GenerateAbstract)),
        }
    }

    async fn generate_search_string(&self, question: &str) -> Result<String, BackendError> {
        match self.respond(Endpoint::GenerateSearchString, question)? {
            Scripted::Text(text) => Ok(text),
            _ => Err(Self::mismatch(Endpoint::GenerateSearchString)),
        }
    }

    async fn pubmed_search(&self, search_string: &str) -> Result<u64, BackendError> {
        match self.respond(Endpoint::PubmedSearch, search_string)? {
            Scripted::Count(count) => Ok(count),
            _ => Err(Self::mismatch(Endpoint::PubmedSearch)),
        }
    }

    async fn download_pdfs(&self, search_string: &str) -> Result<PdfsResponse, BackendError> {
        match self.respond(Endpoint::DownloadPdfs, search_string)? {
            Scripted::Papers(pdfs) => Ok(PdfsResponse {
                total_results: Some(pdfs.len() as u64),
                available_count: None,
                findable_count: None,
                pdfs,
            }),
            _ => Err(Self::mismatch(Endpoint::DownloadPdfs)),
        }
    }

    async fn bulk_download(&self, papers: &[Paper]) -> Result<Vec<u8>, BackendError> {
        if let Ok(mut requests) = self.bulk_requests.lock() {
            requests.push(papers.to_vec());
        }
        match self.respond(Endpoint::BulkDownload, "")? {
            Scripted::Archive(bytes) => Ok(bytes),
            _ => Err(Self::mismatch(Endpoint::BulkDownload)),
        }
    }
}
