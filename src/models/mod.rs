//! Data models for papers and the review backend's request/response bodies.

mod paper;
mod review;

pub use paper::{AccessLink, AccessUrls, Availability, Paper, PaperBuilder, PaperKey};
pub use review::{
    AbstractBlock, AbstractResponse, BulkDownloadRequest, GeneratedAbstract, PdfsResponse,
    QuestionRequest, ResultCountResponse, SearchStringRequest, SearchStringResponse,
};
