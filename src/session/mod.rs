//! Review session: state, request orchestration, paging and output files.
//!
//! The flow a session walks through is
//!
//! 1. enter a question and generate an abstract (the question is validated first),
//! 2. generate a PubMed search string, optionally edit it,
//! 3. count PubMed results,
//! 4. find papers and browse them by availability,
//! 5. export the results or bulk download the available PDFs.
//!
//! Nothing enforces this order; [`Affordances`] only reports which steps
//! currently make sense.

mod archive;
mod controller;
mod error;
mod export;
pub mod pagination;
mod state;

pub use archive::{inspect_archive, save_archive, ArchiveError, ArchiveSummary, ARCHIVE_FILE_NAME};
pub use controller::{DownloadOutcome, ReviewController};
pub use error::{ErrorKind, ErrorState};
pub use export::{write_export, ExportDocument, ExportEntry, ExportError, EXPORT_FILE_NAME};
pub use pagination::{Partition, PAGE_SIZE};
pub use state::{Affordances, ReviewState};
