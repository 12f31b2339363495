//! Saving and inspecting the bulk download archive.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use zip::ZipArchive;

/// File name of the saved archive
pub const ARCHIVE_FILE_NAME: &str = "papers.zip";

/// Manifest the backend places inside each archive
pub const MANIFEST_FILE_NAME: &str = "papers_manifest.txt";

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// What a saved archive contains
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub entries: usize,
    pub pdf_count: usize,
    pub has_manifest: bool,
}

/// Write the archive bytes to `dir/papers.zip`
pub fn save_archive(bytes: &[u8], dir: &Path) -> Result<PathBuf, ArchiveError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(ARCHIVE_FILE_NAME);
    fs::write(&path, bytes)?;
    Ok(path)
}

/// Count the PDFs in a saved archive and look for the manifest
pub fn inspect_archive(path: &Path) -> Result<ArchiveSummary, ArchiveError> {
    let file = fs::File::open(path)?;
    let mut archive = ZipArchive::new(file)?;

    let mut summary = ArchiveSummary {
        entries: archive.len(),
        pdf_count: 0,
        has_manifest: false,
    };

    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name();
        if name.to_lowercase().ends_with(".pdf") {
            summary.pdf_count += 1;
        }
        if name.rsplit('/').next() == Some(MANIFEST_FILE_NAME) {
            summary.has_manifest = true;
        }
    }

    Ok(summary)
}

#[cfg(test)]
pub(crate) fn build_zip(files: &[(&str, &[u8])]) -> Vec<u8> {
    use std::io::Write;

    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, content) in files {
        writer
            .start_file(*name, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_inspect() {
        let dir = TempDir::new().unwrap();
        let bytes = build_zip(&[
            ("Eczema_review.pdf", b"%PDF-1.4"),
            ("Dupilumab.PDF", b"%PDF-1.4"),
            (MANIFEST_FILE_NAME, b"2 papers"),
        ]);

        let path = save_archive(&bytes, dir.path()).unwrap();
        assert_eq!(path, dir.path().join(ARCHIVE_FILE_NAME));

        let summary = inspect_archive(&path).unwrap();
        assert_eq!(
            summary,
            ArchiveSummary {
                entries: 3,
                pdf_count: 2,
                has_manifest: true,
            }
        );
    }

    #[test]
    fn test_inspect_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = save_archive(b"not a zip", dir.path()).unwrap();
        assert!(matches!(inspect_archive(&path), Err(ArchiveError::Zip(_))));
    }
}
