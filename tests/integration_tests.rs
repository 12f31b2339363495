//! Integration tests for litreview
//!
//! These tests drive a `ReviewController` against a mock HTTP backend and
//! check what goes over the wire and what lands on disk.

use litreview::backend::HttpBackend;
use litreview::models::{BulkDownloadRequest, Paper, PaperBuilder};
use litreview::session::{ErrorKind, Partition, ReviewController, PAGE_SIZE};
use litreview::utils::HttpClient;
use mockito::{Matcher, Server};
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use tempfile::TempDir;

fn controller(server: &Server) -> ReviewController {
    let client = HttpClient::new().expect("client");
    ReviewController::new(Arc::new(HttpBackend::new(client, server.url())))
}

fn paper_json(title: &str, doi: Option<&str>, available: bool, findable: bool) -> serde_json::Value {
    let resolver = doi.map(|d| format!("https://doi.org/{}", d));
    let scihub = doi.map(|d| format!("https://sci-hub.se/{}", d));
    let unpaywall = available.then_some("https://oa.example.org/paper.pdf");

    json!({
        "title": title,
        "authors": "Doe J, Roe R",
        "year": "2021",
        "journal": "Journal of Dermatology",
        "doi": doi,
        "pmid": "12345",
        "pubmed_url": "https://pubmed.ncbi.nlm.nih.gov/12345/",
        "abstract": "Background: ...",
        "access_urls": {
            "libkey": resolver,
            "doi": resolver,
            "unpaywall": unpaywall,
            "scihub": scihub
        },
        "availability": {
            "is_available": available,
            "is_findable": findable,
            "sources": []
        }
    })
}

fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, content) in files {
        writer
            .start_file(*name, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[tokio::test]
async fn test_question_without_mark_sends_nothing() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/generate-abstract")
        .expect(0)
        .create_async()
        .await;

    let mut review = controller(&server);
    review.set_question("What is eczema");
    let err = review.generate_abstract().await.unwrap_err();

    assert_eq!(err.message, "Question should end with a question mark");
    assert_eq!(err.kind, ErrorKind::Generate);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_short_question_sends_nothing() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/generate-abstract")
        .expect(0)
        .create_async()
        .await;

    let mut review = controller(&server);
    review.set_question("Eczema?");
    let err = review.generate_abstract().await.unwrap_err();

    assert_eq!(err.message, "Question must be at least 10 characters long");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_generate_abstract_request_body() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/generate-abstract")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({"question": "What is eczema?"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"abstract": "**Background**\nEczema is a chronic skin condition."}"#)
        .expect(1)
        .create_async()
        .await;

    let mut review = controller(&server);
    review.set_question("What is eczema?");
    review.generate_abstract().await.unwrap();

    mock.assert_async().await;
    let generated = &review.state().generated_abstract;
    assert!(generated.visible);
    assert!(generated.content.starts_with("**Background**"));
}

#[tokio::test]
async fn test_non_success_status_gives_generic_message() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/generate-search-string")
        .with_status(500)
        .with_body(r#"{"error": "model overloaded"}"#)
        .create_async()
        .await;

    let mut review = controller(&server);
    review.set_question("What is eczema?");
    let err = review.generate_search_string().await.unwrap_err();

    assert_eq!(err.message, "Failed to generate search string");
    assert_eq!(review.state().error.as_ref(), Some(&err));
    assert!(!review.state().busy);
}

#[tokio::test]
async fn test_zero_results_still_allow_find_pdfs() {
    let mut server = Server::new_async().await;
    let search = server
        .mock("POST", "/pubmed-search")
        .match_body(Matcher::Json(json!({"search_string": "eczema[MeSH]"})))
        .with_status(200)
        .with_body(r#"{"result_count": 0}"#)
        .create_async()
        .await;
    let find = server
        .mock("POST", "/download-pdfs")
        .match_body(Matcher::Json(json!({"search_string": "eczema[MeSH]"})))
        .with_status(200)
        .with_body(r#"{"pdfs": []}"#)
        .create_async()
        .await;

    let mut review = controller(&server);
    review.edit_search_string("eczema[MeSH]");
    assert_eq!(review.search_pubmed().await.unwrap(), 0);
    assert_eq!(review.state().result_count, Some(0));
    assert!(review
        .state()
        .affordances()
        .contains(litreview::session::Affordances::FIND_PDFS));

    review.find_pdfs().await.unwrap();
    search.assert_async().await;
    find.assert_async().await;
}

#[tokio::test]
async fn test_find_pdfs_resets_page_and_partitions() {
    let mut server = Server::new_async().await;
    let mut pdfs: Vec<serde_json::Value> = (0..(PAGE_SIZE + 10))
        .map(|i| {
            let doi = format!("10.1/{}", i);
            paper_json(&format!("Paper {}", i), Some(doi.as_str()), false, true)
        })
        .collect();
    pdfs.push(paper_json("Nothing known", None, false, false));
    pdfs.push(paper_json("Open access", Some("10.1/oa"), true, true));

    server
        .mock("POST", "/download-pdfs")
        .with_status(200)
        .with_body(
            json!({"pdfs": pdfs, "total_results": 62, "available_count": 1, "findable_count": 61})
                .to_string(),
        )
        .expect(2)
        .create_async()
        .await;

    let mut review = controller(&server);
    review.edit_search_string("eczema");
    review.find_pdfs().await.unwrap();

    let state = review.state();
    assert_eq!(state.papers.len(), PAGE_SIZE + 12);
    assert_eq!(state.page_count(), 2);
    let counts = litreview::session::pagination::partition_counts(&state.papers);
    assert_eq!(counts, [1, PAGE_SIZE + 10, 1]);
    assert_eq!(
        litreview::session::pagination::partition(&state.papers, Partition::Available)[0].title,
        "Open access"
    );

    review.next_page();
    assert_eq!(review.state().page, 2);
    review.next_page();
    assert_eq!(review.state().page, 2);

    review.find_pdfs().await.unwrap();
    assert_eq!(review.state().page, 1);
}

#[tokio::test]
async fn test_find_pdfs_keeps_papers_with_null_text() {
    let mut server = Server::new_async().await;
    let mut untitled = paper_json("placeholder", Some("10.1/n"), false, true);
    untitled["title"] = serde_json::Value::Null;
    untitled["abstract"] = serde_json::Value::Null;

    server
        .mock("POST", "/download-pdfs")
        .with_status(200)
        .with_body(
            json!({"pdfs": [paper_json("Open access", Some("10.1/oa"), true, true), untitled]})
                .to_string(),
        )
        .create_async()
        .await;

    let mut review = controller(&server);
    review.edit_search_string("eczema");
    assert_eq!(review.find_pdfs().await.unwrap(), 2);

    let state = review.state();
    assert!(state.error.is_none());
    assert_eq!(state.papers[0].title, "Open access");
    assert_eq!(state.papers[1].title, "");
    assert_eq!(state.papers[1].r#abstract, "");
    assert_eq!(state.papers[1].doi.as_deref(), Some("10.1/n"));
}

#[tokio::test]
async fn test_malformed_papers_response() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/download-pdfs")
        .with_status(200)
        .with_body(r#"{"papers": "not what we expect"}"#)
        .create_async()
        .await;

    let mut review = controller(&server);
    review.edit_search_string("eczema");
    let err = review.find_pdfs().await.unwrap_err();
    assert_eq!(err.message, "Failed to find PDFs");
    assert_eq!(err.kind, ErrorKind::Download);
}

#[tokio::test]
async fn test_bulk_download_without_available_papers_sends_nothing() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/download-pdfs")
        .with_status(200)
        .with_body(json!({"pdfs": [paper_json("Closed", Some("10.1/c"), false, true)]}).to_string())
        .create_async()
        .await;
    let bulk = server
        .mock("POST", "/bulk-download")
        .expect(0)
        .create_async()
        .await;

    let mut review = controller(&server);
    review.edit_search_string("eczema");
    review.find_pdfs().await.unwrap();
    let err = review.bulk_download().await.unwrap_err();

    assert_eq!(err.message, "No papers available for direct download");
    bulk.assert_async().await;
}

#[tokio::test]
async fn test_bulk_download_sends_available_and_writes_zip() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;

    let open = paper_json("Open access", Some("10.1/oa"), true, true);
    let closed = paper_json("Closed", Some("10.1/c"), false, true);
    server
        .mock("POST", "/download-pdfs")
        .with_status(200)
        .with_body(json!({"pdfs": [open.clone(), closed]}).to_string())
        .create_async()
        .await;

    let open_paper: Paper = serde_json::from_value(open).unwrap();
    let expected_body = serde_json::to_value(BulkDownloadRequest {
        papers: vec![open_paper],
    })
    .unwrap();
    let archive = zip_bytes(&[
        ("Open_access.pdf", b"%PDF-1.4 test"),
        ("papers_manifest.txt", b"Open access"),
    ]);
    let bulk = server
        .mock("POST", "/bulk-download")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(expected_body))
        .with_status(200)
        .with_header("content-type", "application/zip")
        .with_body(archive.clone())
        .expect(1)
        .create_async()
        .await;

    let mut review = controller(&server).with_output_dir(dir.path());
    review.edit_search_string("eczema");
    review.find_pdfs().await.unwrap();
    let outcome = review.bulk_download().await.unwrap();

    bulk.assert_async().await;
    assert_eq!(outcome.papers_sent, 1);
    assert_eq!(std::fs::read(dir.path().join("papers.zip")).unwrap(), archive);
    let summary = outcome.summary.unwrap();
    assert_eq!(summary.pdf_count, 1);
    assert!(summary.has_manifest);
}

#[tokio::test]
async fn test_bulk_download_failure() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/download-pdfs")
        .with_status(200)
        .with_body(json!({"pdfs": [paper_json("Open", Some("10.1/o"), true, true)]}).to_string())
        .create_async()
        .await;
    server
        .mock("POST", "/bulk-download")
        .with_status(504)
        .create_async()
        .await;

    let mut review = controller(&server).with_output_dir(dir.path());
    review.edit_search_string("eczema");
    review.find_pdfs().await.unwrap();
    let err = review.bulk_download().await.unwrap_err();

    assert_eq!(err.message, "Failed to prepare bulk download");
    assert!(!dir.path().join("papers.zip").exists());
}

#[tokio::test]
async fn test_export_contains_only_title_and_urls() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/pubmed-search")
        .with_status(200)
        .with_body(r#"{"result_count": 321}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/download-pdfs")
        .with_status(200)
        .with_body(json!({"pdfs": [paper_json("Open", Some("10.1/o"), true, true)]}).to_string())
        .create_async()
        .await;

    let mut review = controller(&server).with_output_dir(dir.path());
    review.set_question("What is eczema?");
    review.edit_search_string("eczema");
    review.search_pubmed().await.unwrap();
    review.find_pdfs().await.unwrap();
    let path = review.export().unwrap();

    assert_eq!(path, dir.path().join("research-results.json"));
    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc["question"], "What is eczema?");
    assert_eq!(doc["searchString"], "eczema");
    assert_eq!(doc["resultCount"], 321);
    let entry = doc["pdfs"][0].as_object().unwrap();
    assert_eq!(entry.len(), 2);
    assert_eq!(entry["title"], "Open");
    assert_eq!(entry["urls"]["doi"], "https://doi.org/10.1/o");
    assert_eq!(entry["urls"]["unpaywall"], "https://oa.example.org/paper.pdf");
}

#[tokio::test]
async fn test_full_pipeline_against_http_backend() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/generate-abstract")
        .with_status(200)
        .with_body(r#"{"abstract": "Eczema is common."}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/generate-search-string")
        .match_body(Matcher::Json(json!({"question": "What is eczema?"})))
        .with_status(200)
        .with_body(r#"{"search_string": "eczema[MeSH Terms]"}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/pubmed-search")
        .match_body(Matcher::Json(json!({"search_string": "eczema[MeSH Terms]"})))
        .with_status(200)
        .with_body(r#"{"result_count": 12}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/download-pdfs")
        .with_status(200)
        .with_body(json!({"pdfs": [paper_json("Open", Some("10.1/o"), true, true)]}).to_string())
        .create_async()
        .await;

    let mut review = controller(&server);
    tokio_test::assert_ok!(review.run_pipeline("What is eczema?").await);

    let state = review.state();
    assert_eq!(state.search_string, "eczema[MeSH Terms]");
    assert_eq!(state.result_count, Some(12));
    assert_eq!(state.papers.len(), 1);
    assert!(state.error.is_none());
}

#[test]
fn test_paper_wire_round_trip_keeps_shape() {
    let paper = PaperBuilder::new("Eczema in infants")
        .doi("10.1/inf")
        .pmid("999")
        .availability(false, true)
        .build();
    let value = serde_json::to_value(&paper).unwrap();
    assert_eq!(value["abstract"], "");
    assert_eq!(value["access_urls"]["scihub"], "https://sci-hub.se/10.1/inf");
    assert_eq!(value["availability"]["is_findable"], true);
}
