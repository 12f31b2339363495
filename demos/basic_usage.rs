//! Basic usage example for the litreview library.
//!
//! Walks one research question through the backend step by step and prints
//! the directly downloadable papers. Expects a backend on
//! `http://localhost:5000` (or `LITREVIEW_BACKEND__BASE_URL`).

use litreview::config::load_config;
use litreview::session::{Partition, ReviewController};
use litreview::utils::HttpClient;
use litreview::HttpBackend;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(None)?;
    let client = HttpClient::builder()
        .timeout(config.backend.timeout())
        .build()?;
    let backend = HttpBackend::new(client, config.backend.base_url.clone());

    let mut review = ReviewController::new(Arc::new(backend))
        .with_output_dir(config.output.directory.clone());

    review.set_question("Does dupilumab improve itch in adults with atopic dermatitis?");

    review.generate_abstract().await?;
    println!("{}\n", review.state().generated_abstract.content);

    review.generate_search_string().await?;
    println!("Search string: {}", review.state().search_string);

    let count = review.search_pubmed().await?;
    println!("PubMed results: {}", count);

    let found = review.find_pdfs().await?;
    println!("Papers returned: {}\n", found);

    for (partition, paper) in review.state().visible_papers() {
        if partition == Partition::Available {
            println!("- {} ({})", paper.title, paper.year);
            for link in paper.download_links() {
                if let Some(url) = link.url {
                    println!("    {}: {}", link.label, url);
                }
            }
        }
    }

    let path = review.export()?;
    println!("\nExported to {}", path.display());

    Ok(())
}
