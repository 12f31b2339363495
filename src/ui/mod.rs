//! Terminal rendering for review sessions.
//!
//! Render functions return `String`s so the same output can go to stdout,
//! be asserted on in tests, or be embedded in other views.

use owo_colors::OwoColorize;
use std::fmt::Write as _;
use std::time::Duration;

use crate::models::{AbstractBlock, AccessLink, GeneratedAbstract, Paper};
use crate::session::pagination::{self, Partition};
use crate::session::{Affordances, DownloadOutcome, ErrorState, ReviewState};
use crate::utils::{format_year, paper_table_columns, truncate_at_word, truncate_with_ellipsis, wrap_text};

/// Status icons for different operations.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Error => "✗",
        Status::Warning => "⚠",
        Status::Info => "ℹ",
        Status::Search => "🔍",
        Status::Download => "↓",
    }
}

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
    Info,
    Search,
    Download,
}

/// A status message with a colored icon
pub fn status_line(status: Status, msg: &str) -> String {
    let icon = status_icon(status);
    match status {
        Status::Success => format!("{} {}", icon.green().bold(), msg),
        Status::Error => format!("{} {}", icon.red().bold(), msg.red()),
        Status::Warning => format!("{} {}", icon.yellow().bold(), msg),
        Status::Info => format!("{} {}", icon.cyan().bold(), msg),
        Status::Search => format!("{} {}", icon.yellow(), msg),
        Status::Download => format!("{} {}", icon.magenta(), msg),
    }
}

pub fn print_status(status: Status, msg: &str) {
    println!("{}", status_line(status, msg));
}

/// Welcome banner for the interactive session.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");

    println!();
    println!("╔═══════════════════════════════════════════════════════════════════════╗");
    println!(
        "║  {} {}                                           ║",
        "🔬 AI Literature Review".bold(),
        format!("v{:<8}", version).dimmed()
    );
    println!("║                                                                       ║");
    println!("║  Question → abstract → PubMed search string → papers                  ║");
    println!(
        "║  Go to Elicit > {}                                   ║",
        "https://elicit.com".cyan().underline()
    );
    println!("║                                                                       ║");
    println!("║  Type `help` for commands, `quit` to leave.                           ║");
    println!("╚═══════════════════════════════════════════════════════════════════════╝");
    println!();
}

/// A section header.
pub fn section(title: &str) -> String {
    format!("\n{}", format!("━━━ {} ━━━", title).bold().cyan())
}

pub fn print_section(title: &str) {
    println!("{}", section(title));
}

/// Format a number with thousands separators.
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Generated abstract: headings in bold, paragraphs wrapped
pub fn render_abstract(generated: &GeneratedAbstract, width: usize) -> String {
    let mut out = section("Generated Abstract");
    for block in generated.blocks() {
        match block {
            AbstractBlock::Heading(text) => {
                let _ = write!(out, "\n\n{}", text.bold());
            }
            AbstractBlock::Paragraph(text) => {
                for line in wrap_text(text, width) {
                    let _ = write!(out, "\n{}", line);
                }
            }
        }
    }
    out
}

pub fn render_search_string(search_string: &str) -> String {
    format!(
        "{}\n{}",
        section("PubMed Search String"),
        search_string.yellow()
    )
}

/// Result count, green when there are hits and red when there are none
pub fn render_result_count(count: Option<u64>) -> String {
    match count {
        None => format!("{}", "Not searched yet".dimmed()),
        Some(0) => format!("PubMed results: {}", "0".red().bold()),
        Some(n) => format!("PubMed results: {}", format_number(n).green().bold()),
    }
}

/// Error next to the control that produced it
pub fn render_error(error: &ErrorState) -> String {
    format!(
        "{} {}",
        status_line(Status::Error, &error.message),
        format!("[{}]", error.kind).dimmed()
    )
}

fn render_links(links: &[AccessLink]) -> String {
    links
        .iter()
        .map(|link| match &link.url {
            Some(url) => format!("{} {}", format!("{}:", link.label).bold(), url.blue()),
            None => format!("{}", link.label.dimmed()),
        })
        .collect::<Vec<_>>()
        .join("\n      ")
}

fn render_paper(out: &mut String, n: usize, which: Partition, paper: &Paper, expanded: bool, width: usize) {
    let text_width = width.saturating_sub(6);
    let _ = write!(
        out,
        "\n{} {}",
        format!("[{:>2}]", n).dimmed(),
        truncate_at_word(&paper.title, text_width).bold()
    );
    let _ = write!(
        out,
        "\n      {} · {} · {}",
        truncate_with_ellipsis(&paper.authors, text_width / 2),
        paper.year.yellow(),
        truncate_with_ellipsis(&paper.journal, text_width / 3).italic()
    );

    let links = match which {
        Partition::Available => paper.download_links(),
        Partition::Findable | Partition::Unavailable => paper.lookup_links(),
    };
    if !links.is_empty() {
        let _ = write!(out, "\n      {}", render_links(&links));
    }

    if expanded && !paper.r#abstract.is_empty() {
        for line in wrap_text(&paper.r#abstract, text_width) {
            let _ = write!(out, "\n      {}", line.dimmed());
        }
    }
}

/// Current page of papers, grouped by availability
///
/// Papers are numbered in display order; `toggle <n>` uses the same numbers.
pub fn render_papers(state: &ReviewState, width: usize) -> String {
    let available = state.available_papers().len();
    let mut out = section(&format!("Papers Found ({})", state.papers.len()));
    if state.papers.is_empty() {
        return out;
    }
    let _ = write!(
        out,
        "\n{}",
        format!("Download Available ({})", available).magenta().bold()
    );

    let mut n = 0;
    for which in Partition::ALL {
        let count = pagination::partition(&state.papers, which).len();
        let page = pagination::page_slice(&state.papers, which, state.page, pagination::PAGE_SIZE);

        let _ = write!(
            out,
            "\n\n{} {}\n{}",
            which.title().bold().underline(),
            format!("({})", count).dimmed(),
            which.description().dimmed()
        );
        for paper in page {
            n += 1;
            render_paper(&mut out, n, which, paper, state.is_expanded(paper), width);
        }
    }

    let _ = write!(out, "\n\n{}", render_pagination(state));
    out
}

/// Current page of papers as one comfy-table per partition
pub fn render_paper_tables(state: &ReviewState, width: usize) -> String {
    use comfy_table::{Attribute, Cell, Table};

    let (title_w, authors_w, journal_w, _) = paper_table_columns(width);
    let mut out = String::new();
    let mut n = 0;

    for which in Partition::ALL {
        let page = pagination::page_slice(&state.papers, which, state.page, pagination::PAGE_SIZE);
        if page.is_empty() {
            continue;
        }

        let mut table = Table::new();
        table.load_preset(comfy_table::presets::UTF8_FULL);
        table.set_header(vec!["#", "Title", "Authors", "Year", "Journal"]);
        for paper in page {
            n += 1;
            table.add_row(vec![
                Cell::new(n),
                Cell::new(truncate_at_word(&paper.title, title_w)).add_attribute(Attribute::Bold),
                Cell::new(truncate_with_ellipsis(&paper.authors, authors_w)),
                Cell::new(format_year(&paper.year)),
                Cell::new(truncate_with_ellipsis(&paper.journal, journal_w)),
            ]);
        }
        let _ = write!(out, "{}\n{table}\n", which.title().bold());
    }

    let _ = write!(out, "{}", render_pagination(state));
    out
}

/// Partition counts as a small table
pub fn render_partition_summary(papers: &[Paper]) -> String {
    use comfy_table::{Cell, Table};

    let counts = pagination::partition_counts(papers);
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Availability", "Papers", "Meaning"]);
    for (which, count) in Partition::ALL.iter().zip(counts) {
        table.add_row(vec![
            Cell::new(which.title()),
            Cell::new(count),
            Cell::new(which.description()),
        ]);
    }
    table.to_string()
}

pub fn render_pagination(state: &ReviewState) -> String {
    let pages = state.page_count().max(1);
    let enabled = state.affordances();
    let mut parts = Vec::with_capacity(3);
    if enabled.contains(Affordances::PREV_PAGE) {
        parts.push(format!("{}", "‹ prev".dimmed()));
    }
    parts.push(format!("{}", format!("Page {} of {}", state.page, pages).cyan()));
    if enabled.contains(Affordances::NEXT_PAGE) {
        parts.push(format!("{}", "next ›".dimmed()));
    }
    parts.join(" ")
}

/// Result line for a completed bulk download
pub fn render_download(outcome: &DownloadOutcome) -> String {
    let mut out = status_line(
        Status::Download,
        &format!(
            "Saved {} ({} papers requested)",
            outcome.path.display(),
            outcome.papers_sent
        ),
    );
    match &outcome.summary {
        Some(summary) => {
            let manifest = if summary.has_manifest {
                "manifest included"
            } else {
                "no manifest"
            };
            let _ = write!(
                out,
                "\n  {} PDFs in archive, {}",
                summary.pdf_count.to_string().green().bold(),
                manifest
            );
        }
        None => {
            let _ = write!(out, "\n  {}", "Archive contents could not be read".yellow());
        }
    }
    out
}

/// Hint listing the commands that make sense right now
pub fn render_next_steps(enabled: Affordances) -> String {
    let steps = [
        (Affordances::GENERATE_ABSTRACT, "abstract"),
        (Affordances::GENERATE_SEARCH_STRING, "search-string"),
        (Affordances::SEARCH_PUBMED, "search"),
        (Affordances::FIND_PDFS, "find"),
        (Affordances::BULK_DOWNLOAD, "download"),
        (Affordances::EXPORT, "export"),
        (Affordances::PREV_PAGE, "prev"),
        (Affordances::NEXT_PAGE, "next"),
    ];
    let available: Vec<&str> = steps
        .iter()
        .filter(|(flag, _)| enabled.contains(*flag))
        .map(|(_, name)| *name)
        .collect();

    if available.is_empty() {
        format!("{}", "Set a question with `question <text>`".dimmed())
    } else {
        format!("{} {}", "Available:".dimmed(), available.join(", ").cyan())
    }
}

/// Spinner shown while a backend request is in flight.
pub struct Spinner {
    pb: indicatif::ProgressBar,
}

impl Spinner {
    pub fn new(msg: &str) -> Self {
        let pb = indicatif::ProgressBar::new_spinner();
        pb.set_style(
            indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner())
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    /// Clear the spinner line
    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.pb.is_finished() {
            self.pb.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaperBuilder;
    use crate::session::{ArchiveSummary, ErrorKind};
    use std::path::PathBuf;

    fn state_with_papers() -> ReviewState {
        let mut state = ReviewState::new();
        state.apply_papers(vec![
            PaperBuilder::new("Open access eczema trial")
                .authors("A. Author")
                .year("2022")
                .journal("BMJ")
                .doi("10.1/open")
                .pmid("100")
                .unpaywall("https://oa.example.org/open.pdf")
                .abstract_text("We randomised children with eczema.")
                .availability(true, true)
                .build(),
            PaperBuilder::new("Paywalled cohort")
                .doi("10.1/closed")
                .availability(false, true)
                .build(),
            PaperBuilder::new("Conference abstract")
                .availability(false, false)
                .build(),
        ]);
        state
    }

    #[test]
    fn test_status_icon() {
        assert_eq!(status_icon(Status::Success), "✓");
        assert_eq!(status_icon(Status::Error), "✗");
        assert_eq!(status_icon(Status::Search), "🔍");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(123), "123");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_render_result_count() {
        assert!(render_result_count(None).contains("Not searched yet"));
        let zero = render_result_count(Some(0));
        assert!(zero.contains('0'));
        // red
        assert!(zero.contains("\u{1b}[31m"));
        let many = render_result_count(Some(2500));
        assert!(many.contains("2,500"));
        // green
        assert!(many.contains("\u{1b}[32m"));
    }

    #[test]
    fn test_render_abstract_strips_markers() {
        let generated = GeneratedAbstract::new("**Background**\nEczema is common.");
        let out = render_abstract(&generated, 80);
        assert!(out.contains("Background"));
        assert!(!out.contains("**"));
        assert!(out.contains("Eczema is common."));
    }

    #[test]
    fn test_render_papers_sections_and_links() {
        let state = state_with_papers();
        let out = render_papers(&state, 100);

        assert!(out.contains("Papers Found (3)"));
        assert!(out.contains("Download Available (1)"));
        assert!(out.contains("Directly Downloadable Papers"));
        assert!(out.contains("Findable Papers"));
        assert!(out.contains("Unavailable Papers"));
        assert!(out.contains("Unpaywall PDF"));
        assert!(out.contains("Try Sci-Hub"));
        assert!(out.contains("No DOI Available"));
        assert!(out.contains("Page 1 of 1"));
        // Collapsed by default
        assert!(!out.contains("We randomised"));
    }

    #[test]
    fn test_render_papers_shows_expanded_abstract() {
        let mut state = state_with_papers();
        let key = state.papers[0].key();
        state.toggle_abstract(&key);
        assert!(render_papers(&state, 100).contains("We randomised"));
    }

    #[test]
    fn test_render_papers_keeps_empty_partitions() {
        let mut state = ReviewState::new();
        state.apply_papers(vec![PaperBuilder::new("Closed access trial")
            .doi("10.1/closed")
            .availability(false, true)
            .build()]);

        let out = render_papers(&state, 100);
        assert!(out.contains("Directly Downloadable Papers"));
        assert!(out.contains("Findable Papers"));
        assert!(out.contains("Unavailable Papers"));
        assert!(out.contains("Download Available (0)"));
        // the download control plus the two empty partitions
        assert_eq!(out.matches("(0)").count(), 3);
    }

    #[test]
    fn test_render_papers_empty() {
        let out = render_papers(&ReviewState::new(), 100);
        assert!(out.contains("Papers Found (0)"));
        assert!(!out.contains("Download Available"));
    }

    #[test]
    fn test_render_tables_and_summary() {
        let state = state_with_papers();
        let tables = render_paper_tables(&state, 120);
        assert!(tables.contains("Open access eczema trial"));
        assert!(tables.contains("2022"));

        let summary = render_partition_summary(&state.papers);
        assert!(summary.contains("Findable Papers"));
        assert!(summary.contains("No DOI or access links available"));
    }

    #[test]
    fn test_render_error_and_next_steps() {
        let err = ErrorState::new(ErrorKind::Download, "Failed to find PDFs");
        let out = render_error(&err);
        assert!(out.contains("Failed to find PDFs"));
        assert!(out.contains("[download]"));

        let hint = render_next_steps(Affordances::FIND_PDFS | Affordances::EXPORT);
        assert!(hint.contains("find, export"));
        assert!(render_next_steps(Affordances::empty()).contains("question <text>"));
    }

    #[test]
    fn test_render_download() {
        let outcome = DownloadOutcome {
            path: PathBuf::from("out/papers.zip"),
            papers_sent: 2,
            summary: Some(ArchiveSummary {
                entries: 3,
                pdf_count: 2,
                has_manifest: true,
            }),
        };
        let out = render_download(&outcome);
        assert!(out.contains("papers.zip"));
        assert!(out.contains("manifest included"));
    }
}
