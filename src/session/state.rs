//! View-local state of a review session.
//!
//! [`ReviewState`] is the single store. Each operation outcome goes through
//! one mutation method, so a render never observes a half-applied result.

use std::collections::HashSet;

use crate::models::{GeneratedAbstract, Paper, PaperKey};
use crate::session::error::{ErrorKind, ErrorState};
use crate::session::pagination::{self, Partition, PAGE_SIZE};

bitflags::bitflags! {
    /// Controls that are currently enabled
    ///
    /// These only hint at the intended order; operations do not check them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Affordances: u32 {
        const GENERATE_ABSTRACT = 1 << 0;
        const GENERATE_SEARCH_STRING = 1 << 1;
        const SEARCH_PUBMED = 1 << 2;
        const FIND_PDFS = 1 << 3;
        const BULK_DOWNLOAD = 1 << 4;
        const EXPORT = 1 << 5;
        const PREV_PAGE = 1 << 6;
        const NEXT_PAGE = 1 << 7;
    }
}

/// Everything the session knows
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewState {
    pub question: String,
    pub generated_abstract: GeneratedAbstract,
    pub search_string: String,
    /// `None` until a search has completed; `Some(0)` is a real result
    pub result_count: Option<u64>,
    pub papers: Vec<Paper>,
    pub error: Option<ErrorState>,
    /// 1-based page cursor shared by all partitions
    pub page: usize,
    pub busy: bool,
    expanded: HashSet<PaperKey>,
}

impl Default for ReviewState {
    fn default() -> Self {
        Self {
            question: String::new(),
            generated_abstract: GeneratedAbstract::default(),
            search_string: String::new(),
            result_count: None,
            papers: Vec::new(),
            error: None,
            page: 1,
            busy: false,
            expanded: HashSet::new(),
        }
    }
}

impl ReviewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_question(&mut self, question: impl Into<String>) {
        self.question = question.into();
    }

    /// User edit of the search string
    pub fn edit_search_string(&mut self, search_string: impl Into<String>) {
        self.search_string = search_string.into();
    }

    /// Mark an operation of the given category as started
    pub fn begin(&mut self, kind: ErrorKind) {
        self.busy = true;
        if self.error.as_ref().is_some_and(|e| e.kind == kind) {
            self.error = None;
        }
    }

    pub fn finish(&mut self) {
        self.busy = false;
    }

    pub fn apply_abstract(&mut self, content: impl Into<String>) {
        self.generated_abstract = GeneratedAbstract::new(content);
    }

    pub fn apply_search_string(&mut self, search_string: impl Into<String>) {
        self.search_string = search_string.into();
    }

    pub fn apply_result_count(&mut self, count: u64) {
        self.result_count = Some(count);
    }

    /// Replace the collection; paging and expanded abstracts start over
    pub fn apply_papers(&mut self, papers: Vec<Paper>) {
        self.papers = papers;
        self.page = 1;
        self.expanded.clear();
    }

    pub fn fail(&mut self, error: ErrorState) {
        self.error = Some(error);
    }

    /// Error for a category, if that is the one currently held
    pub fn error_for(&self, kind: ErrorKind) -> Option<&ErrorState> {
        self.error.as_ref().filter(|e| e.kind == kind)
    }

    pub fn page_count(&self) -> usize {
        pagination::page_count(self.papers.len(), PAGE_SIZE)
    }

    pub fn next_page(&mut self) -> usize {
        self.page = pagination::next_page(self.page, self.papers.len(), PAGE_SIZE);
        self.page
    }

    pub fn prev_page(&mut self) -> usize {
        self.page = pagination::prev_page(self.page);
        self.page
    }

    /// Flip a paper's abstract; returns whether it is now expanded
    pub fn toggle_abstract(&mut self, key: &PaperKey) -> bool {
        if self.expanded.remove(key) {
            false
        } else {
            self.expanded.insert(key.clone());
            true
        }
    }

    pub fn is_expanded(&self, paper: &Paper) -> bool {
        self.expanded.contains(&paper.key())
    }

    /// Papers in the Available partition
    pub fn available_papers(&self) -> Vec<&Paper> {
        pagination::partition(&self.papers, Partition::Available)
    }

    /// Papers shown on the current page, in display order
    pub fn visible_papers(&self) -> Vec<(Partition, &Paper)> {
        pagination::visible_papers(&self.papers, self.page, PAGE_SIZE)
    }

    /// Controls enabled in the current state
    pub fn affordances(&self) -> Affordances {
        let mut enabled = Affordances::empty();
        if self.busy {
            return enabled;
        }

        if !self.question.is_empty() {
            enabled |= Affordances::GENERATE_ABSTRACT;
        }
        if self.generated_abstract.visible {
            enabled |= Affordances::GENERATE_SEARCH_STRING;
        }
        if !self.search_string.is_empty() {
            enabled |= Affordances::SEARCH_PUBMED;
        }
        if self.result_count.is_some() {
            enabled |= Affordances::FIND_PDFS;
        }
        if !self.papers.is_empty() {
            enabled |= Affordances::EXPORT;
        }
        if self.papers.iter().any(Paper::is_available) {
            enabled |= Affordances::BULK_DOWNLOAD;
        }
        if self.page > 1 {
            enabled |= Affordances::PREV_PAGE;
        }
        if self.page < self.page_count() {
            enabled |= Affordances::NEXT_PAGE;
        }
        enabled
    }
}
