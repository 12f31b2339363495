//! Paper partitioning and pagination.
//!
//! A collection is split into three disjoint availability partitions. All
//! three are paged with one shared cursor, and the page count comes from the
//! size of the whole collection, so a page may be empty for one partition
//! while another still has items.

use crate::models::Paper;

/// Papers per page
pub const PAGE_SIZE: usize = 50;

/// Availability partition of a paper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    /// A PDF can be downloaded directly
    Available,
    /// Locatable but needs institutional access or manual download
    Findable,
    /// Nothing to go on
    Unavailable,
}

impl Partition {
    /// All partitions in display order
    pub const ALL: [Partition; 3] = [
        Partition::Available,
        Partition::Findable,
        Partition::Unavailable,
    ];

    /// Partition a paper belongs to
    ///
    /// `is_available` wins over `is_findable`; a paper that is neither lands
    /// in `Unavailable`.
    pub fn classify(paper: &Paper) -> Self {
        if paper.availability.is_available {
            Partition::Available
        } else if paper.availability.is_findable {
            Partition::Findable
        } else {
            Partition::Unavailable
        }
    }

    pub fn contains(&self, paper: &Paper) -> bool {
        Self::classify(paper) == *self
    }

    pub fn title(&self) -> &'static str {
        match self {
            Partition::Available => "Directly Downloadable Papers",
            Partition::Findable => "Findable Papers",
            Partition::Unavailable => "Unavailable Papers",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Partition::Available => "Available through Unpaywall or direct PDF links",
            Partition::Findable => "Has DOI but requires institutional access or manual download",
            Partition::Unavailable => "No DOI or access links available",
        }
    }
}

/// Papers in a partition, in collection order
pub fn partition(papers: &[Paper], partition: Partition) -> Vec<&Paper> {
    papers.iter().filter(|p| partition.contains(p)).collect()
}

/// Number of papers in each partition, in [`Partition::ALL`] order
pub fn partition_counts(papers: &[Paper]) -> [usize; 3] {
    let mut counts = [0; 3];
    for paper in papers {
        let idx = match Partition::classify(paper) {
            Partition::Available => 0,
            Partition::Findable => 1,
            Partition::Unavailable => 2,
        };
        counts[idx] += 1;
    }
    counts
}

/// `ceil(total / page_size)`
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// One page of a partition
///
/// `page` is 1-based; page 0 is treated as page 1.
pub fn page_slice(
    papers: &[Paper],
    which: Partition,
    page: usize,
    page_size: usize,
) -> Vec<&Paper> {
    let start = page.saturating_sub(1).saturating_mul(page_size);
    papers
        .iter()
        .filter(|p| which.contains(p))
        .skip(start)
        .take(page_size)
        .collect()
}

/// Every paper shown on a page, grouped by partition in display order
pub fn visible_papers(papers: &[Paper], page: usize, page_size: usize) -> Vec<(Partition, &Paper)> {
    Partition::ALL
        .iter()
        .flat_map(|&which| {
            page_slice(papers, which, page, page_size)
                .into_iter()
                .map(move |paper| (which, paper))
        })
        .collect()
}

/// Page after `page`, never past the last page
pub fn next_page(page: usize, total: usize, page_size: usize) -> usize {
    let last = page_count(total, page_size).max(1);
    (page + 1).min(last).max(1)
}

/// Page before `page`, never below 1
pub fn prev_page(page: usize) -> usize {
    page.saturating_sub(1).max(1)
}
