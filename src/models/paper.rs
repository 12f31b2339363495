//! Paper model as returned by the review backend's `/download-pdfs` endpoint.

use serde::{Deserialize, Serialize};

/// Access URLs resolved by the backend for a paper
///
/// Every entry is nullable; the backend only fills the ones it could resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessUrls {
    /// LibKey Nomad link
    #[serde(default)]
    pub libkey: Option<String>,

    /// Publisher landing page (doi.org resolver)
    #[serde(default)]
    pub doi: Option<String>,

    /// Open access PDF located through Unpaywall
    #[serde(default)]
    pub unpaywall: Option<String>,

    /// Sci-Hub mirror link
    #[serde(default)]
    pub scihub: Option<String>,
}

/// Availability verdict computed by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    /// A PDF can be fetched directly
    pub is_available: bool,

    /// The paper can be located (usually through its DOI) but not fetched directly
    pub is_findable: bool,

    /// Sources that contributed to the verdict (e.g. "unpaywall", "publisher")
    #[serde(default)]
    pub sources: Vec<String>,
}

/// A candidate paper for the literature review
///
/// The field layout mirrors the backend JSON exactly so a paper can be sent
/// back unchanged in a bulk download request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
    /// Paper title
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    /// Authors (comma-separated, as formatted by the backend)
    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: String,

    /// Publication year (free text, e.g. "2021" or "Unknown Year")
    #[serde(default, deserialize_with = "null_as_default")]
    pub year: String,

    /// Journal name
    #[serde(default, deserialize_with = "null_as_default")]
    pub journal: String,

    /// Digital Object Identifier
    pub doi: Option<String>,

    /// PubMed identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pmid: Option<String>,

    /// PubMed landing page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pubmed_url: Option<String>,

    /// Abstract text
    #[serde(default, deserialize_with = "null_as_default")]
    pub r#abstract: String,

    /// Resolved access URLs
    pub access_urls: AccessUrls,

    /// Availability verdict
    pub availability: Availability,
}

// The backend emits `null` for text it could not extract (e.g. a PubMed title
// that opens with inline markup), so treat it like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Stable identity of a paper within a collection
///
/// Prefers the DOI, then the PMID, then the title. Used for per-paper view
/// state so it survives filtering and paging.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaperKey(String);

impl PaperKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PaperKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A labelled access affordance rendered next to a paper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessLink {
    /// Button label
    pub label: &'static str,

    /// Target URL, `None` for informational badges
    pub url: Option<String>,
}

impl AccessLink {
    fn to(label: &'static str, url: &Option<String>) -> Self {
        Self {
            label,
            url: url.clone(),
        }
    }
}

impl Paper {
    /// Create a paper with the required fields; everything else starts empty
    pub fn new(title: impl Into<String>, authors: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            authors: authors.into(),
            year: year.into(),
            journal: String::new(),
            doi: None,
            pmid: None,
            pubmed_url: None,
            r#abstract: String::new(),
            access_urls: AccessUrls::default(),
            availability: Availability::default(),
        }
    }

    /// Stable key for this paper (DOI, else PMID, else title)
    pub fn key(&self) -> PaperKey {
        if let Some(doi) = self.doi.as_deref().filter(|d| !d.is_empty()) {
            return PaperKey(format!("doi:{}", doi.to_lowercase()));
        }
        if let Some(pmid) = self.pmid.as_deref().filter(|p| !p.is_empty()) {
            return PaperKey(format!("pmid:{}", pmid));
        }
        PaperKey(format!("title:{}", self.title.trim().to_lowercase()))
    }

    pub fn is_available(&self) -> bool {
        self.availability.is_available
    }

    pub fn is_findable(&self) -> bool {
        self.availability.is_findable
    }

    pub fn has_doi(&self) -> bool {
        self.doi.as_deref().is_some_and(|d| !d.is_empty())
    }

    /// Links offered for a directly downloadable paper
    pub fn download_links(&self) -> Vec<AccessLink> {
        let mut links = Vec::new();
        if self.pubmed_url.is_some() {
            links.push(AccessLink::to("PubMed", &self.pubmed_url));
        }
        if self.has_doi() {
            links.push(AccessLink::to("LibKey Nomad", &self.access_urls.libkey));
            links.push(AccessLink::to("Publisher Site", &self.access_urls.doi));
        }
        if self.access_urls.unpaywall.is_some() {
            links.push(AccessLink::to("Unpaywall PDF", &self.access_urls.unpaywall));
        }
        if self.has_doi() {
            links.push(AccessLink::to("Sci-Hub", &self.access_urls.scihub));
        }
        links
    }

    /// Links offered for a paper that is only findable, or not available at all
    pub fn lookup_links(&self) -> Vec<AccessLink> {
        let mut links = Vec::new();
        if self.pubmed_url.is_some() {
            links.push(AccessLink::to("PubMed", &self.pubmed_url));
        }
        if self.has_doi() {
            links.push(AccessLink::to("Publisher Site", &self.access_urls.doi));
            links.push(AccessLink::to("Try Sci-Hub", &self.access_urls.scihub));
        } else {
            links.push(AccessLink {
                label: "No DOI Available",
                url: None,
            });
        }
        links
    }
}

/// Builder for constructing Paper objects
#[derive(Debug, Clone)]
pub struct PaperBuilder {
    paper: Paper,
}

impl PaperBuilder {
    /// Create a new builder with the title; authors default to "Unknown Authors"
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            paper: Paper::new(title, "Unknown Authors", "Unknown Year"),
        }
    }

    pub fn authors(mut self, authors: impl Into<String>) -> Self {
        self.paper.authors = authors.into();
        self
    }

    pub fn year(mut self, year: impl Into<String>) -> Self {
        self.paper.year = year.into();
        self
    }

    pub fn journal(mut self, journal: impl Into<String>) -> Self {
        self.paper.journal = journal.into();
        self
    }

    /// Set DOI and derive the doi.org, LibKey and Sci-Hub links the way the backend does
    pub fn doi(mut self, doi: impl Into<String>) -> Self {
        let doi = doi.into();
        self.paper.access_urls.libkey = Some(format!("https://doi.org/{}", doi));
        self.paper.access_urls.doi = Some(format!("https://doi.org/{}", doi));
        self.paper.access_urls.scihub = Some(format!("https://sci-hub.se/{}", doi));
        self.paper.doi = Some(doi);
        self
    }

    /// Set PMID and the matching PubMed URL
    pub fn pmid(mut self, pmid: impl Into<String>) -> Self {
        let pmid = pmid.into();
        self.paper.pubmed_url = Some(format!("https://pubmed.ncbi.nlm.nih.gov/{}/", pmid));
        self.paper.pmid = Some(pmid);
        self
    }

    pub fn abstract_text(mut self, abstract_text: impl Into<String>) -> Self {
        self.paper.r#abstract = abstract_text.into();
        self
    }

    pub fn unpaywall(mut self, url: impl Into<String>) -> Self {
        self.paper.access_urls.unpaywall = Some(url.into());
        self
    }

    /// Set the availability verdict
    pub fn availability(mut self, is_available: bool, is_findable: bool) -> Self {
        self.paper.availability.is_available = is_available;
        self.paper.availability.is_findable = is_findable;
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.paper.availability.sources.push(source.into());
        self
    }

    /// Build the Paper
    pub fn build(self) -> Paper {
        self.paper
    }
}
