//! Turning pasted links and identifiers into bibliographic records.
//!
//! Network access stays outside the core: callers implement
//! [`RecordFetcher`] and this module owns identifier extraction, request
//! construction, and response parsing. A pasted link is tried as a DOI
//! first, then as an arXiv identifier through the arXiv DOI and finally
//! the arXiv BibTeX endpoint.

use imcite_bibtex::{parse_entry, Entry};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

lazy_static! {
    /// arXiv identifier: old-style `archive/NNNNNNN` or new-style
    /// `NNNN.NNNN(N)`, optional `vN` suffix, bounded by start/space/slash
    /// before and dot/space/end after. Group 1 is the unversioned id.
    static ref ARXIV_ID: Regex =
        Regex::new(r"(?:^|[/ ])(\w+/\d{7}|\d{4}\.\d{4,5})(?:v\d+)?(?:[.\s]|$)").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("no entry in response")]
    NoEntry,
    #[error("unrecognized link: {0}")]
    Unrecognized(String),
}

/// One request a caller-side fetcher should perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub url: String,
    /// Accept header, when the endpoint needs one to return BibTeX.
    pub accept: Option<String>,
}

/// Caller-supplied transport.
pub trait RecordFetcher {
    fn fetch(&self, request: &FetchRequest) -> Result<String, ResolveError>;
}

/// Extract the first arXiv identifier in `text`, without its version.
pub fn extract_arxiv_id(text: &str) -> Option<&str> {
    ARXIV_ID
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

pub fn doi_request(doi: &str) -> FetchRequest {
    FetchRequest {
        url: format!("https://doi.org/{}", doi),
        accept: Some("application/x-bibtex".to_string()),
    }
}

pub fn arxiv_request(id: &str) -> FetchRequest {
    FetchRequest {
        url: format!("https://arxiv.org/bibtex/{}", id),
        accept: None,
    }
}

/// The DOI registered for every arXiv submission, usable on the DOI route.
pub fn arxiv_fallback_doi(id: &str) -> String {
    format!("10.48550/ARXIV.{}", id)
}

/// Fetch one request and strictly parse the first entry of the response.
pub fn resolve_entry(
    fetcher: &impl RecordFetcher,
    request: &FetchRequest,
) -> Result<Entry, ResolveError> {
    let text = fetcher.fetch(request)?;
    parse_entry(&text).map_err(|_| ResolveError::NoEntry)
}

/// Resolve a pasted link or identifier to one entry. The input is tried
/// verbatim as a DOI; on failure an embedded arXiv identifier is resolved
/// through its fallback DOI, then the arXiv endpoint.
pub fn resolve_link(fetcher: &impl RecordFetcher, link: &str) -> Result<Entry, ResolveError> {
    if let Some(entry) = try_fetch(fetcher, &doi_request(link)) {
        return Ok(entry);
    }
    let id = extract_arxiv_id(link).ok_or_else(|| ResolveError::Unrecognized(link.to_string()))?;
    if let Some(entry) = try_fetch(fetcher, &doi_request(&arxiv_fallback_doi(id))) {
        return Ok(entry);
    }
    if let Some(entry) = try_fetch(fetcher, &arxiv_request(id)) {
        return Ok(entry);
    }
    Err(ResolveError::NoEntry)
}

/// A cascade step: fetch failures and unparseable responses both mean
/// "try the next route".
fn try_fetch(fetcher: &impl RecordFetcher, request: &FetchRequest) -> Option<Entry> {
    let text = fetcher.fetch(request).ok()?;
    if text.trim().is_empty() {
        return None;
    }
    parse_entry(&text).ok()
}
