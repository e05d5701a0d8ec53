//! imcite-core: editing semantics for bibliographic reference collections
//!
//! Builds on imcite-bibtex with:
//! - A record model keeping the field map and serialized text in agreement
//! - An ordered collection with atomic bulk insert/delete/replace
//! - Undo/redo with keystroke coalescing and saved-position dirty tracking
//! - Read-only validation (missing fields, duplicate citation keys)
//! - Author-list reformatting for export
//! - DOI/arXiv link resolution through an injected fetcher

pub mod author;
pub mod changelog;
pub mod collection;
pub mod error;
pub mod event;
pub mod export;
pub mod record;
pub mod resolve;
pub mod validate;

// Re-export the main surface for convenience
pub use author::{split_authors, Author};
pub use changelog::{Change, ChangeLog, EditTarget, FieldEdit};
pub use collection::Collection;
pub use error::{CoreError, Result};
pub use event::CollectionEvent;
pub use export::{export_entry, format_author_list, AuthorFormat, ExportOptions};
pub use record::{FieldDelta, Record, RecordId, TextDelta};
pub use resolve::{
    extract_arxiv_id, resolve_entry, resolve_link, FetchRequest, RecordFetcher, ResolveError,
};
pub use validate::{validate_records, Issue, IssueKind, Severity, ValidationReport};
