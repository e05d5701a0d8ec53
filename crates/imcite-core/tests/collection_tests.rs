//! Collection integration tests
//!
//! End-to-end flows over a realistic library: parse, edit, undo, validate,
//! and export.

mod common;

use common::fixtures::load_fixture;
use imcite_core::{
    AuthorFormat, Change, Collection, CollectionEvent, ExportOptions, IssueKind, Record, Severity,
};

fn library() -> Collection {
    Collection::from_text(&load_fixture("library.bib"))
}

// === Loading and Serialization ===

#[test]
fn test_load_library_in_order() {
    let c = library();
    assert_eq!(c.len(), 4);
    let keys: Vec<&str> = c.records().iter().map(|r| r.key()).collect();
    assert_eq!(keys, vec!["feynman1948", "dirac1928", "knuth1997", "bell1964"]);
    assert!(!c.is_dirty());
}

#[test]
fn test_serialized_document_reparses_identically() {
    let c = library();
    let text = c.to_text();
    let reparsed = Collection::from_text(&text);
    assert_eq!(reparsed.len(), c.len());
    for (a, b) in c.records().iter().zip(reparsed.records()) {
        assert_eq!(a.kind(), b.kind());
        assert_eq!(a.key(), b.key());
        assert_eq!(a.entry().fields, b.entry().fields);
    }
    // The canonical form is a fixed point.
    assert_eq!(reparsed.to_text(), text);
}

#[test]
fn test_field_values_survive_the_round_trip() {
    let c = library();
    let feynman = c.get(0).unwrap();
    assert_eq!(feynman.get("doi"), "10.1103/RevModPhys.20.367");
    assert_eq!(feynman.get("pages"), "367--387");
    let bell = c.get(3).unwrap();
    assert_eq!(bell.get("title"), "On the {Einstein} {Podolsky} {Rosen} Paradox");
}

// === Editing and Undo ===

#[test]
fn test_edit_history_unwinds_to_pristine_text() {
    let mut c = library();
    let pristine = c.to_text();

    let dirac = c.get(1).unwrap().id();
    c.set_field(dirac, "volume", "118").unwrap();
    c.set_kind(dirac, "misc").unwrap();
    c.delete_records(&[0]).unwrap();
    c.insert_records(2, vec![Record::new("misc", "draft")]).unwrap();
    c.replace_records(&[1, 2], 1, vec![Record::new("misc", "merged")])
        .unwrap();

    while c.undo().unwrap().is_some() {}
    assert_eq!(c.to_text(), pristine);
    assert!(!c.is_dirty());

    while c.redo().unwrap().is_some() {}
    let keys: Vec<&str> = c.records().iter().map(|r| r.key()).collect();
    assert_eq!(keys, vec!["dirac1928", "merged", "bell1964"]);
}

#[test]
fn test_text_edit_diffs_into_field_events() {
    let mut c = library();
    let id = c.get(0).unwrap().id();
    let rx = c.subscribe().unwrap();

    c.set_text(id, "@misc{newkey, title = {New Title}, year = {1948}}")
        .unwrap();

    let events: Vec<CollectionEvent> = rx.try_iter().collect();
    assert_eq!(
        events[0],
        CollectionEvent::KindChanged {
            id,
            old: "article".to_string(),
            new: "misc".to_string(),
        }
    );
    assert_eq!(
        events[1],
        CollectionEvent::KeyChanged {
            id,
            old: "feynman1948".to_string(),
            new: "newkey".to_string(),
        }
    );
    // One event per differing field: author, title, journal, volume,
    // pages, doi. The unchanged year raises nothing.
    assert_eq!(events.len(), 9);
    assert_eq!(events[8], CollectionEvent::TextChanged(id));
    assert!(!events.iter().any(|e| matches!(
        e,
        CollectionEvent::FieldChanged { field, .. } if field == "year"
    )));
}

#[test]
fn test_text_edit_undoes_as_one_step() {
    let mut c = library();
    let id = c.get(0).unwrap().id();
    let before = c.get(0).unwrap().serialized().to_string();

    c.set_text(id, "@misc{newkey, title = {New Title}}").unwrap();
    c.undo().unwrap();

    let r = c.get(0).unwrap();
    assert_eq!(r.serialized(), before);
    assert_eq!(r.key(), "feynman1948");
    assert_eq!(r.get("journal"), "Reviews of Modern Physics");
    assert!(!c.can_undo());
}

#[test]
fn test_undo_returns_cursor_hints() {
    let mut c = library();
    let id = c.get(0).unwrap().id();
    c.set_field_with_cursor(id, "title", "Shorter", Some(12), Some(7))
        .unwrap();

    let change = c.undo().unwrap().unwrap();
    match change {
        Change::Field(edit) => {
            assert_eq!(edit.caret_before, Some(7));
            assert_eq!(edit.caret_after, Some(12));
        }
        other => panic!("expected field edit, got {:?}", other),
    }
}

#[test]
fn test_rejected_text_edit_preserves_history() {
    let mut c = library();
    let id = c.get(0).unwrap().id();
    c.set_field(id, "note", "kept").unwrap();

    assert!(c.set_text(id, "@article{x, title = {unclosed").is_err());
    assert_eq!(c.get(0).unwrap().get("note"), "kept");

    c.undo().unwrap();
    assert_eq!(c.get(0).unwrap().get("note"), "");
}

// === Dirty Tracking ===

#[test]
fn test_save_marker_follows_edits() {
    let mut c = library();
    assert!(!c.is_dirty());

    let id = c.get(2).unwrap().id();
    c.set_field(id, "edition", "4").unwrap();
    assert!(c.is_dirty());

    c.mark_saved();
    assert!(!c.is_dirty());

    // Undoing below the save point makes the document dirty again.
    c.undo().unwrap();
    assert!(c.is_dirty());
    c.redo().unwrap();
    assert!(!c.is_dirty());
}

// === Validation ===

#[test]
fn test_library_fixture_is_clean() {
    let report = library().validate();
    assert!(report.is_clean());
    assert!(report.issues.is_empty());
}

#[test]
fn test_validation_flags_problems_after_edits() {
    let mut c = library();
    // Duplicate bell1964 and blank dirac1928's year.
    let copy = Record::from_entry(c.get(3).unwrap().entry().clone());
    c.insert_records(4, vec![copy]).unwrap();
    let dirac = c.get(1).unwrap().id();
    c.set_field(dirac, "year", "").unwrap();

    let report = c.validate();
    assert_eq!(report.severity, Severity::Error);
    let kinds: Vec<IssueKind> = report.issues.iter().map(|i| i.kind).collect();
    assert!(kinds.contains(&IssueKind::MissingRequiredField));
    assert!(kinds.contains(&IssueKind::DuplicateKey));

    let dup = report
        .issues
        .iter()
        .find(|i| i.kind == IssueKind::DuplicateKey)
        .unwrap();
    assert_eq!(dup.field, "bell1964");
    assert_eq!(dup.records.len(), 2);
}

// === Export ===

#[test]
fn test_export_truncates_author_list() {
    let c = library();
    let bell = c.get(3).unwrap();
    let options = ExportOptions {
        author_format: AuthorFormat::GivenFamily,
        max_authors: Some(2),
        suffix: "and others".to_string(),
    };
    let rendered = bell.export_serialized(&options);
    assert!(rendered.contains("author  = {J. S. Bell and Alain Aspect and others},"));
    // The stored record is untouched by exporting.
    assert_eq!(
        bell.get("author"),
        "Bell, J. S. and Aspect, Alain and Clauser, John F."
    );
}

#[test]
fn test_export_without_truncation_keeps_everyone() {
    let c = library();
    let bell = c.get(3).unwrap();
    let options = ExportOptions {
        author_format: AuthorFormat::FamilyGiven,
        max_authors: Some(3),
        suffix: "and others".to_string(),
    };
    let rendered = bell.export_serialized(&options);
    assert!(rendered
        .contains("author  = {Bell, J. S. and Aspect, Alain and Clauser, John F.},"));
    assert!(!rendered.contains("and others"));
}
