//! Read-only validation pass: missing fields and duplicate citation keys.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::record::{Record, RecordId};

/// Overall report state, ordered so the worst finding can be taken by `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Clean,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueKind {
    /// Blank citation key.
    MissingKey,
    /// Blank entry kind.
    MissingKind,
    /// Blank title, year, or author/editor pair.
    MissingRequiredField,
    /// The same citation key on two or more records.
    DuplicateKey,
}

impl IssueKind {
    pub fn severity(&self) -> Severity {
        match self {
            IssueKind::MissingKey | IssueKind::MissingKind | IssueKind::DuplicateKey => {
                Severity::Error
            }
            IssueKind::MissingRequiredField => Severity::Warning,
        }
    }
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    /// Offending records; more than one only for [`IssueKind::DuplicateKey`].
    pub records: Vec<RecordId>,
    /// Display name of what is missing, or the duplicated key value.
    pub field: String,
}

impl Issue {
    /// One-line description for status bars and CLI output.
    pub fn hint(&self) -> String {
        match self.kind {
            IssueKind::DuplicateKey => format!(
                "{} entries have the same citation key {}",
                self.records.len(),
                self.field
            ),
            _ => format!("1 entry missing {}", self.field),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<Issue>,
    pub severity: Severity,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.severity == Severity::Clean
    }

    pub fn has_errors(&self) -> bool {
        self.severity == Severity::Error
    }
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Validate every record. Per record the checks run in precedence order:
/// a blank key stops all further checks for that record (it cannot join a
/// duplicate group either), then a blank kind stops the field checks.
/// Duplicate-key groups are reported once per key, in first-seen order,
/// carrying every offender.
pub fn validate_records(records: &[Record]) -> ValidationReport {
    let mut issues = Vec::new();
    let mut group_order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<RecordId>> = HashMap::new();

    for record in records {
        if blank(record.key()) {
            issues.push(Issue {
                kind: IssueKind::MissingKey,
                records: vec![record.id()],
                field: "citationKey".to_string(),
            });
            continue;
        }

        let ids = groups.entry(record.key().to_string()).or_default();
        if ids.is_empty() {
            group_order.push(record.key().to_string());
        }
        ids.push(record.id());

        if blank(record.kind()) {
            issues.push(Issue {
                kind: IssueKind::MissingKind,
                records: vec![record.id()],
                field: "entry type".to_string(),
            });
            continue;
        }

        if blank(record.get("title")) {
            issues.push(Issue {
                kind: IssueKind::MissingRequiredField,
                records: vec![record.id()],
                field: "title".to_string(),
            });
        }
        if blank(record.get("year")) {
            issues.push(Issue {
                kind: IssueKind::MissingRequiredField,
                records: vec![record.id()],
                field: "year".to_string(),
            });
        }
        if blank(record.get("author")) && blank(record.get("editor")) {
            issues.push(Issue {
                kind: IssueKind::MissingRequiredField,
                records: vec![record.id()],
                field: "author or editor".to_string(),
            });
        }
    }

    for key in group_order {
        let ids = &groups[&key];
        if ids.len() > 1 {
            issues.push(Issue {
                kind: IssueKind::DuplicateKey,
                records: ids.clone(),
                field: key,
            });
        }
    }

    let severity = issues
        .iter()
        .map(|i| i.kind.severity())
        .max()
        .unwrap_or(Severity::Clean);
    tracing::debug!(issues = issues.len(), ?severity, "validation pass complete");
    ValidationReport { issues, severity }
}
