//! Change log: bounded undo/redo with keystroke coalescing.
//!
//! Every accepted mutation is recorded as a [`Change`]. Rapid edits to the
//! same value merge into the previous change when they land within the merge
//! window, so typing produces one undo step per burst instead of one per
//! keystroke. History is bounded; the oldest change is evicted once the cap
//! is exceeded. A saved-position marker tracks whether the current state
//! matches the last save.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};

use crate::record::{Record, RecordId};

/// Maximum number of undo entries kept.
pub const DEFAULT_CAPACITY: usize = 200;

/// Window within which edits to the same value coalesce.
pub const DEFAULT_MERGE_WINDOW_MS: i64 = 200;

/// Which part of a record a single-value edit touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    /// The entry kind. Kind changes never coalesce.
    Kind,
    /// The citation key.
    Key,
    /// A named field.
    Field(String),
    /// The whole serialized text.
    Text,
}

/// A reversible single-value edit on one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEdit {
    pub record: RecordId,
    pub target: EditTarget,
    pub old: String,
    pub new: String,
    /// Editing-surface cursor offset before the edit
    pub caret_before: Option<usize>,
    /// Editing-surface cursor offset after the edit
    pub caret_after: Option<usize>,
}

/// One undoable change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Field(FieldEdit),
    /// Records inserted at ascending (index, record) pairs
    Insert(Vec<(usize, Record)>),
    /// Records removed from ascending (index, record) pairs
    Delete(Vec<(usize, Record)>),
    /// A delete and an insert applied as one atomic step
    Replace {
        removed: Vec<(usize, Record)>,
        inserted: Vec<(usize, Record)>,
    },
}

impl Change {
    /// The change that exactly reverses this one.
    pub fn invert(&self) -> Change {
        match self {
            Change::Field(e) => Change::Field(FieldEdit {
                record: e.record,
                target: e.target.clone(),
                old: e.new.clone(),
                new: e.old.clone(),
                caret_before: e.caret_after,
                caret_after: e.caret_before,
            }),
            Change::Insert(pairs) => Change::Delete(pairs.clone()),
            Change::Delete(pairs) => Change::Insert(pairs.clone()),
            Change::Replace { removed, inserted } => Change::Replace {
                removed: inserted.clone(),
                inserted: removed.clone(),
            },
        }
    }
}

#[derive(Debug, Clone)]
struct TimedChange {
    change: Change,
    at: DateTime<Utc>,
}

/// Bounded undo/redo stacks with temporal coalescing and dirty tracking.
pub struct ChangeLog {
    undo: VecDeque<TimedChange>,
    redo: Vec<TimedChange>,
    capacity: usize,
    merge_window: Duration,
    /// Undo depth at the last save; `None` means unreachable (always dirty).
    saved: Option<usize>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::with_limits(
            DEFAULT_CAPACITY,
            Duration::milliseconds(DEFAULT_MERGE_WINDOW_MS),
        )
    }

    pub fn with_limits(capacity: usize, merge_window: Duration) -> Self {
        ChangeLog {
            undo: VecDeque::new(),
            redo: Vec::new(),
            capacity,
            merge_window,
            saved: Some(0),
        }
    }

    /// Record an accepted change at the current time.
    pub fn record(&mut self, change: Change) {
        self.record_at(change, Utc::now());
    }

    /// Record an accepted change with an explicit timestamp.
    ///
    /// Field edits merge into the previous change when it targets the same
    /// value on the same record, was recorded within the merge window, and
    /// the merged edit would not collapse to a no-op. A merge refreshes the
    /// window, so continuous typing keeps extending one change.
    pub fn record_at(&mut self, change: Change, now: DateTime<Utc>) {
        self.redo.clear();
        // A marker beyond the undo depth pointed into the cleared redo
        // branch and can no longer be reached.
        if self.saved.map_or(false, |n| n > self.undo.len()) {
            self.saved = None;
        }

        let depth = self.undo.len();
        if let (Change::Field(incoming), Some(last)) = (&change, self.undo.back_mut()) {
            let within = now.signed_duration_since(last.at) < self.merge_window;
            if let Change::Field(prev) = &mut last.change {
                if within
                    && prev.record == incoming.record
                    && prev.target == incoming.target
                    && prev.target != EditTarget::Kind
                    && prev.old != incoming.new
                {
                    prev.new = incoming.new.clone();
                    prev.caret_after = incoming.caret_after;
                    last.at = now;
                    // The merged-into entry no longer matches the state it
                    // had when the marker was placed on it.
                    if self.saved == Some(depth) {
                        self.saved = None;
                    }
                    return;
                }
            }
        }

        self.undo.push_back(TimedChange { change, at: now });
        if self.undo.len() > self.capacity {
            self.undo.pop_front();
            self.saved = match self.saved {
                Some(n) if n > 0 => Some(n - 1),
                _ => None,
            };
        }
    }

    /// Pop the most recent change for inverse application, moving it to the
    /// redo stack. `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<Change> {
        let timed = self.undo.pop_back()?;
        let change = timed.change.clone();
        self.redo.push(timed);
        Some(change)
    }

    /// Pop the most recently undone change for forward application, moving
    /// it back onto the undo stack. `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<Change> {
        let timed = self.redo.pop()?;
        let change = timed.change.clone();
        self.undo.push_back(timed);
        Some(change)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Current undo depth.
    pub fn depth(&self) -> usize {
        self.undo.len()
    }

    /// Mark the current state as saved.
    pub fn mark_saved(&mut self) {
        self.saved = Some(self.undo.len());
    }

    /// Whether the current state differs from the last marked save.
    pub fn is_dirty(&self) -> bool {
        self.saved != Some(self.undo.len())
    }
}

impl Default for ChangeLog {
    fn default() -> Self {
        Self::new()
    }
}
