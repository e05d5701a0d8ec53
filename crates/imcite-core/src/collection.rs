//! An ordered collection of records backed by the change log.
//!
//! All mutations flow through here: the collection applies the edit to the
//! record, emits display events, and records the reversible change. Undo and
//! redo replay stored changes through the same apply path but skip the
//! recording step.

use std::ops::Range;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

use imcite_bibtex::parse_document;

use crate::changelog::{Change, ChangeLog, EditTarget, FieldEdit};
use crate::error::{CoreError, Result};
use crate::event::CollectionEvent;
use crate::record::{Record, RecordId};
use crate::validate::{self, ValidationReport};

pub struct Collection {
    records: Vec<Record>,
    log: ChangeLog,
    event_tx: Sender<CollectionEvent>,
    event_rx: Mutex<Option<Receiver<CollectionEvent>>>,
}

impl Collection {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Collection {
            records: Vec::new(),
            log: ChangeLog::new(),
            event_tx: tx,
            event_rx: Mutex::new(Some(rx)),
        }
    }

    /// Build a collection from document text using the tolerant parser.
    /// Malformed entries are dropped; the change log starts empty and clean.
    pub fn from_text(text: &str) -> Self {
        let mut collection = Self::new();
        collection.records = parse_document(text)
            .into_iter()
            .map(Record::from_entry)
            .collect();
        tracing::debug!(records = collection.records.len(), "parsed collection");
        collection
    }

    /// Serialized document: each record's text joined by newlines, with a
    /// trailing newline. Empty collection yields the empty string.
    pub fn to_text(&self) -> String {
        if self.records.is_empty() {
            return String::new();
        }
        let mut out = self
            .records
            .iter()
            .map(|r| r.serialized())
            .collect::<Vec<_>>()
            .join("\n");
        out.push('\n');
        out
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn index_of(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    /// Take the event receiver. There is exactly one; a second call fails.
    pub fn subscribe(&self) -> Result<Receiver<CollectionEvent>> {
        let rx = self
            .event_rx
            .lock()
            .map_err(|_| CoreError::ReceiverTaken)?
            .take()
            .ok_or(CoreError::ReceiverTaken)?;
        Ok(rx)
    }

    fn emit(&self, event: CollectionEvent) {
        // Ignore send errors (receiver may be dropped)
        let _ = self.event_tx.send(event);
    }

    fn record_mut(&mut self, id: RecordId) -> Result<&mut Record> {
        let idx = self.index_of(id).ok_or(CoreError::NotFound(id))?;
        Ok(&mut self.records[idx])
    }

    // === Field edits ===

    /// Set one field. Returns `Ok(false)` when the value did not change.
    pub fn set_field(&mut self, id: RecordId, name: &str, value: &str) -> Result<bool> {
        self.set_field_with_cursor(id, name, value, None, None)
    }

    /// Set one field carrying editing-surface cursor offsets for the change
    /// log, so undo can restore the cursor.
    pub fn set_field_with_cursor(
        &mut self,
        id: RecordId,
        name: &str,
        value: &str,
        caret_before: Option<usize>,
        caret_after: Option<usize>,
    ) -> Result<bool> {
        let delta = match self.record_mut(id)?.set(name, value) {
            Some(delta) => delta,
            None => return Ok(false),
        };
        self.emit(CollectionEvent::FieldChanged {
            id,
            field: delta.field.clone(),
            old: delta.old.clone(),
            new: delta.new.clone(),
        });
        self.emit(CollectionEvent::TextChanged(id));
        self.log.record(Change::Field(FieldEdit {
            record: id,
            target: EditTarget::Field(delta.field),
            old: delta.old,
            new: delta.new,
            caret_before,
            caret_after,
        }));
        Ok(true)
    }

    pub fn set_kind(&mut self, id: RecordId, kind: &str) -> Result<bool> {
        let (old, new) = match self.record_mut(id)?.set_kind(kind) {
            Some(change) => change,
            None => return Ok(false),
        };
        self.emit(CollectionEvent::KindChanged {
            id,
            old: old.clone(),
            new: new.clone(),
        });
        self.emit(CollectionEvent::TextChanged(id));
        self.log.record(Change::Field(FieldEdit {
            record: id,
            target: EditTarget::Kind,
            old,
            new,
            caret_before: None,
            caret_after: None,
        }));
        Ok(true)
    }

    pub fn set_key(&mut self, id: RecordId, key: &str) -> Result<bool> {
        let (old, new) = match self.record_mut(id)?.set_key(key) {
            Some(change) => change,
            None => return Ok(false),
        };
        self.emit(CollectionEvent::KeyChanged {
            id,
            old: old.clone(),
            new: new.clone(),
        });
        self.emit(CollectionEvent::TextChanged(id));
        self.log.record(Change::Field(FieldEdit {
            record: id,
            target: EditTarget::Key,
            old,
            new,
            caret_before: None,
            caret_after: None,
        }));
        Ok(true)
    }

    /// Replace one record's serialized text. The text must parse strictly;
    /// a rejected parse leaves the record untouched and returns the error.
    /// The whole edit is one undo step, however many fields it touched.
    pub fn set_text(&mut self, id: RecordId, text: &str) -> Result<bool> {
        let record = self.record_mut(id)?;
        let old_text = record.serialized().to_string();
        let delta = match record.set_text(text)? {
            Some(delta) => delta,
            None => return Ok(false),
        };
        if let Some((old, new)) = &delta.kind {
            self.emit(CollectionEvent::KindChanged {
                id,
                old: old.clone(),
                new: new.clone(),
            });
        }
        if let Some((old, new)) = &delta.key {
            self.emit(CollectionEvent::KeyChanged {
                id,
                old: old.clone(),
                new: new.clone(),
            });
        }
        for field in &delta.fields {
            self.emit(CollectionEvent::FieldChanged {
                id,
                field: field.field.clone(),
                old: field.old.clone(),
                new: field.new.clone(),
            });
        }
        self.emit(CollectionEvent::TextChanged(id));
        self.log.record(Change::Field(FieldEdit {
            record: id,
            target: EditTarget::Text,
            old: old_text,
            new: delta.new_text,
            caret_before: None,
            caret_after: None,
        }));
        Ok(true)
    }

    // === Bulk operations ===

    /// Insert records before `at`. Returns the occupied index range.
    pub fn insert_records(&mut self, at: usize, records: Vec<Record>) -> Result<Range<usize>> {
        if at > self.records.len() {
            return Err(CoreError::OutOfBounds {
                index: at,
                len: self.records.len(),
            });
        }
        if records.is_empty() {
            return Ok(at..at);
        }
        let range = at..at + records.len();
        let pairs: Vec<(usize, Record)> = records
            .iter()
            .enumerate()
            .map(|(i, r)| (at + i, r.clone()))
            .collect();
        self.records.splice(at..at, records);
        self.emit(CollectionEvent::Inserted(range.clone().collect()));
        self.log.record(Change::Insert(pairs));
        Ok(range)
    }

    /// Delete records by index set. Indices may repeat and come in any
    /// order; out-of-bounds indices reject the whole call before anything
    /// is removed. Returns the removed records in ascending index order.
    pub fn delete_records(&mut self, indices: &[usize]) -> Result<Vec<Record>> {
        let sorted = self.check_indices(indices)?;
        if sorted.is_empty() {
            return Ok(Vec::new());
        }
        let mut pairs = Vec::with_capacity(sorted.len());
        for &i in sorted.iter().rev() {
            pairs.push((i, self.records.remove(i)));
        }
        pairs.reverse();
        let removed: Vec<Record> = pairs.iter().map(|(_, r)| r.clone()).collect();
        self.emit(CollectionEvent::Removed(sorted));
        self.log.record(Change::Delete(pairs));
        Ok(removed)
    }

    /// Atomically delete records by index set and insert replacements at
    /// `at` (an index in the post-delete collection). One undo step.
    pub fn replace_records(
        &mut self,
        remove: &[usize],
        at: usize,
        records: Vec<Record>,
    ) -> Result<Range<usize>> {
        let sorted = self.check_indices(remove)?;
        let remaining = self.records.len() - sorted.len();
        if at > remaining {
            return Err(CoreError::OutOfBounds {
                index: at,
                len: remaining,
            });
        }
        let mut removed = Vec::with_capacity(sorted.len());
        for &i in sorted.iter().rev() {
            removed.push((i, self.records.remove(i)));
        }
        removed.reverse();
        let range = at..at + records.len();
        let inserted: Vec<(usize, Record)> = records
            .iter()
            .enumerate()
            .map(|(i, r)| (at + i, r.clone()))
            .collect();
        self.records.splice(at..at, records);
        if !sorted.is_empty() {
            self.emit(CollectionEvent::Removed(sorted));
        }
        if !range.is_empty() {
            self.emit(CollectionEvent::Inserted(range.clone().collect()));
        }
        self.log.record(Change::Replace { removed, inserted });
        Ok(range)
    }

    /// Sorted, deduplicated, bounds-checked copy of an index set.
    fn check_indices(&self, indices: &[usize]) -> Result<Vec<usize>> {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        if let Some(&max) = sorted.last() {
            if max >= self.records.len() {
                return Err(CoreError::OutOfBounds {
                    index: max,
                    len: self.records.len(),
                });
            }
        }
        Ok(sorted)
    }

    // === Undo / redo ===

    /// Undo the most recent change. Returns the inverse change that was
    /// applied, or `None` when the undo stack is empty.
    pub fn undo(&mut self) -> Result<Option<Change>> {
        let change = match self.log.undo() {
            Some(change) => change,
            None => return Ok(None),
        };
        let inverse = change.invert();
        self.apply_change(&inverse)?;
        Ok(Some(inverse))
    }

    /// Redo the most recently undone change. Returns the change that was
    /// reapplied, or `None` when the redo stack is empty.
    pub fn redo(&mut self) -> Result<Option<Change>> {
        let change = match self.log.redo() {
            Some(change) => change,
            None => return Ok(None),
        };
        self.apply_change(&change)?;
        Ok(Some(change))
    }

    /// Apply a stored change without recording it. Display events still
    /// fire so listeners stay in sync with replayed state.
    fn apply_change(&mut self, change: &Change) -> Result<()> {
        match change {
            Change::Field(edit) => self.apply_field_edit(edit)?,
            Change::Insert(pairs) => {
                for (i, record) in pairs {
                    if *i > self.records.len() {
                        return Err(CoreError::OutOfBounds {
                            index: *i,
                            len: self.records.len(),
                        });
                    }
                    self.records.insert(*i, record.clone());
                }
                self.emit(CollectionEvent::Inserted(
                    pairs.iter().map(|(i, _)| *i).collect(),
                ));
            }
            Change::Delete(pairs) => {
                for (i, _) in pairs.iter().rev() {
                    if *i >= self.records.len() {
                        return Err(CoreError::OutOfBounds {
                            index: *i,
                            len: self.records.len(),
                        });
                    }
                    self.records.remove(*i);
                }
                self.emit(CollectionEvent::Removed(
                    pairs.iter().map(|(i, _)| *i).collect(),
                ));
            }
            Change::Replace { removed, inserted } => {
                for (i, _) in removed.iter().rev() {
                    if *i >= self.records.len() {
                        return Err(CoreError::OutOfBounds {
                            index: *i,
                            len: self.records.len(),
                        });
                    }
                    self.records.remove(*i);
                }
                for (i, record) in inserted {
                    if *i > self.records.len() {
                        return Err(CoreError::OutOfBounds {
                            index: *i,
                            len: self.records.len(),
                        });
                    }
                    self.records.insert(*i, record.clone());
                }
                if !removed.is_empty() {
                    self.emit(CollectionEvent::Removed(
                        removed.iter().map(|(i, _)| *i).collect(),
                    ));
                }
                if !inserted.is_empty() {
                    self.emit(CollectionEvent::Inserted(
                        inserted.iter().map(|(i, _)| *i).collect(),
                    ));
                }
            }
        }
        Ok(())
    }

    fn apply_field_edit(&mut self, edit: &FieldEdit) -> Result<()> {
        let id = edit.record;
        match &edit.target {
            EditTarget::Field(name) => {
                let delta = self.record_mut(id)?.set(name, &edit.new);
                if let Some(delta) = delta {
                    self.emit(CollectionEvent::FieldChanged {
                        id,
                        field: delta.field,
                        old: delta.old,
                        new: delta.new,
                    });
                    self.emit(CollectionEvent::TextChanged(id));
                }
            }
            EditTarget::Kind => {
                if let Some((old, new)) = self.record_mut(id)?.set_kind(&edit.new) {
                    self.emit(CollectionEvent::KindChanged { id, old, new });
                    self.emit(CollectionEvent::TextChanged(id));
                }
            }
            EditTarget::Key => {
                if let Some((old, new)) = self.record_mut(id)?.set_key(&edit.new) {
                    self.emit(CollectionEvent::KeyChanged { id, old, new });
                    self.emit(CollectionEvent::TextChanged(id));
                }
            }
            EditTarget::Text => {
                let delta = self.record_mut(id)?.set_text(&edit.new)?;
                if let Some(delta) = delta {
                    if let Some((old, new)) = delta.kind {
                        self.emit(CollectionEvent::KindChanged { id, old, new });
                    }
                    if let Some((old, new)) = delta.key {
                        self.emit(CollectionEvent::KeyChanged { id, old, new });
                    }
                    for field in delta.fields {
                        self.emit(CollectionEvent::FieldChanged {
                            id,
                            field: field.field,
                            old: field.old,
                            new: field.new,
                        });
                    }
                    self.emit(CollectionEvent::TextChanged(id));
                }
            }
        }
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.log.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.log.can_redo()
    }

    // === Dirty tracking ===

    /// Mark the current state as saved, for example after writing
    /// [`Collection::to_text`] to disk.
    pub fn mark_saved(&mut self) {
        self.log.mark_saved();
    }

    pub fn is_dirty(&self) -> bool {
        self.log.is_dirty()
    }

    // === Validation ===

    /// Run the read-only validation pass over all records.
    pub fn validate(&self) -> ValidationReport {
        validate::validate_records(&self.records)
    }
}

impl Default for Collection {
    fn default() -> Self {
        Self::new()
    }
}
