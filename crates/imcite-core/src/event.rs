use serde::{Deserialize, Serialize};

use crate::record::RecordId;

/// Display notifications emitted by a collection when records change.
///
/// These fire on every applied mutation, including undo/redo replays.
/// Recording edits for undo is separate and handled by the change log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionEvent {
    /// A field changed value; an empty string means unset.
    FieldChanged {
        id: RecordId,
        field: String,
        old: String,
        new: String,
    },
    KindChanged {
        id: RecordId,
        old: String,
        new: String,
    },
    KeyChanged {
        id: RecordId,
        old: String,
        new: String,
    },
    /// The record's serialized text was regenerated or replaced.
    TextChanged(RecordId),
    /// Records now occupy the given indices.
    Inserted(Vec<usize>),
    /// Records were removed from the given indices.
    Removed(Vec<usize>),
}
