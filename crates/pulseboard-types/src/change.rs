//! Raw change-notification wire shape.
//!
//! A change notification is one row-level insert/update/delete in the
//! backing store, delivered asynchronously over the change source. The
//! shape is deliberately loose: string-typed message kind and operation,
//! untyped row images. The normalizer is responsible for turning this
//! into a strongly typed [`ActivityEvent`] or dropping it.
//!
//! [`ActivityEvent`]: crate::event::ActivityEvent

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The `messageType` value that marks a database change notification.
///
/// Any other message type is irrelevant traffic and is ignored by the
/// normalizer without logging an error.
pub const DATABASE_MESSAGE_TYPE: &str = "database";

/// One raw change notification as delivered by the change source.
///
/// Field names mirror the wire payload (camelCase JSON). Row images are
/// untyped JSON maps; missing images deserialize as empty maps so that
/// field access never fails structurally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangeNotification {
    /// Message kind discriminator; only `"database"` messages are relevant.
    pub message_type: String,

    /// Row operation: `"INSERT"`, `"UPDATE"`, or `"DELETE"` (case-insensitive).
    pub operation: String,

    /// Logical table the change occurred in.
    pub table: String,

    /// Row state after the change (empty for deletes).
    pub new_image: Map<String, Value>,

    /// Row state before the change (empty for inserts).
    pub old_image: Map<String, Value>,

    /// Source-side timestamp in fractional epoch seconds, when provided.
    pub source_timestamp_seconds: Option<f64>,
}

impl ChangeNotification {
    /// Whether this notification is a database change (vs. other traffic).
    pub fn is_database_change(&self) -> bool {
        self.message_type == DATABASE_MESSAGE_TYPE
    }
}
