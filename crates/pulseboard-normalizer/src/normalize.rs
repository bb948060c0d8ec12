//! The normalization entry point.
//!
//! [`normalize`] turns one raw change notification into zero-or-one
//! [`ActivityEvent`]. It is total: every failure path returns `None` with a
//! [`DropReason`] diagnostic trace, and nothing in here panics or errors.
//! A malformed notification must never stop subsequent notifications from
//! being processed.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use pulseboard_types::{ActivityEvent, ActivityKind, ChangeNotification, Priority};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::classify::{Classification, Operation, TableKind, classify};
use crate::lookup::ReferenceLookup;
use crate::priority::resolve_priority;

/// Why a notification was dropped instead of normalized.
///
/// Drops are diagnostic-only: they are traced at debug level and never
/// surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The message is not a database change notification.
    NotDatabaseMessage,
    /// The operation string is unrecognized, or the `(table, operation)`
    /// pair carries no dashboard-relevant activity.
    IrrelevantChange,
    /// No actor id could be resolved from the row or the session.
    NoResolvableActor,
}

/// Ambient inputs to normalization.
pub struct NormalizeContext<'a> {
    /// Read-only reference tables for user and priority resolution.
    pub lookup: &'a dyn ReferenceLookup,

    /// The current session's user id, used as the last step of the actor
    /// fallback chain when the row itself names no actor.
    pub session_user_id: Option<i64>,
}

/// Normalize one raw change notification into an activity event.
///
/// Returns `None` for irrelevant traffic, unsupported operations, and
/// notifications with no resolvable actor. Never panics.
pub fn normalize(raw: &ChangeNotification, ctx: &NormalizeContext<'_>) -> Option<ActivityEvent> {
    if !raw.is_database_change() {
        trace_drop(raw, DropReason::NotDatabaseMessage);
        return None;
    }

    let Some(operation) = Operation::parse(&raw.operation) else {
        trace_drop(raw, DropReason::IrrelevantChange);
        return None;
    };

    let table = TableKind::parse(&raw.table);

    let kind = match classify(&table, operation, &raw.new_image, &raw.old_image) {
        Classification::Activity(kind) => kind,
        Classification::Irrelevant => {
            trace_drop(raw, DropReason::IrrelevantChange);
            return None;
        }
    };

    let Some(actor_user_id) = resolve_actor(kind, &raw.new_image, ctx.session_user_id) else {
        trace_drop(raw, DropReason::NoResolvableActor);
        return None;
    };

    let actor_name = ctx.lookup.user_by_id(actor_user_id).map_or_else(
        || format!("User {actor_user_id}"),
        |user| user.display_name.clone(),
    );

    let event = ActivityEvent {
        id: synthesize_id(&raw.table, &raw.new_image),
        kind,
        actor_user_id,
        actor_name,
        timestamp: resolve_timestamp(raw.source_timestamp_seconds),
        title: build_title(kind, &table, &raw.new_image),
        description: image_str(&raw.new_image, "description"),
        priority: resolve_event_priority(kind, &table, ctx.lookup, &raw.new_image),
        related_user_id: resolve_related(kind, &raw.new_image, actor_user_id),
        metadata: build_metadata(raw),
    };

    Some(event)
}

/// Resolve the acting user through the fallback chain:
/// explicit per-kind field on the new image, then generic creator/updater/
/// owner fields, then the session user.
fn resolve_actor(
    kind: ActivityKind,
    new_image: &Map<String, Value>,
    session_user_id: Option<i64>,
) -> Option<i64> {
    let explicit = match kind {
        ActivityKind::UserAssigned => image_i64(new_image, &["userId"]),
        ActivityKind::ApprovalRequested => image_i64(new_image, &["requestedBy", "createdBy"]),
        ActivityKind::ApprovalDecided => image_i64(new_image, &["approverId", "updatedBy"]),
        ActivityKind::MessageSent => image_i64(new_image, &["senderId", "createdBy"]),
        ActivityKind::TaskCreated
        | ActivityKind::TaskUpdated
        | ActivityKind::StatusChanged
        | ActivityKind::BroadcastSent => None,
    };

    explicit
        .or_else(|| image_i64(new_image, &["createdBy", "updatedBy", "ownerId"]))
        .or(session_user_id)
}

/// Resolve the related user for cross-actor kinds. The relation is only
/// meaningful when it names someone other than the actor.
fn resolve_related(
    kind: ActivityKind,
    new_image: &Map<String, Value>,
    actor_user_id: i64,
) -> Option<i64> {
    let related = match kind {
        ActivityKind::UserAssigned => image_i64(new_image, &["taskId"]),
        ActivityKind::ApprovalRequested => image_i64(new_image, &["approverId"]),
        ActivityKind::ApprovalDecided => image_i64(new_image, &["requestedBy"]),
        ActivityKind::MessageSent => image_i64(new_image, &["recipientId"]),
        ActivityKind::TaskCreated
        | ActivityKind::TaskUpdated
        | ActivityKind::StatusChanged
        | ActivityKind::BroadcastSent => None,
    };
    related.filter(|id| *id != actor_user_id)
}

/// Build the event title from the kind, table, and new row image.
fn build_title(kind: ActivityKind, table: &TableKind, new_image: &Map<String, Value>) -> String {
    let task_name =
        || image_str(new_image, "name").unwrap_or_else(|| String::from("task"));

    match (kind, table) {
        (ActivityKind::TaskCreated, TableKind::Tasks) => {
            format!("Created task: {}", task_name())
        }
        (ActivityKind::TaskUpdated, TableKind::Tasks) => {
            format!("Updated task: {}", task_name())
        }
        (ActivityKind::StatusChanged, _) => format!("Status changed: {}", task_name()),
        (ActivityKind::UserAssigned, _) => String::from("Assigned user to task"),
        (ActivityKind::MessageSent, _) => String::from("Sent message"),
        (ActivityKind::BroadcastSent, _) => image_str(new_image, "title").map_or_else(
            || String::from("Sent broadcast"),
            |title| format!("Sent broadcast: {title}"),
        ),
        (ActivityKind::ApprovalRequested, _) => String::from("Requested approval"),
        (ActivityKind::ApprovalDecided, _) => String::from("Decided approval"),
        // Generic arms for unknown tables: title from the sanitized name.
        (ActivityKind::TaskCreated, _) => format!("Created {}", sanitize_table(table)),
        (ActivityKind::TaskUpdated, _) => format!("Updated {}", sanitize_table(table)),
    }
}

/// Human-readable form of a table name (underscores become spaces).
fn sanitize_table(table: &TableKind) -> String {
    match table {
        TableKind::Tasks => String::from("task"),
        TableKind::TaskAssignments => String::from("task assignment"),
        TableKind::Messages => String::from("message"),
        TableKind::Broadcasts => String::from("broadcast"),
        TableKind::ApprovalInstances => String::from("approval"),
        TableKind::Other(name) => name.replace('_', " "),
    }
}

/// Resolve the event priority. Only task-shaped rows carry a priority
/// reference; other kinds have none.
fn resolve_event_priority(
    kind: ActivityKind,
    table: &TableKind,
    lookup: &dyn ReferenceLookup,
    new_image: &Map<String, Value>,
) -> Option<Priority> {
    match (kind, table) {
        (
            ActivityKind::TaskCreated | ActivityKind::TaskUpdated | ActivityKind::StatusChanged,
            TableKind::Tasks,
        ) => Some(resolve_priority(lookup, image_i64(new_image, &["priorityId"]))),
        _ => None,
    }
}

/// Convert the source epoch-seconds timestamp, or fall back to now.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn resolve_timestamp(source_seconds: Option<f64>) -> DateTime<Utc> {
    source_seconds
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .and_then(|secs| {
            let whole = secs.floor();
            let nanos = ((secs - whole) * 1_000_000_000.0) as u32;
            DateTime::from_timestamp(whole as i64, nanos)
        })
        .unwrap_or_else(Utc::now)
}

/// Synthesize the event identity: `{table}-{primary key or fallback}-{uniqifier}`.
///
/// The uniqifier is a fresh UUIDv7, so redelivery of the same row change
/// yields a distinct event id (at-least-once semantics, preserved on
/// purpose -- see DESIGN.md).
fn synthesize_id(table: &str, new_image: &Map<String, Value>) -> String {
    let key = new_image.get("id").map_or_else(
        || String::from("row"),
        |value| match value {
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
            _ => String::from("row"),
        },
    );
    format!("{table}-{key}-{}", Uuid::now_v7().simple())
}

/// Capture the originating table/operation and the raw scalar new-image
/// fields as opaque metadata.
fn build_metadata(raw: &ChangeNotification) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();
    metadata.insert(String::from("table"), raw.table.clone());
    metadata.insert(String::from("operation"), raw.operation.clone());
    for (key, value) in &raw.new_image {
        let rendered = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null | Value::Array(_) | Value::Object(_) => continue,
        };
        metadata.insert(key.clone(), rendered);
    }
    metadata
}

/// Read the first present integer field from a row image.
fn image_i64(image: &Map<String, Value>, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|key| image.get(*key)?.as_i64())
}

/// Read a string field from a row image.
fn image_str(image: &Map<String, Value>, key: &str) -> Option<String> {
    image.get(key)?.as_str().map(str::to_owned)
}

/// Emit the diagnostic trace for a dropped notification.
fn trace_drop(raw: &ChangeNotification, reason: DropReason) {
    debug!(
        table = raw.table,
        operation = raw.operation,
        message_type = raw.message_type,
        ?reason,
        "change notification dropped"
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pulseboard_types::{PriorityRecord, UserRecord};
    use serde_json::json;

    use super::*;
    use crate::lookup::InMemoryDirectory;

    fn directory() -> InMemoryDirectory {
        InMemoryDirectory::from_records(
            vec![
                UserRecord {
                    id: 7,
                    display_name: String::from("Ada"),
                },
                UserRecord {
                    id: 3,
                    display_name: String::from("Grace"),
                },
            ],
            vec![
                PriorityRecord {
                    id: 1,
                    name: String::from("Low"),
                },
                PriorityRecord {
                    id: 4,
                    name: String::from(" Urgent "),
                },
            ],
        )
    }

    fn notification(table: &str, operation: &str, new_image: Value) -> ChangeNotification {
        ChangeNotification {
            message_type: String::from("database"),
            operation: operation.to_owned(),
            table: table.to_owned(),
            new_image: new_image.as_object().cloned().unwrap_or_default(),
            old_image: Map::new(),
            source_timestamp_seconds: Some(1_700_000_000.0),
        }
    }

    fn ctx(directory: &InMemoryDirectory) -> NormalizeContext<'_> {
        NormalizeContext {
            lookup: directory,
            session_user_id: None,
        }
    }

    #[test]
    fn task_insert_normalizes() {
        let d = directory();
        let raw = notification(
            "tasks",
            "INSERT",
            json!({"id": 5, "name": "Replace filter", "createdBy": 7}),
        );
        let event = normalize(&raw, &ctx(&d)).unwrap();
        assert_eq!(event.kind, ActivityKind::TaskCreated);
        assert_eq!(event.actor_user_id, 7);
        assert_eq!(event.actor_name, "Ada");
        assert_eq!(event.title, "Created task: Replace filter");
        assert_eq!(event.priority, Some(Priority::Normal));
        assert!(event.id.starts_with("tasks-5-"));
        assert_eq!(event.metadata.get("table").unwrap(), "tasks");
        assert_eq!(event.metadata.get("operation").unwrap(), "INSERT");
    }

    #[test]
    fn unknown_table_insert_takes_generic_path() {
        let d = directory();
        let raw = notification("widgets", "INSERT", json!({"createdBy": 3}));
        let event = normalize(&raw, &ctx(&d)).unwrap();
        assert_eq!(event.kind, ActivityKind::TaskCreated);
        assert_eq!(event.actor_user_id, 3);
        assert_eq!(event.title, "Created widgets");
        assert_eq!(event.priority, None);
    }

    #[test]
    fn no_actor_and_no_session_user_drops() {
        let d = directory();
        let raw = notification("tasks", "INSERT", json!({"id": 1, "name": "Orphan"}));
        assert!(normalize(&raw, &ctx(&d)).is_none());
    }

    #[test]
    fn session_user_is_actor_fallback() {
        let d = directory();
        let raw = notification("tasks", "INSERT", json!({"id": 1, "name": "Orphan"}));
        let ctx = NormalizeContext {
            lookup: &d,
            session_user_id: Some(7),
        };
        let event = normalize(&raw, &ctx).unwrap();
        assert_eq!(event.actor_user_id, 7);
        assert_eq!(event.actor_name, "Ada");
    }

    #[test]
    fn non_database_message_is_ignored() {
        let d = directory();
        let mut raw = notification("tasks", "INSERT", json!({"createdBy": 7}));
        raw.message_type = String::from("presence");
        assert!(normalize(&raw, &ctx(&d)).is_none());
    }

    #[test]
    fn status_change_detected_on_update() {
        let d = directory();
        let mut raw = notification(
            "tasks",
            "UPDATE",
            json!({"id": 2, "name": "Audit", "statusId": 3, "updatedBy": 7, "priorityId": 4}),
        );
        raw.old_image = json!({"statusId": 1}).as_object().cloned().unwrap();
        let event = normalize(&raw, &ctx(&d)).unwrap();
        assert_eq!(event.kind, ActivityKind::StatusChanged);
        assert_eq!(event.title, "Status changed: Audit");
        // Priority re-resolved from the new image on updates too.
        assert_eq!(event.priority, Some(Priority::Urgent));
    }

    #[test]
    fn assignment_relates_actor_to_task() {
        let d = directory();
        let raw = notification("task_users", "INSERT", json!({"userId": 3, "taskId": 42}));
        let event = normalize(&raw, &ctx(&d)).unwrap();
        assert_eq!(event.kind, ActivityKind::UserAssigned);
        assert_eq!(event.actor_user_id, 3);
        assert_eq!(event.related_user_id, Some(42));
    }

    #[test]
    fn approval_request_and_decision() {
        let d = directory();
        let raw = notification(
            "approval_instances",
            "INSERT",
            json!({"id": 9, "requestedBy": 7, "approverId": 3}),
        );
        let event = normalize(&raw, &ctx(&d)).unwrap();
        assert_eq!(event.kind, ActivityKind::ApprovalRequested);
        assert_eq!(event.actor_user_id, 7);
        assert_eq!(event.related_user_id, Some(3));

        let mut raw = notification(
            "approval_instances",
            "UPDATE",
            json!({"id": 9, "approverId": 3, "requestedBy": 7, "statusId": 2}),
        );
        raw.old_image = json!({"statusId": 1}).as_object().cloned().unwrap();
        let event = normalize(&raw, &ctx(&d)).unwrap();
        assert_eq!(event.kind, ActivityKind::ApprovalDecided);
        assert_eq!(event.actor_user_id, 3);
        assert_eq!(event.related_user_id, Some(7));
    }

    #[test]
    fn related_equal_to_actor_is_dropped_from_event() {
        let d = directory();
        let raw = notification(
            "messages",
            "INSERT",
            json!({"senderId": 7, "recipientId": 7}),
        );
        let event = normalize(&raw, &ctx(&d)).unwrap();
        assert_eq!(event.kind, ActivityKind::MessageSent);
        assert_eq!(event.related_user_id, None);
    }

    #[test]
    fn source_timestamp_is_used_when_present() {
        let d = directory();
        let raw = notification("tasks", "INSERT", json!({"id": 1, "createdBy": 7}));
        let event = normalize(&raw, &ctx(&d)).unwrap();
        assert_eq!(event.timestamp.timestamp(), 1_700_000_000);
    }

    #[test]
    fn wall_clock_fallback_when_source_timestamp_absent() {
        let d = directory();
        let mut raw = notification("tasks", "INSERT", json!({"id": 1, "createdBy": 7}));
        raw.source_timestamp_seconds = None;
        let before = Utc::now();
        let event = normalize(&raw, &ctx(&d)).unwrap();
        let after = Utc::now();
        assert!(event.timestamp >= before && event.timestamp <= after);
    }

    #[test]
    fn unknown_user_gets_placeholder_name() {
        let d = directory();
        let raw = notification("tasks", "INSERT", json!({"id": 1, "createdBy": 999}));
        let event = normalize(&raw, &ctx(&d)).unwrap();
        assert_eq!(event.actor_name, "User 999");
    }

    #[test]
    fn redelivery_yields_distinct_event_ids() {
        let d = directory();
        let raw = notification("tasks", "INSERT", json!({"id": 5, "createdBy": 7}));
        let first = normalize(&raw, &ctx(&d)).unwrap();
        let second = normalize(&raw, &ctx(&d)).unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn delete_operations_are_dropped() {
        let d = directory();
        let raw = notification("tasks", "DELETE", json!({"id": 5, "createdBy": 7}));
        assert!(normalize(&raw, &ctx(&d)).is_none());
    }

    #[test]
    fn metadata_captures_scalar_fields_only() {
        let d = directory();
        let raw = notification(
            "tasks",
            "INSERT",
            json!({"id": 5, "name": "X", "createdBy": 7, "tags": ["a"], "done": false}),
        );
        let event = normalize(&raw, &ctx(&d)).unwrap();
        assert_eq!(event.metadata.get("id").unwrap(), "5");
        assert_eq!(event.metadata.get("done").unwrap(), "false");
        assert!(!event.metadata.contains_key("tags"));
    }
}
