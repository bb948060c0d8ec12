//! Closed classification of `(table, operation)` pairs.
//!
//! The wire delivers table names and operations as raw strings. This module
//! parses them into closed tagged unions and classifies every combination
//! through one exhaustive match, so adding a table variant without handling
//! it is a compile error. Unknown tables land in an explicit generic arm
//! rather than failing: the normalizer must never drop traffic merely
//! because a table is new.

use pulseboard_types::ActivityKind;
use serde_json::{Map, Value};

/// A logical table known to the dashboard, or `Other` for anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableKind {
    /// The tasks table.
    Tasks,
    /// The task-to-user assignment table.
    TaskAssignments,
    /// The messages table.
    Messages,
    /// The broadcasts table.
    Broadcasts,
    /// The approval instances table.
    ApprovalInstances,
    /// Any other table; handled by the generic fallback arms.
    Other(String),
}

impl TableKind {
    /// Parse a raw table name. Matching is case-insensitive and
    /// whitespace-trimmed; anything unrecognized becomes [`Self::Other`].
    pub fn parse(table: &str) -> Self {
        match table.trim().to_lowercase().as_str() {
            "tasks" => Self::Tasks,
            "task_users" => Self::TaskAssignments,
            "messages" => Self::Messages,
            "broadcasts" => Self::Broadcasts,
            "approval_instances" => Self::ApprovalInstances,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// A row operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Row insert.
    Insert,
    /// Row update.
    Update,
    /// Row delete. No activity kind maps to deletes; they are dropped.
    Delete,
}

impl Operation {
    /// Parse a raw operation string (case-insensitive). Returns `None` for
    /// anything other than insert/update/delete.
    pub fn parse(operation: &str) -> Option<Self> {
        match operation.trim().to_lowercase().as_str() {
            "insert" => Some(Self::Insert),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

/// The outcome of classifying a `(table, operation)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The pair maps to an activity kind.
    Activity(ActivityKind),
    /// The pair carries no dashboard-relevant activity (deletes, and
    /// updates on tables where only inserts matter).
    Irrelevant,
}

/// Classify a parsed `(table, operation)` pair into an activity kind.
///
/// The status-change override for task updates and the decision detection
/// for approval updates both need the row images, so they are passed in.
/// Unknown tables take the generic arms: inserts classify as
/// [`ActivityKind::TaskCreated`]-shaped, updates as
/// [`ActivityKind::TaskUpdated`]-shaped.
pub fn classify(
    table: &TableKind,
    operation: Operation,
    new_image: &Map<String, Value>,
    old_image: &Map<String, Value>,
) -> Classification {
    match (table, operation) {
        (TableKind::Tasks, Operation::Insert) => Classification::Activity(ActivityKind::TaskCreated),
        (TableKind::Tasks, Operation::Update) => {
            // A status reference change overrides the default update kind.
            if field_differs(new_image, old_image, "statusId") {
                Classification::Activity(ActivityKind::StatusChanged)
            } else {
                Classification::Activity(ActivityKind::TaskUpdated)
            }
        }
        (TableKind::TaskAssignments, Operation::Insert) => {
            Classification::Activity(ActivityKind::UserAssigned)
        }
        (TableKind::Messages, Operation::Insert) => {
            Classification::Activity(ActivityKind::MessageSent)
        }
        (TableKind::Broadcasts, Operation::Insert) => {
            Classification::Activity(ActivityKind::BroadcastSent)
        }
        (TableKind::ApprovalInstances, Operation::Insert) => {
            Classification::Activity(ActivityKind::ApprovalRequested)
        }
        (TableKind::ApprovalInstances, Operation::Update) => {
            if field_differs(new_image, old_image, "statusId") {
                Classification::Activity(ActivityKind::ApprovalDecided)
            } else {
                Classification::Activity(ActivityKind::TaskUpdated)
            }
        }
        // Updates on insert-only tables carry no new activity.
        (
            TableKind::TaskAssignments | TableKind::Messages | TableKind::Broadcasts,
            Operation::Update,
        ) => Classification::Irrelevant,
        // Generic fallback: the normalizer never fails on an unknown table.
        (TableKind::Other(_), Operation::Insert) => {
            Classification::Activity(ActivityKind::TaskCreated)
        }
        (TableKind::Other(_), Operation::Update) => {
            Classification::Activity(ActivityKind::TaskUpdated)
        }
        (_, Operation::Delete) => Classification::Irrelevant,
    }
}

/// Whether a field differs between the new and old row images.
///
/// A field absent from both images does not differ; a field present in one
/// image only does.
fn field_differs(new_image: &Map<String, Value>, old_image: &Map<String, Value>, key: &str) -> bool {
    new_image.get(key) != old_image.get(key)
}
