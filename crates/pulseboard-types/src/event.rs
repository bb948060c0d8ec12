//! Normalized activity events.
//!
//! An [`ActivityEvent`] is the strongly typed domain representation of one
//! change notification relevant to the dashboard. Events are created once
//! by the normalizer and never mutated; the recent-event window owns them
//! until capacity eviction.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The kind of activity an event represents.
///
/// Each kind maps to a deterministic particle color in the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ActivityKind {
    /// A task row was inserted (also the generic unknown-table insert shape).
    TaskCreated,
    /// A task row was updated without a status transition (also the generic
    /// unknown-table update shape).
    TaskUpdated,
    /// A task update where the status reference changed between images.
    StatusChanged,
    /// A message row was inserted.
    MessageSent,
    /// An approval instance was requested.
    ApprovalRequested,
    /// An approval instance received a status decision.
    ApprovalDecided,
    /// A broadcast row was inserted.
    BroadcastSent,
    /// A user was assigned to a task.
    UserAssigned,
}

/// Urgency of an activity, resolved from the priority reference table.
///
/// Drives particle size and the pulsing urgency ring for [`Priority::Urgent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Priority {
    /// Lowest urgency.
    Low,
    /// Default urgency; also the fallback for unknown priority names.
    Normal,
    /// Elevated urgency.
    High,
    /// Highest urgency; rendered with a pulsing ring overlay.
    Urgent,
}

/// A normalized activity event.
///
/// Immutable once created. The `id` is globally unique per materialization:
/// it carries a random uniqifier, so redelivery of the same underlying row
/// change produces a distinct event (at-least-once semantics).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActivityEvent {
    /// Synthesized identity: `{table}-{primary key or fallback}-{uniqifier}`.
    pub id: String,

    /// What kind of activity this event represents.
    pub kind: ActivityKind,

    /// The acting user. Events without a resolvable actor are dropped
    /// before construction, so this is always present.
    pub actor_user_id: i64,

    /// Display name of the acting user.
    pub actor_name: String,

    /// When the change happened (source timestamp, or normalization time
    /// when the source did not provide one).
    pub timestamp: DateTime<Utc>,

    /// Short human-readable summary of the activity.
    pub title: String,

    /// Optional longer description.
    pub description: Option<String>,

    /// Resolved priority, when the originating row carries one.
    pub priority: Option<Priority>,

    /// A second user implied by the event (assignee, approver), when the
    /// change relates two actors. Drives relation-edge creation.
    pub related_user_id: Option<i64>,

    /// Opaque diagnostic payload: originating table/operation plus the raw
    /// scalar fields of the new row image.
    pub metadata: BTreeMap<String, String>,
}

impl ActivityEvent {
    /// Age of this event at `now`, in fractional seconds (never negative).
    #[allow(clippy::cast_precision_loss)]
    pub fn age_seconds(&self, now: DateTime<Utc>) -> f64 {
        let millis = now.signed_duration_since(self.timestamp).num_milliseconds();
        (millis.max(0) as f64) / 1000.0
    }
}
