//! Read-only reference records.
//!
//! Reference data (users, priorities) is already resident in memory on the
//! client; the normalizer consults it synchronously to resolve numeric ids
//! into display names and priority levels. These records are never written
//! by the core.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A user record from the reference directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UserRecord {
    /// Numeric user id as used by the backing store.
    pub id: i64,

    /// Name shown on actor nodes and hover detail.
    pub display_name: String,
}

/// A priority record from the reference directory.
///
/// The `name` is free-form in the backing store; the normalizer maps it
/// onto the closed [`Priority`] enum with a `Normal` fallback.
///
/// [`Priority`]: crate::event::Priority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PriorityRecord {
    /// Numeric priority id as used by the backing store.
    pub id: i64,

    /// Free-form priority name (e.g. `"High"`, `" urgent "`).
    pub name: String,
}
