//! Priority resolution.
//!
//! Priority names in the backing store are free-form strings. This module
//! maps them onto the closed [`Priority`] enum with trim-and-lowercase
//! normalization and a `Normal` fallback for absent or unrecognized ids --
//! priority resolution never surfaces as an error.

use pulseboard_types::Priority;

use crate::lookup::ReferenceLookup;

/// Map a raw priority name onto the closed enum.
///
/// Matching trims whitespace and lowercases, so `" High "` and `"high"`
/// resolve identically. `"medium"` is accepted as an alias for normal.
/// Unrecognized names return `None` (the caller applies the fallback).
pub fn normalize_priority_name(name: &str) -> Option<Priority> {
    match name.trim().to_lowercase().as_str() {
        "low" => Some(Priority::Low),
        "medium" | "normal" => Some(Priority::Normal),
        "high" => Some(Priority::High),
        "urgent" => Some(Priority::Urgent),
        _ => None,
    }
}

/// Resolve a priority reference through the lookup table.
///
/// Absent ids, missing records, and unrecognized names all default to
/// [`Priority::Normal`].
pub fn resolve_priority(lookup: &dyn ReferenceLookup, priority_id: Option<i64>) -> Priority {
    priority_id
        .and_then(|id| lookup.priority_by_id(id))
        .and_then(|record| normalize_priority_name(&record.name))
        .unwrap_or(Priority::Normal)
}
