//! Read-only payloads exposed to the presentation shell.
//!
//! The engine exposes current simulation statistics and a hover-detail
//! payload for the shell to render as overlays. The shell has no mutation
//! API into engine internals; these structs are the entire outbound surface.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::event::Priority;

/// Current simulation population counts, published once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SimStats {
    /// Number of actor nodes (monotonically growing per session).
    pub node_count: u32,

    /// Number of live activity particles (capped at the population limit).
    pub particle_count: u32,

    /// Number of live relation edges (TTL-pruned).
    pub edge_count: u32,
}

/// Detail payload for the particle currently under the pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HoverDetail {
    /// Event title.
    pub title: String,

    /// Event description, when present.
    pub description: Option<String>,

    /// Display name of the acting user.
    pub actor_name: String,

    /// Resolved priority, when the event carries one.
    pub priority: Option<Priority>,

    /// Age of the event at hover time, in fractional seconds.
    pub age_seconds: f64,
}
