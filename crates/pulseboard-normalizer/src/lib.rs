//! Change-notification normalization for the Pulseboard activity dashboard.
//!
//! The normalizer is a pure, total function: one raw change notification in,
//! zero-or-one [`ActivityEvent`] out. It never panics and never returns an
//! error -- irrelevant traffic, unresolvable actors, and unsupported
//! operations all collapse to `None` with a diagnostic trace.
//!
//! # Modules
//!
//! - [`classify`] -- Closed `(TableKind, Operation)` classification with an
//!   explicit generic fallback arm for unknown tables.
//! - [`lookup`] -- [`ReferenceLookup`] trait over the in-memory reference
//!   tables, plus [`InMemoryDirectory`].
//! - [`normalize`] -- The [`normalize`] entry point: actor fallback chain,
//!   timestamp fallback, identity synthesis, metadata capture.
//! - [`priority`] -- Priority-name normalization onto the closed
//!   [`Priority`] enum.
//!
//! [`ActivityEvent`]: pulseboard_types::ActivityEvent
//! [`Priority`]: pulseboard_types::Priority
//! [`ReferenceLookup`]: lookup::ReferenceLookup
//! [`InMemoryDirectory`]: lookup::InMemoryDirectory
//! [`normalize`]: normalize::normalize

pub mod classify;
pub mod lookup;
pub mod normalize;
pub mod priority;

pub use classify::{Classification, Operation, TableKind};
pub use lookup::{InMemoryDirectory, ReferenceLookup};
pub use normalize::{DropReason, NormalizeContext, normalize};
pub use priority::{normalize_priority_name, resolve_priority};
