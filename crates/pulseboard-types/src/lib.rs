//! Shared type definitions for the Pulseboard activity dashboard.
//!
//! This crate is the single source of truth for the types that cross
//! subsystem boundaries: the raw change-notification wire shape consumed by
//! the normalizer, the strongly typed [`ActivityEvent`] domain model, the
//! read-only reference records, and the outbound payloads the presentation
//! shell reads (simulation statistics, hover detail). Types defined here
//! flow downstream to `TypeScript` via `ts-rs` for the dashboard shell.
//!
//! # Modules
//!
//! - [`change`] -- Raw change-notification wire shape (loosely typed).
//! - [`event`] -- [`ActivityEvent`], [`ActivityKind`], and [`Priority`].
//! - [`reference`] -- Read-only reference records (users, priorities).
//! - [`outbound`] -- Read-only payloads exposed to the presentation shell.

pub mod change;
pub mod event;
pub mod outbound;
pub mod reference;

// Re-export all public types at crate root for convenience.
pub use change::ChangeNotification;
pub use event::{ActivityEvent, ActivityKind, Priority};
pub use outbound::{HoverDetail, SimStats};
pub use reference::{PriorityRecord, UserRecord};
