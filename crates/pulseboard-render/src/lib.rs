//! Frame rendering for the Pulseboard activity dashboard.
//!
//! Rendering only reads simulation state: the per-tick [`render_frame`]
//! pass walks edges, particles, and nodes in a fixed order and emits
//! primitive draw operations onto an abstract [`Surface`]. The host shell
//! supplies the real pixel surface; tests use the [`DrawList`] recorder.
//! All visual parameters (colors, sizes) derive deterministically from the
//! domain data -- activity kind picks the color, priority picks the size.
//!
//! # Modules
//!
//! - [`surface`] -- The [`Surface`] trait and the [`DrawList`] recorder.
//! - [`palette`] -- Deterministic color and size derivations.
//! - [`frame`] -- The ordered per-tick draw pass.
//!
//! [`Surface`]: surface::Surface
//! [`DrawList`]: surface::DrawList
//! [`render_frame`]: frame::render_frame

pub mod frame;
pub mod palette;
pub mod surface;

pub use frame::render_frame;
pub use palette::{Color, kind_color, node_color};
pub use surface::{DrawList, DrawOp, Surface};
