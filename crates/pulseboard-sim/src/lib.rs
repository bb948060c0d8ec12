//! Physics simulation engine for the Pulseboard activity dashboard.
//!
//! This crate owns the per-session ephemeral simulation state -- actor
//! nodes, activity particles, relation edges -- and advances it once per
//! animation tick. The design follows two rules from day one:
//!
//! - All simulation state lives in one exclusively-owned [`SimState`]
//!   passed into the tick function. No module-level mutable state, so
//!   concurrent visualization instances cannot cross-contaminate.
//! - Simulation and rendering are separate passes: [`run_tick`] mutates
//!   state and returns a [`TickSummary`]; rendering (a sibling crate) only
//!   reads. This keeps the physics unit-testable without a drawing surface.
//!
//! # Modules
//!
//! - [`geometry`] -- Minimal 2D vector math.
//! - [`window`] -- Bounded newest-first recent-event window with
//!   materialization tracking.
//! - [`state`] -- [`SimState`], [`SimConfig`], and the ephemeral entities.
//! - [`physics`] -- Per-tick actor-node force integration.
//! - [`tick`] -- The tick orchestration: materialize, advance, prune.
//! - [`hit`] -- Pointer hit testing against particles.
//!
//! [`SimState`]: state::SimState
//! [`run_tick`]: tick::run_tick
//! [`TickSummary`]: tick::TickSummary

pub mod geometry;
pub mod hit;
pub mod physics;
pub mod state;
pub mod tick;
pub mod window;

pub use geometry::Vec2;
pub use hit::{hit_test, hover_detail};
pub use state::{
    ActivityParticle, ActorNode, ParticlePhase, RelationEdge, SimConfig, SimState,
};
pub use tick::{TickSummary, run_tick};
pub use window::EventWindow;
