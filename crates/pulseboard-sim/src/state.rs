//! Simulation state and tunables.
//!
//! All ephemeral entities (actor nodes, activity particles, relation edges)
//! live in one [`SimState`] owned exclusively by a single engine instance.
//! Nothing in this crate holds state outside of it: every simulate/render
//! function takes the state (or a part of it) as an argument, so two
//! dashboard instances can never share or corrupt each other's entities.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use pulseboard_types::{ActivityEvent, ActivityKind, Priority, SimStats};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::geometry::Vec2;
use crate::window::{DEFAULT_CAPACITY, EventWindow};

/// Tunable parameters of the simulation.
///
/// Defaults match the canonical orbital/particle rendering variant. Tests
/// override individual fields (e.g. zeroing the attraction gain to observe
/// pure repulsion).
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Viewport width in pixels.
    pub viewport_width: f64,

    /// Viewport height in pixels.
    pub viewport_height: f64,

    /// Recent-event window capacity.
    pub window_capacity: usize,

    /// Maximum live particle population; oldest truncated beyond this.
    pub particle_cap: usize,

    /// Relation-edge time-to-live in seconds.
    pub edge_ttl_seconds: f64,

    /// Duration of a particle's entering phase in seconds.
    pub entering_duration_seconds: f64,

    /// Velocity gain toward the viewport center per tick.
    pub center_attraction_gain: f64,

    /// Distance from center below which attraction is not applied.
    pub center_threshold: f64,

    /// Radius within which nodes repel each other.
    pub repulsion_radius: f64,

    /// Velocity gain away from a neighbor at zero separation.
    pub repulsion_gain: f64,

    /// Per-tick velocity damping factor (must be < 1).
    pub damping: f64,

    /// Minimum distance nodes keep from the viewport edges.
    pub boundary_margin: f64,

    /// Per-tick advance of an edge's travel phase (cyclic in `[0, 1)`).
    pub travel_phase_step: f64,

    /// Radius of the ring new nodes are placed on around the center.
    pub node_ring_radius: f64,

    /// Minimum particle orbit radius.
    pub orbit_radius_min: f64,

    /// Maximum particle orbit radius.
    pub orbit_radius_max: f64,

    /// Minimum particle angular velocity (radians per tick).
    pub angular_velocity_min: f64,

    /// Maximum particle angular velocity (radians per tick).
    pub angular_velocity_max: f64,

    /// Extra pointer slack around a particle's visual radius for hit tests.
    pub hit_margin: f64,

    /// Seed for the placement RNG; same seed, same orbit layout.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            viewport_width: 800.0,
            viewport_height: 600.0,
            window_capacity: DEFAULT_CAPACITY,
            particle_cap: 100,
            edge_ttl_seconds: 15.0,
            entering_duration_seconds: 1.0,
            center_attraction_gain: 0.02,
            center_threshold: 4.0,
            repulsion_radius: 140.0,
            repulsion_gain: 0.6,
            damping: 0.92,
            boundary_margin: 40.0,
            travel_phase_step: 0.02,
            node_ring_radius: 180.0,
            orbit_radius_min: 30.0,
            orbit_radius_max: 70.0,
            angular_velocity_min: 0.01,
            angular_velocity_max: 0.05,
            hit_margin: 4.0,
            seed: 0,
        }
    }
}

impl SimConfig {
    /// Center of the viewport.
    pub const fn viewport_center(&self) -> Vec2 {
        Vec2::new(self.viewport_width / 2.0, self.viewport_height / 2.0)
    }
}

/// The simulated body for one human actor.
///
/// Created lazily on the first event referencing the actor; never deleted
/// for the life of the session.
#[derive(Debug, Clone)]
pub struct ActorNode {
    /// The actor's user id.
    pub actor_id: i64,

    /// Display name shown beside the node.
    pub name: String,

    /// Current position.
    pub position: Vec2,

    /// Current velocity.
    pub velocity: Vec2,

    /// Number of events materialized for this actor.
    pub activity_count: u64,

    /// Stable index into the node color palette.
    pub color_index: usize,
}

/// Lifecycle phase of an activity particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticlePhase {
    /// Flying in from the viewport perimeter toward the orbit anchor.
    Entering,
    /// Orbiting the owning actor node indefinitely.
    Orbiting,
}

/// The simulated body for one activity event, orbiting its actor's node.
#[derive(Debug, Clone)]
pub struct ActivityParticle {
    /// The owning event. The owning [`ActorNode`] is keyed by
    /// `event.actor_user_id` and always exists (created-before-particle).
    pub event: ActivityEvent,

    /// Current position.
    pub position: Vec2,

    /// Perimeter point the particle entered from.
    pub entry_point: Vec2,

    /// Orbit radius around the owning node.
    pub orbit_radius: f64,

    /// Current orbit angle in radians.
    pub orbit_angle: f64,

    /// Fixed angular velocity in radians per tick.
    pub angular_velocity: f64,

    /// Visual radius, derived from the event priority.
    pub size: f64,

    /// When the particle was spawned.
    pub born_at: DateTime<Utc>,

    /// Current lifecycle phase.
    pub phase: ParticlePhase,
}

/// A decaying visual link between two actors implied by a cross-actor event.
#[derive(Debug, Clone)]
pub struct RelationEdge {
    /// The acting user's id.
    pub source_actor_id: i64,

    /// The related user's id.
    pub target_actor_id: i64,

    /// Kind of the event that created the edge.
    pub kind: ActivityKind,

    /// When the edge was created. Edges older than the TTL are pruned.
    pub created_at: DateTime<Utc>,

    /// Cyclic phase in `[0, 1)` driving the traveling indicator.
    pub travel_phase: f64,

    /// Fading opacity `max(0, 1 - age/ttl)`, refreshed each tick.
    pub opacity: f64,
}

/// The complete per-session simulation state.
#[derive(Debug)]
pub struct SimState {
    /// Tunable parameters.
    pub config: SimConfig,

    /// Actor nodes keyed by user id. Monotonically growing.
    pub nodes: BTreeMap<i64, ActorNode>,

    /// Live particles in birth order (oldest first).
    pub particles: Vec<ActivityParticle>,

    /// Live relation edges.
    pub edges: Vec<RelationEdge>,

    /// The recent-event window feeding materialization.
    pub window: EventWindow,

    /// Placement RNG (orbit radius/angle). Seeded from the config for
    /// reproducible runs.
    pub rng: SmallRng,

    /// Number of ticks executed.
    pub tick: u64,
}

impl SimState {
    /// Create a fresh state from a configuration.
    pub fn new(config: SimConfig) -> Self {
        let window = EventWindow::new(config.window_capacity);
        let rng = SmallRng::seed_from_u64(config.seed);
        Self {
            config,
            nodes: BTreeMap::new(),
            particles: Vec::new(),
            edges: Vec::new(),
            window,
            rng,
            tick: 0,
        }
    }

    /// Current population counts for the presentation shell.
    pub fn stats(&self) -> SimStats {
        SimStats {
            node_count: saturating_u32(self.nodes.len()),
            particle_count: saturating_u32(self.particles.len()),
            edge_count: saturating_u32(self.edges.len()),
        }
    }
}

/// Visual radius for a particle, derived from its event priority.
pub fn priority_size(priority: Option<Priority>) -> f64 {
    match priority {
        Some(Priority::Low) => 3.0,
        None | Some(Priority::Normal) => 4.0,
        Some(Priority::High) => 5.5,
        Some(Priority::Urgent) => 7.0,
    }
}

/// Saturating usize-to-u32 conversion for stats counters.
fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
