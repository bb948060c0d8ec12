//! The tick cycle: materialize, advance, prune.
//!
//! Each animation tick runs through these phases:
//!
//! 1. **Materialize** -- scan the recent-event window for events not yet
//!    materialized; create/update actor nodes, spawn entering particles,
//!    and create relation edges for cross-actor events. The window is
//!    re-scanned in full every tick (rather than diffed incrementally) to
//!    tolerate out-of-order delivery.
//! 2. **Cap** -- truncate the particle population to the cap, oldest first.
//! 3. **Particles** -- advance entering interpolation and orbit angles.
//! 4. **Edges** -- prune edges past the TTL, refresh fading opacity,
//!    advance the traveling indicator phase.
//! 5. **Physics** -- integrate actor-node forces ([`physics::step_nodes`]).
//! 6. **Hover** -- hit-test the sampled pointer against the particles.
//!
//! Nothing in this pass suspends or errors: a malformed event can at worst
//! skip its own materialization, never abort the tick loop.

use std::f64::consts::TAU;

use chrono::{DateTime, Utc};
use pulseboard_types::{ActivityEvent, HoverDetail, SimStats};
use rand::Rng;
use tracing::debug;

use crate::geometry::{Vec2, ease_out_cubic};
use crate::physics;
use crate::state::{
    ActivityParticle, ActorNode, ParticlePhase, RelationEdge, SimConfig, SimState, priority_size,
};
use crate::hit;

/// Successive ring placements advance by the golden angle, which spreads
/// any number of nodes around the center without clustering.
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// Summary of one tick's execution.
#[derive(Debug, Clone)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Events materialized into particles this tick.
    pub materialized: usize,
    /// Edges pruned by TTL expiry this tick.
    pub pruned_edges: usize,
    /// Particles truncated by the population cap this tick.
    pub truncated_particles: usize,
    /// Population counts at end of tick.
    pub stats: SimStats,
    /// Detail for the particle under the pointer, if any.
    pub hovered: Option<HoverDetail>,
}

/// Execute one complete simulation tick.
///
/// `now` is the tick's wall-clock instant (passed in so tests control
/// time); `pointer` is the pointer position sampled at tick start, if the
/// pointer is over the viewport.
pub fn run_tick(state: &mut SimState, now: DateTime<Utc>, pointer: Option<Vec2>) -> TickSummary {
    state.tick = state.tick.saturating_add(1);

    // --- Phase 1: Materialize ---
    let materialized = materialize_window(state, now);

    // --- Phase 2: Cap ---
    let truncated_particles = enforce_particle_cap(state);

    // --- Phase 3: Particles ---
    advance_particles(state, now);

    // --- Phase 4: Edges ---
    let pruned_edges = age_edges(state, now);

    // --- Phase 5: Physics ---
    physics::step_nodes(&mut state.nodes, &state.config);

    // --- Phase 6: Hover ---
    let hovered = pointer
        .and_then(|p| hit::hit_test(&state.particles, p, state.config.hit_margin))
        .map(|particle| hit::hover_detail(particle, now));

    let summary = TickSummary {
        tick: state.tick,
        materialized,
        pruned_edges,
        truncated_particles,
        stats: state.stats(),
        hovered,
    };
    debug!(
        tick = summary.tick,
        materialized = summary.materialized,
        pruned_edges = summary.pruned_edges,
        nodes = summary.stats.node_count,
        particles = summary.stats.particle_count,
        "tick complete"
    );
    summary
}

/// Materialize every not-yet-seen window event into simulation entities.
fn materialize_window(state: &mut SimState, now: DateTime<Utc>) -> usize {
    // Clone the pending events first: materialization needs mutable access
    // to the window's seen-set, the node map, and the RNG.
    let pending: Vec<ActivityEvent> = state.window.unmaterialized().cloned().collect();

    for event in &pending {
        state.window.mark_materialized(&event.id);
        materialize_event(state, event, now);
    }
    pending.len()
}

/// Materialize a single event: owning node, particle, optional edge.
///
/// The owning node is created (or updated) before the particle is spawned,
/// so the created-before-particle invariant holds for every
/// materialization order.
fn materialize_event(state: &mut SimState, event: &ActivityEvent, now: DateTime<Utc>) {
    let node_position = {
        let node = ensure_node(
            &mut state.nodes,
            &state.config,
            event.actor_user_id,
            &event.actor_name,
        );
        node.activity_count = node.activity_count.saturating_add(1);
        node.position
    };

    spawn_particle(state, event, node_position, now);

    if let Some(related_id) = event.related_user_id {
        if related_id != event.actor_user_id {
            // Reuse the related actor's node if it exists; otherwise create
            // it with a placeholder name (a later event naming that actor
            // does not rename it -- nodes are keyed by id, named at birth).
            ensure_node(
                &mut state.nodes,
                &state.config,
                related_id,
                &format!("User {related_id}"),
            );
            state.edges.push(RelationEdge {
                source_actor_id: event.actor_user_id,
                target_actor_id: related_id,
                kind: event.kind,
                created_at: now,
                travel_phase: 0.0,
                opacity: 1.0,
            });
        }
    }
}

/// Get or lazily create the node for an actor.
///
/// New nodes start on a ring around the viewport center, spaced by the
/// current node count (golden-angle increments), with zero velocity.
fn ensure_node<'a>(
    nodes: &'a mut std::collections::BTreeMap<i64, ActorNode>,
    config: &SimConfig,
    actor_id: i64,
    name: &str,
) -> &'a mut ActorNode {
    let index = nodes.len();
    nodes.entry(actor_id).or_insert_with(|| {
        #[allow(clippy::cast_precision_loss)]
        let angle = index as f64 * GOLDEN_ANGLE;
        ActorNode {
            actor_id,
            name: name.to_owned(),
            position: config.viewport_center().offset_polar(angle, config.node_ring_radius),
            velocity: Vec2::ZERO,
            activity_count: 0,
            color_index: index,
        }
    })
}

/// Spawn an entering particle anchored to a random orbit around its node.
fn spawn_particle(
    state: &mut SimState,
    event: &ActivityEvent,
    node_position: Vec2,
    now: DateTime<Utc>,
) {
    let config = &state.config;
    let orbit_radius = sample_range(
        &mut state.rng,
        config.orbit_radius_min,
        config.orbit_radius_max,
    );
    let orbit_angle = state.rng.random_range(0.0..TAU);
    let angular_velocity = sample_range(
        &mut state.rng,
        config.angular_velocity_min,
        config.angular_velocity_max,
    );

    let anchor = node_position.offset_polar(orbit_angle, orbit_radius);
    let entry_point = perimeter_entry_point(config, anchor);

    state.particles.push(ActivityParticle {
        event: event.clone(),
        position: entry_point,
        entry_point,
        orbit_radius,
        orbit_angle,
        angular_velocity,
        size: priority_size(event.priority),
        born_at: now,
        phase: ParticlePhase::Entering,
    });
}

/// Sample uniformly from `[min, max)`, tolerating a degenerate range.
fn sample_range(rng: &mut impl Rng, min: f64, max: f64) -> f64 {
    if max > min {
        rng.random_range(min..max)
    } else {
        min
    }
}

/// The point on the viewport's outer perimeter in the direction of the
/// anchor, as seen from the viewport center. Particles fly in from here.
fn perimeter_entry_point(config: &SimConfig, anchor: Vec2) -> Vec2 {
    let center = config.viewport_center();
    let direction = (anchor - center)
        .normalized()
        .unwrap_or_else(|| Vec2::new(1.0, 0.0));

    // Scale the direction ray until it meets the viewport rectangle.
    let half_width = config.viewport_width / 2.0;
    let half_height = config.viewport_height / 2.0;
    let scale_x = if direction.x.abs() < f64::EPSILON {
        f64::INFINITY
    } else {
        half_width / direction.x.abs()
    };
    let scale_y = if direction.y.abs() < f64::EPSILON {
        f64::INFINITY
    } else {
        half_height / direction.y.abs()
    };
    center + direction.scaled(scale_x.min(scale_y))
}

/// Truncate the oldest particles beyond the population cap.
fn enforce_particle_cap(state: &mut SimState) -> usize {
    let cap = state.config.particle_cap.max(1);
    let excess = state.particles.len().saturating_sub(cap);
    if excess > 0 {
        state.particles.drain(0..excess);
    }
    excess
}

/// Advance particle lifecycle and positions.
fn advance_particles(state: &mut SimState, now: DateTime<Utc>) {
    let entering_duration = state.config.entering_duration_seconds.max(f64::EPSILON);

    for particle in &mut state.particles {
        // Created-before-particle: the owning node always exists. The get
        // is still checked so a violated invariant freezes the particle
        // rather than panicking mid-frame.
        let Some(node) = state.nodes.get(&particle.event.actor_user_id) else {
            continue;
        };

        match particle.phase {
            ParticlePhase::Entering => {
                let elapsed = seconds_since(particle.born_at, now);
                let t = elapsed / entering_duration;
                let anchor = node
                    .position
                    .offset_polar(particle.orbit_angle, particle.orbit_radius);
                if t >= 1.0 {
                    particle.phase = ParticlePhase::Orbiting;
                    particle.position = anchor;
                } else {
                    particle.position = particle.entry_point.lerp(anchor, ease_out_cubic(t));
                }
            }
            ParticlePhase::Orbiting => {
                particle.orbit_angle = (particle.orbit_angle + particle.angular_velocity) % TAU;
                particle.position = node
                    .position
                    .offset_polar(particle.orbit_angle, particle.orbit_radius);
            }
        }
    }
}

/// Prune expired edges; refresh opacity and the traveling phase on the rest.
fn age_edges(state: &mut SimState, now: DateTime<Utc>) -> usize {
    let ttl = state.config.edge_ttl_seconds.max(f64::EPSILON);
    let step = state.config.travel_phase_step;
    let before = state.edges.len();

    state.edges.retain_mut(|edge| {
        let age = seconds_since(edge.created_at, now);
        if age > ttl {
            return false;
        }
        edge.opacity = (1.0 - age / ttl).max(0.0);
        edge.travel_phase = (edge.travel_phase + step).fract();
        true
    });

    before.saturating_sub(state.edges.len())
}

/// Elapsed fractional seconds from `earlier` to `now` (clamped at zero).
#[allow(clippy::cast_precision_loss)]
fn seconds_since(earlier: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now.signed_duration_since(earlier).num_milliseconds().max(0) as f64) / 1000.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Duration;
    use pulseboard_types::{ActivityKind, Priority};

    use super::*;

    fn make_event(id: &str, actor: i64) -> ActivityEvent {
        ActivityEvent {
            id: id.to_owned(),
            kind: ActivityKind::TaskCreated,
            actor_user_id: actor,
            actor_name: format!("User {actor}"),
            timestamp: Utc::now(),
            title: format!("Created task: {id}"),
            description: None,
            priority: Some(Priority::Normal),
            related_user_id: None,
            metadata: BTreeMap::new(),
        }
    }

    fn make_related_event(id: &str, actor: i64, related: i64) -> ActivityEvent {
        ActivityEvent {
            related_user_id: Some(related),
            kind: ActivityKind::UserAssigned,
            ..make_event(id, actor)
        }
    }

    fn make_state() -> SimState {
        SimState::new(SimConfig::default())
    }

    #[test]
    fn materialization_creates_node_before_particle() {
        let mut state = make_state();
        state.window.push(make_event("a", 7));

        let summary = run_tick(&mut state, Utc::now(), None);
        assert_eq!(summary.materialized, 1);
        assert_eq!(state.particles.len(), 1);
        for particle in &state.particles {
            assert!(state.nodes.contains_key(&particle.event.actor_user_id));
        }
        assert_eq!(state.nodes.get(&7).unwrap().activity_count, 1);
    }

    #[test]
    fn rescanning_window_does_not_duplicate_particles() {
        let mut state = make_state();
        state.window.push(make_event("a", 7));

        let now = Utc::now();
        let _ = run_tick(&mut state, now, None);
        let summary = run_tick(&mut state, now + Duration::milliseconds(16), None);
        assert_eq!(summary.materialized, 0);
        assert_eq!(state.particles.len(), 1);
    }

    #[test]
    fn particle_population_never_exceeds_cap() {
        let mut state = SimState::new(SimConfig {
            particle_cap: 10,
            window_capacity: 200,
            ..SimConfig::default()
        });
        let mut now = Utc::now();
        for i in 0..50 {
            state.window.push(make_event(&format!("e{i}"), i % 5));
            now += Duration::milliseconds(16);
            let summary = run_tick(&mut state, now, None);
            assert!(summary.stats.particle_count <= 10);
            assert!(state.particles.len() <= 10);
        }
        // Oldest-first truncation: the survivors are the newest events.
        assert_eq!(state.particles.first().unwrap().event.id, "e40");
    }

    #[test]
    fn entering_particle_reaches_orbit_after_duration() {
        // Freeze node motion so the orbit distance is exact.
        let mut state = SimState::new(SimConfig {
            center_attraction_gain: 0.0,
            ..SimConfig::default()
        });
        state.window.push(make_event("a", 7));

        let start = Utc::now();
        let _ = run_tick(&mut state, start, None);
        assert_eq!(state.particles.first().unwrap().phase, ParticlePhase::Entering);

        let _ = run_tick(&mut state, start + Duration::milliseconds(1100), None);
        let particle = state.particles.first().unwrap();
        assert_eq!(particle.phase, ParticlePhase::Orbiting);

        let node = state.nodes.get(&7).unwrap();
        let distance = particle.position.distance_to(node.position);
        assert!((distance - particle.orbit_radius).abs() < 1e-6);
    }

    #[test]
    fn orbiting_particle_advances_angle_each_tick() {
        let mut state = make_state();
        state.window.push(make_event("a", 7));

        let start = Utc::now();
        let _ = run_tick(&mut state, start, None);
        let _ = run_tick(&mut state, start + Duration::seconds(2), None);
        let angle_before = state.particles.first().unwrap().orbit_angle;
        let _ = run_tick(&mut state, start + Duration::seconds(3), None);
        let particle = state.particles.first().unwrap();
        assert!((particle.orbit_angle - angle_before).abs() > 1e-9);
    }

    #[test]
    fn cross_actor_event_creates_edge_and_both_nodes() {
        let mut state = make_state();
        state.window.push(make_related_event("a", 7, 3));

        let summary = run_tick(&mut state, Utc::now(), None);
        assert_eq!(summary.stats.edge_count, 1);
        assert!(state.nodes.contains_key(&7));
        assert!(state.nodes.contains_key(&3));
        let edge = state.edges.first().unwrap();
        assert_eq!(edge.source_actor_id, 7);
        assert_eq!(edge.target_actor_id, 3);
    }

    #[test]
    fn edge_expires_after_ttl() {
        let mut state = make_state();
        state.window.push(make_related_event("a", 7, 3));

        let start = Utc::now();
        let _ = run_tick(&mut state, start, None);
        assert_eq!(state.edges.len(), 1);

        let _ = run_tick(&mut state, start + Duration::seconds(14), None);
        assert_eq!(state.edges.len(), 1);
        let opacity = state.edges.first().unwrap().opacity;
        assert!(opacity > 0.0 && opacity < 0.2);

        let summary = run_tick(&mut state, start + Duration::seconds(16), None);
        assert!(state.edges.is_empty());
        assert_eq!(summary.pruned_edges, 1);
    }

    #[test]
    fn travel_phase_wraps_into_unit_interval() {
        let mut state = SimState::new(SimConfig {
            travel_phase_step: 0.4,
            ..SimConfig::default()
        });
        state.window.push(make_related_event("a", 7, 3));

        let start = Utc::now();
        for i in 0..8 {
            let _ = run_tick(&mut state, start + Duration::milliseconds(i * 16), None);
            if let Some(edge) = state.edges.first() {
                assert!(edge.travel_phase >= 0.0 && edge.travel_phase < 1.0);
            }
        }
    }

    #[test]
    fn nodes_are_never_deleted() {
        let mut state = SimState::new(SimConfig {
            particle_cap: 2,
            ..SimConfig::default()
        });
        let mut now = Utc::now();
        for i in 0..10 {
            state.window.push(make_event(&format!("e{i}"), i));
            now += Duration::milliseconds(16);
            let _ = run_tick(&mut state, now, None);
        }
        // Particles were truncated to 2, but every actor's node remains.
        assert_eq!(state.particles.len(), 2);
        assert_eq!(state.nodes.len(), 10);
    }

    #[test]
    fn hover_reports_particle_under_pointer() {
        let mut state = make_state();
        state.window.push(make_event("a", 7));

        let start = Utc::now();
        let _ = run_tick(&mut state, start, None);
        // Let the particle settle into orbit, then point straight at it.
        let _ = run_tick(&mut state, start + Duration::seconds(2), None);
        let position = state.particles.first().unwrap().position;
        let summary = run_tick(&mut state, start + Duration::seconds(2), Some(position));
        let hovered = summary.hovered.unwrap();
        assert_eq!(hovered.title, "Created task: a");
        assert_eq!(hovered.actor_name, "User 7");
    }

    #[test]
    fn same_seed_reproduces_orbit_layout() {
        let config = SimConfig {
            seed: 42,
            ..SimConfig::default()
        };
        let run = |mut state: SimState| {
            state.window.push(make_event("a", 7));
            let _ = run_tick(&mut state, Utc::now(), None);
            let p = state.particles.first().unwrap().clone();
            (p.orbit_radius, p.orbit_angle, p.angular_velocity)
        };
        let first = run(SimState::new(config.clone()));
        let second = run(SimState::new(config));
        assert!((first.0 - second.0).abs() < f64::EPSILON);
        assert!((first.1 - second.1).abs() < f64::EPSILON);
        assert!((first.2 - second.2).abs() < f64::EPSILON);
    }

    #[test]
    fn entry_point_lies_on_viewport_perimeter() {
        let config = SimConfig::default();
        let anchor = Vec2::new(600.0, 300.0);
        let entry = perimeter_entry_point(&config, anchor);
        let on_vertical_edge = entry.x.abs() < 1e-9
            || (entry.x - config.viewport_width).abs() < 1e-9;
        let on_horizontal_edge = entry.y.abs() < 1e-9
            || (entry.y - config.viewport_height).abs() < 1e-9;
        assert!(on_vertical_edge || on_horizontal_edge);
    }

    #[test]
    fn anchor_at_center_still_gets_an_entry_point() {
        let config = SimConfig::default();
        let entry = perimeter_entry_point(&config, config.viewport_center());
        assert!(entry.x.is_finite() && entry.y.is_finite());
        assert!((entry.x - config.viewport_width).abs() < 1e-9);
    }

    #[test]
    fn malformed_window_state_does_not_stop_the_tick() {
        let mut state = make_state();
        // Particle with no owning node (invariant violated by hand).
        state.particles.push(ActivityParticle {
            event: make_event("ghost", 99),
            position: Vec2::ZERO,
            entry_point: Vec2::ZERO,
            orbit_radius: 40.0,
            orbit_angle: 0.0,
            angular_velocity: 0.02,
            size: 4.0,
            born_at: Utc::now(),
            phase: ParticlePhase::Orbiting,
        });
        state.window.push(make_event("ok", 7));

        let summary = run_tick(&mut state, Utc::now(), None);
        // The healthy event still materialized.
        assert_eq!(summary.materialized, 1);
        assert!(state.nodes.contains_key(&7));
    }
}
