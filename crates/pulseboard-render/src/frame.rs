//! The per-tick draw pass.
//!
//! Draw order is fixed: fade, ambient decoration, relation edges, activity
//! particles, actor nodes, focal marker. Later layers overdraw earlier
//! ones, so nodes and their labels always sit on top of the particle
//! field. The pass only reads the simulation state.

use chrono::{DateTime, Utc};
use pulseboard_sim::{SimState, Vec2};
use pulseboard_types::Priority;

use crate::palette::{AMBIENT, FOREGROUND, kind_color, node_color};
use crate::surface::Surface;

/// Per-frame fade strength; the partial fade leaves motion trails.
const FADE_ALPHA: f64 = 0.25;

/// Base radius of an actor node.
const NODE_BASE_RADIUS: f64 = 12.0;

/// Maximum characters of an actor name drawn beside its node.
const NAME_MAX_CHARS: usize = 12;

/// Pulse frequency (cycles per second) for the urgency ring and focal marker.
const PULSE_HZ: f64 = 1.2;

/// Render one frame of the current simulation state onto a surface.
pub fn render_frame(state: &SimState, now: DateTime<Utc>, surface: &mut dyn Surface) {
    let pulse = pulse_phase(now);
    let center = state.config.viewport_center();

    surface.fade(FADE_ALPHA);
    draw_ambient(center, surface);
    draw_edges(state, surface);
    draw_particles(state, pulse, surface);
    draw_nodes(state, surface);
    draw_focal_marker(center, pulse, surface);
}

/// A `[0, 1]` pulsation value derived from the wall clock.
#[allow(clippy::cast_precision_loss)]
fn pulse_phase(now: DateTime<Utc>) -> f64 {
    let seconds = now.timestamp_millis() as f64 / 1000.0;
    (seconds * PULSE_HZ * std::f64::consts::TAU).sin().mul_add(0.5, 0.5)
}

/// Non-functional background decoration: two faint rings around the center.
fn draw_ambient(center: Vec2, surface: &mut dyn Surface) {
    surface.ring(center, 120.0, AMBIENT, 1.0, 0.35);
    surface.ring(center, 240.0, AMBIENT, 1.0, 0.2);
}

/// Relation edges: a fading line plus a traveling marker at the edge's
/// cyclic phase.
fn draw_edges(state: &SimState, surface: &mut dyn Surface) {
    for edge in &state.edges {
        let (Some(source), Some(target)) = (
            state.nodes.get(&edge.source_actor_id),
            state.nodes.get(&edge.target_actor_id),
        ) else {
            continue;
        };
        let color = kind_color(edge.kind);
        surface.line(source.position, target.position, color, 1.5, edge.opacity * 0.6);

        let marker = source.position.lerp(target.position, edge.travel_phase);
        surface.circle(marker, 2.5, color, edge.opacity);
    }
}

/// Activity particles: radial glow plus solid core, with a pulsing ring
/// overlay for urgent events.
fn draw_particles(state: &SimState, pulse: f64, surface: &mut dyn Surface) {
    for particle in &state.particles {
        let color = kind_color(particle.event.kind);
        surface.glow(particle.position, particle.size * 3.0, color, 0.5);
        surface.circle(particle.position, particle.size, color, 1.0);

        if particle.event.priority == Some(Priority::Urgent) {
            let ring_radius = pulse.mul_add(4.0, particle.size + 3.0);
            surface.ring(particle.position, ring_radius, color, 1.5, 1.0 - pulse * 0.5);
        }
    }
}

/// Actor nodes: glow, filled circle, truncated display name, and a small
/// badge showing the running activity count.
#[allow(clippy::cast_precision_loss)]
fn draw_nodes(state: &SimState, surface: &mut dyn Surface) {
    for node in state.nodes.values() {
        let color = node_color(node.color_index);
        let radius = NODE_BASE_RADIUS + (node.activity_count.min(20) as f64) * 0.3;

        surface.glow(node.position, radius * 2.2, color, 0.4);
        surface.circle(node.position, radius, color, 0.9);
        surface.text(
            Vec2::new(node.position.x, node.position.y + radius + 14.0),
            &truncate_name(&node.name),
            11.0,
            FOREGROUND,
            0.85,
        );

        let badge_center = Vec2::new(node.position.x + radius, node.position.y - radius);
        surface.circle(badge_center, 7.0, FOREGROUND, 0.9);
        surface.text(
            badge_center,
            &node.activity_count.to_string(),
            9.0,
            AMBIENT,
            1.0,
        );
    }
}

/// Pulsing focal marker at the viewport center.
fn draw_focal_marker(center: Vec2, pulse: f64, surface: &mut dyn Surface) {
    surface.circle(center, 3.0, FOREGROUND, 0.8);
    surface.ring(center, pulse.mul_add(6.0, 8.0), FOREGROUND, 1.0, 1.0 - pulse * 0.7);
}

/// Truncate a display name to the label budget, appending an ellipsis.
fn truncate_name(name: &str) -> String {
    if name.chars().count() <= NAME_MAX_CHARS {
        name.to_owned()
    } else {
        let mut truncated: String = name.chars().take(NAME_MAX_CHARS).collect();
        truncated.push('…');
        truncated
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Duration;
    use pulseboard_sim::{SimConfig, SimState, run_tick};
    use pulseboard_types::{ActivityEvent, ActivityKind, Priority};

    use super::*;
    use crate::surface::{DrawList, DrawOp};

    fn make_event(id: &str, actor: i64, priority: Option<Priority>) -> ActivityEvent {
        ActivityEvent {
            id: id.to_owned(),
            kind: ActivityKind::TaskCreated,
            actor_user_id: actor,
            actor_name: String::from("Ada Lovelace of Analytical Engines"),
            timestamp: Utc::now(),
            title: format!("Created task: {id}"),
            description: None,
            priority,
            related_user_id: None,
            metadata: BTreeMap::new(),
        }
    }

    fn populated_state() -> (SimState, DateTime<Utc>) {
        let mut state = SimState::new(SimConfig::default());
        let now = Utc::now();
        let mut event = make_event("a", 7, Some(Priority::Urgent));
        event.related_user_id = Some(3);
        event.kind = ActivityKind::UserAssigned;
        state.window.push(event);
        let _ = run_tick(&mut state, now, None);
        (state, now)
    }

    #[test]
    fn frame_starts_with_fade() {
        let (state, now) = populated_state();
        let mut surface = DrawList::new();
        render_frame(&state, now, &mut surface);
        assert!(matches!(surface.ops.first(), Some(DrawOp::Fade { .. })));
    }

    #[test]
    fn urgent_particle_gets_pulsing_ring() {
        let (state, now) = populated_state();
        let particle = state.particles.first().unwrap();
        let mut surface = DrawList::new();
        render_frame(&state, now, &mut surface);

        let has_particle_ring = surface.ops.iter().any(|op| {
            matches!(op, DrawOp::Ring { center, .. } if *center == particle.position)
        });
        assert!(has_particle_ring);
    }

    #[test]
    fn normal_particle_has_no_urgency_ring() {
        let mut state = SimState::new(SimConfig::default());
        let now = Utc::now();
        state.window.push(make_event("a", 7, Some(Priority::Normal)));
        let _ = run_tick(&mut state, now, None);

        let particle = state.particles.first().unwrap();
        let mut surface = DrawList::new();
        render_frame(&state, now, &mut surface);

        let has_particle_ring = surface.ops.iter().any(|op| {
            matches!(op, DrawOp::Ring { center, .. } if *center == particle.position)
        });
        assert!(!has_particle_ring);
    }

    #[test]
    fn edge_line_connects_node_positions() {
        let (state, now) = populated_state();
        let source = state.nodes.get(&7).unwrap().position;
        let target = state.nodes.get(&3).unwrap().position;

        let mut surface = DrawList::new();
        render_frame(&state, now, &mut surface);

        let has_edge = surface.ops.iter().any(|op| {
            matches!(op, DrawOp::Line { from, to, .. } if *from == source && *to == target)
        });
        assert!(has_edge);
    }

    #[test]
    fn node_label_is_truncated() {
        let (state, now) = populated_state();
        let mut surface = DrawList::new();
        render_frame(&state, now, &mut surface);

        let label = surface.ops.iter().find_map(|op| match op {
            DrawOp::Text { content, .. } if content.contains('…') => Some(content.clone()),
            _ => None,
        });
        let label = label.unwrap();
        assert_eq!(label.chars().count(), NAME_MAX_CHARS + 1);
        assert!(label.starts_with("Ada Lovelace"));
    }

    #[test]
    fn badge_shows_activity_count() {
        let mut state = SimState::new(SimConfig::default());
        let mut now = Utc::now();
        for i in 0..3 {
            state.window.push(make_event(&format!("e{i}"), 7, None));
            now += Duration::milliseconds(16);
            let _ = run_tick(&mut state, now, None);
        }
        let mut surface = DrawList::new();
        render_frame(&state, now, &mut surface);

        let has_badge = surface.ops.iter().any(|op| {
            matches!(op, DrawOp::Text { content, .. } if content == "3")
        });
        assert!(has_badge);
    }

    #[test]
    fn layers_draw_in_order() {
        let (state, now) = populated_state();
        let mut surface = DrawList::new();
        render_frame(&state, now, &mut surface);

        let first_line = surface
            .ops
            .iter()
            .position(|op| matches!(op, DrawOp::Line { .. }))
            .unwrap();
        let first_text = surface
            .ops
            .iter()
            .position(|op| matches!(op, DrawOp::Text { .. }))
            .unwrap();
        // Edges render under the node layer (labels are node-layer ops).
        assert!(first_line < first_text);
    }

    #[test]
    fn empty_state_still_renders_chrome() {
        let state = SimState::new(SimConfig::default());
        let mut surface = DrawList::new();
        render_frame(&state, Utc::now(), &mut surface);
        // Fade, two ambient rings, focal circle and ring.
        assert!(surface.ops.len() >= 5);
    }
}
