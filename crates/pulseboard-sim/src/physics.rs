//! Per-tick actor-node physics.
//!
//! Each tick, every node receives a central attraction toward the viewport
//! center, pairwise repulsion from neighbors within a fixed radius, velocity
//! damping, an Euler integration step, and a boundary clamp. Coincident
//! nodes (zero distance) are skipped in both force terms; the zero guard is
//! an invariant of the math, not a reportable error.

use std::collections::BTreeMap;

use crate::geometry::Vec2;
use crate::state::{ActorNode, SimConfig};

/// Advance every node's velocity and position by one tick.
pub fn step_nodes(nodes: &mut BTreeMap<i64, ActorNode>, config: &SimConfig) {
    let center = config.viewport_center();

    // Snapshot positions before mutating: repulsion reads all pairs.
    let positions: Vec<(i64, Vec2)> = nodes
        .iter()
        .map(|(id, node)| (*id, node.position))
        .collect();

    for node in nodes.values_mut() {
        apply_center_attraction(node, center, config);
        apply_repulsion(node, &positions, config);

        // Damping, then a plain Euler step.
        node.velocity = node.velocity.scaled(config.damping);
        node.position += node.velocity;

        clamp_to_viewport(node, config);
    }
}

/// Pull a node toward the viewport center when it has drifted past the
/// threshold distance.
fn apply_center_attraction(node: &mut ActorNode, center: Vec2, config: &SimConfig) {
    let to_center = center - node.position;
    if to_center.length() <= config.center_threshold {
        return;
    }
    if let Some(direction) = to_center.normalized() {
        node.velocity += direction.scaled(config.center_attraction_gain);
    }
}

/// Push a node away from every neighbor inside the repulsion radius.
///
/// The push scales linearly with closeness:
/// `(repulsion_radius - distance) / repulsion_radius`, so touching nodes
/// get the full gain and nodes at the radius edge get none.
fn apply_repulsion(node: &mut ActorNode, positions: &[(i64, Vec2)], config: &SimConfig) {
    for (other_id, other_position) in positions {
        if *other_id == node.actor_id {
            continue;
        }
        let away = node.position - *other_position;
        let distance = away.length();
        if distance >= config.repulsion_radius {
            continue;
        }
        // Coincident nodes: no defined direction, skip this pair.
        let Some(direction) = away.normalized() else {
            continue;
        };
        let closeness = (config.repulsion_radius - distance) / config.repulsion_radius;
        node.velocity += direction.scaled(config.repulsion_gain * closeness);
    }
}

/// Keep a node within the configured margin of the viewport edges.
fn clamp_to_viewport(node: &mut ActorNode, config: &SimConfig) {
    let min = Vec2::new(config.boundary_margin, config.boundary_margin);
    let max = Vec2::new(
        config.viewport_width - config.boundary_margin,
        config.viewport_height - config.boundary_margin,
    );
    node.position = node.position.clamped(min, max);
}
