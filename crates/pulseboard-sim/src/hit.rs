//! Pointer hit testing.
//!
//! The pointer is sampled once per tick; this module reports the particle
//! under it (nearest within its visual radius plus a small margin), which
//! becomes the hovered entity feeding the tooltip overlay.

use chrono::{DateTime, Utc};
use pulseboard_types::HoverDetail;

use crate::geometry::Vec2;
use crate::state::ActivityParticle;

/// Find the particle under the pointer.
///
/// A particle is hit when the pointer lies within `size + margin` of its
/// position; when several qualify, the nearest wins (stable under the
/// population-cap truncation reordering the slice).
pub fn hit_test<'a>(
    particles: &'a [ActivityParticle],
    pointer: Vec2,
    margin: f64,
) -> Option<&'a ActivityParticle> {
    let mut best: Option<(&ActivityParticle, f64)> = None;
    for particle in particles {
        let distance = particle.position.distance_to(pointer);
        if distance > particle.size + margin {
            continue;
        }
        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((particle, distance)),
        }
    }
    best.map(|(particle, _)| particle)
}

/// Build the hover-detail payload for a hit particle.
pub fn hover_detail(particle: &ActivityParticle, now: DateTime<Utc>) -> HoverDetail {
    HoverDetail {
        title: particle.event.title.clone(),
        description: particle.event.description.clone(),
        actor_name: particle.event.actor_name.clone(),
        priority: particle.event.priority,
        age_seconds: particle.event.age_seconds(now),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;
    use pulseboard_types::{ActivityEvent, ActivityKind, Priority};

    use super::*;
    use crate::state::ParticlePhase;

    fn make_particle(id: &str, position: Vec2, size: f64) -> ActivityParticle {
        ActivityParticle {
            event: ActivityEvent {
                id: id.to_owned(),
                kind: ActivityKind::TaskCreated,
                actor_user_id: 1,
                actor_name: String::from("Ada"),
                timestamp: Utc::now(),
                title: format!("Created task: {id}"),
                description: Some(String::from("details")),
                priority: Some(Priority::High),
                related_user_id: None,
                metadata: BTreeMap::new(),
            },
            position,
            entry_point: Vec2::ZERO,
            orbit_radius: 40.0,
            orbit_angle: 0.0,
            angular_velocity: 0.02,
            size,
            born_at: Utc::now(),
            phase: ParticlePhase::Orbiting,
        }
    }

    #[test]
    fn miss_returns_none() {
        let particles = vec![make_particle("a", Vec2::new(100.0, 100.0), 4.0)];
        assert!(hit_test(&particles, Vec2::new(200.0, 200.0), 4.0).is_none());
    }

    #[test]
    fn hit_within_radius_plus_margin() {
        let particles = vec![make_particle("a", Vec2::new(100.0, 100.0), 4.0)];
        // 7px away: within 4 + 4 margin.
        let hit = hit_test(&particles, Vec2::new(107.0, 100.0), 4.0).unwrap();
        assert_eq!(hit.event.id, "a");
        // 9px away: outside.
        assert!(hit_test(&particles, Vec2::new(109.0, 100.0), 4.0).is_none());
    }

    #[test]
    fn nearest_of_overlapping_particles_wins() {
        let particles = vec![
            make_particle("far", Vec2::new(104.0, 100.0), 6.0),
            make_particle("near", Vec2::new(101.0, 100.0), 6.0),
        ];
        let hit = hit_test(&particles, Vec2::new(100.0, 100.0), 2.0).unwrap();
        assert_eq!(hit.event.id, "near");
    }

    #[test]
    fn hover_detail_mirrors_event() {
        let particle = make_particle("a", Vec2::ZERO, 4.0);
        let detail = hover_detail(&particle, Utc::now());
        assert_eq!(detail.title, particle.event.title);
        assert_eq!(detail.actor_name, "Ada");
        assert_eq!(detail.priority, Some(Priority::High));
        assert!(detail.age_seconds >= 0.0);
    }
}
