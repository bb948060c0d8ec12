//! The recent-event window.
//!
//! A bounded, newest-first sequence of normalized events (capacity 100 by
//! default). New events are prepended; the tail beyond capacity is
//! discarded. A parallel "already materialized" id set lets the simulation
//! re-scan the whole window every tick -- tolerating out-of-order delivery
//! -- without spawning duplicate particles for events it has already seen.

use std::collections::{BTreeSet, VecDeque};

use pulseboard_types::ActivityEvent;

/// Default window capacity.
pub const DEFAULT_CAPACITY: usize = 100;

/// Bounded newest-first event window with materialization tracking.
#[derive(Debug, Clone)]
pub struct EventWindow {
    /// Events, newest first.
    events: VecDeque<ActivityEvent>,

    /// Ids of events the simulation has already materialized. Entries are
    /// removed when their event is evicted, keeping the set bounded by the
    /// window capacity.
    materialized: BTreeSet<String>,

    /// Maximum number of retained events.
    capacity: usize,
}

impl EventWindow {
    /// Create a window with the given capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            materialized: BTreeSet::new(),
            capacity: capacity.max(1),
        }
    }

    /// Prepend a new event, evicting the oldest beyond capacity.
    pub fn push(&mut self, event: ActivityEvent) {
        self.events.push_front(event);
        while self.events.len() > self.capacity {
            if let Some(evicted) = self.events.pop_back() {
                self.materialized.remove(&evicted.id);
            }
        }
    }

    /// Iterate events newest-first.
    pub fn iter(&self) -> impl Iterator<Item = &ActivityEvent> {
        self.events.iter()
    }

    /// Events not yet marked materialized, oldest-first so that spawn order
    /// matches arrival order within a tick.
    pub fn unmaterialized(&self) -> impl Iterator<Item = &ActivityEvent> {
        self.events
            .iter()
            .rev()
            .filter(|event| !self.materialized.contains(&event.id))
    }

    /// Mark an event id as materialized. Returns `false` if it already was.
    pub fn mark_materialized(&mut self, event_id: &str) -> bool {
        self.materialized.insert(event_id.to_owned())
    }

    /// Whether an event id has been materialized.
    pub fn is_materialized(&self, event_id: &str) -> bool {
        self.materialized.contains(event_id)
    }

    /// Current number of retained events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for EventWindow {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
