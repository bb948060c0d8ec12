//! The dashboard tick loop.
//!
//! Each pass drains the change source, normalizes what arrived, pushes the
//! surviving events into the recent-event window, advances the simulation
//! one tick, and renders a frame. The synchronous [`tick_once`] does all of
//! that for a single pass so tests can drive it directly; the async
//! [`run_dashboard`] wraps it in an interval timer and a shutdown signal.

use chrono::{DateTime, Utc};
use pulseboard_normalizer::{InMemoryDirectory, NormalizeContext, normalize};
use pulseboard_render::{Surface, render_frame};
use pulseboard_sim::{SimState, Vec2, run_tick};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::source::{ChangeSource, SourceEvent};

/// Snapshot of engine health published after every tick, for the host
/// shell's status strip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardStatus {
    /// Whether the change source is connected.
    pub connected: bool,

    /// The tick number most recently completed.
    pub tick: u64,

    /// Live node population.
    pub node_count: u32,

    /// Live particle population.
    pub particle_count: u32,

    /// Live edge population.
    pub edge_count: u32,
}

/// Outcome of a completed dashboard run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Total ticks executed before shutdown.
    pub total_ticks: u64,
}

/// The dashboard runner: change source, normalization context, and
/// simulation state, advanced one tick at a time.
pub struct DashboardRunner<S: ChangeSource> {
    source: S,
    directory: InMemoryDirectory,
    session_user_id: Option<i64>,
    state: SimState,
    connected: bool,
}

impl<S: ChangeSource> DashboardRunner<S> {
    /// Assemble a runner from its parts.
    pub fn new(
        source: S,
        directory: InMemoryDirectory,
        session_user_id: Option<i64>,
        state: SimState,
    ) -> Self {
        let connected = source.is_connected();
        Self {
            source,
            directory,
            session_user_id,
            state,
            connected,
        }
    }

    /// Read-only access to the simulation state.
    pub const fn state(&self) -> &SimState {
        &self.state
    }

    /// Whether the change source was connected as of the last tick.
    pub const fn is_connected(&self) -> bool {
        self.connected
    }

    /// Execute one full dashboard pass: drain, normalize, simulate, render.
    ///
    /// Returns the status snapshot for this tick.
    pub fn tick_once(
        &mut self,
        now: DateTime<Utc>,
        pointer: Option<Vec2>,
        surface: &mut dyn Surface,
    ) -> DashboardStatus {
        let ctx = NormalizeContext {
            lookup: &self.directory,
            session_user_id: self.session_user_id,
        };

        let mut accepted = 0_usize;
        let mut dropped = 0_usize;
        for event in self.source.drain_pending() {
            match event {
                SourceEvent::Change(notification) => {
                    if let Some(activity) = normalize(&notification, &ctx) {
                        self.state.window.push(activity);
                        accepted = accepted.saturating_add(1);
                    } else {
                        dropped = dropped.saturating_add(1);
                    }
                }
                SourceEvent::ConnectionStatus(connected) => {
                    if connected == self.connected {
                        continue;
                    }
                    self.connected = connected;
                    if connected {
                        info!("change source reconnected");
                    } else {
                        warn!("change source disconnected, dashboard continues on stale state");
                    }
                }
            }
        }

        let summary = run_tick(&mut self.state, now, pointer);
        render_frame(&self.state, now, surface);

        if accepted > 0 || summary.pruned_edges > 0 || summary.truncated_particles > 0 {
            debug!(
                tick = summary.tick,
                accepted = accepted,
                dropped = dropped,
                materialized = summary.materialized,
                pruned_edges = summary.pruned_edges,
                truncated_particles = summary.truncated_particles,
                "tick completed"
            );
        }

        DashboardStatus {
            connected: self.connected,
            tick: summary.tick,
            node_count: summary.stats.node_count,
            particle_count: summary.stats.particle_count,
            edge_count: summary.stats.edge_count,
        }
    }

    /// Tear down the runner: stop the change source and drop all
    /// per-session simulation state.
    pub fn shutdown(mut self) -> RunSummary {
        self.source.disconnect();
        let total_ticks = self.state.tick;
        info!(total_ticks = total_ticks, "dashboard runner stopped");
        RunSummary { total_ticks }
    }
}

/// Run the dashboard loop until the shutdown signal fires.
///
/// Ticks at `tick_interval_ms`, sampling the pointer position from the
/// watch channel each pass and publishing a [`DashboardStatus`] after every
/// tick. On shutdown the change source is disconnected and all per-session
/// state is dropped.
///
/// # Errors
///
/// Currently infallible in the loop body; the `Result` covers future
/// source-level failures surfaced as [`EngineError`].
pub async fn run_dashboard<S: ChangeSource>(
    mut runner: DashboardRunner<S>,
    tick_interval_ms: u64,
    surface: &mut dyn Surface,
    pointer: watch::Receiver<Option<Vec2>>,
    status: watch::Sender<DashboardStatus>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<RunSummary, EngineError> {
    let mut interval = tokio::time::interval(std::time::Duration::from_millis(
        tick_interval_ms.max(1),
    ));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    info!(tick_interval_ms = tick_interval_ms, "dashboard loop started");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = Utc::now();
                let pointer_position = *pointer.borrow();
                let snapshot = runner.tick_once(now, pointer_position, surface);
                // Nobody listening is fine; status is best-effort.
                let _ = status.send(snapshot);
            }
            changed = shutdown.changed() => {
                let requested = changed.is_err() || *shutdown.borrow();
                if requested {
                    info!("shutdown requested, stopping dashboard loop");
                    break;
                }
            }
        }
    }

    Ok(runner.shutdown())
}
