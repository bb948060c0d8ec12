//! Dashboard engine binary for Pulseboard.
//!
//! Wires together the change intake, normalizer, simulation, and renderer
//! into a single tick loop. The binary runs headless: frames are rendered
//! onto a counting surface and summarized in the logs. A host shell embeds
//! the same crates and supplies a real pixel surface instead.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `pulseboard.yaml` (or `PULSEBOARD_CONFIG`)
//! 3. Build the in-memory reference directory
//! 4. Create the simulation state
//! 5. Connect to NATS and subscribe to change notifications
//! 6. Install the Ctrl-C shutdown handler
//! 7. Run the dashboard loop
//! 8. Log the result

mod config;
mod error;
mod runner;
mod source;

use std::path::PathBuf;

use pulseboard_normalizer::InMemoryDirectory;
use pulseboard_render::Surface;
use pulseboard_sim::{SimState, Vec2};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::DashboardConfig;
use crate::error::EngineError;
use crate::runner::{DashboardRunner, DashboardStatus, run_dashboard};
use crate::source::NatsChangeSource;

/// A headless surface that counts draw operations per frame.
///
/// The fade call opens every frame, so it doubles as the frame boundary.
#[derive(Debug, Default)]
struct CountingSurface {
    ops_this_frame: usize,
    frames: u64,
}

impl Surface for CountingSurface {
    fn fade(&mut self, _alpha: f64) {
        if self.frames > 0 && self.frames.wrapping_rem(300) == 0 {
            debug!(
                frames = self.frames,
                ops_last_frame = self.ops_this_frame,
                "headless render heartbeat"
            );
        }
        self.ops_this_frame = 1;
        self.frames = self.frames.saturating_add(1);
    }

    fn line(
        &mut self,
        _from: Vec2,
        _to: Vec2,
        _color: pulseboard_render::Color,
        _width: f64,
        _opacity: f64,
    ) {
        self.ops_this_frame = self.ops_this_frame.saturating_add(1);
    }

    fn circle(&mut self, _center: Vec2, _radius: f64, _color: pulseboard_render::Color, _opacity: f64) {
        self.ops_this_frame = self.ops_this_frame.saturating_add(1);
    }

    fn ring(
        &mut self,
        _center: Vec2,
        _radius: f64,
        _color: pulseboard_render::Color,
        _width: f64,
        _opacity: f64,
    ) {
        self.ops_this_frame = self.ops_this_frame.saturating_add(1);
    }

    fn glow(&mut self, _center: Vec2, _radius: f64, _color: pulseboard_render::Color, _opacity: f64) {
        self.ops_this_frame = self.ops_this_frame.saturating_add(1);
    }

    fn text(
        &mut self,
        _position: Vec2,
        _content: &str,
        _size: f64,
        _color: pulseboard_render::Color,
        _opacity: f64,
    ) {
        self.ops_this_frame = self.ops_this_frame.saturating_add(1);
    }
}

/// Application entry point for the dashboard engine.
///
/// # Errors
///
/// Returns an error if configuration loading or the NATS connection fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("pulseboard-engine starting");

    // 2. Load configuration.
    let config_path = std::env::var("PULSEBOARD_CONFIG")
        .map_or_else(|_| PathBuf::from("pulseboard.yaml"), PathBuf::from);
    let config = DashboardConfig::load_or_default(&config_path)?;
    info!(
        config_path = %config_path.display(),
        tick_interval_ms = config.engine.tick_interval_ms,
        nats_url = config.infrastructure.nats_url,
        change_subject = config.infrastructure.change_subject,
        "Configuration loaded"
    );

    // 3. Build the reference directory.
    let directory = InMemoryDirectory::from_records(
        config.reference.users.clone(),
        config.reference.priorities.clone(),
    );
    info!(
        user_count = config.reference.users.len(),
        priority_count = config.reference.priorities.len(),
        "Reference directory loaded"
    );

    // 4. Create the simulation state.
    let state = SimState::new(config.simulation.to_sim_config());
    info!("Simulation state initialized");

    // 5. Connect to NATS.
    let source = NatsChangeSource::connect(
        &config.infrastructure.nats_url,
        &config.infrastructure.change_subject,
    )
    .await
    .map_err(EngineError::from)?;
    info!("Change source connected");

    // 6. Install the shutdown handler.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for shutdown signal");
            return;
        }
        info!("Ctrl-C received");
        let _ = shutdown_tx.send(true);
    });

    // 7. Run the dashboard loop. Headless: no pointer, counting surface.
    let runner = DashboardRunner::new(source, directory, config.engine.session_user_id, state);
    let (_pointer_tx, pointer_rx) = watch::channel(None);
    let (status_tx, _status_rx) = watch::channel(DashboardStatus::default());
    let mut surface = CountingSurface::default();

    let summary = run_dashboard(
        runner,
        config.engine.tick_interval_ms,
        &mut surface,
        pointer_rx,
        status_tx,
        shutdown_rx,
    )
    .await?;

    // 8. Log the result.
    info!(
        total_ticks = summary.total_ticks,
        frames_rendered = surface.frames,
        "pulseboard-engine stopped"
    );
    Ok(())
}
