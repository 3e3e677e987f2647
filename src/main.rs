//! # Pad Bus
//!
//! Demo binary for the input arbitration core: polls connected gamepads and
//! routes press/release/axis events through two prioritized demo surfaces,
//! illustrating the focus-by-priority convention.

use anyhow::Result;
use tracing::info;
use tracing_subscriber;

mod bus;
mod config;
mod error;
mod event;
mod sampler;
mod service;
mod source;

use config::Config;
use event::{InputEvent, Outcome};
use service::InputHub;
use source::gilrs::GilrsSource;

/// Default configuration file location
const CONFIG_PATH: &str = "config/default.toml";

/// Axis movement below this is ignored by the demo axis handler.
///
/// Deadzones are a consumer decision; the bus itself forwards every change.
const DEMO_AXIS_DEADZONE: f32 = 0.2;

/// Button index the demo "overlay" claims while it has focus (South / A on
/// the canonical layout).
const OVERLAY_BUTTON: usize = 0;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Pad Bus v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::load_or_default(CONFIG_PATH)?;

    // Composition root: one hub, handed to every surface.
    let hub = InputHub::new(GilrsSource::new(), &config);

    // Focused overlay: consumes its button so nothing below reacts to it.
    let _overlay = hub.on_button_down(10, |event| {
        if let InputEvent::Edge(edge) = event {
            if edge.button == OVERLAY_BUTTON {
                info!(
                    "[overlay] claimed button {} on device {}",
                    edge.button, edge.device
                );
                return Outcome::Consumed;
            }
        }
        Outcome::PassThrough
    });

    // Background surface: sees whatever the overlay passed through.
    let _background = hub.on_button_down(0, |event| {
        if let InputEvent::Edge(edge) = event {
            info!(
                "[background] button {} down on device {}",
                edge.button, edge.device
            );
        }
        Outcome::Consumed
    });

    let _releases = hub.on_button_up(0, |event| {
        if let InputEvent::Edge(edge) = event {
            info!(
                "[background] button {} up on device {}",
                edge.button, edge.device
            );
        }
        Outcome::Consumed
    });

    let _sticks = hub.on_axis_change(0, |event| {
        if let InputEvent::Axis(axis) = event {
            if axis.value.abs() >= DEMO_AXIS_DEADZONE {
                info!(
                    "[background] axis {} = {:+.2} on device {}",
                    axis.axis, axis.value, axis.device
                );
            }
        }
        Outcome::Consumed
    });

    info!(
        "Polling every {} ms; press Ctrl+C to exit",
        config.input.poll_interval_ms
    );

    tokio::select! {
        _ = hub.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
    }

    hub.shutdown();
    Ok(())
}
