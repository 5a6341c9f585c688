//! # coopd — coop door daemon
//!
//! Composition root that wires the pin driver, the door and the controller
//! together and runs the periodic check.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars) and set up logging
//! - Build the opening/closing conditions and the door timing; any error
//!   aborts startup
//! - Select the pin driver (Raspberry Pi GPIO or virtual) and construct the door
//! - Construct the controller, injecting the driver and the event bus
//! - Trigger a check on every tick of the configured interval
//! - Handle graceful shutdown (SIGTERM/SIGINT): de-energise the motor and
//!   release the pins
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Local;
use tokio::signal;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coop_adapter_gpio_rppal::RppalGpio;
use coop_adapter_virtual::VirtualPins;
use coop_app::door::{Door, DoorPins, DoorTiming};
use coop_app::event_bus::InProcessEventBus;
use coop_app::ports::PinController;
use coop_app::services::CoopService;
use coop_domain::condition::Condition;
use coop_domain::event::Event;

use crate::config::{Config, GpioDriver};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::registry()
        .with(config.log_filter()?)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        latitude = config.coop.latitude,
        longitude = config.coop.longitude,
        driver = ?config.gpio.driver,
        "configuration loaded"
    );

    let opening = config
        .opening_condition()
        .context("failed to create the opening condition")?;
    tracing::info!(mode = %opening.mode(), value = %opening.value(), "opening condition created");
    let closing = config
        .closing_condition()
        .context("failed to create the closing condition")?;
    tracing::info!(mode = %closing.mode(), value = %closing.value(), "closing condition created");

    let parts = Parts {
        opening,
        closing,
        pins: config.door_pins(),
        timing: config.door_timing()?,
        interval: config.check_interval()?,
    };

    match config.gpio.driver {
        GpioDriver::Rppal => {
            let driver = RppalGpio::new().context("failed to open the GPIO peripheral")?;
            tracing::info!("using Raspberry Pi GPIO driver");
            run(driver, parts).await
        }
        GpioDriver::Virtual => {
            tracing::warn!("using virtual pins, the door will not move");
            run(VirtualPins::new(), parts).await
        }
    }
}

/// Everything the controller needs besides the pin driver.
struct Parts {
    opening: Condition,
    closing: Condition,
    pins: DoorPins,
    timing: DoorTiming,
    interval: Duration,
}

async fn run<P>(driver: P, parts: Parts) -> anyhow::Result<()>
where
    P: PinController + Send + Sync + 'static,
{
    let event_bus = InProcessEventBus::new(64);
    tokio::spawn(log_events(event_bus.subscribe()));

    let door = Door::new(driver, parts.pins, parts.timing);
    let service = Arc::new(CoopService::new(
        parts.opening,
        parts.closing,
        door,
        event_bus,
    ));

    let snapshot = service.snapshot(&Local::now());
    tracing::info!(
        opening_at = %snapshot.opening_at,
        closing_at = %snapshot.closing_at,
        desired = %snapshot.desired,
        "today's schedule"
    );

    let mut ticker = tokio::time::interval(parts.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tracing::info!(interval = ?parts.interval, "coopd started");

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    let now = Local::now();
                    let outcome = service.check(&now).await;
                    tracing::debug!(?outcome, "check complete");
                });
            }
            () = &mut shutdown => break,
        }
    }

    service
        .stop()
        .await
        .context("failed to de-energise the door on shutdown")?;
    tracing::info!(status = %service.status(), "coopd stopped");
    Ok(())
}

async fn log_events(mut events: broadcast::Receiver<Event>) {
    loop {
        match events.recv().await {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(payload) => tracing::info!(%payload, "{}", event.kind),
                Err(err) => tracing::warn!(%err, "failed to serialize event"),
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event log lagging behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Resolve when the process receives Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
